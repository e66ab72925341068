use crate::domain::dataset::DatasetName;
use crate::domain::role::Role;
use crate::domain::view_model::{ChartKind, FormatHint, SeriesStyle, TrendDirection};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub layouts: LayoutSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    /// Directory holding `sales.json`, `marketing.json`, ...
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutSettings {
    /// Config file name without extension, as `config::File::with_name` expects
    #[serde(default = "default_layouts_path")]
    pub path: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            path: default_layouts_path(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_layouts_path() -> String {
    "config/roles".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RolesConfig {
    #[serde(default)]
    pub roles: Vec<RoleLayout>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoleLayout {
    pub role: Role,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
    #[serde(default)]
    pub kpis: Vec<KpiConfig>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricConfig {
    pub id: String,
    pub dataset: DatasetName,
    pub list: String,
    #[serde(flatten)]
    pub kind: MetricKind,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricKind {
    Mean { field: String },
    Sum { field: String },
    Count,
    Ratio { numerator: String, denominator: String },
    Share { label: String, field: String },
    Change { field: String },
}

impl MetricKind {
    /// True for kinds that produce an ordered sequence rather than a scalar
    pub fn is_sequence(&self) -> bool {
        matches!(self, MetricKind::Share { .. })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KpiConfig {
    pub id: String,
    pub label: String,
    pub source: KpiSource,
    #[serde(default)]
    pub format: FormatHint,
    pub unit: Option<String>,
    pub precision: Option<u8>,
    pub trend: Option<TrendConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KpiSource {
    Field { dataset: DatasetName, field: String },
    Metric { metric: String },
}

/// Either a fixed annotation (`direction` + `note`) or a `change` metric
/// whose sign decides the direction
#[derive(Debug, Deserialize, Clone)]
pub struct TrendConfig {
    pub direction: Option<TrendDirection>,
    pub note: Option<String>,
    pub metric: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub dataset: DatasetName,
    pub list: String,
    pub category: String,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

/// A chart series reads either a numeric record field (`value`) or a
/// sequence metric (`metric`), never both
#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub id: String,
    pub name: String,
    pub value: Option<String>,
    pub metric: Option<String>,
    pub color: Option<String>,
    pub style: Option<SeriesStyle>,
    #[serde(default)]
    pub secondary_axis: bool,
    #[serde(default)]
    pub format: FormatHint,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    pub id: String,
    pub title: String,
    pub dataset: DatasetName,
    pub list: String,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ColumnConfig {
    pub key: String,
    pub header: String,
    #[serde(default)]
    pub format: FormatHint,
}

impl RoleLayout {
    /// Every dataset a slot or metric of this layout reads
    pub fn datasets(&self) -> Vec<DatasetName> {
        let mut names: Vec<DatasetName> = self
            .metrics
            .iter()
            .map(|m| m.dataset)
            .chain(self.kpis.iter().filter_map(|k| match &k.source {
                KpiSource::Field { dataset, .. } => Some(*dataset),
                KpiSource::Metric { .. } => None,
            }))
            .chain(self.charts.iter().map(|c| c.dataset))
            .chain(self.tables.iter().map(|t| t.dataset))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn metric(&self, id: &str) -> Option<&MetricConfig> {
        self.metrics.iter().find(|m| m.id == id)
    }

    fn defined_metric(&self, slot: &str, metric: &str) -> Result<&MetricConfig, LayoutError> {
        self.metric(metric).ok_or_else(|| LayoutError::UndefinedMetric {
            role: self.role,
            slot: slot.to_string(),
            metric: metric.to_string(),
        })
    }

    /// KPI values and trends need a single number
    fn scalar_metric(&self, slot: &str, metric: &str) -> Result<(), LayoutError> {
        if self.defined_metric(slot, metric)?.kind.is_sequence() {
            return Err(LayoutError::SequenceKpi {
                role: self.role,
                slot: slot.to_string(),
                metric: metric.to_string(),
            });
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let mut seen = HashSet::new();
        for metric in &self.metrics {
            if !seen.insert(metric.id.as_str()) {
                return Err(LayoutError::DuplicateMetric {
                    role: self.role,
                    metric: metric.id.clone(),
                });
            }
        }

        for kpi in &self.kpis {
            if let KpiSource::Metric { metric } = &kpi.source {
                self.scalar_metric(&kpi.id, metric)?;
            }
            if let Some(metric) = kpi.trend.as_ref().and_then(|t| t.metric.as_ref()) {
                self.scalar_metric(&kpi.id, metric)?;
            }
        }

        for chart in &self.charts {
            for series in &chart.series {
                match (&series.value, &series.metric) {
                    (Some(_), None) => {}
                    (None, Some(metric)) => {
                        let config = self.defined_metric(&series.id, metric)?;
                        if !config.kind.is_sequence() {
                            return Err(LayoutError::ScalarSeries {
                                role: self.role,
                                slot: series.id.clone(),
                                metric: metric.clone(),
                            });
                        }
                    }
                    _ => {
                        return Err(LayoutError::SeriesSource {
                            role: self.role,
                            chart: chart.id.clone(),
                            series: series.id.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no layout configured for the {0} dashboard")]
    MissingRole(Role),

    #[error("the {0} dashboard is configured more than once")]
    DuplicateRole(Role),

    #[error("{role} dashboard defines metric `{metric}` more than once")]
    DuplicateMetric { role: Role, metric: String },

    #[error("{role} dashboard slot `{slot}` references undefined metric `{metric}`")]
    UndefinedMetric {
        role: Role,
        slot: String,
        metric: String,
    },

    #[error("{role} dashboard KPI `{slot}` cannot show sequence metric `{metric}`")]
    SequenceKpi {
        role: Role,
        slot: String,
        metric: String,
    },

    #[error("{role} dashboard series `{slot}` needs a sequence metric, `{metric}` is scalar")]
    ScalarSeries {
        role: Role,
        slot: String,
        metric: String,
    },

    #[error("{role} dashboard chart `{chart}` series `{series}` must set exactly one of `value` or `metric`")]
    SeriesSource {
        role: Role,
        chart: String,
        series: String,
    },
}

/// Validated layouts, exactly one per role
#[derive(Debug, Clone)]
pub struct RoleLayouts {
    layouts: BTreeMap<Role, RoleLayout>,
}

impl RoleLayouts {
    pub fn from_config(config: RolesConfig) -> Result<Self, LayoutError> {
        let mut layouts = BTreeMap::new();
        for layout in config.roles {
            layout.validate()?;
            let role = layout.role;
            if layouts.insert(role, layout).is_some() {
                return Err(LayoutError::DuplicateRole(role));
            }
        }

        if let Some(missing) = Role::ALL.into_iter().find(|r| !layouts.contains_key(r)) {
            return Err(LayoutError::MissingRole(missing));
        }

        Ok(Self { layouts })
    }

    pub fn get(&self, role: Role) -> Option<&RoleLayout> {
        self.layouts.get(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleLayout> {
        self.layouts.values()
    }
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_role_layouts(path: &str) -> anyhow::Result<RoleLayouts> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .build()?;

    let roles: RolesConfig = settings.try_deserialize()?;
    Ok(RoleLayouts::from_config(roles)?)
}

/// Parse layouts from TOML text rather than a file on disk
pub fn parse_role_layouts(toml: &str) -> anyhow::Result<RoleLayouts> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    let roles: RolesConfig = settings.try_deserialize()?;
    Ok(RoleLayouts::from_config(roles)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const ROLES_TOML: &str = include_str!("../../config/roles.toml");

    pub(crate) fn shipped_layouts() -> RoleLayouts {
        parse_role_layouts(ROLES_TOML).expect("shipped layouts parse")
    }

    #[test]
    fn test_shipped_layouts_cover_every_role() {
        let layouts = shipped_layouts();
        for role in Role::ALL {
            let layout = layouts.get(role).expect("layout present");
            assert!(!layout.kpis.is_empty(), "{role} has no KPIs");
            assert!(!layout.charts.is_empty(), "{role} has no charts");
        }
    }

    #[test]
    fn test_sales_layout_reads_sales_and_customers() {
        let layouts = shipped_layouts();
        let sales = layouts.get(Role::Sales).unwrap();
        assert_eq!(
            sales.datasets(),
            vec![DatasetName::Sales, DatasetName::Customers]
        );
    }

    #[test]
    fn test_metric_kind_parses_from_flattened_tag() {
        let layouts = shipped_layouts();
        let sales = layouts.get(Role::Sales).unwrap();
        let avg = sales
            .metrics
            .iter()
            .find(|m| m.id == "daily_sales_avg")
            .unwrap();
        assert_eq!(avg.list, "daily_sales");
        assert_eq!(
            avg.kind,
            MetricKind::Mean {
                field: "sales".to_string()
            }
        );
    }

    #[test]
    fn test_missing_role_is_rejected() {
        let toml = r#"
[[roles]]
role = "ceo"
title = "CEO Dashboard"
"#;
        let err = parse_role_layouts(toml).unwrap_err();
        let err = err.downcast::<LayoutError>().unwrap();
        assert!(matches!(err, LayoutError::MissingRole(Role::Marketing)));
    }

    #[test]
    fn test_undefined_metric_is_rejected() {
        let layout = RoleLayout {
            role: Role::Customers,
            title: "Customers".to_string(),
            description: String::new(),
            metrics: Vec::new(),
            kpis: vec![KpiConfig {
                id: "avg_satisfaction".to_string(),
                label: "Avg Satisfaction".to_string(),
                source: KpiSource::Metric {
                    metric: "satisfaction_avg".to_string(),
                },
                format: FormatHint::Plain,
                unit: None,
                precision: None,
                trend: None,
            }],
            charts: Vec::new(),
            tables: Vec::new(),
        };
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, LayoutError::UndefinedMetric { ref metric, .. } if metric == "satisfaction_avg"));
    }

    fn shipped_layout(role: Role) -> RoleLayout {
        shipped_layouts().get(role).expect("layout present").clone()
    }

    #[test]
    fn test_duplicate_role_is_rejected() {
        let toml = r#"
[[roles]]
role = "ceo"
title = "CEO Dashboard"

[[roles]]
role = "ceo"
title = "Another CEO Dashboard"
"#;
        let err = parse_role_layouts(toml).unwrap_err();
        let err = err.downcast::<LayoutError>().unwrap();
        assert!(matches!(err, LayoutError::DuplicateRole(Role::Ceo)));
    }

    #[test]
    fn test_duplicate_metric_is_rejected() {
        let mut layout = shipped_layout(Role::Customers);
        let first = layout.metrics[0].clone();
        layout.metrics.push(first);

        let err = layout.validate().unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateMetric { ref metric, .. } if metric == "satisfaction_avg"));
    }

    #[test]
    fn test_kpi_bound_to_share_metric_is_rejected() {
        let mut layout = shipped_layout(Role::Customers);
        let kpi = layout
            .kpis
            .iter_mut()
            .find(|k| k.id == "avg_satisfaction")
            .unwrap();
        kpi.source = KpiSource::Metric {
            metric: "segment_share".to_string(),
        };

        let err = layout.validate().unwrap_err();
        assert!(matches!(
            err,
            LayoutError::SequenceKpi { ref slot, ref metric, .. }
                if slot == "avg_satisfaction" && metric == "segment_share"
        ));
    }

    #[test]
    fn test_trend_bound_to_share_metric_is_rejected() {
        let mut layout = shipped_layout(Role::Ceo);
        let change = layout
            .metrics
            .iter_mut()
            .find(|m| m.id == "monthly_revenue_change")
            .unwrap();
        change.kind = MetricKind::Share {
            label: "month".to_string(),
            field: "revenue".to_string(),
        };

        let err = layout.validate().unwrap_err();
        assert!(matches!(
            err,
            LayoutError::SequenceKpi { ref slot, ref metric, .. }
                if slot == "total_revenue" && metric == "monthly_revenue_change"
        ));
    }

    #[test]
    fn test_series_metric_must_be_a_sequence() {
        let mut layout = shipped_layout(Role::Customers);
        let share = layout
            .charts
            .iter_mut()
            .flat_map(|c| c.series.iter_mut())
            .find(|s| s.metric.is_some())
            .unwrap();
        share.metric = Some("satisfaction_avg".to_string());

        let err = layout.validate().unwrap_err();
        assert!(matches!(err, LayoutError::ScalarSeries { ref metric, .. } if metric == "satisfaction_avg"));
    }

    #[test]
    fn test_series_needs_exactly_one_source() {
        let mut layout = shipped_layout(Role::Customers);
        let series = &mut layout.charts[0].series[0];
        series.metric = Some("segment_share".to_string());
        assert!(matches!(
            layout.validate().unwrap_err(),
            LayoutError::SeriesSource { ref chart, .. } if chart == "customer_acquisition"
        ));

        let series = &mut layout.charts[0].series[0];
        series.value = None;
        series.metric = None;
        assert!(matches!(
            layout.validate().unwrap_err(),
            LayoutError::SeriesSource { .. }
        ));
    }

    #[test]
    fn test_shipped_segment_chart_reads_share_metric() {
        let layout = shipped_layout(Role::Customers);
        let segments = layout
            .charts
            .iter()
            .find(|c| c.id == "customer_segments")
            .unwrap();
        assert_eq!(segments.series[1].metric.as_deref(), Some("segment_share"));
        assert_eq!(segments.series[1].value, None);
    }

    #[test]
    fn test_default_app_config() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.data.dir, PathBuf::from("data"));
        assert_eq!(config.layouts.path, "config/roles");
    }
}
