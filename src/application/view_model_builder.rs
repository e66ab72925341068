// View model builder - assembles a role's slots from datasets and metrics
//
// Pure assembly: no I/O, no formatting. Every slot a layout declares must be
// filled; a gap is reported as `MissingData` instead of a shorter dashboard.
use crate::domain::dataset::{Dataset, DatasetBundle, DatasetName};
use crate::domain::error::DashboardError;
use crate::domain::metric::{MetricSet, MetricValue};
use crate::domain::role::Role;
use crate::domain::schema::{record_field, record_number};
use crate::domain::view_model::{
    CategoryPoint, ChartData, KpiEntry, KpiValue, SeriesData, TableColumn, TableData, TableRow,
    Trend, TrendDirection, ViewModel,
};
use crate::infrastructure::config::{
    ChartConfig, KpiConfig, KpiSource, RoleLayout, RoleLayouts, TableConfig, TrendConfig,
};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct ViewModelBuilder {
    layouts: Arc<RoleLayouts>,
}

impl ViewModelBuilder {
    pub fn new(layouts: Arc<RoleLayouts>) -> Self {
        Self { layouts }
    }

    pub fn build(
        &self,
        role: Role,
        datasets: &DatasetBundle,
        metrics: &MetricSet,
    ) -> Result<ViewModel, DashboardError> {
        let layout = self
            .layouts
            .get(role)
            .ok_or_else(|| DashboardError::missing_data(role, "layout", "no layout configured"))?;
        build_for_layout(layout, datasets, metrics)
    }
}

pub fn build_for_layout(
    layout: &RoleLayout,
    datasets: &DatasetBundle,
    metrics: &MetricSet,
) -> Result<ViewModel, DashboardError> {
    let slots = Slots {
        role: layout.role,
        datasets,
        metrics,
    };

    let kpis = layout
        .kpis
        .iter()
        .map(|kpi| slots.kpi(kpi))
        .collect::<Result<Vec<_>, _>>()?;
    let charts = layout
        .charts
        .iter()
        .map(|chart| slots.chart(chart))
        .collect::<Result<Vec<_>, _>>()?;
    let tables = layout
        .tables
        .iter()
        .map(|table| slots.table(table))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ViewModel {
        role: layout.role,
        title: layout.title.clone(),
        kpis,
        charts,
        tables,
    })
}

struct Slots<'a> {
    role: Role,
    datasets: &'a DatasetBundle,
    metrics: &'a MetricSet,
}

impl Slots<'_> {
    fn missing(&self, slot: &str, detail: impl Into<String>) -> DashboardError {
        DashboardError::missing_data(self.role, slot, detail)
    }

    fn dataset(&self, slot: &str, name: DatasetName) -> Result<&Dataset, DashboardError> {
        self.datasets
            .get(name)
            .ok_or_else(|| self.missing(slot, format!("{name} dataset not loaded")))
    }

    fn records(&self, slot: &str, name: DatasetName, list: &str) -> Result<&[Value], DashboardError> {
        self.dataset(slot, name)?
            .records(list)
            .ok_or_else(|| self.missing(slot, format!("{name} dataset has no list `{list}`")))
    }

    fn metric(&self, slot: &str, id: &str) -> Result<&MetricValue, DashboardError> {
        self.metrics
            .get(id)
            .ok_or_else(|| self.missing(slot, format!("metric `{id}` was not computed")))
    }

    fn kpi(&self, config: &KpiConfig) -> Result<KpiEntry, DashboardError> {
        let slot = config.id.as_str();
        let value = match &config.source {
            KpiSource::Field { dataset, field } => {
                let value = self
                    .dataset(slot, *dataset)?
                    .scalar(field)
                    .ok_or_else(|| self.missing(slot, format!("{dataset} dataset has no field `{field}`")))?;
                match value {
                    Value::Number(n) => n
                        .as_f64()
                        .map(KpiValue::Number)
                        .ok_or_else(|| self.missing(slot, format!("`{field}` is out of range")))?,
                    Value::String(s) => KpiValue::Text(s.clone()),
                    _ => {
                        return Err(self.missing(
                            slot,
                            format!("`{field}` is neither a number nor a string"),
                        ));
                    }
                }
            }
            KpiSource::Metric { metric } => match self.metric(slot, metric)? {
                MetricValue::Scalar(v) => KpiValue::Number(*v),
                MetricValue::NoData => KpiValue::NoData,
                MetricValue::Sequence(_) => {
                    return Err(self.missing(slot, format!("metric `{metric}` is not a scalar")));
                }
            },
        };

        let trend = match &config.trend {
            Some(trend) => Some(self.trend(slot, trend)?),
            None => None,
        };

        Ok(KpiEntry {
            id: config.id.clone(),
            label: config.label.clone(),
            value,
            format: config.format,
            unit: config.unit.clone(),
            precision: config.precision,
            trend,
        })
    }

    fn trend(&self, slot: &str, config: &TrendConfig) -> Result<Trend, DashboardError> {
        let Some(metric) = &config.metric else {
            return Ok(Trend {
                direction: config.direction.unwrap_or(TrendDirection::Flat),
                note: config.note.clone(),
                change_pct: None,
            });
        };

        let change_pct = match self.metric(slot, metric)? {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::NoData => None,
            MetricValue::Sequence(_) => {
                return Err(self.missing(slot, format!("trend metric `{metric}` is not a scalar")));
            }
        };
        let direction = match change_pct {
            Some(c) if c > 0.0 => TrendDirection::Up,
            Some(c) if c < 0.0 => TrendDirection::Down,
            _ => TrendDirection::Flat,
        };
        Ok(Trend {
            direction,
            note: config.note.clone(),
            change_pct,
        })
    }

    fn chart(&self, config: &ChartConfig) -> Result<ChartData, DashboardError> {
        let slot = config.id.as_str();
        let records = self.records(slot, config.dataset, &config.list)?;
        let list = config.list.as_str();

        let categories = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                match record_field(list, index, record, &config.category) {
                    Ok(Value::String(s)) => Ok(s.clone()),
                    Ok(Value::Number(n)) => Ok(n.to_string()),
                    Ok(_) => Err(self.missing(
                        slot,
                        format!("record {index} of `{list}`: `{}` is not a category label", config.category),
                    )),
                    Err(e) => Err(self.missing(slot, e.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut series = Vec::with_capacity(config.series.len());
        for series_config in &config.series {
            let points = match (&series_config.value, &series_config.metric) {
                (Some(field), None) => records
                    .iter()
                    .zip(&categories)
                    .enumerate()
                    .map(|(index, (record, category))| {
                        record_number(list, index, record, field)
                            .map(|value| CategoryPoint::new(category.clone(), value))
                            .map_err(|e| self.missing(slot, e.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                (None, Some(metric)) => self.sequence_points(&series_config.id, metric)?,
                _ => {
                    return Err(self.missing(
                        &series_config.id,
                        "series must read exactly one of a field or a metric",
                    ));
                }
            };

            series.push(SeriesData {
                id: series_config.id.clone(),
                name: series_config.name.clone(),
                color: series_config.color.clone(),
                style: series_config.style,
                secondary_axis: series_config.secondary_axis,
                format: series_config.format,
                points,
            });
        }

        Ok(ChartData {
            id: config.id.clone(),
            title: config.title.clone(),
            kind: config.kind,
            series,
        })
    }

    /// Points of a sequence metric, in the order the metric produced them
    fn sequence_points(
        &self,
        slot: &str,
        metric: &str,
    ) -> Result<Vec<CategoryPoint>, DashboardError> {
        match self.metric(slot, metric)? {
            MetricValue::Sequence(pairs) => Ok(pairs
                .iter()
                .map(|(category, value)| CategoryPoint::new(category.clone(), *value))
                .collect()),
            MetricValue::NoData => Ok(Vec::new()),
            MetricValue::Scalar(_) => {
                Err(self.missing(slot, format!("metric `{metric}` is not a sequence")))
            }
        }
    }

    fn table(&self, config: &TableConfig) -> Result<TableData, DashboardError> {
        let slot = config.id.as_str();
        let records = self.records(slot, config.dataset, &config.list)?;
        let list = config.list.as_str();

        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| -> Result<TableRow, DashboardError> {
                let cells = config
                    .columns
                    .iter()
                    .map(|column| {
                        record_field(list, index, record, &column.key)
                            .cloned()
                            .map_err(|e| self.missing(slot, e.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TableRow { cells })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let columns = config
            .columns
            .iter()
            .map(|c| TableColumn {
                key: c.key.clone(),
                header: c.header.clone(),
                format: c.format,
            })
            .collect();

        Ok(TableData {
            id: config.id.clone(),
            title: config.title.clone(),
            columns,
            rows,
        })
    }
}
