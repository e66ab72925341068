// View model domain models - what a role's dashboard page renders
use super::role::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the presentation layer should format a raw numeric value.
/// The builder never formats; it only forwards the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatHint {
    #[default]
    Plain,
    Integer,
    Currency,
    /// `$2450.0K`
    CurrencyThousands,
    /// `48K`
    Thousands,
    /// value is already a percentage, e.g. `23.5`
    Percent,
    /// value is a fraction to be shown as a percentage, e.g. `0.12`
    PercentFraction,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub direction: TrendDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Percent change when the trend is computed from data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum KpiValue {
    Number(f64),
    Text(String),
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiEntry {
    pub id: String,
    pub label: String,
    pub value: KpiValue,
    pub format: FormatHint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPoint {
    pub category: String,
    pub value: f64,
}

impl CategoryPoint {
    pub fn new(category: impl Into<String>, value: f64) -> Self {
        Self {
            category: category.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    GroupedBar,
    Area,
    Pie,
    /// Bars and lines sharing the category axis
    Combo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Line,
    Bar,
    Area,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<SeriesStyle>,
    pub secondary_axis: bool,
    pub format: FormatHint,
    pub points: Vec<CategoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub series: Vec<SeriesData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub key: String,
    pub header: String,
    pub format: FormatHint,
}

/// One row, cells aligned with the table's columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub id: String,
    pub title: String,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub role: Role,
    pub title: String,
    pub kpis: Vec<KpiEntry>,
    pub charts: Vec<ChartData>,
    pub tables: Vec<TableData>,
}
