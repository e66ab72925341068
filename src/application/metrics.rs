// Metric aggregator - pure functions over dataset records
//
// Every function takes the list name only to label errors. Empty input never
// divides: it yields `MetricValue::NoData` (or zero for sums and counts).
// Date windows such as "last 7 days" are the caller's job; records are
// aggregated exactly as given.
use crate::domain::dataset::DatasetBundle;
use crate::domain::error::{DashboardError, SchemaError};
use crate::domain::metric::{MetricResult, MetricSet, MetricValue};
use crate::domain::schema::{record_number, record_text};
use crate::infrastructure::config::{MetricConfig, MetricKind, RoleLayout};
use serde_json::Value;

const DAILY_SALES: &str = "daily_sales";
const SATISFACTION_TREND: &str = "customer_satisfaction_trend";

fn numbers(list: &str, records: &[Value], field: &str) -> Result<Vec<f64>, SchemaError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| record_number(list, index, record, field))
        .collect()
}

/// Arithmetic mean of `field` over all records
pub fn mean(list: &str, records: &[Value], field: &str) -> Result<MetricValue, SchemaError> {
    let values = numbers(list, records, field)?;
    if values.is_empty() {
        return Ok(MetricValue::NoData);
    }
    Ok(MetricValue::Scalar(
        values.iter().sum::<f64>() / values.len() as f64,
    ))
}

pub fn sum(list: &str, records: &[Value], field: &str) -> Result<MetricValue, SchemaError> {
    let values = numbers(list, records, field)?;
    Ok(MetricValue::Scalar(values.iter().sum()))
}

pub fn count(records: &[Value]) -> MetricValue {
    MetricValue::Scalar(records.len() as f64)
}

/// Sum of `numerator` over sum of `denominator`
pub fn ratio(
    list: &str,
    records: &[Value],
    numerator: &str,
    denominator: &str,
) -> Result<MetricValue, SchemaError> {
    let top: f64 = numbers(list, records, numerator)?.iter().sum();
    let bottom: f64 = numbers(list, records, denominator)?.iter().sum();
    if bottom == 0.0 {
        return Ok(MetricValue::NoData);
    }
    Ok(MetricValue::Scalar(top / bottom))
}

/// Each record's fraction of the total of `field`, labelled by `label`
pub fn share(
    list: &str,
    records: &[Value],
    label: &str,
    field: &str,
) -> Result<MetricValue, SchemaError> {
    let values = numbers(list, records, field)?;
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return Ok(MetricValue::NoData);
    }

    let mut shares = Vec::with_capacity(values.len());
    for (index, (record, value)) in records.iter().zip(values).enumerate() {
        let name = record_text(list, index, record, label)?;
        shares.push((name.to_string(), value / total));
    }
    Ok(MetricValue::Sequence(shares))
}

/// Percent change of the last record's `field` against the one before it
pub fn change(list: &str, records: &[Value], field: &str) -> Result<MetricValue, SchemaError> {
    let values = numbers(list, records, field)?;
    match values.as_slice() {
        [.., previous, last] if *previous != 0.0 => Ok(MetricValue::Scalar(
            (last - previous) / previous * 100.0,
        )),
        _ => Ok(MetricValue::NoData),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyAverages {
    pub sales_avg: MetricValue,
    pub units_avg: MetricValue,
}

/// Average sales and units over the `daily_sales` records.
///
/// For callers holding raw records outside a role layout. Layouts reach the
/// same numbers through configured `mean` metrics.
pub fn daily_averages(records: &[Value]) -> Result<DailyAverages, SchemaError> {
    Ok(DailyAverages {
        sales_avg: mean(DAILY_SALES, records, "sales")?,
        units_avg: mean(DAILY_SALES, records, "units")?,
    })
}

/// Average `score` over the `customer_satisfaction_trend` records.
///
/// Direct-call counterpart of a configured `mean` over `score`.
pub fn average_satisfaction(records: &[Value]) -> Result<MetricValue, SchemaError> {
    mean(SATISFACTION_TREND, records, "score")
}

/// Evaluate one configured metric against the loaded datasets
pub fn evaluate(
    metric: &MetricConfig,
    datasets: &DatasetBundle,
) -> Result<MetricResult, DashboardError> {
    let schema_error = |source: SchemaError| DashboardError::Schema {
        dataset: metric.dataset,
        source,
    };

    let dataset = datasets
        .get(metric.dataset)
        .ok_or_else(|| DashboardError::NotFound(metric.dataset.to_string()))?;
    let records = dataset.records(&metric.list).ok_or_else(|| {
        schema_error(SchemaError::MissingField {
            field: metric.list.clone(),
        })
    })?;

    let list = metric.list.as_str();
    let value = match &metric.kind {
        MetricKind::Mean { field } => mean(list, records, field),
        MetricKind::Sum { field } => sum(list, records, field),
        MetricKind::Count => Ok(count(records)),
        MetricKind::Ratio {
            numerator,
            denominator,
        } => ratio(list, records, numerator, denominator),
        MetricKind::Share { label, field } => share(list, records, label, field),
        MetricKind::Change { field } => change(list, records, field),
    }
    .map_err(schema_error)?;

    Ok(MetricResult::new(metric.id.clone(), value))
}

/// Compute every metric a role layout declares, in declaration order
pub fn compute_metrics(
    layout: &RoleLayout,
    datasets: &DatasetBundle,
) -> Result<MetricSet, DashboardError> {
    layout
        .metrics
        .iter()
        .map(|metric| evaluate(metric, datasets))
        .collect()
}
