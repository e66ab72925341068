// Derived metric domain models
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum MetricValue {
    Scalar(f64),
    /// Ordered (label, value) pairs, e.g. each segment's share of the total
    Sequence(Vec<(String, f64)>),
    /// Sentinel for empty input or a zero denominator
    NoData,
}

impl MetricValue {
    pub fn is_no_data(&self) -> bool {
        matches!(self, MetricValue::NoData)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    pub name: String,
    pub value: MetricValue,
}

impl MetricResult {
    pub fn new(name: impl Into<String>, value: MetricValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Metrics computed for one render, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSet {
    results: Vec<MetricResult>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a metric by name
    pub fn insert(&mut self, result: MetricResult) {
        match self.results.iter_mut().find(|r| r.name == result.name) {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.value)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricResult> {
        self.results.iter()
    }
}

impl FromIterator<MetricResult> for MetricSet {
    fn from_iter<I: IntoIterator<Item = MetricResult>>(iter: I) -> Self {
        let mut set = MetricSet::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}
