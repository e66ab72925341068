// Dataset domain model - one parsed JSON document per business domain
use super::error::DashboardError;
use super::schema::schema_for;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetName {
    Sales,
    Marketing,
    Inventory,
    Customers,
}

impl DatasetName {
    pub const ALL: [DatasetName; 4] = [
        DatasetName::Sales,
        DatasetName::Marketing,
        DatasetName::Inventory,
        DatasetName::Customers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetName::Sales => "sales",
            DatasetName::Marketing => "marketing",
            DatasetName::Inventory => "inventory",
            DatasetName::Customers => "customers",
        }
    }

    /// Name of the backing document, e.g. `sales.json`
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetName {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetName::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| DashboardError::NotFound(s.to_string()))
    }
}

/// A validated dataset document.
///
/// The document is kept as a JSON object so fields the schema does not
/// declare survive a parse/serialize round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: DatasetName,
    document: Map<String, Value>,
}

impl Dataset {
    /// Parse and validate the raw text of a dataset document
    pub fn parse(name: DatasetName, text: &str) -> Result<Self, DashboardError> {
        let document: Map<String, Value> = serde_json::from_str(text)
            .map_err(|source| DashboardError::Parse { dataset: name, source })?;
        Self::from_document(name, document)
    }

    pub fn from_value(name: DatasetName, value: Value) -> Result<Self, DashboardError> {
        // A top-level array or scalar is a malformed document, not a schema gap
        let document: Map<String, Value> = serde_json::from_value(value)
            .map_err(|source| DashboardError::Parse { dataset: name, source })?;
        Self::from_document(name, document)
    }

    fn from_document(name: DatasetName, document: Map<String, Value>) -> Result<Self, DashboardError> {
        schema_for(name)
            .validate(&document)
            .map_err(|source| DashboardError::Schema { dataset: name, source })?;

        Ok(Self { name, document })
    }

    pub fn name(&self) -> DatasetName {
        self.name
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn scalar(&self, field: &str) -> Option<&Value> {
        self.document.get(field)
    }

    /// Records of a list field, or `None` if the field is absent or not a list
    pub fn records(&self, list: &str) -> Option<&[Value]> {
        self.document
            .get(list)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Serialize back to document form
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.document)
    }
}

/// The datasets one render reads, shared with the cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetBundle {
    datasets: BTreeMap<DatasetName, Arc<Dataset>>,
}

impl DatasetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dataset: Arc<Dataset>) {
        self.datasets.insert(dataset.name(), dataset);
    }

    pub fn get(&self, name: DatasetName) -> Option<&Dataset> {
        self.datasets.get(&name).map(Arc::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = DatasetName> + '_ {
        self.datasets.keys().copied()
    }
}

impl FromIterator<Arc<Dataset>> for DatasetBundle {
    fn from_iter<I: IntoIterator<Item = Arc<Dataset>>>(iter: I) -> Self {
        let mut bundle = DatasetBundle::new();
        for dataset in iter {
            bundle.insert(dataset);
        }
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::SchemaError;

    const SALES_JSON: &str = include_str!("../../data/sales.json");

    #[test]
    fn test_unknown_dataset_name() {
        let err = "payroll".parse::<DatasetName>().unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(ref n) if n == "payroll"));
    }

    #[test]
    fn test_known_dataset_names() {
        for name in DatasetName::ALL {
            assert_eq!(name.as_str().parse::<DatasetName>().unwrap(), name);
        }
        assert_eq!(DatasetName::Customers.file_name(), "customers.json");
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let err = Dataset::parse(DatasetName::Sales, "{\"total_revenue\": ").unwrap_err();
        assert!(matches!(err, DashboardError::Parse { dataset: DatasetName::Sales, .. }));

        let err = Dataset::parse(DatasetName::Sales, "[1, 2, 3]").unwrap_err();
        assert!(matches!(err, DashboardError::Parse { .. }));
    }

    #[test]
    fn test_schema_violation_is_schema_error() {
        let err = Dataset::parse(DatasetName::Sales, "{}").unwrap_err();
        match err {
            DashboardError::Schema { dataset, source } => {
                assert_eq!(dataset, DatasetName::Sales);
                assert_eq!(
                    source,
                    SchemaError::MissingField {
                        field: "total_revenue".to_string()
                    }
                );
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let mut value: Value = serde_json::from_str(SALES_JSON).unwrap();
        value
            .as_object_mut()
            .unwrap()
            .insert("fiscal_note".to_string(), Value::String("unaudited".into()));

        let dataset = Dataset::from_value(DatasetName::Sales, value.clone()).unwrap();
        let reparsed: Value = serde_json::from_str(&dataset.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, value);
    }

    #[test]
    fn test_records_accessor() {
        let dataset = Dataset::parse(DatasetName::Sales, SALES_JSON).unwrap();
        assert!(!dataset.records("daily_sales").unwrap().is_empty());
        assert!(dataset.records("total_revenue").is_none());
        assert!(dataset.records("payroll").is_none());
    }
}
