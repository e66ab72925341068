// Error taxonomy shared by every stage of the dashboard pipeline
use super::dataset::DatasetName;
use super::role::{Role, UnknownRole};
use std::fmt;
use thiserror::Error;

/// Shape of a value a dataset schema expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
    List,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Number => f.write_str("a number"),
            FieldKind::Text => f.write_str("a string"),
            FieldKind::List => f.write_str("a list of records"),
        }
    }
}

/// A field that is absent or has the wrong shape.
///
/// Record-level variants carry the list name and the zero-based index of the
/// offending record so the operator can find it in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` should be {expected}")]
    WrongType { field: String, expected: FieldKind },

    #[error("record {index} of `{list}` is not an object")]
    NotARecord { list: String, index: usize },

    #[error("record {index} of `{list}` is missing field `{field}`")]
    MissingRecordField {
        list: String,
        index: usize,
        field: String,
    },

    #[error("record {index} of `{list}`: field `{field}` should be {expected}")]
    WrongRecordType {
        list: String,
        index: usize,
        field: String,
        expected: FieldKind,
    },
}

impl SchemaError {
    /// Index of the offending record, if the error is record-scoped
    pub fn record_index(&self) -> Option<usize> {
        match self {
            SchemaError::NotARecord { index, .. }
            | SchemaError::MissingRecordField { index, .. }
            | SchemaError::WrongRecordType { index, .. } => Some(*index),
            SchemaError::MissingField { .. } | SchemaError::WrongType { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("unknown dataset: {0}")]
    NotFound(String),

    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),

    #[error("failed to read {dataset} dataset: {source}")]
    Io {
        dataset: DatasetName,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {dataset} dataset: {source}")]
    Parse {
        dataset: DatasetName,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema violation in {dataset} dataset: {source}")]
    Schema {
        dataset: DatasetName,
        #[source]
        source: SchemaError,
    },

    #[error("{role} dashboard is missing data for slot `{slot}`: {detail}")]
    MissingData {
        role: Role,
        slot: String,
        detail: String,
    },
}

impl DashboardError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::NotFound(_) => "not_found",
            DashboardError::UnknownRole(_) => "unknown_role",
            DashboardError::Io { .. } => "io",
            DashboardError::Parse { .. } => "parse",
            DashboardError::Schema { .. } => "schema",
            DashboardError::MissingData { .. } => "missing_data",
        }
    }

    pub fn missing_data(role: Role, slot: &str, detail: impl Into<String>) -> Self {
        DashboardError::MissingData {
            role,
            slot: slot.to_string(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_record_index() {
        let err = SchemaError::MissingRecordField {
            list: "customer_satisfaction_trend".to_string(),
            index: 3,
            field: "score".to_string(),
        };
        assert_eq!(err.record_index(), Some(3));
        assert_eq!(
            err.to_string(),
            "record 3 of `customer_satisfaction_trend` is missing field `score`"
        );
    }

    #[test]
    fn test_dashboard_error_message_includes_dataset() {
        let err = DashboardError::Schema {
            dataset: DatasetName::Inventory,
            source: SchemaError::MissingField {
                field: "stock_available".to_string(),
            },
        };
        assert_eq!(err.kind(), "schema");
        assert_eq!(
            err.to_string(),
            "schema violation in inventory dataset: missing field `stock_available`"
        );
    }
}
