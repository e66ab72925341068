// Per-domain dataset schemas, checked once when a document is loaded
use super::dataset::DatasetName;
use super::error::{FieldKind, SchemaError};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, Copy)]
pub struct DatasetSchema {
    pub scalars: &'static [FieldSpec],
    pub lists: &'static [ListSpec],
}

const fn num(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Number,
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Text,
    }
}

const SALES: DatasetSchema = DatasetSchema {
    scalars: &[
        num("total_revenue"),
        num("profit_margin"),
        num("total_orders"),
        num("customer_satisfaction"),
    ],
    lists: &[
        ListSpec {
            name: "monthly_sales",
            fields: &[text("month"), num("revenue")],
        },
        ListSpec {
            name: "category_revenue",
            fields: &[text("category"), num("revenue")],
        },
        ListSpec {
            name: "regional_growth",
            fields: &[text("region"), num("customers"), num("growth")],
        },
        ListSpec {
            name: "daily_sales",
            fields: &[text("date"), num("sales"), num("units")],
        },
        ListSpec {
            name: "region_sales",
            fields: &[text("region"), num("sales")],
        },
        ListSpec {
            name: "product_performance",
            fields: &[text("product"), num("sales"), num("units")],
        },
    ],
};

const MARKETING: DatasetSchema = DatasetSchema {
    scalars: &[
        num("website_visits"),
        num("conversion_rate"),
        num("ad_spend"),
        text("best_campaign"),
    ],
    lists: &[
        ListSpec {
            name: "social_media_engagement",
            fields: &[text("platform"), num("engagement")],
        },
        ListSpec {
            name: "campaign_roi",
            fields: &[text("campaign"), num("roi"), num("spend"), num("revenue")],
        },
        ListSpec {
            name: "customer_demographics",
            fields: &[text("age_group"), num("percentage"), num("count")],
        },
    ],
};

const INVENTORY: DatasetSchema = DatasetSchema {
    scalars: &[
        num("stock_available"),
        num("out_of_stock_items"),
        num("inventory_turnover_ratio"),
        num("supplier_performance_score"),
    ],
    lists: &[
        ListSpec {
            name: "category_stock",
            fields: &[text("category"), num("stock"), num("threshold")],
        },
        ListSpec {
            name: "supplier_comparison",
            fields: &[text("supplier"), num("total_score")],
        },
        ListSpec {
            name: "top_selling_products",
            fields: &[
                text("product"),
                num("units_sold"),
                num("stock"),
                text("status"),
            ],
        },
        ListSpec {
            name: "low_stock_items",
            fields: &[text("product"), num("stock"), num("reorder_level")],
        },
    ],
};

const CUSTOMERS: DatasetSchema = DatasetSchema {
    scalars: &[
        num("total_customers"),
        num("new_customers_today"),
        num("avg_order_value"),
    ],
    lists: &[
        ListSpec {
            name: "customer_acquisition",
            fields: &[text("month"), num("new_customers")],
        },
        ListSpec {
            name: "customer_segments",
            fields: &[text("segment"), num("count")],
        },
        ListSpec {
            name: "customer_satisfaction_trend",
            fields: &[text("month"), num("score")],
        },
    ],
};

pub fn schema_for(name: DatasetName) -> &'static DatasetSchema {
    match name {
        DatasetName::Sales => &SALES,
        DatasetName::Marketing => &MARKETING,
        DatasetName::Inventory => &INVENTORY,
        DatasetName::Customers => &CUSTOMERS,
    }
}

impl DatasetSchema {
    /// Check every declared scalar and every declared field of every record.
    /// Undeclared fields are allowed and left untouched.
    pub fn validate(&self, document: &Map<String, Value>) -> Result<(), SchemaError> {
        for spec in self.scalars {
            let value = document
                .get(spec.name)
                .ok_or_else(|| SchemaError::MissingField {
                    field: spec.name.to_string(),
                })?;
            if !matches_kind(value, spec.kind) {
                return Err(SchemaError::WrongType {
                    field: spec.name.to_string(),
                    expected: spec.kind,
                });
            }
        }

        for list in self.lists {
            let records = document
                .get(list.name)
                .ok_or_else(|| SchemaError::MissingField {
                    field: list.name.to_string(),
                })?
                .as_array()
                .ok_or_else(|| SchemaError::WrongType {
                    field: list.name.to_string(),
                    expected: FieldKind::List,
                })?;

            for (index, record) in records.iter().enumerate() {
                for spec in list.fields {
                    match spec.kind {
                        FieldKind::Number => {
                            record_number(list.name, index, record, spec.name)?;
                        }
                        FieldKind::Text => {
                            record_text(list.name, index, record, spec.name)?;
                        }
                        FieldKind::List => {}
                    }
                }
            }
        }

        Ok(())
    }
}

fn matches_kind(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Number => value.is_number(),
        FieldKind::Text => value.is_string(),
        FieldKind::List => value.is_array(),
    }
}

/// Read a field of any shape from the `index`-th record of `list`
pub fn record_field<'a>(
    list: &str,
    index: usize,
    record: &'a Value,
    field: &str,
) -> Result<&'a Value, SchemaError> {
    let object = record.as_object().ok_or_else(|| SchemaError::NotARecord {
        list: list.to_string(),
        index,
    })?;
    object
        .get(field)
        .ok_or_else(|| SchemaError::MissingRecordField {
            list: list.to_string(),
            index,
            field: field.to_string(),
        })
}

/// Read a numeric field from the `index`-th record of `list`
pub fn record_number(
    list: &str,
    index: usize,
    record: &Value,
    field: &str,
) -> Result<f64, SchemaError> {
    record_field(list, index, record, field)?
        .as_f64()
        .ok_or_else(|| SchemaError::WrongRecordType {
            list: list.to_string(),
            index,
            field: field.to_string(),
            expected: FieldKind::Number,
        })
}

/// Read a text field from the `index`-th record of `list`
pub fn record_text<'a>(
    list: &str,
    index: usize,
    record: &'a Value,
    field: &str,
) -> Result<&'a str, SchemaError> {
    record_field(list, index, record, field)?
        .as_str()
        .ok_or_else(|| SchemaError::WrongRecordType {
            list: list.to_string(),
            index,
            field: field.to_string(),
            expected: FieldKind::Text,
        })
}
