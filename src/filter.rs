use serde_json::{json, Value};

use crate::literal::{encode_string, literal_node};
use crate::query::{DataSource, QUERY_VERSION};

/// Predicate a filter applies to its column
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Column value is one of the listed values
    In(Vec<String>),
    /// Column value equals the given value
    Equals(String),
}

/// A named predicate bound to one column of a data source.
/// The same shape serves page-level and visual-level filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub source: DataSource,
    pub column: String,
    pub condition: Condition,
    pub hidden_in_view_mode: bool,
}

impl Filter {
    pub fn categorical(name: &str, source: &DataSource, column: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            source: source.clone(),
            column: column.to_string(),
            condition: Condition::In(values.iter().map(|v| v.to_string()).collect()),
            hidden_in_view_mode: false,
        }
    }

    pub fn equals(name: &str, source: &DataSource, column: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.clone(),
            column: column.to_string(),
            condition: Condition::Equals(value.to_string()),
            hidden_in_view_mode: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden_in_view_mode = true;
        self
    }

    fn type_tag(&self) -> &'static str {
        match self.condition {
            Condition::In(_) => "Categorical",
            Condition::Equals(_) => "Advanced",
        }
    }

    fn where_condition(&self) -> Value {
        let column = self.source.column(&self.column);
        match &self.condition {
            Condition::In(values) => {
                let rows: Vec<Value> = values
                    .iter()
                    .map(|v| json!([literal_node(encode_string(v))]))
                    .collect();
                json!({ "In": { "Expressions": [column], "Values": rows } })
            }
            Condition::Equals(value) => json!({
                "Comparison": {
                    "ComparisonKind": 0,
                    "Left": column,
                    "Right": literal_node(encode_string(value)),
                }
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "expression": self.source.entity_column(&self.column),
            "type": self.type_tag(),
            "filter": {
                "Version": QUERY_VERSION,
                "From": [self.source.from_entry()],
                "Where": [{ "Condition": self.where_condition() }],
            },
            "isHiddenInViewMode": self.hidden_in_view_mode,
        })
    }
}

/// Serialize a filter list as the array a `filters` blob holds
pub fn filters_value(filters: &[Filter]) -> Value {
    Value::Array(filters.iter().map(Filter::to_value).collect())
}
