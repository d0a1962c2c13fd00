use serde_json::{json, Map, Value};

/// Query version tag every prototype query carries
pub const QUERY_VERSION: i64 = 2;

/// `From` entry type tag for a table source
pub const SOURCE_TYPE_TABLE: i64 = 0;

/// A named data source (entity) and the alias queries refer to it by
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub alias: String,
    pub entity: String,
}

impl DataSource {
    pub fn new(alias: &str, entity: &str) -> Self {
        Self {
            alias: alias.to_string(),
            entity: entity.to_string(),
        }
    }

    /// `<alias>.<property>`, the name projections use to find a select entry
    pub fn query_ref(&self, property: &str) -> String {
        format!("{}.{}", self.alias, property)
    }

    /// `{Name, Entity, Type}` entry for a `From` clause
    pub fn from_entry(&self) -> Value {
        json!({ "Name": self.alias, "Entity": self.entity, "Type": SOURCE_TYPE_TABLE })
    }

    /// Column expression bound to the query alias
    pub fn column(&self, property: &str) -> Value {
        json!({
            "Column": {
                "Expression": { "SourceRef": { "Source": self.alias } },
                "Property": property,
            }
        })
    }

    pub fn measure(&self, property: &str) -> Value {
        json!({
            "Measure": {
                "Expression": { "SourceRef": { "Source": self.alias } },
                "Property": property,
            }
        })
    }

    /// Column expression bound to the entity name rather than the alias.
    /// Used outside of a query, e.g. as a filter target or a style selector.
    pub fn entity_column(&self, property: &str) -> Value {
        json!({
            "Column": {
                "Expression": { "SourceRef": { "Entity": self.entity } },
                "Property": property,
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn code(self) -> i64 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldKind {
    Column,
    Measure,
}

/// Builder for the `prototypeQuery` of a data-bound visual.
///
/// Every selected field is recorded under `<alias>.<property>`; `build`
/// emits a single-source query.
#[derive(Debug, Clone)]
pub struct PrototypeQuery {
    source: DataSource,
    selects: Vec<(FieldKind, String)>,
    order_by: Vec<(String, SortDirection)>,
}

impl PrototypeQuery {
    pub fn new(source: &DataSource) -> Self {
        Self {
            source: source.clone(),
            selects: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn column(mut self, property: &str) -> Self {
        self.selects.push((FieldKind::Column, property.to_string()));
        self
    }

    pub fn measure(mut self, property: &str) -> Self {
        self.selects.push((FieldKind::Measure, property.to_string()));
        self
    }

    pub fn order_by(mut self, property: &str, direction: SortDirection) -> Self {
        self.order_by.push((property.to_string(), direction));
        self
    }

    pub fn query_ref(&self, property: &str) -> String {
        self.source.query_ref(property)
    }

    pub fn build(&self) -> Value {
        let select: Vec<Value> = self
            .selects
            .iter()
            .map(|(kind, property)| {
                let mut entry = match kind {
                    FieldKind::Column => self.source.column(property),
                    FieldKind::Measure => self.source.measure(property),
                };
                if let Some(obj) = entry.as_object_mut() {
                    obj.insert("Name".to_string(), json!(self.source.query_ref(property)));
                }
                entry
            })
            .collect();

        let mut query = Map::new();
        query.insert("Version".to_string(), json!(QUERY_VERSION));
        query.insert("From".to_string(), json!([self.source.from_entry()]));
        query.insert("Select".to_string(), Value::Array(select));

        if !self.order_by.is_empty() {
            let order: Vec<Value> = self
                .order_by
                .iter()
                .map(|(property, dir)| {
                    json!({
                        "Direction": dir.code(),
                        "Expression": self.source.column(property),
                    })
                })
                .collect();
            query.insert("OrderBy".to_string(), Value::Array(order));
        }

        Value::Object(query)
    }
}

/// Role -> query reference mapping
#[derive(Debug, Clone, Default)]
pub struct Projections {
    roles: Vec<(String, Vec<String>)>,
}

impl Projections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: &str, query_refs: Vec<String>) -> Self {
        self.roles.push((role.to_string(), query_refs));
        self
    }

    pub fn build(&self) -> Value {
        let mut map = Map::new();
        for (role, refs) in &self.roles {
            let entries: Vec<Value> = refs.iter().map(|r| json!({ "queryRef": r })).collect();
            map.insert(role.clone(), Value::Array(entries));
        }
        Value::Object(map)
    }
}
