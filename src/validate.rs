//! Structural validation of an assembled report.
//!
//! Validation never stops at the first problem: every violation found in the
//! tree is collected so one run reports all of them.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::embedded::Embedded;
use crate::error::Violation;
use crate::query::{QUERY_VERSION, SOURCE_TYPE_TABLE};
use crate::report::ReportDocument;

/// Keys whose string values hold serialized documents
const EMBEDDED_KEYS: [&str; 2] = ["config", "filters"];

/// Walk the whole report and return every violation found
pub fn validate(report: &ReportDocument) -> Vec<Violation> {
    let mut out = Vec::new();

    if let Some(config) = parse_blob(&report.config, "config", &mut out) {
        for field in ["version", "themeCollection"] {
            if config.get(field).is_none() {
                out.push(missing("config", field));
            }
        }
        if let Some(themes) = config.get("themeCollection") {
            if themes.get("customTheme").is_none() {
                out.push(missing("config.themeCollection", "customTheme"));
            }
        }
    }
    if report.theme.is_empty() {
        out.push(missing("report", "theme"));
    }

    let mut names: HashMap<String, String> = HashMap::new();
    for (i, page) in report.sections.iter().enumerate() {
        let page_path = format!("sections[{}]", i);
        parse_blob(&page.config, &format!("{}.config", page_path), &mut out);
        check_list_blob(&page.filters, &format!("{}.filters", page_path), &mut out);

        for (j, vc) in page.visual_containers.iter().enumerate() {
            let vc_path = format!("{}.visualContainers[{}]", page_path, j);
            let config_path = format!("{}.config", vc_path);
            if let Some(config) = parse_blob(&vc.config, &config_path, &mut out) {
                check_visual(&config, &config_path, &mut names, &mut out);
            }
            check_list_blob(&vc.filters, &format!("{}.filters", vc_path), &mut out);
        }
    }

    out
}

/// Parse every string-valued `config`/`filters` field anywhere under `value`.
/// Works on any JSON tree, e.g. a report read back from disk.
pub fn check_embedded(value: &Value, path: &str) -> Vec<Violation> {
    let mut out = Vec::new();
    walk_embedded(value, path, &mut out);
    out
}

fn walk_embedded(value: &Value, path: &str, out: &mut Vec<Violation>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = format!("{}.{}", path, key);
                match child {
                    Value::String(text) if EMBEDDED_KEYS.contains(&key.as_str()) => {
                        if let Err(e) = serde_json::from_str::<Value>(text) {
                            out.push(Violation::UnparseableBlob {
                                path: child_path,
                                message: e.to_string(),
                            });
                        }
                    }
                    _ => walk_embedded(child, &child_path, out),
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk_embedded(item, &format!("{}[{}]", path, i), out);
            }
        }
        _ => {}
    }
}

fn missing(path: &str, field: &str) -> Violation {
    Violation::MissingField {
        path: path.to_string(),
        field: field.to_string(),
    }
}

fn parse_blob(blob: &Embedded, path: &str, out: &mut Vec<Violation>) -> Option<Value> {
    match blob.parse() {
        Ok(v) => Some(v),
        Err(e) => {
            out.push(Violation::UnparseableBlob {
                path: path.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}

fn check_list_blob(blob: &Embedded, path: &str, out: &mut Vec<Violation>) {
    if let Some(v) = parse_blob(blob, path, out) {
        if !v.is_array() {
            out.push(Violation::NotAList { path: path.to_string() });
        }
    }
}

fn check_visual(config: &Value, path: &str, names: &mut HashMap<String, String>, out: &mut Vec<Violation>) {
    let name = config.get("name").and_then(Value::as_str).unwrap_or("");
    if name.is_empty() {
        out.push(Violation::MissingName { path: path.to_string() });
    } else if let Some(first) = names.get(name) {
        out.push(Violation::DuplicateName {
            path: path.to_string(),
            name: name.to_string(),
            first: first.clone(),
        });
    } else {
        names.insert(name.to_string(), path.to_string());
    }
    let label = if name.is_empty() { path } else { name };

    let single = config.get("singleVisual");
    let visual_type = single
        .and_then(|sv| sv.get("visualType"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if visual_type.is_empty() {
        out.push(Violation::MissingVisualType { name: label.to_string() });
    }

    if let Some(sv) = single {
        match sv.get("prototypeQuery") {
            None | Some(Value::Null) => {}
            Some(query) => check_query(label, query, sv.get("projections"), out),
        }
    }
}

fn check_query(name: &str, query: &Value, projections: Option<&Value>, out: &mut Vec<Violation>) {
    match query.get("Version") {
        Some(v) if tag_equals(v, QUERY_VERSION) => {}
        other => out.push(Violation::QueryVersion {
            name: name.to_string(),
            expected: QUERY_VERSION,
            found: other.map_or_else(|| "nothing".to_string(), Value::to_string),
        }),
    }

    match non_empty_list(query, "From") {
        Some(sources) => {
            for entry in sources {
                if !entry.get("Type").is_some_and(|t| tag_equals(t, SOURCE_TYPE_TABLE)) {
                    out.push(Violation::SourceType {
                        name: name.to_string(),
                        alias: entry.get("Name").and_then(Value::as_str).unwrap_or("?").to_string(),
                        expected: SOURCE_TYPE_TABLE,
                        found: entry
                            .get("Type")
                            .map_or_else(|| "nothing".to_string(), Value::to_string),
                    });
                }
            }
        }
        None => out.push(Violation::MissingClause {
            name: name.to_string(),
            clause: "From".to_string(),
        }),
    }

    let mut select_names = HashSet::new();
    match non_empty_list(query, "Select") {
        Some(selects) => {
            for entry in selects {
                let entry_name = entry.get("Name").and_then(Value::as_str).unwrap_or("");
                select_names.insert(entry_name);
                if let Some(expected) = conventional_name(entry) {
                    if expected != entry_name {
                        out.push(Violation::SelectName {
                            name: name.to_string(),
                            expected,
                            found: entry_name.to_string(),
                        });
                    }
                }
            }
        }
        None => out.push(Violation::MissingClause {
            name: name.to_string(),
            clause: "Select".to_string(),
        }),
    }

    if let Some(Value::Object(roles)) = projections {
        for refs in roles.values() {
            for r in refs.as_array().into_iter().flatten() {
                if let Some(query_ref) = r.get("queryRef").and_then(Value::as_str) {
                    if !select_names.contains(query_ref) {
                        out.push(Violation::DanglingProjection {
                            name: name.to_string(),
                            query_ref: query_ref.to_string(),
                        });
                    }
                }
            }
        }
    }
}

/// Numeric tag comparison; `2` and `2.0` are the same tag
fn tag_equals(value: &Value, expected: i64) -> bool {
    value.as_f64() == Some(expected as f64)
}

fn non_empty_list<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
}

/// `<Source>.<Property>` for a column or measure select entry
fn conventional_name(entry: &Value) -> Option<String> {
    let field = entry.get("Column").or_else(|| entry.get("Measure"))?;
    let source = field
        .get("Expression")?
        .get("SourceRef")?
        .get("Source")?
        .as_str()?;
    let property = field.get("Property")?.as_str()?;
    Some(format!("{}.{}", source, property))
}
