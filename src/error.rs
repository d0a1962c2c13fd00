use std::path::PathBuf;
use thiserror::Error;

/// One broken invariant found while walking a report document.
/// `path` is the location in the tree, e.g. `sections[1].visualContainers[3].config`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("{path}: embedded document does not parse: {message}")]
    UnparseableBlob { path: String, message: String },

    #[error("{path}: missing required field '{field}'")]
    MissingField { path: String, field: String },

    #[error("{path}: expected a list")]
    NotAList { path: String },

    #[error("{path}: visual has no name")]
    MissingName { path: String },

    #[error("{path}: duplicate visual name '{name}' (first used at {first})")]
    DuplicateName { path: String, name: String, first: String },

    #[error("visual '{name}': missing visualType")]
    MissingVisualType { name: String },

    #[error("visual '{name}': query Version must be {expected}, found {found}")]
    QueryVersion { name: String, expected: i64, found: String },

    #[error("visual '{name}': query is missing its '{clause}' clause")]
    MissingClause { name: String, clause: String },

    #[error("visual '{name}': From entry '{alias}' has Type {found}, expected {expected}")]
    SourceType { name: String, alias: String, expected: i64, found: String },

    #[error("visual '{name}': projection '{query_ref}' has no matching Select entry")]
    DanglingProjection { name: String, query_ref: String },

    #[error("visual '{name}': Select entry named '{found}' should be named '{expected}'")]
    SelectName { name: String, expected: String, found: String },
}

/// Error type for building, checking and writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report failed validation with {} violation(s)", .0.len())]
    Validation(Vec<Violation>),

    #[error("serialized report does not round-trip: {0}")]
    RoundTrip(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Violations carried by a validation failure, empty otherwise
    pub fn violations(&self) -> &[Violation] {
        match self {
            ReportError::Validation(v) => v,
            _ => &[],
        }
    }
}
