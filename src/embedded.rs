//! Serialized sub-documents.
//!
//! Several fields of the report format (`config`, `filters`, textbox
//! paragraphs) hold a nested JSON document as *text*. `Embedded` is the one
//! place where such a document is turned into text and back, so every blob
//! in the output is encoded the same way.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON document stored as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedded(String);

impl Embedded {
    /// Compact encoding of a value. Non-ASCII text is kept as-is.
    pub fn from_value(value: &Value) -> Self {
        Embedded(value.to_string())
    }

    /// Encode any serializable value.
    pub fn encode<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_string(value).map(Embedded)
    }

    /// Wrap text that is claimed to be a serialized document.
    /// Nothing is checked here; `parse` reports whether the claim holds.
    pub fn from_raw(text: impl Into<String>) -> Self {
        Embedded(text.into())
    }

    pub fn empty_object() -> Self {
        Embedded("{}".to_string())
    }

    pub fn empty_list() -> Self {
        Embedded("[]".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.0)
    }
}
