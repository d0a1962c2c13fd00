// Literal expression and style fragments shared by every visual builder

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Encode a string token: single-quoted, embedded quotes doubled.
pub fn encode_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub fn encode_bool(b: bool) -> String {
    let token = if b { "true" } else { "false" };
    token.to_string()
}

/// Integers carry the `L` (long) marker.
pub fn encode_int(n: i64) -> String {
    format!("{}L", n)
}

/// Floating point values carry the `D` (double) marker.
pub fn encode_double(n: f64) -> String {
    format!("{}D", n)
}

/// Bare literal node as used inside query conditions: `{"Literal": {"Value": ..}}`
pub fn literal_node(value: impl Into<String>) -> Value {
    json!({ "Literal": { "Value": value.into() } })
}

/// Wrap a pre-encoded token as a property expression
pub fn lit(value: impl Into<String>) -> Value {
    json!({ "expr": literal_node(value) })
}

pub fn lit_str(s: &str) -> Value {
    lit(encode_string(s))
}

pub fn lit_bool(b: bool) -> Value {
    lit(encode_bool(b))
}

pub fn lit_int(n: i64) -> Value {
    lit(encode_int(n))
}

pub fn lit_double(n: f64) -> Value {
    lit(encode_double(n))
}

/// Solid fill color, e.g. `solid_color("#0017C1")`
pub fn solid_color(hex: &str) -> Value {
    json!({ "solid": { "color": lit_str(hex) } })
}

/// A single `{properties: ...}` record list for one style key
pub fn props(properties: Value) -> Value {
    json!([{ "properties": properties }])
}

/// Absolute placement on the page canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
    pub height: f64,
    pub tab_order: i64,
}

impl Position {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            width,
            height,
            tab_order: 0,
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn with_tab_order(mut self, tab: i64) -> Self {
        self.tab_order = tab;
        self
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if the two rectangles share any interior area
    pub fn overlaps(&self, other: &Position) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True if the rectangle lies entirely inside a canvas of the given size
    pub fn fits_within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= width && self.bottom() <= height
    }
}

/// Title hidden, everything else left to the theme
pub fn minimal_vc_objects() -> Value {
    json!({
        "title": props(json!({ "show": lit_bool(false) })),
    })
}

/// Title, background, border and visual header all hidden
pub fn hidden_vc_objects() -> Value {
    json!({
        "title": props(json!({ "show": lit_bool(false) })),
        "background": props(json!({ "show": lit_bool(false) })),
        "border": props(json!({ "show": lit_bool(false) })),
        "visualHeader": props(json!({ "show": lit_bool(false) })),
    })
}

/// Visible title with the given text
pub fn titled_vc_objects(text: &str) -> Value {
    json!({
        "title": props(json!({
            "show": lit_bool(true),
            "text": lit_str(text),
        })),
    })
}
