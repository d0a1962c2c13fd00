use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::embedded::Embedded;
use crate::filter::{filters_value, Filter};
use crate::literal::{lit_double, props, solid_color, Position};
use crate::visual::VisualContainer;

/// `displayOption` value for "fit to page"
pub const DISPLAY_FIT_TO_PAGE: i64 = 1;

/// A report page ("section")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub config: Embedded,
    pub display_name: String,
    pub display_option: i64,
    pub filters: Embedded,
    pub height: f64,
    pub name: String,
    pub ordinal: i64,
    pub visual_containers: Vec<VisualContainer>,
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct PageBuilder {
    name: String,
    display_name: String,
    ordinal: i64,
    width: f64,
    height: f64,
    background: Option<String>,
    filters: Vec<Filter>,
    visuals: Vec<VisualContainer>,
}

impl PageBuilder {
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            ordinal: 0,
            width: 1920.0,
            height: 1080.0,
            background: None,
            filters: Vec::new(),
            visuals: Vec::new(),
        }
    }

    pub fn ordinal(mut self, ordinal: i64) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Solid page background color
    pub fn background(mut self, hex: &str) -> Self {
        self.background = Some(hex.to_string());
        self
    }

    /// Page-level filter, applied to every visual on the page
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn visual(mut self, visual: VisualContainer) -> Self {
        self.visuals.push(visual);
        self
    }

    pub fn visuals(mut self, visuals: impl IntoIterator<Item = VisualContainer>) -> Self {
        self.visuals.extend(visuals);
        self
    }

    fn config_value(&self) -> Value {
        let mut config = Map::new();
        if let Some(hex) = &self.background {
            config.insert(
                "objects".to_string(),
                json!({
                    "background": props(json!({
                        "color": solid_color(hex),
                        "transparency": lit_double(0.0),
                    })),
                }),
            );
        }
        Value::Object(config)
    }

    pub fn build(self) -> Page {
        Page {
            config: Embedded::from_value(&self.config_value()),
            display_name: self.display_name,
            display_option: DISPLAY_FIT_TO_PAGE,
            filters: Embedded::from_value(&filters_value(&self.filters)),
            height: self.height,
            name: self.name,
            ordinal: self.ordinal,
            visual_containers: self.visuals,
            width: self.width,
        }
    }
}

/// Fixed-size cells laid out left to right, top to bottom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub origin_x: f64,
    pub origin_y: f64,
    pub columns: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
}

impl Grid {
    /// Position of cell `index`
    pub fn cell(&self, index: usize) -> Position {
        grid_position(index, self)
    }

    /// Columns actually used; zero is treated as a single column
    pub fn effective_columns(&self) -> usize {
        self.columns.max(1)
    }

    pub fn rows_for(&self, count: usize) -> usize {
        count.div_ceil(self.effective_columns())
    }

    /// Width and height covered by `count` cells
    pub fn extent(&self, count: usize) -> (f64, f64) {
        let cols = count.min(self.effective_columns());
        let rows = self.rows_for(count);
        let span = |n: usize, size: f64| {
            if n == 0 {
                0.0
            } else {
                n as f64 * size + (n - 1) as f64 * self.gap
            }
        };
        (span(cols, self.cell_width), span(rows, self.cell_height))
    }
}

/// row = index / columns, col = index % columns;
/// x = origin_x + col * (w + gap), y = origin_y + row * (h + gap)
pub fn grid_position(index: usize, grid: &Grid) -> Position {
    let columns = grid.effective_columns();
    let row = index / columns;
    let col = index % columns;
    Position::new(
        grid.origin_x + col as f64 * (grid.cell_width + grid.gap),
        grid.origin_y + row as f64 * (grid.cell_height + grid.gap),
        grid.cell_width,
        grid.cell_height,
    )
}
