//! Visual builders.
//!
//! Each builder returns a finished [`VisualContainer`]: the visual's
//! configuration (name, layout, type, query, styling) serialized into the
//! `config` blob, its visual-level filters serialized into `filters`, and the
//! placement repeated as plain numbers on the container itself.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::embedded::Embedded;
use crate::filter::{filters_value, Filter};
use crate::literal::{
    encode_string, hidden_vc_objects, lit, lit_bool, lit_str, literal_node, minimal_vc_objects,
    props, solid_color, titled_vc_objects, Position,
};
use crate::query::{DataSource, Projections, PrototypeQuery, SortDirection};

/// The placeable unit of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualContainer {
    pub config: Embedded,
    pub filters: Embedded,
    pub height: f64,
    pub width: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl VisualContainer {
    pub fn new(config: &Value, filters: &Value, pos: &Position) -> Self {
        Self {
            config: Embedded::from_value(config),
            filters: Embedded::from_value(filters),
            height: pos.height,
            width: pos.width,
            x: pos.x,
            y: pos.y,
            z: pos.z,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.width, self.height).with_z(self.z)
    }
}

/// Assemble the `{name, layouts, singleVisual}` config document
fn visual_config(name: &str, pos: &Position, visual_type: &str, body: Map<String, Value>) -> Value {
    let mut single = Map::new();
    single.insert("visualType".to_string(), json!(visual_type));
    single.extend(body);
    json!({
        "name": name,
        "layouts": [{ "id": 0, "position": pos }],
        "singleVisual": single,
    })
}

fn data_body(projections: Value, query: &PrototypeQuery, objects: Value, vc_objects: Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("projections".to_string(), projections);
    body.insert("prototypeQuery".to_string(), query.build());
    body.insert("objects".to_string(), objects);
    body.insert("vcObjects".to_string(), vc_objects);
    body
}

fn style_body(objects: Value, vc_objects: Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("objects".to_string(), objects);
    body.insert("vcObjects".to_string(), vc_objects);
    body
}

// =============================================================================
// Text
// =============================================================================

/// One run of uniformly styled text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextRun {
    pub value: String,
    pub bold: bool,
    pub font_size: Option<String>,
    pub color: Option<String>,
}

impl TextRun {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Font size in points, e.g. `"20pt"`
    pub fn font_size(mut self, size: &str) -> Self {
        self.font_size = Some(size.to_string());
        self
    }

    pub fn color(mut self, hex: &str) -> Self {
        self.color = Some(hex.to_string());
        self
    }

    fn to_value(&self) -> Value {
        let mut style = Map::new();
        if self.bold {
            style.insert("fontWeight".to_string(), json!("bold"));
        }
        if let Some(size) = &self.font_size {
            style.insert("fontSize".to_string(), json!(size));
        }
        if let Some(color) = &self.color {
            style.insert("color".to_string(), json!(color));
        }
        let mut run = Map::new();
        run.insert("value".to_string(), json!(self.value));
        if !style.is_empty() {
            run.insert("textStyle".to_string(), Value::Object(style));
        }
        Value::Object(run)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub alignment: Option<String>,
}

impl Paragraph {
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs, alignment: None }
    }

    pub fn align(mut self, alignment: &str) -> Self {
        self.alignment = Some(alignment.to_string());
        self
    }

    fn to_value(&self) -> Value {
        let mut p = Map::new();
        p.insert(
            "textRuns".to_string(),
            Value::Array(self.runs.iter().map(TextRun::to_value).collect()),
        );
        if let Some(a) = &self.alignment {
            p.insert("horizontalTextAlignment".to_string(), json!(a));
        }
        Value::Object(p)
    }
}

/// Static text. The paragraphs document is itself serialized and stored as
/// the value of a literal expression.
pub fn textbox(name: &str, pos: Position, paragraphs: &[Paragraph]) -> VisualContainer {
    let doc = json!({
        "paragraphs": paragraphs.iter().map(Paragraph::to_value).collect::<Vec<_>>(),
    });
    let objects = json!({
        "general": props(json!({ "paragraphs": lit(Embedded::from_value(&doc).as_str()) })),
    });
    let config = visual_config(name, &pos, "textbox", style_body(objects, hidden_vc_objects()));
    VisualContainer::new(&config, &json!([]), &pos)
}

// =============================================================================
// Data-bound visuals
// =============================================================================

/// Single measure value
pub fn card(name: &str, pos: Position, source: &DataSource, measure: &str) -> VisualContainer {
    let config = card_config(name, &pos, source, measure, minimal_vc_objects());
    VisualContainer::new(&config, &json!([]), &pos)
}

fn card_config(name: &str, pos: &Position, source: &DataSource, measure: &str, vc_objects: Value) -> Value {
    let query = PrototypeQuery::new(source).measure(measure);
    let projections = Projections::new()
        .role("Values", vec![query.query_ref(measure)])
        .build();
    let objects = json!({
        "categoryLabels": props(json!({ "show": lit_bool(false) })),
    });
    visual_config(name, pos, "card", data_body(projections, &query, objects, vc_objects))
}

/// A card showing `measure` for exactly one entity: the container carries a
/// visual-level filter `column == value`, and the entity value is the title.
pub fn entity_card(
    name: &str,
    pos: Position,
    source: &DataSource,
    measure: &str,
    column: &str,
    value: &str,
) -> VisualContainer {
    let config = card_config(name, &pos, source, measure, titled_vc_objects(value));
    let filter = Filter::equals(&format!("{}_filter", name), source, column, value).hidden();
    VisualContainer::new(&config, &filters_value(&[filter]), &pos)
}

/// Several columns and measures stacked per row
pub fn multi_row_card(
    name: &str,
    pos: Position,
    source: &DataSource,
    columns: &[&str],
    measures: &[&str],
) -> VisualContainer {
    let mut query = PrototypeQuery::new(source);
    let mut refs = Vec::new();
    for c in columns {
        query = query.column(c);
        refs.push(source.query_ref(c));
    }
    for m in measures {
        query = query.measure(m);
        refs.push(source.query_ref(m));
    }
    let projections = Projections::new().role("Values", refs).build();
    let config = visual_config(
        name,
        &pos,
        "multiRowCard",
        data_body(projections, &query, json!({}), minimal_vc_objects()),
    );
    VisualContainer::new(&config, &json!([]), &pos)
}

/// Donut chart over a two-row status lookup
#[derive(Debug, Clone)]
pub struct DonutChart<'a> {
    pub source: &'a DataSource,
    /// Category column, one slice per value
    pub category: &'a str,
    /// Measure giving slice size
    pub value: &'a str,
    /// Column defining slice order
    pub order_by: Option<&'a str>,
    /// Category value -> fill color
    pub colors: Vec<(&'a str, &'a str)>,
}

pub fn donut_chart(name: &str, pos: Position, spec: &DonutChart<'_>) -> VisualContainer {
    let mut query = PrototypeQuery::new(spec.source)
        .column(spec.category)
        .measure(spec.value);
    if let Some(order) = spec.order_by {
        query = query.order_by(order, SortDirection::Ascending);
    }
    let projections = Projections::new()
        .role("Category", vec![query.query_ref(spec.category)])
        .role("Y", vec![query.query_ref(spec.value)])
        .build();

    let data_points: Vec<Value> = spec
        .colors
        .iter()
        .map(|(category_value, hex)| {
            json!({
                "properties": { "fill": solid_color(hex) },
                "selector": {
                    "data": [{
                        "scopeId": {
                            "Comparison": {
                                "ComparisonKind": 0,
                                "Left": spec.source.entity_column(spec.category),
                                "Right": literal_node(encode_string(category_value)),
                            }
                        }
                    }]
                }
            })
        })
        .collect();

    let mut objects = Map::new();
    objects.insert("legend".to_string(), props(json!({ "show": lit_bool(true) })));
    if !data_points.is_empty() {
        objects.insert("dataPoint".to_string(), Value::Array(data_points));
    }

    let config = visual_config(
        name,
        &pos,
        "donutChart",
        data_body(projections, &query, Value::Object(objects), minimal_vc_objects()),
    );
    VisualContainer::new(&config, &json!([]), &pos)
}

/// Multi-select dropdown slicer on one column
pub fn slicer(name: &str, pos: Position, source: &DataSource, column: &str, title: &str) -> VisualContainer {
    let query = PrototypeQuery::new(source).column(column);
    let projections = Projections::new()
        .role("Values", vec![query.query_ref(column)])
        .build();
    let objects = json!({
        "general": props(json!({ "responsive": lit_bool(true) })),
        "data": props(json!({ "mode": lit_str("Dropdown") })),
        "selection": props(json!({ "singleSelect": lit_bool(false) })),
        "header": props(json!({ "show": lit_bool(false) })),
    });
    let config = visual_config(
        name,
        &pos,
        "slicer",
        data_body(projections, &query, objects, titled_vc_objects(title)),
    );
    VisualContainer::new(&config, &json!([]), &pos)
}

/// Fields of a pivot table. Rows and columns are columns, values are measures.
#[derive(Debug, Clone, Default)]
pub struct PivotFields<'a> {
    pub rows: Vec<&'a str>,
    pub columns: Vec<&'a str>,
    pub values: Vec<&'a str>,
}

/// Matrix with subtotals switched off
pub fn pivot_table(name: &str, pos: Position, source: &DataSource, fields: &PivotFields<'_>) -> VisualContainer {
    let mut query = PrototypeQuery::new(source);
    for c in fields.rows.iter().chain(fields.columns.iter()) {
        query = query.column(c);
    }
    for m in &fields.values {
        query = query.measure(m);
    }
    let refs = |names: &[&str]| names.iter().map(|n| source.query_ref(n)).collect::<Vec<_>>();

    let mut projections = Projections::new().role("Rows", refs(&fields.rows));
    if !fields.columns.is_empty() {
        projections = projections.role("Columns", refs(&fields.columns));
    }
    let projections = projections.role("Values", refs(&fields.values)).build();

    let objects = json!({
        "subTotals": props(json!({
            "rowSubtotals": lit_bool(false),
            "columnSubtotals": lit_bool(false),
        })),
    });
    let config = visual_config(
        name,
        &pos,
        "pivotTable",
        data_body(projections, &query, objects, minimal_vc_objects()),
    );
    VisualContainer::new(&config, &json!([]), &pos)
}

// =============================================================================
// Decoration and navigation
// =============================================================================

/// Filled rectangle with no outline
pub fn shape(name: &str, pos: Position, fill: &str) -> VisualContainer {
    let objects = json!({
        "shape": props(json!({ "tileShape": lit_str("rectangle") })),
        "fill": props(json!({
            "show": lit_bool(true),
            "fillColor": solid_color(fill),
        })),
        "outline": props(json!({ "show": lit_bool(false) })),
    });
    let config = visual_config(name, &pos, "shape", style_body(objects, hidden_vc_objects()));
    VisualContainer::new(&config, &json!([]), &pos)
}

/// Text button that navigates to another page by section name
pub fn action_button(name: &str, pos: Position, text: &str, destination: &str) -> VisualContainer {
    let objects = json!({
        "icon": props(json!({ "show": lit_bool(false) })),
        "outline": props(json!({ "show": lit_bool(false) })),
        "text": props(json!({
            "show": lit_bool(true),
            "text": lit_str(text),
        })),
        "action": props(json!({
            "type": lit_str("PageNavigation"),
            "destination": lit_str(destination),
        })),
    });
    let config = visual_config(name, &pos, "actionButton", style_body(objects, hidden_vc_objects()));
    VisualContainer::new(&config, &json!([]), &pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> DataSource {
        DataSource::new("o", "オンライン化状況")
    }

    fn parsed(vc: &VisualContainer) -> (Value, Value) {
        (vc.config.parse().unwrap(), vc.filters.parse().unwrap())
    }

    #[test]
    fn test_card() {
        let pos = Position::new(40.0, 90.0, 250.0, 80.0);
        let vc = card("vc_card", pos, &status(), "自治体数");
        let (config, filters) = parsed(&vc);

        assert_eq!(config["name"], "vc_card");
        assert_eq!(config["singleVisual"]["visualType"], "card");
        assert_eq!(config["singleVisual"]["prototypeQuery"]["Select"][0]["Name"], "o.自治体数");
        assert_eq!(config["singleVisual"]["projections"]["Values"][0]["queryRef"], "o.自治体数");
        assert_eq!(config["layouts"][0]["position"]["x"], 40.0);
        assert_eq!(filters, json!([]));
        assert_eq!((vc.x, vc.y, vc.width, vc.height), (40.0, 90.0, 250.0, 80.0));
    }

    #[test]
    fn test_entity_card_has_visual_filter() {
        let pos = Position::new(0.0, 0.0, 200.0, 120.0);
        let vc = entity_card("vc_pref_01", pos, &status(), "子育て介護26手続完了率", "都道府県", "北海道");
        let (config, filters) = parsed(&vc);

        assert_eq!(config["singleVisual"]["visualType"], "card");
        assert_eq!(
            config["singleVisual"]["vcObjects"]["title"][0]["properties"]["text"]["expr"]["Literal"]["Value"],
            "'北海道'"
        );
        let filters = filters.as_array().unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0]["name"], "vc_pref_01_filter");
        assert_eq!(
            filters[0]["filter"]["Where"][0]["Condition"]["Comparison"]["Right"]["Literal"]["Value"],
            "'北海道'"
        );
    }

    #[test]
    fn test_textbox_embeds_paragraphs() {
        let pos = Position::new(40.0, 20.0, 900.0, 50.0);
        let vc = textbox(
            "vc_title",
            pos,
            &[Paragraph::new(vec![TextRun::new("見出し").bold().font_size("20pt")])],
        );
        let (config, _) = parsed(&vc);
        assert_eq!(config["singleVisual"]["visualType"], "textbox");
        assert!(config["singleVisual"].get("prototypeQuery").is_none());

        let literal = config["singleVisual"]["objects"]["general"][0]["properties"]["paragraphs"]["expr"]
            ["Literal"]["Value"]
            .as_str()
            .unwrap();
        let doc: Value = serde_json::from_str(literal).unwrap();
        let run = &doc["paragraphs"][0]["textRuns"][0];
        assert_eq!(run["value"], "見出し");
        assert_eq!(run["textStyle"]["fontWeight"], "bold");
        assert_eq!(run["textStyle"]["fontSize"], "20pt");
    }

    #[test]
    fn test_donut_color_overrides() {
        let k = DataSource::new("k", "完了状況");
        let spec = DonutChart {
            source: &k,
            category: "ステータス",
            value: "完了状況値",
            order_by: Some("順序"),
            colors: vec![("完了", "#0017C1"), ("未完了", "#D9D9D9")],
        };
        let vc = donut_chart("vc_donut", Position::new(40.0, 190.0, 400.0, 400.0), &spec);
        let (config, _) = parsed(&vc);
        let sv = &config["singleVisual"];

        assert_eq!(sv["visualType"], "donutChart");
        assert_eq!(sv["projections"]["Category"][0]["queryRef"], "k.ステータス");
        assert_eq!(sv["projections"]["Y"][0]["queryRef"], "k.完了状況値");
        assert_eq!(sv["prototypeQuery"]["OrderBy"][0]["Expression"]["Column"]["Property"], "順序");

        let points = sv["objects"]["dataPoint"].as_array().unwrap();
        assert_eq!(points.len(), 2);
        let scope = &points[0]["selector"]["data"][0]["scopeId"]["Comparison"];
        assert_eq!(scope["Right"]["Literal"]["Value"], "'完了'");
        assert_eq!(scope["Left"]["Column"]["Expression"]["SourceRef"]["Entity"], "完了状況");
        assert_eq!(
            points[1]["properties"]["fill"]["solid"]["color"]["expr"]["Literal"]["Value"],
            "'#D9D9D9'"
        );
    }

    #[test]
    fn test_slicer() {
        let vc = slicer("vc_slicer", Position::new(20.0, 70.0, 280.0, 55.0), &status(), "団体名", "団体名");
        let (config, _) = parsed(&vc);
        let sv = &config["singleVisual"];
        assert_eq!(sv["visualType"], "slicer");
        assert_eq!(sv["objects"]["data"][0]["properties"]["mode"]["expr"]["Literal"]["Value"], "'Dropdown'");
        assert_eq!(sv["prototypeQuery"]["Select"][0]["Column"]["Property"], "団体名");
    }

    #[test]
    fn test_pivot_table_projections_match_selects() {
        let fields = PivotFields {
            rows: vec!["サブカテゴリ", "手続名"],
            columns: vec!["団体名"],
            values: vec!["ステータス表示"],
        };
        let vc = pivot_table("vc_matrix", Position::new(20.0, 140.0, 1880.0, 920.0), &status(), &fields);
        let (config, _) = parsed(&vc);
        let sv = &config["singleVisual"];

        assert_eq!(sv["visualType"], "pivotTable");
        assert_eq!(sv["projections"]["Rows"].as_array().unwrap().len(), 2);
        assert_eq!(sv["projections"]["Columns"][0]["queryRef"], "o.団体名");
        let names: Vec<&str> = sv["prototypeQuery"]["Select"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["Name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["o.サブカテゴリ", "o.手続名", "o.団体名", "o.ステータス表示"]);
    }

    #[test]
    fn test_pivot_table_without_columns() {
        let fields = PivotFields {
            rows: vec!["都道府県"],
            columns: vec![],
            values: vec!["自治体数"],
        };
        let vc = pivot_table("vc_m", Position::new(0.0, 0.0, 10.0, 10.0), &status(), &fields);
        let (config, _) = parsed(&vc);
        assert!(config["singleVisual"]["projections"].get("Columns").is_none());
    }

    #[test]
    fn test_shape_and_button_have_no_query() {
        let s = shape("vc_band", Position::new(0.0, 0.0, 1920.0, 80.0), "#0017C1");
        let (config, _) = parsed(&s);
        assert_eq!(config["singleVisual"]["visualType"], "shape");
        assert!(config["singleVisual"].get("prototypeQuery").is_none());

        let b = action_button("vc_back", Position::new(20.0, 20.0, 240.0, 36.0), "< 戻る", "ReportSection_page1");
        let (config, _) = parsed(&b);
        assert_eq!(config["singleVisual"]["visualType"], "actionButton");
        assert_eq!(
            config["singleVisual"]["objects"]["action"][0]["properties"]["destination"]["expr"]["Literal"]["Value"],
            "'ReportSection_page1'"
        );
    }

    #[test]
    fn test_multi_row_card() {
        let vc = multi_row_card(
            "vc_rows",
            Position::new(0.0, 0.0, 100.0, 100.0),
            &status(),
            &["都道府県"],
            &["自治体数"],
        );
        let (config, _) = parsed(&vc);
        let values = config["singleVisual"]["projections"]["Values"].as_array().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(config["singleVisual"]["prototypeQuery"]["Select"][1]["Measure"]["Property"], "自治体数");
    }
}
