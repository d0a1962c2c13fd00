//! The online-availability dashboard: completion status of the 26 child-care
//! and nursing-care procedures across prefectures and municipalities.

use log::debug;

use crate::config::{CanvasSize, GeneratorConfig};
use crate::error::ReportError;
use crate::filter::Filter;
use crate::literal::Position;
use crate::page::{Grid, Page, PageBuilder};
use crate::query::DataSource;
use crate::report::{assemble, ReportDocument};
use crate::visual::{
    action_button, card, donut_chart, entity_card, multi_row_card, pivot_table, shape, slicer,
    textbox, DonutChart, Paragraph, PivotFields, TextRun, VisualContainer,
};

// Data model vocabulary

pub const STATUS_ENTITY: &str = "オンライン化状況";
pub const COMPLETION_ENTITY: &str = "完了状況";

pub const MEASURE_RATE: &str = "子育て介護26手続完了率";
pub const MEASURE_COMPLETED: &str = "子育て介護26手続完了自治体数";
pub const MEASURE_TOTAL: &str = "自治体数";
pub const MEASURE_STATUS_DISPLAY: &str = "ステータス表示";
pub const MEASURE_COMPLETION_VALUE: &str = "完了状況値";

pub const COLUMN_BLOCK: &str = "ブロック";
pub const COLUMN_PREFECTURE: &str = "都道府県";
pub const COLUMN_MUNICIPALITY: &str = "団体名";
pub const COLUMN_PROCEDURE: &str = "手続名";
pub const COLUMN_SUBCATEGORY: &str = "サブカテゴリ";
pub const COLUMN_STATUS: &str = "ステータス";
pub const COLUMN_ORDER: &str = "順序";

pub const CATEGORY_COMPLETE: &str = "完了";
pub const CATEGORY_INCOMPLETE: &str = "未完了";

pub const SUBCATEGORIES: [&str; 2] = ["ア.子育て関係", "イ.介護関係"];

pub const PREFECTURES: [&str; 47] = [
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
    "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県", "岐阜県",
    "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府", "兵庫県",
    "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県", "山口県",
    "徳島県", "香川県", "愛媛県", "高知県", "福岡県", "佐賀県", "長崎県",
    "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

pub const OVERVIEW_PAGE: &str = "ReportSection_page1";
pub const CARDS_PAGE: &str = "ReportSection_page2";
pub const DETAIL_PAGE: &str = "ReportSection_page3";

const TITLE: &str = "子育て・介護関係の26手続のオンライン化取組状況";

/// Outer page margin
const MARGIN: f64 = 40.0;
const TITLE_WIDTH: f64 = 1400.0;

const CARD_WIDTH: f64 = 220.0;
const CARD_HEIGHT: f64 = 140.0;
const CARD_GAP: f64 = 12.0;

/// Layout of the per-prefecture card page: as many 220x140 columns as fit
/// right of the margin, never fewer than one
pub fn prefecture_grid(canvas: &CanvasSize) -> Grid {
    let usable = canvas.width - MARGIN + CARD_GAP;
    let columns = (usable / (CARD_WIDTH + CARD_GAP)).floor().max(1.0) as usize;
    Grid {
        origin_x: MARGIN,
        origin_y: 110.0,
        columns,
        cell_width: CARD_WIDTH,
        cell_height: CARD_HEIGHT,
        gap: CARD_GAP,
    }
}

/// z-order bands: decoration below content below controls
const Z_BACKGROUND: f64 = 0.0;
const Z_CONTENT: f64 = 1000.0;
const Z_CONTROLS: f64 = 2000.0;

fn status_source() -> DataSource {
    DataSource::new("o", STATUS_ENTITY)
}

fn completion_source() -> DataSource {
    DataSource::new("k", COMPLETION_ENTITY)
}

fn header(prefix: &str, config: &GeneratorConfig, subtitle: Option<&str>) -> Vec<VisualContainer> {
    let palette = &config.palette;
    let mut runs = vec![TextRun::new(TITLE)
        .bold()
        .font_size("20pt")
        .color(&palette.header_text)];
    if let Some(sub) = subtitle {
        runs.push(
            TextRun::new(&format!("  {}", sub))
                .font_size("14pt")
                .color(&palette.header_text),
        );
    }
    vec![
        shape(
            &format!("{}_band", prefix),
            Position::new(0.0, 0.0, config.canvas.width, 80.0).with_z(Z_BACKGROUND),
            &palette.accent,
        ),
        textbox(
            &format!("{}_title", prefix),
            Position::new(MARGIN, 15.0, TITLE_WIDTH.min(config.canvas.width - 2.0 * MARGIN), 50.0)
                .with_z(Z_CONTENT),
            &[Paragraph::new(runs)],
        ),
    ]
}

/// Completion rate, completed count and total count side by side
fn summary_cards(prefix: &str, x: f64, y: f64, width: f64, height: f64) -> Vec<VisualContainer> {
    let src = status_source();
    [("rate", MEASURE_RATE), ("completed", MEASURE_COMPLETED), ("total", MEASURE_TOTAL)]
        .iter()
        .enumerate()
        .map(|(i, (suffix, measure))| {
            let pos = Position::new(x + i as f64 * (width + 20.0), y, width, height)
                .with_z(Z_CONTENT)
                .with_tab_order(i as i64);
            card(&format!("{}_card_{}", prefix, suffix), pos, &src, measure)
        })
        .collect()
}

/// Page 1: national overview
pub fn overview_page(config: &GeneratorConfig) -> Page {
    let canvas = &config.canvas;
    let status = status_source();
    let completion = completion_source();

    let donut = DonutChart {
        source: &completion,
        category: COLUMN_STATUS,
        value: MEASURE_COMPLETION_VALUE,
        order_by: Some(COLUMN_ORDER),
        colors: vec![
            (CATEGORY_COMPLETE, config.palette.accent.as_str()),
            (CATEGORY_INCOMPLETE, config.palette.neutral.as_str()),
        ],
    };
    let matrix = PivotFields {
        rows: vec![COLUMN_BLOCK, COLUMN_PREFECTURE],
        columns: vec![],
        values: vec![MEASURE_RATE, MEASURE_COMPLETED, MEASURE_TOTAL],
    };

    PageBuilder::new(OVERVIEW_PAGE, "都道府県一覧")
        .ordinal(0)
        .size(config.canvas.width, config.canvas.height)
        .background(&config.palette.page_background)
        .visuals(header("vc_p1", config, None))
        .visuals(summary_cards("vc_p1", 40.0, 100.0, 250.0, 80.0))
        .visual(donut_chart(
            "vc_p1_donut",
            Position::new(40.0, 200.0, 420.0, 420.0).with_z(Z_CONTENT),
            &donut,
        ))
        .visual(action_button(
            "vc_p1_nav_cards",
            Position::new(40.0, 640.0, 420.0, 40.0).with_z(Z_CONTROLS),
            "都道府県別カードを見る >",
            CARDS_PAGE,
        ))
        .visual(action_button(
            "vc_p1_nav_detail",
            Position::new(40.0, 700.0, 420.0, 40.0).with_z(Z_CONTROLS),
            "市区町村詳細を見る >",
            DETAIL_PAGE,
        ))
        .visual(multi_row_card(
            "vc_p1_pref_cards",
            Position::new(MARGIN, 760.0, 420.0, canvas.height - 760.0 - MARGIN).with_z(Z_CONTENT),
            &status,
            &[COLUMN_PREFECTURE],
            &[MEASURE_RATE, MEASURE_COMPLETED],
        ))
        .visual(pivot_table(
            "vc_p1_matrix",
            Position::new(490.0, 200.0, canvas.width - 490.0 - MARGIN, canvas.height - 220.0)
                .with_z(Z_CONTENT),
            &status,
            &matrix,
        ))
        .build()
}

/// One filtered card per prefecture, laid out on `grid`
pub fn prefecture_cards(prefectures: &[&str], grid: &Grid) -> Vec<VisualContainer> {
    let src = status_source();
    prefectures
        .iter()
        .enumerate()
        .map(|(i, pref)| {
            let pos = grid
                .cell(i)
                .with_z(Z_CONTENT)
                .with_tab_order(i as i64);
            entity_card(
                &format!("vc_p2_pref_{:02}", i + 1),
                pos,
                &src,
                MEASURE_RATE,
                COLUMN_PREFECTURE,
                pref,
            )
        })
        .collect()
}

/// Page 2: completion rate card for each prefecture
pub fn cards_page(config: &GeneratorConfig) -> Page {
    PageBuilder::new(CARDS_PAGE, "都道府県別カード")
        .ordinal(1)
        .size(config.canvas.width, config.canvas.height)
        .background(&config.palette.page_background)
        .visuals(header("vc_p2", config, Some("都道府県別完了率")))
        .visual(action_button(
            "vc_p2_back",
            Position::new(config.canvas.width - 240.0 - MARGIN, 22.0, 240.0, 36.0).with_z(Z_CONTROLS),
            "< 都道府県一覧に戻る",
            OVERVIEW_PAGE,
        ))
        .visuals(prefecture_cards(&PREFECTURES, &prefecture_grid(&config.canvas)))
        .build()
}

/// Page 3: procedure-by-municipality detail, limited to the two subcategories
pub fn detail_page(config: &GeneratorConfig) -> Page {
    let canvas = &config.canvas;
    let status = status_source();
    let matrix = PivotFields {
        rows: vec![COLUMN_SUBCATEGORY, COLUMN_PROCEDURE],
        columns: vec![COLUMN_MUNICIPALITY],
        values: vec![MEASURE_STATUS_DISPLAY],
    };

    PageBuilder::new(DETAIL_PAGE, "市区町村詳細")
        .ordinal(2)
        .size(config.canvas.width, config.canvas.height)
        .filter(Filter::categorical("filter_subcat", &status, COLUMN_SUBCATEGORY, &SUBCATEGORIES).hidden())
        .visual(action_button(
            "vc_p3_back",
            Position::new(20.0, 20.0, 240.0, 36.0).with_z(Z_CONTROLS),
            "< 都道府県一覧に戻る",
            OVERVIEW_PAGE,
        ))
        .visual(slicer(
            "vc_p3_slicer_pref",
            Position::new(20.0, 70.0, 280.0, 55.0).with_z(Z_CONTROLS),
            &status,
            COLUMN_PREFECTURE,
            COLUMN_PREFECTURE,
        ))
        .visual(slicer(
            "vc_p3_slicer_muni",
            Position::new(320.0, 70.0, 280.0, 55.0).with_z(Z_CONTROLS),
            &status,
            COLUMN_MUNICIPALITY,
            COLUMN_MUNICIPALITY,
        ))
        .visuals(summary_cards("vc_p3", 620.0, 70.0, 200.0, 55.0))
        .visual(pivot_table(
            "vc_p3_matrix",
            Position::new(20.0, 140.0, canvas.width - 40.0, canvas.height - 160.0).with_z(Z_CONTENT),
            &status,
            &matrix,
        ))
        .build()
}

/// Visuals that are empty or reach past the page edge
pub fn misplaced_visuals(page: &Page) -> Vec<&VisualContainer> {
    page.visual_containers
        .iter()
        .filter(|vc| {
            let pos = vc.position();
            pos.width <= 0.0 || pos.height <= 0.0 || !pos.fits_within(page.width, page.height)
        })
        .collect()
}

/// Build the full report from static vocabulary and the given settings.
/// Fails when the canvas is too small to hold the layout.
pub fn build_report(config: &GeneratorConfig) -> Result<ReportDocument, ReportError> {
    let pages = vec![overview_page(config), cards_page(config), detail_page(config)];
    let mut misplaced = 0;
    for page in &pages {
        debug!(
            "page '{}' ({}): {} visuals",
            page.display_name,
            page.name,
            page.visual_containers.len()
        );
        misplaced += misplaced_visuals(page).len();
    }
    if misplaced > 0 {
        return Err(ReportError::Config(format!(
            "canvas {}x{} too small: {} visuals fall outside the page",
            config.canvas.width, config.canvas.height, misplaced
        )));
    }
    Ok(assemble(&config.theme, pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn visual_configs(page: &Page) -> Vec<Value> {
        page.visual_containers
            .iter()
            .map(|vc| vc.config.parse().unwrap())
            .collect()
    }

    fn find<'a>(configs: &'a [Value], name: &str) -> &'a Value {
        configs
            .iter()
            .find(|c| c["name"] == name)
            .unwrap_or_else(|| panic!("no visual named {}", name))
    }

    #[test]
    fn test_three_pages_in_order() {
        let report = build_report(&GeneratorConfig::default()).unwrap();
        let names: Vec<&str> = report.sections.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![OVERVIEW_PAGE, CARDS_PAGE, DETAIL_PAGE]);
        let ordinals: Vec<i64> = report.sections.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn test_overview_cards_and_donut() {
        let page = overview_page(&GeneratorConfig::default());
        let configs = visual_configs(&page);

        let total = find(&configs, "vc_p1_card_total");
        assert_eq!(total["singleVisual"]["visualType"], "card");
        assert_eq!(total["singleVisual"]["prototypeQuery"]["Select"][0]["Name"], "o.自治体数");

        let donut = find(&configs, "vc_p1_donut");
        assert_eq!(donut["singleVisual"]["prototypeQuery"]["From"][0]["Entity"], COMPLETION_ENTITY);
        let points = donut["singleVisual"]["objects"]["dataPoint"].as_array().unwrap();
        assert_eq!(points.len(), 2);
    }

    fn default_grid() -> Grid {
        prefecture_grid(&CanvasSize::default())
    }

    #[test]
    fn test_prefecture_cards_are_filtered_individually() {
        let cards = prefecture_cards(&PREFECTURES, &default_grid());
        assert_eq!(cards.len(), 47);
        for (vc, pref) in cards.iter().zip(PREFECTURES.iter()) {
            let filters = vc.filters.parse().unwrap();
            let right = &filters[0]["filter"]["Where"][0]["Condition"]["Comparison"]["Right"];
            assert_eq!(right["Literal"]["Value"], format!("'{}'", pref));
        }
    }

    #[test]
    fn test_prefecture_cards_follow_grid() {
        let grid = default_grid();
        assert_eq!(grid.columns, 8);
        let cards = prefecture_cards(&PREFECTURES, &grid);
        for (i, vc) in cards.iter().enumerate() {
            assert_eq!(vc.x, 40.0 + (i % 8) as f64 * 232.0);
            assert_eq!(vc.y, 110.0 + (i / 8) as f64 * 152.0);
        }
        let last = cards.last().unwrap().position();
        assert!(last.fits_within(1920.0, 1080.0));
    }

    #[test]
    fn test_detail_page_filter() {
        let page = detail_page(&GeneratorConfig::default());
        let filters = page.filters.parse().unwrap();
        assert_eq!(filters[0]["type"], "Categorical");
        assert_eq!(filters[0]["isHiddenInViewMode"], true);
        let values = filters[0]["filter"]["Where"][0]["Condition"]["In"]["Values"]
            .as_array()
            .unwrap();
        let literals: Vec<&str> = values
            .iter()
            .map(|v| v[0]["Literal"]["Value"].as_str().unwrap())
            .collect();
        assert_eq!(literals, vec!["'ア.子育て関係'", "'イ.介護関係'"]);
    }

    fn assert_fits(config: &GeneratorConfig) {
        let report = build_report(config).unwrap();
        for page in &report.sections {
            assert_eq!((page.width, page.height), (config.canvas.width, config.canvas.height));
            for vc in &page.visual_containers {
                assert!(
                    vc.position().fits_within(page.width, page.height),
                    "{} has a visual outside the canvas: {:?}",
                    page.name,
                    vc.position()
                );
            }
        }
    }

    #[test]
    fn test_all_visuals_fit_canvas() {
        assert_fits(&GeneratorConfig::default());

        let mut large = GeneratorConfig::default();
        large.canvas = CanvasSize {
            width: 2560.0,
            height: 1440.0,
        };
        assert_fits(&large);
        assert_eq!(prefecture_grid(&large.canvas).columns, 10);
    }

    #[test]
    fn test_layout_tracks_canvas_edges() {
        let mut config = GeneratorConfig::default();
        config.canvas = CanvasSize {
            width: 2560.0,
            height: 1440.0,
        };
        let report = build_report(&config).unwrap();
        let matrix = report.sections[2]
            .visual_containers
            .iter()
            .find(|vc| vc.config.parse().unwrap()["name"] == "vc_p3_matrix")
            .unwrap()
            .position();
        assert_eq!(matrix.right(), 2540.0);
        assert_eq!(matrix.bottom(), 1420.0);
    }

    #[test]
    fn test_small_canvas_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.canvas = CanvasSize {
            width: 1280.0,
            height: 720.0,
        };
        let err = build_report(&config).unwrap_err();
        match err {
            ReportError::Config(msg) => assert!(msg.contains("1280x720"), "{}", msg),
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn test_overview_lists_prefectures_in_multi_row_card() {
        let page = overview_page(&GeneratorConfig::default());
        let configs = visual_configs(&page);
        let list = find(&configs, "vc_p1_pref_cards");
        assert_eq!(list["singleVisual"]["visualType"], "multiRowCard");
        let select = list["singleVisual"]["prototypeQuery"]["Select"].as_array().unwrap();
        let names: Vec<&str> = select.iter().map(|s| s["Name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec!["o.都道府県", "o.子育て介護26手続完了率", "o.子育て介護26手続完了自治体数"]
        );
        assert!(misplaced_visuals(&page).is_empty());
    }

    #[test]
    fn test_palette_flows_into_visuals() {
        let mut config = GeneratorConfig::default();
        config.palette.accent = "#123456".to_string();
        let page = overview_page(&config);
        let configs = visual_configs(&page);
        let band = find(&configs, "vc_p1_band");
        assert_eq!(
            band["singleVisual"]["objects"]["fill"][0]["properties"]["fillColor"]["solid"]["color"]["expr"]
                ["Literal"]["Value"],
            "'#123456'"
        );
    }
}
