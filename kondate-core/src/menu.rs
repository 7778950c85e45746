//! Menu page parser.
//!
//! An order's menu page lists the meals currently locked in for that
//! delivery. The reminder message quotes them so the reader can decide
//! whether the lineup is worth changing before the deadline passes.

use log::info;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

const MENU_CELL: &str = "dl.foodArray";
const NO_DELIVERY: &str = "span.no-delivery";
const MODAL_ANCHOR: &str = "a.modalOpenButton";
const MENU_NAME: &str = "p.name";
const MENU_COUNT: &str = "span.count";

/// Modal id prefix carrying the menu id, e.g. `#modal-181`.
const MODAL_PREFIX: &str = "#modal-";

static CELL_SEL: Lazy<Selector> = Lazy::new(|| menu_selector(MENU_CELL));
static NO_DELIVERY_SEL: Lazy<Selector> = Lazy::new(|| menu_selector(NO_DELIVERY));
static ANCHOR_SEL: Lazy<Selector> = Lazy::new(|| menu_selector(MODAL_ANCHOR));
static IMG_SEL: Lazy<Selector> = Lazy::new(|| menu_selector("img"));
static NAME_SEL: Lazy<Selector> = Lazy::new(|| menu_selector(MENU_NAME));
static COUNT_SEL: Lazy<Selector> = Lazy::new(|| menu_selector(MENU_COUNT));

fn menu_selector(css: &str) -> Selector {
    // Only called on the class constants above
    Selector::parse(css).expect("menu selectors are valid CSS")
}

/// Nutrition facts of one menu item, read from the cell's data attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Nutrition {
    pub sugar: f64,
    pub salinity: f64,
    pub calorie: f64,
    pub protein: f64,
    pub fiber: f64,
    pub lipid: f64,
}

/// One menu item on an order's menu page.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub nutrition: Nutrition,
    pub image_url: Option<String>,
    /// How many units of this meal the order contains.
    pub count: u32,
}

impl Menu {
    /// Human-readable reminder line: name, unit count, and detail URL.
    pub fn pretty(&self, base_url: &str) -> String {
        format!("{} {}食 {}/menu/detail/{}", self.name, self.count, base_url, self.id)
    }
}

/// Parse an order's menu page into its menu items.
///
/// Cells flagged as not-delivered and malformed cells are skipped
/// individually (logged); a page with no cells yields an empty list rather
/// than an error.
pub fn parse_menu_page(html: &str) -> Vec<Menu> {
    let doc = Html::parse_document(html);

    doc.select(&CELL_SEL)
        .filter(|cell| !flagged_no_delivery(*cell))
        .filter_map(|cell| match menu_item(cell) {
            Ok(menu) => Some(menu),
            Err(err) => {
                info!("dropping menu cell: {err}");
                None
            }
        })
        .collect()
}

fn flagged_no_delivery(cell: ElementRef<'_>) -> bool {
    cell.select(&NO_DELIVERY_SEL)
        .next()
        .is_some_and(|span| !span.text().collect::<String>().trim().is_empty())
}

#[derive(Error, Debug)]
enum MenuCellError {
    #[error("no modal anchor")]
    NoAnchor,
    #[error("modal id {0:?} does not carry a menu id")]
    BadMenuId(String),
    #[error("unit count {0:?} is not a number")]
    BadCount(String),
    #[error("nutrition attribute {0} {1:?} is not a number")]
    BadNutrition(&'static str, String),
}

fn menu_item(cell: ElementRef<'_>) -> Result<Menu, MenuCellError> {
    let anchor = cell
        .select(&ANCHOR_SEL)
        .next()
        .ok_or(MenuCellError::NoAnchor)?;

    let modal_id = anchor
        .value()
        .attr("data-izimodal-open")
        .unwrap_or_default();
    let id: i64 = modal_id
        .strip_prefix(MODAL_PREFIX)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| MenuCellError::BadMenuId(modal_id.to_string()))?;

    let image_url = anchor
        .select(&IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    let name = cell
        .select(&NAME_SEL)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    // "2食" -> 2; an absent or empty count means a single unspecified unit
    // slot and stays 0, matching the dashboard's own rendering
    let count_text = cell
        .select(&COUNT_SEL)
        .next()
        .map(|span| span.text().collect::<String>())
        .unwrap_or_default();
    let count_text = count_text.trim().trim_end_matches('食');
    let count: u32 = if count_text.is_empty() {
        0
    } else {
        count_text
            .parse()
            .map_err(|_| MenuCellError::BadCount(count_text.to_string()))?
    };

    Ok(Menu {
        id,
        name,
        nutrition: nutrition(cell)?,
        image_url,
        count,
    })
}

/// Nutrition values sit as plain attributes on the cell, absent when the
/// dashboard has no figure for them.
fn nutrition(cell: ElementRef<'_>) -> Result<Nutrition, MenuCellError> {
    Ok(Nutrition {
        sugar: nutrition_attr(cell, "sugar")?,
        salinity: nutrition_attr(cell, "salinity")?,
        calorie: nutrition_attr(cell, "calories")?,
        protein: nutrition_attr(cell, "protein")?,
        fiber: nutrition_attr(cell, "fiber")?,
        lipid: nutrition_attr(cell, "lipid")?,
    })
}

fn nutrition_attr(cell: ElementRef<'_>, name: &'static str) -> Result<f64, MenuCellError> {
    let raw = cell.value().attr(name).unwrap_or("0");
    raw.parse()
        .map_err(|_| MenuCellError::BadNutrition(name, raw.to_string()))
}
