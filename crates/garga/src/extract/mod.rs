//! Record extraction from normalized tracker pages.
//!
//! Two page shapes are understood: listing pages (search, browse, history)
//! whose rows yield partially-populated [`Item`]s, and per-item detail pages
//! which yield a full record plus the hooks the file-list resolver needs.
//!
//! Field positions and class names here mirror the site's markup verbatim.
//! Director and year in listing rows are positional (first and second plain
//! link in the row) because the page carries no semantic keys for them; that
//! fragility is inherited from the site and kept explicit.

mod details;
mod files;
mod listing;
mod types;

pub use details::extract_details;
pub use files::{resolve_files, FileListSource, FileResolveError};
pub use listing::extract_rows;
pub use types::*;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{ElementRef, Selector};
use thiserror::Error;

/// Errors raised when an expected structural element is absent.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Results table not found on listing page")]
    MissingResultsTable,

    #[error("Listing row carries no item detail link")]
    MissingItemLink,

    #[error("Malformed item detail link: {0}")]
    MalformedItemLink(String),

    #[error("Details table not found on detail page")]
    MissingDetailsTable,

    #[error("Page title {0:?} does not match the detail page pattern")]
    UnexpectedTitle(String),
}

static IMDB_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"img[alt="imdb link"]"#).expect("valid selector"));
static IMDB_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http://www\.imdb\.com/title/tt(\d+)").expect("valid regex"));

/// Collect an element's text content, trimmed.
fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Rows directly under a table element, looking through the `tbody` the
/// HTML5 parser inserts. Rows of nested tables are not included.
fn top_level_rows<'a>(table: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in table.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        match element.value().name() {
            "tr" => rows.push(element),
            "thead" | "tbody" | "tfoot" => {
                for inner in element.children() {
                    if let Some(row) = ElementRef::wrap(inner) {
                        if row.value().name() == "tr" {
                            rows.push(row);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    rows
}

/// Number of element children, used to recognize separator/spacer rows.
fn child_element_count(row: &ElementRef) -> usize {
    row.children().filter(|c| ElementRef::wrap(*c).is_some()).count()
}

/// Split a title on the first occurrence of any of the given AKA separators.
fn split_aka(title: &str, separators: &[&str]) -> (String, Option<String>) {
    for separator in separators {
        if let Some((orig, aka)) = title.split_once(separator) {
            return (orig.trim().to_string(), Some(aka.trim().to_string()));
        }
    }
    (title.trim().to_string(), None)
}

/// IMDb id from the anchor enclosing the "imdb link" icon, if the row has
/// one and it points at a recognized IMDb URL. Absence and malformed URLs
/// are tolerated, never an error.
fn imdb_id(row: &ElementRef) -> Option<u32> {
    let icon = row.select(&IMDB_IMG).next()?;
    let anchor = icon.parent().and_then(ElementRef::wrap)?;
    if anchor.value().name() != "a" {
        return None;
    }
    let href = anchor.value().attr("href")?;
    if !href.contains("http://www.imdb.com/") {
        return None;
    }
    IMDB_ID_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
}
