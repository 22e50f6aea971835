//! Extraction of partially-populated items from listing-page rows.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{child_element_count, imdb_id, split_aka, text_of, top_level_rows, ExtractionError};
use super::types::Item;

static BROWSE_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table#browse").expect("valid selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td span a").expect("valid selector"));
static TITLE_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td span a b").expect("valid selector"));
static CELL_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td > a").expect("valid selector"));
static TYPE_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td div a img[width="40"]"#).expect("valid selector"));
static FLAG_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td > a > img").expect("valid selector"));

static ITEM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^details\.php\?id=(\d+)").expect("valid regex"));
static GENRE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"browse\.php\?genre=\d+").expect("valid regex"));

/// Extract the ordered item records from a listing page (search, browse or
/// history). The header row and one-cell separator rows are skipped; `files`
/// stays empty, listing rows never carry a file table.
pub fn extract_rows(document: &Html) -> Result<Vec<Item>, ExtractionError> {
    let table = document
        .select(&BROWSE_TABLE)
        .next()
        .ok_or(ExtractionError::MissingResultsTable)?;

    let mut items = Vec::new();
    for row in top_level_rows(&table).into_iter().skip(1) {
        if child_element_count(&row) == 1 {
            continue;
        }
        items.push(extract_row(&row)?);
    }
    debug!(items = items.len(), "Extracted listing rows");
    Ok(items)
}

fn extract_row(row: &ElementRef) -> Result<Item, ExtractionError> {
    let detail_link = row
        .select(&TITLE_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or(ExtractionError::MissingItemLink)?;
    let id = ITEM_ID_RE
        .captures(detail_link)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
        .ok_or_else(|| ExtractionError::MalformedItemLink(detail_link.to_string()))?;

    let mut item = Item::new(id);
    item.imdb_id = imdb_id(row);

    if let Some(bold) = row.select(&TITLE_TEXT).next() {
        let title = text_of(&bold);
        if !title.is_empty() {
            // Listing rows only ever use the uppercase separator.
            let (orig, aka) = split_aka(&title, &[" AKA "]);
            item.orig_title = Some(orig);
            item.aka_title = aka;
        }
    }

    // Positional contract inherited from the site's markup: the first plain
    // link in the row is the director, the second is the year.
    let links: Vec<ElementRef> = row.select(&CELL_LINK).collect();
    item.director = links.first().map(text_of).filter(|t| !t.is_empty());
    item.year = links.get(1).map(text_of).filter(|t| !t.is_empty());

    item.genres = links
        .iter()
        .filter(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| GENRE_RE.is_match(href))
        })
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect();

    item.media_type = row
        .select(&TYPE_IMG)
        .next()
        .and_then(|img| img.value().attr("title"))
        .map(|title| title.split(':').next().unwrap_or(title).to_string());

    item.country = row
        .select(&FLAG_IMG)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(str::to_string);

    Ok(item)
}
