//! Extraction of a full item record from one detail page.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::types::{DetailPage, Item, TorrentRef};
use super::{child_element_count, imdb_id, split_aka, text_of, top_level_rows, ExtractionError};

static PAGE_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid selector"));
static DETAILS_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"table[width="750"]"#).expect("valid selector"));
static ROWHEAD_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.rowhead").expect("valid selector"));
static HEADING_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.heading").expect("valid selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));
static LEFT_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[align="left"]"#).expect("valid selector"));
static FILE_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[align="left"] > table.main"#).expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));

// "KG - <title> (<year>)<suffix>"; the alternate title, when the site has
// one, trails the year inside the suffix.
static PAGE_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^KG - (.*) \((.*)\)(.*)$").expect("valid regex"));

/// Extract one item's record from its detail page, along with the captured
/// torrent-name row and inline file table for the file-list resolver.
pub fn extract_details(document: &Html, id: u32) -> Result<DetailPage, ExtractionError> {
    let raw_title = document
        .select(&PAGE_TITLE)
        .next()
        .map(|t| text_of(&t))
        .unwrap_or_default();
    let caps = PAGE_TITLE_RE
        .captures(&raw_title)
        .ok_or_else(|| ExtractionError::UnexpectedTitle(raw_title.clone()))?;

    let mut item = Item::new(id);

    // The AKA alternate may sit either inside the captured title or after
    // the year, so the split looks at title and suffix together. Detail
    // pages use both separator spellings.
    let head = caps.get(1).map_or("", |m| m.as_str());
    let suffix = caps.get(3).map_or("", |m| m.as_str());
    let combined = format!("{head}{suffix}");
    let (orig, aka) = split_aka(&combined, &[" aka ", " AKA "]);
    if aka.is_some() {
        item.orig_title = Some(orig);
        item.aka_title = aka;
    } else {
        item.orig_title = Some(head.trim().to_string());
    }

    let table = document
        .select(&DETAILS_TABLE)
        .next()
        .ok_or(ExtractionError::MissingDetailsTable)?;

    let mut torrent = None;
    for row in top_level_rows(&table) {
        if child_element_count(&row) == 1 {
            continue;
        }

        if row.select(&ROWHEAD_CELL).next().is_some() {
            // Torrent-name row: display filename plus download link.
            if let Some(anchor) = row.select(&ANCHOR).next() {
                if let Some(href) = anchor.value().attr("href") {
                    torrent = Some(TorrentRef {
                        name: text_of(&anchor),
                        href: href.to_string(),
                    });
                }
            }
            continue;
        }

        let Some(heading_cell) = row.select(&HEADING_CELL).next() else {
            continue;
        };
        let first_link_text = || row.select(&ANCHOR).next().map(|a| text_of(&a));
        let left_cell_text = || row.select(&LEFT_CELL).next().map(|td| text_of(&td));

        match text_of(&heading_cell).as_str() {
            "Internet Link" => item.imdb_id = imdb_id(&row),
            "Director / Artist" => item.director = first_link_text(),
            "Year" => item.year = first_link_text(),
            "Genres" => {
                item.genres = row
                    .select(&ANCHOR)
                    .map(|a| text_of(&a))
                    .filter(|t| !t.is_empty())
                    .collect();
            }
            "Language" => item.language = left_cell_text(),
            "Source" => item.source = left_cell_text(),
            // Subtitles conflate embedded and external encodings on the
            // page; deliberately not extracted.
            "Subtitles" => {}
            _ => {}
        }
    }

    let inline_files = table.select(&FILE_TABLE).next().map(|file_table| {
        top_level_rows(&file_table)
            .into_iter()
            .skip(1)
            .filter_map(|row| row.select(&CELL).next().map(|td| text_of(&td)))
            .collect::<Vec<_>>()
    });

    debug!(
        id,
        has_torrent_row = torrent.is_some(),
        has_inline_files = inline_files.is_some(),
        "Extracted detail page"
    );

    Ok(DetailPage {
        item,
        torrent,
        inline_files,
    })
}
