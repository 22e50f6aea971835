//! Types shared across the extraction pipeline.

use serde::{Deserialize, Serialize};

/// One film/media entry on the tracker.
///
/// `id` is the only stable identity; every other field is populated on a
/// best-effort basis from whichever page shape the record came from, and is
/// independently absent when the corresponding page section is missing or
/// unparseable. A fresh record is produced on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Tracker-assigned id, the primary identity.
    pub id: u32,
    /// IMDb cross-reference, when discoverable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<u32>,
    /// Original title; the part before the AKA separator when one occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_title: Option<String>,
    /// Alternate title; set if and only if the source title split on an
    /// AKA separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aka_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    /// Release year, kept as the page's text rather than a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Site taxonomy tags in page order; duplicates are kept.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Source medium (DVD, VHS, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Classification tag ("Movie", ...), exposed on listing rows only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Relative file paths in torrent order; empty until resolved.
    #[serde(default)]
    pub files: Vec<String>,
}

impl Item {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// The torrent-name row captured from a detail page: display filename and
/// download href, kept for the file-list resolver's fallback tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentRef {
    pub name: String,
    pub href: String,
}

/// Everything extracted from one detail page, before file resolution.
#[derive(Debug, Clone)]
pub struct DetailPage {
    pub item: Item,
    /// Torrent-name row, when the page had one.
    pub torrent: Option<TorrentRef>,
    /// Rows of the inline file table, when the page had one.
    pub inline_files: Option<Vec<String>>,
}

/// Media-type filtering for listing results.
///
/// The tracker mixes films, music and ebooks in one results table; callers
/// choose explicitly whether non-film rows are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFilter {
    #[default]
    All,
    MoviesOnly,
}

impl MediaFilter {
    pub fn keeps(&self, item: &Item) -> bool {
        match self {
            MediaFilter::All => true,
            MediaFilter::MoviesOnly => item.media_type.as_deref() == Some("Movie"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_filter_all_keeps_everything() {
        let mut item = Item::new(1);
        assert!(MediaFilter::All.keeps(&item));
        item.media_type = Some("Music".to_string());
        assert!(MediaFilter::All.keeps(&item));
    }

    #[test]
    fn test_media_filter_movies_only() {
        let mut item = Item::new(1);
        assert!(!MediaFilter::MoviesOnly.keeps(&item));
        item.media_type = Some("Music".to_string());
        assert!(!MediaFilter::MoviesOnly.keeps(&item));
        item.media_type = Some("Movie".to_string());
        assert!(MediaFilter::MoviesOnly.keeps(&item));
    }

    #[test]
    fn test_item_serialization_skips_absent_fields() {
        let item = Item::new(42);
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("imdb_id"));
        assert!(!json.contains("director"));

        let parsed: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
    }
}
