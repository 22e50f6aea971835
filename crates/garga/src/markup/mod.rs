//! Markup normalization - turns raw tracker pages into queryable trees.
//!
//! The tracker serves tag-soup HTML in several encodings; everything
//! downstream assumes a repaired tree it can run selectors against.

use scraper::Html;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while normalizing page markup.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("Page content is empty")]
    EmptyPage,
}

/// Repair raw page bytes into a queryable HTML tree.
///
/// The bytes are decoded as UTF-8 (lossily - the site mixes encodings for
/// non-ASCII titles) and parsed with a repairing HTML5 parser, so malformed
/// markup never fails outright. The one site quirk handled here explicitly:
/// certain titles contain a stray `0x15` control byte, which is substituted
/// with an underscore before parsing.
pub fn normalize(raw: &[u8]) -> Result<Html, MarkupError> {
    let text = String::from_utf8_lossy(raw);
    let text = text.replace('\u{15}', "_");

    if text.trim().is_empty() {
        return Err(MarkupError::EmptyPage);
    }

    let document = Html::parse_document(&text);
    if !document.errors.is_empty() {
        debug!(repairs = document.errors.len(), "Repaired malformed markup");
    }

    Ok(document)
}
