//! Page-bound discovery for multi-page listings.
//!
//! Listing pages render their navigation as plain links carrying a `page=`
//! query parameter; the crawl bound is the largest page number any of them
//! mentions. The crawl loop itself lives in the client, which fetches pages
//! strictly one at a time.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{Html, Selector};
use thiserror::Error;

static NAV_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("p a").expect("valid selector"));
static PAGE_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.php\?.*page=(\d+)").expect("valid regex"));

/// Errors raised during page-bound discovery.
#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("No navigation links with a page parameter found")]
    NoPageLinks,
}

/// The largest page number referenced by the page's navigation links.
///
/// Fails when no navigation link carries a `page=` parameter - without one
/// the crawl bound cannot be determined.
pub fn max_page(document: &Html) -> Result<u32, PaginationError> {
    document
        .select(&NAV_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| PAGE_PARAM_RE.captures(href))
        .filter_map(|caps| caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .max()
        .ok_or(PaginationError::NoPageLinks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::normalize;

    #[test]
    fn test_max_page_from_nav_links() {
        let doc = normalize(
            b"<html><body><p>\
              <a href=\"browse.php?search=x&amp;page=1\">1</a> \
              <a href=\"browse.php?search=x&amp;page=7\">7</a> \
              <a href=\"browse.php?search=x&amp;page=3\">3</a>\
              </p></body></html>",
        )
        .unwrap();
        assert_eq!(max_page(&doc).unwrap(), 7);
    }

    #[test]
    fn test_links_without_page_param_ignored() {
        let doc = normalize(
            b"<html><body><p>\
              <a href=\"details.php?id=42\">item</a> \
              <a href=\"history.php?id=9&amp;page=2\">2</a>\
              </p></body></html>",
        )
        .unwrap();
        assert_eq!(max_page(&doc).unwrap(), 2);
    }

    #[test]
    fn test_no_nav_links_is_an_error() {
        let doc = normalize(b"<html><body><p>no links here</p></body></html>").unwrap();
        assert!(matches!(max_page(&doc), Err(PaginationError::NoPageLinks)));
    }
}
