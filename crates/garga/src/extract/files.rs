//! File-list resolution - an ordered list of strategies, first success wins.
//!
//! Detail pages expose a torrent's file listing in three inconsistent ways,
//! tried in a fixed order so the tie-break stays auditable:
//!
//! 1. the inline file table, when the page renders one;
//! 2. the torrent's display name, when it is itself a video filename;
//! 3. fetching and decoding the bencoded torrent metadata.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;
use tracing::debug;

use crate::client::{TrackerTransport, TransportError};
use crate::torrent::{self, TorrentDecodeError};

use super::types::DetailPage;

// Matches torrent display names that are a bare video file; the captured
// stem is then the torrent's single file.
static VIDEO_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*\.(?:avi|mkv))\.torrent$").expect("valid regex"));

/// Errors raised while resolving a file list.
#[derive(Debug, Error)]
pub enum FileResolveError {
    #[error("Detail page has no torrent download link to resolve files from")]
    NoTorrentLink,

    #[error("Failed to fetch torrent metadata: {0}")]
    Fetch(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] TorrentDecodeError),
}

/// Which strategy produced a file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileListSource {
    InlineTable,
    TorrentName,
    TorrentMetadata,
}

const STRATEGY_ORDER: [FileListSource; 3] = [
    FileListSource::InlineTable,
    FileListSource::TorrentName,
    FileListSource::TorrentMetadata,
];

/// Resolve a detail page's file list, trying each strategy in order and
/// short-circuiting on the first that applies. Decode failures in the
/// metadata tier surface to the caller, never silently swallowed.
pub async fn resolve_files(
    page: &DetailPage,
    transport: &dyn TrackerTransport,
) -> Result<(Vec<String>, FileListSource), FileResolveError> {
    for source in STRATEGY_ORDER {
        if let Some(files) = try_strategy(source, page, transport).await? {
            debug!(source = ?source, files = files.len(), "Resolved file list");
            return Ok((files, source));
        }
    }
    // The metadata tier either produces a list or errors.
    unreachable!("torrent metadata strategy always resolves or fails")
}

async fn try_strategy(
    source: FileListSource,
    page: &DetailPage,
    transport: &dyn TrackerTransport,
) -> Result<Option<Vec<String>>, FileResolveError> {
    match source {
        FileListSource::InlineTable => Ok(page.inline_files.clone()),
        FileListSource::TorrentName => Ok(page
            .torrent
            .as_ref()
            .and_then(|t| VIDEO_NAME_RE.captures(&t.name))
            .and_then(|caps| caps.get(1))
            .map(|stem| vec![stem.as_str().to_string()])),
        FileListSource::TorrentMetadata => {
            let torrent = page
                .torrent
                .as_ref()
                .ok_or(FileResolveError::NoTorrentLink)?;
            debug!(href = %torrent.href, "Fetching torrent metadata for file list");
            let blob = transport.get(&torrent.href, &[]).await?;
            Ok(Some(torrent::file_paths(&blob)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::types::{Item, TorrentRef};
    use crate::testing::MockTransport;

    fn page(inline: Option<Vec<String>>, torrent: Option<TorrentRef>) -> DetailPage {
        DetailPage {
            item: Item::new(1),
            torrent,
            inline_files: inline,
        }
    }

    fn torrent_ref(name: &str) -> TorrentRef {
        TorrentRef {
            name: name.to_string(),
            href: "down.php/1/release.torrent".to_string(),
        }
    }

    #[tokio::test]
    async fn test_inline_table_short_circuits() {
        // Transport has no pages configured: any fetch would fail, proving
        // the inline tier never reaches out.
        let transport = MockTransport::new();
        let page = page(
            Some(vec!["a.avi".to_string(), "b.avi".to_string()]),
            Some(torrent_ref("whole-release.avi.torrent")),
        );
        let (files, source) = resolve_files(&page, &transport).await.unwrap();
        assert_eq!(source, FileListSource::InlineTable);
        assert_eq!(files, vec!["a.avi", "b.avi"]);
        assert!(transport.recorded_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_video_torrent_name_short_circuits_metadata() {
        let transport = MockTransport::new();
        let page = page(None, Some(torrent_ref("Some Film (1968).avi.torrent")));
        let (files, source) = resolve_files(&page, &transport).await.unwrap();
        assert_eq!(source, FileListSource::TorrentName);
        assert_eq!(files, vec!["Some Film (1968).avi"]);
        assert!(transport.recorded_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_video_name_extension_case_insensitive() {
        let transport = MockTransport::new();
        let page = page(None, Some(torrent_ref("FILM.MKV.torrent")));
        let (files, source) = resolve_files(&page, &transport).await.unwrap();
        assert_eq!(source, FileListSource::TorrentName);
        assert_eq!(files, vec!["FILM.MKV"]);
    }

    #[tokio::test]
    async fn test_metadata_tier_decodes_blob() {
        let transport = MockTransport::new();
        transport
            .set_page(
                "down.php/1/release.torrent",
                &[],
                b"d4:infod5:filesld4:pathl5:a.avieed4:path5:b.aviee4:name7:Releaseee".to_vec(),
            )
            .await;
        let page = page(None, Some(torrent_ref("release.torrent")));
        let (files, source) = resolve_files(&page, &transport).await.unwrap();
        assert_eq!(source, FileListSource::TorrentMetadata);
        assert_eq!(files, vec!["Release/a.avi", "Release/b.avi"]);
    }

    #[tokio::test]
    async fn test_metadata_decode_failure_surfaces() {
        let transport = MockTransport::new();
        transport
            .set_page("down.php/1/release.torrent", &[], b"garbage".to_vec())
            .await;
        let page = page(None, Some(torrent_ref("release.torrent")));
        let result = resolve_files(&page, &transport).await;
        assert!(matches!(result, Err(FileResolveError::Decode(_))));
    }

    #[tokio::test]
    async fn test_no_torrent_link() {
        let transport = MockTransport::new();
        let page = page(None, None);
        let result = resolve_files(&page, &transport).await;
        assert!(matches!(result, Err(FileResolveError::NoTorrentLink)));
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces() {
        // No page configured for the href: the mock answers with an HTTP error.
        let transport = MockTransport::new();
        let page = page(None, Some(torrent_ref("release.torrent")));
        let result = resolve_files(&page, &transport).await;
        assert!(matches!(result, Err(FileResolveError::Fetch(_))));
    }
}
