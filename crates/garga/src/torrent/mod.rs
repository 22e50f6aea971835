//! Torrent metainfo decoding - extracts file listings from .torrent blobs.
//!
//! Only the `info.name` / `info.files` portion of the metainfo dictionary is
//! of interest here; everything else (pieces, announce, ...) is skipped.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when decoding torrent metadata.
#[derive(Debug, Error)]
pub enum TorrentDecodeError {
    #[error("Malformed bencoded metadata: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct Metainfo {
    info: Info,
}

#[derive(Debug, Deserialize)]
struct Info {
    name: String,
    #[serde(default)]
    files: Option<Vec<FileEntry>>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    path: PathField,
}

/// The tracker's torrents encode a file path either as a list of path
/// components (the standard form) or as a plain string; both are accepted
/// and normalize to the same joined path.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PathField {
    Components(Vec<String>),
    Flat(String),
}

impl PathField {
    fn join(&self) -> String {
        match self {
            PathField::Components(parts) => parts.join("/"),
            PathField::Flat(path) => path.clone(),
        }
    }
}

/// Decode a bencoded metainfo blob into its ordered file path list.
///
/// Single-file torrents yield `[info.name]`; multi-file torrents yield
/// `info.name` joined with each entry's path, in listed order.
pub fn file_paths(blob: &[u8]) -> Result<Vec<String>, TorrentDecodeError> {
    let metainfo: Metainfo =
        serde_bencode::from_bytes(blob).map_err(|e| TorrentDecodeError::Malformed(e.to_string()))?;

    let name = metainfo.info.name;
    match metainfo.info.files {
        None => Ok(vec![name]),
        Some(entries) => Ok(entries
            .iter()
            .map(|entry| format!("{}/{}", name, entry.path.join()))
            .collect()),
    }
}
