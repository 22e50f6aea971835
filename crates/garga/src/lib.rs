//! Metadata client for the Karagarga private tracker.
//!
//! The tracker exposes no API, only server-rendered HTML, so this crate is
//! built around an extraction pipeline: raw page bytes are repaired into a
//! queryable tree ([`markup`]), typed item records are extracted from listing
//! rows and detail pages ([`extract`]), torrent file listings are resolved
//! through a tiered fallback that can decode bencoded metadata ([`torrent`]),
//! and results are cached locally ([`cache`]) to keep load off the origin
//! site. [`client::KgClient`] composes the pipeline behind `get_item`,
//! `search` and `get_snatched`.

pub mod cache;
pub mod client;
pub mod config;
pub mod extract;
pub mod markup;
pub mod pagination;
pub mod testing;
pub mod torrent;

pub use cache::{CacheError, ItemCache, SqliteItemCache};
pub use client::{
    ClientError, HttpTransport, KgClient, SearchOptions, TrackerTransport, TransportError,
};
pub use config::{load_config, load_config_from_str, ConfigError, TrackerConfig};
pub use extract::{ExtractionError, FileResolveError, Item, MediaFilter, TorrentRef};
pub use markup::MarkupError;
pub use pagination::PaginationError;
pub use torrent::TorrentDecodeError;
