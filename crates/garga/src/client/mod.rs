//! Client facade composing the extraction pipeline behind three operations:
//! [`KgClient::get_item`], [`KgClient::search`] and [`KgClient::get_snatched`].

mod transport;

pub use transport::{
    HttpTransport, TrackerTransport, TransportError, BROWSE_SCRIPT, DETAILS_SCRIPT,
    HISTORY_SCRIPT, LOGIN_SCRIPT,
};

use std::sync::Arc;

use scraper::Html;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheError, ItemCache, SqliteItemCache};
use crate::config::TrackerConfig;
use crate::extract::{self, ExtractionError, FileResolveError, Item, MediaFilter};
use crate::markup::{self, MarkupError};
use crate::pagination::{self, PaginationError};

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    FileResolve(#[from] FileResolveError),

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("No user id available for history listing")]
    NoUserId,
}

/// Options for [`KgClient::search`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Tracker-side search type parameter.
    pub search_type: String,
    /// Media-type filter applied to extracted rows; never defaulted silently.
    pub filter: MediaFilter,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_type: "torrent".to_string(),
            filter: MediaFilter::All,
        }
    }
}

/// Tracker metadata client.
///
/// All fetching is strictly sequential: one request completes before the
/// next is issued, both within a pagination crawl and between the detail
/// fetch and the torrent-blob fetch.
pub struct KgClient {
    transport: Arc<dyn TrackerTransport>,
    cache: Option<Arc<dyn ItemCache>>,
}

impl KgClient {
    /// Log in to the tracker and build a client, opening the cache database
    /// when the configuration names one.
    pub async fn connect(config: &TrackerConfig) -> Result<Self, ClientError> {
        let transport = Arc::new(HttpTransport::login(config).await?);
        let cache: Option<Arc<dyn ItemCache>> = match &config.cache_path {
            Some(path) => Some(Arc::new(SqliteItemCache::new(path)?)),
            None => None,
        };
        Ok(Self { transport, cache })
    }

    /// Build a client on an existing transport and cache. This is how tests
    /// wire in the mock transport.
    pub fn with_transport(
        transport: Arc<dyn TrackerTransport>,
        cache: Option<Arc<dyn ItemCache>>,
    ) -> Self {
        Self { transport, cache }
    }

    /// Fetch one item's full record, files resolved.
    ///
    /// Read-through/write-through against the cache: a cached record is
    /// returned as-is; any cache retrieval failure falls back to a live
    /// fetch followed by a store. Cache trouble is never a hard failure.
    pub async fn get_item(&self, id: u32) -> Result<Item, ClientError> {
        if let Some(cache) = &self.cache {
            match cache.retrieve(id) {
                Ok(item) => {
                    debug!(id, "Item served from cache");
                    return Ok(item);
                }
                Err(CacheError::NotFound(_)) => {}
                Err(e) => {
                    warn!(id, error = %e, "Cache retrieval failed, fetching live");
                }
            }
        }

        let item = self.fetch_item(id).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&item) {
                warn!(id, error = %e, "Failed to store item in cache");
            }
        }
        Ok(item)
    }

    /// Run a search and return the extracted rows from every result page.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<Item>, ClientError> {
        let params = [
            ("search", query.to_string()),
            ("search_type", options.search_type.clone()),
            ("incldead", "0".to_string()),
        ];
        let items = self.crawl_listing(BROWSE_SCRIPT, &params).await?;
        Ok(items
            .into_iter()
            .filter(|item| options.filter.keeps(item))
            .collect())
    }

    /// All items snatched by a user, defaulting to the logged-in user.
    pub async fn get_snatched(
        &self,
        user_id: Option<u32>,
        filter: MediaFilter,
    ) -> Result<Vec<Item>, ClientError> {
        let user_id = user_id
            .or_else(|| self.transport.user_id())
            .ok_or(ClientError::NoUserId)?;
        let params = [
            ("id", user_id.to_string()),
            ("rcompsort", "1".to_string()),
        ];
        let items = self.crawl_listing(HISTORY_SCRIPT, &params).await?;
        Ok(items.into_iter().filter(|item| filter.keeps(item)).collect())
    }

    async fn fetch_item(&self, id: u32) -> Result<Item, ClientError> {
        debug!(id, "Fetching item detail page");
        let bytes = self
            .transport
            .get(
                DETAILS_SCRIPT,
                &[("id", id.to_string()), ("filelist", "1".to_string())],
            )
            .await?;
        let document = markup::normalize(&bytes)?;
        let page = extract::extract_details(&document, id)?;

        let (files, _source) = extract::resolve_files(&page, self.transport.as_ref()).await?;
        let mut item = page.item;
        item.files = files;
        Ok(item)
    }

    /// Sequential pagination crawl: fetch page 0, discover the page bound
    /// from its navigation links, then fetch one page at a time through the
    /// bound, concatenating rows in page order.
    async fn crawl_listing(
        &self,
        script: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Item>, ClientError> {
        let first = self.fetch_listing_page(script, params, 0).await?;
        let last = pagination::max_page(&first)?;
        debug!(script, last_page = last, "Discovered listing page bound");

        let mut items = extract::extract_rows(&first)?;
        for page in 1..=last {
            let document = self.fetch_listing_page(script, params, page).await?;
            items.extend(extract::extract_rows(&document)?);
        }
        Ok(items)
    }

    async fn fetch_listing_page(
        &self,
        script: &str,
        params: &[(&str, String)],
        page: u32,
    ) -> Result<Html, ClientError> {
        let mut params = params.to_vec();
        params.push(("page", page.to_string()));
        let bytes = self.transport.get(script, &params).await?;
        Ok(markup::normalize(&bytes)?)
    }
}
