//! End-to-end client flows against the mock transport: detail fetch with
//! file resolution, cache read-through/write-through, the sequential
//! pagination crawl and history lookup.

use std::sync::Arc;

use garga::testing::fixtures::{
    detail_page, listing_page, listing_row, multi_file_torrent, DetailFixture, ListingRow,
};
use garga::testing::MockTransport;
use garga::{ClientError, KgClient, MediaFilter, SearchOptions, SqliteItemCache};

const BACH_TORRENT_NAME: &str = "Jean-Marie Straub(1968)-Chronicle of Anna Magdalena Bach \
                                 (Chronik der Anna Magdalena Bach)[93.DVD]{Ugo Pi.avi.torrent";

fn bach_detail() -> DetailFixture<'static> {
    DetailFixture {
        page_title:
            "KG - Chronik der Anna Magdalena Bach (1968) aka The Chronicle of Anna Magdalena Bach",
        torrent_name: Some(BACH_TORRENT_NAME),
        torrent_href: Some("down.php/10593/release.torrent"),
        imdb_id: Some(62759),
        director: Some("Jean-Marie Straub"),
        year: Some("1968"),
        genres: &["Arthouse", "Drama"],
        language: Some("German"),
        source: Some("DVD"),
        subtitles: Some("included"),
        inline_files: None,
    }
}

fn detail_params(id: u32) -> Vec<(&'static str, String)> {
    vec![("id", id.to_string()), ("filelist", "1".to_string())]
}

fn search_params(query: &str, page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("search", query.to_string()),
        ("search_type", "torrent".to_string()),
        ("incldead", "0".to_string()),
        ("page", page.to_string()),
    ]
}

fn movie_row(id: u32, title: &'static str) -> ListingRow<'static> {
    ListingRow {
        id,
        title,
        director: "Some Director",
        year: "1970",
        genres: &["Drama"],
        country: "France",
        media_type_title: "Movie: x",
        imdb_id: None,
    }
}

#[tokio::test]
async fn test_get_item_resolves_files_from_torrent_name() {
    let transport = Arc::new(MockTransport::new());
    transport
        .set_page("details.php", &detail_params(10593), detail_page(&bach_detail()))
        .await;
    let client = KgClient::with_transport(transport.clone(), None);

    let item = client.get_item(10593).await.unwrap();

    assert_eq!(item.id, 10593);
    assert_eq!(
        item.orig_title.as_deref(),
        Some("Chronik der Anna Magdalena Bach")
    );
    assert_eq!(
        item.aka_title.as_deref(),
        Some("The Chronicle of Anna Magdalena Bach")
    );
    assert_eq!(item.imdb_id, Some(62759));
    // The torrent's display name is itself a video filename, so the file
    // list is that name with the trailing .torrent removed and the blob is
    // never downloaded.
    assert_eq!(
        item.files,
        vec![BACH_TORRENT_NAME.strip_suffix(".torrent").unwrap()]
    );
    assert_eq!(transport.recorded_requests().await.len(), 1);
}

#[tokio::test]
async fn test_get_item_decodes_torrent_metadata_when_needed() {
    let transport = Arc::new(MockTransport::new());
    let fixture = DetailFixture {
        torrent_name: Some("release.torrent"),
        ..bach_detail()
    };
    transport
        .set_page("details.php", &detail_params(10593), detail_page(&fixture))
        .await;
    transport
        .set_page(
            "down.php/10593/release.torrent",
            &[],
            multi_file_torrent("Release", &["cd1.avi", "cd2.avi"]),
        )
        .await;
    let client = KgClient::with_transport(transport.clone(), None);

    let item = client.get_item(10593).await.unwrap();

    assert_eq!(item.files, vec!["Release/cd1.avi", "Release/cd2.avi"]);
    let requests = transport.recorded_requests().await;
    assert_eq!(
        requests,
        vec![
            "details.php?id=10593&filelist=1".to_string(),
            "down.php/10593/release.torrent".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_get_item_is_write_through_then_read_through() {
    let transport = Arc::new(MockTransport::new());
    transport
        .set_page("details.php", &detail_params(10593), detail_page(&bach_detail()))
        .await;
    let cache = Arc::new(SqliteItemCache::in_memory().unwrap());
    let client = KgClient::with_transport(transport.clone(), Some(cache));

    let fetched = client.get_item(10593).await.unwrap();
    let cached = client.get_item(10593).await.unwrap();

    assert_eq!(fetched, cached);
    // Second call was served from the cache: no further requests.
    assert_eq!(transport.recorded_requests().await.len(), 1);
}

#[tokio::test]
async fn test_search_crawls_pages_sequentially_in_order() {
    let transport = Arc::new(MockTransport::new());
    transport
        .set_page(
            "browse.php",
            &search_params("bach", 0),
            listing_page(&[listing_row(&movie_row(1, "First"))], &[1, 2]),
        )
        .await;
    transport
        .set_page(
            "browse.php",
            &search_params("bach", 1),
            listing_page(&[listing_row(&movie_row(2, "Second"))], &[1, 2]),
        )
        .await;
    transport
        .set_page(
            "browse.php",
            &search_params("bach", 2),
            listing_page(&[listing_row(&movie_row(3, "Third"))], &[1, 2]),
        )
        .await;
    let client = KgClient::with_transport(transport.clone(), None);

    let items = client
        .search("bach", &SearchOptions::default())
        .await
        .unwrap();

    let ids: Vec<u32> = items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(
        transport.recorded_requests().await,
        vec![
            "browse.php?search=bach&search_type=torrent&incldead=0&page=0".to_string(),
            "browse.php?search=bach&search_type=torrent&incldead=0&page=1".to_string(),
            "browse.php?search=bach&search_type=torrent&incldead=0&page=2".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_search_movies_only_filter() {
    let transport = Arc::new(MockTransport::new());
    let mut music = movie_row(2, "An Album");
    music.media_type_title = "Music: An Album";
    transport
        .set_page(
            "browse.php",
            &search_params("bach", 0),
            listing_page(
                &[listing_row(&movie_row(1, "A Film")), listing_row(&music)],
                &[0],
            ),
        )
        .await;
    let client = KgClient::with_transport(transport, None);

    let options = SearchOptions {
        filter: MediaFilter::MoviesOnly,
        ..SearchOptions::default()
    };
    let items = client.search("bach", &options).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, 1);
}

#[tokio::test]
async fn test_get_snatched_defaults_to_session_user() {
    let transport = Arc::new(MockTransport::with_user_id(4242));
    transport
        .set_page(
            "history.php",
            &[
                ("id", "4242".to_string()),
                ("rcompsort", "1".to_string()),
                ("page", "0".to_string()),
            ],
            listing_page(&[listing_row(&movie_row(9, "Snatched"))], &[0]),
        )
        .await;
    let client = KgClient::with_transport(transport, None);

    let items = client.get_snatched(None, MediaFilter::All).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, 9);
}

#[tokio::test]
async fn test_get_snatched_without_any_user_id() {
    let client = KgClient::with_transport(Arc::new(MockTransport::new()), None);
    let result = client.get_snatched(None, MediaFilter::All).await;
    assert!(matches!(result, Err(ClientError::NoUserId)));
}
