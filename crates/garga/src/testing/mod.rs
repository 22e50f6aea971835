//! Testing utilities: a mock transport and page fixtures.
//!
//! Everything the client does is driven by bytes fetched from the tracker,
//! so tests wire [`MockTransport`] into [`crate::client::KgClient`] and feed
//! it pages built by [`fixtures`] - no network, no real markup dumps.

mod mock_transport;

pub use mock_transport::MockTransport;

/// Builders for tracker page markup and torrent blobs used across tests.
pub mod fixtures {
    /// Inputs for one listing-table row.
    #[derive(Debug, Clone)]
    pub struct ListingRow<'a> {
        pub id: u32,
        pub title: &'a str,
        pub director: &'a str,
        pub year: &'a str,
        pub genres: &'a [&'a str],
        pub country: &'a str,
        /// `title` attribute of the classification image, e.g. `"Movie: x"`.
        pub media_type_title: &'a str,
        pub imdb_id: Option<u32>,
    }

    /// One `<tr>` of a listing table, in the site's column order.
    pub fn listing_row(row: &ListingRow) -> String {
        let imdb_cell = match row.imdb_id {
            Some(id) => format!(
                "<td><div><a href=\"http://www.imdb.com/title/tt{id:07}\">\
                 <img alt=\"imdb link\" src=\"imdb.png\"></a></div></td>"
            ),
            None => "<td></td>".to_string(),
        };
        let genre_links: String = row
            .genres
            .iter()
            .enumerate()
            .map(|(i, genre)| format!("<a href=\"browse.php?genre={}\">{}</a> ", i + 1, genre))
            .collect();

        format!(
            "<tr>\
             <td><span><a href=\"details.php?id={id}\"><b>{title}</b></a></span></td>\
             {imdb_cell}\
             <td><a href=\"browse.php?director=1\">{director}</a></td>\
             <td><a href=\"browse.php?year={year}\">{year}</a></td>\
             <td>{genre_links}</td>\
             <td><a href=\"browse.php?country=1\">\
                 <img alt=\"{country}\" src=\"flag.png\"></a></td>\
             <td><div><a href=\"browse.php?type=1\">\
                 <img width=\"40\" title=\"{media_type}\" src=\"type.png\"></a></div></td>\
             </tr>",
            id = row.id,
            title = row.title,
            director = row.director,
            year = row.year,
            country = row.country,
            media_type = row.media_type_title,
        )
    }

    /// A listing page: navigation links for `nav_pages`, the `#browse`
    /// table with its header row, then the given rows.
    pub fn listing_page(rows: &[String], nav_pages: &[u32]) -> Vec<u8> {
        let nav: String = nav_pages
            .iter()
            .map(|page| format!("<a href=\"browse.php?search=x&amp;page={page}\">{page}</a> "))
            .collect();
        format!(
            "<html><head><title>KG - Browse</title></head><body>\
             <p>{nav}</p>\
             <table id=\"browse\">\
             <tr><td>Type</td><td>Name</td><td>Details</td></tr>\
             {}\
             </table></body></html>",
            rows.join("")
        )
        .into_bytes()
    }

    /// Inputs for one detail page. `None` fields omit the matching row.
    #[derive(Debug, Clone)]
    pub struct DetailFixture<'a> {
        pub page_title: &'a str,
        pub torrent_name: Option<&'a str>,
        pub torrent_href: Option<&'a str>,
        pub imdb_id: Option<u32>,
        pub director: Option<&'a str>,
        pub year: Option<&'a str>,
        pub genres: &'a [&'a str],
        pub language: Option<&'a str>,
        pub source: Option<&'a str>,
        pub subtitles: Option<&'a str>,
        pub inline_files: Option<&'a [&'a str]>,
    }

    /// A detail page with its fixed-width details table.
    pub fn detail_page(fixture: &DetailFixture) -> Vec<u8> {
        let mut rows = String::new();

        // Spacer row with a single cell, which extraction must skip.
        rows.push_str("<tr><td colspan=\"2\">&nbsp;</td></tr>");

        if let (Some(name), Some(href)) = (fixture.torrent_name, fixture.torrent_href) {
            rows.push_str(&format!(
                "<tr><td class=\"rowhead\">Torrent:</td>\
                 <td><a href=\"{href}\">{name}</a></td></tr>"
            ));
        }
        if let Some(id) = fixture.imdb_id {
            rows.push_str(&format!(
                "<tr><td class=\"heading\">Internet Link</td>\
                 <td><a href=\"http://www.imdb.com/title/tt{id:07}\">\
                 <img alt=\"imdb link\" src=\"imdb.png\"></a></td></tr>"
            ));
        }
        if let Some(director) = fixture.director {
            rows.push_str(&format!(
                "<tr><td class=\"heading\">Director / Artist</td>\
                 <td><a href=\"browse.php?director=1\">{director}</a></td></tr>"
            ));
        }
        if let Some(year) = fixture.year {
            rows.push_str(&format!(
                "<tr><td class=\"heading\">Year</td>\
                 <td><a href=\"browse.php?year={year}\">{year}</a></td></tr>"
            ));
        }
        if !fixture.genres.is_empty() {
            let links: String = fixture
                .genres
                .iter()
                .enumerate()
                .map(|(i, genre)| {
                    format!("<a href=\"browse.php?genre={}\">{}</a> ", i + 1, genre)
                })
                .collect();
            rows.push_str(&format!(
                "<tr><td class=\"heading\">Genres</td><td>{links}</td></tr>"
            ));
        }
        if let Some(language) = fixture.language {
            rows.push_str(&format!(
                "<tr><td class=\"heading\">Language</td>\
                 <td align=\"left\">{language}</td></tr>"
            ));
        }
        if let Some(source) = fixture.source {
            rows.push_str(&format!(
                "<tr><td class=\"heading\">Source</td>\
                 <td align=\"left\">{source}</td></tr>"
            ));
        }
        if let Some(subtitles) = fixture.subtitles {
            rows.push_str(&format!(
                "<tr><td class=\"heading\">Subtitles</td>\
                 <td align=\"left\">{subtitles}</td></tr>"
            ));
        }
        if let Some(files) = fixture.inline_files {
            let file_rows: String = files
                .iter()
                .map(|file| format!("<tr><td>{file}</td><td>700 MB</td></tr>"))
                .collect();
            rows.push_str(&format!(
                "<tr><td class=\"heading\">File List</td>\
                 <td align=\"left\"><table class=\"main\">\
                 <tr><td>Filename</td><td>Size</td></tr>\
                 {file_rows}\
                 </table></td></tr>"
            ));
        }

        format!(
            "<html><head><title>{}</title></head><body>\
             <table width=\"750\">{rows}</table>\
             </body></html>",
            fixture.page_title
        )
        .into_bytes()
    }

    /// A bencoded single-file torrent blob.
    pub fn single_file_torrent(name: &str) -> Vec<u8> {
        format!(
            "d4:infod6:lengthi700e4:name{}:{}ee",
            name.len(),
            name
        )
        .into_bytes()
    }

    /// A bencoded multi-file torrent blob, each path as a component list.
    pub fn multi_file_torrent(name: &str, paths: &[&str]) -> Vec<u8> {
        let mut entries = String::new();
        for path in paths {
            entries.push_str(&format!("d4:pathl{}:{}ee", path.len(), path));
        }
        format!(
            "d4:infod5:filesl{entries}e4:name{}:{}ee",
            name.len(),
            name
        )
        .into_bytes()
    }
}
