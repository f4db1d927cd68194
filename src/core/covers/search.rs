//! iTunes Search API client.

use crate::error::CoverError;
use chrono::{DateTime, Datelike};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::debug;

/// Public search endpoint
pub const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";

/// One record from the search API.
///
/// Every field is optional; accessors apply the fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, rename = "artworkUrl100")]
    pub artwork_url_100: Option<String>,
    #[serde(default, rename = "artworkUrl60")]
    pub artwork_url_60: Option<String>,
}

impl SearchResult {
    /// Track name, falling back to collection name, else empty
    pub fn display_title(&self) -> &str {
        non_empty(&self.track_name)
            .or_else(|| non_empty(&self.collection_name))
            .unwrap_or("")
    }

    /// Year of the release date, if it parses
    pub fn release_year(&self) -> Option<i32> {
        let date = non_empty(&self.release_date)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
            return Some(parsed.year());
        }
        date.get(..4)?.parse().ok()
    }

    /// Small artwork URL: 100px, falling back to 60px
    pub fn artwork_url(&self) -> Option<&str> {
        non_empty(&self.artwork_url_100).or_else(|| non_empty(&self.artwork_url_60))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Where covers come from: a search plus a download
pub trait CoverSource {
    /// Search movies matching `term`
    fn search(&self, term: &str) -> Result<Vec<SearchResult>, CoverError>;

    /// Stream `url` into `dest`, returning the number of bytes written
    fn download(&self, url: &str, dest: &Path) -> Result<u64, CoverError>;
}

/// Configuration for the search client
#[derive(Debug, Clone)]
pub struct ItunesConfig {
    pub search_url: String,
    pub country: String,
    pub limit: u32,
    pub search_timeout: Duration,
    pub download_timeout: Duration,
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            search_url: ITUNES_SEARCH_URL.to_string(),
            country: "US".to_string(),
            limit: 10,
            search_timeout: Duration::from_secs(15),
            download_timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking client for the iTunes Search API
pub struct ItunesClient {
    http: Client,
    config: ItunesConfig,
}

impl ItunesClient {
    /// Create a client; fails only if the HTTP stack cannot be initialised
    pub fn new(config: ItunesConfig) -> Result<Self, CoverError> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CoverError::ClientUnavailable)?;

        Ok(Self { http, config })
    }
}

impl CoverSource for ItunesClient {
    fn search(&self, term: &str) -> Result<Vec<SearchResult>, CoverError> {
        let url = &self.config.search_url;
        let limit = self.config.limit.to_string();
        let http_error = |source| CoverError::Http {
            url: url.clone(),
            source,
        };

        debug!(term, "Searching iTunes");

        let response = self
            .http
            .get(url)
            .query(&[
                ("term", term),
                ("entity", "movie"),
                ("media", "movie"),
                ("limit", limit.as_str()),
                ("country", self.config.country.as_str()),
            ])
            .timeout(self.config.search_timeout)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?;

        let body: SearchResponse = response.json().map_err(http_error)?;
        Ok(body.results)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64, CoverError> {
        let write_error = |source| CoverError::Write {
            path: dest.to_path_buf(),
            source,
        };

        let parent = match dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent,
            None => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_error)?;

        let mut response = self
            .http
            .get(url)
            .timeout(self.config.download_timeout)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|source| CoverError::Http {
                url: url.to_string(),
                source,
            })?;

        // Chunks go straight into a sibling temp file that only replaces
        // `dest` once complete; it is removed if anything fails first
        let mut temp = NamedTempFile::new_in(parent).map_err(write_error)?;
        let bytes = {
            let mut writer = BufWriter::new(temp.as_file_mut());
            std::io::copy(&mut response, &mut writer)
                .and_then(|bytes| writer.flush().map(|_| bytes))
                .map_err(|source| CoverError::Download {
                    url: url.to_string(),
                    source,
                })?
        };

        temp.persist(dest).map_err(|e| write_error(e.error))?;
        debug!(url, path = %dest.display(), bytes, "Downloaded artwork");
        Ok(bytes)
    }
}
