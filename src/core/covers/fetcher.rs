//! Resolve each query to a cover and download it.

use super::naming::{cover_filename, upscale_artwork};
use super::query::MovieQuery;
use super::scoring::pick_best;
use super::search::{CoverSource, SearchResult};
use crate::error::CoverError;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Configuration for a cover run
#[derive(Debug, Clone)]
pub struct CoverFetcherConfig {
    /// Directory covers are saved into
    pub covers_dir: PathBuf,
    /// Edge length requested from the artwork server
    pub artwork_size: u32,
    /// Appended to the title for the last search attempt
    pub search_suffix: Option<String>,
}

impl Default for CoverFetcherConfig {
    fn default() -> Self {
        Self {
            covers_dir: PathBuf::from("covers"),
            artwork_size: 1000,
            search_suffix: Some("Mel Brooks".to_string()),
        }
    }
}

/// Results of the search variant that returned any
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The variant sent to the search
    pub term: String,
    pub results: Vec<SearchResult>,
}

/// Everything decided about a cover before it is downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct CoverPlan {
    pub filename: String,
    pub artwork_url: String,
    pub score: f64,
}

/// A cover written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCover {
    pub query: MovieQuery,
    pub filename: String,
    pub path: PathBuf,
    pub artwork_url: String,
    pub bytes: u64,
    pub score: f64,
}

/// Drives a [`CoverSource`] through search, scoring and download
pub struct CoverFetcher<S: CoverSource> {
    source: S,
    config: CoverFetcherConfig,
}

impl<S: CoverSource> CoverFetcher<S> {
    pub fn new(source: S, config: CoverFetcherConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &CoverFetcherConfig {
        &self.config
    }

    /// Search terms in the order they are tried, duplicates removed
    pub fn search_variants(&self, title: &str) -> Vec<String> {
        let mut candidates = vec![
            title.to_string(),
            title.replace(':', ","),
            title.replace(',', ":"),
            title.replace([',', ':'], ""),
        ];
        if let Some(suffix) = self.config.search_suffix.as_deref().filter(|s| !s.is_empty()) {
            candidates.push(format!("{title} {suffix}"));
        }

        let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }

    /// The first variant that returns results, with those results.
    ///
    /// A failing request is logged and the next variant is tried.
    pub fn find(&self, title: &str) -> Result<SearchHit, CoverError> {
        for term in self.search_variants(title) {
            match self.source.search(&term) {
                Ok(results) if !results.is_empty() => {
                    debug!(term = %term, count = results.len(), "Search hit");
                    return Ok(SearchHit { term, results });
                }
                Ok(_) => debug!(term = %term, "No results"),
                Err(e) => warn!(term = %term, error = %e, "Search failed"),
            }
        }

        Err(CoverError::NoResults {
            title: title.to_string(),
        })
    }

    /// Pick the best result for `query` and decide where its artwork goes
    pub fn plan(&self, query: &MovieQuery) -> Result<CoverPlan, CoverError> {
        // Candidates are scored against the term that found them
        let hit = self.find(&query.title)?;
        let best = pick_best(&hit.term, query.year, &hit.results).ok_or_else(|| {
            CoverError::NoMatch {
                title: query.title.clone(),
            }
        })?;

        let artwork = best
            .result
            .artwork_url()
            .ok_or_else(|| CoverError::MissingArtwork {
                title: query.title.clone(),
            })?;

        let name_title = best
            .result
            .track_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&query.title);
        let year = query.year.or_else(|| best.result.release_year());

        Ok(CoverPlan {
            filename: cover_filename(name_title, year),
            artwork_url: upscale_artwork(artwork, self.config.artwork_size),
            score: best.score.total,
        })
    }

    /// Resolve and download the cover for one query
    pub fn fetch(&self, query: &MovieQuery) -> Result<SavedCover, CoverError> {
        let plan = self.plan(query)?;
        let path = self.destination(&plan.filename);

        let bytes = self.source.download(&plan.artwork_url, &path)?;
        info!(query = %query, path = %path.display(), bytes, "Saved cover");

        Ok(SavedCover {
            query: query.clone(),
            filename: plan.filename,
            path,
            artwork_url: plan.artwork_url,
            bytes,
            score: plan.score,
        })
    }

    /// Fetch every query in order; one failure never stops the rest
    pub fn fetch_all(&self, queries: &[MovieQuery]) -> Vec<Result<SavedCover, CoverError>> {
        queries.iter().map(|query| self.fetch(query)).collect()
    }

    fn destination(&self, filename: &str) -> PathBuf {
        self.config.covers_dir.join(filename)
    }
}
