//! # Covers Module
//!
//! Finds movie posters through the iTunes Search API and saves them under
//! slugified filenames.
//!
//! ## Flow
//! 1. **Parse** - `Title` or `Title:Year` items into [`MovieQuery`]
//! 2. **Search** - literal title first, then textual variants
//! 3. **Score** - token overlap plus a release-year bonus
//! 4. **Resolve** - upscale the artwork URL, build the filename
//! 5. **Download** - stream to disk
//!
//! Queries run one after another; a failed query is returned as an error
//! value and the rest still run.

mod fetcher;
mod naming;
mod query;
mod scoring;
mod search;

pub use fetcher::{CoverFetcher, CoverFetcherConfig, CoverPlan, SavedCover, SearchHit};
pub use naming::{cover_filename, slugify, strip_year_tokens, upscale_artwork};
pub use query::{default_queries, parse_items, MovieQuery};
pub use scoring::{normalize_title, pick_best, score_candidate, token_overlap, BestMatch, Score};
pub use search::{CoverSource, ItunesClient, ItunesConfig, SearchResult, ITUNES_SEARCH_URL};
