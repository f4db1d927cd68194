//! Title normalisation and candidate scoring.
//!
//! A candidate's score is the share of query words found in its title, plus
//! a bonus when its release year is within one year of the requested one.

use super::search::SearchResult;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Added to the score when the release year is within one year
pub const YEAR_BONUS: f64 = 0.25;

/// Lower-case, spell out `&`, drop punctuation, collapse whitespace
pub fn normalize_title(title: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let non_alnum = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9 ]").expect("valid regex"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let lowered = title.trim().to_lowercase().replace('&', " and ");
    let stripped = non_alnum.replace_all(&lowered, "");
    spaces.replace_all(&stripped, " ").trim().to_string()
}

/// Fraction of the query's words that also appear in the candidate
pub fn token_overlap(query: &str, candidate: &str) -> f64 {
    let query_tokens: HashSet<&str> = query.split_whitespace().collect();
    let candidate_tokens: HashSet<&str> = candidate.split_whitespace().collect();
    let shared = query_tokens.intersection(&candidate_tokens).count();
    shared as f64 / query_tokens.len().max(1) as f64
}

/// Score of one candidate against a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Token-overlap recall, 0.0 to 1.0
    pub overlap: f64,
    /// Overlap plus the year bonus when it applies
    pub total: f64,
}

/// Score `candidate` against a title and optional year
pub fn score_candidate(title: &str, year: Option<i32>, candidate: &SearchResult) -> Score {
    let overlap = token_overlap(
        &normalize_title(title),
        &normalize_title(candidate.display_title()),
    );

    let bonus = match (year, candidate.release_year()) {
        (Some(wanted), Some(released)) if (wanted - released).abs() <= 1 => YEAR_BONUS,
        _ => 0.0,
    };

    Score {
        overlap,
        total: overlap + bonus,
    }
}

/// The winning candidate and its score
#[derive(Debug, Clone, Copy)]
pub struct BestMatch<'a> {
    pub result: &'a SearchResult,
    pub score: Score,
}

/// Pick the candidate with the strictly highest score.
///
/// Ties keep the earlier candidate; candidates sharing no word with the
/// title are never picked.
pub fn pick_best<'a>(
    title: &str,
    year: Option<i32>,
    results: &'a [SearchResult],
) -> Option<BestMatch<'a>> {
    let mut best: Option<BestMatch<'a>> = None;

    for result in results {
        let score = score_candidate(title, year, result);
        if score.overlap <= 0.0 {
            continue;
        }
        if best.map_or(true, |b| score.total > b.score.total) {
            best = Some(BestMatch { result, score });
        }
    }

    best
}
