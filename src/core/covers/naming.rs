//! Cover filenames and artwork URL rewriting.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Slug used when a title has no alphanumeric characters at all
const UNTITLED: &str = "untitled";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

/// Lower-case hyphenated form of free text
pub fn slugify(text: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();

    let lowered = text.trim().to_lowercase().replace('&', " and ");
    regex(&NON_ALNUM, r"[^a-z0-9]+")
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Remove `(1978)` and bare `1978` tokens, then collapse whitespace
pub fn strip_year_tokens(title: &str) -> String {
    static PAREN_YEAR: OnceLock<Regex> = OnceLock::new();
    static BARE_YEAR: OnceLock<Regex> = OnceLock::new();

    let without_parens = regex(&PAREN_YEAR, r"\(\d{4}\)").replace_all(title, " ");
    let without_years = regex(&BARE_YEAR, r"\b\d{4}\b").replace_all(&without_parens, " ");
    without_years.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `<slug>[-<year>].jpg` for a cover.
///
/// Year tokens embedded in the title are dropped only when a year will be
/// appended, so a title that is itself a number survives.
pub fn cover_filename(title: &str, year: Option<i32>) -> String {
    let base = match year {
        Some(_) => slugify(&strip_year_tokens(title)),
        None => slugify(title),
    };
    let base = if base.is_empty() { UNTITLED.to_string() } else { base };

    match year {
        Some(year) => format!("{base}-{year}.jpg"),
        None => format!("{base}.jpg"),
    }
}

/// Rewrite the `<w>x<h>` segment before a trailing `bb...jpg|png` to `size`.
///
/// URLs without that segment are returned unchanged.
pub fn upscale_artwork(url: &str, size: u32) -> String {
    static SIZE_SEGMENT: OnceLock<Regex> = OnceLock::new();

    regex(&SIZE_SEGMENT, r"/(\d+)x(\d+)(bb.*?\.(?:jpg|png))$")
        .replace(url, |caps: &Captures| format!("/{size}x{size}{}", &caps[3]))
        .into_owned()
}
