//! Movie queries parsed from `Title` or `Title:Year` items.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A title to look up, optionally pinned to a release year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieQuery {
    pub title: String,
    pub year: Option<i32>,
}

impl MovieQuery {
    pub fn new(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }

    /// Parse `Title` or `Title:Year`.
    ///
    /// Splits on the last colon. When the part after it is not an integer the
    /// whole item is the title, so `Star Wars: A New Hope` stays intact.
    pub fn parse(item: &str) -> Self {
        if let Some((title, year)) = item.rsplit_once(':') {
            if let Ok(year) = year.trim().parse::<i32>() {
                return Self::new(title.trim(), Some(year));
            }
        }
        Self::new(item.trim(), None)
    }
}

impl fmt::Display for MovieQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{} (?)", self.title),
        }
    }
}

/// Parse every CLI item into a query
pub fn parse_items<S: AsRef<str>>(items: &[S]) -> Vec<MovieQuery> {
    items.iter().map(|item| MovieQuery::parse(item.as_ref())).collect()
}

/// Queries used when none are given on the command line
pub fn default_queries() -> Vec<MovieQuery> {
    vec![
        MovieQuery::new("The Deer Hunter", Some(1978)),
        MovieQuery::new("Halloween", Some(1978)),
        MovieQuery::new("Raging Bull", Some(1980)),
        MovieQuery::new("History of the World, Part I", Some(1981)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_year() {
        assert_eq!(
            MovieQuery::parse("The Deer Hunter:1978"),
            MovieQuery::new("The Deer Hunter", Some(1978))
        );
    }

    #[test]
    fn splits_on_last_colon() {
        assert_eq!(
            MovieQuery::parse("Alien: Resurrection : 1997"),
            MovieQuery::new("Alien: Resurrection", Some(1997))
        );
    }

    #[test]
    fn non_numeric_suffix_keeps_whole_title() {
        assert_eq!(
            MovieQuery::parse("Star Wars: A New Hope"),
            MovieQuery::new("Star Wars: A New Hope", None)
        );
    }

    #[test]
    fn title_only() {
        assert_eq!(
            MovieQuery::parse("  Raging Bull "),
            MovieQuery::new("Raging Bull", None)
        );
    }

    #[test]
    fn display_marks_unknown_year() {
        assert_eq!(MovieQuery::new("Halloween", None).to_string(), "Halloween (?)");
        assert_eq!(
            MovieQuery::new("Halloween", Some(1978)).to_string(),
            "Halloween (1978)"
        );
    }

    #[test]
    fn parse_items_keeps_order() {
        let queries = parse_items(&["B:2001", "A"]);
        assert_eq!(queries[0].title, "B");
        assert_eq!(queries[1].year, None);
    }

    #[test]
    fn defaults_are_pinned_to_years() {
        assert!(default_queries().iter().all(|q| q.year.is_some()));
    }
}
