//! Bundled song catalogs for the supported chart sources.
//!
//! Catalogs are read-only datasets parsed once at startup and never mutated.
//! Each game module exposes its own song/difficulty model (the shapes differ
//! per source site) plus the display mappings the response payloads need.

use std::cmp::Reverse;

pub mod ddr;
pub mod sdvx;
pub mod sdvxplus;

/// RGB accent color attached to a difficulty in response payloads.
pub type Accent = (u8, u8, u8);

/// Rank catalog titles against a partial query, best matches first.
///
/// Used for autocomplete suggestions: case-insensitive substring hits come
/// first, everything else is ordered by edit distance. An empty query
/// returns the first `limit` titles unchanged.
pub fn suggest_titles<'a>(
    titles: impl IntoIterator<Item = &'a str>,
    query: &str,
    limit: usize,
) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    let mut scored: Vec<(&str, bool, usize)> = titles
        .into_iter()
        .map(|title| {
            let lower = title.to_lowercase();
            let contains = !query.is_empty() && lower.contains(&query);
            (title, contains, levenshtein::levenshtein(&query, &lower))
        })
        .collect();

    scored.sort_by_key(|&(_, contains, distance)| (Reverse(contains), distance));
    scored.into_iter().map(|(title, _, _)| title).take(limit).collect()
}

/// Case-insensitive exact title match, the contract every strategy validates
/// user input against.
pub(crate) fn title_matches(candidate: &str, wanted: &str) -> bool {
    candidate.to_lowercase() == wanted.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_hits_rank_first() {
        let titles = ["ALBIDA", "Booths of Fighters", "Bangin' Burst"];
        let out = suggest_titles(titles, "burst", 2);
        assert_eq!(out[0], "Bangin' Burst");
    }

    #[test]
    fn close_misses_rank_by_edit_distance() {
        let titles = ["PARANOiA", "MAX 300", "AFRONOVA"];
        let out = suggest_titles(titles, "paranoia", 3);
        assert_eq!(out[0], "PARANOiA");
    }

    #[test]
    fn limit_is_honored() {
        let titles = ["a", "b", "c"];
        assert_eq!(suggest_titles(titles, "", 2).len(), 2);
    }
}
