//! SOUND VOLTEX catalog (sdvxindex.com).

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::Accent;

const SONGS_JSON: &str = include_str!("../assets/sdvx.json");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Radar {
    pub notes: u32,
    pub peak: u32,
    pub tsumami: u32,
    pub tricky: u32,
    pub handtrip: u32,
    pub onehand: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    pub level: u32,
    /// Difficulty kind as the site names it: "novice", "exhaust", ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "imagePath")]
    pub image_path: String,
    /// Site-relative path of the full chart strip.
    #[serde(rename = "columnPath")]
    pub column_path: String,
    #[serde(rename = "effectorName")]
    pub effector_name: String,
    #[serde(rename = "illustratorName")]
    pub illustrator_name: String,
    pub max_exscore: String,
    pub radar: Option<Radar>,
    #[serde(rename = "jacketArtPath")]
    pub jacket_art_path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Song {
    #[serde(rename = "songid")]
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub ascii: String,
    pub title_yomigana: String,
    pub artist_yomigana: String,
    pub version: String,
    pub bpm: String,
    pub genres: Vec<String>,
    pub date: String,
    pub difficulties: Vec<Difficulty>,
}

impl Song {
    pub fn difficulty(&self, level: u32) -> Option<&Difficulty> {
        self.difficulties.iter().find(|d| d.level == level)
    }
}

/// Parse the bundled catalog. Done once at startup.
pub fn songs() -> Result<Vec<Song>> {
    serde_json::from_str(SONGS_JSON).context("parse bundled sdvx catalog")
}

pub fn find_song<'a>(songs: &'a [Song], title: &str) -> Option<&'a Song> {
    songs.iter().find(|s| crate::title_matches(&s.title, title))
}

/// Display/URL mapping for one difficulty kind.
#[derive(Debug, Clone, Copy)]
pub struct LevelKind {
    pub shorthand: &'static str,
    /// Token the site uses in chart URLs for this kind.
    pub url_token: &'static str,
    pub color: Accent,
}

const LEVEL_KINDS: &[(&str, LevelKind)] = &[
    ("novice", LevelKind { shorthand: "NOV", url_token: "1", color: (145, 75, 198) }),
    ("advanced", LevelKind { shorthand: "ADV", url_token: "2", color: (168, 163, 7) }),
    ("exhaust", LevelKind { shorthand: "EXH", url_token: "3", color: (148, 52, 52) }),
    ("maximum", LevelKind { shorthand: "MXM", url_token: "5", color: (112, 112, 112) }),
    ("infinite", LevelKind { shorthand: "INF", url_token: "4i", color: (179, 37, 101) }),
    ("gravity", LevelKind { shorthand: "GRV", url_token: "4g", color: (158, 66, 0) }),
    ("heavenly", LevelKind { shorthand: "HVN", url_token: "4h", color: (0, 127, 166) }),
    ("vivid", LevelKind { shorthand: "VVD", url_token: "4v", color: (184, 68, 155) }),
    ("exceed", LevelKind { shorthand: "XCD", url_token: "4x", color: (54, 81, 145) }),
];

pub fn level_kind(kind: &str) -> Option<&'static LevelKind> {
    let kind = kind.to_lowercase();
    LEVEL_KINDS.iter().find(|(name, _)| *name == kind).map(|(_, info)| info)
}

/// Lookup by shorthand ("EXH", "MXM", ...), used by the sdvxplus catalog
/// whose difficulties carry shorthands instead of kind names.
pub fn level_kind_by_shorthand(shorthand: &str) -> Option<&'static LevelKind> {
    LEVEL_KINDS
        .iter()
        .find(|(_, info)| info.shorthand.eq_ignore_ascii_case(shorthand))
        .map(|(_, info)| info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_parses_and_difficulties_resolve() {
        let songs = songs().unwrap();
        assert!(!songs.is_empty());

        let song = find_song(&songs, "albida").expect("case-insensitive match");
        assert_eq!(song.song_id, "albida");
        let diff = song.difficulty(16).expect("EXH 16 present");
        assert_eq!(diff.kind, "exhaust");
        assert!(diff.column_path.starts_with('/'));
    }

    #[test]
    fn unknown_title_and_level_are_none() {
        let songs = songs().unwrap();
        assert!(find_song(&songs, "no such song").is_none());
        let song = find_song(&songs, "ALBIDA").unwrap();
        assert!(song.difficulty(99).is_none());
    }

    #[test]
    fn level_kind_mappings() {
        assert_eq!(level_kind("EXHAUST").unwrap().shorthand, "EXH");
        assert_eq!(level_kind("gravity").unwrap().url_token, "4g");
        assert!(level_kind("ultima").is_none());
        assert_eq!(level_kind_by_shorthand("mxm").unwrap().url_token, "5");
    }
}
