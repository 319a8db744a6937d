//! SOUND VOLTEX community-chart catalog (sdvxplus.zip).
//!
//! Assets live behind a CloudFront distribution; song directories are the
//! numeric id zero-padded to four digits.

use anyhow::{Context, Result};
use serde::Deserialize;

const SONGS_JSON: &str = include_str!("../assets/sdvxplus.json");

pub const CLOUDFRONT: &str = "https://d1v18l4r9qkmgu.cloudfront.net/";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    /// Chart slot within the song, used in asset URLs.
    pub idx: u32,
    pub effector: String,
    pub level: u32,
    /// Difficulty shorthand as shown on the site: "NOV", "EXH", ...
    pub name: String,
    #[serde(rename = "jacketPath")]
    pub jacket_path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Song {
    pub id: u32,
    pub title: String,
    pub artist: String,
    #[serde(rename = "dateAdded")]
    pub date_added: i64,
    pub diffs: Vec<Difficulty>,
}

impl Song {
    pub fn difficulty(&self, level: u32) -> Option<&Difficulty> {
        self.diffs.iter().find(|d| d.level == level)
    }

    /// Zero-padded id used for both remote asset paths and local cache dirs.
    pub fn padded_id(&self) -> String {
        format!("{:04}", self.id)
    }
}

/// Parse the bundled catalog. Done once at startup.
pub fn songs() -> Result<Vec<Song>> {
    serde_json::from_str(SONGS_JSON).context("parse bundled sdvxplus catalog")
}

pub fn find_song<'a>(songs: &'a [Song], title: &str) -> Option<&'a Song> {
    songs.iter().find(|s| crate::title_matches(&s.title, title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_parses() {
        let songs = songs().unwrap();
        assert!(!songs.is_empty());

        let song = find_song(&songs, songs[0].title.to_uppercase().as_str()).unwrap();
        assert_eq!(song.id, songs[0].id);
    }

    #[test]
    fn id_is_zero_padded() {
        let song = Song { id: 42, ..Default::default() };
        assert_eq!(song.padded_id(), "0042");
    }
}
