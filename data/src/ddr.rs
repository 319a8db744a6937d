//! DDR catalog (3icecream.com).

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::Accent;

const SONGS_JSON: &str = include_str!("../assets/ddr.json");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Song {
    pub song_id: String,
    pub song_name: String,
    pub searchable_name: String,
    pub romanized_name: String,
    pub alternate_name: String,
    pub alphabet: String,
    pub version_num: u32,
    /// Nine rating slots: bSP, BSP, DSP, ESP, CSP, BDP, DDP, EDP, CDP.
    /// A zero means the chart does not exist.
    pub ratings: Vec<u32>,
    pub tiers: Vec<f32>,
}

impl Song {
    /// Decode the rating slots into the charts that actually exist.
    pub fn charts(&self) -> Vec<Rating> {
        self.ratings
            .iter()
            .enumerate()
            .filter(|&(_, &level)| level > 0)
            .filter_map(|(index, &level)| {
                let (initial, full_name) = match index {
                    0 => ("b", "beginner"),
                    1 | 5 => ("B", "basic"),
                    2 | 6 => ("D", "difficult"),
                    3 | 7 => ("E", "expert"),
                    4 | 8 => ("C", "challenge"),
                    _ => return None,
                };
                let style = if index <= 4 { "S" } else { "D" };
                Some(Rating {
                    index,
                    name: format!("{initial}{style}P"),
                    level,
                    full_name,
                })
            })
            .collect()
    }

    pub fn chart_at(&self, rating_index: usize) -> Option<Rating> {
        self.charts().into_iter().find(|r| r.index == rating_index)
    }
}

/// One playable chart decoded from a rating slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    /// Slot index, also the `diff` URL parameter on 3icecream.
    pub index: usize,
    /// Short chart name: "BSP", "EDP", ...
    pub name: String,
    pub level: u32,
    pub full_name: &'static str,
}

impl Rating {
    pub fn color(&self) -> Accent {
        match self.full_name {
            "beginner" => (64, 198, 233),
            "basic" => (235, 210, 45),
            "difficult" => (234, 24, 25),
            "expert" => (41, 232, 35),
            _ => (190, 36, 220),
        }
    }
}

/// Release name for a `version_num`.
pub fn version_name(version_num: u32) -> &'static str {
    match version_num {
        1 => "DDR 1st",
        2 => "DDR 2nd",
        3 => "DDR 3rd",
        4 => "DDR 4th",
        5 => "DDR 5th",
        6 => "DDR MAX",
        7 => "DDR MAX2",
        8 => "DDR Extreme",
        9 => "DDR SuperNOVA",
        10 => "DDR SuperNOVA2",
        11 => "DDR X",
        12 => "DDR X2",
        13 => "DDR X3 vs 2nd",
        14 => "DDR 2013",
        15 => "DDR 2014",
        16 => "A",
        17 => "A20",
        18 => "A20 Plus",
        19 => "A3",
        20 => "WORLD",
        _ => "unknown",
    }
}

/// Parse the bundled catalog. Done once at startup.
pub fn songs() -> Result<Vec<Song>> {
    serde_json::from_str(SONGS_JSON).context("parse bundled ddr catalog")
}

pub fn find_song<'a>(songs: &'a [Song], title: &str) -> Option<&'a Song> {
    songs.iter().find(|s| crate::title_matches(&s.song_name, title))
}
