//! DDR via 3icecream.com.
//!
//! The chart only lives server-side for a handful of seconds once its
//! rendering page has been accessed, so acquisition goes through
//! [`Acquisition::RenderedPage`]: load the page, grab the image while it
//! still exists.

use anyhow::Result;

use crate::error::Error;
use seg::ScanGeometry;

use super::{clip_chart, parse_clip, Acquisition, ChartIdentity, Context, GameConfig, Payload, Request, Strategy};

pub struct ThreeIceCream {
    game: GameConfig,
    songs: Vec<data::ddr::Song>,
}

impl ThreeIceCream {
    pub fn new() -> Result<Self> {
        Ok(Self {
            game: GameConfig {
                title: "ddr",
                geometry: ScanGeometry {
                    roi_x1_px: 0,
                    roi_x2_px: 19,
                    roi_height_px: 915,
                    column_spacing_px: 160,
                    bottom_cutoff_px: 24,
                    upscale: 2,
                },
                oob_tolerance: 5,
            },
            songs: data::ddr::songs()?,
        })
    }

    /// A difficulty token is either a chart name ("ESP") or a rating-slot
    /// index ("3").
    fn resolve_chart(song: &data::ddr::Song, token: &str) -> Option<data::ddr::Rating> {
        let token = token.trim();
        if let Ok(index) = token.parse::<usize>() {
            return song.chart_at(index);
        }
        song.charts().into_iter().find(|r| r.name.eq_ignore_ascii_case(token))
    }
}

impl Strategy for ThreeIceCream {
    fn game(&self) -> &GameConfig {
        &self.game
    }

    fn execute(&self, ctx: &Context, request: &Request) -> Result<Payload, Error> {
        let song = data::ddr::find_song(&self.songs, &request.song)
            .ok_or_else(|| Error::UnknownSong(request.song.clone()))?;

        let rating = Self::resolve_chart(song, &request.difficulty)
            .ok_or_else(|| Error::UnknownDifficulty(request.difficulty.clone()))?;

        let clip = parse_clip(request)?;

        let identity = ChartIdentity {
            game: self.game.title,
            song_dir: song.song_id.clone(),
            chart_key: format!("{}-{}", song.song_id, rating.name),
        };
        let source_url = format!(
            "https://3icecream.com/ren/chart?songId={}&speedmod=2&diff={}",
            song.song_id, rating.index
        );
        let acquisition = Acquisition::RenderedPage {
            url: source_url.clone(),
        };

        let image_path = clip_chart(ctx, &self.game, &identity, &acquisition, clip)?;

        Ok(Payload {
            author: format!("{} ({} {})", song.song_name, rating.name, rating.level),
            color: rating.color(),
            thumbnail_url: format!("https://3icecream.com/img/banners/f/{}.jpg", song.song_id),
            fields: vec![
                (
                    "Version First Appeared".into(),
                    data::ddr::version_name(song.version_num).into(),
                ),
                ("3icecream URL".into(), format!("[link to chart]({source_url})")),
            ],
            source_url,
            image_path,
        })
    }

    fn song_titles(&self) -> Vec<&str> {
        self.songs.iter().map(|s| s.song_name.as_str()).collect()
    }
}
