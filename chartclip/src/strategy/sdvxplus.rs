//! SOUND VOLTEX community charts via sdvxplus.zip (CloudFront assets).

use anyhow::Result;

use crate::error::Error;
use seg::ScanGeometry;

use super::{clip_chart, parse_clip, Acquisition, ChartIdentity, Context, GameConfig, Payload, Request, Strategy};

pub struct SdvxPlus {
    game: GameConfig,
    songs: Vec<data::sdvxplus::Song>,
}

impl SdvxPlus {
    pub fn new() -> Result<Self> {
        Ok(Self {
            game: GameConfig {
                title: "sdvxplus",
                geometry: ScanGeometry {
                    roi_x1_px: 9,
                    roi_x2_px: 32,
                    roi_height_px: 44,
                    column_spacing_px: 117,
                    bottom_cutoff_px: 24,
                    upscale: 2,
                },
                oob_tolerance: 20,
            },
            songs: data::sdvxplus::songs()?,
        })
    }
}

impl Strategy for SdvxPlus {
    fn game(&self) -> &GameConfig {
        &self.game
    }

    fn execute(&self, ctx: &Context, request: &Request) -> Result<Payload, Error> {
        let song = data::sdvxplus::find_song(&self.songs, &request.song)
            .ok_or_else(|| Error::UnknownSong(request.song.clone()))?;

        let level: u32 = request
            .difficulty
            .trim()
            .parse()
            .map_err(|_| Error::UnknownDifficulty(request.difficulty.clone()))?;
        let difficulty = song
            .difficulty(level)
            .ok_or_else(|| Error::UnknownDifficulty(request.difficulty.clone()))?;

        let clip = parse_clip(request)?;

        let identity = ChartIdentity {
            game: self.game.title,
            song_dir: song.padded_id(),
            chart_key: format!("{}-{}", song.id, difficulty.idx),
        };
        let acquisition = Acquisition::Image {
            url: format!("{}{}/r_{}.png", data::sdvxplus::CLOUDFRONT, song.padded_id(), difficulty.idx),
        };
        let source_url = format!("https://sdvxplus.zip/unzip/{}/{}", song.id, difficulty.idx);

        let image_path = clip_chart(ctx, &self.game, &identity, &acquisition, clip)?;

        // Community charts reuse the arcade shorthands for their accent color.
        let color = data::sdvx::level_kind_by_shorthand(&difficulty.name)
            .map(|k| k.color)
            .unwrap_or((112, 112, 112));

        Ok(Payload {
            author: format!("{} ({} {})", song.title, difficulty.name, difficulty.level),
            color,
            thumbnail_url: format!("{}{}", data::sdvxplus::CLOUDFRONT, difficulty.jacket_path),
            fields: vec![
                ("Song Artist".into(), song.artist.clone()),
                ("Effected By".into(), difficulty.effector.clone()),
                ("sdvxplus URL".into(), source_url.clone()),
            ],
            source_url,
            image_path,
        })
    }

    fn song_titles(&self) -> Vec<&str> {
        self.songs.iter().map(|s| s.title.as_str()).collect()
    }
}
