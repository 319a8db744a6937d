//! SOUND VOLTEX via sdvxindex.com.

use anyhow::{anyhow, Result};

use crate::error::Error;
use seg::ScanGeometry;

use super::{clip_chart, parse_clip, Acquisition, ChartIdentity, Context, GameConfig, Payload, Request, Strategy};

pub struct SdvxIndex {
    game: GameConfig,
    songs: Vec<data::sdvx::Song>,
}

impl SdvxIndex {
    pub fn new() -> Result<Self> {
        Ok(Self {
            game: GameConfig {
                title: "sdvx",
                geometry: ScanGeometry {
                    roi_x1_px: 42,
                    roi_x2_px: 90,
                    roi_height_px: 35,
                    column_spacing_px: 254,
                    bottom_cutoff_px: 11,
                    upscale: 2,
                },
                oob_tolerance: 20,
            },
            songs: data::sdvx::songs()?,
        })
    }
}

impl Strategy for SdvxIndex {
    fn game(&self) -> &GameConfig {
        &self.game
    }

    fn execute(&self, ctx: &Context, request: &Request) -> Result<Payload, Error> {
        let song = data::sdvx::find_song(&self.songs, &request.song)
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

        let kind = data::sdvx::level_kind(&difficulty.kind)
            .ok_or_else(|| Error::Processing(anyhow!("unmapped difficulty kind {:?}", difficulty.kind)))?;

        let identity = ChartIdentity {
            game: self.game.title,
            song_dir: song.song_id.clone(),
            chart_key: format!("{}-{}", song.song_id, kind.url_token),
        };
        let acquisition = Acquisition::Image {
            url: format!("https://sdvxindex.com{}", difficulty.column_path),
        };
        let source_url = format!("https://sdvxindex.com/s/{}/{}", song.song_id, kind.url_token);

        let image_path = clip_chart(ctx, &self.game, &identity, &acquisition, clip)?;

        Ok(Payload {
            author: format!("{} ({} {})", song.title, kind.shorthand, difficulty.level),
            color: kind.color,
            thumbnail_url: difficulty.jacket_art_path.clone(),
            fields: vec![
                ("Song Artist".into(), song.artist.clone()),
                ("Effected By".into(), difficulty.effector_name.clone()),
                ("BPM".into(), song.bpm.clone()),
                ("Illustrated By".into(), difficulty.illustrator_name.clone()),
                ("sdvxindex URL".into(), source_url.clone()),
            ],
            source_url,
            image_path,
        })
    }

    fn song_titles(&self) -> Vec<&str> {
        self.songs.iter().map(|s| s.title.as_str()).collect()
    }
}
