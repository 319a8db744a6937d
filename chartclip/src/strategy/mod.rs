//! Chart strategies: one parameterized pipeline, one thin module per source.
//!
//! Every source runs the same fixed sequence - validate, acquire, measure
//! (cached), correct, resolve, crop - and differs only in pixel geometry,
//! URL/filename schemes and the payload fields it surfaces. The three game
//! modules supply those through [`GameConfig`], [`ChartIdentity`] and
//! [`Acquisition`]; `clip_chart` does the rest.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::Error;
use crate::fetch::{self, Fetcher};
use seg::{BarRange, DigitReader, ScanGeometry};

mod ddr;
mod sdvx;
mod sdvxplus;

pub use ddr::ThreeIceCream;
pub use sdvx::SdvxIndex;
pub use sdvxplus::SdvxPlus;

/// Shared collaborators threaded through every request.
///
/// No process-wide mutable state: each request carries what it needs and
/// returns what it produced.
pub struct Context {
    pub data_root: PathBuf,
    pub fetcher: Box<dyn Fetcher>,
    pub ocr: Box<dyn DigitReader>,
}

/// One user invocation, exactly as received from the front end.
#[derive(Debug, Clone)]
pub struct Request {
    pub song: String,
    pub difficulty: String,
    pub bar_clip: Option<String>,
}

/// Per-game constants driving the pipeline.
pub struct GameConfig {
    pub title: &'static str,
    pub geometry: ScanGeometry,
    /// Measure jumps at or above this are treated as OCR misreads.
    pub oob_tolerance: u32,
}

/// The (game, song, chart) triple addressing one chart's cached artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartIdentity {
    pub game: &'static str,
    /// Directory segment under the game folder (usually the song id).
    pub song_dir: String,
    /// Filename stem unique to this chart within the song.
    pub chart_key: String,
}

impl ChartIdentity {
    fn song_folder(&self, root: &Path) -> PathBuf {
        root.join(self.game).join(&self.song_dir)
    }

    pub fn image_path(&self, root: &Path) -> PathBuf {
        self.song_folder(root).join(format!("{}.png", self.chart_key))
    }

    pub fn measures_path(&self, root: &Path) -> PathBuf {
        self.song_folder(root).join(format!("measures-{}.json", self.chart_key))
    }

    /// Output path for a crop. Scoped by identity *and* range so concurrent
    /// requests can never clobber each other's responses.
    pub fn clip_path(&self, root: &Path, clip: BarRange) -> PathBuf {
        self.song_folder(root)
            .join(format!("{}-{}-{}.png", self.chart_key, clip.start, clip.end))
    }
}

/// How a source serves its chart image.
pub enum Acquisition {
    /// Plain static image URL.
    Image { url: String },
    /// The image only exists briefly after this page renders; load the page,
    /// pull the single `<img>` element's source, then fetch that.
    RenderedPage { url: String },
}

/// Response payload handed back to the front end.
#[derive(Debug, Clone)]
pub struct Payload {
    /// Header line: "Title (EXH 16)".
    pub author: String,
    pub color: data::Accent,
    pub thumbnail_url: String,
    pub fields: Vec<(String, String)>,
    pub source_url: String,
    /// The cropped chart, freshly written for this request.
    pub image_path: PathBuf,
}

pub trait Strategy: Send + Sync {
    fn game(&self) -> &GameConfig;

    /// Validate the request and run the full pipeline.
    fn execute(&self, ctx: &Context, request: &Request) -> Result<Payload, Error>;

    /// Catalog titles, for autocomplete suggestions.
    fn song_titles(&self) -> Vec<&str>;
}

pub(crate) fn parse_clip(request: &Request) -> Result<BarRange, Error> {
    seg::parse_bar_clip(request.bar_clip.as_deref())
        .ok_or_else(|| Error::BadBarClip(request.bar_clip.clone().unwrap_or_default()))
}

/// The shared pipeline: acquire -> measure -> correct -> resolve -> crop.
pub(crate) fn clip_chart(
    ctx: &Context,
    game: &GameConfig,
    identity: &ChartIdentity,
    acquisition: &Acquisition,
    clip: BarRange,
) -> Result<PathBuf, Error> {
    let image_path = identity.image_path(&ctx.data_root);
    acquire(ctx, acquisition, &image_path).map_err(Error::Acquisition)?;

    let chart = seg::OwnedImage::open(&image_path).map_err(Error::Processing)?;

    let measures_path = identity.measures_path(&ctx.data_root);
    let raw = if measures_path.is_file() {
        seg::ColumnMeasures::load(&measures_path).map_err(Error::Processing)?
    } else {
        let scanned =
            seg::scan_measures(&chart, &game.geometry, ctx.ocr.as_ref()).map_err(Error::Processing)?;
        scanned.save(&measures_path).map_err(Error::Processing)?;
        scanned
    };

    let adjusted = raw.adjusted(game.oob_tolerance);
    let columns = adjusted.resolve(clip).ok_or(Error::RangeOutsideChart {
        start: clip.start,
        end: clip.end,
    })?;

    let cropped = seg::crop_columns(&chart, game.geometry.column_spacing_px, columns)
        .map_err(Error::Processing)?;

    let out = identity.clip_path(&ctx.data_root, clip);
    cropped.save_png(&out).map_err(Error::Processing)?;

    tracing::info!(
        game = game.title,
        chart = %identity.chart_key,
        start = clip.start,
        end = clip.end,
        "wrote clip to {}",
        out.display()
    );
    Ok(out)
}

fn acquire(ctx: &Context, acquisition: &Acquisition, path: &Path) -> anyhow::Result<()> {
    match acquisition {
        Acquisition::Image { url } => fetch::download_cached(ctx.fetcher.as_ref(), url, path),
        Acquisition::RenderedPage { url } => {
            if path.is_file() {
                log::info!("cached file already found, using {}", path.display());
                return Ok(());
            }
            let html = ctx.fetcher.fetch_page(url)?;
            let src = fetch::extract_img_src(&html)
                .with_context(|| format!("no <img> element on rendering page {url}"))?;
            let src = fetch::absolutize(url, src);
            fetch::download_cached(ctx.fetcher.as_ref(), &src, path)
        }
    }
}
