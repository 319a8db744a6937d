//! CLI front end for the chart-clipping pipeline.

use std::time::Duration;

use chartclip::config::Config;
use chartclip::fetch::HttpFetcher;
use chartclip::strategy::{Context, Request, SdvxIndex, SdvxPlus, Strategy, ThreeIceCream};

const USAGE: &str = "usage: chartclip <game> <song> <difficulty> [bar-clip]
       chartclip suggest <game> <query>

games: sdvx, sdvxplus, ddr
bar-clip: inclusive measure range such as 4-23 (default 1-15)";

fn main() {
    // Structured logging. Use `RUST_LOG=info` etc.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> anyhow::Result<()> {
    match args {
        [mode, game, query] if mode == "suggest" => suggest(game, query),
        [game, song, difficulty] => clip(game, song, difficulty, None),
        [game, song, difficulty, bar_clip] => clip(game, song, difficulty, Some(bar_clip.as_str())),
        _ => anyhow::bail!("{USAGE}"),
    }
}

fn strategy_for(game: &str) -> anyhow::Result<Box<dyn Strategy>> {
    match game.to_lowercase().as_str() {
        "sdvx" | "sdvxindex" => Ok(Box::new(SdvxIndex::new()?)),
        "sdvxplus" => Ok(Box::new(SdvxPlus::new()?)),
        "ddr" | "3icecream" => Ok(Box::new(ThreeIceCream::new()?)),
        other => anyhow::bail!("unknown game {other:?}\n\n{USAGE}"),
    }
}

fn suggest(game: &str, query: &str) -> anyhow::Result<()> {
    let strat = strategy_for(game)?;
    for title in data::suggest_titles(strat.song_titles(), query, 10) {
        println!("{title}");
    }
    Ok(())
}

fn clip(game: &str, song: &str, difficulty: &str, bar_clip: Option<&str>) -> anyhow::Result<()> {
    let cfg = Config::load_or_default();
    let strat = strategy_for(game)?;

    let ocr = seg::PaddleDigits::try_new(
        &cfg.ocr_detection_model,
        &cfg.ocr_recognition_model,
        &cfg.ocr_charset,
    )?;
    let ctx = Context {
        data_root: cfg.data_root.clone(),
        fetcher: Box::new(HttpFetcher::new(
            Duration::from_secs_f32(cfg.http_timeout_s),
            &cfg.user_agent,
            cfg.fetch_retries,
        )),
        ocr: Box::new(ocr),
    };

    let request = Request {
        song: song.to_string(),
        difficulty: difficulty.to_string(),
        bar_clip: bar_clip.map(str::to_string),
    };

    match strat.execute(&ctx, &request) {
        Ok(payload) => {
            println!("{}", payload.author);
            for (name, value) in &payload.fields {
                println!("{name}: {value}");
            }
            println!("Thumbnail: {}", payload.thumbnail_url);
            println!("Clip: {}", payload.image_path.display());
            Ok(())
        }
        Err(err) if err.is_user_error() => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}
