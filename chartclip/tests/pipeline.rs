//! End-to-end pipeline tests with fake network and OCR collaborators.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use chartclip::error::Error;
use chartclip::fetch::Fetcher;
use chartclip::strategy::{ChartIdentity, Context, Request, SdvxIndex, Strategy, ThreeIceCream};
use seg::{Color, ColumnMeasures, DigitReader, OwnedImage};

// ----------

#[derive(Default)]
struct FakeFetcher {
    bytes: HashMap<String, Vec<u8>>,
    pages: HashMap<String, String>,
    byte_calls: AtomicUsize,
    page_calls: AtomicUsize,
}

impl Fetcher for FakeFetcher {
    fn fetch_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.byte_calls.fetch_add(1, Ordering::SeqCst);
        self.bytes.get(url).cloned().ok_or_else(|| anyhow!("404 {url}"))
    }

    fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url).cloned().ok_or_else(|| anyhow!("404 {url}"))
    }
}

// Arc delegation lets a test keep a handle on the fake's call counters after
// boxing it into the Context.
impl Fetcher for Arc<FakeFetcher> {
    fn fetch_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.as_ref().fetch_bytes(url)
    }

    fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        self.as_ref().fetch_page(url)
    }
}

/// Pops one canned digit string per OCR call.
#[derive(Default)]
struct ScriptedDigits {
    answers: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedDigits {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl DigitReader for ScriptedDigits {
    fn read_digits(&self, _image: seg::Image) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers.lock().unwrap().pop_front().unwrap_or_default()
    }
}

impl DigitReader for Arc<ScriptedDigits> {
    fn read_digits(&self, image: seg::Image) -> String {
        self.as_ref().read_digits(image)
    }
}

// ----------

fn temp_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chartclip-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn chart_png(width: u32, height: u32, color: Color) -> Vec<u8> {
    OwnedImage::filled(width, height, color).png_bytes().unwrap()
}

fn context(root: PathBuf, fetcher: FakeFetcher, ocr: ScriptedDigits) -> Context {
    Context {
        data_root: root,
        fetcher: Box::new(fetcher),
        ocr: Box::new(ocr),
    }
}

// ----------

#[test]
fn sdvx_pipeline_end_to_end() {
    let root = temp_root("sdvx-end-to-end");

    // ALBIDA EXH (url token "3"): 4 columns at 254 px spacing.
    let mut fetcher = FakeFetcher::default();
    fetcher.bytes.insert(
        "https://sdvxindex.com/images/column/albida/exh.png".to_string(),
        chart_png(1016, 60, Color::new(200, 40, 40)),
    );
    let ctx = context(root.clone(), fetcher, ScriptedDigits::new(&["5", "9", "15"]));

    let strat = SdvxIndex::new().unwrap();
    let request = Request {
        song: "albida".into(),
        difficulty: "16".into(),
        bar_clip: None,
    };

    let payload = strat.execute(&ctx, &request).unwrap();
    assert_eq!(payload.author, "ALBIDA (EXH 16)");
    assert_eq!(payload.source_url, "https://sdvxindex.com/s/albida/3");
    assert!(payload.fields.iter().any(|(n, v)| n == "BPM" && v == "150"));
    assert!(payload.image_path.is_file());

    // Default 1-15 over measures [1,5,9,15]: columns 0..3, 762 px wide.
    let clip = OwnedImage::open(&payload.image_path).unwrap();
    assert_eq!((clip.width(), clip.height()), (762, 60));

    // The raw measure map was persisted for the next request.
    let identity = ChartIdentity {
        game: "sdvx",
        song_dir: "albida".into(),
        chart_key: "albida-3".into(),
    };
    assert!(identity.measures_path(&root).is_file());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn repeat_requests_reuse_cached_chart_and_measures() {
    let root = temp_root("sdvx-cache-reuse");

    let mut bytes = HashMap::new();
    bytes.insert(
        "https://sdvxindex.com/images/column/albida/exh.png".to_string(),
        chart_png(1016, 60, Color::WHITE),
    );
    let fetcher = Arc::new(FakeFetcher {
        bytes,
        ..Default::default()
    });
    let ocr = Arc::new(ScriptedDigits::new(&["5", "9", "15"]));

    let ctx = Context {
        data_root: root.clone(),
        fetcher: Box::new(Arc::clone(&fetcher)),
        ocr: Box::new(Arc::clone(&ocr)),
    };

    let strat = SdvxIndex::new().unwrap();
    let request = Request {
        song: "ALBIDA".into(),
        difficulty: "16".into(),
        bar_clip: Some("1-9".into()),
    };

    strat.execute(&ctx, &request).unwrap();
    strat.execute(&ctx, &request).unwrap();

    assert_eq!(
        fetcher.byte_calls.load(Ordering::SeqCst),
        1,
        "image fetched at most once per identity"
    );
    assert_eq!(
        ocr.calls.load(Ordering::SeqCst),
        3,
        "one OCR pass (3 readable columns) across both runs"
    );

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn ddr_ephemeral_acquisition_goes_through_the_rendering_page() {
    let root = temp_root("ddr-ephemeral");

    let page_url = "https://3icecream.com/ren/chart?songId=OQbPd16P80O8bi0o66b8dd1iO9b0PlI6&speedmod=2&diff=3";
    let mut bytes = HashMap::new();
    bytes.insert(
        "https://3icecream.com/chart_imgs/max300.png".to_string(),
        chart_png(640, 80, Color::new(20, 20, 120)),
    );
    let mut pages = HashMap::new();
    pages.insert(
        page_url.to_string(),
        r#"<html><body><img src="/chart_imgs/max300.png"></body></html>"#.to_string(),
    );
    let fetcher = Arc::new(FakeFetcher {
        bytes,
        pages,
        ..Default::default()
    });

    let ctx = Context {
        data_root: root.clone(),
        fetcher: Box::new(Arc::clone(&fetcher)),
        ocr: Box::new(ScriptedDigits::new(&["2", "3", "4"])),
    };

    let strat = ThreeIceCream::new().unwrap();
    let request = Request {
        song: "MAX 300".into(),
        difficulty: "ESP".into(),
        bar_clip: Some("1-3".into()),
    };

    let payload = strat.execute(&ctx, &request).unwrap();
    assert_eq!(payload.author, "MAX 300 (ESP 15)");
    assert!(payload
        .fields
        .iter()
        .any(|(n, v)| n == "Version First Appeared" && v == "DDR MAX"));

    // Measures [1,2,3,4], clip 1-3: columns 0..2, 320 px at 160 spacing.
    let clip = OwnedImage::open(&payload.image_path).unwrap();
    assert_eq!(clip.width(), 320);

    // A different range on the same chart reuses both caches.
    let request2 = Request {
        bar_clip: Some("1-2".into()),
        ..request.clone()
    };
    let payload2 = strat.execute(&ctx, &request2).unwrap();
    assert_ne!(payload2.image_path, payload.image_path);

    assert_eq!(fetcher.page_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.byte_calls.load(Ordering::SeqCst), 1);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn invalid_inputs_short_circuit() {
    let root = temp_root("invalid-inputs");
    let ctx = context(root.clone(), FakeFetcher::default(), ScriptedDigits::default());
    let strat = SdvxIndex::new().unwrap();

    let base = Request {
        song: "ALBIDA".into(),
        difficulty: "16".into(),
        bar_clip: None,
    };

    let unknown_song = strat.execute(
        &ctx,
        &Request {
            song: "definitely not a song".into(),
            ..base.clone()
        },
    );
    assert!(matches!(unknown_song, Err(Error::UnknownSong(_))));

    let unknown_diff = strat.execute(
        &ctx,
        &Request {
            difficulty: "99".into(),
            ..base.clone()
        },
    );
    assert!(matches!(unknown_diff, Err(Error::UnknownDifficulty(_))));

    let bad_clip = strat.execute(
        &ctx,
        &Request {
            bar_clip: Some("30-20".into()),
            ..base.clone()
        },
    );
    assert!(matches!(bad_clip, Err(Error::BadBarClip(_))));

    // Validation failures never touch the cache tree.
    assert!(!root.join("sdvx").exists());
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn out_of_range_clip_is_an_input_error() {
    let root = temp_root("out-of-range");

    let mut fetcher = FakeFetcher::default();
    fetcher.bytes.insert(
        "https://sdvxindex.com/images/column/albida/exh.png".to_string(),
        chart_png(1016, 60, Color::WHITE),
    );
    let ctx = context(root.clone(), fetcher, ScriptedDigits::new(&["5", "9", "15"]));

    let strat = SdvxIndex::new().unwrap();
    let result = strat.execute(
        &ctx,
        &Request {
            song: "ALBIDA".into(),
            difficulty: "16".into(),
            bar_clip: Some("200-300".into()),
        },
    );
    assert!(matches!(
        result,
        Err(Error::RangeOutsideChart { start: 200, end: 300 })
    ));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn concurrent_requests_for_distinct_charts_get_their_own_images() {
    let root = temp_root("concurrent");

    // Three distinct identities, each a distinct solid color.
    let charts = [
        ("ALBIDA", "12", "albida", "2", "adv", Color::new(220, 30, 30)),
        ("ALBIDA", "16", "albida", "3", "exh", Color::new(30, 220, 30)),
        ("月光乱舞", "17", "gekkou_ranbu", "3", "exh", Color::new(30, 30, 220)),
    ];

    let mut fetcher = FakeFetcher::default();
    for (_, _, song_id, token, file, color) in &charts {
        fetcher.bytes.insert(
            format!("https://sdvxindex.com/images/column/{song_id}/{file}.png"),
            chart_png(1016, 60, *color),
        );
        // Pre-seed measures so the scripted OCR's answer order cannot matter.
        let identity = ChartIdentity {
            game: "sdvx",
            song_dir: song_id.to_string(),
            chart_key: format!("{song_id}-{token}"),
        };
        ColumnMeasures::from_values(vec![1, 5, 9, 15])
            .save(identity.measures_path(&root))
            .unwrap();
    }

    let ctx = context(root.clone(), fetcher, ScriptedDigits::default());
    let strat = SdvxIndex::new().unwrap();

    std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for (title, level, _, _, _, color) in &charts {
            let ctx = &ctx;
            let strat = &strat;
            handles.push(scope.spawn(move || {
                let payload = strat
                    .execute(
                        ctx,
                        &Request {
                            song: title.to_string(),
                            difficulty: level.to_string(),
                            bar_clip: None,
                        },
                    )
                    .unwrap();
                let clip = OwnedImage::open(&payload.image_path).unwrap();
                // Every requester gets the image for *their* identity.
                assert_eq!(clip.as_image().pixel_at(10, 10), *color);
                payload.image_path
            }));
        }

        let paths: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| paths.iter().filter(|q| *q == p).count() == 1));
    });

    let _ = std::fs::remove_dir_all(&root);
}
