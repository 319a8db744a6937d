//! Chart acquisition.
//!
//! HTTP access goes through the [`Fetcher`] trait so the pipeline and its
//! tests never depend on the network. The production implementation wraps a
//! `ureq` agent with a global timeout and a small bounded retry around
//! transport errors (the one failure class worth retrying; HTTP status
//! errors and everything downstream stay single-attempt).

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;

pub trait Fetcher: Send + Sync {
    /// GET a binary asset.
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// GET a rendering page as text (ephemeral-asset sources only).
    fn fetch_page(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    agent: ureq::Agent,
    retries: u32,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str, retries: u32) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .user_agent(user_agent)
            .build()
            .into();
        Self { agent, retries }
    }

    fn call_with_retry<T>(
        &self,
        url: &str,
        mut call: impl FnMut() -> std::result::Result<T, ureq::Error>,
    ) -> Result<T> {
        let mut last = None;
        for attempt in 0..=self.retries {
            match call() {
                Ok(v) => return Ok(v),
                // Status errors are not transient; don't hammer the host.
                Err(err @ ureq::Error::StatusCode(_)) => {
                    return Err(anyhow::Error::new(err).context(format!("GET {url}")));
                }
                Err(err) => {
                    log::warn!("GET {url} attempt {} failed: {err}", attempt + 1);
                    last = Some(err);
                }
            }
        }
        Err(anyhow::Error::new(last.expect("at least one attempt")).context(format!("GET {url}")))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.call_with_retry(url, || {
            let mut res = self.agent.get(url).call()?;
            res.body_mut().read_to_vec()
        })
    }

    fn fetch_page(&self, url: &str) -> Result<String> {
        self.call_with_retry(url, || {
            let mut res = self.agent.get(url).call()?;
            res.body_mut().read_to_string()
        })
    }
}

// ----------

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Fetch `url` into `path` unless it is already cached.
///
/// Acquisition is at-most-once per path: an existing file short-circuits the
/// network entirely. Downloads land in a uniquely named sibling temp file and
/// are renamed into place, so a failed transfer never poisons the cache and
/// concurrent writers for the same identity converge on identical bytes.
pub fn download_cached(fetcher: &dyn Fetcher, url: &str, path: &Path) -> Result<()> {
    if path.is_file() {
        log::info!("cached file already found, using {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    let bytes = fetcher.fetch_bytes(url)?;

    let tmp = path.with_extension(format!(
        "tmp-{}-{}",
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::write(&tmp, &bytes).with_context(|| format!("write temp {}", tmp.display()))?;

    // Replace existing file (Windows-friendly).
    if std::fs::rename(&tmp, path).is_err() {
        let _ = std::fs::remove_file(path);
        std::fs::rename(&tmp, path).with_context(|| format!("persist {}", path.display()))?;
    }

    log::info!("downloaded {} -> {}", url, path.display());
    Ok(())
}

static IMG_SRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]*\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());

/// Pull the single `<img>` source out of a rendering page.
pub fn extract_img_src(html: &str) -> Option<&str> {
    IMG_SRC_REGEX
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Resolve an `<img src>` against the page it came from.
pub fn absolutize(page_url: &str, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }
    // scheme://host, everything up to the path.
    let origin = match page_url.find("://") {
        Some(i) => match page_url[i + 3..].find('/') {
            Some(j) => &page_url[..i + 3 + j],
            None => page_url,
        },
        None => page_url,
    };
    if src.starts_with('/') {
        format!("{origin}{src}")
    } else {
        format!("{origin}/{src}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_img_src() {
        let html = r#"<html><body><img alt="chart" src="/chart_imgs/abc123.png"></body></html>"#;
        assert_eq!(extract_img_src(html), Some("/chart_imgs/abc123.png"));
        assert_eq!(extract_img_src("<html><body>no image</body></html>"), None);
    }

    #[test]
    fn absolutizes_relative_sources() {
        assert_eq!(
            absolutize("https://3icecream.com/ren/chart?songId=x", "/chart_imgs/a.png"),
            "https://3icecream.com/chart_imgs/a.png"
        );
        assert_eq!(
            absolutize("https://example.com/page", "https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }
}
