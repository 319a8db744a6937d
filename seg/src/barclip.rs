//! Bar-clip grammar.
//!
//! Users request a measure range as `<start>-<end>` with 1-3 digits on each
//! side, e.g. `20-30`. Fullwidth digits and dash variants (common when the
//! request is typed with an IME) are folded to ASCII before matching.

use std::sync::LazyLock;

use regex::Regex;

/// Range used when the user omits the bar clip entirely.
pub const DEFAULT_BAR_CLIP: &str = "1-15";

static BAR_CLIP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,3})-(\d{1,3})\s*$").unwrap());

/// Inclusive measure range requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarRange {
    pub start: u32,
    pub end: u32,
}

/// Parse a bar-clip string, defaulting to [`DEFAULT_BAR_CLIP`] when absent.
///
/// Returns `None` for anything that does not match the grammar or where the
/// start bar exceeds the end bar.
pub fn parse_bar_clip(text: Option<&str>) -> Option<BarRange> {
    let text = match text {
        Some(t) if !t.trim().is_empty() => fold_ascii(t),
        _ => DEFAULT_BAR_CLIP.to_string(),
    };

    let caps = BAR_CLIP_REGEX.captures(&text)?;
    // 1-3 digits always fit in u32.
    let start: u32 = caps[1].parse().ok()?;
    let end: u32 = caps[2].parse().ok()?;
    if start > end {
        return None;
    }
    Some(BarRange { start, end })
}

fn fold_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '－' | '–' | '—' | 'ー' => '-',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_range() {
        assert_eq!(parse_bar_clip(Some("20-30")), Some(BarRange { start: 20, end: 30 }));
    }

    #[test]
    fn leading_zeros_are_fine() {
        assert_eq!(parse_bar_clip(Some("030-045")), Some(BarRange { start: 30, end: 45 }));
    }

    #[test]
    fn start_after_end_is_invalid() {
        assert_eq!(parse_bar_clip(Some("30-20")), None);
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(parse_bar_clip(Some("abc")), None);
        assert_eq!(parse_bar_clip(Some("1-2-3")), None);
        assert_eq!(parse_bar_clip(Some("1234-5")), None);
    }

    #[test]
    fn omitted_uses_default() {
        assert_eq!(parse_bar_clip(None), Some(BarRange { start: 1, end: 15 }));
        assert_eq!(parse_bar_clip(Some("  ")), Some(BarRange { start: 1, end: 15 }));
    }

    #[test]
    fn fullwidth_digits_fold_to_ascii() {
        assert_eq!(parse_bar_clip(Some("２０－３０")), Some(BarRange { start: 20, end: 30 }));
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(parse_bar_clip(Some("  4-23 ")), Some(BarRange { start: 4, end: 23 }));
    }
}
