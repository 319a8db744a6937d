//! Column-range cropping.

use anyhow::{bail, Result};

use crate::{ColumnRange, OwnedImage};

/// Crop the columns between `range.start` (inclusive) and `range.end`
/// (exclusive at `spacing_px * end`) out of a full chart image.
///
/// The crop keeps the full image height. Bounds are clamped to the image, so
/// a resolver hit on the final column still yields the chart's right edge.
pub fn crop_columns(chart: &OwnedImage, spacing_px: u32, range: ColumnRange) -> Result<OwnedImage> {
    let width = chart.width();
    let x_start = (spacing_px as u64 * range.start as u64).min(width as u64) as u32;
    let x_end = (spacing_px as u64 * range.end as u64).min(width as u64) as u32;

    if x_end <= x_start {
        bail!("empty crop: columns {}..{} at spacing {spacing_px}", range.start, range.end);
    }

    Ok(chart
        .as_image()
        .sub_image(x_start, 0, x_end - x_start, chart.height())
        .to_owned_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn crop_bounds_follow_column_spacing() {
        let chart = OwnedImage::filled(200, 30, Color::WHITE);
        let out = crop_columns(&chart, 20, ColumnRange { start: 2, end: 7 }).unwrap();
        assert_eq!((out.width(), out.height()), (100, 30));
    }

    #[test]
    fn crop_clamps_to_chart_edge() {
        let chart = OwnedImage::filled(100, 30, Color::WHITE);
        let out = crop_columns(&chart, 20, ColumnRange { start: 3, end: 9 }).unwrap();
        assert_eq!(out.width(), 40);
    }

    #[test]
    fn degenerate_range_is_an_error() {
        let chart = OwnedImage::filled(100, 30, Color::WHITE);
        assert!(crop_columns(&chart, 20, ColumnRange { start: 5, end: 5 }).is_err());
        assert!(crop_columns(&chart, 20, ColumnRange { start: 6, end: 8 }).is_err());
    }
}
