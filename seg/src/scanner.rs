//! Measure OCR scanner.
//!
//! A chart is a long horizontal strip split into fixed-width columns, each
//! printing a running measure number near the bottom edge. The scanner walks
//! every column, OCRs a small digit ROI and produces the raw column→measure
//! map. The pass is expensive (decode + one recognition call per column), so
//! callers persist the result and only scan once per chart.

use anyhow::{bail, Result};

use crate::{Color, ColumnMeasures, DigitReader, OwnedImage};

/// Per-game pixel geometry driving the column walk.
///
/// All offsets are in *unscaled* pixels; the scanner multiplies them by
/// `upscale` after resizing.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ScanGeometry {
    /// Left edge of the digit ROI, relative to the column's left edge.
    pub roi_x1_px: u32,
    /// Right edge of the digit ROI, relative to the column's left edge.
    pub roi_x2_px: u32,
    /// Height of the digit ROI, measured up from the image bottom.
    pub roi_height_px: u32,
    /// Width of one measure column.
    pub column_spacing_px: u32,
    /// Rows of UI chrome at the bottom edge to black out before OCR.
    pub bottom_cutoff_px: u32,
    /// Integer upscale factor applied before OCR (quality/latency trade-off).
    pub upscale: u32,
}

impl ScanGeometry {
    /// Number of columns that fit a chart of the given (unscaled) width.
    pub fn column_count(&self, width: u32) -> usize {
        (width as f64 / self.column_spacing_px as f64).round() as usize
    }
}

/// Scan every column of `chart` and return the raw measure map.
///
/// Column 0 is always measure 1 by convention; its label sits under the
/// chart header and does not OCR reliably. Columns whose ROI yields no
/// digits are recorded as 0, an explicit "unread" sentinel repaired later
/// by [`ColumnMeasures::adjusted`].
pub fn scan_measures(
    chart: &OwnedImage,
    geometry: &ScanGeometry,
    ocr: &dyn DigitReader,
) -> Result<ColumnMeasures> {
    let columns = geometry.column_count(chart.width());
    if columns == 0 {
        bail!(
            "no columns derivable from image width {} at spacing {}",
            chart.width(),
            geometry.column_spacing_px
        );
    }

    let scale = geometry.upscale.max(1);
    let column_width = geometry.column_spacing_px * scale;
    let roi_x1 = geometry.roi_x1_px * scale;
    let roi_x2 = geometry.roi_x2_px * scale;
    let roi_height = geometry.roi_height_px * scale;

    let mut prepared = chart.clone();
    prepared.upscale(scale);
    prepared.fill_bottom(geometry.bottom_cutoff_px * scale, Color::BLACK);
    let prepared = prepared.binarized_inverted();

    let view = prepared.as_image();
    let height = view.height();
    let roi_y = height.saturating_sub(roi_height);

    let mut values = vec![1u32];
    for column in 1..columns {
        let x1 = roi_x1 + column as u32 * column_width;
        let x2 = roi_x2 + column as u32 * column_width;
        let roi = view.sub_image(x1, roi_y, x2.saturating_sub(x1), height - roi_y);

        let text = ocr.read_digits(roi);
        // Unreadable or nonsense label: leave 0, the corrector fills it in.
        let measure = text.trim().parse::<u32>().unwrap_or(0);
        values.push(measure);
    }

    log::debug!("scanned {} columns ({} px wide)", values.len(), chart.width());
    Ok(ColumnMeasures::from_values(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted reader: pops one canned answer per call.
    struct Scripted(std::sync::Mutex<std::collections::VecDeque<&'static str>>);

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self(std::sync::Mutex::new(answers.iter().copied().collect()))
        }
    }

    impl DigitReader for Scripted {
        fn read_digits(&self, _image: crate::Image) -> String {
            self.0.lock().unwrap().pop_front().unwrap_or("").to_string()
        }
    }

    fn geometry() -> ScanGeometry {
        ScanGeometry {
            roi_x1_px: 2,
            roi_x2_px: 8,
            roi_height_px: 10,
            column_spacing_px: 20,
            bottom_cutoff_px: 2,
            upscale: 1,
        }
    }

    #[test]
    fn first_column_is_hardcoded_to_one() {
        let chart = OwnedImage::filled(80, 40, Color::WHITE);
        let ocr = Scripted::new(&["5", "9", "13"]);

        let measures = scan_measures(&chart, &geometry(), &ocr).unwrap();
        assert_eq!(measures.values(), &[1, 5, 9, 13]);
    }

    #[test]
    fn unreadable_columns_become_zero_sentinel() {
        let chart = OwnedImage::filled(80, 40, Color::WHITE);
        let ocr = Scripted::new(&["5", "", "x3"]);

        let measures = scan_measures(&chart, &geometry(), &ocr).unwrap();
        // "x3" is not a pure digit string; the reader contract strips
        // non-digits, but a scripted reader may still return junk - the
        // scanner falls back to the sentinel either way.
        assert_eq!(measures.values(), &[1, 5, 0, 0]);
    }

    #[test]
    fn zero_width_chart_is_an_error() {
        let chart = OwnedImage::filled(4, 40, Color::WHITE);
        let ocr = Scripted::new(&[]);
        assert!(scan_measures(&chart, &geometry(), &ocr).is_err());
    }

    #[test]
    fn column_count_rounds_to_nearest() {
        let g = geometry();
        assert_eq!(g.column_count(80), 4);
        assert_eq!(g.column_count(91), 5);
        assert_eq!(g.column_count(89), 4);
    }
}
