//! Measure segmentation for rhythm-game chart strips.
//!
//! Pipeline pieces, leaves first: image primitives ([`OwnedImage`]/[`Image`]),
//! a digit-OCR capability ([`DigitReader`]), the per-column measure scanner,
//! the measure-number corrector and bar-range resolver ([`ColumnMeasures`]),
//! and the column cropper. Orchestration lives in the `chartclip` crate.

mod image;
pub use image::*;
mod ocr;
pub use ocr::{DigitReader, PaddleDigits};
mod barclip;
pub use barclip::{parse_bar_clip, BarRange, DEFAULT_BAR_CLIP};
mod measures;
pub use measures::{ColumnMeasures, ColumnRange};
mod scanner;
pub use scanner::{scan_measures, ScanGeometry};
mod crop;
pub use crop::crop_columns;
