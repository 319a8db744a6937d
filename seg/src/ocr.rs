//! OCR capability.
//!
//! The scanner never talks to an OCR engine directly; it goes through the
//! [`DigitReader`] trait so tests (and alternative engines) can be slotted in.
//! The production implementation relies on `ocr-rs` (Rust PaddleOCR bindings).
//! OCR engines are sensitive to input quality, so the scanner binarizes and
//! upscales before calling into this module.

use std::path::Path;

use anyhow::{Context, Result};

use crate::Image;

/// Reads the digits printed in a small image region.
///
/// Implementations return the recognized digit string, or an empty string
/// when nothing legible was found. Non-digit characters must be stripped.
pub trait DigitReader: Send + Sync {
    fn read_digits(&self, image: Image) -> String;
}

pub struct PaddleDigits {
    engine: ocr_rs::OcrEngine,
}

impl PaddleDigits {
    /// Initialize the OCR engine with the given model paths.
    pub fn try_new(
        detection: impl AsRef<Path>,
        recognition: impl AsRef<Path>,
        charset: impl AsRef<Path>,
    ) -> Result<Self> {
        let thread_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let engine = ocr_rs::OcrEngine::new(
            detection,
            recognition,
            charset,
            Some(ocr_rs::OcrEngineConfig {
                backend: ocr_rs::Backend::CPU,
                thread_count,
                // Measure labels are small stylized digits; High precision costs
                // CPU but misreads less, and the corrector can only do so much.
                precision_mode: ocr_rs::PrecisionMode::High,
                enable_parallel: thread_count > 1,
                min_result_confidence: 0.5,
                ..Default::default()
            }),
        )
        .context("failed to initialize OCR engine")?;

        Ok(Self { engine })
    }
}

impl DigitReader for PaddleDigits {
    fn read_digits(&self, image: Image) -> String {
        let image = ocr_rs::preprocess::rgb_to_image(&image.get_bytes(), image.width(), image.height());

        match self.engine.recognize(&image) {
            Ok(results) => results
                .into_iter()
                .flat_map(|v| v.text.chars().collect::<Vec<_>>())
                .filter(|c| c.is_ascii_digit())
                .collect(),
            Err(_) => String::new(),
        }
    }
}
