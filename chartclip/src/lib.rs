//! Chart clipping service: fetch a rhythm-game chart strip, locate the
//! requested measures via OCR and hand back the cropped image plus display
//! metadata. The CLI in `main.rs` is one front end; the library surface is
//! what a bot layer would call.

pub mod config;
pub mod error;
pub mod fetch;
pub mod strategy;
