//! Column→measure mapping: persistence, correction, bar-range resolution.
//!
//! The scanner produces one measure number per column, with 0 marking columns
//! OCR could not read. The corrector repairs those (and misreads) from the
//! local trend, after which the map is strictly increasing and a bar range
//! can be resolved to pixel columns.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::BarRange;

/// Ordered column index → measure number mapping.
///
/// Index 0 is the leftmost column and is pinned to measure 1 by convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeasures {
    values: Vec<u32>,
}

/// Pixel-column bounds resolved from a bar range (start inclusive, end
/// exclusive at `spacing * end` when cropping).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnMeasures {
    pub fn from_values(values: Vec<u32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Load a previously saved map (string-keyed column→measure JSON object).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read measures {}", path.display()))?;
        let map: BTreeMap<String, u32> = serde_json::from_str(&json)
            .with_context(|| format!("parse measures {}", path.display()))?;

        let mut by_index = BTreeMap::new();
        for (key, value) in map {
            let index: usize = key
                .parse()
                .with_context(|| format!("non-numeric column key {key:?} in {}", path.display()))?;
            by_index.insert(index, value);
        }

        let len = by_index.last_key_value().map(|(k, _)| k + 1).unwrap_or(0);
        let values = (0..len).map(|i| by_index.get(&i).copied().unwrap_or(0)).collect();
        Ok(Self { values })
    }

    /// Persist the map in the same string-keyed object format `load` reads.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }

        let map: BTreeMap<String, u32> = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), *v))
            .collect();
        let json = serde_json::to_string(&map).context("serialize measures")?;
        std::fs::write(path, json).with_context(|| format!("write measures {}", path.display()))?;
        Ok(())
    }

    /// Repair OCR misreads using the local trend.
    ///
    /// The expected step is the mean first difference across the raw map,
    /// rounded to the nearest integer and clamped to at least 1 (an all-zero
    /// or shrinking map would otherwise produce a non-positive step and the
    /// output could never be strictly increasing). A single left-to-right
    /// pass replaces every value that fails to increase, or that jumps by at
    /// least `oob_tolerance`, with the preceding *corrected* value plus the
    /// expected step.
    pub fn adjusted(&self, oob_tolerance: u32) -> Self {
        let n = self.values.len();
        if n <= 1 {
            return Self::from_values(vec![1]);
        }

        // The first differences telescope: their sum is last - first.
        let first = self.values[0] as i64;
        let last = self.values[n - 1] as i64;
        let step = ((last - first) as f64 / (n - 1) as f64).round() as i64;
        let step = step.max(1) as u32;

        let mut out = Vec::with_capacity(n);
        out.push(1u32);
        for i in 1..n {
            let prev = out[i - 1];
            let value = self.values[i];
            if value <= prev || value - prev >= oob_tolerance {
                out.push(prev + step);
            } else {
                out.push(value);
            }
        }
        Self::from_values(out)
    }

    /// Resolve a bar range to the pixel columns bounding it.
    ///
    /// The start column is the *rightmost* column whose measure does not
    /// overshoot the start bar; the end column is the *leftmost* column whose
    /// measure reaches the end bar. `None` means the requested range lies
    /// outside the chart.
    pub fn resolve(&self, range: BarRange) -> Option<ColumnRange> {
        let start = self
            .values
            .iter()
            .rposition(|&v| v <= range.start)?;
        let end = self.values.iter().position(|&v| v >= range.end)?;
        Some(ColumnRange { start, end })
    }
}
