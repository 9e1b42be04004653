//! Tempo map representation.
//!
//! Tempo changes are stored as (tick, BPM) pairs in encounter order. The
//! chart text format stores tempo as an integer milli-BPM value
//! (`round(bpm * 1000)`), so round trips are exact to three decimal places
//! of BPM and lossy beyond that. This is an accepted precision bound of the
//! format, not a defect.

use super::ChartError;
use serde::{Deserialize, Serialize};

/// A single tempo change at a tick position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    /// Tick position of the change.
    pub tick: u64,

    /// Tempo in beats per minute.
    pub bpm: f64,
}

/// Encodes a BPM value as integer milli-BPM, rounding half up.
///
/// # Errors
///
/// Returns `ChartError::Encoding` if the value is negative, non-finite,
/// or too large to fit in a u64 after scaling.
pub fn bpm_to_milli(bpm: f64) -> Result<u64, ChartError> {
    let milli = (bpm * 1000.0).round();
    if !milli.is_finite() || milli < 0.0 || milli >= u64::MAX as f64 {
        return Err(ChartError::Encoding { bpm });
    }
    Ok(milli as u64)
}

/// Decodes an integer milli-BPM value back to BPM.
pub fn milli_to_bpm(milli: u64) -> f64 {
    milli as f64 / 1000.0
}

/// Ordered collection of tempo changes.
///
/// Changes are kept in insertion order; `add` never reorders. Ticks are
/// expected to be non-decreasing in encounter order, and duplicates are
/// retained as given (later entries win at resolution time).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TempoMap {
    changes: Vec<TempoChange>,
}

impl TempoMap {
    /// Creates an empty tempo map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tempo change.
    ///
    /// The caller is responsible for supplying ticks in non-decreasing
    /// order if strict ordering is required downstream.
    pub fn add(&mut self, tick: u64, bpm: f64) {
        self.changes.push(TempoChange { tick, bpm });
    }

    /// Returns the tempo changes in document order.
    pub fn changes(&self) -> &[TempoChange] {
        &self.changes
    }

    /// Returns the first tempo change, if any.
    pub fn first(&self) -> Option<&TempoChange> {
        self.changes.first()
    }

    /// Returns the number of tempo changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if the map holds no tempo changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Encodes every change as a (tick, milli-BPM) pair.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::Encoding` if any BPM cannot be represented.
    pub fn encode(&self) -> Result<Vec<(u64, u64)>, ChartError> {
        self.changes
            .iter()
            .map(|c| Ok((c.tick, bpm_to_milli(c.bpm)?)))
            .collect()
    }

    /// Decodes a (tick, milli-BPM) pair into a tempo change.
    pub fn decode(tick: u64, milli: u64) -> TempoChange {
        TempoChange {
            tick,
            bpm: milli_to_bpm(milli),
        }
    }
}
