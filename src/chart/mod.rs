//! Chart data structures and the .chart text codec.
//!
//! This module provides the core types for representing a chart document:
//! tempo changes, notes, song metadata, and the line-oriented text format
//! used by Clone Hero style rhythm games.

mod codec;
mod document;
mod ini;
mod metadata;
mod note;
mod tempo;

pub use codec::{parse, read_chart, serialize, write_chart};
pub use document::ChartDocument;
pub use ini::project_song_ini;
pub use metadata::SongMetadata;
pub use note::{NoteEvent, NoteTrack};
pub use tempo::{bpm_to_milli, milli_to_bpm, TempoChange, TempoMap};

use thiserror::Error;

/// Default resolution (ticks per reference unit) when a chart does not
/// declare one. Matches the Clone Hero convention.
pub const DEFAULT_RESOLUTION: u32 = 192;

/// The reference "middle" pitch. Chart note values are stored as offsets
/// from this pitch; 60 is MIDI middle C.
pub const MIDDLE_PITCH: i32 = 60;

/// Errors produced by the chart model and codec.
///
/// Structural mismatches in chart text are never errors (malformed lines
/// inside a recognized section are skipped), so these cover only numeric
/// encoding overflow and I/O-level failures.
#[derive(Debug, Error)]
pub enum ChartError {
    /// A tempo value cannot be represented as integer milli-BPM.
    #[error("tempo {bpm} BPM cannot be encoded as milli-BPM")]
    Encoding { bpm: f64 },

    /// Reading or writing chart text failed at the I/O level.
    #[error("failed to read or write chart text: {0}")]
    Format(#[from] std::io::Error),
}
