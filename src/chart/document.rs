//! Chart document container.
//!
//! A document aggregates song metadata, a resolution, one tempo map, and
//! one note track. Documents are plain owned values: one is constructed
//! per conversion request, handed through function arguments, and dropped
//! when the request completes. There is no shared or global instance.

use super::{NoteTrack, SongMetadata, TempoMap, DEFAULT_RESOLUTION};
use serde::{Deserialize, Serialize};

/// A complete chart: metadata, resolution, tempo map, note track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    /// Descriptive song metadata.
    pub metadata: SongMetadata,

    /// Ticks per reference unit. Carried through unchanged; tick values in
    /// the tempo map and note track are always interpreted relative to
    /// this value, and changing it never rescales them.
    pub resolution: u32,

    /// Tempo changes in document order.
    pub sync_track: TempoMap,

    /// Notes in document order.
    pub note_track: NoteTrack,
}

impl ChartDocument {
    /// Creates an empty document with default metadata and resolution 192.
    pub fn new() -> Self {
        Self {
            metadata: SongMetadata::default(),
            resolution: DEFAULT_RESOLUTION,
            sync_track: TempoMap::new(),
            note_track: NoteTrack::new(),
        }
    }

    /// Creates an empty document with the given metadata.
    pub fn with_metadata(metadata: SongMetadata) -> Self {
        Self {
            metadata,
            ..Self::new()
        }
    }
}

impl Default for ChartDocument {
    fn default() -> Self {
        Self::new()
    }
}
