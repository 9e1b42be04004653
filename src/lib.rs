//! chartsmith - convert between Clone Hero .chart files and timed MIDI events.
//!
//! This library provides the chart data model, the .chart text codec, the
//! song.ini metadata projection, and the bridge to/from an ordered
//! timed-event stream.

pub mod audio;
pub mod bridge;
pub mod chart;
pub mod pipeline;

// Re-export commonly used types
pub use bridge::{from_events, to_events, IncompleteNote, TimedEvent};
pub use chart::{
    ChartDocument, ChartError, NoteEvent, NoteTrack, SongMetadata, TempoChange, TempoMap,
    DEFAULT_RESOLUTION, MIDDLE_PITCH,
};
