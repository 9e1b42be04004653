//! Note track representation.
//!
//! Notes carry a canonical pitch (MIDI convention, 60 = middle C) and a
//! tick duration. The chart text format stores pitch as an offset from the
//! middle pitch, so a canonical pitch of 62 serializes as `2`. The offset
//! arithmetic is exact; no precision is lost in either direction.

use super::MIDDLE_PITCH;
use serde::{Deserialize, Serialize};

/// A single note with tick timing and canonical pitch.
///
/// The sounding interval is `[tick, tick + duration_ticks)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Start position in ticks.
    pub tick: u64,

    /// Canonical pitch (60 = middle reference pitch).
    pub pitch: i32,

    /// Duration in ticks. Zero is structurally valid.
    pub duration_ticks: u64,
}

impl NoteEvent {
    /// Returns the end tick of this note (start + duration).
    pub fn end_tick(&self) -> u64 {
        self.tick.saturating_add(self.duration_ticks)
    }

    /// Returns the pitch as stored in chart text (offset from 60).
    pub fn stored_pitch(&self) -> i32 {
        self.pitch - MIDDLE_PITCH
    }
}

/// Ordered collection of notes.
///
/// Notes are kept in insertion order. Overlapping notes are representable
/// and preserved as given; no musical validation is performed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTrack {
    notes: Vec<NoteEvent>,
}

impl NoteTrack {
    /// Creates an empty note track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a note with a canonical pitch.
    pub fn add(&mut self, tick: u64, pitch: i32, duration_ticks: u64) {
        self.notes.push(NoteEvent {
            tick,
            pitch,
            duration_ticks,
        });
    }

    /// Returns the notes in document order.
    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// Returns the number of notes.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns true if the track holds no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Encodes every note as a (tick, stored pitch, duration) triple.
    pub fn encode(&self) -> Vec<(u64, i32, u64)> {
        self.notes
            .iter()
            .map(|n| (n.tick, n.stored_pitch(), n.duration_ticks))
            .collect()
    }

    /// Decodes a (tick, stored pitch, duration) triple into a note with a
    /// canonical pitch. Returns None when the canonical pitch would
    /// overflow the pitch type.
    pub fn decode(tick: u64, stored_pitch: i32, duration_ticks: u64) -> Option<NoteEvent> {
        Some(NoteEvent {
            tick,
            pitch: stored_pitch.checked_add(MIDDLE_PITCH)?,
            duration_ticks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_pitch_offset() {
        let mut track = NoteTrack::new();
        track.add(0, 60, 192);
        track.add(192, 62, 192);
        track.add(384, 59, 96);
        assert_eq!(
            track.encode(),
            vec![(0, 0, 192), (192, 2, 192), (384, -1, 96)]
        );
    }

    #[test]
    fn test_decode_is_exact_inverse() {
        for &(tick, pitch, dur) in &[(0u64, 60, 192u64), (10, 0, 0), (5, 127, 1), (7, -3, 4)] {
            let note = NoteEvent {
                tick,
                pitch,
                duration_ticks: dur,
            };
            let decoded = NoteTrack::decode(tick, note.stored_pitch(), dur);
            assert_eq!(decoded, Some(note));
        }
    }

    #[test]
    fn test_decode_rejects_pitch_overflow() {
        assert_eq!(NoteTrack::decode(0, i32::MAX, 0), None);
        assert!(NoteTrack::decode(0, i32::MAX - MIDDLE_PITCH, 0).is_some());
    }

    #[test]
    fn test_end_tick() {
        let note = NoteEvent {
            tick: 100,
            pitch: 60,
            duration_ticks: 200,
        };
        assert_eq!(note.end_tick(), 300);
    }

    #[test]
    fn test_overlapping_notes_preserved() {
        let mut track = NoteTrack::new();
        track.add(0, 60, 480);
        track.add(240, 60, 480);
        assert_eq!(track.len(), 2);
        assert_eq!(track.notes()[1].tick, 240);
    }
}
