//! Bridge between chart documents and a timed event stream.
//!
//! The event stream is the interchange contract with MIDI-capable sinks:
//! an ordered sequence of tempo changes and note-on/note-off events, with
//! tick units relative to the document's resolution (analogous to ticks
//! per quarter note). `to_events` and `from_events` are pure in-memory
//! transformations; the submodules adapt the stream to Standard MIDI
//! Files.

mod midi_export;
mod midi_import;

pub use midi_export::write_events;
pub use midi_import::read_events;

use crate::chart::ChartDocument;
use std::collections::HashMap;
use thiserror::Error;

/// A single timed event in the interchange stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimedEvent {
    /// Tempo change to `bpm` at `tick`.
    Tempo { tick: u64, bpm: f64 },
    /// Note starts sounding at `tick`. Pitch is canonical (60 = middle).
    NoteOn { tick: u64, pitch: i32 },
    /// Note stops sounding at `tick`.
    NoteOff { tick: u64, pitch: i32 },
}

impl TimedEvent {
    /// Returns the tick position of the event.
    pub fn tick(&self) -> u64 {
        match *self {
            TimedEvent::Tempo { tick, .. }
            | TimedEvent::NoteOn { tick, .. }
            | TimedEvent::NoteOff { tick, .. } => tick,
        }
    }

    /// Tie-break rank for events at the same tick: tempo changes first,
    /// then note-ons, then note-offs. Keeps ordering deterministic so no
    /// sink-dependent ambiguity can creep in.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            TimedEvent::Tempo { .. } => 0,
            TimedEvent::NoteOn { .. } => 1,
            TimedEvent::NoteOff { .. } => 2,
        }
    }
}

/// A note-on with no matching note-off, found while reconstructing a
/// document from an event stream. Collected as a warning; the note is
/// dropped from the result and the conversion continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("note-on at tick {tick} (pitch {pitch}) has no matching note-off")]
pub struct IncompleteNote {
    pub tick: u64,
    pub pitch: i32,
}

/// Errors reading or writing Standard MIDI Files.
#[derive(Debug, Error)]
pub enum MidiError {
    /// File could not be read or written.
    #[error("MIDI I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// MIDI parsing failed.
    #[error("MIDI parse error: {0}")]
    Parse(String),

    /// Unsupported MIDI format or timing.
    #[error("unsupported MIDI format: {0}")]
    Unsupported(String),
}

/// Translates a document into an ordered timed event stream.
///
/// One `Tempo` event is emitted per tempo change. If the tempo map is
/// non-empty but its first change sits after tick 0, that change is
/// additionally emitted at tick 0, so a playback sink always receives an
/// explicit starting tempo. Each note becomes a `NoteOn` at its tick and
/// a `NoteOff` at `tick + duration_ticks`. The result is stably sorted by
/// tick, with ties broken tempo < note-on < note-off.
pub fn to_events(doc: &ChartDocument) -> Vec<TimedEvent> {
    let mut events = Vec::new();

    if let Some(first) = doc.sync_track.first() {
        if first.tick != 0 {
            events.push(TimedEvent::Tempo {
                tick: 0,
                bpm: first.bpm,
            });
        }
    }
    for change in doc.sync_track.changes() {
        events.push(TimedEvent::Tempo {
            tick: change.tick,
            bpm: change.bpm,
        });
    }

    for note in doc.note_track.notes() {
        events.push(TimedEvent::NoteOn {
            tick: note.tick,
            pitch: note.pitch,
        });
        events.push(TimedEvent::NoteOff {
            tick: note.end_tick(),
            pitch: note.pitch,
        });
    }

    events.sort_by_key(|e| (e.tick(), e.rank()));
    events
}

/// Reconstructs a document from a timed event stream.
///
/// Events are processed in tick order (the input is re-sorted with the
/// same tie-break as `to_events`, so unsorted input is accepted). Each
/// note-on is paired with the next note-off of the same pitch, first
/// match wins (FIFO per pitch). Notes land in the result in note-on
/// order, so a `to_events` stream reconstructs the original track even
/// when same-tick notes have different durations. Note-offs with no open
/// note are ignored. Note-ons left open at the end of the stream are
/// dropped from the result and reported in the returned warning list;
/// they never abort the conversion.
pub fn from_events(events: &[TimedEvent], resolution: u32) -> (ChartDocument, Vec<IncompleteNote>) {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| (e.tick(), e.rank()));

    let mut doc = ChartDocument::new();
    doc.resolution = resolution;

    // Each note-on claims a slot immediately; the matching note-off fills
    // in the duration later. Slots that stay unfilled are incomplete.
    let mut open: HashMap<i32, Vec<usize>> = HashMap::new();
    let mut slots: Vec<(u64, i32, Option<u64>)> = Vec::new();

    for event in &sorted {
        match *event {
            TimedEvent::Tempo { tick, bpm } => doc.sync_track.add(tick, bpm),
            TimedEvent::NoteOn { tick, pitch } => {
                open.entry(pitch).or_default().push(slots.len());
                slots.push((tick, pitch, None));
            }
            TimedEvent::NoteOff { tick, pitch } => {
                if let Some(claimed) = open.get_mut(&pitch) {
                    if !claimed.is_empty() {
                        let slot = claimed.remove(0);
                        let start = slots[slot].0;
                        slots[slot].2 = Some(tick.saturating_sub(start));
                    }
                }
            }
        }
    }

    let mut warnings = Vec::new();
    for (tick, pitch, duration) in slots {
        match duration {
            Some(duration) => doc.note_track.add(tick, pitch, duration),
            None => warnings.push(IncompleteNote { tick, pitch }),
        }
    }

    (doc, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{parse, DEFAULT_RESOLUTION};

    fn example_doc() -> ChartDocument {
        parse(
            "[SyncTrack]\n0 = B 120000\n480 = B 140000\n\n\
             [ExpertSingle]\n0 = N 0 192\n192 = N 2 192\n",
        )
    }

    #[test]
    fn test_to_events_example() {
        let events = to_events(&example_doc());
        assert_eq!(
            events,
            vec![
                TimedEvent::Tempo { tick: 0, bpm: 120.0 },
                TimedEvent::NoteOn { tick: 0, pitch: 60 },
                TimedEvent::NoteOn { tick: 192, pitch: 62 },
                TimedEvent::NoteOff { tick: 192, pitch: 60 },
                TimedEvent::NoteOff { tick: 384, pitch: 62 },
                TimedEvent::Tempo { tick: 480, bpm: 140.0 },
            ]
        );
    }

    #[test]
    fn test_bootstrap_tempo_at_origin() {
        let doc = parse("[SyncTrack]\n960 = B 150000\n");
        let events = to_events(&doc);
        assert_eq!(
            events,
            vec![
                TimedEvent::Tempo { tick: 0, bpm: 150.0 },
                TimedEvent::Tempo {
                    tick: 960,
                    bpm: 150.0
                },
            ]
        );
    }

    #[test]
    fn test_no_duplicate_bootstrap_when_first_change_at_zero() {
        let doc = parse("[SyncTrack]\n0 = B 120000\n");
        let events = to_events(&doc);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_same_tick_ordering() {
        let doc = parse(
            "[SyncTrack]\n192 = B 130000\n\n[ExpertSingle]\n0 = N 0 192\n192 = N 2 96\n",
        );
        let events = to_events(&doc);
        // At tick 192: tempo, then note-on (pitch 62), then note-off (pitch 60).
        let at_192: Vec<&TimedEvent> = events.iter().filter(|e| e.tick() == 192).collect();
        assert_eq!(at_192.len(), 3);
        assert!(matches!(at_192[0], TimedEvent::Tempo { .. }));
        assert!(matches!(at_192[1], TimedEvent::NoteOn { pitch: 62, .. }));
        assert!(matches!(at_192[2], TimedEvent::NoteOff { pitch: 60, .. }));
    }

    #[test]
    fn test_round_trip_through_events() {
        let doc = example_doc();
        let events = to_events(&doc);
        let (back, warnings) = from_events(&events, doc.resolution);
        assert!(warnings.is_empty());
        assert_eq!(back.note_track, doc.note_track);
        assert_eq!(back.resolution, doc.resolution);
    }

    #[test]
    fn test_round_trip_keeps_order_of_same_tick_notes() {
        // Two notes starting together with different durations: their
        // note-offs arrive in swapped order, but the track order must
        // follow the note-ons.
        let mut doc = ChartDocument::new();
        doc.note_track.add(0, 60, 100);
        doc.note_track.add(0, 62, 50);

        let events = to_events(&doc);
        let (back, warnings) = from_events(&events, doc.resolution);
        assert!(warnings.is_empty());
        assert_eq!(back.note_track, doc.note_track);
    }

    #[test]
    fn test_unmatched_note_on_dropped_and_reported() {
        let events = vec![
            TimedEvent::NoteOn { tick: 0, pitch: 60 },
            TimedEvent::NoteOff { tick: 192, pitch: 60 },
            TimedEvent::NoteOn {
                tick: 384,
                pitch: 64,
            },
        ];
        let (doc, warnings) = from_events(&events, DEFAULT_RESOLUTION);
        assert_eq!(doc.note_track.len(), 1);
        assert_eq!(doc.note_track.notes()[0].pitch, 60);
        assert_eq!(
            warnings,
            vec![IncompleteNote {
                tick: 384,
                pitch: 64
            }]
        );
    }

    #[test]
    fn test_fifo_pairing_per_pitch() {
        // Two overlapping notes of the same pitch: first on pairs with
        // first off.
        let events = vec![
            TimedEvent::NoteOn { tick: 0, pitch: 60 },
            TimedEvent::NoteOn {
                tick: 100,
                pitch: 60,
            },
            TimedEvent::NoteOff {
                tick: 200,
                pitch: 60,
            },
            TimedEvent::NoteOff {
                tick: 300,
                pitch: 60,
            },
        ];
        let (doc, warnings) = from_events(&events, DEFAULT_RESOLUTION);
        assert!(warnings.is_empty());
        let notes: Vec<(u64, u64)> = doc
            .note_track
            .notes()
            .iter()
            .map(|n| (n.tick, n.duration_ticks))
            .collect();
        assert_eq!(notes, vec![(0, 200), (100, 200)]);
    }

    #[test]
    fn test_stray_note_off_ignored() {
        let events = vec![TimedEvent::NoteOff {
            tick: 100,
            pitch: 60,
        }];
        let (doc, warnings) = from_events(&events, DEFAULT_RESOLUTION);
        assert!(doc.note_track.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_from_events_collects_tempos() {
        let events = vec![
            TimedEvent::Tempo { tick: 0, bpm: 120.0 },
            TimedEvent::Tempo {
                tick: 480,
                bpm: 140.0,
            },
        ];
        let (doc, _) = from_events(&events, 480);
        assert_eq!(doc.resolution, 480);
        assert_eq!(doc.sync_track.len(), 2);
        assert_eq!(doc.sync_track.changes()[1].bpm, 140.0);
    }
}
