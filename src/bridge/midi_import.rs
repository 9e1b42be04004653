//! Standard MIDI File input for the timed event stream.
//!
//! Reads .mid/.midi files and flattens them into the interchange stream.
//! All tracks are merged; only tempo and note events are modeled. A
//! note-on with velocity 0 is treated as a note-off, per MIDI convention.
//!
//! # Limitations
//!
//! - SMPTE timecode timing is not supported
//! - Format 2 (sequential) files are not supported
//! - Other MIDI events (program change, controllers, pitch bend, ...) are
//!   ignored

use super::{MidiError, TimedEvent};
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::fs;
use std::path::Path;

/// Reads a MIDI file into a timed event stream.
///
/// Returns the stream (sorted by tick with the deterministic tie-break)
/// and the file's ticks-per-beat value, which becomes the chart
/// resolution for a subsequent `from_events`.
///
/// # Errors
///
/// Returns `MidiError::Io` if the file cannot be read,
/// `MidiError::Parse` if it is not valid SMF, and
/// `MidiError::Unsupported` for timecode timing or Format 2 files.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<(Vec<TimedEvent>, u32), MidiError> {
    let data = fs::read(path)?;
    let smf = Smf::parse(&data).map_err(|e| MidiError::Parse(e.to_string()))?;

    let resolution = match smf.header.timing {
        Timing::Metrical(tpb) => tpb.as_int() as u32,
        Timing::Timecode(_, _) => {
            return Err(MidiError::Unsupported(
                "SMPTE timecode timing not supported".to_string(),
            ))
        }
    };
    if smf.header.format == Format::Sequential {
        return Err(MidiError::Unsupported(
            "Format 2 (sequential) MIDI files not supported".to_string(),
        ));
    }

    let mut events = Vec::new();
    for track in &smf.tracks {
        let mut current_tick = 0u64;
        for event in track {
            current_tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(usec_per_beat)) => {
                    let usec = usec_per_beat.as_int();
                    if usec > 0 {
                        events.push(TimedEvent::Tempo {
                            tick: current_tick,
                            bpm: 60_000_000.0 / usec as f64,
                        });
                    }
                }
                TrackEventKind::Midi { message, .. } => match message {
                    MidiMessage::NoteOn { key, vel } => {
                        let pitch = key.as_int() as i32;
                        if vel.as_int() > 0 {
                            events.push(TimedEvent::NoteOn {
                                tick: current_tick,
                                pitch,
                            });
                        } else {
                            events.push(TimedEvent::NoteOff {
                                tick: current_tick,
                                pitch,
                            });
                        }
                    }
                    MidiMessage::NoteOff { key, .. } => {
                        events.push(TimedEvent::NoteOff {
                            tick: current_tick,
                            pitch: key.as_int() as i32,
                        });
                    }
                    _ => {} // Ignore other channel messages
                },
                _ => {} // Ignore other meta events and SysEx
            }
        }
    }

    events.sort_by_key(|e| (e.tick(), e.rank()));
    Ok((events, resolution))
}
