//! Standard MIDI File output for the timed event stream.
//!
//! Writes the stream as SMF Format 0 with metrical timing equal to the
//! document resolution, so chart ticks map one-to-one onto MIDI ticks.
//! Tempo events become set-tempo meta events, note events become channel 0
//! note-on/note-off messages.

use super::{MidiError, TimedEvent};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::path::Path;

/// Velocity written for every note-on. Charts carry no dynamics.
const NOTE_VELOCITY: u8 = 96;

/// Maximum delta time representable in a MIDI track event.
const MAX_DELTA: u64 = 0x0FFF_FFFF;

/// Converts one event to a MIDI event kind, or None if it cannot be
/// represented (out-of-range pitch, non-positive tempo).
fn event_kind(event: &TimedEvent) -> Option<TrackEventKind<'static>> {
    match *event {
        TimedEvent::Tempo { bpm, .. } => {
            if !bpm.is_finite() || bpm <= 0.0 {
                tracing::warn!(bpm, "skipping non-positive tempo in MIDI export");
                return None;
            }
            let usec_per_beat = (60_000_000.0 / bpm).round();
            if !(1.0..=0xFF_FFFF as f64).contains(&usec_per_beat) {
                tracing::warn!(bpm, "skipping tempo outside MIDI range");
                return None;
            }
            Some(TrackEventKind::Meta(MetaMessage::Tempo(u24::new(
                usec_per_beat as u32,
            ))))
        }
        TimedEvent::NoteOn { pitch, .. } => {
            if !(0..=127).contains(&pitch) {
                tracing::warn!(pitch, "skipping out-of-range pitch in MIDI export");
                return None;
            }
            Some(TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(pitch as u8),
                    vel: u7::new(NOTE_VELOCITY),
                },
            })
        }
        TimedEvent::NoteOff { pitch, .. } => {
            if !(0..=127).contains(&pitch) {
                return None;
            }
            Some(TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(pitch as u8),
                    vel: u7::new(0),
                },
            })
        }
    }
}

/// Writes a timed event stream to a Standard MIDI File.
///
/// Events are re-sorted with the stream's deterministic tie-break before
/// delta encoding. Events that cannot be represented in MIDI (pitches
/// outside 0-127, non-positive tempos) are skipped with a warning rather
/// than altering the data.
///
/// # Errors
///
/// Returns `MidiError::Unsupported` if the resolution or a delta time
/// does not fit the SMF header fields, and `MidiError::Io` on write
/// failure.
pub fn write_events<P: AsRef<Path>>(
    events: &[TimedEvent],
    resolution: u32,
    path: P,
) -> Result<(), MidiError> {
    if resolution == 0 || resolution > 0x7FFF {
        return Err(MidiError::Unsupported(format!(
            "resolution {} does not fit metrical MIDI timing",
            resolution
        )));
    }

    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| (e.tick(), e.rank()));

    let mut track: Vec<TrackEvent> = Vec::new();
    let mut last_tick = 0u64;
    for event in &sorted {
        let Some(kind) = event_kind(event) else {
            continue;
        };
        let delta = event.tick().saturating_sub(last_tick);
        if delta > MAX_DELTA {
            return Err(MidiError::Unsupported(format!(
                "delta time {} exceeds the MIDI maximum",
                delta
            )));
        }
        track.push(TrackEvent {
            delta: u28::new(delta as u32),
            kind,
        });
        last_tick = event.tick();
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(resolution as u16)),
    ));
    smf.tracks.push(track);
    smf.save(path)?;
    Ok(())
}
