//! The .chart text codec.
//!
//! The format is line oriented: a header line `[SectionName]` opens a
//! section that runs until the next header or end of input. Three sections
//! are modeled: `[Song]` (key/value metadata), `[SyncTrack]` (tempo
//! changes, `tick = B milliBpm`), and `[ExpertSingle]` (notes,
//! `tick = N storedPitch durationTicks`).
//!
//! Parsing is deliberately tolerant: any line inside a recognized section
//! that does not match the expected shape is skipped, so charts carrying
//! event types this crate does not model (time signatures, star power
//! phrases, ...) still parse. Skipping is an explicit branch of the state
//! machine below, not an accident of pattern matching.

use super::{bpm_to_milli, milli_to_bpm, ChartDocument, ChartError};
use std::fs;
use std::path::Path;

/// Section the parser is currently inside.
///
/// A header line transitions to the matching state, or to `Idle` for
/// headers this codec does not recognize. End of input implicitly returns
/// to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Idle,
    InSong,
    InSyncTrack,
    InExpertSingle,
}

/// Returns the section name if the line is a `[Name]` header.
fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.trim())
}

/// Strips one pair of surrounding double quotes, if present.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Processes one `[Song]` section line.
///
/// Accepts both the flat `Key = Value` form and the legacy brace-delimited
/// block; the `{` and `}` framing lines of the legacy form carry no data
/// and are consumed here. Known keys are matched case-sensitively; unknown
/// keys go to the metadata side table untouched.
fn parse_song_line(line: &str, doc: &mut ChartDocument) {
    if line == "{" || line == "}" {
        return;
    }
    let Some((key, value)) = line.split_once('=') else {
        return;
    };
    let key = key.trim();
    // Unknown keys keep the raw value, quotes included, so pass-through
    // is opaque; known keys get the quotes stripped.
    let raw = value.trim();
    let value = unquote(raw);

    let meta = &mut doc.metadata;
    match key {
        "Name" => meta.name = value.to_string(),
        "Artist" => meta.artist = value.to_string(),
        "Album" => meta.album = value.to_string(),
        "Genre" => meta.genre = value.to_string(),
        "Year" => meta.year = value.to_string(),
        "Charter" => meta.charter = value.to_string(),
        "Resolution" => {
            if let Ok(resolution) = value.parse::<u32>() {
                doc.resolution = resolution;
            }
        }
        "Difficulty" => {
            if let Ok(difficulty) = value.parse::<i64>() {
                meta.difficulty = difficulty;
            }
        }
        "Offset" => {
            if let Ok(offset) = value.parse::<f64>() {
                meta.offset = offset;
            }
        }
        "Preview_start" => {
            if let Ok(start) = value.parse::<f64>() {
                meta.preview_start = start;
            }
        }
        "Preview_end" => {
            if let Ok(end) = value.parse::<f64>() {
                meta.preview_end = end;
            }
        }
        "MusicStream" => meta.music_stream = value.to_string(),
        _ => meta.extra.push((key.to_string(), raw.to_string())),
    }
}

/// Processes one `[SyncTrack]` line. Only `tick = B milliBpm` is modeled;
/// anything else (including `TS` time-signature lines) is skipped.
fn parse_sync_line(line: &str, doc: &mut ChartDocument) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [tick, "=", "B", milli] = tokens.as_slice() else {
        return;
    };
    let (Ok(tick), Ok(milli)) = (tick.parse::<u64>(), milli.parse::<u64>()) else {
        return;
    };
    doc.sync_track.add(tick, milli_to_bpm(milli));
}

/// Processes one `[ExpertSingle]` line. Only `tick = N storedPitch duration`
/// is modeled; anything else is skipped.
fn parse_note_line(line: &str, doc: &mut ChartDocument) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [tick, "=", "N", pitch, duration] = tokens.as_slice() else {
        return;
    };
    let (Ok(tick), Ok(pitch), Ok(duration)) = (
        tick.parse::<u64>(),
        pitch.parse::<i32>(),
        duration.parse::<u64>(),
    ) else {
        return;
    };
    // A stored pitch that cannot be mapped to a canonical pitch is
    // treated like any other unusable line.
    let Some(note) = super::NoteTrack::decode(tick, pitch, duration) else {
        return;
    };
    doc.note_track.add(note.tick, note.pitch, note.duration_ticks);
}

/// Parses chart text into a document.
///
/// Never fails on structure: an empty input yields an empty document with
/// default metadata, and malformed lines inside recognized sections are
/// skipped. Only file-level helpers can return errors.
pub fn parse(text: &str) -> ChartDocument {
    let mut doc = ChartDocument::new();
    let mut state = ParserState::Idle;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = section_header(line) {
            state = match name {
                "Song" => ParserState::InSong,
                "SyncTrack" => ParserState::InSyncTrack,
                "ExpertSingle" => ParserState::InExpertSingle,
                _ => ParserState::Idle,
            };
            continue;
        }
        match state {
            ParserState::Idle => {}
            ParserState::InSong => parse_song_line(line, &mut doc),
            ParserState::InSyncTrack => parse_sync_line(line, &mut doc),
            ParserState::InExpertSingle => parse_note_line(line, &mut doc),
        }
    }

    doc
}

/// Formats a float in its canonical chart form: integral values print
/// without a decimal point.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Serializes a document to chart text.
///
/// Emits `[Song]`, `[SyncTrack]`, and `[ExpertSingle]` in that order, one
/// statement per line, blank line after each section. The `[Song]` block
/// is always the flat `Key = Value` form; the legacy brace form is never
/// reproduced. Tempo lines carry the integer milli-BPM, never a float.
///
/// # Errors
///
/// Returns `ChartError::Encoding` if a tempo cannot be represented as
/// milli-BPM.
pub fn serialize(doc: &ChartDocument) -> Result<String, ChartError> {
    let meta = &doc.metadata;
    let mut out = String::new();

    out.push_str("[Song]\n");
    out.push_str(&format!("Name = \"{}\"\n", meta.name));
    out.push_str(&format!("Artist = \"{}\"\n", meta.artist));
    out.push_str(&format!("Album = \"{}\"\n", meta.album));
    out.push_str(&format!("Genre = \"{}\"\n", meta.genre));
    out.push_str(&format!("Year = \"{}\"\n", meta.year));
    out.push_str(&format!("Charter = \"{}\"\n", meta.charter));
    out.push_str(&format!("Resolution = {}\n", doc.resolution));
    out.push_str(&format!("Difficulty = {}\n", meta.difficulty));
    out.push_str(&format!("Offset = {}\n", format_number(meta.offset)));
    out.push_str(&format!(
        "Preview_start = {}\n",
        format_number(meta.preview_start)
    ));
    out.push_str(&format!(
        "Preview_end = {}\n",
        format_number(meta.preview_end)
    ));
    out.push_str(&format!("MusicStream = \"{}\"\n", meta.music_stream));
    for (key, value) in &meta.extra {
        out.push_str(&format!("{} = {}\n", key, value));
    }
    out.push('\n');

    out.push_str("[SyncTrack]\n");
    for change in doc.sync_track.changes() {
        let milli = bpm_to_milli(change.bpm)?;
        out.push_str(&format!("{} = B {}\n", change.tick, milli));
    }
    out.push('\n');

    out.push_str("[ExpertSingle]\n");
    for (tick, stored_pitch, duration) in doc.note_track.encode() {
        out.push_str(&format!("{} = N {} {}\n", tick, stored_pitch, duration));
    }
    out.push('\n');

    Ok(out)
}

/// Reads and parses a chart file.
///
/// # Errors
///
/// Returns `ChartError::Format` if the file cannot be read.
pub fn read_chart<P: AsRef<Path>>(path: P) -> Result<ChartDocument, ChartError> {
    let text = fs::read_to_string(path)?;
    Ok(parse(&text))
}

/// Serializes a document and writes it to a file.
///
/// # Errors
///
/// Returns `ChartError::Encoding` on milli-BPM overflow and
/// `ChartError::Format` if the file cannot be written.
pub fn write_chart<P: AsRef<Path>>(doc: &ChartDocument, path: P) -> Result<(), ChartError> {
    let text = serialize(doc)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::DEFAULT_RESOLUTION;

    const EXAMPLE: &str =
        "[SyncTrack]\n0 = B 120000\n480 = B 140000\n\n[ExpertSingle]\n0 = N 0 192\n192 = N 2 192\n";

    #[test]
    fn test_parse_example() {
        let doc = parse(EXAMPLE);

        let tempos: Vec<(u64, f64)> = doc
            .sync_track
            .changes()
            .iter()
            .map(|c| (c.tick, c.bpm))
            .collect();
        assert_eq!(tempos, vec![(0, 120.0), (480, 140.0)]);

        let notes: Vec<(u64, i32, u64)> = doc
            .note_track
            .notes()
            .iter()
            .map(|n| (n.tick, n.pitch, n.duration_ticks))
            .collect();
        assert_eq!(notes, vec![(0, 60, 192), (192, 62, 192)]);

        assert_eq!(doc.resolution, DEFAULT_RESOLUTION);
    }

    #[test]
    fn test_serialize_reproduces_track_lines() {
        let doc = parse(EXAMPLE);
        let text = serialize(&doc).unwrap();
        assert!(text.contains("[SyncTrack]\n0 = B 120000\n480 = B 140000\n"));
        assert!(text.contains("[ExpertSingle]\n0 = N 0 192\n192 = N 2 192\n"));
    }

    #[test]
    fn test_serialized_output_round_trips() {
        let mut doc = parse(EXAMPLE);
        doc.metadata.name = "Test Song".to_string();
        doc.metadata.offset = 1.25;
        let text = serialize(&doc).unwrap();
        let back = parse(&text);
        assert_eq!(back, doc);
    }

    #[test]
    fn test_malformed_sync_line_skipped() {
        let doc = parse("[SyncTrack]\n480 = B\n0 = B 120000\n");
        assert_eq!(doc.sync_track.len(), 1);
        assert_eq!(doc.sync_track.changes()[0].tick, 0);
    }

    #[test]
    fn test_time_signature_line_skipped() {
        let doc = parse("[SyncTrack]\n0 = TS 4\n0 = B 120000\n");
        assert_eq!(doc.sync_track.len(), 1);
    }

    #[test]
    fn test_unknown_section_ignored() {
        let doc = parse("[Events]\n0 = E \"section Intro\"\n\n[SyncTrack]\n0 = B 120000\n");
        assert_eq!(doc.sync_track.len(), 1);
        assert!(doc.note_track.is_empty());
    }

    #[test]
    fn test_song_section_flat_form() {
        let doc = parse("[Song]\nName = \"My Song\"\nResolution = 480\nOffset = 0.5\n");
        assert_eq!(doc.metadata.name, "My Song");
        assert_eq!(doc.resolution, 480);
        assert_eq!(doc.metadata.offset, 0.5);
    }

    #[test]
    fn test_song_section_legacy_brace_form() {
        let text = "[Song]\n{\n Name = \"Legacy\"\n Resolution = 192\n Difficulty = 4\n}\n";
        let doc = parse(text);
        assert_eq!(doc.metadata.name, "Legacy");
        assert_eq!(doc.metadata.difficulty, 4);
    }

    #[test]
    fn test_unknown_song_keys_survive_round_trip() {
        let doc = parse("[Song]\nName = \"X\"\nPlayer2 = bass\nMediaType = cd\n");
        assert_eq!(
            doc.metadata.extra,
            vec![
                ("Player2".to_string(), "bass".to_string()),
                ("MediaType".to_string(), "cd".to_string())
            ]
        );

        let text = serialize(&doc).unwrap();
        assert!(text.contains("Player2 = bass\n"));
        assert!(text.contains("MediaType = cd\n"));

        let back = parse(&text);
        assert_eq!(back.metadata.extra, doc.metadata.extra);
    }

    #[test]
    fn test_huge_stored_pitch_skipped() {
        let doc = parse("[ExpertSingle]\n0 = N 2147483647 0\n0 = N 0 192\n");
        assert_eq!(doc.note_track.len(), 1);
        assert_eq!(doc.note_track.notes()[0].pitch, 60);
    }

    #[test]
    fn test_quoted_unknown_value_stays_quoted() {
        let doc = parse("[Song]\nLoadingPhrase = \" get ready \"\n");
        assert_eq!(
            doc.metadata.extra,
            vec![("LoadingPhrase".to_string(), "\" get ready \"".to_string())]
        );

        let text = serialize(&doc).unwrap();
        assert!(text.contains("LoadingPhrase = \" get ready \"\n"));

        let back = parse(&text);
        assert_eq!(back.metadata.extra, doc.metadata.extra);
    }

    #[test]
    fn test_empty_input_yields_default_document() {
        let doc = parse("");
        assert_eq!(doc, crate::chart::ChartDocument::new());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(1.25), "1.25");
        assert_eq!(format_number(-0.5), "-0.5");
    }

    #[test]
    fn test_read_write_chart_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.chart");

        let doc = parse(EXAMPLE);
        write_chart(&doc, &path).unwrap();
        let back = read_chart(&path).unwrap();
        assert_eq!(back, doc);
    }
}
