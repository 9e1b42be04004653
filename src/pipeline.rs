//! Song conversion pipeline.
//!
//! Glue between the pure core and its collaborators: the audio service,
//! the metadata provider, and the filesystem. Each entry point builds one
//! owned `ChartDocument`, runs the conversion, and writes the outputs;
//! nothing here keeps state between calls, so the batch driver can fan
//! out over files freely.

use crate::audio::AudioService;
use crate::bridge::{from_events, read_events, to_events, write_events, IncompleteNote};
use crate::chart::{project_song_ini, read_chart, write_chart, SongMetadata};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supplies song metadata for a conversion.
///
/// Replaces interactive prompting: the binary wires in a JSON sidecar
/// provider, tests wire in fixed values.
pub trait MetadataProvider {
    fn song_metadata(&self) -> Result<SongMetadata>;
}

/// Provider returning the format defaults for every field.
#[derive(Debug, Default)]
pub struct DefaultMetadataProvider;

impl MetadataProvider for DefaultMetadataProvider {
    fn song_metadata(&self) -> Result<SongMetadata> {
        Ok(SongMetadata::default())
    }
}

/// Provider reading a JSON sidecar file. Absent fields fall back to the
/// format defaults via serde.
#[derive(Debug)]
pub struct JsonMetadataProvider {
    path: PathBuf,
}

impl JsonMetadataProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataProvider for JsonMetadataProvider {
    fn song_metadata(&self) -> Result<SongMetadata> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read metadata sidecar {}", self.path.display()))?;
        let meta = serde_json::from_str(&text)
            .with_context(|| format!("invalid metadata sidecar {}", self.path.display()))?;
        Ok(meta)
    }
}

/// What `build_song` produced for one song.
#[derive(Debug)]
pub struct BuildReport {
    /// Path of the written notes.chart.
    pub chart_path: PathBuf,

    /// Path of the written song.ini.
    pub ini_path: PathBuf,

    /// Note-ons that had no matching note-off and were dropped.
    pub dropped_notes: Vec<IncompleteNote>,
}

/// Builds a playable song directory from a MIDI file.
///
/// Reads the event stream from `midi_path`, reconstructs a chart document
/// at the file's resolution, attaches metadata from the provider and (if
/// given) the audio stream from the audio service, then writes
/// `notes.chart` and `song.ini` into `out_dir`. Unmatched note-ons are
/// logged and reported in the result, never fatal.
pub fn build_song(
    midi_path: &Path,
    audio_path: Option<&Path>,
    audio: &dyn AudioService,
    provider: &dyn MetadataProvider,
    out_dir: &Path,
) -> Result<BuildReport> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let (events, resolution) = read_events(midi_path)
        .with_context(|| format!("failed to read MIDI file {}", midi_path.display()))?;
    let (mut doc, dropped_notes) = from_events(&events, resolution);
    for note in &dropped_notes {
        tracing::warn!(tick = note.tick, pitch = note.pitch, "dropped incomplete note");
    }

    doc.metadata = provider.song_metadata()?;

    let mut song_length_ms = 0u64;
    if let Some(audio_path) = audio_path {
        let info = audio
            .prepare(audio_path, out_dir)
            .with_context(|| format!("failed to prepare audio {}", audio_path.display()))?;
        song_length_ms = info.length_ms;
        if let Some(name) = info.stream_path.file_name().and_then(|n| n.to_str()) {
            doc.metadata.music_stream = name.to_string();
        }
    }

    let chart_path = out_dir.join("notes.chart");
    write_chart(&doc, &chart_path)
        .with_context(|| format!("failed to write {}", chart_path.display()))?;

    let ini_path = out_dir.join("song.ini");
    fs::write(&ini_path, project_song_ini(&doc.metadata, song_length_ms))
        .with_context(|| format!("failed to write {}", ini_path.display()))?;

    tracing::info!(
        chart = %chart_path.display(),
        notes = doc.note_track.len(),
        tempos = doc.sync_track.len(),
        "built song"
    );

    Ok(BuildReport {
        chart_path,
        ini_path,
        dropped_notes,
    })
}

/// Converts a chart file to a Standard MIDI File.
pub fn export_chart(chart_path: &Path, midi_path: &Path) -> Result<()> {
    let doc = read_chart(chart_path)
        .with_context(|| format!("failed to read chart {}", chart_path.display()))?;
    let events = to_events(&doc);
    write_events(&events, doc.resolution, midi_path)
        .with_context(|| format!("failed to write MIDI file {}", midi_path.display()))?;
    tracing::info!(
        midi = %midi_path.display(),
        events = events.len(),
        "exported chart"
    );
    Ok(())
}

/// Outcome of one batch entry.
#[derive(Debug)]
pub struct BatchEntry {
    /// The source MIDI file.
    pub source: PathBuf,

    /// Build result for this file.
    pub result: Result<BuildReport>,
}

/// Finds every `.mid`/`.midi` file under `input_dir` and builds a song
/// directory for each under `out_root`, in parallel.
///
/// For each `foo.mid`, a sibling `foo.wav` is used as the audio stream
/// and a sibling `foo.json` as the metadata sidecar when present. Each
/// document is independent, so files are processed with rayon; one
/// failing file never aborts the rest.
pub fn batch_build<A: AudioService + Sync>(
    input_dir: &Path,
    out_root: &Path,
    audio: &A,
) -> Result<Vec<BatchEntry>> {
    let mut sources: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
        })
        .collect();
    sources.sort();

    let entries: Vec<BatchEntry> = sources
        .into_par_iter()
        .map(|source| {
            let result = build_one(&source, out_root, audio);
            if let Err(ref e) = result {
                tracing::error!(source = %source.display(), "build failed: {:#}", e);
            }
            BatchEntry { source, result }
        })
        .collect();

    Ok(entries)
}

/// Builds one batch entry: resolves the sidecar files next to the MIDI
/// source and delegates to `build_song`.
fn build_one<A: AudioService>(
    source: &Path,
    out_root: &Path,
    audio: &A,
) -> Result<BuildReport> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("song");
    let out_dir = out_root.join(stem);

    let audio_path = source.with_extension("wav");
    let audio_path = audio_path.exists().then_some(audio_path);

    let sidecar = source.with_extension("json");
    if sidecar.exists() {
        let provider = JsonMetadataProvider::new(sidecar);
        build_song(source, audio_path.as_deref(), audio, &provider, &out_dir)
    } else {
        build_song(
            source,
            audio_path.as_deref(),
            audio,
            &DefaultMetadataProvider,
            &out_dir,
        )
    }
}
