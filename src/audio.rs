//! Audio service seam.
//!
//! The core never touches audio; it only needs two facts from outside:
//! where the audio stream ends up inside the song directory, and how long
//! it is. `AudioService` is that seam. The built-in implementation probes
//! WAV files; compressed containers are rejected before any conversion
//! starts so a batch driver can report them per file.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the audio collaborator.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The input container is not one the service can handle.
    #[error("unsupported audio input: {path} (expected .wav)")]
    UnsupportedInput { path: PathBuf },

    /// File could not be read or copied.
    #[error("audio I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The audio data could not be decoded.
    #[error("failed to decode audio: {0}")]
    Decode(String),
}

/// What the rest of the pipeline needs to know about a song's audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInfo {
    /// Path of the stream inside the song directory.
    pub stream_path: PathBuf,

    /// Duration in milliseconds.
    pub length_ms: u64,
}

/// Places a song's audio stream into the song directory and reports its
/// duration.
pub trait AudioService {
    fn prepare(&self, input: &Path, song_dir: &Path) -> Result<AudioInfo, AudioError>;
}

/// WAV-only audio service backed by `hound`.
///
/// Copies the input into the song directory as `song.wav` and probes the
/// duration from the WAV header. Any other extension is an
/// `UnsupportedInput` error.
#[derive(Debug, Default)]
pub struct WavAudioService;

impl AudioService for WavAudioService {
    fn prepare(&self, input: &Path, song_dir: &Path) -> Result<AudioInfo, AudioError> {
        let is_wav = input
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if !is_wav {
            return Err(AudioError::UnsupportedInput {
                path: input.to_path_buf(),
            });
        }

        let reader = hound::WavReader::open(input).map_err(|e| AudioError::Decode(e.to_string()))?;
        let spec = reader.spec();
        let length_ms = if spec.sample_rate == 0 {
            0
        } else {
            reader.duration() as u64 * 1000 / spec.sample_rate as u64
        };

        let stream_path = song_dir.join("song.wav");
        if input != stream_path {
            fs::copy(input, &stream_path)?;
        }

        Ok(AudioInfo {
            stream_path,
            length_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_test_wav(path: &Path, sample_rate: u32, samples: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..samples {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_probes_duration_and_copies_stream() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.wav");
        let song_dir = dir.path().join("song");
        fs::create_dir_all(&song_dir).unwrap();

        // 2 seconds at 8 kHz
        write_test_wav(&input, 8000, 16_000);

        let info = WavAudioService.prepare(&input, &song_dir).unwrap();
        assert_eq!(info.length_ms, 2000);
        assert_eq!(info.stream_path, song_dir.join("song.wav"));
        assert!(info.stream_path.exists());
    }

    #[test]
    fn test_rejects_compressed_containers() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("song.mp3");
        fs::write(&input, b"fake").unwrap();

        let err = WavAudioService.prepare(&input, dir.path()).unwrap_err();
        assert!(matches!(err, AudioError::UnsupportedInput { .. }));
    }
}
