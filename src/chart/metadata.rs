//! Song metadata record.
//!
//! The `[Song]` section of a chart is a flat key/value block. Known keys
//! map onto typed fields with the defaults the format expects; keys this
//! crate does not model are preserved verbatim in an ordered side table so
//! a parse → serialize round trip never drops information.

use serde::{Deserialize, Serialize};

fn default_name() -> String {
    "Unknown Song".to_string()
}

fn default_artist() -> String {
    "Unknown Artist".to_string()
}

fn default_album() -> String {
    "Unknown Album".to_string()
}

fn default_genre() -> String {
    "Unknown".to_string()
}

fn default_year() -> String {
    "0".to_string()
}

fn default_charter() -> String {
    "Unknown Charter".to_string()
}

fn default_music_stream() -> String {
    "song.ogg".to_string()
}

/// Descriptive metadata for a chart document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongMetadata {
    /// Song title.
    #[serde(default = "default_name")]
    pub name: String,

    /// Performing artist.
    #[serde(default = "default_artist")]
    pub artist: String,

    /// Album title.
    #[serde(default = "default_album")]
    pub album: String,

    /// Genre label.
    #[serde(default = "default_genre")]
    pub genre: String,

    /// Release year. Kept as a string since charts in the wild carry
    /// values like "1998" and ", 1998" interchangeably.
    #[serde(default = "default_year")]
    pub year: String,

    /// Chart author.
    #[serde(default = "default_charter")]
    pub charter: String,

    /// Difficulty rating.
    #[serde(default)]
    pub difficulty: i64,

    /// Audio offset in seconds.
    #[serde(default)]
    pub offset: f64,

    /// Preview window start in seconds.
    #[serde(default)]
    pub preview_start: f64,

    /// Preview window end in seconds.
    #[serde(default)]
    pub preview_end: f64,

    /// File name of the audio stream referenced by the chart.
    #[serde(default = "default_music_stream")]
    pub music_stream: String,

    /// Unknown `[Song]` keys in encounter order, values kept raw
    /// (quoting included) so round trips are lossless.
    #[serde(skip)]
    pub extra: Vec<(String, String)>,
}

impl Default for SongMetadata {
    fn default() -> Self {
        Self {
            name: default_name(),
            artist: default_artist(),
            album: default_album(),
            genre: default_genre(),
            year: default_year(),
            charter: default_charter(),
            difficulty: 0,
            offset: 0.0,
            preview_start: 0.0,
            preview_end: 0.0,
            music_stream: default_music_stream(),
            extra: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let meta = SongMetadata::default();
        assert_eq!(meta.name, "Unknown Song");
        assert_eq!(meta.artist, "Unknown Artist");
        assert_eq!(meta.year, "0");
        assert_eq!(meta.difficulty, 0);
        assert_eq!(meta.music_stream, "song.ogg");
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let meta: SongMetadata =
            serde_json::from_str(r#"{"name": "Test Song", "difficulty": 3}"#).unwrap();
        assert_eq!(meta.name, "Test Song");
        assert_eq!(meta.difficulty, 3);
        assert_eq!(meta.artist, "Unknown Artist");
        assert_eq!(meta.music_stream, "song.ogg");
    }
}
