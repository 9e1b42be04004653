//! song.ini metadata projection.
//!
//! Projects a chart's song metadata into the flat `song.ini` descriptor
//! that sits next to `notes.chart` in a song directory. This is a one-way
//! serializer; nothing in this crate parses song.ini back.

use super::SongMetadata;

/// Renders the song.ini descriptor text.
///
/// `song_length_ms` comes from the audio service's duration probe and is
/// written in milliseconds. Keys and defaults follow the Clone Hero
/// convention: `icon` defaults to `Untitled`, the playlist/track fields
/// default to empty.
pub fn project_song_ini(meta: &SongMetadata, song_length_ms: u64) -> String {
    let mut out = String::new();
    out.push_str("[song]\n");
    out.push_str(&format!("name = {}\n", meta.name));
    out.push_str(&format!("artist = {}\n", meta.artist));
    out.push_str(&format!("album = {}\n", meta.album));
    out.push_str(&format!("genre = {}\n", meta.genre));
    out.push_str(&format!("year = {}\n", meta.year));
    out.push_str(&format!("song_length = {}\n", song_length_ms));
    out.push_str(&format!("charter = {}\n", meta.charter));
    out.push_str(&format!("diff_guitar = {}\n", meta.difficulty));
    out.push_str(&format!(
        "preview_start_time = {:.2}\n",
        meta.preview_start
    ));
    out.push_str(&format!("delay = {:.2}\n", meta.offset));
    out.push_str("icon = Untitled\n");
    out.push_str("playlist_track = \n");
    out.push_str("track = \n");
    out.push_str("album_track = \n");
    out.push_str("loading_phrase = \n");
    out
}
