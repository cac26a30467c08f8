// Tracklist module: reads a tracklist export (JSON) into an ordered list
// of tracks and formats the summary printed after a successful upload.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One tracklist entry. The position inside the list is significant: it
/// becomes the `sections-{i}-*` index of the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub artist: String,
    pub song: String,
    /// Start offset inside the cloudcast, in seconds.
    pub start_time: u64,
}

#[derive(Debug, Error)]
pub enum TracklistError {
    #[error("The file {} does not exist!", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The file {} can not be parsed: {source}!", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Shape of the export file. `label`, `url`, `time_str` and `episode`
/// are accepted but not used.
#[derive(Deserialize, Debug)]
struct TracklistFile {
    tracklist: Vec<TracklistEntry>,
}

#[derive(Deserialize, Debug)]
struct TracklistEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    /// Missing or null means the track starts at 0.
    #[serde(default)]
    time: Option<StartTime>,
}

/// Exports write `time` either as a number or as a numeric string.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StartTime {
    Seconds(u64),
    Text(String),
}

impl StartTime {
    fn seconds(&self) -> Result<u64, String> {
        match self {
            StartTime::Seconds(s) => Ok(*s),
            StartTime::Text(t) => t
                .trim()
                .parse()
                .map_err(|_| format!("invalid start time {:?}", t)),
        }
    }
}

/// Parse the tracklist file at `path`, keeping the order of the file.
pub fn parse_tracklist(path: &Path) -> Result<Vec<Track>, TracklistError> {
    let file = File::open(path).map_err(|source| TracklistError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |source: serde_json::Error| TracklistError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let parsed: TracklistFile = serde_json::from_reader(BufReader::new(file)).map_err(parse_err)?;

    parsed
        .tracklist
        .into_iter()
        .map(|entry| {
            let start_time = entry
                .time
                .map_or(Ok(0), |t| t.seconds())
                .map_err(|msg| parse_err(<serde_json::Error as serde::de::Error>::custom(msg)))?;
            Ok(Track {
                artist: entry.artist,
                song: entry.title,
                start_time,
            })
        })
        .collect()
}

/// Like [`parse_tracklist`], but a missing or malformed file only costs the
/// tracklist: the problem is reported on stderr and the upload goes on.
pub fn load_tracklist(path: &Path) -> Option<Vec<Track>> {
    match parse_tracklist(path) {
        Ok(tracks) => {
            log::debug!("parsed {} tracks from {}", tracks.len(), path.display());
            Some(tracks)
        }
        Err(e) => {
            crate::ui::print_error(&e.to_string());
            None
        }
    }
}

/// Write the `Tracklist` summary, numbering entries from 1.
pub fn write_tracklist<W: Write>(out: &mut W, tracks: &[Track]) -> std::io::Result<()> {
    writeln!(out, "Tracklist")?;
    for (i, track) in tracks.iter().enumerate() {
        writeln!(out, "{}. {}-{}", i + 1, track.artist, track.song)?;
    }
    Ok(())
}
