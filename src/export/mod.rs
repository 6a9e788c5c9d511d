// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Export of a piece to a Standard MIDI File.
//!
//! This module provides:
//! - Lowering of notes into delta-timed, per-track event streams
//! - A container encoder seam with a Type 1 SMF writer
//! - Output path normalization

pub mod pipeline;
pub mod smf;

pub use pipeline::{
    lower, ExportPlan, ExportSettings, NoteEvent, NoteEventKind, TrackPlan, PERCUSSION_CHANNEL,
    TICKS_PER_BEAT,
};
pub use smf::{ContainerEncoder, SmfWriter};

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::timeline::Piece;

/// Extensions accepted as already naming a MIDI file
const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// File that was written
    pub path: PathBuf,
    /// Tracks in the file
    pub tracks: usize,
    /// Notes in the file
    pub notes: usize,
    /// Human readable confirmation
    pub message: String,
}

/// Append `.mid` unless the path already carries a MIDI extension
pub fn normalize_export_path(path: &str) -> PathBuf {
    let has_midi_extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MIDI_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
        .unwrap_or(false);

    if has_midi_extension {
        PathBuf::from(path)
    } else {
        PathBuf::from(format!("{}.mid", path))
    }
}

/// Lower `piece` and write it with `encoder`
pub fn export_piece(
    piece: &Piece,
    settings: &ExportSettings,
    encoder: &dyn ContainerEncoder,
    path: &str,
) -> Result<ExportSummary> {
    let plan = lower(piece, settings)?;
    let path = normalize_export_path(path);
    encoder.encode(&plan, &path)?;

    let tracks = plan.tracks.len();
    let notes = plan.note_count();
    Ok(ExportSummary {
        message: format!(
            "Exported MIDI to {} ({} tracks, {} notes)",
            path.display(),
            tracks,
            notes
        ),
        path,
        tracks,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::NoteSpec;

    #[test]
    fn test_normalize_export_path() {
        assert_eq!(normalize_export_path("song"), PathBuf::from("song.mid"));
        assert_eq!(normalize_export_path("song.mid"), PathBuf::from("song.mid"));
        assert_eq!(normalize_export_path("song.MIDI"), PathBuf::from("song.MIDI"));
        assert_eq!(normalize_export_path("song.wav"), PathBuf::from("song.wav.mid"));
        assert_eq!(normalize_export_path("out/take.2"), PathBuf::from("out/take.2.mid"));
    }

    #[test]
    fn test_export_piece() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("demo");

        let mut piece = Piece::new();
        piece.add_track("piano", "piano").unwrap();
        piece.add_track("silent", "flute").unwrap();
        piece
            .add_notes(vec![
                NoteSpec::new("piano", 60, 0, 1),
                NoteSpec::new("piano", 64, 1, 1),
            ])
            .unwrap();

        let summary = export_piece(
            &piece,
            &ExportSettings::default(),
            &SmfWriter::new(),
            target.to_str().unwrap(),
        )
        .unwrap();

        assert_eq!(summary.tracks, 1);
        assert_eq!(summary.notes, 2);
        assert!(summary.path.ends_with("demo.mid"));
        assert!(summary.message.starts_with("Exported MIDI to "));
        assert!(summary.message.ends_with("(1 tracks, 2 notes)"));
        assert!(summary.path.exists());
    }
}
