// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Harmony checks of notes against the chord timeline.
//!
//! Flagging is advisory. A note is flagged when its pitch class is not a
//! tone of the chord sounding at the note's start. Notes with no chord
//! over them are never flagged.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{ComposeError, Result};
use crate::music::pitch::{enharmonic_closure, PitchClass};
use crate::timeline::intervals::chord_at;
use crate::timeline::{check_range, Note, Piece};

/// Outcome of a flagging pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagReport {
    /// Notes now flagged
    pub flagged_count: usize,
    /// Human readable summary
    pub message: String,
}

/// Notes deleted by [`remove_flagged`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovedNotes {
    /// The removed notes as they were before deletion
    pub removed_notes: Vec<Note>,
    /// How many were removed
    pub count: usize,
}

/// Whether `pitch` belongs to a chord given its spelled tones
pub fn is_chord_tone(pitch: u8, tones: &BTreeSet<String>) -> bool {
    tones.contains(PitchClass::of_midi(pitch).sharp_name())
}

/// Re-flag notes on `tracks` starting inside `[start, end)`.
///
/// All existing flags are cleared first, including those outside the
/// requested tracks and range, so repeated calls give the same result.
pub fn flag_notes(piece: &mut Piece, tracks: &[String], start: f64, end: f64) -> Result<FlagReport> {
    if piece.chords().is_empty() {
        return Err(ComposeError::NoChordProgression);
    }
    check_range(start, end)?;

    // Decide every flag before touching the notes
    let mut decisions = Vec::with_capacity(piece.all_notes().len());
    for note in piece.all_notes() {
        if !tracks.contains(&note.track) {
            decisions.push(false);
            continue;
        }
        let beat = match note.start_beat() {
            Ok(beat) => beat,
            Err(_) => {
                decisions.push(false);
                continue;
            }
        };
        if beat < start || beat >= end {
            decisions.push(false);
            continue;
        }
        let flagged = match chord_at(piece.chords(), beat) {
            Some(chord) => !is_chord_tone(note.pitch, &enharmonic_closure(&chord.chord_tones)),
            None => false,
        };
        decisions.push(flagged);
    }

    let mut flagged_count = 0;
    for (note, flagged) in piece.notes_mut().iter_mut().zip(decisions) {
        note.flagged = flagged;
        if flagged {
            flagged_count += 1;
        }
    }

    Ok(FlagReport {
        flagged_count,
        message: format!(
            "Flagged {} note(s) that don't match the chord progression.",
            flagged_count
        ),
    })
}

/// Delete every flagged note, returning what was removed
pub fn remove_flagged(piece: &mut Piece) -> RemovedNotes {
    let notes = piece.notes_mut();
    let mut removed_notes = Vec::new();
    notes.retain(|note| {
        if note.flagged {
            let mut record = note.clone();
            record.flagged = false;
            removed_notes.push(record);
            false
        } else {
            true
        }
    });

    let count = removed_notes.len();
    RemovedNotes {
        removed_notes,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{BeatValue, ChordSpan, NoteSpec};

    fn tones(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn piece_with(notes: Vec<NoteSpec>, chords: Vec<ChordSpan>) -> Piece {
        let mut piece = Piece::new();
        piece.add_track("piano", "piano").unwrap();
        piece.add_track("bass", "bass").unwrap();
        piece.add_notes(notes).unwrap();
        piece.insert_chords(&chords);
        piece
    }

    fn tracks(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_requires_chords() {
        let mut piece = piece_with(vec![NoteSpec::new("piano", 60, 0, 1)], Vec::new());
        assert!(matches!(
            flag_notes(&mut piece, &tracks(&["piano"]), 0.0, 4.0),
            Err(ComposeError::NoChordProgression)
        ));
    }

    #[test]
    fn test_flags_non_chord_tones() {
        let mut piece = piece_with(
            vec![
                NoteSpec::new("piano", 60, 0, 1), // C
                NoteSpec::new("piano", 62, 1, 1), // D
                NoteSpec::new("piano", 67, 2, 1), // G
            ],
            vec![ChordSpan::new(0.0, "C", 4.0, tones(&["C", "E", "G"]))],
        );
        let report = flag_notes(&mut piece, &tracks(&["piano"]), 0.0, 4.0).unwrap();
        assert_eq!(report.flagged_count, 1);
        let flagged: Vec<u8> = piece
            .all_notes()
            .iter()
            .filter(|n| n.flagged)
            .map(|n| n.pitch)
            .collect();
        assert_eq!(flagged, vec![62]);
    }

    #[test]
    fn test_no_chord_means_no_flag() {
        let mut piece = piece_with(
            vec![NoteSpec::new("piano", 61, 8, 1)],
            vec![ChordSpan::new(0.0, "C", 4.0, tones(&["C", "E", "G"]))],
        );
        let report = flag_notes(&mut piece, &tracks(&["piano"]), 0.0, 16.0).unwrap();
        assert_eq!(report.flagged_count, 0);
    }

    #[test]
    fn test_track_and_range_filters() {
        let mut piece = piece_with(
            vec![
                NoteSpec::new("piano", 61, 0, 1),
                NoteSpec::new("bass", 37, 0, 1),
                NoteSpec::new("piano", 61, 4, 1),
            ],
            vec![ChordSpan::new(0.0, "C", 8.0, tones(&["C", "E", "G"]))],
        );
        let report = flag_notes(&mut piece, &tracks(&["piano"]), 0.0, 4.0).unwrap();
        assert_eq!(report.flagged_count, 1);
        assert!(piece.all_notes()[0].flagged);
        assert!(!piece.all_notes()[1].flagged);
        assert!(!piece.all_notes()[2].flagged);
    }

    #[test]
    fn test_enharmonic_spellings() {
        // C# note against a chord spelled with Db, and Db-range pitch vs C#
        let mut piece = piece_with(
            vec![
                NoteSpec::new("piano", 61, 0, 1),
                NoteSpec::new("piano", 70, 4, 1),
            ],
            vec![
                ChordSpan::new(0.0, "Db", 4.0, tones(&["Db", "F", "Ab"])),
                ChordSpan::new(4.0, "Gm7", 4.0, tones(&["G", "Bb", "D", "F"])),
            ],
        );
        let report = flag_notes(&mut piece, &tracks(&["piano"]), 0.0, 8.0).unwrap();
        assert_eq!(report.flagged_count, 0);
    }

    #[test]
    fn test_flagging_is_recomputed() {
        let mut piece = piece_with(
            vec![
                NoteSpec::new("piano", 61, 0, 1),
                NoteSpec::new("bass", 37, 0, 1),
            ],
            vec![ChordSpan::new(0.0, "C", 4.0, tones(&["C", "E", "G"]))],
        );
        flag_notes(&mut piece, &tracks(&["bass"]), 0.0, 4.0).unwrap();
        assert!(piece.all_notes()[1].flagged);

        // A pass over piano clears the earlier bass flag
        let first = flag_notes(&mut piece, &tracks(&["piano"]), 0.0, 4.0).unwrap();
        assert!(!piece.all_notes()[1].flagged);
        let snapshot = piece.all_notes().to_vec();

        let second = flag_notes(&mut piece, &tracks(&["piano"]), 0.0, 4.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(piece.all_notes(), snapshot.as_slice());
    }

    #[test]
    fn test_remove_flagged() {
        let mut piece = piece_with(
            vec![
                NoteSpec::new("piano", 60, 0, 1),
                NoteSpec::new("piano", 61, "1/2", 1),
            ],
            vec![ChordSpan::new(0.0, "C", 4.0, tones(&["C", "E", "G"]))],
        );
        flag_notes(&mut piece, &tracks(&["piano"]), 0.0, 4.0).unwrap();

        let removed = remove_flagged(&mut piece);
        assert_eq!(removed.count, 1);
        assert_eq!(removed.removed_notes[0].pitch, 61);
        assert_eq!(removed.removed_notes[0].start, BeatValue::from("1/2"));
        assert!(!removed.removed_notes[0].flagged);
        assert_eq!(piece.all_notes().len(), 1);
    }
}
