// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Notes on the beat timeline.
//!
//! Notes have no identity of their own. They are found and removed by
//! track and time range.

use serde::{Deserialize, Serialize};

use super::expr::BeatValue;
use crate::error::{ComposeError, Result};
use crate::music::MidiNote;

/// Latest beat a note may reach. At 480 ticks per beat this stays inside
/// the largest delta time a MIDI file can encode.
pub const MAX_BEAT: f64 = 500_000.0;

/// A note as submitted by a caller, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    /// Track the note belongs to
    pub track: String,
    /// MIDI pitch, validated to 0-127
    pub pitch: i64,
    /// Start position in beats
    pub start: BeatValue,
    /// Length in beats
    pub duration: BeatValue,
}

impl NoteSpec {
    /// Create a new note spec
    pub fn new(
        track: impl Into<String>,
        pitch: i64,
        start: impl Into<BeatValue>,
        duration: impl Into<BeatValue>,
    ) -> Self {
        Self {
            track: track.into(),
            pitch,
            start: start.into(),
            duration: duration.into(),
        }
    }

    /// Check pitch and beat fields, producing a stored note.
    ///
    /// Track existence is the caller's concern.
    pub fn validate(self) -> Result<Note> {
        if !(0..=127).contains(&self.pitch) {
            return Err(ComposeError::PitchOutOfRange(self.pitch));
        }
        let start = self.start.evaluate()?;
        if start < 0.0 {
            return Err(ComposeError::NegativeBeat {
                what: "Note start",
                value: start,
            });
        }
        let duration = self.duration.evaluate()?;
        if duration < 0.0 {
            return Err(ComposeError::NegativeBeat {
                what: "Note duration",
                value: duration,
            });
        }
        if start + duration > MAX_BEAT {
            return Err(ComposeError::BeatTooLarge {
                what: "Note end",
                value: start + duration,
                max: MAX_BEAT,
            });
        }
        Ok(Note {
            track: self.track,
            pitch: self.pitch as MidiNote,
            start: self.start,
            duration: self.duration,
            flagged: false,
        })
    }
}

/// A stored note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Track the note belongs to
    pub track: String,
    /// MIDI pitch
    pub pitch: MidiNote,
    /// Start position in beats
    pub start: BeatValue,
    /// Length in beats
    pub duration: BeatValue,
    /// Set by harmony validation when the pitch is outside the active chord
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flagged: bool,
}

impl Note {
    /// Evaluated start beat
    pub fn start_beat(&self) -> Result<f64> {
        Ok(self.start.evaluate()?)
    }

    /// Evaluated duration in beats
    pub fn duration_beats(&self) -> Result<f64> {
        Ok(self.duration.evaluate()?)
    }

    /// Whether the note starts inside `[start, end)`, either bound optional
    pub fn starts_within(&self, start: Option<f64>, end: Option<f64>) -> Result<bool> {
        let beat = self.start_beat()?;
        Ok(start.map_or(true, |s| beat >= s) && end.map_or(true, |e| beat < e))
    }
}
