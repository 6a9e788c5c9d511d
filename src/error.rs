// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for timeline operations.
//!
//! Every failure is local to the operation that produced it. Validation
//! runs before any structural mutation, so an `Err` never leaves the
//! piece half-edited.

use serde::Serialize;
use thiserror::Error;

use crate::music::chord::ChordRejection;
use crate::timeline::expr::ExprError;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ComposeError>;

/// Broad classification of a [`ComposeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Unknown or duplicate name
    Referential,
    /// Numeric field outside its bounds
    Range,
    /// Beat expression failed to evaluate
    Expression,
    /// Unrecognized chord symbol
    Domain,
    /// Operation requires state that is not present
    Precondition,
    /// Writing the export failed
    Io,
}

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Track '{0}' not found")]
    TrackNotFound(String),

    #[error("Track '{0}' already exists")]
    TrackExists(String),

    #[error("Section '{0}' not found")]
    SectionNotFound(String),

    #[error("Section '{0}' already exists")]
    SectionExists(String),

    #[error("Pitch must be an integer between 0-127, got {0}")]
    PitchOutOfRange(i64),

    /// Measure bounds violate `1 <= start <= end`
    #[error("Invalid measures {start}-{end}: {reason}")]
    InvalidMeasures {
        start: u32,
        end: u32,
        reason: &'static str,
    },

    #[error("Tempo must be between {min} and {max} BPM, got {tempo}")]
    TempoOutOfRange { tempo: u32, min: u32, max: u32 },

    #[error("Invalid time signature '{0}' (expected N/D with D a power of two)")]
    InvalidTimeSignature(String),

    #[error("Section '{name}' (measures {start}-{end}) overlaps section '{other}'")]
    SectionOverlap {
        name: String,
        start: u32,
        end: u32,
        other: String,
    },

    #[error("{what} must not be negative, got {value}")]
    NegativeBeat { what: &'static str, value: f64 },

    #[error("{what} must be greater than zero, got {value}")]
    NonPositiveDuration { what: &'static str, value: f64 },

    #[error("{what} must be at most {max} beats, got {value}")]
    BeatTooLarge {
        what: &'static str,
        value: f64,
        max: f64,
    },

    /// A note ends beyond the largest delta time the container can encode
    #[error("Note at beat {beat} ends past tick {max_tick} at {ticks_per_beat} ticks per beat")]
    TickOverflow {
        beat: f64,
        ticks_per_beat: u16,
        max_tick: u64,
    },

    #[error("Invalid range [{start}, {end}): start is after end")]
    InvalidRange { start: f64, end: f64 },

    #[error(transparent)]
    Expression(#[from] ExprError),

    /// One or more chord symbols in a batch were not recognized
    #[error("{}", format_rejections(.0))]
    InvalidChords(Vec<ChordRejection>),

    #[error("No chord progression defined. Use add_chords first.")]
    NoChordProgression,

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ComposeError {
    /// Get the taxonomy bucket of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            ComposeError::TrackNotFound(_)
            | ComposeError::TrackExists(_)
            | ComposeError::SectionNotFound(_)
            | ComposeError::SectionExists(_) => ErrorCategory::Referential,
            ComposeError::PitchOutOfRange(_)
            | ComposeError::InvalidMeasures { .. }
            | ComposeError::TempoOutOfRange { .. }
            | ComposeError::InvalidTimeSignature(_)
            | ComposeError::SectionOverlap { .. }
            | ComposeError::NegativeBeat { .. }
            | ComposeError::NonPositiveDuration { .. }
            | ComposeError::BeatTooLarge { .. }
            | ComposeError::TickOverflow { .. }
            | ComposeError::InvalidRange { .. } => ErrorCategory::Range,
            ComposeError::Expression(_) => ErrorCategory::Expression,
            ComposeError::InvalidChords(_) => ErrorCategory::Domain,
            ComposeError::NoChordProgression => ErrorCategory::Precondition,
            ComposeError::Io { .. } => ErrorCategory::Io,
        }
    }
}

fn format_rejections(rejections: &[ChordRejection]) -> String {
    rejections
        .iter()
        .map(|r| r.error.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
