// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord symbol resolution.
//!
//! The timeline only needs one thing from music theory: given a symbol
//! such as `"Dm7"`, which pitch classes does the chord contain. That is
//! expressed by [`ChordResolver`]. [`ChordTable`] is the built-in
//! implementation covering common pop and jazz qualities.

use serde::Serialize;
use thiserror::Error;

use super::pitch::PitchClass;

/// Errors from chord symbol resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChordError {
    #[error(
        "Invalid chord symbol '{symbol}'. Supported qualities: {supported}. \
         Examples: C, Cm, C7, Cmaj7, Cdim, Caug, Csus4, C9, C13"
    )]
    Unrecognized { symbol: String, supported: String },
}

/// Per-symbol detail for a rejected chord batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordRejection {
    /// The symbol as given
    pub invalid_chord: String,
    /// Human readable reason
    pub error: String,
    /// Qualities the resolver understands
    pub supported_qualities: Vec<String>,
}

/// Resolves chord symbols into spelled pitch classes
pub trait ChordResolver {
    /// Resolve a symbol to its chord tones, root first
    fn resolve(&self, symbol: &str) -> Result<Vec<String>, ChordError>;

    /// Human-readable names of supported qualities
    fn supported_qualities(&self) -> Vec<String>;
}

/// Chord qualities and their intervals above the root
const QUALITIES: &[(&[&str], &[u8])] = &[
    (&["", "maj", "M"], &[0, 4, 7]),
    (&["m", "min", "-"], &[0, 3, 7]),
    (&["7", "dom7"], &[0, 4, 7, 10]),
    (&["maj7", "M7"], &[0, 4, 7, 11]),
    (&["m7", "min7", "-7"], &[0, 3, 7, 10]),
    (&["dim"], &[0, 3, 6]),
    (&["dim7"], &[0, 3, 6, 9]),
    (&["m7b5", "m7-5"], &[0, 3, 6, 10]),
    (&["aug", "+"], &[0, 4, 8]),
    (&["sus2"], &[0, 2, 7]),
    (&["sus4", "sus"], &[0, 5, 7]),
    (&["6"], &[0, 4, 7, 9]),
    (&["m6"], &[0, 3, 7, 9]),
    (&["add9"], &[0, 4, 7, 2]),
    (&["9"], &[0, 4, 7, 10, 2]),
    (&["maj9", "M9"], &[0, 4, 7, 11, 2]),
    (&["m9", "min9"], &[0, 3, 7, 10, 2]),
    (&["11"], &[0, 4, 7, 10, 2, 5]),
    (&["13"], &[0, 4, 7, 10, 2, 9]),
];

const QUALITY_NAMES: &[&str] = &[
    "major",
    "minor (m)",
    "dominant 7th (7)",
    "major 7th (maj7)",
    "minor 7th (m7)",
    "diminished (dim)",
    "augmented (aug)",
    "suspended 2nd (sus2)",
    "suspended 4th (sus4)",
    "9th (9)",
    "11th (11)",
    "13th (13)",
    "add9",
    "6th (6)",
    "m6",
    "dim7",
    "m7b5",
    "maj9",
    "m9",
];

/// Built-in chord symbol table
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordTable;

impl ChordTable {
    /// Create a new chord table
    pub fn new() -> Self {
        Self
    }

    fn unrecognized(&self, symbol: &str) -> ChordError {
        ChordError::Unrecognized {
            symbol: symbol.to_string(),
            supported: QUALITY_NAMES.join(", "),
        }
    }

    /// Split a symbol into root and quality
    fn split_root(symbol: &str) -> Option<(PitchClass, bool, &str)> {
        let letter = symbol.chars().next()?;
        if !matches!(letter, 'A'..='G') {
            return None;
        }
        let rest = &symbol[1..];
        let (accidental, quality) = match rest.chars().next() {
            Some('#') => (1i8, &rest[1..]),
            Some('b') => (-1i8, &rest[1..]),
            _ => (0i8, rest),
        };
        let root = PitchClass::parse(&letter.to_string())?.transpose(accidental);
        let flats = accidental < 0 || (letter == 'F' && accidental == 0);
        Some((root, flats, quality))
    }
}

impl ChordResolver for ChordTable {
    fn resolve(&self, symbol: &str) -> Result<Vec<String>, ChordError> {
        let (root, flats, quality) =
            Self::split_root(symbol.trim()).ok_or_else(|| self.unrecognized(symbol))?;

        let intervals = QUALITIES
            .iter()
            .find(|(aliases, _)| aliases.contains(&quality))
            .map(|(_, intervals)| *intervals)
            .ok_or_else(|| self.unrecognized(symbol))?;

        Ok(intervals
            .iter()
            .map(|&i| {
                let pc = root.transpose(i as i8);
                if flats {
                    pc.flat_name().to_string()
                } else {
                    pc.sharp_name().to_string()
                }
            })
            .collect())
    }

    fn supported_qualities(&self) -> Vec<String> {
        QUALITY_NAMES.iter().map(|s| s.to_string()).collect()
    }
}
