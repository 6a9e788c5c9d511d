// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Structural sections measured in bars.
//!
//! Sections cover inclusive measure ranges `start_measure..=end_measure`
//! and carry the tempo, meter and key for that stretch of the piece.

use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, Result};

/// Slowest accepted section tempo
pub const MIN_TEMPO: u32 = 20;

/// Fastest accepted section tempo
pub const MAX_TEMPO: u32 = 300;

/// A named section of the piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section name (unique within a piece)
    pub name: String,
    /// First measure (1-indexed)
    pub start_measure: u32,
    /// Last measure (inclusive)
    pub end_measure: u32,
    /// Tempo in BPM
    pub tempo: u32,
    /// Time signature as "N/D"
    pub time_signature: String,
    /// Key (e.g. "C", "Am", "F#m")
    pub key: String,
    /// Free text notes about the section
    #[serde(default)]
    pub description: String,
}

impl Section {
    /// Create a section in 4/4, C major, 120 BPM
    pub fn new(name: impl Into<String>, start_measure: u32, end_measure: u32) -> Self {
        Self {
            name: name.into(),
            start_measure,
            end_measure,
            tempo: 120,
            time_signature: "4/4".to_string(),
            key: "C".to_string(),
            description: String::new(),
        }
    }

    /// Set tempo
    pub fn with_tempo(mut self, tempo: u32) -> Self {
        self.tempo = tempo;
        self
    }

    /// Set time signature
    pub fn with_time_signature(mut self, time_signature: impl Into<String>) -> Self {
        self.time_signature = time_signature.into();
        self
    }

    /// Set key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check measures, tempo and time signature
    pub fn validate(&self) -> Result<()> {
        if self.start_measure < 1 {
            return Err(ComposeError::InvalidMeasures {
                start: self.start_measure,
                end: self.end_measure,
                reason: "start_measure must be >= 1",
            });
        }
        if self.end_measure < self.start_measure {
            return Err(ComposeError::InvalidMeasures {
                start: self.start_measure,
                end: self.end_measure,
                reason: "end_measure must be >= start_measure",
            });
        }
        if !(MIN_TEMPO..=MAX_TEMPO).contains(&self.tempo) {
            return Err(ComposeError::TempoOutOfRange {
                tempo: self.tempo,
                min: MIN_TEMPO,
                max: MAX_TEMPO,
            });
        }
        parse_time_signature(&self.time_signature)?;
        Ok(())
    }

    /// Whether two sections share at least one measure
    pub fn overlaps(&self, other: &Section) -> bool {
        self.start_measure <= other.end_measure && other.start_measure <= self.end_measure
    }

    /// Measure span formatted as "S-E"
    pub fn measures(&self) -> String {
        format!("{}-{}", self.start_measure, self.end_measure)
    }
}

/// Partial update for a section; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionEdit {
    #[serde(default)]
    pub start_measure: Option<u32>,
    #[serde(default)]
    pub end_measure: Option<u32>,
    #[serde(default)]
    pub tempo: Option<u32>,
    #[serde(default)]
    pub time_signature: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SectionEdit {
    /// Whether the edit moves either measure boundary
    pub fn touches_measures(&self) -> bool {
        self.start_measure.is_some() || self.end_measure.is_some()
    }

    /// Produce the edited copy of `section`
    pub fn apply_to(&self, section: &Section) -> Section {
        let mut edited = section.clone();
        if let Some(start) = self.start_measure {
            edited.start_measure = start;
        }
        if let Some(end) = self.end_measure {
            edited.end_measure = end;
        }
        if let Some(tempo) = self.tempo {
            edited.tempo = tempo;
        }
        if let Some(ts) = &self.time_signature {
            edited.time_signature = ts.clone();
        }
        if let Some(key) = &self.key {
            edited.key = key.clone();
        }
        if let Some(description) = &self.description {
            edited.description = description.clone();
        }
        edited
    }
}

/// Parse "N/D" into numerator and denominator.
///
/// The denominator must be a power of two no larger than 64.
pub fn parse_time_signature(text: &str) -> Result<(u8, u8)> {
    let invalid = || ComposeError::InvalidTimeSignature(text.to_string());

    let (num, den) = text.trim().split_once('/').ok_or_else(invalid)?;
    let numerator: u8 = num.trim().parse().map_err(|_| invalid())?;
    let denominator: u8 = den.trim().parse().map_err(|_| invalid())?;

    if numerator == 0 || denominator == 0 || denominator > 64 || !denominator.is_power_of_two() {
        return Err(invalid());
    }
    Ok((numerator, denominator))
}
