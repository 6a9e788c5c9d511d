// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord spans on the harmonic timeline.

use serde::{Deserialize, Serialize};

use super::note::MAX_BEAT;
use crate::error::{ComposeError, Result};

/// A chord request before symbol resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSpec {
    /// Start beat
    pub beat: f64,
    /// Chord symbol, e.g. "Dm7"
    pub chord: String,
    /// Length in beats
    pub duration: f64,
}

impl ChordSpec {
    /// Create a new chord spec
    pub fn new(beat: f64, chord: impl Into<String>, duration: f64) -> Self {
        Self {
            beat,
            chord: chord.into(),
            duration,
        }
    }

    /// Check beat and duration bounds
    pub fn validate(&self) -> Result<()> {
        if !(self.beat >= 0.0) {
            return Err(ComposeError::NegativeBeat {
                what: "Chord beat",
                value: self.beat,
            });
        }
        if !(self.duration > 0.0) {
            return Err(ComposeError::NonPositiveDuration {
                what: "Chord duration",
                value: self.duration,
            });
        }
        if self.beat + self.duration > MAX_BEAT {
            return Err(ComposeError::BeatTooLarge {
                what: "Chord end",
                value: self.beat + self.duration,
                max: MAX_BEAT,
            });
        }
        Ok(())
    }
}

/// A resolved chord occupying `[beat, beat + duration)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSpan {
    /// Start beat
    pub beat: f64,
    /// Chord symbol
    pub chord: String,
    /// Length in beats
    pub duration: f64,
    /// Pitch classes, resolved once when the chord was added
    pub chord_tones: Vec<String>,
}

impl ChordSpan {
    /// Create a chord span
    pub fn new(beat: f64, chord: impl Into<String>, duration: f64, chord_tones: Vec<String>) -> Self {
        Self {
            beat,
            chord: chord.into(),
            duration,
            chord_tones,
        }
    }

    /// End beat (exclusive)
    pub fn end(&self) -> f64 {
        self.beat + self.duration
    }

    /// Whether the span intersects `[start, end)`
    pub fn intersects(&self, start: f64, end: f64) -> bool {
        self.beat < end && self.end() > start
    }

    /// Whether `beat` falls inside the span
    pub fn contains(&self, beat: f64) -> bool {
        self.beat <= beat && beat < self.end()
    }

    /// Copy of this span restricted to `[start, end)`, keeping symbol and tones
    pub fn residual(&self, start: f64, end: f64) -> Self {
        Self {
            beat: start,
            chord: self.chord.clone(),
            duration: end - start,
            chord_tones: self.chord_tones.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(beat: f64, duration: f64) -> ChordSpan {
        ChordSpan::new(beat, "C", duration, vec!["C".into(), "E".into(), "G".into()])
    }

    #[test]
    fn test_intersects_half_open() {
        let chord = span(4.0, 4.0);
        assert!(chord.intersects(0.0, 5.0));
        assert!(chord.intersects(7.5, 12.0));
        assert!(!chord.intersects(0.0, 4.0));
        assert!(!chord.intersects(8.0, 12.0));
    }

    #[test]
    fn test_contains() {
        let chord = span(4.0, 4.0);
        assert!(chord.contains(4.0));
        assert!(chord.contains(7.99));
        assert!(!chord.contains(8.0));
    }

    #[test]
    fn test_residual_keeps_tones() {
        let piece = span(0.0, 8.0).residual(6.0, 8.0);
        assert_eq!(piece.beat, 6.0);
        assert_eq!(piece.duration, 2.0);
        assert_eq!(piece.chord, "C");
        assert_eq!(piece.chord_tones.len(), 3);
    }

    #[test]
    fn test_spec_validate() {
        assert!(ChordSpec::new(0.0, "C", 4.0).validate().is_ok());
        assert!(ChordSpec::new(-1.0, "C", 4.0).validate().is_err());
        assert!(ChordSpec::new(0.0, "C", 0.0).validate().is_err());
    }

    #[test]
    fn test_spec_validate_rejects_non_finite_and_huge() {
        assert!(ChordSpec::new(f64::NAN, "C", 4.0).validate().is_err());
        assert!(ChordSpec::new(f64::INFINITY, "C", 4.0).validate().is_err());
        assert!(ChordSpec::new(0.0, "C", f64::NAN).validate().is_err());
        assert!(ChordSpec::new(0.0, "C", f64::INFINITY).validate().is_err());
        assert!(matches!(
            ChordSpec::new(1e30, "C", 4.0).validate(),
            Err(ComposeError::BeatTooLarge { .. })
        ));

        let yaml: ChordSpec = serde_yaml::from_str("{beat: .inf, chord: C, duration: 4}").unwrap();
        assert!(yaml.validate().is_err());
    }
}
