// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch classes and their spellings.
//!
//! Notes are stored as MIDI numbers and chord tones as spelled names
//! ("Eb", "F#"). This module bridges the two, including the enharmonic
//! pairs needed when the two spellings disagree.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Sharp/flat spelling pairs for the five black keys
pub const ENHARMONIC_PAIRS: [(&str, &str); 5] = [
    ("C#", "Db"),
    ("D#", "Eb"),
    ("F#", "Gb"),
    ("G#", "Ab"),
    ("A#", "Bb"),
];

/// Pitch classes in chromatic order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Get the semitone index (0-11)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Get pitch class from a semitone index (wraps modulo 12)
    pub fn from_index(index: u8) -> Self {
        PitchClass::ALL[(index % 12) as usize]
    }

    /// Pitch class of a MIDI note number
    pub fn of_midi(note: MidiNote) -> Self {
        PitchClass::from_index(note % 12)
    }

    /// Parse a spelled name ("C", "C#", "Db", "E#", ...)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let natural: i8 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let mut offset = 0i8;
        for c in chars {
            match c {
                '#' => offset += 1,
                'b' => offset -= 1,
                _ => return None,
            }
        }
        Some(PitchClass::from_index((natural + offset).rem_euclid(12) as u8))
    }

    /// Name spelled with a sharp
    pub fn sharp_name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Name spelled with a flat
    pub fn flat_name(self) -> &'static str {
        match self {
            PitchClass::Cs => "Db",
            PitchClass::Ds => "Eb",
            PitchClass::Fs => "Gb",
            PitchClass::Gs => "Ab",
            PitchClass::As => "Bb",
            natural => natural.sharp_name(),
        }
    }

    /// Transpose by semitones
    pub fn transpose(self, semitones: i8) -> Self {
        PitchClass::from_index((self.index() as i8 + semitones).rem_euclid(12) as u8)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sharp_name())
    }
}

/// Other spelling of a black key, if `name` is one of the enharmonic pairs
pub fn enharmonic(name: &str) -> Option<&'static str> {
    ENHARMONIC_PAIRS.iter().find_map(|&(sharp, flat)| {
        if name == sharp {
            Some(flat)
        } else if name == flat {
            Some(sharp)
        } else {
            None
        }
    })
}

/// Close a set of spelled tones under the enharmonic pairs
pub fn enharmonic_closure<'a, I>(tones: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut closed = BTreeSet::new();
    for tone in tones {
        closed.insert(tone.clone());
        if let Some(other) = enharmonic(tone) {
            closed.insert(other.to_string());
        }
    }
    closed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_midi() {
        assert_eq!(PitchClass::of_midi(60), PitchClass::C);
        assert_eq!(PitchClass::of_midi(61), PitchClass::Cs);
        assert_eq!(PitchClass::of_midi(127), PitchClass::G);
        assert_eq!(PitchClass::of_midi(0).to_string(), "C");
    }

    #[test]
    fn test_parse() {
        assert_eq!(PitchClass::parse("Db"), Some(PitchClass::Cs));
        assert_eq!(PitchClass::parse("F#"), Some(PitchClass::Fs));
        assert_eq!(PitchClass::parse("E#"), Some(PitchClass::F));
        assert_eq!(PitchClass::parse("Cb"), Some(PitchClass::B));
        assert_eq!(PitchClass::parse("H"), None);
        assert_eq!(PitchClass::parse(""), None);
    }

    #[test]
    fn test_spellings() {
        assert_eq!(PitchClass::As.sharp_name(), "A#");
        assert_eq!(PitchClass::As.flat_name(), "Bb");
        assert_eq!(PitchClass::E.flat_name(), "E");
    }

    #[test]
    fn test_transpose() {
        assert_eq!(PitchClass::B.transpose(1), PitchClass::C);
        assert_eq!(PitchClass::C.transpose(-1), PitchClass::B);
    }

    #[test]
    fn test_enharmonic_closure() {
        let tones = vec!["C".to_string(), "Eb".to_string(), "G".to_string()];
        let closed = enharmonic_closure(&tones);
        assert!(closed.contains("D#"));
        assert!(closed.contains("Eb"));
        assert_eq!(closed.len(), 4);

        assert_eq!(enharmonic("C#"), Some("Db"));
        assert_eq!(enharmonic("Db"), Some("C#"));
        assert_eq!(enharmonic("E"), None);
    }
}
