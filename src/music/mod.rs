// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities for midigen.
//!
//! This module provides pitch-class spelling, chord symbol resolution,
//! and General MIDI instrument lookup.

pub mod chord;
pub mod instrument;
pub mod pitch;

pub use chord::{ChordError, ChordRejection, ChordResolver, ChordTable};
pub use pitch::{enharmonic_closure, MidiNote, PitchClass};
