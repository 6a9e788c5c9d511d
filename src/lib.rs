// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! midigen - an editable musical timeline with Standard MIDI File export.
//!
//! A [`Session`] holds one piece: tracks of notes, structural sections
//! and a chord progression. It is edited through small operations (or
//! serialized [`Command`]s), every one of which can be undone. Notes can
//! be checked against the chord progression, and the piece can be
//! exported as a Type 1 MIDI file at 480 ticks per beat.

pub mod command;
pub mod config;
pub mod error;
pub mod export;
pub mod harmony;
pub mod history;
pub mod music;
pub mod session;
pub mod timeline;

pub use command::{Command, Payload, Response};
pub use config::SessionConfig;
pub use error::{ComposeError, ErrorCategory, Result};
pub use history::HistoryOutcome;
pub use session::Session;
pub use timeline::{BeatValue, ChordSpec, NoteQuery, NoteSpec, Piece, Section, SectionEdit};
