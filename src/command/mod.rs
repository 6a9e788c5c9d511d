// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Serializable command surface.
//!
//! Every edit or query on a [`Session`] can be expressed as a
//! [`Command`], and every command produces exactly one [`Response`]:
//! a confirmation message, a structured payload, or an error. Errors are
//! returned as values and never panic across this boundary.
//!
//! Commands are tagged by `op`, so a script reads naturally in YAML:
//!
//! ```yaml
//! - op: add_track
//!   name: piano
//!   instrument: piano
//! - op: add_notes
//!   notes:
//!     - { track: piano, pitch: 60, start: 0, duration: "1/2" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, ErrorCategory};
use crate::harmony::{FlagReport, RemovedNotes};
use crate::history::HistoryOutcome;
use crate::music::ChordRejection;
use crate::session::Session;
use crate::timeline::{
    ChordSpan, ChordSpec, NeighborFix, Note, NoteQuery, NoteSpec, PieceInfo, Section,
    SectionEdit, Track,
};

/// One operation against a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Set the piece title
    SetTitle { title: String },
    /// Overview of the piece
    GetPieceInfo,
    /// Add a section; defaults to 120 BPM, 4/4, C
    AddSection {
        name: String,
        start_measure: u32,
        end_measure: u32,
        #[serde(default = "default_tempo")]
        tempo: u32,
        #[serde(default = "default_time_signature")]
        time_signature: String,
        #[serde(default = "default_key")]
        key: String,
        #[serde(default)]
        description: String,
    },
    /// Change fields of a section
    EditSection {
        name: String,
        #[serde(default)]
        changes: SectionEdit,
    },
    GetSections,
    AddTrack { name: String, instrument: String },
    /// Remove a track and every note on it
    RemoveTrack { name: String },
    GetTracks,
    /// Add notes, all or nothing
    AddNotes { notes: Vec<NoteSpec> },
    /// Remove notes on a track starting inside `[start_time, end_time)`
    RemoveNotesInRange {
        track: String,
        start_time: f64,
        end_time: f64,
    },
    /// Query notes with optional filters
    GetNotes {
        #[serde(default)]
        track: Option<String>,
        #[serde(default)]
        start_time: Option<f64>,
        #[serde(default)]
        end_time: Option<f64>,
    },
    /// Add chords, all or nothing
    AddChords { chords: Vec<ChordSpec> },
    GetChordsInRange { start_beat: f64, end_beat: f64 },
    RemoveChordsInRange { start_beat: f64, end_beat: f64 },
    /// Flag notes that clash with the chord progression
    FlagNotes {
        tracks: Vec<String>,
        start_beat: f64,
        end_beat: f64,
    },
    RemoveFlaggedNotes,
    Undo,
    Redo,
    /// Write a MIDI file; `.mid` is appended when missing
    ExportMidi { filepath: String },
    /// Discard the piece and its history
    Reset,
}

fn default_tempo() -> u32 {
    120
}
fn default_time_signature() -> String {
    "4/4".to_string()
}
fn default_key() -> String {
    "C".to_string()
}

/// Structured result of a query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    PieceInfo(PieceInfo),
    Sections(Vec<Section>),
    Tracks(BTreeMap<String, Track>),
    Notes(Vec<Note>),
    Chords(Vec<ChordSpan>),
    ChordsAdded { chords_added: Vec<ChordSpan> },
    Flagged(FlagReport),
    Removed(RemovedNotes),
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// Short confirmation
    Message { message: String },
    /// Query result
    Data { data: Payload },
    /// Rejected operation
    Error {
        category: ErrorCategory,
        message: String,
        /// Per-symbol detail for rejected chord batches
        #[serde(skip_serializing_if = "Vec::is_empty")]
        details: Vec<ChordRejection>,
    },
}

impl Response {
    fn message(message: impl Into<String>) -> Self {
        Response::Message {
            message: message.into(),
        }
    }

    fn data(data: Payload) -> Self {
        Response::Data { data }
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<ComposeError> for Response {
    fn from(err: ComposeError) -> Self {
        let details = match &err {
            ComposeError::InvalidChords(rejections) => rejections.clone(),
            _ => Vec::new(),
        };
        Response::Error {
            category: err.category(),
            message: format!("Error: {}", err),
            details,
        }
    }
}

fn describe_fixes(name: &str, fixes: &[NeighborFix]) -> String {
    let mut message = format!("Updated section '{}'", name);
    for fix in fixes {
        match fix {
            NeighborFix::Trimmed { name, start, end } => {
                message.push_str(&format!("; trimmed '{}' to measures {}-{}", name, start, end));
            }
            NeighborFix::Removed { name } => {
                message.push_str(&format!("; removed '{}'", name));
            }
        }
    }
    message
}

impl Session {
    /// Run one command, turning any error into an error response
    pub fn execute(&mut self, command: Command) -> Response {
        match self.dispatch(command) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Rejected: {}", err);
                Response::from(err)
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<Response, ComposeError> {
        let response = match command {
            Command::SetTitle { title } => {
                self.set_title(&title);
                Response::message(format!("Title set to: {}", title))
            }
            Command::GetPieceInfo => Response::data(Payload::PieceInfo(self.piece_info())),
            Command::AddSection {
                name,
                start_measure,
                end_measure,
                tempo,
                time_signature,
                key,
                description,
            } => {
                let section = Section::new(name.as_str(), start_measure, end_measure)
                    .with_tempo(tempo)
                    .with_time_signature(time_signature)
                    .with_key(key)
                    .with_description(description);
                self.add_section(section)?;
                Response::message(format!(
                    "Added section '{}' (measures {}-{})",
                    name, start_measure, end_measure
                ))
            }
            Command::EditSection { name, changes } => {
                let fixes = self.edit_section(&name, &changes)?;
                Response::message(describe_fixes(&name, &fixes))
            }
            Command::GetSections => Response::data(Payload::Sections(self.sections())),
            Command::AddTrack { name, instrument } => {
                self.add_track(&name, &instrument)?;
                Response::message(format!("Added track '{}' ({})", name, instrument))
            }
            Command::RemoveTrack { name } => {
                let removed = self.remove_track(&name)?;
                Response::message(format!("Removed track '{}' (and {} notes)", name, removed))
            }
            Command::GetTracks => Response::data(Payload::Tracks(self.tracks())),
            Command::AddNotes { notes } => {
                let added = self.add_notes(notes)?;
                Response::message(format!("Added {} note(s)", added))
            }
            Command::RemoveNotesInRange {
                track,
                start_time,
                end_time,
            } => {
                let removed = self.remove_notes_in_range(&track, start_time, end_time)?;
                Response::message(format!(
                    "Removed {} note(s) from '{}' in range [{}, {})",
                    removed, track, start_time, end_time
                ))
            }
            Command::GetNotes {
                track,
                start_time,
                end_time,
            } => {
                let query = NoteQuery {
                    track,
                    start: start_time,
                    end: end_time,
                };
                Response::data(Payload::Notes(self.notes(&query)?))
            }
            Command::AddChords { chords } => {
                let chords_added = self.add_chords(&chords)?;
                Response::data(Payload::ChordsAdded { chords_added })
            }
            Command::GetChordsInRange {
                start_beat,
                end_beat,
            } => Response::data(Payload::Chords(self.chords_in_range(start_beat, end_beat)?)),
            Command::RemoveChordsInRange {
                start_beat,
                end_beat,
            } => {
                let removed = self.remove_chords_in_range(start_beat, end_beat)?;
                Response::message(format!(
                    "Removed {} chord(s) in range [{}, {}). All note flags cleared.",
                    removed, start_beat, end_beat
                ))
            }
            Command::FlagNotes {
                tracks,
                start_beat,
                end_beat,
            } => Response::data(Payload::Flagged(self.flag_notes(&tracks, start_beat, end_beat)?)),
            Command::RemoveFlaggedNotes => {
                Response::data(Payload::Removed(self.remove_flagged_notes()))
            }
            Command::Undo => Response::message(match self.undo() {
                HistoryOutcome::Applied => "Undone",
                HistoryOutcome::Empty => "Nothing to undo",
            }),
            Command::Redo => Response::message(match self.redo() {
                HistoryOutcome::Applied => "Redone",
                HistoryOutcome::Empty => "Nothing to redo",
            }),
            Command::ExportMidi { filepath } => {
                Response::message(self.export_midi(&filepath)?.message)
            }
            Command::Reset => {
                self.reset();
                Response::message("Session reset")
            }
        };
        Ok(response)
    }
}

/// Parse a YAML list of commands
pub fn parse_script(yaml: &str) -> Result<Vec<Command>, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}
