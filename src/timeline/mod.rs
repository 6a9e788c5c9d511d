// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The piece being composed.
//!
//! This module provides:
//! - Entities: tracks, notes, sections, chord spans
//! - Beat expressions for deferred note positions
//! - Overlap resolution for the section and chord timelines
//! - [`Piece`], the aggregate that owns all of the above
//!
//! `Piece` methods validate before they mutate, so an `Err` leaves the
//! piece exactly as it was. Reads hand out owned copies.

pub mod chord;
pub mod expr;
pub mod intervals;
pub mod note;
pub mod section;
pub mod track;

pub use chord::{ChordSpan, ChordSpec};
pub use expr::{BeatValue, ExprError};
pub use intervals::NeighborFix;
pub use note::{Note, NoteSpec};
pub use section::{Section, SectionEdit};
pub use track::Track;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, Result};
use crate::music::chord::{ChordRejection, ChordResolver};

/// Optional filters for note queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteQuery {
    /// Only notes on this track
    #[serde(default)]
    pub track: Option<String>,
    /// Only notes starting at or after this beat
    #[serde(default)]
    pub start: Option<f64>,
    /// Only notes starting before this beat
    #[serde(default)]
    pub end: Option<f64>,
}

impl NoteQuery {
    /// Query matching every note
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a track
    pub fn track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    /// Restrict to notes starting inside `[start, end)`
    pub fn between(mut self, start: f64, end: f64) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// Summary of a section for piece overviews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub name: String,
    pub measures: String,
    pub tempo: u32,
    pub time_signature: String,
    pub key: String,
}

/// Overview of the whole piece
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieceInfo {
    pub title: String,
    pub num_sections: usize,
    pub num_tracks: usize,
    pub num_notes: usize,
    pub sections: Vec<SectionSummary>,
    pub tracks: Vec<String>,
}

/// A musical piece: tracks, notes, sections and the chord timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// Piece title
    pub title: String,
    /// Tracks by name
    tracks: BTreeMap<String, Track>,
    /// Notes in insertion order
    notes: Vec<Note>,
    /// Sections sorted by start measure
    sections: Vec<Section>,
    /// Chord spans sorted by beat, never overlapping
    chords: Vec<ChordSpan>,
}

impl Default for Piece {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject `[start, end)` ranges that run backwards
pub(crate) fn check_range(start: f64, end: f64) -> Result<()> {
    if start > end || start.is_nan() || end.is_nan() {
        return Err(ComposeError::InvalidRange { start, end });
    }
    Ok(())
}

impl Piece {
    /// Create an empty, untitled piece
    pub fn new() -> Self {
        Self {
            title: "Untitled".to_string(),
            tracks: BTreeMap::new(),
            notes: Vec::new(),
            sections: Vec::new(),
            chords: Vec::new(),
        }
    }

    /// Set the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    // ---- tracks ----

    /// Add a track; names must be unique
    pub fn add_track(&mut self, name: &str, instrument: &str) -> Result<()> {
        if self.tracks.contains_key(name) {
            return Err(ComposeError::TrackExists(name.to_string()));
        }
        self.tracks
            .insert(name.to_string(), Track::new(name, instrument));
        Ok(())
    }

    /// Remove a track and every note on it, returning the note count removed
    pub fn remove_track(&mut self, name: &str) -> Result<usize> {
        if self.tracks.remove(name).is_none() {
            return Err(ComposeError::TrackNotFound(name.to_string()));
        }
        let before = self.notes.len();
        self.notes.retain(|n| n.track != name);
        Ok(before - self.notes.len())
    }

    /// Look up a track
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.get(name)
    }

    /// Copy of all tracks keyed by name
    pub fn tracks(&self) -> BTreeMap<String, Track> {
        self.tracks.clone()
    }

    // ---- notes ----

    /// Add a batch of notes; any invalid note rejects the whole batch
    pub fn add_notes(&mut self, specs: Vec<NoteSpec>) -> Result<usize> {
        let mut validated = Vec::with_capacity(specs.len());
        for spec in specs {
            if !self.tracks.contains_key(&spec.track) {
                return Err(ComposeError::TrackNotFound(spec.track));
            }
            validated.push(spec.validate()?);
        }
        let count = validated.len();
        self.notes.extend(validated);
        Ok(count)
    }

    /// Remove notes on `track` starting inside `[start, end)`
    pub fn remove_notes_in_range(&mut self, track: &str, start: f64, end: f64) -> Result<usize> {
        if !self.tracks.contains_key(track) {
            return Err(ComposeError::TrackNotFound(track.to_string()));
        }
        check_range(start, end)?;

        // Evaluate up front so a bad expression cannot leave a partial removal
        let mut doomed = Vec::with_capacity(self.notes.len());
        for note in &self.notes {
            doomed.push(note.track == track && note.starts_within(Some(start), Some(end))?);
        }

        let before = self.notes.len();
        let mut flags = doomed.into_iter();
        self.notes.retain(|_| !flags.next().unwrap_or(false));
        Ok(before - self.notes.len())
    }

    /// Copy of the notes matching `query`
    pub fn notes(&self, query: &NoteQuery) -> Result<Vec<Note>> {
        if let (Some(start), Some(end)) = (query.start, query.end) {
            check_range(start, end)?;
        }
        let mut found = Vec::new();
        for note in &self.notes {
            if let Some(track) = &query.track {
                if &note.track != track {
                    continue;
                }
            }
            if note.starts_within(query.start, query.end)? {
                found.push(note.clone());
            }
        }
        Ok(found)
    }

    /// Borrow every note
    pub fn all_notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.notes
    }

    /// Clear the harmony flag on every note
    pub fn clear_flags(&mut self) {
        for note in &mut self.notes {
            note.flagged = false;
        }
    }

    // ---- sections ----

    /// Add a section; it may not overlap an existing one
    pub fn add_section(&mut self, section: Section) -> Result<()> {
        if self.sections.iter().any(|s| s.name == section.name) {
            return Err(ComposeError::SectionExists(section.name));
        }
        section.validate()?;
        if let Some(other) = self.sections.iter().find(|s| s.overlaps(&section)) {
            return Err(ComposeError::SectionOverlap {
                name: section.name.clone(),
                start: section.start_measure,
                end: section.end_measure,
                other: other.name.clone(),
            });
        }
        self.sections.push(section);
        intervals::sort_sections(&mut self.sections);
        Ok(())
    }

    /// Edit a section, trimming its neighbours if its measures moved
    pub fn edit_section(&mut self, name: &str, edit: &SectionEdit) -> Result<Vec<NeighborFix>> {
        let index = self
            .sections
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ComposeError::SectionNotFound(name.to_string()))?;

        let edited = edit.apply_to(&self.sections[index]);
        edited.validate()?;
        self.sections[index] = edited;

        if edit.touches_measures() {
            Ok(intervals::trim_section_neighbors(&mut self.sections, index))
        } else {
            Ok(Vec::new())
        }
    }

    /// Copy of all sections in measure order
    pub fn sections(&self) -> Vec<Section> {
        self.sections.clone()
    }

    /// First section in measure order
    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    // ---- chords ----

    /// Resolve a chord batch without touching the piece.
    ///
    /// Every symbol is checked; if any fails the whole batch is rejected
    /// with one entry per bad symbol.
    pub fn resolve_chords(
        specs: &[ChordSpec],
        resolver: &dyn ChordResolver,
    ) -> Result<Vec<ChordSpan>> {
        for spec in specs {
            spec.validate()?;
        }

        let mut spans = Vec::with_capacity(specs.len());
        let mut rejections = Vec::new();
        for spec in specs {
            match resolver.resolve(&spec.chord) {
                Ok(tones) => spans.push(ChordSpan::new(spec.beat, &spec.chord, spec.duration, tones)),
                Err(err) => rejections.push(ChordRejection {
                    invalid_chord: spec.chord.clone(),
                    error: err.to_string(),
                    supported_qualities: resolver.supported_qualities(),
                }),
            }
        }

        if rejections.is_empty() {
            Ok(spans)
        } else {
            Err(ComposeError::InvalidChords(rejections))
        }
    }

    /// Lay resolved spans over the chord timeline
    pub fn insert_chords(&mut self, spans: &[ChordSpan]) {
        intervals::insert_chord_spans(&mut self.chords, spans);
    }

    /// Copy of chord spans intersecting `[start, end)`
    pub fn chords_in_range(&self, start: f64, end: f64) -> Result<Vec<ChordSpan>> {
        check_range(start, end)?;
        Ok(self
            .chords
            .iter()
            .filter(|c| c.intersects(start, end))
            .cloned()
            .collect())
    }

    /// Remove chord spans intersecting `[start, end)` and clear all note flags
    pub fn remove_chords_in_range(&mut self, start: f64, end: f64) -> Result<usize> {
        check_range(start, end)?;
        let removed = intervals::remove_chord_spans(&mut self.chords, start, end);
        self.clear_flags();
        Ok(removed)
    }

    /// Borrow the whole chord timeline
    pub fn chords(&self) -> &[ChordSpan] {
        &self.chords
    }

    // ---- overview ----

    /// Counts and summaries for the whole piece
    pub fn info(&self) -> PieceInfo {
        PieceInfo {
            title: self.title.clone(),
            num_sections: self.sections.len(),
            num_tracks: self.tracks.len(),
            num_notes: self.notes.len(),
            sections: self
                .sections
                .iter()
                .map(|s| SectionSummary {
                    name: s.name.clone(),
                    measures: s.measures(),
                    tempo: s.tempo,
                    time_signature: s.time_signature.clone(),
                    key: s.key.clone(),
                })
                .collect(),
            tracks: self.tracks.keys().cloned().collect(),
        }
    }
}
