// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Editing session.
//!
//! A [`Session`] owns the piece, its undo history and the two external
//! collaborators (chord resolver and container encoder). Every mutating
//! operation records a snapshot before it touches the piece, so a
//! rejected operation still leaves one harmless entry on the undo stack.
//! The one exception is [`Session::add_chords`], which resolves the
//! whole batch first and leaves history untouched when it is rejected.

use std::collections::BTreeMap;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::export::{self, ContainerEncoder, ExportPlan, ExportSettings, ExportSummary, SmfWriter};
use crate::harmony::{self, FlagReport, RemovedNotes};
use crate::history::{History, HistoryOutcome};
use crate::music::{ChordResolver, ChordTable};
use crate::timeline::{
    ChordSpan, ChordSpec, NeighborFix, Note, NoteQuery, NoteSpec, Piece, PieceInfo, Section,
    SectionEdit, Track,
};

/// A piece under edit plus its history
pub struct Session {
    /// Live state
    piece: Piece,
    /// Undo and redo snapshots of `piece`
    history: History<Piece>,
    /// Chord symbol lookup
    resolver: Box<dyn ChordResolver>,
    /// Binary writer for exports
    encoder: Box<dyn ContainerEncoder>,
    /// Export parameters derived from config
    export_settings: ExportSettings,
    /// Active configuration
    config: SessionConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with default configuration
    pub fn new() -> Self {
        let config = SessionConfig::default();
        Self {
            piece: Piece::new(),
            history: History::new(config.history_depth),
            resolver: Box::new(ChordTable::new()),
            encoder: Box::new(SmfWriter::new()),
            export_settings: ExportSettings::default(),
            config,
        }
    }

    /// Create a session from a configuration
    pub fn with_config(config: SessionConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let export_settings = config.export_settings()?;
        Ok(Self {
            history: History::new(config.history_depth),
            export_settings,
            config,
            ..Self::new()
        })
    }

    /// Replace the chord resolver
    pub fn with_resolver(mut self, resolver: impl ChordResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replace the container encoder
    pub fn with_encoder(mut self, encoder: impl ContainerEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    /// Get the active configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Borrow the live piece
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    /// Get undo/redo history
    pub fn history(&self) -> &History<Piece> {
        &self.history
    }

    /// Start over with an empty piece and empty history
    pub fn reset(&mut self) {
        self.piece = Piece::new();
        self.history.clear();
        tracing::info!("Session reset");
    }

    fn before_mutation(&mut self) {
        self.history.record(&self.piece);
    }

    // ---- piece ----

    /// Set the piece title
    pub fn set_title(&mut self, title: &str) {
        self.before_mutation();
        self.piece.set_title(title);
        tracing::debug!("set_title: {}", title);
    }

    /// Get counts and summaries for the piece
    pub fn piece_info(&self) -> PieceInfo {
        self.piece.info()
    }

    // ---- sections ----

    /// Add a section
    pub fn add_section(&mut self, section: Section) -> Result<()> {
        self.before_mutation();
        let name = section.name.clone();
        self.piece.add_section(section)?;
        tracing::debug!("add_section: {}", name);
        Ok(())
    }

    /// Edit a section, trimming overlapped neighbours
    pub fn edit_section(&mut self, name: &str, edit: &SectionEdit) -> Result<Vec<NeighborFix>> {
        self.before_mutation();
        let fixes = self.piece.edit_section(name, edit)?;
        tracing::debug!("edit_section: {} ({} neighbour fixes)", name, fixes.len());
        Ok(fixes)
    }

    /// Get all sections in measure order
    pub fn sections(&self) -> Vec<Section> {
        self.piece.sections()
    }

    // ---- tracks ----

    /// Add a track
    pub fn add_track(&mut self, name: &str, instrument: &str) -> Result<()> {
        self.before_mutation();
        self.piece.add_track(name, instrument)?;
        tracing::debug!("add_track: {} ({})", name, instrument);
        Ok(())
    }

    /// Remove a track and its notes, returning the note count removed
    pub fn remove_track(&mut self, name: &str) -> Result<usize> {
        self.before_mutation();
        let removed = self.piece.remove_track(name)?;
        tracing::debug!("remove_track: {} ({} notes)", name, removed);
        Ok(removed)
    }

    /// Get all tracks keyed by name
    pub fn tracks(&self) -> BTreeMap<String, Track> {
        self.piece.tracks()
    }

    // ---- notes ----

    /// Add a batch of notes
    pub fn add_notes(&mut self, notes: Vec<NoteSpec>) -> Result<usize> {
        self.before_mutation();
        let added = self.piece.add_notes(notes)?;
        tracing::debug!("add_notes: {} added", added);
        Ok(added)
    }

    /// Remove notes on a track starting inside `[start, end)`
    pub fn remove_notes_in_range(&mut self, track: &str, start: f64, end: f64) -> Result<usize> {
        self.before_mutation();
        let removed = self.piece.remove_notes_in_range(track, start, end)?;
        tracing::debug!("remove_notes_in_range: {} removed from {}", removed, track);
        Ok(removed)
    }

    /// Get notes matching a query
    pub fn notes(&self, query: &NoteQuery) -> Result<Vec<Note>> {
        self.piece.notes(query)
    }

    // ---- chords ----

    /// Resolve and insert a chord batch, all or nothing
    pub fn add_chords(&mut self, chords: &[ChordSpec]) -> Result<Vec<ChordSpan>> {
        let spans = Piece::resolve_chords(chords, self.resolver.as_ref())?;
        self.before_mutation();
        self.piece.insert_chords(&spans);
        tracing::debug!(
            "add_chords: {} added, {} spans on timeline",
            spans.len(),
            self.piece.chords().len()
        );
        Ok(spans)
    }

    /// Get chord spans intersecting `[start, end)`
    pub fn chords_in_range(&self, start: f64, end: f64) -> Result<Vec<ChordSpan>> {
        self.piece.chords_in_range(start, end)
    }

    /// Remove chord spans intersecting `[start, end)` and clear note flags
    pub fn remove_chords_in_range(&mut self, start: f64, end: f64) -> Result<usize> {
        self.before_mutation();
        let removed = self.piece.remove_chords_in_range(start, end)?;
        tracing::debug!("remove_chords_in_range: {} removed", removed);
        Ok(removed)
    }

    // ---- harmony ----

    /// Flag notes that are not tones of the chord sounding at their start
    pub fn flag_notes(&mut self, tracks: &[String], start: f64, end: f64) -> Result<FlagReport> {
        self.before_mutation();
        let report = harmony::flag_notes(&mut self.piece, tracks, start, end)?;
        tracing::debug!("flag_notes: {} flagged", report.flagged_count);
        Ok(report)
    }

    /// Delete every flagged note
    pub fn remove_flagged_notes(&mut self) -> RemovedNotes {
        self.before_mutation();
        let removed = harmony::remove_flagged(&mut self.piece);
        tracing::debug!("remove_flagged_notes: {} removed", removed.count);
        removed
    }

    // ---- history ----

    /// Restore the state before the last mutation
    pub fn undo(&mut self) -> HistoryOutcome {
        let outcome = self.history.undo(&mut self.piece);
        tracing::info!("undo: {:?} ({} left)", outcome, self.history.undo_len());
        outcome
    }

    /// Re-apply the last undone mutation
    pub fn redo(&mut self) -> HistoryOutcome {
        let outcome = self.history.redo(&mut self.piece);
        tracing::info!("redo: {:?} ({} left)", outcome, self.history.redo_len());
        outcome
    }

    // ---- export ----

    /// Lower the piece without writing anything
    pub fn export_plan(&self) -> Result<ExportPlan> {
        export::lower(&self.piece, &self.export_settings)
    }

    /// Write the piece to a MIDI file
    pub fn export_midi(&self, path: &str) -> Result<ExportSummary> {
        let summary =
            export::export_piece(&self.piece, &self.export_settings, self.encoder.as_ref(), path)?;
        tracing::info!("{}", summary.message);
        Ok(summary)
    }
}
