// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Lowering a piece into delta-timed note events.
//!
//! The pipeline is read-only over the piece:
//! 1. evaluate every note's beat expressions and convert to ticks
//! 2. assign channels and GM programs per track
//! 3. take tempo and meter from the first section
//! 4. sort each track's events by `(tick, kind)` and delta-encode them

use std::collections::BTreeMap;

use serde::Serialize;

use super::smf::MAX_VLQ;
use crate::error::{ComposeError, Result};
use crate::music::instrument;
use crate::timeline::section::parse_time_signature;
use crate::timeline::{Note, Piece};

/// Ticks per quarter note in the exported stream
pub const TICKS_PER_BEAT: u16 = 480;

/// Channel reserved for percussion tracks (channel 10 when 1-indexed)
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Number of MIDI channels
pub const CHANNEL_COUNT: u8 = 16;

/// Parameters that shape the exported stream
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Tick resolution per beat
    pub ticks_per_beat: u16,
    /// Velocity for note-on events
    pub velocity: u8,
    /// Tempo when the piece has no sections
    pub default_tempo: u32,
    /// Meter when the piece has no sections
    pub default_time_signature: (u8, u8),
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            ticks_per_beat: TICKS_PER_BEAT,
            velocity: 64,
            default_tempo: 120,
            default_time_signature: (4, 4),
        }
    }
}

/// Kind of note event; starts order before ends at the same tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteEventKind {
    NoteOn,
    NoteOff,
}

/// One delta-timed channel event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    /// Ticks since the previous event in the same track
    pub delta: u64,
    /// Start or end
    pub kind: NoteEventKind,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// MIDI pitch
    pub pitch: u8,
    /// Velocity (0 for note-off)
    pub velocity: u8,
}

/// Everything needed to write one track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPlan {
    /// Track name
    pub name: String,
    /// Instrument as stored on the track
    pub instrument: String,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Program change, absent for percussion
    pub program: Option<u8>,
    /// Note events in play order
    pub events: Vec<NoteEvent>,
}

impl TrackPlan {
    /// Number of notes in this track
    pub fn note_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == NoteEventKind::NoteOn)
            .count()
    }

    /// Absolute ticks of each event, undoing the delta encoding
    pub fn absolute_ticks(&self) -> Vec<u64> {
        let mut tick = 0;
        self.events
            .iter()
            .map(|e| {
                tick += e.delta;
                tick
            })
            .collect()
    }
}

/// A piece lowered for the container encoder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPlan {
    /// Tick resolution per beat
    pub ticks_per_beat: u16,
    /// Tempo in BPM
    pub tempo: u32,
    /// Tempo as microseconds per quarter note
    pub micros_per_quarter: u32,
    /// Time signature numerator and denominator
    pub time_signature: (u8, u8),
    /// Tracks in name order
    pub tracks: Vec<TrackPlan>,
}

impl ExportPlan {
    /// Total notes across all tracks
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.note_count()).sum()
    }
}

/// Convert beats to ticks, truncating toward zero
pub fn beats_to_ticks(beats: f64, ticks_per_beat: u16) -> u64 {
    (beats * ticks_per_beat as f64) as u64
}

/// Microseconds per quarter note at `bpm`
pub fn micros_per_quarter(bpm: u32) -> u32 {
    60_000_000 / bpm.max(1)
}

/// Assign channels to instruments in order.
///
/// Percussion instruments share the reserved channel; everything else
/// takes the next free channel, skipping the reserved one and wrapping
/// after 16.
pub fn assign_channels<'a, I>(instruments: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut next = 0u8;
    instruments
        .into_iter()
        .map(|name| {
            if instrument::is_percussion(name) {
                return PERCUSSION_CHANNEL;
            }
            if next == PERCUSSION_CHANNEL {
                next += 1;
            }
            if next >= CHANNEL_COUNT {
                next = 0;
            }
            let channel = next;
            next += 1;
            channel
        })
        .collect()
}

/// Absolute-tick events for one track, sorted and delta-encoded
fn track_events(notes: &[&Note], channel: u8, settings: &ExportSettings) -> Result<Vec<NoteEvent>> {
    let mut timed = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let beat = note.start_beat()?;
        let start = beats_to_ticks(beat, settings.ticks_per_beat);
        let length = beats_to_ticks(note.duration_beats()?, settings.ticks_per_beat);
        // Every delta is at most the end tick, so bounding the end keeps deltas encodable
        let end = start
            .checked_add(length)
            .filter(|&tick| tick <= MAX_VLQ)
            .ok_or(ComposeError::TickOverflow {
                beat,
                ticks_per_beat: settings.ticks_per_beat,
                max_tick: MAX_VLQ,
            })?;
        timed.push((start, NoteEventKind::NoteOn, note.pitch));
        timed.push((end, NoteEventKind::NoteOff, note.pitch));
    }

    // Stable: equal (tick, kind) keep insertion order
    timed.sort_by_key(|&(tick, kind, _)| (tick, kind));

    let mut previous = 0u64;
    Ok(timed
        .into_iter()
        .map(|(tick, kind, pitch)| {
            let delta = tick - previous;
            previous = tick;
            NoteEvent {
                delta,
                kind,
                channel,
                pitch,
                velocity: match kind {
                    NoteEventKind::NoteOn => settings.velocity,
                    NoteEventKind::NoteOff => 0,
                },
            }
        })
        .collect())
}

/// Lower `piece` into an export plan
pub fn lower(piece: &Piece, settings: &ExportSettings) -> Result<ExportPlan> {
    // Only tracks that own notes are exported, in name order
    let mut by_track: BTreeMap<&str, Vec<&Note>> = BTreeMap::new();
    for note in piece.all_notes() {
        if piece.track(&note.track).is_some() {
            by_track.entry(note.track.as_str()).or_default().push(note);
        }
    }

    let instruments: Vec<&str> = by_track
        .keys()
        .filter_map(|name| piece.track(name))
        .map(|t| t.instrument.as_str())
        .collect();
    let channels = assign_channels(instruments.iter().copied());

    let (tempo, time_signature) = match piece.first_section() {
        Some(section) => (section.tempo, parse_time_signature(&section.time_signature)?),
        None => (settings.default_tempo, settings.default_time_signature),
    };

    let mut tracks = Vec::with_capacity(by_track.len());
    for (((name, notes), instrument_name), channel) in
        by_track.iter().zip(&instruments).zip(channels)
    {
        let program = if instrument::is_percussion(instrument_name) {
            None
        } else {
            Some(instrument::program_for(instrument_name))
        };
        tracks.push(TrackPlan {
            name: name.to_string(),
            instrument: instrument_name.to_string(),
            channel,
            program,
            events: track_events(notes, channel, settings)?,
        });
    }

    Ok(ExportPlan {
        ticks_per_beat: settings.ticks_per_beat,
        tempo,
        micros_per_quarter: micros_per_quarter(tempo),
        time_signature,
        tracks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::note::MAX_BEAT;
    use crate::timeline::{NoteSpec, Section};

    #[test]
    fn test_beats_to_ticks() {
        assert_eq!(beats_to_ticks(0.0, 480), 0);
        assert_eq!(beats_to_ticks(1.0, 480), 480);
        assert_eq!(beats_to_ticks(0.5, 480), 240);
        assert_eq!(beats_to_ticks(1.0 / 3.0, 480), 160);
    }

    #[test]
    fn test_micros_per_quarter() {
        assert_eq!(micros_per_quarter(120), 500_000);
        assert_eq!(micros_per_quarter(90), 666_666);
    }

    #[test]
    fn test_channel_assignment() {
        let channels = assign_channels(["piano", "drums", "bass"]);
        assert_eq!(channels, vec![0, 9, 1]);
    }

    #[test]
    fn test_channel_assignment_skips_and_wraps() {
        let names = vec!["piano"; 17];
        let channels = assign_channels(names.iter().copied());
        assert_eq!(&channels[..9], &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(channels[9], 10);
        assert_eq!(channels[14], 15);
        assert_eq!(channels[15], 0);
        assert_eq!(channels[16], 1);
        assert!(!channels.contains(&9));
    }

    #[test]
    fn test_lower_defaults_without_sections() {
        let mut piece = Piece::new();
        piece.add_track("lead", "Synth Voice").unwrap();
        piece.add_notes(vec![NoteSpec::new("lead", 72, 0, 1)]).unwrap();

        let plan = lower(&piece, &ExportSettings::default()).unwrap();
        assert_eq!(plan.tempo, 120);
        assert_eq!(plan.micros_per_quarter, 500_000);
        assert_eq!(plan.time_signature, (4, 4));
        assert_eq!(plan.tracks[0].program, Some(54));
    }

    #[test]
    fn test_lower_uses_first_section() {
        let mut piece = Piece::new();
        piece.add_track("piano", "piano").unwrap();
        piece
            .add_section(Section::new("b", 5, 8).with_tempo(90).with_time_signature("3/4"))
            .unwrap();
        piece
            .add_section(Section::new("a", 1, 4).with_tempo(60).with_time_signature("6/8"))
            .unwrap();
        piece.add_notes(vec![NoteSpec::new("piano", 60, 0, 1)]).unwrap();

        let plan = lower(&piece, &ExportSettings::default()).unwrap();
        assert_eq!(plan.tempo, 60);
        assert_eq!(plan.micros_per_quarter, 1_000_000);
        assert_eq!(plan.time_signature, (6, 8));
    }

    #[test]
    fn test_lower_skips_empty_tracks_and_sorts_by_name() {
        let mut piece = Piece::new();
        piece.add_track("strings", "strings").unwrap();
        piece.add_track("bass", "bass").unwrap();
        piece.add_track("empty", "flute").unwrap();
        piece
            .add_notes(vec![
                NoteSpec::new("strings", 60, 0, 4),
                NoteSpec::new("bass", 36, 0, 4),
            ])
            .unwrap();

        let plan = lower(&piece, &ExportSettings::default()).unwrap();
        let names: Vec<&str> = plan.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["bass", "strings"]);
        assert_eq!(plan.tracks[0].channel, 0);
        assert_eq!(plan.tracks[1].channel, 1);
        assert_eq!(plan.tracks[0].program, Some(32));
        assert_eq!(plan.tracks[1].program, Some(48));
    }

    #[test]
    fn test_percussion_has_no_program() {
        let mut piece = Piece::new();
        piece.add_track("kit", "Drums").unwrap();
        piece.add_notes(vec![NoteSpec::new("kit", 36, 0, 1)]).unwrap();

        let plan = lower(&piece, &ExportSettings::default()).unwrap();
        assert_eq!(plan.tracks[0].channel, PERCUSSION_CHANNEL);
        assert_eq!(plan.tracks[0].program, None);
    }

    #[test]
    fn test_events_sorted_and_delta_encoded() {
        let mut piece = Piece::new();
        piece.add_track("piano", "piano").unwrap();
        piece
            .add_notes(vec![
                NoteSpec::new("piano", 64, 1, 1),
                NoteSpec::new("piano", 60, 0, 1),
                NoteSpec::new("piano", 67, "1/2", "1/2"),
            ])
            .unwrap();

        let plan = lower(&piece, &ExportSettings::default()).unwrap();
        let track = &plan.tracks[0];
        let summary: Vec<(u64, NoteEventKind, u8)> = track
            .events
            .iter()
            .map(|e| (e.delta, e.kind, e.pitch))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, NoteEventKind::NoteOn, 60),
                (240, NoteEventKind::NoteOn, 67),
                (240, NoteEventKind::NoteOn, 64),
                (0, NoteEventKind::NoteOff, 60),
                (0, NoteEventKind::NoteOff, 67),
                (480, NoteEventKind::NoteOff, 64),
            ]
        );
        assert_eq!(track.absolute_ticks(), vec![0, 240, 480, 480, 480, 960]);
        assert_eq!(track.note_count(), 3);
    }

    #[test]
    fn test_latest_note_fits_default_resolution() {
        let mut piece = Piece::new();
        piece.add_track("piano", "piano").unwrap();
        piece
            .add_notes(vec![NoteSpec::new("piano", 60, MAX_BEAT - 1.0, 1)])
            .unwrap();

        let plan = lower(&piece, &ExportSettings::default()).unwrap();
        assert_eq!(
            plan.tracks[0].absolute_ticks().last().copied(),
            Some(beats_to_ticks(MAX_BEAT, TICKS_PER_BEAT))
        );
        assert!(beats_to_ticks(MAX_BEAT, TICKS_PER_BEAT) <= MAX_VLQ);
    }

    #[test]
    fn test_tick_overflow_is_an_error() {
        let mut piece = Piece::new();
        piece.add_track("piano", "piano").unwrap();
        piece
            .add_notes(vec![NoteSpec::new("piano", 60, 400_000, 1)])
            .unwrap();

        let settings = ExportSettings {
            ticks_per_beat: 0x7FFF,
            ..ExportSettings::default()
        };
        assert!(matches!(
            lower(&piece, &settings),
            Err(ComposeError::TickOverflow { ticks_per_beat: 0x7FFF, .. })
        ));
    }

    #[test]
    fn test_lower_does_not_mutate() {
        let mut piece = Piece::new();
        piece.add_track("piano", "piano").unwrap();
        piece.add_notes(vec![NoteSpec::new("piano", 60, "1+1", 1)]).unwrap();
        let before = piece.clone();
        lower(&piece, &ExportSettings::default()).unwrap();
        assert_eq!(piece, before);
    }
}
