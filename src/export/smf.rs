// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file writer.
//!
//! Writes an [`ExportPlan`] as a Type 1 file with one chunk per track.
//! Each track opens with its name, program, tempo and time signature at
//! tick 0, followed by the plan's note events and end-of-track.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::pipeline::{ExportPlan, NoteEvent, NoteEventKind, TrackPlan};
use crate::error::{ComposeError, Result};

/// Largest delta a variable-length quantity can carry
pub(crate) const MAX_VLQ: u64 = 0x0FFF_FFFF;

/// Writes an export plan to a binary container
pub trait ContainerEncoder {
    /// Encode `plan` and write it to `path`
    fn encode(&self, plan: &ExportPlan, path: &Path) -> Result<()>;
}

/// One event ready for serialization
#[derive(Debug, Clone)]
struct SmfEvent {
    /// Ticks since the previous event
    delta: u64,
    /// Event data
    data: Vec<u8>,
}

impl SmfEvent {
    fn note(event: &NoteEvent) -> Self {
        let status = match event.kind {
            NoteEventKind::NoteOn => 0x90,
            NoteEventKind::NoteOff => 0x80,
        };
        Self {
            delta: event.delta,
            data: vec![
                status | (event.channel & 0x0F),
                event.pitch & 0x7F,
                event.velocity & 0x7F,
            ],
        }
    }

    fn program_change(channel: u8, program: u8) -> Self {
        Self {
            delta: 0,
            data: vec![0xC0 | (channel & 0x0F), program & 0x7F],
        }
    }

    fn tempo(micros_per_quarter: u32) -> Self {
        Self {
            delta: 0,
            data: vec![
                0xFF,
                0x51,
                0x03,
                ((micros_per_quarter >> 16) & 0xFF) as u8,
                ((micros_per_quarter >> 8) & 0xFF) as u8,
                (micros_per_quarter & 0xFF) as u8,
            ],
        }
    }

    fn time_signature(numerator: u8, denominator: u8) -> Self {
        // Denominator is expressed as power of 2
        let denom_power = denominator.max(1).trailing_zeros() as u8;
        Self {
            delta: 0,
            data: vec![
                0xFF, 0x58, 0x04,
                numerator,
                denom_power,
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per MIDI quarter note
            ],
        }
    }

    fn track_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut data = vec![0xFF, 0x03];
        push_variable_length(&mut data, bytes.len() as u32);
        data.extend_from_slice(bytes);
        Self { delta: 0, data }
    }

    fn end_of_track() -> Self {
        Self {
            delta: 0,
            data: vec![0xFF, 0x2F, 0x00],
        }
    }
}

/// Append a variable-length quantity
fn push_variable_length(out: &mut Vec<u8>, mut value: u32) {
    let mut bytes = Vec::with_capacity(4);

    bytes.push((value & 0x7F) as u8);
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    out.extend_from_slice(&bytes);
}

/// Type 1 Standard MIDI File writer
#[derive(Debug, Clone, Copy, Default)]
pub struct SmfWriter;

impl SmfWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self
    }

    /// Encode to bytes
    pub fn to_bytes(&self, plan: &ExportPlan) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(plan, &mut buffer)?;
        Ok(buffer)
    }

    /// Write MIDI data to writer
    pub fn write<W: Write>(&self, plan: &ExportPlan, writer: &mut W) -> io::Result<()> {
        self.write_header(writer, plan.tracks.len() as u16, plan.ticks_per_beat)?;
        for track in &plan.tracks {
            let events = self.track_events(plan, track);
            self.write_track(writer, &events)?;
        }
        Ok(())
    }

    /// Meta events, then notes, then end-of-track
    fn track_events(&self, plan: &ExportPlan, track: &TrackPlan) -> Vec<SmfEvent> {
        let mut events = Vec::with_capacity(track.events.len() + 5);
        events.push(SmfEvent::track_name(&track.name));
        if let Some(program) = track.program {
            events.push(SmfEvent::program_change(track.channel, program));
        }
        events.push(SmfEvent::tempo(plan.micros_per_quarter));
        events.push(SmfEvent::time_signature(
            plan.time_signature.0,
            plan.time_signature.1,
        ));
        events.extend(track.events.iter().map(SmfEvent::note));
        events.push(SmfEvent::end_of_track());
        events
    }

    /// Write MIDI file header chunk
    fn write_header<W: Write>(&self, writer: &mut W, num_tracks: u16, ppqn: u16) -> io::Result<()> {
        // MThd
        writer.write_all(b"MThd")?;
        // Chunk length (always 6)
        writer.write_all(&[0, 0, 0, 6])?;
        // Format 1
        writer.write_all(&1u16.to_be_bytes())?;
        // Number of tracks
        writer.write_all(&num_tracks.to_be_bytes())?;
        // PPQN
        writer.write_all(&ppqn.to_be_bytes())?;
        Ok(())
    }

    /// Write a track chunk
    fn write_track<W: Write>(&self, writer: &mut W, events: &[SmfEvent]) -> io::Result<()> {
        let mut track_data = Vec::new();

        for event in events {
            if event.delta > MAX_VLQ {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("event delta {} exceeds MIDI limit", event.delta),
                ));
            }
            push_variable_length(&mut track_data, event.delta as u32);
            track_data.extend_from_slice(&event.data);
        }

        // MTrk
        writer.write_all(b"MTrk")?;
        // Track length
        let length = track_data.len() as u32;
        writer.write_all(&length.to_be_bytes())?;
        // Track data
        writer.write_all(&track_data)?;

        Ok(())
    }
}

impl ContainerEncoder for SmfWriter {
    fn encode(&self, plan: &ExportPlan, path: &Path) -> Result<()> {
        let io_error = |source| ComposeError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        self.write(plan, &mut writer).map_err(io_error)?;
        writer.flush().map_err(io_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::pipeline::{ExportSettings, NoteEvent};

    fn plan(tracks: Vec<TrackPlan>) -> ExportPlan {
        let settings = ExportSettings::default();
        ExportPlan {
            ticks_per_beat: settings.ticks_per_beat,
            tempo: 120,
            micros_per_quarter: 500_000,
            time_signature: (3, 4),
            tracks,
        }
    }

    fn track(name: &str, channel: u8, program: Option<u8>) -> TrackPlan {
        TrackPlan {
            name: name.to_string(),
            instrument: "piano".to_string(),
            channel,
            program,
            events: vec![
                NoteEvent {
                    delta: 0,
                    kind: NoteEventKind::NoteOn,
                    channel,
                    pitch: 60,
                    velocity: 64,
                },
                NoteEvent {
                    delta: 480,
                    kind: NoteEventKind::NoteOff,
                    channel,
                    pitch: 60,
                    velocity: 0,
                },
            ],
        }
    }

    #[test]
    fn test_header() {
        let bytes = SmfWriter::new()
            .to_bytes(&plan(vec![track("a", 0, Some(0)), track("b", 1, Some(40))]))
            .unwrap();

        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(bytes[9], 1); // Format 1
        assert_eq!(&bytes[10..12], &2u16.to_be_bytes()); // 2 tracks
        assert_eq!(&bytes[12..14], &480u16.to_be_bytes()); // PPQN
        assert_eq!(&bytes[14..18], b"MTrk");
    }

    #[test]
    fn test_track_layout() {
        let bytes = SmfWriter::new()
            .to_bytes(&plan(vec![track("Pno", 2, Some(5))]))
            .unwrap();
        let body = &bytes[22..];

        let expected: Vec<u8> = vec![
            0x00, 0xFF, 0x03, 0x03, b'P', b'n', b'o', // track name
            0x00, 0xC2, 0x05, // program change
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo 500000
            0x00, 0xFF, 0x58, 0x04, 0x03, 0x02, 24, 8, // 3/4
            0x00, 0x92, 60, 64, // note on
            0x83, 0x60, 0x82, 60, 0, // note off after 480
            0x00, 0xFF, 0x2F, 0x00, // end of track
        ];
        assert_eq!(body, expected.as_slice());
        assert_eq!(&bytes[18..22], &(expected.len() as u32).to_be_bytes());
    }

    #[test]
    fn test_percussion_track_has_no_program_change() {
        let bytes = SmfWriter::new()
            .to_bytes(&plan(vec![track("kit", 9, None)]))
            .unwrap();
        assert!(!bytes.windows(2).any(|w| w[0] == 0xC9));
    }

    #[test]
    fn test_variable_length() {
        let mut buffer = Vec::new();
        push_variable_length(&mut buffer, 0);
        assert_eq!(buffer, vec![0x00]);

        buffer.clear();
        push_variable_length(&mut buffer, 127);
        assert_eq!(buffer, vec![0x7F]);

        buffer.clear();
        push_variable_length(&mut buffer, 128);
        assert_eq!(buffer, vec![0x81, 0x00]);

        buffer.clear();
        push_variable_length(&mut buffer, 16383);
        assert_eq!(buffer, vec![0xFF, 0x7F]);
    }

    #[test]
    fn test_tempo_event() {
        let event = SmfEvent::tempo(500_000);
        // 500000 = 0x07A120
        assert_eq!(event.data, vec![0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
    }

    #[test]
    fn test_time_signature_event() {
        assert_eq!(SmfEvent::time_signature(6, 8).data[3..5], [6, 3]);
        assert_eq!(SmfEvent::time_signature(4, 4).data[3..5], [4, 2]);
    }

    #[test]
    fn test_encode_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mid");
        let plan = plan(vec![track("a", 0, Some(0))]);

        SmfWriter::new().encode(&plan, &path).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, SmfWriter::new().to_bytes(&plan).unwrap());
    }

    #[test]
    fn test_encode_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.mid");
        let err = SmfWriter::new().encode(&plan(Vec::new()), &path).unwrap_err();
        assert!(matches!(err, ComposeError::Io { .. }));
    }
}
