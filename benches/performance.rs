// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for midigen
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Chord insertion with overlap splitting
//! - Harmony flagging
//! - Export lowering and SMF encoding
//! - Snapshot cost per mutation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use midigen::export::{lower, ExportSettings, SmfWriter};
use midigen::harmony::flag_notes;
use midigen::history::History;
use midigen::music::ChordTable;
use midigen::timeline::{ChordSpec, NoteSpec, Piece};

const SYMBOLS: [&str; 8] = ["C", "Am", "F", "G7", "Dm7", "Em", "Bb", "Ebmaj7"];

/// Build a piece with `bars` bars of eighth notes on two tracks and a chord per bar
fn build_piece(bars: usize) -> Piece {
    let mut piece = Piece::new();
    piece.add_track("piano", "piano").unwrap();
    piece.add_track("bass", "electric bass").unwrap();

    let mut notes = Vec::with_capacity(bars * 10);
    for bar in 0..bars {
        let base = (bar * 4) as f64;
        for step in 0..8 {
            let pitch = 60 + ((bar * 7 + step * 3) % 24) as i64;
            notes.push(NoteSpec::new("piano", pitch, base + step as f64 * 0.5, 0.5));
        }
        notes.push(NoteSpec::new("bass", 36 + (bar % 12) as i64, base, 2.0));
        notes.push(NoteSpec::new("bass", 43, format!("{}+2", base), "2"));
    }
    piece.add_notes(notes).unwrap();

    let chords: Vec<ChordSpec> = (0..bars)
        .map(|bar| ChordSpec::new((bar * 4) as f64, SYMBOLS[bar % SYMBOLS.len()], 4.0))
        .collect();
    let spans = Piece::resolve_chords(&chords, &ChordTable::new()).unwrap();
    piece.insert_chords(&spans);
    piece
}

/// Benchmark chord insertion (split/trim of existing spans)
fn bench_chord_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("chord_insertion");
    let table = ChordTable::new();

    for bars in [16, 64, 256].iter() {
        let piece = build_piece(*bars);
        // Half-bar chords straddling every bar line
        let overlays: Vec<ChordSpec> = (0..*bars)
            .map(|bar| ChordSpec::new(bar as f64 * 4.0 + 3.0, "D7", 2.0))
            .collect();
        let spans = Piece::resolve_chords(&overlays, &table).unwrap();

        group.bench_with_input(BenchmarkId::new("overlay", bars), bars, |b, _| {
            b.iter_batched(
                || piece.clone(),
                |mut piece| {
                    piece.insert_chords(black_box(&spans));
                    black_box(piece.chords().len())
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("resolve_symbols", |b| {
        b.iter(|| {
            for symbol in SYMBOLS {
                black_box(Piece::resolve_chords(&[ChordSpec::new(0.0, symbol, 4.0)], &table).ok());
            }
        })
    });

    group.finish();
}

/// Benchmark harmony flagging
fn bench_flagging(c: &mut Criterion) {
    let mut group = c.benchmark_group("flagging");
    let tracks = vec!["piano".to_string(), "bass".to_string()];

    for bars in [16, 64, 256].iter() {
        let piece = build_piece(*bars);
        let end = (*bars * 4) as f64;
        group.bench_with_input(BenchmarkId::new("flag_notes", bars), bars, |b, _| {
            b.iter_batched(
                || piece.clone(),
                |mut piece| black_box(flag_notes(&mut piece, &tracks, 0.0, end).ok()),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark export lowering and encoding
fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let settings = ExportSettings::default();
    let writer = SmfWriter::new();

    for bars in [16, 64, 256].iter() {
        let piece = build_piece(*bars);
        group.bench_with_input(BenchmarkId::new("lower", bars), bars, |b, _| {
            b.iter(|| black_box(lower(black_box(&piece), &settings).ok()))
        });

        let plan = lower(&piece, &settings).unwrap();
        group.bench_with_input(BenchmarkId::new("encode", bars), bars, |b, _| {
            b.iter(|| black_box(writer.to_bytes(black_box(&plan)).ok()))
        });
    }

    group.finish();
}

/// Benchmark snapshot recording (the cost every mutation pays)
fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshots");

    for bars in [16, 64, 256].iter() {
        let piece = build_piece(*bars);
        group.bench_with_input(BenchmarkId::new("record", bars), bars, |b, _| {
            let mut history = History::new(10);
            b.iter(|| history.record(black_box(&piece)))
        });

        group.bench_with_input(BenchmarkId::new("undo_redo", bars), bars, |b, _| {
            let mut history = History::new(10);
            let mut live = piece.clone();
            history.record(&live);
            b.iter(|| {
                history.undo(&mut live);
                history.redo(&mut live);
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_chord_insertion,
    bench_flagging,
    bench_export,
    bench_snapshots,
);
criterion_main!(benches);
