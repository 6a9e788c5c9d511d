// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Overlap resolution for sections and chords.
//!
//! Both timelines keep the same invariant (sorted, no two entries
//! overlapping) but repair it differently:
//! - sections trim or drop the immediate neighbours of an edited section
//! - chords split every existing span that a new span lands on

use super::chord::ChordSpan;
use super::section::Section;

/// What happened to one neighbour during section trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborFix {
    /// Neighbour boundary moved
    Trimmed { name: String, start: u32, end: u32 },
    /// Neighbour no longer had a valid range and was deleted
    Removed { name: String },
}

/// Trim the sections either side of `index` so they no longer overlap it.
///
/// Only the entries directly before and after `index` in the current
/// array order are inspected. The list is re-sorted by `start_measure`
/// afterwards. A larger overlap that reaches past an immediate neighbour
/// is left in place.
pub fn trim_section_neighbors(sections: &mut Vec<Section>, index: usize) -> Vec<NeighborFix> {
    let mut fixes = Vec::new();
    let mut index = index;

    if index > 0 {
        let start = sections[index].start_measure;
        let prev = &mut sections[index - 1];
        if start <= prev.end_measure {
            prev.end_measure = start.saturating_sub(1);
            if prev.end_measure < prev.start_measure {
                let removed = sections.remove(index - 1);
                fixes.push(NeighborFix::Removed { name: removed.name });
                index -= 1;
            } else {
                fixes.push(NeighborFix::Trimmed {
                    name: prev.name.clone(),
                    start: prev.start_measure,
                    end: prev.end_measure,
                });
            }
        }
    }

    if index + 1 < sections.len() {
        let end = sections[index].end_measure;
        let next = &mut sections[index + 1];
        if end >= next.start_measure {
            next.start_measure = end.saturating_add(1);
            if next.start_measure > next.end_measure {
                let removed = sections.remove(index + 1);
                fixes.push(NeighborFix::Removed { name: removed.name });
            } else {
                fixes.push(NeighborFix::Trimmed {
                    name: next.name.clone(),
                    start: next.start_measure,
                    end: next.end_measure,
                });
            }
        }
    }

    sort_sections(sections);
    fixes
}

/// Sort sections by first measure
pub fn sort_sections(sections: &mut [Section]) {
    sections.sort_by_key(|s| s.start_measure);
}

/// Lay new spans over the chord timeline.
///
/// Each new span is applied in order: every existing span it intersects
/// is replaced by the parts before and after it (if any), then the new
/// span is appended. The list is sorted by beat once all spans are in.
pub fn insert_chord_spans(chords: &mut Vec<ChordSpan>, new_spans: &[ChordSpan]) {
    for new_span in new_spans {
        let new_start = new_span.beat;
        let new_end = new_span.end();

        let mut updated = Vec::with_capacity(chords.len() + 2);
        for existing in chords.drain(..) {
            if !existing.intersects(new_start, new_end) {
                updated.push(existing);
                continue;
            }
            if existing.beat < new_start {
                updated.push(existing.residual(existing.beat, new_start));
            }
            if existing.end() > new_end {
                updated.push(existing.residual(new_end, existing.end()));
            }
        }
        updated.push(new_span.clone());
        *chords = updated;
    }

    sort_chords(chords);
}

/// Sort chord spans by start beat
pub fn sort_chords(chords: &mut [ChordSpan]) {
    chords.sort_by(|a, b| a.beat.total_cmp(&b.beat));
}

/// Drop every span intersecting `[start, end)`, returning how many went
pub fn remove_chord_spans(chords: &mut Vec<ChordSpan>, start: f64, end: f64) -> usize {
    let before = chords.len();
    chords.retain(|c| !c.intersects(start, end));
    before - chords.len()
}

/// Span containing `beat`, if any
pub fn chord_at(chords: &[ChordSpan], beat: f64) -> Option<&ChordSpan> {
    chords.iter().find(|c| c.contains(beat))
}
