// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Octave assignment.
//!
//! Lays an abstract pitch-class sequence out as an ascending run of MIDI
//! numbers inside an octave window. The first note anchors the run in the
//! start octave; every later note lands on the first MIDI number at or
//! above the running pointer that carries its pitch class.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::note::{Note, DEFAULT_OCTAVE};
use crate::error::{Error, Result};

/// Octave window: first octave plus how many octaves to span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OctaveRange {
    pub start: i32,
    pub count: u32,
}

impl OctaveRange {
    pub fn new(start: i32, count: u32) -> Self {
        Self { start, count }
    }
}

impl Default for OctaveRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_OCTAVE,
            count: 1,
        }
    }
}

/// Assign concrete octaves to `notes`, repeating the sequence `range.count` times.
///
/// Each output note keeps the accidental of the input note it came from.
/// Notes that would land above MIDI 127 are dropped.
pub fn assign_octaves(notes: &[Note], range: OctaveRange) -> Result<Vec<Note>> {
    let Some(first) = notes.first() else {
        return Ok(Vec::new());
    };

    let anchor = (range.start + 2) * 12 + first.dist_c() as i32;
    if !(0..=127).contains(&anchor) {
        return Err(Error::MidiOutOfRange(anchor));
    }

    let total = notes.len() * range.count.max(1) as usize;
    let mut placed = Vec::with_capacity(total);
    let mut pointer = anchor;

    for note in notes.iter().cycle().take(total) {
        let offset = (note.dist_c() as i32 - first.dist_c() as i32).rem_euclid(12);
        let mut midi = anchor + offset;
        while midi < pointer {
            midi += 12;
        }
        if midi > 127 {
            warn!(
                dropped = total - placed.len(),
                "octave window runs past MIDI 127, dropping remaining notes"
            );
            break;
        }
        pointer = midi + 1;
        placed.push(Note::from_midi_with(midi, note.accidental())?);
    }

    Ok(placed)
}
