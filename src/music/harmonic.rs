// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Shared behaviour for anything built from a root plus derived notes.

use super::note::{MidiNote, Note};
use super::octave::OctaveRange;
use crate::error::Result;

/// A root note, the ordered notes derived from it, and the octave window
/// they were laid out in.
pub trait Harmonic {
    fn root(&self) -> &Note;

    fn notes(&self) -> &[Note];

    fn octaves(&self) -> OctaveRange;

    /// Lay the notes out again inside a new octave window
    fn assign_octaves(&mut self, range: OctaveRange) -> Result<()>;

    fn midi(&self) -> Vec<MidiNote> {
        self.notes().iter().map(Note::midi).collect()
    }

    /// Spelled pitches with octaves ("C#3")
    fn pitches(&self) -> Vec<String> {
        self.notes().iter().map(Note::pitch).collect()
    }

    /// Pitch-class names without octaves ("C#")
    fn names(&self) -> Vec<&'static str> {
        self.notes().iter().map(Note::name).collect()
    }

    fn freqs(&self) -> Vec<f64> {
        self.notes().iter().map(Note::freq).collect()
    }

    fn len(&self) -> usize {
        self.notes().len()
    }

    fn is_empty(&self) -> bool {
        self.notes().is_empty()
    }

    /// Check if a MIDI note's pitch class occurs among the notes
    fn contains_midi(&self, midi: MidiNote) -> bool {
        self.notes().iter().any(|n| n.dist_c() == midi % 12)
    }
}
