// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for harmony computations.

use thiserror::Error;

/// Errors raised while building or transforming notes, scales, chords and keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Spelling is neither a natural nor a member of an enharmonic pair
    #[error("unrecognized note: {0:?}")]
    UnrecognizedNote(String),

    /// MIDI number outside 0..=127
    #[error("MIDI number {0} is out of range (0-127)")]
    MidiOutOfRange(i32),

    /// Chord built from neither a known symbol nor resolvable intervals
    #[error("unrecognized chord description: {0:?}")]
    UnrecognizedChordDescription(String),

    /// Interval name missing from the semitone table
    #[error("unrecognized interval: {0:?}")]
    UnrecognizedInterval(String),

    /// Scale name or formula that isn't known (or isn't a diatonic mode where one is required)
    #[error("unrecognized scale or mode: {0:?}")]
    UnrecognizedScale(String),

    /// `note_at` asked for a degree the formula doesn't contain
    #[error("no note at harmonic position {0}")]
    NoSuchHarmonicPosition(u8),

    /// A bounded search hit its iteration cap
    #[error("{search} did not terminate within {cap} iterations")]
    NonTerminatingSearch { search: &'static str, cap: usize },
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;
