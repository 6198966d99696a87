// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory for harmonia.
//!
//! Intervals and notes at the bottom, then the harmonic structures built
//! from them (scales, chords, keys), chord symbol inference, octave layout
//! and voice leading.

pub mod chord;
pub mod harmonic;
pub mod interval;
pub mod key;
pub mod note;
pub mod octave;
pub mod scale;
pub mod symbol;
pub mod voicing;

pub use chord::{Chord, ChordDefinition, Structure, CHORD_DEFINITIONS};
pub use harmonic::Harmonic;
pub use interval::Interval;
pub use key::{Degree, Direction, GreekMode, Key, Mode};
pub use note::{Accidental, MidiNote, Note};
pub use octave::OctaveRange;
pub use scale::{NamedScale, Scale, ScaleCatalog, ScaleType};
pub use voicing::NearestChordOptions;
