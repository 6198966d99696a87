// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Spelled pitches with octave, MIDI number and frequency.
//!
//! A [`Note`] remembers how it was spelled (`C#` versus `Db`) as well as
//! its enharmonic counterpart. Octaves follow the convention where MIDI 60
//! is `C3`, so MIDI 0 is `C-2` and MIDI 127 is `G8`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Octave used when a spelling carries none
pub const DEFAULT_OCTAVE: i32 = 3;

/// Sharp-spelled chromatic scale starting from C
pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat-spelled chromatic scale starting from C
pub const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

const NATURALS: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];

const ENHARMONICS: [(&str, &str); 5] = [
    ("C#", "Db"),
    ("D#", "Eb"),
    ("F#", "Gb"),
    ("G#", "Ab"),
    ("A#", "Bb"),
];

/// How a pitch class is spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Accidental of a pitch-class name such as "F#" or "Bb"
    pub fn of(name: &str) -> Self {
        if name.ends_with('#') {
            Accidental::Sharp
        } else if name.len() > 1 && name.ends_with('b') {
            Accidental::Flat
        } else {
            Accidental::Natural
        }
    }

    /// Chromatic names to spell with; naturals spell with sharps
    pub fn names(self) -> &'static [&'static str; 12] {
        match self {
            Accidental::Flat => &FLAT_NAMES,
            _ => &SHARP_NAMES,
        }
    }
}

/// Resolve a pitch-class spelling to its canonical name and enharmonic.
fn resolve_spelling(name: &str) -> Option<(&'static str, &'static str)> {
    if let Some(natural) = NATURALS.iter().find(|n| **n == name) {
        return Some((natural, natural));
    }
    ENHARMONICS.iter().find_map(|(sharp, flat)| {
        if *sharp == name {
            Some((*sharp, *flat))
        } else if *flat == name {
            Some((*flat, *sharp))
        } else {
            None
        }
    })
}

/// Pitch class (0-11) of a spelled name
pub fn pitch_class_of(name: &str) -> Option<u8> {
    SHARP_NAMES
        .iter()
        .position(|n| *n == name)
        .or_else(|| FLAT_NAMES.iter().position(|n| *n == name))
        .map(|pc| pc as u8)
}

/// A single spelled pitch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Note {
    name: &'static str,
    enharmonic: &'static str,
    octave: i32,
    midi: MidiNote,
}

impl Note {
    /// Parse a spelled pitch such as "C#3", "Bb-1" or "E" (octave 3)
    pub fn parse(pitch: &str) -> Result<Self> {
        let pitch = pitch.trim();
        let unrecognized = || Error::UnrecognizedNote(pitch.to_string());

        let mut chars = pitch.char_indices();
        let (_, letter) = chars.next().ok_or_else(unrecognized)?;
        let split = match chars.next() {
            Some((i, '#')) | Some((i, 'b')) => i + 1,
            Some((i, _)) => i,
            None => pitch.len(),
        };

        let spelled = format!(
            "{}{}",
            letter.to_ascii_uppercase(),
            &pitch[letter.len_utf8()..split]
        );
        let octave = match &pitch[split..] {
            "" => DEFAULT_OCTAVE,
            rest => rest.parse::<i32>().map_err(|_| unrecognized())?,
        };

        let (name, enharmonic) = resolve_spelling(&spelled).ok_or_else(unrecognized)?;
        let pc = pitch_class_of(name).ok_or_else(unrecognized)? as i32;
        let midi = (octave + 2) * 12 + pc;
        if !(0..=127).contains(&midi) {
            return Err(Error::MidiOutOfRange(midi));
        }

        Ok(Self {
            name,
            enharmonic,
            octave,
            midi: midi as MidiNote,
        })
    }

    /// Note for a MIDI number, spelled with sharps
    pub fn from_midi(midi: i32) -> Result<Self> {
        Self::from_midi_with(midi, Accidental::Sharp)
    }

    /// Note for a MIDI number, spelled with the given accidental where it matters
    pub fn from_midi_with(midi: i32, accidental: Accidental) -> Result<Self> {
        if !(0..=127).contains(&midi) {
            return Err(Error::MidiOutOfRange(midi));
        }
        let spelled = accidental.names()[(midi % 12) as usize];
        let (name, enharmonic) = resolve_spelling(spelled)
            .ok_or_else(|| Error::UnrecognizedNote(spelled.to_string()))?;

        Ok(Self {
            name,
            enharmonic,
            octave: (11 * midi) / 132 - 2,
            midi: midi as MidiNote,
        })
    }

    /// Pitch-class name ("C#")
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The other spelling of this pitch class; naturals return themselves
    pub fn enharmonic(&self) -> &'static str {
        self.enharmonic
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn midi(&self) -> MidiNote {
        self.midi
    }

    /// Full spelled pitch ("C#3")
    pub fn pitch(&self) -> String {
        format!("{}{}", self.name, self.octave)
    }

    /// Frequency in Hz, A440 equal temperament (MIDI 69)
    pub fn freq(&self) -> f64 {
        2f64.powf((self.midi as f64 - 69.0) / 12.0) * 440.0
    }

    pub fn accidental(&self) -> Accidental {
        Accidental::of(self.name)
    }

    pub fn letter(&self) -> char {
        self.name.chars().next().unwrap_or('C')
    }

    /// Semitones above the nearest C below (the pitch-class index)
    pub fn dist_c(&self) -> u8 {
        self.midi % 12
    }

    /// Same name, same enharmonic, or same MIDI number
    pub fn equals(&self, other: &Note) -> bool {
        self.name == other.name || self.enharmonic == other.name || self.midi == other.midi
    }

    /// The note a semitone up, keeping flat spelling for flat notes
    pub fn next(&self) -> Result<Note> {
        self.transpose(1)
    }

    /// The note a semitone down, keeping flat spelling for flat notes
    pub fn prev(&self) -> Result<Note> {
        self.transpose(-1)
    }

    /// Shift by semitones, keeping this note's sharp/flat preference
    pub fn transpose(&self, semitones: i32) -> Result<Note> {
        Note::from_midi_with(self.midi as i32 + semitones, self.spelling())
    }

    /// The same MIDI number spelled with the given accidental
    pub fn respell(&self, accidental: Accidental) -> Note {
        let name = accidental.names()[self.dist_c() as usize];
        match resolve_spelling(name) {
            Some((name, enharmonic)) => Note {
                name,
                enharmonic,
                ..self.clone()
            },
            None => self.clone(),
        }
    }

    /// This pitch class moved into another octave
    pub fn with_octave(&self, octave: i32) -> Result<Note> {
        let midi = (octave + 2) * 12 + self.dist_c() as i32;
        Note::from_midi_with(midi, self.spelling())
    }

    fn spelling(&self) -> Accidental {
        match self.accidental() {
            Accidental::Flat => Accidental::Flat,
            _ => Accidental::Sharp,
        }
    }
}

impl FromStr for Note {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Note::parse(s)
    }
}

impl TryFrom<&str> for Note {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Note::parse(s)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_round_trip() {
        for midi in 0..=127 {
            assert_eq!(Note::from_midi(midi).unwrap().midi() as i32, midi);
        }
    }

    #[test]
    fn test_midi_out_of_range() {
        assert_eq!(Note::from_midi(128), Err(Error::MidiOutOfRange(128)));
        assert_eq!(Note::from_midi(-1), Err(Error::MidiOutOfRange(-1)));
        assert!(matches!(Note::parse("A8"), Err(Error::MidiOutOfRange(_))));
    }

    #[test]
    fn test_pitch_round_trip() {
        for pitch in ["C3", "C#3", "Db3", "Bb-1", "G8", "C-2", "F#5", "Ab0"] {
            assert_eq!(Note::parse(pitch).unwrap().pitch(), pitch);
        }
    }

    #[test]
    fn test_octave_convention() {
        let middle_c = Note::from_midi(60).unwrap();
        assert_eq!(middle_c.pitch(), "C3");
        assert_eq!(Note::from_midi(0).unwrap().pitch(), "C-2");
        assert_eq!(Note::from_midi(127).unwrap().pitch(), "G8");
        assert_eq!(Note::parse("E").unwrap().midi(), 64);
    }

    #[test]
    fn test_unrecognized_spellings() {
        for bad in ["Cb3", "E#", "H2", "", "C##", "Dx4"] {
            assert!(
                matches!(Note::parse(bad), Err(Error::UnrecognizedNote(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_enharmonics() {
        let cs = Note::parse("C#3").unwrap();
        let db = Note::parse("Db3").unwrap();
        assert_eq!(cs.midi(), db.midi());
        assert!(cs.equals(&db));
        assert!(db.equals(&cs));
        assert_eq!(cs.enharmonic(), "Db");
        assert_eq!(db.enharmonic(), "C#");
        assert_eq!(Note::parse("G").unwrap().enharmonic(), "G");
    }

    #[test]
    fn test_equals_ignores_octave_for_same_name() {
        let c3 = Note::parse("C3").unwrap();
        let c4 = Note::parse("C4").unwrap();
        assert!(c3.equals(&c4));
        assert!(!c3.equals(&Note::parse("D3").unwrap()));
    }

    #[test]
    fn test_frequency() {
        // MIDI 69 is A3 under the C3 = 60 numbering
        assert!((Note::from_midi(69).unwrap().freq() - 440.0).abs() < 1e-9);
        assert!((Note::parse("A3").unwrap().freq() - 440.0).abs() < 1e-9);
        assert!((Note::parse("A4").unwrap().freq() - 880.0).abs() < 1e-9);
        assert!((Note::parse("A2").unwrap().freq() - 220.0).abs() < 1e-9);
        assert!((Note::parse("C3").unwrap().freq() - 261.6256).abs() < 1e-3);
    }

    #[test]
    fn test_next_prev_keep_spelling() {
        let db = Note::parse("Db3").unwrap();
        assert_eq!(db.next().unwrap().pitch(), "D3");
        assert_eq!(db.prev().unwrap().pitch(), "C3");

        // D is natural, so the next step down falls back to sharps
        let eb = Note::parse("Eb3").unwrap();
        let d = eb.prev().unwrap();
        assert_eq!(d.pitch(), "D3");
        assert_eq!(d.prev().unwrap().pitch(), "C#3");
        assert_eq!(eb.transpose(-2).unwrap().pitch(), "Db3");

        let c = Note::parse("C3").unwrap();
        assert_eq!(c.next().unwrap().pitch(), "C#3");
        assert_eq!(Note::parse("B3").unwrap().next().unwrap().pitch(), "C4");
        assert!(Note::from_midi(127).unwrap().next().is_err());
    }

    #[test]
    fn test_dist_c() {
        assert_eq!(Note::parse("C5").unwrap().dist_c(), 0);
        assert_eq!(Note::parse("Eb2").unwrap().dist_c(), 3);
        assert_eq!(Note::parse("B-1").unwrap().dist_c(), 11);
    }

    #[test]
    fn test_respell() {
        let cs = Note::parse("C#3").unwrap();
        assert_eq!(cs.respell(Accidental::Flat).pitch(), "Db3");
        assert_eq!(cs.respell(Accidental::Natural).pitch(), "C#3");
        assert_eq!(Note::parse("D3").unwrap().respell(Accidental::Flat).pitch(), "D3");
    }
}
