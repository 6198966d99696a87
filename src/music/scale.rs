// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale definitions and spelling.
//!
//! A scale is a root note plus an interval formula. Building one derives a
//! note per formula entry, spelled either with sharps or with flats: a root
//! that carries an accidental keeps its own, otherwise whichever spelling
//! uses more distinct letter names wins (ties go to sharps). That rule is a
//! heuristic rather than a key-signature algorithm, and chord and key names
//! downstream depend on exactly how it breaks ties.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::harmonic::Harmonic;
use super::interval::{format_formula, parse_formula, Interval};
use super::note::{Accidental, Note, FLAT_NAMES, SHARP_NAMES};
use super::octave::{assign_octaves, OctaveRange};
use crate::error::{Error, Result};

/// Scale types supported by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    // Major scale and modes
    Major,        // Ionian
    Dorian,       // Minor with raised 6th
    Phrygian,     // Minor with lowered 2nd
    Lydian,       // Major with raised 4th
    Mixolydian,   // Major with lowered 7th
    NaturalMinor, // Aeolian
    Locrian,      // Diminished

    // Other minor scales
    HarmonicMinor,
    MelodicMinor, // Ascending form

    // Pentatonic scales
    MajorPentatonic,
    MinorPentatonic,

    Blues,
    WholeTone,
    Chromatic,

    // Custom scale from a formula
    Custom,
}

impl ScaleType {
    /// Every named scale type
    pub const BUILT_IN: [ScaleType; 14] = [
        ScaleType::Major,
        ScaleType::Dorian,
        ScaleType::Phrygian,
        ScaleType::Lydian,
        ScaleType::Mixolydian,
        ScaleType::NaturalMinor,
        ScaleType::Locrian,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::MajorPentatonic,
        ScaleType::MinorPentatonic,
        ScaleType::Blues,
        ScaleType::WholeTone,
        ScaleType::Chromatic,
    ];

    /// Interval formula for this scale type
    pub fn formula(self) -> &'static str {
        match self {
            ScaleType::Major => "1P 2M 3M 4P 5P 6M 7M",
            ScaleType::Dorian => "1P 2M 3m 4P 5P 6M 7m",
            ScaleType::Phrygian => "1P 2m 3m 4P 5P 6m 7m",
            ScaleType::Lydian => "1P 2M 3M 4A 5P 6M 7M",
            ScaleType::Mixolydian => "1P 2M 3M 4P 5P 6M 7m",
            ScaleType::NaturalMinor => "1P 2M 3m 4P 5P 6m 7m",
            ScaleType::Locrian => "1P 2m 3m 4P 5d 6m 7m",

            ScaleType::HarmonicMinor => "1P 2M 3m 4P 5P 6m 7M",
            ScaleType::MelodicMinor => "1P 2M 3m 4P 5P 6M 7M",

            ScaleType::MajorPentatonic => "1P 2M 3M 5P 6M",
            ScaleType::MinorPentatonic => "1P 3m 4P 5P 7m",

            ScaleType::Blues => "1P 3m 4P 5d 5P 7m",
            ScaleType::WholeTone => "1P 2M 3M 4A 5A 7m",
            ScaleType::Chromatic => "1P 2m 2M 3m 3M 4P 4A 5P 6m 6M 7m 7M",

            ScaleType::Custom => "", // Custom scales carry their own
        }
    }

    /// The named scale type whose formula matches, or `Custom`
    pub fn from_formula(formula: &str) -> Self {
        let normalized = formula.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::BUILT_IN
            .into_iter()
            .find(|st| st.formula() == normalized)
            .unwrap_or(ScaleType::Custom)
    }

    /// Parse scale type from string
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match s.as_str() {
            "major" | "ionian" => Some(ScaleType::Major),
            "dorian" => Some(ScaleType::Dorian),
            "phrygian" => Some(ScaleType::Phrygian),
            "lydian" => Some(ScaleType::Lydian),
            "mixolydian" => Some(ScaleType::Mixolydian),
            "minor" | "naturalminor" | "aeolian" => Some(ScaleType::NaturalMinor),
            "locrian" => Some(ScaleType::Locrian),
            "harmonicminor" => Some(ScaleType::HarmonicMinor),
            "melodicminor" => Some(ScaleType::MelodicMinor),
            "majorpentatonic" | "pentatonicmajor" => Some(ScaleType::MajorPentatonic),
            "minorpentatonic" | "pentatonicminor" | "pentatonic" => Some(ScaleType::MinorPentatonic),
            "blues" | "minorblues" => Some(ScaleType::Blues),
            "wholetone" => Some(ScaleType::WholeTone),
            "chromatic" => Some(ScaleType::Chromatic),
            _ => None,
        }
    }

    /// Get a human-readable name for this scale type
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::Dorian => "Dorian",
            ScaleType::Phrygian => "Phrygian",
            ScaleType::Lydian => "Lydian",
            ScaleType::Mixolydian => "Mixolydian",
            ScaleType::NaturalMinor => "Natural Minor",
            ScaleType::Locrian => "Locrian",
            ScaleType::HarmonicMinor => "Harmonic Minor",
            ScaleType::MelodicMinor => "Melodic Minor",
            ScaleType::MajorPentatonic => "Major Pentatonic",
            ScaleType::MinorPentatonic => "Minor Pentatonic",
            ScaleType::Blues => "Blues",
            ScaleType::WholeTone => "Whole Tone",
            ScaleType::Chromatic => "Chromatic",
            ScaleType::Custom => "Custom",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Spell one pitch class per interval, choosing sharps or flats for the whole run.
///
/// Returned notes sit in the default octave; callers lay them out with
/// [`assign_octaves`].
pub(crate) fn spell_intervals(root: &Note, intervals: &[Interval]) -> Result<(Vec<Note>, Accidental)> {
    let candidate = |names: &[&'static str; 12]| -> Vec<&'static str> {
        intervals
            .iter()
            .map(|i| names[(root.dist_c() as usize + i.semitones() as usize) % 12])
            .collect()
    };
    let sharps = candidate(&SHARP_NAMES);
    let flats = candidate(&FLAT_NAMES);

    let accidental = match root.accidental() {
        Accidental::Sharp => Accidental::Sharp,
        Accidental::Flat => Accidental::Flat,
        Accidental::Natural => {
            if distinct_letters(&flats) > distinct_letters(&sharps) {
                Accidental::Flat
            } else {
                Accidental::Sharp
            }
        }
    };

    let chosen = match accidental {
        Accidental::Flat => flats,
        _ => sharps,
    };
    let notes = chosen
        .into_iter()
        .map(Note::parse)
        .collect::<Result<Vec<_>>>()?;
    Ok((notes, accidental))
}

fn distinct_letters(names: &[&str]) -> usize {
    names
        .iter()
        .filter_map(|n| n.chars().next())
        .collect::<HashSet<_>>()
        .len()
}

/// A complete scale with root and formula
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    root: Note,
    scale_type: ScaleType,
    intervals: Vec<Interval>,
    spelled: Vec<Note>,
    notes: Vec<Note>,
    accidental: Accidental,
    octaves: OctaveRange,
}

impl Scale {
    /// Create a new scale from root and type, starting in the root's octave
    pub fn new(root: Note, scale_type: ScaleType) -> Result<Self> {
        let octaves = OctaveRange::new(root.octave(), 1);
        Self::build(root, scale_type, scale_type.formula(), octaves)
    }

    /// Create a scale from root and an interval formula ("1P 2M 3m ...")
    pub fn from_formula(root: Note, formula: &str) -> Result<Self> {
        let octaves = OctaveRange::new(root.octave(), 1);
        Self::build(root, ScaleType::from_formula(formula), formula, octaves)
    }

    /// Parse a scale from strings (e.g., "C", "major")
    pub fn parse(root_str: &str, scale_str: &str) -> Result<Self> {
        let root = Note::parse(root_str)?;
        let scale_type = ScaleType::from_str(scale_str)
            .ok_or_else(|| Error::UnrecognizedScale(scale_str.to_string()))?;
        Scale::new(root, scale_type)
    }

    /// Same scale laid out over a different octave window
    pub fn with_octaves(mut self, octaves: OctaveRange) -> Result<Self> {
        self.assign_octaves(octaves)?;
        Ok(self)
    }

    fn build(root: Note, scale_type: ScaleType, formula: &str, octaves: OctaveRange) -> Result<Self> {
        let intervals = parse_formula(formula)?;
        let (spelled, accidental) = spell_intervals(&root, &intervals)?;
        let notes = assign_octaves(&spelled, octaves)?;

        Ok(Self {
            root,
            scale_type,
            intervals,
            spelled,
            notes,
            accidental,
            octaves,
        })
    }

    /// Get the scale type
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Get the interval formula
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn formula(&self) -> String {
        format_formula(&self.intervals)
    }

    /// Whether the scale is spelled with sharps or flats
    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    pub fn has_sharps(&self) -> bool {
        self.accidental == Accidental::Sharp
    }

    pub fn has_flats(&self) -> bool {
        self.accidental == Accidental::Flat
    }

    /// Note whose formula entry has the given degree number (5 for the fifth)
    pub fn note_at(&self, position: u8) -> Result<&Note> {
        self.intervals
            .iter()
            .position(|i| i.number() == position)
            .and_then(|idx| self.notes.get(idx))
            .ok_or(Error::NoSuchHarmonicPosition(position))
    }

    /// Formula entry with the given degree number
    pub fn interval_at(&self, position: u8) -> Option<Interval> {
        self.intervals.iter().copied().find(|i| i.number() == position)
    }

    /// Get the scale degree (1-based) for a note, if it's in the scale
    pub fn degree_of(&self, note: &Note) -> Option<usize> {
        self.spelled
            .iter()
            .position(|n| n.dist_c() == note.dist_c())
            .map(|i| i + 1)
    }
}

impl Harmonic for Scale {
    fn root(&self) -> &Note {
        &self.root
    }

    fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn octaves(&self) -> OctaveRange {
        self.octaves
    }

    fn assign_octaves(&mut self, range: OctaveRange) -> Result<()> {
        self.notes = assign_octaves(&self.spelled, range)?;
        self.octaves = range;
        Ok(())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scale_type {
            ScaleType::Custom => write!(f, "{} [{}]", self.root.name(), self.formula()),
            st => write!(f, "{} {}", self.root.name(), st),
        }
    }
}

/// A scale name bound to an interval formula, as listed in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScale {
    pub name: String,
    pub formula: String,
}

/// Scale names that resolve to formulas.
///
/// Configured names shadow the built-in scale types. Lookups ignore case.
#[derive(Debug, Clone, Default)]
pub struct ScaleCatalog {
    formulas: HashMap<String, String>,
}

impl ScaleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every entry of `named`, rejecting unparseable formulas
    pub fn from_named(named: &[NamedScale]) -> Result<Self> {
        let mut catalog = Self::new();
        for entry in named {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    /// Add or replace a named formula
    pub fn insert(&mut self, entry: &NamedScale) -> Result<()> {
        let intervals = parse_formula(&entry.formula)?;
        self.formulas
            .insert(entry.name.trim().to_lowercase(), format_formula(&intervals));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Interval formula a name stands for
    pub fn formula(&self, name: &str) -> Result<&str> {
        if let Some(formula) = self.formulas.get(&name.trim().to_lowercase()) {
            return Ok(formula.as_str());
        }
        ScaleType::from_str(name)
            .map(ScaleType::formula)
            .ok_or_else(|| Error::UnrecognizedScale(name.to_string()))
    }

    /// Build the named scale over `root`
    pub fn scale(&self, root: Note, name: &str) -> Result<Scale> {
        Scale::from_formula(root, self.formula(name)?)
    }
}
