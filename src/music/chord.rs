// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chords built from symbols, intervals, notes, or a scale plus a structure.
//!
//! The canonical chord table below is ordered: symbol inference walks it
//! top to bottom and takes the first chord that contains every interval it
//! was given, so simpler chords come before their extensions.

use std::collections::HashSet;
use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::harmonic::Harmonic;
use super::interval::{format_formula, parse_formula, Interval, MAX_SEMITONES};
use super::note::{Accidental, Note, DEFAULT_OCTAVE};
use super::octave::{assign_octaves, OctaveRange};
use super::scale::{spell_intervals, Scale};
use super::symbol;
use crate::config::{SearchLimits, SelectionWeights};
use crate::error::{Error, Result};

/// Which scale degrees a chord draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    /// 1, 5
    Power,
    /// 1, 3, 5
    #[default]
    Triad,
    /// 1, 2, 5
    Sus2,
    /// 1, 4, 5
    Sus4,
    /// 1, 3, 5, 6
    Sixth,
    /// 1, 3, 5, 7
    Seventh,
    /// 1, 4, 5, 7
    SeventhSus4,
    /// 1, 3, 5, 7, 9
    Ninth,
    /// 1, 3, 5, 7, 9, 11
    Eleventh,
    /// 1, 3, 5, 7, 9, 13
    Thirteenth,
}

impl Structure {
    /// Scale degrees in this structure
    pub fn degrees(self) -> &'static [u8] {
        match self {
            Structure::Power => &[1, 5],
            Structure::Triad => &[1, 3, 5],
            Structure::Sus2 => &[1, 2, 5],
            Structure::Sus4 => &[1, 4, 5],
            Structure::Sixth => &[1, 3, 5, 6],
            Structure::Seventh => &[1, 3, 5, 7],
            Structure::SeventhSus4 => &[1, 4, 5, 7],
            Structure::Ninth => &[1, 3, 5, 7, 9],
            Structure::Eleventh => &[1, 3, 5, 7, 9, 11],
            Structure::Thirteenth => &[1, 3, 5, 7, 9, 13],
        }
    }

    /// Structures a request for this one may realise, with their weights
    fn variants(self, weights: &SelectionWeights) -> Vec<(Structure, f64)> {
        match self {
            Structure::Triad => vec![
                (Structure::Triad, weights.full_triad),
                (Structure::Power, weights.power),
            ],
            other => vec![(other, 1.0)],
        }
    }

    /// This structure followed by the rest of its family, in retry order
    pub fn family(self) -> Vec<Structure> {
        let members: &[Structure] = match self {
            Structure::Power => &[Structure::Power],
            Structure::Triad | Structure::Sus2 | Structure::Sus4 => &[
                Structure::Triad,
                Structure::Sus4,
                Structure::Sus2,
                Structure::Power,
            ],
            Structure::Sixth | Structure::Seventh | Structure::SeventhSus4 => &[
                Structure::Seventh,
                Structure::SeventhSus4,
                Structure::Sixth,
            ],
            Structure::Ninth | Structure::Eleventh | Structure::Thirteenth => &[
                Structure::Ninth,
                Structure::Eleventh,
                Structure::Thirteenth,
            ],
        };

        let mut family = vec![self];
        family.extend(members.iter().copied().filter(|s| *s != self));
        family
    }
}

/// One entry of the canonical chord table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordDefinition {
    pub symbol: &'static str,
    pub formula: &'static str,
    pub structure: Structure,
}

impl ChordDefinition {
    const fn new(symbol: &'static str, formula: &'static str, structure: Structure) -> Self {
        Self {
            symbol,
            formula,
            structure,
        }
    }

    pub fn intervals(&self) -> Vec<Interval> {
        self.formula
            .split_whitespace()
            .filter_map(|name| Interval::parse(name).ok())
            .collect()
    }

    /// True if every interval in `intervals` (by name) is part of this chord
    pub fn contains_all(&self, intervals: &[Interval]) -> bool {
        let own = self.intervals();
        intervals.iter().all(|i| own.contains(i))
    }

    /// True if this chord has exactly the given interval set
    pub fn matches_exactly(&self, intervals: &[Interval]) -> bool {
        let own: HashSet<Interval> = self.intervals().into_iter().collect();
        let given: HashSet<Interval> = intervals.iter().copied().collect();
        own == given
    }
}

/// Canonical chords in lookup order
pub const CHORD_DEFINITIONS: [ChordDefinition; 28] = [
    ChordDefinition::new("5", "1P 5P", Structure::Power),
    ChordDefinition::new("maj", "1P 3M 5P", Structure::Triad),
    ChordDefinition::new("m", "1P 3m 5P", Structure::Triad),
    ChordDefinition::new("aug", "1P 3M 5A", Structure::Triad),
    ChordDefinition::new("dim", "1P 3m 5d", Structure::Triad),
    ChordDefinition::new("sus2", "1P 2M 5P", Structure::Sus2),
    ChordDefinition::new("sus4", "1P 4P 5P", Structure::Sus4),
    ChordDefinition::new("6", "1P 3M 5P 6M", Structure::Sixth),
    ChordDefinition::new("m6", "1P 3m 5P 6M", Structure::Sixth),
    ChordDefinition::new("maj7", "1P 3M 5P 7M", Structure::Seventh),
    ChordDefinition::new("7", "1P 3M 5P 7m", Structure::Seventh),
    ChordDefinition::new("m7", "1P 3m 5P 7m", Structure::Seventh),
    ChordDefinition::new("mMaj7", "1P 3m 5P 7M", Structure::Seventh),
    ChordDefinition::new("m7b5", "1P 3m 5d 7m", Structure::Seventh),
    ChordDefinition::new("dim7", "1P 3m 5d 7d", Structure::Seventh),
    ChordDefinition::new("aug7", "1P 3M 5A 7m", Structure::Seventh),
    ChordDefinition::new("7sus4", "1P 4P 5P 7m", Structure::SeventhSus4),
    ChordDefinition::new("maj9", "1P 3M 5P 7M 9M", Structure::Ninth),
    ChordDefinition::new("9", "1P 3M 5P 7m 9M", Structure::Ninth),
    ChordDefinition::new("m9", "1P 3m 5P 7m 9M", Structure::Ninth),
    ChordDefinition::new("7b9", "1P 3M 5P 7m 9m", Structure::Ninth),
    ChordDefinition::new("7#9", "1P 3M 5P 7m 9A", Structure::Ninth),
    ChordDefinition::new("maj11", "1P 3M 5P 7M 9M 11P", Structure::Eleventh),
    ChordDefinition::new("11", "1P 3M 5P 7m 9M 11P", Structure::Eleventh),
    ChordDefinition::new("m11", "1P 3m 5P 7m 9M 11P", Structure::Eleventh),
    ChordDefinition::new("maj13", "1P 3M 5P 7M 9M 13M", Structure::Thirteenth),
    ChordDefinition::new("13", "1P 3M 5P 7m 9M 13M", Structure::Thirteenth),
    ChordDefinition::new("m13", "1P 3m 5P 7m 9M 11P 13M", Structure::Thirteenth),
];

/// Look up a canonical chord by symbol
pub fn definition(symbol: &str) -> Option<&'static ChordDefinition> {
    CHORD_DEFINITIONS.iter().find(|d| d.symbol == symbol)
}

/// A chord: root, intervals, optional symbol and structure, and laid-out notes
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    root: Note,
    intervals: Vec<Interval>,
    symbol: Option<String>,
    structure: Option<Structure>,
    /// One pitch class per interval, in interval order
    spelled: Vec<Note>,
    notes: Vec<Note>,
    octaves: OctaveRange,
    inversion: usize,
}

impl Chord {
    /// Parse a chord name such as "Am7", "F#dim" or "Bb" (major).
    ///
    /// A missing root means C. An empty or unknown symbol means major.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        let (root, rest) = split_root(name)?;
        let def = match definition(rest) {
            Some(def) => def,
            None => {
                if !rest.is_empty() {
                    debug!(symbol = rest, "unknown chord symbol, assuming major");
                }
                definition("maj").ok_or_else(|| Error::UnrecognizedChordDescription(name.to_string()))?
            }
        };
        Self::from_definition(root, def)
    }

    /// Chord from a root and a canonical symbol ("m7")
    pub fn from_symbol(root: Note, symbol: &str) -> Result<Self> {
        let def = definition(symbol)
            .ok_or_else(|| Error::UnrecognizedChordDescription(symbol.to_string()))?;
        Self::from_definition(root, def)
    }

    fn from_definition(root: Note, def: &ChordDefinition) -> Result<Self> {
        Self::build(
            root,
            def.intervals(),
            Some(def.symbol.to_string()),
            Some(def.structure),
            None,
        )
    }

    /// Chord from a root and an interval formula ("1P 3m 5P 7m")
    pub fn from_formula(root: Note, formula: &str) -> Result<Self> {
        let intervals = parse_formula(formula)?;
        Self::from_intervals(root, &intervals)
    }

    /// Chord from raw intervals, reusing a canonical symbol on an exact match
    /// and inferring one otherwise
    pub fn from_intervals(root: Note, intervals: &[Interval]) -> Result<Self> {
        Self::from_intervals_spelled(root, intervals, None, &SearchLimits::default())
    }

    fn from_intervals_spelled(
        root: Note,
        intervals: &[Interval],
        accidental: Option<Accidental>,
        limits: &SearchLimits,
    ) -> Result<Self> {
        if intervals.is_empty() {
            return Err(Error::UnrecognizedChordDescription(String::new()));
        }

        if let Some(def) = CHORD_DEFINITIONS.iter().find(|d| d.matches_exactly(intervals)) {
            return Self::build(
                root,
                intervals.to_vec(),
                Some(def.symbol.to_string()),
                Some(def.structure),
                accidental,
            );
        }

        let symbol = symbol::find_chord_symbol_with(intervals, limits)?;
        Self::build(root, intervals.to_vec(), symbol, None, accidental)
    }

    /// Chord from concrete notes; the first note is the root
    pub fn from_notes(notes: &[Note]) -> Result<Self> {
        let root = notes
            .first()
            .ok_or_else(|| Error::UnrecognizedChordDescription(String::new()))?;

        let mut intervals = Vec::with_capacity(notes.len());
        for note in notes {
            let interval = interval_between(root, note).ok_or_else(|| {
                Error::UnrecognizedChordDescription(format!("{} {}", root.pitch(), note.pitch()))
            })?;
            if !intervals.contains(&interval) {
                intervals.push(interval);
            }
        }

        Self::from_intervals(root.clone(), &intervals)
    }

    /// Chord on the scale's root drawing `structure`'s degrees from the scale formula
    pub fn from_scale<R: Rng + ?Sized>(scale: &Scale, structure: Structure, rng: &mut R) -> Result<Self> {
        Self::from_scale_with(
            scale,
            structure,
            rng,
            &SearchLimits::default(),
            &SelectionWeights::default(),
        )
    }

    /// [`Chord::from_scale`] with explicit caps and weights
    pub fn from_scale_with<R: Rng + ?Sized>(
        scale: &Scale,
        structure: Structure,
        rng: &mut R,
        limits: &SearchLimits,
        weights: &SelectionWeights,
    ) -> Result<Self> {
        let variants = structure.variants(weights);
        let drawn = if variants.len() == 1 {
            variants[0].0
        } else {
            let index = WeightedIndex::new(variants.iter().map(|(_, w)| *w))
                .map(|dist| dist.sample(rng))
                .unwrap_or(0);
            variants[index].0
        };

        let mut attempts = 0;
        let candidates = std::iter::once(drawn).chain(structure.family().into_iter().skip(1));
        for candidate in candidates {
            let degrees = candidate.degrees();
            attempts += 1;
            if attempts > limits.structure_retry_cap {
                return Err(Error::NonTerminatingSearch {
                    search: "chord structure retry",
                    cap: limits.structure_retry_cap,
                });
            }

            let intervals = intervals_from_scale(scale, degrees);
            if intervals.len() < degrees.len() {
                debug!(
                    structure = ?candidate,
                    found = intervals.len(),
                    wanted = degrees.len(),
                    "scale can't fill chord structure, trying a sibling"
                );
                continue;
            }

            let mut chord = Self::from_intervals_spelled(
                scale.root().clone(),
                &intervals,
                Some(scale.accidental()),
                limits,
            )?;
            chord.structure = Some(candidate);
            return Ok(chord);
        }

        Err(Error::UnrecognizedChordDescription(format!(
            "{:?} on {}",
            structure,
            scale.formula()
        )))
    }

    /// Infer a symbol for an interval formula; `None` when nothing fits
    pub fn find_chord_symbol(formula: &str) -> Result<Option<String>> {
        let intervals = parse_formula(formula)?;
        symbol::find_chord_symbol(&intervals)
    }

    fn build(
        root: Note,
        intervals: Vec<Interval>,
        symbol: Option<String>,
        structure: Option<Structure>,
        accidental: Option<Accidental>,
    ) -> Result<Self> {
        let (mut spelled, chosen) = spell_intervals(&root, &intervals)?;
        if let Some(accidental) = accidental.filter(|a| *a != chosen && *a != Accidental::Natural) {
            spelled = spelled.iter().map(|n| n.respell(accidental)).collect();
        }
        // The root keeps the caller's spelling
        if let Some(first) = spelled.first_mut() {
            if first.dist_c() == root.dist_c() {
                *first = root.clone();
            }
        }

        let octaves = OctaveRange::new(root.octave(), 1);
        let notes = assign_octaves(&spelled, octaves)?;

        Ok(Self {
            root,
            intervals,
            symbol: symbol.filter(|s| !s.is_empty()),
            structure,
            spelled,
            notes,
            octaves,
            inversion: 0,
        })
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn formula(&self) -> String {
        format_formula(&self.intervals)
    }

    /// Canonical or inferred symbol; `None` when the chord has no name
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn structure(&self) -> Option<Structure> {
        self.structure
    }

    /// Root name followed by the symbol ("Am7")
    pub fn name(&self) -> String {
        format!("{}{}", self.root.name(), self.symbol.as_deref().unwrap_or(""))
    }

    /// How many positions the notes are currently rotated
    pub fn inversion(&self) -> usize {
        self.inversion
    }

    /// Rotate the notes left by `n` positions and lay them out again
    pub fn invert(&mut self, n: usize) -> Result<()> {
        if self.spelled.is_empty() {
            return Ok(());
        }
        let inversion = (self.inversion + n) % self.spelled.len();
        self.notes = assign_octaves(&rotated(&self.spelled, inversion), self.octaves)?;
        self.inversion = inversion;
        Ok(())
    }

    /// Note for the chord interval with the given degree number
    pub fn note_at(&self, position: u8) -> Result<&Note> {
        let len = self.spelled.len();
        self.intervals
            .iter()
            .position(|i| i.number() == position)
            .and_then(|idx| self.notes.get((idx + len - self.inversion) % len))
            .ok_or(Error::NoSuchHarmonicPosition(position))
    }
}

impl Harmonic for Chord {
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
        self.notes = assign_octaves(&rotated(&self.spelled, self.inversion), range)?;
        self.octaves = range;
        Ok(())
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn rotated(notes: &[Note], n: usize) -> Vec<Note> {
    let mut out = notes.to_vec();
    if !out.is_empty() {
        out.rotate_left(n % notes.len());
    }
    out
}

/// Split "F#m7" into the root note and the remaining symbol
fn split_root(name: &str) -> Result<(Note, &str)> {
    let starts_with_root = name
        .chars()
        .next()
        .is_some_and(|c| ('A'..='G').contains(&c));
    if !starts_with_root {
        let root = Note::from_midi((DEFAULT_OCTAVE + 2) * 12)?;
        return Ok((root, name));
    }

    if name.len() >= 2 && matches!(name.as_bytes()[1], b'#' | b'b') {
        if let Ok(root) = Note::parse(&name[..2]) {
            return Ok((root, &name[2..]));
        }
    }
    Ok((Note::parse(&name[..1])?, &name[1..]))
}

/// Intervals of the scale at each structural degree.
///
/// A degree above 7 missing from the formula falls back to the same degree
/// an octave lower, lifted back up where the table names it.
fn intervals_from_scale(scale: &Scale, degrees: &[u8]) -> Vec<Interval> {
    degrees
        .iter()
        .filter_map(|&degree| {
            scale.interval_at(degree).or_else(|| {
                degree
                    .checked_sub(7)
                    .filter(|d| *d > 0)
                    .and_then(|d| scale.interval_at(d))
                    .map(|i| i.compound().unwrap_or(i))
            })
        })
        .collect()
}

/// Interval from `root` up to `note`, numbered by letter distance.
fn interval_between(root: &Note, note: &Note) -> Option<Interval> {
    const LETTERS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];
    let letter_index = |n: &Note| LETTERS.iter().position(|l| *l == n.letter()).unwrap_or(0) as i32;

    let mut semitones = note.midi() as i32 - root.midi() as i32;
    while semitones < 0 {
        semitones += 12;
    }
    while semitones > MAX_SEMITONES as i32 {
        semitones -= 12;
    }

    let steps = (letter_index(note) - letter_index(root)).rem_euclid(7);
    let number = steps + 1 + 7 * (semitones / 12);
    Interval::from_number(number as u8, semitones as u8)
        .or_else(|| Interval::from_semitones(semitones)?.into_iter().next())
}
