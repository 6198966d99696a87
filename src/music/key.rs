// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keys over the seven diatonic modes.
//!
//! A key is a scale in one of the Greek modes. Its seven modes (one per
//! scale degree) share the key's pitch collection and are listed starting
//! from the key's own mode. Both the mode list and the tonic chord are
//! built on first use and dropped whenever the key modulates.

use std::cell::OnceCell;
use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chord::{Chord, Structure};
use super::harmonic::Harmonic;
use super::interval::Interval;
use super::note::{MidiNote, Note};
use super::octave::OctaveRange;
use super::scale::{Scale, ScaleCatalog, ScaleType};
use crate::config::{EngineConfig, SearchLimits, SelectionWeights};
use crate::error::{Error, Result};

/// The seven diatonic modes, in Ionian-anchored order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreekMode {
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

impl GreekMode {
    pub const ALL: [GreekMode; 7] = [
        GreekMode::Ionian,
        GreekMode::Dorian,
        GreekMode::Phrygian,
        GreekMode::Lydian,
        GreekMode::Mixolydian,
        GreekMode::Aeolian,
        GreekMode::Locrian,
    ];

    /// Position in the Ionian-anchored order (0-6)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Mode at a position, wrapping past Locrian
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 7]
    }

    pub fn scale_type(self) -> ScaleType {
        match self {
            GreekMode::Ionian => ScaleType::Major,
            GreekMode::Dorian => ScaleType::Dorian,
            GreekMode::Phrygian => ScaleType::Phrygian,
            GreekMode::Lydian => ScaleType::Lydian,
            GreekMode::Mixolydian => ScaleType::Mixolydian,
            GreekMode::Aeolian => ScaleType::NaturalMinor,
            GreekMode::Locrian => ScaleType::Locrian,
        }
    }

    pub fn formula(self) -> &'static str {
        self.scale_type().formula()
    }

    pub fn name(self) -> &'static str {
        match self {
            GreekMode::Ionian => "Ionian",
            GreekMode::Dorian => "Dorian",
            GreekMode::Phrygian => "Phrygian",
            GreekMode::Lydian => "Lydian",
            GreekMode::Mixolydian => "Mixolydian",
            GreekMode::Aeolian => "Aeolian",
            GreekMode::Locrian => "Locrian",
        }
    }

    /// Parse a mode name; "major" and "minor" are accepted
    pub fn from_str(s: &str) -> Option<Self> {
        let scale_type = ScaleType::from_str(s)?;
        Self::ALL.into_iter().find(|m| m.scale_type() == scale_type)
    }
}

impl fmt::Display for GreekMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Scale degree of a key, I through VII
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Degree {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
}

impl Degree {
    pub const ALL: [Degree; 7] = [
        Degree::I,
        Degree::II,
        Degree::III,
        Degree::IV,
        Degree::V,
        Degree::VI,
        Degree::VII,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 7]
    }

    pub fn roman(self) -> &'static str {
        match self {
            Degree::I => "I",
            Degree::II => "II",
            Degree::III => "III",
            Degree::IV => "IV",
            Degree::V => "V",
            Degree::VI => "VI",
            Degree::VII => "VII",
        }
    }
}

/// Direction of a modulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// One mode of a key: its degree, Greek mode and root
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    pub degree: Degree,
    pub mode: GreekMode,
    pub root: Note,
}

impl Mode {
    pub fn formula(&self) -> &'static str {
        self.mode.formula()
    }

    /// The mode as a scale of its own
    pub fn scale(&self) -> Result<Scale> {
        Scale::from_formula(self.root.clone(), self.formula())
    }
}

/// A musical key: a scale over a diatonic mode
#[derive(Debug, Clone)]
pub struct Key {
    scale: Scale,
    mode: GreekMode,
    structure: Structure,
    limits: SearchLimits,
    weights: SelectionWeights,
    modes: OnceCell<Vec<Mode>>,
    chord: Option<Chord>,
}

impl Key {
    /// Create a new key
    pub fn new(root: Note, mode: GreekMode) -> Result<Self> {
        Ok(Self {
            scale: Scale::from_formula(root, mode.formula())?,
            mode,
            structure: Structure::default(),
            limits: SearchLimits::default(),
            weights: SelectionWeights::default(),
            modes: OnceCell::new(),
            chord: None,
        })
    }

    /// Parse a key from strings (e.g., "Eb", "mixolydian")
    pub fn parse(root_str: &str, mode_str: &str) -> Result<Self> {
        let mode = GreekMode::from_str(mode_str)
            .ok_or_else(|| Error::UnrecognizedScale(mode_str.to_string()))?;
        Key::new(Note::parse(root_str)?, mode)
    }

    /// Key from a root and an interval formula, which must be a diatonic mode
    pub fn from_formula(root: Note, formula: &str) -> Result<Self> {
        let mode = Key::mode_name(formula).ok_or_else(|| Error::UnrecognizedScale(formula.to_string()))?;
        Key::new(root, mode)
    }

    /// Key described by a configuration.
    ///
    /// The scale name resolves through the config's custom scales first, so
    /// a custom name works as long as its formula is one of the seven modes.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let catalog = ScaleCatalog::from_named(&config.custom_scales)?;
        let mut key = Key::from_formula(Note::parse(&config.root)?, catalog.formula(&config.scale)?)?
            .with_structure(config.structure)
            .with_limits(config.limits)
            .with_weights(config.weights);
        key.assign_octaves(config.octaves)?;
        Ok(key)
    }

    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structure = structure;
        self.chord = None;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_weights(mut self, weights: SelectionWeights) -> Self {
        self.weights = weights;
        self
    }

    /// The Greek mode a formula spells, if any
    pub fn mode_name(formula: &str) -> Option<GreekMode> {
        let scale_type = ScaleType::from_formula(formula);
        GreekMode::ALL.into_iter().find(|m| m.scale_type() == scale_type)
    }

    /// Check if a formula is one of the seven diatonic modes
    pub fn is_mode(formula: &str) -> bool {
        Key::mode_name(formula).is_some()
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn mode(&self) -> GreekMode {
        self.mode
    }

    pub fn structure(&self) -> Structure {
        self.structure
    }

    /// Position of the key's mode in Ionian-anchored order (0-6)
    pub fn mode_position(&self) -> usize {
        self.mode.index()
    }

    /// Roman numeral of the key's mode position ("V" for Mixolydian)
    pub fn mode_position_roman(&self) -> &'static str {
        Degree::from_index(self.mode_position()).roman()
    }

    /// The seven modes, starting with the key's own
    pub fn modes(&self) -> &[Mode] {
        self.modes.get_or_init(|| self.build_modes())
    }

    fn build_modes(&self) -> Vec<Mode> {
        let position = self.mode_position();
        self.scale
            .notes()
            .iter()
            .take(7)
            .enumerate()
            .map(|(i, root)| Mode {
                degree: Degree::from_index(i),
                mode: GreekMode::from_index(position + i),
                root: root.clone(),
            })
            .collect()
    }

    /// Mode built on a scale degree
    pub fn mode_at(&self, degree: Degree) -> Option<&Mode> {
        self.modes().get(degree.index())
    }

    /// Mode of the key's collection with the given Greek name
    pub fn mode_named(&self, mode: GreekMode) -> Option<&Mode> {
        self.modes().iter().find(|m| m.mode == mode)
    }

    /// Diatonic chord on a scale degree using the key's structure
    pub fn chord_at<R: Rng + ?Sized>(&self, degree: Degree, rng: &mut R) -> Result<Chord> {
        let mode = self
            .mode_at(degree)
            .ok_or(Error::NoSuchHarmonicPosition(degree.index() as u8 + 1))?;
        Chord::from_scale_with(
            &mode.scale()?,
            self.structure,
            rng,
            &self.limits,
            &self.weights,
        )
    }

    /// Diatonic chords for every degree
    pub fn chords<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Chord>> {
        Degree::ALL
            .iter()
            .take(self.modes().len())
            .map(|&degree| self.chord_at(degree, rng))
            .collect()
    }

    /// The tonic chord, built once and kept until the key changes
    pub fn chord<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&Chord> {
        let chord = match self.chord.take() {
            Some(chord) => chord,
            None => self.chord_at(Degree::I, rng)?,
        };
        Ok(self.chord.insert(chord))
    }

    /// Transpose the root by an interval up or down, keeping the mode and octave window
    pub fn modulate(&mut self, direction: Direction, interval: Interval) -> Result<()> {
        let shift = interval.semitones() as i32 * direction.sign();
        let pc = (self.scale.root().midi() as i32 + shift).rem_euclid(12);
        let midi = (self.scale.octaves().start + 2) * 12 + pc;
        let root = Note::from_midi_with(midi, self.scale.accidental())?;
        debug!(from = %self.scale.root(), to = %root, "modulating key");
        self.rebuild(root, self.mode)
    }

    /// Move to another mode of the same collection.
    ///
    /// With an interval the new mode is `position + (number - 1) * direction`,
    /// wrapping around. Without one a mode is drawn at random from those
    /// reachable in `direction` (or all of them), with Locrian weighted down.
    pub fn modulate_mode<R: Rng + ?Sized>(
        &mut self,
        direction: Option<Direction>,
        interval: Option<Interval>,
        rng: &mut R,
    ) -> Result<GreekMode> {
        let position = self.mode_position();
        let target = match interval {
            Some(interval) => {
                let sign = direction.map_or(1, Direction::sign);
                (position as i32 + (interval.number() as i32 - 1) * sign).rem_euclid(7) as usize
            }
            None => self.pick_mode(position, direction, rng),
        };

        let offset = (target + 7 - position) % 7;
        let root = self
            .modes()
            .get(offset)
            .map(|m| m.root.clone())
            .ok_or(Error::NoSuchHarmonicPosition(offset as u8 + 1))?;
        let mode = GreekMode::from_index(target);
        debug!(from = %self.mode, to = %mode, root = %root, "modulating mode");
        self.rebuild(root, mode)?;
        Ok(mode)
    }

    fn pick_mode<R: Rng + ?Sized>(&self, position: usize, direction: Option<Direction>, rng: &mut R) -> usize {
        let mut candidates: Vec<usize> = match direction {
            None => (0..7).collect(),
            Some(Direction::Up) => (position + 1..7).collect(),
            Some(Direction::Down) => (0..position).collect(),
        };
        if candidates.is_empty() {
            candidates = (0..7).collect();
        }

        let weights = candidates.iter().map(|&i| match GreekMode::from_index(i) {
            GreekMode::Locrian => self.weights.locrian,
            _ => self.weights.mode,
        });
        WeightedIndex::new(weights)
            .map(|dist| candidates[dist.sample(rng)])
            .unwrap_or(position)
    }

    /// Rebuild over a new root and mode inside the key's current octave window
    fn rebuild(&mut self, root: Note, mode: GreekMode) -> Result<()> {
        let octaves = self.scale.octaves();
        let root = root.with_octave(octaves.start)?;
        self.scale = Scale::from_formula(root, mode.formula())?.with_octaves(octaves)?;
        self.mode = mode;
        self.modes = OnceCell::new();
        self.chord = None;
        Ok(())
    }
}

impl Harmonic for Key {
    fn root(&self) -> &Note {
        self.scale.root()
    }

    fn notes(&self) -> &[Note] {
        self.scale.notes()
    }

    fn octaves(&self) -> OctaveRange {
        self.scale.octaves()
    }

    fn assign_octaves(&mut self, range: OctaveRange) -> Result<()> {
        self.scale.assign_octaves(range)?;
        self.modes = OnceCell::new();
        self.chord = None;
        Ok(())
    }

    fn contains_midi(&self, midi: MidiNote) -> bool {
        self.scale.contains_midi(midi)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.scale.root().name(), self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn key(root: &str, mode: GreekMode) -> Key {
        Key::new(Note::parse(root).unwrap(), mode).unwrap()
    }

    fn iv(name: &str) -> Interval {
        Interval::parse(name).unwrap()
    }

    #[test]
    fn test_modes_cover_every_greek_mode() {
        let eb = key("Eb", GreekMode::Mixolydian);
        let modes = eb.modes();
        assert_eq!(modes.len(), 7);
        let names: HashSet<GreekMode> = modes.iter().map(|m| m.mode).collect();
        assert_eq!(names.len(), 7);
        assert_eq!(modes[0].mode, GreekMode::Mixolydian);
        assert_eq!(modes[0].root.name(), "Eb");
    }

    #[test]
    fn test_mode_roots_follow_scale() {
        let eb = key("Eb", GreekMode::Mixolydian);
        let roots: Vec<(&str, GreekMode)> = eb.modes().iter().map(|m| (m.root.name(), m.mode)).collect();
        assert_eq!(
            roots,
            vec![
                ("Eb", GreekMode::Mixolydian),
                ("F", GreekMode::Aeolian),
                ("G", GreekMode::Locrian),
                ("Ab", GreekMode::Ionian),
                ("Bb", GreekMode::Dorian),
                ("C", GreekMode::Phrygian),
                ("Db", GreekMode::Lydian),
            ]
        );
    }

    #[test]
    fn test_mode_lookup_by_degree() {
        let c = key("C", GreekMode::Ionian);
        let v = c.mode_at(Degree::V).unwrap();
        assert_eq!(v.mode, GreekMode::Mixolydian);
        assert_eq!(v.root.pitch(), "G3");
        assert_eq!(c.mode_named(GreekMode::Aeolian).unwrap().degree, Degree::VI);
    }

    #[test]
    fn test_mode_position() {
        let d = key("D", GreekMode::Dorian);
        assert_eq!(d.mode_position(), 1);
        assert_eq!(d.mode_position_roman(), "II");
        assert_eq!(key("B", GreekMode::Locrian).mode_position_roman(), "VII");
    }

    #[test]
    fn test_mode_name_and_is_mode() {
        assert_eq!(Key::mode_name("1P 2M 3M 4P 5P 6M 7m"), Some(GreekMode::Mixolydian));
        assert_eq!(Key::mode_name("1P 2M 3m 4P 5P 6m 7m"), Some(GreekMode::Aeolian));
        assert!(Key::is_mode("1P 2m 3m 4P 5d 6m 7m"));
        assert!(!Key::is_mode("1P 2M 3m 4P 5P 6m 7M"));
        assert!(matches!(
            Key::from_formula(Note::parse("C").unwrap(), "1P 3m 4P 5P 7m"),
            Err(Error::UnrecognizedScale(_))
        ));
    }

    #[test]
    fn test_parse() {
        let key = Key::parse("A", "minor").unwrap();
        assert_eq!(key.mode(), GreekMode::Aeolian);
        assert_eq!(key.to_string(), "A Aeolian");
        assert!(Key::parse("A", "blues").is_err());
    }

    #[test]
    fn test_modulate() {
        let mut k = key("C", GreekMode::Ionian);
        assert_eq!(k.modes()[0].root.name(), "C");

        k.modulate(Direction::Up, iv("5P")).unwrap();
        assert_eq!(k.root().name(), "G");
        assert_eq!(k.names(), vec!["G", "A", "B", "C", "D", "E", "F#"]);
        assert_eq!(k.modes()[0].root.name(), "G");

        k.modulate(Direction::Down, iv("2M")).unwrap();
        assert_eq!(k.root().pitch(), "F3");
        assert_eq!(k.names(), vec!["F", "G", "A", "Bb", "C", "D", "E"]);
    }

    #[test]
    fn test_modulate_keeps_flat_spelling() {
        let mut k = key("F", GreekMode::Ionian);
        k.modulate(Direction::Up, iv("2m")).unwrap();
        assert_eq!(k.root().name(), "Gb");
    }

    #[test]
    fn test_modulate_mode_with_interval() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut k = key("C", GreekMode::Ionian);

        let mode = k.modulate_mode(Some(Direction::Up), Some(iv("3M")), &mut rng).unwrap();
        assert_eq!(mode, GreekMode::Phrygian);
        assert_eq!(k.to_string(), "E Phrygian");
        assert_eq!(k.names(), vec!["E", "F", "G", "A", "B", "C", "D"]);

        let mode = k.modulate_mode(Some(Direction::Down), Some(iv("4P")), &mut rng).unwrap();
        assert_eq!(mode, GreekMode::Locrian);
        assert_eq!(k.to_string(), "B Locrian");
    }

    #[test]
    fn test_modulate_mode_random_respects_direction() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let mut k = key("F", GreekMode::Lydian);
            let mode = k.modulate_mode(Some(Direction::Up), None, &mut rng).unwrap();
            assert!(mode.index() > GreekMode::Lydian.index(), "{mode} is not above Lydian");

            let mut k = key("F", GreekMode::Lydian);
            let mode = k.modulate_mode(Some(Direction::Down), None, &mut rng).unwrap();
            assert!(mode.index() < GreekMode::Lydian.index(), "{mode} is not below Lydian");
        }
    }

    #[test]
    fn test_modulate_mode_rarely_picks_locrian() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut k = key("C", GreekMode::Ionian);
        let mut locrian = 0;
        for _ in 0..1000 {
            if k.modulate_mode(None, None, &mut rng).unwrap() == GreekMode::Locrian {
                locrian += 1;
            }
        }
        assert!(locrian < 50, "Locrian picked {locrian} times");
    }

    #[test]
    fn test_repeated_mode_modulation_stays_in_window() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut k = key("C", GreekMode::Ionian);
        for step in 0..500 {
            k.modulate_mode(None, None, &mut rng).unwrap();
            assert_eq!(k.modes().len(), 7, "step {step}: {k}");
            assert_eq!(k.root().octave(), 3, "step {step}: {k}");
        }

        let second = iv("2M");
        let mut k = key("Eb", GreekMode::Dorian);
        for step in 0..200 {
            k.modulate_mode(Some(Direction::Up), Some(second), &mut rng).unwrap();
            assert_eq!(k.modes().len(), 7, "step {step}: {k}");
            assert_eq!(k.len(), 7, "step {step}: {k}");
        }
    }

    #[test]
    fn test_repeated_modulation_stays_in_window() {
        let mut k = key("C", GreekMode::Ionian);
        let fifth = iv("5P");
        for _ in 0..24 {
            k.modulate(Direction::Up, fifth).unwrap();
            assert_eq!(k.root().octave(), 3);
            assert_eq!(k.modes().len(), 7);
        }
        assert_eq!(k.root().name(), "C");
    }

    #[test]
    fn test_modulation_keeps_multi_octave_window() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut k = key("G", GreekMode::Mixolydian);
        k.assign_octaves(OctaveRange::new(2, 2)).unwrap();
        k.modulate_mode(Some(Direction::Up), Some(iv("3M")), &mut rng).unwrap();
        assert_eq!(k.to_string(), "B Locrian");
        assert_eq!(k.octaves(), OctaveRange::new(2, 2));
        assert_eq!(k.len(), 14);
        assert_eq!(k.pitches()[0], "B2");
    }

    #[test]
    fn test_modulate_mode_is_reproducible() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut k = key("D", GreekMode::Dorian);
            (0..10)
                .map(|_| k.modulate_mode(None, None, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_diatonic_sevenths() {
        let mut rng = StdRng::seed_from_u64(1);
        let c = key("C", GreekMode::Ionian).with_structure(Structure::Seventh);
        let names: Vec<String> = c.chords(&mut rng).unwrap().iter().map(Chord::name).collect();
        assert_eq!(
            names,
            vec!["Cmaj7", "Dm7", "Em7", "Fmaj7", "G7", "Am7", "Bm7b5"]
        );
    }

    #[test]
    fn test_tonic_chord_is_cached_until_modulation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut k = key("A", GreekMode::Aeolian).with_structure(Structure::Seventh);
        assert_eq!(k.chord(&mut rng).unwrap().name(), "Am7");
        assert_eq!(k.chord(&mut rng).unwrap().name(), "Am7");

        k.modulate(Direction::Up, iv("4P")).unwrap();
        assert_eq!(k.chord(&mut rng).unwrap().name(), "Dm7");
    }

    #[test]
    fn test_from_config() {
        let config = EngineConfig {
            root: "Eb".to_string(),
            scale: "mixolydian".to_string(),
            octaves: OctaveRange::new(2, 2),
            structure: Structure::Seventh,
            ..Default::default()
        };
        let key = Key::from_config(&config).unwrap();
        assert_eq!(key.mode(), GreekMode::Mixolydian);
        assert_eq!(key.len(), 14);
        assert_eq!(key.pitches()[0], "Eb2");
        assert_eq!(key.structure(), Structure::Seventh);
    }

    #[test]
    fn test_from_config_resolves_custom_scales() {
        use crate::music::scale::NamedScale;

        let named = |name: &str, formula: &str| NamedScale {
            name: name.to_string(),
            formula: formula.to_string(),
        };
        let config = EngineConfig {
            root: "A".to_string(),
            scale: "sad".to_string(),
            custom_scales: vec![named("sad", "1P 2M 3m 4P 5P 6m 7m"), named("hijaz", "1P 2m 3M 4P 5P 6m 7m")],
            ..Default::default()
        };
        let key = Key::from_config(&config).unwrap();
        assert_eq!(key.to_string(), "A Aeolian");

        let config = EngineConfig {
            scale: "hijaz".to_string(),
            ..config
        };
        assert!(matches!(Key::from_config(&config), Err(Error::UnrecognizedScale(_))));

        let config = EngineConfig {
            scale: "nope".to_string(),
            ..config
        };
        assert_eq!(
            Key::from_config(&config).unwrap_err(),
            Error::UnrecognizedScale("nope".to_string())
        );
    }
}
