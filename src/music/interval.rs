// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Interval names and semitone arithmetic.
//!
//! Intervals are drawn from a closed table running from the unison up to
//! the compound major 13th. Several names share a semitone count (`4A` and
//! `5d` are both a tritone), so an [`Interval`] always carries its name and
//! callers keep the name they were given.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Interval names and semitone counts, in declaration order.
const TABLE: [(&str, u8); 27] = [
    ("1P", 0),
    ("2m", 1),
    ("2M", 2),
    ("2A", 3),
    ("3m", 3),
    ("3M", 4),
    ("4P", 5),
    ("4A", 6),
    ("5d", 6),
    ("5P", 7),
    ("5A", 8),
    ("6m", 8),
    ("6M", 9),
    ("7d", 9),
    ("7m", 10),
    ("7M", 11),
    ("8P", 12),
    ("9m", 13),
    ("9M", 14),
    ("9A", 15),
    ("10m", 15),
    ("10M", 16),
    ("11P", 17),
    ("11A", 18),
    ("12P", 19),
    ("13m", 20),
    ("13M", 21),
];

/// Largest semitone count the table can name.
pub const MAX_SEMITONES: u8 = 21;

/// A named interval from the closed interval table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval(u8);

impl Interval {
    pub const UNISON: Interval = Interval(0);

    /// Look up an interval by name (e.g. "3M", "13m")
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        TABLE
            .iter()
            .position(|(n, _)| *n == name)
            .map(|i| Interval(i as u8))
            .ok_or_else(|| Error::UnrecognizedInterval(name.to_string()))
    }

    /// All intervals in declaration order
    pub fn all() -> impl Iterator<Item = Interval> {
        (0..TABLE.len() as u8).map(Interval)
    }

    /// Every name for a semitone count, or `None` outside 0..=21
    pub fn from_semitones(semitones: i32) -> Option<Vec<Interval>> {
        if !(0..=MAX_SEMITONES as i32).contains(&semitones) {
            return None;
        }
        Some(
            Self::all()
                .filter(|i| i.semitones() as i32 == semitones)
                .collect(),
        )
    }

    /// The interval with a given degree number and semitone count, if named
    pub fn from_number(number: u8, semitones: u8) -> Option<Interval> {
        Self::all().find(|i| i.number() == number && i.semitones() == semitones)
    }

    pub fn name(self) -> &'static str {
        TABLE[self.0 as usize].0
    }

    pub fn semitones(self) -> u8 {
        TABLE[self.0 as usize].1
    }

    /// Numeric degree of the interval ("13m" is 13)
    pub fn number(self) -> u8 {
        let name = self.name();
        name[..name.len() - 1].parse().unwrap_or(1)
    }

    /// Quality letter: P, m, M, A or d
    pub fn quality(self) -> char {
        self.name().chars().last().unwrap_or('P')
    }

    /// True for the ninth, eleventh and thirteenth degrees
    pub fn is_extension(self) -> bool {
        matches!(self.number(), 9 | 11 | 13)
    }

    /// Fold a compound interval into its simple form (9M becomes 2M)
    pub fn simple(self) -> Interval {
        let number = self.number();
        if number < 8 {
            return self;
        }
        if number == 8 {
            return Interval::UNISON;
        }
        Self::from_number(number - 7, self.semitones() - 12).unwrap_or(self)
    }

    /// Lift a simple interval by an octave when the table names the result
    pub fn compound(self) -> Option<Interval> {
        let number = self.number();
        if number >= 8 {
            return Some(self);
        }
        Self::from_number(number + 7, self.semitones() + 12)
    }

    /// Names for the sum of both semitone counts
    pub fn add(self, other: Interval) -> Option<Vec<Interval>> {
        Self::from_semitones(self.semitones() as i32 + other.semitones() as i32)
    }

    /// Names for the difference of both semitone counts
    pub fn subtract(self, other: Interval) -> Option<Vec<Interval>> {
        Self::from_semitones(self.semitones() as i32 - other.semitones() as i32)
    }

    /// Names for the octave complement, `None` past an octave
    pub fn invert(self) -> Option<Vec<Interval>> {
        if self.semitones() > 12 {
            return None;
        }
        Self::from_semitones(12 - self.semitones() as i32)
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Interval::parse(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parse a space-separated interval formula ("1P 3M 5P")
pub fn parse_formula(formula: &str) -> Result<Vec<Interval>> {
    formula.split_whitespace().map(Interval::parse).collect()
}

/// Render intervals back to formula form
pub fn format_formula(intervals: &[Interval]) -> String {
    intervals
        .iter()
        .map(|i| i.name())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(intervals: Option<Vec<Interval>>) -> Option<Vec<&'static str>> {
        intervals.map(|v| v.into_iter().map(Interval::name).collect())
    }

    fn iv(name: &str) -> Interval {
        Interval::parse(name).unwrap()
    }

    #[test]
    fn test_semitone_lookup() {
        assert_eq!(iv("1P").semitones(), 0);
        assert_eq!(iv("3M").semitones(), 4);
        assert_eq!(iv("5P").semitones(), 7);
        assert_eq!(iv("13M").semitones(), 21);
        assert_eq!(iv("4A").semitones(), iv("5d").semitones());
    }

    #[test]
    fn test_unknown_interval() {
        assert_eq!(
            Interval::parse("6A"),
            Err(Error::UnrecognizedInterval("6A".to_string()))
        );
        assert!(parse_formula("1P 3M 5X").is_err());
    }

    #[test]
    fn test_add() {
        assert_eq!(names(iv("3M").add(iv("3M"))), Some(vec!["5A", "6m"]));
        assert_eq!(names(iv("5P").add(iv("4P"))), Some(vec!["8P"]));
        assert_eq!(iv("13M").add(iv("2m")), None);
    }

    #[test]
    fn test_subtract() {
        assert_eq!(names(iv("9m").subtract(iv("3m"))), Some(vec!["7m"]));
        assert_eq!(names(iv("5P").subtract(iv("5P"))), Some(vec!["1P"]));
        assert_eq!(iv("3m").subtract(iv("5P")), None);
    }

    #[test]
    fn test_invert() {
        assert_eq!(names(iv("3M").invert()), Some(vec!["5A", "6m"]));
        assert_eq!(names(iv("5P").invert()), Some(vec!["4P"]));
        assert_eq!(names(iv("8P").invert()), Some(vec!["1P"]));
        assert_eq!(iv("9M").invert(), None);
    }

    #[test]
    fn test_number_and_quality() {
        assert_eq!(iv("13m").number(), 13);
        assert_eq!(iv("13m").quality(), 'm');
        assert_eq!(iv("5d").number(), 5);
        assert!(iv("11A").is_extension());
        assert!(!iv("7M").is_extension());
    }

    #[test]
    fn test_simple_and_compound() {
        assert_eq!(iv("9M").simple(), iv("2M"));
        assert_eq!(iv("13m").simple(), iv("6m"));
        assert_eq!(iv("8P").simple(), Interval::UNISON);
        assert_eq!(iv("2m").compound(), Some(iv("9m")));
        assert_eq!(iv("6M").compound(), Some(iv("13M")));
        assert_eq!(iv("7M").compound(), None);
    }

    #[test]
    fn test_formula_round_trip() {
        let formula = "1P 3m 5P 7m";
        assert_eq!(format_formula(&parse_formula(formula).unwrap()), formula);
    }
}
