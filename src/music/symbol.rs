// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord symbol inference.
//!
//! Three tiers, tried in order:
//!
//! 1. **Containment** - the first canonical chord holding every interval.
//! 2. **Suffix stripping** - drop trailing extensions until tier 1 matches,
//!    then name the dropped notes as `add` tones.
//! 3. **Slot decomposition** - sort the intervals into harmonic slots
//!    (2nd through 13th) and spell a symbol piece by piece.
//!
//! Tier 3 can come up empty, which means "no name" rather than an error.

use tracing::debug;

use super::chord::CHORD_DEFINITIONS;
use super::interval::Interval;
use crate::config::SearchLimits;
use crate::error::{Error, Result};

/// Infer a chord symbol using the default search cap
pub fn find_chord_symbol(intervals: &[Interval]) -> Result<Option<String>> {
    find_chord_symbol_with(intervals, &SearchLimits::default())
}

/// Infer a chord symbol; `Ok(None)` when no name fits
pub fn find_chord_symbol_with(intervals: &[Interval], limits: &SearchLimits) -> Result<Option<String>> {
    if intervals.is_empty() {
        return Ok(None);
    }

    if let Some(symbol) = containing_symbol(intervals) {
        return Ok(Some(symbol.to_string()));
    }

    if let Some(symbol) = strip_extensions(intervals, limits)? {
        debug!(%symbol, "chord symbol found after stripping extensions");
        return Ok(Some(symbol));
    }

    let symbol = symbol_from_slots(intervals);
    debug!(?symbol, "chord symbol spelled from slots");
    Ok(symbol)
}

/// Tier 1: first canonical chord containing every interval
fn containing_symbol(intervals: &[Interval]) -> Option<&'static str> {
    CHORD_DEFINITIONS
        .iter()
        .find(|def| def.contains_all(intervals))
        .map(|def| def.symbol)
}

/// Tier 2: drop trailing extensions until tier 1 matches
fn strip_extensions(intervals: &[Interval], limits: &SearchLimits) -> Result<Option<String>> {
    let mut remaining = intervals.to_vec();
    let mut dropped = Vec::new();
    let mut iterations = 0;

    while let Some(last) = remaining.last().copied() {
        if !last.is_extension() {
            break;
        }
        iterations += 1;
        if iterations > limits.symbol_search_cap {
            return Err(Error::NonTerminatingSearch {
                search: "chord symbol suffix stripping",
                cap: limits.symbol_search_cap,
            });
        }

        remaining.pop();
        dropped.push(last);
        if remaining.is_empty() {
            break;
        }

        if let Some(symbol) = containing_symbol(&remaining) {
            let adds: String = dropped
                .iter()
                .rev()
                .map(|i| format!("add{}", i.number()))
                .collect();
            return Ok(Some(format!("{symbol}{adds}")));
        }
    }

    Ok(None)
}

/// Harmonic slots an interval can occupy; the first interval per slot wins
#[derive(Debug, Default)]
struct Slots {
    second: Option<Interval>,
    third: Option<Interval>,
    fourth: Option<Interval>,
    fifth: Option<Interval>,
    sixth: Option<Interval>,
    seventh: Option<Interval>,
    ninth: Option<Interval>,
    eleventh: Option<Interval>,
    thirteenth: Option<Interval>,
}

impl Slots {
    fn classify(intervals: &[Interval]) -> Self {
        let mut slots = Slots::default();
        for &interval in intervals {
            let slot = match interval.number() {
                2 => &mut slots.second,
                3 | 10 => &mut slots.third,
                4 => &mut slots.fourth,
                5 | 12 => &mut slots.fifth,
                6 => &mut slots.sixth,
                7 => &mut slots.seventh,
                9 => &mut slots.ninth,
                11 => &mut slots.eleventh,
                13 => &mut slots.thirteenth,
                _ => continue,
            };
            slot.get_or_insert(interval);
        }
        slots
    }

    fn extensions(&self) -> Vec<Interval> {
        [self.ninth, self.eleventh, self.thirteenth]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Degree with its alteration: "b9", "#11", "13"
fn altered(interval: Interval) -> String {
    let number = interval.number();
    match interval.quality() {
        'm' | 'd' => format!("b{number}"),
        'A' => format!("#{number}"),
        _ => number.to_string(),
    }
}

fn is_natural(interval: Interval) -> bool {
    matches!(interval.quality(), 'M' | 'P')
}

/// Tier 3: spell a symbol from slot contents
fn symbol_from_slots(intervals: &[Interval]) -> Option<String> {
    let mut slots = Slots::classify(intervals);

    // A sixth alongside a seventh is heard as a thirteenth
    if slots.seventh.is_some() {
        if let Some(sixth) = slots.sixth.take() {
            slots.thirteenth.get_or_insert(sixth.compound().unwrap_or(sixth));
        }
    }

    let third = slots.third;
    let has_third = third.is_some();
    let minor = third.is_some_and(|t| t.quality() == 'm');
    let extensions = slots.extensions();
    let triad = has_third && slots.fifth.is_some();

    let mut quality = String::new();
    let mut core = String::new();
    let mut modifiers = String::new();
    let mut brackets: Vec<String> = Vec::new();
    let mut suspended = false;

    if minor {
        quality.push('m');
    }

    match slots.seventh {
        Some(seventh) if !(triad && !extensions.is_empty()) => {
            core.push_str(match seventh.quality() {
                'M' => "maj7",
                'd' => "dim7",
                _ => "7",
            });
            if seventh.quality() == 'd' {
                quality.clear();
            }
            // The seventh took the extension slot
            brackets.extend(extensions.iter().map(|e| altered(*e)));
        }
        Some(seventh) => {
            if seventh.quality() == 'M' {
                core.push_str("maj");
            }
            match extensions.iter().rev().find(|e| is_natural(**e)) {
                Some(top) => core.push_str(&top.number().to_string()),
                None => core.push('7'),
            }
            for ext in extensions.iter().filter(|e| !is_natural(**e)) {
                modifiers.push_str(&altered(*ext));
            }
        }
        None => {
            if let Some(sixth) = slots.sixth {
                if is_natural(sixth) {
                    core.push('6');
                } else {
                    modifiers.push_str(&altered(sixth));
                }
            }
            for ext in &extensions {
                modifiers.push_str(&format!("add{}", altered(*ext)));
            }
        }
    }

    if slots.fifth.is_some_and(|f| f.quality() == 'A') {
        if has_third && !minor && slots.seventh.is_none() && core.is_empty() {
            quality.push_str("aug");
        } else {
            modifiers.push_str("#5");
        }
    }

    let tritone = slots.fourth.is_some_and(|f| f.quality() == 'A')
        || slots.fifth.is_some_and(|f| f.quality() == 'd');
    if tritone {
        if has_third {
            modifiers.push_str("b5");
        } else if slots.eleventh.is_none() {
            brackets.push("#11".to_string());
        }
    }

    if let Some(second) = slots.second {
        match second.quality() {
            'm' => brackets.insert(0, "b9".to_string()),
            'A' => brackets.insert(0, "#9".to_string()),
            _ if has_third => modifiers.push_str("add2"),
            _ => {
                modifiers.push_str("sus2");
                suspended = true;
            }
        }
    }

    if slots.fourth.is_some_and(|f| f.quality() == 'P') {
        if has_third {
            modifiers.push_str("add4");
        } else {
            modifiers.push_str("sus4");
            suspended = true;
        }
    }

    let mut symbol = format!("{quality}{core}{modifiers}");
    if !brackets.is_empty() {
        symbol.push_str(&format!("({})", brackets.join(",")));
    }
    if !has_third && !suspended {
        symbol.push_str("no3");
    }

    (!symbol.is_empty()).then_some(symbol)
}
