// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice leading over raw MIDI chords.
//!
//! These helpers work on plain `MidiNote` vectors so they can sit between a
//! chord progression and whatever plays it.

use tracing::trace;

use super::note::{pitch_class_of, MidiNote};
use crate::config::SearchLimits;
use crate::error::{Error, Result};

const MAX_MIDI: i32 = 127;

/// Options for [`find_nearest_chord`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NearestChordOptions {
    /// Allow two targets to land on the same MIDI note
    pub repeats: bool,
    /// Return the voicing in ascending order
    pub sort: bool,
    /// Keep the first target as the lowest voice
    pub keep_bass: bool,
}

/// Reject voicings with notes above the MIDI range
fn check_range(voicing: &[MidiNote]) -> Result<()> {
    match voicing.iter().find(|&&m| m as i32 > MAX_MIDI) {
        Some(&m) => Err(Error::MidiOutOfRange(m as i32)),
        None => Ok(()),
    }
}

/// Realise `targets` (pitch-class names) as close as possible to `base`.
///
/// Each target takes the realization nearest to any voice of `base`; ties
/// go to the lower note. Without `repeats` a target that would collide
/// with an earlier one takes its next-closest realization instead.
pub fn find_nearest_chord(
    base: &[MidiNote],
    targets: &[&str],
    options: NearestChordOptions,
) -> Result<Vec<MidiNote>> {
    if base.is_empty() {
        return Err(Error::UnrecognizedChordDescription(
            "no base voicing to lead from".to_string(),
        ));
    }
    check_range(base)?;
    let pitch_classes = targets
        .iter()
        .map(|t| pitch_class_of(t).ok_or_else(|| Error::UnrecognizedNote(t.to_string())))
        .collect::<Result<Vec<u8>>>()?;

    let mut chosen: Vec<MidiNote> = Vec::with_capacity(pitch_classes.len());
    for &pc in &pitch_classes {
        let candidates = nearest_realizations(base, pc);
        let pick = candidates
            .iter()
            .copied()
            .find(|m| options.repeats || !chosen.contains(m))
            .or_else(|| candidates.first().copied());
        if let Some(midi) = pick {
            chosen.push(midi);
        }
    }

    if options.keep_bass {
        keep_bass(&mut chosen);
    }
    if options.sort {
        chosen.sort_unstable();
    }
    Ok(chosen)
}

/// Every MIDI realization of a pitch class, nearest to `base` first
fn nearest_realizations(base: &[MidiNote], pc: u8) -> Vec<MidiNote> {
    let mut candidates: Vec<(u8, MidiNote)> = (pc..=127)
        .step_by(12)
        .map(|m| {
            let distance = base.iter().map(|&b| m.abs_diff(b)).min().unwrap_or(u8::MAX);
            (distance, m)
        })
        .collect();
    candidates.sort_unstable();
    candidates.into_iter().map(|(_, m)| m).collect()
}

/// Drop the bass below the other voices, raising them if it can't go lower
fn keep_bass(voices: &mut [MidiNote]) {
    let Some((bass, upper)) = voices.split_first_mut() else {
        return;
    };
    let Some(&lowest) = upper.iter().min() else {
        return;
    };
    if *bass < lowest {
        return;
    }

    let pc = *bass % 12;
    if let Some(lower) = (pc..lowest).step_by(12).last() {
        *bass = lower;
        return;
    }
    // Bass pitch class has no room below; lift the upper voices instead
    for voice in upper.iter_mut() {
        while *voice <= *bass && *voice as i32 + 12 <= MAX_MIDI {
            *voice += 12;
        }
    }
}

/// Spread a voicing so adjacent notes are at least `min_distance` apart
pub fn spread_voicing(chord: &[MidiNote], min_distance: u8) -> Result<Vec<MidiNote>> {
    spread_voicing_with(chord, min_distance, &SearchLimits::default())
}

/// [`spread_voicing`] with an explicit relocation cap.
///
/// Each round finds the lowest too-close pair and moves whichever of the
/// two needs the smaller jump to just beyond the outer edge of the rest
/// of the chord, keeping its pitch class.
pub fn spread_voicing_with(chord: &[MidiNote], min_distance: u8, limits: &SearchLimits) -> Result<Vec<MidiNote>> {
    check_range(chord)?;
    let mut voicing = chord.to_vec();
    voicing.sort_unstable();

    for round in 0..=limits.spread_cap {
        let Some(i) = (1..voicing.len()).find(|&i| voicing[i] - voicing[i - 1] < min_distance) else {
            return Ok(voicing);
        };
        if round == limits.spread_cap {
            break;
        }

        let lower = relocation(&voicing, i - 1, min_distance);
        let upper = relocation(&voicing, i, min_distance);
        let (index, target) = match (lower, upper) {
            (Some((lc, l)), Some((uc, _))) if lc < uc => (i - 1, l),
            (_, Some((_, u))) => (i, u),
            (Some((_, l)), None) => (i - 1, l),
            (None, None) => break,
        };

        trace!(round, from = voicing[index], to = target, "relocating voice");
        voicing[index] = target;
        voicing.sort_unstable();
    }

    Err(Error::NonTerminatingSearch {
        search: "voicing spread",
        cap: limits.spread_cap,
    })
}

/// Cheapest spot for `voicing[index]` outside the rest of the chord, as (cost, midi)
fn relocation(voicing: &[MidiNote], index: usize, min_distance: u8) -> Option<(u8, MidiNote)> {
    let current = voicing[index];
    let pc = (current % 12) as i32;
    let others = voicing
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, &m)| m as i32);
    let (low, high) = others.fold((i32::MAX, i32::MIN), |(lo, hi), m| (lo.min(m), hi.max(m)));
    if low > high {
        return None;
    }

    let below = low - min_distance as i32;
    let below = (below >= 0).then(|| below - (below - pc).rem_euclid(12)).filter(|m| *m >= 0);
    let above = high + min_distance as i32;
    let above = Some(above + (pc - above).rem_euclid(12)).filter(|m| *m <= MAX_MIDI);

    [below, above]
        .into_iter()
        .flatten()
        .map(|m| (m.abs_diff(current as i32) as u8, m as MidiNote))
        .min()
}

/// Shift a voicing up by octaves until its lowest note is at least `reference`
pub fn transpose_if_lower(chord: &[MidiNote], reference: MidiNote) -> Result<Vec<MidiNote>> {
    check_range(chord)?;
    check_range(&[reference])?;
    let Some(&lowest) = chord.iter().min() else {
        return Ok(Vec::new());
    };
    let Some(&highest) = chord.iter().max() else {
        return Ok(Vec::new());
    };

    let octaves = if lowest < reference {
        (reference - lowest).div_ceil(12)
    } else {
        0
    };
    let shift = octaves as i32 * 12;
    if highest as i32 + shift > MAX_MIDI {
        return Err(Error::MidiOutOfRange(highest as i32 + shift));
    }
    Ok(chord.iter().map(|&m| (m as i32 + shift) as MidiNote).collect())
}

/// Total semitone movement between two voicings, voice by voice
pub fn movement(from: &[MidiNote], to: &[MidiNote]) -> u32 {
    from.iter()
        .zip(to)
        .map(|(&a, &b)| a.abs_diff(b) as u32)
        .sum()
}
