//! Sensory roughness after Plomp & Levelt
//!
//! Every fundamental is expanded into harmonic partials with 1/n amplitudes and every pair of
//! partials contributes according to how much of a critical band separates them.
use itertools::Itertools;

use crate::error::{Error, Result};
use crate::pcs::PitchClassSet;
use crate::pitch::PITCH_CLASS_COUNT;

pub const DEFAULT_HARMONICS: usize = 6;

// Reference octave for pitch-class input (C4)
const REFERENCE_C: f64 = 261.63;

const DECAY_1: f64 = -3.5;
const DECAY_2: f64 = -5.75;

/// Critical bandwidth in Hz around `frequency_hz` (Glasberg & Moore ERB)
pub fn critical_bandwidth(frequency_hz: f64) -> f64 {
    const A: f64 = 24.7;
    const B: f64 = 4.37;
    A * (B * frequency_hz / 1000.0 + 1.0)
}

fn pure_tone_roughness(f1: f64, f2: f64) -> f64 {
    let f_min = f1.min(f2);
    let x = (f1 - f2).abs() / critical_bandwidth(f_min);
    ((DECAY_1 * x).exp() - (DECAY_2 * x).exp()).max(0.0)
}

fn partials(frequencies: &[f64], num_harmonics: usize) -> Vec<(f64, f64)> {
    frequencies
        .iter()
        .flat_map(|&f| {
            (1..=num_harmonics).map(move |harmonic| (f * harmonic as f64, 1.0 / harmonic as f64))
        })
        .collect()
}

fn unchecked_roughness(frequencies: &[f64], num_harmonics: usize) -> f64 {
    if frequencies.len() < 2 {
        return 0.0;
    }
    partials(frequencies, num_harmonics)
        .iter()
        .tuple_combinations()
        .map(|(&(f1, a1), &(f2, a2))| pure_tone_roughness(f1, f2) * a1 * a2)
        .sum()
}

/// Total roughness of complex tones at the given fundamentals
///
/// Fails on any non-finite or non-positive frequency and on zero harmonics, before looking at
/// how many frequencies there are. Fewer than two frequencies are perfectly smooth.
pub fn roughness(frequencies: &[f64], num_harmonics: usize) -> Result<f64> {
    if let Some(&bad) = frequencies.iter().find(|f| !f.is_finite() || **f <= 0.0) {
        return Err(Error::InvalidFrequency(bad));
    }
    if num_harmonics == 0 {
        return Err(Error::NoHarmonics);
    }
    Ok(unchecked_roughness(frequencies, num_harmonics))
}

fn reference_frequency(semitones: u8) -> f64 {
    REFERENCE_C * 2.0_f64.powf(f64::from(semitones) / PITCH_CLASS_COUNT as f64)
}

/// Octave-equivalent roughness of a pitch-class set voiced within the octave above C4
pub fn chord_roughness(set: &PitchClassSet, num_harmonics: usize) -> Result<f64> {
    let frequencies = set
        .iter()
        .map(|pc| reference_frequency(pc.value()))
        .collect_vec();
    roughness(&frequencies, num_harmonics)
}

/// Roughness of a dyad above C4, with inversions folded onto their interval class
pub fn interval_roughness(semitones: u8) -> f64 {
    let folded = semitones % PITCH_CLASS_COUNT as u8;
    let interval_class = folded.min(PITCH_CLASS_COUNT as u8 - folded);
    if interval_class == 0 {
        return 0.0;
    }
    unchecked_roughness(
        &[REFERENCE_C, reference_frequency(interval_class)],
        DEFAULT_HARMONICS,
    )
}

/// [`interval_roughness`] scaled so the minor second is 1.0
pub fn interval_roughness_normalized(semitones: u8) -> f64 {
    interval_roughness(semitones) / interval_roughness(1)
}
