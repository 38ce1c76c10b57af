//! Analyses composed from the lower level models: harmonic rhythm, modulations, chord
//! progressions and style fingerprints
use itertools::Itertools;

use crate::chord::{Chord, identify_chord};
use crate::chroma::{Chroma, Weighting};
use crate::config::{AnalysisConfig, ChordConfig};
use crate::error::{Error, Result};
use crate::event::{NoteEvent, Tick, span};
use crate::interval::Interval;
use crate::key::{Key, WindowedKey};
use crate::pitch::PITCH_CLASS_COUNT;
use crate::tension::tension_curve;
use crate::tps::tps_distance;

/// Interval classes 0 (repeated pitch class) through 6 (tritone)
pub const MELODIC_INTERVAL_CLASSES: usize = 7;

/// Consecutive windows sharing the same chord
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChordSpan {
    pub start: Tick,
    pub end: Tick,
    /// `None` where no template matched, including rests
    pub chord: Option<Chord>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HarmonicRhythm {
    pub spans: Vec<ChordSpan>,
    /// Chord changes per window
    pub change_rate: f64,
}

/// Chords per window of `config.window` ticks, with equal neighbors merged
pub fn harmonic_rhythm(events: &[NoteEvent], config: &ChordConfig) -> Result<HarmonicRhythm> {
    if config.window == 0 {
        return Err(Error::ZeroDivision("chord window"));
    }
    let Some((first, last)) = span(events) else {
        return Ok(HarmonicRhythm::default());
    };

    let mut spans: Vec<ChordSpan> = Vec::new();
    let mut windows = 0usize;
    let mut start = first - first % config.window;
    while start < last.max(first + 1) {
        let end = start.saturating_add(config.window);
        let sounding = Chroma::from_events_in(events, start, end, Weighting::Count).support();
        let chord = identify_chord(&sounding, config);
        match spans.last_mut() {
            Some(previous) if previous.chord == chord => previous.end = end,
            _ => spans.push(ChordSpan { start, end, chord }),
        }
        windows += 1;
        start = end;
    }

    let change_rate = (spans.len() - 1) as f64 / windows as f64;
    log::debug!(
        "{} chord spans over {windows} windows, {change_rate:.3} changes per window",
        spans.len()
    );
    Ok(HarmonicRhythm { spans, change_rate })
}

/// A key change that held for long enough to count
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Modulation {
    /// Start of the first window in the new key
    pub start: Tick,
    pub from: Key,
    pub to: Key,
}

/// Key changes between windowed estimates that last at least `min_windows` windows
///
/// Windows without an estimate are skipped. The first run of estimates sets the opening key.
/// Shorter runs of another key are excursions and leave the current key in place.
pub fn detect_modulations(windows: &[WindowedKey], min_windows: usize) -> Vec<Modulation> {
    let min_windows = min_windows.max(1);
    let runs = windows
        .iter()
        .filter_map(|window| {
            let estimate = window.estimate.as_ref()?;
            Some((window.start, estimate.key))
        })
        .chunk_by(|(_, key)| *key);

    let mut current: Option<Key> = None;
    let mut modulations = Vec::new();
    for (key, run) in &runs {
        let run = run.collect_vec();
        match current {
            None => current = Some(key),
            Some(from) if from != key && run.len() >= min_windows => {
                log::debug!("modulation from {from} to {key} at {}", run[0].0);
                modulations.push(Modulation {
                    start: run[0].0,
                    from,
                    to: key,
                });
                current = Some(key);
            }
            Some(from) if from != key => {
                log::trace!("{} window excursion to {key} ignored", run.len());
            }
            Some(_) => {}
        }
    }
    modulations
}

/// Tonal pitch space distance between each chord and the next
pub fn tps_progression(progression: &[(Chord, Key)]) -> Vec<u32> {
    progression
        .iter()
        .tuple_windows()
        .map(|((from, from_key), (to, to_key))| tps_distance(from, *from_key, to, *to_key))
        .collect()
}

/// Summary statistics of a passage used to compare styles
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StyleFingerprint {
    /// Duration weighted, sums to 1
    pub pitch_classes: [f64; PITCH_CLASS_COUNT],
    /// Entropy of `pitch_classes` in bits
    pub entropy: f64,
    /// Interval classes between successive onsets, sums to 1 with at least two notes
    pub intervals: [f64; MELODIC_INTERVAL_CLASSES],
    pub mean_tension: f64,
    pub chord_change_rate: f64,
}

impl StyleFingerprint {
    fn features(&self) -> Vec<f64> {
        let max_entropy = (PITCH_CLASS_COUNT as f64).log2();
        self.pitch_classes
            .iter()
            .chain(&self.intervals)
            .copied()
            .chain([
                self.entropy / max_entropy,
                self.mean_tension,
                self.chord_change_rate,
            ])
            .collect()
    }

    /// Cosine similarity of the feature vectors, in [0, 1]
    pub fn similarity(&self, other: &Self) -> f64 {
        let a = self.features();
        let b = other.features();
        let dot: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return if norm_a == norm_b { 1.0 } else { 0.0 };
        }
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}

fn melodic_intervals(events: &[NoteEvent]) -> [f64; MELODIC_INTERVAL_CLASSES] {
    let mut histogram = [0.0; MELODIC_INTERVAL_CLASSES];
    let ordered = events
        .iter()
        .sorted_by_key(|event| (event.onset, event.midi()))
        .collect_vec();
    let mut count = 0usize;
    for (a, b) in ordered.iter().tuple_windows() {
        let semitones = i32::from(b.midi()) - i32::from(a.midi());
        let interval_class = Interval::from_semitone_wrapping(semitones).interval_class();
        histogram[usize::from(interval_class)] += 1.0;
        count += 1;
    }
    if count > 0 {
        for bin in &mut histogram {
            *bin /= count as f64;
        }
    }
    histogram
}

pub fn style_fingerprint(
    events: &[NoteEvent],
    config: &AnalysisConfig,
) -> Result<StyleFingerprint> {
    if events.is_empty() {
        return Err(Error::Empty("events"));
    }
    let distribution = Chroma::from_events(events, Weighting::Duration).to_distribution()?;
    let tension = tension_curve(events, &config.tension)?.values();
    let mean_tension = if tension.is_empty() {
        0.0
    } else {
        tension.iter().sum::<f64>() / tension.len() as f64
    };
    let rhythm = harmonic_rhythm(events, &config.chord)?;

    Ok(StyleFingerprint {
        pitch_classes: *distribution.probabilities(),
        entropy: distribution.entropy(),
        intervals: melodic_intervals(events),
        mean_tension,
        chord_change_rate: rhythm.change_rate,
    })
}
