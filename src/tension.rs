//! Tension curves sampled across a score
use itertools::Itertools;

use crate::chroma::{Chroma, Weighting};
use crate::config::TensionConfig;
use crate::error::{Error, Result};
use crate::event::{NoteEvent, Tick, sounding_at, span};
use crate::roughness::roughness;
use crate::tiv::TonalIntervalVector;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TensionPoint {
    pub tick: Tick,
    pub value: f64,
    /// Change since the previous sample
    pub velocity: f64,
    /// Change of velocity since the previous sample
    pub acceleration: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TensionCurve {
    pub points: Vec<TensionPoint>,
}

impl TensionCurve {
    /// Builds a curve from raw values, deriving velocity and acceleration
    pub fn from_values(samples: impl IntoIterator<Item = (Tick, f64)>) -> Self {
        let samples = samples.into_iter().collect_vec();
        let values = samples.iter().map(|(_, value)| *value).collect_vec();
        let velocity = differences(&values);
        let mut acceleration = differences(&velocity);
        if let Some(first_real) = acceleration.get_mut(1) {
            // the velocity before the first sample is unknown
            *first_real = 0.0;
        }
        let points = samples
            .iter()
            .zip(velocity.iter().zip(&acceleration))
            .map(|(&(tick, value), (&velocity, &acceleration))| TensionPoint {
                tick,
                value,
                velocity,
                acceleration,
            })
            .collect();
        Self { points }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    /// Samples strictly higher than both neighbors by more than `flatness`
    pub fn peaks(&self, flatness: f64) -> Vec<&TensionPoint> {
        local_extrema(&self.values(), flatness, true)
            .into_iter()
            .map(|index| &self.points[index])
            .collect()
    }

    /// Samples strictly lower than both neighbors by more than `flatness`
    pub fn valleys(&self, flatness: f64) -> Vec<&TensionPoint> {
        local_extrema(&self.values(), flatness, false)
            .into_iter()
            .map(|index| &self.points[index])
            .collect()
    }
}

/// Backward differences aligned with their sample, 0 at the first one
fn differences(values: &[f64]) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(values.iter().tuple_windows().map(|(a, b)| b - a))
        .take(values.len())
        .collect()
}

/// Indices of interior local maxima (or minima) compared with the immediate neighbors
pub fn local_extrema(values: &[f64], flatness: f64, maxima: bool) -> Vec<usize> {
    values
        .iter()
        .tuple_windows()
        .enumerate()
        .filter(|(_, (before, current, after))| {
            let sign = if maxima { 1.0 } else { -1.0 };
            sign * (*current - *before) > flatness && sign * (*current - *after) > flatness
        })
        .map(|(index, _)| index + 1)
        .collect()
}

/// Tension of one sonority, in [0, roughness_weight + tiv_weight]
///
/// Combines the roughness R of the frequencies, squashed by R/(1+R), with how far the
/// pitch-class content is from diatonic consonance. Nothing sounding has no tension.
pub fn tension_value(frequencies: &[f64], chroma: &Chroma, config: &TensionConfig) -> Result<f64> {
    if frequencies.is_empty() || chroma.is_silent() {
        return Ok(0.0);
    }
    let roughness = roughness(frequencies, config.harmonics)?;
    let consonance = TonalIntervalVector::from_chroma(chroma).consonance();
    Ok(config.roughness_weight * roughness / (1.0 + roughness)
        + config.tiv_weight * (1.0 - consonance))
}

/// Samples the sounding notes every `config.interval` ticks from the first onset to the last
/// release
///
/// Any events give at least one sample, even when they all have zero duration.
pub fn tension_curve(events: &[NoteEvent], config: &TensionConfig) -> Result<TensionCurve> {
    if config.interval == 0 {
        return Err(Error::ZeroDivision("tension sample interval"));
    }
    if config.harmonics == 0 {
        return Err(Error::NoHarmonics);
    }
    let Some((start, end)) = span(events) else {
        return Ok(TensionCurve::default());
    };

    let mut samples = Vec::new();
    let mut tick = start;
    while tick < end.max(start.saturating_add(1)) {
        let sounding = sounding_at(events, tick).copied().collect_vec();
        let frequencies = sounding.iter().map(NoteEvent::frequency).collect_vec();
        let chroma = Chroma::from_events(&sounding, Weighting::Count);
        samples.push((tick, tension_value(&frequencies, &chroma, config)?));
        tick = tick.saturating_add(config.interval);
    }
    log::debug!("sampled tension at {} points", samples.len());
    Ok(TensionCurve::from_values(samples))
}
