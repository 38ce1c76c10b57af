use crate::error::{Error, Result};
use crate::event::{NoteEvent, Tick};
use crate::pcs::PitchClassSet;
use crate::pitch::{PITCH_CLASS_COUNT, PitchClass};

/// How events contribute weight to their pitch class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Weighting {
    /// Sounding ticks, at least one tick per event
    #[default]
    Duration,
    Count,
    Velocity,
}

/// One non-negative weight per pitch class, aggregated over some span of a score
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Chroma([f64; PITCH_CLASS_COUNT]);

impl Chroma {
    pub const SILENT: Self = Self([0.0; PITCH_CLASS_COUNT]);

    pub fn from_weights(weights: [f64; PITCH_CLASS_COUNT]) -> Result<Self> {
        if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::InvalidWeight(bad));
        }
        Ok(Self(weights))
    }

    pub fn from_slice(weights: &[f64]) -> Result<Self> {
        let weights: [f64; PITCH_CLASS_COUNT] =
            weights.try_into().map_err(|_| Error::WeightCount {
                expected: PITCH_CLASS_COUNT,
                actual: weights.len(),
            })?;
        Self::from_weights(weights)
    }

    /// Every occurrence adds one, so repeated classes weigh more
    pub fn from_pitch_classes(pcs: impl IntoIterator<Item = PitchClass>) -> Self {
        let mut weights = [0.0; PITCH_CLASS_COUNT];
        for pc in pcs {
            weights[pc.index()] += 1.0;
        }
        Self(weights)
    }

    /// Weight one for each member
    pub fn from_set(set: &PitchClassSet) -> Self {
        Self::from_pitch_classes(set.iter())
    }

    pub fn from_events(events: &[NoteEvent], weighting: Weighting) -> Self {
        let mut weights = [0.0; PITCH_CLASS_COUNT];
        for event in events {
            weights[event.pitch_class().index()] += match weighting {
                Weighting::Duration => event.duration.max(1) as f64,
                Weighting::Count => 1.0,
                Weighting::Velocity => f64::from(event.velocity),
            };
        }
        Self(weights)
    }

    /// Only the parts of events sounding inside `start..end` contribute
    ///
    /// A zero-length note counts when its onset lies in the window and, like in
    /// [`Self::from_events`], weighs at least one tick, so a window covering every event
    /// gives the same chroma as the whole passage.
    pub fn from_events_in(
        events: &[NoteEvent],
        start: Tick,
        end: Tick,
        weighting: Weighting,
    ) -> Self {
        let mut weights = [0.0; PITCH_CLASS_COUNT];
        for event in events.iter().filter(|event| event.occupies(start, end)) {
            weights[event.pitch_class().index()] += match weighting {
                Weighting::Duration => event.overlap(start, end).max(1) as f64,
                Weighting::Count => 1.0,
                Weighting::Velocity => f64::from(event.velocity),
            };
        }
        Self(weights)
    }

    pub fn weight(&self, pc: PitchClass) -> f64 {
        self.0[pc.index()]
    }

    pub fn as_array(&self) -> &[f64; PITCH_CLASS_COUNT] {
        &self.0
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn is_silent(&self) -> bool {
        self.0.iter().all(|w| *w == 0.0)
    }

    /// Transposes the content up by `semitones`
    pub fn rotate(&self, semitones: i32) -> Self {
        let mut weights = [0.0; PITCH_CLASS_COUNT];
        for pc in PitchClass::iter() {
            weights[pc.transpose(semitones).index()] = self.0[pc.index()];
        }
        Self(weights)
    }

    /// Classes with non-zero weight
    pub fn support(&self) -> PitchClassSet {
        PitchClass::iter().filter(|pc| self.weight(*pc) > 0.0).collect()
    }

    /// Normalize to a probability distribution, fails when nothing sounds
    pub fn to_distribution(&self) -> Result<Distribution> {
        let total = self.total();
        if total <= 0.0 {
            return Err(Error::ZeroWeights);
        }
        Ok(Distribution(self.0.map(|w| w / total)))
    }
}

/// A chroma normalized to sum to one
///
/// Only obtainable through [`Chroma::to_distribution`] and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Distribution([f64; PITCH_CLASS_COUNT]);

impl Distribution {
    pub fn probability(&self, pc: PitchClass) -> f64 {
        self.0[pc.index()]
    }

    pub fn probabilities(&self) -> &[f64; PITCH_CLASS_COUNT] {
        &self.0
    }

    /// Shannon entropy in bits, 0 for a single class and log2(12) for a flat distribution
    pub fn entropy(&self) -> f64 {
        -self
            .0
            .iter()
            .filter(|p| **p > 0.0)
            .map(|p| p * p.log2())
            .sum::<f64>()
    }

    /// As a chroma with the same weights
    pub fn to_chroma(&self) -> Chroma {
        Chroma(self.0)
    }
}
