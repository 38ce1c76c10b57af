use crate::rhythm::DurationName;

/// Domain errors raised by the analysis functions.
///
/// Absence of a result (no chord found, silent input to key finding) is never an error,
/// those cases return `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("frequency must be finite and positive, got {0}")]
    InvalidFrequency(f64),
    #[error("at least one harmonic is required")]
    NoHarmonics,
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("expected {expected} weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },
    #[error("weights must be finite and non-negative, got {0}")]
    InvalidWeight(f64),
    #[error("weights must not all be zero")]
    ZeroWeights,
    #[error("MIDI value out of range 0-127: {0}")]
    MidiOutOfRange(u8),
    #[error("pitch class out of range 0-11: {0}")]
    PitchClassOutOfRange(u8),
    #[error("{0} must be greater than zero")]
    ZeroDivision(&'static str),
    #[error("{what} must be within {min}..={max}, got {value}")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{ticks_per_quarter} ticks per quarter cannot represent a {duration} exactly")]
    InexactDuration {
        duration: DurationName,
        ticks_per_quarter: u32,
    },
    #[error("chord root {root} is not one of its pitch classes")]
    RootNotInChord { root: u8 },
}

pub type Result<T> = std::result::Result<T, Error>;
