//! Named durations and the onset-grid transforms
//!
//! [`Quantize`] and [`Swing`] are the only operations in the crate that modify their input.
//! They take the events as `&mut [NoteEvent]`, so a single writer per collection is enforced
//! by the borrow.
use std::fmt::{Display, Formatter};

use num_rational::{Ratio, Rational32};
use num_traits::ToPrimitive;
use strum_macros::{Display, IntoStaticStr};

use crate::error::{Error, Result};
use crate::event::{NoteEvent, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NoteValue {
    #[strum(serialize = "whole")]
    Whole,
    #[strum(serialize = "half")]
    Half,
    #[strum(serialize = "quarter")]
    Quarter,
    #[strum(serialize = "eighth")]
    Eighth,
    #[strum(serialize = "sixteenth")]
    Sixteenth,
    #[strum(serialize = "thirty-second")]
    ThirtySecond,
}

impl NoteValue {
    pub const ALL: [Self; 6] = [
        Self::Whole,
        Self::Half,
        Self::Quarter,
        Self::Eighth,
        Self::Sixteenth,
        Self::ThirtySecond,
    ];

    /// Length in quarter notes
    pub fn quarters(&self) -> Rational32 {
        match self {
            Self::Whole => Ratio::from_integer(4),
            Self::Half => Ratio::from_integer(2),
            Self::Quarter => Ratio::from_integer(1),
            Self::Eighth => Ratio::new(1, 2),
            Self::Sixteenth => Ratio::new(1, 4),
            Self::ThirtySecond => Ratio::new(1, 8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DurationModifier {
    #[default]
    Plain,
    Dotted,
    Triplet,
}

impl DurationModifier {
    pub const ALL: [Self; 3] = [Self::Plain, Self::Dotted, Self::Triplet];

    fn factor(&self) -> Rational32 {
        match self {
            Self::Plain => Ratio::from_integer(1),
            Self::Dotted => Ratio::new(3, 2),
            Self::Triplet => Ratio::new(2, 3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DurationName {
    pub value: NoteValue,
    pub modifier: DurationModifier,
}

impl DurationName {
    pub fn new(value: NoteValue, modifier: DurationModifier) -> Self {
        Self { value, modifier }
    }

    pub fn plain(value: NoteValue) -> Self {
        Self::new(value, DurationModifier::Plain)
    }

    pub fn dotted(value: NoteValue) -> Self {
        Self::new(value, DurationModifier::Dotted)
    }

    pub fn triplet(value: NoteValue) -> Self {
        Self::new(value, DurationModifier::Triplet)
    }

    /// Every named duration, longest note value first
    pub fn all() -> impl Iterator<Item = DurationName> {
        NoteValue::ALL.into_iter().flat_map(|value| {
            DurationModifier::ALL
                .into_iter()
                .map(move |modifier| Self::new(value, modifier))
        })
    }

    /// Exact length in quarter notes
    pub fn quarters(&self) -> Rational32 {
        self.value.quarters() * self.modifier.factor()
    }
}

impl Display for DurationName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.modifier {
            DurationModifier::Plain => write!(f, "{}", self.value),
            DurationModifier::Dotted => write!(f, "dotted {}", self.value),
            DurationModifier::Triplet => write!(f, "{} triplet", self.value),
        }
    }
}

/// Length of a named duration at the given resolution
///
/// Fails on a zero resolution or when the duration does not land on a whole tick, such as a
/// triplet eighth at 100 ticks per quarter.
pub fn duration_ticks(duration: DurationName, ticks_per_quarter: u32) -> Result<Tick> {
    if ticks_per_quarter == 0 {
        return Err(Error::ZeroDivision("ticks per quarter"));
    }
    let quarters = duration.quarters();
    let ticks = Ratio::<i64>::new(
        i64::from(*quarters.numer()) * i64::from(ticks_per_quarter),
        i64::from(*quarters.denom()),
    );
    let inexact = Error::InexactDuration {
        duration,
        ticks_per_quarter,
    };
    if !ticks.is_integer() {
        return Err(inexact);
    }
    ticks.to_integer().to_u64().ok_or(inexact)
}

/// The named duration lasting exactly `ticks`, if any
pub fn duration_name(ticks: Tick, ticks_per_quarter: u32) -> Option<DurationName> {
    DurationName::all().find(|duration| duration_ticks(*duration, ticks_per_quarter) == Ok(ticks))
}

fn check_grid(grid: Tick, what: &'static str) -> Result<()> {
    if grid == 0 {
        Err(Error::ZeroDivision(what))
    } else {
        Ok(())
    }
}

fn check_range(what: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::OutOfRange {
            what,
            value,
            min,
            max,
        })
    }
}

/// Pulls onsets towards the nearest multiple of `grid`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quantize {
    pub grid: Tick,
    /// 0 leaves onsets alone, 1 snaps them onto the grid
    pub strength: f64,
}

impl Quantize {
    pub fn new(grid: Tick) -> Self {
        Self {
            grid,
            strength: 1.0,
        }
    }

    pub fn with_strength(self, strength: f64) -> Self {
        Self { strength, ..self }
    }

    /// Moves the onsets of `events` in place, durations are kept
    pub fn apply(&self, events: &mut [NoteEvent]) -> Result<()> {
        check_grid(self.grid, "quantize grid")?;
        check_range("quantize strength", self.strength, 0.0, 1.0)?;
        for event in events.iter_mut() {
            let onset = event.onset;
            let nearest = (onset + self.grid / 2) / self.grid * self.grid;
            let moved = onset as f64 + (nearest as f64 - onset as f64) * self.strength;
            event.onset = moved.round().to_u64().unwrap_or(onset);
        }
        log::trace!("quantized {} onsets to a grid of {}", events.len(), self.grid);
        Ok(())
    }
}

/// Delays onsets on every second grid line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swing {
    pub grid: Tick,
    /// Share of a pair of grid steps taken by the first, 0.5 is straight and 2/3 a triplet feel
    pub ratio: f64,
}

impl Swing {
    pub const MIN_RATIO: f64 = 0.5;
    pub const MAX_RATIO: f64 = 0.75;

    pub fn new(grid: Tick, ratio: f64) -> Self {
        Self { grid, ratio }
    }

    /// Moves off-beat onsets of `events` in place, other events are untouched
    pub fn apply(&self, events: &mut [NoteEvent]) -> Result<()> {
        check_grid(self.grid, "swing grid")?;
        check_range("swing ratio", self.ratio, Self::MIN_RATIO, Self::MAX_RATIO)?;
        let delay = ((self.ratio - 0.5) * 2.0 * self.grid as f64)
            .round()
            .to_u64()
            .unwrap_or(0);
        for event in events
            .iter_mut()
            .filter(|event| event.onset % self.grid == 0 && (event.onset / self.grid) % 2 == 1)
        {
            event.onset += delay;
        }
        Ok(())
    }
}
