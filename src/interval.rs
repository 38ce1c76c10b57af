use std::fmt::{Display, Formatter, Result};
use std::ops::Div;

use crate::pitch::PITCH_CLASS_COUNT;

const SEMITONES_PER_OCTAVE_I32: i32 = PITCH_CLASS_COUNT as i32;

/// Musical intervals that define the distance between two notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interval {
    Unison,
    MinorSecond,
    MajorSecond,
    MinorThird,
    MajorThird,
    PerfectFourth,
    Tritone,
    PerfectFifth,
    MinorSixth,
    MajorSixth,
    MinorSeventh,
    MajorSeventh,
    Octave,
}

impl Interval {
    /// only handles one octave, `None` above 12
    pub fn from_semitones(semitones: u8) -> Option<Self> {
        Some(match semitones {
            0 => Self::Unison,
            1 => Self::MinorSecond,
            2 => Self::MajorSecond,
            3 => Self::MinorThird,
            4 => Self::MajorThird,
            5 => Self::PerfectFourth,
            6 => Self::Tritone,
            7 => Self::PerfectFifth,
            8 => Self::MinorSixth,
            9 => Self::MajorSixth,
            10 => Self::MinorSeventh,
            11 => Self::MajorSeventh,
            12 => Self::Octave,
            _ => return None,
        })
    }

    /// Folds any signed semitone count into unison..major seventh
    pub fn from_semitone_wrapping(semitones: i32) -> Self {
        match semitones.rem_euclid(SEMITONES_PER_OCTAVE_I32) {
            0 => Self::Unison,
            1 => Self::MinorSecond,
            2 => Self::MajorSecond,
            3 => Self::MinorThird,
            4 => Self::MajorThird,
            5 => Self::PerfectFourth,
            6 => Self::Tritone,
            7 => Self::PerfectFifth,
            8 => Self::MinorSixth,
            9 => Self::MajorSixth,
            10 => Self::MinorSeventh,
            _ => Self::MajorSeventh,
        }
    }

    /// Get the number of semitones in this interval
    pub fn semitones(&self) -> u8 {
        match self {
            Self::Unison => 0,
            Self::MinorSecond => 1,
            Self::MajorSecond => 2,
            Self::MinorThird => 3,
            Self::MajorThird => 4,
            Self::PerfectFourth => 5,
            Self::Tritone => 6,
            Self::PerfectFifth => 7,
            Self::MinorSixth => 8,
            Self::MajorSixth => 9,
            Self::MinorSeventh => 10,
            Self::MajorSeventh => 11,
            Self::Octave => 12,
        }
    }

    /// Interval class 1-6, with unison and octave mapping to 0
    pub fn interval_class(&self) -> u8 {
        let folded = self.semitones() % PITCH_CLASS_COUNT as u8;
        folded.min(PITCH_CLASS_COUNT as u8 - folded) % PITCH_CLASS_COUNT as u8
    }

    pub fn inverse(&self) -> Self {
        match self {
            Self::Unison => Self::Octave,
            Self::Octave => Self::Unison,
            other => Self::from_semitone_wrapping(-i32::from(other.semitones())),
        }
    }

    /// Sensory roughness of the interval as complex tones, scaled so the minor second is 1.0.
    /// Inversions share a value.
    pub fn roughness(&self) -> f64 {
        crate::roughness::interval_roughness_normalized(self.semitones())
    }
}

impl Div for Interval {
    type Output = Self;

    /// Calculates the interval between two intervals
    ///
    /// For example, a perfect fifth divided by a major third gives a minor third
    /// (because a minor third interval separates a major third from a perfect fifth)
    fn div(self, rhs: Self) -> Self::Output {
        // we are subtracting semitones which in effect is the log of the interval
        #[expect(clippy::suspicious_arithmetic_impl)]
        let semitone_diff = i32::from(self.semitones()) - i32::from(rhs.semitones());
        Self::from_semitone_wrapping(semitone_diff)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            Self::Unison => "unison",
            Self::MinorSecond => "minor second",
            Self::MajorSecond => "major second",
            Self::MinorThird => "minor third",
            Self::MajorThird => "major third",
            Self::PerfectFourth => "perfect fourth",
            Self::Tritone => "tritone",
            Self::PerfectFifth => "perfect fifth",
            Self::MinorSixth => "minor sixth",
            Self::MajorSixth => "major sixth",
            Self::MinorSeventh => "minor seventh",
            Self::MajorSeventh => "major seventh",
            Self::Octave => "octave",
        };
        write!(f, "{s}")
    }
}
