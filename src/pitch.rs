use std::fmt::{Display, Formatter};

use wmidi::Note;

use crate::error::{Error, Result};

pub const PITCH_CLASS_COUNT: usize = 12;

const NAMES: [&str; PITCH_CLASS_COUNT] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A pitch identity modulo the octave (0-11, C = 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: Self = Self(0);
    pub const C_SHARP: Self = Self(1);
    pub const D: Self = Self(2);
    pub const D_SHARP: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const F_SHARP: Self = Self(6);
    pub const G: Self = Self(7);
    pub const G_SHARP: Self = Self(8);
    pub const A: Self = Self(9);
    pub const A_SHARP: Self = Self(10);
    pub const B: Self = Self(11);

    /// Normalize any integer into 0-11, negative values wrap upwards
    pub const fn wrapping(value: i32) -> Self {
        Self(value.rem_euclid(PITCH_CLASS_COUNT as i32) as u8)
    }

    /// Strict constructor, rejects values outside 0-11
    pub fn try_new(value: u8) -> Result<Self> {
        if usize::from(value) < PITCH_CLASS_COUNT {
            Ok(Self(value))
        } else {
            Err(Error::PitchClassOutOfRange(value))
        }
    }

    pub fn from_note(note: Note) -> Self {
        Self(u8::from(note) % PITCH_CLASS_COUNT as u8)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Use as an index into 12-element pitch-class arrays
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Sharp spelling
    pub const fn name(self) -> &'static str {
        NAMES[self.0 as usize]
    }

    pub const fn transpose(self, semitones: i32) -> Self {
        Self::wrapping(self.0 as i32 + semitones)
    }

    /// Ascending semitones from `self` up to `other` (0-11)
    pub const fn interval_to(self, other: Self) -> u8 {
        (other.0 + PITCH_CLASS_COUNT as u8 - self.0) % PITCH_CLASS_COUNT as u8
    }

    /// Position on the line of fifths relative to C, spelled from Ab (-4) up to C# (+7)
    pub const fn fifths_index(self) -> i32 {
        let steps = self.circle_of_fifths_step() as i32;
        if steps > 7 { steps - 12 } else { steps }
    }

    /// Number of steps around the circle of fifths separating the two classes (0-6)
    pub const fn fifths_distance(self, other: Self) -> u8 {
        let diff = (self.circle_of_fifths_step() + 12 - other.circle_of_fifths_step()) % 12;
        if diff > 6 { 12 - diff } else { diff }
    }

    /// Shortest chromatic distance in semitones (0-6)
    pub const fn semitone_distance(self, other: Self) -> u8 {
        let up = self.interval_to(other);
        if up > 6 { 12 - up } else { up }
    }

    /// Clockwise position on the circle of fifths starting at C (0-11)
    const fn circle_of_fifths_step(self) -> u8 {
        (self.0 * 7) % PITCH_CLASS_COUNT as u8
    }

    /// All 12 pitch classes in chromatic order
    pub fn iter() -> impl Iterator<Item = PitchClass> {
        (0..PITCH_CLASS_COUNT as u8).map(Self)
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::try_new(value)
    }
}

impl From<PitchClass> for u8 {
    fn from(pc: PitchClass) -> Self {
        pc.0
    }
}

impl From<Note> for PitchClass {
    fn from(note: Note) -> Self {
        Self::from_note(note)
    }
}

impl Display for PitchClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
