//! Chord templates, chord identification and Roman numerals
use std::fmt::{Display, Formatter};

use strum_macros::{Display, IntoStaticStr};

use crate::config::ChordConfig;
use crate::error::{Error, Result};
use crate::key::{Key, Mode};
use crate::pcs::PitchClassSet;
use crate::pitch::PitchClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChordQuality {
    #[strum(serialize = "major")]
    Major,
    #[strum(serialize = "minor")]
    Minor,
    #[strum(serialize = "diminished")]
    Diminished,
    #[strum(serialize = "augmented")]
    Augmented,
    #[strum(serialize = "suspended second")]
    Sus2,
    #[strum(serialize = "suspended fourth")]
    Sus4,
    #[strum(serialize = "dominant seventh")]
    Dominant7,
    #[strum(serialize = "major seventh")]
    Major7,
    #[strum(serialize = "minor seventh")]
    Minor7,
    #[strum(serialize = "minor-major seventh")]
    MinorMajor7,
    #[strum(serialize = "diminished seventh")]
    Diminished7,
    #[strum(serialize = "half-diminished seventh")]
    HalfDiminished7,
    #[strum(serialize = "major sixth")]
    Major6,
    #[strum(serialize = "minor sixth")]
    Minor6,
    #[strum(serialize = "power")]
    Power,
}

impl ChordQuality {
    /// Template order, earlier templates win ties
    pub const ALL: [Self; 15] = [
        Self::Major,
        Self::Minor,
        Self::Diminished,
        Self::Augmented,
        Self::Sus2,
        Self::Sus4,
        Self::Dominant7,
        Self::Major7,
        Self::Minor7,
        Self::MinorMajor7,
        Self::Diminished7,
        Self::HalfDiminished7,
        Self::Major6,
        Self::Minor6,
        Self::Power,
    ];

    /// Semitones above the root
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 4, 7],
            Self::Minor => &[0, 3, 7],
            Self::Diminished => &[0, 3, 6],
            Self::Augmented => &[0, 4, 8],
            Self::Sus2 => &[0, 2, 7],
            Self::Sus4 => &[0, 5, 7],
            Self::Dominant7 => &[0, 4, 7, 10],
            Self::Major7 => &[0, 4, 7, 11],
            Self::Minor7 => &[0, 3, 7, 10],
            Self::MinorMajor7 => &[0, 3, 7, 11],
            Self::Diminished7 => &[0, 3, 6, 9],
            Self::HalfDiminished7 => &[0, 3, 6, 10],
            Self::Major6 => &[0, 4, 7, 9],
            Self::Minor6 => &[0, 3, 7, 9],
            Self::Power => &[0, 7],
        }
    }

    /// Lead-sheet suffix, "m7" in "Am7"
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Major => "",
            Self::Minor => "m",
            Self::Diminished => "dim",
            Self::Augmented => "aug",
            Self::Sus2 => "sus2",
            Self::Sus4 => "sus4",
            Self::Dominant7 => "7",
            Self::Major7 => "maj7",
            Self::Minor7 => "m7",
            Self::MinorMajor7 => "mMaj7",
            Self::Diminished7 => "dim7",
            Self::HalfDiminished7 => "m7b5",
            Self::Major6 => "6",
            Self::Minor6 => "m6",
            Self::Power => "5",
        }
    }

    pub fn template(&self, root: PitchClass) -> PitchClassSet {
        self.intervals()
            .iter()
            .map(|step| root.transpose(i32::from(*step)))
            .collect()
    }

    fn is_upper_case(&self) -> bool {
        !matches!(
            self,
            Self::Minor
                | Self::Diminished
                | Self::Minor7
                | Self::MinorMajor7
                | Self::Diminished7
                | Self::HalfDiminished7
                | Self::Minor6
        )
    }

    fn numeral_suffix(&self) -> &'static str {
        match self {
            Self::Major | Self::Minor => "",
            Self::Diminished => "°",
            Self::Augmented => "+",
            Self::Sus2 => "sus2",
            Self::Sus4 => "sus4",
            Self::Dominant7 | Self::Minor7 => "7",
            Self::Major7 | Self::MinorMajor7 => "maj7",
            Self::Diminished7 => "°7",
            Self::HalfDiminished7 => "ø7",
            Self::Major6 | Self::Minor6 => "add6",
            Self::Power => "5",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chord {
    pub root: PitchClass,
    /// `None` for collections that match no template at this root
    pub quality: Option<ChordQuality>,
    pub pitch_classes: PitchClassSet,
}

impl Chord {
    pub fn new(root: PitchClass, quality: ChordQuality) -> Self {
        Self {
            root,
            quality: Some(quality),
            pitch_classes: quality.template(root),
        }
    }

    /// Any collection containing `root`, with the quality recognized when a template matches
    /// exactly
    pub fn from_pitch_classes(root: PitchClass, pitch_classes: PitchClassSet) -> Result<Self> {
        if pitch_classes.is_empty() {
            return Err(Error::Empty("chord"));
        }
        if !pitch_classes.contains(root) {
            return Err(Error::RootNotInChord { root: root.value() });
        }
        let quality = ChordQuality::ALL
            .into_iter()
            .find(|quality| quality.template(root) == pitch_classes);
        Ok(Self {
            root,
            quality,
            pitch_classes,
        })
    }

    /// "C major", or the root and members for unrecognized collections
    pub fn name(&self) -> String {
        match self.quality {
            Some(quality) => format!("{} {quality}", self.root),
            None => format!("{} {}", self.root, self.pitch_classes),
        }
    }

    /// "C", "Cm", "G7"
    pub fn symbol(&self) -> String {
        match self.quality {
            Some(quality) => format!("{}{}", self.root, quality.suffix()),
            None => format!("{}{}", self.root, self.pitch_classes),
        }
    }

    /// Perfect fifth above the root, or the diminished/augmented fifth standing in for it
    pub fn fifth(&self) -> Option<PitchClass> {
        [7, 6, 8]
            .into_iter()
            .map(|steps| self.root.transpose(steps))
            .find(|pc| self.pitch_classes.contains(*pc))
    }

    fn has_major_third(&self) -> bool {
        match self.quality {
            Some(quality) => quality.is_upper_case(),
            None => {
                self.pitch_classes.contains(self.root.transpose(4))
                    || !self.pitch_classes.contains(self.root.transpose(3))
            }
        }
    }
}

impl Display for Chord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol())
    }
}

/// Best matching chord template, `None` below two distinct pitch classes or without a close match
///
/// Ties go to the earlier template, then to the lower root.
pub fn identify_chord(set: &PitchClassSet, config: &ChordConfig) -> Option<Chord> {
    if set.len() < 2 {
        log::warn!("{set} has too few pitch classes to form a chord");
        return None;
    }
    let mut best: Option<(f64, ChordQuality, PitchClass)> = None;
    for quality in ChordQuality::ALL {
        for root in PitchClass::iter() {
            let similarity = set.jaccard(&quality.template(root));
            if best.is_none_or(|(best_similarity, _, _)| similarity > best_similarity) {
                best = Some((similarity, quality, root));
            }
        }
    }
    let (similarity, quality, root) = best?;
    if similarity < config.min_similarity {
        log::debug!("no chord template matches {set} (best {similarity:.2})");
        return None;
    }
    Some(Chord::new(root, quality))
}

/// A chord's function in a key, as in "bVI" or "viiø7"
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RomanNumeral {
    pub numeral: String,
    /// Scale degree 1-7 the numeral is built on, before any chromatic alteration
    pub degree: u8,
    pub quality: Option<ChordQuality>,
}

impl Display for RomanNumeral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.numeral)
    }
}

const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Spelling of roots outside the key: semitones above the tonic, accidental and degree
const CHROMATIC_MAJOR: [(u8, &str, u8); 5] = [
    (1, "b", 2),
    (3, "b", 3),
    (6, "#", 4),
    (8, "b", 6),
    (10, "b", 7),
];
const CHROMATIC_MINOR: [(u8, &str, u8); 5] = [
    (1, "b", 2),
    (4, "#", 3),
    (6, "#", 4),
    (9, "#", 6),
    (11, "#", 7),
];

pub fn roman_numeral(chord: &Chord, key: Key) -> RomanNumeral {
    let (accidental, degree) = match key.degree_of(chord.root) {
        Some(degree) => ("", degree),
        None => {
            let steps = key.tonic.interval_to(chord.root);
            let table = match key.mode {
                Mode::Major => &CHROMATIC_MAJOR,
                Mode::Minor => &CHROMATIC_MINOR,
            };
            table
                .iter()
                .find(|(chromatic, _, _)| *chromatic == steps)
                .map(|(_, accidental, degree)| (*accidental, *degree))
                .unwrap_or(("", 1))
        }
    };

    let base = NUMERALS[usize::from(degree - 1)];
    let base = if chord.has_major_third() {
        base.to_owned()
    } else {
        base.to_lowercase()
    };
    let suffix = chord.quality.map_or("", |quality| quality.numeral_suffix());
    RomanNumeral {
        numeral: format!("{accidental}{base}{suffix}"),
        degree,
        quality: chord.quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[i32]) -> PitchClassSet {
        PitchClassSet::from_integers(values.iter().copied())
    }

    fn identify(values: &[i32]) -> Option<Chord> {
        identify_chord(&set(values), &ChordConfig::default())
    }

    #[test]
    fn test_templates() {
        assert_eq!(
            ChordQuality::Dominant7.template(PitchClass::G),
            set(&[7, 11, 2, 5])
        );
        for quality in ChordQuality::ALL {
            assert_eq!(
                quality.template(PitchClass::C).len(),
                quality.intervals().len(),
                "{quality}"
            );
        }
    }

    #[test]
    fn test_exact_matches() {
        assert_eq!(identify(&[0, 4, 7]), Some(Chord::new(PitchClass::C, ChordQuality::Major)));
        assert_eq!(identify(&[9, 0, 4]), Some(Chord::new(PitchClass::A, ChordQuality::Minor)));
        assert_eq!(
            identify(&[7, 11, 2, 5]).map(|chord| chord.symbol()),
            Some("G7".to_owned())
        );
        assert_eq!(
            identify(&[11, 2, 5, 9]).map(|chord| chord.symbol()),
            Some("Bm7b5".to_owned())
        );
        assert_eq!(identify(&[2, 9]).map(|chord| chord.symbol()), Some("D5".to_owned()));
    }

    #[test]
    fn test_ambiguous_sets_follow_template_order() {
        // C6 and Am7 share their members, minor seventh is the earlier template
        assert_eq!(identify(&[0, 4, 7, 9]).map(|chord| chord.symbol()), Some("Am7".to_owned()));
        // symmetric chords take the lowest root
        assert_eq!(identify(&[0, 4, 8]).map(|chord| chord.symbol()), Some("Caug".to_owned()));
        assert_eq!(identify(&[1, 4, 7, 10]).map(|chord| chord.symbol()), Some("C#dim7".to_owned()));
    }

    #[test]
    fn test_too_few_pitch_classes() {
        assert_eq!(identify(&[0]), None);
        assert_eq!(identify(&[]), None);
        // doublings do not count
        assert_eq!(identify(&[7, 19, -5]), None);
    }

    #[test]
    fn test_inexact_matches() {
        // C9 without its ninth matching exactly, C7 beats Em7b5 by template order
        assert_eq!(identify(&[0, 4, 7, 10, 2]).map(|chord| chord.symbol()), Some("C7".to_owned()));
        assert_eq!(identify(&[0, 1, 2, 3, 4]), None);
        let strict = ChordConfig {
            min_similarity: 0.9,
            ..ChordConfig::default()
        };
        assert_eq!(identify_chord(&set(&[0, 4, 7, 10, 2]), &strict), None);
    }

    #[test]
    fn test_from_pitch_classes() {
        let chord = Chord::from_pitch_classes(PitchClass::C, set(&[0, 4, 7])).unwrap();
        assert_eq!(chord.quality, Some(ChordQuality::Major));
        assert_eq!(chord.name(), "C major");
        let cluster = Chord::from_pitch_classes(PitchClass::C, set(&[0, 1, 2])).unwrap();
        assert_eq!(cluster.quality, None);
        assert_eq!(cluster.name(), "C [0,1,2]");
        assert_eq!(
            Chord::from_pitch_classes(PitchClass::D, set(&[0, 4, 7])),
            Err(Error::RootNotInChord { root: 2 })
        );
        assert_eq!(
            Chord::from_pitch_classes(PitchClass::D, PitchClassSet::EMPTY),
            Err(Error::Empty("chord"))
        );
    }

    #[test]
    fn test_fifth() {
        assert_eq!(Chord::new(PitchClass::C, ChordQuality::Major).fifth(), Some(PitchClass::G));
        assert_eq!(
            Chord::new(PitchClass::B, ChordQuality::Diminished).fifth(),
            Some(PitchClass::F)
        );
        assert_eq!(
            Chord::new(PitchClass::C, ChordQuality::Augmented).fifth(),
            Some(PitchClass::G_SHARP)
        );
        assert_eq!(Chord::new(PitchClass::C, ChordQuality::Sus2).fifth(), Some(PitchClass::G));
    }

    #[test]
    fn test_roman_numerals() {
        let c_major = Key::major(PitchClass::C);
        let numeral = |root, quality| roman_numeral(&Chord::new(root, quality), c_major).numeral;
        assert_eq!(numeral(PitchClass::C, ChordQuality::Major), "I");
        assert_eq!(numeral(PitchClass::D, ChordQuality::Minor), "ii");
        assert_eq!(numeral(PitchClass::G, ChordQuality::Dominant7), "V7");
        assert_eq!(numeral(PitchClass::B, ChordQuality::Diminished), "vii°");
        assert_eq!(numeral(PitchClass::B, ChordQuality::HalfDiminished7), "viiø7");
        assert_eq!(numeral(PitchClass::G_SHARP, ChordQuality::Major), "bVI");
        assert_eq!(numeral(PitchClass::A_SHARP, ChordQuality::Major), "bVII");
        assert_eq!(numeral(PitchClass::C_SHARP, ChordQuality::Major), "bII");
        assert_eq!(numeral(PitchClass::E, ChordQuality::Augmented), "III+");

        let bvi = roman_numeral(&Chord::new(PitchClass::G_SHARP, ChordQuality::Major), c_major);
        assert_eq!(bvi.degree, 6);

        let a_minor = Key::minor(PitchClass::A);
        let v = roman_numeral(&Chord::new(PitchClass::E, ChordQuality::Major), a_minor);
        assert_eq!(v.numeral, "V");
        assert_eq!(v.degree, 5);
        let leading = roman_numeral(
            &Chord::new(PitchClass::G_SHARP, ChordQuality::Diminished7),
            a_minor,
        );
        assert_eq!(leading.numeral, "#vii°7");
        assert_eq!(
            roman_numeral(&Chord::new(PitchClass::C, ChordQuality::Major), a_minor).numeral,
            "III"
        );
    }
}
