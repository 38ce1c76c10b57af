//! Lerdahl's tonal pitch space: basic spaces, chord distances and melodic attraction
use crate::chord::{Chord, ChordQuality};
use crate::error::{Error, Result};
use crate::key::{Key, Mode};
use crate::pcs::PitchClassSet;
use crate::pitch::{PITCH_CLASS_COUNT, PitchClass};

pub const LEVEL_ROOT: u8 = 5;
pub const LEVEL_FIFTH: u8 = 4;
pub const LEVEL_CHORD: u8 = 3;
pub const LEVEL_DIATONIC: u8 = 2;
pub const LEVEL_CHROMATIC: u8 = 1;

/// Stability level of every pitch class for one chord in one key
///
/// Levels are cumulative: a pitch class at level 4 is also present at levels 3, 2 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BasicSpace {
    levels: [u8; PITCH_CLASS_COUNT],
}

impl BasicSpace {
    pub fn new(chord: &Chord, key: Key) -> Self {
        let diatonic = key.scale();
        let fifth = chord.fifth();
        let levels = std::array::from_fn(|index| {
            let pc = PitchClass::wrapping(index as i32);
            if pc == chord.root {
                LEVEL_ROOT
            } else if Some(pc) == fifth {
                LEVEL_FIFTH
            } else if chord.pitch_classes.contains(pc) {
                LEVEL_CHORD
            } else if diatonic.contains(pc) {
                LEVEL_DIATONIC
            } else {
                LEVEL_CHROMATIC
            }
        });
        Self { levels }
    }

    pub fn level(&self, pc: PitchClass) -> u8 {
        self.levels[pc.index()]
    }

    pub fn levels(&self) -> &[u8; PITCH_CLASS_COUNT] {
        &self.levels
    }

    /// Elements of `target` missing from `self`, summed over all levels
    fn new_elements(&self, target: &Self) -> u32 {
        self.levels
            .iter()
            .zip(&target.levels)
            .map(|(source, target)| u32::from(target.saturating_sub(*source)))
            .sum()
    }
}

pub fn basic_space(chord: &Chord, key: Key) -> BasicSpace {
    BasicSpace::new(chord, key)
}

/// Chord distance from `from` in `from_key` to `to` in `to_key`
///
/// Sum of the circle-of-fifths distance between the regions (compared through their relative
/// majors), the circle-of-fifths distance between the roots, and the number of basic space
/// elements of the destination that the origin lacks. The last term makes the distance
/// asymmetric in general.
pub fn tps_distance(from: &Chord, from_key: Key, to: &Chord, to_key: Key) -> u32 {
    let region = from_key
        .relative_major_tonic()
        .fifths_distance(to_key.relative_major_tonic());
    let chord = from.root.fifths_distance(to.root);
    let basic_space = BasicSpace::new(from, from_key).new_elements(&BasicSpace::new(to, to_key));
    u32::from(region) + u32::from(chord) + basic_space
}

/// Non-chord tones weighed by their semitone distance to the closest chord tone
///
/// Every occurrence counts. No pitch classes give 0, an empty chord with pitch classes to
/// measure is a domain error.
pub fn surface_dissonance(pcs: &[PitchClass], chord: &PitchClassSet) -> Result<u32> {
    if pcs.is_empty() {
        return Ok(0);
    }
    if chord.is_empty() {
        return Err(Error::Empty("chord"));
    }
    Ok(pcs
        .iter()
        .filter(|pc| !chord.contains(**pc))
        .map(|pc| {
            chord
                .iter()
                .map(|tone| u32::from(pc.semitone_distance(tone)))
                .min()
                .unwrap_or_default()
        })
        .sum())
}

fn tonic_triad(key: Key) -> Chord {
    let quality = match key.mode {
        Mode::Major => ChordQuality::Major,
        Mode::Minor => ChordQuality::Minor,
    };
    Chord::new(key.tonic, quality)
}

/// Pull of `from` towards `to`: stability of `to` in the key's tonic space over the squared
/// distance
///
/// Repeating a pitch class has no attraction.
pub fn melodic_attraction(from: PitchClass, to: PitchClass, key: Key) -> f64 {
    let distance = from.semitone_distance(to);
    if distance == 0 {
        return 0.0;
    }
    let stability = BasicSpace::new(&tonic_triad(key), key).level(to);
    f64::from(stability) / f64::from(distance).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(root: PitchClass, quality: ChordQuality) -> Chord {
        Chord::new(root, quality)
    }

    #[test]
    fn test_basic_space_of_tonic() {
        let space = basic_space(
            &chord(PitchClass::C, ChordQuality::Major),
            Key::major(PitchClass::C),
        );
        assert_eq!(space.levels(), &[5, 1, 2, 1, 3, 2, 1, 4, 1, 2, 1, 2]);
    }

    #[test]
    fn test_basic_space_minor_key_uses_natural_minor() {
        let space = basic_space(
            &chord(PitchClass::A, ChordQuality::Minor),
            Key::minor(PitchClass::A),
        );
        assert_eq!(space.level(PitchClass::A), 5);
        assert_eq!(space.level(PitchClass::E), 4);
        assert_eq!(space.level(PitchClass::C), 3);
        assert_eq!(space.level(PitchClass::G), 2);
        assert_eq!(space.level(PitchClass::G_SHARP), 1);
    }

    #[test]
    fn test_diminished_fifth_takes_fifth_level() {
        let space = basic_space(
            &chord(PitchClass::B, ChordQuality::Diminished),
            Key::major(PitchClass::C),
        );
        assert_eq!(space.level(PitchClass::F), 4);
        assert_eq!(space.level(PitchClass::D), 3);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for key in Key::all() {
            for quality in [ChordQuality::Major, ChordQuality::Minor, ChordQuality::Dominant7] {
                let x = chord(PitchClass::E, quality);
                assert_eq!(tps_distance(&x, key, &x, key), 0);
            }
        }
    }

    #[test]
    fn test_distances_in_c_major() {
        let c = Key::major(PitchClass::C);
        let tonic = chord(PitchClass::C, ChordQuality::Major);
        let dominant = chord(PitchClass::G, ChordQuality::Major);
        let flat_six = chord(PitchClass::G_SHARP, ChordQuality::Major);
        assert_eq!(tps_distance(&tonic, c, &dominant, c), 5);
        assert_eq!(tps_distance(&tonic, c, &flat_six, c), 11);
        assert!(tps_distance(&tonic, c, &dominant, c) < tps_distance(&tonic, c, &flat_six, c));
    }

    #[test]
    fn test_distance_across_regions() {
        let c = Key::major(PitchClass::C);
        let g = Key::major(PitchClass::G);
        let tonic = chord(PitchClass::C, ChordQuality::Major);
        let g_in_g = chord(PitchClass::G, ChordQuality::Major);
        let g_in_c = tps_distance(&tonic, c, &g_in_g, c);
        assert_eq!(tps_distance(&tonic, c, &g_in_g, g), g_in_c + 1 + 1);

        // relative keys share a region
        let a_minor = Key::minor(PitchClass::A);
        let a = chord(PitchClass::A, ChordQuality::Minor);
        assert_eq!(tps_distance(&a, a_minor, &a, c), 0);
    }

    #[test]
    fn test_surface_dissonance() {
        let triad = PitchClassSet::from_integers([0, 4, 7]);
        assert_eq!(surface_dissonance(&[], &triad), Ok(0));
        assert_eq!(surface_dissonance(&[], &PitchClassSet::EMPTY), Ok(0));
        assert_eq!(
            surface_dissonance(&[PitchClass::C, PitchClass::E], &triad),
            Ok(0)
        );
        assert_eq!(
            surface_dissonance(&[PitchClass::D, PitchClass::F_SHARP, PitchClass::A_SHARP], &triad),
            Ok(2 + 1 + 2)
        );
        assert_eq!(
            surface_dissonance(&[PitchClass::D], &PitchClassSet::EMPTY),
            Err(Error::Empty("chord"))
        );
    }

    #[test]
    fn test_melodic_attraction() {
        let c = Key::major(PitchClass::C);
        assert_eq!(melodic_attraction(PitchClass::C, PitchClass::C, c), 0.0);
        // leading tone resolves up to the tonic
        assert_eq!(melodic_attraction(PitchClass::B, PitchClass::C, c), 5.0);
        assert_eq!(melodic_attraction(PitchClass::D, PitchClass::C, c), 5.0 / 4.0);
        // same distance, more stable target
        assert!(
            melodic_attraction(PitchClass::B, PitchClass::C, c)
                > melodic_attraction(PitchClass::E, PitchClass::F, c)
        );
        // decreasing in distance
        let attractions = (1..=6)
            .map(|steps| melodic_attraction(PitchClass::C.transpose(steps), PitchClass::C, c))
            .collect::<Vec<_>>();
        for pair in attractions.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }
}
