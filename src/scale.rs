use strum_macros::{Display, IntoStaticStr};

use crate::config::ScaleConfig;
use crate::event::NoteEvent;
use crate::pcs::PitchClassSet;
use crate::pitch::PitchClass;

const MIN_EVENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScaleKind {
    #[strum(serialize = "major")]
    Major,
    #[strum(serialize = "natural minor")]
    NaturalMinor,
    #[strum(serialize = "harmonic minor")]
    HarmonicMinor,
    #[strum(serialize = "melodic minor")]
    MelodicMinor,
    #[strum(serialize = "dorian")]
    Dorian,
    #[strum(serialize = "phrygian")]
    Phrygian,
    #[strum(serialize = "lydian")]
    Lydian,
    #[strum(serialize = "mixolydian")]
    Mixolydian,
    #[strum(serialize = "locrian")]
    Locrian,
    #[strum(serialize = "major pentatonic")]
    MajorPentatonic,
    #[strum(serialize = "minor pentatonic")]
    MinorPentatonic,
    #[strum(serialize = "whole tone")]
    WholeTone,
    #[strum(serialize = "octatonic")]
    Octatonic,
    #[strum(serialize = "chromatic")]
    Chromatic,
}

impl ScaleKind {
    pub const ALL: [Self; 14] = [
        Self::Major,
        Self::NaturalMinor,
        Self::HarmonicMinor,
        Self::MelodicMinor,
        Self::Dorian,
        Self::Phrygian,
        Self::Lydian,
        Self::Mixolydian,
        Self::Locrian,
        Self::MajorPentatonic,
        Self::MinorPentatonic,
        Self::WholeTone,
        Self::Octatonic,
        Self::Chromatic,
    ];

    /// Semitones above the tonic
    pub fn steps(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            Self::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Self::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Self::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Self::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Self::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Self::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Self::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            Self::MajorPentatonic => &[0, 2, 4, 7, 9],
            Self::MinorPentatonic => &[0, 3, 5, 7, 10],
            Self::WholeTone => &[0, 2, 4, 6, 8, 10],
            Self::Octatonic => &[0, 1, 3, 4, 6, 7, 9, 10],
            Self::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    pub fn pitch_classes(&self, tonic: PitchClass) -> PitchClassSet {
        self.steps()
            .iter()
            .map(|step| tonic.transpose(i32::from(*step)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScaleMatch {
    pub tonic: PitchClass,
    pub kind: ScaleKind,
    /// Jaccard similarity between the observed pitch classes and the scale
    pub similarity: f64,
}

/// Scale best covering the pitch classes of a melody or passage
///
/// Fewer than three events never identify a scale. Ties prefer the smaller scale, then the
/// earlier kind in [`ScaleKind::ALL`], then the lower tonic.
pub fn identify_scale(events: &[NoteEvent], config: &ScaleConfig) -> Option<ScaleMatch> {
    if events.len() < MIN_EVENTS {
        log::warn!("{} events are too few to identify a scale", events.len());
        return None;
    }
    let observed: PitchClassSet = events.iter().map(NoteEvent::pitch_class).collect();
    identify_scale_from_set(&observed, config)
}

pub fn identify_scale_from_set(
    observed: &PitchClassSet,
    config: &ScaleConfig,
) -> Option<ScaleMatch> {
    let mut best: Option<ScaleMatch> = None;
    for kind in ScaleKind::ALL {
        for tonic in PitchClass::iter() {
            let similarity = observed.jaccard(&kind.pitch_classes(tonic));
            let better = best.is_none_or(|current| {
                similarity > current.similarity
                    || (similarity == current.similarity
                        && kind.steps().len() < current.kind.steps().len())
            });
            if better {
                best = Some(ScaleMatch {
                    tonic,
                    kind,
                    similarity,
                });
            }
        }
    }
    best.filter(|found| found.similarity >= config.min_similarity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Tick;

    fn melody(midi: &[u8]) -> Vec<NoteEvent> {
        midi.iter()
            .enumerate()
            .map(|(i, note)| NoteEvent::new(*note, i as Tick * 240, 240, 90).unwrap())
            .collect()
    }

    fn identify(midi: &[u8]) -> Option<(PitchClass, ScaleKind)> {
        identify_scale(&melody(midi), &ScaleConfig::default())
            .map(|found| (found.tonic, found.kind))
    }

    #[test]
    fn test_too_few_events() {
        assert_eq!(identify(&[60, 64]), None);
        assert_eq!(identify(&[]), None);
    }

    #[test]
    fn test_diatonic_collections() {
        assert_eq!(
            identify(&[60, 62, 64, 65, 67, 69, 71, 72]),
            Some((PitchClass::C, ScaleKind::Major))
        );
        assert_eq!(
            identify(&[57, 59, 60, 62, 64, 65, 68, 69]),
            Some((PitchClass::A, ScaleKind::HarmonicMinor))
        );
        assert_eq!(
            identify(&[62, 64, 65, 67, 69, 71, 72]),
            Some((PitchClass::C, ScaleKind::Major))
        );
    }

    #[test]
    fn test_smaller_scale_wins_ties() {
        assert_eq!(
            identify(&[60, 62, 64, 67, 69]),
            Some((PitchClass::C, ScaleKind::MajorPentatonic))
        );
        // a subset of both C major and C major pentatonic
        let found = identify_scale(&melody(&[60, 62, 64, 67]), &ScaleConfig::default()).unwrap();
        assert_eq!(found.kind, ScaleKind::MajorPentatonic);
        assert_eq!(found.similarity, 0.8);
    }

    #[test]
    fn test_symmetric_scales() {
        assert_eq!(
            identify(&[61, 63, 65, 67, 69, 71]),
            Some((PitchClass::C_SHARP, ScaleKind::WholeTone))
        );
        assert_eq!(
            identify(&(60..72).collect::<Vec<_>>()),
            Some((PitchClass::C, ScaleKind::Chromatic))
        );
    }

    #[test]
    fn test_threshold() {
        assert_eq!(identify(&[60, 61, 62, 66, 67]), None);
        let lenient = ScaleConfig {
            min_similarity: 0.0,
        };
        assert!(identify_scale(&melody(&[60, 61, 62, 66, 67]), &lenient).is_some());
    }
}
