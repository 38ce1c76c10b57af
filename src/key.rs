//! Key finding by correlating a pitch-class distribution with rotated key profiles
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};

use strum_macros::{Display, IntoStaticStr};

use crate::chroma::Chroma;
use crate::config::{KeyConfig, KeyMethod};
use crate::error::{Error, Result};
use crate::event::{NoteEvent, Tick, span};
use crate::pcs::PitchClassSet;
use crate::pitch::{PITCH_CLASS_COUNT, PitchClass};
use crate::tiv::{TonalIntervalVector, UNIFORM_WEIGHTS};

/// Expected relative weight of each scale degree, tonic first
pub type Profile = [f64; PITCH_CLASS_COUNT];

/// Krumhansl & Kessler (1982) key-fit ratings
const KRUMHANSL_KESSLER_MAJOR: Profile = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const KRUMHANSL_KESSLER_MINOR: Profile = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Temperley (2007) profiles from the Kostka-Payne corpus
const TEMPERLEY_MAJOR: Profile = [
    0.748, 0.060, 0.488, 0.082, 0.670, 0.460, 0.096, 0.715, 0.104, 0.366, 0.057, 0.400,
];
const TEMPERLEY_MINOR: Profile = [
    0.712, 0.084, 0.474, 0.618, 0.049, 0.460, 0.105, 0.747, 0.404, 0.067, 0.133, 0.330,
];

const MAJOR_SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const NATURAL_MINOR_SCALE: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

// Scores closer than this are considered tied
const TIE_RESOLUTION: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Semitones above the tonic, minor uses the natural minor collection
    pub fn scale_steps(&self) -> &'static [u8; 7] {
        match self {
            Self::Major => &MAJOR_SCALE,
            Self::Minor => &NATURAL_MINOR_SCALE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProfileKind {
    #[default]
    #[strum(serialize = "Krumhansl-Kessler")]
    KrumhanslKessler,
    #[strum(serialize = "Temperley")]
    Temperley,
}

impl ProfileKind {
    pub fn profile(&self, mode: Mode) -> &'static Profile {
        match (self, mode) {
            (Self::KrumhanslKessler, Mode::Major) => &KRUMHANSL_KESSLER_MAJOR,
            (Self::KrumhanslKessler, Mode::Minor) => &KRUMHANSL_KESSLER_MINOR,
            (Self::Temperley, Mode::Major) => &TEMPERLEY_MAJOR,
            (Self::Temperley, Mode::Minor) => &TEMPERLEY_MINOR,
        }
    }

    /// Profile for `key`, indexed by pitch class
    pub fn rotated(&self, key: Key) -> Profile {
        let profile = self.profile(key.mode);
        std::array::from_fn(|pc| {
            let degree = key.tonic.interval_to(PitchClass::wrapping(pc as i32));
            profile[usize::from(degree)]
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Key {
    pub tonic: PitchClass,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: PitchClass, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    pub fn major(tonic: PitchClass) -> Self {
        Self::new(tonic, Mode::Major)
    }

    pub fn minor(tonic: PitchClass) -> Self {
        Self::new(tonic, Mode::Minor)
    }

    /// All 24 keys, majors first, each in chromatic order
    pub fn all() -> impl Iterator<Item = Key> {
        [Mode::Major, Mode::Minor]
            .into_iter()
            .flat_map(|mode| PitchClass::iter().map(move |tonic| Self::new(tonic, mode)))
    }

    /// Diatonic collection of the key
    pub fn scale(&self) -> PitchClassSet {
        self.mode
            .scale_steps()
            .iter()
            .map(|step| self.tonic.transpose(i32::from(*step)))
            .collect()
    }

    /// Scale degree 1-7 of a diatonic pitch class
    pub fn degree_of(&self, pc: PitchClass) -> Option<u8> {
        let steps = self.tonic.interval_to(pc);
        self.mode
            .scale_steps()
            .iter()
            .position(|step| *step == steps)
            .map(|index| index as u8 + 1)
    }

    /// Tonic of the major key sharing this key's collection
    pub fn relative_major_tonic(&self) -> PitchClass {
        match self.mode {
            Mode::Major => self.tonic,
            Mode::Minor => self.tonic.transpose(3),
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeyCandidate {
    pub key: Key,
    pub score: f64,
}

/// The winning key and every key ranked best first
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeyEstimate {
    pub key: Key,
    /// Score of the winning key, a correlation for profile matching
    pub confidence: f64,
    pub candidates: Vec<KeyCandidate>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindowedKey {
    pub start: Tick,
    pub estimate: Option<KeyEstimate>,
}

/// Pearson correlation, 0 when either side has no variance
pub fn pearson_correlation(a: &[f64; PITCH_CLASS_COUNT], b: &[f64; PITCH_CLASS_COUNT]) -> f64 {
    let n = PITCH_CLASS_COUNT as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        numerator += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    let denominator = (variance_a * variance_b).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Orders candidates best first
///
/// Candidates whose scores lie within [`TIE_RESOLUTION`] of their neighbor in descending order
/// form a tie. Within a tie the key whose tonic lies in the scales of more of the other tied
/// keys comes first, then the lower tonic, then major before minor.
fn rank_candidates(mut candidates: Vec<KeyCandidate>) -> Vec<KeyCandidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut ties: Vec<Vec<KeyCandidate>> = Vec::new();
    for candidate in candidates {
        match ties.last_mut() {
            Some(tie)
                if tie
                    .last()
                    .is_some_and(|previous| previous.score - candidate.score < TIE_RESOLUTION) =>
            {
                tie.push(candidate)
            }
            _ => ties.push(vec![candidate]),
        }
    }
    ties.into_iter().flat_map(order_tie).collect()
}

fn order_tie(tie: Vec<KeyCandidate>) -> Vec<KeyCandidate> {
    if tie.len() < 2 {
        return tie;
    }
    let scales = tie
        .iter()
        .map(|candidate| candidate.key.scale())
        .collect::<Vec<_>>();
    let mut keyed = tie
        .iter()
        .map(|candidate| {
            let support = tie
                .iter()
                .zip(&scales)
                .filter(|(other, scale)| {
                    other.key != candidate.key && scale.contains(candidate.key.tonic)
                })
                .count();
            (
                (Reverse(support), candidate.key.tonic, candidate.key.mode),
                *candidate,
            )
        })
        .collect::<Vec<_>>();
    keyed.sort_by_key(|(order, _)| *order);
    keyed.into_iter().map(|(_, candidate)| candidate).collect()
}

fn estimate(candidates: Vec<KeyCandidate>) -> Option<KeyEstimate> {
    let ranked = rank_candidates(candidates);
    let best = ranked.first()?;
    Some(KeyEstimate {
        key: best.key,
        confidence: best.score,
        candidates: ranked,
    })
}

/// Krumhansl-Schmuckler key finding on a chroma, `None` when it is silent
pub fn detect_key_from_chroma(chroma: &Chroma, profiles: ProfileKind) -> Option<KeyEstimate> {
    if chroma.is_silent() {
        log::warn!("no sounding pitch classes, cannot estimate a key");
        return None;
    }
    let observed = chroma.as_array();
    let candidates = Key::all()
        .map(|key| KeyCandidate {
            key,
            score: pearson_correlation(observed, &profiles.rotated(key)),
        })
        .collect();
    estimate(candidates)
}

/// Key finding by distance between tonal interval vectors
///
/// Both the observed chroma and each rotated profile are normalized before the transform, so
/// doubling pitch classes in other octaves does not move the estimate. Scores are `1 / (1 + d)`.
pub fn detect_key_tiv(chroma: &Chroma, profiles: ProfileKind) -> Option<KeyEstimate> {
    if chroma.is_silent() {
        log::warn!("no sounding pitch classes, cannot estimate a key");
        return None;
    }
    let observed = TonalIntervalVector::from_chroma_normalized(chroma);
    let candidates = Key::all()
        .map(|key| {
            let profile = profiles.rotated(key);
            let total: f64 = profile.iter().sum();
            let reference = TonalIntervalVector::from_weights(&profile.map(|w| w / total));
            let distance = observed.distance(&reference, &UNIFORM_WEIGHTS);
            KeyCandidate {
                key,
                score: 1.0 / (1.0 + distance),
            }
        })
        .collect();
    estimate(candidates)
}

fn detect_key_with(chroma: &Chroma, config: &KeyConfig) -> Option<KeyEstimate> {
    match config.method {
        KeyMethod::Profile => detect_key_from_chroma(chroma, config.profiles),
        KeyMethod::Tiv => detect_key_tiv(chroma, config.profiles),
    }
}

/// Key of a whole passage
pub fn detect_key(events: &[NoteEvent], config: &KeyConfig) -> Option<KeyEstimate> {
    let chroma = Chroma::from_events(events, config.weighting);
    detect_key_with(&chroma, config)
}

/// One independent estimate per window of `config.window` ticks
///
/// Windows are aligned to multiples of the window size and cover every event. Windows where
/// nothing sounds carry no estimate.
pub fn detect_key_windowed(events: &[NoteEvent], config: &KeyConfig) -> Result<Vec<WindowedKey>> {
    if config.window == 0 {
        return Err(Error::ZeroDivision("key window"));
    }
    let Some((first, last)) = span(events) else {
        return Ok(Vec::new());
    };

    let mut windows = Vec::new();
    let mut start = first - first % config.window;
    while start < last.max(first + 1) {
        let end = start.saturating_add(config.window);
        let chroma = Chroma::from_events_in(events, start, end, config.weighting);
        let estimate = if chroma.is_silent() {
            log::trace!("window at {start} is silent");
            None
        } else {
            detect_key_with(&chroma, config)
        };
        if let Some(estimate) = &estimate {
            log::debug!(
                "window at {start}: {} ({:.3})",
                estimate.key,
                estimate.confidence
            );
        }
        windows.push(WindowedKey { start, estimate });
        start = end;
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chroma::Weighting;

    fn assert_approx_eq(actual: f64, expected: f64, epsilon: f64) {
        assert!(
            (actual - expected).abs() < epsilon,
            "Expected {expected}, got {actual} (difference: {difference})",
            difference = (actual - expected).abs()
        );
    }

    fn chroma(values: &[i32]) -> Chroma {
        Chroma::from_set(&PitchClassSet::from_integers(values.iter().copied()))
    }

    fn note(midi: u8, onset: Tick, duration: Tick) -> NoteEvent {
        NoteEvent::new(midi, onset, duration, 100).unwrap()
    }

    #[test]
    fn test_pearson() {
        let a = std::array::from_fn(|i| i as f64);
        let b = std::array::from_fn(|i| 2.0 * i as f64 + 1.0);
        let c = std::array::from_fn(|i| -(i as f64));
        assert_approx_eq(pearson_correlation(&a, &b), 1.0, 1e-12);
        assert_approx_eq(pearson_correlation(&a, &c), -1.0, 1e-12);
        assert_eq!(pearson_correlation(&a, &[3.0; 12]), 0.0);
    }

    #[test]
    fn test_key_scales() {
        assert_eq!(
            Key::major(PitchClass::G).scale(),
            PitchClassSet::from_integers([7, 9, 11, 0, 2, 4, 6])
        );
        assert_eq!(
            Key::minor(PitchClass::A).scale(),
            Key::major(PitchClass::C).scale()
        );
        assert_eq!(Key::minor(PitchClass::A).relative_major_tonic(), PitchClass::C);
        assert_eq!(Key::major(PitchClass::D).degree_of(PitchClass::A), Some(5));
        assert_eq!(Key::major(PitchClass::D).degree_of(PitchClass::C), None);
        assert_eq!(Key::all().count(), 24);
        assert_eq!(Key::minor(PitchClass::F_SHARP).to_string(), "F# minor");
    }

    #[test]
    fn test_rotated_profile() {
        let g_major = ProfileKind::KrumhanslKessler.rotated(Key::major(PitchClass::G));
        assert_eq!(g_major[7], 6.35);
        assert_eq!(g_major[2], 5.19);
        assert_eq!(g_major[8], 2.23);
    }

    #[test]
    fn test_c_major_scale() {
        let estimate =
            detect_key_from_chroma(&chroma(&[0, 2, 4, 5, 7, 9, 11]), ProfileKind::KrumhanslKessler)
                .unwrap();
        assert_eq!(estimate.key, Key::major(PitchClass::C));
        assert_approx_eq(estimate.confidence, 0.7564, 1e-3);
        assert_eq!(estimate.candidates.len(), 24);
        assert_eq!(estimate.candidates[1].key, Key::minor(PitchClass::A));
        assert_eq!(estimate.candidates[2].key, Key::major(PitchClass::G));
        for candidate in &estimate.candidates[1..] {
            assert!(candidate.score < estimate.confidence);
        }

        let temperley =
            detect_key_from_chroma(&chroma(&[0, 2, 4, 5, 7, 9, 11]), ProfileKind::Temperley)
                .unwrap();
        assert_eq!(temperley.key, Key::major(PitchClass::C));
    }

    #[test]
    fn test_harmonic_minor() {
        let estimate = detect_key_from_chroma(
            &chroma(&[9, 11, 0, 2, 4, 5, 8]),
            ProfileKind::KrumhanslKessler,
        )
        .unwrap();
        assert_eq!(estimate.key, Key::minor(PitchClass::A));
    }

    #[test]
    fn test_silence_has_no_key() {
        assert_eq!(
            detect_key_from_chroma(&Chroma::SILENT, ProfileKind::KrumhanslKessler),
            None
        );
        assert_eq!(detect_key_tiv(&Chroma::SILENT, ProfileKind::KrumhanslKessler), None);
        assert_eq!(detect_key(&[], &KeyConfig::default()), None);
    }

    #[test]
    fn test_uniform_chroma_tie_break() {
        let uniform = Chroma::from_weights([1.0; 12]).unwrap();
        let estimate = detect_key_from_chroma(&uniform, ProfileKind::KrumhanslKessler).unwrap();
        let order = estimate
            .candidates
            .iter()
            .take(4)
            .map(|candidate| candidate.key)
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                Key::major(PitchClass::C),
                Key::minor(PitchClass::C),
                Key::major(PitchClass::C_SHARP),
                Key::minor(PitchClass::C_SHARP),
            ]
        );
    }

    #[test]
    fn test_tritone_tie_prefers_lower_tonic() {
        let estimate =
            detect_key_from_chroma(&chroma(&[0, 6]), ProfileKind::KrumhanslKessler).unwrap();
        assert_eq!(estimate.candidates[0].key, Key::major(PitchClass::C));
        assert_eq!(estimate.candidates[1].key, Key::major(PitchClass::F_SHARP));
        assert_approx_eq(
            estimate.candidates[0].score,
            estimate.candidates[1].score,
            1e-12,
        );
    }

    #[test]
    fn test_tie_prefers_circle_of_fifths_support() {
        let candidates = [
            Key::major(PitchClass::C),
            Key::minor(PitchClass::A),
            Key::major(PitchClass::E),
        ]
        .map(|key| KeyCandidate { key, score: 0.5 })
        .to_vec();
        let ranked = rank_candidates(candidates)
            .into_iter()
            .map(|candidate| candidate.key)
            .collect::<Vec<_>>();
        // E and A each lie in both other scales, C only in A minor
        assert_eq!(
            ranked,
            vec![
                Key::major(PitchClass::E),
                Key::minor(PitchClass::A),
                Key::major(PitchClass::C),
            ]
        );
    }

    #[test]
    fn test_near_equal_scores_across_rounding_boundary_tie() {
        // 0.5 + 0.49e-9 and 0.5 + 0.51e-9 round to different multiples of 1e-9
        let candidates = vec![
            KeyCandidate {
                key: Key::major(PitchClass::C),
                score: 0.5 + 0.51e-9,
            },
            KeyCandidate {
                key: Key::major(PitchClass::E),
                score: 0.5 + 0.49e-9,
            },
        ];
        let ranked = rank_candidates(candidates);
        assert_eq!(ranked[0].key, Key::major(PitchClass::E));
        assert_eq!(ranked[1].key, Key::major(PitchClass::C));
    }

    #[test]
    fn test_clearly_better_score_wins_over_support() {
        let candidates = vec![
            KeyCandidate {
                key: Key::major(PitchClass::C),
                score: 0.5 + 1e-6,
            },
            KeyCandidate {
                key: Key::major(PitchClass::E),
                score: 0.5,
            },
        ];
        let ranked = rank_candidates(candidates);
        assert_eq!(ranked[0].key, Key::major(PitchClass::C));
    }

    #[test]
    fn test_tiv_variant() {
        let profiles = ProfileKind::KrumhanslKessler;
        let scale = detect_key_tiv(&chroma(&[0, 2, 4, 5, 7, 9, 11]), profiles).unwrap();
        assert_eq!(scale.key, Key::major(PitchClass::C));
        let minor = detect_key_tiv(&chroma(&[9, 11, 0, 2, 4, 5, 8]), profiles).unwrap();
        assert_eq!(minor.key, Key::minor(PitchClass::A));
        let triad = detect_key_tiv(&chroma(&[0, 4, 7]), profiles).unwrap();
        assert_eq!(triad.key, Key::major(PitchClass::C));
    }

    #[test]
    fn test_detect_key_from_events() {
        let events = [60, 62, 64, 65, 67, 69, 71, 72]
            .iter()
            .enumerate()
            .map(|(i, midi)| note(*midi, i as Tick * 480, 480))
            .collect::<Vec<_>>();
        let estimate = detect_key(&events, &KeyConfig::default()).unwrap();
        assert_eq!(estimate.key, Key::major(PitchClass::C));
    }

    #[test]
    fn test_windowed() {
        let config = KeyConfig {
            window: 960,
            weighting: Weighting::Duration,
            ..KeyConfig::default()
        };
        let mut events = [60, 64, 67, 72]
            .iter()
            .map(|midi| note(*midi, 0, 960))
            .collect::<Vec<_>>();
        events.extend([66, 70, 73].iter().map(|midi| note(*midi, 2880, 960)));
        let windows = detect_key_windowed(&events, &config).unwrap();
        assert_eq!(
            windows.iter().map(|window| window.start).collect::<Vec<_>>(),
            vec![0, 960, 1920, 2880]
        );
        assert_eq!(
            windows[0].estimate.as_ref().map(|estimate| estimate.key),
            Some(Key::major(PitchClass::C))
        );
        assert!(windows[1].estimate.is_none());
        assert!(windows[2].estimate.is_none());
        assert_eq!(
            windows[3].estimate.as_ref().map(|estimate| estimate.key),
            Some(Key::major(PitchClass::F_SHARP))
        );

        let zero = KeyConfig {
            window: 0,
            ..KeyConfig::default()
        };
        assert_eq!(
            detect_key_windowed(&events, &zero),
            Err(Error::ZeroDivision("key window"))
        );
        assert_eq!(detect_key_windowed(&[], &config), Ok(Vec::new()));
    }
}
