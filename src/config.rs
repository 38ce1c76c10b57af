//! Tunable constants for the analyses, grouped under [`AnalysisConfig`]
use crate::chroma::Weighting;
use crate::event::Tick;
use crate::key::ProfileKind;
use crate::roughness::DEFAULT_HARMONICS;

/// How key candidates are scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KeyMethod {
    /// Pearson correlation with rotated profiles
    #[default]
    Profile,
    /// Distance between tonal interval vectors
    Tiv,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct KeyConfig {
    pub profiles: ProfileKind,
    pub method: KeyMethod,
    pub weighting: Weighting,
    /// Window size for windowed estimates, in ticks
    pub window: Tick,
    /// Windows a new key must hold before it counts as a modulation
    pub modulation_min_windows: usize,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            profiles: ProfileKind::default(),
            method: KeyMethod::default(),
            weighting: Weighting::Duration,
            // one 4/4 bar at 480 ticks per quarter
            window: 1920,
            modulation_min_windows: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TensionConfig {
    /// Distance between samples, in ticks
    pub interval: Tick,
    pub harmonics: usize,
    pub roughness_weight: f64,
    pub tiv_weight: f64,
    /// Neighbors closer than this count as level when looking for peaks
    pub flatness: f64,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self {
            interval: 480,
            harmonics: DEFAULT_HARMONICS,
            roughness_weight: 0.5,
            tiv_weight: 0.5,
            flatness: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ChordConfig {
    /// Lowest Jaccard similarity accepted for an inexact match
    pub min_similarity: f64,
    /// Window for harmonic rhythm, in ticks
    pub window: Tick,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.75,
            window: 960,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ScaleConfig {
    pub min_similarity: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AnalysisConfig {
    pub key: KeyConfig,
    pub tension: TensionConfig,
    pub chord: ChordConfig,
    pub scale: ScaleConfig,
}
