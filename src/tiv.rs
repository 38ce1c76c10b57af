//! Tonal interval vectors: the first six non-trivial DFT coefficients of a chroma
use std::f64::consts::TAU;

use num_complex::Complex64;
use strum_macros::{Display, IntoStaticStr};

use crate::chroma::Chroma;
use crate::pitch::PITCH_CLASS_COUNT;

pub const TIV_SIZE: usize = 6;

/// Per-coefficient weights applied before measuring distances
pub type TivWeights = [f64; TIV_SIZE];

/// Perceptual weights from Bernardes et al. (2016)
pub const BERNARDES_WEIGHTS: TivWeights = [3.0, 8.0, 11.5, 15.0, 14.5, 7.5];
pub const UNIFORM_WEIGHTS: TivWeights = [1.0; TIV_SIZE];

// Below this a coefficient is treated as zero and its phase reported as 0
const MAGNITUDE_EPSILON: f64 = 1e-9;

/// The musical reading of each coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Coefficient {
    Chromaticity,
    Dyadicity,
    Triadicity,
    DiminishedQuality,
    Diatonicity,
    WholeToneQuality,
}

impl Coefficient {
    pub const ALL: [Self; TIV_SIZE] = [
        Self::Chromaticity,
        Self::Dyadicity,
        Self::Triadicity,
        Self::DiminishedQuality,
        Self::Diatonicity,
        Self::WholeToneQuality,
    ];

    /// DFT bin, 1-6
    pub fn harmonic(&self) -> usize {
        self.index() + 1
    }

    fn index(&self) -> usize {
        match self {
            Self::Chromaticity => 0,
            Self::Dyadicity => 1,
            Self::Triadicity => 2,
            Self::DiminishedQuality => 3,
            Self::Diatonicity => 4,
            Self::WholeToneQuality => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonalIntervalVector {
    coefficients: [Complex64; TIV_SIZE],
}

impl TonalIntervalVector {
    pub const ZERO: Self = Self {
        coefficients: [Complex64::new(0.0, 0.0); TIV_SIZE],
    };

    /// Raw transform of the weights as given
    pub fn from_chroma(chroma: &Chroma) -> Self {
        Self::from_weights(chroma.as_array())
    }

    /// Transform of any twelve per-pitch-class weights, C first
    pub fn from_weights(weights: &[f64; PITCH_CLASS_COUNT]) -> Self {
        let coefficients = std::array::from_fn(|i| {
            let k = (i + 1) as f64;
            weights
                .iter()
                .enumerate()
                .map(|(n, weight)| {
                    let angle = TAU * k * n as f64 / PITCH_CLASS_COUNT as f64;
                    Complex64::new(weight * angle.cos(), weight * angle.sin())
                })
                .sum()
        });
        Self { coefficients }
    }

    /// Transform of the chroma scaled to unit total, so loudness and length do not matter.
    /// A silent chroma gives [`Self::ZERO`].
    pub fn from_chroma_normalized(chroma: &Chroma) -> Self {
        match chroma.to_distribution() {
            Ok(distribution) => Self::from_chroma(&distribution.to_chroma()),
            Err(_) => Self::ZERO,
        }
    }

    pub fn coefficient(&self, coefficient: Coefficient) -> Complex64 {
        self.coefficients[coefficient.index()]
    }

    pub fn coefficients(&self) -> &[Complex64; TIV_SIZE] {
        &self.coefficients
    }

    pub fn magnitudes(&self) -> [f64; TIV_SIZE] {
        self.coefficients.map(|c| c.norm())
    }

    /// Phases in radians, 0 wherever the magnitude vanishes
    pub fn phases(&self) -> [f64; TIV_SIZE] {
        self.coefficients.map(|c| {
            if c.norm() < MAGNITUDE_EPSILON {
                0.0
            } else {
                c.arg()
            }
        })
    }

    /// (magnitude, phase) for coefficients 1 through 6
    pub fn pairs(&self) -> [(f64, f64); TIV_SIZE] {
        let magnitudes = self.magnitudes();
        let phases = self.phases();
        std::array::from_fn(|i| (magnitudes[i], phases[i]))
    }

    /// Sum of magnitudes
    pub fn energy(&self) -> f64 {
        self.magnitudes().iter().sum()
    }

    /// Share of the energy in the diatonic coefficient, in [0,1]
    pub fn consonance(&self) -> f64 {
        let energy = self.energy();
        if energy < MAGNITUDE_EPSILON {
            return 0.0;
        }
        self.coefficient(Coefficient::Diatonicity).norm() / energy
    }

    /// Euclidean distance between the weighted coefficient vectors
    pub fn distance(&self, other: &Self, weights: &TivWeights) -> f64 {
        self.coefficients
            .iter()
            .zip(&other.coefficients)
            .zip(weights)
            .map(|((a, b), weight)| (a - b).scale(*weight).norm_sqr())
            .sum::<f64>()
            .sqrt()
    }
}

/// Distance between the normalized TIVs of two chroma vectors
pub fn tiv_distance(a: &Chroma, b: &Chroma, weights: &TivWeights) -> f64 {
    TonalIntervalVector::from_chroma_normalized(a)
        .distance(&TonalIntervalVector::from_chroma_normalized(b), weights)
}
