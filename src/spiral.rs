//! Chew's spiral array: pitch classes on a helix ordered by the line of fifths
use std::f64::consts::FRAC_PI_2;
use std::ops::{Add, Mul, Sub};

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::pcs::PitchClassSet;
use crate::pitch::PitchClass;

const RADIUS: f64 = 1.0;
/// Rise per step along the line of fifths
const HEIGHT_PER_FIFTH: f64 = 0.5;
const ANGLE_PER_FIFTH: f64 = FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let d = *self - *other;
        (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Helix point of a pitch class
///
/// Each step along the line of fifths turns a quarter circle and rises 0.5, so a fifth up from
/// anything but C# (the end of the line) is exactly 0.5 higher.
pub fn spiral_array_position(pc: PitchClass) -> Point3 {
    let index = f64::from(pc.fifths_index());
    let angle = index * ANGLE_PER_FIFTH;
    Point3::new(
        RADIUS * angle.cos(),
        RADIUS * angle.sin(),
        index * HEIGHT_PER_FIFTH,
    )
}

/// Weighted centroid of the helix points, uniform weights when `weights` is `None`
///
/// Pitch classes may repeat, each occurrence counts with its own weight.
pub fn center_of_effect(pcs: &[PitchClass], weights: Option<&[f64]>) -> Result<Point3> {
    if pcs.is_empty() {
        return Err(Error::Empty("pitch classes"));
    }
    let uniform;
    let weights = match weights {
        Some(weights) => {
            if weights.len() != pcs.len() {
                return Err(Error::WeightCount {
                    expected: pcs.len(),
                    actual: weights.len(),
                });
            }
            if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(Error::InvalidWeight(bad));
            }
            weights
        }
        None => {
            uniform = vec![1.0; pcs.len()];
            &uniform[..]
        }
    };

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(Error::ZeroWeights);
    }
    let sum = pcs
        .iter()
        .zip(weights)
        .fold(Point3::ORIGIN, |acc, (pc, weight)| {
            acc + spiral_array_position(*pc) * *weight
        });
    Ok(sum * (1.0 / total))
}

fn set_center(set: &PitchClassSet) -> Result<Point3> {
    center_of_effect(&set.to_vec(), None)
}

/// Largest distance between any two distinct pitch classes of the input, 0 below two classes
pub fn cloud_diameter(pcs: &[PitchClass]) -> f64 {
    pcs.iter()
        .unique()
        .map(|pc| spiral_array_position(*pc))
        .tuple_combinations()
        .map(|(a, b)| a.distance(&b))
        .fold(0.0, f64::max)
}

/// Distances between the centers of consecutive chords, one fewer than there are chords
pub fn cloud_momentum(chords: &[PitchClassSet]) -> Result<Vec<f64>> {
    let centers = chords.iter().map(set_center).collect::<Result<Vec<_>>>()?;
    Ok(centers
        .iter()
        .tuple_windows()
        .map(|(a, b)| a.distance(b))
        .collect())
}

/// How far a chord's center pulls away from the center of its scale
pub fn tensile_strain(chord: &PitchClassSet, scale: &PitchClassSet) -> Result<f64> {
    Ok(set_center(chord)?.distance(&set_center(scale)?))
}
