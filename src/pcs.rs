use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_2;
use std::fmt::{Debug, Display, Formatter};

use bitvec::{BitArr, order::Msb0};
use itertools::Itertools;

use crate::error::Error;
use crate::pitch::{PITCH_CLASS_COUNT, PitchClass};

/// Membership bits, one per pitch class
type PitchClassBits = BitArr!(for 12, in u16, Msb0);

/// Number of interval classes (1-6)
pub const INTERVAL_CLASS_COUNT: usize = 6;

/// Count of each interval class 1-6 among all unordered pairs of a set
pub type IntervalClassVector = [u32; INTERVAL_CLASS_COUNT];

/// An unordered set of unique pitch classes
///
/// Duplicates collapse on construction and the set is never mutated afterwards,
/// every operation returns a new set.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<u8>", into = "Vec<u8>")
)]
pub struct PitchClassSet {
    bits: PitchClassBits,
}

impl PitchClassSet {
    pub const EMPTY: Self = Self {
        bits: PitchClassBits::ZERO,
    };

    /// All twelve pitch classes
    pub fn chromatic() -> Self {
        PitchClass::iter().collect()
    }

    /// Build from arbitrary integers, normalizing each into 0-11
    pub fn from_integers(values: impl IntoIterator<Item = i32>) -> Self {
        values.into_iter().map(PitchClass::wrapping).collect()
    }

    /// Build from a 12-bit mask where bit `n` marks pitch class `n`
    pub fn from_mask(mask: u16) -> Self {
        PitchClass::iter()
            .filter(|pc| mask & (1 << pc.index()) != 0)
            .collect()
    }

    /// 12-bit mask where bit `n` marks pitch class `n`
    pub fn mask(&self) -> u16 {
        self.iter().fold(0, |mask, pc| mask | (1 << pc.index()))
    }

    pub fn contains(&self, pc: PitchClass) -> bool {
        self.bits[pc.index()]
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = PitchClass> + Clone + '_ {
        self.bits
            .iter_ones()
            .map(|index| PitchClass::wrapping(index as i32))
    }

    pub fn to_vec(&self) -> Vec<PitchClass> {
        self.iter().collect()
    }

    pub fn with(mut self, pc: PitchClass) -> Self {
        self.bits.set(pc.index(), true);
        self
    }

    pub fn union(&self, other: &Self) -> Self {
        self.iter().chain(other.iter()).collect()
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.iter().filter(|pc| other.contains(*pc)).collect()
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.iter().all(|pc| other.contains(pc))
    }

    /// Shared members over all members, 0 when both are empty
    pub fn jaccard(&self, other: &Self) -> f64 {
        let union = self.union(other).len();
        if union == 0 {
            return 0.0;
        }
        self.intersection(other).len() as f64 / union as f64
    }

    /// T(n)
    pub fn transpose(&self, semitones: i32) -> Self {
        self.iter().map(|pc| pc.transpose(semitones)).collect()
    }

    /// I(0), reflects every member around C
    pub fn invert(&self) -> Self {
        self.iter()
            .map(|pc| PitchClass::wrapping(-i32::from(pc.value())))
            .collect()
    }

    pub fn complement(&self) -> Self {
        PitchClass::iter().filter(|pc| !self.contains(*pc)).collect()
    }

    /// The most tightly packed rotation of the set
    ///
    /// Rotations are ranked by their span from first to last member, then by the distance
    /// of each successive member from the first one. Sets with several equally packed
    /// rotations (symmetrical sets) start from the lowest pitch class.
    pub fn normal_form(&self) -> Vec<PitchClass> {
        let members = self.to_vec();
        let Some(rotation) = (0..members.len()).min_by(|&a, &b| {
            compare_packing(
                &rotation_offsets(&members, a),
                &rotation_offsets(&members, b),
            )
            .then_with(|| members[a].cmp(&members[b]))
        }) else {
            return Vec::new();
        };
        members[rotation..]
            .iter()
            .chain(&members[..rotation])
            .copied()
            .collect()
    }

    /// Normal form of the set or of its inversion, whichever is more packed, transposed to 0
    pub fn prime_form(&self) -> Self {
        let original = zero_based_offsets(&self.normal_form());
        let inverted = zero_based_offsets(&self.invert().normal_form());
        let best = match compare_packing(&inverted, &original) {
            Ordering::Less => inverted,
            _ => original,
        };
        Self::from_integers(best.into_iter().map(i32::from))
    }

    /// Counts of interval classes 1-6 over all unordered pairs
    pub fn interval_class_vector(&self) -> IntervalClassVector {
        let mut vector = [0; INTERVAL_CLASS_COUNT];
        for (a, b) in self.iter().tuple_combinations() {
            let class = a.semitone_distance(b);
            vector[usize::from(class) - 1] += 1;
        }
        vector
    }

    /// Cosine of the angle between the two interval-class vectors
    ///
    /// Two sets without intervals are identical (1.0), one without intervals is
    /// orthogonal to everything else (0.0).
    pub fn cosine_similarity(&self, other: &Self) -> f64 {
        let a = icv_as_f64(&self.interval_class_vector());
        let b = icv_as_f64(&other.interval_class_vector());
        let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
        match (norm_a == 0.0, norm_b == 0.0) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.0,
            (false, false) => {
                let dot: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
                (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
            }
        }
    }

    /// 1 - angle / (pi/2) between interval-class vectors, in 0-1
    ///
    /// Interval-class vectors are non-negative so the angle never exceeds a right angle.
    pub fn angle_similarity(&self, other: &Self) -> f64 {
        let angle = self.cosine_similarity(other).acos();
        (1.0 - angle / FRAC_PI_2).clamp(0.0, 1.0)
    }

    /// Earth mover's distance between the interval-class distributions of the two sets
    ///
    /// Each vector is normalized to sum 1 and mass moves along the ordered ic1..ic6 axis,
    /// so the result lies in 0-5. A set without intervals is 5 away from any set that has
    /// some, and 0 away from another interval-free set.
    pub fn earth_movers_distance(&self, other: &Self) -> f64 {
        const MAX_DISTANCE: f64 = (INTERVAL_CLASS_COUNT - 1) as f64;
        let a = icv_as_f64(&self.interval_class_vector());
        let b = icv_as_f64(&other.interval_class_vector());
        let total_a: f64 = a.iter().sum();
        let total_b: f64 = b.iter().sum();
        match (total_a == 0.0, total_b == 0.0) {
            (true, true) => 0.0,
            (true, false) | (false, true) => MAX_DISTANCE,
            (false, false) => {
                let mut carried = 0.0;
                let mut work = 0.0;
                for (x, y) in a.iter().zip(&b) {
                    carried += x / total_a - y / total_b;
                    work += f64::abs(carried);
                }
                work
            }
        }
    }
}

impl Default for PitchClassSet {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Ord for PitchClassSet {
    /// Smaller sets first, then by ascending members
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.iter().cmp(other.iter()))
    }
}

impl PartialOrd for PitchClassSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<T: IntoIterator<Item = PitchClass>>(iter: T) -> Self {
        let mut bits = PitchClassBits::ZERO;
        for pc in iter {
            bits.set(pc.index(), true);
        }
        Self { bits }
    }
}

impl From<&[PitchClass]> for PitchClassSet {
    fn from(pcs: &[PitchClass]) -> Self {
        pcs.iter().copied().collect()
    }
}

impl TryFrom<Vec<u8>> for PitchClassSet {
    type Error = Error;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        values.into_iter().map(PitchClass::try_new).collect()
    }
}

impl From<PitchClassSet> for Vec<u8> {
    fn from(set: PitchClassSet) -> Self {
        set.iter().map(PitchClass::value).collect()
    }
}

impl Display for PitchClassSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.iter().map(PitchClass::value).join(","))
    }
}

impl Debug for PitchClassSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PitchClassSet{self}")
    }
}

/// Ascending offsets of the rotation starting at `start`, relative to its first member
fn rotation_offsets(members: &[PitchClass], start: usize) -> Vec<u8> {
    let first = members[start];
    members[start..]
        .iter()
        .chain(&members[..start])
        .map(|pc| first.interval_to(*pc))
        .collect()
}

fn zero_based_offsets(ordered: &[PitchClass]) -> Vec<u8> {
    match ordered.first() {
        Some(first) => ordered.iter().map(|pc| first.interval_to(*pc)).collect(),
        None => Vec::new(),
    }
}

/// Smaller is more packed: outer span first, then distance of each member from the start
fn compare_packing(a: &[u8], b: &[u8]) -> Ordering {
    a.last()
        .cmp(&b.last())
        .then_with(|| a.iter().cmp(b.iter()))
}

fn icv_as_f64(vector: &IntervalClassVector) -> [f64; INTERVAL_CLASS_COUNT] {
    vector.map(f64::from)
}

/// Every one of the 4096 subsets of the chromatic aggregate
pub fn all_sets() -> impl Iterator<Item = PitchClassSet> {
    (0..1u16 << PITCH_CLASS_COUNT).map(PitchClassSet::from_mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[i32]) -> PitchClassSet {
        PitchClassSet::from_integers(values.iter().copied())
    }

    fn values(pcs: &[PitchClass]) -> Vec<u8> {
        pcs.iter().map(|pc| pc.value()).collect()
    }

    fn assert_approx_eq(actual: f64, expected: f64, epsilon: f64) {
        assert!(
            (actual - expected).abs() < epsilon,
            "Expected {expected}, got {actual} (difference: {difference})",
            difference = (actual - expected).abs()
        );
    }

    #[test]
    fn test_construction_normalizes_and_deduplicates() {
        let s = set(&[12, 4, -5, 7, 16, 0]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.to_string(), "[0,4,7]");
        assert_eq!(s, set(&[7, 4, 0]));
        assert!(PitchClassSet::EMPTY.is_empty());
        assert_eq!(PitchClassSet::chromatic().len(), 12);
    }

    #[test]
    fn test_mask_round_trip() {
        for s in all_sets().step_by(37) {
            assert_eq!(PitchClassSet::from_mask(s.mask()), s);
        }
        assert_eq!(set(&[0, 2]).mask(), 0b101);
    }

    #[test]
    fn test_normal_form() {
        assert_eq!(values(&set(&[7, 0, 4]).normal_form()), vec![0, 4, 7]);
        // dominant seventh on G packs from B
        assert_eq!(values(&set(&[7, 11, 2, 5]).normal_form()), vec![11, 2, 5, 7]);
        // symmetrical sets start from the lowest member
        assert_eq!(values(&set(&[0, 4, 8]).normal_form()), vec![0, 4, 8]);
        assert_eq!(values(&set(&[11, 3, 7]).normal_form()), vec![3, 7, 11]);
        assert!(PitchClassSet::EMPTY.normal_form().is_empty());
        assert_eq!(values(&set(&[5]).normal_form()), vec![5]);
    }

    #[test]
    fn test_prime_form() {
        assert_eq!(set(&[0, 4, 7]).prime_form(), set(&[0, 3, 7]));
        assert_eq!(set(&[0, 3, 7]).prime_form(), set(&[0, 3, 7]));
        assert_eq!(set(&[7, 11, 2, 5]).prime_form(), set(&[0, 2, 5, 8]));
        assert_eq!(set(&[1, 2, 3]).prime_form(), set(&[0, 1, 2]));
        assert_eq!(PitchClassSet::EMPTY.prime_form(), PitchClassSet::EMPTY);
    }

    #[test]
    fn test_prime_form_is_transposition_and_inversion_invariant() {
        for s in all_sets() {
            let prime = s.prime_form();
            assert_eq!(prime.prime_form(), prime, "prime form of {s} is not stable");
            assert_eq!(s.transpose(5).prime_form(), prime);
            assert_eq!(s.invert().prime_form(), prime);
            if !s.is_empty() {
                assert!(prime.contains(PitchClass::C));
            }
        }
    }

    #[test]
    fn test_interval_class_vector() {
        assert_eq!(set(&[0, 4, 7]).interval_class_vector(), [0, 0, 1, 1, 1, 0]);
        assert_eq!(
            set(&[0, 2, 4, 5, 7, 9, 11]).interval_class_vector(),
            [2, 5, 4, 3, 6, 1]
        );
        assert_eq!(PitchClassSet::chromatic().interval_class_vector(), [12, 12, 12, 12, 12, 6]);
        assert_eq!(set(&[3]).interval_class_vector(), [0; 6]);
    }

    #[test]
    fn test_interval_class_vector_survives_prime_form() {
        for s in all_sets() {
            assert_eq!(s.interval_class_vector(), s.prime_form().interval_class_vector());
        }
    }

    #[test]
    fn test_similarity_is_symmetric_and_maximal_on_identity() {
        let samples = [
            set(&[0, 4, 7]),
            set(&[0, 3, 7]),
            set(&[0, 1, 2]),
            set(&[0, 2, 4, 6, 8, 10]),
            set(&[0, 1, 4, 6]),
            set(&[5]),
            PitchClassSet::EMPTY,
        ];
        for a in &samples {
            assert_approx_eq(a.cosine_similarity(a), 1.0, 1e-12);
            assert_approx_eq(a.angle_similarity(a), 1.0, 1e-6);
            assert_approx_eq(a.earth_movers_distance(a), 0.0, 1e-12);
            for b in &samples {
                assert_approx_eq(a.cosine_similarity(b), b.cosine_similarity(a), 1e-12);
                assert_approx_eq(a.angle_similarity(b), b.angle_similarity(a), 1e-12);
                assert_approx_eq(a.earth_movers_distance(b), b.earth_movers_distance(a), 1e-12);
                assert!(a.cosine_similarity(b) <= 1.0 + 1e-12);
                assert!(a.angle_similarity(b) <= a.angle_similarity(a) + 1e-6);
                assert!(a.earth_movers_distance(b) >= 0.0);
            }
        }
    }

    #[test]
    fn test_z_related_sets_are_indistinguishable_by_interval_content() {
        let z15 = set(&[0, 1, 4, 6]);
        let z29 = set(&[0, 1, 3, 7]);
        assert_ne!(z15.prime_form(), z29.prime_form());
        assert_approx_eq(z15.cosine_similarity(&z29), 1.0, 1e-12);
        assert_approx_eq(z15.earth_movers_distance(&z29), 0.0, 1e-12);
    }

    #[test]
    fn test_earth_movers_distance() {
        // all mass on ic1 vs all mass on ic6
        let semitone = set(&[0, 1]);
        let tritone = set(&[0, 6]);
        assert_approx_eq(semitone.earth_movers_distance(&tritone), 5.0, 1e-12);
        assert_approx_eq(semitone.earth_movers_distance(&set(&[0, 2])), 1.0, 1e-12);
        assert_approx_eq(set(&[4]).earth_movers_distance(&semitone), 5.0, 1e-12);
    }

    #[test]
    fn test_set_operations() {
        let c_major = set(&[0, 4, 7]);
        assert_eq!(c_major.transpose(2), set(&[2, 6, 9]));
        assert_eq!(c_major.invert(), set(&[0, 8, 5]));
        assert_eq!(c_major.complement().len(), 9);
        assert!(c_major.is_subset_of(&set(&[0, 2, 4, 5, 7, 9, 11])));
        assert_eq!(c_major.union(&set(&[7, 11])), set(&[0, 4, 7, 11]));
        assert_eq!(c_major.intersection(&set(&[7, 11])), set(&[7]));
        assert_eq!(PitchClassSet::EMPTY.with(PitchClass::D), set(&[2]));
    }

    #[test]
    fn test_jaccard() {
        let c_major = set(&[0, 4, 7]);
        assert_eq!(c_major.jaccard(&c_major), 1.0);
        assert_eq!(c_major.jaccard(&set(&[0, 4, 7, 10])), 0.75);
        assert_eq!(c_major.jaccard(&set(&[1, 5, 8])), 0.0);
        assert_eq!(PitchClassSet::EMPTY.jaccard(&PitchClassSet::EMPTY), 0.0);
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert_eq!(PitchClassSet::try_from(vec![0, 4, 4, 7]), Ok(set(&[0, 4, 7])));
        assert_eq!(
            PitchClassSet::try_from(vec![0, 12]),
            Err(Error::PitchClassOutOfRange(12))
        );
    }
}
