//! Forte set-class catalog
//!
//! Only cardinalities 3-6 are tabulated. Larger classes follow Forte's complement numbering,
//! where n-k is the complement of (12-n)-k, and the trivial small and large classes are
//! enumerated. Every entry is run through [`PitchClassSet::prime_form`] when the catalog is
//! built, so lookups agree with this crate's packing order even where published tables use
//! a different one.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::pcs::{IntervalClassVector, PitchClassSet};
use crate::pitch::PITCH_CLASS_COUNT;

/// A named set class
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SetClass {
    /// Forte name such as "4-Z15"
    pub name: String,
    pub prime_form: PitchClassSet,
    pub interval_class_vector: IntervalClassVector,
}

impl SetClass {
    pub fn cardinality(&self) -> usize {
        self.prime_form.len()
    }

    pub fn is_z_class(&self) -> bool {
        self.name.contains('Z')
    }
}

const TRICHORDS: [(&str, &[i32]); 12] = [
    ("3-1", &[0, 1, 2]),
    ("3-2", &[0, 1, 3]),
    ("3-3", &[0, 1, 4]),
    ("3-4", &[0, 1, 5]),
    ("3-5", &[0, 1, 6]),
    ("3-6", &[0, 2, 4]),
    ("3-7", &[0, 2, 5]),
    ("3-8", &[0, 2, 6]),
    ("3-9", &[0, 2, 7]),
    ("3-10", &[0, 3, 6]),
    ("3-11", &[0, 3, 7]),
    ("3-12", &[0, 4, 8]),
];

const TETRACHORDS: [(&str, &[i32]); 29] = [
    ("4-1", &[0, 1, 2, 3]),
    ("4-2", &[0, 1, 2, 4]),
    ("4-3", &[0, 1, 3, 4]),
    ("4-4", &[0, 1, 2, 5]),
    ("4-5", &[0, 1, 2, 6]),
    ("4-6", &[0, 1, 2, 7]),
    ("4-7", &[0, 1, 4, 5]),
    ("4-8", &[0, 1, 5, 6]),
    ("4-9", &[0, 1, 6, 7]),
    ("4-10", &[0, 2, 3, 5]),
    ("4-11", &[0, 1, 3, 5]),
    ("4-12", &[0, 2, 3, 6]),
    ("4-13", &[0, 1, 3, 6]),
    ("4-14", &[0, 2, 3, 7]),
    ("4-Z15", &[0, 1, 4, 6]),
    ("4-16", &[0, 1, 5, 7]),
    ("4-17", &[0, 3, 4, 7]),
    ("4-18", &[0, 1, 4, 7]),
    ("4-19", &[0, 1, 4, 8]),
    ("4-20", &[0, 1, 5, 8]),
    ("4-21", &[0, 2, 4, 6]),
    ("4-22", &[0, 2, 4, 7]),
    ("4-23", &[0, 2, 5, 7]),
    ("4-24", &[0, 2, 4, 8]),
    ("4-25", &[0, 2, 6, 8]),
    ("4-26", &[0, 3, 5, 8]),
    ("4-27", &[0, 2, 5, 8]),
    ("4-28", &[0, 3, 6, 9]),
    ("4-Z29", &[0, 1, 3, 7]),
];

const PENTACHORDS: [(&str, &[i32]); 38] = [
    ("5-1", &[0, 1, 2, 3, 4]),
    ("5-2", &[0, 1, 2, 3, 5]),
    ("5-3", &[0, 1, 2, 4, 5]),
    ("5-4", &[0, 1, 2, 3, 6]),
    ("5-5", &[0, 1, 2, 3, 7]),
    ("5-6", &[0, 1, 2, 5, 6]),
    ("5-7", &[0, 1, 2, 6, 7]),
    ("5-8", &[0, 2, 3, 4, 6]),
    ("5-9", &[0, 1, 2, 4, 6]),
    ("5-10", &[0, 1, 3, 4, 6]),
    ("5-11", &[0, 2, 3, 4, 7]),
    ("5-Z12", &[0, 1, 3, 5, 6]),
    ("5-13", &[0, 1, 2, 4, 8]),
    ("5-14", &[0, 1, 2, 5, 7]),
    ("5-15", &[0, 1, 2, 6, 8]),
    ("5-16", &[0, 1, 3, 4, 7]),
    ("5-Z17", &[0, 1, 3, 4, 8]),
    ("5-Z18", &[0, 1, 4, 5, 7]),
    ("5-19", &[0, 1, 3, 6, 7]),
    ("5-20", &[0, 1, 5, 6, 8]),
    ("5-21", &[0, 1, 4, 5, 8]),
    ("5-22", &[0, 1, 4, 7, 8]),
    ("5-23", &[0, 2, 3, 5, 7]),
    ("5-24", &[0, 1, 3, 5, 7]),
    ("5-25", &[0, 2, 3, 5, 8]),
    ("5-26", &[0, 2, 4, 5, 8]),
    ("5-27", &[0, 1, 3, 5, 8]),
    ("5-28", &[0, 2, 3, 6, 8]),
    ("5-29", &[0, 1, 3, 6, 8]),
    ("5-30", &[0, 1, 4, 6, 8]),
    ("5-31", &[0, 1, 3, 6, 9]),
    ("5-32", &[0, 1, 4, 6, 9]),
    ("5-33", &[0, 2, 4, 6, 8]),
    ("5-34", &[0, 2, 4, 6, 9]),
    ("5-35", &[0, 2, 4, 7, 9]),
    ("5-Z36", &[0, 1, 2, 4, 7]),
    ("5-Z37", &[0, 3, 4, 5, 8]),
    ("5-Z38", &[0, 1, 2, 5, 8]),
];

const HEXACHORDS: [(&str, &[i32]); 50] = [
    ("6-1", &[0, 1, 2, 3, 4, 5]),
    ("6-2", &[0, 1, 2, 3, 4, 6]),
    ("6-Z3", &[0, 1, 2, 3, 5, 6]),
    ("6-Z4", &[0, 1, 2, 4, 5, 6]),
    ("6-5", &[0, 1, 2, 3, 6, 7]),
    ("6-Z6", &[0, 1, 2, 5, 6, 7]),
    ("6-7", &[0, 1, 2, 6, 7, 8]),
    ("6-8", &[0, 2, 3, 4, 5, 7]),
    ("6-9", &[0, 1, 2, 3, 5, 7]),
    ("6-Z10", &[0, 1, 3, 4, 5, 7]),
    ("6-Z11", &[0, 1, 2, 4, 5, 7]),
    ("6-Z12", &[0, 1, 2, 4, 6, 7]),
    ("6-Z13", &[0, 1, 3, 4, 6, 7]),
    ("6-14", &[0, 1, 3, 4, 5, 8]),
    ("6-15", &[0, 1, 2, 4, 5, 8]),
    ("6-16", &[0, 1, 4, 5, 6, 8]),
    ("6-Z17", &[0, 1, 2, 4, 7, 8]),
    ("6-18", &[0, 1, 2, 5, 7, 8]),
    ("6-Z19", &[0, 1, 3, 4, 7, 8]),
    ("6-20", &[0, 1, 4, 5, 8, 9]),
    ("6-21", &[0, 2, 3, 4, 6, 8]),
    ("6-22", &[0, 1, 2, 4, 6, 8]),
    ("6-Z23", &[0, 2, 3, 5, 6, 8]),
    ("6-Z24", &[0, 1, 3, 4, 6, 8]),
    ("6-Z25", &[0, 1, 3, 5, 6, 8]),
    ("6-Z26", &[0, 1, 3, 5, 7, 8]),
    ("6-27", &[0, 1, 3, 4, 6, 9]),
    ("6-Z28", &[0, 1, 3, 5, 6, 9]),
    ("6-Z29", &[0, 2, 3, 6, 7, 9]),
    ("6-30", &[0, 1, 3, 6, 7, 9]),
    ("6-31", &[0, 1, 4, 5, 7, 9]),
    ("6-32", &[0, 2, 4, 5, 7, 9]),
    ("6-33", &[0, 2, 3, 5, 7, 9]),
    ("6-34", &[0, 1, 3, 5, 7, 9]),
    ("6-35", &[0, 2, 4, 6, 8, 10]),
    ("6-Z36", &[0, 1, 2, 3, 4, 7]),
    ("6-Z37", &[0, 1, 2, 3, 4, 8]),
    ("6-Z38", &[0, 1, 2, 3, 7, 8]),
    ("6-Z39", &[0, 2, 3, 4, 5, 8]),
    ("6-Z40", &[0, 1, 2, 3, 5, 8]),
    ("6-Z41", &[0, 1, 2, 3, 6, 8]),
    ("6-Z42", &[0, 1, 2, 3, 6, 9]),
    ("6-Z43", &[0, 1, 2, 5, 6, 8]),
    ("6-Z44", &[0, 1, 2, 5, 6, 9]),
    ("6-Z45", &[0, 2, 3, 4, 6, 9]),
    ("6-Z46", &[0, 1, 2, 4, 6, 9]),
    ("6-Z47", &[0, 1, 2, 4, 7, 9]),
    ("6-Z48", &[0, 1, 2, 5, 7, 9]),
    ("6-Z49", &[0, 1, 3, 4, 7, 9]),
    ("6-Z50", &[0, 1, 4, 6, 7, 9]),
];

/// Dyads are named after their interval class
const DYADS: [(&str, &[i32]); 6] = [
    ("2-1", &[0, 1]),
    ("2-2", &[0, 2]),
    ("2-3", &[0, 3]),
    ("2-4", &[0, 4]),
    ("2-5", &[0, 5]),
    ("2-6", &[0, 6]),
];

struct Catalog {
    classes: Vec<SetClass>,
    by_prime_form: HashMap<PitchClassSet, usize>,
}

static CATALOG: LazyLock<Catalog> = LazyLock::new(build_catalog);

fn build_catalog() -> Catalog {
    let trivial = [
        ("0-1".to_owned(), PitchClassSet::EMPTY),
        ("1-1".to_owned(), PitchClassSet::from_integers([0])),
    ];
    let tabulated = DYADS
        .iter()
        .chain(&TRICHORDS)
        .chain(&TETRACHORDS)
        .chain(&PENTACHORDS)
        .chain(&HEXACHORDS)
        .map(|(name, members)| {
            let set = PitchClassSet::from_integers(members.iter().copied());
            ((*name).to_owned(), set)
        })
        .chain(trivial)
        .collect::<Vec<_>>();

    // complements of cardinalities 0-5 keep their ordinal and Z marking
    let complements = tabulated
        .iter()
        .filter(|(_, set)| set.len() < PITCH_CLASS_COUNT / 2)
        .filter_map(|(name, set)| {
            let (_, ordinal) = name.split_once('-')?;
            let complement = set.complement();
            Some((format!("{}-{ordinal}", complement.len()), complement))
        })
        .collect::<Vec<_>>();

    let mut classes: Vec<SetClass> = tabulated
        .into_iter()
        .chain(complements)
        .map(|(name, set)| {
            let prime_form = set.prime_form();
            SetClass {
                name,
                prime_form,
                interval_class_vector: prime_form.interval_class_vector(),
            }
        })
        .collect();
    classes.sort_by_key(|class| class.cardinality());
    let by_prime_form = classes
        .iter()
        .enumerate()
        .map(|(index, class)| (class.prime_form, index))
        .collect();
    log::debug!("built Forte catalog with {} set classes", classes.len());
    Catalog {
        classes,
        by_prime_form,
    }
}

/// Every catalogued set class, ordered by cardinality then Forte ordinal
pub fn catalog() -> &'static [SetClass] {
    &CATALOG.classes
}

/// The set class the given set belongs to
pub fn set_class(set: &PitchClassSet) -> Option<&'static SetClass> {
    let catalog = &*CATALOG;
    catalog
        .by_prime_form
        .get(&set.prime_form())
        .map(|&index| &catalog.classes[index])
}

pub fn forte_name(set: &PitchClassSet) -> Option<&'static str> {
    set_class(set).map(|class| class.name.as_str())
}

/// Both sets have the same size and interval-class vector without belonging to the same
/// set class
pub fn is_z_related(a: &PitchClassSet, b: &PitchClassSet) -> bool {
    a.len() == b.len()
        && a.interval_class_vector() == b.interval_class_vector()
        && a.prime_form() != b.prime_form()
}

/// Prime form of the Z-correspondent of the set's class, if it has one
pub fn z_partner(set: &PitchClassSet) -> Option<PitchClassSet> {
    let own = set.prime_form();
    let icv = own.interval_class_vector();
    catalog()
        .iter()
        .find(|class| {
            class.cardinality() == own.len()
                && class.interval_class_vector == icv
                && class.prime_form != own
        })
        .map(|class| class.prime_form)
}
