//! The registry of known `__future__` features.
//!
//! Each feature carries the Python version window in which importing it is
//! meaningful: it exists from `optional` and its behavior is the language
//! default from `mandatory` onward. The table order is a public contract
//! because a feature's position derives its diagnostic code.

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// A Python version as a `(major, minor, micro)` triple.
///
/// Tuple comparison gives the usual version ordering, which is all the
/// checker needs for its minimum-version window.
pub type Version = (u32, u32, u32);

/// One known `__future__` feature and its applicability window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    /// Stable position in [`ALL_FEATURES`]; derives the diagnostic code.
    pub index: usize,
    /// The name used in `from __future__ import <name>`.
    pub name: &'static str,
    /// Earliest version where the import is accepted.
    pub optional: Version,
    /// Version at which the behavior becomes the default (or the feature
    /// stops existing).
    pub mandatory: Version,
}

/// All known features. Order important as it defines the error code.
pub const ALL_FEATURES: [Feature; 8] = [
    Feature {
        index: 0,
        name: "division",
        optional: (2, 2, 0),
        mandatory: (3, 0, 0),
    },
    Feature {
        index: 1,
        name: "absolute_import",
        optional: (2, 5, 0),
        mandatory: (3, 0, 0),
    },
    Feature {
        index: 2,
        name: "with_statement",
        optional: (2, 5, 0),
        mandatory: (2, 6, 0),
    },
    Feature {
        index: 3,
        name: "print_function",
        optional: (2, 6, 0),
        mandatory: (3, 0, 0),
    },
    Feature {
        index: 4,
        name: "unicode_literals",
        optional: (2, 6, 0),
        mandatory: (3, 0, 0),
    },
    Feature {
        index: 5,
        name: "generator_stop",
        optional: (3, 5, 0),
        mandatory: (3, 7, 0),
    },
    Feature {
        index: 6,
        name: "nested_scopes",
        optional: (2, 1, 0),
        mandatory: (2, 2, 0),
    },
    Feature {
        index: 7,
        name: "generators",
        optional: (2, 2, 0),
        mandatory: (2, 3, 0),
    },
];

/// Name-keyed view of [`ALL_FEATURES`].
///
/// # Panics
///
/// Panics on first use if the table contains duplicate names or an entry
/// whose stored index disagrees with its position. Both would be
/// programming defects in the table itself, so they fail loudly at
/// startup instead of surfacing as diagnostics.
fn features_by_name() -> &'static FxHashMap<&'static str, &'static Feature> {
    static MAP: OnceLock<FxHashMap<&'static str, &'static Feature>> = OnceLock::new();
    MAP.get_or_init(|| {
        for (position, feature) in ALL_FEATURES.iter().enumerate() {
            assert_eq!(
                feature.index, position,
                "feature {:?} stored at position {position}",
                feature.name
            );
        }
        let map: FxHashMap<_, _> = ALL_FEATURES.iter().map(|f| (f.name, f)).collect();
        assert_eq!(map.len(), ALL_FEATURES.len(), "duplicate feature name");
        map
    })
}

/// Looks up a feature by its import name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static Feature> {
    features_by_name().get(name).copied()
}

/// Returns the set of all known feature names, in registry order.
pub fn names() -> impl Iterator<Item = &'static str> {
    ALL_FEATURES.iter().map(|f| f.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_positions() {
        for (position, feature) in ALL_FEATURES.iter().enumerate() {
            assert_eq!(feature.index, position);
        }
    }

    #[test]
    fn names_are_unique() {
        let unique: rustc_hash::FxHashSet<_> = names().collect();
        assert_eq!(unique.len(), ALL_FEATURES.len());
    }

    #[test]
    fn lookup_known_and_unknown() {
        let feature = by_name("unicode_literals").unwrap();
        assert_eq!(feature.index, 4);
        assert_eq!(feature.optional, (2, 6, 0));
        assert_eq!(feature.mandatory, (3, 0, 0));
        assert!(by_name("braces").is_none());
    }

    #[test]
    fn windows_are_ordered() {
        for feature in &ALL_FEATURES {
            assert!(feature.optional < feature.mandatory, "{}", feature.name);
        }
    }

    #[test]
    fn version_tuples_compare_lexicographically() {
        assert!((2, 6, 0) < (2, 7, 0));
        assert!((2, 7, 5) < (3, 0, 0));
        assert!((3, 0, 0) <= (3, 0, 0));
    }
}
