//! Display class lookup for part-of-speech tags and frequency buckets.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;

/// Classification key -> base style class.
pub type ColorTable = HashMap<&'static str, &'static str>;

/// Appended to the base class in underline mode.
pub const UNDERLINE_MODIFIER: &str = "underline decoration-[1.5px] underline-offset-4";

/// Base classes per part-of-speech tag.
pub static POS_COLORS: Lazy<ColorTable> = Lazy::new(|| {
    HashMap::from([
        ("NOUN", "text-blue-500 dark:text-blue-300"),
        ("VERB", "text-green-500 dark:text-green-300"),
        ("ADJ", "text-red-500 dark:text-red-300"),
        ("ADV", "text-purple-500 dark:text-purple-300"),
        ("PRON", "text-amber-600 dark:text-amber-300"),
        ("PROPN", "text-yellow-600 dark:text-yellow-300"),
        ("NUM", "text-pink-500 dark:text-pink-300"),
        ("ADP", "text-teal-500 dark:text-teal-300"),
        ("PART", "text-indigo-500 dark:text-indigo-300"),
        ("CCONJ", "text-cyan-600 dark:text-cyan-300"),
        ("SCONJ", "text-cyan-800 dark:text-cyan-400"),
        ("DET", "text-fuchsia-600 dark:text-fuchsia-300"),
        ("AUX", "text-lime-600 dark:text-lime-300"),
        ("INTJ", "text-rose-500 dark:text-rose-300"),
        ("SYM", "text-gray-600 dark:text-gray-400"),
        ("X", "text-gray-400 dark:text-gray-300"),
        ("PUNCT", "text-gray-500 dark:text-gray-300"),
    ])
});

/// Base classes per frequency bucket label.
pub static FREQ_COLORS: Lazy<ColorTable> = Lazy::new(|| {
    HashMap::from([
        ("1-100", "text-red-600 dark:text-red-300"),
        ("101-200", "text-orange-600 dark:text-orange-300"),
        ("201-500", "text-yellow-600 dark:text-yellow-300"),
        ("501-1000", "text-green-600 dark:text-green-300"),
        ("1001-2000", "text-blue-500 dark:text-blue-300"),
        ("2001-3500", "text-blue-700 dark:text-blue-400"),
        ("3501-5000", "text-blue-800 dark:text-blue-500"),
        ("5001-8000", "text-purple-500 dark:text-purple-300"),
        ("8001+", "text-purple-700 dark:text-purple-400"),
    ])
});

/// Look up `key` and optionally append the underline modifier.
///
/// Unknown keys resolve to an empty base class.
pub fn resolve(key: &str, use_underline: bool, table: &ColorTable) -> String {
    let base = table.get(key).copied().unwrap_or("");
    if use_underline {
        format!("{} {}", base, UNDERLINE_MODIFIER)
    } else {
        base.to_string()
    }
}

/// A resolver bound to one table that counts unstyled lookups.
///
/// A miss means either a tag the table does not know or a bucket label that
/// drifted from the bucketer's output.
#[derive(Debug)]
pub struct ClassResolver {
    table: &'static ColorTable,
    misses: AtomicUsize,
}

impl ClassResolver {
    pub fn new(table: &'static ColorTable) -> Self {
        ClassResolver {
            table,
            misses: AtomicUsize::new(0),
        }
    }

    pub fn pos() -> Self {
        Self::new(&POS_COLORS)
    }

    pub fn freq() -> Self {
        Self::new(&FREQ_COLORS)
    }

    pub fn resolve(&self, key: &str, use_underline: bool) -> String {
        if !self.table.contains_key(key) {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key, "no display class for key");
        }
        resolve(key, use_underline, self.table)
    }

    /// Number of lookups that fell back to the empty class.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FREQUENCY_RANGES;
    use crate::token::PartOfSpeech;

    #[test]
    fn test_resolve_plain_and_underline() {
        let plain = resolve("VERB", false, &POS_COLORS);
        assert_eq!(plain, "text-green-500 dark:text-green-300");

        let underlined = resolve("VERB", true, &POS_COLORS);
        assert_eq!(underlined, format!("{} {}", plain, UNDERLINE_MODIFIER));
    }

    #[test]
    fn test_unknown_key_is_empty() {
        assert_eq!(resolve("UNKNOWN_TAG", false, &POS_COLORS), "");
    }

    #[test]
    fn test_every_pos_has_a_class() {
        for pos in PartOfSpeech::ALL {
            assert!(POS_COLORS.contains_key(pos.as_str()), "missing {}", pos.as_str());
        }
        assert_eq!(POS_COLORS.len(), PartOfSpeech::ALL.len());
    }

    #[test]
    fn test_freq_table_matches_bucket_labels() {
        for range in FREQUENCY_RANGES {
            assert!(FREQ_COLORS.contains_key(range.label), "missing {}", range.label);
        }
        assert_eq!(FREQ_COLORS.len(), FREQUENCY_RANGES.len());
    }

    #[test]
    fn test_resolver_counts_misses() {
        let resolver = ClassResolver::freq();
        resolver.resolve("1-100", false);
        resolver.resolve("1001-5000", false);
        resolver.resolve("unknown", true);
        assert_eq!(resolver.misses(), 2);
    }
}
