//! Word-frequency rank bucketing.
//!
//! Frequency ranks from the NLP service are grouped into a fixed set of
//! contiguous, ascending ranges. The labels produced here are also the keys of
//! the frequency color table in [`crate::color`].

use once_cell::sync::Lazy;
use regex::Regex;

/// A named, inclusive rank range. `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyRange {
    pub label: &'static str,
    pub min: u32,
    pub max: Option<u32>,
}

impl FrequencyRange {
    /// Whether `rank` falls into this range.
    ///
    /// Fractional ranks between two integer ranges belong to the upper one,
    /// so the table has no holes over the positive reals.
    pub fn contains(&self, rank: f64) -> bool {
        let above_min = self.min <= 1 || rank > f64::from(self.min - 1);
        let below_max = self.max.map_or(true, |max| rank <= f64::from(max));
        above_min && below_max
    }
}

/// Ranges ordered ascending by lower bound.
pub static FREQUENCY_RANGES: &[FrequencyRange] = &[
    FrequencyRange { label: "1-100", min: 1, max: Some(100) },
    FrequencyRange { label: "101-200", min: 101, max: Some(200) },
    FrequencyRange { label: "201-500", min: 201, max: Some(500) },
    FrequencyRange { label: "501-1000", min: 501, max: Some(1000) },
    FrequencyRange { label: "1001-2000", min: 1001, max: Some(2000) },
    FrequencyRange { label: "2001-3500", min: 2001, max: Some(3500) },
    FrequencyRange { label: "3501-5000", min: 3501, max: Some(5000) },
    FrequencyRange { label: "5001-8000", min: 5001, max: Some(8000) },
    FrequencyRange { label: "8001+", min: 8001, max: None },
];

static LEADING_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());

/// Map a rank to its bucket label.
///
/// Absent, non-finite, zero and negative ranks have no bucket.
pub fn bucket_for(rank: Option<f64>) -> Option<&'static str> {
    let rank = rank?;
    if !rank.is_finite() || rank <= 0.0 {
        return None;
    }
    FREQUENCY_RANGES
        .iter()
        .find(|range| range.contains(rank))
        .map(|range| range.label)
}

/// Look up the range for a label produced by [`bucket_for`].
pub fn range_for_label(label: &str) -> Option<&'static FrequencyRange> {
    FREQUENCY_RANGES.iter().find(|range| range.label == label)
}

/// Parse the leading integer of a bucket label (`"101-200"` -> 101, `"8001+"` -> 8001).
pub fn bucket_lower_bound(label: &str) -> Option<u32> {
    LEADING_INT
        .captures(label)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .and_then(|n| u32::try_from(n).ok())
}

/// Lenient integer parse for rank values that arrive as strings.
///
/// Reads an optional sign and leading digits and ignores the rest, so
/// `"1234abc"` gives 1234 and `"abc"` gives `None`. Digit runs too long
/// for an integer still parse, as a float.
pub fn parse_rank_text(text: &str) -> Option<f64> {
    let caps = LEADING_INT.captures(text)?;
    let digits = &caps[1];
    match digits.parse::<i64>() {
        Ok(n) => Some(n as f64),
        Err(_) => digits.parse::<f64>().ok(),
    }
}
