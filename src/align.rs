//! Subtitle cues and their alignment with per-cue token groups.

use serde::{Deserialize, Serialize};

use crate::annotate::annotate_all;
use crate::lenient;
use crate::token::{AnnotatedToken, RawToken};

/// A subtitle cue as delivered by the subtitle service. Times are in ms.
///
/// Missing or unusable fields read as `0` and the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    #[serde(default, deserialize_with = "lenient::number")]
    pub begin: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub end: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub text: String,
}

impl SubtitleCue {
    pub fn new(begin: f64, end: f64, text: impl Into<String>) -> Self {
        SubtitleCue {
            begin,
            end,
            text: text.into(),
        }
    }
}

/// A cue with its annotated tokens attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCue {
    #[serde(flatten)]
    pub cue: SubtitleCue,
    pub tokens: Vec<AnnotatedToken>,
}

impl EnrichedCue {
    pub fn begin(&self) -> f64 {
        self.cue.begin
    }

    pub fn end(&self) -> f64 {
        self.cue.end
    }

    pub fn text(&self) -> &str {
        &self.cue.text
    }

    /// Start time in seconds.
    pub fn start_secs(&self) -> f64 {
        self.cue.begin / 1000.0
    }

    /// End time in seconds.
    pub fn end_secs(&self) -> f64 {
        self.cue.end / 1000.0
    }
}

/// Attach token group `i` to cue `i`.
///
/// Cues without a matching group get no tokens; extra groups are ignored.
/// Cue order is preserved as given.
pub fn align(cues: &[SubtitleCue], groups: &[Vec<RawToken>]) -> Vec<EnrichedCue> {
    cues.iter()
        .enumerate()
        .map(|(i, cue)| EnrichedCue {
            cue: cue.clone(),
            tokens: groups.get(i).map(|g| annotate_all(g)).unwrap_or_default(),
        })
        .collect()
}

/// A timing problem found in a cue sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CueIssue {
    /// `begin >= end`
    Inverted { index: usize, begin: f64, end: f64 },
    /// The cue starts before its predecessor
    OutOfOrder { index: usize, begin: f64, previous_begin: f64 },
    /// The cue starts before its predecessor has ended
    Overlap { index: usize, begin: f64, previous_end: f64 },
}

impl std::fmt::Display for CueIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CueIssue::Inverted { index, begin, end } => {
                write!(f, "cue {} ends before it begins ({} >= {})", index, begin, end)
            }
            CueIssue::OutOfOrder { index, begin, previous_begin } => write!(
                f,
                "cue {} begins at {} before the previous cue ({})",
                index, begin, previous_begin
            ),
            CueIssue::Overlap { index, begin, previous_end } => write!(
                f,
                "cue {} begins at {} before the previous cue ends ({})",
                index, begin, previous_end
            ),
        }
    }
}

/// Report malformed timing without modifying the cues.
pub fn check_cue_timing(cues: &[SubtitleCue]) -> Vec<CueIssue> {
    let mut issues = Vec::new();

    for (index, cue) in cues.iter().enumerate() {
        if cue.begin >= cue.end {
            issues.push(CueIssue::Inverted {
                index,
                begin: cue.begin,
                end: cue.end,
            });
        }

        let Some(prev) = index.checked_sub(1).map(|i| &cues[i]) else {
            continue;
        };
        if cue.begin < prev.begin {
            issues.push(CueIssue::OutOfOrder {
                index,
                begin: cue.begin,
                previous_begin: prev.begin,
            });
        } else if cue.begin < prev.end {
            issues.push(CueIssue::Overlap {
                index,
                begin: cue.begin,
                previous_end: prev.end,
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cues(n: usize) -> Vec<SubtitleCue> {
        (0..n)
            .map(|i| SubtitleCue::new(i as f64 * 1000.0, (i + 1) as f64 * 1000.0, format!("cue {}", i)))
            .collect()
    }

    #[test]
    fn test_fewer_groups_than_cues() {
        let groups = vec![vec![RawToken::with_text("a")], vec![RawToken::with_text("b")]];
        let enriched = align(&cues(3), &groups);
        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[1].tokens[0].text(), "b");
        assert!(enriched[2].tokens.is_empty());
    }

    #[test]
    fn test_extra_groups_ignored() {
        let groups = vec![vec![], vec![RawToken::with_text("x")], vec![RawToken::with_text("y")]];
        let enriched = align(&cues(1), &groups);
        assert_eq!(enriched.len(), 1);
        assert!(enriched[0].tokens.is_empty());
    }

    #[test]
    fn test_preserves_order_and_is_idempotent() {
        let mut input = cues(3);
        input.swap(0, 2);
        let groups = vec![vec![RawToken::with_text("a").with_freq(3.0)]];
        let first = align(&input, &groups);
        assert_eq!(first[0].begin(), 2000.0);
        assert_eq!(first, align(&input, &groups));
    }

    #[test]
    fn test_seconds() {
        let enriched = align(&[SubtitleCue::new(1500.0, 3000.0, "x")], &[]);
        assert_eq!(enriched[0].start_secs(), 1.5);
        assert_eq!(enriched[0].end_secs(), 3.0);
    }

    #[test]
    fn test_check_cue_timing() {
        assert!(check_cue_timing(&cues(4)).is_empty());

        let bad = vec![
            SubtitleCue::new(0.0, 1000.0, "a"),
            SubtitleCue::new(800.0, 1500.0, "b"),
            SubtitleCue::new(500.0, 400.0, "c"),
        ];
        let issues = check_cue_timing(&bad);
        assert_eq!(issues.len(), 3);
        assert!(matches!(issues[0], CueIssue::Overlap { index: 1, .. }));
        assert!(matches!(issues[1], CueIssue::Inverted { index: 2, .. }));
        assert!(matches!(issues[2], CueIssue::OutOfOrder { index: 2, .. }));
    }
}
