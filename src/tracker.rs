//! Active-cue tracking against a playback time, and example-sentence lookup.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::align::EnrichedCue;
use crate::annotate::transliteration_of;

/// Forward lookahead applied to sampled playback time, in seconds.
///
/// Sampling the clock periodically lags behind cue boundaries; the
/// lookahead switches the highlighted cue slightly early to compensate.
pub const DEFAULT_LOOKAHEAD_SECS: f64 = 0.3;

/// How many example sentences to collect for a dictionary entry.
pub const DEFAULT_EXAMPLE_LIMIT: usize = 3;

/// A cue's time window in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueWindow {
    pub start: f64,
    pub end: f64,
}

impl CueWindow {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

impl From<&EnrichedCue> for CueWindow {
    fn from(cue: &EnrichedCue) -> Self {
        CueWindow {
            start: cue.start_secs(),
            end: cue.end_secs(),
        }
    }
}

/// Index of the first cue containing `current + offset`, if any.
pub fn active_index(windows: &[CueWindow], current_secs: f64, offset_secs: f64) -> Option<usize> {
    let t = current_secs + offset_secs;
    windows.iter().position(|w| w.contains(t))
}

/// Tracks the active cue for one cue sequence.
#[derive(Debug, Clone)]
pub struct ActiveCueTracker {
    windows: Vec<CueWindow>,
    offset: f64,
    last: Option<usize>,
}

impl ActiveCueTracker {
    pub fn new(cues: &[EnrichedCue]) -> Self {
        Self::from_windows(cues.iter().map(CueWindow::from).collect())
    }

    pub fn from_windows(windows: Vec<CueWindow>) -> Self {
        ActiveCueTracker {
            windows,
            offset: DEFAULT_LOOKAHEAD_SECS,
            last: None,
        }
    }

    /// Use a different lookahead.
    pub fn with_offset(mut self, offset_secs: f64) -> Self {
        self.offset = offset_secs;
        self
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn windows(&self) -> &[CueWindow] {
        &self.windows
    }

    /// Stateless lookup at `current_secs`.
    pub fn active_index(&self, current_secs: f64) -> Option<usize> {
        active_index(&self.windows, current_secs, self.offset)
    }

    /// Feed one clock sample and return the cue to highlight.
    ///
    /// Samples that fall between cues, and clocks that report nothing or
    /// zero, keep the previous highlight.
    pub fn update(&mut self, sample: Option<f64>) -> Option<usize> {
        let Some(secs) = sample.filter(|s| *s != 0.0 && s.is_finite()) else {
            return self.last;
        };
        if let Some(idx) = self.active_index(secs) {
            self.last = Some(idx);
        }
        self.last
    }

    /// The last highlighted cue.
    pub fn current(&self) -> Option<usize> {
        self.last
    }
}

/// A piece of cue text for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChunk {
    pub text: String,
    pub is_match: bool,
}

/// A cue that contains a looked-up word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CueExample<'a> {
    /// Position of the cue in the input sequence
    pub index: usize,
    pub cue: &'a EnrichedCue,
    /// Cue text split around every occurrence of the word
    pub chunks: Vec<TextChunk>,
}

impl CueExample<'_> {
    /// The cue's tokens transliterated and joined with spaces.
    pub fn transliteration(&self) -> String {
        self.cue
            .tokens
            .iter()
            .map(|t| transliteration_of(&t.raw))
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Split `text` around every occurrence of `word`, alternating
/// non-matching and matching chunks. Leading, trailing and adjacent empty
/// non-matching chunks are kept so the alternation is regular.
///
/// `word` must be non-empty.
pub fn split_on_word(text: &str, word: &str) -> Vec<TextChunk> {
    debug_assert!(!word.is_empty());
    let mut chunks = Vec::new();
    let mut parts = text.split(word).peekable();
    while let Some(part) = parts.next() {
        chunks.push(TextChunk {
            text: part.to_string(),
            is_match: false,
        });
        if parts.peek().is_some() {
            chunks.push(TextChunk {
                text: word.to_string(),
                is_match: true,
            });
        }
    }
    chunks
}

/// Collect up to `limit` cues whose text contains `word`, in cue order.
///
/// Text and word are compared in NFC form. An empty word matches nothing.
pub fn find_examples<'a>(cues: &'a [EnrichedCue], word: &str, limit: usize) -> Vec<CueExample<'a>> {
    if word.is_empty() || limit == 0 {
        return Vec::new();
    }
    let word: String = word.nfc().collect();

    let mut examples = Vec::new();
    for (index, cue) in cues.iter().enumerate() {
        let text: String = cue.text().nfc().collect();
        if !text.contains(&word) {
            continue;
        }
        examples.push(CueExample {
            index,
            cue,
            chunks: split_on_word(&text, &word),
        });
        if examples.len() == limit {
            break;
        }
    }
    examples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{align, SubtitleCue};

    fn windows() -> Vec<CueWindow> {
        vec![CueWindow { start: 0.0, end: 2.0 }, CueWindow { start: 2.0, end: 4.0 }]
    }

    #[test]
    fn test_lookahead_moves_to_next_cue() {
        assert_eq!(active_index(&windows(), 1.8, 0.3), Some(1));
        assert_eq!(active_index(&windows(), 1.8, 0.0), Some(0));
    }

    #[test]
    fn test_no_active_cue() {
        assert_eq!(active_index(&windows(), 5.0, 0.3), None);
        assert_eq!(active_index(&[], 1.0, 0.3), None);
    }

    #[test]
    fn test_end_is_exclusive() {
        assert_eq!(active_index(&windows(), 4.0, 0.0), None);
        assert_eq!(active_index(&windows(), 2.0, 0.0), Some(1));
    }

    #[test]
    fn test_sticky_update() {
        let mut tracker = ActiveCueTracker::from_windows(vec![
            CueWindow { start: 1.0, end: 2.0 },
            CueWindow { start: 3.0, end: 4.0 },
        ])
        .with_offset(0.0);

        assert_eq!(tracker.update(Some(0.5)), None);
        assert_eq!(tracker.update(Some(1.5)), Some(0));
        assert_eq!(tracker.update(Some(2.5)), Some(0));
        assert_eq!(tracker.update(None), Some(0));
        assert_eq!(tracker.update(Some(0.0)), Some(0));
        assert_eq!(tracker.update(Some(3.2)), Some(1));
        assert_eq!(tracker.current(), Some(1));
    }

    fn sample_cues() -> Vec<EnrichedCue> {
        let cues = vec![
            SubtitleCue::new(0.0, 1000.0, "你好吗"),
            SubtitleCue::new(1000.0, 2000.0, "我很好"),
            SubtitleCue::new(2000.0, 3000.0, "好好好"),
            SubtitleCue::new(3000.0, 4000.0, "好的"),
            SubtitleCue::new(4000.0, 5000.0, "再见好"),
        ];
        align(&cues, &[])
    }

    #[test]
    fn test_find_examples_limit_and_order() {
        let cues = sample_cues();
        let examples = find_examples(&cues, "好", DEFAULT_EXAMPLE_LIMIT);
        let indexes: Vec<_> = examples.iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_find_examples_chunks() {
        let cues = sample_cues();
        let examples = find_examples(&cues, "好", 3);

        let first: Vec<_> = examples[0].chunks.iter().map(|c| (c.text.as_str(), c.is_match)).collect();
        assert_eq!(first, vec![("你", false), ("好", true), ("吗", false)]);

        let third: Vec<_> = examples[2].chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(third, vec!["", "好", "", "好", "", "好", ""]);
    }

    #[test]
    fn test_find_examples_empty_word() {
        assert!(find_examples(&sample_cues(), "", 3).is_empty());
    }

    #[test]
    fn test_find_examples_normalizes() {
        let cues = align(&[SubtitleCue::new(0.0, 1.0, "cafe\u{301} con leche")], &[]);
        let examples = find_examples(&cues, "café", 3);
        assert_eq!(examples.len(), 1);
        assert!(examples[0].chunks[1].is_match);
    }
}
