//! Continuous cue timeline with synthetic "ghost" gap segments.
//!
//! The timeline is drawn as a horizontally scrolling track where every
//! segment is placed at `begin_secs * PIXELS_PER_SECOND`.

use serde::Serialize;

use crate::align::{EnrichedCue, SubtitleCue};

/// Horizontal scale of the timeline track.
pub const PIXELS_PER_SECOND: f64 = 48.0;

/// A time jump larger than this is treated as a seek.
pub const SEEK_JUMP_SECS: f64 = 1.5;

/// Anything with a `[begin, end)` span in milliseconds.
pub trait CueSpan {
    fn begin_ms(&self) -> f64;
    fn end_ms(&self) -> f64;
}

impl CueSpan for SubtitleCue {
    fn begin_ms(&self) -> f64 {
        self.begin
    }

    fn end_ms(&self) -> f64 {
        self.end
    }
}

impl CueSpan for EnrichedCue {
    fn begin_ms(&self) -> f64 {
        self.cue.begin
    }

    fn end_ms(&self) -> f64 {
        self.cue.end
    }
}

/// One span of the timeline, either a real cue or a gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineSegment {
    pub begin: f64,
    pub end: f64,
    pub ghost: bool,
}

impl TimelineSegment {
    pub fn cue(begin: f64, end: f64) -> Self {
        TimelineSegment { begin, end, ghost: false }
    }

    pub fn ghost(begin: f64, end: f64) -> Self {
        TimelineSegment { begin, end, ghost: true }
    }

    pub fn duration_ms(&self) -> f64 {
        self.end - self.begin
    }

    /// Left edge on the track.
    pub fn left_px(&self) -> f64 {
        self.begin / 1000.0 * PIXELS_PER_SECOND
    }

    /// Width on the track.
    pub fn width_px(&self) -> f64 {
        self.duration_ms() / 1000.0 * PIXELS_PER_SECOND
    }
}

/// Total track width for a video of `duration_secs`.
pub fn track_width_px(duration_secs: f64) -> f64 {
    duration_secs * PIXELS_PER_SECOND
}

/// Interleave cues with ghost segments covering the gaps between them and
/// the tail up to `total_ms`.
///
/// Segments never overlap and always have positive width. Inverted, empty
/// and non-finite cues are dropped, and a cue that starts inside an earlier
/// one is clipped to begin where the earlier one ends.
pub fn fill_gaps<C: CueSpan>(cues: &[C], total_ms: f64) -> Vec<TimelineSegment> {
    let mut segments: Vec<TimelineSegment> = Vec::with_capacity(cues.len() * 2 + 1);
    let mut covered: Option<f64> = None;

    for cue in cues {
        let (begin, end) = (cue.begin_ms(), cue.end_ms());
        if !begin.is_finite() || !end.is_finite() {
            continue;
        }
        let begin = covered.map_or(begin, |edge| begin.max(edge));
        if end <= begin {
            continue;
        }
        if let Some(edge) = covered {
            if begin > edge {
                segments.push(TimelineSegment::ghost(edge, begin));
            }
        }
        segments.push(TimelineSegment::cue(begin, end));
        covered = Some(end);
    }

    if let Some(edge) = covered {
        if total_ms > edge {
            segments.push(TimelineSegment::ghost(edge, total_ms));
        }
    }

    segments
}

/// Decides when the scrolling track must be re-anchored to the clock.
///
/// While playing, the track animates on its own; it only needs a reset
/// after a seek (a jump larger than [`SEEK_JUMP_SECS`]) or when playback
/// resumes from pause.
#[derive(Debug, Clone, Default)]
pub struct ScrollAnchor {
    previous_secs: f64,
    was_playing: bool,
    resets: u64,
}

impl ScrollAnchor {
    pub fn new(current_secs: f64, playing: bool) -> Self {
        ScrollAnchor {
            previous_secs: current_secs,
            was_playing: playing,
            resets: 0,
        }
    }

    /// Observe a new time/playing sample. Returns `true` when the track
    /// must be re-anchored.
    pub fn observe(&mut self, current_secs: f64, playing: bool) -> bool {
        let jumped = (current_secs - self.previous_secs).abs() > SEEK_JUMP_SECS;
        let resumed = !self.was_playing && playing;

        self.previous_secs = current_secs;
        self.was_playing = playing;

        if jumped || resumed {
            self.resets += 1;
            true
        } else {
            false
        }
    }

    /// Number of re-anchors so far; usable as an animation key.
    pub fn generation(&self) -> u64 {
        self.resets
    }

    /// Track offset when not animating.
    pub fn offset_px(current_secs: f64) -> f64 {
        -current_secs * PIXELS_PER_SECOND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(begin: f64, end: f64) -> SubtitleCue {
        SubtitleCue::new(begin, end, "")
    }

    #[test]
    fn test_trailing_ghost() {
        let segments = fill_gaps(&[c(1000.0, 2000.0)], 5000.0);
        assert_eq!(
            segments,
            vec![TimelineSegment::cue(1000.0, 2000.0), TimelineSegment::ghost(2000.0, 5000.0)]
        );
    }

    #[test]
    fn test_contiguous_no_ghosts() {
        let segments = fill_gaps(&[c(0.0, 1000.0), c(1000.0, 2000.0)], 2000.0);
        assert_eq!(
            segments,
            vec![TimelineSegment::cue(0.0, 1000.0), TimelineSegment::cue(1000.0, 2000.0)]
        );
    }

    #[test]
    fn test_inner_gap() {
        let segments = fill_gaps(&[c(0.0, 1000.0), c(1500.0, 2000.0)], 2000.0);
        assert_eq!(segments[1], TimelineSegment::ghost(1000.0, 1500.0));
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_overlap_has_no_negative_ghost() {
        let segments = fill_gaps(&[c(0.0, 1500.0), c(1000.0, 2000.0)], 1000.0);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| !s.ghost));
    }

    #[test]
    fn test_malformed_cues_never_overlap() {
        let cues = [
            c(0.0, 1000.0),
            c(2000.0, 1500.0),
            c(3000.0, 3000.0),
            c(2500.0, 6000.0),
            c(3000.0, 4000.0),
            c(f64::NAN, 7000.0),
            c(6500.0, 7000.0),
        ];
        let segments = fill_gaps(&cues, 8000.0);

        assert!(segments.iter().all(|s| s.duration_ms() > 0.0));
        for pair in segments.windows(2) {
            assert!(pair[0].end <= pair[1].begin, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
        assert_eq!(
            segments,
            vec![
                TimelineSegment::cue(0.0, 1000.0),
                TimelineSegment::ghost(1000.0, 2500.0),
                TimelineSegment::cue(2500.0, 6000.0),
                TimelineSegment::ghost(6000.0, 6500.0),
                TimelineSegment::cue(6500.0, 7000.0),
                TimelineSegment::ghost(7000.0, 8000.0),
            ]
        );
    }

    #[test]
    fn test_only_invalid_cues() {
        assert!(fill_gaps(&[c(2000.0, 1500.0), c(3000.0, 3000.0)], 5000.0).is_empty());
    }

    #[test]
    fn test_empty() {
        assert!(fill_gaps::<SubtitleCue>(&[], 10_000.0).is_empty());
    }

    #[test]
    fn test_segments_are_contiguous() {
        let cues = [c(500.0, 900.0), c(1200.0, 3000.0), c(3000.0, 3500.0), c(4000.0, 4100.0)];
        let segments = fill_gaps(&cues, 6000.0);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].begin);
        }
        assert_eq!(segments.first().unwrap().begin, 500.0);
        assert_eq!(segments.last().unwrap().end, 6000.0);
        assert!(segments.iter().all(|s| s.duration_ms() > 0.0));
    }

    #[test]
    fn test_geometry() {
        let seg = TimelineSegment::cue(1000.0, 1500.0);
        assert_eq!(seg.left_px(), 48.0);
        assert_eq!(seg.width_px(), 24.0);
        assert_eq!(track_width_px(10.0), 480.0);
    }

    #[test]
    fn test_scroll_anchor() {
        let mut anchor = ScrollAnchor::new(0.0, false);
        assert!(anchor.observe(0.0, true)); // resume
        assert!(!anchor.observe(0.5, true));
        assert!(!anchor.observe(1.9, true));
        assert!(anchor.observe(30.0, true)); // seek
        assert!(!anchor.observe(30.1, false));
        assert_eq!(anchor.generation(), 2);
        assert_eq!(ScrollAnchor::offset_px(2.0), -96.0);
    }
}
