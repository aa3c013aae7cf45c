//! The playback clock the video player exposes.

use std::sync::{Arc, Mutex};

/// Control surface of an embedded video player.
pub trait PlaybackClock: Send + Sync {
    /// Current position in seconds, `None` before the player is ready.
    fn current_time_secs(&self) -> Option<f64>;

    /// Total duration in seconds.
    fn duration_secs(&self) -> f64;

    /// Jump to `secs`.
    fn seek_to(&self, secs: f64);
}

#[derive(Debug, Default)]
struct ClockState {
    current: Option<f64>,
    duration: f64,
    playing: bool,
}

/// A clock driven by hand. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualClock {
    pub fn new(duration_secs: f64) -> Self {
        ManualClock {
            state: Arc::new(Mutex::new(ClockState {
                current: None,
                duration: duration_secs,
                playing: false,
            })),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ClockState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    pub fn set_time(&self, secs: f64) {
        self.with_state(|s| s.current = Some(secs));
    }

    /// Advance by `secs` if playing.
    pub fn advance(&self, secs: f64) {
        self.with_state(|s| {
            if s.playing {
                let next = s.current.unwrap_or(0.0) + secs;
                s.current = Some(next.min(s.duration));
            }
        });
    }

    pub fn play(&self) {
        self.with_state(|s| {
            s.playing = true;
            s.current.get_or_insert(0.0);
        });
    }

    pub fn pause(&self) {
        self.with_state(|s| s.playing = false);
    }

    pub fn is_playing(&self) -> bool {
        self.with_state(|s| s.playing)
    }
}

impl PlaybackClock for ManualClock {
    fn current_time_secs(&self) -> Option<f64> {
        self.with_state(|s| s.current)
    }

    fn duration_secs(&self) -> f64 {
        self.with_state(|s| s.duration)
    }

    fn seek_to(&self, secs: f64) {
        self.with_state(|s| s.current = Some(secs.clamp(0.0, s.duration.max(0.0))));
    }
}
