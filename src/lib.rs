//! # subgloss
//!
//! Turns a language-learning subtitle payload into display-ready state:
//! per-token transliteration and frequency buckets, a deduplicated
//! vocabulary index, the active cue for a playback position, and a
//! gap-filled timeline.
//!
//! ## Quick Start
//!
//! ```rust
//! use subgloss::{parse_subs_response, ParsedSubs};
//! use serde_json::json;
//!
//! let response = json!({
//!     "status": "success",
//!     "data": { "sourceSubs": { "data": {
//!         "nlp": [[
//!             { "form": { "text": "你好", "pinyin": ["ni3", "hao3"] }, "freq": 50 },
//!             { "form": { "text": "吗" }, "diocoFreq": "300" }
//!         ]],
//!         "subs": [{ "begin": 0, "end": 2000, "text": "你好吗" }],
//!         "haveWordFrequency": true
//!     }}}
//! });
//!
//! let parsed = ParsedSubs::from_source(&parse_subs_response(&response));
//! let cue = &parsed.subtitles[0];
//! assert_eq!(cue.tokens[0].transliteration, "ni3 hao3");
//! assert_eq!(cue.tokens[1].frequency_bucket, Some("201-500"));
//!
//! let mut tracker = parsed.tracker(0.3);
//! assert_eq!(tracker.update(Some(1.0)), Some(0));
//! ```
//!
//! ## Rendering
//!
//! [`SubtitleView`] applies [`DisplayOptions`] (color by POS or frequency,
//! underline mode, transliteration and translation toggles) and produces
//! rows with resolved style classes.
//!
//! ## Network
//!
//! With the default `fetch` feature, [`client::ServiceClient`] downloads
//! subtitle payloads, translations, dictionary entries and TTS audio.

pub mod align;
pub mod annotate;
#[cfg(feature = "fetch")]
pub mod client;
pub mod color;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod frequency;
mod lenient;
pub mod payload;
pub mod pipeline;
pub mod playback;
pub mod poll;
pub mod store;
pub mod timefmt;
pub mod timeline;
pub mod token;
pub mod tracker;
pub mod view;
pub mod vocabulary;

// Re-export main types for convenience
pub use align::{align, EnrichedCue, SubtitleCue};
pub use annotate::{annotate, annotate_all};
pub use color::{ClassResolver, FREQ_COLORS, POS_COLORS};
pub use config::Config;
pub use dictionary::{DictEntry, DictQuery};
pub use error::{Error, Result};
pub use frequency::{bucket_for, FrequencyRange, FREQUENCY_RANGES};
pub use payload::{parse_subs_response, SourceSubsData, Translations};
pub use pipeline::{ParsedSubs, PipelineCache};
pub use playback::{ManualClock, PlaybackClock};
pub use poll::{CuePoller, PollHandle};
pub use timeline::{fill_gaps, TimelineSegment};
pub use token::{AnnotatedToken, PartOfSpeech, RawToken};
pub use tracker::{find_examples, ActiveCueTracker, CueExample};
pub use view::{DisplayOptions, SubtitleView, ViewState};
pub use vocabulary::VocabularyIndex;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
