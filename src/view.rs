//! Display-ready rows for the subtitle and vocabulary panels, and the
//! explicit UI state that goes with them.
//!
//! One [`SubtitleView`] covers every panel variant; what differs between
//! them is captured in [`DisplayOptions`].

use serde::{Deserialize, Serialize};

use crate::align::EnrichedCue;
use crate::color::ClassResolver;
use crate::dictionary::DictQuery;
use crate::payload::Translations;
use crate::pipeline::ParsedSubs;
use crate::timefmt::format_timestamp_ms;
use crate::token::AnnotatedToken;

/// What tokens are colored by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBy {
    None,
    #[default]
    Pos,
    Freq,
}

/// How the color is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Text,
    Underline,
}

/// Class used for every token when coloring is off.
pub const NEUTRAL_CLASS: &str = "text-gray-700";

/// Label used for tokens without a frequency bucket.
pub const UNKNOWN_BUCKET: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub color_by: ColorBy,
    pub color_mode: ColorMode,
    pub show_transliteration: bool,
    pub show_translation: bool,
    /// Hide the video and keep only audio playback
    pub audio_only: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            color_by: ColorBy::Pos,
            color_mode: ColorMode::Text,
            show_transliteration: true,
            show_translation: false,
            audio_only: false,
        }
    }
}

impl DisplayOptions {
    pub fn use_underline(&self) -> bool {
        self.color_mode == ColorMode::Underline
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedToken {
    pub text: String,
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedCue {
    pub index: usize,
    pub begin_ms: f64,
    pub timestamp: String,
    pub active: bool,
    pub tokens: Vec<RenderedToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBucket {
    pub label: &'static str,
    pub tokens: Vec<RenderedToken>,
}

/// Renders parsed subtitles according to a set of display options.
#[derive(Debug)]
pub struct SubtitleView<'a> {
    parsed: &'a ParsedSubs,
    translations: Option<&'a Translations>,
    options: DisplayOptions,
    pos_classes: ClassResolver,
    freq_classes: ClassResolver,
}

impl<'a> SubtitleView<'a> {
    pub fn new(parsed: &'a ParsedSubs, options: DisplayOptions) -> Self {
        SubtitleView {
            parsed,
            translations: None,
            options,
            pos_classes: ClassResolver::pos(),
            freq_classes: ClassResolver::freq(),
        }
    }

    pub fn with_translations(mut self, translations: &'a Translations) -> Self {
        self.translations = Some(translations);
        self
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// Frequency coloring is meaningless when the payload has no ranks.
    fn effective_color_by(&self) -> ColorBy {
        match self.options.color_by {
            ColorBy::Freq if !self.parsed.have_word_frequency => ColorBy::None,
            other => other,
        }
    }

    fn class_for(&self, token: &AnnotatedToken, bucket_key: &str) -> String {
        let underline = self.options.use_underline();
        match self.effective_color_by() {
            ColorBy::None => NEUTRAL_CLASS.to_string(),
            ColorBy::Pos => self.pos_classes.resolve(token.pos_key(), underline),
            ColorBy::Freq => self.freq_classes.resolve(bucket_key, underline),
        }
    }

    fn render_token(&self, token: &AnnotatedToken, bucket_key: &str) -> RenderedToken {
        RenderedToken {
            text: token.text().to_string(),
            class: self.class_for(token, bucket_key),
            transliteration: self
                .options
                .show_transliteration
                .then(|| token.transliteration.clone()),
        }
    }

    fn render_cue(&self, index: usize, cue: &EnrichedCue, active: Option<usize>) -> RenderedCue {
        RenderedCue {
            index,
            begin_ms: cue.begin(),
            timestamp: format_timestamp_ms(cue.begin()),
            active: active == Some(index),
            tokens: cue
                .tokens
                .iter()
                .map(|t| self.render_token(t, t.frequency_bucket.unwrap_or(UNKNOWN_BUCKET)))
                .collect(),
            translation: self
                .options
                .show_translation
                .then(|| self.translations.and_then(|t| t.get(index)))
                .flatten()
                .map(str::to_string),
        }
    }

    /// Every cue, with `active` marking the highlighted one.
    pub fn render_cues(&self, active: Option<usize>) -> Vec<RenderedCue> {
        self.parsed
            .subtitles
            .iter()
            .enumerate()
            .map(|(i, cue)| self.render_cue(i, cue, active))
            .collect()
    }

    /// Vocabulary buckets in ascending rank order.
    pub fn render_vocabulary(&self) -> Vec<RenderedBucket> {
        self.parsed
            .vocabulary
            .by_rank()
            .into_iter()
            .map(|(label, tokens)| RenderedBucket {
                label,
                tokens: tokens.iter().map(|t| self.render_token(t, label)).collect(),
            })
            .collect()
    }

    /// Lookups that found no display class so far.
    pub fn unstyled_lookups(&self) -> usize {
        self.pos_classes.misses() + self.freq_classes.misses()
    }
}

/// The token the user picked for a dictionary lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedToken {
    pub word: String,
    pub transliteration: String,
}

/// UI state shared by the panels. Owned by the caller and passed down
/// explicitly; the pipeline never reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub drawer_open: bool,
    pub selected: Option<SelectedToken>,
    pub dict_query: Option<DictQuery>,
    pub active_cue: Option<usize>,
    /// Set when selecting a word should pause playback
    pub pause_requested: bool,
}

impl ViewState {
    pub fn new() -> Self {
        ViewState::default()
    }

    /// Open the dictionary drawer for `token`.
    pub fn select_token(&mut self, token: &AnnotatedToken, lang: &str) {
        self.selected = Some(SelectedToken {
            word: token.text().to_string(),
            transliteration: token.transliteration.clone(),
        });
        self.dict_query = Some(DictQuery::new(token.text(), token.pos_key(), lang));
        self.drawer_open = true;
        self.pause_requested = true;
    }

    pub fn close_drawer(&mut self) {
        self.drawer_open = false;
    }

    /// Record a new active cue. Returns `true` when it changed, i.e. when
    /// the panel should scroll.
    pub fn set_active(&mut self, index: Option<usize>) -> bool {
        if index.is_none() || index == self.active_cue {
            return false;
        }
        self.active_cue = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::SubtitleCue;
    use crate::color::{FREQ_COLORS, POS_COLORS, UNDERLINE_MODIFIER};
    use crate::payload::SourceSubsData;
    use crate::token::RawToken;

    fn parsed(have_word_frequency: bool) -> ParsedSubs {
        let mut tok = RawToken::with_text("hola").with_freq(50.0).with_pos("INTJ");
        tok.form.translit = Some(crate::token::Translit::One("o-la".into()));
        ParsedSubs::from_source(&SourceSubsData {
            nlp: vec![vec![tok], vec![RawToken::with_text("???").with_pos("WEIRD")]],
            subs: vec![SubtitleCue::new(0.0, 1000.0, "hola"), SubtitleCue::new(61_000.0, 62_000.0, "???")],
            have_word_frequency,
        })
    }

    #[test]
    fn test_render_by_pos() {
        let parsed = parsed(true);
        let view = SubtitleView::new(&parsed, DisplayOptions::default());
        let cues = view.render_cues(Some(1));

        assert_eq!(cues[0].tokens[0].class, POS_COLORS["INTJ"]);
        assert_eq!(cues[0].tokens[0].transliteration.as_deref(), Some("o-la"));
        assert_eq!(cues[1].timestamp, "00:01:01");
        assert!(cues[1].active);
        assert_eq!(cues[1].tokens[0].class, "");
        assert_eq!(view.unstyled_lookups(), 1);
    }

    #[test]
    fn test_render_by_freq_underlined() {
        let parsed = parsed(true);
        let options = DisplayOptions {
            color_by: ColorBy::Freq,
            color_mode: ColorMode::Underline,
            show_transliteration: false,
            ..Default::default()
        };
        let view = SubtitleView::new(&parsed, options);
        let cues = view.render_cues(None);
        assert_eq!(cues[0].tokens[0].class, format!("{} {}", FREQ_COLORS["1-100"], UNDERLINE_MODIFIER));
        assert!(cues[0].tokens[0].transliteration.is_none());

        let vocab = view.render_vocabulary();
        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab[0].label, "1-100");
    }

    #[test]
    fn test_freq_disabled_without_ranks() {
        let parsed = parsed(false);
        let options = DisplayOptions {
            color_by: ColorBy::Freq,
            ..Default::default()
        };
        let view = SubtitleView::new(&parsed, options);
        assert_eq!(view.render_cues(None)[0].tokens[0].class, NEUTRAL_CLASS);
    }

    #[test]
    fn test_translations() {
        let parsed = parsed(true);
        let translations = Translations::new(vec!["hello".into()]);
        let options = DisplayOptions {
            show_translation: true,
            ..Default::default()
        };
        let view = SubtitleView::new(&parsed, options).with_translations(&translations);
        let cues = view.render_cues(None);
        assert_eq!(cues[0].translation.as_deref(), Some("hello"));
        assert_eq!(cues[1].translation, None);
    }

    #[test]
    fn test_view_state() {
        let parsed = parsed(true);
        let mut state = ViewState::new();
        state.select_token(&parsed.subtitles[0].tokens[0], "es");

        assert!(state.drawer_open);
        assert!(state.pause_requested);
        let query = state.dict_query.as_ref().unwrap();
        assert_eq!(query.form, "hola");
        assert_eq!(query.pos, "INTJ");
        assert_eq!(state.selected.as_ref().unwrap().transliteration, "o-la");

        assert!(state.set_active(Some(2)));
        assert!(!state.set_active(Some(2)));
        assert!(!state.set_active(None));
        assert_eq!(state.active_cue, Some(2));

        state.close_drawer();
        assert!(!state.drawer_open);
    }
}
