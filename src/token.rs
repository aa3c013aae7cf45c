//! Token records as delivered by the NLP service and after annotation.
//!
//! The upstream service is loosely typed: transliterations may be a string or
//! a list, frequency ranks may be numbers, numeric strings or garbage, and
//! most fields can be missing. Those shapes are modelled here as optional
//! fields and untagged enums so that any token deserializes; [`crate::annotate`]
//! is the only place that interprets them.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Part-of-speech tags used by the NLP service (Universal Dependencies set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adj,
    Adv,
    Pron,
    Propn,
    Num,
    Adp,
    Part,
    Cconj,
    Sconj,
    Det,
    Aux,
    Intj,
    Sym,
    X,
    Punct,
}

impl PartOfSpeech {
    /// Every tag, in display order.
    pub const ALL: [PartOfSpeech; 17] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adj,
        PartOfSpeech::Adv,
        PartOfSpeech::Pron,
        PartOfSpeech::Propn,
        PartOfSpeech::Num,
        PartOfSpeech::Adp,
        PartOfSpeech::Part,
        PartOfSpeech::Cconj,
        PartOfSpeech::Sconj,
        PartOfSpeech::Det,
        PartOfSpeech::Aux,
        PartOfSpeech::Intj,
        PartOfSpeech::Sym,
        PartOfSpeech::X,
        PartOfSpeech::Punct,
    ];

    /// The tag as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Adj => "ADJ",
            PartOfSpeech::Adv => "ADV",
            PartOfSpeech::Pron => "PRON",
            PartOfSpeech::Propn => "PROPN",
            PartOfSpeech::Num => "NUM",
            PartOfSpeech::Adp => "ADP",
            PartOfSpeech::Part => "PART",
            PartOfSpeech::Cconj => "CCONJ",
            PartOfSpeech::Sconj => "SCONJ",
            PartOfSpeech::Det => "DET",
            PartOfSpeech::Aux => "AUX",
            PartOfSpeech::Intj => "INTJ",
            PartOfSpeech::Sym => "SYM",
            PartOfSpeech::X => "X",
            PartOfSpeech::Punct => "PUNCT",
        }
    }

    /// Parse a wire tag. Unknown tags return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        PartOfSpeech::ALL.into_iter().find(|pos| pos.as_str() == tag)
    }

    /// Human-readable name for headings.
    pub fn readable(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "Noun",
            PartOfSpeech::Verb => "Verb",
            PartOfSpeech::Adj => "Adjective",
            PartOfSpeech::Adv => "Adverb",
            PartOfSpeech::Pron => "Pronoun",
            PartOfSpeech::Propn => "Proper Noun",
            PartOfSpeech::Num => "Numeral",
            PartOfSpeech::Adp => "Adposition",
            PartOfSpeech::Part => "Particle",
            PartOfSpeech::Cconj => "Coordinating Conjunction",
            PartOfSpeech::Sconj => "Subordinating Conjunction",
            PartOfSpeech::Det => "Determiner",
            PartOfSpeech::Aux => "Auxiliary Verb",
            PartOfSpeech::Intj => "Interjection",
            PartOfSpeech::Sym => "Symbol",
            PartOfSpeech::X => "Unknown",
            PartOfSpeech::Punct => "Punctuation",
        }
    }
}

/// A transliteration value: a single string or a list of syllables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translit {
    One(String),
    Many(Vec<String>),
    /// Any other JSON shape; treated as absent.
    Other(serde_json::Value),
}

impl Translit {
    /// The value as display text, list items joined by a single space.
    ///
    /// Returns `None` for empty values and unusable shapes.
    pub fn joined(&self) -> Option<String> {
        let text = match self {
            Translit::One(s) => s.clone(),
            Translit::Many(parts) => parts.join(" "),
            Translit::Other(_) => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// A frequency rank value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

/// The surface form of a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenForm {
    /// Surface text
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub text: String,

    /// Pinyin syllables (Chinese only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinyin: Option<Translit>,

    /// Generic transliteration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translit: Option<Translit>,
}

/// A secondary form (normalized form or lemma) carrying only a transliteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslitForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translit: Option<Translit>,
}

/// A token as produced by the NLP service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToken {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub form: TokenForm,

    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub form_norm: Option<TranslitForm>,

    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub lemma: Option<TranslitForm>,

    /// Part-of-speech tag, kept as sent; non-string tags are dropped
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub pos: Option<String>,

    /// Frequency rank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq: Option<RankValue>,

    /// Frequency rank under the alternate field name
    #[serde(default, rename = "diocoFreq", skip_serializing_if = "Option::is_none")]
    pub alt_freq: Option<RankValue>,
}

impl RawToken {
    /// Create a token with only surface text.
    pub fn with_text(text: impl Into<String>) -> Self {
        RawToken {
            form: TokenForm {
                text: text.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Builder-style rank setter.
    pub fn with_freq(mut self, rank: f64) -> Self {
        self.freq = Some(RankValue::Number(rank));
        self
    }

    /// Builder-style POS setter.
    pub fn with_pos(mut self, tag: impl Into<String>) -> Self {
        self.pos = Some(tag.into());
        self
    }

    /// The parsed part of speech, if the tag is known.
    pub fn part_of_speech(&self) -> Option<PartOfSpeech> {
        self.pos.as_deref().and_then(PartOfSpeech::from_tag)
    }

    /// The tag used as a color key; absent tags become `"X"`.
    pub fn pos_key(&self) -> &str {
        self.pos.as_deref().unwrap_or("X")
    }
}

/// A token with display-ready derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedToken {
    #[serde(flatten)]
    pub raw: RawToken,

    /// Frequency bucket label, `None` when the rank is unknown
    pub frequency_bucket: Option<&'static str>,

    /// Transliteration, empty when none of the sources is present
    pub transliteration: String,
}

impl AnnotatedToken {
    /// Surface text.
    pub fn text(&self) -> &str {
        &self.raw.form.text
    }

    /// POS color key.
    pub fn pos_key(&self) -> &str {
        self.raw.pos_key()
    }
}

impl std::fmt::Display for AnnotatedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())?;
        if let Some(ref pos) = self.raw.pos {
            write!(f, "/{}", pos)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pos_roundtrip_tags() {
        for pos in PartOfSpeech::ALL {
            assert_eq!(PartOfSpeech::from_tag(pos.as_str()), Some(pos));
        }
        assert_eq!(PartOfSpeech::from_tag("NOPE"), None);
        assert_eq!(PartOfSpeech::Propn.readable(), "Proper Noun");
    }

    #[test]
    fn test_loose_token_shapes_deserialize() {
        let token: RawToken = serde_json::from_value(json!({
            "form": { "text": "你好", "pinyin": ["ni3", "hao3"], "translit": 7 },
            "lemma": { "translit": "ni3hao3" },
            "pos": "INTJ",
            "freq": "oops",
            "diocoFreq": "120"
        }))
        .unwrap();

        assert_eq!(token.form.text, "你好");
        assert_eq!(token.form.pinyin, Some(Translit::Many(vec!["ni3".into(), "hao3".into()])));
        assert!(matches!(token.form.translit, Some(Translit::Other(_))));
        assert_eq!(token.freq, Some(RankValue::Text("oops".into())));
        assert_eq!(token.alt_freq, Some(RankValue::Text("120".into())));
        assert_eq!(token.part_of_speech(), Some(PartOfSpeech::Intj));
    }

    #[test]
    fn test_missing_fields_deserialize() {
        let token: RawToken = serde_json::from_value(json!({})).unwrap();
        assert_eq!(token.form.text, "");
        assert_eq!(token.pos_key(), "X");
        assert!(token.freq.is_none());
    }

    #[test]
    fn test_translit_joined() {
        assert_eq!(Translit::One("hola".into()).joined(), Some("hola".into()));
        assert_eq!(Translit::Many(vec!["a".into(), "b".into()]).joined(), Some("a b".into()));
        assert_eq!(Translit::One(String::new()).joined(), None);
        assert_eq!(Translit::Many(vec![]).joined(), None);
        assert_eq!(Translit::Other(json!(3)).joined(), None);
    }
}
