//! Dictionary and text-to-speech request/response models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotate::sentence_transliteration;
use crate::error::{Error, Result};
use crate::token::{PartOfSpeech, RawToken};
use crate::tracker::TextChunk;

/// Prefix every accepted TTS payload must carry.
pub const AUDIO_DATA_URL_PREFIX: &str = "data:audio/";

/// A full dictionary lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DictQuery {
    pub form: String,
    pub lemma: String,
    pub source_lang: String,
    pub target_lang: String,
    pub pos: String,
    pub pos_abbrev: String,
}

impl DictQuery {
    /// Lookup for a surface form; the lemma is left for the service to infer.
    pub fn new(form: impl Into<String>, pos: impl Into<String>, source_lang: impl Into<String>) -> Self {
        DictQuery {
            form: form.into(),
            lemma: String::new(),
            source_lang: source_lang.into(),
            target_lang: "en".to_string(),
            pos: pos.into(),
            pos_abbrev: "n".to_string(),
        }
    }

    pub fn target(mut self, lang: impl Into<String>) -> Self {
        self.target_lang = lang.into();
        self
    }

    /// Query-string pairs in the service's parameter names.
    pub fn query_pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("form", self.form.as_str()),
            ("lemma", self.lemma.as_str()),
            ("sl", self.source_lang.as_str()),
            ("tl", self.target_lang.as_str()),
            ("pos", self.pos.as_str()),
            ("pow", self.pos_abbrev.as_str()),
        ]
    }
}

/// Wrapper the dictionary service puts around an entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictResponse {
    #[serde(default)]
    pub data: Option<DictEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictEntry {
    #[serde(default)]
    pub render_data: Option<RenderData>,
    /// Example sentences keyed by POS tag
    #[serde(default)]
    pub tatoeba_examples: Option<BTreeMap<String, Vec<DictExample>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderData {
    #[serde(default)]
    pub full_dict_render_data: Option<FullDictRenderData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullDictRenderData {
    #[serde(default)]
    pub entries: Vec<DictEntryItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictEntryItem {
    #[serde(default)]
    pub pos_groups: Vec<PosGroup>,
}

/// Translations for one part of speech.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosGroup {
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub translations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleTranslation {
    #[serde(default)]
    pub text: String,
}

/// An example sentence with its own token annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictExample {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub text_hash: Option<String>,
    #[serde(default)]
    pub nlp: Vec<RawToken>,
    #[serde(default)]
    pub translation: Option<ExampleTranslation>,
    #[serde(default)]
    pub avg_freq_rank: Option<f64>,
}

impl DictExample {
    pub fn transliteration(&self) -> String {
        sentence_transliteration(&self.nlp)
    }

    /// The sentence's tokens, marking those whose surface text is `word`.
    pub fn highlight(&self, word: &str) -> Vec<TextChunk> {
        self.nlp
            .iter()
            .map(|t| TextChunk {
                text: t.form.text.clone(),
                is_match: t.form.text == word,
            })
            .collect()
    }

    /// Request for this sentence's audio.
    pub fn tts_request(&self, lang: &str) -> TtsRequest {
        TtsRequest {
            lang: lang.to_string(),
            text: self.text.clone(),
            text_hash: self.text_hash.clone(),
        }
    }
}

impl DictEntry {
    /// POS groups of the first entry.
    pub fn pos_groups(&self) -> &[PosGroup] {
        self.render_data
            .as_ref()
            .and_then(|r| r.full_dict_render_data.as_ref())
            .and_then(|f| f.entries.first())
            .map(|e| e.pos_groups.as_slice())
            .unwrap_or_default()
    }

    /// The first group's tag, `"X"` when there is none.
    pub fn primary_pos(&self) -> &str {
        self.pos_groups()
            .first()
            .and_then(|g| g.pos.as_deref())
            .unwrap_or("X")
    }

    /// Example groups with a readable heading. Unknown tags are shown as sent.
    pub fn examples_by_pos(&self) -> Vec<(String, &[DictExample])> {
        let Some(ref examples) = self.tatoeba_examples else {
            return Vec::new();
        };
        examples
            .iter()
            .map(|(tag, list)| {
                let heading = PartOfSpeech::from_tag(tag)
                    .map(|p| p.readable().to_string())
                    .unwrap_or_else(|| tag.clone());
                (heading, list.as_slice())
            })
            .collect()
    }
}

/// A word or sentence TTS request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TtsRequest {
    pub lang: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_hash: Option<String>,
}

impl TtsRequest {
    pub fn word(lang: impl Into<String>, text: impl Into<String>) -> Self {
        TtsRequest {
            lang: lang.into(),
            text: text.into(),
            text_hash: None,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("lang", self.lang.as_str()), ("text", self.text.as_str())];
        if let Some(ref hash) = self.text_hash {
            pairs.push(("textHash", hash.as_str()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TtsResponse {
    #[serde(default)]
    pub data: Option<String>,
}

impl TtsResponse {
    /// The audio data URL, rejecting anything else.
    pub fn into_audio(self) -> Result<String> {
        match self.data {
            Some(url) => validate_audio_data_url(&url).map(str::to_string),
            None => Err(Error::InvalidAudio),
        }
    }
}

/// Accept only `data:audio/...` URLs.
pub fn validate_audio_data_url(url: &str) -> Result<&str> {
    if url.starts_with(AUDIO_DATA_URL_PREFIX) {
        Ok(url)
    } else {
        Err(Error::InvalidAudio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs() {
        let q = DictQuery::new("空调", "NOUN", "zh-CN");
        let pairs = q.query_pairs();
        assert_eq!(pairs[0], ("form", "空调"));
        assert_eq!(pairs[2], ("sl", "zh-CN"));
        assert_eq!(pairs[3], ("tl", "en"));
        assert_eq!(pairs[5], ("pow", "n"));
    }

    #[test]
    fn test_entry_parsing() {
        let response: DictResponse = serde_json::from_value(json!({
            "data": {
                "renderData": { "fullDictRenderData": { "entries": [
                    { "posGroups": [ { "pos": "NOUN", "translations": ["air conditioner", "AC"] } ] }
                ]}},
                "tatoebaExamples": {
                    "NOUN": [ {
                        "text": "空调坏了",
                        "textHash": "abc",
                        "nlp": [
                            { "form": { "text": "空调", "pinyin": ["kong1", "tiao2"] } },
                            { "form": { "text": "坏了", "pinyin": ["huai4", "le5"] } }
                        ],
                        "translation": { "text": "The AC is broken" },
                        "avgFreqRank": 1234.5
                    } ],
                    "ZZZ": []
                }
            }
        }))
        .unwrap();

        let entry = response.data.unwrap();
        assert_eq!(entry.primary_pos(), "NOUN");
        assert_eq!(entry.pos_groups()[0].translations.len(), 2);

        let groups = entry.examples_by_pos();
        assert_eq!(groups[0].0, "Noun");
        assert_eq!(groups[1].0, "ZZZ");

        let example = &groups[0].1[0];
        assert_eq!(example.transliteration(), "kong1 tiao2 huai4 le5");
        let marks: Vec<_> = example.highlight("空调").iter().map(|c| c.is_match).collect();
        assert_eq!(marks, vec![true, false]);
        assert_eq!(example.tts_request("zh-CN").text_hash.as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_entry() {
        let entry = DictEntry::default();
        assert!(entry.pos_groups().is_empty());
        assert_eq!(entry.primary_pos(), "X");
        assert!(entry.examples_by_pos().is_empty());
    }

    #[test]
    fn test_audio_validation() {
        assert!(validate_audio_data_url("data:audio/mpeg;base64,AAAA").is_ok());
        assert!(matches!(validate_audio_data_url("data:text/html,hi"), Err(Error::InvalidAudio)));
        assert!(matches!(TtsResponse::default().into_audio(), Err(Error::InvalidAudio)));
    }

    #[test]
    fn test_tts_pairs() {
        let word = TtsRequest::word("es", "hola");
        assert_eq!(word.query_pairs().len(), 2);
    }
}
