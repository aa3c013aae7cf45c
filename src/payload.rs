//! Response models of the subtitle and translation services.
//!
//! Only a `"success"` response carries data. Everything else, including
//! responses that do not match the expected shape, degrades to an empty
//! payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::align::SubtitleCue;
use crate::lenient;
use crate::token::RawToken;

/// Status value of a successful response.
pub const STATUS_SUCCESS: &str = "success";

/// Top-level subtitle service response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubsResponse {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub status: String,
    #[serde(default)]
    pub data: Option<SubsResponseData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsResponseData {
    #[serde(default)]
    pub source_subs: Option<SourceSubs>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceSubs {
    #[serde(default)]
    pub data: Option<SourceSubsData>,
}

/// Cues, per-cue token groups and the frequency flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSubsData {
    #[serde(default, deserialize_with = "lenient::nested_items")]
    pub nlp: Vec<Vec<RawToken>>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub subs: Vec<SubtitleCue>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub have_word_frequency: bool,
}

impl SubsResponse {
    /// The source data, or an empty payload when the response did not succeed.
    pub fn into_source(self) -> SourceSubsData {
        if self.status != STATUS_SUCCESS {
            tracing::warn!(status = %self.status, "subtitle response not successful");
            return SourceSubsData::default();
        }
        self.data
            .and_then(|d| d.source_subs)
            .and_then(|s| s.data)
            .unwrap_or_else(|| {
                tracing::warn!("subtitle response has no source data");
                SourceSubsData::default()
            })
    }
}

/// Extract source data from an arbitrary JSON response.
pub fn parse_subs_response(value: &Value) -> SourceSubsData {
    match SubsResponse::deserialize(value) {
        Ok(response) => response.into_source(),
        Err(e) => {
            tracing::warn!(error = %e, "malformed subtitle response");
            SourceSubsData::default()
        }
    }
}

/// Cue translations, index-aligned with the cue sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Translations(Vec<String>);

impl Translations {
    pub fn new(lines: Vec<String>) -> Self {
        Translations(lines)
    }

    /// Accepts either a bare array or an object with a `data` array.
    /// Non-string entries become empty lines so indexes stay aligned.
    pub fn from_json(value: &Value) -> Self {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(items)) => items,
                _ => return Translations::default(),
            },
            _ => return Translations::default(),
        };
        Translations(
            items
                .iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect(),
        )
    }

    /// Translation for cue `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
