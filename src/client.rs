//! Blocking client for the subtitle, dictionary and TTS services.
//!
//! Only compiled with the `fetch` feature.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::ServiceConfig;
use crate::dictionary::{DictEntry, DictQuery, DictResponse, TtsRequest, TtsResponse};
use crate::error::{Error, Result};
use crate::payload::{parse_subs_response, SourceSubsData, Translations};

const SUBS_DATA_PATH: &str = "base_media_getYoutubeSubsData_2";
const SUBS_TRANSLATIONS_PATH: &str = "base_media_getYoutubeSubsTranslations";
const FULL_DICT_PATH: &str = "base_dict_getFullDict_8";
const HOVER_DICT_PATH: &str = "base_dict_getHoverDict_8";
const DICT_TTS_PATH: &str = "base_dict_getDictTTS_3";

/// Media source type sent with every subtitle request.
pub const MEDIA_TYPE: &str = "YT";

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

pub struct ServiceClient {
    http: reqwest::blocking::Client,
    config: ServiceConfig,
}

impl ServiceClient {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("subgloss/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout().max(Duration::from_secs(1)))
            .build()?;
        Ok(ServiceClient { http, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response)
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = endpoint(&self.config.media_base_url, path);
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send()?;
        Ok(Self::check(response)?.json()?)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = endpoint(&self.config.dict_base_url, path);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).query(query).send()?;
        Ok(Self::check(response)?.json()?)
    }

    /// Raw subtitle payload for a video, as the service returns it.
    pub fn subs_data_raw(&self, video_id: &str) -> Result<Value> {
        self.post(SUBS_DATA_PATH, &json!({ "type": MEDIA_TYPE, "videoId": video_id }))
    }

    /// Subtitle payload, degraded to empty when the service reports failure.
    pub fn subs_data(&self, video_id: &str) -> Result<SourceSubsData> {
        Ok(parse_subs_response(&self.subs_data_raw(video_id)?))
    }

    /// Per-cue translations into the configured target language.
    pub fn subs_translations(&self, video_id: &str) -> Result<Translations> {
        let body = json!({
            "videoId": video_id,
            "destLang_G": self.config.target_lang,
            "type": MEDIA_TYPE,
        });
        let value: Value = self.post(SUBS_TRANSLATIONS_PATH, &body)?;
        Ok(Translations::from_json(&value))
    }

    pub fn full_dict(&self, query: &DictQuery) -> Result<Option<DictEntry>> {
        let response: DictResponse = self.get(FULL_DICT_PATH, &query.query_pairs())?;
        Ok(response.data)
    }

    /// Short popup entry; the shape is passed through untouched.
    pub fn hover_dict(&self, query: &DictQuery) -> Result<Value> {
        self.get(HOVER_DICT_PATH, &query.query_pairs())
    }

    /// Audio data URL for a word or sentence.
    pub fn tts(&self, request: &TtsRequest) -> Result<String> {
        let response: TtsResponse = self.get(DICT_TTS_PATH, &request.query_pairs())?;
        response.into_audio()
    }

    pub fn word_tts(&self, lang: &str, word: &str) -> Result<String> {
        self.tts(&TtsRequest::word(lang, word))
    }

    pub fn sentence_tts(&self, lang: &str, text: &str, text_hash: &str) -> Result<String> {
        self.tts(&TtsRequest {
            lang: lang.to_string(),
            text: text.to_string(),
            text_hash: Some(text_hash.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("https://api-cdn.dioco.io/", SUBS_DATA_PATH),
            "https://api-cdn.dioco.io/base_media_getYoutubeSubsData_2"
        );
        assert_eq!(endpoint("http://localhost:8080", FULL_DICT_PATH), "http://localhost:8080/base_dict_getFullDict_8");
    }

    #[test]
    fn test_client_builds() {
        let client = ServiceClient::new(ServiceConfig::default()).unwrap();
        assert_eq!(client.config().target_lang, "en");
    }

    #[test]
    fn test_unreachable_service_is_http_error() {
        let config = ServiceConfig {
            dict_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };
        let client = ServiceClient::new(config).unwrap();
        assert!(matches!(client.word_tts("es", "hola"), Err(Error::Http(_))));
    }
}
