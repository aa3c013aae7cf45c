//! Small key/value persistence for watch history, word status lists and
//! user preferences.
//!
//! Values are JSON so the same records can move between the in-memory store
//! used by tests and the file store used by the CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::timefmt::format_remaining_secs;

/// Key of the watch history list.
pub const HISTORY_KEY: &str = "history";
/// Key of the known/learning word lists.
pub const WORD_STATUS_KEY: &str = "wordStatus";
/// Key of the last selected language.
pub const LANG_KEY: &str = "lang";
/// Language used before the user picks one.
pub const DEFAULT_LANG: &str = "zh-CN";
/// Filter value matching everything.
pub const ALL: &str = "ALL";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Read and decode `key`. Undecodable values are treated as absent.
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        Ok(self.get(key)?.and_then(|v| match serde_json::from_value(v) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring malformed stored value");
                None
            }
        }))
    }

    fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.set(key, serde_json::to_value(value)?)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        lock(&self.values).insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

/// `<data dir>/subgloss/store.json`, or `./store.json` when the platform
/// has no data directory.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("subgloss"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("store.json")
}

impl JsonFileStore {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(Error::Io { path, source }),
        };
        Ok(JsonFileStore {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn open_default() -> Result<Self> {
        JsonFileStore::open(default_store_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, Value>) -> Result<()> {
        let io_err = |source| Error::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(lock(&self.values).get(key).cloned())
    }

    /// The new value becomes visible only once it is on disk.
    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = lock(&self.values);
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.flush(&next)?;
        *values = next;
        Ok(())
    }
}

/// The last language the user selected.
pub fn preferred_lang<S: KeyValueStore>(store: &S) -> Result<String> {
    Ok(store
        .get_as::<String>(LANG_KEY)?
        .unwrap_or_else(|| DEFAULT_LANG.to_string()))
}

pub fn set_preferred_lang<S: KeyValueStore>(store: &S, lang: &str) -> Result<()> {
    store.set_as(LANG_KEY, &lang)
}

// ============================================================================
// Watch history
// ============================================================================

/// Progress through one video in one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchRecord {
    pub video_id: String,
    pub lang: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "author_name")]
    pub author_name: String,
    #[serde(default, rename = "thumbnail_url")]
    pub thumbnail_url: String,
    /// Where playback last stopped, in seconds
    #[serde(default)]
    pub last_timestamp: f64,
    /// Video length in seconds
    #[serde(default)]
    pub max_timestamp: f64,
}

impl WatchRecord {
    pub fn new(video_id: impl Into<String>, lang: impl Into<String>) -> Self {
        WatchRecord {
            video_id: video_id.into(),
            lang: lang.into(),
            ..Default::default()
        }
    }

    /// Time left to watch, e.g. `12:34`.
    pub fn remaining(&self) -> String {
        format_remaining_secs(self.max_timestamp - self.last_timestamp)
    }

    /// Fraction watched, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.max_timestamp > 0.0 {
            (self.last_timestamp / self.max_timestamp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn same_video(&self, other: &WatchRecord) -> bool {
        self.video_id == other.video_id && self.lang == other.lang
    }
}

/// Watch history, most recent first.
pub struct WatchHistory<'s, S: KeyValueStore> {
    store: &'s S,
}

impl<'s, S: KeyValueStore> WatchHistory<'s, S> {
    pub fn new(store: &'s S) -> Self {
        WatchHistory { store }
    }

    pub fn all(&self) -> Result<Vec<WatchRecord>> {
        Ok(self.store.get_as(HISTORY_KEY)?.unwrap_or_default())
    }

    pub fn for_lang(&self, lang: &str) -> Result<Vec<WatchRecord>> {
        Ok(self.all()?.into_iter().filter(|r| r.lang == lang).collect())
    }

    pub fn get(&self, video_id: &str, lang: &str) -> Result<Option<WatchRecord>> {
        Ok(self
            .all()?
            .into_iter()
            .find(|r| r.video_id == video_id && r.lang == lang))
    }

    /// Insert or replace the record for the same video and language, moving
    /// it to the front. Metadata left empty keeps the previous values.
    pub fn record(&self, mut record: WatchRecord) -> Result<()> {
        let mut records = self.all()?;
        if let Some(pos) = records.iter().position(|r| r.same_video(&record)) {
            let previous = records.remove(pos);
            for (field, old) in [
                (&mut record.title, previous.title),
                (&mut record.author_name, previous.author_name),
                (&mut record.thumbnail_url, previous.thumbnail_url),
            ] {
                if field.is_empty() {
                    *field = old;
                }
            }
            record.max_timestamp = record.max_timestamp.max(previous.max_timestamp);
        }
        records.insert(0, record);
        self.store.set_as(HISTORY_KEY, &records)
    }

    pub fn remove(&self, video_id: &str, lang: &str) -> Result<bool> {
        let mut records = self.all()?;
        let before = records.len();
        records.retain(|r| !(r.video_id == video_id && r.lang == lang));
        if records.len() == before {
            return Ok(false);
        }
        self.store.set_as(HISTORY_KEY, &records)?;
        Ok(true)
    }
}

// ============================================================================
// Word status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Known,
    Learning,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedWord {
    pub word: String,
    pub pos: String,
    pub lang: String,
    #[serde(default)]
    pub transliteration: String,
}

impl SavedWord {
    pub fn new(word: impl Into<String>, pos: impl Into<String>, lang: impl Into<String>) -> Self {
        SavedWord {
            word: word.into(),
            pos: pos.into(),
            lang: lang.into(),
            transliteration: String::new(),
        }
    }

    fn same_word(&self, other: &SavedWord) -> bool {
        self.word == other.word && self.pos == other.pos && self.lang == other.lang
    }

    /// `filter` values of `"ALL"` match anything.
    pub fn matches(&self, filter: &WordFilter) -> bool {
        (filter.pos == ALL || self.pos == filter.pos) && (filter.lang == ALL || self.lang == filter.lang)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordFilter {
    pub pos: String,
    pub lang: String,
}

impl Default for WordFilter {
    fn default() -> Self {
        WordFilter {
            pos: ALL.to_string(),
            lang: ALL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordLists {
    #[serde(default)]
    pub known: Vec<SavedWord>,
    #[serde(default)]
    pub learning: Vec<SavedWord>,
}

impl WordLists {
    pub fn list(&self, status: WordStatus) -> &[SavedWord] {
        match status {
            WordStatus::Known => &self.known,
            WordStatus::Learning => &self.learning,
        }
    }

    fn list_mut(&mut self, status: WordStatus) -> &mut Vec<SavedWord> {
        match status {
            WordStatus::Known => &mut self.known,
            WordStatus::Learning => &mut self.learning,
        }
    }
}

/// Known and learning word lists.
pub struct WordBook<'s, S: KeyValueStore> {
    store: &'s S,
}

impl<'s, S: KeyValueStore> WordBook<'s, S> {
    pub fn new(store: &'s S) -> Self {
        WordBook { store }
    }

    pub fn lists(&self) -> Result<WordLists> {
        Ok(self.store.get_as(WORD_STATUS_KEY)?.unwrap_or_default())
    }

    pub fn status_of(&self, word: &SavedWord) -> Result<Option<WordStatus>> {
        let lists = self.lists()?;
        Ok([WordStatus::Known, WordStatus::Learning]
            .into_iter()
            .find(|&s| lists.list(s).iter().any(|w| w.same_word(word))))
    }

    /// Put `word` in `status`'s list, removing it from the other one.
    pub fn set_status(&self, word: SavedWord, status: WordStatus) -> Result<()> {
        let mut lists = self.lists()?;
        lists.known.retain(|w| !w.same_word(&word));
        lists.learning.retain(|w| !w.same_word(&word));
        lists.list_mut(status).push(word);
        self.store.set_as(WORD_STATUS_KEY, &lists)
    }

    pub fn forget(&self, word: &SavedWord) -> Result<bool> {
        let mut lists = self.lists()?;
        let before = lists.known.len() + lists.learning.len();
        lists.known.retain(|w| !w.same_word(word));
        lists.learning.retain(|w| !w.same_word(word));
        if lists.known.len() + lists.learning.len() == before {
            return Ok(false);
        }
        self.store.set_as(WORD_STATUS_KEY, &lists)?;
        Ok(true)
    }

    pub fn filtered(&self, status: WordStatus, filter: &WordFilter) -> Result<Vec<SavedWord>> {
        Ok(self
            .lists()?
            .list(status)
            .iter()
            .filter(|w| w.matches(filter))
            .cloned()
            .collect())
    }
}
