//! Per-token annotation: frequency bucket and transliteration.

use crate::frequency::{bucket_for, parse_rank_text};
use crate::token::{AnnotatedToken, RankValue, RawToken, Translit};

/// Derive the display fields for one token.
///
/// Never fails: absent or malformed source data yields `None` for the bucket
/// and an empty transliteration.
pub fn annotate(token: &RawToken) -> AnnotatedToken {
    AnnotatedToken {
        raw: token.clone(),
        frequency_bucket: bucket_for(rank_of(token)),
        transliteration: transliteration_of(token),
    }
}

/// Annotate a whole group (one subtitle cue's tokens).
pub fn annotate_all(tokens: &[RawToken]) -> Vec<AnnotatedToken> {
    tokens.iter().map(annotate).collect()
}

/// The token's numeric rank.
///
/// A numeric `freq` wins; otherwise the alternate field is used, whether it
/// is a number or a numeric string.
pub fn rank_of(token: &RawToken) -> Option<f64> {
    if let Some(RankValue::Number(n)) = token.freq {
        return Some(n);
    }
    match token.alt_freq.as_ref()? {
        RankValue::Number(n) => Some(*n),
        RankValue::Text(text) => parse_rank_text(text),
        RankValue::Other(_) => None,
    }
}

/// Resolve the transliteration through the fixed fallback chain:
/// pinyin list, `form.translit`, `form_norm.translit`, `lemma.translit`.
pub fn transliteration_of(token: &RawToken) -> String {
    let pinyin = token
        .form
        .pinyin
        .as_ref()
        .filter(|p| matches!(p, Translit::Many(_)));

    let sources = [
        pinyin,
        token.form.translit.as_ref(),
        token.form_norm.as_ref().and_then(|f| f.translit.as_ref()),
        token.lemma.as_ref().and_then(|f| f.translit.as_ref()),
    ];

    sources
        .into_iter()
        .flatten()
        .find_map(Translit::joined)
        .unwrap_or_default()
}

/// Transliteration of a whole sentence: each token's transliteration joined
/// by a single space, trimmed.
pub fn sentence_transliteration(tokens: &[RawToken]) -> String {
    tokens
        .iter()
        .map(transliteration_of)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
