//! Deduplicated vocabulary grouped by frequency bucket.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::frequency::bucket_lower_bound;
use crate::token::AnnotatedToken;

/// Distinct word forms per frequency bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VocabularyIndex {
    buckets: HashMap<&'static str, Vec<AnnotatedToken>>,
}

impl VocabularyIndex {
    /// Build the index from per-cue token groups.
    ///
    /// Groups are scanned in order, tokens left to right. Tokens without a
    /// bucket are skipped. A surface form is recorded once per run, under the
    /// bucket of its first occurrence.
    pub fn build(groups: &[Vec<AnnotatedToken>]) -> Self {
        let mut buckets: HashMap<&'static str, Vec<AnnotatedToken>> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for token in groups.iter().flatten() {
            let Some(bucket) = token.frequency_bucket else {
                continue;
            };
            if !seen.insert(token.text()) {
                continue;
            }
            buckets.entry(bucket).or_default().push(token.clone());
        }

        VocabularyIndex { buckets }
    }

    /// Tokens recorded under `label`.
    pub fn get(&self, label: &str) -> Option<&[AnnotatedToken]> {
        self.buckets.get(label).map(Vec::as_slice)
    }

    /// Number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct words across all buckets.
    pub fn total_words(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Buckets in ascending order of their lower rank bound.
    pub fn by_rank(&self) -> Vec<(&'static str, &[AnnotatedToken])> {
        let mut entries: Vec<_> = self
            .buckets
            .iter()
            .map(|(label, tokens)| (*label, tokens.as_slice()))
            .collect();
        entries.sort_by_key(|(label, _)| bucket_lower_bound(label).unwrap_or(0));
        entries
    }
}

/// Build the vocabulary index for a set of token groups.
pub fn index(groups: &[Vec<AnnotatedToken>]) -> VocabularyIndex {
    VocabularyIndex::build(groups)
}
