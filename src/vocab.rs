//  Copyright 2026 Robert Zavalczki
//  Copyright 2013 Google Inc. All Rights Reserved.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! The vocabulary: a dense, frequency-descending word index built from a
//! single pass over a corpus, plus the per-word metadata (Huffman code,
//! subsampling keep-probability) later passes fill in.

use std::collections::HashMap;

use log::info;

use crate::corpus::SentenceSource;
use crate::error::{Result, Word2VecError};

#[derive(Debug, Clone)]
pub struct WordEntry {
    pub word: String,
    pub count: u64,
    pub index: u32,
    /// Probability that an occurrence of this word survives subsampling.
    /// Filled in by `crate::subsample`; `1.0` until then.
    pub keep_prob: f32,
    /// Huffman code, root to leaf, MSB first. Filled in by `crate::huffman`.
    pub code: Vec<u8>,
    /// Inner-node indices on the root-to-leaf path. Filled in by
    /// `crate::huffman`.
    pub point: Vec<u32>,
}

impl WordEntry {
    fn new(word: String, count: u64, index: u32) -> Self {
        WordEntry {
            word,
            count,
            index,
            keep_prob: 1.0,
            code: Vec::new(),
            point: Vec::new(),
        }
    }
}

pub struct Vocabulary {
    entries: Vec<WordEntry>,
    index_of: HashMap<String, u32>,
    train_words: u64,
    has_null_word: bool,
}

impl Vocabulary {
    /// Counts every token in `source`, drops words occurring fewer than
    /// `min_count` times, and orders the survivors by descending count
    /// (ties broken by first-seen order, for determinism).
    pub fn build<S: SentenceSource>(
        source: &mut S,
        min_count: u64,
        null_word: bool,
    ) -> Result<Self> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut order = 0usize;
        let mut saw_any_sentence = false;

        for sentence in source {
            let sentence = sentence?;
            saw_any_sentence = true;
            for token in sentence {
                *counts.entry(token.clone()).or_insert(0) += 1;
                first_seen.entry(token).or_insert_with(|| {
                    order += 1;
                    order
                });
            }
        }

        if !saw_any_sentence {
            return Err(Word2VecError::EmptyCorpus);
        }

        let mut words: Vec<(String, u64)> = counts
            .into_iter()
            .filter(|(_, count)| *count >= min_count)
            .collect();

        words.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| first_seen[&a.0].cmp(&first_seen[&b.0]))
        });

        if words.is_empty() {
            return Err(Word2VecError::EmptyVocabulary);
        }

        let mut entries = Vec::with_capacity(words.len() + 1);
        let mut index_of = HashMap::with_capacity(words.len() + 1);
        let mut train_words = 0u64;

        for (word, count) in words {
            let index = entries.len() as u32;
            index_of.insert(word.clone(), index);
            train_words += count;
            entries.push(WordEntry::new(word, count, index));
        }

        // Appended last, after every real word's index has been assigned,
        // matching the reference vocabulary builder (which assigns the
        // null word `index = len(vocab)` once all real words are counted).
        if null_word {
            let index = entries.len() as u32;
            entries.push(WordEntry::new(String::new(), 1, index));
        }

        info!(
            "vocabulary built: {} distinct words, {} training tokens (min_count={})",
            entries.len() - if null_word { 1 } else { 0 },
            train_words,
            min_count
        );

        Ok(Vocabulary {
            entries,
            index_of,
            train_words,
            has_null_word: null_word,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_null_word(&self) -> bool {
        self.has_null_word
    }

    pub fn train_words(&self) -> u64 {
        self.train_words
    }

    pub fn index_of(&self, word: &str) -> Option<u32> {
        self.index_of.get(word).copied()
    }

    pub fn entry(&self, index: u32) -> &WordEntry {
        &self.entries[index as usize]
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [WordEntry] {
        &mut self.entries
    }

    pub fn word(&self, index: u32) -> &str {
        &self.entries[index as usize].word
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Vocabulary {
    type Item = &'a WordEntry;
    type IntoIter = std::slice::Iter<'a, WordEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VecCorpus;

    fn toy_corpus() -> VecCorpus {
        VecCorpus::new(vec![
            vec!["the".into(), "cat".into(), "sat".into()],
            vec!["the".into(), "dog".into(), "sat".into()],
            vec!["the".into(), "cat".into(), "ran".into()],
        ])
    }

    #[test]
    fn orders_by_descending_count() {
        let mut corpus = toy_corpus();
        let vocab = Vocabulary::build(&mut corpus, 1, false).unwrap();
        assert_eq!(vocab.word(0), "the");
        assert_eq!(vocab.entry(0).count, 3);
    }

    #[test]
    fn min_count_prunes_rare_words() {
        let mut corpus = toy_corpus();
        let vocab = Vocabulary::build(&mut corpus, 2, false).unwrap();
        assert!(vocab.index_of("ran").is_none());
        assert!(vocab.index_of("the").is_some());
    }

    #[test]
    fn null_word_is_appended_last_with_count_one() {
        let mut corpus = toy_corpus();
        let vocab = Vocabulary::build(&mut corpus, 1, true).unwrap();
        let last = (vocab.len() - 1) as u32;
        assert_eq!(vocab.word(last), "");
        assert_eq!(vocab.entry(last).count, 1);
        // every real word keeps an index strictly below the null word's.
        assert!(vocab.index_of("the").unwrap() < last);
        assert_eq!(vocab.word(0), "the");
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let mut corpus = VecCorpus::new(vec![]);
        let result = Vocabulary::build(&mut corpus, 1, false);
        assert!(matches!(result, Err(Word2VecError::EmptyCorpus)));
    }

    #[test]
    fn min_count_too_high_is_an_error() {
        let mut corpus = toy_corpus();
        let result = Vocabulary::build(&mut corpus, 100, false);
        assert!(matches!(result, Err(Word2VecError::EmptyVocabulary)));
    }
}
