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

//! `Word2Vec`: the public facade gluing vocabulary, Huffman tree, negative
//! sampler, subsampler, weight store, training pipeline, similarity index
//! and legacy file format together into the one type most callers need.

use std::path::Path;

use log::info;

use crate::config::TrainingConfig;
use crate::corpus::SentenceSource;
use crate::error::{Result, Word2VecError};
use crate::format::{self, LoadedVectors};
use crate::huffman::build_huffman_tree;
use crate::sampler::NegativeSampler;
use crate::similarity::{AnalogyEvaluation, SimilarityIndex};
use crate::subsample::compute_keep_probabilities;
use crate::vocab::Vocabulary;
use crate::weights::WeightStore;

pub struct Word2Vec {
    config: TrainingConfig,
    vocab: Vocabulary,
    sampler: Option<NegativeSampler>,
    weights: WeightStore,
}

impl Word2Vec {
    /// Builds the vocabulary (one pass over `source`), the Huffman tree
    /// (if `config.hs`), the negative sampler (if `config.negative > 0`)
    /// and a freshly, deterministically initialised weight store. Does not
    /// train; call `train` afterward.
    pub fn build_vocab<S: SentenceSource>(source: &mut S, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let mut vocab = Vocabulary::build(source, config.min_count, config.null_word)?;
        compute_keep_probabilities(&mut vocab, config.sample);

        let hs_rows = if config.hs {
            build_huffman_tree(&mut vocab);
            let leaves = vocab.len() - if config.null_word { 1 } else { 0 };
            leaves.saturating_sub(1).max(1)
        } else {
            0
        };

        let sampler = if config.negative > 0 {
            Some(NegativeSampler::build(&vocab))
        } else {
            None
        };

        let weights = WeightStore::new(&vocab, config.size, config.seed, hs_rows, vocab.len());

        Ok(Word2Vec {
            config,
            vocab,
            sampler,
            weights,
        })
    }

    /// Runs `config.iter` epochs over `source`, resetting it between
    /// epochs. Returns the total number of (post-subsampling) word
    /// occurrences processed across all epochs.
    pub fn train<S: SentenceSource>(&mut self, source: &mut S) -> Result<u64> {
        let total_expected_words = self.vocab.train_words() * self.config.iter as u64;
        if total_expected_words == 0 {
            return Err(Word2VecError::EmptyVocabulary);
        }

        let mut total_words_done = 0u64;
        for epoch in 0..self.config.iter {
            if epoch > 0 {
                source.reset().map_err(|_| Word2VecError::GeneratorCorpus)?;
            }
            info!("starting epoch {}/{}", epoch + 1, self.config.iter);
            let words_done = crate::pipeline::run_epoch(
                source,
                &self.vocab,
                &self.weights,
                self.sampler.as_ref(),
                &self.config,
                total_expected_words,
                self.config.seed.wrapping_add(epoch as u64),
            )?;
            total_words_done += words_done;
        }
        Ok(total_words_done)
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn similarity_index(&self) -> SimilarityIndex<'_> {
        SimilarityIndex::new(&self.vocab, &self.weights)
    }

    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        self.similarity_index().similarity(a, b)
    }

    pub fn n_similarity(&self, ws1: &[&str], ws2: &[&str]) -> Result<f32> {
        self.similarity_index().n_similarity(ws1, ws2)
    }

    pub fn most_similar(&self, word: &str, topn: usize) -> Result<Vec<(String, f32)>> {
        self.similarity_index().most_similar(word, topn)
    }

    pub fn most_similar_analogy(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<(String, f32)>> {
        self.similarity_index()
            .most_similar_analogy(positive, negative, topn)
    }

    pub fn most_similar_cosmul(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<(String, f32)>> {
        self.similarity_index()
            .most_similar_cosmul(positive, negative, topn)
    }

    pub fn doesnt_match(&self, words: &[&str]) -> Result<String> {
        self.similarity_index().doesnt_match(words)
    }

    pub fn evaluate_word_analogies(&self, questions: &str) -> AnalogyEvaluation {
        self.similarity_index().evaluate_word_analogies(questions)
    }

    pub fn vector(&self, word: &str) -> Result<Vec<f32>> {
        let index = self
            .vocab
            .index_of(word)
            .ok_or_else(|| Word2VecError::OutOfVocabularyWord(word.to_string()))?;
        Ok(self.weights.input_row_vec(index))
    }

    fn export_rows(&self) -> (Vec<&str>, Vec<Vec<f32>>) {
        let mut words = Vec::with_capacity(self.vocab.len());
        let mut vectors = Vec::with_capacity(self.vocab.len());
        for entry in self.vocab.entries() {
            if entry.word.is_empty() {
                continue;
            }
            words.push(entry.word.as_str());
            vectors.push(self.weights.input_row_vec(entry.index));
        }
        (words, vectors)
    }

    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let (words, vectors) = self.export_rows();
        let refs: Vec<&[f32]> = vectors.iter().map(|v| v.as_slice()).collect();
        format::save_text(path, &words, &refs, self.weights.dim())
    }

    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let (words, vectors) = self.export_rows();
        let refs: Vec<&[f32]> = vectors.iter().map(|v| v.as_slice()).collect();
        format::save_binary(path, &words, &refs, self.weights.dim())
    }

    /// Merges a previously saved set of vectors into this model's weight
    /// store, freezing every overwritten row. Returns the number of words
    /// actually present in both the file and this vocabulary.
    pub fn intersect_text_format<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let loaded: LoadedVectors = format::load_text(path)?;
        format::intersect(&loaded, &self.vocab, &mut self.weights)
    }

    pub fn intersect_binary_format<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let loaded: LoadedVectors = format::load_binary(path)?;
        format::intersect(&loaded, &self.vocab, &mut self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VecCorpus;

    fn toy_corpus() -> VecCorpus {
        let sentences: Vec<Vec<String>> = (0..200)
            .map(|i| {
                if i % 2 == 0 {
                    vec!["king".into(), "man".into(), "throne".into()]
                } else {
                    vec!["queen".into(), "woman".into(), "throne".into()]
                }
            })
            .collect();
        VecCorpus::new(sentences)
    }

    #[test]
    fn build_and_train_round_trip() {
        let mut corpus = toy_corpus();
        let config = TrainingConfig {
            size: 8,
            window: 2,
            min_count: 1,
            iter: 2,
            workers: 1,
            chunksize: 10,
            ..Default::default()
        };
        let mut model = Word2Vec::build_vocab(&mut corpus, config).unwrap();
        corpus.reset().unwrap();
        let words_done = model.train(&mut corpus).unwrap();
        assert!(words_done > 0);
        assert!(model.similarity("king", "man").is_ok());
    }

    #[test]
    fn save_and_load_text_format_preserves_vectors() {
        let mut corpus = toy_corpus();
        let config = TrainingConfig {
            size: 4,
            min_count: 1,
            iter: 1,
            workers: 1,
            chunksize: 10,
            ..Default::default()
        };
        let mut model = Word2Vec::build_vocab(&mut corpus, config).unwrap();
        corpus.reset().unwrap();
        model.train(&mut corpus).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        model.save_text(&path).unwrap();
        let loaded = format::load_text(&path).unwrap();
        assert_eq!(loaded.dim, 4);
        assert!(loaded.words.contains(&"king".to_string()));
    }

    #[test]
    fn intersect_freezes_imported_rows() {
        let mut corpus = toy_corpus();
        let config = TrainingConfig {
            size: 3,
            min_count: 1,
            iter: 1,
            workers: 1,
            chunksize: 10,
            ..Default::default()
        };
        let mut model = Word2Vec::build_vocab(&mut corpus, config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pretrained.txt");
        format::save_text(&path, &["king"], &[&[9.0, 9.0, 9.0]], 3).unwrap();

        let merged = model.intersect_text_format(&path).unwrap();
        assert_eq!(merged, 1);
        assert_eq!(model.vector("king").unwrap(), vec![9.0, 9.0, 9.0]);
    }
}
