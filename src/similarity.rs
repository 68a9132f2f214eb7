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

//! Query-time operations over a trained (or loaded) embedding table:
//! nearest neighbours, analogy solving, and the word-analogy evaluation
//! harness, all grounded in gensim's `KeyedVectors`/`Word2Vec` query
//! methods (`most_similar`, `most_similar_cosmul`, `doesnt_match`,
//! `n_similarity`, `accuracy`).

use std::cell::RefCell;

use log::warn;

use crate::error::{Result, Word2VecError};
use crate::vocab::Vocabulary;
use crate::weights::WeightStore;

pub struct SimilarityIndex<'a> {
    vocab: &'a Vocabulary,
    weights: &'a WeightStore,
    normalized: RefCell<Option<Vec<f32>>>,
}

fn normalize_row(row: &mut [f32]) {
    let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in row.iter_mut() {
            *v /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

impl<'a> SimilarityIndex<'a> {
    pub fn new(vocab: &'a Vocabulary, weights: &'a WeightStore) -> Self {
        SimilarityIndex {
            vocab,
            weights,
            normalized: RefCell::new(None),
        }
    }

    /// Builds (or returns the cached copy of) the L2-normalised embedding
    /// matrix, row-major, `vocab.len() * dim` entries.
    fn normalized_matrix(&self) -> std::cell::Ref<'_, Vec<f32>> {
        {
            let cache = self.normalized.borrow();
            if cache.is_some() {
                return std::cell::Ref::map(cache, |c| c.as_ref().unwrap());
            }
        }
        let dim = self.weights.dim();
        let mut matrix = vec![0.0f32; self.vocab.len() * dim];
        for entry in self.vocab.entries() {
            let start = entry.index as usize * dim;
            let row = &mut matrix[start..start + dim];
            row.copy_from_slice(self.weights.input_row(entry.index));
            normalize_row(row);
        }
        *self.normalized.borrow_mut() = Some(matrix);
        let cache = self.normalized.borrow();
        std::cell::Ref::map(cache, |c| c.as_ref().unwrap())
    }

    fn normalized_row(&self, index: u32) -> Vec<f32> {
        let dim = self.weights.dim();
        let matrix = self.normalized_matrix();
        let start = index as usize * dim;
        matrix[start..start + dim].to_vec()
    }

    fn resolve(&self, word: &str) -> Result<u32> {
        self.vocab
            .index_of(word)
            .ok_or_else(|| Word2VecError::OutOfVocabularyWord(word.to_string()))
    }

    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let ia = self.resolve(a)?;
        let ib = self.resolve(b)?;
        Ok(dot(&self.normalized_row(ia), &self.normalized_row(ib)))
    }

    /// Cosine similarity between the averaged vectors of two word sets,
    /// mirroring `n_similarity`.
    pub fn n_similarity(&self, ws1: &[&str], ws2: &[&str]) -> Result<f32> {
        let mean = |words: &[&str]| -> Result<Vec<f32>> {
            let dim = self.weights.dim();
            let mut acc = vec![0.0f32; dim];
            let mut n = 0usize;
            for &w in words {
                let idx = self.resolve(w)?;
                let row = self.normalized_row(idx);
                for i in 0..dim {
                    acc[i] += row[i];
                }
                n += 1;
            }
            if n == 0 {
                return Err(Word2VecError::CannotCompareEmpty);
            }
            for v in acc.iter_mut() {
                *v /= n as f32;
            }
            normalize_row(&mut acc);
            Ok(acc)
        };
        let v1 = mean(ws1)?;
        let v2 = mean(ws2)?;
        Ok(dot(&v1, &v2))
    }

    /// `k` nearest neighbours of `word` by cosine similarity, excluding
    /// `word` itself.
    pub fn most_similar(&self, word: &str, topn: usize) -> Result<Vec<(String, f32)>> {
        self.most_similar_from_vector(&self.normalized_row(self.resolve(word)?), &[word], topn)
    }

    /// `positive`/`negative` analogy query: `mean(positive) - mean(negative)`,
    /// nearest by cosine, excluding the input words. `king - man + woman`
    /// is `most_similar(&["king", "woman"], &["man"], ...)`.
    pub fn most_similar_analogy(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<(String, f32)>> {
        if positive.is_empty() && negative.is_empty() {
            return Err(Word2VecError::CannotCompareEmpty);
        }
        let dim = self.weights.dim();
        let mut acc = vec![0.0f32; dim];
        for &w in positive {
            let row = self.normalized_row(self.resolve(w)?);
            for i in 0..dim {
                acc[i] += row[i];
            }
        }
        for &w in negative {
            let row = self.normalized_row(self.resolve(w)?);
            for i in 0..dim {
                acc[i] -= row[i];
            }
        }
        normalize_row(&mut acc);
        let exclude: Vec<&str> = positive.iter().chain(negative.iter()).copied().collect();
        self.most_similar_from_vector(&acc, &exclude, topn)
    }

    fn most_similar_from_vector(
        &self,
        query: &[f32],
        exclude: &[&str],
        topn: usize,
    ) -> Result<Vec<(String, f32)>> {
        let matrix = self.normalized_matrix();
        let dim = self.weights.dim();
        let mut scored: Vec<(u32, f32)> = self
            .vocab
            .entries()
            .iter()
            .filter(|e| !exclude.contains(&e.word.as_str()) && !e.word.is_empty())
            .map(|e| {
                let start = e.index as usize * dim;
                (e.index, dot(query, &matrix[start..start + dim]))
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(topn);
        Ok(scored
            .into_iter()
            .map(|(idx, score)| (self.vocab.word(idx).to_string(), score))
            .collect())
    }

    /// The 3CosMul analogy combination: `argmax_b (cos(b,pos1)*cos(b,pos2)) /
    /// (cos(b,neg)+eps)`, which empirically does better than vector offset
    /// on standard analogy benchmarks (Levy & Goldberg, 2014).
    pub fn most_similar_cosmul(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<(String, f32)>> {
        const EPSILON: f32 = 1e-6;
        if positive.is_empty() && negative.is_empty() {
            return Err(Word2VecError::CannotCompareEmpty);
        }
        let pos_vecs: Vec<Vec<f32>> = positive
            .iter()
            .map(|w| self.resolve(w).map(|i| self.normalized_row(i)))
            .collect::<Result<_>>()?;
        let neg_vecs: Vec<Vec<f32>> = negative
            .iter()
            .map(|w| self.resolve(w).map(|i| self.normalized_row(i)))
            .collect::<Result<_>>()?;

        let matrix = self.normalized_matrix();
        let dim = self.weights.dim();
        let exclude: Vec<&str> = positive.iter().chain(negative.iter()).copied().collect();

        let mut scored: Vec<(u32, f32)> = self
            .vocab
            .entries()
            .iter()
            .filter(|e| !exclude.contains(&e.word.as_str()) && !e.word.is_empty())
            .map(|e| {
                let start = e.index as usize * dim;
                let row = &matrix[start..start + dim];
                let pos_term: f32 = pos_vecs
                    .iter()
                    .map(|v| (dot(v, row) + 1.0) / 2.0)
                    .product();
                let neg_term: f32 = neg_vecs
                    .iter()
                    .map(|v| (dot(v, row) + 1.0) / 2.0 + EPSILON)
                    .product();
                (e.index, pos_term / neg_term.max(EPSILON))
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(topn);
        Ok(scored
            .into_iter()
            .map(|(idx, score)| (self.vocab.word(idx).to_string(), score))
            .collect())
    }

    /// The word whose vector is least similar to the mean of the others.
    pub fn doesnt_match(&self, words: &[&str]) -> Result<String> {
        if words.is_empty() {
            return Err(Word2VecError::CannotCompareEmpty);
        }
        let dim = self.weights.dim();
        let rows: Vec<Vec<f32>> = words
            .iter()
            .map(|w| self.resolve(w).map(|i| self.normalized_row(i)))
            .collect::<Result<_>>()?;

        let mut mean = vec![0.0f32; dim];
        for row in &rows {
            for i in 0..dim {
                mean[i] += row[i];
            }
        }
        for v in mean.iter_mut() {
            *v /= rows.len() as f32;
        }

        let (worst_idx, _) = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, dot(row, &mean)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .expect("words is non-empty");
        Ok(words[worst_idx].to_string())
    }

    /// One analogy question is `a b c expected` (`a` is to `b` as `c` is
    /// to `expected`); solved as `most_similar_analogy(&[b, c], &[a], 1)`
    /// and scored against `expected`. Malformed lines (wrong token count,
    /// out-of-vocabulary words) are logged and skipped rather than
    /// aborting the whole evaluation, matching `evaluate_word_analogies`.
    pub fn evaluate_word_analogies(&self, questions: &str) -> AnalogyEvaluation {
        let mut correct = 0usize;
        let mut total = 0usize;
        for (lineno, line) in questions.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 4 {
                warn!("analogy line {}: expected 4 words, got {}", lineno + 1, parts.len());
                continue;
            }
            let (a, b, c, expected) = (parts[0], parts[1], parts[2], parts[3]);
            match self.most_similar_analogy(&[b, c], &[a], 1) {
                Ok(guesses) => {
                    total += 1;
                    if guesses
                        .first()
                        .is_some_and(|(w, _)| w.eq_ignore_ascii_case(expected))
                    {
                        correct += 1;
                    }
                }
                Err(e) => {
                    warn!("analogy line {}: skipped ({e})", lineno + 1);
                }
            }
        }
        AnalogyEvaluation { correct, total }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnalogyEvaluation {
    pub correct: usize,
    pub total: usize,
}

impl AnalogyEvaluation {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VecCorpus;
    use crate::vocab::Vocabulary;

    fn build(vocab: &Vocabulary, dim: usize, vectors: &[(&str, &[f32])]) -> WeightStore {
        let store = WeightStore::new(vocab, dim, 1, vocab.len(), vocab.len());
        let mut store = store;
        for (word, vector) in vectors {
            let idx = vocab.index_of(word).unwrap();
            store.set_input_row(idx, vector);
        }
        store
    }

    fn toy_vocab() -> Vocabulary {
        let sentences = vec![
            vec!["a".to_string()],
            vec!["b".to_string()],
            vec!["c".to_string()],
        ];
        let mut corpus = VecCorpus::new(sentences);
        Vocabulary::build(&mut corpus, 1, false).unwrap()
    }

    #[test]
    fn identical_vectors_have_similarity_one() {
        let vocab = toy_vocab();
        let weights = build(
            &vocab,
            2,
            &[("a", &[1.0, 0.0]), ("b", &[1.0, 0.0]), ("c", &[0.0, 1.0])],
        );
        let index = SimilarityIndex::new(&vocab, &weights);
        let sim = index.similarity("a", "b").unwrap();
        assert!((sim - 1.0).abs() < 1e-5);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        let vocab = toy_vocab();
        let weights = build(
            &vocab,
            2,
            &[("a", &[1.0, 0.0]), ("b", &[1.0, 0.0]), ("c", &[0.0, 1.0])],
        );
        let index = SimilarityIndex::new(&vocab, &weights);
        let sim = index.similarity("a", "c").unwrap();
        assert!(sim.abs() < 1e-5);
    }

    #[test]
    fn doesnt_match_picks_the_odd_one_out() {
        let vocab = toy_vocab();
        let weights = build(
            &vocab,
            2,
            &[("a", &[1.0, 0.0]), ("b", &[0.9, 0.1]), ("c", &[0.0, 1.0])],
        );
        let index = SimilarityIndex::new(&vocab, &weights);
        assert_eq!(index.doesnt_match(&["a", "b", "c"]).unwrap(), "c");
    }

    #[test]
    fn out_of_vocabulary_word_is_an_error() {
        let vocab = toy_vocab();
        let weights = build(&vocab, 2, &[]);
        let index = SimilarityIndex::new(&vocab, &weights);
        assert!(matches!(
            index.similarity("a", "zzz"),
            Err(Word2VecError::OutOfVocabularyWord(_))
        ));
    }

    #[test]
    fn malformed_analogy_lines_are_skipped_not_fatal() {
        let vocab = toy_vocab();
        let weights = build(&vocab, 2, &[]);
        let index = SimilarityIndex::new(&vocab, &weights);
        let report = index.evaluate_word_analogies("a b\na b c a\n");
        assert_eq!(report.total, 1);
    }
}
