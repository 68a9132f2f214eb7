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

//! Frequent-word subsampling: each occurrence of a word is independently
//! kept or dropped with a probability computed once per word from its
//! relative frequency, following the formula used by both the reference
//! C tool and gensim: `p_keep = (sqrt(f/t) + 1) * (t/f)`, clamped to `1.0`.

use crate::rng::WorkerRng;
use crate::vocab::Vocabulary;

/// Computes and stores `keep_prob` on every non-null-word entry in `vocab`.
/// `threshold <= 0.0` disables subsampling (`keep_prob` stays `1.0`
/// everywhere).
pub fn compute_keep_probabilities(vocab: &mut Vocabulary, threshold: f64) {
    if threshold <= 0.0 {
        return;
    }
    let train_words = vocab.train_words() as f64;
    if train_words == 0.0 {
        return;
    }
    // The null word, when present, is the vocabulary's last entry and is
    // never subject to subsampling (it is not a real training occurrence).
    let n = vocab.len() - if vocab.has_null_word() { 1 } else { 0 };
    for entry in &mut vocab.entries_mut()[..n] {
        let freq = entry.count as f64 / train_words;
        let keep = ((freq / threshold).sqrt() + 1.0) * (threshold / freq);
        entry.keep_prob = keep.min(1.0) as f32;
    }
}

/// Filters a sentence (already resolved to vocabulary indices, out-of-vocabulary
/// tokens already dropped) down to the occurrences that survive subsampling.
pub fn subsample_indices(vocab: &Vocabulary, indices: &[u32], rng: &mut WorkerRng) -> Vec<u32> {
    indices
        .iter()
        .copied()
        .filter(|&idx| rng.next_f32() < vocab.entry(idx).keep_prob)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VecCorpus;

    fn build_vocab(counts: &[(&str, u64)]) -> Vocabulary {
        let mut sentences = Vec::new();
        for (word, count) in counts {
            for _ in 0..*count {
                sentences.push(vec![word.to_string()]);
            }
        }
        let mut corpus = VecCorpus::new(sentences);
        Vocabulary::build(&mut corpus, 1, false).unwrap()
    }

    #[test]
    fn disabled_threshold_keeps_everything() {
        let mut vocab = build_vocab(&[("a", 1000), ("b", 1)]);
        compute_keep_probabilities(&mut vocab, 0.0);
        assert!(vocab.entries().iter().all(|e| e.keep_prob == 1.0));
    }

    #[test]
    fn frequent_words_get_lower_keep_probability() {
        let mut vocab = build_vocab(&[("a", 10_000), ("b", 1)]);
        compute_keep_probabilities(&mut vocab, 1e-3);
        let p_a = vocab.entry(0).keep_prob;
        let p_b = vocab.entry(1).keep_prob;
        assert!(p_a < p_b);
        assert!(p_b - 1.0 < f32::EPSILON);
    }

    #[test]
    fn keep_probability_never_exceeds_one() {
        let mut vocab = build_vocab(&[("rare", 1)]);
        compute_keep_probabilities(&mut vocab, 0.5);
        assert!(vocab.entry(0).keep_prob <= 1.0);
    }
}
