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

//! The SGD inner loop. `HS` and `NEG` are const generic flags rather than
//! runtime booleans so that `train_sg_pair::<true, false>` and
//! `train_sg_pair::<false, true>` are specialised, branch-free functions at
//! compile time instead of one function re-checking the same two flags on
//! every call; `dispatch_sg`/`dispatch_cbow` pick the right monomorphised
//! instantiation once per job. `learn_vectors`/`learn_hidden` stay runtime
//! booleans: they gate whole passes (e.g. vocabulary-frozen evaluation
//! runs), not the hot per-pair branch, so specialising them would multiply
//! the number of instantiations for no measurable benefit.

use crate::rng::WorkerRng;
use crate::sampler::NegativeSampler;
use crate::vocab::Vocabulary;
use crate::weights::WeightStore;

const SIGMOID_TABLE_SIZE: usize = 1000;
const MAX_SIGMOID: f32 = 6.0;

/// Precomputed `1 / (1 + exp(-x))` over `[-MAX_SIGMOID, MAX_SIGMOID)`, the
/// same accuracy/speed tradeoff the reference C tool makes.
pub struct SigmoidTable {
    table: Vec<f32>,
}

impl SigmoidTable {
    pub fn new() -> Self {
        let table = (0..SIGMOID_TABLE_SIZE)
            .map(|i| {
                let x = (i as f32 / SIGMOID_TABLE_SIZE as f32) * (2.0 * MAX_SIGMOID) - MAX_SIGMOID;
                1.0 / (1.0 + (-x).exp())
            })
            .collect();
        SigmoidTable { table }
    }

    pub fn get(&self, x: f32) -> f32 {
        if x <= -MAX_SIGMOID {
            0.0
        } else if x >= MAX_SIGMOID {
            1.0
        } else {
            let idx = ((x + MAX_SIGMOID) * (SIGMOID_TABLE_SIZE as f32 / (2.0 * MAX_SIGMOID))) as usize;
            self.table[idx.min(SIGMOID_TABLE_SIZE - 1)]
        }
    }
}

impl Default for SigmoidTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates a gradient step for one (predictor, target-word) pair and
/// applies it to `weights`, specialised over whether hierarchical softmax
/// and/or negative sampling are active.
///
/// `predictor` is the row being read from (the centre word's input vector
/// for skip-gram, or the averaged/summed context vector for CBOW);
/// `predictor_update` accumulates the error to propagate back into the
/// input side, and is applied by the caller (who knows whether that means
/// one row, for skip-gram, or every context row, for CBOW).
#[allow(clippy::too_many_arguments)]
pub fn train_pair<const HS: bool, const NEG: bool>(
    weights: &WeightStore,
    sigmoid: &SigmoidTable,
    sampler: Option<&NegativeSampler>,
    target: &crate::vocab::WordEntry,
    predictor: &[f32],
    predictor_update: &mut [f32],
    alpha: f32,
    negative: usize,
    rng: &mut WorkerRng,
    learn_hidden: bool,
) {
    let dim = predictor.len();
    debug_assert_eq!(predictor_update.len(), dim);

    if HS {
        for (&code_bit, &inner_node) in target.code.iter().zip(target.point.iter()) {
            let hs_row = weights.hs_row(inner_node);
            let dot: f32 = predictor.iter().zip(hs_row.iter()).map(|(a, b)| a * b).sum();
            let prediction = sigmoid.get(dot);
            let gradient = (1.0 - code_bit as f32 - prediction) * alpha;

            for i in 0..dim {
                predictor_update[i] += gradient * hs_row[i];
            }
            if learn_hidden {
                let delta: Vec<f32> = predictor.iter().map(|p| gradient * p).collect();
                weights.update_hs_row(inner_node, &delta);
            }
        }
    }

    if NEG {
        let sampler = sampler.expect("negative sampling enabled without a sampler");
        for n in 0..=negative {
            let (sample_index, label) = if n == 0 {
                (target.index, 1.0f32)
            } else {
                (sampler.draw(rng, target.index), 0.0f32)
            };
            let neg_row = weights.neg_row(sample_index);
            let dot: f32 = predictor.iter().zip(neg_row.iter()).map(|(a, b)| a * b).sum();
            let prediction = sigmoid.get(dot);
            let gradient = (label - prediction) * alpha;

            for i in 0..dim {
                predictor_update[i] += gradient * neg_row[i];
            }
            if learn_hidden {
                let delta: Vec<f32> = predictor.iter().map(|p| gradient * p).collect();
                weights.update_neg_row(sample_index, &delta);
            }
        }
    }
}

/// One skip-gram training step: predict `context_word` from `center_word`.
#[allow(clippy::too_many_arguments)]
pub fn train_sg_pair<const HS: bool, const NEG: bool>(
    vocab: &Vocabulary,
    weights: &WeightStore,
    sigmoid: &SigmoidTable,
    sampler: Option<&NegativeSampler>,
    center_word: u32,
    context_word: u32,
    alpha: f32,
    negative: usize,
    rng: &mut WorkerRng,
    learn_vectors: bool,
    learn_hidden: bool,
) {
    let dim = weights.dim();
    let predictor = weights.input_row(center_word).to_vec();
    let mut update = vec![0.0f32; dim];
    let target = vocab.entry(context_word);

    train_pair::<HS, NEG>(
        weights, sigmoid, sampler, target, &predictor, &mut update, alpha, negative, rng,
        learn_hidden,
    );

    if learn_vectors {
        weights.update_input_row(center_word, &update);
    }
}

/// One CBOW training step: predict `center_word` from the averaged (or
/// summed) input vectors of `context_words`.
#[allow(clippy::too_many_arguments)]
pub fn train_cbow_pair<const HS: bool, const NEG: bool>(
    vocab: &Vocabulary,
    weights: &WeightStore,
    sigmoid: &SigmoidTable,
    sampler: Option<&NegativeSampler>,
    center_word: u32,
    context_words: &[u32],
    cbow_mean: bool,
    alpha: f32,
    negative: usize,
    rng: &mut WorkerRng,
    learn_vectors: bool,
    learn_hidden: bool,
) {
    if context_words.is_empty() {
        return;
    }
    let dim = weights.dim();
    let mut predictor = vec![0.0f32; dim];
    for &w in context_words {
        let row = weights.input_row(w);
        for i in 0..dim {
            predictor[i] += row[i];
        }
    }
    if cbow_mean {
        let n = context_words.len() as f32;
        for v in predictor.iter_mut() {
            *v /= n;
        }
    }

    let mut update = vec![0.0f32; dim];
    let target = vocab.entry(center_word);

    train_pair::<HS, NEG>(
        weights, sigmoid, sampler, target, &predictor, &mut update, alpha, negative, rng,
        learn_hidden,
    );

    if learn_vectors {
        // `update` is applied to every context row as-is, even though the
        // forward pass averaged them when `cbow_mean` is set: the error
        // gradient is not rescaled back down by context size.
        for &w in context_words {
            weights.update_input_row(w, &update);
        }
    }
}

macro_rules! dispatch_pair {
    ($hs:expr, $neg:expr, $f:ident, $($args:expr),*) => {
        match ($hs, $neg) {
            (true, true) => $f::<true, true>($($args),*),
            (true, false) => $f::<true, false>($($args),*),
            (false, true) => $f::<false, true>($($args),*),
            (false, false) => $f::<false, false>($($args),*),
        }
    };
}

/// Runtime-flag entry point used by the training pipeline, which only
/// knows `hs`/`negative > 0` as `TrainingConfig` fields at job-dispatch
/// time; picks the matching compile-time specialisation once per call.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_sg(
    hs: bool,
    neg: bool,
    vocab: &Vocabulary,
    weights: &WeightStore,
    sigmoid: &SigmoidTable,
    sampler: Option<&NegativeSampler>,
    center_word: u32,
    context_word: u32,
    alpha: f32,
    negative: usize,
    rng: &mut WorkerRng,
    learn_vectors: bool,
    learn_hidden: bool,
) {
    dispatch_pair!(
        hs,
        neg,
        train_sg_pair,
        vocab,
        weights,
        sigmoid,
        sampler,
        center_word,
        context_word,
        alpha,
        negative,
        rng,
        learn_vectors,
        learn_hidden
    )
}

#[allow(clippy::too_many_arguments)]
pub fn dispatch_cbow(
    hs: bool,
    neg: bool,
    vocab: &Vocabulary,
    weights: &WeightStore,
    sigmoid: &SigmoidTable,
    sampler: Option<&NegativeSampler>,
    center_word: u32,
    context_words: &[u32],
    cbow_mean: bool,
    alpha: f32,
    negative: usize,
    rng: &mut WorkerRng,
    learn_vectors: bool,
    learn_hidden: bool,
) {
    dispatch_pair!(
        hs,
        neg,
        train_cbow_pair,
        vocab,
        weights,
        sigmoid,
        sampler,
        center_word,
        context_words,
        cbow_mean,
        alpha,
        negative,
        rng,
        learn_vectors,
        learn_hidden
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VecCorpus;

    fn build_vocab() -> Vocabulary {
        let sentences = vec![vec!["a".to_string(), "b".to_string()]; 20];
        let mut corpus = VecCorpus::new(sentences);
        let mut vocab = Vocabulary::build(&mut corpus, 1, false).unwrap();
        crate::huffman::build_huffman_tree(&mut vocab);
        vocab
    }

    #[test]
    fn sigmoid_table_is_monotonic_and_bounded() {
        let table = SigmoidTable::new();
        assert!(table.get(-10.0) < table.get(0.0));
        assert!(table.get(0.0) < table.get(10.0));
        assert!(table.get(-10.0) >= 0.0);
        assert!(table.get(10.0) <= 1.0);
    }

    #[test]
    fn sg_pair_with_hs_moves_center_toward_context() {
        let vocab = build_vocab();
        let weights = WeightStore::new(&vocab, 4, 1, vocab.len() - 1, vocab.len());
        let sigmoid = SigmoidTable::new();
        let mut rng = WorkerRng::new(1, 0);
        let before = weights.input_row_vec(0);
        train_sg_pair::<true, false>(
            &vocab, &weights, &sigmoid, None, 0, 1, 0.5, 0, &mut rng, true, true,
        );
        let after = weights.input_row_vec(0);
        assert_ne!(before, after);
    }

    #[test]
    fn cbow_pair_with_neg_updates_all_context_rows() {
        let vocab = build_vocab();
        let weights = WeightStore::new(&vocab, 4, 1, vocab.len() - 1, vocab.len());
        let sigmoid = SigmoidTable::new();
        let sampler = NegativeSampler::build(&vocab);
        let mut rng = WorkerRng::new(1, 0);
        let before = weights.input_row_vec(1);
        train_cbow_pair::<false, true>(
            &vocab,
            &weights,
            &sigmoid,
            Some(&sampler),
            0,
            &[1],
            true,
            0.5,
            5,
            &mut rng,
            true,
            true,
        );
        let after = weights.input_row_vec(1);
        assert_ne!(before, after);
    }
}
