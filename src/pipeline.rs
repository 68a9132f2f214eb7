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

//! The training pipeline: one producer thread turns a `SentenceSource`
//! into chunks of vocabulary-index sentences and pushes them onto a
//! bounded `crossbeam_channel`; a pool of worker threads pull chunks off
//! that channel and run the SGD kernel, HogWild-style, directly against
//! the shared `WeightStore`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::info;

use crate::config::TrainingConfig;
use crate::corpus::SentenceSource;
use crate::error::Result;
use crate::kernel::{dispatch_cbow, dispatch_sg, SigmoidTable};
use crate::rng::WorkerRng;
use crate::sampler::NegativeSampler;
use crate::subsample::subsample_indices;
use crate::vocab::Vocabulary;
use crate::weights::WeightStore;

type Job = Vec<Vec<u32>>;

struct Progress {
    words_done: u64,
    last_report: Instant,
}

/// Learning rate decayed from `alpha` toward zero as training approaches
/// `total_expected_words`, clamped at `min_alpha` and never allowed to fall
/// below it even if a worker overshoots the estimate.
fn anneal_alpha(config: &TrainingConfig, words_done: u64, total_expected_words: u64) -> f32 {
    let progress = (words_done as f64 / total_expected_words.max(1) as f64).min(1.0);
    let alpha = config.alpha as f64 * (1.0 - progress);
    alpha.max(config.min_alpha as f64) as f32
}

fn sentence_to_indices(vocab: &Vocabulary, sentence: &[String]) -> Vec<u32> {
    sentence
        .iter()
        .filter_map(|token| vocab.index_of(token))
        .collect()
}

/// Runs one full epoch of training over `source` against `weights`,
/// spawning `config.resolved_workers()` worker threads behind a bounded
/// job queue.
#[allow(clippy::too_many_arguments)]
pub fn run_epoch<S: SentenceSource>(
    source: &mut S,
    vocab: &Vocabulary,
    weights: &WeightStore,
    sampler: Option<&NegativeSampler>,
    config: &TrainingConfig,
    total_expected_words: u64,
    seed: u64,
) -> Result<u64> {
    let workers = config.resolved_workers();
    let (tx, rx): (Sender<Job>, Receiver<Job>) = bounded(2 * workers);

    let progress = Arc::new(Mutex::new(Progress {
        words_done: 0,
        last_report: Instant::now(),
    }));
    let failed = Arc::new(AtomicBool::new(false));
    let sigmoid = SigmoidTable::new();

    std::thread::scope(|scope| {
        for worker_id in 0..workers {
            let rx = rx.clone();
            let progress = Arc::clone(&progress);
            let failed = Arc::clone(&failed);
            let sigmoid = &sigmoid;
            scope.spawn(move || {
                let mut rng = WorkerRng::new(seed, worker_id);
                for job in rx.iter() {
                    let words_done_snapshot = progress.lock().unwrap().words_done;
                    let alpha = anneal_alpha(config, words_done_snapshot, total_expected_words);

                    let mut local_words = 0u64;
                    for sentence in &job {
                        train_sentence(
                            vocab, weights, sampler, &sigmoid, config, sentence, alpha, &mut rng,
                        );
                        local_words += sentence.len() as u64;
                    }

                    let mut p = progress.lock().unwrap();
                    p.words_done += local_words;
                    if p.last_report.elapsed().as_secs() >= 1 {
                        info!(
                            "alpha={alpha:.5} progress={:.2}% words/thread_report",
                            100.0 * p.words_done as f64 / total_expected_words.max(1) as f64
                        );
                        p.last_report = Instant::now();
                    }
                }
                let _ = &failed;
            });
        }

        let producer_result = (|| -> Result<()> {
            let mut batch: Job = Vec::with_capacity(config.chunksize);
            for sentence in &mut *source {
                let sentence = sentence?;
                let indices = sentence_to_indices(vocab, &sentence);
                batch.push(indices);
                if batch.len() >= config.chunksize {
                    tx.send(std::mem::replace(&mut batch, Vec::with_capacity(config.chunksize)))
                        .expect("worker threads outlive the producer");
                }
            }
            if !batch.is_empty() {
                tx.send(batch).expect("worker threads outlive the producer");
            }
            Ok(())
        })();

        drop(tx);
        producer_result
    })?;

    let words_done = progress.lock().unwrap().words_done;
    Ok(words_done)
}

fn train_sentence(
    vocab: &Vocabulary,
    weights: &WeightStore,
    sampler: Option<&NegativeSampler>,
    sigmoid: &SigmoidTable,
    config: &TrainingConfig,
    sentence: &[u32],
    alpha: f32,
    rng: &mut WorkerRng,
) {
    let subsampled = subsample_indices(vocab, sentence, rng);
    if subsampled.is_empty() {
        return;
    }

    for pos in 0..subsampled.len() {
        let center = subsampled[pos];
        // Reduced window: each occurrence draws its own effective window
        // width in `1..=config.window`, matching the reference tool, so a
        // word's context is not a deterministic fixed-width slice.
        let reduced = rng.next_below(config.window.max(1));
        let window = config.window - reduced;

        let start = pos.saturating_sub(window);
        let end = (pos + window + 1).min(subsampled.len());

        if config.sg {
            for ctx_pos in start..end {
                if ctx_pos == pos {
                    continue;
                }
                dispatch_sg(
                    config.hs,
                    config.negative > 0,
                    vocab,
                    weights,
                    sigmoid,
                    sampler,
                    center,
                    subsampled[ctx_pos],
                    alpha,
                    config.negative,
                    rng,
                    true,
                    true,
                );
            }
        } else {
            let context: Vec<u32> = (start..end)
                .filter(|&p| p != pos)
                .map(|p| subsampled[p])
                .collect();
            if !context.is_empty() {
                dispatch_cbow(
                    config.hs,
                    config.negative > 0,
                    vocab,
                    weights,
                    sigmoid,
                    sampler,
                    center,
                    &context,
                    config.cbow_mean,
                    alpha,
                    config.negative,
                    rng,
                    true,
                    true,
                );
            }
        }
    }
}
