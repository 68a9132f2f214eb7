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

//! Negative sampling: a cumulative distribution table over `count^0.75`,
//! drawn from with a uniform integer and a binary search, exactly as
//! gensim's `make_cum_table` / `cum_table` pair does it.

use crate::rng::WorkerRng;
use crate::vocab::Vocabulary;

const POWER: f64 = 0.75;
/// gensim uses `2**31 - 1`; kept identical so a table built from the same
/// vocabulary draws from the same discretised distribution.
const DOMAIN: u64 = (1u64 << 31) - 1;

pub struct NegativeSampler {
    /// `cum_table[i]` is the (scaled, rounded) cumulative probability mass
    /// of vocabulary indices `0..=i`. A draw picks a uniform integer in
    /// `[0, DOMAIN)` and binary-searches for its bucket.
    cum_table: Vec<u64>,
}

impl NegativeSampler {
    pub fn build(vocab: &Vocabulary) -> Self {
        // The null word, when present, is the vocabulary's last entry;
        // every real word occupies `0..n`, so `cum_table[i]` lines up
        // directly with vocabulary index `i` with no offset needed.
        let n = vocab.len() - if vocab.has_null_word() { 1 } else { 0 };
        let entries = &vocab.entries()[..n];

        let train_words_pow: f64 = entries.iter().map(|e| (e.count as f64).powf(POWER)).sum();

        let mut cum_table = Vec::with_capacity(entries.len());
        let mut cumulative = 0.0f64;
        for entry in entries {
            cumulative += (entry.count as f64).powf(POWER);
            cum_table.push(((cumulative / train_words_pow) * DOMAIN as f64).round() as u64);
        }
        if let Some(last) = cum_table.last_mut() {
            *last = DOMAIN;
        }

        NegativeSampler { cum_table }
    }

    fn index_for(&self, draw: u64) -> u32 {
        match self.cum_table.binary_search(&draw) {
            Ok(i) => i as u32,
            Err(i) => i.min(self.cum_table.len() - 1) as u32,
        }
    }

    /// Draws a single noise word index, skewed toward frequent words,
    /// re-rolling until it differs from `exclude` (the positive target).
    pub fn draw(&self, rng: &mut WorkerRng, exclude: u32) -> u32 {
        loop {
            let draw = rng.next_below(DOMAIN as usize) as u64;
            let candidate = self.index_for(draw);
            if candidate != exclude {
                return candidate;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cum_table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VecCorpus;
    use crate::vocab::Vocabulary;

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
    fn cum_table_ends_at_domain() {
        let vocab = build_vocab(&[("a", 100), ("b", 10), ("c", 1)]);
        let sampler = NegativeSampler::build(&vocab);
        assert_eq!(*sampler.cum_table.last().unwrap(), DOMAIN);
    }

    #[test]
    fn frequent_words_draw_more_often() {
        let vocab = build_vocab(&[("a", 1000), ("b", 1)]);
        let sampler = NegativeSampler::build(&vocab);
        let mut rng = WorkerRng::new(1, 0);
        let mut count_a = 0;
        let trials = 2000;
        for _ in 0..trials {
            if sampler.draw(&mut rng, u32::MAX) == 0 {
                count_a += 1;
            }
        }
        assert!(count_a as f64 / trials as f64 > 0.9);
    }

    #[test]
    fn never_draws_the_excluded_target_when_alternatives_exist() {
        let vocab = build_vocab(&[("a", 5), ("b", 5)]);
        let sampler = NegativeSampler::build(&vocab);
        let mut rng = WorkerRng::new(1, 0);
        for _ in 0..200 {
            assert_ne!(sampler.draw(&mut rng, 0), 0);
        }
    }
}
