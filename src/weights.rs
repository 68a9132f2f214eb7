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

//! The three weight matrices (`w_in`, the word-embedding table; `w_hs`,
//! hierarchical-softmax inner-node vectors; `w_neg`, negative-sampling
//! output vectors) plus the per-word freeze multiplier used by
//! `intersect()` to lock imported rows.
//!
//! Training updates these with unsynchronised concurrent writes (HogWild):
//! every worker thread touches possibly-overlapping rows with no exclusive
//! lock, on the expectation that true collisions are rare enough that the
//! resulting noise is negligible next to the gradient signal. `RowLatch`
//! below is not required for that guarantee to hold; it exists only to stop
//! a single `f32` write from ever being torn mid-word by two threads
//! landing on the exact same row in the exact same instant, and can be
//! compiled out of a debug build without changing training outcomes.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::rng::seeded_init_vector;
use crate::vocab::Vocabulary;

const STRIPES: usize = 4096;

/// A striped spinlock: one `AtomicBool` per stripe, rows hashed onto
/// stripes rather than given one lock each, since a vocabulary can run
/// into the millions of rows and a full per-row lock array would dwarf
/// the weight matrices themselves.
struct RowLatch {
    stripes: Vec<AtomicBool>,
}

impl RowLatch {
    fn new() -> Self {
        let stripes = (0..STRIPES).map(|_| AtomicBool::new(false)).collect();
        RowLatch { stripes }
    }

    fn guard(&self, row: usize) -> RowLatchGuard<'_> {
        let stripe = &self.stripes[row % STRIPES];
        while stripe
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
        }
        RowLatchGuard { stripe }
    }
}

struct RowLatchGuard<'a> {
    stripe: &'a AtomicBool,
}

impl Drop for RowLatchGuard<'_> {
    fn drop(&mut self) {
        self.stripe.store(false, Ordering::Release);
    }
}

struct Matrix {
    dim: usize,
    data: UnsafeCell<Vec<f32>>,
}

// SAFETY: concurrent access to `data` only ever happens through
// `row`/`row_mut`-style raw-pointer accessors guarded by `RowLatch`, or
// during single-threaded setup/save before any worker thread is spawned.
unsafe impl Sync for Matrix {}

impl Matrix {
    fn zeroed(rows: usize, dim: usize) -> Self {
        Matrix {
            dim,
            data: UnsafeCell::new(vec![0.0f32; rows * dim]),
        }
    }

    fn len(&self) -> usize {
        unsafe { (*self.data.get()).len() / self.dim }
    }

    /// # Safety
    /// The caller must not hold overlapping exclusive access to the same
    /// row from another thread without going through a `RowLatch` guard.
    unsafe fn row_ptr(&self, row: usize) -> *mut f32 {
        let base = (*self.data.get()).as_ptr() as *mut f32;
        base.add(row * self.dim)
    }

    fn row(&self, row: usize) -> &[f32] {
        unsafe { std::slice::from_raw_parts(self.row_ptr(row), self.dim) }
    }

    fn row_snapshot(&self, row: usize) -> Vec<f32> {
        self.row(row).to_vec()
    }
}

pub struct WeightStore {
    dim: usize,
    vocab_size: usize,
    w_in: Matrix,
    w_hs: Matrix,
    w_neg: Matrix,
    lock_factor: Vec<f32>,
    latch: RowLatch,
}

impl WeightStore {
    pub fn new(vocab: &Vocabulary, dim: usize, seed: u64, hs_rows: usize, neg_rows: usize) -> Self {
        let vocab_size = vocab.len();
        let mut w_in = Matrix::zeroed(vocab_size, dim);
        {
            let data = unsafe { &mut *w_in.data.get() };
            for entry in vocab.entries() {
                let init = seeded_init_vector(&entry.word, seed, dim);
                let start = entry.index as usize * dim;
                data[start..start + dim].copy_from_slice(&init);
            }
        }

        WeightStore {
            dim,
            vocab_size,
            w_in,
            w_hs: Matrix::zeroed(hs_rows, dim),
            w_neg: Matrix::zeroed(neg_rows, dim),
            lock_factor: vec![1.0; vocab_size],
            latch: RowLatch::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn input_row(&self, index: u32) -> &[f32] {
        self.w_in.row(index as usize)
    }

    pub fn input_row_vec(&self, index: u32) -> Vec<f32> {
        self.w_in.row_snapshot(index as usize)
    }

    pub fn hs_row(&self, inner_node: u32) -> &[f32] {
        self.w_hs.row(inner_node as usize)
    }

    pub fn neg_row(&self, index: u32) -> &[f32] {
        self.w_neg.row(index as usize)
    }

    pub fn hs_rows(&self) -> usize {
        self.w_hs.len()
    }

    pub fn neg_rows(&self) -> usize {
        self.w_neg.len()
    }

    pub fn lock_factor(&self, index: u32) -> f32 {
        self.lock_factor[index as usize]
    }

    /// Freezes `index`'s input row against further gradient updates
    /// (used by `intersect()` when importing a pretrained vector).
    pub fn freeze_input_row(&mut self, index: u32) {
        self.lock_factor[index as usize] = 0.0;
    }

    pub fn set_input_row(&mut self, index: u32, values: &[f32]) {
        debug_assert_eq!(values.len(), self.dim);
        let data = unsafe { &mut *self.w_in.data.get() };
        let start = index as usize * self.dim;
        data[start..start + self.dim].copy_from_slice(values);
    }

    /// Adds `delta * lock_factor[index]` into input row `index`, serialised
    /// against other writers of the same row by the striped latch.
    pub fn update_input_row(&self, index: u32, delta: &[f32]) {
        let lock = self.lock_factor[index as usize];
        if lock == 0.0 {
            return;
        }
        let _guard = self.latch.guard(index as usize);
        unsafe {
            let ptr = self.w_in.row_ptr(index as usize);
            for (i, d) in delta.iter().enumerate() {
                *ptr.add(i) += d * lock;
            }
        }
    }

    pub fn update_hs_row(&self, inner_node: u32, delta: &[f32]) {
        let stripe_row = self.vocab_size + inner_node as usize;
        let _guard = self.latch.guard(stripe_row);
        unsafe {
            let ptr = self.w_hs.row_ptr(inner_node as usize);
            for (i, d) in delta.iter().enumerate() {
                *ptr.add(i) += d;
            }
        }
    }

    pub fn update_neg_row(&self, index: u32, delta: &[f32]) {
        let stripe_row = 2 * self.vocab_size + index as usize;
        let _guard = self.latch.guard(stripe_row);
        unsafe {
            let ptr = self.w_neg.row_ptr(index as usize);
            for (i, d) in delta.iter().enumerate() {
                *ptr.add(i) += d;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VecCorpus;

    fn build_vocab() -> Vocabulary {
        let sentences = vec![vec!["a".to_string()]; 5]
            .into_iter()
            .chain(vec![vec!["b".to_string()]; 3])
            .collect();
        let mut corpus = VecCorpus::new(sentences);
        Vocabulary::build(&mut corpus, 1, false).unwrap()
    }

    #[test]
    fn rows_are_deterministically_initialised() {
        let vocab = build_vocab();
        let store = WeightStore::new(&vocab, 8, 42, vocab.len() - 1, vocab.len());
        let a = store.input_row_vec(0);
        let expected = seeded_init_vector("a", 42, 8);
        assert_eq!(a, expected);
    }

    #[test]
    fn freezing_a_row_stops_updates() {
        let vocab = build_vocab();
        let mut store = WeightStore::new(&vocab, 4, 1, vocab.len(), vocab.len());
        store.freeze_input_row(0);
        let before = store.input_row_vec(0);
        store.update_input_row(0, &[1.0, 1.0, 1.0, 1.0]);
        let after = store.input_row_vec(0);
        assert_eq!(before, after);
    }

    #[test]
    fn updates_apply_when_unfrozen() {
        let vocab = build_vocab();
        let store = WeightStore::new(&vocab, 4, 1, vocab.len(), vocab.len());
        let before = store.input_row_vec(1);
        store.update_input_row(1, &[0.1, 0.1, 0.1, 0.1]);
        let after = store.input_row_vec(1);
        assert_ne!(before, after);
    }
}
