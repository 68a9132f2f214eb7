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

//! Huffman tree construction for hierarchical softmax.
//!
//! The tree lives in an arena, not as boxed nodes with pointers: indices
//! `0..n` are the vocabulary's leaves (one per non-null word, in the
//! vocabulary's existing descending-count order), indices `n..` are
//! internal nodes, appended as the merge creates them. A binary min-heap
//! repeatedly merges the two lightest remaining nodes; ties break on
//! insertion order so the tree is identical across runs regardless of the
//! heap implementation's internal tie behaviour. A second, iterative
//! top-down pass over the arena (no recursion, so depth is not bounded by
//! stack size) then reads each leaf's code and path back out.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::vocab::Vocabulary;

struct Node {
    count: u64,
    left: usize,
    right: usize,
}

/// Assigns `code` and `point` to every non-null-word entry in `vocab`,
/// in place.
pub fn build_huffman_tree(vocab: &mut Vocabulary) {
    // The null word, when present, is the vocabulary's last entry (index
    // `n`); every real word occupies `0..n`, so no offset is needed when
    // indexing into the arena below.
    let n = vocab.len() - if vocab.has_null_word() { 1 } else { 0 };
    if n == 0 {
        return;
    }
    if n == 1 {
        vocab.entries_mut()[0].code = vec![0];
        vocab.entries_mut()[0].point = vec![0];
        return;
    }

    let mut arena: Vec<Node> = vocab.entries()[..n]
        .iter()
        .map(|e| Node {
            count: e.count,
            left: usize::MAX,
            right: usize::MAX,
        })
        .collect();

    let mut heap: BinaryHeap<Reverse<(u64, u64, usize)>> = BinaryHeap::with_capacity(2 * n);
    let mut order = 0u64;
    for (i, node) in arena.iter().enumerate() {
        heap.push(Reverse((node.count, order, i)));
        order += 1;
    }

    while heap.len() > 1 {
        let Reverse((c1, _, i1)) = heap.pop().unwrap();
        let Reverse((c2, _, i2)) = heap.pop().unwrap();
        let merged = arena.len();
        arena.push(Node {
            count: c1 + c2,
            left: i1,
            right: i2,
        });
        heap.push(Reverse((c1 + c2, order, merged)));
        order += 1;
    }

    let Reverse((_, _, root)) = heap.pop().unwrap();

    let mut stack: Vec<(usize, Vec<u8>, Vec<u32>)> = vec![(root, Vec::new(), Vec::new())];
    while let Some((idx, code, point)) = stack.pop() {
        if idx < n {
            let entry = &mut vocab.entries_mut()[idx];
            entry.code = code;
            entry.point = point;
        } else {
            let mut point_here = point;
            point_here.push((idx - n) as u32);

            let node_left = arena[idx].left;
            let node_right = arena[idx].right;

            let mut left_code = code.clone();
            left_code.push(0);
            let mut right_code = code;
            right_code.push(1);

            stack.push((node_left, left_code, point_here.clone()));
            stack.push((node_right, right_code, point_here));
        }
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
    fn every_word_gets_a_code() {
        let mut vocab = build_vocab(&[("a", 10), ("b", 5), ("c", 3), ("d", 1)]);
        build_huffman_tree(&mut vocab);
        for entry in vocab.entries() {
            assert!(!entry.code.is_empty());
            assert!(!entry.point.is_empty());
            assert_eq!(entry.code.len(), entry.point.len());
        }
    }

    #[test]
    fn more_frequent_words_get_shorter_or_equal_codes() {
        let mut vocab = build_vocab(&[("a", 1000), ("b", 500), ("c", 1), ("d", 1), ("e", 1)]);
        build_huffman_tree(&mut vocab);
        let len_a = vocab.entries()[0].code.len();
        let len_e = vocab.entries()[4].code.len();
        assert!(len_a <= len_e);
    }

    #[test]
    fn single_word_vocabulary_gets_trivial_code() {
        let mut vocab = build_vocab(&[("only", 5)]);
        build_huffman_tree(&mut vocab);
        assert_eq!(vocab.entries()[0].code, vec![0]);
    }

    #[test]
    fn null_word_is_left_without_a_code() {
        let mut vocab = build_vocab(&[("a", 5), ("b", 3)]);
        assert!(!vocab.has_null_word());
        let mut with_null = {
            let sentences = vec![vec!["a".to_string()]; 5]
                .into_iter()
                .chain(vec![vec!["b".to_string()]; 3])
                .collect();
            let mut corpus = VecCorpus::new(sentences);
            Vocabulary::build(&mut corpus, 1, true).unwrap()
        };
        build_huffman_tree(&mut with_null);
        let last = with_null.len() - 1;
        assert!(with_null.entries()[last].code.is_empty());
        let _ = &mut vocab;
    }
}
