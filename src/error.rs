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

use thiserror::Error;

/// Every fatal condition the engine can surface to a caller.
///
/// Training-time token-level problems (an out-of-vocabulary token in a
/// sentence) are not represented here: those are logged and skipped
/// in-line, never propagated as an error.
#[derive(Error, Debug)]
pub enum Word2VecError {
    #[error("corpus produced no sentences")]
    EmptyCorpus,

    #[error("vocabulary is empty after pruning (min_count too high?)")]
    EmptyVocabulary,

    #[error("cannot train before a vocabulary has been built")]
    NoTrainingBeforeVocab,

    #[error("word '{0}' is not in the vocabulary")]
    OutOfVocabularyWord(String),

    #[error("invalid vector file format: {0}")]
    InvalidFormat(String),

    #[error("incompatible vector dimension: expected {expected}, found {found}")]
    IncompatibleDimension { expected: usize, found: usize },

    #[error("cannot compare: no valid words supplied")]
    CannotCompareEmpty,

    #[error("corpus is not restartable but iter > 1 and no replay buffer was configured")]
    GeneratorCorpus,

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Word2VecError>;
