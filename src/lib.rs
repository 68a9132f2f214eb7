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

//! Word-embedding training and query engine: skip-gram and CBOW with
//! hierarchical softmax and negative sampling, trained with lock-free
//! concurrent SGD across a worker pool.

pub mod config;
pub mod corpus;
pub mod error;
pub mod format;
pub mod huffman;
pub mod kernel;
pub mod model;
pub mod pipeline;
pub mod rng;
pub mod sampler;
pub mod similarity;
pub mod subsample;
pub mod vocab;
pub mod weights;

pub use config::TrainingConfig;
pub use error::{Result, Word2VecError};
pub use model::Word2Vec;
