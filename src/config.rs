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

//! Training configuration, loadable from a TOML file so a run can be
//! reproduced from a saved config rather than a shell history entry.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, Word2VecError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Dimensionality of the learned vectors.
    pub size: usize,
    /// Initial learning rate.
    pub alpha: f32,
    /// Learning rate never decays below this.
    pub min_alpha: f32,
    /// Max distance between the current and predicted word.
    pub window: usize,
    /// Frequent-word subsampling threshold; 0 disables subsampling.
    pub sample: f64,
    /// Drop words with fewer than this many occurrences.
    pub min_count: u64,
    /// Use skip-gram when true, CBOW when false.
    pub sg: bool,
    /// Train with hierarchical softmax.
    pub hs: bool,
    /// Number of negative samples to draw per positive pair; 0 disables NEG.
    pub negative: usize,
    /// Average context vectors (true) or sum them (false); CBOW only.
    pub cbow_mean: bool,
    /// Number of training epochs.
    pub iter: u32,
    /// Reserve index 0 for a synthetic null/padding word.
    pub null_word: bool,
    /// Number of sentences handed to a worker per job.
    pub chunksize: usize,
    /// Worker thread count; 0 means "detect and use all cores".
    pub workers: usize,
    /// Seed for the deterministic per-word initial-vector generator.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            size: 100,
            alpha: 0.025,
            min_alpha: 0.0001,
            window: 5,
            sample: 0.0,
            min_count: 5,
            sg: true,
            hs: true,
            negative: 0,
            cbow_mean: false,
            iter: 1,
            null_word: false,
            chunksize: 100,
            workers: 0,
            seed: 1,
        }
    }
}

impl TrainingConfig {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: TrainingConfig = toml::from_str(&text)
            .map_err(|e| Word2VecError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text =
            toml::to_string_pretty(self).map_err(|e| Word2VecError::InvalidConfig(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Resolved worker count: `workers` as configured, or all detected
    /// logical cores when `workers == 0`.
    pub fn resolved_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Word2VecError::InvalidConfig(
                "size must be > 0".to_string(),
            ));
        }
        if !self.hs && self.negative == 0 {
            return Err(Word2VecError::InvalidConfig(
                "at least one of hs or negative must be enabled".to_string(),
            ));
        }
        if self.alpha <= 0.0 {
            return Err(Word2VecError::InvalidConfig(
                "alpha must be > 0".to_string(),
            ));
        }
        if self.min_alpha < 0.0 || self.min_alpha > self.alpha {
            return Err(Word2VecError::InvalidConfig(
                "min_alpha must be in [0, alpha]".to_string(),
            ));
        }
        if self.sample < 0.0 {
            return Err(Word2VecError::InvalidConfig(
                "sample must be >= 0".to_string(),
            ));
        }
        if self.iter == 0 {
            return Err(Word2VecError::InvalidConfig(
                "iter must be > 0".to_string(),
            ));
        }
        if self.chunksize == 0 {
            return Err(Word2VecError::InvalidConfig(
                "chunksize must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        TrainingConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_no_loss_function() {
        let mut config = TrainingConfig::default();
        config.hs = false;
        config.negative = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_min_alpha() {
        let mut config = TrainingConfig::default();
        config.min_alpha = config.alpha + 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = TrainingConfig {
            size: 50,
            negative: 5,
            hs: false,
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        config.save_toml(&path).unwrap();
        let loaded = TrainingConfig::load_toml(&path).unwrap();
        assert_eq!(loaded.size, 50);
        assert_eq!(loaded.negative, 5);
        assert!(!loaded.hs);
    }
}
