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

//! Reading and writing vectors in the word2vec C tool's legacy format
//! (`<vocab_size> <layer1_size>\n` header, then one `word vector...` row
//! per entry, either space-separated ASCII floats or raw little-endian
//! `f32`s), plus `intersect`, which merges a previously trained set of
//! vectors into a fresh vocabulary and freezes the imported rows.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, Word2VecError};

pub struct LoadedVectors {
    pub words: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
    pub dim: usize,
}

fn parse_header(line: &str) -> Result<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let vocab_size = parts
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| Word2VecError::InvalidFormat("missing vocab_size header field".into()))?;
    let dim = parts
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| Word2VecError::InvalidFormat("missing layer1_size header field".into()))?;
    Ok((vocab_size, dim))
}

/// Writes `words.len()` rows of `dim` floats each, ASCII space-separated.
pub fn save_text<P: AsRef<Path>>(path: P, words: &[&str], vectors: &[&[f32]], dim: usize) -> Result<()> {
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    writeln!(writer, "{} {}", words.len(), dim)?;
    for (word, vector) in words.iter().zip(vectors.iter()) {
        write!(writer, "{word}")?;
        for value in vector.iter() {
            write!(writer, " {value}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Writes the same rows as `save_text`, but each vector as raw
/// little-endian `f32`s, matching `-binary 1` in the reference tool.
pub fn save_binary<P: AsRef<Path>>(path: P, words: &[&str], vectors: &[&[f32]], dim: usize) -> Result<()> {
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    writeln!(writer, "{} {}", words.len(), dim)?;
    for (word, vector) in words.iter().zip(vectors.iter()) {
        write!(writer, "{word} ")?;
        for value in vector.iter() {
            writer.write_all(&value.to_le_bytes())?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn load_text<P: AsRef<Path>>(path: P) -> Result<LoadedVectors> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = String::new();
    reader.read_line(&mut header)?;
    let (vocab_size, dim) = parse_header(&header)?;

    let mut words = Vec::with_capacity(vocab_size);
    let mut vectors = Vec::with_capacity(vocab_size);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let word = parts
            .next()
            .ok_or_else(|| Word2VecError::InvalidFormat("row missing word".into()))?
            .to_string();
        let vector: Vec<f32> = parts
            .map(|v| {
                v.parse::<f32>()
                    .map_err(|e| Word2VecError::InvalidFormat(format!("bad float: {e}")))
            })
            .collect::<Result<_>>()?;
        if vector.len() != dim {
            return Err(Word2VecError::IncompatibleDimension {
                expected: dim,
                found: vector.len(),
            });
        }
        words.push(word);
        vectors.push(vector);
    }
    Ok(LoadedVectors { words, vectors, dim })
}

pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<LoadedVectors> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = String::new();
    read_ascii_line(&mut reader, &mut header)?;
    let (vocab_size, dim) = parse_header(&header)?;

    let mut words = Vec::with_capacity(vocab_size);
    let mut vectors = Vec::with_capacity(vocab_size);
    for _ in 0..vocab_size {
        let mut word = String::new();
        read_ascii_word(&mut reader, &mut word)?;
        let mut raw = vec![0u8; dim * 4];
        reader.read_exact(&mut raw)?;
        let vector: Vec<f32> = raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        words.push(word);
        vectors.push(vector);
    }
    Ok(LoadedVectors { words, vectors, dim })
}

fn read_ascii_line<R: Read>(reader: &mut R, out: &mut String) -> Result<()> {
    let mut byte = [0u8; 1];
    loop {
        reader.read_exact(&mut byte)?;
        if byte[0] == b'\n' {
            return Ok(());
        }
        out.push(byte[0] as char);
    }
}

fn read_ascii_word<R: Read>(reader: &mut R, out: &mut String) -> Result<()> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    // Every row but the first is preceded by the previous row's trailing
    // newline (both `save_binary` and the reference tool emit one); skip
    // exactly one before starting to accumulate the word.
    if byte[0] == b'\n' {
        reader.read_exact(&mut byte)?;
    }
    loop {
        if byte[0] == b' ' {
            return Ok(());
        }
        out.push(byte[0] as char);
        reader.read_exact(&mut byte)?;
    }
}

/// Intersects `loaded` with a live model's vocabulary: for every word
/// present in both, overwrites the model's input row with the loaded
/// vector and freezes it (`lock_factor = 0.0`) so training cannot drift it
/// back away from the imported value. Words in `loaded` absent from the
/// model's vocabulary are silently ignored, matching
/// `Word2Vec.intersect_word2vec_format`.
pub fn intersect(
    loaded: &LoadedVectors,
    vocab: &crate::vocab::Vocabulary,
    weights: &mut crate::weights::WeightStore,
) -> Result<usize> {
    if loaded.dim != weights.dim() {
        return Err(Word2VecError::IncompatibleDimension {
            expected: weights.dim(),
            found: loaded.dim,
        });
    }
    let mut merged = 0usize;
    for (word, vector) in loaded.words.iter().zip(loaded.vectors.iter()) {
        if let Some(index) = vocab.index_of(word) {
            weights.set_input_row(index, vector);
            weights.freeze_input_row(index);
            merged += 1;
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.txt");
        let words = ["a", "b"];
        let va = [1.0f32, 2.0, 3.0];
        let vb = [4.0f32, 5.0, 6.0];
        save_text(&path, &words, &[&va, &vb], 3).unwrap();
        let loaded = load_text(&path).unwrap();
        assert_eq!(loaded.words, vec!["a", "b"]);
        assert_eq!(loaded.vectors[0], va.to_vec());
        assert_eq!(loaded.vectors[1], vb.to_vec());
    }

    #[test]
    fn binary_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        let words = ["cat", "dog"];
        let va = [0.5f32, -0.25, 0.75];
        let vb = [1.5f32, 2.5, -3.5];
        save_binary(&path, &words, &[&va, &vb], 3).unwrap();
        let loaded = load_binary(&path).unwrap();
        assert_eq!(loaded.words, vec!["cat", "dog"]);
        assert_eq!(loaded.vectors[0], va.to_vec());
        assert_eq!(loaded.vectors[1], vb.to_vec());
    }

    #[test]
    fn malformed_header_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "not a header\n").unwrap();
        assert!(load_text(&path).is_err());
    }

    #[test]
    fn mismatched_dimension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_dim.txt");
        std::fs::write(&path, "1 3\nword 1.0 2.0\n").unwrap();
        assert!(matches!(
            load_text(&path),
            Err(Word2VecError::IncompatibleDimension { .. })
        ));
    }
}
