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

//! Corpus iterators: the only piece of this crate the specification treats
//! as an external collaborator. `SentenceSource` is the contract the
//! vocabulary builder and training pipeline program against; everything
//! else in this module is a convenience reference implementation, grounded
//! in gensim's `LineSentence`, `Text8Corpus` and `BrownCorpus`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A restartable sequence of tokenised sentences.
///
/// The pipeline calls `reset()` between epochs when `iter > 1`. A source
/// that cannot rewind (e.g. a network stream) should report that through
/// `Word2VecError::GeneratorCorpus` at the call site rather than implementing
/// a bogus no-op `reset`.
pub trait SentenceSource: Iterator<Item = io::Result<Vec<String>>> {
    fn reset(&mut self) -> io::Result<()>;
}

/// One sentence per line, tokens separated by ASCII whitespace.
pub struct LineSentenceCorpus {
    path: PathBuf,
    reader: Option<BufReader<File>>,
}

impl LineSentenceCorpus {
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = Some(BufReader::new(File::open(&path)?));
        Ok(LineSentenceCorpus { path, reader })
    }
}

impl Iterator for LineSentenceCorpus {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(Ok(line.split_whitespace().map(str::to_owned).collect())),
            Err(e) => Some(Err(e)),
        }
    }
}

impl SentenceSource for LineSentenceCorpus {
    fn reset(&mut self) -> io::Result<()> {
        self.reader = Some(BufReader::new(File::open(&self.path)?));
        Ok(())
    }
}

/// The "text8" corpus: one gigantic whitespace-separated stream with no
/// sentence marks at all. Chopped arbitrarily into fixed-length
/// pseudo-sentences, exactly as the original `Text8Corpus` does.
pub struct Text8Corpus {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    max_sentence_length: usize,
    pending: Vec<String>,
    rest: String,
    eof: bool,
}

impl Text8Corpus {
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::with_max_sentence_length(path, 1000)
    }

    pub fn with_max_sentence_length<P: AsRef<Path>>(
        path: P,
        max_sentence_length: usize,
    ) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = Some(BufReader::new(File::open(&path)?));
        Ok(Text8Corpus {
            path,
            reader,
            max_sentence_length,
            pending: Vec::new(),
            rest: String::new(),
            eof: false,
        })
    }

    fn fill(&mut self) -> io::Result<()> {
        const CHUNK: usize = 8192;
        let reader = self.reader.as_mut().expect("reader initialised");
        let mut buf = vec![0u8; CHUNK];
        let n = reader.read(&mut buf)?;
        if n == 0 {
            if !self.rest.is_empty() {
                self.pending
                    .extend(self.rest.split_whitespace().map(str::to_owned));
                self.rest.clear();
            }
            self.eof = true;
            return Ok(());
        }
        let text = self.rest.clone() + &String::from_utf8_lossy(&buf[..n]);
        match text.rfind(' ') {
            Some(last) => {
                self.pending
                    .extend(text[..last].split_whitespace().map(str::to_owned));
                self.rest = text[last..].trim_start().to_owned();
            }
            None => self.rest = text,
        }
        Ok(())
    }
}

use std::io::Read;

impl Iterator for Text8Corpus {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.len() < self.max_sentence_length && !self.eof {
            if let Err(e) = self.fill() {
                return Some(Err(e));
            }
        }
        if self.pending.is_empty() {
            return None;
        }
        let take = self.max_sentence_length.min(self.pending.len());
        let sentence: Vec<String> = self.pending.drain(..take).collect();
        Some(Ok(sentence))
    }
}

impl SentenceSource for Text8Corpus {
    fn reset(&mut self) -> io::Result<()> {
        self.reader = Some(BufReader::new(File::open(&self.path)?));
        self.pending.clear();
        self.rest.clear();
        self.eof = false;
        Ok(())
    }
}

/// Directory of Brown-corpus-style files, each line `word/TAG word/TAG ...`.
/// Tokens whose tag is not purely alphabetic (punctuation, etc.) are
/// dropped; surviving tokens are lower-cased and re-tagged with the
/// two-letter tag prefix, matching the original `BrownCorpus`.
pub struct BrownCorpusDir {
    dirname: PathBuf,
    files: Vec<PathBuf>,
    file_idx: usize,
    reader: Option<BufReader<File>>,
}

impl BrownCorpusDir {
    pub fn new<P: AsRef<Path>>(dirname: P) -> io::Result<Self> {
        let dirname = dirname.as_ref().to_path_buf();
        let mut files: Vec<PathBuf> = std::fs::read_dir(&dirname)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(BrownCorpusDir {
            dirname,
            files,
            file_idx: 0,
            reader: None,
        })
    }

    fn open_next_file(&mut self) -> io::Result<bool> {
        if self.file_idx >= self.files.len() {
            return Ok(false);
        }
        self.reader = Some(BufReader::new(File::open(&self.files[self.file_idx])?));
        self.file_idx += 1;
        Ok(true)
    }

    fn parse_line(line: &str) -> Vec<String> {
        line.split_whitespace()
            .filter_map(|tok| {
                let mut parts = tok.rsplitn(2, '/');
                let tag = parts.next()?;
                let word = parts.next()?;
                if tag.len() >= 2 && tag.chars().take(2).all(|c| c.is_ascii_alphabetic()) {
                    Some(format!("{}/{}", word.to_lowercase(), &tag[..2]))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl Iterator for BrownCorpusDir {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.reader.is_none() {
                match self.open_next_file() {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => return Some(Err(e)),
                }
            }
            let mut line = String::new();
            let read = self.reader.as_mut().unwrap().read_line(&mut line);
            match read {
                Ok(0) => {
                    self.reader = None;
                    continue;
                }
                Ok(_) => {
                    let words = Self::parse_line(&line);
                    if !words.is_empty() {
                        return Some(Ok(words));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl SentenceSource for BrownCorpusDir {
    fn reset(&mut self) -> io::Result<()> {
        self.file_idx = 0;
        self.reader = None;
        let _ = &self.dirname;
        Ok(())
    }
}

/// Buffers a single-pass source in memory on its first pass and replays it
/// for every subsequent `reset()`, so the pipeline can iterate a
/// non-restartable source `iter` times without reading it from its
/// original medium more than once.
pub struct RepeatCorpusNTimes<S> {
    inner: Option<S>,
    buffer: Vec<Vec<String>>,
    position: usize,
    buffering: bool,
}

impl<S: SentenceSource> RepeatCorpusNTimes<S> {
    pub fn new(inner: S) -> Self {
        RepeatCorpusNTimes {
            inner: Some(inner),
            buffer: Vec::new(),
            position: 0,
            buffering: true,
        }
    }
}

impl<S: SentenceSource> Iterator for RepeatCorpusNTimes<S> {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffering {
            if let Some(inner) = self.inner.as_mut() {
                match inner.next() {
                    Some(Ok(sentence)) => {
                        self.buffer.push(sentence.clone());
                        self.position = self.buffer.len();
                        return Some(Ok(sentence));
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    None => {
                        self.buffering = false;
                        self.inner = None;
                        self.position = 0;
                    }
                }
            }
        }
        if self.position >= self.buffer.len() {
            return None;
        }
        let sentence = self.buffer[self.position].clone();
        self.position += 1;
        Some(Ok(sentence))
    }
}

impl<S: SentenceSource> SentenceSource for RepeatCorpusNTimes<S> {
    fn reset(&mut self) -> io::Result<()> {
        self.position = 0;
        Ok(())
    }
}

/// An in-memory corpus, mainly useful for tests: wraps a `Vec<Vec<String>>`
/// and is trivially restartable.
pub struct VecCorpus {
    sentences: Vec<Vec<String>>,
    position: usize,
}

impl VecCorpus {
    pub fn new(sentences: Vec<Vec<String>>) -> Self {
        VecCorpus {
            sentences,
            position: 0,
        }
    }
}

impl Iterator for VecCorpus {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.sentences.len() {
            return None;
        }
        let sentence = self.sentences[self.position].clone();
        self.position += 1;
        Some(Ok(sentence))
    }
}

impl SentenceSource for VecCorpus {
    fn reset(&mut self) -> io::Result<()> {
        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn line_sentence_splits_on_whitespace() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "the quick brown fox").unwrap();
        writeln!(f, "jumps over").unwrap();
        let mut corpus = LineSentenceCorpus::new(f.path()).unwrap();
        let s1 = corpus.next().unwrap().unwrap();
        assert_eq!(s1, vec!["the", "quick", "brown", "fox"]);
        let s2 = corpus.next().unwrap().unwrap();
        assert_eq!(s2, vec!["jumps", "over"]);
        assert!(corpus.next().is_none());
    }

    #[test]
    fn line_sentence_resets() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "a b c").unwrap();
        let mut corpus = LineSentenceCorpus::new(f.path()).unwrap();
        assert!(corpus.next().is_some());
        assert!(corpus.next().is_none());
        corpus.reset().unwrap();
        assert!(corpus.next().is_some());
    }

    #[test]
    fn text8_chunks_fixed_length() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let words: Vec<String> = (0..2500).map(|i| format!("w{i}")).collect();
        write!(f, "{}", words.join(" ")).unwrap();
        let mut corpus = Text8Corpus::with_max_sentence_length(f.path(), 1000).unwrap();
        let s1 = corpus.next().unwrap().unwrap();
        assert_eq!(s1.len(), 1000);
        let s2 = corpus.next().unwrap().unwrap();
        assert_eq!(s2.len(), 1000);
        let s3 = corpus.next().unwrap().unwrap();
        assert_eq!(s3.len(), 500);
        assert!(corpus.next().is_none());
    }

    #[test]
    fn repeat_corpus_replays_buffered_sentences() {
        let inner = VecCorpus::new(vec![vec!["a".into(), "b".into()], vec!["c".into()]]);
        let mut repeated = RepeatCorpusNTimes::new(inner);
        let mut total = 0;
        for _ in 0..2 {
            let mut count = 0;
            loop {
                match repeated.next() {
                    Some(Ok(_)) => count += 1,
                    _ => break,
                }
            }
            total += count;
            repeated.reset().unwrap();
        }
        assert_eq!(total, 4);
    }

    #[test]
    fn brown_corpus_filters_punctuation_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca01");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "The/at Fulton/np-tl County/nn-tl Grand/jj-tl ,/, Jury/nn-tl").unwrap();
        let mut corpus = BrownCorpusDir::new(dir.path()).unwrap();
        let sentence = corpus.next().unwrap().unwrap();
        assert!(sentence.iter().all(|t| !t.starts_with(",")));
        assert!(sentence.contains(&"the/at".to_string()));
    }
}
