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

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use word2vec_rust::config::TrainingConfig;
use word2vec_rust::corpus::LineSentenceCorpus;
use word2vec_rust::model::Word2Vec;

/// Train or query skip-gram/CBOW word embeddings.
#[derive(Parser, Debug)]
#[command(name = "word2vec-rust", version, about)]
struct Cli {
    /// One-sentence-per-line training corpus.
    #[arg(short = 't', long = "train")]
    train: PathBuf,

    /// Where to write the trained vectors (text format).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// TOML training configuration; defaults are used when omitted.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Pretrained vectors to intersect into the fresh vocabulary before
    /// training (their rows are frozen against further updates).
    #[arg(long = "intersect")]
    intersect: Option<PathBuf>,

    /// Word-analogy questions file; if given, prints accuracy after training.
    #[arg(long = "questions")]
    questions: Option<PathBuf>,

    /// Write the trained vectors in the legacy binary format instead of text.
    #[arg(long = "binary", default_value_t = false)]
    binary: bool,
}

fn run(cli: Cli) -> word2vec_rust::Result<()> {
    let config = match &cli.config {
        Some(path) => TrainingConfig::load_toml(path)?,
        None => TrainingConfig::default(),
    };

    log::info!("loading corpus from {}", cli.train.display());
    let mut corpus = LineSentenceCorpus::new(&cli.train)?;
    let mut model = Word2Vec::build_vocab(&mut corpus, config)?;

    if let Some(path) = &cli.intersect {
        let merged = model.intersect_text_format(path)?;
        log::info!("intersected {merged} pretrained vectors");
    }

    corpus.reset()?;
    let words_done = model.train(&mut corpus)?;
    log::info!("training complete: {words_done} word occurrences processed");

    if let Some(output) = &cli.output {
        if cli.binary {
            model.save_binary(output)?;
        } else {
            model.save_text(output)?;
        }
        log::info!("wrote vectors to {}", output.display());
    }

    if let Some(questions) = &cli.questions {
        let text = std::fs::read_to_string(questions)?;
        let report = model.evaluate_word_analogies(&text);
        println!(
            "analogy accuracy: {:.2}% ({}/{})",
            100.0 * report.accuracy(),
            report.correct,
            report.total
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
