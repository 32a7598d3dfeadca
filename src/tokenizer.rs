//! Subword tokenizer training, caching, and transcript encoding.
//!
//! The tokenizer is a byte-pair-encoding model trained on the corpus
//! transcripts and saved as a human-readable JSON artifact. Training happens
//! at most once per artifact path: when the file already exists we reload it
//! as-is, so repeated runs (and runs against a grown corpus) keep a stable
//! vocabulary.
//!
//! Four control symbols are registered ahead of the learned vocabulary, in
//! this order: `[UNK]`, `[PAD]`, `[BOS]`, `[EOS]`. Transcript encodings are
//! wrapped in the begin/end markers so downstream training data carries
//! explicit utterance boundaries.

use std::path::Path;

use anyhow::{Result, anyhow};
use tokenizers::models::TrainerWrapper;
use tokenizers::models::bpe::{BPE, BpeTrainerBuilder};
use tokenizers::{AddedToken, Tokenizer};

/// Default target vocabulary size, including the control symbols.
pub const DEFAULT_VOCAB_SIZE: usize = 1000;

/// Marker for out-of-vocabulary input.
pub const UNK_TOKEN: &str = "[UNK]";
/// Marker for batch padding.
pub const PAD_TOKEN: &str = "[PAD]";
/// Marker opening every encoded transcript.
pub const BOS_TOKEN: &str = "[BOS]";
/// Marker closing every encoded transcript.
pub const EOS_TOKEN: &str = "[EOS]";

/// The control symbols, in registration order (IDs 0 through 3).
pub const CONTROL_TOKENS: [&str; 4] = [UNK_TOKEN, PAD_TOKEN, BOS_TOKEN, EOS_TOKEN];

/// Load the tokenizer artifact at `path`, or train one from `transcripts` and
/// save it there.
///
/// Loading never touches `transcripts`, so reusing an artifact costs no corpus
/// I/O. When training is needed the transcript stream is consumed once; any
/// read failure aborts before an artifact is written, leaving no partial state
/// behind.
pub fn load_or_train<I>(path: &Path, vocab_size: usize, transcripts: I) -> Result<Tokenizer>
where
    I: Iterator<Item = Result<String>> + Send,
{
    if path.exists() {
        tracing::info!(path = %path.display(), "loading existing tokenizer");
        return load(path);
    }

    tracing::info!(path = %path.display(), vocab_size, "training tokenizer");
    let tokenizer = train(vocab_size, transcripts)?;
    tokenizer
        .save(path, true)
        .map_err(|e| anyhow!("failed to save tokenizer to '{}': {e}", path.display()))?;
    Ok(tokenizer)
}

/// Load a previously trained tokenizer artifact.
pub fn load(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path)
        .map_err(|e| anyhow!("failed to load tokenizer from '{}': {e}", path.display()))
}

/// Train a byte-pair-encoding tokenizer over a stream of transcripts.
///
/// The stream yields `Result<String>` so corpus read errors can surface
/// mid-training. Training sees the stream only up to the first error; we then
/// discard the partial model and return that error instead.
fn train<I>(vocab_size: usize, transcripts: I) -> Result<Tokenizer>
where
    I: Iterator<Item = Result<String>> + Send,
{
    let mut trainer: TrainerWrapper = BpeTrainerBuilder::new()
        .vocab_size(vocab_size)
        .special_tokens(
            CONTROL_TOKENS
                .iter()
                .map(|token| AddedToken::from(*token, true))
                .collect(),
        )
        .show_progress(false)
        .build()
        .into();

    let mut read_err: Option<anyhow::Error> = None;
    let texts = transcripts.map_while(|res| match res {
        Ok(text) => Some(text),
        Err(err) => {
            read_err = Some(err);
            None
        }
    });

    let mut tokenizer = Tokenizer::new(BPE::default());
    let trained = tokenizer.train(&mut trainer, texts).map(|_| ());
    if let Some(err) = read_err {
        return Err(err.context("tokenizer training aborted by a transcript read failure"));
    }
    trained.map_err(|e| anyhow!("tokenizer training failed: {e}"))?;

    Ok(tokenizer)
}

/// Encode arbitrary text into token IDs.
pub fn encode_text(tokenizer: &Tokenizer, text: &str) -> Result<Vec<u32>> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow!("failed to encode text: {e}"))?;
    Ok(encoding.get_ids().to_vec())
}

/// Encode a transcript wrapped in the `[BOS]` and `[EOS]` markers.
pub fn encode_transcript(tokenizer: &Tokenizer, text: &str) -> Result<Vec<u32>> {
    encode_text(tokenizer, &format!("{BOS_TOKEN}{text}{EOS_TOKEN}"))
}
