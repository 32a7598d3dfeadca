//! Corpus layout: where each record's files live, and how transcripts are read.
//!
//! Every record ID maps to a family of sibling files. Under the corpus
//! directory live the transcript (`<id>.txt`), the source video (`<id>.mp4`),
//! and the transcoded waveform (`<id>.wav`). Under the output directory lives
//! the persisted sample (`<id>.bin`). IDs may contain path separators, so any
//! of these can sit in nested subdirectories.

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Derives the on-disk paths belonging to a record ID.
#[derive(Debug, Clone)]
pub struct CorpusLayout {
    corpus_dir: PathBuf,
    out_dir: PathBuf,
}

impl CorpusLayout {
    pub fn new(corpus_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
            out_dir: out_dir.into(),
        }
    }

    /// Path of the record's transcript file.
    pub fn transcript_path(&self, id: &str) -> PathBuf {
        self.corpus_dir.join(format!("{id}.txt"))
    }

    /// Path of the record's source video file.
    pub fn video_path(&self, id: &str) -> PathBuf {
        self.corpus_dir.join(format!("{id}.mp4"))
    }

    /// Path of the record's transcoded waveform, next to the video.
    pub fn waveform_path(&self, id: &str) -> PathBuf {
        self.corpus_dir.join(format!("{id}.wav"))
    }

    /// Path of the record's persisted sample under the output directory.
    pub fn sample_path(&self, id: &str) -> PathBuf {
        self.out_dir.join(format!("{id}.bin"))
    }

    /// Read the transcript text for `id`.
    ///
    /// Transcripts are single-line files of the form `label:<text>`. We take
    /// everything after the first colon (the text itself may contain colons)
    /// and trim surrounding whitespace. A transcript without a colon is
    /// malformed and rejected.
    pub fn read_transcript(&self, id: &str) -> Result<String> {
        let path = self.transcript_path(id);
        let file = File::open(&path)
            .with_context(|| format!("failed to open transcript '{}'", path.display()))?;

        let mut line = String::new();
        BufReader::new(file)
            .read_line(&mut line)
            .with_context(|| format!("failed to read transcript '{}'", path.display()))?;

        match transcript_text(&line) {
            Some(text) => Ok(text.to_owned()),
            None => bail!(
                "transcript '{}' is missing the `label:` prefix",
                path.display()
            ),
        }
    }

    /// Lazily iterate transcript texts for every record in `records`.
    ///
    /// Each step opens one transcript file, so a full corpus never has to fit
    /// in memory. The iterator is cheap to construct; build a fresh one to
    /// restart from the beginning.
    pub fn transcripts<'a>(&'a self, records: &'a BTreeSet<String>) -> TranscriptIter<'a> {
        TranscriptIter {
            layout: self,
            ids: records.iter(),
        }
    }
}

/// Extract the transcript text from a `label:<text>` line.
fn transcript_text(line: &str) -> Option<&str> {
    let (_label, text) = line.split_once(':')?;
    Some(text.trim())
}

/// Lazy iterator over per-record transcript texts.
///
/// Yields `Result<String>` so a missing or malformed transcript surfaces as an
/// error at the point it is reached instead of being silently dropped.
pub struct TranscriptIter<'a> {
    layout: &'a CorpusLayout,
    ids: btree_set::Iter<'a, String>,
}

impl Iterator for TranscriptIter<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        Some(self.layout.read_transcript(id))
    }
}
