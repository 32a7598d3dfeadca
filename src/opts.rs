use std::path::PathBuf;

use crate::corpus::CorpusLayout;
use crate::tokenizer::DEFAULT_VOCAB_SIZE;

/// Options that control a preprocessing run.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Manifest listing the training-split record IDs.
    pub train_manifest: PathBuf,

    /// Manifest listing the validation-split record IDs.
    pub val_manifest: PathBuf,

    /// Manifest listing the test-split record IDs.
    pub test_manifest: PathBuf,

    /// Directory holding the per-record transcript (`.txt`) and video (`.mp4`)
    /// files that manifests refer to.
    pub corpus_dir: PathBuf,

    /// Directory where per-record sample artifacts are written.
    pub out_dir: PathBuf,

    /// Path of the tokenizer artifact.
    ///
    /// When the file exists we reload it instead of training, so a corpus is
    /// only scanned for tokenizer training once.
    pub tokenizer_path: PathBuf,

    /// Target vocabulary size for tokenizer training, including the four
    /// reserved control symbols.
    pub vocab_size: usize,

    /// Number of mel filter-bank bins per feature frame.
    pub num_mel_bins: usize,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            train_manifest: PathBuf::from("data/train.txt"),
            val_manifest: PathBuf::from("data/val.txt"),
            test_manifest: PathBuf::from("data/test.txt"),
            corpus_dir: PathBuf::from("data/lrs2"),
            out_dir: PathBuf::from("dataset"),
            tokenizer_path: PathBuf::from("tokenizer.json"),
            vocab_size: DEFAULT_VOCAB_SIZE,
            num_mel_bins: 80,
        }
    }
}

impl Opts {
    /// The corpus layout derived from the configured directories.
    pub fn layout(&self) -> CorpusLayout {
        CorpusLayout::new(&self.corpus_dir, &self.out_dir)
    }
}
