use anyhow::Result;
use clap::Parser;

use std::path::PathBuf;

use melprep::logging;
use melprep::manifest::{dedup_records, load_manifest};
use melprep::opts::Opts;
use melprep::pipeline;
use melprep::tokenizer;
use melprep::transcode::FfmpegTranscoder;

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;
    let opts = params.into_opts();

    let train = load_manifest(&opts.train_manifest)?;
    let val = load_manifest(&opts.val_manifest)?;
    let test = load_manifest(&opts.test_manifest)?;
    let records = dedup_records(&[&train, &val, &test]);
    println!(
        "records: train={} val={} test={} unique={}",
        train.len(),
        val.len(),
        test.len(),
        records.len()
    );

    let layout = opts.layout();
    let tokenizer = tokenizer::load_or_train(
        &opts.tokenizer_path,
        opts.vocab_size,
        layout.transcripts(&records),
    )?;
    println!(
        "tokenizer: vocab_size={} encode(\"hello world\")={:?}",
        tokenizer.get_vocab_size(true),
        tokenizer::encode_text(&tokenizer, "hello world")?
    );

    let summary = pipeline::run(&opts, &records, &tokenizer, &FfmpegTranscoder::new())?;
    println!(
        "samples: processed={} skipped={}",
        summary.processed, summary.skipped
    );
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "melprep")]
#[command(about = "Preprocess a paired video/transcript corpus into training samples")]
struct Params {
    #[arg(long = "train-manifest", default_value = "data/train.txt")]
    pub train_manifest: PathBuf,

    #[arg(long = "val-manifest", default_value = "data/val.txt")]
    pub val_manifest: PathBuf,

    #[arg(long = "test-manifest", default_value = "data/test.txt")]
    pub test_manifest: PathBuf,

    #[arg(short = 'c', long = "corpus-dir", default_value = "data/lrs2")]
    pub corpus_dir: PathBuf,

    #[arg(short = 'o', long = "out-dir", default_value = "dataset")]
    pub out_dir: PathBuf,

    #[arg(short = 't', long = "tokenizer", default_value = "tokenizer.json")]
    pub tokenizer_path: PathBuf,
}

impl Params {
    fn into_opts(self) -> Opts {
        Opts {
            train_manifest: self.train_manifest,
            val_manifest: self.val_manifest,
            test_manifest: self.test_manifest,
            corpus_dir: self.corpus_dir,
            out_dir: self.out_dir,
            tokenizer_path: self.tokenizer_path,
            ..Opts::default()
        }
    }
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
