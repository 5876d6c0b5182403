//! Command runners behind the CLI surface.

use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::annotator::{load_vocab, RandomAnnotator};
use crate::provider::AnnotationProvider;
use crate::{evaluate, sampling, Result};

/// Arguments for `lexanno annotate`.
#[derive(Args)]
pub struct AnnotateArgs {
    /// Directory containing uses.tsv and instances.tsv
    pub usage_dir: PathBuf,

    /// Directory to store the judgments file (defaults to the usage dir)
    #[arg(short = 'c', long)]
    pub out_dir: Option<PathBuf>,

    /// File name for the flushed judgments
    #[arg(short, long, default_value = crate::provider::DEFAULT_JUDGMENTS_FILE)]
    pub filename: String,

    /// Visit instances in shuffled order instead of table order
    #[arg(long)]
    pub shuffle: bool,

    /// Random seed (drawn from process entropy when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Draw labels from the usage dir's vocab.tsv instead of each
    /// instance's label set (substitution-style annotation)
    #[arg(long)]
    pub vocab: bool,
}

/// Randomly annotate every instance and flush the judgments.
pub fn annotate(args: &AnnotateArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(sampling::process_seed);
    let annotator = RandomAnnotator::new(seed);

    let mut provider = AnnotationProvider::new(&args.usage_dir)?;
    let count = if args.vocab {
        let vocab = load_vocab(&args.usage_dir)?;
        annotator.annotate_with_vocab(&mut provider, &vocab, args.shuffle)?
    } else {
        annotator.annotate(&mut provider, args.shuffle)?
    };
    provider.flush_judgments(args.out_dir.as_deref(), Some(&args.filename))?;

    info!(
        "wrote {} judgments to '{}' (seed {})",
        count,
        args.out_dir
            .as_deref()
            .unwrap_or(&args.usage_dir)
            .join(&args.filename)
            .display(),
        seed
    );
    Ok(())
}

/// Arguments for `lexanno eval`.
#[derive(Args)]
pub struct EvalArgs {
    /// Evaluation root containing a data/ directory of per-lemma folders
    pub root: PathBuf,

    /// File name of the automatic annotation inside each lemma folder
    pub auto_filename: String,

    /// Metrics to compute, comma-separated (e.g. "krip, sp")
    #[arg(short, long, default_value = "krip, sp")]
    pub metrics: String,

    /// Also print the result records as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

/// Evaluate an automatic annotator over every lemma and write evaluation.tsv.
pub fn eval(args: &EvalArgs) -> Result<()> {
    let metrics = evaluate::parse_metrics(&args.metrics)?;
    let results = evaluate::run(&args.root, &args.auto_filename, &metrics)?;
    let path = evaluate::write_results(&results, &args.root)?;
    info!("wrote {} result rows to '{}'", results.len(), path.display());

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).expect("results serialize")
        );
    }
    Ok(())
}

/// Arguments for `lexanno convert-dwug`.
#[derive(Args)]
pub struct ConvertDwugArgs {
    /// Data directory of per-lemma DWUG folders (or the download target
    /// with --download)
    pub dir: PathBuf,

    /// Download and extract a published DWUG distribution into DIR first
    #[cfg(feature = "network")]
    #[arg(long)]
    pub download: bool,

    /// Language code of the distribution to download (en, de, la, sv, es)
    #[cfg(feature = "network")]
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Merge the converted per-lemma tables into dataset-level tables
    #[arg(long)]
    pub concat: bool,
}

/// Convert every per-lemma DWUG folder under the data directory.
pub fn convert_dwug(args: &ConvertDwugArgs) -> Result<()> {
    #[cfg(feature = "network")]
    let data_dir = if args.download {
        crate::convert::dwug::download(&args.dir, &args.language)?
    } else {
        args.dir.clone()
    };
    #[cfg(not(feature = "network"))]
    let data_dir = args.dir.clone();

    let mut converted = 0;
    for entry in std::fs::read_dir(&data_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            crate::convert::dwug::transform_dir(&path)?;
            converted += 1;
        }
    }
    info!("converted {} lemma directories", converted);

    if args.concat {
        crate::convert::dwug::concat(&data_dir)?;
    }
    Ok(())
}
