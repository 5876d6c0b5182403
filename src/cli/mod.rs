//! Command-line interface for the annotation workflow.

use clap::{Parser, Subcommand};

use crate::Result;

pub mod commands;

/// Word-meaning annotation toolkit.
#[derive(Parser)]
#[command(name = "lexanno")]
#[command(
    author,
    version,
    about = "Word-meaning annotation: random baselines, aggregation, agreement scoring",
    long_about = r#"
lexanno - word-meaning annotation toolkit

A lemma directory carries the canonical tables:
  uses.tsv        occurrences of the target word, with character offsets
  instances.tsv   units to judge (use pairs, or sense + use)
  judgments.tsv   one annotator label per row

WORKFLOW:
  1. convert-dwug   rewrite a published DWUG dataset into the canonical schema
  2. annotate       produce a random baseline annotation for each instance
  3. eval           aggregate human judgments to per-instance medians and
                    score an automatic annotation against them
                    (ordinal Krippendorff's alpha, Spearman correlation)

EXAMPLES:
  lexanno annotate data/bank --seed 42 --filename random_judgments.tsv
  lexanno eval study/ random_judgments.tsv --metrics "krip, sp"
  lexanno convert-dwug downloads/dwug_en/data --concat
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Randomly annotate a lemma directory's instances
    #[command(visible_alias = "a")]
    Annotate(commands::AnnotateArgs),

    /// Score an automatic annotation against aggregated judgments
    #[command(visible_alias = "e")]
    Eval(commands::EvalArgs),

    /// Convert a DWUG-format dataset into the canonical schema
    ConvertDwug(commands::ConvertDwugArgs),
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Annotate(args) => commands::annotate(&args),
        Commands::Eval(args) => commands::eval(&args),
        Commands::ConvertDwug(args) => commands::convert_dwug(&args),
    }
}
