//! Per-lemma evaluation of an automatic annotator against the consensus.
//!
//! Walks the per-lemma subdirectories of `root/data`, aggregates each
//! lemma's judgments into consensus medians, aligns them with the
//! automatic annotation file, computes the requested statistics, and
//! writes one `evaluation.tsv` at the root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use serde::Serialize;

use crate::agreement::{krippendorff_alpha_ordinal, spearman};
use crate::aggregate::{load_auto_annotation, load_judgments, make_arrays};
use crate::tsv::write_table;
use crate::{Error, Result};

/// Name of the per-lemma data subdirectory under the evaluation root.
pub const DATA_DIR: &str = "data";
/// Name of the output table written at the evaluation root.
pub const EVALUATION_FILE: &str = "evaluation.tsv";

/// A requested agreement statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Ordinal Krippendorff's alpha (`krip`).
    Krippendorff,
    /// Spearman rank correlation (`sp`).
    Spearman,
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Metric> {
        match s {
            "krip" => Ok(Metric::Krippendorff),
            "sp" => Ok(Metric::Spearman),
            other => Err(Error::format(format!(
                "'{}' is not a metric (expected 'krip' or 'sp')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Krippendorff => write!(f, "krip"),
            Metric::Spearman => write!(f, "sp"),
        }
    }
}

/// Parse a comma-separated metric list such as `"krip, sp"`.
pub fn parse_metrics(s: &str) -> Result<Vec<Metric>> {
    s.split(',').map(|m| m.trim().parse()).collect()
}

/// Agreement scores for one lemma. A `None` metric was not requested.
#[derive(Debug, Clone, Serialize)]
pub struct LemmaResult {
    /// The word under study.
    pub lemma: String,
    /// Ordinal Krippendorff's alpha, if requested.
    pub krip: Option<f64>,
    /// Spearman rank correlation, if requested.
    pub sp: Option<f64>,
}

/// Evaluate every per-lemma directory under `root/data`.
///
/// Each directory must carry `judgments.tsv`, `uses.tsv`, and an automatic
/// annotation file named `auto_filename`. Directories are visited in name
/// order; a later directory for the same lemma replaces the earlier
/// result. Any load, alignment, or format failure aborts the run.
pub fn run(root: &Path, auto_filename: &str, metrics: &[Metric]) -> Result<Vec<LemmaResult>> {
    let data_path = root.join(DATA_DIR);
    if !data_path.is_dir() {
        return Err(Error::missing_resource(format!(
            "'{}' does not contain a '{}' directory",
            root.display(),
            DATA_DIR
        )));
    }

    let mut dirs: Vec<PathBuf> = std::fs::read_dir(&data_path)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    let mut results: Vec<LemmaResult> = Vec::new();
    let mut by_lemma: HashMap<String, usize> = HashMap::new();
    for dir in dirs {
        let consensus = load_judgments(&dir)?;
        let auto = load_auto_annotation(&dir.join(auto_filename))?;
        let (gold_labels, auto_labels) = make_arrays(&consensus, &auto)?;

        let result = LemmaResult {
            lemma: consensus.lemma.clone(),
            krip: metrics
                .contains(&Metric::Krippendorff)
                .then(|| krippendorff_alpha_ordinal(&gold_labels, &auto_labels)),
            sp: metrics
                .contains(&Metric::Spearman)
                .then(|| spearman(&gold_labels, &auto_labels)),
        };
        info!(
            "evaluated '{}': {} instances, krip={:?} sp={:?}",
            result.lemma,
            gold_labels.len(),
            result.krip,
            result.sp
        );

        match by_lemma.get(&result.lemma).copied() {
            Some(i) => results[i] = result,
            None => {
                by_lemma.insert(result.lemma.clone(), results.len());
                results.push(result);
            }
        }
    }
    Ok(results)
}

/// Write the result records as `root/evaluation.tsv`.
///
/// Columns are `lemma`, `krip`, `sp`; a metric that was not requested is
/// an empty cell, a degenerate statistic is written as `NaN`.
pub fn write_results(results: &[LemmaResult], root: &Path) -> Result<PathBuf> {
    let path = root.join(EVALUATION_FILE);
    let rows: Vec<Vec<String>> = results
        .iter()
        .map(|r| {
            vec![
                r.lemma.clone(),
                r.krip.map(|v| v.to_string()).unwrap_or_default(),
                r.sp.map(|v| v.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    write_table(&path, &["lemma", "krip", "sp"], &rows)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_lemma_dir(data: &Path, name: &str, lemma: &str) {
        let dir = data.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("uses.tsv"),
            format!(
                "dataID\tcontext\tindices_target_token\tindices_target_sentence\tlemma\n\
                 u0\tsome context here\t0:4\t0:17\t{}\n",
                lemma
            ),
        )
        .unwrap();
        fs::write(
            dir.join("judgments.tsv"),
            format!(
                "instanceID\tlabel\tcomment\tannotator\n\
                 0_{l}\t1\t-\ta\n\
                 0_{l}\t2\t-\tb\n\
                 1_{l}\t4\t-\ta\n\
                 1_{l}\t4\t-\tb\n",
                l = lemma
            ),
        )
        .unwrap();
        fs::write(
            dir.join("auto.tsv"),
            format!(
                "instanceID\tlabel\tcomment\n0_{l}\t1.5\t-\n1_{l}\t4\t-\n",
                l = lemma
            ),
        )
        .unwrap();
    }

    #[test]
    fn metric_parsing() {
        assert_eq!(
            parse_metrics("krip, sp").unwrap(),
            vec![Metric::Krippendorff, Metric::Spearman]
        );
        assert!(matches!(parse_metrics("krip, f1"), Err(Error::Format(_))));
    }

    #[test]
    fn run_scores_each_lemma_directory() {
        let root = TempDir::new().unwrap();
        let data = root.path().join(DATA_DIR);
        write_lemma_dir(&data, "01_bank", "bank");
        write_lemma_dir(&data, "02_wall", "wall");

        let results = run(
            root.path(),
            "auto.tsv",
            &[Metric::Krippendorff, Metric::Spearman],
        )
        .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].lemma, "bank");
        assert_eq!(results[1].lemma, "wall");
        // Automatic labels equal the medians exactly: full agreement.
        assert!((results[0].krip.unwrap() - 1.0).abs() < 1e-9);
        assert!((results[0].sp.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn run_requires_the_data_directory() {
        let root = TempDir::new().unwrap();
        assert!(matches!(
            run(root.path(), "auto.tsv", &[Metric::Spearman]),
            Err(Error::MissingResource(_))
        ));
    }

    #[test]
    fn unrequested_metrics_are_empty_cells() {
        let root = TempDir::new().unwrap();
        let results = vec![LemmaResult {
            lemma: "bank".to_string(),
            krip: None,
            sp: Some(1.0),
        }];
        let path = write_results(&results, root.path()).unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert_eq!(written, "lemma\tkrip\tsp\nbank\t\t1\n");
    }
}
