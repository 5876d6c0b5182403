//! Multi-annotator judgment aggregation.
//!
//! Reduces a lemma directory's `judgments.tsv` to one consensus value per
//! instance: the non-label sentinel maps to a missing value (never to
//! zero), remaining labels are coerced to numbers, rows are grouped by
//! `instanceID`, and each group's consensus is the median of its
//! non-missing labels. Instances whose judgments are all missing are
//! dropped. Missing values are represented as `f64::NAN` throughout.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::schema::Judgment;
use crate::tsv::Table;
use crate::{Error, Result};

/// Judgments table file name consumed by aggregation.
pub const JUDGMENTS_FILE: &str = "judgments.tsv";
/// Uses table file name (lemma resolution).
pub const USES_FILE: &str = "uses.tsv";

/// The sentinel label meaning "no judgment could be made".
pub const NON_LABEL: &str = "-";

/// One instance's collected judgments and their median.
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusRow {
    /// The judged instance.
    pub instance_id: String,
    /// All contributed labels, missing values as NaN, in table order.
    pub labels: Vec<f64>,
    /// Median of the non-missing labels.
    pub median: f64,
}

/// A lemma's aggregated judgments.
#[derive(Debug, Clone, Serialize)]
pub struct Consensus {
    /// The word under study, resolved from the directory's uses table.
    pub lemma: String,
    /// Per-instance consensus rows, grouped in first-occurrence order.
    pub rows: Vec<ConsensusRow>,
}

/// One row of an automatic annotation file (already one row per instance).
#[derive(Debug, Clone, Serialize)]
pub struct AutoRow {
    /// The judged instance.
    pub instance_id: String,
    /// The automatic label, NaN if the annotator produced the sentinel.
    pub label: f64,
}

/// Parse a label field, mapping the sentinel to NaN.
fn parse_label(raw: &str) -> Result<f64> {
    if raw == NON_LABEL {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|_| Error::format(format!("label '{}' is not numeric", raw)))
}

/// Median of the non-NaN subset; NaN when every value is missing.
fn nan_median(values: &[f64]) -> f64 {
    let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return f64::NAN;
    }
    present.sort_by(|a, b| a.partial_cmp(b).expect("no NaN after filtering"));
    let mid = present.len() / 2;
    if present.len() % 2 == 1 {
        present[mid]
    } else {
        (present[mid - 1] + present[mid]) / 2.0
    }
}

/// Aggregate `dir/judgments.tsv` into per-instance medians, resolving the
/// lemma from `dir/uses.tsv` (uses tables are single-lemma upstream).
pub fn load_judgments(dir: &Path) -> Result<Consensus> {
    let judgments_path = dir.join(JUDGMENTS_FILE);
    if !judgments_path.is_file() {
        return Err(Error::missing_resource(format!(
            "'{}' does not contain a '{}' file",
            dir.display(),
            JUDGMENTS_FILE
        )));
    }

    let table = Table::read(&judgments_path)?;
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for row in table.rows() {
        let judgment = Judgment::parse_row(&table, row)?;
        let label = parse_label(&judgment.label)?;
        if !groups.contains_key(&judgment.instance_id) {
            order.push(judgment.instance_id.clone());
        }
        groups.entry(judgment.instance_id).or_default().push(label);
    }

    let rows: Vec<ConsensusRow> = order
        .into_iter()
        .map(|instance_id| {
            let labels = groups.remove(&instance_id).expect("grouped above");
            let median = nan_median(&labels);
            ConsensusRow {
                instance_id,
                labels,
                median,
            }
        })
        .filter(|row| !row.median.is_nan())
        .collect();

    Ok(Consensus {
        lemma: resolve_lemma(dir)?,
        rows,
    })
}

/// The lemma of a directory's uses table (first data row).
fn resolve_lemma(dir: &Path) -> Result<String> {
    let uses_path = dir.join(USES_FILE);
    if !uses_path.is_file() {
        return Err(Error::missing_resource(format!(
            "'{}' does not contain a '{}' file",
            dir.display(),
            USES_FILE
        )));
    }
    let uses = Table::read(&uses_path)?;
    let first = uses
        .rows()
        .first()
        .ok_or_else(|| Error::format(format!("'{}' has no rows", uses_path.display())))?;
    Ok(uses.value(first, "lemma")?.to_string())
}

/// Load an automatic annotation file: one labeled row per instance, the
/// same sentinel-to-missing and numeric-coercion rules, no grouping.
pub fn load_auto_annotation(path: &Path) -> Result<Vec<AutoRow>> {
    if !path.is_file() {
        return Err(Error::missing_resource(format!(
            "automatic annotation file '{}' does not exist",
            path.display()
        )));
    }
    let table = Table::read(path)?;
    table
        .rows()
        .iter()
        .map(|row| {
            Ok(AutoRow {
                instance_id: table.value(row, "instanceID")?.to_string(),
                label: parse_label(table.value(row, "label")?)?,
            })
        })
        .collect()
}

/// Align consensus medians with automatic labels by position.
///
/// Alignment is positional, so the two inputs must list the same instance
/// ids in the same order; any length or order mismatch is a format error
/// rather than a silent misalignment. Returns `(gold, auto)` label vectors.
pub fn make_arrays(consensus: &Consensus, auto: &[AutoRow]) -> Result<(Vec<f64>, Vec<f64>)> {
    if consensus.rows.len() != auto.len() {
        return Err(Error::format(format!(
            "consensus has {} instances, automatic annotation has {}",
            consensus.rows.len(),
            auto.len()
        )));
    }
    for (row, auto_row) in consensus.rows.iter().zip(auto) {
        if row.instance_id != auto_row.instance_id {
            return Err(Error::format(format!(
                "instance order mismatch: consensus '{}' vs automatic '{}'",
                row.instance_id, auto_row.instance_id
            )));
        }
    }
    Ok((
        consensus.rows.iter().map(|r| r.median).collect(),
        auto.iter().map(|r| r.label).collect(),
    ))
}
