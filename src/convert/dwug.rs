//! DWUG dataset conversion.
//!
//! The published Diachronic Word Usage Graph datasets ship per-lemma
//! directories with `uses.csv` and `judgments.csv` (tab-separated despite
//! the extension). Conversion rewrites each directory into the canonical
//! `uses.tsv` / `instances.tsv` / `judgments.tsv` layout:
//!
//! - every distinct use-pair becomes one instance, numbered
//!   `{counter}_{lemma}` in first-appearance order;
//! - the DWUG judgment value `0.0` ("cannot decide") maps to the
//!   non-label sentinel `-`;
//! - the graded label set is fixed to `1,2,3,4`.
//!
//! [`concat`] merges the converted per-lemma tables into dataset-level
//! tables at the data root. With the `network` feature, [`download`]
//! fetches a published distribution and extracts it locally.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;

use crate::tsv::{write_table, Table};
use crate::{Error, Result};

/// Input uses table of a DWUG lemma directory.
pub const DWUG_USES_CSV: &str = "uses.csv";
/// Input judgments table of a DWUG lemma directory.
pub const DWUG_JUDGMENTS_CSV: &str = "judgments.csv";

const LABEL_SET: &str = "1,2,3,4";
const NON_LABEL: &str = "-";

/// Convert one DWUG lemma directory in place.
///
/// Reads `uses.csv` and `judgments.csv` and writes the canonical
/// `uses.tsv`, `instances.tsv`, and `judgments.tsv` next to them.
pub fn transform_dir(dir: &Path) -> Result<()> {
    for required in [DWUG_USES_CSV, DWUG_JUDGMENTS_CSV] {
        if !dir.join(required).is_file() {
            return Err(Error::missing_resource(format!(
                "'{}' does not contain a '{}' file",
                dir.display(),
                required
            )));
        }
    }

    let uses = Table::read(&dir.join(DWUG_USES_CSV))?;
    let (use_rows, lemma) = transform_uses(&uses)?;

    let judgments = Table::read(&dir.join(DWUG_JUDGMENTS_CSV))?;
    let (instance_rows, instance_by_pair) = transform_instances(&judgments, &lemma)?;
    let judgment_rows = transform_judgments(&judgments, &instance_by_pair)?;

    info!(
        "converted '{}': {} uses, {} instances, {} judgments",
        lemma,
        use_rows.len(),
        instance_rows.len(),
        judgment_rows.len()
    );

    write_table(
        &dir.join("uses.tsv"),
        &crate::schema::USE_COLUMNS,
        &use_rows,
    )?;
    write_table(
        &dir.join("instances.tsv"),
        &crate::schema::INSTANCE_COLUMNS,
        &instance_rows,
    )?;
    write_table(
        &dir.join("judgments.tsv"),
        &crate::schema::JUDGMENT_COLUMNS,
        &judgment_rows,
    )?;
    Ok(())
}

/// Canonical use rows plus the directory's lemma (first row).
///
/// A repeated identifier keeps its first position but takes the later
/// row's values, so the output is one row per use.
fn transform_uses(uses: &Table) -> Result<(Vec<Vec<String>>, String)> {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(uses.rows().len());
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut lemma = None;
    for row in uses.rows() {
        let identifier = uses.value(row, "identifier")?.to_string();
        let converted = vec![
            identifier.clone(),
            uses.value(row, "context")?.to_string(),
            uses.value(row, "indexes_target_token")?.to_string(),
            uses.value(row, "indexes_target_sentence")?.to_string(),
            uses.value(row, "lemma")?.to_string(),
        ];
        match position.get(&identifier).copied() {
            Some(i) => rows[i] = converted,
            None => {
                position.insert(identifier, rows.len());
                rows.push(converted);
            }
        }
        if lemma.is_none() {
            lemma = Some(uses.value(row, "lemma")?.to_string());
        }
    }
    let lemma = lemma.ok_or_else(|| Error::format("DWUG uses table has no rows"))?;
    Ok((rows, lemma))
}

/// One instance per distinct use-pair, numbered in first-appearance order.
/// Returns the rows and the pair-to-instanceID mapping for judgment rows.
fn transform_instances(
    judgments: &Table,
    lemma: &str,
) -> Result<(Vec<Vec<String>>, HashMap<String, String>)> {
    let mut rows = Vec::new();
    let mut instance_by_pair = HashMap::new();
    for row in judgments.rows() {
        let pair = format!(
            "{},{}",
            judgments.value(row, "identifier1")?,
            judgments.value(row, "identifier2")?
        );
        if instance_by_pair.contains_key(&pair) {
            continue;
        }
        let instance_id = format!("{}_{}", rows.len(), lemma);
        rows.push(vec![
            instance_id.clone(),
            pair.clone(),
            LABEL_SET.to_string(),
            NON_LABEL.to_string(),
        ]);
        instance_by_pair.insert(pair, instance_id);
    }
    Ok((rows, instance_by_pair))
}

/// Canonical judgment rows, with `0.0` mapped to the sentinel.
fn transform_judgments(
    judgments: &Table,
    instance_by_pair: &HashMap<String, String>,
) -> Result<Vec<Vec<String>>> {
    judgments
        .rows()
        .iter()
        .map(|row| {
            let pair = format!(
                "{},{}",
                judgments.value(row, "identifier1")?,
                judgments.value(row, "identifier2")?
            );
            let instance_id = instance_by_pair
                .get(&pair)
                .expect("every pair was numbered in transform_instances");
            let raw = judgments.value(row, "judgment")?;
            let label = if raw == "0.0" { NON_LABEL } else { raw };
            Ok(vec![
                instance_id.clone(),
                label.to_string(),
                judgments.value(row, "comment")?.to_string(),
                judgments.value(row, "annotator")?.to_string(),
            ])
        })
        .collect()
}

/// Merge every converted per-lemma directory under `data_dir` into
/// dataset-level `uses.tsv` / `instances.tsv` / `judgments.tsv` at
/// `data_dir` itself. Directories are visited in name order.
pub fn concat(data_dir: &Path) -> Result<()> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(data_dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    for (filename, columns) in [
        ("uses.tsv", &crate::schema::USE_COLUMNS[..]),
        ("instances.tsv", &crate::schema::INSTANCE_COLUMNS[..]),
        ("judgments.tsv", &crate::schema::JUDGMENT_COLUMNS[..]),
    ] {
        let mut rows = Vec::new();
        for dir in &dirs {
            let table = Table::read(&dir.join(filename))?;
            rows.extend(table.rows().iter().cloned());
        }
        write_table(&data_dir.join(filename), columns, &rows)?;
    }
    Ok(())
}

/// Published DWUG distributions by language code.
#[cfg(feature = "network")]
fn distribution_url(lang: &str) -> Result<&'static str> {
    match lang {
        "en" => Ok("https://zenodo.org/record/5796878/files/dwug_en.zip"),
        "de" => Ok("https://zenodo.org/record/7295410/files/dwug_de.zip"),
        "la" => Ok("https://zenodo.org/record/5255228/files/dwug_la.zip"),
        "sv" => Ok("https://zenodo.org/record/5090648/files/dwug_sv.zip"),
        "es" => Ok("https://zenodo.org/record/6433667/files/dwug_es.zip"),
        other => Err(Error::format(format!(
            "no DWUG distribution for language '{}' (expected en, de, la, sv, es)",
            other
        ))),
    }
}

/// Download and extract the DWUG distribution for `lang` into `dest`.
///
/// Returns the extracted `dwug_<lang>/data` directory of per-lemma
/// subdirectories, ready for [`transform_dir`] and [`concat`].
#[cfg(feature = "network")]
pub fn download(dest: &Path, lang: &str) -> Result<PathBuf> {
    use std::io::Read;

    let url = distribution_url(lang)?;
    info!("downloading '{}'", url);

    let response = ureq::get(url)
        .call()
        .map_err(|e| Error::missing_resource(format!("failed to download {}: {}", url, e)))?;
    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| Error::format(format!("'{}' is not a zip archive: {}", url, e)))?;
    archive
        .extract(dest)
        .map_err(|e| Error::format(format!("failed to extract {}: {}", url, e)))?;

    Ok(dest.join(format!("dwug_{}", lang)).join("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dwug_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DWUG_USES_CSV),
            "lemma\tidentifier\tcontext\tindexes_target_token\tindexes_target_sentence\n\
             bank\tuse-1\tthe bank was steep\t4:8\t0:18\n\
             bank\tuse-2\tthe bank closed\t4:8\t0:15\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(DWUG_JUDGMENTS_CSV),
            "identifier1\tidentifier2\tannotator\tjudgment\tcomment\tlemma\n\
             use-1\tuse-2\tanna\t4.0\t-\tbank\n\
             use-1\tuse-2\tbert\t0.0\tunclear\tbank\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn duplicate_pairs_collapse_to_one_instance() {
        let dir = dwug_dir();
        transform_dir(dir.path()).unwrap();

        let instances = fs::read_to_string(dir.path().join("instances.tsv")).unwrap();
        assert_eq!(
            instances,
            "instanceID\tdataIDs\tlabel_set\tnon_label\n\
             0_bank\tuse-1,use-2\t1,2,3,4\t-\n"
        );
    }

    #[test]
    fn zero_judgment_maps_to_the_sentinel() {
        let dir = dwug_dir();
        transform_dir(dir.path()).unwrap();

        let judgments = fs::read_to_string(dir.path().join("judgments.tsv")).unwrap();
        assert_eq!(
            judgments,
            "instanceID\tlabel\tcomment\tannotator\n\
             0_bank\t4.0\t-\tanna\n\
             0_bank\t-\tunclear\tbert\n"
        );
    }

    #[test]
    fn converted_uses_reorder_columns() {
        let dir = dwug_dir();
        transform_dir(dir.path()).unwrap();

        let uses = fs::read_to_string(dir.path().join("uses.tsv")).unwrap();
        assert!(uses.starts_with(
            "dataID\tcontext\tindices_target_token\tindices_target_sentence\tlemma\n"
        ));
        assert!(uses.contains("use-1\tthe bank was steep\t4:8\t0:18\tbank\n"));
    }

    #[test]
    fn concat_merges_per_lemma_tables() {
        let data = TempDir::new().unwrap();
        for name in ["bank", "wall"] {
            let sub = data.path().join(name);
            fs::create_dir(&sub).unwrap();
            fs::write(
                sub.join(DWUG_USES_CSV),
                format!(
                    "lemma\tidentifier\tcontext\tindexes_target_token\tindexes_target_sentence\n\
                     {n}\t{n}-1\tsome context\t0:4\t0:12\n\
                     {n}\t{n}-2\tmore context\t0:4\t0:12\n",
                    n = name
                ),
            )
            .unwrap();
            fs::write(
                sub.join(DWUG_JUDGMENTS_CSV),
                format!(
                    "identifier1\tidentifier2\tannotator\tjudgment\tcomment\tlemma\n\
                     {n}-1\t{n}-2\tanna\t2.0\t-\t{n}\n",
                    n = name
                ),
            )
            .unwrap();
            transform_dir(&sub).unwrap();
        }

        concat(data.path()).unwrap();
        let uses = fs::read_to_string(data.path().join("uses.tsv")).unwrap();
        assert_eq!(uses.lines().count(), 5); // header + 2 uses per lemma
        let instances = fs::read_to_string(data.path().join("instances.tsv")).unwrap();
        assert!(instances.contains("0_bank"));
        assert!(instances.contains("0_wall"));
    }
}
