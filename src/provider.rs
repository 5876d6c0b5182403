//! Validated in-memory store over one lemma directory's annotation tables.
//!
//! An [`AnnotationProvider`] is constructed from a directory that must
//! already contain `uses.tsv` and `instances.tsv` (judgments are produced,
//! not consumed, by most workflows). Both tables are loaded and validated
//! eagerly; an optional `senses.tsv` switches instance parsing to the
//! use-sense layout. New judgments accumulate in an in-process buffer and
//! are appended durably on [`flush_judgments`](AnnotationProvider::flush_judgments).
//!
//! Single-writer semantics: the buffer is process-local, and nothing guards
//! two processes flushing to the same file.

use std::collections::{BTreeMap, HashMap};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::sampling;
use crate::schema::{Instance, Sense, Use};
use crate::tsv::Table;
use crate::{Error, Result};

/// Required uses table file name.
pub const USES_FILE: &str = "uses.tsv";
/// Required instances table file name.
pub const INSTANCES_FILE: &str = "instances.tsv";
/// Optional senses table file name.
pub const SENSES_FILE: &str = "senses.tsv";
/// Default flush target (historical spelling, kept for compatibility with
/// existing annotation directories).
pub const DEFAULT_JUDGMENTS_FILE: &str = "judgements.tsv";

/// The fields a judgment record must carry, exactly.
const JUDGMENT_FIELDS: [&str; 3] = ["instanceID", "label", "comment"];

/// A structurally validated, not-yet-flushed judgment.
#[derive(Debug, Clone)]
struct PendingJudgment {
    instance_id: String,
    label: String,
    comment: String,
}

/// Loads, validates, and serves one lemma directory's annotation tables.
#[derive(Debug)]
pub struct AnnotationProvider {
    path: PathBuf,
    uses: Vec<Use>,
    use_index: HashMap<String, usize>,
    instances: Vec<Instance>,
    instance_index: HashMap<String, usize>,
    senses: Vec<Sense>,
    sense_index: HashMap<String, usize>,
    pending: Vec<PendingJudgment>,
}

impl AnnotationProvider {
    /// Open an annotation directory and eagerly load its tables.
    ///
    /// Fails with a missing-resource error if the directory, its `uses.tsv`,
    /// or its `instances.tsv` is absent, and with a format error if either
    /// table violates the schema (duplicate ids, malformed values).
    pub fn new(path: impl AsRef<Path>) -> Result<AnnotationProvider> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(Error::missing_resource(format!(
                "annotation directory '{}' does not exist",
                path.display()
            )));
        }
        for required in [USES_FILE, INSTANCES_FILE] {
            if !path.join(required).is_file() {
                return Err(Error::missing_resource(format!(
                    "'{}' does not contain a '{}' file",
                    path.display(),
                    required
                )));
            }
        }

        let with_senses = path.join(SENSES_FILE).is_file();
        let (senses, sense_index) = if with_senses {
            Self::load_senses(&path.join(SENSES_FILE))?
        } else {
            (Vec::new(), HashMap::new())
        };
        let (uses, use_index) = Self::load_uses(&path.join(USES_FILE))?;
        let (instances, instance_index) =
            Self::load_instances(&path.join(INSTANCES_FILE), with_senses)?;

        debug!(
            "loaded {} uses, {} instances, {} senses from '{}'",
            uses.len(),
            instances.len(),
            senses.len(),
            path.display()
        );

        Ok(AnnotationProvider {
            path,
            uses,
            use_index,
            instances,
            instance_index,
            senses,
            sense_index,
            pending: Vec::new(),
        })
    }

    fn load_uses(path: &Path) -> Result<(Vec<Use>, HashMap<String, usize>)> {
        let table = Table::read(path)?;
        let mut uses = Vec::with_capacity(table.rows().len());
        let mut index = HashMap::new();
        for row in table.rows() {
            let parsed = Use::parse_row(&table, row)?;
            if index.contains_key(&parsed.data_id) {
                return Err(Error::format(format!(
                    "duplicate dataID '{}' in uses file",
                    parsed.data_id
                )));
            }
            index.insert(parsed.data_id.clone(), uses.len());
            uses.push(parsed);
        }
        Ok((uses, index))
    }

    fn load_instances(
        path: &Path,
        with_senses: bool,
    ) -> Result<(Vec<Instance>, HashMap<String, usize>)> {
        let table = Table::read(path)?;
        let mut instances = Vec::with_capacity(table.rows().len());
        let mut index = HashMap::new();
        for row in table.rows() {
            let parsed = Instance::parse_row(&table, row, with_senses)?;
            if index.contains_key(&parsed.instance_id) {
                return Err(Error::format(format!(
                    "duplicate instanceID '{}' in instances file",
                    parsed.instance_id
                )));
            }
            index.insert(parsed.instance_id.clone(), instances.len());
            instances.push(parsed);
        }
        Ok((instances, index))
    }

    fn load_senses(path: &Path) -> Result<(Vec<Sense>, HashMap<String, usize>)> {
        let table = Table::read(path)?;
        let mut senses = Vec::with_capacity(table.rows().len());
        let mut index = HashMap::new();
        for row in table.rows() {
            let parsed = Sense::parse_row(&table, row)?;
            if index.contains_key(&parsed.sense_id) {
                return Err(Error::format(format!(
                    "duplicate senseID '{}' in senses file",
                    parsed.sense_id
                )));
            }
            index.insert(parsed.sense_id.clone(), senses.len());
            senses.push(parsed);
        }
        Ok((senses, index))
    }

    /// The annotation directory this provider was opened on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All uses, in table order.
    #[must_use]
    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    /// All instances, in table order.
    #[must_use]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// All senses, in table order (empty without a `senses.tsv`).
    #[must_use]
    pub fn senses(&self) -> &[Sense] {
        &self.senses
    }

    /// Whether this directory carries a sense inventory.
    #[must_use]
    pub fn has_senses(&self) -> bool {
        !self.senses.is_empty()
    }

    /// Look up a use by its `dataID`.
    pub fn use_by_id(&self, id: &str) -> Result<&Use> {
        self.use_index
            .get(id)
            .map(|&i| &self.uses[i])
            .ok_or_else(|| Error::not_found(format!("dataID '{}' not in uses table", id)))
    }

    /// Look up an instance by its `instanceID`.
    pub fn instance_by_id(&self, id: &str) -> Result<&Instance> {
        self.instance_index
            .get(id)
            .map(|&i| &self.instances[i])
            .ok_or_else(|| Error::not_found(format!("instanceID '{}' not in instances table", id)))
    }

    /// Look up a sense by its `senseID`.
    pub fn sense_by_id(&self, id: &str) -> Result<&Sense> {
        self.sense_index
            .get(id)
            .map(|&i| &self.senses[i])
            .ok_or_else(|| Error::not_found(format!("senseID '{}' not in senses table", id)))
    }

    /// All use ids, in table order.
    #[must_use]
    pub fn use_ids(&self) -> Vec<&str> {
        self.uses.iter().map(|u| u.data_id.as_str()).collect()
    }

    /// All instance ids, in table order.
    #[must_use]
    pub fn instance_ids(&self) -> Vec<&str> {
        self.instances
            .iter()
            .map(|i| i.instance_id.as_str())
            .collect()
    }

    /// All uses in a seed-determined shuffled order, each exactly once.
    ///
    /// Re-invoking restarts the permutation; the same seed reproduces it.
    #[must_use]
    pub fn shuffled_uses(&self, seed: u64) -> Vec<&Use> {
        sampling::shuffled_indices(self.uses.len(), seed)
            .into_iter()
            .map(|i| &self.uses[i])
            .collect()
    }

    /// All instances in a seed-determined shuffled order, each exactly once.
    #[must_use]
    pub fn shuffled_instances(&self, seed: u64) -> Vec<&Instance> {
        sampling::shuffled_indices(self.instances.len(), seed)
            .into_iter()
            .map(|i| &self.instances[i])
            .collect()
    }

    /// Validate a judgment record and buffer it for the next flush.
    ///
    /// The record must carry exactly the fields `instanceID`, `label`, and
    /// `comment`; a missing field or an extra one is a validation error
    /// naming the offending record, and leaves the buffer untouched.
    pub fn add_judgment(&mut self, record: &BTreeMap<String, String>) -> Result<()> {
        for field in JUDGMENT_FIELDS {
            if !record.contains_key(field) {
                return Err(Error::validation(format!(
                    "record {:?} does not contain the field '{}'",
                    record, field
                )));
            }
        }
        if record.len() != JUDGMENT_FIELDS.len() {
            let extras: Vec<&str> = record
                .keys()
                .map(String::as_str)
                .filter(|k| !JUDGMENT_FIELDS.contains(k))
                .collect();
            return Err(Error::validation(format!(
                "record {:?} carries unexpected fields {:?}",
                record, extras
            )));
        }

        self.pending.push(PendingJudgment {
            instance_id: record["instanceID"].clone(),
            label: record["label"].clone(),
            comment: record["comment"].clone(),
        });
        Ok(())
    }

    /// Number of buffered, not-yet-flushed judgments.
    #[must_use]
    pub fn pending_judgments(&self) -> usize {
        self.pending.len()
    }

    /// Append the buffered judgments to a judgments file and clear the buffer.
    ///
    /// Defaults to `judgements.tsv` in the provider directory; `dir` and
    /// `filename` override the target. The header row is written only when
    /// the target is empty or does not yet exist. The emptiness check and
    /// the writes go through a single create+append handle, so a flush is
    /// one open-check-write-close transaction.
    pub fn flush_judgments(&mut self, dir: Option<&Path>, filename: Option<&str>) -> Result<()> {
        let target = dir
            .unwrap_or(&self.path)
            .join(filename.unwrap_or(DEFAULT_JUDGMENTS_FILE));

        debug!(
            "flushing {} judgments to '{}'",
            self.pending.len(),
            target.display()
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target)?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", JUDGMENT_FIELDS.join("\t"))?;
        }
        for judgment in &self.pending {
            writeln!(
                file,
                "{}\t{}\t{}",
                judgment.instance_id, judgment.label, judgment.comment
            )?;
        }

        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(fields: &[(&str, &str)]) -> BTreeMap<String, String> {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn write_tables(dir: &Path, uses: &str, instances: &str) {
        fs::write(dir.join(USES_FILE), uses).unwrap();
        fs::write(dir.join(INSTANCES_FILE), instances).unwrap();
    }

    fn seed_dir(n_instances: usize) -> TempDir {
        let dir = TempDir::new().unwrap();
        let mut uses =
            String::from("dataID\tcontext\tindices_target_token\tindices_target_sentence\tlemma\n");
        for i in 0..(n_instances + 1) {
            uses.push_str(&format!("u{}\tthe bank was steep\t4:8\t0:18\tbank\n", i));
        }
        let mut instances = String::from("instanceID\tdataIDs\tlabel_set\tnon_label\n");
        for i in 0..n_instances {
            instances.push_str(&format!("{}_bank\tu{},u{}\t1,2,3,4\t-\n", i, i, i + 1));
        }
        write_tables(dir.path(), &uses, &instances);
        dir
    }

    #[test]
    fn missing_directory_is_missing_resource() {
        let err = AnnotationProvider::new("/no/such/annotation/dir").unwrap_err();
        assert!(matches!(err, Error::MissingResource(_)));
    }

    #[test]
    fn missing_instances_table_is_missing_resource() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(USES_FILE),
            "dataID\tcontext\tindices_target_token\tindices_target_sentence\tlemma\n",
        )
        .unwrap();
        let err = AnnotationProvider::new(dir.path()).unwrap_err();
        assert!(matches!(err, Error::MissingResource(_)));
        assert!(err.to_string().contains(INSTANCES_FILE));
    }

    #[test]
    fn duplicate_data_id_fails_the_load() {
        let dir = TempDir::new().unwrap();
        write_tables(
            dir.path(),
            "dataID\tcontext\tindices_target_token\tindices_target_sentence\tlemma\n\
             u1\tthe bank\t4:8\t0:8\tbank\n\
             u1\tthe bank\t4:8\t0:8\tbank\n",
            "instanceID\tdataIDs\tlabel_set\tnon_label\n",
        );
        let err = AnnotationProvider::new(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(err.to_string().contains("u1"));
    }

    #[test]
    fn duplicate_instance_id_fails_the_load() {
        let dir = seed_dir(1);
        let instances = "instanceID\tdataIDs\tlabel_set\tnon_label\n\
                         0_bank\tu0,u1\t1,2,3,4\t-\n\
                         0_bank\tu0,u1\t1,2,3,4\t-\n";
        fs::write(dir.path().join(INSTANCES_FILE), instances).unwrap();
        let err = AnnotationProvider::new(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn lookups_and_order() {
        let dir = seed_dir(3);
        let provider = AnnotationProvider::new(dir.path()).unwrap();

        assert_eq!(provider.use_ids(), vec!["u0", "u1", "u2", "u3"]);
        assert_eq!(provider.instance_ids(), vec!["0_bank", "1_bank", "2_bank"]);
        assert_eq!(provider.use_by_id("u2").unwrap().lemma, "bank");
        assert!(matches!(
            provider.use_by_id("u99"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            provider.instance_by_id("99_bank"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn shuffled_iteration_is_a_full_permutation() {
        let dir = seed_dir(16);
        let provider = AnnotationProvider::new(dir.path()).unwrap();

        let mut seen: Vec<&str> = provider
            .shuffled_instances(42)
            .iter()
            .map(|i| i.instance_id.as_str())
            .collect();
        assert_eq!(seen.len(), 16);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 16);

        let mut uses: Vec<&str> = provider
            .shuffled_uses(42)
            .iter()
            .map(|u| u.data_id.as_str())
            .collect();
        uses.sort_unstable();
        uses.dedup();
        assert_eq!(uses.len(), provider.uses().len());

        // Same seed reproduces the order; a different seed changes it.
        let order = |seed| {
            provider
                .shuffled_instances(seed)
                .iter()
                .map(|i| i.instance_id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(order(42), order(42));
        assert_ne!(order(42), order(7));
    }

    #[test]
    fn add_judgment_requires_exactly_three_fields() {
        let dir = seed_dir(1);
        let mut provider = AnnotationProvider::new(dir.path()).unwrap();

        let valid = record(&[("instanceID", "0_bank"), ("label", "4"), ("comment", "-")]);
        provider.add_judgment(&valid).unwrap();

        for missing in ["instanceID", "label", "comment"] {
            let mut incomplete = valid.clone();
            incomplete.remove(missing);
            let err = provider.add_judgment(&incomplete).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
            assert!(err.to_string().contains(missing));
        }

        let mut extra = valid.clone();
        extra.insert("extra_field".to_string(), "x".to_string());
        let err = provider.add_judgment(&extra).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("extra_field"));

        // Failures left the one valid judgment buffered.
        assert_eq!(provider.pending_judgments(), 1);
    }

    #[test]
    fn flush_appends_and_clears() {
        let dir = seed_dir(1);
        let mut provider = AnnotationProvider::new(dir.path()).unwrap();
        provider
            .add_judgment(&record(&[
                ("instanceID", "0_bank"),
                ("label", "3"),
                ("comment", "-"),
            ]))
            .unwrap();
        provider.flush_judgments(None, None).unwrap();
        assert_eq!(provider.pending_judgments(), 0);

        let written = fs::read_to_string(dir.path().join(DEFAULT_JUDGMENTS_FILE)).unwrap();
        assert_eq!(written, "instanceID\tlabel\tcomment\n0_bank\t3\t-\n");

        // A second flush with nothing buffered appends nothing.
        provider.flush_judgments(None, None).unwrap();
        let unchanged = fs::read_to_string(dir.path().join(DEFAULT_JUDGMENTS_FILE)).unwrap();
        assert_eq!(unchanged, written);
    }
}
