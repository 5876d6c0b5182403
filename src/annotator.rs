//! Random annotation over a provider's instances.
//!
//! A baseline annotator: for every instance it draws one label uniformly
//! from the instance's label set plus the non-label sentinel, and buffers
//! the judgment on the provider. The substitution variant draws from an
//! external vocabulary instead of the instance's own label set.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use crate::provider::AnnotationProvider;
use crate::sampling;
use crate::{Error, Result};

/// Vocabulary table file name for substitution-style annotation.
pub const VOCAB_FILE: &str = "vocab.tsv";

/// Draws uniform random judgments, reproducible per seed.
#[derive(Debug, Clone, Copy)]
pub struct RandomAnnotator {
    seed: u64,
}

impl RandomAnnotator {
    /// Create an annotator with an explicit seed.
    #[must_use]
    pub fn new(seed: u64) -> RandomAnnotator {
        RandomAnnotator { seed }
    }

    /// Create an annotator seeded from process entropy.
    #[must_use]
    pub fn from_entropy() -> RandomAnnotator {
        RandomAnnotator {
            seed: sampling::process_seed(),
        }
    }

    /// Judge every instance with a label drawn from its own label set plus
    /// the non-label sentinel, buffering judgments on the provider.
    ///
    /// Returns the number of judgments buffered. With `shuffle`, instances
    /// are visited in a seed-determined permutation instead of table order.
    pub fn annotate(&self, provider: &mut AnnotationProvider, shuffle: bool) -> Result<usize> {
        self.run(provider, shuffle, None)
    }

    /// Like [`annotate`](Self::annotate), but draw labels from `vocab` plus
    /// each instance's non-label sentinel (substitution-style annotation).
    pub fn annotate_with_vocab(
        &self,
        provider: &mut AnnotationProvider,
        vocab: &[String],
        shuffle: bool,
    ) -> Result<usize> {
        self.run(provider, shuffle, Some(vocab))
    }

    fn run(
        &self,
        provider: &mut AnnotationProvider,
        shuffle: bool,
        vocab: Option<&[String]>,
    ) -> Result<usize> {
        let picks: Vec<(String, String)> = {
            let instances: Vec<_> = if shuffle {
                provider.shuffled_instances(self.seed)
            } else {
                provider.instances().iter().collect()
            };

            instances
                .iter()
                .enumerate()
                .map(|(n, instance)| {
                    let mut alternatives: Vec<&str> = match vocab {
                        Some(vocab) => vocab.iter().map(String::as_str).collect(),
                        None => instance.label_set.iter().map(String::as_str).collect(),
                    };
                    alternatives.push(&instance.non_label);
                    let pick = alternatives[sampling::choose(alternatives.len(), self.seed, n)];
                    debug!("annotating instance '{}' -> '{}'", instance.instance_id, pick);
                    (instance.instance_id.clone(), pick.to_string())
                })
                .collect()
        };

        let count = picks.len();
        for (instance_id, label) in picks {
            let record: BTreeMap<String, String> = [
                ("instanceID".to_string(), instance_id),
                ("label".to_string(), label),
                ("comment".to_string(), "-".to_string()),
            ]
            .into_iter()
            .collect();
            provider.add_judgment(&record)?;
        }
        Ok(count)
    }
}

/// Load the substitution vocabulary from `dir/vocab.tsv` (column `lemma`).
pub fn load_vocab(dir: &Path) -> Result<Vec<String>> {
    let path = dir.join(VOCAB_FILE);
    if !path.is_file() {
        return Err(Error::missing_resource(format!(
            "'{}' does not contain a '{}' file",
            dir.display(),
            VOCAB_FILE
        )));
    }
    let table = crate::tsv::Table::read(&path)?;
    table
        .rows()
        .iter()
        .map(|row| table.value(row, "lemma").map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn seed_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("uses.tsv"),
            "dataID\tcontext\tindices_target_token\tindices_target_sentence\tlemma\n\
             u0\tthe bank was steep\t4:8\t0:18\tbank\n\
             u1\tthe bank closed\t4:8\t0:15\tbank\n\
             u2\tthe river bank\t10:14\t0:14\tbank\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("instances.tsv"),
            "instanceID\tdataIDs\tlabel_set\tnon_label\n\
             0_bank\tu0,u1\t1,2,3,4\t-\n\
             1_bank\tu1,u2\t1,2,3,4\t-\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn annotates_every_instance_once() {
        let dir = seed_dir();
        let mut provider = AnnotationProvider::new(dir.path()).unwrap();
        let count = RandomAnnotator::new(42).annotate(&mut provider, false).unwrap();
        assert_eq!(count, 2);
        assert_eq!(provider.pending_judgments(), 2);
    }

    #[test]
    fn labels_come_from_the_label_set_or_sentinel() {
        let dir = seed_dir();
        for seed in 0..20 {
            let mut provider = AnnotationProvider::new(dir.path()).unwrap();
            RandomAnnotator::new(seed).annotate(&mut provider, false).unwrap();
            provider
                .flush_judgments(None, Some("sample.tsv"))
                .unwrap();
            let written = fs::read_to_string(dir.path().join("sample.tsv")).unwrap();
            for line in written.lines().skip(1) {
                let label = line.split('\t').nth(1).unwrap();
                assert!(["1", "2", "3", "4", "-"].contains(&label), "label {}", label);
            }
            fs::remove_file(dir.path().join("sample.tsv")).unwrap();
        }
    }

    #[test]
    fn vocab_annotation_draws_from_vocab() {
        let dir = seed_dir();
        let mut provider = AnnotationProvider::new(dir.path()).unwrap();
        let vocab = vec!["shore".to_string(), "institution".to_string()];
        RandomAnnotator::new(7)
            .annotate_with_vocab(&mut provider, &vocab, false)
            .unwrap();
        provider.flush_judgments(None, Some("subst.tsv")).unwrap();
        let written = fs::read_to_string(dir.path().join("subst.tsv")).unwrap();
        for line in written.lines().skip(1) {
            let label = line.split('\t').nth(1).unwrap();
            assert!(["shore", "institution", "-"].contains(&label));
        }
    }

    #[test]
    fn vocab_loading_requires_the_file() {
        let dir = seed_dir();
        assert!(matches!(
            load_vocab(dir.path()),
            Err(Error::MissingResource(_))
        ));
        fs::write(dir.path().join(VOCAB_FILE), "lemma\nshore\ninstitution\n").unwrap();
        assert_eq!(load_vocab(dir.path()).unwrap(), vec!["shore", "institution"]);
    }
}
