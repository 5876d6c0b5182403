//! # lexanno
//!
//! Word-meaning annotation tables and their evaluation.
//!
//! Human or automatic annotators judge *instances* (pairs of word *uses*,
//! or a use and a sense) on an ordinal scale; this crate owns the
//! canonical tabular schema for those judgments and everything the
//! surrounding workflow needs:
//!
//! - **Schema** ([`schema`], [`span`]): typed rows for the `uses.tsv`,
//!   `instances.tsv`, `judgments.tsv`, and optional `senses.tsv` tables.
//! - **Provider** ([`provider`]): loads and validates a lemma directory,
//!   serves lookups and (optionally shuffled) iteration, buffers new
//!   judgments, and appends them durably.
//! - **Aggregation** ([`aggregate`]): reduces multi-annotator judgments to
//!   one median consensus per instance, with the non-label sentinel
//!   treated as missing, never as zero.
//! - **Agreement** ([`agreement`]): ordinal Krippendorff's alpha and
//!   Spearman rank correlation, both tolerant of missing values.
//! - **Evaluation** ([`evaluate`]): scores an automatic annotator against
//!   the consensus for every lemma under a dataset root.
//! - **Baselines & conversion** ([`annotator`], [`convert`]): a seeded
//!   random annotator and a converter for published DWUG datasets.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use lexanno::AnnotationProvider;
//!
//! # fn main() -> lexanno::Result<()> {
//! let mut provider = AnnotationProvider::new("data/bank")?;
//! for instance in provider.instances().to_vec() {
//!     let record: BTreeMap<String, String> = [
//!         ("instanceID".to_string(), instance.instance_id.clone()),
//!         ("label".to_string(), "4".to_string()),
//!         ("comment".to_string(), "-".to_string()),
//!     ]
//!     .into_iter()
//!     .collect();
//!     provider.add_judgment(&record)?;
//! }
//! provider.flush_judgments(None, None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design
//!
//! - Single-threaded batch semantics: every operation is synchronous, no
//!   retries, and a malformed row fails its whole load.
//! - Single-writer: the judgment buffer is process-local and flushing is
//!   not safe against concurrent writers of the same file.
//! - Reproducibility: all shuffling and random choice take an explicit
//!   seed; [`sampling::process_seed`] supplies a fresh one per process.

#![warn(missing_docs)]

pub mod aggregate;
pub mod agreement;
pub mod annotator;
pub mod cli;
pub mod convert;
mod error;
pub mod evaluate;
pub mod provider;
pub mod sampling;
pub mod schema;
pub mod span;
pub mod tsv;

pub use error::{Error, Result};
pub use provider::AnnotationProvider;
pub use schema::{Instance, InstanceComposition, Judgment, Sense, Use};
pub use span::SpanPair;
