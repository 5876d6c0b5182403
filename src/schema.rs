//! Canonical annotation schema rows.
//!
//! Three tables carry the whole annotation workflow, plus one optional table
//! for sense-annotation variants:
//!
//! | Table | Columns |
//! |---|---|
//! | `uses.tsv` | dataID, context, indices_target_token, indices_target_sentence, lemma |
//! | `instances.tsv` | instanceID, dataIDs, label_set, non_label |
//! | `judgments.tsv` | instanceID, label, comment, annotator |
//! | `senses.tsv` | senseID, definition, lemma |
//!
//! A *use* is one occurrence of the target word in context. An *instance* is
//! the unit an annotator judges: a pair of uses, or a use paired with a
//! sense. A *judgment* is one annotator's label for one instance; the
//! reserved `non_label` value (conventionally `-`) means no judgment could
//! be made.
//!
//! Multi-valued fields use a comma separator; offset pairs additionally use
//! a colon (see [`SpanPair`]). Parsing and serialization are inverses for
//! canonical input, so a loaded table can be re-emitted byte-equivalently.

use serde::{Deserialize, Serialize};

use crate::span::SpanPair;
use crate::tsv::Table;
use crate::{Error, Result};

/// Column order of `uses.tsv`.
pub const USE_COLUMNS: [&str; 5] = [
    "dataID",
    "context",
    "indices_target_token",
    "indices_target_sentence",
    "lemma",
];

/// Column order of `instances.tsv`.
pub const INSTANCE_COLUMNS: [&str; 4] = ["instanceID", "dataIDs", "label_set", "non_label"];

/// Column order of `judgments.tsv`.
pub const JUDGMENT_COLUMNS: [&str; 4] = ["instanceID", "label", "comment", "annotator"];

/// Column order of `senses.tsv`.
pub const SENSE_COLUMNS: [&str; 3] = ["senseID", "definition", "lemma"];

/// One occurrence of a target word in context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Use {
    /// Unique key within a lemma's uses table.
    pub data_id: String,
    /// Full text span containing the target word.
    pub context: String,
    /// Offset pairs locating the target token in `context`.
    pub target_token_spans: Vec<SpanPair>,
    /// Offset pairs locating the containing sentence in `context`.
    pub target_sentence_spans: Vec<SpanPair>,
    /// The word under study.
    pub lemma: String,
}

impl Use {
    /// Parse one `uses.tsv` row.
    pub fn parse_row(table: &Table, row: &[String]) -> Result<Use> {
        let data_id = table.value(row, "dataID")?.to_string();
        let context = table.value(row, "context")?.to_string();
        let target_token_spans = SpanPair::parse_list(table.value(row, "indices_target_token")?)
            .map_err(|e| Error::format(format!("use '{}': {}", data_id, e)))?;
        let target_sentence_spans =
            SpanPair::parse_list(table.value(row, "indices_target_sentence")?)
                .map_err(|e| Error::format(format!("use '{}': {}", data_id, e)))?;

        if !SpanPair::all_within(&target_token_spans, &context)
            || !SpanPair::all_within(&target_sentence_spans, &context)
        {
            return Err(Error::format(format!(
                "use '{}' has offsets outside its context",
                data_id
            )));
        }

        Ok(Use {
            data_id,
            context,
            target_token_spans,
            target_sentence_spans,
            lemma: table.value(row, "lemma")?.to_string(),
        })
    }

    /// Serialize back to a `uses.tsv` row in [`USE_COLUMNS`] order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.data_id.clone(),
            self.context.clone(),
            SpanPair::encode_list(&self.target_token_spans),
            SpanPair::encode_list(&self.target_sentence_spans),
            self.lemma.clone(),
        ]
    }
}

/// How an instance is composed from use (and sense) identifiers.
///
/// The on-disk `dataIDs` field is a comma-joined id list; which variant a
/// row parses into is decided by dataset convention, not by sniffing value
/// shapes: a directory that carries a `senses.tsv` pairs a sense with a use,
/// otherwise two ids are a use pair and a single id stands alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceComposition {
    /// Two uses judged against each other (e.g. graded similarity 1-4).
    UsePair {
        /// First use identifier.
        first: String,
        /// Second use identifier.
        second: String,
    },
    /// A sense definition judged against a use.
    UseSensePair {
        /// Sense identifier (into `senses.tsv`).
        sense: String,
        /// Use identifier.
        use_id: String,
    },
    /// A single use judged on its own (substitution-style tasks).
    Single {
        /// Use identifier.
        use_id: String,
    },
}

impl InstanceComposition {
    /// Parse a `dataIDs` field. `with_senses` selects the sense-pair layout
    /// for two-id rows.
    pub fn parse(raw: &str, with_senses: bool) -> Result<InstanceComposition> {
        let ids: Vec<&str> = raw.split(',').collect();
        match ids.as_slice() {
            [one] => Ok(InstanceComposition::Single {
                use_id: (*one).to_string(),
            }),
            [a, b] if with_senses => Ok(InstanceComposition::UseSensePair {
                sense: (*a).to_string(),
                use_id: (*b).to_string(),
            }),
            [a, b] => Ok(InstanceComposition::UsePair {
                first: (*a).to_string(),
                second: (*b).to_string(),
            }),
            _ => Err(Error::format(format!(
                "dataIDs '{}' has {} ids, expected 1 or 2",
                raw,
                ids.len()
            ))),
        }
    }

    /// The constituent ids, in composition order.
    #[must_use]
    pub fn data_ids(&self) -> Vec<&str> {
        match self {
            InstanceComposition::UsePair { first, second } => vec![first, second],
            InstanceComposition::UseSensePair { sense, use_id } => vec![sense, use_id],
            InstanceComposition::Single { use_id } => vec![use_id],
        }
    }

    /// Serialize back to the comma-joined `dataIDs` encoding.
    #[must_use]
    pub fn encode(&self) -> String {
        self.data_ids().join(",")
    }
}

/// An annotatable unit referencing one or more uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Unique key, conventionally `{counter}_{lemma}`.
    pub instance_id: String,
    /// The constituent use/sense identifiers.
    pub composition: InstanceComposition,
    /// Ordered set of permissible non-missing labels.
    pub label_set: Vec<String>,
    /// Sentinel meaning "no judgment could be made".
    pub non_label: String,
}

impl Instance {
    /// Parse one `instances.tsv` row.
    pub fn parse_row(table: &Table, row: &[String], with_senses: bool) -> Result<Instance> {
        let instance_id = table.value(row, "instanceID")?.to_string();
        let composition = InstanceComposition::parse(table.value(row, "dataIDs")?, with_senses)
            .map_err(|e| Error::format(format!("instance '{}': {}", instance_id, e)))?;
        Ok(Instance {
            instance_id,
            composition,
            label_set: table
                .value(row, "label_set")?
                .split(',')
                .map(str::to_string)
                .collect(),
            non_label: table.value(row, "non_label")?.to_string(),
        })
    }

    /// Serialize back to an `instances.tsv` row in [`INSTANCE_COLUMNS`] order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.instance_id.clone(),
            self.composition.encode(),
            self.label_set.join(","),
            self.non_label.clone(),
        ]
    }
}

/// One annotator's label for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    /// Foreign key into the instances table.
    pub instance_id: String,
    /// A value from the instance's label set, or its non-label sentinel.
    pub label: String,
    /// Free-text comment, `-` if absent.
    pub comment: String,
    /// Identity of the labeler.
    pub annotator: String,
}

impl Judgment {
    /// Parse one `judgments.tsv` row.
    pub fn parse_row(table: &Table, row: &[String]) -> Result<Judgment> {
        Ok(Judgment {
            instance_id: table.value(row, "instanceID")?.to_string(),
            label: table.value(row, "label")?.to_string(),
            comment: table.value(row, "comment")?.to_string(),
            annotator: table.value(row, "annotator")?.to_string(),
        })
    }

    /// Serialize back to a `judgments.tsv` row in [`JUDGMENT_COLUMNS`] order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.instance_id.clone(),
            self.label.clone(),
            self.comment.clone(),
            self.annotator.clone(),
        ]
    }
}

/// A sense inventory entry (sense-annotation variants only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Unique key within a lemma's senses table.
    pub sense_id: String,
    /// Human-readable sense definition.
    pub definition: String,
    /// The word under study.
    pub lemma: String,
}

impl Sense {
    /// Parse one `senses.tsv` row.
    pub fn parse_row(table: &Table, row: &[String]) -> Result<Sense> {
        Ok(Sense {
            sense_id: table.value(row, "senseID")?.to_string(),
            definition: table.value(row, "definition")?.to_string(),
            lemma: table.value(row, "lemma")?.to_string(),
        })
    }
}
