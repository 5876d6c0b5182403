//! Character-offset span pairs.
//!
//! The uses table locates the target token and the containing sentence as
//! lists of character-offset pairs inside the `context` field. The on-disk
//! encoding is `start:end`, with multiple pairs joined by commas
//! (discontinuous targets, e.g. German particle verbs, need more than one).

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single `start:end` character-offset pair into a context string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanPair {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset.
    pub end: usize,
}

impl SpanPair {
    /// Parse a `start:end` encoding.
    pub fn parse(s: &str) -> Result<SpanPair> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| Error::format(format!("span '{}' is not 'start:end'", s)))?;
        let start = start
            .parse::<usize>()
            .map_err(|_| Error::format(format!("span '{}' has a non-integer start", s)))?;
        let end = end
            .parse::<usize>()
            .map_err(|_| Error::format(format!("span '{}' has a non-integer end", s)))?;
        if end.checked_sub(start).is_none() {
            return Err(Error::format(format!("span '{}' ends before it starts", s)));
        }
        Ok(SpanPair { start, end })
    }

    /// Parse a comma-separated list of `start:end` pairs.
    pub fn parse_list(s: &str) -> Result<Vec<SpanPair>> {
        s.split(',').map(SpanPair::parse).collect()
    }

    /// Serialize a span list back to its on-disk encoding.
    #[must_use]
    pub fn encode_list(spans: &[SpanPair]) -> String {
        spans
            .iter()
            .map(|s| format!("{}:{}", s.start, s.end))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether every span is a valid range into `context` (character count).
    #[must_use]
    pub fn all_within(spans: &[SpanPair], context: &str) -> bool {
        let len = context.chars().count();
        spans.iter().all(|s| s.start <= s.end && s.end <= len)
    }
}

impl std::fmt::Display for SpanPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
