//! Converters from external dataset distributions into the canonical schema.

pub mod dwug;
