//! YAML document codec
//!
//! Parsing goes through an untyped [`serde_yaml::Value`] first so that a
//! mapping with a repeated key anywhere in the document is rejected
//! instead of letting the last occurrence win. Emitting uses
//! `serde_yaml`'s defaults: no `---` marker, plain scalars wherever
//! possible, and absent fields skipped by the record's serde attributes.

use serde_yaml::Value;

use crate::Record;

/// Parse one resource document.
pub fn parse(content: &[u8]) -> Result<Record, serde_yaml::Error> {
    let value: Value = serde_yaml::from_slice(content)?;
    serde_yaml::from_value(value)
}

/// Render a record in its canonical on-disk form.
///
/// Output is deterministic for a given record: mapping order is kept as
/// parsed or built.
pub fn emit(record: &Record) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(record)
}
