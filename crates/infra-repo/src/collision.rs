//! Cross-kind name collision tracking
//!
//! Resource names must be unique across one scan. When a second record
//! turns up with a name that was already accepted, both are dropped: an
//! ambiguous name could otherwise tear down whichever of the two is
//! currently deployed. The accumulator owns every accepted record so a
//! drop reaches records admitted while scanning an earlier kind.

use std::collections::HashMap;

use crate::Record;

/// Outcome of offering a record to the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// The name was seen before. The first record (of `first_kind`) has
    /// been dropped too, if it was still held.
    Collided { first_kind: String },
}

#[derive(Debug)]
struct FirstOccurrence {
    kind: String,
    /// Index into `accepted`; cleared once the record is dropped.
    slot: Option<usize>,
}

/// First-occurrence map plus the records accepted so far, in admission
/// order.
#[derive(Debug, Default)]
pub struct NameAccumulator {
    seen: HashMap<String, FirstOccurrence>,
    accepted: Vec<Option<Record>>,
}

impl NameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a validated record.
    ///
    /// Records without metadata are accepted under the empty name; the
    /// loader rejects them before they get here.
    pub fn admit(&mut self, record: Record) -> Admission {
        let name = record.name().unwrap_or_default().to_string();

        if let Some(first) = self.seen.get_mut(&name) {
            if let Some(slot) = first.slot.take() {
                self.accepted[slot] = None;
            }
            return Admission::Collided {
                first_kind: first.kind.clone(),
            };
        }

        self.seen.insert(
            name,
            FirstOccurrence {
                kind: record.kind.clone(),
                slot: Some(self.accepted.len()),
            },
        );
        self.accepted.push(Some(record));
        Admission::Accepted
    }

    /// Whether a name has been offered before.
    pub fn has_seen(&self, name: &str) -> bool {
        self.seen.contains_key(name)
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.accepted.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Surviving records in admission order.
    pub fn into_records(self) -> Vec<Record> {
        self.accepted.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResourceKind;
    use pretty_assertions::assert_eq;

    fn record(kind: ResourceKind, name: &str) -> Record {
        Record::new(kind, name, None)
    }

    #[test]
    fn test_distinct_names_are_all_kept() {
        let mut acc = NameAccumulator::new();
        assert_eq!(acc.admit(record(ResourceKind::Th2Box, "a")), Admission::Accepted);
        assert_eq!(acc.admit(record(ResourceKind::Th2Box, "b")), Admission::Accepted);

        let names: Vec<_> = acc
            .into_records()
            .iter()
            .map(|r| r.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_collision_drops_both() {
        let mut acc = NameAccumulator::new();
        acc.admit(record(ResourceKind::Th2Mstore, "store"));
        acc.admit(record(ResourceKind::Th2Box, "keep"));

        let admission = acc.admit(record(ResourceKind::Th2Estore, "store"));
        assert_eq!(
            admission,
            Admission::Collided {
                first_kind: "Th2Mstore".into()
            }
        );
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.into_records()[0].name(), Some("keep"));
    }

    #[test]
    fn test_third_occurrence_is_rejected_too() {
        let mut acc = NameAccumulator::new();
        acc.admit(record(ResourceKind::Th2Box, "x"));
        acc.admit(record(ResourceKind::Th2Job, "x"));
        let third = acc.admit(record(ResourceKind::Th2Dictionary, "x"));

        assert!(matches!(third, Admission::Collided { .. }));
        assert!(acc.has_seen("x"));
        assert!(acc.is_empty());
    }
}
