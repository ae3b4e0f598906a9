use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::digest::hash_value;
use crate::entry::ProvenanceEntry;

/// What went wrong at one chain position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FaultKind {
    /// `previousHash` does not name the preceding entry's hash.
    ChainBreak { expected: String, found: String },
    /// The stored hash does not match the entry's content.
    HashMismatch { expected: String, found: String },
    /// The entry is not a well-formed provenance entry.
    Malformed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainFault {
    pub position: usize,
    pub entry_id: String,
    #[serde(flatten)]
    pub kind: FaultKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerification {
    pub valid: bool,
    pub entries_checked: usize,
    pub faults: Vec<ChainFault>,
}

/// Replay a chain as stored and report every link, content, and shape fault.
///
/// Digests are taken over the stored objects, so added or dropped keys count
/// as content changes. Every position is examined, so one edit can show up
/// both where it happened and at the next link.
pub fn verify_chain(chain: &[Value]) -> ChainVerification {
    let mut faults = Vec::new();

    for (position, stored) in chain.iter().enumerate() {
        let entry_id = str_field(stored, "id").to_string();
        let previous_hash = str_field(stored, "previousHash");
        let stored_hash = str_field(stored, "hash");

        let expected_prev = match position {
            0 => "",
            _ => str_field(&chain[position - 1], "hash"),
        };
        if previous_hash != expected_prev {
            faults.push(ChainFault {
                position,
                entry_id: entry_id.clone(),
                kind: FaultKind::ChainBreak {
                    expected: expected_prev.to_string(),
                    found: previous_hash.to_string(),
                },
            });
        }

        let computed = hash_value(stored);
        if computed != stored_hash {
            faults.push(ChainFault {
                position,
                entry_id: entry_id.clone(),
                kind: FaultKind::HashMismatch {
                    expected: computed,
                    found: stored_hash.to_string(),
                },
            });
        }

        if let Err(e) = ProvenanceEntry::deserialize(stored) {
            faults.push(ChainFault {
                position,
                entry_id,
                kind: FaultKind::Malformed {
                    message: e.to_string(),
                },
            });
        }
    }

    for fault in &faults {
        warn!(
            position = fault.position,
            entry = %fault.entry_id,
            fault = ?fault.kind,
            "provenance chain fault"
        );
    }

    ChainVerification {
        valid: faults.is_empty(),
        entries_checked: chain.len(),
        faults,
    }
}

/// String field of a stored entry; absent or non-string reads as empty.
fn str_field<'a>(stored: &'a Value, key: &str) -> &'a str {
    stored.get(key).and_then(Value::as_str).unwrap_or_default()
}
