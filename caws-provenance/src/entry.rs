use caws_context::WorkingSpecSnapshot;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// The external change event an entry records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// Who or what produced the change (e.g. `human`, `ci`, `ide-agent`).
/// Supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    #[serde(rename = "type")]
    pub agent_type: String,
    pub confidence_level: ConfidenceLevel,
}

/// One link in the provenance chain. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub commit: CommitInfo,
    pub working_spec: WorkingSpecSnapshot,
    pub quality_gates: serde_json::Value,
    pub agent: AgentInfo,
    /// `hash` of the preceding entry, or empty for the first entry.
    pub previous_hash: String,
    /// Digest over every other field; see [`crate::compute_entry_hash`].
    pub hash: String,
}

impl ProvenanceEntry {
    /// Leading characters of the hash, for display.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..8).unwrap_or(&self.hash)
    }
}

/// Metadata the caller supplies for a new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub commit: CommitInfo,
    /// Taken from the project context when absent.
    #[serde(default)]
    pub working_spec: Option<WorkingSpecSnapshot>,
    #[serde(default)]
    pub quality_gates: serde_json::Value,
    pub agent: AgentInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use caws_context::SpecMode;

    fn entry_with_hash(hash: &str) -> ProvenanceEntry {
        ProvenanceEntry {
            id: "prov-1".into(),
            timestamp: Utc::now(),
            commit: CommitInfo {
                hash: "abc123".into(),
                message: "feat: add ledger".into(),
                author: "dev@example.com".into(),
            },
            working_spec: WorkingSpecSnapshot {
                id: "FEAT-1".into(),
                title: "Ledger".into(),
                risk_tier: 2,
                mode: SpecMode::Feature,
                waiver_ids: vec![],
            },
            quality_gates: serde_json::json!({"tests": "passed"}),
            agent: AgentInfo {
                agent_type: "human".into(),
                confidence_level: ConfidenceLevel::High,
            },
            previous_hash: String::new(),
            hash: hash.into(),
        }
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(entry_with_hash("0123456789abcdef").short_hash(), "01234567");
        assert_eq!(entry_with_hash("abc").short_hash(), "abc");
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(entry_with_hash("ff")).unwrap();
        assert!(json.get("previousHash").is_some());
        assert!(json.get("qualityGates").is_some());
        assert_eq!(json["workingSpec"]["riskTier"], 2);
        assert_eq!(json["agent"]["type"], "human");
        assert_eq!(json["agent"]["confidenceLevel"], "high");
    }
}
