use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::entry::ConfidenceLevel;
use crate::entry::ProvenanceEntry;

/// Overview of a chain for the `provenance show` view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSummary {
    pub total_entries: usize,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub head_hash: Option<String>,
    pub by_agent_type: BTreeMap<String, usize>,
    pub by_confidence: BTreeMap<ConfidenceLevel, usize>,
    pub spec_ids: Vec<String>,
}

pub fn summarize_chain(chain: &[ProvenanceEntry]) -> ChainSummary {
    let mut summary = ChainSummary {
        total_entries: chain.len(),
        first_timestamp: chain.first().map(|e| e.timestamp),
        last_timestamp: chain.last().map(|e| e.timestamp),
        head_hash: chain.last().map(|e| e.hash.clone()),
        ..ChainSummary::default()
    };
    for entry in chain {
        *summary
            .by_agent_type
            .entry(entry.agent.agent_type.clone())
            .or_default() += 1;
        *summary
            .by_confidence
            .entry(entry.agent.confidence_level)
            .or_default() += 1;
        if !summary.spec_ids.contains(&entry.working_spec.id) {
            summary.spec_ids.push(entry.working_spec.id.clone());
        }
    }
    summary
}
