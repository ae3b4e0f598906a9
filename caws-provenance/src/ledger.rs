use caws_context::ProjectContext;
use caws_context::WorkingSpecSnapshot;
use chrono::DateTime;
use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::digest::compute_entry_hash;
use crate::entry::ChangeEvent;
use crate::entry::ProvenanceEntry;
use crate::error::Result;
use crate::store::ChainStore;
use crate::store::JsonFileChainStore;
use crate::summary::ChainSummary;
use crate::summary::summarize_chain;
use crate::verify::ChainVerification;
use crate::verify::verify_chain;

/// Time-derived entry id with a random suffix so two entries created in the
/// same millisecond still differ.
fn generate_id(prefix: &str, now: DateTime<Utc>) -> String {
    let ts = now.timestamp_millis();
    let r: u32 = rand::random();
    format!("{prefix}-{ts:x}-{r:x}")
}

/// Append-only, hash-linked log of change events.
pub struct ProvenanceLedger<S> {
    store: S,
}

impl ProvenanceLedger<JsonFileChainStore> {
    pub fn for_project(ctx: &ProjectContext) -> Self {
        Self::new(JsonFileChainStore::for_project(ctx))
    }
}

impl<S: ChainStore> ProvenanceLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entries(&self) -> Result<Vec<ProvenanceEntry>> {
        self.store.load()
    }

    /// Record `event` at the end of the chain.
    pub fn append(&self, ctx: &ProjectContext, event: ChangeEvent) -> Result<ProvenanceEntry> {
        self.append_at(ctx, event, Utc::now())
    }

    /// Record `event` with an explicit creation time.
    ///
    /// Fails before touching the store when `ctx` has no working spec.
    pub fn append_at(
        &self,
        ctx: &ProjectContext,
        event: ChangeEvent,
        now: DateTime<Utc>,
    ) -> Result<ProvenanceEntry> {
        let working_spec = match event.working_spec {
            Some(snapshot) => {
                ctx.require_working_spec()?;
                snapshot
            }
            None => WorkingSpecSnapshot::from(ctx.require_working_spec()?),
        };

        let chain = self.store.load_raw()?;
        let previous_hash = chain
            .last()
            .and_then(|last| last.get("hash"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut entry = ProvenanceEntry {
            id: generate_id("prov", now),
            timestamp: now,
            commit: event.commit,
            working_spec,
            quality_gates: event.quality_gates,
            agent: event.agent,
            previous_hash,
            hash: String::new(),
        };
        entry.hash = compute_entry_hash(&entry)?;

        self.store.append(&chain, &serde_json::to_value(&entry)?)?;
        info!(
            entry = %entry.id,
            hash = entry.short_hash(),
            position = chain.len(),
            "appended provenance entry"
        );
        Ok(entry)
    }

    /// Replay the chain as stored. Only a container that cannot be read is an
    /// error; bad entries are reported as faults.
    pub fn verify(&self) -> Result<ChainVerification> {
        let chain = self.store.load_raw()?;
        let result = verify_chain(&chain);
        debug!(
            entries = result.entries_checked,
            faults = result.faults.len(),
            "verified provenance chain"
        );
        Ok(result)
    }

    pub fn summary(&self) -> Result<ChainSummary> {
        Ok(summarize_chain(&self.store.load()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AgentInfo;
    use crate::entry::CommitInfo;
    use crate::entry::ConfidenceLevel;
    use crate::error::ProvenanceError;
    use crate::store::JsonLinesChainStore;
    use crate::store::MemoryChainStore;
    use crate::verify::FaultKind;
    use caws_context::ContextError;
    use caws_context::SpecMode;
    use caws_context::WorkingSpec;
    use pretty_assertions::assert_eq;

    fn governed() -> ProjectContext {
        ProjectContext::new(
            "/project",
            Some(WorkingSpec {
                id: "FEAT-42".into(),
                title: "Provenance".into(),
                risk_tier: 2,
                mode: SpecMode::Feature,
                waiver_ids: vec!["WV-0001".into()],
            }),
        )
    }

    fn event(n: usize) -> ChangeEvent {
        ChangeEvent {
            commit: CommitInfo {
                hash: format!("{n:040x}"),
                message: format!("change {n}"),
                author: "dev@example.com".into(),
            },
            working_spec: None,
            quality_gates: serde_json::json!({"tests": {"passed": 10 + n, "failed": 0}}),
            agent: AgentInfo {
                agent_type: "ide-agent".into(),
                confidence_level: ConfidenceLevel::Medium,
            },
        }
    }

    #[test]
    fn test_append_n_entries_verifies() {
        let ledger = ProvenanceLedger::new(MemoryChainStore::new());
        let ctx = governed();
        for n in 0..5 {
            ledger.append(&ctx, event(n)).unwrap();
        }
        let chain = ledger.entries().unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain[0].previous_hash, "");
        for i in 1..chain.len() {
            assert_eq!(chain[i].previous_hash, chain[i - 1].hash);
        }
        assert!(ledger.verify().unwrap().valid);
    }

    #[test]
    fn test_append_snapshots_context_spec() {
        let ledger = ProvenanceLedger::new(MemoryChainStore::new());
        let entry = ledger.append(&governed(), event(0)).unwrap();
        assert_eq!(entry.working_spec.id, "FEAT-42");
        assert_eq!(entry.working_spec.waiver_ids, vec!["WV-0001"]);
        assert_eq!(entry.hash.len(), 64);
        assert_eq!(entry.short_hash(), &entry.hash[..8]);
        assert!(entry.id.starts_with("prov-"));
    }

    #[test]
    fn test_append_keeps_explicit_snapshot() {
        let ledger = ProvenanceLedger::new(MemoryChainStore::new());
        let mut ev = event(0);
        ev.working_spec = Some(WorkingSpecSnapshot {
            id: "FIX-7".into(),
            title: "explicit".into(),
            risk_tier: 1,
            mode: SpecMode::Fix,
            waiver_ids: vec![],
        });
        let entry = ledger.append(&governed(), ev).unwrap();
        assert_eq!(entry.working_spec.id, "FIX-7");
    }

    #[test]
    fn test_append_without_context_writes_nothing() {
        let ledger = ProvenanceLedger::new(MemoryChainStore::new());
        let ungoverned = ProjectContext::new("/elsewhere", None);
        let err = ledger.append(&ungoverned, event(0)).unwrap_err();
        assert!(matches!(
            err,
            ProvenanceError::Context(ContextError::NotGoverned(_))
        ));
        assert!(err.to_string().contains("not a governed project"));
        assert!(ledger.entries().unwrap().is_empty());
    }

    #[test]
    fn test_tamper_any_entry_detected_at_position() {
        let ledger = ProvenanceLedger::new(MemoryChainStore::new());
        let ctx = governed();
        for n in 0..4 {
            ledger.append(&ctx, event(n)).unwrap();
        }
        let pristine = ledger.entries().unwrap();
        for k in 0..pristine.len() {
            let mut chain = pristine.clone();
            chain[k].quality_gates = serde_json::json!({"tests": "forged"});
            ledger.store().save(&chain).unwrap();
            let result = ledger.verify().unwrap();
            assert!(!result.valid);
            assert!(result.faults.iter().any(|f| f.position == k
                && matches!(f.kind, FaultKind::HashMismatch { .. })));
        }
    }

    #[test]
    fn test_verify_twice_is_identical() {
        let ledger = ProvenanceLedger::new(MemoryChainStore::new());
        let ctx = governed();
        ledger.append(&ctx, event(0)).unwrap();
        ledger.append(&ctx, event(1)).unwrap();
        assert_eq!(ledger.verify().unwrap(), ledger.verify().unwrap());
    }

    #[test]
    fn test_file_chain_survives_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::new(tmp.path(), governed().working_spec().cloned());
        let ledger = ProvenanceLedger::for_project(&ctx);
        for n in 0..3 {
            ledger.append(&ctx, event(n)).unwrap();
        }
        assert!(tmp.path().join(".caws/provenance/chain.json").exists());

        let reopened = ProvenanceLedger::for_project(&ctx);
        let result = reopened.verify().unwrap();
        assert!(result.valid);
        assert_eq!(result.entries_checked, 3);
    }

    #[test]
    fn test_jsonl_chain_verifies() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = ProvenanceLedger::new(JsonLinesChainStore::new(tmp.path().join("c.jsonl")));
        let ctx = governed();
        for n in 0..3 {
            ledger.append(&ctx, event(n)).unwrap();
        }
        assert!(ledger.verify().unwrap().valid);
    }

    #[test]
    fn test_ill_typed_stored_entry_is_a_fault() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::new(tmp.path(), governed().working_spec().cloned());
        let ledger = ProvenanceLedger::for_project(&ctx);
        for n in 0..3 {
            ledger.append(&ctx, event(n)).unwrap();
        }
        let path = tmp.path().join(".caws/provenance/chain.json");
        let mut stored: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        stored[1]["agent"]["confidenceLevel"] = serde_json::json!("certain");
        stored[2]["extra"] = serde_json::json!(true);
        std::fs::write(&path, serde_json::to_string_pretty(&stored).unwrap()).unwrap();

        let result = ledger.verify().unwrap();
        assert!(!result.valid);
        let mismatches: Vec<_> = result
            .faults
            .iter()
            .filter(|f| matches!(f.kind, FaultKind::HashMismatch { .. }))
            .map(|f| f.position)
            .collect();
        assert_eq!(mismatches, vec![1, 2]);
        assert!(result
            .faults
            .iter()
            .any(|f| f.position == 1 && matches!(f.kind, FaultKind::Malformed { .. })));
    }

    #[test]
    fn test_append_links_to_stored_hash() {
        let store = MemoryChainStore::new();
        store
            .save_raw(&[serde_json::json!({"id": "foreign", "hash": "abc123"})])
            .unwrap();
        let ledger = ProvenanceLedger::new(store);
        let entry = ledger.append(&governed(), event(0)).unwrap();
        assert_eq!(entry.previous_hash, "abc123");
    }

    #[test]
    fn test_unloadable_chain_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("chain.json");
        std::fs::write(&path, "[{\"id\": 1").unwrap();
        let ledger = ProvenanceLedger::new(JsonFileChainStore::new(path));
        assert!(matches!(
            ledger.verify().unwrap_err(),
            ProvenanceError::Corrupt { .. }
        ));
    }

    #[test]
    fn test_summary_reflects_appends() {
        let ledger = ProvenanceLedger::new(MemoryChainStore::new());
        let ctx = governed();
        let first = ledger.append(&ctx, event(0)).unwrap();
        let last = ledger.append(&ctx, event(1)).unwrap();
        let summary = ledger.summary().unwrap();
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.head_hash, Some(last.hash));
        assert_eq!(summary.first_timestamp, Some(first.timestamp));
        assert_eq!(summary.by_agent_type["ide-agent"], 2);
    }
}
