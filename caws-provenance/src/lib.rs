pub mod digest;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod store;
pub mod summary;
pub mod verify;

// Re-export key types for convenience.
pub use digest::{canonical_json, compute_entry_hash, hash_value};
pub use entry::{AgentInfo, ChangeEvent, CommitInfo, ConfidenceLevel, ProvenanceEntry};
pub use error::{ProvenanceError, Result};
pub use ledger::ProvenanceLedger;
pub use store::{ChainStore, JsonFileChainStore, JsonLinesChainStore, MemoryChainStore};
pub use summary::{ChainSummary, summarize_chain};
pub use verify::{ChainFault, ChainVerification, FaultKind, verify_chain};
