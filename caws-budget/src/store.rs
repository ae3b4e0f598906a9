use std::collections::HashMap;
use std::path::PathBuf;

use caws_context::ProjectContext;
use caws_context::WaiverId;

use crate::error::BudgetError;
use crate::error::Result;
use crate::policy::PolicyTable;
use crate::waiver::Waiver;

/// Outcome of looking a waiver up by id. Lookups never fail hard: an absent
/// or broken record simply cannot be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum WaiverLookup {
    Found(Waiver),
    Missing,
    Unreadable(String),
}

/// Source of policy and waiver records.
pub trait PolicyStore {
    /// `Ok(None)` means no policy is configured and the built-in table applies.
    fn load_policy(&self) -> Result<Option<PolicyTable>>;
    fn load_waiver(&self, id: &WaiverId) -> WaiverLookup;
}

/// YAML files under a project's `.caws/` directory.
pub struct FsPolicyStore {
    policy_path: PathBuf,
    waivers_dir: PathBuf,
}

impl FsPolicyStore {
    pub fn new(policy_path: PathBuf, waivers_dir: PathBuf) -> Self {
        Self {
            policy_path,
            waivers_dir,
        }
    }

    pub fn for_project(ctx: &ProjectContext) -> Self {
        let layout = ctx.layout();
        Self::new(ctx.resolve(&layout.policy), ctx.resolve(&layout.waivers_dir))
    }

    /// Only validated ids reach the filesystem, so the file name can never
    /// escape `waivers_dir`.
    fn waiver_path(&self, id: &WaiverId) -> PathBuf {
        self.waivers_dir.join(format!("{id}.yaml"))
    }
}

impl PolicyStore for FsPolicyStore {
    fn load_policy(&self) -> Result<Option<PolicyTable>> {
        let raw = match std::fs::read_to_string(&self.policy_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(BudgetError::Io {
                    path: self.policy_path.clone(),
                    source,
                });
            }
        };
        let policy: PolicyTable =
            serde_yaml::from_str(&raw).map_err(|source| BudgetError::Parse {
                path: self.policy_path.clone(),
                source,
            })?;
        Ok(Some(policy))
    }

    fn load_waiver(&self, id: &WaiverId) -> WaiverLookup {
        let path = self.waiver_path(id);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return WaiverLookup::Missing,
            Err(e) => return WaiverLookup::Unreadable(format!("{}: {e}", path.display())),
        };
        match serde_yaml::from_str(&raw) {
            Ok(waiver) => WaiverLookup::Found(waiver),
            Err(e) => WaiverLookup::Unreadable(format!("{}: {e}", path.display())),
        }
    }
}

/// In-process store, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryPolicyStore {
    policy: Option<PolicyTable>,
    waivers: HashMap<WaiverId, Waiver>,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: PolicyTable) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn insert_waiver(&mut self, id: WaiverId, waiver: Waiver) {
        self.waivers.insert(id, waiver);
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn load_policy(&self) -> Result<Option<PolicyTable>> {
        Ok(self.policy.clone())
    }

    fn load_waiver(&self, id: &WaiverId) -> WaiverLookup {
        self.waivers
            .get(id)
            .cloned()
            .map_or(WaiverLookup::Missing, WaiverLookup::Found)
    }
}
