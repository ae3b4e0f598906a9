pub mod error;
pub mod layout;
pub mod project;
pub mod waiver_id;
pub mod working_spec;

// Re-export key types for convenience.
pub use error::{ContextError, Result};
pub use layout::{CAWS_DIR, CawsLayout};
pub use project::ProjectContext;
pub use waiver_id::WaiverId;
pub use working_spec::{RiskTier, SpecMode, WorkingSpec, WorkingSpecSnapshot};
