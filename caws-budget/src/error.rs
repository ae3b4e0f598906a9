use std::path::PathBuf;

/// Errors produced while deriving a change budget.
///
/// Waiver problems never surface here; they are reported as exclusions on
/// the derived [`crate::Budget`].
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("risk tier {0} not defined")]
    UndefinedTier(u8),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed policy at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, BudgetError>;
