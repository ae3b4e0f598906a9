use std::path::PathBuf;

/// Errors produced while resolving a governed project.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("not a governed project: no working spec at {}", .0.display())]
    NotGoverned(PathBuf),

    #[error("invalid waiver id '{0}': expected WV-#### (four digits)")]
    InvalidWaiverId(String),

    #[error("invalid risk tier {0}: expected 1, 2, or 3")]
    InvalidRiskTier(u8),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed yaml at {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, ContextError>;
