use std::path::Path;
use std::path::PathBuf;

/// Directory holding all governance state inside a project.
pub const CAWS_DIR: &str = ".caws";

/// Where each governance file lives, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CawsLayout {
    pub working_spec: PathBuf,
    pub policy: PathBuf,
    pub waivers_dir: PathBuf,
    pub chain: PathBuf,
}

impl Default for CawsLayout {
    fn default() -> Self {
        let base = Path::new(CAWS_DIR);
        Self {
            working_spec: base.join("working-spec.yaml"),
            policy: base.join("policy.yaml"),
            waivers_dir: base.join("waivers"),
            chain: base.join("provenance").join("chain.json"),
        }
    }
}

impl CawsLayout {
    pub fn with_chain(mut self, chain: impl Into<PathBuf>) -> Self {
        self.chain = chain.into();
        self
    }
}
