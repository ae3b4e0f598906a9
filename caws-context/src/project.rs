use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ContextError;
use crate::error::Result;
use crate::layout::CawsLayout;
use crate::working_spec::WorkingSpec;

/// Explicit handle on a governed project.
///
/// Every governance operation takes one of these instead of looking up the
/// current working spec from the process environment.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    root: PathBuf,
    layout: CawsLayout,
    working_spec: Option<WorkingSpec>,
}

impl ProjectContext {
    /// Build a context from values already in hand. Nothing is read from disk.
    pub fn new(root: impl Into<PathBuf>, working_spec: Option<WorkingSpec>) -> Self {
        Self {
            root: root.into(),
            layout: CawsLayout::default(),
            working_spec,
        }
    }

    /// Load the working spec under `root` using the default layout.
    ///
    /// A missing working spec is not an error here; operations that need one
    /// call [`ProjectContext::require_working_spec`].
    pub fn discover(root: impl Into<PathBuf>) -> Result<Self> {
        Self::discover_with_layout(root, CawsLayout::default())
    }

    pub fn discover_with_layout(root: impl Into<PathBuf>, layout: CawsLayout) -> Result<Self> {
        let root = root.into();
        let path = root.join(&layout.working_spec);
        let working_spec = read_working_spec(&path)?;
        debug!(
            root = %root.display(),
            governed = working_spec.is_some(),
            "resolved project context"
        );
        Ok(Self {
            root,
            layout,
            working_spec,
        })
    }

    pub fn with_layout(mut self, layout: CawsLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &CawsLayout {
        &self.layout
    }

    pub fn working_spec(&self) -> Option<&WorkingSpec> {
        self.working_spec.as_ref()
    }

    pub fn require_working_spec(&self) -> Result<&WorkingSpec> {
        self.working_spec
            .as_ref()
            .ok_or_else(|| ContextError::NotGoverned(self.root.join(&self.layout.working_spec)))
    }

    /// Absolute path of a layout-relative file.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

fn read_working_spec(path: &Path) -> Result<Option<WorkingSpec>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ContextError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_yaml::from_str(&raw)
        .map(Some)
        .map_err(|source| ContextError::Yaml {
            path: path.to_path_buf(),
            source,
        })
}
