use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use caws_context::CAWS_DIR;
use caws_context::CawsLayout;
use serde::Deserialize;

/// On-disk layout of the provenance chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFormat {
    /// One JSON array rewritten on each append.
    #[default]
    Json,
    /// One entry per line, appended in place.
    Jsonl,
}

/// Settings read from `caws.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub chain_format: ChainFormat,
    /// Chain location relative to the project root.
    pub chain_path: Option<PathBuf>,
    pub approaching_threshold_percent: f64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            chain_format: ChainFormat::Json,
            chain_path: None,
            approaching_threshold_percent: 80.0,
        }
    }
}

impl CliConfig {
    /// An explicit path must exist; the default location is optional.
    pub fn load(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = root.join(CAWS_DIR).join("caws.toml");
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Project layout with the chain placed per `chain_path` and `chain_format`.
    pub fn layout(&self) -> CawsLayout {
        let layout = CawsLayout::default();
        match (&self.chain_path, self.chain_format) {
            (Some(path), _) => layout.with_chain(path),
            (None, ChainFormat::Json) => layout,
            (None, ChainFormat::Jsonl) => {
                let chain = layout.chain.with_extension("jsonl");
                layout.with_chain(chain)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let config = CliConfig::load(tmp.path(), None).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = CliConfig::parse(
            "chain_format = \"jsonl\"\nchain_path = \"audit/chain.jsonl\"\napproaching_threshold_percent = 90.0\n",
        )
        .unwrap();
        assert_eq!(config.chain_format, ChainFormat::Jsonl);
        assert_eq!(config.chain_path, Some(PathBuf::from("audit/chain.jsonl")));
        assert_eq!(config.approaching_threshold_percent, 90.0);
    }

    #[test]
    fn test_layout_places_chain() {
        assert_eq!(
            CliConfig::default().layout().chain,
            PathBuf::from(".caws/provenance/chain.json")
        );
        let jsonl = CliConfig {
            chain_format: ChainFormat::Jsonl,
            ..CliConfig::default()
        };
        assert_eq!(
            jsonl.layout().chain,
            PathBuf::from(".caws/provenance/chain.jsonl")
        );
        let custom = CliConfig {
            chain_path: Some(PathBuf::from("audit/log.jsonl")),
            ..jsonl
        };
        assert_eq!(custom.layout().chain, PathBuf::from("audit/log.jsonl"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(CliConfig::parse("chain_fromat = \"json\"\n").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.toml");
        assert!(CliConfig::load(tmp.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_default_location_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join(".caws")).unwrap();
        std::fs::write(tmp.path().join(".caws/caws.toml"), "chain_format = \"jsonl\"\n").unwrap();
        let config = CliConfig::load(tmp.path(), None).unwrap();
        assert_eq!(config.chain_format, ChainFormat::Jsonl);
    }
}
