/// Engine configuration loaded from RON.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Playthrough settings a host can keep next to a game document.
///
/// ```ron
/// (
///     seed: Some(42),
///     start_choice_id: Some("arrival"),
///     history_limit: Some(200),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Seed for created-entity ids. `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overrides the document's own start node.
    #[serde(default)]
    pub start_choice_id: Option<String>,
    /// Maximum number of snapshots kept for undo.
    #[serde(default)]
    pub history_limit: Option<usize>,
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let cfg = EngineConfig::parse_ron(
            r#"(seed: Some(42), start_choice_id: Some("arrival"), history_limit: Some(200))"#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.start_choice_id.as_deref(), Some("arrival"));
        assert_eq!(cfg.history_limit, Some(200));
    }

    #[test]
    fn missing_fields_default() {
        let cfg = EngineConfig::parse_ron("()").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn bad_ron_is_an_error() {
        assert!(EngineConfig::parse_ron("(seed: \"nope\")").is_err());
    }

    #[test]
    fn load_fixture() {
        let path = std::path::PathBuf::from("tests/fixtures/engine.ron");
        let cfg = EngineConfig::load_from_ron(&path).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.start_choice_id.as_deref(), Some("arrival"));
    }

    #[test]
    fn ron_round_trip() {
        let cfg = EngineConfig {
            seed: Some(1),
            start_choice_id: None,
            history_limit: Some(10),
        };
        let text = ron::to_string(&cfg).unwrap();
        assert_eq!(EngineConfig::parse_ron(&text).unwrap(), cfg);
    }
}
