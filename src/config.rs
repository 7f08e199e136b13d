use std::path::Path;

use serde::Deserialize;

/// Configuration loaded from `pygraph.toml` at the project root.
#[derive(Debug, Deserialize, Default)]
pub struct PygraphConfig {
    /// Repository name to stamp on ingested elements that omit one.
    pub repo_name: Option<String>,
}

impl PygraphConfig {
    /// Load configuration from `pygraph.toml` in the given root directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or
    /// cannot be parsed — a malformed config warns and falls back rather than
    /// aborting the build.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join("pygraph.toml");

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("warning: failed to parse pygraph.toml: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("warning: failed to read pygraph.toml: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PygraphConfig::load(dir.path());
        assert!(config.repo_name.is_none());
    }

    #[test]
    fn malformed_config_file_warns_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pygraph.toml"), "not valid toml = = =").unwrap();
        let config = PygraphConfig::load(dir.path());
        assert!(config.repo_name.is_none());
    }

    #[test]
    fn loads_repo_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pygraph.toml"), "repo_name = \"demo\"\n").unwrap();
        let config = PygraphConfig::load(dir.path());
        assert_eq!(config.repo_name.as_deref(), Some("demo"));
    }
}
