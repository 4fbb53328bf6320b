//! Configuration file loading.
//!
//! Settings come from a TOML file; every field has a serde default, so a
//! missing or partial file still yields a usable snapshot. The path is the
//! `--config` flag, the `DOCRAG_CONFIG` environment variable, or
//! `docrag.toml` in the working directory, in that order.

use anyhow::{Context, Result};
use docrag_core::Settings;
use std::path::PathBuf;

const CONFIG_ENV: &str = "DOCRAG_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "docrag.toml";

/// Resolve the config path from the environment when no flag is given.
pub fn default_config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load settings, falling back to defaults when no file exists.
pub fn load(path: Option<PathBuf>) -> Result<Settings> {
    let path = path.unwrap_or_else(default_config_path);

    if !path.exists() {
        return Ok(Settings::default());
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let settings: Settings = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = load(Some(PathBuf::from("/nonexistent/docrag.toml"))).unwrap();
        assert_eq!(settings.rag.chunk_size, 1000);
        assert_eq!(settings.index.collection, "docrag_chunks");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docrag.toml");
        std::fs::write(
            &path,
            r#"
[rag]
chunk_size = 512
top_k = 3

[llm]
provider = "ollama"
model = "llama3.1"
"#,
        )
        .unwrap();

        let settings = load(Some(path)).unwrap();
        assert_eq!(settings.rag.chunk_size, 512);
        assert_eq!(settings.rag.top_k, 3);
        assert_eq!(settings.rag.chunk_overlap, 200);
        assert_eq!(settings.llm.model, "llama3.1");
        assert_eq!(settings.embedding.dimension, 1536);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docrag.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        assert!(load(Some(path)).is_err());
    }
}
