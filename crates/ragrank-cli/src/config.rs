//! Configuration for the ragrank CLI.
//!
//! Provides the [`AppConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `RAGRANK_CONFIG` environment variable
//! 3. XDG default: `~/.config/ragrank/config.toml`
//! 4. Built-in defaults
//!
//! `RAGRANK_<SECTION>_<KEY>` environment variables are overlaid on top of the
//! file. confyg passes them through as strings and maps one level below a
//! section, so only the string keys in [`ENV_OVERLAY_KEYS`] can be set this
//! way. Other `RAGRANK_*` variables are ignored with a warning.

use std::path::PathBuf;

use confyg::{Confygery, env};
use ragrank::{RetrievalConfig, ScoringConfig};
use ragrank_core::{Error, Result};
use ragrank_vector::{EmbeddingConfig, VectorStoreConfig};
use serde::{Deserialize, Serialize};

/// Environment variable prefix and XDG directory name.
pub const APP_NAME: &str = "ragrank";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RAGRANK_CONFIG";

/// Environment variable prefix for the config overlay.
pub const ENV_PREFIX: &str = "RAGRANK";

/// `(section, key)` pairs the environment overlay can set.
pub const ENV_OVERLAY_KEYS: &[(&str, &str)] = &[
    ("corpus", "path"),
    ("scoring", "type"),
    ("embeddings", "type"),
    ("embeddings", "model"),
    ("embeddings", "cache_path"),
    ("vectorstore", "type"),
];

/// The overlay variable name for `section.key`.
pub fn env_var_name(section: &str, key: &str) -> String {
    format!(
        "{ENV_PREFIX}_{}_{}",
        section.to_ascii_uppercase(),
        key.to_ascii_uppercase()
    )
}

/// Names among `names` that look like overlay variables but are not read.
pub fn ignored_env_vars<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let known: Vec<String> = ENV_OVERLAY_KEYS
        .iter()
        .map(|(section, key)| env_var_name(section, key))
        .collect();
    let prefix = format!("{ENV_PREFIX}_");

    let mut ignored: Vec<String> = names
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .filter(|name| name.starts_with(&prefix) && name != CONFIG_ENV)
        .filter(|name| !known.contains(name))
        .collect();
    ignored.sort();
    ignored
}

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the ragrank CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Corpus location.
    pub corpus: CorpusConfig,

    /// Scoring and ranking.
    pub scoring: ScoringConfig,

    /// Embedding provider.
    pub embeddings: EmbeddingConfig,

    /// Vector store.
    pub vectorstore: VectorStoreConfig,
}

/// Corpus configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Path to a JSON-lines corpus file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ============================================================================
// Config loading
// ============================================================================

impl AppConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        for name in ignored_env_vars(std::env::vars().map(|(name, _)| name)) {
            log::warn!("Ignoring {name}: only string keys can be set from the environment");
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("corpus");
        env_opts.add_section("scoring");
        env_opts.add_section("embeddings");
        env_opts.add_section("vectorstore");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        config.retrieval().validate()?;
        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml"))
    }

    /// The retrieval part of the configuration.
    pub fn retrieval(&self) -> RetrievalConfig {
        RetrievalConfig {
            scoring: self.scoring.clone(),
            embeddings: self.embeddings.clone(),
            vectorstore: self.vectorstore.clone(),
        }
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// The environment variables that reproduce this config's overlayable
    /// keys, as `(name, value)` pairs. Unset optional keys are skipped.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;

        Ok(ENV_OVERLAY_KEYS
            .iter()
            .filter_map(|(section, key)| {
                let text = value.get(section)?.get(key)?.as_str()?;
                Some((env_var_name(section, key), text.to_string()))
            })
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ragrank::SearchStrategy;
    use std::collections::HashMap;

    /// RAII guard for env var manipulation in tests.
    pub(crate) struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        pub(crate) fn new(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }

        pub(crate) fn remove(key: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match self.prev {
                Some(ref val) => unsafe { std::env::set_var(&self.key, val) },
                None => unsafe { std::env::remove_var(&self.key) },
            }
        }
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.corpus.path.is_none());
        assert_eq!(config.scoring.strategy, SearchStrategy::Hybrid);
        assert_eq!(config.scoring.parameters.k, 4);
        assert_eq!(config.retrieval(), RetrievalConfig::default());
    }

    #[test]
    fn test_app_config_from_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [corpus]
            path = "/data/kong.jsonl"

            [scoring]
            type = "vector"

            [scoring.hybrid]
            lexical_weight = 0.6
        "#,
        )
        .unwrap();

        assert_eq!(config.corpus.path.as_deref(), Some("/data/kong.jsonl"));
        assert_eq!(config.scoring.strategy, SearchStrategy::Vector);
        assert_eq!(config.scoring.hybrid.lexical_weight, 0.6);
        assert_eq!(config.scoring.hybrid.vector_weight, 0.7);
    }

    #[test]
    fn test_app_config_to_toml() {
        let config = AppConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[scoring]"));
        assert!(toml_str.contains("type = \"hybrid\""));
        assert!(toml_str.contains("k = 4"));

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_app_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                [scoring.parameters]
                k = 9
                [embeddings]
                dimension = 32
            "#,
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.scoring.parameters.k, 9);
        assert_eq!(config.embeddings.dimension, 32);
    }

    #[test]
    fn test_app_config_load_defaults() {
        let config = AppConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.scoring.parameters.k, 4);
    }

    #[test]
    fn test_app_config_load_rejects_invalid_weights() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring.hybrid]\nvector_weight = -1.0\n").unwrap();

        let err = AppConfig::load(Some(path.to_str().unwrap())).unwrap_err();
        assert!(err.to_string().contains("vector_weight"));
    }

    #[test]
    fn test_app_config_load_env_overlay() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[corpus]\npath = \"from-file.jsonl\"\n").unwrap();

        let _guard = EnvGuard::new("RAGRANK_CORPUS_PATH", "from-env.jsonl");
        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.corpus.path.as_deref(), Some("from-env.jsonl"));
    }

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = AppConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_env() {
        let _guard = EnvGuard::new(CONFIG_ENV, "/env/config.toml");
        let path = AppConfig::resolve_config_path(None);
        assert_eq!(path, Some(PathBuf::from("/env/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_default() {
        let _guard = EnvGuard::remove(CONFIG_ENV);
        let path = AppConfig::resolve_config_path(None).unwrap();
        let path = path.to_str().unwrap();
        assert!(path.contains("ragrank"));
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn test_to_env_vars() {
        let config = AppConfig {
            corpus: CorpusConfig {
                path: Some("c.jsonl".into()),
            },
            ..Default::default()
        };
        let vars: HashMap<_, _> = config.to_env_vars().unwrap().into_iter().collect();
        assert_eq!(vars.get("RAGRANK_CORPUS_PATH").unwrap(), "c.jsonl");
        assert_eq!(vars.get("RAGRANK_SCORING_TYPE").unwrap(), "hybrid");
        assert_eq!(vars.get("RAGRANK_EMBEDDINGS_TYPE").unwrap(), "hashing");
        assert!(!vars.contains_key("RAGRANK_SCORING_PARAMETERS_K"));
        assert!(!vars.contains_key("RAGRANK_SCORING_HYBRID_VECTOR_WEIGHT"));
    }

    #[test]
    fn test_exported_vars_are_all_read_back() {
        let config = AppConfig {
            corpus: CorpusConfig {
                path: Some("c.jsonl".into()),
            },
            ..Default::default()
        };
        let names: Vec<String> = config
            .to_env_vars()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert!(names.len() >= 4);
        assert!(ignored_env_vars(&names).is_empty());
    }

    #[test]
    fn test_ignored_env_vars() {
        let ignored = ignored_env_vars([
            "RAGRANK_SCORING_PARAMETERS_K",
            "RAGRANK_SCORING_TYPE",
            "RAGRANK_CONFIG",
            "RAGRANK_CORPUS_PATH",
            "RAGRANK_SCORING_HYBRID_BM25_WEIGHT",
            "PATH",
        ]);
        assert_eq!(
            ignored,
            vec![
                "RAGRANK_SCORING_HYBRID_BM25_WEIGHT",
                "RAGRANK_SCORING_PARAMETERS_K"
            ]
        );
    }
}
