//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/sociograph/config.toml` (XDG) or platform config dir
//! 2. Project config: `.sociograph.toml`
//! 3. Environment variables: `SOCIOGRAPH_*`
//!
//! # Intended Usage
//!
//! **Global config** (`~/.config/sociograph/config.toml`):
//! ```toml
//! [graph]
//! uri = "neo4j://localhost:7687"
//! user = "neo4j"
//! password = "secret"
//! encryption = "true"
//! ```
//!
//! **Project config** (`.sociograph.toml` in the working directory):
//! ```toml
//! [users]
//! upsert_policy = "create-only"
//! ```
//!
//! Connection settings can also come from the environment, e.g.
//! `SOCIOGRAPH_GRAPH_URI`, `SOCIOGRAPH_GRAPH_USER`, `SOCIOGRAPH_GRAPH_PASSWORD`
//! and `SOCIOGRAPH_GRAPH_ENCRYPTION`. The encryption value is kept as the raw
//! string it arrived as; see [`GraphConfig::encryption_enabled`] for how it is
//! interpreted. Figment type-infers environment values (`ENCRYPTION=false`
//! reaches the extractor as a boolean, a numeric password as an integer), so
//! the text-valued settings accept any scalar and keep its literal form.

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer};

use crate::models::UpsertPolicy;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub graph: GraphConfig,
    #[serde(default)]
    pub users: UsersConfig,
}

/// Neo4j connection configuration.
///
/// Typically defined in global config (`~/.config/sociograph/config.toml`)
/// or the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Bolt URI of the server (required).
    /// Example: `neo4j://localhost:7687`
    pub uri: String,
    /// Username (required).
    pub user: String,
    /// Password (required).
    #[serde(deserialize_with = "lenient_text")]
    pub password: String,
    /// Raw encryption toggle. Interpreted by [`Self::encryption_enabled`].
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub encryption: Option<String>,
    /// Database to run queries against.
    #[serde(default = "default_db")]
    pub db: String,
    /// Connection pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Rows fetched per batch when streaming results.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// Policy settings for user writes.
///
/// Typically defined in project config (`.sociograph.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersConfig {
    /// How a user upsert treats an already-existing node.
    #[serde(default)]
    pub upsert_policy: UpsertPolicy,
}

/// Default database name.
pub const DEFAULT_DB: &str = "neo4j";

fn default_db() -> String {
    DEFAULT_DB.to_string()
}

fn default_max_connections() -> usize {
    16
}

fn default_fetch_size() -> usize {
    500
}

/// Scalar shape of a text-valued setting.
///
/// Figment's env provider type-infers values, so `false` arrives as a boolean
/// and `90125` as an integer rather than as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// Accept any scalar and keep its literal text form.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Scalar::into_text)
}

/// Optional variant of [`lenient_text`].
fn lenient_text_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer).map(|s| s.map(Scalar::into_text))
}

impl GraphConfig {
    /// Whether the encryption toggle turns TLS on.
    ///
    /// Enabled iff the setting is present, non-empty and not the literal
    /// `"false"`. The comparison is case-sensitive, so `"FALSE"` enables.
    /// An absent setting disables encryption.
    pub fn encryption_enabled(&self) -> bool {
        match self.encryption.as_deref() {
            None | Some("") | Some("false") => false,
            Some(_) => true,
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".sociograph.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("SOCIOGRAPH_").split("_"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/sociograph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("sociograph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("sociograph").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_config(encryption: Option<&str>) -> GraphConfig {
        GraphConfig {
            uri: "neo4j://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "secret".to_string(),
            encryption: encryption.map(str::to_string),
            db: default_db(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }

    #[test]
    fn encryption_absent_is_disabled() {
        assert!(!graph_config(None).encryption_enabled());
    }

    #[test]
    fn encryption_empty_is_disabled() {
        assert!(!graph_config(Some("")).encryption_enabled());
    }

    #[test]
    fn encryption_false_literal_is_disabled() {
        assert!(!graph_config(Some("false")).encryption_enabled());
    }

    #[test]
    fn encryption_other_values_are_enabled() {
        assert!(graph_config(Some("true")).encryption_enabled());
        assert!(graph_config(Some("1")).encryption_enabled());
    }

    #[test]
    fn encryption_comparison_is_case_sensitive() {
        assert!(graph_config(Some("FALSE")).encryption_enabled());
    }

    #[test]
    fn env_values_keep_their_text_form() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SOCIOGRAPH_GRAPH_URI", "neo4j://localhost:7687");
            jail.set_env("SOCIOGRAPH_GRAPH_USER", "neo4j");
            jail.set_env("SOCIOGRAPH_GRAPH_PASSWORD", 90125);
            jail.set_env("SOCIOGRAPH_GRAPH_ENCRYPTION", false);

            let config: Config = Figment::new()
                .merge(Env::prefixed("SOCIOGRAPH_").split("_"))
                .extract()?;

            assert_eq!(config.graph.password, "90125");
            assert_eq!(config.graph.encryption.as_deref(), Some("false"));
            assert!(!config.graph.encryption_enabled());
            Ok(())
        });
    }

    #[test]
    fn env_toggle_true_enables_encryption() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SOCIOGRAPH_GRAPH_URI", "neo4j://localhost:7687");
            jail.set_env("SOCIOGRAPH_GRAPH_USER", "neo4j");
            jail.set_env("SOCIOGRAPH_GRAPH_PASSWORD", "secret");
            jail.set_env("SOCIOGRAPH_GRAPH_ENCRYPTION", true);

            let config: Config = Figment::new()
                .merge(Env::prefixed("SOCIOGRAPH_").split("_"))
                .extract()?;

            assert_eq!(config.graph.encryption.as_deref(), Some("true"));
            assert!(config.graph.encryption_enabled());
            Ok(())
        });
    }

    #[test]
    fn toml_boolean_toggle_keeps_its_text_form() {
        let config: Config = Figment::new()
            .merge(Toml::string(
                r#"
                [graph]
                uri = "neo4j://localhost:7687"
                user = "neo4j"
                password = "secret"
                encryption = false
            "#,
            ))
            .extract()
            .expect("config should load");

        assert_eq!(config.graph.encryption.as_deref(), Some("false"));
        assert!(!config.graph.encryption_enabled());
    }
}
