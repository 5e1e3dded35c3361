//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `DOCSITE_*` env vars (nested keys split on `__`). Provides helpers to
//! expand `~` and `${VAR}` and to resolve relative paths against a known base.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::order::OrderTables;
use crate::sources::SourceTree;

/// Relative weight of each indexed field. A match in a heavier field ranks
/// above a match of the same term frequency in a lighter one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBoosts {
    pub title: f32,
    pub category: f32,
    pub description: f32,
    pub headings: f32,
    pub content: f32,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            title: 10.0,
            category: 5.0,
            description: 5.0,
            headings: 3.0,
            content: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Characters kept on each side of the first match in content snippets.
    pub snippet_radius: usize,
    pub boosts: FieldBoosts,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            snippet_radius: 80,
            boosts: FieldBoosts::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            debounce_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub root_dir: String,
    pub extensions: Vec<String>,
    pub index_stem: String,
    pub search: SearchConfig,
    pub watch: WatchConfig,
    pub order: OrderTables,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            root_dir: "docs".to_string(),
            extensions: vec!["md".to_string()],
            index_stem: "README".to_string(),
            search: SearchConfig::default(),
            watch: WatchConfig::default(),
            order: OrderTables::curated(),
        }
    }
}

impl DocsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "at least one source extension is required".to_string(),
            ));
        }
        if self.index_stem.trim().is_empty() {
            return Err(Error::InvalidConfig("index_stem must not be empty".to_string()));
        }
        if self.search.default_limit > self.search.max_limit {
            return Err(Error::InvalidConfig(format!(
                "search.default_limit ({}) exceeds search.max_limit ({})",
                self.search.default_limit, self.search.max_limit
            )));
        }
        let b = self.search.boosts;
        let weights = [b.title, b.category, b.description, b.headings, b.content];
        if weights.iter().any(|w| *w <= 0.0) {
            return Err(Error::InvalidConfig("search boosts must be positive".to_string()));
        }
        Ok(())
    }

    /// The configured docs root, with `~` and env vars expanded, resolved
    /// against `base` when relative.
    pub fn root_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.root_dir)
    }

    pub fn source_tree(&self, base: &Path) -> SourceTree {
        SourceTree::new(self.root_path(base))
            .with_extensions(
                self.extensions
                    .iter()
                    .filter(|e| !e.trim().is_empty())
                    .cloned(),
            )
            .with_index_stem(self.index_stem.clone())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(DocsConfig::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("DOCSITE_").split("__"));

        let config = Self { figment };
        config.docs()?.validate()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn docs(&self) -> anyhow::Result<DocsConfig> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read docs configuration: {}", e))
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
