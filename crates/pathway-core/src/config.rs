//! Layered configuration: serialized defaults, `config.toml`,
//! `config.<env>.toml` selected by `RUST_ENV`, then `APP_*` env vars with `__`
//! as the nesting separator (e.g. `APP_CACHE__TTL_SECS=60`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// How a streamed answer is split into frames before classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// Each transport chunk is parsed as one frame.
    #[default]
    WholeChunk,
    /// Chunks are buffered and split on `\n`; each line is one frame.
    LineDelimited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub vector_threshold: f32,
    pub vector_max_candidates: usize,
    pub keyword_max_hits: usize,
    pub default_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { vector_threshold: 0.7, vector_max_candidates: 20, keyword_max_hits: 20, default_limit: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    /// Characters of the normalized query kept in the fingerprint.
    pub fingerprint_prefix_chars: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_secs: 3600, fingerprint_prefix_chars: 100 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    pub framing: Framing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSettings {
    pub corpus_dir: Option<String>,
}

/// Typed view over every key the workspace reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub data: DataSettings,
}

impl Settings {
    /// Corpus directory resolved against `base`, if one is configured.
    pub fn corpus_dir(&self, base: &Path) -> Option<PathBuf> {
        self.data.corpus_dir.as_deref().map(|p| resolve_with_base(base, p))
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(base: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(base, &env_name)
    }

    pub fn load_for_env(base: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let s = self.settings()?;
        if !(0.0..=1.0).contains(&s.search.vector_threshold) {
            return Err(crate::error::Error::InvalidConfig(format!(
                "search.vector_threshold must be within [0, 1], got {}",
                s.search.vector_threshold
            ))
            .into());
        }
        if s.cache.fingerprint_prefix_chars == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "cache.fingerprint_prefix_chars must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
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
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
