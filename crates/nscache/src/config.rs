// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache settings loaded from the environment or a TOML file.

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, namespace::DEFAULT_NAMESPACE};

/// Prefix for environment variables read by [`CacheConfig::load`].
const ENV_PREFIX: &str = "NSCACHE_";

/// Table of a TOML file read by [`CacheConfig::load_from`].
const TOML_TABLE: &str = "cache";

/// Default expiry applied to stored values, in seconds.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Settings for a [`NamespacedCache`](crate::NamespacedCache).
///
/// Applications load this once, usually at startup, and pass it to
/// [`NamespacedCache::from_config`](crate::NamespacedCache::from_config) or
/// [`NamespacedCacheBuilder::config`](crate::NamespacedCacheBuilder::config). The cache itself
/// never reads the environment.
///
/// | Field       | Environment variable | Default     |
/// |-------------|----------------------|-------------|
/// | `namespace` | `NSCACHE_NAMESPACE`  | `"nscache"` |
/// | `ttl`       | `NSCACHE_TTL`        | `3600`      |
///
/// # Examples
///
/// ```
/// use nscache::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::new("billing", 300);
/// assert_eq!(config.ttl_duration(), Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root namespace for keys.
    pub namespace: String,
    /// Default expiry, in whole seconds.
    pub ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            ttl: DEFAULT_TTL_SECS,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the given namespace and TTL in seconds.
    pub fn new(namespace: impl Into<String>, ttl: u64) -> Self {
        Self {
            namespace: namespace.into(),
            ttl,
        }
    }

    /// Returns the TTL as a [`Duration`].
    #[must_use]
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }

    /// Loads the configuration from defaults and `NSCACHE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidConfig`](crate::ErrorKind::InvalidConfig) error if a
    /// variable cannot be parsed, for example a negative or non-numeric `NSCACHE_TTL`.
    pub fn load() -> Result<Self> {
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    /// Like [`load`](Self::load), but merges the `[cache]` table of a TOML file before the
    /// environment. A missing file is treated as empty.
    ///
    /// ```toml
    /// [cache]
    /// namespace = "checkout"
    /// ttl = 600
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidConfig`](crate::ErrorKind::InvalidConfig) error if the
    /// file or a variable cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Toml::file(path.as_ref()).nested())
                .select(TOML_TABLE)
                .merge(Env::prefixed(ENV_PREFIX).global()),
        )
    }

    fn extract(figment: Figment) -> Result<Self> {
        figment.extract().map_err(Error::invalid_config)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.namespace, "nscache");
        assert_eq!(config.ttl_duration(), Duration::from_secs(3600));
    }

    #[test]
    fn load_without_environment_uses_defaults() {
        Jail::expect_with(|_jail| {
            assert_eq!(CacheConfig::load().unwrap(), CacheConfig::default());
            Ok(())
        });
    }

    #[test]
    fn load_reads_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("NSCACHE_NAMESPACE", "orders");
            jail.set_env("NSCACHE_TTL", "90");
            assert_eq!(CacheConfig::load().unwrap(), CacheConfig::new("orders", 90));
            Ok(())
        });
    }

    #[test]
    fn load_rejects_invalid_ttl() {
        Jail::expect_with(|jail| {
            jail.set_env("NSCACHE_TTL", "soon");
            let error = CacheConfig::load().unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidConfig);
            Ok(())
        });
    }

    #[test]
    fn load_rejects_negative_ttl() {
        Jail::expect_with(|jail| {
            jail.set_env("NSCACHE_TTL", "-5");
            assert_eq!(CacheConfig::load().unwrap_err().kind(), ErrorKind::InvalidConfig);
            Ok(())
        });
    }

    #[test]
    fn load_from_reads_cache_table() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "nscache.toml",
                r#"
                [cache]
                namespace = "checkout"
                ttl = 600

                [other]
                namespace = "ignored"
                "#,
            )?;
            assert_eq!(CacheConfig::load_from("nscache.toml").unwrap(), CacheConfig::new("checkout", 600));
            Ok(())
        });
    }

    #[test]
    fn load_from_keeps_defaults_for_missing_fields() {
        Jail::expect_with(|jail| {
            jail.create_file("nscache.toml", "[cache]\nnamespace = \"partial\"\n")?;
            let config = CacheConfig::load_from("nscache.toml").unwrap();
            assert_eq!(config.namespace, "partial");
            assert_eq!(config.ttl, DEFAULT_TTL_SECS);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("nscache.toml", "[cache]\nnamespace = \"from-file\"\nttl = 5\n")?;
            jail.set_env("NSCACHE_TTL", "7");
            assert_eq!(CacheConfig::load_from("nscache.toml").unwrap(), CacheConfig::new("from-file", 7));
            Ok(())
        });
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            assert_eq!(CacheConfig::load_from("absent.toml").unwrap(), CacheConfig::default());
            Ok(())
        });
    }

    #[test]
    fn load_from_rejects_malformed_file() {
        Jail::expect_with(|jail| {
            jail.create_file("nscache.toml", "[cache\nnamespace = ")?;
            assert_eq!(
                CacheConfig::load_from("nscache.toml").unwrap_err().kind(),
                ErrorKind::InvalidConfig
            );
            Ok(())
        });
    }
}
