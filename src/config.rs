use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::provider::config::ProviderConfig;
use crate::provider::factory::ProviderFactory;
use crate::rule::config::RuleConfig;
use crate::rule::engine::RuleEngine;
use crate::rule::factory::RuleFactory;

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self) -> Result<()>;
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Address the authorization server listens on. Only used by `serve`.
    #[serde(default = "Config::default_bind")]
    pub bind: String,

    /// Number of server workers, 0 means one per CPU core.
    #[serde(default = "Config::default_workers")]
    pub workers: u64,

    #[serde(default = "ProviderConfig::default")]
    pub provider: ProviderConfig,

    /// Ordered rule list, the first matching rule decides. Requests matching no
    /// rule are denied.
    #[serde(default = "Config::default_rules")]
    pub rules: Vec<RuleConfig>,
}

impl CommonConfig for Config {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            workers: Self::default_workers(),
            provider: ProviderConfig::default(),
            rules: Self::default_rules(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        if self.bind.is_empty() {
            bail!("bind should not be empty");
        }

        self.provider.complete().context("validate provider")?;

        for (idx, rule) in self.rules.iter_mut().enumerate() {
            rule.complete()
                .with_context(|| format!("validate rule #{idx}"))?;
        }

        Ok(())
    }
}

impl Config {
    pub const CONFIG_ENV: &'static str = "ROUTEGUARD_CONFIG";
    pub const DEFAULT_PATH: &'static str = "/etc/routeguard/config.toml";

    /// Loads and validates the config. The path falls back to `ROUTEGUARD_CONFIG`
    /// and then to the system wide location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match env::var_os(Self::CONFIG_ENV) {
                Some(path) => PathBuf::from(path),
                None => PathBuf::from(Self::DEFAULT_PATH),
            },
        };

        let mut cfg: Config = match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s)
                .with_context(|| format!("parse config file '{}'", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "Config file '{}' not found, using defaults, every request will be denied",
                    path.display()
                );
                <Config as CommonConfig>::default()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read config file '{}'", path.display()))
            }
        };

        cfg.complete().context("validate config")?;
        Ok(cfg)
    }

    pub fn build_engine(&self) -> Result<RuleEngine> {
        let provider = ProviderFactory::new()
            .build_provider(&self.provider)
            .context("build provider")?;
        RuleFactory::new()
            .build_engine(&self.rules, provider)
            .context("build rules")
    }

    pub fn default_bind() -> String {
        String::from("127.0.0.1:9800")
    }

    pub fn default_workers() -> u64 {
        0
    }

    pub fn default_rules() -> Vec<RuleConfig> {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use std::env::temp_dir;

    use crate::provider::config::ProviderConfig;
    use crate::rule::config::RuleKind;

    use super::*;

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = temp_dir().join(format!("routeguard-{}-{name}.toml", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load() {
        let path = write_config(
            "load",
            r#"
            bind = "0.0.0.0:8000"

            [provider]
            type = "jwt"
            secret = "s3cret"
            realm = "/services"

            [[rules]]
            method = "GET"
            path = "/health"
            kind = "allow"

            [[rules]]
            method = "GET"
            path = "/api/.*"
            scope = "read"
            "#,
        );

        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8000");
        assert_eq!(cfg.workers, 0);
        assert!(matches!(cfg.provider, ProviderConfig::Jwt(_)));
        assert_eq!(cfg.rules.len(), 2);
        assert_eq!(cfg.rules[0].kind, RuleKind::Allow);
        assert_eq!(cfg.rules[1].kind, RuleKind::Validate);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_build_engine() {
        let path = write_config(
            "engine",
            r#"
            [provider]
            type = "jwt"
            secret = "s3cret"

            [[rules]]
            method = "GET"
            path = "/health"
            kind = "allow"

            [[rules]]
            method = "DELETE"
            path = "/api/.*"
            kind = "deny"
            "#,
        );
        let cfg = Config::load(Some(&path)).unwrap();
        let engine = cfg.build_engine().unwrap();
        assert_eq!(engine.rules().len(), 3);
        assert!(engine.rules()[2].is_catch_all());
        fs::remove_file(path).unwrap();

        let mut cfg = cfg;
        cfg.rules[0].path = String::from("/health(");
        let err = cfg.build_engine().err().unwrap();
        assert!(format!("{err:#}").contains("build rules"));
    }

    #[test]
    fn test_load_not_found() {
        let path = temp_dir().join("routeguard-config-not-exists.toml");
        let cfg = Config::load(Some(&path)).unwrap();
        assert!(cfg.rules.is_empty());
        assert!(matches!(cfg.provider, ProviderConfig::TokenInfo(_)));
    }

    #[test]
    fn test_load_invalid() {
        let path = write_config(
            "invalid",
            r#"
            [[rules]]
            method = "GET"
            path = "/health"
            kind = "allow"
            scope = "read"
            "#,
        );
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("validate rule #0"));
        fs::remove_file(path).unwrap();

        let path = write_config("broken", "rules = 1");
        assert!(Config::load(Some(&path)).is_err());
        fs::remove_file(path).unwrap();
    }
}
