use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use super::config::{JwtConfig, ProviderConfig, TokenInfoConfig};
use super::jwt::JwtProvider;
use super::tokeninfo::TokenInfoProvider;
use super::AuthProvider;

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_provider(&self, cfg: &ProviderConfig) -> Result<Arc<dyn AuthProvider>> {
        match cfg {
            ProviderConfig::TokenInfo(cfg) => {
                let provider = self.build_tokeninfo(cfg)?;
                Ok(Arc::new(provider))
            }
            ProviderConfig::Jwt(cfg) => {
                let provider = self.build_jwt(cfg)?;
                Ok(Arc::new(provider))
            }
        }
    }

    fn build_tokeninfo(&self, cfg: &TokenInfoConfig) -> Result<TokenInfoProvider> {
        info!("Validating tokens with token info endpoint {}", cfg.url);
        TokenInfoProvider::new(cfg.url.clone(), Duration::from_millis(cfg.timeout_ms))
    }

    fn build_jwt(&self, cfg: &JwtConfig) -> Result<JwtProvider> {
        let mut provider = if !cfg.public_key_path.is_empty() {
            info!("Validating RS256 jwt tokens with key {}", cfg.public_key_path);
            let public_key = fs::read(&cfg.public_key_path).with_context(|| {
                format!("read jwt public key '{}'", cfg.public_key_path)
            })?;
            JwtProvider::with_rsa_pem(&public_key).context("init jwt provider")?
        } else {
            info!("Validating HS256 jwt tokens with shared secret");
            JwtProvider::with_secret(cfg.secret.as_bytes())
        };

        if !cfg.issuer.is_empty() {
            provider.set_issuer(&cfg.issuer);
        }
        if !cfg.realm.is_empty() {
            provider.set_realm(cfg.realm.clone());
        }

        Ok(provider)
    }
}
