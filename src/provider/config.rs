use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig};

/// Token validation backend used by the rules.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "tokeninfo")]
    TokenInfo(TokenInfoConfig),

    #[serde(rename = "jwt")]
    Jwt(JwtConfig),
}

impl CommonConfig for ProviderConfig {
    fn default() -> Self {
        Self::TokenInfo(TokenInfoConfig::default())
    }

    fn complete(&mut self) -> Result<()> {
        match self {
            Self::TokenInfo(cfg) => cfg.complete(),
            Self::Jwt(cfg) => cfg.complete(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenInfoConfig {
    /// The token info endpoint. Tokens are sent as bearer credentials.
    #[serde(default = "TokenInfoConfig::default_url")]
    pub url: String,

    /// Timeout for a single token info request in milliseconds, must be in range
    /// [100, 60000]. Defaults to 3000.
    #[serde(default = "TokenInfoConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl CommonConfig for TokenInfoConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        self.url = expandenv("url", &self.url)?;
        if self.url.is_empty() {
            bail!("token info url should not be empty");
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            bail!("token info url should be http or https, found '{}'", self.url);
        }

        if self.timeout_ms < Self::MIN_TIMEOUT_MS || self.timeout_ms > Self::MAX_TIMEOUT_MS {
            bail!(
                "token info timeout_ms should be in range [{},{}], found {}",
                Self::MIN_TIMEOUT_MS,
                Self::MAX_TIMEOUT_MS,
                self.timeout_ms
            );
        }

        Ok(())
    }
}

impl TokenInfoConfig {
    const MIN_TIMEOUT_MS: u64 = 100;
    const MAX_TIMEOUT_MS: u64 = 60 * 1000;

    pub fn default_url() -> String {
        String::from("http://127.0.0.1:9021/oauth2/tokeninfo")
    }

    pub fn default_timeout_ms() -> u64 {
        3000
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    /// Shared secret for HS256 tokens. Exactly one of `secret` and
    /// `public_key_path` must be set.
    #[serde(default)]
    pub secret: String,

    /// Path to a PEM encoded RSA public key for RS256 tokens.
    #[serde(default)]
    pub public_key_path: String,

    /// Required `iss` claim, not checked when empty.
    #[serde(default)]
    pub issuer: String,

    /// Realm reported for tokens without a `realm` claim.
    #[serde(default)]
    pub realm: String,
}

impl CommonConfig for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            public_key_path: String::new(),
            issuer: String::new(),
            realm: String::new(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        self.secret = expandenv("secret", &self.secret)?;
        self.public_key_path = expandenv("public_key_path", &self.public_key_path)?;

        match (self.secret.is_empty(), self.public_key_path.is_empty()) {
            (false, true) | (true, false) => Ok(()),
            (true, true) => bail!("jwt provider requires either secret or public_key_path"),
            (false, false) => bail!("jwt secret and public_key_path should not both be set"),
        }
    }
}
