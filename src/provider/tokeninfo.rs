use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::token::{Scope, Token, TokenInfo};

use super::{check_scope, AuthProvider, AuthResult, ProviderError};

/// Introspects tokens against a remote token info endpoint.
///
/// The endpoint receives the token as a bearer credential and answers `200` with the
/// token info JSON, or one of `400`/`401`/`403` when the token is not valid.
pub struct TokenInfoProvider {
    url: String,
    client: reqwest::Client,
}

impl TokenInfoProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build token info http client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl AuthProvider for TokenInfoProvider {
    async fn valid(
        &self,
        token: Option<&Token>,
        scope: &Scope,
    ) -> Result<AuthResult, ProviderError> {
        let token = match token {
            Some(token) => token,
            None => return Ok(AuthResult::Empty),
        };

        debug!("Request token info from {}", self.url);
        let resp = self
            .client
            .get(&self.url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = resp.status().as_u16();
        match status {
            200 => {}
            400 | 401 | 403 => {
                debug!("Token rejected by token info endpoint with status {status}");
                return Ok(AuthResult::Invalid);
            }
            _ => return Err(ProviderError::Status(status)),
        }

        let text = resp.text().await?;
        let info: TokenInfo =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(check_scope(info, scope))
    }
}
