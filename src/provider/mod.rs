pub mod config;
pub mod factory;
pub mod jwt;
pub mod tokeninfo;

#[cfg(test)]
pub(crate) mod fixed;

use async_trait::async_trait;
use thiserror::Error;

use crate::token::{Scope, Token, TokenInfo};

/// Outcome of validating a token against a required scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// The token is valid and carries the required scope.
    Valid(TokenInfo),
    /// The token was rejected by the provider.
    Invalid,
    /// No token was presented.
    Empty,
    /// The token is valid but lacks the required scope.
    Insufficient,
}

/// Failures of the provider backend itself, as opposed to rejected tokens.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request token info: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected token info status {0}")]
    Status(u16),

    #[error("decode token info: {0}")]
    Decode(String),

    #[error("verification key: {0}")]
    Key(String),
}

/// Validates tokens for the rules. Implementations own transport, caching and
/// retries; the rules await exactly one call per request.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn valid(
        &self,
        token: Option<&Token>,
        scope: &Scope,
    ) -> Result<AuthResult, ProviderError>;

    /// Scope used by rules that do not declare one.
    fn default_scope(&self) -> Scope {
        Scope::default()
    }
}

/// Maps validated token info to `Valid` or `Insufficient` for the scope.
pub fn check_scope(info: TokenInfo, scope: &Scope) -> AuthResult {
    if info.has_scope(scope) {
        AuthResult::Valid(info)
    } else {
        AuthResult::Insufficient
    }
}
