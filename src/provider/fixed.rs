use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::token::{Scope, Token, TokenInfo};

use super::{AuthProvider, AuthResult, ProviderError};

/// Provider that answers every call with the same result and counts the calls.
pub struct FixedProvider {
    result: Option<AuthResult>,
    calls: AtomicUsize,
}

impl FixedProvider {
    pub fn new(result: AuthResult) -> Self {
        Self {
            result: Some(result),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with a backend error.
    pub fn failing() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for FixedProvider {
    async fn valid(
        &self,
        _token: Option<&Token>,
        _scope: &Scope,
    ) -> Result<AuthResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.result.clone() {
            Some(result) => Ok(result),
            None => Err(ProviderError::Status(503)),
        }
    }
}

pub fn token_info(uid: &str) -> TokenInfo {
    TokenInfo {
        access_token: String::from("test-token"),
        scope: vec![Scope::default(), Scope::new("read")],
        token_type: TokenInfo::default_token_type(),
        uid: uid.to_string(),
        realm: String::from("/employees"),
        expires_in: Some(3600),
    }
}
