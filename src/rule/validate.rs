use std::sync::Arc;

use log::debug;

use crate::context::TOKEN_INFO_KEY;
use crate::provider::{AuthProvider, AuthResult};
use crate::request::AuthRequest;
use crate::token::Scope;

use super::{consult, reject_for, RouteMatcher, RuleError, SecurityRule, Verdict};

/// Requires a valid token carrying `scope`. On success the token info is attached
/// to the forwarded request under [`TOKEN_INFO_KEY`].
pub struct ValidateTokenRule {
    provider: Arc<dyn AuthProvider>,
    matcher: RouteMatcher,
    scope: Scope,
}

impl ValidateTokenRule {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        method: impl Into<String>,
        pattern: impl Into<String>,
        scope: Scope,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            provider,
            matcher: RouteMatcher::new(method, pattern)?,
            scope,
        })
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl SecurityRule for ValidateTokenRule {
    fn is_applicable_to(&self, req: &AuthRequest) -> bool {
        self.matcher.is_applicable_to(req)
    }

    async fn evaluate(&self, req: AuthRequest) -> Verdict {
        match consult(self.provider.as_ref(), &req, &self.scope).await {
            AuthResult::Valid(info) => {
                debug!("Token of '{}' accepted for {} {}", info.uid, req.method(), req.path());
                Verdict::Proceed(req.with_attribute(TOKEN_INFO_KEY, info))
            }
            result => Verdict::Reject(reject_for(&result)),
        }
    }
}
