use std::sync::Arc;

use crate::provider::AuthProvider;
use crate::request::AuthRequest;
use crate::token::Scope;

use super::{consult, reject_for, RouteMatcher, RuleError, SecurityRule, Verdict};

/// Rejects matching requests outright. The provider is only asked to tell a
/// missing or bad token (401) apart from a good one (403).
pub struct ExplicitlyDeniedRule {
    provider: Arc<dyn AuthProvider>,
    matcher: RouteMatcher,
    scope: Scope,
}

impl ExplicitlyDeniedRule {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        method: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let scope = provider.default_scope();
        Ok(Self {
            provider,
            matcher: RouteMatcher::new(method, pattern)?,
            scope,
        })
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }
}

impl SecurityRule for ExplicitlyDeniedRule {
    fn is_applicable_to(&self, req: &AuthRequest) -> bool {
        self.matcher.is_applicable_to(req)
    }

    async fn evaluate(&self, req: AuthRequest) -> Verdict {
        let result = consult(self.provider.as_ref(), &req, &self.scope).await;
        Verdict::Reject(reject_for(&result))
    }
}
