use std::sync::Arc;

use crate::provider::AuthProvider;
use crate::request::AuthRequest;
use crate::token::Scope;

use super::{consult, reject_for, SecurityRule, Verdict};

/// Catch-all rule placed last, so requests no other rule matched are denied.
pub struct DenyAllRule {
    provider: Arc<dyn AuthProvider>,
    scope: Scope,
}

impl DenyAllRule {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let scope = provider.default_scope();
        Self { provider, scope }
    }
}

impl SecurityRule for DenyAllRule {
    fn is_applicable_to(&self, _req: &AuthRequest) -> bool {
        true
    }

    async fn evaluate(&self, req: AuthRequest) -> Verdict {
        let result = consult(self.provider.as_ref(), &req, &self.scope).await;
        Verdict::Reject(reject_for(&result))
    }
}
