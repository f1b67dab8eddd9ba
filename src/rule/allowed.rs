use crate::request::AuthRequest;

use super::{RouteMatcher, RuleError, SecurityRule, Verdict};

/// Lets matching requests through without looking at the token, e.g. for health
/// checks that must stay public.
pub struct ExplicitlyAllowedRule {
    matcher: RouteMatcher,
}

impl ExplicitlyAllowedRule {
    pub fn new(method: impl Into<String>, pattern: impl Into<String>) -> Result<Self, RuleError> {
        Ok(Self {
            matcher: RouteMatcher::new(method, pattern)?,
        })
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }
}

impl SecurityRule for ExplicitlyAllowedRule {
    fn is_applicable_to(&self, req: &AuthRequest) -> bool {
        self.matcher.is_applicable_to(req)
    }

    async fn evaluate(&self, req: AuthRequest) -> Verdict {
        Verdict::Proceed(req)
    }
}
