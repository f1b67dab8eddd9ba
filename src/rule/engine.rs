use std::future::Future;
use std::sync::Arc;

use log::{debug, error, warn};

use crate::provider::AuthProvider;
use crate::request::AuthRequest;

use super::deny_all::DenyAllRule;
use super::union::UnionRule;
use super::{Outcome, RuleError, SecurityRule, Verdict};

/// Ordered rule set. The first rule applicable to a request decides it.
pub struct RuleEngine {
    rules: Vec<UnionRule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<UnionRule>) -> Self {
        if !rules.last().is_some_and(UnionRule::is_catch_all) {
            warn!("Rule set does not end with a catch-all rule, unmatched requests will fail");
        }
        Self { rules }
    }

    /// Appends a [`DenyAllRule`] after `rules`.
    pub fn with_catch_all(mut rules: Vec<UnionRule>, provider: Arc<dyn AuthProvider>) -> Self {
        rules.push(UnionRule::DenyAll(DenyAllRule::new(provider)));
        Self::new(rules)
    }

    pub fn rules(&self) -> &[UnionRule] {
        &self.rules
    }

    pub fn select(&self, req: &AuthRequest) -> Result<&UnionRule, RuleError> {
        for (idx, rule) in self.rules.iter().enumerate() {
            if rule.is_applicable_to(req) {
                debug!(
                    "Rule #{idx} ({}) selected for {} {}",
                    rule.describe(),
                    req.method(),
                    req.path()
                );
                return Ok(rule);
            }
        }

        error!(
            "No rule matches {} {}, the rule set is missing a catch-all rule",
            req.method(),
            req.path()
        );
        Err(RuleError::NoMatchingRule {
            method: req.method().to_string(),
            path: req.path().to_string(),
        })
    }

    pub async fn evaluate(&self, req: AuthRequest) -> Result<Verdict, RuleError> {
        let rule = self.select(&req)?;
        Ok(rule.evaluate(req).await)
    }

    pub async fn process<F, Fut, R>(&self, req: AuthRequest, next: F) -> Result<Outcome<R>, RuleError>
    where
        F: FnOnce(AuthRequest) -> Fut,
        Fut: Future<Output = R>,
    {
        let rule = self.select(&req)?;
        Ok(rule.execute(next, req).await)
    }
}
