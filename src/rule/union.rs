use crate::request::AuthRequest;

use super::allowed::ExplicitlyAllowedRule;
use super::denied::ExplicitlyDeniedRule;
use super::deny_all::DenyAllRule;
use super::validate::ValidateTokenRule;
use super::{SecurityRule, Verdict};

pub enum UnionRule {
    ValidateToken(ValidateTokenRule),
    ExplicitlyAllowed(ExplicitlyAllowedRule),
    ExplicitlyDenied(ExplicitlyDeniedRule),
    DenyAll(DenyAllRule),
}

impl UnionRule {
    pub fn is_catch_all(&self) -> bool {
        matches!(self, UnionRule::DenyAll(_))
    }

    /// One line description used in logs and by `check`.
    pub fn describe(&self) -> String {
        match self {
            UnionRule::ValidateToken(rule) => format!(
                "validate {} {} (scope {})",
                rule.matcher().method(),
                rule.matcher().pattern(),
                rule.scope()
            ),
            UnionRule::ExplicitlyAllowed(rule) => format!(
                "allow {} {}",
                rule.matcher().method(),
                rule.matcher().pattern()
            ),
            UnionRule::ExplicitlyDenied(rule) => format!(
                "deny {} {}",
                rule.matcher().method(),
                rule.matcher().pattern()
            ),
            UnionRule::DenyAll(_) => String::from("deny all"),
        }
    }
}

impl SecurityRule for UnionRule {
    fn is_applicable_to(&self, req: &AuthRequest) -> bool {
        match self {
            UnionRule::ValidateToken(rule) => rule.is_applicable_to(req),
            UnionRule::ExplicitlyAllowed(rule) => rule.is_applicable_to(req),
            UnionRule::ExplicitlyDenied(rule) => rule.is_applicable_to(req),
            UnionRule::DenyAll(rule) => rule.is_applicable_to(req),
        }
    }

    async fn evaluate(&self, req: AuthRequest) -> Verdict {
        match self {
            UnionRule::ValidateToken(rule) => rule.evaluate(req).await,
            UnionRule::ExplicitlyAllowed(rule) => rule.evaluate(req).await,
            UnionRule::ExplicitlyDenied(rule) => rule.evaluate(req).await,
            UnionRule::DenyAll(rule) => rule.evaluate(req).await,
        }
    }
}

impl From<ValidateTokenRule> for UnionRule {
    fn from(rule: ValidateTokenRule) -> Self {
        UnionRule::ValidateToken(rule)
    }
}

impl From<ExplicitlyAllowedRule> for UnionRule {
    fn from(rule: ExplicitlyAllowedRule) -> Self {
        UnionRule::ExplicitlyAllowed(rule)
    }
}

impl From<ExplicitlyDeniedRule> for UnionRule {
    fn from(rule: ExplicitlyDeniedRule) -> Self {
        UnionRule::ExplicitlyDenied(rule)
    }
}

impl From<DenyAllRule> for UnionRule {
    fn from(rule: DenyAllRule) -> Self {
        UnionRule::DenyAll(rule)
    }
}
