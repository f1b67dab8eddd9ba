mod allowed;
mod denied;
mod deny_all;
mod matcher;
mod union;
mod validate;

pub mod config;
pub mod engine;
pub mod factory;

use std::future::Future;

use actix_web::http::StatusCode;
use log::warn;
use thiserror::Error;

use crate::provider::{AuthProvider, AuthResult};
use crate::request::AuthRequest;
use crate::token::Scope;

pub use allowed::ExplicitlyAllowedRule;
pub use denied::ExplicitlyDeniedRule;
pub use deny_all::DenyAllRule;
pub use matcher::RouteMatcher;
pub use union::UnionRule;
pub use validate::ValidateTokenRule;

#[derive(Error, Debug)]
pub enum RuleError {
    /// Pattern rejected at construction time.
    #[error("invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The rule set has no catch-all rule and nothing matched.
    #[error("no rule matches {method} {path}")]
    NoMatchingRule { method: String, path: String },
}

/// A request refused by a rule. Only the status is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    status: StatusCode,
}

impl Rejection {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Decision of a rule, before any downstream handler runs.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Continue with this request, possibly carrying new attributes.
    Proceed(AuthRequest),
    Reject(Rejection),
}

/// Result of executing a rule with a downstream handler.
#[derive(Debug)]
pub enum Outcome<R> {
    /// The next handler ran; this is its response.
    Forwarded(R),
    Rejected(Rejection),
}

impl<R> Outcome<R> {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Outcome::Forwarded(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Forwarded(_) => None,
            Outcome::Rejected(rejection) => Some(*rejection),
        }
    }
}

/// An authorization rule: a route predicate plus the action taken on a match.
///
/// Rules are immutable once built, so evaluating the same request twice with the
/// same provider answer always gives the same verdict.
#[allow(async_fn_in_trait)]
pub trait SecurityRule {
    fn is_applicable_to(&self, req: &AuthRequest) -> bool;

    async fn evaluate(&self, req: AuthRequest) -> Verdict;

    /// Evaluates the rule and runs `next` only when the request may proceed.
    async fn execute<F, Fut, R>(&self, next: F, req: AuthRequest) -> Outcome<R>
    where
        F: FnOnce(AuthRequest) -> Fut,
        Fut: Future<Output = R>,
    {
        match self.evaluate(req).await {
            Verdict::Proceed(req) => Outcome::Forwarded(next(req).await),
            Verdict::Reject(rejection) => Outcome::Rejected(rejection),
        }
    }
}

/// Asks the provider once. Backend failures count as an invalid token.
async fn consult(provider: &dyn AuthProvider, req: &AuthRequest, scope: &Scope) -> AuthResult {
    match provider.valid(req.token(), scope).await {
        Ok(result) => result,
        Err(e) => {
            warn!(
                "Token validation for {} {} failed, treating token as invalid: {e:#}",
                req.method(),
                req.path()
            );
            AuthResult::Invalid
        }
    }
}

/// Status for a request that will not be forwarded. A valid token still gets 403.
fn reject_for(result: &AuthResult) -> Rejection {
    match result {
        AuthResult::Empty | AuthResult::Invalid => Rejection::unauthenticated(),
        AuthResult::Insufficient | AuthResult::Valid(_) => Rejection::forbidden(),
    }
}
