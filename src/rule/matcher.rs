use regex::Regex;

use crate::request::AuthRequest;

use super::RuleError;

/// Matches a request by exact method and a path regex that must cover the whole path.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    method: String,
    pattern: String,
    regex: Regex,
}

impl RouteMatcher {
    pub fn new(method: impl Into<String>, pattern: impl Into<String>) -> Result<Self, RuleError> {
        let pattern = pattern.into();
        let regex = match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(regex) => regex,
            Err(source) => return Err(RuleError::InvalidPattern { pattern, source }),
        };

        Ok(Self {
            method: method.into(),
            pattern,
            regex,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.method == method && self.regex.is_match(path)
    }

    pub fn is_applicable_to(&self, req: &AuthRequest) -> bool {
        self.matches(req.method(), req.path())
    }
}
