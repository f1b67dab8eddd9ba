use std::fmt;

use serde::{Deserialize, Serialize};

/// Bearer credential taken from the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parses an `Authorization` header value. Anything other than
    /// `Bearer <credential>` yields `None`.
    pub fn from_authorization(header: &str) -> Option<Self> {
        let header = header.trim();
        if header.is_empty() {
            return None;
        }

        let mut iter = header.split_whitespace();
        let scheme = iter.next()?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        let token = iter.next()?;
        if token.is_empty() || iter.next().is_some() {
            return None;
        }

        Some(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the credential itself.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(***)")
    }
}

/// A named permission. Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    /// Granted to every authenticated token.
    pub const DEFAULT_NAME: &'static str = "uid";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT_NAME
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self(Self::DEFAULT_NAME.to_string())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Metadata describing a validated token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub access_token: String,

    #[serde(default)]
    pub scope: Vec<Scope>,

    #[serde(default = "TokenInfo::default_token_type")]
    pub token_type: String,

    pub uid: String,

    #[serde(default)]
    pub realm: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl TokenInfo {
    pub fn default_token_type() -> String {
        String::from("Bearer")
    }

    /// The default scope is implied by any valid token.
    pub fn has_scope(&self, scope: &Scope) -> bool {
        scope.is_default() || self.scope.contains(scope)
    }
}
