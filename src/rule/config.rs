use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::CommonConfig;

/// One entry of the ordered rule list.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuleConfig {
    /// HTTP method, matched exactly and case-sensitively.
    pub method: String,

    /// Regular expression that must match the whole request path (without query).
    pub path: String,

    #[serde(default = "RuleConfig::default_kind")]
    pub kind: RuleKind,

    /// Scope required by `validate` rules. Defaults to the provider's default scope.
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    #[serde(rename = "validate")]
    Validate,

    #[serde(rename = "allow")]
    Allow,

    #[serde(rename = "deny")]
    Deny,
}

impl CommonConfig for RuleConfig {
    fn default() -> Self {
        Self {
            method: String::new(),
            path: String::new(),
            kind: Self::default_kind(),
            scope: None,
        }
    }

    fn complete(&mut self) -> Result<()> {
        if self.method.is_empty() {
            bail!("rule method should not be empty");
        }
        if self.path.is_empty() {
            bail!("rule path should not be empty");
        }

        if let Some(scope) = self.scope.as_ref() {
            if scope.is_empty() {
                bail!("rule scope should not be empty when set");
            }
            if self.kind != RuleKind::Validate {
                bail!("scope is only allowed for validate rules");
            }
        }

        Ok(())
    }
}

impl RuleConfig {
    pub fn default_kind() -> RuleKind {
        RuleKind::Validate
    }
}
