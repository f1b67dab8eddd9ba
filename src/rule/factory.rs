use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::provider::AuthProvider;
use crate::token::Scope;

use super::config::{RuleConfig, RuleKind};
use super::engine::RuleEngine;
use super::{ExplicitlyAllowedRule, ExplicitlyDeniedRule, UnionRule, ValidateTokenRule};

pub struct RuleFactory;

impl RuleFactory {
    pub fn new() -> Self {
        Self
    }

    /// Builds the engine in configuration order and terminates it with a
    /// deny-all rule. Invalid path patterns fail here, never at request time.
    pub fn build_engine(
        &self,
        cfgs: &[RuleConfig],
        provider: Arc<dyn AuthProvider>,
    ) -> Result<RuleEngine> {
        let mut rules = Vec::with_capacity(cfgs.len() + 1);
        for (idx, cfg) in cfgs.iter().enumerate() {
            let rule = self
                .build_rule(cfg, provider.clone())
                .with_context(|| format!("build rule #{idx} ({} {})", cfg.method, cfg.path))?;
            info!("Rule #{idx}: {}", rule.describe());
            rules.push(rule);
        }

        Ok(RuleEngine::with_catch_all(rules, provider))
    }

    fn build_rule(&self, cfg: &RuleConfig, provider: Arc<dyn AuthProvider>) -> Result<UnionRule> {
        let method = cfg.method.clone();
        let path = cfg.path.clone();
        let rule: UnionRule = match cfg.kind {
            RuleKind::Validate => {
                let scope = match cfg.scope.as_ref() {
                    Some(scope) => Scope::new(scope.clone()),
                    None => provider.default_scope(),
                };
                ValidateTokenRule::new(provider, method, path, scope)?.into()
            }
            RuleKind::Allow => ExplicitlyAllowedRule::new(method, path)?.into(),
            RuleKind::Deny => ExplicitlyDeniedRule::new(provider, method, path)?.into(),
        };
        Ok(rule)
    }
}
