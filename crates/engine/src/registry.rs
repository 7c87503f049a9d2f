//! Ordered rule registry.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use docverify_model::{DocumentKind, Severity};
use docverify_rules::{default_rules, Rule};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Rule already registered: {0}")]
    DuplicateRule(String),
}

/// Metadata describing a registered rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub rule_id: String,
    pub description: String,
    pub severity: Severity,
    pub source_docs: Vec<DocumentKind>,
    pub enabled: bool,
}

/// Rules in registration order plus a set of disabled ids.
///
/// Disabling keeps a rule registered; only `unregister` removes it.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    disabled: HashSet<String>,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.rule_id()).collect::<Vec<_>>(),
            )
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in rule, registered through `discover`.
    pub fn with_default_rules() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.discover()?;
        Ok(registry)
    }

    /// Append a rule. Fails if its id is already registered.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        if self.position(rule.rule_id()).is_some() {
            return Err(RegistryError::DuplicateRule(rule.rule_id().to_string()));
        }
        tracing::debug!(rule = rule.rule_id(), "registered rule");
        self.rules.push(rule);
        Ok(())
    }

    /// Register a rule, overwriting any rule with the same id in place.
    ///
    /// Returns the rule that was replaced.
    pub fn replace(&mut self, rule: Arc<dyn Rule>) -> Option<Arc<dyn Rule>> {
        match self.position(rule.rule_id()) {
            Some(index) => Some(std::mem::replace(&mut self.rules[index], rule)),
            None => {
                self.rules.push(rule);
                None
            }
        }
    }

    /// Remove a rule, returning it if it was registered.
    pub fn unregister(&mut self, rule_id: &str) -> Option<Arc<dyn Rule>> {
        self.disabled.remove(rule_id);
        self.position(rule_id).map(|index| self.rules.remove(index))
    }

    /// Register every built-in rule, returning how many were added.
    ///
    /// Stops at the first id that is already present.
    pub fn discover(&mut self) -> Result<usize, RegistryError> {
        let mut count = 0;
        for rule in default_rules() {
            self.register(rule)?;
            count += 1;
        }
        tracing::debug!(count, "discovered built-in rules");
        Ok(count)
    }

    pub fn disable(&mut self, rule_id: &str) {
        if self.position(rule_id).is_none() {
            tracing::warn!(rule = rule_id, "disabling a rule that is not registered");
        }
        self.disabled.insert(rule_id.to_string());
    }

    pub fn enable(&mut self, rule_id: &str) {
        self.disabled.remove(rule_id);
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        !self.disabled.contains(rule_id)
    }

    pub fn get(&self, rule_id: &str) -> Option<&Arc<dyn Rule>> {
        self.position(rule_id).map(|index| &self.rules[index])
    }

    /// Registered rules in order, optionally including disabled ones.
    pub fn rules(&self, include_disabled: bool) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| include_disabled || self.is_enabled(r.rule_id()))
            .cloned()
            .collect()
    }

    /// Enabled rules whose source documents are all in `docs`.
    pub fn rules_for_docs(&self, docs: &[DocumentKind]) -> Vec<Arc<dyn Rule>> {
        self.rules(false)
            .into_iter()
            .filter(|r| r.source_docs().iter().all(|d| docs.contains(d)))
            .collect()
    }

    /// Enabled rules of exactly the given severity.
    pub fn rules_by_severity(&self, severity: Severity) -> Vec<Arc<dyn Rule>> {
        self.rules(false)
            .into_iter()
            .filter(|r| r.severity() == severity)
            .collect()
    }

    /// Metadata for every registered rule, disabled ones included.
    pub fn describe(&self) -> Vec<RuleInfo> {
        self.rules
            .iter()
            .map(|r| RuleInfo {
                rule_id: r.rule_id().to_string(),
                description: r.description().to_string(),
                severity: r.severity(),
                source_docs: r.source_docs().to_vec(),
                enabled: self.is_enabled(r.rule_id()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn position(&self, rule_id: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.rule_id() == rule_id)
    }
}
