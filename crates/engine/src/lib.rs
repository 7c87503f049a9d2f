//! Verification orchestration.
//!
//! Provides:
//! - `RuleRegistry`: ordered, engine-owned rule set with enable/disable
//! - `VerificationConfig`: disabled rules, severity floor, stop-on-critical
//! - `VerificationEngine`: adapts raw documents, runs rules, builds reports

mod config;
mod registry;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use docverify_adapters::{DocumentAdapter, GstAdapter, PanAdapter, UdyamAdapter};
use docverify_model::{Entity, RawDocument, Status};
use docverify_report::ReportGenerator;
use docverify_rules::{fault_result, RuleResult};
use thiserror::Error;

pub use config::{OutputFormat, ParseOutputFormatError, VerificationConfig};
pub use registry::{RegistryError, RuleInfo, RuleRegistry};

/// Errors from loading inputs or configuring the engine.
///
/// Rule faults never surface here; they become SKIPPED results.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Read one extractor output file.
pub fn load_document(path: &Path) -> Result<RawDocument, EngineError> {
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| EngineError::Document {
        path: path.to_path_buf(),
        source,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}

/// Runs the registered rules over an entity built from raw documents.
#[derive(Debug)]
pub struct VerificationEngine {
    config: VerificationConfig,
    registry: RuleRegistry,
}

impl VerificationEngine {
    /// Engine with every built-in rule registered.
    pub fn new(config: VerificationConfig) -> Result<Self, EngineError> {
        let registry = RuleRegistry::with_default_rules()?;
        Ok(Self::with_registry(config, registry))
    }

    pub fn with_registry(config: VerificationConfig, registry: RuleRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut VerificationConfig {
        &mut self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    /// Adapt each supplied document. An absent document becomes an empty record.
    pub fn build_entity(
        &self,
        pan: Option<&RawDocument>,
        gst: Option<&RawDocument>,
        udyam: Option<&RawDocument>,
    ) -> Entity {
        Entity::new(
            pan.map(|raw| PanAdapter.adapt(raw)).unwrap_or_default(),
            gst.map(|raw| GstAdapter.adapt(raw)).unwrap_or_default(),
            udyam.map(|raw| UdyamAdapter.adapt(raw)).unwrap_or_default(),
        )
    }

    /// Evaluate every enabled rule in registration order.
    ///
    /// Rules disabled in the registry or the config, and rules below the
    /// severity floor, produce no result. A rule that errors or panics yields
    /// a SKIPPED result and the run continues.
    pub fn run_rules(&self, entity: &Entity) -> Vec<RuleResult> {
        let mut results = Vec::new();

        for rule in self.registry.rules(false) {
            let rule_id = rule.rule_id();
            if !self.config.is_rule_enabled(rule_id) || !self.config.admits(rule.severity()) {
                tracing::debug!(rule = rule_id, "rule filtered out");
                continue;
            }

            let outcome = catch_unwind(AssertUnwindSafe(|| rule.validate(entity)));
            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(err)) => {
                    tracing::warn!(rule = rule_id, error = %err, "rule execution failed");
                    fault_result(&*rule, &err.to_string())
                }
                Err(payload) => {
                    let message = panic_message(&*payload);
                    tracing::warn!(rule = rule_id, error = %message, "rule panicked");
                    fault_result(&*rule, &message)
                }
            };
            tracing::debug!(rule = rule_id, status = %result.status(), "rule evaluated");

            let halt = self.config.stop_on_critical_fail && result.is_critical_failure();
            results.push(result);
            if halt {
                tracing::info!(rule = rule_id, "critical rule failed, stopping verification");
                break;
            }
        }

        results
    }

    /// Run the rules over a prepared entity.
    pub fn verify(&self, entity: Entity) -> ReportGenerator {
        let results = self.run_rules(&entity);
        let count = |status: Status| results.iter().filter(|r| r.status() == status).count();
        tracing::info!(
            rules = results.len(),
            passed = count(Status::Pass),
            failed = count(Status::Fail),
            warnings = count(Status::Warning),
            skipped = count(Status::Skipped),
            "verification complete"
        );
        ReportGenerator::new(entity, results)
    }

    pub fn verify_from_raw(
        &self,
        pan: Option<&RawDocument>,
        gst: Option<&RawDocument>,
        udyam: Option<&RawDocument>,
    ) -> ReportGenerator {
        let entity = self.build_entity(pan, gst, udyam);
        self.verify(entity)
    }

    /// Load the given extractor outputs from disk and verify them.
    pub fn verify_from_files(
        &self,
        pan: Option<&Path>,
        gst: Option<&Path>,
        udyam: Option<&Path>,
    ) -> Result<ReportGenerator, EngineError> {
        let pan = pan.map(load_document).transpose()?;
        let gst = gst.map(load_document).transpose()?;
        let udyam = udyam.map(load_document).transpose()?;
        Ok(self.verify_from_raw(pan.as_ref(), gst.as_ref(), udyam.as_ref()))
    }

    /// Every registered rule, with `enabled` reflecting both the registry
    /// and the config.
    pub fn available_rules(&self) -> Vec<RuleInfo> {
        self.registry
            .describe()
            .into_iter()
            .map(|mut info| {
                info.enabled = info.enabled && self.config.is_rule_enabled(&info.rule_id);
                info
            })
            .collect()
    }
}
