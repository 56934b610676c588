//! Core actor-clippy engine and lint registry.
//!
//! The crate analyzes host-supplied syntax units against a symbol oracle and
//! reports misuse of the actor framework's context, stash, scheduling, and
//! persistence surfaces. It performs no parsing or project loading itself;
//! the embedding host constructs the `SyntaxTree`, `Program`, and
//! `SemanticModel` and hands them over one unit at a time.

pub mod cfg;
pub mod classify;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod level;
pub mod lint;
pub mod rules;
pub mod symbol;
pub mod syntax;
pub mod telemetry;

use crate::config::ActorClippyConfig;
use crate::diagnostics::Diagnostic;
use crate::error::{ActorClippyError, ClippyResult};
use crate::lint::{AnalysisUnit, LintContext, LintRegistry, LintSettings};

/// Engine orchestrates linting by running every registered rule over a unit.
pub struct AnalysisEngine {
    registry: LintRegistry,
    settings: LintSettings,
}

impl AnalysisEngine {
    /// Create a new engine with default lint settings.
    pub fn new(registry: LintRegistry) -> Self {
        Self {
            registry,
            settings: LintSettings::default(),
        }
    }

    /// Create a new engine with explicit lint settings (e.g. from config).
    pub fn new_with_settings(registry: LintRegistry, settings: LintSettings) -> Self {
        Self { registry, settings }
    }

    /// Analyze one unit and return its findings.
    ///
    /// A failing rule is logged and skipped; the other rules still run.
    /// Cancellation is the exception: it aborts the whole unit and any
    /// findings collected so far are discarded.
    pub fn analyze_unit(&self, unit: &AnalysisUnit<'_>) -> ClippyResult<Vec<Diagnostic>> {
        let mut ctx = LintContext::new(self.settings.clone());

        for rule in self.registry.rules() {
            match rule.check(unit, &mut ctx) {
                Ok(()) => {}
                Err(ActorClippyError::Cancelled) => return Err(ActorClippyError::Cancelled),
                Err(err) => {
                    tracing::warn!(
                        rule = rule.descriptor().id,
                        error = %err,
                        "lint rule failed; continuing with remaining rules"
                    );
                }
            }
        }

        Ok(ctx.into_diagnostics())
    }
}

/// Translate a parsed config file into engine settings.
pub fn settings_from_config(cfg: &ActorClippyConfig) -> LintSettings {
    LintSettings::default()
        .with_config_levels(cfg.lints.levels.clone())
        .disable(cfg.lints.disabled.iter().cloned())
}

/// Construct an `AnalysisEngine` with all built-in rules enabled.
pub fn create_default_engine() -> AnalysisEngine {
    AnalysisEngine::new(LintRegistry::default_rules())
}
