use crate::cfg::ControlFlowGraph;
use crate::context::AkkaContext;
use crate::diagnostics::{Diagnostic, Span};
use crate::error::{ActorClippyError, ClippyResult};
use crate::level::LintLevel;
use crate::symbol::{Program, SemanticModel};
use crate::syntax::SyntaxTree;
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// High-level categories used to group lints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LintCategory {
    /// Misuse that changes runtime behavior (lost sender, double stash).
    Correctness,
    /// Legal but inefficient usage with a cheaper framework alternative.
    Performance,
}

impl LintCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintCategory::Correctness => "correctness",
            LintCategory::Performance => "performance",
        }
    }
}

/// How a lint examines the analyzed unit:
/// - `Syntactic` lints walk the syntax tree and query the symbol oracle
/// - `ControlFlow` lints additionally propagate along basic-block paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Syntactic,
    ControlFlow,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Syntactic => "syntactic",
            AnalysisKind::ControlFlow => "control-flow",
        }
    }
}

/// Static metadata describing a lint rule.
///
/// The engine consumes only id, severity, and the argument list attached to
/// each finding; `message` is the template the reporting boundary renders.
#[derive(Debug, PartialEq, Eq)]
pub struct LintDescriptor {
    /// Stable rule identity, e.g. `AC1003`.
    pub id: &'static str,
    pub name: &'static str,
    pub category: LintCategory,
    pub default_level: LintLevel,
    pub analysis: AnalysisKind,
    pub description: &'static str,
    /// Message template with `{0}`, `{1}`, ... placeholders.
    pub message: &'static str,
}

impl LintDescriptor {
    pub const fn error(
        id: &'static str,
        name: &'static str,
        category: LintCategory,
        analysis: AnalysisKind,
        description: &'static str,
        message: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            category,
            default_level: LintLevel::Error,
            analysis,
            description,
            message,
        }
    }

    pub const fn warning(
        id: &'static str,
        name: &'static str,
        category: LintCategory,
        analysis: AnalysisKind,
        description: &'static str,
        message: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            category,
            default_level: LintLevel::Warn,
            analysis,
            description,
            message,
        }
    }
}

/// Cooperative cancellation signal shared between the host and the engine.
///
/// Rules check it at bounded intervals (per visited node or basic block) and
/// abandon the current unit promptly; the engine then discards any findings
/// already collected for that unit.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn checkpoint(&self) -> ClippyResult<()> {
        if self.is_cancelled() {
            return Err(ActorClippyError::Cancelled);
        }
        Ok(())
    }
}

/// One syntax unit handed over by the host, together with the per-program
/// inputs every rule receives: the symbol oracle, the capability context,
/// and an optional precomputed control-flow graph for a routine.
pub struct AnalysisUnit<'a> {
    pub tree: &'a SyntaxTree,
    pub program: &'a Program,
    pub model: &'a SemanticModel,
    pub akka: &'a AkkaContext,
    pub cfg: Option<&'a ControlFlowGraph>,
    pub cancellation: CancellationToken,
}

impl<'a> AnalysisUnit<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        program: &'a Program,
        model: &'a SemanticModel,
        akka: &'a AkkaContext,
    ) -> Self {
        Self {
            tree,
            program,
            model,
            akka,
            cfg: None,
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cfg(mut self, cfg: &'a ControlFlowGraph) -> Self {
        self.cfg = Some(cfg);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// A single lint rule: a pure function of one analysis unit to findings.
///
/// Rules keep no state across invocations and never communicate with each
/// other; `Send + Sync` so the host may dispatch units concurrently.
pub trait LintRule: Send + Sync {
    fn descriptor(&self) -> &'static LintDescriptor;
    fn check(&self, unit: &AnalysisUnit<'_>, ctx: &mut LintContext) -> ClippyResult<()>;
}

/// Per-lint configuration derived from `actor-clippy.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintSettings {
    levels: HashMap<String, LintLevel>,
}

impl LintSettings {
    #[must_use]
    pub fn with_config_levels(mut self, levels: HashMap<String, LintLevel>) -> Self {
        self.levels.extend(levels);
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            self.levels.insert(name, LintLevel::Allow);
        }
        self
    }

    pub fn level_for(&self, lint: &'static LintDescriptor) -> LintLevel {
        self.levels
            .get(lint.name)
            .copied()
            .unwrap_or(lint.default_level)
    }
}

/// Mutable accumulator passed to lint rules while analyzing one unit.
pub struct LintContext {
    settings: LintSettings,
    diagnostics: Vec<Diagnostic>,
}

impl LintContext {
    pub fn new(settings: LintSettings) -> Self {
        Self {
            settings,
            diagnostics: Vec::new(),
        }
    }

    /// Record a finding unless configuration allows the lint away.
    pub fn report(&mut self, lint: &'static LintDescriptor, span: Span, args: Vec<String>) {
        let level = self.settings.level_for(lint);
        if level == LintLevel::Allow {
            return;
        }
        self.diagnostics.push(Diagnostic {
            lint,
            level,
            span,
            args,
        });
    }

    pub fn settings(&self) -> &LintSettings {
        &self.settings
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Registry of the rules the engine runs over each unit.
pub struct LintRegistry {
    rules: Vec<Box<dyn LintRule>>,
}

impl LintRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// All built-in rules.
    pub fn default_rules() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::rules::ReceiveAsyncCaptureRule));
        registry.register(Box::new(crate::rules::AsyncLambdaCaptureRule));
        registry.register(Box::new(crate::rules::StashOnceRule));
        registry.register(Box::new(crate::rules::ScheduleTellRule));
        registry.register(Box::new(crate::rules::PersistInLoopRule));
        registry
    }

    pub fn register(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .map(|r| r.descriptor().name)
            .sorted()
            .collect()
    }
}

impl Default for LintRegistry {
    fn default() -> Self {
        Self::default_rules()
    }
}
