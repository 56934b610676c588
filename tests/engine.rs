//! Engine-level behavior: determinism across runs, graceful degradation when
//! the framework is absent, cancellation semantics, and config-driven levels.

mod support;

use actor_clippy::config::ActorClippyConfig;
use actor_clippy::context::AkkaContext;
use actor_clippy::error::ActorClippyError;
use actor_clippy::level::LintLevel;
use actor_clippy::lint::{AnalysisUnit, CancellationToken, LintRegistry};
use actor_clippy::symbol::{ProgramBuilder, SemanticModel};
use actor_clippy::syntax::{SyntaxKind, SyntaxTree, TreeBuilder};
use actor_clippy::{AnalysisEngine, create_default_engine, settings_from_config};
use support::{AkkaFixture, span};

fn persist_in_loop_tree(fx: &AkkaFixture) -> (SyntaxTree, SemanticModel) {
    let mut b = TreeBuilder::new();
    let mut model = SemanticModel::new();

    let callee = b.leaf(SyntaxKind::Identifier, span(4));
    let pinv = b.node(SyntaxKind::Invocation, span(4), vec![callee]);
    model.bind(pinv, fx.persist);
    let loop_body = b.node(SyntaxKind::Block, span(4), vec![pinv]);
    let cond = b.leaf(SyntaxKind::Other, span(3));
    let while_node = b.node(SyntaxKind::While, span(3), vec![cond, loop_body]);
    let body = b.node(SyntaxKind::Block, span(2), vec![while_node]);
    let method = b.node(SyntaxKind::MethodDecl, span(2), vec![body]);
    let class = b.node(SyntaxKind::ClassDecl, span(1), vec![method]);
    model.bind(class, fx.persistent_class);
    (b.finish(class), model)
}

#[test]
fn repeated_analysis_of_one_unit_is_deterministic() {
    let fx = AkkaFixture::new();
    let (tree, model) = persist_in_loop_tree(&fx);
    let akka = AkkaContext::resolve(&fx.program);
    let engine = create_default_engine();

    let unit = AnalysisUnit::new(&tree, &fx.program, &model, &akka);
    let first = engine.analyze_unit(&unit).expect("analysis");
    let second = engine.analyze_unit(&unit).expect("analysis");

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert_eq!(first[0].lint.id, "AC1005");
}

#[test]
fn absent_framework_means_no_findings_from_any_rule() {
    let program = ProgramBuilder::new().finish();
    let akka = AkkaContext::resolve(&program);
    let model = SemanticModel::new();

    let mut b = TreeBuilder::new();
    let stmt = b.leaf(SyntaxKind::Invocation, span(3));
    let body = b.node(SyntaxKind::Block, span(2), vec![stmt]);
    let method = b.node(SyntaxKind::MethodDecl, span(2), vec![body]);
    let class = b.node(SyntaxKind::ClassDecl, span(1), vec![method]);
    let tree = b.finish(class);

    let engine = create_default_engine();
    let unit = AnalysisUnit::new(&tree, &program, &model, &akka);
    let diags = engine.analyze_unit(&unit).expect("analysis");
    assert!(diags.is_empty());
}

#[test]
fn cancellation_aborts_the_unit_and_discards_findings() {
    let fx = AkkaFixture::new();
    let (tree, model) = persist_in_loop_tree(&fx);
    let akka = AkkaContext::resolve(&fx.program);
    let engine = create_default_engine();

    let token = CancellationToken::new();
    token.cancel();
    let unit =
        AnalysisUnit::new(&tree, &fx.program, &model, &akka).with_cancellation(token.clone());

    let err = engine.analyze_unit(&unit).expect_err("should abort");
    assert!(matches!(err, ActorClippyError::Cancelled));
    assert!(token.is_cancelled());
}

#[test]
fn config_can_disable_a_lint() {
    let cfg: ActorClippyConfig = toml::from_str(
        r#"
        [lints]
        disabled = ["persist_inside_loop"]
        "#,
    )
    .expect("config should parse");

    let fx = AkkaFixture::new();
    let (tree, model) = persist_in_loop_tree(&fx);
    let akka = AkkaContext::resolve(&fx.program);
    let engine =
        AnalysisEngine::new_with_settings(LintRegistry::default_rules(), settings_from_config(&cfg));

    let unit = AnalysisUnit::new(&tree, &fx.program, &model, &akka);
    let diags = engine.analyze_unit(&unit).expect("analysis");
    assert!(diags.is_empty());
}

#[test]
fn config_can_promote_a_lint_to_error() {
    let cfg: ActorClippyConfig = toml::from_str(
        r#"
        [lints]
        persist_inside_loop = "error"
        "#,
    )
    .expect("config should parse");

    let fx = AkkaFixture::new();
    let (tree, model) = persist_in_loop_tree(&fx);
    let akka = AkkaContext::resolve(&fx.program);
    let engine =
        AnalysisEngine::new_with_settings(LintRegistry::default_rules(), settings_from_config(&cfg));

    let unit = AnalysisUnit::new(&tree, &fx.program, &model, &akka);
    let diags = engine.analyze_unit(&unit).expect("analysis");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].level, LintLevel::Error);
}

#[test]
fn registry_lists_all_builtin_rules() {
    let registry = LintRegistry::default_rules();
    assert_eq!(
        registry.rule_names(),
        vec![
            "close_over_context_in_async_lambda",
            "close_over_context_in_receive_async",
            "persist_inside_loop",
            "schedule_tell_from_actor",
            "stash_more_than_once_per_handler",
        ]
    );
}
