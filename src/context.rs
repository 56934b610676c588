//! Capability context: the resolved framework symbols rules match against.
//!
//! Constructed once per compiled program and shared read-only across every
//! analyzed unit (and across threads; all slots are `OnceLock`s). Each
//! sub-area first checks whether its defining assembly is referenced at all:
//! if not, the sub-area is a permanently-absent stand-in and every handle
//! reports `None`, which makes dependent rules decline to fire. Resolution
//! misses never surface as errors.

use crate::symbol::{Program, SymbolId};
use std::sync::OnceLock;

pub const AKKA_ASSEMBLY: &str = "Akka";
pub const AKKA_PERSISTENCE_ASSEMBLY: &str = "Akka.Persistence";

pub const ACTOR_BASE_TYPE: &str = "Akka.Actor.ActorBase";
pub const RECEIVE_ACTOR_TYPE: &str = "Akka.Actor.ReceiveActor";
pub const ACTOR_CONTEXT_INTERFACE: &str = "Akka.Actor.IActorContext";
pub const STASH_INTERFACE: &str = "Akka.Actor.IStash";
pub const TELL_SCHEDULER_INTERFACE: &str = "Akka.Actor.ITellScheduler";
pub const EVENTSOURCED_TYPE: &str = "Akka.Persistence.Eventsourced";
pub const TASK_TYPE: &str = "System.Threading.Tasks.Task";

/// Lazily-resolved bundle of framework symbols for one program.
#[derive(Debug)]
pub struct AkkaContext {
    pub core: CoreActorContext,
    pub tasks: TasksContext,
    pub persistence: PersistenceContext,
}

impl AkkaContext {
    pub fn resolve(program: &Program) -> Self {
        Self {
            core: CoreActorContext::select(program),
            tasks: TasksContext::new(),
            persistence: PersistenceContext::select(program),
        }
    }
}

/// Core actor sub-area: actor base type, context interface, stash, scheduler,
/// and the context-bound `Self`/`Sender` accessors.
#[derive(Debug, Default)]
pub struct CoreActorContext {
    present: bool,
    actor_base: OnceLock<Option<SymbolId>>,
    receive_actor: OnceLock<Option<SymbolId>>,
    actor_context: OnceLock<Option<SymbolId>>,
    stash_interface: OnceLock<Option<SymbolId>>,
    tell_scheduler: OnceLock<Option<SymbolId>>,
    actor_base_self: OnceLock<Option<SymbolId>>,
    actor_base_sender: OnceLock<Option<SymbolId>>,
    context_self: OnceLock<Option<SymbolId>>,
    context_sender: OnceLock<Option<SymbolId>>,
    stash_method: OnceLock<Option<SymbolId>>,
    receive_async_methods: OnceLock<Vec<SymbolId>>,
}

impl CoreActorContext {
    fn select(program: &Program) -> Self {
        Self {
            present: program.references_assembly(AKKA_ASSEMBLY),
            ..Self::default()
        }
    }

    /// Whether the core framework assembly is referenced at all.
    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn actor_base_type(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self
            .actor_base
            .get_or_init(|| program.type_by_qualified_name(ACTOR_BASE_TYPE))
    }

    pub fn receive_actor_type(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self
            .receive_actor
            .get_or_init(|| program.type_by_qualified_name(RECEIVE_ACTOR_TYPE))
    }

    pub fn actor_context_interface(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self
            .actor_context
            .get_or_init(|| program.type_by_qualified_name(ACTOR_CONTEXT_INTERFACE))
    }

    pub fn stash_interface(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self
            .stash_interface
            .get_or_init(|| program.type_by_qualified_name(STASH_INTERFACE))
    }

    pub fn tell_scheduler_interface(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self
            .tell_scheduler
            .get_or_init(|| program.type_by_qualified_name(TELL_SCHEDULER_INTERFACE))
    }

    /// `ActorBase.Self`: valid only during the original synchronous call.
    pub fn actor_base_self(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self.actor_base_self.get_or_init(|| {
            self.actor_base_type(program)
                .and_then(|ty| program.member_named(ty, "Self"))
        })
    }

    /// `ActorBase.Sender`: valid only during the original synchronous call.
    pub fn actor_base_sender(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self.actor_base_sender.get_or_init(|| {
            self.actor_base_type(program)
                .and_then(|ty| program.member_named(ty, "Sender"))
        })
    }

    /// `IActorContext.Self`.
    pub fn context_self(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self.context_self.get_or_init(|| {
            self.actor_context_interface(program)
                .and_then(|ty| program.member_named(ty, "Self"))
        })
    }

    /// `IActorContext.Sender`.
    pub fn context_sender(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self.context_sender.get_or_init(|| {
            self.actor_context_interface(program)
                .and_then(|ty| program.member_named(ty, "Sender"))
        })
    }

    /// `IStash.Stash`: the idempotency-sensitive operation.
    pub fn stash_method(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self.stash_method.get_or_init(|| {
            self.stash_interface(program)
                .and_then(|ty| program.member_named(ty, "Stash"))
        })
    }

    /// All overloads of the framework's async message-handler registration
    /// calls (`ReceiveAsync` / `ReceiveAnyAsync`).
    pub fn receive_async_methods(&self, program: &Program) -> &[SymbolId] {
        if !self.present {
            return &[];
        }
        self.receive_async_methods.get_or_init(|| {
            let Some(ty) = self.receive_actor_type(program) else {
                return Vec::new();
            };
            let mut methods = program.members_named(ty, "ReceiveAsync");
            methods.extend(program.members_named(ty, "ReceiveAnyAsync"));
            methods
        })
    }
}

/// Threading sub-area: the async-result type async boundaries return.
#[derive(Debug, Default)]
pub struct TasksContext {
    task: OnceLock<Option<SymbolId>>,
}

impl TasksContext {
    fn new() -> Self {
        Self::default()
    }

    pub fn task_type(&self, program: &Program) -> Option<SymbolId> {
        *self
            .task
            .get_or_init(|| program.type_by_qualified_name(TASK_TYPE))
    }
}

/// Persistence sub-area: per-event persist operations and their batch
/// variants.
#[derive(Debug, Default)]
pub struct PersistenceContext {
    present: bool,
    eventsourced: OnceLock<Option<SymbolId>>,
    persist: OnceLock<Vec<SymbolId>>,
    persist_async: OnceLock<Vec<SymbolId>>,
    persist_all: OnceLock<Vec<SymbolId>>,
    persist_all_async: OnceLock<Vec<SymbolId>>,
}

impl PersistenceContext {
    fn select(program: &Program) -> Self {
        Self {
            present: program.references_assembly(AKKA_PERSISTENCE_ASSEMBLY),
            ..Self::default()
        }
    }

    /// Whether the persistence assembly is referenced. Rules gated on this
    /// flag skip traversal entirely when it is false.
    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn eventsourced_type(&self, program: &Program) -> Option<SymbolId> {
        if !self.present {
            return None;
        }
        *self
            .eventsourced
            .get_or_init(|| program.type_by_qualified_name(EVENTSOURCED_TYPE))
    }

    fn overloads<'a>(
        &self,
        lock: &'a OnceLock<Vec<SymbolId>>,
        program: &Program,
        name: &str,
    ) -> &'a [SymbolId] {
        if !self.present {
            return &[];
        }
        lock.get_or_init(|| {
            self.eventsourced_type(program)
                .map(|ty| program.members_named(ty, name))
                .unwrap_or_default()
        })
    }

    pub fn persist_methods(&self, program: &Program) -> &[SymbolId] {
        self.overloads(&self.persist, program, "Persist")
    }

    pub fn persist_async_methods(&self, program: &Program) -> &[SymbolId] {
        self.overloads(&self.persist_async, program, "PersistAsync")
    }

    pub fn persist_all_methods(&self, program: &Program) -> &[SymbolId] {
        self.overloads(&self.persist_all, program, "PersistAll")
    }

    pub fn persist_all_async_methods(&self, program: &Program) -> &[SymbolId] {
        self.overloads(&self.persist_all_async, program, "PersistAllAsync")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::ProgramBuilder;

    fn akka_program() -> Program {
        let mut b = ProgramBuilder::new();
        b.reference_assembly(AKKA_ASSEMBLY);
        b.reference_assembly(AKKA_PERSISTENCE_ASSEMBLY);
        let base = b.ty(ACTOR_BASE_TYPE);
        b.property(base, "Self", None);
        b.property(base, "Sender", None);
        let stash = b.ty(STASH_INTERFACE);
        b.method(stash, "Stash", false, None);
        let es = b.ty(EVENTSOURCED_TYPE);
        b.method(es, "Persist", false, None);
        b.method(es, "PersistAsync", false, None);
        b.finish()
    }

    #[test]
    fn resolves_known_members_when_assembly_referenced() {
        let program = akka_program();
        let ctx = AkkaContext::resolve(&program);

        assert!(ctx.core.is_present());
        let base = ctx.core.actor_base_type(&program).expect("actor base");
        assert_eq!(program.name(base), "ActorBase");
        assert!(ctx.core.actor_base_self(&program).is_some());
        assert!(ctx.core.stash_method(&program).is_some());
        assert_eq!(ctx.persistence.persist_methods(&program).len(), 1);
    }

    #[test]
    fn absent_assembly_degrades_to_empty_handles() {
        let program = ProgramBuilder::new().finish();
        let ctx = AkkaContext::resolve(&program);

        assert!(!ctx.core.is_present());
        assert!(!ctx.persistence.is_present());
        assert!(ctx.core.actor_base_type(&program).is_none());
        assert!(ctx.core.stash_method(&program).is_none());
        assert!(ctx.persistence.persist_methods(&program).is_empty());
    }

    #[test]
    fn persist_overload_lists_outlive_the_accessor_call() {
        let program = akka_program();
        let ctx = AkkaContext::resolve(&program);
        let first = ctx.persistence.persist_async_methods(&program);
        let second = ctx.persistence.persist_async_methods(&program);
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn resolution_is_memoized_and_idempotent() {
        let program = akka_program();
        let ctx = AkkaContext::resolve(&program);
        let first = ctx.core.actor_base_sender(&program);
        let second = ctx.core.actor_base_sender(&program);
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
