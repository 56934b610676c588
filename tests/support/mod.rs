#![allow(dead_code)]

//! Shared fixture: a small compiled program wired with the framework's
//! actor, persistence, and scheduling surfaces, plus a user actor class.

use actor_clippy::context::{
    ACTOR_BASE_TYPE, ACTOR_CONTEXT_INTERFACE, AKKA_ASSEMBLY, AKKA_PERSISTENCE_ASSEMBLY,
    EVENTSOURCED_TYPE, RECEIVE_ACTOR_TYPE, STASH_INTERFACE, TASK_TYPE, TELL_SCHEDULER_INTERFACE,
};
use actor_clippy::diagnostics::Span;
use actor_clippy::symbol::{Program, ProgramBuilder, SymbolId};

pub struct AkkaFixture {
    pub program: Program,
    pub actor_class: SymbolId,
    pub persistent_class: SymbolId,
    pub plain_class: SymbolId,
    pub actor_base_self: SymbolId,
    pub actor_base_sender: SymbolId,
    pub context_self: SymbolId,
    pub context_sender: SymbolId,
    pub stash_method: SymbolId,
    pub receive_async: SymbolId,
    pub persist: SymbolId,
    pub persist_async: SymbolId,
    /// Non-framework helper crossing an async boundary (returns `Task`).
    pub run_detached: SymbolId,
    pub schedule_tell_once: SymbolId,
    pub schedule_tell_repeatedly: SymbolId,
    /// Field on the user actor typed as the scheduler capability.
    pub scheduler_field: SymbolId,
    /// Field on the user actor typed as the plain class.
    pub plain_field: SymbolId,
    /// Local routine symbol, declared inside a handler in some fixtures.
    pub local_helper: SymbolId,
}

impl AkkaFixture {
    pub fn new() -> Self {
        let mut b = ProgramBuilder::new();
        b.reference_assembly(AKKA_ASSEMBLY);
        b.reference_assembly(AKKA_PERSISTENCE_ASSEMBLY);

        let actor_base = b.ty(ACTOR_BASE_TYPE);
        let actor_base_self = b.property(actor_base, "Self", None);
        let actor_base_sender = b.property(actor_base, "Sender", None);

        let actor_context = b.ty(ACTOR_CONTEXT_INTERFACE);
        let context_self = b.property(actor_context, "Self", None);
        let context_sender = b.property(actor_context, "Sender", None);

        let stash_iface = b.ty(STASH_INTERFACE);
        let stash_method = b.method(stash_iface, "Stash", false, None);

        let scheduler = b.ty(TELL_SCHEDULER_INTERFACE);
        let schedule_tell_once = b.method(scheduler, "ScheduleTellOnce", false, None);
        let schedule_tell_repeatedly = b.method(scheduler, "ScheduleTellRepeatedly", false, None);

        let task = b.ty(TASK_TYPE);
        let generic_task = b.ty("System.Threading.Tasks.Task`1");
        b.set_original_definition(generic_task, task);

        let receive_actor = b.ty(RECEIVE_ACTOR_TYPE);
        b.set_base(receive_actor, actor_base);
        let receive_async = b.method(receive_actor, "ReceiveAsync", true, Some(task));
        b.method(receive_actor, "ReceiveAnyAsync", true, Some(task));

        let eventsourced = b.ty(EVENTSOURCED_TYPE);
        b.set_base(eventsourced, actor_base);
        let persist = b.method(eventsourced, "Persist", false, None);
        let persist_async = b.method(eventsourced, "PersistAsync", false, None);
        b.method(eventsourced, "PersistAll", false, None);
        b.method(eventsourced, "PersistAllAsync", false, None);

        let actor_class = b.ty("MyApp.OrderActor");
        b.set_base(actor_class, receive_actor);
        let scheduler_field = b.field(actor_class, "_scheduler", Some(scheduler));

        let persistent_class = b.ty("MyApp.LedgerActor");
        b.set_base(persistent_class, eventsourced);

        let plain_class = b.ty("MyApp.Formatter");
        let plain_field = b.field(actor_class, "_formatter", Some(plain_class));
        let run_detached = b.method(plain_class, "RunDetached", false, Some(task));
        let local_helper = b.free_method("ReplyToSender", false, None);

        Self {
            program: b.finish(),
            actor_class,
            persistent_class,
            plain_class,
            actor_base_self,
            actor_base_sender,
            context_self,
            context_sender,
            stash_method,
            receive_async,
            persist,
            persist_async,
            run_detached,
            schedule_tell_once,
            schedule_tell_repeatedly,
            scheduler_field,
            plain_field,
            local_helper,
        }
    }
}

/// Single-line span helper; the row doubles as a test-visible anchor.
pub fn span(row: usize) -> Span {
    Span::line(row, 1, 10)
}
