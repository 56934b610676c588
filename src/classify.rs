//! Yes/no predicates classifying resolved symbols against the capability
//! context. All checks are by symbol identity, not by name, so a user type
//! exposing a `Sender` property or a `Stash()` method never matches.

use crate::context::AkkaContext;
use crate::symbol::{Program, SymbolId};

/// Is this symbol the actor base type's context-bound `Self` or `Sender`
/// accessor?
pub fn is_actor_self_or_sender(program: &Program, akka: &AkkaContext, sym: SymbolId) -> bool {
    if !program.is_property(sym) {
        return false;
    }
    Some(sym) == akka.core.actor_base_self(program)
        || Some(sym) == akka.core.actor_base_sender(program)
}

/// Is this symbol the ambient context interface's `Self` or `Sender`
/// accessor?
pub fn is_context_self_or_sender(program: &Program, akka: &AkkaContext, sym: SymbolId) -> bool {
    if !program.is_property(sym) {
        return false;
    }
    Some(sym) == akka.core.context_self(program) || Some(sym) == akka.core.context_sender(program)
}

/// Is this invocation target one of the framework's asynchronous
/// message-handler registration calls?
pub fn is_receive_async_registration(
    program: &Program,
    akka: &AkkaContext,
    method: SymbolId,
) -> bool {
    akka.core.receive_async_methods(program).contains(&method)
}

/// Does invoking this method cross an asynchronous boundary? True when the
/// method is declared async, or when its return type (unrolled to its open
/// definition) is the async-result type.
pub fn is_async_boundary_method(program: &Program, akka: &AkkaContext, method: SymbolId) -> bool {
    let Some(info) = program.method_info(method) else {
        return false;
    };
    if info.is_async {
        return true;
    }
    let Some(task) = akka.tasks.task_type(program) else {
        return false;
    };
    info.return_type
        .map(|ret| program.unwrap_original_definition(ret) == task)
        .unwrap_or(false)
}

/// Is this the deferred-message buffer's `Stash` operation?
pub fn is_stash_method(program: &Program, akka: &AkkaContext, sym: SymbolId) -> bool {
    Some(sym) == akka.core.stash_method(program)
}

/// Is this one of the single-event persist operations (`Persist` or
/// `PersistAsync`)?
pub fn is_single_event_persist(program: &Program, akka: &AkkaContext, sym: SymbolId) -> bool {
    akka.persistence.persist_methods(program).contains(&sym)
        || akka.persistence.persist_async_methods(program).contains(&sym)
}

/// Does this type implement the scheduler capability?
pub fn implements_tell_scheduler(program: &Program, akka: &AkkaContext, ty: SymbolId) -> bool {
    akka.core
        .tell_scheduler_interface(program)
        .map(|iface| program.is_derived_or_implements(ty, iface))
        .unwrap_or(false)
}

/// Is this class symbol a recognized actor (derives from or implements the
/// actor base type)?
pub fn is_actor_class(program: &Program, akka: &AkkaContext, class: SymbolId) -> bool {
    akka.core
        .actor_base_type(program)
        .map(|base| program.is_derived_or_implements(class, base))
        .unwrap_or(false)
}
