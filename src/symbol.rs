//! Program symbol table and semantic-resolution oracle.
//!
//! Both are produced by the host compiler's front end. The engine queries
//! them read-only: rules compare resolved `SymbolId`s against capability
//! handles by identity, never by name, so unrelated types exposing
//! same-named members cannot trigger false positives.

use crate::syntax::NodeId;
use id_arena::{Arena, Id};
use std::collections::{HashMap, HashSet};

pub type SymbolId = Id<Symbol>;

#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

#[derive(Debug)]
pub enum SymbolKind {
    Type(TypeInfo),
    Method(MethodInfo),
    Property { value_type: Option<SymbolId> },
    Field { value_type: Option<SymbolId> },
    Local { value_type: Option<SymbolId> },
    Parameter { value_type: Option<SymbolId> },
}

#[derive(Debug)]
pub struct TypeInfo {
    pub qualified_name: String,
    pub base: Option<SymbolId>,
    pub interfaces: Vec<SymbolId>,
    pub members: Vec<SymbolId>,
    /// For constructed generic types, the open definition they instantiate.
    pub original_definition: Option<SymbolId>,
}

#[derive(Debug)]
pub struct MethodInfo {
    pub is_async: bool,
    pub return_type: Option<SymbolId>,
}

/// Read-only view of one compiled program.
#[derive(Debug)]
pub struct Program {
    symbols: Arena<Symbol>,
    types_by_name: HashMap<String, SymbolId>,
    referenced_assemblies: HashSet<String>,
}

impl Program {
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.symbols[id].name
    }

    pub fn references_assembly(&self, name: &str) -> bool {
        self.referenced_assemblies.contains(name)
    }

    /// Stable qualified-name lookup, e.g. `Akka.Actor.ActorBase`. Absent when
    /// the defining assembly is not referenced.
    pub fn type_by_qualified_name(&self, qualified: &str) -> Option<SymbolId> {
        self.types_by_name.get(qualified).copied()
    }

    fn type_info(&self, id: SymbolId) -> Option<&TypeInfo> {
        match &self.symbols[id].kind {
            SymbolKind::Type(info) => Some(info),
            _ => None,
        }
    }

    /// All members of `ty` with the given name, declaration order.
    pub fn members_named(&self, ty: SymbolId, name: &str) -> Vec<SymbolId> {
        self.type_info(ty)
            .map(|info| {
                info.members
                    .iter()
                    .copied()
                    .filter(|&m| self.symbols[m].name == name)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn member_named(&self, ty: SymbolId, name: &str) -> Option<SymbolId> {
        self.members_named(ty, name).first().copied()
    }

    /// Unroll a constructed generic type to its open definition.
    pub fn unwrap_original_definition(&self, ty: SymbolId) -> SymbolId {
        let mut current = ty;
        while let Some(info) = self.type_info(current) {
            match info.original_definition {
                Some(original) if original != current => current = original,
                _ => break,
            }
        }
        current
    }

    /// Whether `ty` is `target`, derives from it, or implements it
    /// (transitively, through base classes and base interfaces).
    pub fn is_derived_or_implements(&self, ty: SymbolId, target: SymbolId) -> bool {
        let mut seen = HashSet::new();
        self.derivation_reaches(ty, target, &mut seen)
    }

    fn derivation_reaches(
        &self,
        ty: SymbolId,
        target: SymbolId,
        seen: &mut HashSet<SymbolId>,
    ) -> bool {
        if ty == target {
            return true;
        }
        if !seen.insert(ty) {
            return false;
        }
        let Some(info) = self.type_info(ty) else {
            return false;
        };
        if let Some(base) = info.base
            && self.derivation_reaches(base, target, seen)
        {
            return true;
        }
        info.interfaces
            .iter()
            .any(|&iface| self.derivation_reaches(iface, target, seen))
    }

    /// The type a symbol's value has at a use site: declared type for
    /// properties, fields, locals, and parameters; return type for methods.
    pub fn value_type_of(&self, sym: SymbolId) -> Option<SymbolId> {
        match &self.symbols[sym].kind {
            SymbolKind::Type(_) => Some(sym),
            SymbolKind::Method(info) => info.return_type,
            SymbolKind::Property { value_type }
            | SymbolKind::Field { value_type }
            | SymbolKind::Local { value_type }
            | SymbolKind::Parameter { value_type } => *value_type,
        }
    }

    pub fn method_info(&self, sym: SymbolId) -> Option<&MethodInfo> {
        match &self.symbols[sym].kind {
            SymbolKind::Method(info) => Some(info),
            _ => None,
        }
    }

    pub fn is_property(&self, sym: SymbolId) -> bool {
        matches!(self.symbols[sym].kind, SymbolKind::Property { .. })
    }

    pub fn is_method(&self, sym: SymbolId) -> bool {
        matches!(self.symbols[sym].kind, SymbolKind::Method(_))
    }
}

/// Host-side builder for the program symbol table.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    symbols: Arena<Symbol>,
    types_by_name: HashMap<String, SymbolId>,
    referenced_assemblies: HashSet<String>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference_assembly(&mut self, name: impl Into<String>) -> &mut Self {
        self.referenced_assemblies.insert(name.into());
        self
    }

    /// Declare a type by stable qualified name. The short name is the last
    /// dotted segment.
    pub fn ty(&mut self, qualified: &str) -> SymbolId {
        let short = qualified.rsplit('.').next().unwrap_or(qualified);
        let id = self.symbols.alloc(Symbol {
            name: short.to_string(),
            kind: SymbolKind::Type(TypeInfo {
                qualified_name: qualified.to_string(),
                base: None,
                interfaces: Vec::new(),
                members: Vec::new(),
                original_definition: None,
            }),
        });
        self.types_by_name.insert(qualified.to_string(), id);
        id
    }

    fn type_info_mut(&mut self, ty: SymbolId) -> &mut TypeInfo {
        match &mut self.symbols[ty].kind {
            SymbolKind::Type(info) => info,
            _ => unreachable!("symbol is not a type"),
        }
    }

    pub fn set_base(&mut self, ty: SymbolId, base: SymbolId) {
        self.type_info_mut(ty).base = Some(base);
    }

    pub fn add_interface(&mut self, ty: SymbolId, iface: SymbolId) {
        self.type_info_mut(ty).interfaces.push(iface);
    }

    pub fn set_original_definition(&mut self, ty: SymbolId, original: SymbolId) {
        self.type_info_mut(ty).original_definition = Some(original);
    }

    fn add_member(&mut self, ty: SymbolId, member: SymbolId) -> SymbolId {
        self.type_info_mut(ty).members.push(member);
        member
    }

    pub fn method(
        &mut self,
        ty: SymbolId,
        name: &str,
        is_async: bool,
        return_type: Option<SymbolId>,
    ) -> SymbolId {
        let id = self.symbols.alloc(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Method(MethodInfo {
                is_async,
                return_type,
            }),
        });
        self.add_member(ty, id)
    }

    pub fn property(&mut self, ty: SymbolId, name: &str, value_type: Option<SymbolId>) -> SymbolId {
        let id = self.symbols.alloc(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Property { value_type },
        });
        self.add_member(ty, id)
    }

    pub fn field(&mut self, ty: SymbolId, name: &str, value_type: Option<SymbolId>) -> SymbolId {
        let id = self.symbols.alloc(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Field { value_type },
        });
        self.add_member(ty, id)
    }

    pub fn local(&mut self, name: &str, value_type: Option<SymbolId>) -> SymbolId {
        self.symbols.alloc(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Local { value_type },
        })
    }

    pub fn parameter(&mut self, name: &str, value_type: Option<SymbolId>) -> SymbolId {
        self.symbols.alloc(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Parameter { value_type },
        })
    }

    /// Free-standing method symbol, e.g. a local routine.
    pub fn free_method(&mut self, name: &str, is_async: bool, return_type: Option<SymbolId>) -> SymbolId {
        self.symbols.alloc(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Method(MethodInfo {
                is_async,
                return_type,
            }),
        })
    }

    pub fn finish(self) -> Program {
        Program {
            symbols: self.symbols,
            types_by_name: self.types_by_name,
            referenced_assemblies: self.referenced_assemblies,
        }
    }
}

/// Per-unit node → symbol oracle supplied by the host.
///
/// Queried on demand; the engine never caches resolutions beyond a single
/// rule pass. Unresolved nodes are simply absent (ambiguous-shape handling:
/// a structural match with no binding is treated as non-matching).
#[derive(Debug, Default)]
pub struct SemanticModel {
    bindings: HashMap<NodeId, SymbolId>,
    declarations: HashMap<SymbolId, NodeId>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, node: NodeId, symbol: SymbolId) {
        self.bindings.insert(node, symbol);
    }

    /// Record `node` as the declaration site of `symbol` (also binds it).
    pub fn declare(&mut self, symbol: SymbolId, node: NodeId) {
        self.declarations.insert(symbol, node);
        self.bindings.insert(node, symbol);
    }

    pub fn resolve(&self, node: NodeId) -> Option<SymbolId> {
        self.bindings.get(&node).copied()
    }

    pub fn declaration_of(&self, symbol: SymbolId) -> Option<NodeId> {
        self.declarations.get(&symbol).copied()
    }
}
