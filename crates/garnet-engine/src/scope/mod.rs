//! Scope Environment
//!
//! Lexical scopes of one lowering, stored in an arena and linked by parent
//! indices. A scope maps names to slots in declaration order. Slots are never
//! reused, and declaring a name twice in the same scope returns the slot it
//! already has.
//!
//! Once lowering of a unit finishes, the arena is sealed into a
//! [`LayoutTable`] of immutable frame layouts.

mod invalidation;
mod layout;

pub use invalidation::InvalidationToken;
pub use layout::{FrameLayout, LayoutId, LayoutTable};

use log::trace;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

/// Prefix of every synthesized local name; never valid in user identifiers
pub const TEMP_PREFIX: &str = "%";

/// Slot holding `self` in every frame root and block
pub const SELF_NAME: &str = "%self";

/// Slot saving the block passed to a method
pub const METHOD_BLOCK_NAME: &str = "%method_block";

/// Local bound by an anonymous `*`
pub const DEFAULT_REST_NAME: &str = "%rest";

/// Local bound by an anonymous `**`
pub const DEFAULT_KEYWORD_REST_NAME: &str = "%kwrest";

/// Local bound to the positional arguments captured by `...`
pub const FORWARDED_REST_NAME: &str = "%forward_rest";

/// Local bound to the keyword arguments captured by `...`
pub const FORWARDED_KEYWORD_REST_NAME: &str = "%forward_kwrest";

/// Local bound to the block captured by `...`
pub const FORWARDED_BLOCK_NAME: &str = "%forward_block";

/// Result type for scope operations
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Scope resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// No scope in the chain declares the name
    #[error("Unresolved variable: {name}")]
    UnresolvedVariable {
        /// Name that was looked up
        name: String,
    },
}

/// Index of a scope inside its [`ScopeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope{}", self.0)
    }
}

/// What introduced a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// File body
    TopLevel,
    /// Method body
    Method,
    /// Class or module body
    Module,
    /// Block, lambda or `for` body
    Block,
    /// Frame captured by a binding that an `eval` runs against
    Binding,
    /// Body of an `eval`
    Eval,
}

impl ScopeKind {
    /// Closure-like scopes see their parents' locals and share their token
    pub fn is_closure(&self) -> bool {
        matches!(self, ScopeKind::Block | ScopeKind::Eval)
    }
}

/// One lexical scope
#[derive(Debug)]
pub struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    slots: FxHashMap<String, usize>,
    names: Vec<String>,
    /// Writes to undeclared names land here instead of in an ancestor
    own_scope_for_assignments: bool,
    temp_counter: u32,
    repeated_parameter_counter: u32,
    invalidation: InvalidationToken,
    /// Depth-indexed chain of enclosing scopes; `ancestors[0]` is the parent
    ancestors: Vec<ScopeId>,
}

impl Scope {
    /// Kind of the scope
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Enclosing scope
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Declared names, indexed by slot
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Slot of `name` in this scope only
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Whether undeclared writes are declared in this scope
    pub fn owns_assignments(&self) -> bool {
        self.own_scope_for_assignments
    }

    /// Token shared with the nearest frame root
    pub fn invalidation(&self) -> &InvalidationToken {
        &self.invalidation
    }

    /// Scope at `depth` frames outward; depth 0 is this scope
    pub fn ancestor_at(&self, depth: usize) -> Option<ScopeId> {
        if depth == 0 {
            None
        } else {
            self.ancestors.get(depth - 1).copied()
        }
    }
}

/// Arena owning every scope of one lowering
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root scope with its own invalidation token
    pub fn root(&mut self, kind: ScopeKind) -> ScopeId {
        self.push(Scope {
            kind,
            parent: None,
            slots: FxHashMap::default(),
            names: Vec::new(),
            own_scope_for_assignments: true,
            temp_counter: 0,
            repeated_parameter_counter: 2,
            invalidation: InvalidationToken::new(),
            ancestors: Vec::new(),
        })
    }

    /// Create a scope nested in `parent`
    ///
    /// Closure scopes share the parent's invalidation token; other kinds get
    /// a token of their own.
    pub fn child_scope(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        own_scope_for_assignments: bool,
    ) -> ScopeId {
        let parent_scope = self.get(parent);
        let invalidation = if kind.is_closure() {
            parent_scope.invalidation.clone()
        } else {
            InvalidationToken::new()
        };
        let mut ancestors = Vec::with_capacity(parent_scope.ancestors.len() + 1);
        ancestors.push(parent);
        ancestors.extend_from_slice(&parent_scope.ancestors);

        self.push(Scope {
            kind,
            parent: Some(parent),
            slots: FxHashMap::default(),
            names: Vec::new(),
            own_scope_for_assignments,
            temp_counter: 0,
            repeated_parameter_counter: 2,
            invalidation,
            ancestors,
        })
    }

    fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    /// Borrow a scope
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    /// Number of scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope was created yet
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Declare `name` in `scope`, returning its slot
    ///
    /// A name already declared in the same scope keeps its slot.
    pub fn declare(&mut self, scope: ScopeId, name: &str) -> usize {
        let entry = self.get_mut(scope);
        if let Some(&slot) = entry.slots.get(name) {
            return slot;
        }
        let slot = entry.names.len();
        entry.names.push(name.to_string());
        entry.slots.insert(name.to_string(), slot);
        trace!("declared {} at slot {} in {}", name, slot, scope);
        slot
    }

    /// Find `name` walking outward; returns `(slot, depth)`
    pub fn find(&self, scope: ScopeId, name: &str) -> Option<(usize, usize)> {
        let mut current = Some(scope);
        let mut depth = 0;
        while let Some(id) = current {
            let entry = self.get(id);
            if let Some(slot) = entry.slot_of(name) {
                return Some((slot, depth));
            }
            current = entry.parent;
            depth += 1;
        }
        None
    }

    /// Resolve a name every caller must have declared beforehand
    pub fn resolve(&self, scope: ScopeId, name: &str) -> ScopeResult<(usize, usize)> {
        self.find(scope, name)
            .ok_or_else(|| ScopeError::UnresolvedVariable {
                name: name.to_string(),
            })
    }

    /// Declare `name` in the nearest scope owning assignments, unless already visible
    ///
    /// Returns `(slot, depth)` as seen from `scope`.
    pub fn declare_for_assignment(&mut self, scope: ScopeId, name: &str) -> (usize, usize) {
        if let Some(found) = self.find(scope, name) {
            return found;
        }
        let mut target = scope;
        let mut depth = 0;
        while !self.get(target).own_scope_for_assignments {
            match self.get(target).parent {
                Some(parent) => {
                    target = parent;
                    depth += 1;
                }
                None => break,
            }
        }
        (self.declare(target, name), depth)
    }

    /// Mint a fresh temporary name in `scope` and declare it; returns the name and its slot
    pub fn allocate_temp(&mut self, scope: ScopeId, basename: &str) -> (String, usize) {
        let entry = self.get_mut(scope);
        let name = format!("{}temp_{}_{}", TEMP_PREFIX, basename, entry.temp_counter);
        entry.temp_counter += 1;
        let slot = self.declare(scope, &name);
        (name, slot)
    }

    /// Mint the name of a repeated placeholder parameter (`%_2`, `%_3`, ...) and declare it
    pub fn allocate_repeated_parameter(&mut self, scope: ScopeId, basename: &str) -> String {
        let entry = self.get_mut(scope);
        let name = format!("{}{}{}", TEMP_PREFIX, basename, entry.repeated_parameter_counter);
        entry.repeated_parameter_counter += 1;
        self.declare(scope, &name);
        name
    }

    /// Seal every scope into an immutable layout table
    ///
    /// Layout ids equal scope ids.
    pub fn seal(self) -> LayoutTable {
        let layouts = self
            .scopes
            .into_iter()
            .enumerate()
            .map(|(index, scope)| FrameLayout {
                id: LayoutId(index as u32),
                kind: scope.kind,
                slots: scope.names,
                ancestors: scope.ancestors.iter().map(|a| LayoutId(a.0)).collect(),
                invalidation: scope.invalidation,
            })
            .collect();
        LayoutTable::new(layouts)
    }
}

/// Layout id a scope will have once its arena is sealed
pub fn layout_of(scope: ScopeId) -> LayoutId {
    LayoutId(scope.0)
}
