//! Frame layouts
//!
//! Immutable slot descriptions produced by sealing a [`ScopeArena`]. A layout
//! knows the layouts of its lexical ancestors by depth, so a closure can reach
//! the frame a `ReadLocal { depth, .. }` refers to without re-resolving names.
//!
//! [`ScopeArena`]: super::ScopeArena

use super::{InvalidationToken, ScopeKind};
use std::fmt;

/// Index of a layout inside its [`LayoutTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutId(pub u32);

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame{}", self.0)
    }
}

/// Compile-time description of one frame
#[derive(Debug, Clone)]
pub struct FrameLayout {
    /// This layout's id
    pub id: LayoutId,
    /// Kind of scope the frame belongs to
    pub kind: ScopeKind,
    /// Slot names, indexed by slot
    pub slots: Vec<String>,
    /// Layouts of lexical ancestors; `ancestors[0]` is the parent
    pub ancestors: Vec<LayoutId>,
    /// Token invalidated when a variable is added to the frame at run time
    pub invalidation: InvalidationToken,
}

impl FrameLayout {
    /// Number of slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot of `name` in this frame only
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot == name)
    }

    /// Parent layout, if any
    pub fn parent(&self) -> Option<LayoutId> {
        self.ancestors.first().copied()
    }
}

/// All layouts of one lowered unit
#[derive(Debug, Clone, Default)]
pub struct LayoutTable {
    layouts: Vec<FrameLayout>,
}

impl LayoutTable {
    pub(super) fn new(layouts: Vec<FrameLayout>) -> Self {
        Self { layouts }
    }

    /// Look up a layout
    pub fn get(&self, id: LayoutId) -> Option<&FrameLayout> {
        self.layouts.get(id.0 as usize)
    }

    /// Layout reached by walking `depth` frames outward from `id`
    pub fn ancestor(&self, id: LayoutId, depth: usize) -> Option<&FrameLayout> {
        let layout = self.get(id)?;
        if depth == 0 {
            return Some(layout);
        }
        let target = *layout.ancestors.get(depth - 1)?;
        self.get(target)
    }

    /// Name stored at `(slot, depth)` as seen from `id`
    pub fn slot_name(&self, id: LayoutId, slot: usize, depth: usize) -> Option<&str> {
        self.ancestor(id, depth)
            .and_then(|layout| layout.slots.get(slot))
            .map(String::as_str)
    }

    /// Number of layouts
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Whether the table holds no layout
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Iterate over all layouts
    pub fn iter(&self) -> impl Iterator<Item = &FrameLayout> {
        self.layouts.iter()
    }
}
