//! Lazy Compilation Gate
//!
//! Decides whether a method body is lowered together with its definition or
//! on first demand, and holds the memoized result.

use crate::config::TranslatorOptions;
use crate::context::TranslationContext;
use crate::error::{TranslateError, TranslateResult};
use crate::lower::LoweredBody;
use log::debug;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// When method bodies are lowered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoweringPolicy {
    /// Together with the enclosing definition
    Eager,
    /// On first demand
    Lazy,
}

/// Pick the lowering policy for method bodies of a unit
pub fn lowering_policy(context: &TranslationContext, options: &TranslatorOptions) -> LoweringPolicy {
    if should_lower_lazily(context, options) {
        LoweringPolicy::Lazy
    } else {
        LoweringPolicy::Eager
    }
}

/// Whether method bodies of this unit may be deferred
///
/// Eval-like units and coverage runs are always eager: coverage must see every
/// line up front, and eval code runs once right away.
pub fn should_lower_lazily(context: &TranslationContext, options: &TranslatorOptions) -> bool {
    if context.parser_context().is_eval_like() || context.is_coverage_enabled() {
        return false;
    }
    if context.is_core() {
        options.lazy_translation_core
    } else {
        options.lazy_translation_user
    }
}

type BodySupplier = Box<dyn Fn() -> TranslateResult<LoweredBody> + Send + Sync>;

/// A method body lowered at most once
///
/// Concurrent first callers block until the single lowering finishes; nobody
/// observes a partially built body.
pub struct LazyBody {
    cell: OnceCell<Arc<LoweredBody>>,
    supplier: Option<BodySupplier>,
    lowerings: AtomicUsize,
}

impl LazyBody {
    /// A body lowered already
    pub fn ready(body: LoweredBody) -> Self {
        Self {
            cell: OnceCell::with_value(Arc::new(body)),
            supplier: None,
            lowerings: AtomicUsize::new(0),
        }
    }

    /// A body lowered by `supplier` on first [`get`](LazyBody::get)
    pub fn deferred(
        supplier: impl Fn() -> TranslateResult<LoweredBody> + Send + Sync + 'static,
    ) -> Self {
        Self {
            cell: OnceCell::new(),
            supplier: Some(Box::new(supplier)),
            lowerings: AtomicUsize::new(0),
        }
    }

    /// The lowered body, lowering it now if needed
    ///
    /// A failed lowering is not memoized; the next call tries again.
    pub fn get(&self) -> TranslateResult<Arc<LoweredBody>> {
        self.cell
            .get_or_try_init(|| {
                let supplier = self.supplier.as_ref().ok_or_else(|| {
                    TranslateError::internal("lazy body has neither value nor supplier", "LazyBody::get")
                })?;
                self.lowerings.fetch_add(1, Ordering::SeqCst);
                debug!("lowering deferred method body");
                supplier().map(Arc::new)
            })
            .map(Arc::clone)
    }

    /// Whether the body exists already
    pub fn is_lowered(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Whether the body was created deferred
    pub fn is_lazy(&self) -> bool {
        self.supplier.is_some()
    }

    /// How many times the supplier ran
    pub fn lowering_count(&self) -> usize {
        self.lowerings.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for LazyBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBody")
            .field("lazy", &self.is_lazy())
            .field("lowered", &self.is_lowered())
            .finish()
    }
}
