//! Garnet Language Engine
//!
//! This crate provides the lowering stage of the Garnet front end: it takes
//! the parser's syntax tree and produces a tree of executable nodes with
//! every local variable resolved to a frame slot.
//!
//! - **Syntax**: the read-only input tree and its source buffer (`syntax` module)
//! - **Scopes**: the arena of lexical scopes and the frame layouts they seal into (`scope` module)
//! - **Lowering**: the visitor producing executable nodes (`lower` module)
//! - **Nodes**: the executable node tree and its printer (`nodes` module)
//! - **Lazy bodies**: deferred, at-most-once lowering of method bodies (`lazy` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use garnet_engine::{PrettyPrint, Source, SyntaxNode, TranslationContext, Translator, TranslatorOptions};
//!
//! let tree = SyntaxNode::from_json(&json)?;
//! let context = TranslationContext::new(Source::new("main.gt", text));
//! let body = Translator::new(TranslatorOptions::default()).translate(context, &tree)?;
//! println!("{}", body.pretty_print());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

// ============================================================================
// Core Modules
// ============================================================================

/// Syntax tree handed over by the parser
pub mod syntax;

/// Executable nodes
pub mod nodes;

/// Lexical scopes and frame layouts
pub mod scope;

/// Syntax tree lowering
pub mod lower;

/// Deferred lowering of method bodies
pub mod lazy;

// ============================================================================
// Support Modules
// ============================================================================

/// Identifier classification
pub mod identifiers;

/// Per-unit translation context
pub mod context;

/// Translator options
pub mod config;

/// Line coverage table
pub mod coverage;

/// Cooperative cancellation
pub mod interrupt;

/// Translation errors
pub mod error;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ConfigError, TranslatorOptions};
pub use context::{ParserContext, TranslationContext};
pub use coverage::CoverageManager;
pub use error::{TranslateError, TranslateResult};
pub use identifiers::{classify, is_constant_name, is_valid_constant_path, IdentifierType};
pub use interrupt::Interrupt;
pub use lazy::{LazyBody, LoweringPolicy};
pub use lower::{LoweredBody, Translator};
pub use nodes::{Kind, Node, PrettyPrint};
pub use scope::{LayoutId, LayoutTable, ScopeArena, ScopeKind};
pub use syntax::{Location, Parameters, Source, SyntaxNode};
