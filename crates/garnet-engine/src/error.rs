//! Translation errors

use crate::scope::ScopeError;
use thiserror::Error;

/// Result type for the lowering pass
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors raised while lowering a syntax tree
///
/// `Syntax` is meant for the end user. `Internal` marks a defect in the
/// translator, or a broken grammar invariant, and must not be shown as if the
/// user's program were at fault.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// User-facing syntax or semantic error
    #[error("{source_name}:{line}: {message}")]
    Syntax {
        /// Human-readable message
        message: String,
        /// Kind of the offending syntax node
        kind: &'static str,
        /// Source text of the offending node
        snippet: String,
        /// Byte offset of the offending node
        offset: usize,
        /// 1-based line of the offending node
        line: u32,
        /// Name of the source being lowered
        source_name: String,
    },

    /// Translator defect
    #[error("Internal translator error: {message} ({context})")]
    Internal {
        /// What went wrong
        message: String,
        /// Where it went wrong
        context: String,
    },

    /// Lowering was cancelled at a statement boundary
    #[error("Translation cancelled at {source_name}:{line}")]
    Cancelled {
        /// Name of the source being lowered
        source_name: String,
        /// Line of the statement boundary that observed the request
        line: u32,
    },

    /// Scope resolution failure
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl TranslateError {
    /// Build an internal error
    pub fn internal(message: impl Into<String>, context: impl Into<String>) -> Self {
        TranslateError::Internal {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Whether the error signals a translator defect rather than bad user input
    pub fn is_internal(&self) -> bool {
        matches!(self, TranslateError::Internal { .. } | TranslateError::Scope(_))
    }

    /// Whether the error should be shown to the end user as a syntax error
    pub fn is_user_facing(&self) -> bool {
        matches!(self, TranslateError::Syntax { .. })
    }
}
