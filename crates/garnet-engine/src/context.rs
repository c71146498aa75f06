//! Translation unit context
//!
//! Read-only facts about the unit being lowered. Built before lowering starts
//! and never mutated while it runs.

use crate::config::TranslatorOptions;
use crate::syntax::{Source, SourceEncoding};
use std::sync::Arc;

/// Where the unit comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserContext {
    /// A file loaded or required as a whole
    TopLevel,
    /// A string passed to `eval`, with the local names visible from its binding,
    /// outermost frame first
    Eval {
        /// Local names of each enclosing frame
        binding: Vec<Vec<String>>,
    },
    /// Source lowered inline, e.g. by `instance_eval` with a string
    Inline,
}

impl ParserContext {
    /// Eval and inline units are always lowered eagerly
    pub fn is_eval_like(&self) -> bool {
        matches!(self, ParserContext::Eval { .. } | ParserContext::Inline)
    }
}

/// Everything the translator needs to know about the unit
#[derive(Debug, Clone)]
pub struct TranslationContext {
    source: Arc<Source>,
    core: bool,
    parser_context: ParserContext,
    coverage_enabled: bool,
}

impl TranslationContext {
    /// Context for a top-level user source
    pub fn new(source: Source) -> Self {
        Self {
            source: Arc::new(source),
            core: false,
            parser_context: ParserContext::TopLevel,
            coverage_enabled: false,
        }
    }

    /// Mark the source as trusted core library code
    pub fn with_core(mut self, core: bool) -> Self {
        self.core = core;
        self
    }

    /// Treat the source as core code when its name lies under the core load path
    pub fn with_core_detection(mut self, options: &TranslatorOptions) -> Self {
        self.core = self.core || options.is_core_path(self.source.name());
        self
    }

    /// Set the parser context
    pub fn with_parser_context(mut self, parser_context: ParserContext) -> Self {
        self.parser_context = parser_context;
        self
    }

    /// Enable line coverage instrumentation
    pub fn with_coverage(mut self, enabled: bool) -> Self {
        self.coverage_enabled = enabled;
        self
    }

    /// The source being lowered
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Declared encoding of the source
    pub fn encoding(&self) -> SourceEncoding {
        self.source.encoding()
    }

    /// Whether core lowering rules apply
    pub fn is_core(&self) -> bool {
        self.core
    }

    /// Where the unit comes from
    pub fn parser_context(&self) -> &ParserContext {
        &self.parser_context
    }

    /// Whether line coverage is being collected
    pub fn is_coverage_enabled(&self) -> bool {
        self.coverage_enabled
    }
}
