//! Syntax Tree to Executable Node Lowering
//!
//! Walks the parser's syntax tree once and produces executable nodes with
//! every local variable resolved to a `(slot, depth)` pair. One [`Lowerer`]
//! handles one frame root (a file, a method body or a module body) together
//! with all the blocks nested in it; method and module bodies get a lowerer
//! of their own.

mod control_flow;
mod definitions;
mod destructure;
mod expr;
mod params;
mod pattern;
mod reload;
mod sequence;

pub use sequence::sequence;

use crate::config::TranslatorOptions;
use crate::context::{ParserContext, TranslationContext};
use crate::coverage::CoverageManager;
use crate::error::{TranslateError, TranslateResult};
use crate::interrupt::Interrupt;
use crate::nodes::{BreakId, Kind, Node, ProcKind, SourceRange};
use crate::scope::{layout_of, LayoutId, LayoutTable, ScopeArena, ScopeId, ScopeKind, SELF_NAME};
use crate::syntax::{NodeKind, Parameters, SyntaxNode};
use log::debug;
use params::ParameterNames;
use std::sync::Arc;

/// Output of lowering one frame root
#[derive(Debug)]
pub struct LoweredBody {
    /// Executable tree
    pub root: Node,
    /// Layouts of the root frame and every block nested in it
    pub layouts: Arc<LayoutTable>,
    /// Layout of the root frame
    pub layout: LayoutId,
}

/// Shared, read-only state of one translation, cheap to clone into lazy bodies
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub context: Arc<TranslationContext>,
    pub options: Arc<TranslatorOptions>,
    pub coverage: Arc<CoverageManager>,
    pub interrupt: Interrupt,
}

/// Enclosing method, kept for bare `super`
#[derive(Debug, Clone)]
struct MethodFrame {
    parameters: Parameters,
    names: ParameterNames,
}

/// Lowering state of one frame root
pub(crate) struct Lowerer {
    session: Session,
    arena: ScopeArena,
    /// Scope whose body the result belongs to
    body_scope: ScopeId,
    /// Scope currently being lowered
    scope: ScopeId,
    /// Set while lowering a method body and its blocks
    method: Option<MethodFrame>,
    /// Enclosing loops of the current block or frame, innermost last
    loops: Vec<BreakId>,
    /// Break id of the block being lowered
    block_break: Option<BreakId>,
    next_break_id: u32,
    /// Lowering the value of a `next`
    translating_next: bool,
    /// Lowering a `rescue` handler, where `retry` is valid
    in_rescue: bool,
    /// Constants resolve against a lexical scope only known at run time
    dynamic_constants: bool,
}

impl Lowerer {
    /// Lowerer for a fresh frame root of `kind`
    pub(crate) fn new(session: Session, kind: ScopeKind, dynamic_constants: bool) -> Self {
        let mut arena = ScopeArena::new();
        let root = arena.root(kind);
        Self::with_arena(session, arena, root, dynamic_constants)
    }

    /// Lowerer for `eval` code running against a binding
    ///
    /// `binding` lists the local names of each enclosing frame, outermost
    /// first; they become ancestor scopes of the eval body.
    pub(crate) fn for_eval(session: Session, binding: &[Vec<String>]) -> Self {
        let mut arena = ScopeArena::new();
        let mut scope: Option<ScopeId> = None;
        for names in binding {
            let frame = match scope {
                None => arena.root(ScopeKind::Binding),
                Some(parent) => arena.child_scope(parent, ScopeKind::Block, true),
            };
            for name in names {
                arena.declare(frame, name);
            }
            scope = Some(frame);
        }
        let body = match scope {
            Some(parent) => arena.child_scope(parent, ScopeKind::Eval, true),
            None => arena.root(ScopeKind::Eval),
        };
        Self::with_arena(session, arena, body, true)
    }

    fn with_arena(
        session: Session,
        arena: ScopeArena,
        body_scope: ScopeId,
        dynamic_constants: bool,
    ) -> Self {
        Self {
            session,
            arena,
            body_scope,
            scope: body_scope,
            method: None,
            loops: Vec::new(),
            block_break: None,
            next_break_id: 0,
            translating_next: false,
            in_rescue: false,
            dynamic_constants,
        }
    }

    /// Seal the scopes and package the result
    pub(crate) fn finish(self, root: Node) -> LoweredBody {
        LoweredBody {
            root,
            layout: layout_of(self.body_scope),
            layouts: Arc::new(self.arena.seal()),
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Lower one syntax node, applying position and statement-boundary rules
    pub(crate) fn lower_node(&mut self, syntax: &SyntaxNode) -> TranslateResult<Node> {
        if syntax.newline && self.session.interrupt.poll() {
            return Err(TranslateError::Cancelled {
                source_name: self.source_name().to_string(),
                line: self.line_of(syntax),
            });
        }

        let mut node = self.dispatch(syntax)?;
        if !node.has_source() {
            if let Some(range) = range_of(syntax) {
                node.set_range(range);
            }
        }
        if syntax.newline {
            self.mark_statement(syntax, &mut node);
        }
        Ok(node)
    }

    fn dispatch(&mut self, syntax: &SyntaxNode) -> TranslateResult<Node> {
        match &syntax.kind {
            NodeKind::Program { locals, statements } => {
                self.declare_locals(locals);
                self.lower_node(statements)
            }
            NodeKind::Statements { body } => self.lower_statements(syntax, body),
            NodeKind::Parentheses { body } => match body {
                Some(body) => self.lower_node(body),
                None => Ok(Node::nil()),
            },
            NodeKind::Begin {
                statements,
                rescue_clause,
                else_clause,
                ensure,
            } => self.lower_begin(
                syntax,
                statements.as_deref(),
                rescue_clause.as_deref(),
                else_clause.as_deref(),
                ensure.as_deref(),
            ),
            NodeKind::RescueModifier {
                expression,
                rescue_expression,
            } => self.lower_rescue_modifier(expression, rescue_expression),
            NodeKind::Retry => self.lower_retry(syntax),
            NodeKind::PostExecution { statements } => self.lower_post_execution(statements.as_deref()),

            NodeKind::Nil => Ok(Node::nil()),
            NodeKind::True => Ok(Node::new(Kind::Boolean(true))),
            NodeKind::False => Ok(Node::new(Kind::Boolean(false))),
            NodeKind::SelfRef => Ok(self.self_node()),
            NodeKind::Integer { value } => self.lower_integer(syntax, value),
            NodeKind::Float { value } => Ok(Node::new(Kind::Float(*value))),
            NodeKind::String { value } => Ok(Node::new(Kind::String(value.clone()))),
            NodeKind::Symbol { value } => Ok(Node::symbol(value.clone())),
            NodeKind::InterpolatedString { parts } => {
                let parts = self.lower_all(parts)?;
                Ok(Node::new(Kind::Interpolation(parts)))
            }
            NodeKind::InterpolatedSymbol { parts } => {
                let parts = self.lower_all(parts)?;
                Ok(Node::call(Node::new(Kind::Interpolation(parts)), "to_sym", Vec::new()))
            }
            NodeKind::XString { value } => Ok(self.lower_backtick(Node::new(Kind::String(value.clone())))),
            NodeKind::InterpolatedXString { parts } => {
                let parts = self.lower_all(parts)?;
                Ok(self.lower_backtick(Node::new(Kind::Interpolation(parts))))
            }
            NodeKind::EmbeddedStatements { statements } => self.lower_or_nil(statements.as_deref()),
            NodeKind::Array { elements } => {
                let elements = self.lower_all(elements)?;
                Ok(Node::new(Kind::Array(elements)))
            }
            NodeKind::Hash { elements } | NodeKind::KeywordHash { elements } => {
                self.lower_hash(elements)
            }
            NodeKind::Range {
                left,
                right,
                exclusive,
            } => {
                let from = self.lower_or_nil(left.as_deref())?;
                let to = self.lower_or_nil(right.as_deref())?;
                Ok(Node::new(Kind::Range {
                    from: Box::new(from),
                    to: Box::new(to),
                    exclusive: *exclusive,
                }))
            }
            NodeKind::Splat { expression } => self.lower_splat(syntax, expression.as_deref()),

            NodeKind::LocalVariableRead { name } => self.read_local(name),
            NodeKind::LocalVariableWrite { name, value } => self.lower_local_write(name, value),
            NodeKind::LocalVariableOperatorWrite {
                name,
                operator,
                value,
            } => self.lower_local_operator_write(name, operator, value),
            NodeKind::LocalVariableOrWrite { name, value } => {
                self.lower_local_logical_write(name, value, false)
            }
            NodeKind::LocalVariableAndWrite { name, value } => {
                self.lower_local_logical_write(name, value, true)
            }
            NodeKind::InstanceVariableRead { name } => {
                Ok(Node::new(Kind::ReadInstanceVariable(name.clone())))
            }
            NodeKind::InstanceVariableWrite { name, value } => {
                let value = self.lower_node(value)?;
                Ok(Node::new(Kind::WriteInstanceVariable {
                    name: name.clone(),
                    value: Box::new(value),
                }))
            }
            NodeKind::InstanceVariableOperatorWrite {
                name,
                operator,
                value,
            } => self.lower_instance_variable_operator_write(name, operator, value),
            NodeKind::ClassVariableRead { name } => {
                Ok(Node::new(Kind::ReadClassVariable(name.clone())))
            }
            NodeKind::ClassVariableWrite { name, value } => {
                let value = self.lower_node(value)?;
                Ok(Node::new(Kind::WriteClassVariable {
                    name: name.clone(),
                    value: Box::new(value),
                }))
            }
            NodeKind::GlobalVariableRead { name } | NodeKind::BackReferenceRead { name } => {
                Ok(Node::new(Kind::ReadGlobal(name.clone())))
            }
            NodeKind::NumberedReferenceRead { number } => Ok(self.lower_numbered_reference(*number)),
            NodeKind::GlobalVariableWrite { name, value } => {
                let value = self.lower_node(value)?;
                Ok(Node::new(Kind::WriteGlobal {
                    name: name.clone(),
                    value: Box::new(value),
                }))
            }
            NodeKind::ConstantRead { name } => Ok(self.read_lexical_constant(syntax, name)),
            NodeKind::ConstantWrite { name, value } => {
                let value = self.lower_node(value)?;
                Ok(Node::new(Kind::WriteConstant {
                    scope: self.lexical_constant_scope(),
                    name: name.clone(),
                    value: Box::new(value),
                }))
            }
            NodeKind::ConstantPath { parent, name } => {
                let scope = self.constant_path_scope(parent.as_deref())?;
                Ok(Node::new(Kind::ReadConstant {
                    scope,
                    name: name.clone(),
                }))
            }
            NodeKind::ConstantPathWrite { target, value } => {
                self.lower_constant_path_write(target, value)
            }

            NodeKind::Call {
                receiver,
                name,
                arguments,
                block,
                safe_navigation,
            } => self.lower_call(
                syntax,
                receiver.as_deref(),
                name,
                arguments.as_deref(),
                block.as_deref(),
                *safe_navigation,
            ),
            NodeKind::BlockArgument { expression } => {
                self.lower_block_pass(syntax, expression.as_deref())
            }
            NodeKind::IndexOperatorWrite {
                receiver,
                arguments,
                operator,
                value,
            } => self.lower_index_operator_write(
                syntax,
                receiver,
                arguments.as_deref(),
                operator,
                value,
            ),
            NodeKind::Yield { arguments } => self.lower_yield(syntax, arguments.as_deref()),
            NodeKind::Defined { value } => self.lower_defined(value),
            NodeKind::Alias { new_name, old_name } => self.lower_alias(syntax, new_name, old_name),
            NodeKind::Undef { names } => {
                let names = self.lower_all(names)?;
                Ok(Node::new(Kind::Undef(names)))
            }
            NodeKind::Super { arguments, block } => {
                self.lower_explicit_super(syntax, arguments.as_deref(), block.as_deref())
            }
            NodeKind::ForwardingSuper { block } => self.lower_forwarding_super(syntax, block.as_deref()),

            NodeKind::And { left, right } => {
                let left = self.lower_node(left)?;
                let right = self.lower_node(right)?;
                Ok(Node::and(left, right))
            }
            NodeKind::Or { left, right } => {
                let left = self.lower_node(left)?;
                let right = self.lower_node(right)?;
                Ok(Node::or(left, right))
            }
            NodeKind::Not { expression } => Ok(Node::not(self.lower_node(expression)?)),
            NodeKind::If {
                predicate,
                statements,
                subsequent,
            } => self.lower_if(syntax, predicate, statements.as_deref(), subsequent.as_deref(), false),
            NodeKind::Unless {
                predicate,
                statements,
                else_clause,
            } => self.lower_if(syntax, predicate, statements.as_deref(), else_clause.as_deref(), true),
            NodeKind::Else { statements } => self.lower_or_implicit_nil(statements.as_deref()),
            NodeKind::While {
                predicate,
                statements,
                do_while,
            } => self.lower_while(predicate, statements.as_deref(), *do_while, false),
            NodeKind::Until {
                predicate,
                statements,
                do_while,
            } => self.lower_while(predicate, statements.as_deref(), *do_while, true),
            NodeKind::For {
                index,
                collection,
                statements,
            } => self.lower_for(syntax, index, collection, statements.as_deref()),
            NodeKind::Break { arguments } => self.lower_break(syntax, arguments.as_deref()),
            NodeKind::Next { arguments } => self.lower_next(syntax, arguments.as_deref()),
            NodeKind::Redo => self.lower_redo(syntax),
            NodeKind::Return { arguments } => self.lower_return(arguments.as_deref()),
            NodeKind::Case {
                predicate,
                conditions,
                else_clause,
            } => self.lower_case(syntax, predicate.as_deref(), conditions, else_clause.as_deref()),
            NodeKind::CaseMatch {
                predicate,
                conditions,
                else_clause,
            } => self.lower_case_match(syntax, predicate, conditions, else_clause.as_deref()),
            NodeKind::MatchPredicate { value, pattern } => self.lower_match_predicate(value, pattern),
            NodeKind::MatchRequired { value, pattern } => self.lower_match_required(value, pattern),

            NodeKind::Def {
                name,
                receiver,
                parameters,
                body,
                locals,
            } => self.lower_def(
                syntax,
                name,
                receiver.as_deref(),
                parameters.as_deref(),
                body.as_deref(),
                locals,
            ),
            NodeKind::Lambda {
                parameters,
                body,
                locals,
            } => self.lower_block(
                syntax,
                parameters.as_deref(),
                body.as_deref(),
                locals,
                ProcKind::Lambda,
                false,
            ),
            NodeKind::Class {
                constant_path,
                superclass,
                body,
                locals,
            } => self.lower_module(
                syntax,
                constant_path,
                superclass.as_deref(),
                body.as_deref(),
                locals,
            ),
            NodeKind::Module {
                constant_path,
                body,
                locals,
            } => self.lower_module(syntax, constant_path, None, body.as_deref(), locals),

            NodeKind::MultiWrite {
                lefts,
                rest,
                rights,
                value,
            } => self.lower_multi_write(syntax, lefts, rest.as_deref(), rights, value),

            // Only meaningful inside a construct that lowers them itself
            NodeKind::Missing
            | NodeKind::Assoc { .. }
            | NodeKind::AssocSplat { .. }
            | NodeKind::LocalVariableTarget { .. }
            | NodeKind::InstanceVariableTarget { .. }
            | NodeKind::ClassVariableTarget { .. }
            | NodeKind::GlobalVariableTarget { .. }
            | NodeKind::ConstantTarget { .. }
            | NodeKind::Arguments { .. }
            | NodeKind::CallTarget { .. }
            | NodeKind::IndexTarget { .. }
            | NodeKind::When { .. }
            | NodeKind::Rescue { .. }
            | NodeKind::In { .. }
            | NodeKind::Block { .. }
            | NodeKind::RequiredParameter { .. }
            | NodeKind::OptionalParameter { .. }
            | NodeKind::RestParameter { .. }
            | NodeKind::RequiredKeywordParameter { .. }
            | NodeKind::OptionalKeywordParameter { .. }
            | NodeKind::KeywordRestParameter { .. }
            | NodeKind::NoKeywordsParameter
            | NodeKind::ForwardingParameter
            | NodeKind::BlockParameter { .. }
            | NodeKind::MultiTarget { .. }
            | NodeKind::ImplicitRest
            | NodeKind::ArrayPattern { .. }
            | NodeKind::HashPattern { .. }
            | NodeKind::FindPattern { .. }
            | NodeKind::AlternationPattern { .. }
            | NodeKind::CapturePattern { .. }
            | NodeKind::PinnedVariable { .. }
            | NodeKind::PinnedExpression { .. } => Err(self.default_visit(syntax)),
        }
    }

    /// Error for a node kind this position cannot translate
    pub(crate) fn default_visit(&self, syntax: &SyntaxNode) -> TranslateError {
        let message = format!(
            "Lowerer does not know how to translate {} at {}:{}\nCode snippet:\n{}\nAST:\n{}",
            syntax.kind_name(),
            self.source_name(),
            self.line_of(syntax),
            self.snippet(syntax),
            syntax
        );
        self.syntax_error(syntax, message)
    }

    /// User-facing error located at `syntax`
    pub(crate) fn syntax_error(&self, syntax: &SyntaxNode, message: impl Into<String>) -> TranslateError {
        TranslateError::Syntax {
            message: message.into(),
            kind: syntax.kind_name(),
            snippet: self.snippet(syntax).to_string(),
            offset: syntax.location.offset,
            line: self.line_of(syntax),
            source_name: self.source_name().to_string(),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    pub(crate) fn lower_all(&mut self, nodes: &[SyntaxNode]) -> TranslateResult<Vec<Node>> {
        nodes.iter().map(|node| self.lower_node(node)).collect()
    }

    /// Lower `syntax`, or produce a written `nil` when absent
    pub(crate) fn lower_or_nil(&mut self, syntax: Option<&SyntaxNode>) -> TranslateResult<Node> {
        match syntax {
            Some(syntax) => self.lower_node(syntax),
            None => Ok(Node::nil()),
        }
    }

    /// Lower `syntax`, or produce the "no expression" placeholder when absent
    pub(crate) fn lower_or_implicit_nil(&mut self, syntax: Option<&SyntaxNode>) -> TranslateResult<Node> {
        match syntax {
            Some(syntax) => self.lower_node(syntax),
            None => Ok(Node::implicit_nil()),
        }
    }

    fn lower_statements(&mut self, syntax: &SyntaxNode, body: &[SyntaxNode]) -> TranslateResult<Node> {
        let statements = self.lower_all(body)?;
        Ok(sequence(syntax.location, statements))
    }

    fn declare_locals(&mut self, locals: &[String]) {
        for name in locals {
            self.arena.declare(self.scope, name);
        }
    }

    fn mark_statement(&self, syntax: &SyntaxNode, node: &mut Node) {
        if self.session.context.is_coverage_enabled() {
            node.mark_coverage_line();
            self.session
                .coverage
                .set_line_has_code(self.source_name(), self.line_of(syntax));
        }
        node.mark_newline();
    }

    pub(crate) fn allocate_break_id(&mut self) -> BreakId {
        let id = BreakId(self.next_break_id);
        self.next_break_id += 1;
        id
    }

    /// Wrap an argument read in a profiling node when profiling is on
    pub(crate) fn profile(&self, node: Node) -> Node {
        if self.session.options.profile_arguments {
            Node::new(Kind::ProfileArgument(Box::new(node)))
        } else {
            node
        }
    }

    /// `self`, read from the frame when the scope stores it
    pub(crate) fn self_node(&self) -> Node {
        match self.arena.find(self.scope, SELF_NAME) {
            Some((slot, depth)) => Node::new(Kind::ReadLocal {
                name: SELF_NAME.to_string(),
                slot,
                depth,
            }),
            None => Node::new(Kind::SelfValue),
        }
    }

    /// Store the receiver in the frame's `self` slot
    pub(crate) fn self_prologue(&mut self) -> Node {
        let slot = self.arena.declare(self.scope, SELF_NAME);
        let value = self.profile(Node::new(Kind::SelfValue));
        Node::new(Kind::WriteLocal {
            name: SELF_NAME.to_string(),
            slot,
            depth: 0,
            value: Box::new(value),
        })
    }

    /// Read a local every path must have declared
    pub(crate) fn read_local(&self, name: &str) -> TranslateResult<Node> {
        let (slot, depth) = self.arena.resolve(self.scope, name)?;
        Ok(Node::new(Kind::ReadLocal {
            name: name.to_string(),
            slot,
            depth,
        }))
    }

    /// Write a local, declaring it in the nearest scope that owns assignments
    pub(crate) fn write_local(&mut self, name: &str, value: Node) -> Node {
        let (slot, depth) = self.arena.declare_for_assignment(self.scope, name);
        Node::new(Kind::WriteLocal {
            name: name.to_string(),
            slot,
            depth,
            value: Box::new(value),
        })
    }

    /// Write a local of the current scope, declaring it there
    pub(crate) fn write_local_here(&mut self, name: &str, value: Node) -> Node {
        let slot = self.arena.declare(self.scope, name);
        Node::new(Kind::WriteLocal {
            name: name.to_string(),
            slot,
            depth: 0,
            value: Box::new(value),
        })
    }

    /// Fresh temp of the current scope: its name, a write of `value`, and a read
    pub(crate) fn temp(&mut self, basename: &str, value: Node) -> (Node, Node) {
        let (name, slot) = self.arena.allocate_temp(self.scope, basename);
        let write = Node::new(Kind::WriteLocal {
            name: name.clone(),
            slot,
            depth: 0,
            value: Box::new(value),
        });
        let read = Node::new(Kind::ReadLocal {
            name,
            slot,
            depth: 0,
        });
        (write, read)
    }

    pub(crate) fn source_name(&self) -> &str {
        self.session.context.source().name()
    }

    pub(crate) fn line_of(&self, syntax: &SyntaxNode) -> u32 {
        self.session.context.source().line(syntax.location.offset)
    }

    fn snippet(&self, syntax: &SyntaxNode) -> &str {
        self.session
            .context
            .source()
            .snippet(syntax.location.offset, syntax.location.length)
    }

    /// Whether a scope of the current chain runs inside a method, block or eval
    pub(crate) fn in_dynamic_scope(&self) -> bool {
        let mut current = Some(self.scope);
        while let Some(id) = current {
            let scope = self.arena.get(id);
            if matches!(
                scope.kind(),
                ScopeKind::Method | ScopeKind::Block | ScopeKind::Eval | ScopeKind::Binding
            ) {
                return true;
            }
            current = scope.parent();
        }
        false
    }
}

/// Byte range of a syntax node, unless the parser could not place it
pub(crate) fn range_of(syntax: &SyntaxNode) -> Option<SourceRange> {
    if syntax.location.is_unknown() {
        None
    } else {
        Some(SourceRange::new(syntax.location.offset, syntax.location.length))
    }
}

// ============================================================================
// Translator
// ============================================================================

/// Entry point of the lowering pass
#[derive(Debug, Clone)]
pub struct Translator {
    options: Arc<TranslatorOptions>,
    coverage: Arc<CoverageManager>,
    interrupt: Interrupt,
}

impl Translator {
    /// Create a translator recording coverage in the process-wide table
    pub fn new(options: TranslatorOptions) -> Self {
        Self {
            options: Arc::new(options),
            coverage: CoverageManager::global(),
            interrupt: Interrupt::new(),
        }
    }

    /// Record coverage in `coverage` instead of the process-wide table
    pub fn with_coverage(mut self, coverage: Arc<CoverageManager>) -> Self {
        self.coverage = coverage;
        self
    }

    /// Poll `interrupt` at every statement boundary
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Options in effect
    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    /// Lower a whole unit
    pub fn translate(
        &self,
        context: TranslationContext,
        tree: &SyntaxNode,
    ) -> TranslateResult<LoweredBody> {
        let session = Session {
            context: Arc::new(context),
            options: self.options.clone(),
            coverage: self.coverage.clone(),
            interrupt: self.interrupt.clone(),
        };
        let source_name = session.context.source().name().to_string();
        debug!("lowering {}", source_name);

        let mut lowerer = match session.context.parser_context() {
            ParserContext::Eval { binding } => {
                let binding = binding.clone();
                Lowerer::for_eval(session, &binding)
            }
            ParserContext::TopLevel | ParserContext::Inline => {
                Lowerer::new(session, ScopeKind::TopLevel, false)
            }
        };
        let root = lowerer.lower_node(tree)?;
        let body = lowerer.finish(root);
        debug!("lowered {} into {} frame layouts", source_name, body.layouts.len());
        Ok(body)
    }
}
