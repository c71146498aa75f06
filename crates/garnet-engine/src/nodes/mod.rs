//! Executable Nodes
//!
//! The scope-resolved tree produced by the lowering pass and consumed by the
//! execution engine. Every node is owned by exactly one parent; when a
//! subtree must appear twice it is cloned.

mod pretty;

pub use pretty::PrettyPrint;

use crate::lazy::LazyBody;
use crate::lower::LoweredBody;
use crate::scope::LayoutId;
use std::fmt;
use std::sync::Arc;

/// Byte range of the source construct a node was lowered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    /// Start offset in bytes
    pub start: usize,
    /// Length in bytes
    pub length: usize,
}

impl SourceRange {
    /// Create a range
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Smallest range covering both
    pub fn union(&self, other: &SourceRange) -> SourceRange {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        SourceRange::new(start, end - start)
    }
}

/// Identifies the loop or block a `break` leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakId(pub u32);

impl fmt::Display for BreakId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "break{}", self.0)
    }
}

/// What a missing positional argument reads as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingArgumentBehavior {
    /// Procs pad missing arguments with nil
    Nil,
    /// Methods and lambdas raise
    RuntimeError,
}

/// How a splat cast treats nil
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplatNilBehavior {
    /// nil stays nil
    Nil,
    /// nil becomes `[nil]`
    ArrayWithNil,
    /// nil becomes `[]`
    EmptyArray,
}

/// Where a constant is looked up
#[derive(Debug, Clone)]
pub enum ConstantScope {
    /// Enclosing lexical scopes; dynamic when the nesting is only known at run time
    Lexical {
        /// Lexical scope must be read from the frame
        dynamic: bool,
    },
    /// `::Name`
    Root,
    /// `Parent::Name`
    Scoped(Box<Node>),
}

/// Frame a `CatchReturn` intercepts returns for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTarget {
    /// Method body
    Method,
    /// Lambda body
    Lambda,
}

/// Flavour of a block definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcKind {
    /// Block or `proc { }`
    Proc,
    /// Stabby lambda or `lambda { }`
    Lambda,
}

/// `class` or `module`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// `class`
    Class,
    /// `module`
    Module,
}

/// Arity of a method or block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arity {
    /// Leading required positionals
    pub required: usize,
    /// Optional positionals
    pub optional: usize,
    /// Has `*rest`
    pub has_rest: bool,
    /// Trailing required positionals
    pub post: usize,
    /// Keyword names in declaration order
    pub keywords: Vec<String>,
    /// Number of required keywords
    pub required_keywords: usize,
    /// Has `**rest` or `...`
    pub has_keyword_rest: bool,
}

impl Arity {
    /// Whether keyword arguments may be passed
    pub fn accepts_keywords(&self) -> bool {
        !self.keywords.is_empty() || self.has_keyword_rest
    }

    /// Required positionals, leading and trailing
    pub fn required_positionals(&self) -> usize {
        self.required + self.post
    }
}

/// A lowered multiple assignment; also used as a nested assignable
#[derive(Debug, Clone)]
pub struct MultipleAssignment {
    /// Targets bound from the front
    pub pre: Vec<Node>,
    /// Target bound to the middle, if any
    pub rest: Option<Node>,
    /// Targets bound from the back
    pub post: Vec<Node>,
    /// How a nil right-hand side is splatted
    pub splat: SplatNilBehavior,
    /// Right-hand side; absent for nested targets, which receive their value
    pub value: Option<Node>,
}

/// A method definition and its (possibly deferred) body
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Declared arity
    pub arity: Arity,
    /// Body, lowered now or on first demand
    pub body: LazyBody,
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("body", &self.body)
            .finish()
    }
}

/// A block or lambda literal
#[derive(Debug, Clone)]
pub struct BlockDefinition {
    /// Proc or lambda semantics
    pub kind: ProcKind,
    /// Declared arity
    pub arity: Arity,
    /// Frame layout of the block, in the enclosing unit's table
    pub layout: LayoutId,
    /// Id `break` uses to leave the block's call
    pub break_id: BreakId,
    /// Body with the prelude for `kind`
    pub body: Node,
    /// Lambda version of a `lambda { }` block, which may still be called as a proc
    pub lambda_body: Option<Node>,
}

/// Which exceptions a `rescue` clause handles
#[derive(Debug, Clone)]
pub enum RescueMatch {
    /// Any of these classes
    Classes(Vec<Node>),
    /// Any class in the splatted list
    Splat(Box<Node>),
    /// Bare `rescue`
    StandardError,
}

/// One handler of a [`Kind::Try`]
#[derive(Debug, Clone)]
pub struct RescueClause {
    /// Exception test
    pub matcher: RescueMatch,
    /// Handler, starting with the write of the `=> target` reference if any
    pub body: Node,
}

/// Lowered `class`/`module` body
#[derive(Debug)]
pub struct ModuleDefinition {
    /// Class or module
    pub kind: ModuleKind,
    /// Last segment of the constant path
    pub name: String,
    /// Body with its own frame
    pub body: LoweredBody,
}

/// Node payloads
#[derive(Debug, Clone)]
pub enum Kind {
    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------
    /// `nil`; `implicit` marks "no expression here" rather than a written nil
    Nil { implicit: bool },
    /// `true` / `false`
    Boolean(bool),
    /// Integer fitting in 64 bits
    Integer(i64),
    /// Integer too large for 64 bits, kept as digits
    BigInteger {
        /// Digits without prefix, sign or underscores
        digits: String,
        /// Radix of `digits`
        radix: u32,
        /// Literal had a leading minus
        negative: bool,
    },
    /// Float literal
    Float(f64),
    /// String literal
    String(String),
    /// Symbol literal
    Symbol(String),
    /// Interpolated string parts, concatenated at run time
    Interpolation(Vec<Node>),
    /// Array literal; elements may be `Splat`
    Array(Vec<Node>),
    /// Hash literal of key/value pairs
    Hash(Vec<(Node, Node)>),
    /// Merge of several hashes, left to right
    ConcatHash(Vec<Node>),
    /// Range literal
    Range {
        /// Lower bound
        from: Box<Node>,
        /// Upper bound
        to: Box<Node>,
        /// `...` form
        exclusive: bool,
    },
    /// The receiver of the current frame
    SelfValue,
    /// Module holding internal helper methods
    InternalModule,
    /// Innermost lexically enclosing module
    LexicalScope {
        /// Only known at run time
        dynamic: bool,
    },
    /// Profiling wrapper around an argument read
    ProfileArgument(Box<Node>),

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------
    /// Read a local `depth` frames out
    ReadLocal {
        /// Source name, for diagnostics
        name: String,
        /// Slot in the frame at `depth`
        slot: usize,
        /// Frames outward; 0 is the current one
        depth: usize,
    },
    /// Write a local `depth` frames out
    WriteLocal {
        /// Source name, for diagnostics
        name: String,
        /// Slot in the frame at `depth`
        slot: usize,
        /// Frames outward; 0 is the current one
        depth: usize,
        /// Value written
        value: Box<Node>,
    },
    /// `@name`
    ReadInstanceVariable(String),
    /// `@name = value`
    WriteInstanceVariable {
        /// Variable name with sigil
        name: String,
        /// Value written
        value: Box<Node>,
    },
    /// `@@name`
    ReadClassVariable(String),
    /// `@@name = value`
    WriteClassVariable {
        /// Variable name with sigil
        name: String,
        /// Value written
        value: Box<Node>,
    },
    /// `$name`
    ReadGlobal(String),
    /// `$1`, `$2`, ... of the match data in `match_data`
    ReadNthMatch {
        /// Usually `ReadGlobal("$~")`
        match_data: Box<Node>,
        /// Group number
        index: u32,
    },
    /// `$name = value`
    WriteGlobal {
        /// Variable name with sigil
        name: String,
        /// Value written
        value: Box<Node>,
    },
    /// Constant read
    ReadConstant {
        /// Lookup scope
        scope: ConstantScope,
        /// Constant name
        name: String,
    },
    /// Constant assignment
    WriteConstant {
        /// Target scope
        scope: ConstantScope,
        /// Constant name
        name: String,
        /// Value written
        value: Box<Node>,
    },
    /// Value handed to an assignable by its enclosing multiple assignment
    AssignedValue,

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------
    /// Statements evaluated in order; the last one is the value
    Sequence(Vec<Node>),
    /// Conditional
    If {
        /// Condition
        condition: Box<Node>,
        /// Taken when truthy
        then_body: Option<Box<Node>>,
        /// Taken when falsy
        else_body: Option<Box<Node>>,
    },
    /// Short-circuit and
    And(Box<Node>, Box<Node>),
    /// Short-circuit or
    Or(Box<Node>, Box<Node>),
    /// Negation
    Not(Box<Node>),
    /// Loop
    While {
        /// Loop condition
        condition: Box<Node>,
        /// Loop body
        body: Box<Node>,
        /// Run the body before the first check
        do_while: bool,
        /// Id of `break`s leaving this loop
        break_id: BreakId,
    },
    /// Leave the loop or block call identified by `break_id`
    Break {
        /// Loop or block left
        break_id: BreakId,
        /// Result value
        value: Box<Node>,
    },
    /// Next iteration, or return from the block
    Next {
        /// Block result
        value: Box<Node>,
    },
    /// Restart the current iteration
    Redo,
    /// Return from the method
    Return {
        /// Returned value
        value: Box<Node>,
        /// Return crosses a block boundary
        from_block: bool,
    },
    /// `begin body ensure cleanup end`
    Ensure {
        /// Protected body
        body: Box<Node>,
        /// Always run afterwards
        ensure: Box<Node>,
    },
    /// `begin body rescue ... else ... end`
    Try {
        /// Protected body
        body: Box<Node>,
        /// Handlers, tried in order
        rescues: Vec<RescueClause>,
        /// Run instead of returning `body`'s value when nothing was raised
        else_body: Option<Box<Node>>,
    },
    /// The exception being handled by the innermost `rescue`
    CurrentException,
    /// Rerun the `begin` body of the handling `Try`
    Retry,
    /// `defined?(value)`; `value` is inspected, not evaluated
    Defined(Box<Node>),
    /// `END { }`: register `cleanup`, then run the statements following it
    DeferredCleanup {
        /// Registered at-exit code
        cleanup: Box<Node>,
        /// Statements after the `END` block
        rest: Option<Box<Node>>,
    },
    /// Raise NoMatchingPatternError for `value`
    NoMatchingPattern {
        /// Value that matched no pattern
        value: Box<Node>,
    },
    /// Run the wrapped node and evaluate to true
    ExecuteAndReturnTrue(Box<Node>),

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------
    /// Method call
    Call {
        /// Receiver (`SelfValue` for receiverless calls)
        receiver: Box<Node>,
        /// Method name
        method: String,
        /// Arguments; may contain `Splat` and a trailing keyword hash
        arguments: Vec<Node>,
        /// Block literal or `BlockPass`
        block: Option<Box<Node>>,
        /// Receiverless call, private methods are visible
        private: bool,
        /// `&.`
        safe_navigation: bool,
    },
    /// `*value` in an argument or array list
    Splat(Box<Node>),
    /// `&value` at a call site
    BlockPass(Box<Node>),
    /// `yield`
    Yield {
        /// Arguments
        arguments: Vec<Node>,
    },
    /// Call the superclass method
    SuperCall {
        /// `Array` of arguments or `ReadZSuperArguments`
        arguments: Box<Node>,
        /// Block passed on
        block: Option<Box<Node>>,
        /// Bare `super` reusing the current arguments
        implicit: bool,
    },
    /// Current values of a method's parameters, for bare `super`
    ReadZSuperArguments {
        /// Position of the rest parameter, splatted by the caller
        rest_index: Option<usize>,
        /// Reads in declaration order; keywords last as one hash
        reads: Vec<Node>,
    },

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------
    /// `alias new old` in the current module; names evaluate to symbols
    AliasMethod {
        /// Name defined
        new_name: Box<Node>,
        /// Existing method
        old_name: Box<Node>,
    },
    /// `alias $new $old`
    AliasGlobal {
        /// Name defined
        new_name: String,
        /// Existing variable
        old_name: String,
    },
    /// `undef`; names evaluate to symbols
    Undef(Vec<Node>),
    /// `def`
    DefineMethod {
        /// Method name
        name: String,
        /// Receiver of `def recv.name`
        singleton: Option<Box<Node>>,
        /// Arity and body
        method: Arc<MethodDefinition>,
    },
    /// Block or lambda literal
    BlockDefinition(Box<BlockDefinition>),
    /// `class` / `module`
    OpenModule {
        /// Module the new constant is defined under
        lexical_parent: Box<Node>,
        /// Superclass of a class
        superclass: Option<Box<Node>>,
        /// Body
        definition: Arc<ModuleDefinition>,
    },
    /// Intercept returns aimed at this frame
    CatchReturn {
        /// Frame kind
        target: ReturnTarget,
        /// Frame body
        body: Box<Node>,
    },
    /// Raise when the argument count does not fit `Arity`
    CheckArity(Arity),

    // ------------------------------------------------------------------
    // Arguments
    // ------------------------------------------------------------------
    /// Positional argument at `index`
    ReadPreArgument {
        /// Index from the front
        index: usize,
        /// Frame may receive keyword arguments
        keyword_arguments: bool,
        /// What a missing argument reads as
        missing: MissingArgumentBehavior,
    },
    /// Optional positional argument
    ReadOptionalArgument {
        /// Index from the front
        index: usize,
        /// Positional count needed for the argument to be supplied
        minimum: usize,
        /// Frame may receive keyword arguments
        keyword_arguments: bool,
        /// Evaluated when not supplied
        default: Box<Node>,
    },
    /// Positionals between the optionals and the posts, as an array
    ReadRestArgument {
        /// First index
        from: usize,
        /// Number of trailing positionals left out
        to: usize,
        /// Frame may receive keyword arguments
        keyword_arguments: bool,
    },
    /// Trailing required argument
    ReadPostArgument {
        /// Position counted from the end, 1-based
        index_from_end: usize,
        /// Frame may receive keyword arguments
        keyword_arguments: bool,
        /// Required positionals, leading and trailing
        required: usize,
        /// Optional positionals
        optional: usize,
        /// Declares a rest parameter
        has_rest: bool,
    },
    /// Keyword argument; raises "missing keyword" when absent and no default
    ReadKeywordArgument {
        /// Keyword name
        name: String,
        /// Default value
        default: Option<Box<Node>>,
    },
    /// Keywords not bound by name, as a hash
    ReadKeywordRestArgument {
        /// Keywords bound by name
        excluded: Vec<String>,
    },
    /// Raise when keywords were passed to `**nil`
    CheckNoKeywordArguments,
    /// Store the frame's block in `slot`
    SaveMethodBlock {
        /// Target slot in the current frame
        slot: usize,
    },
    /// A proc called with one array-like argument should destructure it
    ShouldDestructure {
        /// Frame may receive keyword arguments
        keyword_arguments: bool,
    },

    // ------------------------------------------------------------------
    // Arrays and assignment
    // ------------------------------------------------------------------
    /// `array[index]` with a constant index; negative counts from the end
    ReadConstantIndex {
        /// Array
        array: Box<Node>,
        /// Index
        index: i64,
    },
    /// `array[from...-to]`-style slice; `to` is an offset from the end
    ArraySlice {
        /// Array
        array: Box<Node>,
        /// First index
        from: i64,
        /// End offset, zero or negative
        to: i64,
    },
    /// `array.size >= size`
    ArrayIsAtLeastAsLargeAs {
        /// Array
        array: Box<Node>,
        /// Minimum size
        size: usize,
    },
    /// Length check of an array pattern
    ArrayPatternLengthCheck {
        /// Deconstructed array
        array: Box<Node>,
        /// Required element count
        size: usize,
        /// A rest allows more elements
        has_rest: bool,
    },
    /// Convert a value to an array for splatting
    SplatCast {
        /// Value converted
        value: Box<Node>,
        /// Treatment of nil
        nil: SplatNilBehavior,
    },
    /// `value.nil?` without dispatch
    IsNil(Box<Node>),
    /// Multiple assignment
    MultipleAssignment(Box<MultipleAssignment>),
}

/// An executable node
#[derive(Debug, Clone)]
pub struct Node {
    /// Payload
    pub kind: Kind,
    range: Option<SourceRange>,
    newline: bool,
    coverage_line: bool,
}

impl Node {
    /// Create a node with no source range
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            range: None,
            newline: false,
            coverage_line: false,
        }
    }

    /// Create a node with a source range
    pub fn at(kind: Kind, range: SourceRange) -> Self {
        let mut node = Self::new(kind);
        node.range = Some(range);
        node
    }

    /// Written `nil`
    pub fn nil() -> Self {
        Self::new(Kind::Nil { implicit: false })
    }

    /// Placeholder for "no expression"
    pub fn implicit_nil() -> Self {
        Self::new(Kind::Nil { implicit: true })
    }

    /// Symbol literal
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::new(Kind::Symbol(name.into()))
    }

    /// Integer literal
    pub fn integer(value: i64) -> Self {
        Self::new(Kind::Integer(value))
    }

    /// Public call with no block
    pub fn call(receiver: Node, method: impl Into<String>, arguments: Vec<Node>) -> Self {
        Self::new(Kind::Call {
            receiver: Box::new(receiver),
            method: method.into(),
            arguments,
            block: None,
            private: false,
            safe_navigation: false,
        })
    }

    /// Short-circuit and
    pub fn and(left: Node, right: Node) -> Self {
        Self::new(Kind::And(Box::new(left), Box::new(right)))
    }

    /// Short-circuit or
    pub fn or(left: Node, right: Node) -> Self {
        Self::new(Kind::Or(Box::new(left), Box::new(right)))
    }

    /// Negation
    pub fn not(value: Node) -> Self {
        Self::new(Kind::Not(Box::new(value)))
    }

    /// Conditional with both branches
    pub fn if_else(condition: Node, then_body: Node, else_body: Node) -> Self {
        Self::new(Kind::If {
            condition: Box::new(condition),
            then_body: Some(Box::new(then_body)),
            else_body: Some(Box::new(else_body)),
        })
    }

    /// Source range, when known
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }

    /// Whether the node has a source range
    pub fn has_source(&self) -> bool {
        self.range.is_some()
    }

    /// Set the source range
    pub fn set_range(&mut self, range: SourceRange) {
        self.range = Some(range);
    }

    /// Whether the node starts a new logical line
    pub fn is_newline(&self) -> bool {
        self.newline
    }

    /// Mark the node as a statement boundary
    pub fn mark_newline(&mut self) {
        self.newline = true;
    }

    /// Whether the node marks a line for coverage
    pub fn is_coverage_line(&self) -> bool {
        self.coverage_line
    }

    /// Mark the node as a coverage line
    pub fn mark_coverage_line(&mut self) {
        self.coverage_line = true;
    }

    /// Whether this is the "no expression" placeholder
    pub fn is_implicit_nil(&self) -> bool {
        matches!(self.kind, Kind::Nil { implicit: true })
    }

    /// Whether the node takes the statements that follow it as a child
    pub fn can_subsume_following(&self) -> bool {
        matches!(self.kind, Kind::DeferredCleanup { rest: None, .. })
    }

    /// Fold `following` into this node; only valid when [`can_subsume_following`] holds
    ///
    /// [`can_subsume_following`]: Node::can_subsume_following
    pub fn subsume_following(mut self, following: Node) -> Node {
        if let Kind::DeferredCleanup { rest, .. } = &mut self.kind {
            *rest = Some(Box::new(following));
        }
        self
    }

    /// Direct children in evaluation order
    ///
    /// Does not descend into method or module bodies, which live in their own
    /// frames.
    pub fn children(&self) -> Vec<&Node> {
        let mut out: Vec<&Node> = Vec::new();
        match &self.kind {
            Kind::Nil { .. }
            | Kind::Boolean(_)
            | Kind::Integer(_)
            | Kind::BigInteger { .. }
            | Kind::Float(_)
            | Kind::String(_)
            | Kind::Symbol(_)
            | Kind::SelfValue
            | Kind::InternalModule
            | Kind::LexicalScope { .. }
            | Kind::ReadLocal { .. }
            | Kind::ReadInstanceVariable(_)
            | Kind::ReadClassVariable(_)
            | Kind::ReadGlobal(_)
            | Kind::AssignedValue
            | Kind::CurrentException
            | Kind::AliasGlobal { .. }
            | Kind::Redo
            | Kind::Retry
            | Kind::CheckArity(_)
            | Kind::ReadPreArgument { .. }
            | Kind::ReadRestArgument { .. }
            | Kind::ReadPostArgument { .. }
            | Kind::ReadKeywordRestArgument { .. }
            | Kind::CheckNoKeywordArguments
            | Kind::SaveMethodBlock { .. }
            | Kind::ShouldDestructure { .. }
            | Kind::DefineMethod { singleton: None, .. } => {}
            Kind::Interpolation(items)
            | Kind::Array(items)
            | Kind::ConcatHash(items)
            | Kind::Sequence(items)
            | Kind::Undef(items)
            | Kind::Yield { arguments: items } => out.extend(items.iter()),
            Kind::Hash(pairs) => {
                for (key, value) in pairs {
                    out.push(key);
                    out.push(value);
                }
            }
            Kind::Range { from, to, .. } => {
                out.push(from);
                out.push(to);
            }
            Kind::ProfileArgument(value)
            | Kind::Not(value)
            | Kind::Splat(value)
            | Kind::BlockPass(value)
            | Kind::IsNil(value)
            | Kind::Defined(value)
            | Kind::ExecuteAndReturnTrue(value) => out.push(value),
            Kind::WriteLocal { value, .. }
            | Kind::WriteInstanceVariable { value, .. }
            | Kind::WriteClassVariable { value, .. }
            | Kind::WriteGlobal { value, .. }
            | Kind::Break { value, .. }
            | Kind::Next { value }
            | Kind::Return { value, .. }
            | Kind::NoMatchingPattern { value }
            | Kind::ReadNthMatch {
                match_data: value, ..
            }
            | Kind::SplatCast { value, .. } => out.push(value),
            Kind::ReadConstant { scope, .. } => {
                if let ConstantScope::Scoped(parent) = scope {
                    out.push(parent);
                }
            }
            Kind::WriteConstant { scope, value, .. } => {
                if let ConstantScope::Scoped(parent) = scope {
                    out.push(parent);
                }
                out.push(value);
            }
            Kind::If {
                condition,
                then_body,
                else_body,
            } => {
                out.push(condition);
                out.extend(then_body.as_deref());
                out.extend(else_body.as_deref());
            }
            Kind::And(left, right) | Kind::Or(left, right) => {
                out.push(left);
                out.push(right);
            }
            Kind::While {
                condition, body, ..
            } => {
                out.push(condition);
                out.push(body);
            }
            Kind::Ensure { body, ensure } => {
                out.push(body);
                out.push(ensure);
            }
            Kind::Try {
                body,
                rescues,
                else_body,
            } => {
                out.push(body);
                for rescue in rescues {
                    match &rescue.matcher {
                        RescueMatch::Classes(classes) => out.extend(classes.iter()),
                        RescueMatch::Splat(list) => out.push(list),
                        RescueMatch::StandardError => {}
                    }
                    out.push(&rescue.body);
                }
                out.extend(else_body.as_deref());
            }
            Kind::AliasMethod { new_name, old_name } => {
                out.push(new_name);
                out.push(old_name);
            }
            Kind::DeferredCleanup { cleanup, rest } => {
                out.push(cleanup);
                out.extend(rest.as_deref());
            }
            Kind::Call {
                receiver,
                arguments,
                block,
                ..
            } => {
                out.push(receiver);
                out.extend(arguments.iter());
                out.extend(block.as_deref());
            }
            Kind::SuperCall {
                arguments, block, ..
            } => {
                out.push(arguments);
                out.extend(block.as_deref());
            }
            Kind::ReadZSuperArguments { reads, .. } => out.extend(reads.iter()),
            Kind::DefineMethod {
                singleton: Some(singleton),
                ..
            } => out.push(singleton),
            Kind::BlockDefinition(definition) => {
                out.push(&definition.body);
                out.extend(definition.lambda_body.as_ref());
            }
            Kind::OpenModule {
                lexical_parent,
                superclass,
                ..
            } => {
                out.push(lexical_parent);
                out.extend(superclass.as_deref());
            }
            Kind::CatchReturn { body, .. } => out.push(body),
            Kind::ReadOptionalArgument { default, .. } => out.push(default),
            Kind::ReadKeywordArgument { default, .. } => out.extend(default.as_deref()),
            Kind::ReadConstantIndex { array, .. }
            | Kind::ArraySlice { array, .. }
            | Kind::ArrayIsAtLeastAsLargeAs { array, .. }
            | Kind::ArrayPatternLengthCheck { array, .. } => out.push(array),
            Kind::MultipleAssignment(assignment) => {
                out.extend(assignment.pre.iter());
                out.extend(assignment.rest.as_ref());
                out.extend(assignment.post.iter());
                out.extend(assignment.value.as_ref());
            }
        }
        out
    }

    /// Visit this node and every descendant, depth first
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}
