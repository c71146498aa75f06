//! Syntax Tree
//!
//! The read-only tree handed to the lowering pass by the external parser.
//! Every node carries a byte [`Location`] into the source buffer and a flag
//! telling whether it starts a new logical line.
//!
//! Trees are normally deserialized from the parser's JSON output:
//!
//! ```json
//! { "type": "LocalVariableWrite", "name": "a",
//!   "value": { "type": "Integer", "value": "0x10", "location": { "offset": 4, "length": 4 } },
//!   "location": { "offset": 0, "length": 8 }, "newline": true }
//! ```

mod source;

pub use source::{Source, SourceEncoding};

use serde::Deserialize;
use std::fmt;

/// Byte range of a syntax node inside its source buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct Location {
    /// Start offset in bytes
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
}

impl Location {
    /// Create a location
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// The parser uses `(0, 0)` for nodes it could not place
    pub fn is_unknown(&self) -> bool {
        self.offset == 0 && self.length == 0
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// A syntax tree node
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyntaxNode {
    /// Node payload
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Source location
    #[serde(default)]
    pub location: Location,
    /// Starts a new logical line
    #[serde(default)]
    pub newline: bool,
}

impl SyntaxNode {
    /// Create a node at an unknown location
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            location: Location::default(),
            newline: false,
        }
    }

    /// Create a node at a known location
    pub fn at(offset: usize, length: usize, kind: NodeKind) -> Self {
        Self {
            kind,
            location: Location::new(offset, length),
            newline: false,
        }
    }

    /// Mark the node as starting a new logical line
    pub fn with_newline(mut self) -> Self {
        self.newline = true;
        self
    }

    /// Name of the node kind, as used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Parse a tree from the parser's JSON output
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Parameter list of a method, block or lambda
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Leading required parameters (`RequiredParameter` or `MultiTarget`)
    pub requireds: Vec<SyntaxNode>,
    /// Optional parameters (`OptionalParameter`)
    pub optionals: Vec<SyntaxNode>,
    /// Rest parameter (`RestParameter` or `ImplicitRest`)
    pub rest: Option<Box<SyntaxNode>>,
    /// Trailing required parameters
    pub posts: Vec<SyntaxNode>,
    /// Keyword parameters (`RequiredKeywordParameter` or `OptionalKeywordParameter`)
    pub keywords: Vec<SyntaxNode>,
    /// `KeywordRestParameter`, `NoKeywordsParameter` or `ForwardingParameter`
    pub keyword_rest: Option<Box<SyntaxNode>>,
    /// Block parameter
    pub block: Option<Box<SyntaxNode>>,
}

impl Parameters {
    /// Whether the list declares any keyword parameter, including `**`
    pub fn accepts_keywords(&self) -> bool {
        !self.keywords.is_empty()
            || matches!(
                self.keyword_rest.as_deref().map(|n| &n.kind),
                Some(NodeKind::KeywordRestParameter { .. } | NodeKind::ForwardingParameter)
            )
    }

    /// Whether the list ends with `...`
    pub fn is_forwarding(&self) -> bool {
        matches!(
            self.keyword_rest.as_deref().map(|n| &n.kind),
            Some(NodeKind::ForwardingParameter)
        )
    }
}

/// Every node kind the parser can produce
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------
    /// Root of a file
    Program {
        #[serde(default)]
        locals: Vec<String>,
        statements: Box<SyntaxNode>,
    },
    /// Statement list
    Statements {
        #[serde(default)]
        body: Vec<SyntaxNode>,
    },
    /// `( ... )`
    Parentheses {
        #[serde(default)]
        body: Option<Box<SyntaxNode>>,
    },
    /// `begin ... rescue ... else ... ensure ... end`
    Begin {
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
        /// First `rescue` clause; later ones chain through `subsequent`
        #[serde(default)]
        rescue_clause: Option<Box<SyntaxNode>>,
        #[serde(default)]
        else_clause: Option<Box<SyntaxNode>>,
        #[serde(default)]
        ensure: Option<Box<SyntaxNode>>,
    },
    /// `rescue A, *b => e`
    Rescue {
        #[serde(default)]
        exceptions: Vec<SyntaxNode>,
        #[serde(default)]
        reference: Option<Box<SyntaxNode>>,
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
        #[serde(default)]
        subsequent: Option<Box<SyntaxNode>>,
    },
    /// `expression rescue rescue_expression`
    RescueModifier {
        expression: Box<SyntaxNode>,
        rescue_expression: Box<SyntaxNode>,
    },
    /// `retry`
    Retry,
    /// `alias new old`, with symbols or global variables
    Alias {
        new_name: Box<SyntaxNode>,
        old_name: Box<SyntaxNode>,
    },
    /// `undef a, b`
    Undef { names: Vec<SyntaxNode> },
    /// `defined?(value)`
    Defined { value: Box<SyntaxNode> },
    /// `END { ... }`
    PostExecution {
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
    },
    /// Node the parser emits in place of unparseable input
    Missing,

    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------
    /// `nil`
    Nil,
    /// `true`
    True,
    /// `false`
    False,
    /// `self`
    SelfRef,
    /// Integer literal, as written (`0x1f`, `1_000`, `-7`)
    Integer { value: String },
    /// Float literal
    Float { value: f64 },
    /// String literal without interpolation
    String { value: String },
    /// Symbol literal
    Symbol { value: String },
    /// `"a#{b}c"`
    InterpolatedString { parts: Vec<SyntaxNode> },
    /// `:"a#{b}"`
    InterpolatedSymbol { parts: Vec<SyntaxNode> },
    /// `` `cmd` ``
    XString { value: String },
    /// `` `cmd #{arg}` ``
    InterpolatedXString { parts: Vec<SyntaxNode> },
    /// `#{ ... }` inside an interpolated string
    EmbeddedStatements {
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
    },
    /// `[a, b, *c]`
    Array {
        #[serde(default)]
        elements: Vec<SyntaxNode>,
    },
    /// `{ a => b, **c }`
    Hash {
        #[serde(default)]
        elements: Vec<SyntaxNode>,
    },
    /// Keyword arguments at a call site: `f(a: 1, **b)`
    KeywordHash { elements: Vec<SyntaxNode> },
    /// `key => value` or `key: value`
    Assoc {
        key: Box<SyntaxNode>,
        #[serde(default)]
        value: Option<Box<SyntaxNode>>,
    },
    /// `**value`
    AssocSplat {
        #[serde(default)]
        value: Option<Box<SyntaxNode>>,
    },
    /// `a..b` / `a...b`
    Range {
        #[serde(default)]
        left: Option<Box<SyntaxNode>>,
        #[serde(default)]
        right: Option<Box<SyntaxNode>>,
        #[serde(default)]
        exclusive: bool,
    },
    /// `*value`, also a rest target in multiple assignment
    Splat {
        #[serde(default)]
        expression: Option<Box<SyntaxNode>>,
    },

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------
    /// Local variable read
    LocalVariableRead { name: String },
    /// `name = value`
    LocalVariableWrite { name: String, value: Box<SyntaxNode> },
    /// Local variable as an assignment target
    LocalVariableTarget { name: String },
    /// `name op= value`
    LocalVariableOperatorWrite {
        name: String,
        operator: String,
        value: Box<SyntaxNode>,
    },
    /// `name ||= value`
    LocalVariableOrWrite { name: String, value: Box<SyntaxNode> },
    /// `name &&= value`
    LocalVariableAndWrite { name: String, value: Box<SyntaxNode> },
    /// `@name`
    InstanceVariableRead { name: String },
    /// `@name = value`
    InstanceVariableWrite { name: String, value: Box<SyntaxNode> },
    /// `@name` as an assignment target
    InstanceVariableTarget { name: String },
    /// `@name op= value`
    InstanceVariableOperatorWrite {
        name: String,
        operator: String,
        value: Box<SyntaxNode>,
    },
    /// `@@name`
    ClassVariableRead { name: String },
    /// `@@name = value`
    ClassVariableWrite { name: String, value: Box<SyntaxNode> },
    /// `@@name` as an assignment target
    ClassVariableTarget { name: String },
    /// `$name`
    GlobalVariableRead { name: String },
    /// `$&`, `` $` ``, `$'` and `$+`
    BackReferenceRead { name: String },
    /// `$1`, `$2`, ...
    NumberedReferenceRead { number: u32 },
    /// `$name = value`
    GlobalVariableWrite { name: String, value: Box<SyntaxNode> },
    /// `$name` as an assignment target
    GlobalVariableTarget { name: String },
    /// `Name`
    ConstantRead { name: String },
    /// `Name = value`
    ConstantWrite { name: String, value: Box<SyntaxNode> },
    /// `Name` as an assignment target
    ConstantTarget { name: String },
    /// `Parent::Name`, or `::Name` when `parent` is absent
    ConstantPath {
        #[serde(default)]
        parent: Option<Box<SyntaxNode>>,
        name: String,
    },
    /// `Parent::Name = value`
    ConstantPathWrite {
        target: Box<SyntaxNode>,
        value: Box<SyntaxNode>,
    },

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------
    /// Method call
    Call {
        #[serde(default)]
        receiver: Option<Box<SyntaxNode>>,
        name: String,
        #[serde(default)]
        arguments: Option<Box<SyntaxNode>>,
        #[serde(default)]
        block: Option<Box<SyntaxNode>>,
        #[serde(default)]
        safe_navigation: bool,
    },
    /// Argument list of a call
    Arguments {
        #[serde(default)]
        arguments: Vec<SyntaxNode>,
    },
    /// `&block` at a call site
    BlockArgument {
        #[serde(default)]
        expression: Option<Box<SyntaxNode>>,
    },
    /// `receiver.name` as an assignment target
    CallTarget {
        receiver: Box<SyntaxNode>,
        name: String,
        #[serde(default)]
        safe_navigation: bool,
    },
    /// `receiver[args]` as an assignment target
    IndexTarget {
        receiver: Box<SyntaxNode>,
        #[serde(default)]
        arguments: Option<Box<SyntaxNode>>,
    },
    /// `receiver[args] op= value`, including `||=` and `&&=`
    IndexOperatorWrite {
        receiver: Box<SyntaxNode>,
        #[serde(default)]
        arguments: Option<Box<SyntaxNode>>,
        operator: String,
        value: Box<SyntaxNode>,
    },
    /// `yield args`
    Yield {
        #[serde(default)]
        arguments: Option<Box<SyntaxNode>>,
    },
    /// `super(args)` with explicit arguments
    Super {
        #[serde(default)]
        arguments: Option<Box<SyntaxNode>>,
        #[serde(default)]
        block: Option<Box<SyntaxNode>>,
    },
    /// Bare `super`, forwarding the current arguments
    ForwardingSuper {
        #[serde(default)]
        block: Option<Box<SyntaxNode>>,
    },

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------
    /// `a && b`
    And {
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    /// `a || b`
    Or {
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    /// `not a`
    Not { expression: Box<SyntaxNode> },
    /// `if` / `elsif` / ternary
    If {
        predicate: Box<SyntaxNode>,
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
        #[serde(default)]
        subsequent: Option<Box<SyntaxNode>>,
    },
    /// `unless`
    Unless {
        predicate: Box<SyntaxNode>,
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
        #[serde(default)]
        else_clause: Option<Box<SyntaxNode>>,
    },
    /// `else` branch
    Else {
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
    },
    /// `while`, or `begin ... end while` when `do_while` is set
    While {
        predicate: Box<SyntaxNode>,
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
        #[serde(default)]
        do_while: bool,
    },
    /// `until`
    Until {
        predicate: Box<SyntaxNode>,
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
        #[serde(default)]
        do_while: bool,
    },
    /// `for index in collection`
    For {
        index: Box<SyntaxNode>,
        collection: Box<SyntaxNode>,
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
    },
    /// `break value`
    Break {
        #[serde(default)]
        arguments: Option<Box<SyntaxNode>>,
    },
    /// `next value`
    Next {
        #[serde(default)]
        arguments: Option<Box<SyntaxNode>>,
    },
    /// `redo`
    Redo,
    /// `return value`
    Return {
        #[serde(default)]
        arguments: Option<Box<SyntaxNode>>,
    },
    /// `case subject when ...`
    Case {
        #[serde(default)]
        predicate: Option<Box<SyntaxNode>>,
        conditions: Vec<SyntaxNode>,
        #[serde(default)]
        else_clause: Option<Box<SyntaxNode>>,
    },
    /// `when a, b then ...`
    When {
        conditions: Vec<SyntaxNode>,
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
    },
    /// `case subject in ...`
    CaseMatch {
        predicate: Box<SyntaxNode>,
        conditions: Vec<SyntaxNode>,
        #[serde(default)]
        else_clause: Option<Box<SyntaxNode>>,
    },
    /// `in pattern then ...`
    In {
        pattern: Box<SyntaxNode>,
        #[serde(default)]
        statements: Option<Box<SyntaxNode>>,
    },
    /// `value in pattern`
    MatchPredicate {
        value: Box<SyntaxNode>,
        pattern: Box<SyntaxNode>,
    },
    /// `value => pattern`
    MatchRequired {
        value: Box<SyntaxNode>,
        pattern: Box<SyntaxNode>,
    },

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------
    /// `def name(params) ... end`
    Def {
        name: String,
        #[serde(default)]
        receiver: Option<Box<SyntaxNode>>,
        #[serde(default)]
        parameters: Option<Box<Parameters>>,
        #[serde(default)]
        body: Option<Box<SyntaxNode>>,
        #[serde(default)]
        locals: Vec<String>,
    },
    /// `{ |params| ... }` attached to a call
    Block {
        #[serde(default)]
        parameters: Option<Box<Parameters>>,
        #[serde(default)]
        body: Option<Box<SyntaxNode>>,
        #[serde(default)]
        locals: Vec<String>,
    },
    /// `->(params) { ... }`
    Lambda {
        #[serde(default)]
        parameters: Option<Box<Parameters>>,
        #[serde(default)]
        body: Option<Box<SyntaxNode>>,
        #[serde(default)]
        locals: Vec<String>,
    },
    /// `class Path < Superclass ... end`
    Class {
        constant_path: Box<SyntaxNode>,
        #[serde(default)]
        superclass: Option<Box<SyntaxNode>>,
        #[serde(default)]
        body: Option<Box<SyntaxNode>>,
        #[serde(default)]
        locals: Vec<String>,
    },
    /// `module Path ... end`
    Module {
        constant_path: Box<SyntaxNode>,
        #[serde(default)]
        body: Option<Box<SyntaxNode>>,
        #[serde(default)]
        locals: Vec<String>,
    },

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------
    /// Required positional parameter
    RequiredParameter { name: String },
    /// `name = default`
    OptionalParameter { name: String, value: Box<SyntaxNode> },
    /// `*name` / `*`
    RestParameter {
        #[serde(default)]
        name: Option<String>,
    },
    /// `name:`
    RequiredKeywordParameter { name: String },
    /// `name: default`
    OptionalKeywordParameter { name: String, value: Box<SyntaxNode> },
    /// `**name` / `**`
    KeywordRestParameter {
        #[serde(default)]
        name: Option<String>,
    },
    /// `**nil`
    NoKeywordsParameter,
    /// `...`
    ForwardingParameter,
    /// `&name`
    BlockParameter {
        #[serde(default)]
        name: Option<String>,
    },

    // ------------------------------------------------------------------
    // Multiple assignment
    // ------------------------------------------------------------------
    /// `(a, *b, c)` target list, nested or as a parameter
    MultiTarget {
        #[serde(default)]
        lefts: Vec<SyntaxNode>,
        #[serde(default)]
        rest: Option<Box<SyntaxNode>>,
        #[serde(default)]
        rights: Vec<SyntaxNode>,
    },
    /// `a, *b, c = value`
    MultiWrite {
        #[serde(default)]
        lefts: Vec<SyntaxNode>,
        #[serde(default)]
        rest: Option<Box<SyntaxNode>>,
        #[serde(default)]
        rights: Vec<SyntaxNode>,
        value: Box<SyntaxNode>,
    },
    /// Trailing comma in `a, = value` or `|a,|`
    ImplicitRest,

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------
    /// `Const[a, *b, c]` / `[a, b]`
    ArrayPattern {
        #[serde(default)]
        constant: Option<Box<SyntaxNode>>,
        #[serde(default)]
        requireds: Vec<SyntaxNode>,
        #[serde(default)]
        rest: Option<Box<SyntaxNode>>,
        #[serde(default)]
        posts: Vec<SyntaxNode>,
    },
    /// `Const(a:, b: pattern, **rest)` / `{a:}`
    HashPattern {
        #[serde(default)]
        constant: Option<Box<SyntaxNode>>,
        #[serde(default)]
        elements: Vec<SyntaxNode>,
        #[serde(default)]
        rest: Option<Box<SyntaxNode>>,
    },
    /// `[*, x, *]`
    FindPattern {
        #[serde(default)]
        constant: Option<Box<SyntaxNode>>,
        left: Box<SyntaxNode>,
        #[serde(default)]
        requireds: Vec<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    /// `a | b`
    AlternationPattern {
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    /// `pattern => name`
    CapturePattern {
        value: Box<SyntaxNode>,
        target: Box<SyntaxNode>,
    },
    /// `^name`
    PinnedVariable { variable: Box<SyntaxNode> },
    /// `^(expression)`
    PinnedExpression { expression: Box<SyntaxNode> },
}

impl NodeKind {
    /// Stable name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::Statements { .. } => "Statements",
            NodeKind::Parentheses { .. } => "Parentheses",
            NodeKind::Begin { .. } => "Begin",
            NodeKind::Rescue { .. } => "Rescue",
            NodeKind::RescueModifier { .. } => "RescueModifier",
            NodeKind::Retry => "Retry",
            NodeKind::Alias { .. } => "Alias",
            NodeKind::Undef { .. } => "Undef",
            NodeKind::Defined { .. } => "Defined",
            NodeKind::PostExecution { .. } => "PostExecution",
            NodeKind::Missing => "Missing",
            NodeKind::Nil => "Nil",
            NodeKind::True => "True",
            NodeKind::False => "False",
            NodeKind::SelfRef => "SelfRef",
            NodeKind::Integer { .. } => "Integer",
            NodeKind::Float { .. } => "Float",
            NodeKind::String { .. } => "String",
            NodeKind::Symbol { .. } => "Symbol",
            NodeKind::InterpolatedString { .. } => "InterpolatedString",
            NodeKind::InterpolatedSymbol { .. } => "InterpolatedSymbol",
            NodeKind::XString { .. } => "XString",
            NodeKind::InterpolatedXString { .. } => "InterpolatedXString",
            NodeKind::EmbeddedStatements { .. } => "EmbeddedStatements",
            NodeKind::Array { .. } => "Array",
            NodeKind::Hash { .. } => "Hash",
            NodeKind::KeywordHash { .. } => "KeywordHash",
            NodeKind::Assoc { .. } => "Assoc",
            NodeKind::AssocSplat { .. } => "AssocSplat",
            NodeKind::Range { .. } => "Range",
            NodeKind::Splat { .. } => "Splat",
            NodeKind::LocalVariableRead { .. } => "LocalVariableRead",
            NodeKind::LocalVariableWrite { .. } => "LocalVariableWrite",
            NodeKind::LocalVariableTarget { .. } => "LocalVariableTarget",
            NodeKind::LocalVariableOperatorWrite { .. } => "LocalVariableOperatorWrite",
            NodeKind::LocalVariableOrWrite { .. } => "LocalVariableOrWrite",
            NodeKind::LocalVariableAndWrite { .. } => "LocalVariableAndWrite",
            NodeKind::InstanceVariableRead { .. } => "InstanceVariableRead",
            NodeKind::InstanceVariableWrite { .. } => "InstanceVariableWrite",
            NodeKind::InstanceVariableTarget { .. } => "InstanceVariableTarget",
            NodeKind::InstanceVariableOperatorWrite { .. } => "InstanceVariableOperatorWrite",
            NodeKind::ClassVariableRead { .. } => "ClassVariableRead",
            NodeKind::ClassVariableWrite { .. } => "ClassVariableWrite",
            NodeKind::ClassVariableTarget { .. } => "ClassVariableTarget",
            NodeKind::GlobalVariableRead { .. } => "GlobalVariableRead",
            NodeKind::BackReferenceRead { .. } => "BackReferenceRead",
            NodeKind::NumberedReferenceRead { .. } => "NumberedReferenceRead",
            NodeKind::GlobalVariableWrite { .. } => "GlobalVariableWrite",
            NodeKind::GlobalVariableTarget { .. } => "GlobalVariableTarget",
            NodeKind::ConstantRead { .. } => "ConstantRead",
            NodeKind::ConstantWrite { .. } => "ConstantWrite",
            NodeKind::ConstantTarget { .. } => "ConstantTarget",
            NodeKind::ConstantPath { .. } => "ConstantPath",
            NodeKind::ConstantPathWrite { .. } => "ConstantPathWrite",
            NodeKind::Call { .. } => "Call",
            NodeKind::Arguments { .. } => "Arguments",
            NodeKind::BlockArgument { .. } => "BlockArgument",
            NodeKind::CallTarget { .. } => "CallTarget",
            NodeKind::IndexTarget { .. } => "IndexTarget",
            NodeKind::IndexOperatorWrite { .. } => "IndexOperatorWrite",
            NodeKind::Yield { .. } => "Yield",
            NodeKind::Super { .. } => "Super",
            NodeKind::ForwardingSuper { .. } => "ForwardingSuper",
            NodeKind::And { .. } => "And",
            NodeKind::Or { .. } => "Or",
            NodeKind::Not { .. } => "Not",
            NodeKind::If { .. } => "If",
            NodeKind::Unless { .. } => "Unless",
            NodeKind::Else { .. } => "Else",
            NodeKind::While { .. } => "While",
            NodeKind::Until { .. } => "Until",
            NodeKind::For { .. } => "For",
            NodeKind::Break { .. } => "Break",
            NodeKind::Next { .. } => "Next",
            NodeKind::Redo => "Redo",
            NodeKind::Return { .. } => "Return",
            NodeKind::Case { .. } => "Case",
            NodeKind::When { .. } => "When",
            NodeKind::CaseMatch { .. } => "CaseMatch",
            NodeKind::In { .. } => "In",
            NodeKind::MatchPredicate { .. } => "MatchPredicate",
            NodeKind::MatchRequired { .. } => "MatchRequired",
            NodeKind::Def { .. } => "Def",
            NodeKind::Block { .. } => "Block",
            NodeKind::Lambda { .. } => "Lambda",
            NodeKind::Class { .. } => "Class",
            NodeKind::Module { .. } => "Module",
            NodeKind::RequiredParameter { .. } => "RequiredParameter",
            NodeKind::OptionalParameter { .. } => "OptionalParameter",
            NodeKind::RestParameter { .. } => "RestParameter",
            NodeKind::RequiredKeywordParameter { .. } => "RequiredKeywordParameter",
            NodeKind::OptionalKeywordParameter { .. } => "OptionalKeywordParameter",
            NodeKind::KeywordRestParameter { .. } => "KeywordRestParameter",
            NodeKind::NoKeywordsParameter => "NoKeywordsParameter",
            NodeKind::ForwardingParameter => "ForwardingParameter",
            NodeKind::BlockParameter { .. } => "BlockParameter",
            NodeKind::MultiTarget { .. } => "MultiTarget",
            NodeKind::MultiWrite { .. } => "MultiWrite",
            NodeKind::ImplicitRest => "ImplicitRest",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
            NodeKind::HashPattern { .. } => "HashPattern",
            NodeKind::FindPattern { .. } => "FindPattern",
            NodeKind::AlternationPattern { .. } => "AlternationPattern",
            NodeKind::CapturePattern { .. } => "CapturePattern",
            NodeKind::PinnedVariable { .. } => "PinnedVariable",
            NodeKind::PinnedExpression { .. } => "PinnedExpression",
        }
    }
}

impl fmt::Display for SyntaxNode {
    /// Compact single-line dump used in diagnostics
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}+{}: {:?}",
            self.kind_name(),
            self.location.offset,
            self.location.length,
            self.kind
        )
    }
}
