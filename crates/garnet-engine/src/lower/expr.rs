//! Expression lowering
//!
//! Literals, variables, constants, calls, operator assignments and method
//! table edits.

use super::Lowerer;
use crate::error::{TranslateError, TranslateResult};
use crate::nodes::{ConstantScope, Kind, Node, ProcKind};
use crate::scope::{ScopeKind, DEFAULT_KEYWORD_REST_NAME, DEFAULT_REST_NAME, FORWARDED_BLOCK_NAME};
use crate::syntax::{NodeKind, SyntaxNode};
use log::{info, warn};
use rustc_hash::FxHashSet;

impl Lowerer {
    // ========================================================================
    // Literals
    // ========================================================================

    pub(super) fn lower_integer(&self, syntax: &SyntaxNode, text: &str) -> TranslateResult<Node> {
        parse_integer(text).map(Node::new).map_err(|message| {
            TranslateError::internal(
                message,
                format!("integer literal at {}:{}", self.source_name(), self.line_of(syntax)),
            )
        })
    }

    /// Hash literal or keyword arguments; `**splat` entries split it into a `ConcatHash`
    pub(super) fn lower_hash(&mut self, elements: &[SyntaxNode]) -> TranslateResult<Node> {
        let mut parts: Vec<Node> = Vec::new();
        let mut pairs: Vec<(Node, Node)> = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for element in elements {
            match &element.kind {
                NodeKind::Assoc { key, value } => {
                    if let Some(literal) = literal_key(key) {
                        if !seen.insert(literal.clone()) {
                            warn!(
                                "key {} is duplicated and overwritten on line {}",
                                literal,
                                self.line_of(key)
                            );
                        }
                    }
                    let key_node = self.lower_node(key)?;
                    let value_node = match value {
                        Some(value) => self.lower_node(value)?,
                        None => self.lower_omitted_hash_value(key)?,
                    };
                    pairs.push((key_node, value_node));
                }
                NodeKind::AssocSplat { value } => {
                    if !pairs.is_empty() {
                        parts.push(Node::new(Kind::Hash(std::mem::take(&mut pairs))));
                    }
                    let splatted = match value {
                        Some(value) => self.lower_node(value)?,
                        None => self.read_anonymous(element, DEFAULT_KEYWORD_REST_NAME, "keyword rest")?,
                    };
                    parts.push(splatted);
                }
                _ => return Err(self.default_visit(element)),
            }
        }

        if parts.is_empty() {
            return Ok(Node::new(Kind::Hash(pairs)));
        }
        if !pairs.is_empty() {
            parts.push(Node::new(Kind::Hash(pairs)));
        }
        Ok(Node::new(Kind::ConcatHash(parts)))
    }

    /// `{x:}` reads the local `x`, or calls `x` when there is no such local
    fn lower_omitted_hash_value(&mut self, key: &SyntaxNode) -> TranslateResult<Node> {
        let name = match &key.kind {
            NodeKind::Symbol { value } => value,
            _ => return Err(self.default_visit(key)),
        };
        if self.arena.find(self.scope, name).is_some() {
            return self.read_local(name);
        }
        let mut call = Node::call(self.self_node(), name.clone(), Vec::new());
        if let Kind::Call { private, .. } = &mut call.kind {
            *private = true;
        }
        Ok(call)
    }

    pub(super) fn lower_splat(
        &mut self,
        syntax: &SyntaxNode,
        expression: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let value = match expression {
            Some(expression) => self.lower_node(expression)?,
            None => self.read_anonymous(syntax, DEFAULT_REST_NAME, "rest")?,
        };
        Ok(Node::new(Kind::Splat(Box::new(value))))
    }

    /// `` `cmd` `` calls `` ` `` on self with the command string
    pub(super) fn lower_backtick(&mut self, command: Node) -> Node {
        let mut call = Node::call(self.self_node(), "`", vec![command]);
        if let Kind::Call { private, .. } = &mut call.kind {
            *private = true;
        }
        call
    }

    /// `$1`, `$2`, ... read the groups of `$~`
    pub(super) fn lower_numbered_reference(&self, number: u32) -> Node {
        Node::new(Kind::ReadNthMatch {
            match_data: Box::new(Node::new(Kind::ReadGlobal("$~".to_string()))),
            index: number,
        })
    }

    // ========================================================================
    // yield, defined?, alias, undef
    // ========================================================================

    pub(super) fn lower_yield(
        &mut self,
        syntax: &SyntaxNode,
        arguments: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        if self.yield_is_invalid() {
            return Err(self.syntax_error(syntax, "Invalid yield"));
        }
        let (arguments, _) = self.lower_call_arguments(arguments)?;
        Ok(Node::new(Kind::Yield { arguments }))
    }

    /// No method encloses the frame root, so there is no block to yield to
    fn yield_is_invalid(&self) -> bool {
        matches!(
            self.arena.get(self.body_scope).kind(),
            ScopeKind::TopLevel | ScopeKind::Module
        )
    }

    /// `defined?(yield)` is nil where `yield` itself would not lower
    pub(super) fn lower_defined(&mut self, value: &SyntaxNode) -> TranslateResult<Node> {
        if matches!(value.kind, NodeKind::Yield { .. }) && self.yield_is_invalid() {
            return Ok(Node::nil());
        }
        let value = self.lower_node(value)?;
        Ok(Node::new(Kind::Defined(Box::new(value))))
    }

    pub(super) fn lower_alias(
        &mut self,
        syntax: &SyntaxNode,
        new_name: &SyntaxNode,
        old_name: &SyntaxNode,
    ) -> TranslateResult<Node> {
        match (&new_name.kind, &old_name.kind) {
            (NodeKind::GlobalVariableRead { name: new }, NodeKind::GlobalVariableRead { name: old })
            | (NodeKind::GlobalVariableRead { name: new }, NodeKind::BackReferenceRead { name: old }) => {
                Ok(Node::new(Kind::AliasGlobal {
                    new_name: new.clone(),
                    old_name: old.clone(),
                }))
            }
            (NodeKind::GlobalVariableRead { .. }, _) | (_, NodeKind::GlobalVariableRead { .. }) => {
                Err(self.default_visit(syntax))
            }
            _ => {
                let new_name = self.lower_node(new_name)?;
                let old_name = self.lower_node(old_name)?;
                Ok(Node::new(Kind::AliasMethod {
                    new_name: Box::new(new_name),
                    old_name: Box::new(old_name),
                }))
            }
        }
    }

    /// Read an anonymous parameter forwarded by `*`, `**` or `&`
    fn read_anonymous(&self, syntax: &SyntaxNode, name: &str, what: &str) -> TranslateResult<Node> {
        if self.arena.find(self.scope, name).is_none() {
            return Err(self.syntax_error(syntax, format!("no anonymous {} parameter", what)));
        }
        self.read_local(name)
    }

    // ========================================================================
    // Variables
    // ========================================================================

    pub(super) fn lower_local_write(&mut self, name: &str, value: &SyntaxNode) -> TranslateResult<Node> {
        // Declared before the value so `a = a` sees the new local
        self.arena.declare_for_assignment(self.scope, name);
        let value = self.lower_node(value)?;
        Ok(self.write_local(name, value))
    }

    pub(super) fn lower_local_operator_write(
        &mut self,
        name: &str,
        operator: &str,
        value: &SyntaxNode,
    ) -> TranslateResult<Node> {
        self.arena.declare_for_assignment(self.scope, name);
        let read = self.read_local(name)?;
        let value = self.lower_node(value)?;
        Ok(self.write_local(name, Node::call(read, operator, vec![value])))
    }

    pub(super) fn lower_local_logical_write(
        &mut self,
        name: &str,
        value: &SyntaxNode,
        and: bool,
    ) -> TranslateResult<Node> {
        self.arena.declare_for_assignment(self.scope, name);
        let read = self.read_local(name)?;
        let value = self.lower_node(value)?;
        let write = self.write_local(name, value);
        Ok(if and {
            Node::and(read, write)
        } else {
            Node::or(read, write)
        })
    }

    pub(super) fn lower_instance_variable_operator_write(
        &mut self,
        name: &str,
        operator: &str,
        value: &SyntaxNode,
    ) -> TranslateResult<Node> {
        let read = Node::new(Kind::ReadInstanceVariable(name.to_string()));
        let value = self.lower_node(value)?;
        let write = |value: Node| {
            Node::new(Kind::WriteInstanceVariable {
                name: name.to_string(),
                value: Box::new(value),
            })
        };
        Ok(match operator {
            "||" => Node::or(read, write(value)),
            "&&" => Node::and(read, write(value)),
            _ => write(Node::call(read, operator, vec![value])),
        })
    }

    // ========================================================================
    // Constants
    // ========================================================================

    pub(super) fn lexical_constant_scope(&self) -> ConstantScope {
        ConstantScope::Lexical {
            dynamic: self.dynamic_constants,
        }
    }

    pub(super) fn read_lexical_constant(&self, syntax: &SyntaxNode, name: &str) -> Node {
        if self.dynamic_constants && self.session.options.log_dynamic_constant_lookup {
            info!(
                "dynamic constant lookup of {} at {}:{}",
                name,
                self.source_name(),
                self.line_of(syntax)
            );
        }
        Node::new(Kind::ReadConstant {
            scope: self.lexical_constant_scope(),
            name: name.to_string(),
        })
    }

    /// Scope of `Parent::Name`, or of `::Name` when `parent` is absent
    pub(super) fn constant_path_scope(&mut self, parent: Option<&SyntaxNode>) -> TranslateResult<ConstantScope> {
        Ok(match parent {
            Some(parent) => ConstantScope::Scoped(Box::new(self.lower_node(parent)?)),
            None => ConstantScope::Root,
        })
    }

    pub(super) fn lower_constant_path_write(
        &mut self,
        target: &SyntaxNode,
        value: &SyntaxNode,
    ) -> TranslateResult<Node> {
        let (parent, name) = match &target.kind {
            NodeKind::ConstantPath { parent, name } => (parent.as_deref(), name),
            _ => return Err(self.default_visit(target)),
        };
        let scope = self.constant_path_scope(parent)?;
        let value = self.lower_node(value)?;
        Ok(Node::new(Kind::WriteConstant {
            scope,
            name: name.clone(),
            value: Box::new(value),
        }))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    pub(super) fn lower_call(
        &mut self,
        syntax: &SyntaxNode,
        receiver: Option<&SyntaxNode>,
        name: &str,
        arguments: Option<&SyntaxNode>,
        block: Option<&SyntaxNode>,
        safe_navigation: bool,
    ) -> TranslateResult<Node> {
        let private = receiver.is_none();
        let receiver = match receiver {
            Some(receiver) => self.lower_node(receiver)?,
            None => self.self_node(),
        };
        let (arguments, block_pass) = self.lower_call_arguments(arguments)?;
        let lambda = private && name == "lambda";
        let block = self.lower_call_block(syntax, block, block_pass, lambda)?;

        Ok(Node::new(Kind::Call {
            receiver: Box::new(receiver),
            method: name.to_string(),
            arguments,
            block: block.map(Box::new),
            private,
            safe_navigation,
        }))
    }

    /// Arguments of a call, with a `&block` argument split off
    pub(super) fn lower_call_arguments(
        &mut self,
        arguments: Option<&SyntaxNode>,
    ) -> TranslateResult<(Vec<Node>, Option<Node>)> {
        let arguments = match arguments {
            Some(arguments) => arguments,
            None => return Ok((Vec::new(), None)),
        };
        let list = match &arguments.kind {
            NodeKind::Arguments { arguments } => arguments,
            _ => return Err(self.default_visit(arguments)),
        };

        let mut lowered = Vec::with_capacity(list.len());
        let mut block_pass = None;
        for argument in list {
            let node = self.lower_node(argument)?;
            if matches!(argument.kind, NodeKind::BlockArgument { .. }) {
                block_pass = Some(node);
            } else {
                lowered.push(node);
            }
        }
        Ok((lowered, block_pass))
    }

    /// Block literal or `&value` attached to a call
    pub(super) fn lower_call_block(
        &mut self,
        call: &SyntaxNode,
        block: Option<&SyntaxNode>,
        block_pass: Option<Node>,
        lambda: bool,
    ) -> TranslateResult<Option<Node>> {
        let block = match block {
            Some(block) => block,
            None => return Ok(block_pass),
        };
        if block_pass.is_some() {
            return Err(self.syntax_error(call, "both block arg and actual block given"));
        }
        match &block.kind {
            NodeKind::Block {
                parameters,
                body,
                locals,
            } => self
                .lower_block(
                    block,
                    parameters.as_deref(),
                    body.as_deref(),
                    locals,
                    ProcKind::Proc,
                    lambda,
                )
                .map(Some),
            NodeKind::BlockArgument { .. } => self.lower_node(block).map(Some),
            _ => Err(self.default_visit(block)),
        }
    }

    pub(super) fn lower_block_pass(
        &mut self,
        syntax: &SyntaxNode,
        expression: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let value = match expression {
            Some(expression) => self.lower_node(expression)?,
            None => self.read_anonymous(syntax, FORWARDED_BLOCK_NAME, "block")?,
        };
        Ok(Node::new(Kind::BlockPass(Box::new(value))))
    }

    /// `recv[args] op= value` with the receiver and indices evaluated once
    pub(super) fn lower_index_operator_write(
        &mut self,
        syntax: &SyntaxNode,
        receiver: &SyntaxNode,
        arguments: Option<&SyntaxNode>,
        operator: &str,
        value: &SyntaxNode,
    ) -> TranslateResult<Node> {
        let mut prolog = Vec::new();
        let receiver = self.lower_node(receiver)?;
        let (write, receiver) = self.temp("opelementassign", receiver);
        prolog.push(write);

        let (indices, _) = self.lower_call_arguments(arguments)?;
        let mut index_reads = Vec::with_capacity(indices.len());
        for index in indices {
            let read = match index.kind {
                Kind::Splat(inner) => {
                    let (write, read) = self.temp("opelementassign", *inner);
                    prolog.push(write);
                    Node::new(Kind::Splat(Box::new(read)))
                }
                _ => {
                    let (write, read) = self.temp("opelementassign", index);
                    prolog.push(write);
                    read
                }
            };
            index_reads.push(read);
        }

        let current = Node::call(receiver.clone(), "[]", index_reads.clone());
        let value = self.lower_node(value)?;
        let store = |value: Node| {
            let mut arguments = index_reads.clone();
            arguments.push(value);
            Node::call(receiver.clone(), "[]=", arguments)
        };
        let operation = match operator {
            "||" => Node::or(current, store(value)),
            "&&" => Node::and(current, store(value)),
            _ => store(Node::call(current, operator, vec![value])),
        };
        prolog.push(operation);
        Ok(super::sequence(syntax.location, prolog))
    }

    pub(super) fn lower_explicit_super(
        &mut self,
        syntax: &SyntaxNode,
        arguments: Option<&SyntaxNode>,
        block: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let (arguments, block_pass) = self.lower_call_arguments(arguments)?;
        let block = self.lower_call_block(syntax, block, block_pass, false)?;
        Ok(Node::new(Kind::SuperCall {
            arguments: Box::new(Node::new(Kind::Array(arguments))),
            block: block.map(Box::new),
            implicit: false,
        }))
    }
}

/// Printable form of a literal hash key, for duplicate detection
fn literal_key(key: &SyntaxNode) -> Option<String> {
    match &key.kind {
        NodeKind::Symbol { value } => Some(format!(":{}", value)),
        NodeKind::String { value } => Some(format!("{:?}", value)),
        NodeKind::Integer { value } => Some(value.replace('_', "")),
        NodeKind::Nil => Some("nil".to_string()),
        NodeKind::True => Some("true".to_string()),
        NodeKind::False => Some("false".to_string()),
        _ => None,
    }
}

/// Parse an integer literal as written in source
///
/// Accepts a sign, `_` separators and the `0x`, `0b`, `0o`, `0d` and leading
/// `0` radix prefixes. Values outside `i64` become [`Kind::BigInteger`].
pub(crate) fn parse_integer(text: &str) -> Result<Kind, String> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (negative, unsigned) = match cleaned.as_bytes().first() {
        Some(b'-') => (true, &cleaned[1..]),
        Some(b'+') => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if lower.len() > 1 && lower.starts_with('0') {
        match lower.as_bytes()[1] {
            b'x' => (16, &lower[2..]),
            b'b' => (2, &lower[2..]),
            b'o' => (8, &lower[2..]),
            b'd' => (10, &lower[2..]),
            _ => (8, &lower[1..]),
        }
    } else {
        (10, lower.as_str())
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(format!("malformed integer literal {:?}", text));
    }

    let signed = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    match i64::from_str_radix(&signed, radix) {
        Ok(value) => Ok(Kind::Integer(value)),
        Err(_) => Ok(Kind::BigInteger {
            digits: digits.trim_start_matches('0').to_string(),
            radix,
            negative,
        }),
    }
}
