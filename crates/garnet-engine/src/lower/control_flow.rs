//! Control flow lowering
//!
//! Conditionals, loops, jumps, `case`/`when`, `begin`/`rescue`/`ensure`,
//! `END { }` and the `for` desugaring.

use super::{sequence, Lowerer};
use crate::error::{TranslateError, TranslateResult};
use crate::nodes::{
    Arity, BlockDefinition, Kind, MissingArgumentBehavior, Node, ProcKind, RescueClause, RescueMatch,
};
use crate::scope::{layout_of, ScopeKind};
use crate::syntax::{NodeKind, SyntaxNode};

impl Lowerer {
    /// `begin`, with any of `rescue`, `else` and `ensure`
    ///
    /// An `else` without a `rescue` is ignored.
    pub(super) fn lower_begin(
        &mut self,
        syntax: &SyntaxNode,
        statements: Option<&SyntaxNode>,
        rescue_clause: Option<&SyntaxNode>,
        else_clause: Option<&SyntaxNode>,
        ensure: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let mut body = self.lower_or_implicit_nil(statements)?;
        if let Some(first) = rescue_clause {
            let rescues = self.lower_rescue_clauses(first)?;
            let else_body = else_clause.map(|e| self.lower_node(e)).transpose()?;
            body = Node::new(Kind::Try {
                body: Box::new(body),
                rescues,
                else_body: else_body.map(Box::new),
            });
        }
        match ensure {
            Some(ensure) => {
                let ensure = self.lower_node(ensure)?;
                Ok(Node::new(Kind::Ensure {
                    body: Box::new(body),
                    ensure: Box::new(ensure),
                }))
            }
            None => Ok(sequence(syntax.location, vec![body])),
        }
    }

    /// Walk the `rescue` chain; a splatted entry splits its clause in three
    /// parts sharing one handler body: the classes before it, the splat, and
    /// the classes after it
    fn lower_rescue_clauses(&mut self, first: &SyntaxNode) -> TranslateResult<Vec<RescueClause>> {
        let mut rescues = Vec::new();
        let mut clause = Some(first);
        while let Some(current) = clause {
            let (exceptions, reference, statements, subsequent) = match &current.kind {
                NodeKind::Rescue {
                    exceptions,
                    reference,
                    statements,
                    subsequent,
                } => (exceptions, reference.as_deref(), statements.as_deref(), subsequent.as_deref()),
                _ => return Err(self.default_visit(current)),
            };

            let mut matchers = Vec::new();
            let mut classes = Vec::new();
            for exception in exceptions {
                match &exception.kind {
                    NodeKind::Splat { expression } => {
                        if !classes.is_empty() {
                            matchers.push(RescueMatch::Classes(std::mem::take(&mut classes)));
                        }
                        let list = self.lower_or_nil(expression.as_deref())?;
                        matchers.push(RescueMatch::Splat(Box::new(list)));
                    }
                    _ => classes.push(self.lower_node(exception)?),
                }
            }
            if !classes.is_empty() {
                matchers.push(RescueMatch::Classes(classes));
            }
            if matchers.is_empty() {
                matchers.push(RescueMatch::StandardError);
            }

            let body = self.lower_rescue_body(current, reference, statements)?;
            for matcher in matchers {
                rescues.push(RescueClause {
                    matcher,
                    body: body.clone(),
                });
            }
            clause = subsequent;
        }
        Ok(rescues)
    }

    /// Handler body; `retry` is valid inside it
    fn lower_rescue_body(
        &mut self,
        clause: &SyntaxNode,
        reference: Option<&SyntaxNode>,
        statements: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let previous = std::mem::replace(&mut self.in_rescue, true);
        let body = self.lower_rescue_body_parts(clause, reference, statements);
        self.in_rescue = previous;
        body
    }

    fn lower_rescue_body_parts(
        &mut self,
        clause: &SyntaxNode,
        reference: Option<&SyntaxNode>,
        statements: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let mut parts = Vec::with_capacity(2);
        if let Some(reference) = reference {
            parts.push(self.lower_target_write(reference, Node::new(Kind::CurrentException))?);
        }
        parts.push(self.lower_or_nil(statements)?);
        Ok(sequence(clause.location, parts))
    }

    /// `expression rescue fallback` handles StandardError only
    pub(super) fn lower_rescue_modifier(
        &mut self,
        expression: &SyntaxNode,
        rescue_expression: &SyntaxNode,
    ) -> TranslateResult<Node> {
        let body = self.lower_node(expression)?;
        let previous = std::mem::replace(&mut self.in_rescue, true);
        let fallback = self.lower_node(rescue_expression);
        self.in_rescue = previous;
        Ok(Node::new(Kind::Try {
            body: Box::new(body),
            rescues: vec![RescueClause {
                matcher: RescueMatch::StandardError,
                body: fallback?,
            }],
            else_body: None,
        }))
    }

    /// `END { }`; the statements after it are folded in by [`sequence`]
    pub(super) fn lower_post_execution(&mut self, statements: Option<&SyntaxNode>) -> TranslateResult<Node> {
        let cleanup = self.lower_or_nil(statements)?;
        Ok(Node::new(Kind::DeferredCleanup {
            cleanup: Box::new(cleanup),
            rest: None,
        }))
    }

    /// `if` and `unless`; `negate` swaps the branches
    pub(super) fn lower_if(
        &mut self,
        syntax: &SyntaxNode,
        predicate: &SyntaxNode,
        statements: Option<&SyntaxNode>,
        subsequent: Option<&SyntaxNode>,
        negate: bool,
    ) -> TranslateResult<Node> {
        let condition = self.lower_node(predicate)?;
        let then_body = statements.map(|s| self.lower_node(s)).transpose()?;
        let else_body = subsequent.map(|s| self.lower_node(s)).transpose()?;

        if then_body.is_none() && else_body.is_none() {
            return Ok(sequence(syntax.location, vec![condition, Node::nil()]));
        }
        let (then_body, else_body) = if negate {
            (else_body, then_body)
        } else {
            (then_body, else_body)
        };
        Ok(Node::new(Kind::If {
            condition: Box::new(condition),
            then_body: then_body.map(Box::new),
            else_body: else_body.map(Box::new),
        }))
    }

    /// `while` and `until`; `negate` inverts the condition
    pub(super) fn lower_while(
        &mut self,
        predicate: &SyntaxNode,
        statements: Option<&SyntaxNode>,
        do_while: bool,
        negate: bool,
    ) -> TranslateResult<Node> {
        let break_id = self.allocate_break_id();
        self.loops.push(break_id);
        let lowered = self.lower_loop_parts(predicate, statements);
        self.loops.pop();
        let (condition, body) = lowered?;

        let condition = if negate { Node::not(condition) } else { condition };
        Ok(Node::new(Kind::While {
            condition: Box::new(condition),
            body: Box::new(body),
            do_while,
            break_id,
        }))
    }

    fn lower_loop_parts(
        &mut self,
        predicate: &SyntaxNode,
        statements: Option<&SyntaxNode>,
    ) -> TranslateResult<(Node, Node)> {
        let condition = self.lower_node(predicate)?;
        let body = self.lower_or_implicit_nil(statements)?;
        Ok((condition, body))
    }

    /// `for index in collection` as `collection.each { |%temp_for| index = %temp_for; ... }`
    ///
    /// The block scope does not own assignments, so the index and any local
    /// first written in the body live in the enclosing scope.
    pub(super) fn lower_for(
        &mut self,
        syntax: &SyntaxNode,
        index: &SyntaxNode,
        collection: &SyntaxNode,
        statements: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let collection = self.lower_node(collection)?;

        let block_scope = self.arena.child_scope(self.scope, ScopeKind::Block, false);
        let break_id = self.allocate_break_id();
        let saved = self.enter_block(block_scope, break_id);
        let body = self.lower_for_body(syntax, index, statements);
        self.leave_block(saved);
        let body = body?;

        let block = Node::new(Kind::BlockDefinition(Box::new(BlockDefinition {
            kind: ProcKind::Proc,
            arity: Arity {
                required: 1,
                ..Arity::default()
            },
            layout: layout_of(block_scope),
            break_id,
            body,
            lambda_body: None,
        })));
        Ok(Node::new(Kind::Call {
            receiver: Box::new(collection),
            method: "each".to_string(),
            arguments: Vec::new(),
            block: Some(Box::new(block)),
            private: false,
            safe_navigation: false,
        }))
    }

    fn lower_for_body(
        &mut self,
        syntax: &SyntaxNode,
        index: &SyntaxNode,
        statements: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let prologue = self.self_prologue();
        let argument = Node::new(Kind::ReadPreArgument {
            index: 0,
            keyword_arguments: false,
            missing: MissingArgumentBehavior::Nil,
        });
        let (store, element) = self.temp("for", argument);
        let assign = self.lower_target_write(index, element)?;
        let body = self.lower_or_implicit_nil(statements)?;
        Ok(sequence(syntax.location, vec![prologue, store, assign, body]))
    }

    // ========================================================================
    // Jumps
    // ========================================================================

    pub(super) fn lower_break(
        &mut self,
        syntax: &SyntaxNode,
        arguments: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let break_id = match self.loops.last().copied().or(self.block_break) {
            Some(id) => id,
            None => return Err(self.syntax_error(syntax, "Invalid break")),
        };
        let value = self.lower_jump_value(arguments)?;
        Ok(Node::new(Kind::Break {
            break_id,
            value: Box::new(value),
        }))
    }

    pub(super) fn lower_next(
        &mut self,
        syntax: &SyntaxNode,
        arguments: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        if self.loops.is_empty() && self.block_break.is_none() {
            return Err(self.syntax_error(syntax, "Invalid next"));
        }
        let previous = std::mem::replace(&mut self.translating_next, true);
        let value = self.lower_jump_value(arguments);
        self.translating_next = previous;
        Ok(Node::new(Kind::Next {
            value: Box::new(value?),
        }))
    }

    pub(super) fn lower_redo(&mut self, syntax: &SyntaxNode) -> TranslateResult<Node> {
        if self.loops.is_empty() && self.block_break.is_none() {
            return Err(self.syntax_error(syntax, "Invalid redo"));
        }
        Ok(Node::new(Kind::Redo))
    }

    pub(super) fn lower_retry(&mut self, syntax: &SyntaxNode) -> TranslateResult<Node> {
        if !self.in_rescue {
            return Err(self.syntax_error(syntax, "Invalid retry"));
        }
        Ok(Node::new(Kind::Retry))
    }

    pub(super) fn lower_return(&mut self, arguments: Option<&SyntaxNode>) -> TranslateResult<Node> {
        let value = self.lower_jump_value(arguments)?;
        Ok(Node::new(Kind::Return {
            value: Box::new(value),
            from_block: self.block_break.is_some(),
        }))
    }

    /// Value of `break`/`next`/`return`: nil, the single argument, or an array
    fn lower_jump_value(&mut self, arguments: Option<&SyntaxNode>) -> TranslateResult<Node> {
        let (mut values, _) = self.lower_call_arguments(arguments)?;
        if values.len() == 1 && !matches!(values[0].kind, Kind::Splat(_)) {
            return Ok(values.remove(0));
        }
        if values.is_empty() {
            return Ok(Node::nil());
        }
        Ok(Node::new(Kind::Array(values)))
    }

    // ========================================================================
    // case / when
    // ========================================================================

    /// `case` as an `If` chain of `===` tests against the cached subject
    pub(super) fn lower_case(
        &mut self,
        syntax: &SyntaxNode,
        predicate: Option<&SyntaxNode>,
        conditions: &[SyntaxNode],
        else_clause: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let mut statements = Vec::new();
        let subject = match predicate {
            Some(predicate) => {
                let value = self.lower_node(predicate)?;
                let (store, read) = self.temp("case", value);
                statements.push(store);
                Some(read)
            }
            None => None,
        };

        let mut arms = Vec::with_capacity(conditions.len());
        for clause in conditions {
            let (tests, body) = match &clause.kind {
                NodeKind::When {
                    conditions,
                    statements,
                } => (conditions, statements.as_deref()),
                _ => return Err(self.default_visit(clause)),
            };
            let mut test: Option<Node> = None;
            for condition in tests {
                let check = self.lower_when_test(condition, subject.as_ref())?;
                test = Some(match test {
                    Some(previous) => Node::or(previous, check),
                    None => check,
                });
            }
            let test = test.ok_or_else(|| {
                TranslateError::internal("when clause without conditions", "case lowering")
            })?;
            let body = self.lower_or_nil(body)?;
            arms.push((test, body));
        }

        let mut result = self.lower_or_nil(else_clause)?;
        for (test, body) in arms.into_iter().rev() {
            result = Node::if_else(test, body, result);
        }
        statements.push(result);
        Ok(sequence(syntax.location, statements))
    }

    fn lower_when_test(&mut self, condition: &SyntaxNode, subject: Option<&Node>) -> TranslateResult<Node> {
        if let NodeKind::Splat { expression } = &condition.kind {
            let values = self.lower_or_nil(expression.as_deref())?;
            return Ok(match subject {
                Some(subject) => Node::call(
                    Node::new(Kind::InternalModule),
                    "when_splat",
                    vec![values, subject.clone()],
                ),
                None => Node::call(values, "any?", Vec::new()),
            });
        }
        let test = self.lower_node(condition)?;
        Ok(match subject {
            Some(subject) => Node::call(test, "===", vec![subject.clone()]),
            None => test,
        })
    }
}
