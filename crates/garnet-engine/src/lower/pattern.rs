//! Pattern matching
//!
//! Every pattern lowers to a boolean node tested against an already
//! evaluated value. Bindings are side effects of the test: a local target
//! writes and then yields true.

use super::{sequence, Lowerer};
use crate::error::TranslateResult;
use crate::nodes::{Kind, Node};
use crate::syntax::{NodeKind, SyntaxNode};

impl Lowerer {
    /// `case value in pattern ... end`
    pub(super) fn lower_case_match(
        &mut self,
        syntax: &SyntaxNode,
        predicate: &SyntaxNode,
        conditions: &[SyntaxNode],
        else_clause: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let value = self.lower_node(predicate)?;
        let (store, subject) = self.temp("case_in_value", value);

        let mut arms = Vec::with_capacity(conditions.len());
        for clause in conditions {
            let (pattern, statements) = match &clause.kind {
                NodeKind::In { pattern, statements } => (pattern, statements.as_deref()),
                _ => return Err(self.default_visit(clause)),
            };
            let test = self.lower_pattern(pattern, subject.clone())?;
            let body = self.lower_or_nil(statements)?;
            arms.push((test, body));
        }

        let mut result = match else_clause {
            Some(else_clause) => self.lower_node(else_clause)?,
            None => Node::new(Kind::NoMatchingPattern {
                value: Box::new(subject),
            }),
        };
        for (test, body) in arms.into_iter().rev() {
            result = Node::if_else(test, body, result);
        }
        Ok(sequence(syntax.location, vec![store, result]))
    }

    /// `value in pattern`
    pub(super) fn lower_match_predicate(&mut self, value: &SyntaxNode, pattern: &SyntaxNode) -> TranslateResult<Node> {
        let value = self.lower_node(value)?;
        let (store, subject) = self.temp("match_value", value);
        let test = self.lower_pattern(pattern, subject)?;
        Ok(sequence(pattern.location, vec![store, test]))
    }

    /// `value => pattern`
    pub(super) fn lower_match_required(&mut self, value: &SyntaxNode, pattern: &SyntaxNode) -> TranslateResult<Node> {
        let value = self.lower_node(value)?;
        let (store, subject) = self.temp("match_value", value);
        let test = self.lower_pattern(pattern, subject.clone())?;
        let check = Node::new(Kind::If {
            condition: Box::new(Node::not(test)),
            then_body: Some(Box::new(Node::new(Kind::NoMatchingPattern {
                value: Box::new(subject),
            }))),
            else_body: None,
        });
        Ok(sequence(pattern.location, vec![store, check]))
    }

    /// Boolean test of `value` against `pattern`
    pub(super) fn lower_pattern(&mut self, pattern: &SyntaxNode, value: Node) -> TranslateResult<Node> {
        match &pattern.kind {
            NodeKind::ArrayPattern {
                constant,
                requireds,
                rest,
                posts,
            } => self.lower_array_pattern(pattern, constant.as_deref(), requireds, rest.as_deref(), posts, value),
            NodeKind::HashPattern {
                constant,
                elements,
                rest,
            } => self.lower_hash_pattern(pattern, constant.as_deref(), elements, rest.as_deref(), value),
            NodeKind::FindPattern { .. } => Err(self.syntax_error(pattern, "find pattern is not supported")),
            NodeKind::LocalVariableTarget { name } => {
                let write = self.write_local(name, value);
                Ok(Node::new(Kind::ExecuteAndReturnTrue(Box::new(write))))
            }
            NodeKind::AlternationPattern { left, right } => {
                let left = self.lower_pattern(left, value.clone())?;
                let right = self.lower_pattern(right, value)?;
                Ok(Node::or(left, right))
            }
            NodeKind::CapturePattern {
                value: inner,
                target,
            } => {
                let test = self.lower_pattern(inner, value.clone())?;
                let bind = self.lower_pattern(target, value)?;
                Ok(Node::and(test, bind))
            }
            NodeKind::PinnedVariable { variable } => self.case_equality(variable, value),
            NodeKind::PinnedExpression { expression } => self.case_equality(expression, value),
            NodeKind::Parentheses { body: Some(body) } => self.lower_pattern(body, value),
            NodeKind::Statements { body } if body.len() == 1 => self.lower_pattern(&body[0], value),
            NodeKind::If {
                predicate,
                statements: Some(guarded),
                ..
            } => {
                let test = self.lower_pattern(guarded, value)?;
                let guard = self.lower_node(predicate)?;
                Ok(Node::and(test, guard))
            }
            NodeKind::Unless {
                predicate,
                statements: Some(guarded),
                ..
            } => {
                let test = self.lower_pattern(guarded, value)?;
                let guard = self.lower_node(predicate)?;
                Ok(Node::and(test, Node::not(guard)))
            }
            _ => self.case_equality(pattern, value),
        }
    }

    /// `pattern === value`
    fn case_equality(&mut self, pattern: &SyntaxNode, value: Node) -> TranslateResult<Node> {
        let pattern = self.lower_node(pattern)?;
        Ok(Node::call(pattern, "===", vec![value]))
    }

    fn lower_array_pattern(
        &mut self,
        pattern: &SyntaxNode,
        constant: Option<&SyntaxNode>,
        requireds: &[SyntaxNode],
        rest: Option<&SyntaxNode>,
        posts: &[SyntaxNode],
        value: Node,
    ) -> TranslateResult<Node> {
        let constant_check = constant.map(|c| self.case_equality(c, value.clone())).transpose()?;
        let deconstructed = Node::call(Node::new(Kind::InternalModule), "deconstruct_checked", vec![value]);
        let (store, array) = self.temp("pattern_deconstruct_array", deconstructed);
        let element = |index: i64| {
            Node::new(Kind::ReadConstantIndex {
                array: Box::new(array.clone()),
                index,
            })
        };

        let mut condition = Node::new(Kind::ArrayPatternLengthCheck {
            array: Box::new(array.clone()),
            size: requireds.len() + posts.len(),
            has_rest: rest.is_some(),
        });
        if let Some(check) = constant_check {
            condition = Node::and(check, condition);
        }

        for (index, required) in requireds.iter().enumerate() {
            let test = self.lower_pattern(required, element(index as i64))?;
            condition = Node::and(condition, test);
        }
        if let Some(NodeKind::Splat {
            expression: Some(target),
        }) = rest.map(|r| &r.kind)
        {
            let slice = Node::new(Kind::ArraySlice {
                array: Box::new(array.clone()),
                from: requireds.len() as i64,
                to: -(posts.len() as i64),
            });
            let test = self.lower_pattern(target, slice)?;
            condition = Node::and(condition, test);
        }
        let post_count = posts.len() as i64;
        for (offset, post) in posts.iter().enumerate() {
            let test = self.lower_pattern(post, element(-post_count + offset as i64))?;
            condition = Node::and(condition, test);
        }

        Ok(sequence(pattern.location, vec![store, condition]))
    }

    fn lower_hash_pattern(
        &mut self,
        pattern: &SyntaxNode,
        constant: Option<&SyntaxNode>,
        elements: &[SyntaxNode],
        rest: Option<&SyntaxNode>,
        value: Node,
    ) -> TranslateResult<Node> {
        let mut entries = Vec::with_capacity(elements.len());
        for element in elements {
            match &element.kind {
                NodeKind::Assoc { key, value } => match &key.kind {
                    NodeKind::Symbol { value: name } => entries.push((name.clone(), value.as_deref())),
                    _ => return Err(self.default_visit(key)),
                },
                _ => return Err(self.default_visit(element)),
            }
        }
        let keys = || Node::new(Kind::Array(entries.iter().map(|(name, _)| Node::symbol(name.clone())).collect()));

        let named_rest = matches!(
            rest.map(|r| &r.kind),
            Some(NodeKind::AssocSplat { value: Some(_) })
        );
        let constant_check = constant.map(|c| self.case_equality(c, value.clone())).transpose()?;
        let key_argument = if named_rest { Node::nil() } else { keys() };
        let deconstructed = Node::call(
            Node::new(Kind::InternalModule),
            "deconstruct_keys_checked",
            vec![value, key_argument],
        );
        let (store, hash) = self.temp("pattern_deconstruct_hash", deconstructed);

        let mut condition = Node::not(Node::new(Kind::IsNil(Box::new(hash.clone()))));
        if let Some(check) = constant_check {
            condition = Node::and(check, condition);
        }

        for (name, sub_pattern) in &entries {
            let has_key = Node::call(hash.clone(), "key?", vec![Node::symbol(name.clone())]);
            let fetched = Node::call(hash.clone(), "[]", vec![Node::symbol(name.clone())]);
            let test = match sub_pattern {
                Some(sub_pattern) => self.lower_pattern(sub_pattern, fetched)?,
                None => Node::new(Kind::ExecuteAndReturnTrue(Box::new(self.write_local(name, fetched)))),
            };
            condition = Node::and(condition, Node::and(has_key, test));
        }

        let exact_size = |size: usize| {
            Node::call(
                Node::call(hash.clone(), "size", Vec::new()),
                "==",
                vec![Node::integer(size as i64)],
            )
        };
        match rest {
            Some(rest) => match &rest.kind {
                NodeKind::NoKeywordsParameter => {
                    condition = Node::and(condition, exact_size(entries.len()));
                }
                NodeKind::AssocSplat { value: Some(target) } => {
                    let remaining = Node::call(
                        Node::new(Kind::InternalModule),
                        "hash_pattern_rest",
                        vec![hash.clone(), keys()],
                    );
                    let test = self.lower_pattern(target, remaining)?;
                    condition = Node::and(condition, test);
                }
                NodeKind::AssocSplat { value: None } => {}
                _ => return Err(self.default_visit(rest)),
            },
            // `in {}` only matches an empty hash
            None if entries.is_empty() => {
                condition = Node::and(condition, exact_size(0));
            }
            None => {}
        }

        Ok(sequence(pattern.location, vec![store, condition]))
    }
}
