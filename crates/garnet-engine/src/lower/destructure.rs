//! Destructuring assignment
//!
//! `a, b.c, d[i], *e = value` and `|(a, (b, c))|` both lower to a
//! [`MultipleAssignment`] whose targets are write nodes fed by
//! [`Kind::AssignedValue`]. Receivers and indices of attribute and index
//! targets are evaluated into temps by a prolog that runs before the
//! right-hand side.

use super::{sequence, Lowerer};
use crate::error::{TranslateError, TranslateResult};
use crate::nodes::{Kind, MultipleAssignment, Node, SplatNilBehavior};
use crate::syntax::{NodeKind, SyntaxNode};

/// Placement of the target list being lowered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetContext {
    /// `a, b = value`
    Write,
    /// `|(a, b)|` and `def m((a, b))`
    Parameter,
}

impl Lowerer {
    /// `lefts, *rest, rights = value`
    pub(super) fn lower_multi_write(
        &mut self,
        syntax: &SyntaxNode,
        lefts: &[SyntaxNode],
        rest: Option<&SyntaxNode>,
        rights: &[SyntaxNode],
        value: &SyntaxNode,
    ) -> TranslateResult<Node> {
        let mut prolog = Vec::new();
        let mut assignment = self.lower_target_list(lefts, rest, rights, &mut prolog, TargetContext::Write)?;
        assignment.value = Some(self.lower_node(value)?);

        prolog.push(Node::new(Kind::MultipleAssignment(Box::new(assignment))));
        Ok(sequence(syntax.location, prolog))
    }

    /// Bind a `(a, b)` parameter from an argument read
    pub(super) fn destructure_parameter(&mut self, target: &SyntaxNode, value: Node) -> TranslateResult<Node> {
        match &target.kind {
            NodeKind::MultiTarget { lefts, rest, rights } => {
                let mut prolog = Vec::new();
                let mut assignment = self.lower_target_list(
                    lefts,
                    rest.as_deref(),
                    rights,
                    &mut prolog,
                    TargetContext::Parameter,
                )?;
                assignment.value = Some(value);
                prolog.push(Node::new(Kind::MultipleAssignment(Box::new(assignment))));
                Ok(sequence(target.location, prolog))
            }
            _ => Err(TranslateError::internal(
                format!("cannot destructure a {} parameter", target.kind_name()),
                "parameter destructuring",
            )),
        }
    }

    /// Assign an already lowered `value` to a single target or a target list
    pub(super) fn lower_target_write(&mut self, target: &SyntaxNode, value: Node) -> TranslateResult<Node> {
        let mut prolog = Vec::new();
        let assignment = match &target.kind {
            NodeKind::MultiTarget { lefts, rest, rights } => {
                let mut assignment =
                    self.lower_target_list(lefts, rest.as_deref(), rights, &mut prolog, TargetContext::Write)?;
                assignment.value = Some(value);
                Node::new(Kind::MultipleAssignment(Box::new(assignment)))
            }
            _ => {
                let assignable = self.lower_assignable(target, &mut prolog, TargetContext::Write)?;
                replace_assigned_value(assignable, value)
            }
        };
        prolog.push(assignment);
        Ok(sequence(target.location, prolog))
    }

    fn lower_target_list(
        &mut self,
        lefts: &[SyntaxNode],
        rest: Option<&SyntaxNode>,
        rights: &[SyntaxNode],
        prolog: &mut Vec<Node>,
        context: TargetContext,
    ) -> TranslateResult<MultipleAssignment> {
        let mut pre = Vec::with_capacity(lefts.len());
        for target in lefts {
            pre.push(self.lower_assignable(target, prolog, context)?);
        }
        let rest = match rest {
            Some(rest) => self.lower_rest_target(rest, prolog, context)?,
            None => None,
        };
        let mut post = Vec::with_capacity(rights.len());
        for target in rights {
            post.push(self.lower_assignable(target, prolog, context)?);
        }
        let splat = if self.translating_next {
            SplatNilBehavior::EmptyArray
        } else {
            SplatNilBehavior::ArrayWithNil
        };
        Ok(MultipleAssignment {
            pre,
            rest,
            post,
            splat,
            value: None,
        })
    }

    fn lower_rest_target(
        &mut self,
        rest: &SyntaxNode,
        prolog: &mut Vec<Node>,
        context: TargetContext,
    ) -> TranslateResult<Option<Node>> {
        match &rest.kind {
            NodeKind::Splat {
                expression: Some(target),
            } => Ok(Some(self.lower_assignable(target, prolog, context)?)),
            NodeKind::Splat { expression: None } => Ok(None),
            NodeKind::ImplicitRest => match context {
                TargetContext::Write => Ok(None),
                TargetContext::Parameter => Err(TranslateError::internal(
                    "implicit rest inside a destructured parameter",
                    "parameter destructuring",
                )),
            },
            // `def m((a, *b))` names the rest as a parameter
            NodeKind::RestParameter { name: Some(name) } => {
                Ok(Some(self.write_local_here(name, Node::new(Kind::AssignedValue))))
            }
            NodeKind::RestParameter { name: None } => Ok(None),
            _ => Err(TranslateError::internal(
                format!("unexpected {} in rest target position", rest.kind_name()),
                "destructuring",
            )),
        }
    }

    /// Write node for one target, with its receiver and indices cached in `prolog`
    fn lower_assignable(
        &mut self,
        target: &SyntaxNode,
        prolog: &mut Vec<Node>,
        context: TargetContext,
    ) -> TranslateResult<Node> {
        let assigned = || Box::new(Node::new(Kind::AssignedValue));
        match &target.kind {
            NodeKind::LocalVariableTarget { name } => Ok(match context {
                TargetContext::Write => self.write_local(name, Node::new(Kind::AssignedValue)),
                TargetContext::Parameter => self.write_local_here(name, Node::new(Kind::AssignedValue)),
            }),
            NodeKind::RequiredParameter { name } => {
                Ok(self.write_local_here(name, Node::new(Kind::AssignedValue)))
            }
            NodeKind::InstanceVariableTarget { name } => Ok(Node::new(Kind::WriteInstanceVariable {
                name: name.clone(),
                value: assigned(),
            })),
            NodeKind::ClassVariableTarget { name } => Ok(Node::new(Kind::WriteClassVariable {
                name: name.clone(),
                value: assigned(),
            })),
            NodeKind::GlobalVariableTarget { name } => Ok(Node::new(Kind::WriteGlobal {
                name: name.clone(),
                value: assigned(),
            })),
            NodeKind::ConstantTarget { name } => Ok(Node::new(Kind::WriteConstant {
                scope: self.lexical_constant_scope(),
                name: name.clone(),
                value: assigned(),
            })),
            NodeKind::ConstantPath { parent, name } => {
                let scope = self.constant_path_scope(parent.as_deref())?;
                Ok(Node::new(Kind::WriteConstant {
                    scope,
                    name: name.clone(),
                    value: assigned(),
                }))
            }
            NodeKind::CallTarget {
                receiver,
                name,
                safe_navigation,
            } => {
                let receiver = self.lower_node(receiver)?;
                let (write, receiver) = self.temp("multiple_assignment", receiver);
                prolog.push(write);
                let method = if name.ends_with('=') {
                    name.clone()
                } else {
                    format!("{}=", name)
                };
                Ok(Node::new(Kind::Call {
                    receiver: Box::new(receiver),
                    method,
                    arguments: vec![Node::new(Kind::AssignedValue)],
                    block: None,
                    private: false,
                    safe_navigation: *safe_navigation,
                }))
            }
            NodeKind::IndexTarget { receiver, arguments } => {
                let receiver = self.lower_node(receiver)?;
                let (write, receiver) = self.temp("multiple_assignment", receiver);
                prolog.push(write);
                let (indices, _) = self.lower_call_arguments(arguments.as_deref())?;
                let mut reads = Vec::with_capacity(indices.len() + 1);
                for index in indices {
                    let read = match index.kind {
                        Kind::Splat(inner) => {
                            let (write, read) = self.temp("multiple_assignment", *inner);
                            prolog.push(write);
                            Node::new(Kind::Splat(Box::new(read)))
                        }
                        _ => {
                            let (write, read) = self.temp("multiple_assignment", index);
                            prolog.push(write);
                            read
                        }
                    };
                    reads.push(read);
                }
                reads.push(Node::new(Kind::AssignedValue));
                Ok(Node::call(receiver, "[]=", reads))
            }
            NodeKind::MultiTarget { lefts, rest, rights } => {
                let nested = self.lower_target_list(lefts, rest.as_deref(), rights, prolog, context)?;
                Ok(Node::new(Kind::MultipleAssignment(Box::new(nested))))
            }
            NodeKind::Splat { .. } | NodeKind::ImplicitRest => {
                self.lower_rest_target(target, prolog, context)?.ok_or_else(|| {
                    TranslateError::internal("anonymous rest outside the rest position", "destructuring")
                })
            }
            _ => Err(self.default_visit(target)),
        }
    }
}

/// Feed `value` to a single assignable in place of its sentinel
fn replace_assigned_value(mut assignable: Node, value: Node) -> Node {
    let slot = match &mut assignable.kind {
        Kind::WriteLocal { value, .. }
        | Kind::WriteInstanceVariable { value, .. }
        | Kind::WriteClassVariable { value, .. }
        | Kind::WriteGlobal { value, .. }
        | Kind::WriteConstant { value, .. } => Some(value.as_mut()),
        Kind::Call { arguments, .. } => arguments.last_mut(),
        _ => None,
    };
    if let Some(slot) = slot {
        if matches!(slot.kind, Kind::AssignedValue) {
            *slot = value;
        }
    }
    assignable
}
