//! Bare `super`
//!
//! Re-reads the current values of the enclosing method's parameters, in
//! declaration order, and passes them on. Reads go through the same
//! [`ParameterNames`](super::params::ParameterNames) table the binding pass
//! used, so `def m(_, _)` reloads both placeholder slots.

use super::params::{KeywordRestName, RestName};
use super::Lowerer;
use crate::error::{TranslateError, TranslateResult};
use crate::nodes::{Kind, MissingArgumentBehavior, Node};
use crate::scope::{FORWARDED_KEYWORD_REST_NAME, FORWARDED_REST_NAME, METHOD_BLOCK_NAME};
use crate::syntax::{NodeKind, SyntaxNode};

impl Lowerer {
    pub(super) fn lower_forwarding_super(
        &mut self,
        syntax: &SyntaxNode,
        block: Option<&SyntaxNode>,
    ) -> TranslateResult<Node> {
        let frame = match &self.method {
            Some(frame) => frame.clone(),
            None => return Err(self.syntax_error(syntax, "super called outside of method")),
        };
        let parameters = &frame.parameters;
        let names = &frame.names;
        let keyword_arguments = parameters.accepts_keywords();
        let mut reads = Vec::new();
        let mut rest_index = None;

        for (index, name) in names.requireds.iter().enumerate() {
            reads.push(match name {
                Some(name) => self.read_local(name)?,
                None => self.profile(Node::new(Kind::ReadPreArgument {
                    index,
                    keyword_arguments,
                    missing: MissingArgumentBehavior::Nil,
                })),
            });
        }

        for name in &names.optionals {
            reads.push(self.read_local(name)?);
        }

        if let RestName::Named(name) = &names.rest {
            rest_index = Some(reads.len());
            reads.push(self.read_local(name)?);
        }

        let mut posts = Vec::with_capacity(names.posts.len());
        for (offset, name) in names.posts.iter().enumerate().rev() {
            posts.push(match name {
                Some(name) => self.read_local(name)?,
                None => self.profile(Node::new(Kind::ReadPostArgument {
                    index_from_end: names.posts.len() - offset,
                    keyword_arguments,
                    required: names.requireds.len() + names.posts.len(),
                    optional: names.optionals.len(),
                    has_rest: rest_index.is_some() || names.keyword_rest == KeywordRestName::Forwarding,
                })),
            });
        }
        posts.reverse();
        reads.extend(posts);

        let mut keyword_parts = Vec::new();
        if !names.keywords.is_empty() {
            let mut pairs = Vec::with_capacity(names.keywords.len());
            for (parameter, name) in parameters.keywords.iter().zip(&names.keywords) {
                let key = match &parameter.kind {
                    NodeKind::RequiredKeywordParameter { name }
                    | NodeKind::OptionalKeywordParameter { name, .. } => name.clone(),
                    _ => {
                        return Err(TranslateError::internal(
                            format!("unexpected {} in keyword parameter position", parameter.kind_name()),
                            "super argument reload",
                        ))
                    }
                };
                pairs.push((Node::symbol(key), self.read_local(name)?));
            }
            keyword_parts.push(Node::new(Kind::Hash(pairs)));
        }

        match &names.keyword_rest {
            KeywordRestName::Named(name) => {
                keyword_parts.push(self.read_local(name)?);
                reads.push(Node::new(Kind::ConcatHash(keyword_parts)));
            }
            KeywordRestName::Forwarding => {
                reads.extend(keyword_parts);
                rest_index = Some(names.requireds.len() + names.optionals.len());
                reads.push(self.read_local(FORWARDED_REST_NAME)?);
                reads.push(self.read_local(FORWARDED_KEYWORD_REST_NAME)?);
            }
            KeywordRestName::None | KeywordRestName::NoKeywords => reads.extend(keyword_parts),
        }

        let block = match block {
            Some(block) => self.lower_call_block(syntax, Some(block), None, false)?,
            None => Some(Node::new(Kind::BlockPass(Box::new(self.read_local(METHOD_BLOCK_NAME)?)))),
        };

        Ok(Node::new(Kind::SuperCall {
            arguments: Box::new(Node::new(Kind::ReadZSuperArguments { rest_index, reads })),
            block: block.map(Box::new),
            implicit: true,
        }))
    }
}
