//! Parameter binding
//!
//! Turns a parameter list into the argument reads that fill the frame's
//! locals. The names every parameter binds are computed once per frame in a
//! [`ParameterNames`] table, which the binding pass and the bare-`super`
//! reload pass both index by position, so repeated placeholder names such
//! as `def m(_, _)` resolve to the same slots in both.

use super::{sequence, Lowerer};
use crate::error::{TranslateError, TranslateResult};
use crate::nodes::{Arity, Kind, MissingArgumentBehavior, Node};
use crate::scope::{
    DEFAULT_KEYWORD_REST_NAME, DEFAULT_REST_NAME, FORWARDED_BLOCK_NAME, FORWARDED_KEYWORD_REST_NAME,
    FORWARDED_REST_NAME, METHOD_BLOCK_NAME,
};
use crate::syntax::{Location, NodeKind, Parameters, SyntaxNode};
use rustc_hash::FxHashSet;

/// Binding of the positional rest parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) enum RestName {
    /// No rest parameter
    #[default]
    None,
    /// `*name`, or `*` bound to the default rest name
    Named(String),
    /// Trailing comma in `|a,|`: no binding, but the block destructures
    Implicit,
}

/// Binding of the keyword rest position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) enum KeywordRestName {
    /// Nothing declared
    #[default]
    None,
    /// `**name`, or `**` bound to the default keyword rest name
    Named(String),
    /// `**nil`
    NoKeywords,
    /// `...`
    Forwarding,
}

/// Local names bound by each parameter, in declaration order
#[derive(Debug, Clone, Default)]
pub(super) struct ParameterNames {
    /// `None` marks a destructuring `(a, b)` parameter
    pub requireds: Vec<Option<String>>,
    pub optionals: Vec<String>,
    pub rest: RestName,
    /// `None` marks a destructuring `(a, b)` parameter
    pub posts: Vec<Option<String>>,
    pub keywords: Vec<String>,
    pub keyword_rest: KeywordRestName,
    pub block: Option<String>,
}

/// Frame whose arguments are being bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ArgumentFrame {
    Method,
    Proc,
    Lambda,
}

/// Arity declared by a parameter list
pub(crate) fn arity_of(parameters: &Parameters) -> Arity {
    let forwarding = parameters.is_forwarding();
    let mut keywords = Vec::with_capacity(parameters.keywords.len());
    let mut required_keywords = 0;
    for keyword in &parameters.keywords {
        match &keyword.kind {
            NodeKind::RequiredKeywordParameter { name } => {
                keywords.push(name.clone());
                required_keywords += 1;
            }
            NodeKind::OptionalKeywordParameter { name, .. } => keywords.push(name.clone()),
            _ => {}
        }
    }
    Arity {
        required: parameters.requireds.len(),
        optional: parameters.optionals.len(),
        has_rest: forwarding
            || matches!(
                parameters.rest.as_deref().map(|r| &r.kind),
                Some(NodeKind::RestParameter { .. })
            ),
        post: parameters.posts.len(),
        keywords,
        required_keywords,
        has_keyword_rest: forwarding
            || matches!(
                parameters.keyword_rest.as_deref().map(|r| &r.kind),
                Some(NodeKind::KeywordRestParameter { .. })
            ),
    }
}

/// Whether a proc called with a single array should spread it over its parameters
pub(crate) fn should_consider_destructuring_array_arg(arity: &Arity) -> bool {
    let required = arity.required_positionals();
    if required == 1 && arity.optional == 0 && !arity.has_rest && arity.has_keyword_rest {
        return true;
    }
    if !arity.has_rest && required + arity.optional <= 1 {
        return false;
    }
    if arity.has_rest && required == 0 {
        return false;
    }
    true
}

impl Lowerer {
    /// Declare every parameter of the current scope and record its name
    pub(super) fn parameter_names(
        &mut self,
        parameters: &Parameters,
        is_method: bool,
    ) -> TranslateResult<ParameterNames> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut names = ParameterNames::default();

        for required in &parameters.requireds {
            let name = self.positional_parameter_name(required, &mut seen)?;
            names.requireds.push(name);
        }
        for optional in &parameters.optionals {
            match &optional.kind {
                NodeKind::OptionalParameter { name, .. } => {
                    let name = self.bind_parameter_name(name, &mut seen);
                    names.optionals.push(name);
                }
                _ => return Err(unexpected_parameter(optional, "optional")),
            }
        }
        if let Some(rest) = parameters.rest.as_deref() {
            names.rest = match &rest.kind {
                NodeKind::RestParameter { name: Some(name) } => {
                    RestName::Named(self.bind_parameter_name(name, &mut seen))
                }
                NodeKind::RestParameter { name: None } => {
                    self.arena.declare(self.scope, DEFAULT_REST_NAME);
                    RestName::Named(DEFAULT_REST_NAME.to_string())
                }
                NodeKind::ImplicitRest => RestName::Implicit,
                _ => return Err(unexpected_parameter(rest, "rest")),
            };
        }
        for post in &parameters.posts {
            let name = self.positional_parameter_name(post, &mut seen)?;
            names.posts.push(name);
        }
        for keyword in &parameters.keywords {
            match &keyword.kind {
                NodeKind::RequiredKeywordParameter { name }
                | NodeKind::OptionalKeywordParameter { name, .. } => {
                    let name = self.bind_parameter_name(name, &mut seen);
                    names.keywords.push(name);
                }
                _ => return Err(unexpected_parameter(keyword, "keyword")),
            }
        }
        if let Some(keyword_rest) = parameters.keyword_rest.as_deref() {
            names.keyword_rest = match &keyword_rest.kind {
                NodeKind::KeywordRestParameter { name: Some(name) } => {
                    KeywordRestName::Named(self.bind_parameter_name(name, &mut seen))
                }
                NodeKind::KeywordRestParameter { name: None } => {
                    self.arena.declare(self.scope, DEFAULT_KEYWORD_REST_NAME);
                    KeywordRestName::Named(DEFAULT_KEYWORD_REST_NAME.to_string())
                }
                NodeKind::NoKeywordsParameter => KeywordRestName::NoKeywords,
                NodeKind::ForwardingParameter => {
                    for name in [FORWARDED_REST_NAME, FORWARDED_KEYWORD_REST_NAME, FORWARDED_BLOCK_NAME] {
                        self.arena.declare(self.scope, name);
                    }
                    KeywordRestName::Forwarding
                }
                _ => return Err(unexpected_parameter(keyword_rest, "keyword rest")),
            };
        }
        if let Some(block) = parameters.block.as_deref() {
            names.block = match &block.kind {
                NodeKind::BlockParameter { name: Some(name) } => {
                    Some(self.bind_parameter_name(name, &mut seen))
                }
                NodeKind::BlockParameter { name: None } => {
                    self.arena.declare(self.scope, FORWARDED_BLOCK_NAME);
                    Some(FORWARDED_BLOCK_NAME.to_string())
                }
                _ => return Err(unexpected_parameter(block, "block")),
            };
        }
        if is_method {
            self.arena.declare(self.scope, METHOD_BLOCK_NAME);
        }
        Ok(names)
    }

    fn positional_parameter_name(
        &mut self,
        parameter: &SyntaxNode,
        seen: &mut FxHashSet<String>,
    ) -> TranslateResult<Option<String>> {
        match &parameter.kind {
            NodeKind::RequiredParameter { name } => Ok(Some(self.bind_parameter_name(name, seen))),
            NodeKind::MultiTarget { .. } => Ok(None),
            _ => Err(unexpected_parameter(parameter, "required")),
        }
    }

    /// First occurrence keeps its name; repeats get a fresh placeholder
    fn bind_parameter_name(&mut self, name: &str, seen: &mut FxHashSet<String>) -> String {
        if seen.insert(name.to_string()) {
            self.arena.declare(self.scope, name);
            name.to_string()
        } else {
            self.arena.allocate_repeated_parameter(self.scope, name)
        }
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Argument reads filling the parameters, in binding order
    pub(super) fn load_arguments(
        &mut self,
        parameters: &Parameters,
        names: &ParameterNames,
        frame: ArgumentFrame,
    ) -> TranslateResult<Vec<Node>> {
        if frame == ArgumentFrame::Method && names.rest == RestName::Implicit {
            return Err(TranslateError::internal(
                "implicit rest in a method parameter list",
                "parameter binding",
            ));
        }
        let keyword_arguments = parameters.accepts_keywords();
        let missing = match frame {
            ArgumentFrame::Proc => MissingArgumentBehavior::Nil,
            ArgumentFrame::Method | ArgumentFrame::Lambda => MissingArgumentBehavior::RuntimeError,
        };
        let required = parameters.requireds.len();
        let optional = parameters.optionals.len();
        let posts = parameters.posts.len();
        let has_rest = !matches!(names.rest, RestName::None)
            || names.keyword_rest == KeywordRestName::Forwarding;
        let mut statements = Vec::new();

        for (index, (parameter, name)) in parameters.requireds.iter().zip(&names.requireds).enumerate() {
            let read = self.profile(Node::new(Kind::ReadPreArgument {
                index,
                keyword_arguments,
                missing,
            }));
            statements.push(self.bind_positional(parameter, name.as_deref(), read)?);
        }

        if frame == ArgumentFrame::Method {
            let slot = self.arena.declare(self.scope, METHOD_BLOCK_NAME);
            statements.push(Node::new(Kind::SaveMethodBlock { slot }));
        }

        for (offset, (parameter, name)) in parameters.optionals.iter().zip(&names.optionals).enumerate() {
            let default = match &parameter.kind {
                NodeKind::OptionalParameter { value, .. } => self.lower_node(value)?,
                _ => return Err(unexpected_parameter(parameter, "optional")),
            };
            let index = required + offset;
            let read = Node::new(Kind::ReadOptionalArgument {
                index,
                minimum: index + 1 + posts,
                keyword_arguments,
                default: Box::new(default),
            });
            statements.push(self.write_local_here(name, read));
        }

        if let RestName::Named(name) = &names.rest {
            let read = Node::new(Kind::ReadRestArgument {
                from: required + optional,
                to: posts,
                keyword_arguments,
            });
            statements.push(self.write_local_here(name, read));
        }

        for offset in (0..posts).rev() {
            let read = Node::new(Kind::ReadPostArgument {
                index_from_end: posts - offset,
                keyword_arguments,
                required: required + posts,
                optional,
                has_rest,
            });
            statements.push(self.bind_positional(
                &parameters.posts[offset],
                names.posts[offset].as_deref(),
                read,
            )?);
        }

        for (parameter, name) in parameters.keywords.iter().zip(&names.keywords) {
            let read = self.read_keyword(parameter)?;
            statements.push(self.write_local_here(name, read));
        }

        statements.extend(self.bind_keyword_rest(parameters, names, required + optional, posts));

        if let Some(block) = &names.block {
            let slot = self.arena.declare(self.scope, block);
            statements.push(Node::new(Kind::SaveMethodBlock { slot }));
        }
        Ok(statements)
    }

    fn bind_positional(
        &mut self,
        parameter: &SyntaxNode,
        name: Option<&str>,
        read: Node,
    ) -> TranslateResult<Node> {
        match name {
            Some(name) => Ok(self.write_local_here(name, read)),
            None => self.destructure_parameter(parameter, read),
        }
    }

    fn read_keyword(&mut self, parameter: &SyntaxNode) -> TranslateResult<Node> {
        match &parameter.kind {
            NodeKind::RequiredKeywordParameter { name } => Ok(Node::new(Kind::ReadKeywordArgument {
                name: name.clone(),
                default: None,
            })),
            NodeKind::OptionalKeywordParameter { name, value } => {
                let default = self.lower_node(value)?;
                Ok(Node::new(Kind::ReadKeywordArgument {
                    name: name.clone(),
                    default: Some(Box::new(default)),
                }))
            }
            _ => Err(unexpected_parameter(parameter, "keyword")),
        }
    }

    fn bind_keyword_rest(
        &mut self,
        parameters: &Parameters,
        names: &ParameterNames,
        rest_from: usize,
        posts: usize,
    ) -> Vec<Node> {
        let excluded = keyword_names(parameters);
        match &names.keyword_rest {
            KeywordRestName::None => Vec::new(),
            KeywordRestName::Named(name) => {
                let read = Node::new(Kind::ReadKeywordRestArgument { excluded });
                vec![self.write_local_here(name, read)]
            }
            KeywordRestName::NoKeywords => vec![Node::new(Kind::CheckNoKeywordArguments)],
            KeywordRestName::Forwarding => {
                let rest = Node::new(Kind::ReadRestArgument {
                    from: rest_from,
                    to: posts,
                    keyword_arguments: true,
                });
                let keyword_rest = Node::new(Kind::ReadKeywordRestArgument { excluded });
                let block_slot = self.arena.declare(self.scope, FORWARDED_BLOCK_NAME);
                vec![
                    self.write_local_here(FORWARDED_REST_NAME, rest),
                    self.write_local_here(FORWARDED_KEYWORD_REST_NAME, keyword_rest),
                    Node::new(Kind::SaveMethodBlock { slot: block_slot }),
                ]
            }
        }
    }

    // ========================================================================
    // Proc auto-destructuring
    // ========================================================================

    /// Argument binding of a proc, spreading a lone array argument when the
    /// parameter list asks for it
    pub(super) fn proc_prelude(
        &mut self,
        parameters: &Parameters,
        names: &ParameterNames,
        arity: &Arity,
    ) -> TranslateResult<Vec<Node>> {
        let mut considered = arity.clone();
        if names.rest == RestName::Implicit {
            considered.has_rest = true;
        }
        let load = self.load_arguments(parameters, names, ArgumentFrame::Proc)?;
        if !should_consider_destructuring_array_arg(&considered) {
            return Ok(load);
        }

        let keyword_arguments = parameters.accepts_keywords();
        let first = Node::new(Kind::ReadPreArgument {
            index: 0,
            keyword_arguments,
            missing: MissingArgumentBehavior::Nil,
        });
        let cast = Node::new(Kind::SplatCast {
            value: Box::new(first),
            nil: crate::nodes::SplatNilBehavior::Nil,
        });
        let (store, array) = self.temp("destructure", cast);
        let check = Node::and(
            Node::new(Kind::ShouldDestructure { keyword_arguments }),
            sequence(
                Location::default(),
                vec![store, Node::not(Node::new(Kind::IsNil(Box::new(array.clone()))))],
            ),
        );
        let destructured = self.destructured_arguments(parameters, names, &array)?;

        Ok(vec![Node::if_else(
            check,
            sequence(Location::default(), destructured),
            sequence(Location::default(), load),
        )])
    }

    /// Bindings reading the parameters out of an already splatted array
    fn destructured_arguments(
        &mut self,
        parameters: &Parameters,
        names: &ParameterNames,
        array: &Node,
    ) -> TranslateResult<Vec<Node>> {
        let required = parameters.requireds.len();
        let optional = parameters.optionals.len();
        let posts = parameters.posts.len();
        let element = |index: i64| {
            Node::new(Kind::ReadConstantIndex {
                array: Box::new(array.clone()),
                index,
            })
        };
        let mut statements = Vec::new();

        for (index, (parameter, name)) in parameters.requireds.iter().zip(&names.requireds).enumerate() {
            statements.push(self.bind_positional(parameter, name.as_deref(), element(index as i64))?);
        }

        for (offset, (parameter, name)) in parameters.optionals.iter().zip(&names.optionals).enumerate() {
            let default = match &parameter.kind {
                NodeKind::OptionalParameter { value, .. } => self.lower_node(value)?,
                _ => return Err(unexpected_parameter(parameter, "optional")),
            };
            let index = required + offset;
            let present = Node::new(Kind::ArrayIsAtLeastAsLargeAs {
                array: Box::new(array.clone()),
                size: index + 1 + posts,
            });
            let value = Node::if_else(present, element(index as i64), default);
            statements.push(self.write_local_here(name, value));
        }

        if let RestName::Named(name) = &names.rest {
            let slice = Node::new(Kind::ArraySlice {
                array: Box::new(array.clone()),
                from: (required + optional) as i64,
                to: -(posts as i64),
            });
            statements.push(self.write_local_here(name, slice));
        }

        for offset in 0..posts {
            let from_end = (posts - offset) as i64;
            statements.push(self.bind_positional(
                &parameters.posts[offset],
                names.posts[offset].as_deref(),
                element(-from_end),
            )?);
        }

        for (parameter, name) in parameters.keywords.iter().zip(&names.keywords) {
            let value = match &parameter.kind {
                NodeKind::RequiredKeywordParameter { name } => Node::new(Kind::ReadKeywordArgument {
                    name: name.clone(),
                    default: None,
                }),
                NodeKind::OptionalKeywordParameter { value, .. } => self.lower_node(value)?,
                _ => return Err(unexpected_parameter(parameter, "keyword")),
            };
            statements.push(self.write_local_here(name, value));
        }

        statements.extend(self.bind_keyword_rest(parameters, names, required + optional, posts));

        if let Some(block) = &names.block {
            let slot = self.arena.declare(self.scope, block);
            statements.push(Node::new(Kind::SaveMethodBlock { slot }));
        }
        Ok(statements)
    }
}

/// Declared keyword names, excluded from the keyword rest hash
fn keyword_names(parameters: &Parameters) -> Vec<String> {
    parameters
        .keywords
        .iter()
        .filter_map(|keyword| match &keyword.kind {
            NodeKind::RequiredKeywordParameter { name }
            | NodeKind::OptionalKeywordParameter { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn unexpected_parameter(parameter: &SyntaxNode, position: &str) -> TranslateError {
    TranslateError::internal(
        format!("unexpected {} in {} parameter position", parameter.kind_name(), position),
        "parameter binding",
    )
}
