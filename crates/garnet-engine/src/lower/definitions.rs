//! Method, block, lambda and module definitions

use super::params::{arity_of, ArgumentFrame};
use super::{range_of, sequence, Lowerer, LoweredBody, MethodFrame, Session};
use crate::error::{TranslateError, TranslateResult};
use crate::lazy::{lowering_policy, LazyBody, LoweringPolicy};
use crate::nodes::{
    Arity, BlockDefinition, BreakId, ConstantScope, Kind, MethodDefinition, ModuleDefinition,
    ModuleKind, Node, ProcKind, ReturnTarget,
};
use crate::scope::{layout_of, ScopeId, ScopeKind};
use crate::syntax::{Location, NodeKind, Parameters, SyntaxNode};
use log::{debug, info};
use std::sync::Arc;

/// Lowering state saved while a block body is lowered
pub(super) struct BlockState {
    scope: ScopeId,
    loops: Vec<BreakId>,
    block_break: Option<BreakId>,
    translating_next: bool,
}

/// Everything needed to lower a method body later, detached from the tree
#[derive(Debug, Clone)]
struct MethodSeed {
    name: String,
    parameters: Parameters,
    body: Option<SyntaxNode>,
    locals: Vec<String>,
    location: Location,
}

impl Lowerer {
    pub(super) fn enter_block(&mut self, scope: ScopeId, break_id: BreakId) -> BlockState {
        let saved = BlockState {
            scope: self.scope,
            loops: std::mem::take(&mut self.loops),
            block_break: self.block_break,
            translating_next: self.translating_next,
        };
        self.scope = scope;
        self.block_break = Some(break_id);
        self.translating_next = false;
        saved
    }

    pub(super) fn leave_block(&mut self, saved: BlockState) {
        self.scope = saved.scope;
        self.loops = saved.loops;
        self.block_break = saved.block_break;
        self.translating_next = saved.translating_next;
    }

    // ========================================================================
    // Blocks and lambdas
    // ========================================================================

    /// Block literal or stabby lambda
    ///
    /// `with_lambda_body` also builds the lambda version of a proc block, for
    /// `lambda { }` calls.
    pub(super) fn lower_block(
        &mut self,
        syntax: &SyntaxNode,
        parameters: Option<&Parameters>,
        body: Option<&SyntaxNode>,
        locals: &[String],
        kind: ProcKind,
        with_lambda_body: bool,
    ) -> TranslateResult<Node> {
        let block_scope = self.arena.child_scope(self.scope, ScopeKind::Block, true);
        let break_id = self.allocate_break_id();
        let saved = self.enter_block(block_scope, break_id);
        let lowered = self.lower_block_body(parameters, body, locals, kind, with_lambda_body);
        self.leave_block(saved);
        let (arity, body, lambda_body) = lowered?;

        let mut node = Node::new(Kind::BlockDefinition(Box::new(BlockDefinition {
            kind,
            arity,
            layout: layout_of(block_scope),
            break_id,
            body,
            lambda_body,
        })));
        if let Some(range) = range_of(syntax) {
            node.set_range(range);
        }
        Ok(node)
    }

    fn lower_block_body(
        &mut self,
        parameters: Option<&Parameters>,
        body: Option<&SyntaxNode>,
        locals: &[String],
        kind: ProcKind,
        with_lambda_body: bool,
    ) -> TranslateResult<(Arity, Node, Option<Node>)> {
        let empty = Parameters::default();
        let parameters = parameters.unwrap_or(&empty);

        let prologue = self.self_prologue();
        self.declare_locals(locals);
        let names = self.parameter_names(parameters, false)?;
        let arity = arity_of(parameters);

        let proc_prelude = match kind {
            ProcKind::Proc => Some(self.proc_prelude(parameters, &names, &arity)?),
            ProcKind::Lambda => None,
        };
        let lambda_prelude = if kind == ProcKind::Lambda || with_lambda_body {
            Some(self.load_arguments(parameters, &names, ArgumentFrame::Lambda)?)
        } else {
            None
        };
        let body = self.lower_or_implicit_nil(body)?;

        let lambda = lambda_prelude.map(|prelude| {
            let mut statements = vec![Node::new(Kind::CheckArity(arity.clone())), prologue.clone()];
            statements.extend(prelude);
            statements.push(body.clone());
            Node::new(Kind::CatchReturn {
                target: ReturnTarget::Lambda,
                body: Box::new(sequence(Location::default(), statements)),
            })
        });

        match proc_prelude {
            Some(prelude) => {
                let mut statements = vec![prologue];
                statements.extend(prelude);
                statements.push(body);
                Ok((arity, sequence(Location::default(), statements), lambda))
            }
            None => {
                let lambda = lambda.ok_or_else(|| {
                    TranslateError::internal("lambda without a lambda body", "block lowering")
                })?;
                Ok((arity, lambda, None))
            }
        }
    }

    // ========================================================================
    // Methods
    // ========================================================================

    pub(super) fn lower_def(
        &mut self,
        syntax: &SyntaxNode,
        name: &str,
        receiver: Option<&SyntaxNode>,
        parameters: Option<&Parameters>,
        body: Option<&SyntaxNode>,
        locals: &[String],
    ) -> TranslateResult<Node> {
        let singleton = receiver.map(|r| self.lower_node(r)).transpose()?;
        let parameters = parameters.cloned().unwrap_or_default();
        let arity = arity_of(&parameters);
        let seed = MethodSeed {
            name: name.to_string(),
            parameters,
            body: body.cloned(),
            locals: locals.to_vec(),
            location: syntax.location,
        };
        let dynamic = self.dynamic_constants;

        let body = match lowering_policy(&self.session.context, &self.session.options) {
            LoweringPolicy::Eager => {
                LazyBody::ready(lower_method_body(self.session.clone(), &seed, dynamic)?)
            }
            LoweringPolicy::Lazy => {
                let session = self.session.clone();
                LazyBody::deferred(move || lower_method_body(session.clone(), &seed, dynamic))
            }
        };

        Ok(Node::new(Kind::DefineMethod {
            name: name.to_string(),
            singleton: singleton.map(Box::new),
            method: Arc::new(MethodDefinition {
                name: name.to_string(),
                arity,
                body,
            }),
        }))
    }

    fn lower_method(&mut self, seed: &MethodSeed) -> TranslateResult<Node> {
        let prologue = self.self_prologue();
        self.declare_locals(&seed.locals);
        let names = self.parameter_names(&seed.parameters, true)?;
        self.method = Some(MethodFrame {
            parameters: seed.parameters.clone(),
            names: names.clone(),
        });

        let mut statements = vec![
            Node::new(Kind::CheckArity(arity_of(&seed.parameters))),
            prologue,
        ];
        statements.extend(self.load_arguments(&seed.parameters, &names, ArgumentFrame::Method)?);
        statements.push(self.lower_or_implicit_nil(seed.body.as_ref())?);

        Ok(Node::new(Kind::CatchReturn {
            target: ReturnTarget::Method,
            body: Box::new(sequence(seed.location, statements)),
        }))
    }

    // ========================================================================
    // Modules
    // ========================================================================

    /// `class` / `module`, with the body lowered now in a frame of its own
    pub(super) fn lower_module(
        &mut self,
        syntax: &SyntaxNode,
        constant_path: &SyntaxNode,
        superclass: Option<&SyntaxNode>,
        body: Option<&SyntaxNode>,
        locals: &[String],
    ) -> TranslateResult<Node> {
        let kind = match syntax.kind {
            NodeKind::Class { .. } => ModuleKind::Class,
            _ => ModuleKind::Module,
        };
        let dynamic = self.dynamic_constants || self.in_dynamic_scope();

        let (lexical_parent, name) = match &constant_path.kind {
            NodeKind::ConstantRead { name } => {
                (Node::new(Kind::LexicalScope { dynamic }), name.clone())
            }
            NodeKind::ConstantPath {
                parent: Some(parent),
                name,
            } => (self.lower_node(parent)?, name.clone()),
            NodeKind::ConstantPath { parent: None, name } => (
                Node::new(Kind::ReadConstant {
                    scope: ConstantScope::Root,
                    name: "Object".to_string(),
                }),
                name.clone(),
            ),
            _ => return Err(self.default_visit(constant_path)),
        };
        let superclass = superclass.map(|s| self.lower_node(s)).transpose()?;

        if dynamic && self.session.options.log_dynamic_constant_lookup {
            info!(
                "{:?} {} opened with dynamic constant lookup at {}:{}",
                kind,
                name,
                self.source_name(),
                self.line_of(syntax)
            );
        }

        let mut lowerer = Lowerer::new(self.session.clone(), ScopeKind::Module, dynamic);
        lowerer.declare_locals(locals);
        let root = lowerer.lower_or_implicit_nil(body)?;
        let body = lowerer.finish(root);

        Ok(Node::new(Kind::OpenModule {
            lexical_parent: Box::new(lexical_parent),
            superclass: superclass.map(Box::new),
            definition: Arc::new(ModuleDefinition { kind, name, body }),
        }))
    }
}

/// Lower a method body in a fresh scope environment
fn lower_method_body(session: Session, seed: &MethodSeed, dynamic: bool) -> TranslateResult<LoweredBody> {
    debug!("lowering method {}", seed.name);
    let mut lowerer = Lowerer::new(session, ScopeKind::Method, dynamic);
    let root = lowerer.lower_method(seed)?;
    Ok(lowerer.finish(root))
}
