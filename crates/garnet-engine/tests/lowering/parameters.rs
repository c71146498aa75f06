//! Parameter binding, proc destructuring and bare `super` reload

use super::harness::*;
use garnet_engine::nodes::{Kind, MissingArgumentBehavior, Node, ProcKind, ReturnTarget};
use garnet_engine::syntax::{NodeKind, Parameters};
use garnet_engine::TranslateError;

/// `(rest_index, reads, block)` of the first bare `super` under `root`
fn zsuper(root: &Node) -> (Option<usize>, &[Node], Option<&Node>) {
    let call = find(root, |n| matches!(n.kind, Kind::SuperCall { implicit: true, .. }));
    match &call.kind {
        Kind::SuperCall { arguments, block, .. } => match &arguments.kind {
            Kind::ReadZSuperArguments { rest_index, reads } => (*rest_index, reads.as_slice(), block.as_deref()),
            other => panic!("Expected ReadZSuperArguments, got {:?}", other),
        },
        _ => unreachable!(),
    }
}

fn block_definition(root: &Node) -> &garnet_engine::nodes::BlockDefinition {
    let node = find(root, |n| matches!(n.kind, Kind::BlockDefinition(_)));
    match &node.kind {
        Kind::BlockDefinition(definition) => definition,
        _ => unreachable!(),
    }
}

// ============================================================================
// Method binding
// ============================================================================

#[test]
fn test_method_binding_order() {
    // def m(a, b = 1); end
    let parameters = Parameters {
        requireds: vec![required("a")],
        optionals: vec![optional("b", int(1))],
        ..Parameters::default()
    };
    let tree = program(&[], vec![def("m", parameters, Vec::new(), &["a", "b"])]);
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");

    let inner = match &method.root.kind {
        Kind::CatchReturn {
            target: ReturnTarget::Method,
            body,
        } => body,
        other => panic!("Expected CatchReturn, got {:?}", other),
    };
    let steps = statements(inner);
    assert_eq!(steps.len(), 6);
    assert!(matches!(&steps[0].kind, Kind::CheckArity(arity) if arity.required == 1 && arity.optional == 1));
    assert!(is_write(steps[1], "%self"));
    match &steps[2].kind {
        Kind::WriteLocal { name, value, .. } => {
            assert_eq!(name, "a");
            assert!(matches!(
                value.kind,
                Kind::ReadPreArgument {
                    index: 0,
                    missing: MissingArgumentBehavior::RuntimeError,
                    ..
                }
            ));
        }
        other => panic!("Expected WriteLocal, got {:?}", other),
    }
    assert!(matches!(steps[3].kind, Kind::SaveMethodBlock { .. }));
    match &steps[4].kind {
        Kind::WriteLocal { name, value, .. } => {
            assert_eq!(name, "b");
            assert!(matches!(
                value.kind,
                Kind::ReadOptionalArgument {
                    index: 1,
                    minimum: 2,
                    ..
                }
            ));
        }
        other => panic!("Expected WriteLocal, got {:?}", other),
    }
    assert!(steps[5].is_implicit_nil());
}

#[test]
fn test_method_binding_with_rest_and_posts() {
    // def m(a, b = 1, *r, c, d); end
    let parameters = Parameters {
        requireds: vec![required("a")],
        optionals: vec![optional("b", int(1))],
        rest: rest(Some("r")),
        posts: vec![required("c"), required("d")],
        ..Parameters::default()
    };
    let tree = program(&[], vec![def("m", parameters, Vec::new(), &["a", "b", "r", "c", "d"])]);
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let inner = match &method.root.kind {
        Kind::CatchReturn { body, .. } => body,
        other => panic!("Expected CatchReturn, got {:?}", other),
    };
    let steps = statements(inner);
    assert_eq!(steps.len(), 9);

    let value_of = |step: &Node, expected: &str| -> Kind {
        match &step.kind {
            Kind::WriteLocal { name, value, .. } => {
                assert_eq!(name, expected);
                value.kind.clone()
            }
            other => panic!("Expected WriteLocal {}, got {:?}", expected, other),
        }
    };
    assert!(matches!(
        value_of(steps[4], "b"),
        Kind::ReadOptionalArgument {
            index: 1,
            minimum: 4,
            ..
        }
    ));
    assert!(matches!(value_of(steps[5], "r"), Kind::ReadRestArgument { from: 2, to: 2, .. }));
    // Posts bind last to first
    assert!(matches!(
        value_of(steps[6], "d"),
        Kind::ReadPostArgument {
            index_from_end: 1,
            required: 3,
            optional: 1,
            has_rest: true,
            ..
        }
    ));
    assert!(matches!(
        value_of(steps[7], "c"),
        Kind::ReadPostArgument {
            index_from_end: 2,
            required: 3,
            optional: 1,
            has_rest: true,
            ..
        }
    ));
    assert!(steps[8].is_implicit_nil());
}

#[test]
fn test_implicit_rest_in_method_parameters_is_internal() {
    // def m(a, <implicit rest>); end
    let parameters = Parameters {
        requireds: vec![required("a")],
        rest: Some(boxed(n(NodeKind::ImplicitRest))),
        ..Parameters::default()
    };
    let tree = program(&[], vec![def("m", parameters, Vec::new(), &["a"])]);
    let error = lower_err(&tree);
    assert!(error.is_internal());
    assert!(!error.is_user_facing());
}

#[test]
fn test_keyword_rest_excludes_declared_keywords() {
    let parameters = Parameters {
        keywords: vec![keyword("k")],
        keyword_rest: keyword_rest(Some("opts")),
        ..Parameters::default()
    };
    let tree = program(&[], vec![def("m", parameters, Vec::new(), &["k", "opts"])]);
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let read = find(&method.root, |n| matches!(n.kind, Kind::ReadKeywordRestArgument { .. }));
    assert!(matches!(&read.kind, Kind::ReadKeywordRestArgument { excluded } if excluded == &["k".to_string()]));
}

#[test]
fn test_no_keywords_parameter_checks() {
    let parameters = Parameters {
        keyword_rest: Some(boxed(n(NodeKind::NoKeywordsParameter))),
        ..Parameters::default()
    };
    let tree = program(&[], vec![def("m", parameters, Vec::new(), &[])]);
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    assert_eq!(
        find_all(&method.root, |n| matches!(n.kind, Kind::CheckNoKeywordArguments)).len(),
        1
    );
}

#[test]
fn test_argument_reads_profiled_by_default() {
    let tree = program(&[], vec![def("m", positional(&["a"]), Vec::new(), &["a"])]);
    let body = garnet_engine::Translator::new(garnet_engine::TranslatorOptions::default())
        .with_coverage(std::sync::Arc::new(garnet_engine::CoverageManager::new()))
        .translate(context(), &tree)
        .unwrap();
    let method = method_body(&body.root, "m");
    let write = find(&method.root, |n| is_write(n, "a"));
    match &write.kind {
        Kind::WriteLocal { value, .. } => assert!(matches!(value.kind, Kind::ProfileArgument(_))),
        _ => unreachable!(),
    }
}

// ============================================================================
// Reload
// ============================================================================

#[test]
fn test_reload_reads_every_parameter_in_order() {
    // def m(a, b = 1, *r, c, d:, **kw); super; end
    let parameters = Parameters {
        requireds: vec![required("a")],
        optionals: vec![optional("b", int(1))],
        rest: rest(Some("r")),
        posts: vec![required("c")],
        keywords: vec![keyword("d")],
        keyword_rest: keyword_rest(Some("kw")),
        block: None,
    };
    let tree = program(
        &[],
        vec![def("m", parameters, vec![forwarding_super()], &["a", "b", "r", "c", "d", "kw"])],
    );
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let (rest_index, reads, block) = zsuper(&method.root);

    assert_eq!(rest_index, Some(2));
    assert_eq!(reads.len(), 5);
    assert!(is_read(&reads[0], "a"));
    assert!(is_read(&reads[1], "b"));
    assert!(is_read(&reads[2], "r"));
    assert!(is_read(&reads[3], "c"));
    match &reads[4].kind {
        Kind::ConcatHash(parts) => {
            assert_eq!(parts.len(), 2);
            match &parts[0].kind {
                Kind::Hash(pairs) => {
                    assert_eq!(pairs.len(), 1);
                    assert!(matches!(&pairs[0].0.kind, Kind::Symbol(s) if s == "d"));
                    assert!(is_read(&pairs[0].1, "d"));
                }
                other => panic!("Expected Hash, got {:?}", other),
            }
            assert!(is_read(&parts[1], "kw"));
        }
        other => panic!("Expected ConcatHash, got {:?}", other),
    }
    match block.map(|b| &b.kind) {
        Some(Kind::BlockPass(value)) => assert!(is_read(value, "%method_block")),
        other => panic!("Expected BlockPass, got {:?}", other),
    }

    // Reads see the slots the binding wrote
    let write_slot = match &find(&method.root, |n| is_write(n, "a")).kind {
        Kind::WriteLocal { slot, .. } => *slot,
        _ => unreachable!(),
    };
    assert_eq!(read_of(&method.root, "a"), (write_slot, 0));
}

#[test]
fn test_reload_from_block_reads_outer_frame() {
    let tree = program(
        &[],
        vec![def(
            "m",
            positional(&["a"]),
            vec![stmt(2, call_with_block("each", None, vec![forwarding_super()], &[]))],
            &["a"],
        )],
    );
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let (_, reads, block) = zsuper(&method.root);
    assert!(matches!(reads[0].kind, Kind::ReadLocal { depth: 1, .. }));
    match block.map(|b| &b.kind) {
        Some(Kind::BlockPass(value)) => {
            assert!(matches!(&value.kind, Kind::ReadLocal { name, depth: 1, .. } if name == "%method_block"))
        }
        other => panic!("Expected BlockPass, got {:?}", other),
    }
}

#[test]
fn test_reload_sees_reassigned_parameter() {
    // def m(a); a = 5; super; end
    let tree = program(
        &[],
        vec![def(
            "m",
            positional(&["a"]),
            vec![stmt(2, lwrite("a", int(5))), stmt(3, NodeKind::ForwardingSuper { block: None })],
            &["a"],
        )],
    );
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let reassignment = find(&method.root, |n| {
        matches!(&n.kind, Kind::WriteLocal { name, value, .. } if name == "a" && matches!(value.kind, Kind::Integer(5)))
    });
    let written = match reassignment.kind {
        Kind::WriteLocal { slot, depth, .. } => (slot, depth),
        _ => unreachable!(),
    };
    let (_, reads, _) = zsuper(&method.root);
    match reads[0].kind {
        Kind::ReadLocal { ref name, slot, depth } => {
            assert_eq!(name, "a");
            assert_eq!((slot, depth), written);
        }
        ref other => panic!("Expected ReadLocal, got {:?}", other),
    }
}

#[test]
fn test_reload_in_block_sees_reassigned_parameter() {
    // def m(a); each { a = 5; super }; end
    let tree = program(
        &[],
        vec![def(
            "m",
            positional(&["a"]),
            vec![stmt(
                2,
                call_with_block(
                    "each",
                    None,
                    vec![stmt(3, lwrite("a", int(5))), stmt(4, NodeKind::ForwardingSuper { block: None })],
                    &[],
                ),
            )],
            &["a"],
        )],
    );
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let reassignment = find(&method.root, |n| {
        matches!(&n.kind, Kind::WriteLocal { name, value, .. } if name == "a" && matches!(value.kind, Kind::Integer(5)))
    });
    let written = match reassignment.kind {
        Kind::WriteLocal { slot, depth, .. } => (slot, depth),
        _ => unreachable!(),
    };
    assert_eq!(written.1, 1);
    let (_, reads, _) = zsuper(&method.root);
    assert!(matches!(reads[0].kind, Kind::ReadLocal { slot, depth, .. } if (slot, depth) == written));
}

#[test]
fn test_reload_of_destructured_parameters_is_profiled() {
    // def m((a, b), *r, (c, d)); super; end
    let pair = |left: &str, right: &str| {
        n(NodeKind::MultiTarget {
            lefts: vec![required(left), required(right)],
            rest: None,
            rights: Vec::new(),
        })
    };
    let parameters = Parameters {
        requireds: vec![pair("a", "b")],
        rest: rest(Some("r")),
        posts: vec![pair("c", "d")],
        ..Parameters::default()
    };
    let tree = program(
        &[],
        vec![def("m", parameters, vec![forwarding_super()], &["a", "b", "r", "c", "d"])],
    );
    let body = garnet_engine::Translator::new(garnet_engine::TranslatorOptions::default())
        .with_coverage(std::sync::Arc::new(garnet_engine::CoverageManager::new()))
        .translate(context(), &tree)
        .unwrap();
    let method = method_body(&body.root, "m");
    let (rest_index, reads, _) = zsuper(&method.root);
    assert_eq!(rest_index, Some(1));
    assert_eq!(reads.len(), 3);

    match &reads[0].kind {
        Kind::ProfileArgument(read) => assert!(matches!(
            read.kind,
            Kind::ReadPreArgument {
                index: 0,
                missing: MissingArgumentBehavior::Nil,
                ..
            }
        )),
        other => panic!("Expected ProfileArgument, got {:?}", other),
    }
    assert!(is_read(&reads[1], "r"));
    match &reads[2].kind {
        Kind::ProfileArgument(read) => assert!(matches!(
            read.kind,
            Kind::ReadPostArgument {
                index_from_end: 1,
                required: 2,
                optional: 0,
                has_rest: true,
                ..
            }
        )),
        other => panic!("Expected ProfileArgument, got {:?}", other),
    }
}

#[test]
fn test_repeated_placeholder_parameters() {
    // def m(_, _); super; end
    let tree = program(
        &[],
        vec![def("m", positional(&["_", "_"]), vec![forwarding_super()], &["_"])],
    );
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let (_, reads, _) = zsuper(&method.root);
    assert!(is_read(&reads[0], "_"));
    assert!(is_read(&reads[1], "%_2"));
    assert_ne!(read_of(&method.root, "_").0, read_of(&method.root, "%_2").0);
    assert_eq!(find_all(&method.root, |n| is_write(n, "%_2")).len(), 1);
}

#[test]
fn test_anonymous_parameters_reload() {
    // def m(*, **, &); super; end
    let parameters = Parameters {
        rest: rest(None),
        keyword_rest: keyword_rest(None),
        block: Some(boxed(n(NodeKind::BlockParameter { name: None }))),
        ..Parameters::default()
    };
    let tree = program(&[], vec![def("m", parameters, vec![forwarding_super()], &[])]);
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let (rest_index, reads, _) = zsuper(&method.root);
    assert_eq!(rest_index, Some(0));
    assert!(is_read(&reads[0], "%rest"));
    assert!(matches!(&reads[1].kind, Kind::ConcatHash(parts) if parts.len() == 1 && is_read(&parts[0], "%kwrest")));

    let layout = method.layouts.get(method.layout).unwrap();
    for name in ["%self", "%rest", "%kwrest", "%forward_block", "%method_block"] {
        assert!(layout.slot_of(name).is_some(), "missing {}", name);
    }
}

#[test]
fn test_forwarding_parameters_reload() {
    // def m(a, ...); super; end
    let parameters = Parameters {
        requireds: vec![required("a")],
        keyword_rest: Some(boxed(n(NodeKind::ForwardingParameter))),
        ..Parameters::default()
    };
    let tree = program(&[], vec![def("m", parameters, vec![forwarding_super()], &["a"])]);
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let (rest_index, reads, _) = zsuper(&method.root);
    assert_eq!(rest_index, Some(1));
    assert_eq!(reads.len(), 3);
    assert!(is_read(&reads[1], "%forward_rest"));
    assert!(is_read(&reads[2], "%forward_kwrest"));
}

#[test]
fn test_super_outside_method() {
    let tree = program(&[], vec![NodeKind::ForwardingSuper { block: None }]);
    match lower_err(&tree) {
        TranslateError::Syntax { message, .. } => assert_eq!(message, "super called outside of method"),
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

// ============================================================================
// Blocks and lambdas
// ============================================================================

#[test]
fn test_proc_destructures_single_array_argument() {
    let tree = program(&[], vec![call_with_block("each", Some(positional(&["a", "b"])), Vec::new(), &["a", "b"])]);
    let lowered = lower(&tree);
    let guard = find(&lowered.root, |n| matches!(n.kind, Kind::ShouldDestructure { .. }));
    assert!(matches!(guard.kind, Kind::ShouldDestructure { keyword_arguments: false }));
    assert!(!find_all(&lowered.root, |n| matches!(n.kind, Kind::SplatCast { .. })).is_empty());
    let element = find(&lowered.root, |n| matches!(n.kind, Kind::ReadConstantIndex { index: 1, .. }));
    assert!(matches!(&element.kind, Kind::ReadConstantIndex { array, .. } if is_read(array, "%temp_destructure_0")));
}

/// `(then, else)` statements of the proc destructuring branch under `root`
fn destructure_branches(root: &Node) -> (Vec<&Node>, Vec<&Node>) {
    let branch = find(root, |n| match &n.kind {
        Kind::If { condition, .. } => {
            matches!(&condition.kind, Kind::And(left, _) if matches!(left.kind, Kind::ShouldDestructure { .. }))
        }
        _ => false,
    });
    match &branch.kind {
        Kind::If {
            then_body: Some(then_body),
            else_body: Some(else_body),
            ..
        } => (statements(then_body), statements(else_body)),
        other => panic!("Expected If with both branches, got {:?}", other),
    }
}

fn written_value<'a>(steps: &[&'a Node], expected: &str) -> &'a Node {
    steps
        .iter()
        .find_map(|step| match &step.kind {
            Kind::WriteLocal { name, value, .. } if name == expected => Some(value.as_ref()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no write of {}", expected))
}

#[test]
fn test_proc_destructuring_with_rest_and_post() {
    // each { |a, *r, b| }
    let parameters = Parameters {
        requireds: vec![required("a")],
        rest: rest(Some("r")),
        posts: vec![required("b")],
        ..Parameters::default()
    };
    let tree = program(&[], vec![call_with_block("each", Some(parameters), Vec::new(), &["a", "r", "b"])]);
    let lowered = lower(&tree);
    let (destructured, load) = destructure_branches(&lowered.root);

    assert!(matches!(
        &written_value(&destructured, "a").kind,
        Kind::ReadConstantIndex { array, index: 0 } if is_read(array, "%temp_destructure_0")
    ));
    assert!(matches!(
        &written_value(&destructured, "r").kind,
        Kind::ArraySlice { array, from: 1, to: -1 } if is_read(array, "%temp_destructure_0")
    ));
    assert!(matches!(
        written_value(&destructured, "b").kind,
        Kind::ReadConstantIndex { index: -1, .. }
    ));

    assert!(matches!(
        written_value(&load, "r").kind,
        Kind::ReadRestArgument { from: 1, to: 1, .. }
    ));
    assert!(matches!(
        written_value(&load, "b").kind,
        Kind::ReadPostArgument {
            index_from_end: 1,
            required: 2,
            optional: 0,
            has_rest: true,
            ..
        }
    ));
}

#[test]
fn test_proc_destructuring_optional_before_post() {
    // each { |a, o = 1, *r, b| }
    let parameters = Parameters {
        requireds: vec![required("a")],
        optionals: vec![optional("o", int(1))],
        rest: rest(Some("r")),
        posts: vec![required("b")],
        ..Parameters::default()
    };
    let tree = program(
        &[],
        vec![call_with_block("each", Some(parameters), Vec::new(), &["a", "o", "r", "b"])],
    );
    let lowered = lower(&tree);
    let (destructured, load) = destructure_branches(&lowered.root);

    match &written_value(&destructured, "o").kind {
        Kind::If {
            condition,
            then_body: Some(then_body),
            else_body: Some(else_body),
        } => {
            assert!(matches!(condition.kind, Kind::ArrayIsAtLeastAsLargeAs { size: 3, .. }));
            assert!(matches!(then_body.kind, Kind::ReadConstantIndex { index: 1, .. }));
            assert!(matches!(else_body.kind, Kind::Integer(1)));
        }
        other => panic!("Expected If, got {:?}", other),
    }
    assert!(matches!(
        written_value(&destructured, "r").kind,
        Kind::ArraySlice { from: 2, to: -1, .. }
    ));
    assert!(matches!(
        written_value(&load, "o").kind,
        Kind::ReadOptionalArgument {
            index: 1,
            minimum: 3,
            ..
        }
    ));
}

#[test]
fn test_proc_with_one_parameter_does_not_destructure() {
    let tree = program(&[], vec![call_with_block("each", Some(positional(&["a"])), Vec::new(), &["a"])]);
    let lowered = lower(&tree);
    assert!(find_all(&lowered.root, |n| matches!(n.kind, Kind::ShouldDestructure { .. })).is_empty());
    let read = find(&lowered.root, |n| matches!(n.kind, Kind::ReadPreArgument { .. }));
    assert!(matches!(
        read.kind,
        Kind::ReadPreArgument {
            missing: MissingArgumentBehavior::Nil,
            ..
        }
    ));
}

#[test]
fn test_lambda_call_keeps_both_bodies() {
    let tree = program(&[], vec![call_with_block("lambda", Some(positional(&["a"])), Vec::new(), &["a"])]);
    let lowered = lower(&tree);
    let definition = block_definition(&lowered.root);
    assert_eq!(definition.kind, ProcKind::Proc);
    match definition.lambda_body.as_ref().map(|b| &b.kind) {
        Some(Kind::CatchReturn {
            target: ReturnTarget::Lambda,
            body,
        }) => {
            let steps = statements(body);
            assert!(matches!(steps[0].kind, Kind::CheckArity(_)));
        }
        other => panic!("Expected lambda body, got {:?}", other),
    }
}

#[test]
fn test_stabby_lambda() {
    let tree = program(
        &[],
        vec![NodeKind::Lambda {
            parameters: Some(Box::new(positional(&["a"]))),
            body: None,
            locals: names(&["a"]),
        }],
    );
    let lowered = lower(&tree);
    let definition = block_definition(&lowered.root);
    assert_eq!(definition.kind, ProcKind::Lambda);
    assert!(definition.lambda_body.is_none());
    assert!(matches!(
        definition.body.kind,
        Kind::CatchReturn {
            target: ReturnTarget::Lambda,
            ..
        }
    ));
    let read = find(&definition.body, |n| matches!(n.kind, Kind::ReadPreArgument { .. }));
    assert!(matches!(
        read.kind,
        Kind::ReadPreArgument {
            missing: MissingArgumentBehavior::RuntimeError,
            ..
        }
    ));
}

#[test]
fn test_destructured_block_parameter() {
    // each { |(a, b)| }
    let parameters = Parameters {
        requireds: vec![n(NodeKind::MultiTarget {
            lefts: vec![required("a"), required("b")],
            rest: None,
            rights: Vec::new(),
        })],
        ..Parameters::default()
    };
    let tree = program(&[], vec![call_with_block("each", Some(parameters), Vec::new(), &["a", "b"])]);
    let lowered = lower(&tree);
    let assignment = find(&lowered.root, |n| matches!(n.kind, Kind::MultipleAssignment(_)));
    match &assignment.kind {
        Kind::MultipleAssignment(assignment) => {
            assert_eq!(assignment.pre.len(), 2);
            assert!(is_write(&assignment.pre[0], "a"));
            assert!(matches!(
                assignment.value.as_ref().map(|v| &v.kind),
                Some(Kind::ReadPreArgument { index: 0, .. })
            ));
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_implicit_rest_in_destructured_parameter_is_internal() {
    // each { |(a, )| }
    let parameters = Parameters {
        requireds: vec![n(NodeKind::MultiTarget {
            lefts: vec![required("a")],
            rest: Some(boxed(n(NodeKind::ImplicitRest))),
            rights: Vec::new(),
        })],
        ..Parameters::default()
    };
    let tree = program(&[], vec![call_with_block("each", Some(parameters), Vec::new(), &["a"])]);
    assert!(lower_err(&tree).is_internal());
}
