//! Multiple assignment and local re-declaration

use super::harness::*;
use garnet_engine::nodes::{Kind, SplatNilBehavior};
use garnet_engine::syntax::NodeKind;
use garnet_engine::{ScopeArena, ScopeKind};

fn multi_write(lefts: Vec<garnet_engine::SyntaxNode>, rest: Option<NodeKind>, value: garnet_engine::SyntaxNode) -> NodeKind {
    NodeKind::MultiWrite {
        lefts,
        rest: rest.map(|kind| boxed(n(kind))),
        rights: Vec::new(),
        value: boxed(value),
    }
}

fn assignment_of(root: &garnet_engine::Node) -> &garnet_engine::nodes::MultipleAssignment {
    let node = find(root, |n| matches!(n.kind, Kind::MultipleAssignment(_)));
    match &node.kind {
        Kind::MultipleAssignment(assignment) => assignment,
        _ => unreachable!(),
    }
}

// ============================================================================
// Prolog
// ============================================================================

#[test]
fn test_prolog_evaluates_receivers_and_indices_first() {
    // a.b, c[d] = 1, 2
    let tree = program(
        &["a", "c", "d"],
        vec![multi_write(
            vec![
                n(NodeKind::CallTarget {
                    receiver: boxed(lvar("a")),
                    name: "b".into(),
                    safe_navigation: false,
                }),
                n(NodeKind::IndexTarget {
                    receiver: boxed(lvar("c")),
                    arguments: arguments(vec![lvar("d")]),
                }),
            ],
            None,
            n(NodeKind::Array {
                elements: vec![int(1), int(2)],
            }),
        )],
    );
    let lowered = lower(&tree);
    let children = statements(&lowered.root);
    assert_eq!(children.len(), 4);

    let prolog: Vec<(&str, &str)> = children[..3]
        .iter()
        .map(|node| match &node.kind {
            Kind::WriteLocal { name, value, .. } => match &value.kind {
                Kind::ReadLocal { name: source, .. } => (name.as_str(), source.as_str()),
                other => panic!("Expected ReadLocal, got {:?}", other),
            },
            other => panic!("Expected WriteLocal, got {:?}", other),
        })
        .collect();
    assert_eq!(
        prolog,
        vec![
            ("%temp_multiple_assignment_0", "a"),
            ("%temp_multiple_assignment_1", "c"),
            ("%temp_multiple_assignment_2", "d"),
        ]
    );

    let assignment = assignment_of(children[3]);
    assert!(is_call(&assignment.pre[0], "b="));
    assert!(is_call(&assignment.pre[1], "[]="));
    match &assignment.pre[1].kind {
        Kind::Call { receiver, arguments, .. } => {
            assert!(is_read(receiver, "%temp_multiple_assignment_1"));
            assert!(is_read(&arguments[0], "%temp_multiple_assignment_2"));
            assert!(matches!(arguments[1].kind, Kind::AssignedValue));
        }
        _ => unreachable!(),
    }
    assert!(matches!(assignment.value.as_ref().map(|v| &v.kind), Some(Kind::Array(_))));
    assert_eq!(assignment.splat, SplatNilBehavior::ArrayWithNil);
}

#[test]
fn test_receivers_read_once() {
    let tree = program(
        &["a", "x"],
        vec![multi_write(
            vec![
                n(NodeKind::CallTarget {
                    receiver: boxed(lvar("a")),
                    name: "b".into(),
                    safe_navigation: false,
                }),
                n(NodeKind::CallTarget {
                    receiver: boxed(lvar("a")),
                    name: "c=".into(),
                    safe_navigation: false,
                }),
            ],
            None,
            lvar("x"),
        )],
    );
    let lowered = lower(&tree);
    assert_eq!(find_all(&lowered.root, |n| is_read(n, "a")).len(), 2);
    assert_eq!(find_all(&lowered.root, |n| is_read(n, "x")).len(), 1);
    assert_eq!(find_all(&lowered.root, |n| is_call(n, "c=")).len(), 1);
}

// ============================================================================
// Rest targets
// ============================================================================

#[test]
fn test_named_splat_binds() {
    let tree = program(
        &["a", "b", "x"],
        vec![multi_write(
            vec![ltarget("a")],
            Some(NodeKind::Splat {
                expression: Some(boxed(ltarget("b"))),
            }),
            lvar("x"),
        )],
    );
    let lowered = lower(&tree);
    let assignment = assignment_of(&lowered.root);
    assert!(assignment.rest.as_ref().map(|r| is_write(r, "b")).unwrap_or(false));
}

#[test]
fn test_anonymous_and_implicit_rest_bind_nothing() {
    for rest in [NodeKind::Splat { expression: None }, NodeKind::ImplicitRest] {
        let tree = program(&["a", "x"], vec![multi_write(vec![ltarget("a")], Some(rest), lvar("x"))]);
        let lowered = lower(&tree);
        let assignment = assignment_of(&lowered.root);
        assert!(assignment.rest.is_none());
        assert_eq!(assignment.pre.len(), 1);
    }
}

#[test]
fn test_nested_targets() {
    // a, (b, c) = x
    let tree = program(
        &["a", "b", "c", "x"],
        vec![multi_write(
            vec![
                ltarget("a"),
                n(NodeKind::MultiTarget {
                    lefts: vec![ltarget("b"), ltarget("c")],
                    rest: None,
                    rights: Vec::new(),
                }),
            ],
            None,
            lvar("x"),
        )],
    );
    let lowered = lower(&tree);
    let assignment = assignment_of(&lowered.root);
    match &assignment.pre[1].kind {
        Kind::MultipleAssignment(nested) => {
            assert_eq!(nested.pre.len(), 2);
            assert!(nested.value.is_none());
        }
        other => panic!("Expected nested MultipleAssignment, got {:?}", other),
    }
}

#[test]
fn test_nested_target_receivers_cached_in_outer_prolog() {
    // a, (b.c, d[i]) = x
    let tree = program(
        &["a", "b", "d", "i", "x"],
        vec![multi_write(
            vec![
                ltarget("a"),
                n(NodeKind::MultiTarget {
                    lefts: vec![
                        n(NodeKind::CallTarget {
                            receiver: boxed(lvar("b")),
                            name: "c".into(),
                            safe_navigation: false,
                        }),
                        n(NodeKind::IndexTarget {
                            receiver: boxed(lvar("d")),
                            arguments: arguments(vec![lvar("i")]),
                        }),
                    ],
                    rest: None,
                    rights: Vec::new(),
                }),
            ],
            None,
            lvar("x"),
        )],
    );
    let lowered = lower(&tree);
    let children = statements(&lowered.root);
    assert_eq!(children.len(), 4);

    let cached: Vec<(&str, &str)> = children[..3]
        .iter()
        .map(|node| match &node.kind {
            Kind::WriteLocal { name, value, .. } => match &value.kind {
                Kind::ReadLocal { name: source, .. } => (name.as_str(), source.as_str()),
                other => panic!("Expected ReadLocal, got {:?}", other),
            },
            other => panic!("Expected WriteLocal, got {:?}", other),
        })
        .collect();
    assert_eq!(
        cached,
        vec![
            ("%temp_multiple_assignment_0", "b"),
            ("%temp_multiple_assignment_1", "d"),
            ("%temp_multiple_assignment_2", "i"),
        ]
    );
    // The right-hand side is only read by the assignment itself
    for node in &children[..3] {
        assert!(find_all(node, |n| is_read(n, "x")).is_empty());
    }

    let outer = assignment_of(children[3]);
    assert!(is_read(outer.value.as_ref().unwrap(), "x"));
    assert!(is_write(&outer.pre[0], "a"));
    let nested = match &outer.pre[1].kind {
        Kind::MultipleAssignment(nested) => nested,
        other => panic!("Expected nested MultipleAssignment, got {:?}", other),
    };
    assert!(nested.value.is_none());
    match &nested.pre[0].kind {
        Kind::Call { receiver, method, arguments, .. } => {
            assert_eq!(method, "c=");
            assert!(is_read(receiver, "%temp_multiple_assignment_0"));
            assert!(matches!(arguments[0].kind, Kind::AssignedValue));
        }
        other => panic!("Expected Call, got {:?}", other),
    }
    match &nested.pre[1].kind {
        Kind::Call { receiver, method, arguments, .. } => {
            assert_eq!(method, "[]=");
            assert!(is_read(receiver, "%temp_multiple_assignment_1"));
            assert!(is_read(&arguments[0], "%temp_multiple_assignment_2"));
            assert!(matches!(arguments[1].kind, Kind::AssignedValue));
        }
        other => panic!("Expected Call, got {:?}", other),
    }
}

#[test]
fn test_splatted_index_cached_without_splat() {
    // a[*i], b = x
    let tree = program(
        &["a", "b", "i", "x"],
        vec![multi_write(
            vec![
                n(NodeKind::IndexTarget {
                    receiver: boxed(lvar("a")),
                    arguments: arguments(vec![n(NodeKind::Splat {
                        expression: Some(boxed(lvar("i"))),
                    })]),
                }),
                ltarget("b"),
            ],
            None,
            lvar("x"),
        )],
    );
    let lowered = lower(&tree);
    let children = statements(&lowered.root);
    match &children[1].kind {
        Kind::WriteLocal { name, value, .. } => {
            assert_eq!(name, "%temp_multiple_assignment_1");
            assert!(is_read(value, "i"));
        }
        other => panic!("Expected WriteLocal, got {:?}", other),
    }
    assert!(find_all(&lowered.root, |n| matches!(&n.kind, Kind::WriteLocal { value, .. } if matches!(value.kind, Kind::Splat(_)))).is_empty());

    let assignment = assignment_of(&lowered.root);
    match &assignment.pre[0].kind {
        Kind::Call { arguments, .. } => match &arguments[0].kind {
            Kind::Splat(inner) => assert!(is_read(inner, "%temp_multiple_assignment_1")),
            other => panic!("Expected Splat, got {:?}", other),
        },
        other => panic!("Expected Call, got {:?}", other),
    }
}

#[test]
fn test_next_value_splats_nil_to_empty_array() {
    let next = n(NodeKind::Next {
        arguments: arguments(vec![n(multi_write(vec![ltarget("a"), ltarget("b")], None, lvar("x")))]),
    });
    let tree = program(&["x"], vec![call_with_block("each", None, vec![next], &["a", "b"])]);
    let lowered = lower(&tree);
    assert_eq!(assignment_of(&lowered.root).splat, SplatNilBehavior::EmptyArray);
}

// ============================================================================
// Re-declaration
// ============================================================================

#[test]
fn test_write_then_declare_keeps_slot() {
    let mut arena = ScopeArena::new();
    let root = arena.root(ScopeKind::TopLevel);
    let (slot, depth) = arena.declare_for_assignment(root, "a");
    assert_eq!(depth, 0);
    assert_eq!(arena.declare(root, "a"), slot);
    assert_eq!(arena.get(root).names(), &["a".to_string()]);
}

#[test]
fn test_declare_then_write_keeps_slot() {
    let mut arena = ScopeArena::new();
    let root = arena.root(ScopeKind::TopLevel);
    let slot = arena.declare(root, "a");
    assert_eq!(arena.declare_for_assignment(root, "a"), (slot, 0));
    assert_eq!(arena.get(root).names().len(), 1);
}

#[test]
fn test_self_referencing_write_sees_new_local() {
    // a = a
    let tree = program(&[], vec![lwrite("a", lvar("a"))]);
    let lowered = lower(&tree);
    match &lowered.root.kind {
        Kind::WriteLocal { slot, value, .. } => {
            assert!(matches!(value.kind, Kind::ReadLocal { slot: read, depth: 0, .. } if read == *slot));
        }
        other => panic!("Expected WriteLocal, got {:?}", other),
    }
}
