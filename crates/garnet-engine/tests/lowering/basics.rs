//! Sequencing, locals, jumps, coverage and cancellation

use super::harness::*;
use garnet_engine::nodes::Kind;
use garnet_engine::syntax::NodeKind;
use garnet_engine::{CoverageManager, Interrupt, TranslateError, Translator};
use std::sync::Arc;

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn test_sequence_is_flat() {
    let tree = program(
        &[],
        vec![
            NodeKind::Integer { value: "1".into() },
            NodeKind::Begin {
                statements: Some(boxed(body(vec![stmt(2, NodeKind::Integer { value: "2".into() }), int(3)]))),
                rescue_clause: None,
                else_clause: None,
                ensure: None,
            },
            NodeKind::Integer { value: "4".into() },
        ],
    );
    let lowered = lower(&tree);
    let children = statements(&lowered.root);
    assert_eq!(children.len(), 4);
    let values: Vec<i64> = children
        .iter()
        .map(|c| match c.kind {
            Kind::Integer(v) => v,
            ref other => panic!("Expected Integer, got {:?}", other),
        })
        .collect();
    assert_eq!(values, vec![1, 2, 3, 4]);
}

#[test]
fn test_end_block_takes_following_statements() {
    let tree = program(
        &[],
        vec![
            NodeKind::PostExecution { statements: None },
            NodeKind::Integer { value: "1".into() },
            NodeKind::Integer { value: "2".into() },
        ],
    );
    let lowered = lower(&tree);
    match &lowered.root.kind {
        Kind::DeferredCleanup { rest: Some(rest), .. } => {
            assert_eq!(statements(rest).len(), 2);
        }
        other => panic!("Expected DeferredCleanup, got {:?}", other),
    }
}

#[test]
fn test_statement_boundaries_marked() {
    let tree = program(&[], vec![NodeKind::Nil, NodeKind::True]);
    let lowered = lower(&tree);
    assert!(statements(&lowered.root).iter().all(|s| s.is_newline()));
}

// ============================================================================
// Locals
// ============================================================================

#[test]
fn test_top_level_local_slots() {
    let tree = program(&["a"], vec![lwrite("a", int(1)), NodeKind::LocalVariableRead { name: "a".into() }]);
    let lowered = lower(&tree);
    let children = statements(&lowered.root);
    match &children[0].kind {
        Kind::WriteLocal { name, slot, depth, .. } => {
            assert_eq!(name, "a");
            assert_eq!((*slot, *depth), (0, 0));
        }
        other => panic!("Expected WriteLocal, got {:?}", other),
    }
    assert_eq!(read_of(&lowered.root, "a"), (0, 0));
    assert_eq!(lowered.layouts.slot_name(lowered.layout, 0, 0), Some("a"));
}

#[test]
fn test_block_reads_outer_local_at_depth_one() {
    let tree = program(&["a"], vec![lwrite("a", int(1)), call_with_block("each", None, vec![lvar("a")], &[])]);
    let lowered = lower(&tree);
    assert_eq!(read_of(&lowered.root, "a"), (0, 1));
}

#[test]
fn test_block_local_shadows_nothing_outside() {
    let tree = program(&[], vec![call_with_block("each", None, vec![stmt(2, lwrite("b", int(1)))], &["b"])]);
    let lowered = lower(&tree);
    let top = lowered.layouts.get(lowered.layout).unwrap();
    assert!(top.slot_of("b").is_none());
    assert!(lowered.layouts.iter().any(|layout| layout.slot_of("b").is_some()));
}

#[test]
fn test_self_read_from_block_slot() {
    let tree = program(&[], vec![NodeKind::SelfRef, call_with_block("each", None, vec![n(NodeKind::SelfRef)], &[])]);
    let lowered = lower(&tree);
    let children = statements(&lowered.root);
    assert!(matches!(children[0].kind, Kind::SelfValue));
    assert_eq!(read_of(children[1], "%self"), (0, 0));
}

#[test]
fn test_unresolved_local_is_internal() {
    let tree = program(&[], vec![NodeKind::LocalVariableRead { name: "ghost".into() }]);
    let err = lower_err(&tree);
    assert!(err.is_internal());
    assert!(!err.is_user_facing());
}

#[test]
fn test_or_write_reads_then_writes() {
    let tree = program(
        &["a"],
        vec![NodeKind::LocalVariableOrWrite {
            name: "a".into(),
            value: boxed(int(1)),
        }],
    );
    let lowered = lower(&tree);
    match &lowered.root.kind {
        Kind::Or(left, right) => {
            assert!(is_read(left, "a"));
            assert!(is_write(right, "a"));
        }
        other => panic!("Expected Or, got {:?}", other),
    }
}

#[test]
fn test_index_operator_write_caches_receiver_and_index() {
    let tree = program(
        &["h", "k"],
        vec![NodeKind::IndexOperatorWrite {
            receiver: boxed(lvar("h")),
            arguments: arguments(vec![lvar("k")]),
            operator: "+".into(),
            value: boxed(int(1)),
        }],
    );
    let lowered = lower(&tree);
    assert_eq!(find_all(&lowered.root, |n| is_read(n, "h")).len(), 1);
    assert_eq!(find_all(&lowered.root, |n| is_read(n, "k")).len(), 1);
    assert!(is_call(statements(&lowered.root).last().unwrap(), "[]="));
}

// ============================================================================
// Literals and constants
// ============================================================================

#[test]
fn test_integer_literals() {
    let tree = program(
        &[],
        vec![
            NodeKind::Integer { value: "0x1_f".into() },
            NodeKind::Integer {
                value: "0xffffffffffffffffff".into(),
            },
        ],
    );
    let lowered = lower(&tree);
    let children = statements(&lowered.root);
    assert!(matches!(children[0].kind, Kind::Integer(31)));
    assert!(matches!(children[1].kind, Kind::BigInteger { radix: 16, .. }));
}

#[test]
fn test_constant_lookup_static_at_top_level() {
    let tree = program(&[], vec![NodeKind::ConstantRead { name: "Foo".into() }]);
    let lowered = lower(&tree);
    match &lowered.root.kind {
        Kind::ReadConstant { scope, name } => {
            assert_eq!(name, "Foo");
            assert!(matches!(scope, garnet_engine::nodes::ConstantScope::Lexical { dynamic: false }));
        }
        other => panic!("Expected ReadConstant, got {:?}", other),
    }
}

/// `class Foo; Bar; end`
fn class_reading_constant() -> NodeKind {
    NodeKind::Class {
        constant_path: boxed(n(NodeKind::ConstantRead { name: "Foo".into() })),
        superclass: None,
        body: Some(boxed(n(NodeKind::ConstantRead { name: "Bar".into() }))),
        locals: Vec::new(),
    }
}

fn module_body_lookup(open: &garnet_engine::Node) -> bool {
    match &open.kind {
        Kind::OpenModule { definition, .. } => match &definition.body.root.kind {
            Kind::ReadConstant {
                scope: garnet_engine::nodes::ConstantScope::Lexical { dynamic },
                ..
            } => *dynamic,
            other => panic!("Expected ReadConstant, got {:?}", other),
        },
        other => panic!("Expected OpenModule, got {:?}", other),
    }
}

#[test]
fn test_top_level_class_uses_static_lookup() {
    let lowered = lower(&program(&[], vec![class_reading_constant()]));
    assert!(!module_body_lookup(&lowered.root));
    match &lowered.root.kind {
        Kind::OpenModule { lexical_parent, definition, .. } => {
            assert!(matches!(lexical_parent.kind, Kind::LexicalScope { dynamic: false }));
            assert_eq!(definition.name, "Foo");
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_class_inside_method_uses_dynamic_lookup() {
    let tree = program(
        &[],
        vec![def("m", Default::default(), vec![stmt(2, class_reading_constant())], &[])],
    );
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "m");
    let open = find(&method.root, |n| matches!(n.kind, Kind::OpenModule { .. }));
    assert!(module_body_lookup(open));
}

// ============================================================================
// Jumps
// ============================================================================

#[test]
fn test_break_outside_loop_is_user_error() {
    let tree = program(&[], vec![NodeKind::Break { arguments: None }]);
    match lower_err(&tree) {
        TranslateError::Syntax { message, line, .. } => {
            assert_eq!(message, "Invalid break");
            assert_eq!(line, 1);
        }
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

#[test]
fn test_next_and_redo_outside_loop() {
    for kind in [NodeKind::Next { arguments: None }, NodeKind::Redo] {
        let err = lower_err(&program(&[], vec![kind]));
        assert!(err.is_user_facing());
    }
}

#[test]
fn test_break_targets_innermost_loop() {
    let tree = program(
        &[],
        vec![NodeKind::While {
            predicate: boxed(n(NodeKind::True)),
            statements: Some(boxed(body(vec![stmt(2, NodeKind::Break { arguments: None })]))),
            do_while: false,
        }],
    );
    let lowered = lower(&tree);
    let (loop_id, break_id) = match &lowered.root.kind {
        Kind::While { break_id, body, .. } => match &body.kind {
            Kind::Break { break_id: inner, .. } => (*break_id, *inner),
            other => panic!("Expected Break, got {:?}", other),
        },
        other => panic!("Expected While, got {:?}", other),
    };
    assert_eq!(loop_id, break_id);
}

#[test]
fn test_break_in_block_targets_block() {
    let tree = program(&[], vec![call_with_block("each", None, vec![n(NodeKind::Break { arguments: None })], &[])]);
    let lowered = lower(&tree);
    let block = find(&lowered.root, |n| matches!(n.kind, Kind::BlockDefinition(_)));
    let block_id = match &block.kind {
        Kind::BlockDefinition(definition) => definition.break_id,
        _ => unreachable!(),
    };
    let brk = find(&lowered.root, |n| matches!(n.kind, Kind::Break { .. }));
    assert!(matches!(brk.kind, Kind::Break { break_id, .. } if break_id == block_id));
}

#[test]
fn test_return_in_block_is_marked() {
    let tree = program(&[], vec![call_with_block("each", None, vec![n(NodeKind::Return { arguments: None })], &[])]);
    let lowered = lower(&tree);
    let ret = find(&lowered.root, |n| matches!(n.kind, Kind::Return { .. }));
    assert!(matches!(ret.kind, Kind::Return { from_block: true, .. }));
}

// ============================================================================
// Control flow desugaring
// ============================================================================

#[test]
fn test_for_index_lives_in_enclosing_scope() {
    let tree = program(
        &["i", "list"],
        vec![NodeKind::For {
            index: boxed(ltarget("i")),
            collection: boxed(lvar("list")),
            statements: None,
        }],
    );
    let lowered = lower(&tree);
    assert!(is_call(&lowered.root, "each"));
    let write = find(&lowered.root, |n| is_write(n, "i"));
    assert!(matches!(write.kind, Kind::WriteLocal { depth: 1, slot: 0, .. }));
}

#[test]
fn test_case_when_builds_if_chain() {
    let tree = program(
        &["x"],
        vec![NodeKind::Case {
            predicate: Some(boxed(lvar("x"))),
            conditions: vec![n(NodeKind::When {
                conditions: vec![int(1), int(2)],
                statements: Some(boxed(n(NodeKind::True))),
            })],
            else_clause: None,
        }],
    );
    let lowered = lower(&tree);
    let children = statements(&lowered.root);
    assert!(is_write(children[0], "%temp_case_0"));
    match &children[1].kind {
        Kind::If { condition, .. } => {
            assert!(matches!(condition.kind, Kind::Or(..)));
            assert_eq!(find_all(condition, |n| is_call(n, "===")).len(), 2);
        }
        other => panic!("Expected If, got {:?}", other),
    }
}

// ============================================================================
// Errors, coverage and cancellation
// ============================================================================

#[test]
fn test_unknown_node_reports_context() {
    let tree = program(&[], vec![NodeKind::Missing]);
    match lower_err(&tree) {
        TranslateError::Syntax { message, kind, .. } => {
            assert!(message.starts_with("Lowerer does not know how to translate Missing at test.gt:1"));
            assert!(message.contains("Code snippet:\nline"));
            assert_eq!(kind, "Missing");
        }
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

#[test]
fn test_coverage_records_statement_lines() {
    let tree = program(&[], vec![NodeKind::Nil, NodeKind::Nil, NodeKind::Nil]);
    let coverage = Arc::new(CoverageManager::new());
    let lowered = Translator::new(options())
        .with_coverage(coverage.clone())
        .translate(context().with_coverage(true), &tree)
        .unwrap();
    assert_eq!(coverage.lines_with_code(SOURCE_NAME), vec![1, 2, 3]);
    assert!(statements(&lowered.root).iter().all(|s| s.is_coverage_line()));
}

#[test]
fn test_no_coverage_without_flag() {
    let tree = program(&[], vec![NodeKind::Nil]);
    let coverage = Arc::new(CoverageManager::new());
    Translator::new(options())
        .with_coverage(coverage.clone())
        .translate(context(), &tree)
        .unwrap();
    assert!(coverage.lines_with_code(SOURCE_NAME).is_empty());
}

#[test]
fn test_cancelled_at_statement_boundary() {
    let tree = program(&[], vec![NodeKind::Nil, NodeKind::Nil]);
    let interrupt = Interrupt::new();
    interrupt.cancel();
    let err = translator()
        .with_interrupt(interrupt.clone())
        .translate(context(), &tree)
        .unwrap_err();
    assert!(matches!(err, TranslateError::Cancelled { line: 1, .. }));
    assert!(interrupt.poll_count() >= 1);
}
