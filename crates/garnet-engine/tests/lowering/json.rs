//! Trees in the parser's JSON format

use super::harness::*;
use garnet_engine::nodes::Kind;
use garnet_engine::syntax::SyntaxNode;
use garnet_engine::PrettyPrint;

const WRITE_HEX: &str = r#"{
    "type": "Program",
    "locals": ["a"],
    "statements": {
        "type": "Statements",
        "body": [
            {
                "type": "LocalVariableWrite",
                "name": "a",
                "value": { "type": "Integer", "value": "0x10", "location": { "offset": 4, "length": 4 } },
                "location": { "offset": 0, "length": 8 },
                "newline": true
            }
        ]
    }
}"#;

#[test]
fn test_lower_json_program() {
    let tree = SyntaxNode::from_json(WRITE_HEX).unwrap();
    let lowered = lower(&tree);
    assert_eq!(
        lowered.root.pretty_print(),
        "WriteLocal a (slot 0, depth 0) [0+8] newline\n  Integer 16 [4+4]\n"
    );
}

#[test]
fn test_pretty_print_body_lists_layouts() {
    let tree = SyntaxNode::from_json(WRITE_HEX).unwrap();
    let output = lower(&tree).pretty_print();
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("# frame0"));
    assert_eq!(lines.next(), Some("#   frame0 TopLevel [a]"));
    assert_eq!(lines.next(), Some("WriteLocal a (slot 0, depth 0) [0+8] newline"));
}

#[test]
fn test_json_method_with_block() {
    let json = r#"{
        "type": "Program",
        "statements": { "type": "Statements", "body": [
            { "type": "Def", "name": "each_twice",
              "parameters": { "requireds": [ { "type": "RequiredParameter", "name": "list" } ] },
              "locals": ["list"],
              "body": { "type": "Call", "name": "each",
                        "receiver": { "type": "LocalVariableRead", "name": "list" },
                        "block": { "type": "Block", "locals": ["x"],
                                   "parameters": { "requireds": [ { "type": "RequiredParameter", "name": "x" } ] },
                                   "body": { "type": "LocalVariableRead", "name": "list" } } },
              "location": { "offset": 0, "length": 4 }, "newline": true }
        ] }
    }"#;
    let tree = SyntaxNode::from_json(json).unwrap();
    let lowered = lower(&tree);
    let method = method_body(&lowered.root, "each_twice");
    let reads: Vec<usize> = find_all(&method.root, |n| is_read(n, "list"))
        .into_iter()
        .map(|n| match n.kind {
            Kind::ReadLocal { depth, .. } => depth,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(reads, vec![0, 1]);
}

#[test]
fn test_malformed_json_is_rejected() {
    assert!(SyntaxNode::from_json(r#"{ "type": "NotANode" }"#).is_err());
    assert!(SyntaxNode::from_json(r#"{ "type": "LocalVariableWrite", "name": "a" }"#).is_err());
}
