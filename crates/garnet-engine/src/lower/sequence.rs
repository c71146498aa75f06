//! Statement sequencing

use crate::nodes::{Kind, Node, SourceRange};
use crate::syntax::Location;

/// Combine statements into one node
///
/// Absent entries are skipped and nested sequences are inlined. Implicit nils
/// that are neither last nor statement boundaries are dropped. A node that
/// subsumes the statements after it takes them as its child. An empty result
/// is an implicit nil; a single node is returned as is.
pub fn sequence<I, N>(location: Location, nodes: I) -> Node
where
    I: IntoIterator<Item = N>,
    N: Into<Option<Node>>,
{
    let mut flat = Vec::new();
    for node in nodes.into_iter().filter_map(|node| -> Option<Node> { node.into() }) {
        flatten_into(&mut flat, node);
    }

    let last = flat.len().saturating_sub(1);
    let kept: Vec<Node> = flat
        .into_iter()
        .enumerate()
        .filter(|(index, node)| *index == last || !node.is_implicit_nil() || node.is_newline())
        .map(|(_, node)| node)
        .collect();

    let fallback = if location.is_unknown() {
        None
    } else {
        Some(SourceRange::new(location.offset, location.length))
    };
    assemble(kept, fallback)
}

fn flatten_into(out: &mut Vec<Node>, node: Node) {
    let newline = node.is_newline();
    let coverage = node.is_coverage_line();
    match node.kind {
        Kind::Sequence(children) => {
            let start = out.len();
            for child in children {
                flatten_into(out, child);
            }
            // The boundary flags of the sequence move to its first statement
            if let Some(first) = out.get_mut(start) {
                if newline {
                    first.mark_newline();
                }
                if coverage {
                    first.mark_coverage_line();
                }
            }
        }
        _ => out.push(node),
    }
}

fn assemble(mut nodes: Vec<Node>, fallback: Option<SourceRange>) -> Node {
    if let Some(index) = nodes.iter().position(Node::can_subsume_following) {
        if index + 1 < nodes.len() {
            let following = nodes.split_off(index + 1);
            if let Some(head) = nodes.pop() {
                nodes.push(head.subsume_following(assemble(following, None)));
            }
        }
    }

    match nodes.len() {
        0 => {
            let mut nil = Node::implicit_nil();
            if let Some(range) = fallback {
                nil.set_range(range);
            }
            nil
        }
        1 => nodes.remove(0),
        _ => {
            let range = nodes
                .iter()
                .filter_map(Node::range)
                .reduce(|a, b| a.union(&b))
                .or(fallback);
            let mut sequence = Node::new(Kind::Sequence(nodes));
            if let Some(range) = range {
                sequence.set_range(range);
            }
            sequence
        }
    }
}
