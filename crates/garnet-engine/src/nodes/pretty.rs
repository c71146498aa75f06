//! Pretty printer for executable nodes
//!
//! One node per line, children indented by two spaces:
//!
//! ```text
//! Sequence [0+11]
//!   WriteLocal a (slot 1, depth 0) [0+5] newline
//!     Integer 1 [4+1]
//! ```

use super::{ConstantScope, Kind, MultipleAssignment, Node};
use crate::lower::LoweredBody;
use std::fmt::{self, Write};

/// Render a tree as indented text
pub trait PrettyPrint {
    /// Render as a multi-line string
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Node {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        write_node(&mut output, self, 0).unwrap();
        output
    }
}

impl PrettyPrint for LoweredBody {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        writeln!(output, "# {}", self.layout).unwrap();
        for layout in self.layouts.iter() {
            writeln!(
                output,
                "#   {} {:?} [{}]",
                layout.id,
                layout.kind,
                layout.slots.join(", ")
            )
            .unwrap();
        }
        output.push_str(&self.root.pretty_print());
        output
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}

fn write_node(out: &mut String, node: &Node, indent: usize) -> fmt::Result {
    write!(out, "{:width$}{}", "", label(&node.kind), width = indent * 2)?;
    if let Some(range) = node.range() {
        write!(out, " [{}+{}]", range.start, range.length)?;
    }
    if node.is_newline() {
        out.push_str(" newline");
    }
    if node.is_coverage_line() {
        out.push_str(" coverage");
    }
    out.push('\n');

    if let Kind::MultipleAssignment(assignment) = &node.kind {
        return write_multiple_assignment(out, assignment, indent + 1);
    }
    for child in node.children() {
        write_node(out, child, indent + 1)?;
    }
    Ok(())
}

fn write_multiple_assignment(
    out: &mut String,
    assignment: &MultipleAssignment,
    indent: usize,
) -> fmt::Result {
    let pad = indent * 2;
    for target in &assignment.pre {
        writeln!(out, "{:pad$}pre:", "")?;
        write_node(out, target, indent + 1)?;
    }
    if let Some(rest) = &assignment.rest {
        writeln!(out, "{:pad$}rest:", "")?;
        write_node(out, rest, indent + 1)?;
    }
    for target in &assignment.post {
        writeln!(out, "{:pad$}post:", "")?;
        write_node(out, target, indent + 1)?;
    }
    if let Some(value) = &assignment.value {
        writeln!(out, "{:pad$}value:", "")?;
        write_node(out, value, indent + 1)?;
    }
    Ok(())
}

fn label(kind: &Kind) -> String {
    match kind {
        Kind::Nil { implicit: true } => "Nil (implicit)".to_string(),
        Kind::Nil { implicit: false } => "Nil".to_string(),
        Kind::Boolean(value) => format!("Boolean {}", value),
        Kind::Integer(value) => format!("Integer {}", value),
        Kind::BigInteger {
            digits,
            radix,
            negative,
        } => format!(
            "BigInteger {}{} (radix {})",
            if *negative { "-" } else { "" },
            digits,
            radix
        ),
        Kind::Float(value) => format!("Float {}", value),
        Kind::String(value) => format!("String {:?}", value),
        Kind::Symbol(value) => format!("Symbol :{}", value),
        Kind::Interpolation(_) => "Interpolation".to_string(),
        Kind::Array(_) => "Array".to_string(),
        Kind::Hash(_) => "Hash".to_string(),
        Kind::ConcatHash(_) => "ConcatHash".to_string(),
        Kind::Range { exclusive, .. } => {
            format!("Range {}", if *exclusive { "..." } else { ".." })
        }
        Kind::SelfValue => "Self".to_string(),
        Kind::InternalModule => "InternalModule".to_string(),
        Kind::LexicalScope { dynamic } => {
            format!("LexicalScope{}", if *dynamic { " (dynamic)" } else { "" })
        }
        Kind::ProfileArgument(_) => "ProfileArgument".to_string(),
        Kind::ReadLocal { name, slot, depth } => {
            format!("ReadLocal {} (slot {}, depth {})", name, slot, depth)
        }
        Kind::WriteLocal {
            name, slot, depth, ..
        } => format!("WriteLocal {} (slot {}, depth {})", name, slot, depth),
        Kind::ReadInstanceVariable(name) => format!("ReadInstanceVariable {}", name),
        Kind::WriteInstanceVariable { name, .. } => format!("WriteInstanceVariable {}", name),
        Kind::ReadClassVariable(name) => format!("ReadClassVariable {}", name),
        Kind::WriteClassVariable { name, .. } => format!("WriteClassVariable {}", name),
        Kind::ReadGlobal(name) => format!("ReadGlobal {}", name),
        Kind::ReadNthMatch { index, .. } => format!("ReadNthMatch {}", index),
        Kind::WriteGlobal { name, .. } => format!("WriteGlobal {}", name),
        Kind::ReadConstant { scope, name } => format!("ReadConstant {}{}", scope_label(scope), name),
        Kind::WriteConstant { scope, name, .. } => {
            format!("WriteConstant {}{}", scope_label(scope), name)
        }
        Kind::AssignedValue => "AssignedValue".to_string(),
        Kind::Sequence(_) => "Sequence".to_string(),
        Kind::If { .. } => "If".to_string(),
        Kind::And(..) => "And".to_string(),
        Kind::Or(..) => "Or".to_string(),
        Kind::Not(_) => "Not".to_string(),
        Kind::While {
            do_while, break_id, ..
        } => format!(
            "While{} ({})",
            if *do_while { " do" } else { "" },
            break_id
        ),
        Kind::Break { break_id, .. } => format!("Break ({})", break_id),
        Kind::Next { .. } => "Next".to_string(),
        Kind::Redo => "Redo".to_string(),
        Kind::Return { from_block, .. } => {
            format!("Return{}", if *from_block { " (from block)" } else { "" })
        }
        Kind::Ensure { .. } => "Ensure".to_string(),
        Kind::Try { rescues, else_body, .. } => format!(
            "Try ({} rescue{}){}",
            rescues.len(),
            if rescues.len() == 1 { "" } else { "s" },
            if else_body.is_some() { " +else" } else { "" }
        ),
        Kind::CurrentException => "CurrentException".to_string(),
        Kind::Retry => "Retry".to_string(),
        Kind::Defined(_) => "Defined".to_string(),
        Kind::AliasMethod { .. } => "AliasMethod".to_string(),
        Kind::AliasGlobal { new_name, old_name } => format!("AliasGlobal {} {}", new_name, old_name),
        Kind::Undef(names) => format!("Undef/{}", names.len()),
        Kind::DeferredCleanup { .. } => "DeferredCleanup".to_string(),
        Kind::NoMatchingPattern { .. } => "NoMatchingPattern".to_string(),
        Kind::ExecuteAndReturnTrue(_) => "ExecuteAndReturnTrue".to_string(),
        Kind::Call {
            method,
            arguments,
            block,
            private,
            safe_navigation,
            ..
        } => {
            let mut text = format!("Call {}/{}", method, arguments.len());
            if *private {
                text.push_str(" private");
            }
            if *safe_navigation {
                text.push_str(" &.");
            }
            if block.is_some() {
                text.push_str(" +block");
            }
            text
        }
        Kind::Splat(_) => "Splat".to_string(),
        Kind::BlockPass(_) => "BlockPass".to_string(),
        Kind::Yield { .. } => "Yield".to_string(),
        Kind::SuperCall { implicit, .. } => {
            format!("SuperCall{}", if *implicit { " (implicit)" } else { "" })
        }
        Kind::ReadZSuperArguments { rest_index, .. } => match rest_index {
            Some(index) => format!("ReadZSuperArguments (rest at {})", index),
            None => "ReadZSuperArguments".to_string(),
        },
        Kind::DefineMethod { name, method, .. } => format!(
            "DefineMethod {} ({})",
            name,
            if method.body.is_lowered() {
                "lowered"
            } else {
                "lazy"
            }
        ),
        Kind::BlockDefinition(definition) => format!(
            "BlockDefinition {:?} {} ({})",
            definition.kind, definition.layout, definition.break_id
        ),
        Kind::OpenModule { definition, .. } => format!(
            "Open{:?} {} {}",
            definition.kind, definition.name, definition.body.layout
        ),
        Kind::CatchReturn { target, .. } => format!("CatchReturn {:?}", target),
        Kind::CheckArity(arity) => format!(
            "CheckArity {}/{}{} post {}",
            arity.required,
            arity.optional,
            if arity.has_rest { "/*" } else { "" },
            arity.post
        ),
        Kind::ReadPreArgument { index, missing, .. } => {
            format!("ReadPreArgument {} (missing: {:?})", index, missing)
        }
        Kind::ReadOptionalArgument { index, minimum, .. } => {
            format!("ReadOptionalArgument {} (minimum {})", index, minimum)
        }
        Kind::ReadRestArgument { from, to, .. } => format!("ReadRestArgument {}..-{}", from, to),
        Kind::ReadPostArgument { index_from_end, .. } => {
            format!("ReadPostArgument -{}", index_from_end)
        }
        Kind::ReadKeywordArgument { name, .. } => format!("ReadKeywordArgument {}", name),
        Kind::ReadKeywordRestArgument { excluded } => {
            format!("ReadKeywordRestArgument (excluding {})", excluded.join(", "))
        }
        Kind::CheckNoKeywordArguments => "CheckNoKeywordArguments".to_string(),
        Kind::SaveMethodBlock { slot } => format!("SaveMethodBlock (slot {})", slot),
        Kind::ShouldDestructure { .. } => "ShouldDestructure".to_string(),
        Kind::ReadConstantIndex { index, .. } => format!("ReadConstantIndex {}", index),
        Kind::ArraySlice { from, to, .. } => format!("ArraySlice {}..{}", from, to),
        Kind::ArrayIsAtLeastAsLargeAs { size, .. } => format!("ArrayIsAtLeastAsLargeAs {}", size),
        Kind::ArrayPatternLengthCheck { size, has_rest, .. } => format!(
            "ArrayPatternLengthCheck {}{}",
            size,
            if *has_rest { "+" } else { "" }
        ),
        Kind::SplatCast { nil, .. } => format!("SplatCast (nil: {:?})", nil),
        Kind::IsNil(_) => "IsNil".to_string(),
        Kind::MultipleAssignment(assignment) => {
            format!("MultipleAssignment (nil: {:?})", assignment.splat)
        }
    }
}

fn scope_label(scope: &ConstantScope) -> &'static str {
    match scope {
        ConstantScope::Lexical { dynamic: true } => "(dynamic) ",
        ConstantScope::Lexical { dynamic: false } => "",
        ConstantScope::Root => "::",
        ConstantScope::Scoped(_) => "<scoped>::",
    }
}
