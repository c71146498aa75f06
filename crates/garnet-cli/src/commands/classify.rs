//! `garnet classify`: lexical class of each name

use garnet_engine::{classify, is_valid_constant_path, IdentifierType};

fn class_name(kind: IdentifierType) -> &'static str {
    match kind {
        IdentifierType::Global => "global",
        IdentifierType::Class => "class",
        IdentifierType::Instance => "instance",
        IdentifierType::Const => "const",
        IdentifierType::Local => "local",
        IdentifierType::Junk => "junk",
    }
}

/// One line per name: the name, its class, and for `A::B` names whether the path is valid
pub fn execute(names: &[String]) {
    for name in names {
        let mut line = format!("{}\t{}", name, class_name(classify(name)));
        if name.contains("::") {
            let validity = if is_valid_constant_path(name) { "valid" } else { "invalid" };
            line.push_str(&format!("\tconstant path {}", validity));
        }
        println!("{}", line);
    }
}
