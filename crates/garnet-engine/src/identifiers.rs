//! Identifier classification
//!
//! Lexical classification of names, independent of any scope. Works on Unicode
//! code points; every code point at or above 128 counts as a letter.

/// Lexical class of a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierType {
    /// `$name`
    Global,
    /// `@@name`
    Class,
    /// `@name`
    Instance,
    /// `Name`
    Const,
    /// `name` / `_name`
    Local,
    /// Anything else
    Junk,
}

/// Titlecase letters (general category Lt)
const TITLECASE: &[(char, char)] = &[
    ('\u{01C5}', '\u{01C5}'),
    ('\u{01C8}', '\u{01C8}'),
    ('\u{01CB}', '\u{01CB}'),
    ('\u{01F2}', '\u{01F2}'),
    ('\u{1F88}', '\u{1F8F}'),
    ('\u{1F98}', '\u{1F9F}'),
    ('\u{1FA8}', '\u{1FAF}'),
    ('\u{1FBC}', '\u{1FBC}'),
    ('\u{1FCC}', '\u{1FCC}'),
    ('\u{1FFC}', '\u{1FFC}'),
];

fn is_titlecase(c: char) -> bool {
    TITLECASE.iter().any(|&(lo, hi)| lo <= c && c <= hi)
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || c as u32 >= 128
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric() || c as u32 >= 128
}

fn is_constant_start(c: char) -> bool {
    (c.is_uppercase() || is_titlecase(c)) && !c.is_lowercase()
}

/// A non-empty identifier: a start character followed by identifier characters
fn is_identifier_tail(tail: &str) -> bool {
    let mut chars = tail.chars();
    match chars.next() {
        Some(first) => is_identifier_start(first) && chars.all(is_identifier_char),
        None => false,
    }
}

/// Classify a name
pub fn classify(name: &str) -> IdentifierType {
    let Some(first) = name.chars().next() else {
        return IdentifierType::Junk;
    };

    if let Some(tail) = name.strip_prefix('$') {
        return if is_identifier_tail(tail) {
            IdentifierType::Global
        } else {
            IdentifierType::Junk
        };
    }

    if let Some(tail) = name.strip_prefix("@@") {
        if is_identifier_tail(tail) {
            return IdentifierType::Class;
        }
    }

    if let Some(tail) = name.strip_prefix('@') {
        return if is_identifier_tail(tail) {
            IdentifierType::Instance
        } else {
            IdentifierType::Junk
        };
    }

    if is_constant_start(first) {
        return IdentifierType::Const;
    }

    if is_identifier_tail(name) {
        IdentifierType::Local
    } else {
        IdentifierType::Junk
    }
}

/// Whether `name` is a valid constant name
pub fn is_constant_name(name: &str) -> bool {
    classify(name) == IdentifierType::Const
}

/// Whether `path` is a valid constant path such as `A::B` or `::A`
///
/// Every `::`-separated segment must be a constant name, except the first,
/// which may be empty.
pub fn is_valid_constant_path(path: &str) -> bool {
    let leading_root = path.starts_with("::") && path.len() > 2;
    path.split("::").enumerate().all(|(i, segment)| {
        (i == 0 && segment.is_empty() && leading_root) || is_constant_name(segment)
    })
}
