//! Lowering integration tests
//!
//! Syntax trees are built directly (or parsed from JSON) and lowered with
//! the public [`Translator`](garnet_engine::Translator) API.


mod assignment;
mod basics;
mod json;
mod parameters;
