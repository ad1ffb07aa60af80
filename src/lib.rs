//! # ael
//!
//! A parser front end for the Asterisk Extension Language. See the
//! [`ael`](crate::ael) module for the pipeline and entry points, and
//! [`ael::testing`](crate::ael::testing) for the assertion helpers used by the tests.

pub mod ael;

pub use ael::ast::Ast;
pub use ael::{parse_file, parse_str, ParseOptions};
