//! Error types returned across the library API
//!
//! Syntax errors in AEL source are not Rust errors: they are reported as
//! diagnostics and counted on the parse. The types here cover what can fail
//! around a parse (I/O, configuration, misuse of node ids).

use crate::ael::ast::pool::NodeId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("node {0} is not live in this pool")]
    Stale(NodeId),
}

/// Failures of `#include` handling inside the lexer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncludeError {
    #[error("Include nesting too deep (limit is {limit})")]
    TooDeep { limit: usize },
    #[error("Include loop: {0} is already being read")]
    Cycle(String),
    #[error("Couldn't read the include file {path}: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("Malformed include directive: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum AelError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("unknown output format '{0}' (expected treeviz, json or yaml)")]
    UnknownFormat(String),
    #[error("could not serialize the tree: {0}")]
    Serialize(String),
}
