//! AEL front end
//!
//! Reads Asterisk Extension Language source and builds a parse tree,
//! reporting syntax errors with file and line/column ranges and recovering
//! from them where the grammar allows.
//!
//!     source ──► lexing::Lexer ──► parsing::parse ──► ast::Ast
//!                     │                  │
//!                     └── diagnostics ◄──┘
//!
//! [`parse_str`] and [`parse_file`] are the usual entry points. Anything
//! implementing [`token::TokenSource`] can be fed to [`parsing::parse`]
//! directly.

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod parsing;
pub mod testing;
pub mod token;

use ast::Ast;
use config::AelConfig;
use diagnostics::{DiagnosticSink, LogSink, NullSink};
use error::AelError;
use lexing::Lexer;
use parsing::context::ParseContext;
use std::path::{Path, PathBuf};

/// Settings for one parse
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub config: AelConfig,
    /// Forward diagnostics to the `log` facade as they are produced. They
    /// are always collected on the resulting [`Ast`].
    pub log_diagnostics: bool,
    /// Where `#include` paths of a source without a file are resolved.
    pub include_dir: Option<PathBuf>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            config: AelConfig::default(),
            log_diagnostics: true,
            include_dir: None,
        }
    }
}

impl ParseOptions {
    pub fn new(config: AelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Defaults, without logging diagnostics.
    pub fn quiet() -> Self {
        Self {
            log_diagnostics: false,
            ..Self::default()
        }
    }

    fn sink(&self) -> Box<dyn DiagnosticSink> {
        if self.log_diagnostics {
            Box::new(LogSink)
        } else {
            Box::new(NullSink)
        }
    }

    fn context(&self, filename: &str) -> ParseContext {
        ParseContext::new(filename, self.config.parser.clone()).with_sink(self.sink())
    }
}

fn run(lexer: Lexer, filename: &str, options: &ParseOptions) -> Ast {
    let mut ctx = options.context(filename);
    let outcome = parsing::parse(lexer, &mut ctx);
    let (pool, diagnostics, _) = ctx.into_parts();
    log::debug!(
        "parsed {}: {} errors, {} live nodes",
        filename,
        outcome.errors,
        pool.live()
    );
    Ast::new(pool, outcome.root, diagnostics, outcome.errors)
}

/// Parse AEL held in memory. `filename` is used in diagnostics and stamped on
/// every node.
pub fn parse_str(source: &str, filename: &str, options: &ParseOptions) -> Ast {
    let mut lexer = Lexer::with_config(source, filename, &options.config.lexer);
    if let Some(dir) = &options.include_dir {
        lexer = lexer.with_base_dir(dir);
    }
    run(lexer, filename, options)
}

/// Read and parse an AEL file. Only failing to read `path` itself is an
/// `Err`; problems inside the file are diagnostics on the returned tree.
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<Ast, AelError> {
    let lexer = Lexer::from_path(path, &options.config.lexer)?;
    let filename = path.display().to_string();
    Ok(run(lexer, &filename, options))
}
