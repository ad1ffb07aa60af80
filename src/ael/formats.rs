//! Output formats for parsed trees
//!
//! All formats render from the [`snapshot`] of a tree. `treeviz` is meant for
//! people; `json` and `yaml` for tools and golden files.

pub mod snapshot;
pub mod treeviz;

pub use snapshot::{snapshot_ast, snapshot_node, AstSnapshot};
pub use treeviz::to_treeviz_str;

use crate::ael::ast::Ast;
use crate::ael::config::OutputFormat;
use crate::ael::error::AelError;

/// Renders a whole tree as text
pub trait Formatter {
    fn name(&self) -> &str;

    fn serialize(&self, ast: &Ast) -> Result<String, AelError>;
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, ast: &Ast) -> Result<String, AelError> {
        Ok(to_treeviz_str(ast))
    }
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, ast: &Ast) -> Result<String, AelError> {
        serde_json::to_string_pretty(&snapshot_ast(ast)).map_err(|e| AelError::Serialize(e.to_string()))
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, ast: &Ast) -> Result<String, AelError> {
        serde_yaml::to_string(&snapshot_ast(ast)).map_err(|e| AelError::Serialize(e.to_string()))
    }
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Treeviz => Box::new(TreevizFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Yaml => Box::new(YamlFormatter),
    }
}

/// Render `ast` in the given format.
pub fn render(ast: &Ast, format: OutputFormat) -> Result<String, AelError> {
    formatter_for(format).serialize(ast)
}
