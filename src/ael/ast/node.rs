//! The tree node type
//!
//!     Every grammar production yields a [`Node`]. The tag ([`NodeType`]) tells
//!     which production family built it; the payload ([`NodeKind`]) only carries
//!     the fields meaningful to that family. Lists of children are chains of
//!     nodes linked through `next`, addressed by the id of their head.
//!
//!     `parent` is a navigation aid stamped by `set_dads`. Nothing that frees
//!     nodes ever reads it.

use super::pool::NodeId;
use super::span::Span;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Head of a `next`-linked chain of nodes, or `None` for the empty list.
pub type NodeList = Option<NodeId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    Word,
    MacroCall,
    Context,
    Macro,
    Globals,
    ApplicationCall,
    Case,
    Pattern,
    Default,
    Catch,
    Switches,
    ESwitches,
    Includes,
    StatementBlock,
    VarDec,
    Goto,
    Label,
    For,
    While,
    Break,
    Return,
    Continue,
    If,
    IfTime,
    Random,
    Switch,
    Extension,
    IgnorePat,
    /// Produced by dialplan loaders, never by the parser.
    GlobalsEntry,
}

impl NodeType {
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Word => "Word",
            NodeType::MacroCall => "MacroCall",
            NodeType::Context => "Context",
            NodeType::Macro => "Macro",
            NodeType::Globals => "Globals",
            NodeType::ApplicationCall => "ApplicationCall",
            NodeType::Case => "Case",
            NodeType::Pattern => "Pattern",
            NodeType::Default => "Default",
            NodeType::Catch => "Catch",
            NodeType::Switches => "Switches",
            NodeType::ESwitches => "ESwitches",
            NodeType::Includes => "Includes",
            NodeType::StatementBlock => "StatementBlock",
            NodeType::VarDec => "VarDec",
            NodeType::Goto => "Goto",
            NodeType::Label => "Label",
            NodeType::For => "For",
            NodeType::While => "While",
            NodeType::Break => "Break",
            NodeType::Return => "Return",
            NodeType::Continue => "Continue",
            NodeType::If => "If",
            NodeType::IfTime => "IfTime",
            NodeType::Random => "Random",
            NodeType::Switch => "Switch",
            NodeType::Extension => "Extension",
            NodeType::IgnorePat => "IgnorePat",
            NodeType::GlobalsEntry => "GlobalsEntry",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The condition of an `if`, `random` or `ifTime` statement
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Raw expression text captured between the parentheses.
    Expr(String),
    /// Four Word nodes: time range, days of week, days of month, months.
    TimeSpec(NodeList),
}

/// Variant payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A word. Include entries qualified by a time spec hang it off `args`.
    Word { text: String, args: NodeList },
    /// `abstract_flag`: 0 plain, 1 abstract, 2 extend, 3 abstract and extend.
    Context {
        name: String,
        statements: NodeList,
        abstract_flag: u8,
    },
    Macro {
        name: String,
        args: NodeList,
        statements: NodeList,
    },
    Globals { statements: NodeList },
    VarDec { name: String, value: String },
    Extension {
        name: String,
        statements: NodeList,
        regexten: bool,
        hints: Option<String>,
    },
    IgnorePat { pattern: String },
    Conditional {
        condition: Condition,
        then_branch: NodeList,
        else_branch: NodeList,
    },
    Switch { test: String, cases: NodeList },
    /// Shared by `case`, `pattern` and `default`; the last has an empty value.
    Case { value: String, statements: NodeList },
    Catch { name: String, statements: NodeList },
    StatementBlock { statements: NodeList },
    /// `[label]`, `[extension, priority]` or `[context, extension, priority]`.
    Goto { target: NodeList },
    Label { name: String },
    For {
        init: String,
        test: String,
        increment: String,
        body: NodeList,
    },
    While { test: String, body: NodeList },
    /// Application and macro calls.
    Call { name: String, args: NodeList },
    /// Switches, eswitches and includes.
    WordList { words: NodeList },
    /// Break, return and continue.
    Bare,
}

impl NodeKind {
    /// Every child list owned by this payload, in source order.
    pub fn child_lists(&self) -> Vec<NodeList> {
        match self {
            NodeKind::Word { args, .. } => vec![*args],
            NodeKind::Context { statements, .. }
            | NodeKind::Globals { statements }
            | NodeKind::Extension { statements, .. }
            | NodeKind::Case { statements, .. }
            | NodeKind::Catch { statements, .. }
            | NodeKind::StatementBlock { statements } => vec![*statements],
            NodeKind::Macro {
                args, statements, ..
            } => vec![*args, *statements],
            NodeKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut lists = Vec::with_capacity(3);
                if let Condition::TimeSpec(words) = condition {
                    lists.push(*words);
                }
                lists.push(*then_branch);
                lists.push(*else_branch);
                lists
            }
            NodeKind::Switch { cases, .. } => vec![*cases],
            NodeKind::Goto { target } => vec![*target],
            NodeKind::For { body, .. } | NodeKind::While { body, .. } => vec![*body],
            NodeKind::Call { args, .. } => vec![*args],
            NodeKind::WordList { words } => vec![*words],
            NodeKind::VarDec { .. }
            | NodeKind::IgnorePat { .. }
            | NodeKind::Label { .. }
            | NodeKind::Bare => Vec::new(),
        }
    }

    /// The primary string of the payload, if it has one.
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeKind::Word { text, .. } => Some(text),
            NodeKind::Context { name, .. }
            | NodeKind::Macro { name, .. }
            | NodeKind::VarDec { name, .. }
            | NodeKind::Extension { name, .. }
            | NodeKind::Catch { name, .. }
            | NodeKind::Label { name }
            | NodeKind::Call { name, .. } => Some(name),
            NodeKind::IgnorePat { pattern } => Some(pattern),
            NodeKind::Conditional {
                condition: Condition::Expr(expr),
                ..
            } => Some(expr),
            NodeKind::Switch { test, .. } | NodeKind::While { test, .. } => Some(test),
            NodeKind::Case { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// One node of the parse tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub node_type: NodeType,
    pub span: Span,
    pub filename: Arc<str>,
    pub kind: NodeKind,
    pub(crate) next: NodeList,
    pub(crate) last: NodeList,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub fn new(node_type: NodeType, kind: NodeKind, span: Span, filename: Arc<str>) -> Self {
        Self {
            node_type,
            span,
            filename,
            kind,
            next: None,
            last: None,
            parent: None,
        }
    }

    /// Following sibling in the list this node belongs to.
    pub fn next(&self) -> NodeList {
        self.next
    }

    /// Enclosing container, when one has stamped itself on this node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn label(&self) -> Option<&str> {
        self.kind.label()
    }

    /// Text of a Word node.
    pub fn word(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Word { text, .. } => Some(text),
            _ => None,
        }
    }
}
