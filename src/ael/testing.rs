//! Fluent assertions over parsed trees
//!
//! Walking pooled nodes by hand in every test buries what is being checked.
//! These builders navigate by index and fail with the path to the node that
//! did not match:
//!
//! ```rust-example
//! use crate::ael::testing::assert_tree;
//!
//! assert_tree(&ast)
//!     .no_errors()
//!     .object_count(1)
//!     .object(0, |ctx| {
//!         ctx.assert_context()
//!             .label("incoming")
//!             .child(0, |ext| {
//!                 ext.assert_extension().label("s").child_count(1);
//!             });
//!     });
//! ```
//!
//! `child(i, ..)` indexes all payload lists of a node flattened in source
//! order. `words(n, ..)` and `list_len(n, ..)` look at one list when the
//! distinction matters (a macro's arguments against its statements).

use crate::ael::ast::{count_reachable, siblings, Ast, Node, NodeId, NodeKind, NodeType, Span};

pub fn assert_tree(ast: &Ast) -> TreeAssertion<'_> {
    TreeAssertion { ast }
}

pub struct TreeAssertion<'a> {
    ast: &'a Ast,
}

fn summarize(ast: &Ast, ids: &[NodeId]) -> String {
    ids.iter()
        .filter_map(|id| ast.node(*id))
        .map(|node| match node.label() {
            Some(label) => format!("{} {}", node.node_type, label),
            None => node.node_type.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> TreeAssertion<'a> {
    pub fn object_count(self, expected: usize) -> Self {
        let objects = self.ast.objects();
        assert_eq!(
            objects.len(),
            expected,
            "Expected {} objects, found {}: [{}]",
            expected,
            objects.len(),
            summarize(self.ast, &objects)
        );
        self
    }

    pub fn object<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let objects = self.ast.objects();
        assert!(
            index < objects.len(),
            "Object index {} out of bounds ({} objects)",
            index,
            objects.len()
        );
        assertion(NodeAssertion::new(self.ast, objects[index], format!("objects[{}]", index)));
        self
    }

    pub fn no_errors(self) -> Self {
        let rendered: Vec<_> = self.ast.diagnostics().iter().map(|d| d.rendered.as_str()).collect();
        assert_eq!(self.ast.errors(), 0, "Expected no errors, got:\n{}", rendered.join("\n"));
        self
    }

    pub fn error_count(self, expected: usize) -> Self {
        assert_eq!(self.ast.errors(), expected, "Expected {} errors", expected);
        self
    }

    /// Some diagnostic message contains `needle`.
    pub fn diagnostic_containing(self, needle: &str) -> Self {
        let messages: Vec<_> = self.ast.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert!(
            messages.iter().any(|m| m.contains(needle)),
            "No diagnostic contains {:?}; got {:?}",
            needle,
            messages
        );
        self
    }

    /// Every live node in the pool is reachable from the root.
    pub fn no_leaks(self) -> Self {
        let live = self.ast.pool().live();
        let reachable = count_reachable(self.ast.pool(), self.ast.root());
        assert_eq!(live, reachable, "{} live nodes but {} reachable", live, reachable);
        assert_eq!(self.ast.pool().stale_releases(), 0, "stale releases recorded");
        self
    }

    pub fn no_root(self) -> Self {
        assert!(
            self.ast.root().is_none(),
            "Expected no root, found [{}]",
            summarize(self.ast, &self.ast.objects())
        );
        self
    }
}

pub struct NodeAssertion<'a> {
    ast: &'a Ast,
    id: NodeId,
    node: &'a Node,
    context: String,
}

impl<'a> NodeAssertion<'a> {
    fn new(ast: &'a Ast, id: NodeId, context: String) -> Self {
        let node = ast
            .node(id)
            .unwrap_or_else(|| panic!("{}: node {} is not live", context, id));
        Self { ast, id, node, context }
    }

    fn expect_type(self, expected: NodeType) -> Self {
        assert_eq!(
            self.node.node_type, expected,
            "{}: Expected {}, found {}",
            self.context, expected, self.node.node_type
        );
        self
    }

    pub fn node_type(self, expected: NodeType) -> Self {
        self.expect_type(expected)
    }

    pub fn assert_context(self) -> Self {
        self.expect_type(NodeType::Context)
    }

    pub fn assert_macro(self) -> Self {
        self.expect_type(NodeType::Macro)
    }

    pub fn assert_extension(self) -> Self {
        self.expect_type(NodeType::Extension)
    }

    pub fn assert_call(self) -> Self {
        self.expect_type(NodeType::ApplicationCall)
    }

    pub fn assert_vardec(self) -> Self {
        self.expect_type(NodeType::VarDec)
    }

    pub fn assert_goto(self) -> Self {
        self.expect_type(NodeType::Goto)
    }

    pub fn assert_word(self) -> Self {
        self.expect_type(NodeType::Word)
    }

    pub fn label(self, expected: &str) -> Self {
        assert_eq!(
            self.node.label(),
            Some(expected),
            "{}: label mismatch on {}",
            self.context,
            self.node.node_type
        );
        self
    }

    /// Value of a variable declaration.
    pub fn value(self, expected: &str) -> Self {
        match &self.node.kind {
            NodeKind::VarDec { value, .. } => {
                assert_eq!(value, expected, "{}: value mismatch", self.context)
            }
            other => panic!("{}: Expected VarDec payload, found {:?}", self.context, other),
        }
        self
    }

    pub fn abstract_flag(self, expected: u8) -> Self {
        match &self.node.kind {
            NodeKind::Context { abstract_flag, .. } => {
                assert_eq!(*abstract_flag, expected, "{}: abstract flag mismatch", self.context)
            }
            other => panic!("{}: Expected Context payload, found {:?}", self.context, other),
        }
        self
    }

    pub fn span(self, first_line: usize, first_col: usize, last_line: usize, last_col: usize) -> Self {
        let expected = Span::from_coords(first_line, first_col, last_line, last_col);
        assert_eq!(self.node.span, expected, "{}: span mismatch", self.context);
        self
    }

    pub fn parent(self, expected: NodeId) -> Self {
        assert_eq!(self.node.parent(), Some(expected), "{}: parent mismatch", self.context);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    fn all_children(&self) -> Vec<NodeId> {
        self.ast.children(self.id).into_iter().flatten().collect()
    }

    pub fn child_count(self, expected: usize) -> Self {
        let children = self.all_children();
        assert_eq!(
            children.len(),
            expected,
            "{}: Expected {} children, found {}: [{}]",
            self.context,
            expected,
            children.len(),
            summarize(self.ast, &children)
        );
        self
    }

    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let children = self.all_children();
        assert!(
            index < children.len(),
            "{}: child index {} out of bounds ({} children)",
            self.context,
            index,
            children.len()
        );
        let context = format!("{}.children[{}]", self.context, index);
        assertion(NodeAssertion::new(self.ast, children[index], context));
        self
    }

    /// Texts of the Word nodes in payload list `list`.
    pub fn words(self, list: usize, expected: &[&str]) -> Self {
        let lists = self.node.kind.child_lists();
        let head = lists.get(list).copied().flatten();
        let actual: Vec<&str> = siblings(self.ast.pool(), head)
            .filter_map(|id| self.ast.node(id).and_then(Node::word))
            .collect();
        assert_eq!(actual, expected, "{}: words of list {}", self.context, list);
        self
    }

    /// Number of nodes in payload list `list`.
    pub fn list_len(self, list: usize, expected: usize) -> Self {
        let lists = self.ast.children(self.id);
        let actual = lists.get(list).map(Vec::len).unwrap_or(0);
        assert_eq!(actual, expected, "{}: length of list {}", self.context, list);
        self
    }
}
