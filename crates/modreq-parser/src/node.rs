//! AST node storage.
//!
//! Every node of a parsed script lives in one [`NodeArena`] and is addressed
//! by a [`NodeIndex`]. Children are stored as indices, so the arena can be
//! walked either recursively from the chunk root or linearly via
//! [`NodeArena::iter`].

use modreq_common::Span;

/// Index of a node in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Sentinel for "no node" (e.g. a missing `else` block).
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Minus,
    Len,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    // Statements
    Chunk {
        statements: Vec<NodeIndex>,
    },
    Block {
        statements: Vec<NodeIndex>,
    },
    Local {
        names: Vec<String>,
        values: Vec<NodeIndex>,
    },
    LocalFunction {
        name: String,
        function: NodeIndex,
    },
    FunctionStatement {
        target: NodeIndex,
        function: NodeIndex,
    },
    Assign {
        targets: Vec<NodeIndex>,
        values: Vec<NodeIndex>,
    },
    Return {
        values: Vec<NodeIndex>,
    },
    If {
        /// `(condition, block)` for the `if` and every `elseif`.
        clauses: Vec<(NodeIndex, NodeIndex)>,
        else_block: NodeIndex,
    },
    While {
        condition: NodeIndex,
        body: NodeIndex,
    },
    Repeat {
        body: NodeIndex,
        condition: NodeIndex,
    },
    For {
        names: Vec<String>,
        /// Range bounds for numeric loops, iterator expressions for generic ones.
        header: Vec<NodeIndex>,
        body: NodeIndex,
    },
    Break,
    Continue,
    ExpressionStatement {
        expression: NodeIndex,
    },

    // Expressions
    Identifier {
        name: String,
    },
    StringLiteral {
        value: String,
    },
    NumberLiteral {
        text: String,
    },
    BooleanLiteral {
        value: bool,
    },
    NilLiteral,
    Vararg,
    Member {
        object: NodeIndex,
        name: String,
    },
    Index {
        object: NodeIndex,
        key: NodeIndex,
    },
    /// `callee(args)`, or `callee:method(args)` when `method` is set.
    Call {
        callee: NodeIndex,
        method: Option<String>,
        args: Vec<NodeIndex>,
    },
    Function {
        params: Vec<String>,
        body: NodeIndex,
    },
    Table {
        /// Values of the table fields; keys are not retained.
        items: Vec<NodeIndex>,
    },
    Binary {
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
    },
    Unary {
        op: UnaryOp,
        operand: NodeIndex,
    },
    Paren {
        expression: NodeIndex,
    },
    /// Placeholder produced by error recovery.
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span });
        index
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            return None;
        }
        self.nodes.get(index.0 as usize)
    }

    #[inline]
    pub fn kind(&self, index: NodeIndex) -> Option<&NodeKind> {
        self.get(index).map(|node| &node.kind)
    }

    /// Span of a node, or a dummy span for `NONE`.
    pub fn span(&self, index: NodeIndex) -> Span {
        self.get(index).map_or(Span::DUMMY, |node| node.span)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }

    /// The string value when `index` is a string literal.
    pub fn string_literal(&self, index: NodeIndex) -> Option<&str> {
        match self.kind(index)? {
            NodeKind::StringLiteral { value } => Some(value),
            _ => None,
        }
    }

    /// The boolean value when `index` is a `true`/`false` literal.
    pub fn boolean_literal(&self, index: NodeIndex) -> Option<bool> {
        match self.kind(index)? {
            NodeKind::BooleanLiteral { value } => Some(*value),
            _ => None,
        }
    }
}
