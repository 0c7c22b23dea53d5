/// A node of the expression tree together with the source position it was
/// parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Literal { kind: LiteralKind, raw: String },
    Ident(String),
    Unary(UnaryOp, Box<Node>),
    Binary(Box<Node>, BinaryOp, Box<Node>),
    Comparison(Box<Node>, CompareOp, Box<Node>),
    Call { name: String, args: Vec<Node> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Node {
    pub fn new(kind: NodeKind, position: usize) -> Self {
        Self { kind, position }
    }

    // Moves the children out, leaving a childless placeholder behind.
    fn take_children(&mut self, out: &mut Vec<Node>) {
        match std::mem::replace(&mut self.kind, NodeKind::Ident(String::new())) {
            NodeKind::Unary(_, operand) => out.push(*operand),
            NodeKind::Binary(lhs, _, rhs) | NodeKind::Comparison(lhs, _, rhs) => {
                out.push(*lhs);
                out.push(*rhs);
            }
            NodeKind::Call { args, .. } => out.extend(args),
            NodeKind::Literal { .. } | NodeKind::Ident(_) => {}
        }
    }
}

// A flat chain such as `1+1+...+1` folds into a tree as deep as the chain is
// long, so the tree is torn down with an explicit stack instead of recursion.
impl Drop for Node {
    fn drop(&mut self) {
        if matches!(self.kind, NodeKind::Literal { .. } | NodeKind::Ident(_)) {
            return;
        }
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_children(&mut pending);
        }
    }
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }
}
