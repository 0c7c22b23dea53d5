use crate::ast::{BinaryOp, CompareOp, LiteralKind, Node, NodeKind, UnaryOp};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// Recursive-descent parser, one method per precedence level:
///
/// ```text
/// comparison := addsub ( (= | < | > | <= | >=) addsub )*
/// addsub     := mul ( (+ | -) mul )*
/// mul        := div ( * div )*
/// div        := exp ( / exp )*
/// exp        := unary ( ^ unary )*
/// unary      := (+ | -) unary | primary
/// primary    := NUMBER | STRING | IDENT [ '(' args ')' ] | '(' comparison ')'
/// ```
///
/// Every binary level folds to the left, `^` included.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let position = tokens.last().map_or(1, |t| t.position + 1);
            tokens.push(Token { kind: TokenKind::Eof, text: String::new(), position });
        }
        Self { tokens, pos: 0, depth: 0, max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn lookahead(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens.get(self.pos + 1).map_or(TokenKind::Eof, |t| t.kind)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token> {
        if self.lookahead().kind == kind {
            Ok(self.bump())
        } else {
            self.err_here(expected)
        }
    }

    fn err_here<T>(&self, expected: &'static str) -> Result<T> {
        let tok = self.lookahead();
        Err(Error::UnexpectedToken { expected, found: tok.kind, position: tok.position })
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::NestingTooDeep { limit: self.max_depth, position: self.lookahead().position });
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    pub fn parse(&mut self) -> Result<Node> {
        let node = self.parse_comparison()?;
        self.expect(TokenKind::Eof, "end of input")?;
        tracing::trace!(position = node.position, "parsed formula");
        Ok(node)
    }

    fn parse_comparison(&mut self) -> Result<Node> {
        self.descend()?;
        let mut node = self.parse_additive()?;
        loop {
            let op = match self.lookahead().kind {
                TokenKind::Equal => CompareOp::Eq,
                TokenKind::Less => CompareOp::Lt,
                TokenKind::Greater => CompareOp::Gt,
                TokenKind::Le => CompareOp::Le,
                TokenKind::Ge => CompareOp::Ge,
                _ => break,
            };
            let position = self.bump().position;
            let rhs = self.parse_additive()?;
            node = Node::new(NodeKind::Comparison(Box::new(node), op, Box::new(rhs)), position);
        }
        self.ascend();
        Ok(node)
    }

    fn parse_additive(&mut self) -> Result<Node> {
        let mut node = self.parse_multiplicative()?;
        loop {
            let op = match self.lookahead().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let position = self.bump().position;
            let rhs = self.parse_multiplicative()?;
            node = Node::new(NodeKind::Binary(Box::new(node), op, Box::new(rhs)), position);
        }
        Ok(node)
    }

    fn parse_multiplicative(&mut self) -> Result<Node> {
        let mut node = self.parse_division()?;
        while self.lookahead().kind == TokenKind::Star {
            let position = self.bump().position;
            let rhs = self.parse_division()?;
            node = Node::new(NodeKind::Binary(Box::new(node), BinaryOp::Mul, Box::new(rhs)), position);
        }
        Ok(node)
    }

    fn parse_division(&mut self) -> Result<Node> {
        let mut node = self.parse_power()?;
        while self.lookahead().kind == TokenKind::Slash {
            let position = self.bump().position;
            let rhs = self.parse_power()?;
            node = Node::new(NodeKind::Binary(Box::new(node), BinaryOp::Div, Box::new(rhs)), position);
        }
        Ok(node)
    }

    fn parse_power(&mut self) -> Result<Node> {
        let mut node = self.parse_unary()?;
        while self.lookahead().kind == TokenKind::Caret {
            let position = self.bump().position;
            let rhs = self.parse_unary()?;
            node = Node::new(NodeKind::Binary(Box::new(node), BinaryOp::Pow, Box::new(rhs)), position);
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<Node> {
        let op = match self.lookahead().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.parse_atom(),
        };
        let position = self.bump().position;
        self.descend()?;
        let operand = self.parse_unary()?;
        self.ascend();
        Ok(Node::new(NodeKind::Unary(op, Box::new(operand)), position))
    }

    fn parse_atom(&mut self) -> Result<Node> {
        match self.lookahead().kind {
            TokenKind::Number | TokenKind::String => {
                let tok = self.bump();
                let kind = if tok.kind == TokenKind::Number { LiteralKind::Number } else { LiteralKind::String };
                Ok(Node::new(NodeKind::Literal { kind, raw: tok.text }, tok.position))
            }
            TokenKind::LParen => {
                self.bump();
                let node = self.parse_comparison()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(node)
            }
            TokenKind::Identifier if self.peek_kind() == TokenKind::LParen => {
                let ident = self.bump();
                self.bump(); // '('
                let args = self.parse_args()?;
                Ok(Node::new(NodeKind::Call { name: ident.text, args }, ident.position))
            }
            TokenKind::Identifier => {
                let ident = self.bump();
                Ok(Node::new(NodeKind::Ident(ident.text), ident.position))
            }
            _ => self.err_here("expression"),
        }
    }

    // Called just past '('; consumes the closing ')'.
    fn parse_args(&mut self) -> Result<Vec<Node>> {
        let mut args = Vec::new();
        if self.lookahead().kind == TokenKind::RParen {
            self.bump();
            return Ok(args);
        }
        loop {
            args.push(self.parse_comparison()?);
            match self.lookahead().kind {
                TokenKind::Delimiter => {
                    self.bump();
                }
                TokenKind::RParen => {
                    self.bump();
                    return Ok(args);
                }
                _ => return self.err_here("';' or ')'"),
            }
        }
    }
}

pub fn parse_tokens(tokens: Vec<Token>) -> Result<Node> {
    Parser::new(tokens).parse()
}
