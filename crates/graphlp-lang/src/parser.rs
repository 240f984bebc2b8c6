use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};
use thiserror::Error;

/// Deepest expression tree the parser builds, counting every operator,
/// negation and parenthesis on the path to a leaf.
pub const MAX_EXPR_DEPTH: usize = 256;

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Expression nested too deeply at position {span:?} (limit {limit})", limit = MAX_EXPR_DEPTH)]
    TooDeep { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } | ParseError::TooDeep { span } => {
                Some(*span)
            }
            _ => None,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    seen_header: bool,
    /// Open parentheses around the current position
    nesting: usize,
}

impl Parser {
    /// Comments carry no meaning to the grammar and are dropped here.
    pub fn new(tokens: Vec<Token>) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .collect();
        Self {
            tokens,
            pos: 0,
            seen_header: false,
            nesting: 0,
        }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn current_span(&self) -> Span {
        match self.current() {
            Some(t) => t.span,
            None => {
                let end = self.previous_end(0);
                Span::new(end, end)
            }
        }
    }

    fn previous_end(&self, fallback: usize) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span.end)
            .unwrap_or(fallback)
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{:?}", t.kind),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.peek_kind() == kind {
            self.advance().ok_or(ParseError::UnexpectedEof)
        } else {
            Err(self.unexpected(&format!("{:?}", kind)))
        }
    }

    fn expect_statement_end(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();

        loop {
            self.skip_separators();

            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Max | TokenKind::Min => {
                    items.push(Item::Objective(self.parse_objective()?))
                }
                TokenKind::Subject | TokenKind::St => self.parse_header()?,
                _ => items.push(Item::Constraint(self.parse_constraint()?)),
            }
            self.expect_statement_end()?;
        }

        Ok(Program { items })
    }

    /// `subject to` or `st`, at most once
    fn parse_header(&mut self) -> Result<(), ParseError> {
        if self.seen_header {
            return Err(self.unexpected("constraint"));
        }
        self.seen_header = true;
        if self.peek_kind() == TokenKind::Subject {
            self.advance();
            self.expect(TokenKind::To)?;
        } else {
            self.expect(TokenKind::St)?;
        }
        if self.peek_kind() == TokenKind::Colon {
            self.advance();
        }
        Ok(())
    }

    fn parse_objective(&mut self) -> Result<ObjectiveDecl, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEof)?;
        let sense = match token.kind {
            TokenKind::Max => Sense::Max,
            _ => Sense::Min,
        };
        if self.peek_kind() == TokenKind::Colon {
            self.advance();
        }
        let expr = self.parse_expr()?;

        Ok(ObjectiveDecl {
            span: Span::new(token.span.start, self.previous_end(token.span.end)),
            sense,
            expr,
        })
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));

        let label = if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Colon
        {
            let name = self.advance().map(|t| t.text);
            self.advance(); // :
            name
        } else {
            None
        };

        let lhs = self.parse_expr()?;
        let relation = match self.peek_kind() {
            TokenKind::Le => RelOp::Le,
            TokenKind::Ge => RelOp::Ge,
            TokenKind::Eq => RelOp::Eq,
            _ => return Err(self.unexpected("<=, >= or =")),
        };
        self.advance();
        let rhs = self.parse_expr()?;

        Ok(ConstraintDecl {
            span: Span::new(start.start, self.previous_end(start.end)),
            label,
            lhs,
            relation,
            rhs,
        })
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_additive().map(|(expr, _)| expr)
    }

    /// One level above a subtree of depth `depth`.
    fn nest(&self, depth: usize, at: Span) -> Result<usize, ParseError> {
        if depth >= MAX_EXPR_DEPTH {
            return Err(ParseError::TooDeep { span: at });
        }
        Ok(depth + 1)
    }

    fn parse_additive(&mut self) -> Result<(Expr, usize), ParseError> {
        let (mut left, mut depth) = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let at = self.current_span();
            self.advance();
            let (right, right_depth) = self.parse_multiplicative()?;
            depth = self.nest(depth.max(right_depth), at)?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    /// `*`, `/`, and implicit multiplication (`3x1`, `2(x1 + x2)`)
    fn parse_multiplicative(&mut self) -> Result<(Expr, usize), ParseError> {
        let (mut left, mut depth) = self.parse_unary()?;

        loop {
            let at = self.current_span();
            let op = match self.peek_kind() {
                TokenKind::Star => {
                    self.advance();
                    BinaryOp::Mul
                }
                TokenKind::Slash => {
                    self.advance();
                    BinaryOp::Div
                }
                TokenKind::Ident | TokenKind::LParen => BinaryOp::Mul,
                _ => break,
            };
            let (right, right_depth) = self.parse_unary()?;
            depth = self.nest(depth.max(right_depth), at)?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    /// A run of signs folds into at most one negation.
    fn parse_unary(&mut self) -> Result<(Expr, usize), ParseError> {
        let at = self.current_span();
        let mut negate = false;
        loop {
            match self.peek_kind() {
                TokenKind::Minus => negate = !negate,
                TokenKind::Plus => {}
                _ => break,
            }
            self.advance();
        }

        let (operand, depth) = self.parse_primary()?;
        if negate {
            Ok((Expr::Neg(Box::new(operand)), self.nest(depth, at)?))
        } else {
            Ok((operand, depth))
        }
    }

    fn parse_primary(&mut self) -> Result<(Expr, usize), ParseError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.advance().ok_or(ParseError::UnexpectedEof)?;
                let value: f64 = token
                    .text
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber(token.text.clone()))?;
                Ok((Expr::Number(value), 1))
            }
            TokenKind::Ident => {
                let token = self.advance().ok_or(ParseError::UnexpectedEof)?;
                let variable = Variable {
                    span: token.span,
                    name: token.text,
                };
                Ok((Expr::Variable(variable), 1))
            }
            TokenKind::LParen => {
                let at = self.current_span();
                if self.nesting >= MAX_EXPR_DEPTH {
                    return Err(ParseError::TooDeep { span: at });
                }
                self.advance();
                self.nesting += 1;
                let inner = self.parse_additive();
                self.nesting -= 1;
                let (expr, depth) = inner?;
                self.expect(TokenKind::RParen)?;
                Ok((Expr::Paren(Box::new(expr)), self.nest(depth, at)?))
            }
            _ => Err(self.unexpected("number, variable, or (")),
        }
    }
}
