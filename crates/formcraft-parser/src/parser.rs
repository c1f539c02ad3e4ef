// File: src/parser.rs
// Purpose: Recursive-descent parser from tokens to `Expr`
//
// Precedence, lowest first:
//   ternary   c ? a : b
//   or        ||
//   and       &&
//   equality  == !=
//   compare   < <= > >=
//   additive  + -
//   mult      * / %
//   unary     - ! +
//   postfix   .name [expr]
//   primary   literal | name | ( expr )
//
// Two limits keep parsing and evaluation off the end of the stack: brackets,
// prefix operators and ternary branches may nest `MAX_NESTING` deep, and the
// finished tree may be at most `MAX_DEPTH` nodes tall.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::ExprError;
use crate::lexer::{tokenize, Spanned, Token};
use crate::value::Value;

/// Deepest bracket, prefix-operator or ternary nesting
pub const MAX_NESTING: usize = 64;

/// Tallest expression tree a formula may produce
pub const MAX_DEPTH: usize = 256;

/// Parse formula source into an expression tree
pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens,
        cursor: 0,
        nesting: 0,
    };
    let parsed = parser.ternary()?;

    match parser.tokens.get(parser.cursor) {
        None => Ok(parsed.expr),
        Some(extra) => Err(unexpected(extra)),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
    nesting: usize,
}

/// A subtree and its height
struct Parsed {
    expr: Expr,
    height: usize,
}

impl Parsed {
    fn leaf(expr: Expr) -> Self {
        Self { expr, height: 1 }
    }

    /// Wrap children in a new node, refusing trees taller than `MAX_DEPTH`
    fn node(expr: Expr, child_height: usize, pos: usize) -> Result<Self, ExprError> {
        let height = child_height + 1;
        if height > MAX_DEPTH {
            return Err(ExprError::TooDeep { pos });
        }
        Ok(Self { expr, height })
    }
}

fn unexpected(spanned: &Spanned) -> ExprError {
    ExprError::UnexpectedToken {
        found: spanned.token.to_string(),
        pos: spanned.pos,
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|s| &s.token)
    }

    /// Position of the token just consumed
    fn last_pos(&self) -> usize {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |s| s.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let next = self.tokens.get(self.cursor).cloned();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ExprError> {
        match self.advance() {
            Some(spanned) if &spanned.token == token => Ok(()),
            Some(spanned) => Err(unexpected(&spanned)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    /// Run `f` one nesting level deeper
    fn nested<T>(
        &mut self,
        pos: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.nesting >= MAX_NESTING {
            return Err(ExprError::TooDeep { pos });
        }

        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    fn ternary(&mut self) -> Result<Parsed, ExprError> {
        let cond = self.or()?;
        if !self.eat(&Token::Question) {
            return Ok(cond);
        }

        let pos = self.last_pos();
        let (then, otherwise) = self.nested(pos, |p| {
            let then = p.ternary()?;
            p.expect(&Token::Colon)?;
            let otherwise = p.ternary()?;
            Ok((then, otherwise))
        })?;

        let child_height = cond.height.max(then.height).max(otherwise.height);
        Parsed::node(
            Expr::Conditional {
                cond: Box::new(cond.expr),
                then: Box::new(then.expr),
                otherwise: Box::new(otherwise.expr),
            },
            child_height,
            pos,
        )
    }

    /// Parse one left-associative precedence level
    fn binary_level(
        &mut self,
        ops: &[(Token, BinaryOp)],
        next: fn(&mut Self) -> Result<Parsed, ExprError>,
    ) -> Result<Parsed, ExprError> {
        let mut left = next(self)?;

        loop {
            let op = match self.peek() {
                Some(token) => ops.iter().find(|(t, _)| t == token).map(|(_, op)| *op),
                None => None,
            };
            let Some(op) = op else {
                return Ok(left);
            };

            self.cursor += 1;
            let pos = self.last_pos();
            let right = next(self)?;
            let child_height = left.height.max(right.height);
            left = Parsed::node(
                Expr::Binary {
                    op,
                    left: Box::new(left.expr),
                    right: Box::new(right.expr),
                },
                child_height,
                pos,
            )?;
        }
    }

    fn or(&mut self) -> Result<Parsed, ExprError> {
        self.binary_level(&[(Token::OrOr, BinaryOp::Or)], Self::and)
    }

    fn and(&mut self) -> Result<Parsed, ExprError> {
        self.binary_level(&[(Token::AndAnd, BinaryOp::And)], Self::equality)
    }

    fn equality(&mut self) -> Result<Parsed, ExprError> {
        self.binary_level(
            &[(Token::EqEq, BinaryOp::Eq), (Token::NotEq, BinaryOp::NotEq)],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Parsed, ExprError> {
        self.binary_level(
            &[
                (Token::Lt, BinaryOp::Lt),
                (Token::Le, BinaryOp::Le),
                (Token::Gt, BinaryOp::Gt),
                (Token::Ge, BinaryOp::Ge),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Parsed, ExprError> {
        self.binary_level(
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> Result<Parsed, ExprError> {
        self.binary_level(
            &[
                (Token::Star, BinaryOp::Mul),
                (Token::Slash, BinaryOp::Div),
                (Token::Percent, BinaryOp::Rem),
            ],
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Parsed, ExprError> {
        // `None` is unary plus
        let op = match self.peek() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Bang) => Some(UnaryOp::Not),
            Some(Token::Plus) => None,
            _ => return self.postfix(),
        };

        self.cursor += 1;
        let pos = self.last_pos();
        let operand = self.nested(pos, Self::unary)?;

        let expr = match op {
            Some(op) => Expr::Unary {
                op,
                operand: Box::new(operand.expr),
            },
            // Unary plus is numeric coercion, same as `x - 0`
            None => Expr::Binary {
                op: BinaryOp::Sub,
                left: Box::new(operand.expr),
                right: Box::new(Expr::Literal(Value::Number(0.0))),
            },
        };
        Parsed::node(expr, operand.height, pos)
    }

    fn postfix(&mut self) -> Result<Parsed, ExprError> {
        let mut parsed = self.primary()?;

        loop {
            if self.eat(&Token::Dot) {
                let pos = self.last_pos();
                match self.advance() {
                    Some(Spanned { token: Token::Ident(property), .. }) => {
                        let child_height = parsed.height;
                        parsed = Parsed::node(
                            Expr::Member {
                                object: Box::new(parsed.expr),
                                property,
                            },
                            child_height,
                            pos,
                        )?;
                    }
                    Some(other) => return Err(unexpected(&other)),
                    None => return Err(ExprError::UnexpectedEnd),
                }
            } else if self.eat(&Token::LBracket) {
                let pos = self.last_pos();
                let index = self.nested(pos, |p| {
                    let index = p.ternary()?;
                    p.expect(&Token::RBracket)?;
                    Ok(index)
                })?;

                let child_height = parsed.height.max(index.height);
                parsed = Parsed::node(
                    Expr::Index {
                        object: Box::new(parsed.expr),
                        index: Box::new(index.expr),
                    },
                    child_height,
                    pos,
                )?;
            } else {
                return Ok(parsed);
            }
        }
    }

    fn primary(&mut self) -> Result<Parsed, ExprError> {
        let spanned = self.advance().ok_or(ExprError::UnexpectedEnd)?;

        let expr = match spanned.token {
            Token::Number(n) => Expr::Literal(Value::Number(n)),
            Token::Str(s) => Expr::Literal(Value::String(s)),
            Token::True => Expr::Literal(Value::Bool(true)),
            Token::False => Expr::Literal(Value::Bool(false)),
            Token::Null => Expr::Literal(Value::Null),
            Token::Ident(name) => Expr::Ident(name),
            Token::LParen => {
                return self.nested(spanned.pos, |p| {
                    let inner = p.ternary()?;
                    p.expect(&Token::RParen)?;
                    Ok(inner)
                });
            }
            _ => return Err(unexpected(&spanned)),
        };

        Ok(Parsed::leaf(expr))
    }
}
