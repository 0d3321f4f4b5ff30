//! Formula parser - converts lexed tokens into a small expression tree.
//!
//! Precedence, loosest first: comparison, &, + -, * /, unary + -, ^ (right assoc), postfix %.
//! Left-associative operator runs such as `a+b+c` become one flat [`Expr::Chain`],
//! so long sums do not deepen the tree. Nesting (parentheses, call arguments,
//! prefix signs, exponents, `%`) is limited to [`MAX_DEPTH`] levels.

use super::lexer::{Spanned, Token};
use super::{FormulaError, MAX_DEPTH};
use crate::engine::value::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Text(String),
    Error(ErrorKind),
    /// A bare identifier that is not a function call.
    Name(String),
    Neg(Box<Expr>),
    Percent(Box<Expr>),
    /// `first op1 rhs1 op2 rhs2 ...`, folded left to right.
    Chain {
        first: Box<Expr>,
        rest: Vec<(Op, Expr)>,
    },
    /// Exponentiation; the only right-associative operator.
    Binary {
        op: Op,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

pub(crate) fn parse(tokens: &[Spanned], source_len: usize) -> Result<Expr, FormulaError> {
    if tokens.is_empty() {
        return Err(FormulaError::parse(0, "empty formula"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        source_len,
    };
    let expr = parser.comparison()?;
    if parser.pos < tokens.len() {
        return Err(FormulaError::parse(parser.offset(), "unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
    source_len: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, at)| *at)
            .unwrap_or(self.source_len)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, want: Token, what: &str) -> Result<(), FormulaError> {
        if self.peek() == Some(&want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(FormulaError::parse(self.offset(), format!("expected {what}")))
        }
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn binary_level<F>(&mut self, next: F, ops: &[(Token, Op)]) -> Result<Expr, FormulaError>
    where
        F: Fn(&mut Self) -> Result<Expr, FormulaError>,
    {
        let first = next(self)?;
        let mut rest = Vec::new();
        'outer: loop {
            for (token, op) in ops {
                if self.peek() == Some(token) {
                    self.pos += 1;
                    rest.push((*op, next(self)?));
                    continue 'outer;
                }
            }
            break;
        }
        if rest.is_empty() {
            return Ok(first);
        }
        Ok(Expr::Chain {
            first: Box::new(first),
            rest,
        })
    }

    fn comparison(&mut self) -> Result<Expr, FormulaError> {
        self.binary_level(
            Self::concat,
            &[
                (Token::Eq, Op::Eq),
                (Token::NotEq, Op::NotEq),
                (Token::LtEq, Op::LtEq),
                (Token::GtEq, Op::GtEq),
                (Token::Lt, Op::Lt),
                (Token::Gt, Op::Gt),
            ],
        )
    }

    fn concat(&mut self) -> Result<Expr, FormulaError> {
        self.binary_level(Self::additive, &[(Token::Ampersand, Op::Concat)])
    }

    fn additive(&mut self) -> Result<Expr, FormulaError> {
        self.binary_level(
            Self::multiplicative,
            &[(Token::Plus, Op::Add), (Token::Minus, Op::Sub)],
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, FormulaError> {
        self.binary_level(Self::unary, &[(Token::Star, Op::Mul), (Token::Slash, Op::Div)])
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary();
                self.leave();
                Ok(Expr::Neg(Box::new(inner?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary();
                self.leave();
                inner
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.postfix()?;
        if self.peek() == Some(&Token::Caret) {
            self.pos += 1;
            self.enter()?;
            let exponent = self.unary();
            self.leave();
            return Ok(Expr::Binary {
                op: Op::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent?),
            });
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.primary()?;
        let mut chained = 0;
        while self.peek() == Some(&Token::Percent) {
            self.pos += 1;
            self.enter()?;
            chained += 1;
            expr = Expr::Percent(Box::new(expr));
        }
        self.depth -= chained;
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let at = self.offset();
        match self.bump() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Text(s)),
            Some(Token::ErrorLit(kind)) => Ok(Expr::Error(kind)),
            Some(Token::LParen) => {
                self.enter()?;
                let inner = self.comparison();
                self.leave();
                let inner = inner?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                let upper = name.to_ascii_uppercase();
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    self.enter()?;
                    let args = self.arguments();
                    self.leave();
                    return Ok(Expr::Call {
                        name: upper,
                        args: args?,
                    });
                }
                match upper.as_str() {
                    "TRUE" => Ok(Expr::Number(1.0)),
                    "FALSE" => Ok(Expr::Number(0.0)),
                    _ => Ok(Expr::Name(name)),
                }
            }
            Some(_) => Err(FormulaError::parse(at, "expected a value")),
            None => Err(FormulaError::parse(at, "unexpected end of formula")),
        }
    }

    /// Parse call arguments after the opening parenthesis.
    fn arguments(&mut self) -> Result<Vec<Expr>, FormulaError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.comparison()?);
            match self.bump() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                _ => {
                    self.pos = self.pos.saturating_sub(1);
                    return Err(FormulaError::parse(self.offset(), "expected ',' or ')'"));
                }
            }
        }
    }
}
