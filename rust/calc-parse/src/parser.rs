//! Pratt parser (spec §4.3): binding power is encoded as `level*2` for
//! left-associative operators and `level*2-1` for right-associative ones, so
//! a single "is `min_bp` small enough" test captures associativity.

use crate::ast::{BinOp, Expr, PostfixOp, PrefixOp};
use calc_core::CalcError;
use calc_lex::{Builtin, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected token {0} at byte {1}")]
    UnexpectedToken(String, usize),
    #[error("expected {0}, found {1} at byte {2}")]
    Expected(&'static str, String, usize),
}

impl From<ParseError> for CalcError {
    fn from(e: ParseError) -> Self {
        CalcError::Syntax(e.to_string())
    }
}

const STORE_BP: u8 = 1;
const OR_XOR_BP: u8 = 4;
const AND_BP: u8 = 6;
const NOT_BP: u8 = 8;
const COMPARISON_BP: u8 = 10;
const ADDITION_BP: u8 = 12;
const MULTIPLICATION_BP: u8 = 14;
const NEGATION_BP: u8 = 16;
const EXPONENT_BP: u8 = 17;

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr(0)?;
    parser.expect_eof()?;
    Ok(expr)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Eof => Ok(()),
            other => Err(ParseError::UnexpectedToken(other.to_string(), self.peek().span.start)),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.peek_kind() == kind {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Expected(
                "terminator",
                self.peek_kind().to_string(),
                self.peek().span.start,
            ))
        }
    }

    pub fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        loop {
            if matches!(self.peek_kind(), TokenKind::Store) && min_bp <= STORE_BP {
                self.advance();
                let target = self.parse_expr(STORE_BP)?;
                left = Expr::Store(Box::new(left), Box::new(target));
                continue;
            }

            let Some((op, bp, right_bp)) = infix_binding(self.peek_kind()) else {
                break;
            };
            if min_bp > bp {
                break;
            }
            self.advance();
            let right = self.parse_expr(right_bp)?;
            left = match op {
                InfixOp::Bin(b) => Expr::Binary(b, Box::new(left), Box::new(right)),
                InfixOp::Implicit => Expr::ImplicitMul(Box::new(left), Box::new(right)),
            };
        }

        while matches!(self.peek_kind(), TokenKind::Factorial) {
            self.advance();
            left = Expr::UnaryPostfix(Box::new(left), PostfixOp::Factorial);
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        let expr = match &tok.kind {
            TokenKind::Number(n) => {
                self.advance();
                Expr::Number(*n)
            }
            TokenKind::Str(s) => {
                self.advance();
                Expr::Str(s.clone())
            }
            TokenKind::Pi => {
                self.advance();
                Expr::Pi
            }
            TokenKind::EulerE => {
                self.advance();
                Expr::EulerE
            }
            TokenKind::ImaginaryI => {
                self.advance();
                Expr::ImaginaryI
            }
            TokenKind::Ans => {
                self.advance();
                Expr::Ans
            }
            TokenKind::Variable(name) => {
                self.advance();
                Expr::Variable(name.clone())
            }
            TokenKind::ListName(name) => {
                self.advance();
                self.maybe_element_access(Expr::ListVar(name.clone()))?
            }
            TokenKind::MatrixName(name) => {
                self.advance();
                self.maybe_element_access(Expr::MatrixVar(name.clone()))?
            }
            TokenKind::StringVar(i) => {
                self.advance();
                Expr::StringVar(*i)
            }
            TokenKind::FunctionSlot(i) => {
                let idx = *i;
                self.advance();
                self.maybe_element_access(Expr::FunctionSlot(idx))?
            }
            TokenKind::Negate => {
                self.advance();
                let operand = self.parse_expr(NEGATION_BP)?;
                Expr::UnaryPrefix(PrefixOp::Negate, Box::new(operand))
            }
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_expr(NOT_BP)?;
                Expr::UnaryPrefix(PrefixOp::Not, Box::new(operand))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(&TokenKind::RParen)?;
                inner
            }
            TokenKind::LBrace => self.parse_list_literal()?,
            TokenKind::LBracket => self.parse_matrix_literal()?,
            TokenKind::Function(b) => {
                let b = *b;
                self.advance();
                self.parse_function_call(b)?
            }
            other => {
                return Err(ParseError::UnexpectedToken(other.to_string(), tok.span.start));
            }
        };
        Ok(expr)
    }

    /// ListName/MatrixName/FunctionSlot atoms may be followed by a `(`
    /// index-list (spec §4.3.3 "Element access").
    fn maybe_element_access(&mut self, target: Expr) -> Result<Expr, ParseError> {
        if !matches!(self.peek_kind(), TokenKind::LParen) {
            return Ok(target);
        }
        self.advance();
        let indices = self.parse_arg_list()?;
        self.expect_closing_paren()?;
        Ok(Expr::ElementAccess(Box::new(target), indices))
    }

    fn parse_list_literal(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // `{`
        let mut elems = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            loop {
                elems.push(self.parse_expr(0)?);
                if matches!(self.peek_kind(), TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek_kind(), TokenKind::RBrace) {
            self.advance();
        }
        Ok(Expr::ListLiteral(elems))
    }

    /// Matrix literal: `[[1,2][3,4]]` — an outer `[` followed by one or more
    /// bracketed rows, then a closing `]`.
    fn parse_matrix_literal(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // outer `[`
        let mut rows = Vec::new();
        while matches!(self.peek_kind(), TokenKind::LBracket) {
            self.advance();
            let mut row = Vec::new();
            if !matches!(self.peek_kind(), TokenKind::RBracket | TokenKind::Eof) {
                loop {
                    row.push(self.parse_expr(0)?);
                    if matches!(self.peek_kind(), TokenKind::Comma) {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            if matches!(self.peek_kind(), TokenKind::RBracket) {
                self.advance();
            }
            rows.push(row);
        }
        if matches!(self.peek_kind(), TokenKind::RBracket) {
            self.advance();
        }
        Ok(Expr::MatrixLiteral(rows))
    }

    fn parse_function_call(&mut self, builtin: Builtin) -> Result<Expr, ParseError> {
        // The tokenizer's word reader leaves the `(` for us to consume here
        // (spec §4.3.2).
        if !matches!(self.peek_kind(), TokenKind::LParen) {
            if builtin.is_zero_arg() {
                return Ok(Expr::FunctionCall(builtin, Vec::new()));
            }
            return Err(ParseError::Expected("(", self.peek_kind().to_string(), self.peek().span.start));
        }
        self.advance();
        if builtin.is_zero_arg() && matches!(self.peek_kind(), TokenKind::RParen | TokenKind::Eof) {
            self.expect_closing_paren()?;
            return Ok(Expr::FunctionCall(builtin, Vec::new()));
        }
        let args = self.parse_arg_list()?;
        self.expect_closing_paren()?;
        Ok(Expr::FunctionCall(builtin, args))
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if matches!(self.peek_kind(), TokenKind::RParen | TokenKind::Eof) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(args)
    }

    /// The closing `)` is optional — calculator input habitually drops
    /// trailing close-parens (spec §4.3.2).
    fn expect_closing_paren(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek_kind(), TokenKind::RParen) {
            self.advance();
        }
        Ok(())
    }
}

enum InfixOp {
    Bin(BinOp),
    Implicit,
}

/// Returns `(op, left_bp, right_bp_for_recursive_call)` for infix operators
/// (Store is handled separately since its right side is a generic
/// `parse_expr` call too, but its node shape differs).
fn infix_binding(kind: &TokenKind) -> Option<(InfixOp, u8, u8)> {
    use TokenKind as T;
    let (op, bp, right_assoc) = match kind {
        T::Or => (InfixOp::Bin(BinOp::Or), OR_XOR_BP, false),
        T::Xor => (InfixOp::Bin(BinOp::Xor), OR_XOR_BP, false),
        T::And => (InfixOp::Bin(BinOp::And), AND_BP, false),
        T::Eq => (InfixOp::Bin(BinOp::Eq), COMPARISON_BP, false),
        T::Ne => (InfixOp::Bin(BinOp::Ne), COMPARISON_BP, false),
        T::Lt => (InfixOp::Bin(BinOp::Lt), COMPARISON_BP, false),
        T::Gt => (InfixOp::Bin(BinOp::Gt), COMPARISON_BP, false),
        T::Le => (InfixOp::Bin(BinOp::Le), COMPARISON_BP, false),
        T::Ge => (InfixOp::Bin(BinOp::Ge), COMPARISON_BP, false),
        T::Plus => (InfixOp::Bin(BinOp::Add), ADDITION_BP, false),
        T::Minus => (InfixOp::Bin(BinOp::Sub), ADDITION_BP, false),
        T::Multiply => (InfixOp::Bin(BinOp::Mul), MULTIPLICATION_BP, false),
        T::Divide => (InfixOp::Bin(BinOp::Div), MULTIPLICATION_BP, false),
        T::NPr => (InfixOp::Bin(BinOp::NPr), MULTIPLICATION_BP, false),
        T::NCr => (InfixOp::Bin(BinOp::NCr), MULTIPLICATION_BP, false),
        T::ImplicitMultiply => (InfixOp::Implicit, MULTIPLICATION_BP, false),
        T::Power => (InfixOp::Bin(BinOp::Pow), EXPONENT_BP, true),
        _ => return None,
    };
    let right_bp = if right_assoc { bp } else { bp + 1 };
    Some((op, bp, right_bp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_lex::tokenize;

    fn parse_str(src: &str) -> Expr {
        let tokens = tokenize(src).unwrap();
        parse(&tokens).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse_str("2+3*4"),
            Expr::Binary(
                BinOp::Add,
                Box::new(Expr::Number(2.0)),
                Box::new(Expr::Binary(BinOp::Mul, Box::new(Expr::Number(3.0)), Box::new(Expr::Number(4.0)))),
            )
        );
    }

    #[test]
    fn exponent_is_right_associative() {
        // 2^3^2 = 2^(3^2)
        assert_eq!(
            parse_str("2^3^2"),
            Expr::Binary(
                BinOp::Pow,
                Box::new(Expr::Number(2.0)),
                Box::new(Expr::Binary(BinOp::Pow, Box::new(Expr::Number(3.0)), Box::new(Expr::Number(2.0)))),
            )
        );
    }

    #[test]
    fn negation_binds_looser_than_exponent() {
        // -3^2 = -(3^2)
        assert_eq!(
            parse_str("-3^2"),
            Expr::UnaryPrefix(
                PrefixOp::Negate,
                Box::new(Expr::Binary(BinOp::Pow, Box::new(Expr::Number(3.0)), Box::new(Expr::Number(2.0)))),
            )
        );
    }

    #[test]
    fn store_is_right_associative_and_lowest() {
        assert_eq!(
            parse_str("2+3->A"),
            Expr::Store(
                Box::new(Expr::Binary(BinOp::Add, Box::new(Expr::Number(2.0)), Box::new(Expr::Number(3.0)))),
                Box::new(Expr::Variable("A".into())),
            )
        );
    }

    #[test]
    fn postfix_factorial() {
        assert_eq!(
            parse_str("5!"),
            Expr::UnaryPostfix(Box::new(Expr::Number(5.0)), PostfixOp::Factorial)
        );
    }

    #[test]
    fn function_call_with_dropped_closing_paren() {
        let tokens = tokenize("sin(1").unwrap();
        let ast = parse(&tokens).unwrap();
        assert_eq!(ast, Expr::FunctionCall(Builtin::Sin, vec![Expr::Number(1.0)]));
    }

    #[test]
    fn element_access_on_list() {
        let tokens = tokenize("\u{2113}1(3)").unwrap();
        let ast = parse(&tokens).unwrap();
        assert_eq!(
            ast,
            Expr::ElementAccess(Box::new(Expr::ListVar("1".into())), vec![Expr::Number(3.0)])
        );
    }

    #[test]
    fn unexpected_token_is_syntax_error() {
        let tokens = tokenize("2+").unwrap();
        assert!(parse(&tokens).is_err());
    }
}
