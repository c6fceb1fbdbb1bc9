//! Single-pass tokenizer with the two context-sensitive passes spec §4.2
//! requires: implicit-multiplication insertion (done inline, atom by atom)
//! and negation-vs-subtraction disambiguation (a post-pass over the whole
//! stream, since it needs to see the finished token immediately before each
//! `Minus`).

use crate::token::{Builtin, Span, Token, TokenKind};
use calc_core::CalcError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{0}' at byte {1}")]
    UnexpectedChar(char, usize),
    #[error("malformed number at byte {0}")]
    MalformedNumber(usize),
    #[error("unclosed matrix name bracket at byte {0}")]
    UnclosedMatrixName(usize),
}

impl From<LexError> for CalcError {
    fn from(e: LexError) -> Self {
        CalcError::Syntax(e.to_string())
    }
}

/// Store arrow glyphs (spec §6: "The store arrow may appear as either of two
/// glyphs").
const STORE_ARROW: char = '\u{2192}'; // →
const STORE_ARROW_ALT: char = '\u{21D2}'; // ⇒
/// Superscript-minus negation glyph (spec §4.2).
const NEGATE_GLYPH: char = '\u{207B}';
/// Pi constant glyph.
const PI_CHAR: char = '\u{03C0}';
/// List-name prefix glyph (distinct from the letter L, which is an ordinary
/// scalar variable).
const LIST_PREFIX: char = '\u{2113}';

pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut tokens: Vec<Token> = Vec::new();
    let mut pos = 0usize;

    while pos < len {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        maybe_insert_implicit_multiply(&mut tokens, c, pos);

        if c == PI_CHAR {
            tokens.push(Token::new(TokenKind::Pi, Span::new(pos, pos + 1)));
            pos += 1;
            continue;
        }
        if c == LIST_PREFIX {
            let start = pos;
            pos += 1;
            let name_start = pos;
            while pos < len && pos - name_start < 5 && chars[pos].is_alphanumeric() {
                pos += 1;
            }
            let name: String = chars[name_start..pos].iter().collect();
            tokens.push(Token::new(
                TokenKind::ListName(name),
                Span::new(start, pos),
            ));
            continue;
        }
        if c == STORE_ARROW || c == STORE_ARROW_ALT {
            tokens.push(Token::new(TokenKind::Store, Span::new(pos, pos + 1)));
            pos += 1;
            continue;
        }
        if c == NEGATE_GLYPH {
            tokens.push(Token::new(TokenKind::Negate, Span::new(pos, pos + 1)));
            pos += 1;
            continue;
        }
        if c == '[' {
            if let Some(&letter) = chars.get(pos + 1) {
                if letter.is_ascii_uppercase() {
                    match chars.get(pos + 2) {
                        Some(']') => {
                            tokens.push(Token::new(
                                TokenKind::MatrixName(letter.to_string()),
                                Span::new(pos, pos + 3),
                            ));
                            pos += 3;
                            continue;
                        }
                        Some(_) => {
                            // Not a matrix name after all (e.g. `[A+1]`); a
                            // plain bracket, fall through.
                        }
                        None => return Err(LexError::UnclosedMatrixName(pos)),
                    }
                }
            }
            tokens.push(Token::new(TokenKind::LBracket, Span::new(pos, pos + 1)));
            pos += 1;
            continue;
        }
        if c.is_ascii_digit() || c == '.' {
            let start = pos;
            let (value, new_pos) = read_number(&chars, pos)?;
            tokens.push(Token::new(TokenKind::Number(value), Span::new(start, new_pos)));
            pos = new_pos;
            continue;
        }
        if c == '"' {
            let start = pos;
            pos += 1;
            let mut s = String::new();
            while pos < len && chars[pos] != '"' {
                s.push(chars[pos]);
                pos += 1;
            }
            if pos < len {
                pos += 1; // consume closing quote
            }
            tokens.push(Token::new(TokenKind::Str(s), Span::new(start, pos)));
            continue;
        }
        if c.is_ascii_alphabetic() {
            let start = pos;
            let mut end = pos;
            while end < len && (chars[end].is_ascii_alphanumeric()) {
                end += 1;
            }
            let word: String = chars[start..end].iter().collect();
            match classify_word(&word) {
                Some(kind) => {
                    tokens.push(Token::new(kind, Span::new(start, end)));
                    pos = end;
                }
                None => {
                    // Backtrack: only the first letter is consumed as a bare
                    // Variable; the rest re-enters the loop and picks up an
                    // implicit multiply (spec §4.2).
                    let first: String = chars[start..start + 1].iter().collect();
                    tokens.push(Token::new(
                        TokenKind::Variable(first.to_uppercase()),
                        Span::new(start, start + 1),
                    ));
                    pos = start + 1;
                }
            }
            continue;
        }

        let start = pos;
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Multiply,
            '/' => TokenKind::Divide,
            '^' => TokenKind::Power,
            '!' => {
                if chars.get(pos + 1) == Some(&'=') {
                    pos += 1;
                    TokenKind::Ne
                } else {
                    TokenKind::Factorial
                }
            }
            '\u{2260}' => TokenKind::Ne,
            '\u{2264}' => TokenKind::Le,
            '\u{2265}' => TokenKind::Ge,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Eq,
            '<' => {
                if chars.get(pos + 1) == Some(&'=') {
                    pos += 1;
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if chars.get(pos + 1) == Some(&'=') {
                    pos += 1;
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            other => return Err(LexError::UnexpectedChar(other, start)),
        };
        pos += 1;
        tokens.push(Token::new(kind, Span::new(start, pos)));
    }

    tokens.push(Token::new(TokenKind::Eof, Span::new(len, len)));
    disambiguate_negation(&mut tokens);
    Ok(tokens)
}

fn maybe_insert_implicit_multiply(tokens: &mut Vec<Token>, upcoming: char, pos: usize) {
    let begins_value = upcoming.is_ascii_digit()
        || upcoming == '.'
        || upcoming == '('
        || upcoming == '['
        || upcoming == '{'
        || upcoming.is_alphabetic();
    if !begins_value {
        return;
    }
    if let Some(last) = tokens.last() {
        if last.kind.starts_value_tail_kind() {
            tokens.push(Token::new(TokenKind::ImplicitMultiply, Span::new(pos, pos)));
        }
    }
}

fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), LexError> {
    let len = chars.len();
    let mut pos = start;
    let mut s = String::new();
    let mut has_digit = false;

    while pos < len && chars[pos].is_ascii_digit() {
        s.push(chars[pos]);
        pos += 1;
        has_digit = true;
    }
    if pos < len && chars[pos] == '.' {
        s.push('.');
        pos += 1;
        while pos < len && chars[pos].is_ascii_digit() {
            s.push(chars[pos]);
            pos += 1;
            has_digit = true;
        }
    }
    if !has_digit {
        return Err(LexError::MalformedNumber(start));
    }

    if pos < len && (chars[pos] == 'E' || chars[pos] == 'e') {
        // Only consume as an exponent marker if a valid exponent follows;
        // otherwise leave it for the identifier reader (so `5e` alone isn't
        // swallowed into a malformed number when `e` means Euler's number).
        let mut lookahead = pos + 1;
        let mut exp = String::new();
        if lookahead < len && (chars[lookahead] == '+' || chars[lookahead] == '-') {
            exp.push(chars[lookahead]);
            lookahead += 1;
        }
        let exp_digits_start = exp.len();
        while lookahead < len && chars[lookahead].is_ascii_digit() {
            exp.push(chars[lookahead]);
            lookahead += 1;
        }
        if exp.len() > exp_digits_start {
            s.push('E');
            s.push_str(&exp);
            pos = lookahead;
        }
    }

    s.parse::<f64>()
        .map(|v| (v, pos))
        .map_err(|_| LexError::MalformedNumber(start))
}

fn classify_word(word: &str) -> Option<TokenKind> {
    let lower = word.to_ascii_lowercase();
    match lower.as_str() {
        "and" => return Some(TokenKind::And),
        "or" => return Some(TokenKind::Or),
        "xor" => return Some(TokenKind::Xor),
        "not" => return Some(TokenKind::Not),
        "ans" => return Some(TokenKind::Ans),
        "npr" => return Some(TokenKind::NPr),
        "ncr" => return Some(TokenKind::NCr),
        _ => {}
    }
    if let Some(b) = Builtin::from_word(&lower) {
        return Some(TokenKind::Function(b));
    }
    let bytes = lower.as_bytes();
    if lower.len() == 2 && bytes[0] == b'y' && bytes[1].is_ascii_digit() {
        return Some(TokenKind::FunctionSlot(bytes[1] - b'0'));
    }
    if lower.len() == 4 && lower.starts_with("str") && bytes[3].is_ascii_digit() {
        return Some(TokenKind::StringVar(bytes[3] - b'0'));
    }
    if word.chars().count() == 1 {
        let ch = word.chars().next().unwrap();
        return Some(match ch.to_ascii_lowercase() {
            'e' => TokenKind::EulerE,
            'i' => TokenKind::ImaginaryI,
            _ => TokenKind::Variable(ch.to_uppercase().to_string()),
        });
    }
    None
}

/// Rewrites ambiguous `Minus` tokens to `Negate` wherever the preceding
/// token cannot end a value (spec §4.2's post-pass).
fn disambiguate_negation(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        if tokens[i].kind != TokenKind::Minus {
            continue;
        }
        let predecessor_ok = i > 0 && tokens[i - 1].kind.starts_value_tail_kind();
        if !predecessor_ok {
            tokens[i].kind = TokenKind::Negate;
        }
    }
}

trait StartsValueTailKind {
    fn starts_value_tail_kind(&self) -> bool;
}

impl StartsValueTailKind for TokenKind {
    fn starts_value_tail_kind(&self) -> bool {
        matches!(
            self,
            TokenKind::Number(_)
                | TokenKind::Pi
                | TokenKind::EulerE
                | TokenKind::ImaginaryI
                | TokenKind::Ans
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Factorial
                | TokenKind::Variable(_)
                | TokenKind::ListName(_)
                | TokenKind::MatrixName(_)
                | TokenKind::StringVar(_)
                | TokenKind::FunctionSlot(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn ends_in_exactly_one_eof() {
        let ks = kinds("1+2");
        assert_eq!(ks.last(), Some(&TokenKind::Eof));
        assert_eq!(ks.iter().filter(|k| **k == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn simple_arithmetic() {
        assert_eq!(
            kinds("2+3*4"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Plus,
                TokenKind::Number(3.0),
                TokenKind::Multiply,
                TokenKind::Number(4.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn negation_after_nothing_is_negate() {
        assert_eq!(
            kinds("-3^2"),
            vec![
                TokenKind::Negate,
                TokenKind::Number(3.0),
                TokenKind::Power,
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn minus_after_number_is_subtraction() {
        assert_eq!(
            kinds("5-3"),
            vec![
                TokenKind::Number(5.0),
                TokenKind::Minus,
                TokenKind::Number(3.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn implicit_multiply_between_number_and_paren() {
        assert_eq!(
            kinds("6/2(1+2)"),
            vec![
                TokenKind::Number(6.0),
                TokenKind::Divide,
                TokenKind::Number(2.0),
                TokenKind::ImplicitMultiply,
                TokenKind::LParen,
                TokenKind::Number(1.0),
                TokenKind::Plus,
                TokenKind::Number(2.0),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn implicit_multiply_between_variable_and_variable() {
        assert_eq!(
            kinds("2AB"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::ImplicitMultiply,
                TokenKind::Variable("A".into()),
                TokenKind::ImplicitMultiply,
                TokenKind::Variable("B".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn matrix_name_token() {
        assert_eq!(kinds("[A]"), vec![TokenKind::MatrixName("A".into()), TokenKind::Eof]);
    }

    #[test]
    fn unclosed_matrix_name_is_syntax_error() {
        assert!(matches!(tokenize("[A"), Err(LexError::UnclosedMatrixName(_))));
    }

    #[test]
    fn function_slot_and_string_var() {
        assert_eq!(
            kinds("Y1(2)+Str0"),
            vec![
                TokenKind::FunctionSlot(1),
                TokenKind::LParen,
                TokenKind::Number(2.0),
                TokenKind::RParen,
                TokenKind::Plus,
                TokenKind::StringVar(0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unknown_multiletter_word_backtracks_to_first_letter() {
        // "XY" is not a keyword/builtin: only X is consumed as a Variable,
        // then Y re-enters the loop with an implicit multiply.
        assert_eq!(
            kinds("XY"),
            vec![
                TokenKind::Variable("X".into()),
                TokenKind::ImplicitMultiply,
                TokenKind::Variable("Y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scientific_notation_number() {
        assert_eq!(kinds("2E3"), vec![TokenKind::Number(2000.0), TokenKind::Eof]);
    }

    #[test]
    fn store_arrow() {
        assert_eq!(
            kinds("42\u{2192}A"),
            vec![TokenKind::Number(42.0), TokenKind::Store, TokenKind::Variable("A".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unexpected_character_errors() {
        assert!(matches!(tokenize("2 $ 3"), Err(LexError::UnexpectedChar('$', _))));
    }
}
