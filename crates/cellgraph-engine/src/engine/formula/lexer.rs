//! Formula lexer - splits substituted formula text into tokens.
//!
//! Supports: numbers (1, 2.5, .5, 1e3), "strings" with backslash escapes,
//! error markers (#DIV/0!), identifiers, arithmetic/comparison operators, & and %.

use super::FormulaError;
use crate::engine::value::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    ErrorLit(ErrorKind),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    Ampersand,
    LParen,
    RParen,
    Comma,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

/// A token and the byte offset it starts at.
pub(crate) type Spanned = (Token, usize);

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>, FormulaError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let simple = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'+' => Some(Token::Plus),
            b'-' => Some(Token::Minus),
            b'*' => Some(Token::Star),
            b'/' => Some(Token::Slash),
            b'^' => Some(Token::Caret),
            b'%' => Some(Token::Percent),
            b'&' => Some(Token::Ampersand),
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b',' => Some(Token::Comma),
            b'=' => Some(Token::Eq),
            _ => None,
        };
        if let Some(token) = simple {
            tokens.push((token, start));
            i += 1;
            continue;
        }

        match c {
            b'<' => {
                let token = match bytes.get(i + 1) {
                    Some(b'=') => {
                        i += 1;
                        Token::LtEq
                    }
                    Some(b'>') => {
                        i += 1;
                        Token::NotEq
                    }
                    _ => Token::Lt,
                };
                tokens.push((token, start));
                i += 1;
            }
            b'>' => {
                let token = if bytes.get(i + 1) == Some(&b'=') {
                    i += 1;
                    Token::GtEq
                } else {
                    Token::Gt
                };
                tokens.push((token, start));
                i += 1;
            }
            b'"' => {
                let (text, next) = lex_string(input, i)?;
                tokens.push((Token::Str(text), start));
                i = next;
            }
            b'#' => {
                let rest = &input[i..];
                let kind = ErrorKind::ALL.into_iter().find(|kind| {
                    let marker = kind.marker();
                    rest.len() >= marker.len()
                        && rest.is_char_boundary(marker.len())
                        && rest[..marker.len()].eq_ignore_ascii_case(marker)
                });
                let Some(kind) = kind else {
                    return Err(FormulaError::parse(start, "unknown error marker"));
                };
                tokens.push((Token::ErrorLit(kind), start));
                i += kind.marker().len();
            }
            b'0'..=b'9' | b'.' => {
                let (n, next) = lex_number(input, i)?;
                tokens.push((Token::Number(n), start));
                i = next;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push((Token::Ident(input[start..i].to_string()), start));
            }
            _ => {
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(FormulaError::parse(start, format!("unexpected character '{ch}'")));
            }
        }
    }

    Ok(tokens)
}

fn lex_number(input: &str, start: usize) -> Result<(f64, usize), FormulaError> {
    let bytes = input.as_bytes();
    let mut i = start;
    let digits = |i: &mut usize| {
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
    };

    digits(&mut i);
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        digits(&mut i);
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = j;
            digits(&mut i);
        }
    }

    input[start..i]
        .parse::<f64>()
        .map(|n| (n, i))
        .map_err(|_| FormulaError::parse(start, format!("invalid number '{}'", &input[start..i])))
}

/// Lex a string literal starting at the opening quote. Returns the unescaped
/// text and the offset just past the closing quote.
fn lex_string(input: &str, start: usize) -> Result<(String, usize), FormulaError> {
    let mut text = String::new();
    let mut chars = input[start + 1..].char_indices();
    while let Some((offset, ch)) = chars.next() {
        match ch {
            '"' => return Ok((text, start + 1 + offset + 1)),
            '\\' => match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => break,
            },
            _ => text.push(ch),
        }
    }
    Err(FormulaError::parse(start, "unterminated string literal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("1<=2<>3>=4<5>6"),
            vec![
                Token::Number(1.0),
                Token::LtEq,
                Token::Number(2.0),
                Token::NotEq,
                Token::Number(3.0),
                Token::GtEq,
                Token::Number(4.0),
                Token::Lt,
                Token::Number(5.0),
                Token::Gt,
                Token::Number(6.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            kinds(".5 2.25 1e3 4E-2"),
            vec![
                Token::Number(0.5),
                Token::Number(2.25),
                Token::Number(1000.0),
                Token::Number(0.04),
            ]
        );
    }

    #[test]
    fn test_tokenize_strings_and_markers() {
        assert_eq!(
            kinds(r#""a \"b\" \\" & #div/0!"#),
            vec![
                Token::Str(r#"a "b" \"#.to_string()),
                Token::Ampersand,
                Token::ErrorLit(ErrorKind::DivisionByZero),
            ]
        );
    }

    #[test]
    fn test_tokenize_reports_position() {
        let err = tokenize("1 + $").unwrap_err();
        assert_eq!(err, FormulaError::parse(4, "unexpected character '$'"));
        assert!(tokenize("\"open").is_err());
        assert!(tokenize("#BOGUS").is_err());
        assert!(tokenize(".").is_err());
    }
}
