// File: src/lexer.rs
// Purpose: Split formula source into tokens

use crate::error::ExprError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Question,
    Colon,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Str(s) => write!(f, "string \"{}\"", s),
            Token::Ident(name) => write!(f, "name '{}'", name),
            Token::True => write!(f, "'true'"),
            Token::False => write!(f, "'false'"),
            Token::Null => write!(f, "'null'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Percent => write!(f, "'%'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Dot => write!(f, "'.'"),
            Token::Question => write!(f, "'?'"),
            Token::Colon => write!(f, "':'"),
            Token::Bang => write!(f, "'!'"),
            Token::EqEq => write!(f, "'=='"),
            Token::NotEq => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::Le => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Ge => write!(f, "'>='"),
            Token::AndAnd => write!(f, "'&&'"),
            Token::OrOr => write!(f, "'||'"),
        }
    }
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Tokenize a formula
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let starts_number = ch.is_ascii_digit()
            || (ch == '.' && src[pos + 1..].starts_with(|c: char| c.is_ascii_digit()));

        let token = if starts_number {
            let mut end = pos;
            let mut exponent = false;
            while let Some(&(i, c)) = chars.peek() {
                let take = match c {
                    '0'..='9' | '.' => true,
                    'e' | 'E' if !exponent && exponent_follows(&src[i + 1..]) => {
                        exponent = true;
                        true
                    }
                    '+' | '-' => exponent && src[..i].ends_with(&['e', 'E'][..]),
                    _ => false,
                };
                if !take {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            let text = &src[pos..end];
            let n = text.parse::<f64>().map_err(|_| ExprError::InvalidNumber {
                text: text.to_string(),
                pos,
            })?;
            Token::Number(n)
        } else if ch == '"' || ch == '\'' {
            chars.next();
            Token::Str(lex_string(&mut chars, ch, pos)?)
        } else if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let mut end = pos;
            while let Some(&(i, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    end = i + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            match &src[pos..end] {
                "true" => Token::True,
                "false" => Token::False,
                "null" | "undefined" => Token::Null,
                name => Token::Ident(name.to_string()),
            }
        } else {
            chars.next();
            let next = chars.peek().map(|&(_, c)| c);
            match (ch, next) {
                ('=', Some('=')) => {
                    chars.next();
                    // `===` reads the same as `==`
                    if chars.peek().map(|&(_, c)| c) == Some('=') {
                        chars.next();
                    }
                    Token::EqEq
                }
                ('!', Some('=')) => {
                    chars.next();
                    if chars.peek().map(|&(_, c)| c) == Some('=') {
                        chars.next();
                    }
                    Token::NotEq
                }
                ('<', Some('=')) => {
                    chars.next();
                    Token::Le
                }
                ('>', Some('=')) => {
                    chars.next();
                    Token::Ge
                }
                ('&', Some('&')) => {
                    chars.next();
                    Token::AndAnd
                }
                ('|', Some('|')) => {
                    chars.next();
                    Token::OrOr
                }
                ('+', _) => Token::Plus,
                ('-', _) => Token::Minus,
                ('*', _) => Token::Star,
                ('/', _) => Token::Slash,
                ('%', _) => Token::Percent,
                ('(', _) => Token::LParen,
                (')', _) => Token::RParen,
                ('[', _) => Token::LBracket,
                (']', _) => Token::RBracket,
                ('.', _) => Token::Dot,
                ('?', _) => Token::Question,
                (':', _) => Token::Colon,
                ('!', _) => Token::Bang,
                ('<', _) => Token::Lt,
                ('>', _) => Token::Gt,
                _ => return Err(ExprError::UnexpectedChar { ch, pos }),
            }
        };

        tokens.push(Spanned { token, pos });
    }

    Ok(tokens)
}

/// True when `rest` (the text after an `e`) is an exponent: optional sign, then a digit
fn exponent_follows(rest: &str) -> bool {
    let digits = rest.strip_prefix(&['+', '-'][..]).unwrap_or(rest);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

fn lex_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
    start: usize,
) -> Result<String, ExprError> {
    let mut out = String::new();

    while let Some((_, c)) = chars.next() {
        match c {
            c if c == quote => return Ok(out),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            c => out.push(c),
        }
    }

    Err(ExprError::UnterminatedString { pos: start })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<Token> {
        tokenize(src).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_member_access_tokens() {
        assert_eq!(
            kinds("values.a + values['b c']"),
            vec![
                Token::Ident("values".into()),
                Token::Dot,
                Token::Ident("a".into()),
                Token::Plus,
                Token::Ident("values".into()),
                Token::LBracket,
                Token::Str("b c".into()),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_strict_equality_aliases() {
        assert_eq!(kinds("1 === 1"), vec![Token::Number(1.0), Token::EqEq, Token::Number(1.0)]);
        assert_eq!(kinds("1 !== 2"), vec![Token::Number(1.0), Token::NotEq, Token::Number(2.0)]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("3.25 .5"), vec![Token::Number(3.25), Token::Number(0.5)]);
        assert!(matches!(tokenize("1.2.3"), Err(ExprError::InvalidNumber { .. })));
    }

    #[test]
    fn test_exponent_numbers() {
        assert_eq!(kinds("1e3"), vec![Token::Number(1000.0)]);
        assert_eq!(kinds("2.5E-1"), vec![Token::Number(0.25)]);
        assert_eq!(kinds("1e+2"), vec![Token::Number(100.0)]);
        // The sign after the exponent's digits is an operator
        assert_eq!(
            kinds("1e3-2"),
            vec![Token::Number(1000.0), Token::Minus, Token::Number(2.0)]
        );
        // No digits after `e`: a number followed by a name
        assert_eq!(kinds("2e"), vec![Token::Number(2.0), Token::Ident("e".into())]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(kinds(r#""a\"b""#), vec![Token::Str("a\"b".into())]);
        assert_eq!(
            tokenize("'open"),
            Err(ExprError::UnterminatedString { pos: 0 })
        );
    }

    #[test]
    fn test_rejects_unknown_characters() {
        assert_eq!(
            tokenize("values.a ; 1"),
            Err(ExprError::UnexpectedChar { ch: ';', pos: 9 })
        );
        // Assignment is not part of the language
        assert!(matches!(tokenize("a = 1"), Err(ExprError::UnexpectedChar { ch: '=', .. })));
    }
}
