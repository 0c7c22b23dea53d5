use crate::error::{Error, Result};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    LParen,
    RParen,
    Identifier,
    Delimiter, // ;
    Number,
    String,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Equal,
    Less,
    Greater,
    Le,
    Ge,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Eof => "end of input",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Identifier => "identifier",
            TokenKind::Delimiter => "';'",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Caret => "'^'",
            TokenKind::Equal => "'='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::Le => "'<='",
            TokenKind::Ge => "'>='",
        };
        f.write_str(name)
    }
}

/// A lexical unit. `text` is only filled for numbers, strings and
/// identifiers; `position` is the 1-based offset of the first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    fn punct(kind: TokenKind, position: usize) -> Self {
        Self { kind, text: String::new(), position }
    }
}

#[derive(Clone)]
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self { input: input.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Consume characters while `accept` holds and return them.
    fn take_while<F: FnMut(char) -> bool>(&mut self, mut accept: F) -> String {
        let mut lit = String::new();
        while let Some(c) = self.peek() {
            if !accept(c) {
                break;
            }
            lit.push(c);
            self.pos += 1;
        }
        lit
    }

    /// Digits with at most one decimal comma. A second comma is left in place.
    fn number(&mut self, start: usize) -> Token {
        let mut has_comma = false;
        let text = self.take_while(|c| {
            if c.is_numeric() {
                true
            } else if c == ',' && !has_comma {
                has_comma = true;
                true
            } else {
                false
            }
        });
        Token { kind: TokenKind::Number, text, position: start }
    }

    fn identifier(&mut self, start: usize) -> Token {
        let text = self.take_while(|c| c.is_alphabetic() || c.is_numeric());
        Token { kind: TokenKind::Identifier, text, position: start }
    }

    // No escapes; a missing closing quote terminates the literal at end of input.
    fn string(&mut self, start: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.bump() {
            if c == '"' {
                break;
            }
            text.push(c);
        }
        Token { kind: TokenKind::String, text, position: start }
    }

    /// Greedy run of `<`, `>` and `=` classified as a single operator.
    fn comparison(&mut self, start: usize) -> Result<Token> {
        let op = self.take_while(|c| matches!(c, '<' | '>' | '='));
        let kind = match op.as_str() {
            "<" => TokenKind::Less,
            ">" => TokenKind::Greater,
            "<=" => TokenKind::Le,
            ">=" => TokenKind::Ge,
            "=" => TokenKind::Equal,
            _ => return Err(Error::InvalidComparison { op, position: start }),
        };
        Ok(Token::punct(kind, start))
    }

    /// Produce the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        let ch = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };
        let start = self.pos + 1;

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            ';' => TokenKind::Delimiter,
            '=' => TokenKind::Equal,
            '<' | '>' => return self.comparison(start).map(Some),
            '"' => {
                self.pos += 1;
                return Ok(Some(self.string(start)));
            }
            c if c.is_numeric() => return Ok(Some(self.number(start))),
            c if c.is_alphabetic() => return Ok(Some(self.identifier(start))),
            c => return Err(Error::UnexpectedChar { ch: c, position: start }),
        };
        self.pos += 1;
        Ok(Some(Token::punct(kind, start)))
    }

    /// Lex the whole input. The result always ends with exactly one `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        tokens.push(Token::punct(TokenKind::Eof, self.input.len() + 1));
        tracing::trace!(count = tokens.len(), "lexed formula");
        Ok(tokens)
    }
}

pub fn lex(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn punctuation_and_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("( ) + - * / ^ ; ="),
            vec![LParen, RParen, Plus, Minus, Star, Slash, Caret, Delimiter, Equal, Eof]
        );
        assert_eq!(kinds("1<2"), vec![Number, Less, Number, Eof]);
        assert_eq!(kinds("1 >= 2 <= 3 > 4"), vec![Number, Ge, Number, Le, Number, Greater, Number, Eof]);
    }

    #[test]
    fn empty_input_is_just_eof() {
        let toks = lex("   ").unwrap();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Eof);
        assert!(toks[0].text.is_empty());
    }

    #[test]
    fn positions_are_one_based() {
        let toks = lex("ab + \"x\"").unwrap();
        assert_eq!(toks[0].position, 1);
        assert_eq!(toks[1].position, 4);
        assert_eq!(toks[2].position, 6);
    }

    #[test]
    fn numbers_use_decimal_comma() {
        let toks = lex("2,5").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Number);
        assert_eq!(toks[0].text, "2,5");
    }

    #[test]
    fn second_comma_is_not_part_of_number() {
        let err = lex("1,2,3").unwrap_err();
        assert_eq!(err, Error::UnexpectedChar { ch: ',', position: 4 });
    }

    #[test]
    fn dot_is_not_a_decimal_separator() {
        let err = lex("1.5").unwrap_err();
        assert_eq!(err, Error::UnexpectedChar { ch: '.', position: 2 });
    }

    #[test]
    fn identifiers_keep_case_and_digits() {
        let toks = lex("Sum2x").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Identifier);
        assert_eq!(toks[0].text, "Sum2x");
        assert!(lex("a_b").is_err());
    }

    #[test]
    fn unicode_identifiers() {
        let toks = lex("Сумма(1)").unwrap();
        assert_eq!(toks[0].text, "Сумма");
        assert_eq!(toks[1].position, 6);
    }

    #[test]
    fn strings_are_verbatim() {
        let toks = lex("\"a \\n b\"").unwrap();
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, "a \\n b");
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        let toks = lex("\"open ended").unwrap();
        assert_eq!(toks[0].text, "open ended");
        assert_eq!(toks[1].kind, TokenKind::Eof);
    }

    #[test]
    fn malformed_comparison_run() {
        assert_eq!(lex("1 <> 2").unwrap_err(), Error::InvalidComparison { op: "<>".into(), position: 3 });
        assert!(lex("1 >== 2").is_err());
        assert!(lex("1 =< 2").is_ok_and(|t| t[1].kind == TokenKind::Equal && t[2].kind == TokenKind::Less));
    }

    #[test]
    fn unknown_character() {
        assert_eq!(lex("1 # 2").unwrap_err(), Error::UnexpectedChar { ch: '#', position: 3 });
    }
}
