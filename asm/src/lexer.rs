// lexer.rs

use crate::error::Error;
use crate::expr::Reg;
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::str::CharIndices;

pub struct LineLexer<'a> {
    line: &'a str,
    iter: Peekable<CharIndices<'a>>,
}

impl<'a> LineLexer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            iter: line.char_indices().peekable(),
        }
    }

    pub fn parse(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        // 0. Skip blanks
        while self
            .iter
            .next_if(|(_, ch)| *ch == ' ' || *ch == '\t')
            .is_some()
        {}

        // 1. End of line
        let Some((start, c)) = self.iter.next() else {
            return Ok(None);
        };

        // 2. Comment runs to end of line
        if c == ';' {
            while self.iter.next().is_some() {}
            return Ok(None);
        }

        // 3. Single character token
        if let Some(kind) = single_char_token(c) {
            return Ok(Some(Token::new(kind, start)));
        }

        // 4. Hex literal
        if c == '$' {
            let digits = self.take_while(start + 1, start + 1, |ch| ch.is_ascii_hexdigit());
            let kind = match digits.len() {
                2 => u8::from_str_radix(digits, 16).ok().map(TokenKind::Byte),
                4 => u16::from_str_radix(digits, 16).ok().map(TokenKind::Word),
                _ => None,
            };
            return match kind {
                Some(kind) => Ok(Some(Token::new(kind, start))),
                None => Err(Error::BadHexLiteral(digits.to_string())),
            };
        }

        // 5. Constant or label reference
        if c == '%' || c == '@' {
            let name = self.take_while(start + 1, start + 1, is_ident_char);
            if name.is_empty() {
                return Err(Error::UnexpectedChar(c, start + 1));
            }
            let kind = match c {
                '%' => TokenKind::Const(name.to_string()),
                _ => TokenKind::Label(name.to_string()),
            };
            return Ok(Some(Token::new(kind, start)));
        }

        // 6. Identifier or register
        if c.is_ascii_alphabetic() || c == '_' {
            let lexeme = self.take_while(start, start + c.len_utf8(), is_ident_char);
            let kind = match lexeme {
                "A" => TokenKind::Reg(Reg::A),
                "X" => TokenKind::Reg(Reg::X),
                "Y" => TokenKind::Reg(Reg::Y),
                _ => TokenKind::Ident(lexeme.to_string()),
            };
            return Ok(Some(Token::new(kind, start)));
        }

        // 7. Error
        Err(Error::UnexpectedChar(c, start + 1))
    }

    /// Consumes characters matching `cond`, extending `line[start..end]`.
    fn take_while(&mut self, start: usize, mut end: usize, cond: fn(char) -> bool) -> &'a str {
        while let Some((ptr, ch)) = self.iter.next_if(|(_, ch)| cond(*ch)) {
            end = ptr + ch.len_utf8();
        }
        &self.line[start..end]
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn single_char_token(c: char) -> Option<TokenKind> {
    match c {
        '=' => Some(TokenKind::Equal),
        ':' => Some(TokenKind::Colon),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Star),
        '#' => Some(TokenKind::Hash),
        _ => None,
    }
}
