// token.rs

use crate::expr::Reg;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, col: usize) -> Self {
        Token { kind, col }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Single character tokens
    Equal,    // '='
    Colon,    // ':'
    LParen,   // '('
    RParen,   // ')'
    LBracket, // '['
    RBracket, // ']'
    Plus,     // '+'
    Minus,    // '-'
    Star,     // '*'
    Hash,     // '#'

    // Names
    Ident(String),
    Const(String), // %name
    Label(String), // @name
    Reg(Reg),

    // Literals
    Byte(u8),  // $XX
    Word(u16), // $XXXX
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Equal => write!(f, "="),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Hash => write!(f, "#"),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Const(name) => write!(f, "%{}", name),
            TokenKind::Label(name) => write!(f, "@{}", name),
            TokenKind::Reg(reg) => write!(f, "{}", reg),
            TokenKind::Byte(v) => write!(f, "${:02X}", v),
            TokenKind::Word(v) => write!(f, "${:04X}", v),
        }
    }
}
