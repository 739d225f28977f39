// parser.rs

use arch::InstrKind;
use indexmap::IndexMap;
use std::iter::Peekable;
use std::vec::IntoIter;

use crate::error::{At, Diag, Error, Location};
use crate::expr::{Expr, ExprRef, Func};
use crate::lexer::LineLexer;
use crate::line::{Instruction, Line, SourceFile};
use crate::token::{Token, TokenKind};

/// Parses a whole source file.
///
/// Constants are scoped to the file and must be defined before use. A label
/// on a line of its own belongs to the next instruction of the same file.
pub fn parse_file(name: &str, text: &str) -> Result<SourceFile, Diag> {
    let mut constants: IndexMap<String, ExprRef> = IndexMap::new();
    let mut pending: Option<(String, Location)> = None;
    let mut lines = vec![];

    for (idx, raw) in text.lines().enumerate() {
        let location = Location::new(name, idx + 1);
        let tokens = LineLexer::new(raw).parse().at(&location)?;
        let mut parser = Parser::new(tokens, &constants);

        let inst = match parser.parse_line().at(&location)? {
            Stmt::Empty => None,
            Stmt::Const(key, expr) => {
                if constants.contains_key(&key) {
                    return Err(Error::RedefinedConstant(key)).at(&location);
                }
                constants.insert(key, expr);
                None
            }
            Stmt::Code(label, code) => {
                if let Some(label) = label {
                    if let Some((prev, at)) = pending.replace((label, location.clone())) {
                        return Err(Error::DanglingLabel(prev)).at(&at);
                    }
                }
                code.map(|(mnemonic, kind, operand)| {
                    let label = pending.take().map(|(label, _)| label);
                    Instruction::new(location.clone(), label, &mnemonic, kind, operand)
                })
            }
        };

        lines.push(Line {
            line_no: idx + 1,
            text: raw.to_string(),
            inst,
        });
    }

    if let Some((label, at)) = pending {
        return Err(Error::DanglingLabel(label)).at(&at);
    }

    Ok(SourceFile {
        name: name.to_string(),
        lines,
    })
}

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug)]
pub enum Stmt {
    Empty,
    Const(String, ExprRef),
    /// Optional label, then an optional (mnemonic, kind, operand).
    Code(Option<String>, Option<(String, InstrKind, Option<ExprRef>)>),
}

pub struct Parser<'a> {
    tokens: Peekable<IntoIter<Token>>,
    constants: &'a IndexMap<String, ExprRef>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, constants: &'a IndexMap<String, ExprRef>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
            constants,
        }
    }

    pub fn parse_line(&mut self) -> Result<Stmt, Error> {
        let Some(token) = self.tokens.next() else {
            return Ok(Stmt::Empty);
        };
        let stmt = match token.kind {
            // @label: [instruction]
            TokenKind::Label(name) => {
                self.expect(TokenKind::Colon)?;
                let code = match self.tokens.next() {
                    Some(Token {
                        kind: TokenKind::Ident(mnemonic),
                        ..
                    }) => Some(self.parse_code(mnemonic)?),
                    Some(token) => return Err(unexpected(&token)),
                    None => None,
                };
                Stmt::Code(Some(name), code)
            }
            // %name = expr
            TokenKind::Const(name) => {
                self.expect(TokenKind::Equal)?;
                Stmt::Const(name, self.parse_expr()?)
            }
            // MNEMONIC [expr]
            TokenKind::Ident(mnemonic) => Stmt::Code(None, Some(self.parse_code(mnemonic)?)),
            _ => return Err(unexpected(&token)),
        };
        match self.tokens.next() {
            Some(token) => Err(unexpected(&token)),
            None => Ok(stmt),
        }
    }

    fn parse_code(&mut self, mnemonic: String) -> Result<(String, InstrKind, Option<ExprRef>), Error> {
        let kind =
            InstrKind::parse(&mnemonic).map_err(|_| Error::UnknownInstruction(mnemonic.clone()))?;
        let operand = match (self.tokens.peek().is_some(), kind.has_operand()) {
            (true, true) => Some(self.parse_expr()?),
            (false, false) => None,
            (false, true) => return Err(Error::MissingOperand(mnemonic)),
            (true, false) => return Err(Error::UnexpectedOperand(mnemonic)),
        };
        Ok((mnemonic, kind, operand))
    }

    /// `simple { (+|-) simple {* simple} | * simple }`
    ///
    /// A product following `+`/`-` is folded into the right operand before
    /// the sum is built. Stops in front of a closing `)` or `]`.
    pub fn parse_expr(&mut self) -> Result<ExprRef, Error> {
        let mut expr = self.parse_simple()?;
        while let Some(token) = self.tokens.next_if(|t| {
            matches!(t.kind, TokenKind::Plus | TokenKind::Minus | TokenKind::Star)
        }) {
            expr = match token.kind {
                TokenKind::Plus => Expr::add(expr, self.parse_product()?),
                TokenKind::Minus => Expr::sub(expr, self.parse_product()?),
                _ => Expr::mul(expr, self.parse_simple()?),
            };
        }
        match self.tokens.peek() {
            None
            | Some(Token {
                kind: TokenKind::RParen | TokenKind::RBracket,
                ..
            }) => Ok(expr),
            Some(token) => Err(unexpected(token)),
        }
    }

    fn parse_product(&mut self) -> Result<ExprRef, Error> {
        let mut expr = self.parse_simple()?;
        while self.tokens.next_if(|t| t.kind == TokenKind::Star).is_some() {
            expr = Expr::mul(expr, self.parse_simple()?);
        }
        Ok(expr)
    }

    fn parse_simple(&mut self) -> Result<ExprRef, Error> {
        let Some(token) = self.tokens.next() else {
            return Err(Error::SyntaxError("unexpected end of line".to_string()));
        };
        match token.kind {
            TokenKind::Hash => Ok(Expr::addr(self.parse_expr()?)),
            TokenKind::Byte(v) => Ok(Expr::lit(v as u16)),
            TokenKind::Word(v) => Ok(Expr::lit(v)),
            TokenKind::Const(name) => match self.constants.get(&name) {
                Some(expr) => Ok(expr.clone()),
                None => Err(Error::UndefinedConstant(name)),
            },
            TokenKind::Label(name) => Ok(Expr::label(&name)),
            TokenKind::Reg(reg) => Ok(Expr::reg(reg)),
            TokenKind::Ident(name) => {
                let func = name
                    .parse::<Func>()
                    .map_err(|_| Error::UnsupportedFunction(name.clone()))?;
                Ok(Expr::func(func, self.parse_expr()?))
            }
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::ind(expr))
            }
            _ => Err(unexpected(&token)),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        match self.tokens.next() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(Error::SyntaxError(format!(
                "expected `{}`, found `{}` at column {}",
                kind,
                token.kind,
                token.col + 1
            ))),
            None => Err(Error::SyntaxError(format!(
                "expected `{}`, found end of line",
                kind
            ))),
        }
    }
}

fn unexpected(token: &Token) -> Error {
    Error::SyntaxError(format!(
        "unexpected token `{}` at column {}",
        token.kind,
        token.col + 1
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(code: &str) -> Result<String, Error> {
        let constants: IndexMap<String, ExprRef> =
            [("ten".to_string(), Expr::lit(0x0A))].into_iter().collect();
        let tokens = LineLexer::new(code).parse()?;
        let mut parser = Parser::new(tokens, &constants);
        let expr = parser.parse_expr()?;
        Ok(format!("{:?}", expr))
    }

    macro_rules! test_expr {
        ($($name:ident: $code:expr => $expect:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let expect = $expect;
                    let result = parse_expr($code).map_err(|e| e.to_string());
                    println!("{} -> {:?}", $code, result);
                    assert_eq!(result.ok(), Some(format!("{:?}", expect)));
                }
            )*
        }
    }

    use crate::expr::Reg;

    test_expr! {
        expr_byte: "$20" => Expr::lit(0x20),
        expr_word: "$1234" => Expr::lit(0x1234),
        expr_label: "@loop" => Expr::label("loop"),
        expr_const: "%ten" => Expr::lit(0x0A),
        expr_addr_takes_rest: "#$10 + X" => Expr::addr(Expr::add(Expr::lit(0x10), Expr::reg(Reg::X))),
        expr_left_assoc: "$01 - $02 + $03" => Expr::add(Expr::sub(Expr::lit(1), Expr::lit(2)), Expr::lit(3)),
        expr_mul_binds_right: "$01 + $02 * $03" => Expr::add(Expr::lit(1), Expr::mul(Expr::lit(2), Expr::lit(3))),
        expr_mul_folds_left: "$01 * $02 + $03" => Expr::add(Expr::mul(Expr::lit(1), Expr::lit(2)), Expr::lit(3)),
        expr_paren: "($01 + $02) * $03" => Expr::mul(Expr::add(Expr::lit(1), Expr::lit(2)), Expr::lit(3)),
        expr_indirect_y: "[@ptr] + Y" => Expr::add(Expr::ind(Expr::label("ptr")), Expr::reg(Reg::Y)),
        expr_indirect_x: "[@ptr + X]" => Expr::ind(Expr::add(Expr::label("ptr"), Expr::reg(Reg::X))),
        expr_lo: "lo @tbl" => Expr::func(Func::Lo, Expr::label("tbl")),
        expr_hi_sum: "hi @tbl + $01" => Expr::func(Func::Hi, Expr::add(Expr::label("tbl"), Expr::lit(1))),
    }

    #[test]
    fn expr_errors() {
        assert!(matches!(parse_expr("%nope"), Err(Error::UndefinedConstant(name)) if name == "nope"));
        assert!(matches!(parse_expr("mid @x"), Err(Error::UnsupportedFunction(name)) if name == "mid"));
        assert!(matches!(parse_expr("($10"), Err(Error::SyntaxError(_))));
        assert!(matches!(parse_expr("$10 +"), Err(Error::SyntaxError(_))));
        assert!(matches!(parse_expr("$10 $20"), Err(Error::SyntaxError(_))));
    }

    #[test]
    fn shared_constant() {
        let file = parse_file(
            "t.s",
            "%ptr = $0010 + $0002\nLDA [%ptr] + Y\nSTA [%ptr] + Y\n",
        )
        .unwrap_or_else(|d| panic!("{}", d));
        let ops: Vec<_> = file
            .instructions()
            .filter_map(|inst| inst.operand.clone())
            .collect();
        assert_eq!(ops.len(), 2);
        let (Expr::Add(l0, _), Expr::Add(l1, _)) = (ops[0].as_ref(), ops[1].as_ref()) else {
            panic!("{:?}", ops);
        };
        let (Expr::Indirect(p0), Expr::Indirect(p1)) = (l0.as_ref(), l1.as_ref()) else {
            panic!("{:?}", ops);
        };
        assert!(std::rc::Rc::ptr_eq(p0, p1));
    }
}
