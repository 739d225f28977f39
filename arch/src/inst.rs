use color_print::cformat;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::mode::AddressingMode;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum InstrKind {
    // Directives
    BASE,
    START,
    DATA,

    BRK,
    ADC,
    SBC,
    AND,
    ASL,
    BCC,
    BCS,
    BEQ,
    BMI,
    BNE,
    BPL,
    BRA,
    BVC,
    BVS,
    BIT,
    CLC,
    CLD,
    CLI,
    CLV,
    SEC,
    SED,
    SEI,
    CMP,
    CPX,
    CPY,
    DEC,
    INC,
    EOR,
    JMP,
    JSR,
    LDA,
    LDX,
    LDY,
    LSR,
    #[default]
    NOP,
    #[strum(to_string = "ORA", serialize = "OR")]
    ORA,
    PHA,
    PHP,
    PHX,
    PLA,
    PLP,
    PLX,
    PLY,
    ROL,
    RTI,
    RTS,
    ROR,
    STA,
    STY,
    STX,
    TAX,
    TXA,
    TAY,
    TYA,
    TSX,
    TXS,
}

impl InstrKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(kind) => Ok(kind),
            Err(_) => Err(format!("Unknown instruction: {s}")),
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, InstrKind::BASE | InstrKind::START | InstrKind::DATA)
    }

    pub fn is_branch(&self) -> bool {
        use InstrKind::*;
        matches!(self, BCC | BCS | BEQ | BMI | BNE | BPL | BRA | BVC | BVS)
    }

    /// Single-byte instructions that never take an operand.
    pub fn is_implied(&self) -> bool {
        use InstrKind::*;
        matches!(
            self,
            BRK | CLC
                | CLD
                | CLI
                | CLV
                | SEC
                | SED
                | SEI
                | NOP
                | PHA
                | PHP
                | PHX
                | PLA
                | PLP
                | PLX
                | PLY
                | RTI
                | RTS
                | TAX
                | TXA
                | TAY
                | TYA
                | TSX
                | TXS
        )
    }

    pub fn has_operand(&self) -> bool {
        !self.is_implied()
    }

    /// Smallest and largest encoding size before the addressing mode is known.
    pub fn size_range(&self) -> (i64, i64) {
        use InstrKind::*;
        match self {
            BASE | START => (0, 0),
            DATA => (1, 2),
            ASL | LSR | ROL | ROR | DEC | INC => (1, 3),
            JSR => (3, 3),
            _ if self.is_branch() => (2, 2),
            _ if self.is_implied() => (1, 1),
            _ => (2, 3),
        }
    }

    /// Encoded size for a resolved addressing mode, `None` when the pair is illegal.
    ///
    /// Implied instructions carry no mode; branches always take one offset byte
    /// whatever mode their target classified as. A zero-page `JSR` target is
    /// still encoded with the absolute form.
    pub fn size(&self, mode: Option<AddressingMode>) -> Option<usize> {
        match self {
            InstrKind::BASE | InstrKind::START => Some(0),
            InstrKind::DATA => None,
            _ if self.is_implied() => Some(1),
            _ if self.is_branch() => Some(2),
            InstrKind::JSR => match mode {
                Some(AddressingMode::Abs) | Some(AddressingMode::Zpg) => Some(3),
                _ => None,
            },
            _ => {
                let mode = mode?;
                crate::opcode::encode(*self, Some(mode))?;
                Some(1 + mode.operand_len())
            }
        }
    }
}

impl InstrKind {
    pub fn cformat(&self) -> String {
        match self {
            _ if self.is_directive() => cformat!("<c>{:<5}</>", self),
            _ if self.is_branch() => cformat!("<m>{:<5}</>", self),
            _ => cformat!("<r>{:<5}</>", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AddressingMode::*;

    #[test]
    fn parse() {
        assert_eq!(InstrKind::parse("lda"), Ok(InstrKind::LDA));
        assert_eq!(InstrKind::parse("Or"), Ok(InstrKind::ORA));
        assert_eq!(InstrKind::parse("ora"), Ok(InstrKind::ORA));
        assert_eq!(InstrKind::ORA.to_string(), "ORA");
        assert!(InstrKind::parse("hoge").is_err());
    }

    macro_rules! test_size {
        ($($name:ident: $kind:expr, [$($mode:expr => $size:expr),* $(,)?],)*) => {
            $(
                #[test]
                fn $name() {
                    $(
                        assert_eq!(
                            $kind.size($mode),
                            $size,
                            "{} {:?}",
                            $kind,
                            $mode
                        );
                    )*
                }
            )*
        }
    }

    test_size! {
        size_adc: InstrKind::ADC, [
            Some(Imm) => Some(2), Some(Abs) => Some(3), Some(AbsX) => Some(3),
            Some(AbsY) => Some(3), Some(Zpg) => Some(2), Some(ZpgX) => Some(2),
            Some(ZpgY) => None, Some(Ind) => Some(2), Some(IndX) => Some(2),
            Some(IndY) => Some(2), Some(Acc) => None, Some(RegX) => None,
        ],
        size_asl: InstrKind::ASL, [
            Some(Imm) => None, Some(Abs) => Some(3), Some(AbsX) => Some(3),
            Some(AbsY) => None, Some(Zpg) => Some(2), Some(ZpgX) => Some(2),
            Some(Acc) => Some(1),
        ],
        size_dec: InstrKind::DEC, [
            Some(Acc) => Some(1), Some(RegX) => Some(1), Some(RegY) => Some(1),
            Some(Imm) => None,
        ],
        size_jmp: InstrKind::JMP, [
            Some(Abs) => Some(3), Some(Ind) => Some(2), Some(IndX) => Some(2),
            Some(Zpg) => None,
        ],
        size_jsr: InstrKind::JSR, [
            Some(Abs) => Some(3), Some(Zpg) => Some(3), Some(Ind) => None,
        ],
        size_ldx: InstrKind::LDX, [
            Some(AbsY) => Some(3), Some(ZpgY) => Some(2), Some(AbsX) => None,
        ],
        size_sta: InstrKind::STA, [
            Some(Imm) => None, Some(Ind) => None, Some(IndY) => Some(2),
        ],
        size_branch: InstrKind::BNE, [
            Some(Zpg) => Some(2), Some(Abs) => Some(2),
        ],
        size_implied: InstrKind::TXS, [
            None::<AddressingMode> => Some(1),
        ],
    }

    #[test]
    fn size_ranges_cover_sizes() {
        use strum::IntoEnumIterator;
        for kind in InstrKind::iter().filter(|k| !k.is_directive()) {
            let (lo, hi) = kind.size_range();
            for mode in AddressingMode::iter().map(Some).chain([None]) {
                if let Some(size) = kind.size(mode) {
                    assert!(lo <= size as i64 && size as i64 <= hi, "{kind} {mode:?}");
                }
            }
        }
    }
}
