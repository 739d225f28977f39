use bimap::BiMap;
use once_cell::sync::Lazy;

use crate::inst::InstrKind;
use crate::mode::AddressingMode;

/// Instruction shape an opcode byte stands for. Implied instructions and
/// branches carry no addressing mode.
pub type Encoding = (InstrKind, Option<AddressingMode>);

macro_rules! opcodes {
    (@mode) => { None };
    (@mode $mode:ident) => { Some(AddressingMode::$mode) };
    ($($kind:ident $($mode:ident)? => $op:expr,)*) => {
        &[$((InstrKind::$kind, opcodes!(@mode $($mode)?), $op),)*]
    };
}

#[rustfmt::skip]
const TABLE: &[(InstrKind, Option<AddressingMode>, u8)] = opcodes! {
    BRK => 0x00,

    ADC Imm => 0x69, ADC Abs => 0x6D, ADC AbsX => 0x7D, ADC AbsY => 0x79,
    ADC Zpg => 0x65, ADC ZpgX => 0x75, ADC Ind => 0x72, ADC IndX => 0x61, ADC IndY => 0x71,

    SBC Imm => 0xE9, SBC Abs => 0xED, SBC AbsX => 0xFD, SBC AbsY => 0xF9,
    SBC Zpg => 0xE5, SBC ZpgX => 0xF5, SBC Ind => 0xF2, SBC IndX => 0xE1, SBC IndY => 0xF1,

    AND Imm => 0x29, AND Abs => 0x2D, AND AbsX => 0x3D, AND AbsY => 0x39,
    AND Zpg => 0x25, AND ZpgX => 0x35, AND Ind => 0x32, AND IndX => 0x21, AND IndY => 0x31,

    ASL Abs => 0x0E, ASL AbsX => 0x1E, ASL Zpg => 0x06, ASL ZpgX => 0x16, ASL Acc => 0x0A,

    BCC => 0x90, BCS => 0xB0, BEQ => 0xF0, BMI => 0x30, BNE => 0xD0,
    BPL => 0x10, BRA => 0x80, BVC => 0x50, BVS => 0x70,

    BIT Imm => 0x89, BIT Abs => 0x2C, BIT AbsX => 0x3C, BIT Zpg => 0x24, BIT ZpgX => 0x34,

    CLC => 0x18, CLD => 0xD8, CLI => 0x58, CLV => 0xB8,
    SEC => 0x38, SED => 0xF8, SEI => 0x78,

    CMP Imm => 0xC9, CMP Abs => 0xCD, CMP AbsX => 0xDD, CMP AbsY => 0xD9,
    CMP Zpg => 0xC5, CMP ZpgX => 0xD5, CMP Ind => 0xD2, CMP IndX => 0xC1, CMP IndY => 0xD1,

    CPX Imm => 0xE0, CPX Abs => 0xEC, CPX Zpg => 0xE4,
    CPY Imm => 0xC0, CPY Abs => 0xCC, CPY Zpg => 0xC4,

    DEC Abs => 0xCE, DEC AbsX => 0xDE, DEC Zpg => 0xC6, DEC ZpgX => 0xD6,
    DEC Acc => 0x3A, DEC RegX => 0xCA, DEC RegY => 0x88,
    INC Abs => 0xEE, INC AbsX => 0xFE, INC Zpg => 0xE6, INC ZpgX => 0xF6,
    INC Acc => 0x1A, INC RegX => 0xE8, INC RegY => 0xC8,

    EOR Imm => 0x49, EOR Abs => 0x4D, EOR AbsX => 0x5D, EOR AbsY => 0x59,
    EOR Zpg => 0x45, EOR ZpgX => 0x55, EOR Ind => 0x52, EOR IndX => 0x41, EOR IndY => 0x51,

    JMP Abs => 0x4C, JMP Ind => 0x6C, JMP IndX => 0x7C,
    JSR Abs => 0x20,

    LDA Imm => 0xA9, LDA Abs => 0xAD, LDA AbsX => 0xBD, LDA AbsY => 0xB9,
    LDA Zpg => 0xA5, LDA ZpgX => 0xB5, LDA Ind => 0xB2, LDA IndX => 0xA1, LDA IndY => 0xB1,
    LDX Imm => 0xA2, LDX Abs => 0xAE, LDX AbsY => 0xBE, LDX Zpg => 0xA6, LDX ZpgY => 0xB6,
    LDY Imm => 0xA0, LDY Abs => 0xAC, LDY AbsX => 0xBC, LDY Zpg => 0xA4, LDY ZpgX => 0xB4,

    LSR Abs => 0x4E, LSR AbsX => 0x5E, LSR Zpg => 0x46, LSR ZpgX => 0x56, LSR Acc => 0x4A,

    NOP => 0xEA,

    ORA Imm => 0x09, ORA Abs => 0x0D, ORA AbsX => 0x1D, ORA AbsY => 0x19,
    ORA Zpg => 0x05, ORA ZpgX => 0x15, ORA Ind => 0x12, ORA IndX => 0x01, ORA IndY => 0x11,

    PHA => 0x48, PHP => 0x08, PHX => 0xDA,
    PLA => 0x68, PLP => 0x28, PLX => 0xFA, PLY => 0x7A,

    ROL Abs => 0x2E, ROL AbsX => 0x3E, ROL Zpg => 0x26, ROL ZpgX => 0x36, ROL Acc => 0x2A,
    ROR Abs => 0x6E, ROR AbsX => 0x7E, ROR Zpg => 0x66, ROR ZpgX => 0x76, ROR Acc => 0x6A,

    RTI => 0x40, RTS => 0x60,

    STA Abs => 0x8D, STA AbsX => 0x9D, STA AbsY => 0x99,
    STA Zpg => 0x85, STA ZpgX => 0x95, STA IndX => 0x81, STA IndY => 0x91,
    STY Abs => 0x8C, STY Zpg => 0x84, STY ZpgX => 0x94,
    STX Abs => 0x8E, STX Zpg => 0x86, STX ZpgX => 0x96,

    TAX => 0xAA, TXA => 0x8A, TAY => 0xA8, TYA => 0x98, TSX => 0xBA, TXS => 0x9A,
};

static OPCODES: Lazy<BiMap<Encoding, u8>> = Lazy::new(|| {
    let mut map = BiMap::new();
    for &(kind, mode, op) in TABLE {
        map.insert((kind, mode), op);
    }
    map
});

/// Opcode byte for an instruction shape.
///
/// The mode is dropped for implied instructions and branches, and a zero-page
/// `JSR` uses the absolute encoding.
pub fn encode(kind: InstrKind, mode: Option<AddressingMode>) -> Option<u8> {
    let mode = match (kind, mode) {
        _ if kind.is_implied() || kind.is_branch() => None,
        (InstrKind::JSR, Some(AddressingMode::Zpg)) => Some(AddressingMode::Abs),
        _ => mode,
    };
    OPCODES.get_by_left(&(kind, mode)).copied()
}

pub fn decode(op: u8) -> Option<Encoding> {
    OPCODES.get_by_right(&op).copied()
}

/// Every opcode byte the instruction set defines.
pub fn all() -> impl Iterator<Item = (u8, Encoding)> {
    TABLE.iter().map(|&(kind, mode, op)| (op, (kind, mode)))
}
