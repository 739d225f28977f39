//! Opcode byte -> operation table.

use arch::{opcode, AddressingMode, InstrKind};
use once_cell::sync::Lazy;

/// What an opcode byte does and how many cycles it declares. The tick that
/// fetches the opcode is not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub kind: InstrKind,
    pub mode: Option<AddressingMode>,
    pub cycles: u8,
}

/// Bytes outside the instruction set behave like `NOP`.
pub const UNKNOWN: Entry = Entry {
    kind: InstrKind::NOP,
    mode: None,
    cycles: 1,
};

static TABLE: Lazy<[Option<Entry>; 256]> = Lazy::new(|| {
    let mut table = [None; 256];
    for (op, (kind, mode)) in opcode::all() {
        table[op as usize] = Some(Entry {
            kind,
            mode,
            cycles: declared_cycles(kind, mode),
        });
    }
    table
});

pub fn lookup(op: u8) -> Option<Entry> {
    TABLE[op as usize]
}

/// Declared cycles per instruction shape, before page-cross, branch and
/// decimal-mode penalties.
pub fn declared_cycles(kind: InstrKind, mode: Option<AddressingMode>) -> u8 {
    use AddressingMode::*;
    use InstrKind::*;
    match (kind, mode) {
        (BRK, _) => 6,
        (JSR | RTI | RTS, _) => 5,
        (PHA | PHP | PHX, _) => 2,
        (PLA | PLP | PLX | PLY, _) => 3,
        (JMP, Some(Abs)) => 2,
        (JMP, _) => 5,
        _ if kind.is_branch() || kind.is_implied() => 1,

        // Read-modify-write
        (ASL | LSR | ROL | ROR | INC | DEC, Some(Acc | RegX | RegY)) => 1,
        (ASL | LSR | ROL | ROR | INC | DEC, Some(Zpg)) => 4,
        (ROL | ROR, Some(AbsX)) => 6,
        (ASL | LSR | ROL | ROR | INC | DEC, _) => 5,

        // Stores pay the indexed cycle up front
        (STA, Some(AbsX | AbsY)) => 4,
        (STA, Some(IndX | IndY)) => 5,

        (_, Some(Imm)) => 1,
        (_, Some(Zpg)) => 2,
        (_, Some(Abs | AbsX | AbsY | ZpgX | ZpgY)) => 3,
        (_, Some(Ind | IndY)) => 4,
        (_, Some(IndX)) => 5,
        (_, _) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_cycles {
        ($($name:ident: $op:expr => $cycles:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let entry = lookup($op).unwrap_or_else(|| panic!("{:02X} undefined", $op));
                    assert_eq!(entry.cycles, $cycles, "{:?}", entry);
                }
            )*
        }
    }

    test_cycles! {
        cycles_brk: 0x00 => 6,
        cycles_adc_imm: 0x69 => 1,
        cycles_adc_indx: 0x61 => 5,
        cycles_adc_indy: 0x71 => 4,
        cycles_adc_ind: 0x72 => 4,
        cycles_and_absy: 0x39 => 3,
        cycles_asl_abs: 0x0E => 5,
        cycles_asl_zpg: 0x06 => 4,
        cycles_asl_acc: 0x0A => 1,
        cycles_asl_absx: 0x1E => 5,
        cycles_beq: 0xF0 => 1,
        cycles_bit_zpg: 0x24 => 2,
        cycles_clc: 0x18 => 1,
        cycles_cpx_abs: 0xEC => 3,
        cycles_dec_zpgx: 0xD6 => 5,
        cycles_dex: 0xCA => 1,
        cycles_jmp_abs: 0x4C => 2,
        cycles_jmp_ind: 0x6C => 5,
        cycles_jmp_indx: 0x7C => 5,
        cycles_jsr: 0x20 => 5,
        cycles_lda_imm: 0xA9 => 1,
        cycles_lda_absx: 0xBD => 3,
        cycles_ldx_zpgy: 0xB6 => 3,
        cycles_nop: 0xEA => 1,
        cycles_pha: 0x48 => 2,
        cycles_plp: 0x28 => 3,
        cycles_rol_absx: 0x3E => 6,
        cycles_ror_zpgx: 0x76 => 5,
        cycles_rti: 0x40 => 5,
        cycles_rts: 0x60 => 5,
        cycles_sta_zpg: 0x85 => 2,
        cycles_sta_absx: 0x9D => 4,
        cycles_sta_indy: 0x91 => 5,
        cycles_stx_zpgx: 0x96 => 3,
        cycles_tax: 0xAA => 1,
        cycles_txs: 0x9A => 1,
    }

    #[test]
    fn every_defined_opcode_has_an_entry() {
        for (op, (kind, mode)) in opcode::all() {
            let entry = lookup(op).unwrap_or_else(|| panic!("{:02X} missing", op));
            assert_eq!((entry.kind, entry.mode), (kind, mode));
        }
        assert_eq!(TABLE.iter().flatten().count(), opcode::all().count());
    }

    #[test]
    fn gaps_are_undefined() {
        for op in [0x02, 0x03, 0xFF, 0x9C] {
            assert_eq!(lookup(op), None);
        }
    }
}
