use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

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
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum AddressingMode {
    #[default]
    Imm,
    Abs,
    AbsX,
    AbsY,
    Zpg,
    ZpgX,
    ZpgY,
    Ind,
    IndX,
    IndY,
    Acc,
    RegX,
    RegY,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub fn operand_len(&self) -> usize {
        use AddressingMode::*;
        match self {
            Imm | Zpg | ZpgX | ZpgY | Ind | IndX | IndY => 1,
            Abs | AbsX | AbsY => 2,
            Acc | RegX | RegY => 0,
        }
    }

    /// Register-only modes have no operand expression.
    pub fn is_register(&self) -> bool {
        matches!(
            self,
            AddressingMode::Acc | AddressingMode::RegX | AddressingMode::RegY
        )
    }
}

#[test]
fn test() {
    assert_eq!(AddressingMode::AbsX.to_string(), "absx");
    assert_eq!("indy".parse::<AddressingMode>(), Ok(AddressingMode::IndY));
    assert_eq!(AddressingMode::from(4u8), AddressingMode::Zpg);
    assert_eq!(AddressingMode::Abs.operand_len(), 2);
}
