pub mod inst;
pub mod mode;
pub mod opcode;

pub use inst::InstrKind;
pub use mode::AddressingMode;
