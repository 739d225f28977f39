use arch::{AddressingMode, InstrKind};
use color_print::cformat;

use crate::error::Location;
use crate::expr::ExprRef;
use crate::range::Interval;

/// One machine instruction or directive, filled in progressively by layout.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub location: Location,
    pub label: Option<String>,
    pub mnemonic: String,
    pub kind: InstrKind,
    pub operand: Option<ExprRef>,

    // Layout state
    pub address_range: Interval,
    pub size_range: Interval,
    pub address: u16,
    pub size: usize,
    pub mode: Option<AddressingMode>,
    pub param: Option<ExprRef>,
    pub bytes: Vec<u8>,
}

impl Instruction {
    pub fn new(
        location: Location,
        label: Option<String>,
        mnemonic: &str,
        kind: InstrKind,
        operand: Option<ExprRef>,
    ) -> Self {
        Instruction {
            location,
            label,
            mnemonic: mnemonic.to_string(),
            kind,
            operand,
            address_range: Interval::UNKNOWN,
            size_range: Interval::point(0),
            address: 0,
            size: 0,
            mode: None,
            param: None,
            bytes: vec![],
        }
    }

    pub fn cformat(&self) -> String {
        let label = match &self.label {
            Some(label) => cformat!("<y>@{}</>: ", label),
            None => String::new(),
        };
        let operand = match &self.operand {
            Some(e) => cformat!("<b>{}</>", e),
            None => String::new(),
        };
        format!("{}{} {}", label, self.kind.cformat(), operand)
    }
}

/// A source line. Lines holding only a label, a constant or a comment carry
/// no instruction.
#[derive(Debug, Clone)]
pub struct Line {
    pub line_no: usize,
    pub text: String,
    pub inst: Option<Instruction>,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub lines: Vec<Line>,
}

impl SourceFile {
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().filter_map(|line| line.inst.as_ref())
    }

    pub fn instructions_mut(&mut self) -> impl Iterator<Item = &mut Instruction> {
        self.lines.iter_mut().filter_map(|line| line.inst.as_mut())
    }
}
