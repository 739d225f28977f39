pub mod addressing;
pub mod codegen;
pub mod error;
pub mod expr;
pub mod label;
pub mod layout;
pub mod lexer;
pub mod line;
pub mod parser;
pub mod range;
pub mod token;

use std::collections::BTreeMap;

use error::Diag;
use label::Labels;
use layout::LayoutEngine;
use line::SourceFile;

/// A fully laid out program.
#[derive(Debug)]
pub struct Assembly {
    pub files: Vec<SourceFile>,
    pub start: u16,
    pub labels: Labels,
}

impl Assembly {
    /// Every emitted byte with its address, in source order.
    pub fn bytes(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.files
            .iter()
            .flat_map(|f| f.instructions())
            .flat_map(|inst| {
                inst.bytes
                    .iter()
                    .enumerate()
                    .map(|(i, &b)| (inst.address.wrapping_add(i as u16), b))
            })
    }

    pub fn memory(&self) -> BTreeMap<u16, u8> {
        self.bytes().collect()
    }

    pub fn byte_at(&self, addr: u16) -> Option<u8> {
        self.bytes().filter(|(a, _)| *a == addr).map(|(_, b)| b).last()
    }

    /// `len` consecutive bytes from `addr`, `None` if any of them was never
    /// written.
    pub fn bytes_at(&self, addr: u16, len: usize) -> Option<Vec<u8>> {
        let memory = self.memory();
        (0..len)
            .map(|i| memory.get(&addr.wrapping_add(i as u16)).copied())
            .collect()
    }

    pub fn image(&self) -> Vec<u8> {
        let mut image = vec![0u8; 0x10000];
        for (addr, byte) in self.bytes() {
            image[addr as usize] = byte;
        }
        image
    }
}

/// Lays out parsed files into an [`Assembly`].
pub fn assemble(mut files: Vec<SourceFile>) -> Result<Assembly, Diag> {
    let mut engine = LayoutEngine::new();
    let start = engine.run(&mut files)?;
    Ok(Assembly {
        files,
        start,
        labels: engine.labels().clone(),
    })
}

/// Parses and assembles a single in-memory source.
pub fn assemble_str(name: &str, text: &str) -> Result<Assembly, Diag> {
    assemble(vec![parser::parse_file(name, text)?])
}
