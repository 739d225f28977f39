use color_print::cformat;
use std::io::Write;

use crate::line::SourceFile;

/// Output encoders. Each one is a lossless rendering of the same
/// address -> byte map plus the start address.
pub trait CodeGenerator {
    fn generate(&mut self, files: &[SourceFile], start: u16) -> std::io::Result<()>;
}

// ----------------------------------------------------------------------------
// Punch card

/// Ten-column cards: two control holes, then the byte split in two nibbles.
/// `_ O` stores a byte, `O _` / `O O` load the low / high address byte.
pub struct PunchCard<W: Write> {
    out: W,
}

impl<W: Write> PunchCard<W> {
    pub fn new(out: W) -> Self {
        PunchCard { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn row(&mut self, control: &str, byte: u8, addr: Option<u16>) -> std::io::Result<()> {
        let hole = |bit: u8| if byte & bit == 0 { '_' } else { 'O' };
        write!(self.out, "{} ", control)?;
        for bit in [0x80, 0x40, 0x20, 0x10] {
            write!(self.out, " {}", hole(bit))?;
        }
        write!(self.out, " ")?;
        for bit in [0x08, 0x04, 0x02, 0x01] {
            write!(self.out, " {}", hole(bit))?;
        }
        write!(self.out, " ; ")?;
        if let Some(addr) = addr {
            write!(self.out, " ; 0x{:04X}", addr)?;
        }
        writeln!(self.out, " ; 0x{:02X}", byte)
    }

    fn set_address(&mut self, addr: u16) -> std::io::Result<()> {
        let [lo, hi] = addr.to_le_bytes();
        self.row("O _", lo, None)?;
        self.row("O O", hi, None)
    }
}

impl<W: Write> CodeGenerator for PunchCard<W> {
    fn generate(&mut self, files: &[SourceFile], start: u16) -> std::io::Result<()> {
        let mut cur: u16 = 0;
        for file in files {
            writeln!(self.out, "; {}", file.name)?;
            for line in &file.lines {
                writeln!(self.out, "; {}: {}", line.line_no, line.text)?;
                let Some(inst) = &line.inst else {
                    continue;
                };
                if inst.bytes.is_empty() {
                    continue;
                }
                let mut addr = inst.address;
                if addr != cur {
                    writeln!(self.out, "; Change address to 0x{:04X}", addr)?;
                    self.set_address(addr)?;
                }
                for &byte in &inst.bytes {
                    self.row("_ O", byte, Some(addr))?;
                    addr = addr.wrapping_add(1);
                }
                cur = addr;
            }
        }
        writeln!(self.out, "; Execute start address")?;
        self.set_address(start)
    }
}

// ----------------------------------------------------------------------------
// ROM listing

/// A `rom.program(addr, byte)` call per byte, for pasting into a host-side
/// ROM initializer.
pub struct RomListing<W: Write> {
    out: W,
}

impl<W: Write> RomListing<W> {
    pub fn new(out: W) -> Self {
        RomListing { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CodeGenerator for RomListing<W> {
    fn generate(&mut self, files: &[SourceFile], start: u16) -> std::io::Result<()> {
        writeln!(self.out, "// start: 0x{:04X}", start)?;
        for file in files {
            writeln!(self.out, "// {}", file.name)?;
            for line in &file.lines {
                writeln!(self.out, "// {}: {}", line.line_no, line.text)?;
                let Some(inst) = &line.inst else {
                    continue;
                };
                let mut addr = inst.address;
                for &byte in &inst.bytes {
                    writeln!(self.out, "rom.program(0x{:04X}, 0x{:02X});", addr, byte)?;
                    addr = addr.wrapping_add(1);
                }
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Flat image

/// The whole 64 KiB address space, unwritten bytes left at zero.
pub struct Image<W: Write> {
    out: W,
}

impl<W: Write> Image<W> {
    pub fn new(out: W) -> Self {
        Image { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CodeGenerator for Image<W> {
    fn generate(&mut self, files: &[SourceFile], _start: u16) -> std::io::Result<()> {
        let mut image = vec![0u8; 0x10000];
        for inst in files.iter().flat_map(|f| f.instructions()) {
            let mut addr = inst.address;
            for &byte in &inst.bytes {
                image[addr as usize] = byte;
                addr = addr.wrapping_add(1);
            }
        }
        self.out.write_all(&image)
    }
}

// ----------------------------------------------------------------------------
// Listing

pub fn print_dump(files: &[SourceFile]) {
    for file in files {
        println!(
            "{}+------[{}]{}",
            "-".repeat(19),
            file.name,
            "-".repeat(45usize.saturating_sub(file.name.len()))
        );
        for line in &file.lines {
            let Some(inst) = &line.inst else {
                println!("{:19}| {:>4}: {}", "", line.line_no, line.text);
                continue;
            };
            let bytes = inst
                .bytes
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ");
            let mode = inst
                .mode
                .map(|m| cformat!(" <g>({})</>", m))
                .unwrap_or_default();
            println!(
                "[{:04X}] {:<11} | {:>4}:   {}{}",
                inst.address,
                bytes,
                line.line_no,
                inst.cformat(),
                mode
            );
        }
    }
    println!("-------------------+-----------------------------------------------------");
}
