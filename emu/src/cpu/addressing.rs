//! Effective-address resolvers.
//!
//! Each one consumes its operand bytes at PC and returns the effective
//! address plus the extra cycles the access costs.

use arch::AddressingMode;

use super::registers::Registers;
use crate::bus::SystemBus;

pub type Resolved = (u16, u8);

fn fetch(bus: &mut SystemBus, regs: &mut Registers) -> u8 {
    let v = bus.read(regs.pc);
    regs.pc = regs.pc.wrapping_add(1);
    v
}

fn fetch_u16(bus: &mut SystemBus, regs: &mut Registers) -> u16 {
    let lo = fetch(bus, regs);
    let hi = fetch(bus, regs);
    u16::from_le_bytes([lo, hi])
}

/// Pointer stored in page zero; the high byte wraps within the page.
fn zero_page_pointer(bus: &mut SystemBus, at: u8) -> u16 {
    let lo = bus.read(at as u16);
    let hi = bus.read(at.wrapping_add(1) as u16);
    u16::from_le_bytes([lo, hi])
}

fn indexed(base: u16, index: u8) -> Resolved {
    let addr = base.wrapping_add(index as u16);
    let crossed = base & 0xFF00 != addr & 0xFF00;
    (addr, crossed as u8)
}

/// The operand itself: its address is PC.
pub fn imm(_bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    let addr = regs.pc;
    regs.pc = regs.pc.wrapping_add(1);
    (addr, 0)
}

pub fn abs(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    (fetch_u16(bus, regs), 0)
}

pub fn absx(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    let base = fetch_u16(bus, regs);
    indexed(base, regs.x)
}

pub fn absy(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    let base = fetch_u16(bus, regs);
    indexed(base, regs.y)
}

pub fn zpg(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    (fetch(bus, regs) as u16, 0)
}

pub fn zpgx(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    (fetch(bus, regs).wrapping_add(regs.x) as u16, 0)
}

pub fn zpgy(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    (fetch(bus, regs).wrapping_add(regs.y) as u16, 0)
}

pub fn ind(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    let ptr = fetch(bus, regs);
    (zero_page_pointer(bus, ptr), 0)
}

pub fn indx(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    let ptr = fetch(bus, regs).wrapping_add(regs.x);
    (zero_page_pointer(bus, ptr), 0)
}

pub fn indy(bus: &mut SystemBus, regs: &mut Registers) -> Resolved {
    let ptr = fetch(bus, regs);
    let base = zero_page_pointer(bus, ptr);
    indexed(base, regs.y)
}

/// `None` for the register modes, which never touch the bus.
pub fn resolve(mode: AddressingMode, bus: &mut SystemBus, regs: &mut Registers) -> Option<Resolved> {
    use AddressingMode::*;
    let f: fn(&mut SystemBus, &mut Registers) -> Resolved = match mode {
        Imm => imm,
        Abs => abs,
        AbsX => absx,
        AbsY => absy,
        Zpg => zpg,
        ZpgX => zpgx,
        ZpgY => zpgy,
        Ind => ind,
        IndX => indx,
        IndY => indy,
        Acc | RegX | RegY => return None,
    };
    Some(f(bus, regs))
}
