use arch::{AddressingMode, InstrKind};

use super::addressing;
use super::dispatch::{self, Entry};
use super::registers::Status;
use super::{Cpu, IRQ_VECTOR};
use crate::bus::SystemBus;
use crate::debugger::Debugger;

/// Where an instruction's operand lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    A,
    X,
    Y,
    Memory(u16),
}

impl Cpu {
    /// Fetches and runs one instruction, leaving its cycle cost in
    /// `cycles_left`.
    pub(super) fn step(&mut self, bus: &mut SystemBus, dbg: &mut dyn Debugger) -> InstrKind {
        let op = self.fetch(bus);
        let entry = dispatch::lookup(op).unwrap_or(dispatch::UNKNOWN);
        self.cycles_left = entry.cycles;
        let extra = self.execute(entry, bus, dbg);
        self.cycles_left += extra;
        entry.kind
    }

    fn operand(&mut self, mode: Option<AddressingMode>, bus: &mut SystemBus) -> (Operand, u8) {
        let Some(mode) = mode else {
            return (Operand::A, 0);
        };
        match addressing::resolve(mode, bus, &mut self.regs) {
            Some((addr, extra)) => (Operand::Memory(addr), extra),
            None => match mode {
                AddressingMode::RegX => (Operand::X, 0),
                AddressingMode::RegY => (Operand::Y, 0),
                _ => (Operand::A, 0),
            },
        }
    }

    fn get(&self, bus: &mut SystemBus, at: Operand) -> u8 {
        match at {
            Operand::A => self.regs.a,
            Operand::X => self.regs.x,
            Operand::Y => self.regs.y,
            Operand::Memory(addr) => bus.read(addr),
        }
    }

    fn put(&mut self, bus: &mut SystemBus, dbg: &mut dyn Debugger, at: Operand, value: u8) {
        match at {
            Operand::A => self.regs.a = value,
            Operand::X => self.regs.x = value,
            Operand::Y => self.regs.y = value,
            Operand::Memory(addr) => bus.write(addr, value, dbg),
        }
    }

    /// Read-modify-write. Z and N follow the result.
    fn modify(
        &mut self,
        bus: &mut SystemBus,
        dbg: &mut dyn Debugger,
        at: Operand,
        f: impl FnOnce(&mut Status, u8) -> u8,
    ) {
        let value = self.get(bus, at);
        let result = f(&mut self.regs.p, value);
        self.regs.p.set_zn(result);
        self.put(bus, dbg, at, result);
    }

    fn set_a(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.p.set_zn(value);
    }

    /// Returns the decimal-mode penalty.
    fn add(&mut self, m: u8) -> u8 {
        let a = self.regs.a as u16;
        let m = m as u16;
        let c = self.regs.p.c() as u16;
        let decimal = self.regs.p.d();
        let res = if decimal {
            let mut res = a + 0x06;
            let partial = res ^ m ^ c;
            res += m + c;
            // No carry out of the low nibble: undo the adjustment
            if !(res ^ partial) & 0x10 != 0 {
                res -= 0x06;
            }
            res
        } else {
            a + m + c
        };
        self.regs.p.set_v((a ^ res) & (m ^ res) & 0x80 != 0);
        self.regs.p.set_c(res & 0x100 != 0);
        self.set_a(res as u8);
        decimal as u8
    }

    fn compare(&mut self, v: u8, m: u8) {
        self.regs.p.set_z(v == m);
        self.regs.p.set_c(v >= m);
        self.regs.p.set_n(v.wrapping_sub(m) & 0x80 != 0);
    }

    fn pull_into(&mut self, bus: &mut SystemBus) -> u8 {
        let v = self.pull(bus);
        self.regs.p.set_zn(v);
        v
    }

    fn execute(&mut self, entry: Entry, bus: &mut SystemBus, dbg: &mut dyn Debugger) -> u8 {
        use InstrKind::*;

        if entry.kind.is_branch() {
            return self.branch(entry.kind, bus);
        }
        let (at, extra) = if entry.kind.is_implied() {
            (Operand::A, 0)
        } else {
            self.operand(entry.mode, bus)
        };

        match entry.kind {
            // Arithmetic
            ADC => {
                let m = self.get(bus, at);
                return extra + self.add(m);
            }
            SBC => {
                let m = self.get(bus, at);
                return extra + self.add(!m);
            }
            AND => {
                let v = self.regs.a & self.get(bus, at);
                self.set_a(v);
            }
            ORA => {
                let v = self.regs.a | self.get(bus, at);
                self.set_a(v);
            }
            EOR => {
                let v = self.regs.a ^ self.get(bus, at);
                self.set_a(v);
            }
            CMP => {
                let m = self.get(bus, at);
                self.compare(self.regs.a, m);
            }
            CPX => {
                let m = self.get(bus, at);
                self.compare(self.regs.x, m);
            }
            CPY => {
                let m = self.get(bus, at);
                self.compare(self.regs.y, m);
            }
            BIT => {
                let m = self.get(bus, at);
                self.regs.p.set_z(self.regs.a & m == 0);
                if entry.mode != Some(AddressingMode::Imm) {
                    self.regs.p.set_n(m & 0x80 != 0);
                    self.regs.p.set_v(m & 0x40 != 0);
                }
            }

            // Shifts and increments
            ASL => self.modify(bus, dbg, at, |p, v| {
                p.set_c(v & 0x80 != 0);
                v << 1
            }),
            LSR => self.modify(bus, dbg, at, |p, v| {
                p.set_c(v & 0x01 != 0);
                v >> 1
            }),
            ROL => self.modify(bus, dbg, at, |p, v| {
                let c = p.c() as u8;
                p.set_c(v & 0x80 != 0);
                (v << 1) | c
            }),
            ROR => self.modify(bus, dbg, at, |p, v| {
                let c = (p.c() as u8) << 7;
                p.set_c(v & 0x01 != 0);
                (v >> 1) | c
            }),
            INC => self.modify(bus, dbg, at, |_, v| v.wrapping_add(1)),
            DEC => self.modify(bus, dbg, at, |_, v| v.wrapping_sub(1)),

            // Loads and stores
            LDA => {
                let v = self.get(bus, at);
                self.set_a(v);
            }
            LDX => {
                let v = self.get(bus, at);
                self.regs.x = v;
                self.regs.p.set_zn(v);
            }
            LDY => {
                let v = self.get(bus, at);
                self.regs.y = v;
                self.regs.p.set_zn(v);
            }
            STA => self.put(bus, dbg, at, self.regs.a),
            STX => self.put(bus, dbg, at, self.regs.x),
            STY => self.put(bus, dbg, at, self.regs.y),

            // Control flow
            JMP => {
                if let Operand::Memory(addr) = at {
                    self.regs.pc = addr;
                }
            }
            JSR => {
                if let Operand::Memory(addr) = at {
                    let ret = self.regs.pc.wrapping_sub(1);
                    self.push_u16(bus, dbg, ret);
                    self.regs.pc = addr;
                }
            }
            RTS => self.regs.pc = self.pull_u16(bus).wrapping_add(1),
            RTI => {
                self.regs.p = Status(self.pull(bus));
                self.regs.pc = self.pull_u16(bus);
            }
            BRK => {
                self.regs.pc = self.regs.pc.wrapping_add(1);
                self.push_u16(bus, dbg, self.regs.pc);
                self.push(bus, dbg, self.regs.p.0);
                self.regs.pc = bus.read_u16(IRQ_VECTOR);
                self.regs.p.set_i(true);
                self.regs.p.set_b(true);
                self.regs.p.set_d(false);
            }

            // Stack
            PHA => self.push(bus, dbg, self.regs.a),
            PHP => self.push(bus, dbg, self.regs.p.0),
            PHX => self.push(bus, dbg, self.regs.x),
            PLA => self.regs.a = self.pull_into(bus),
            PLX => self.regs.x = self.pull_into(bus),
            PLY => self.regs.y = self.pull_into(bus),
            PLP => self.regs.p = Status(self.pull(bus)),

            // Transfers
            TAX => {
                self.regs.x = self.regs.a;
                self.regs.p.set_zn(self.regs.x);
            }
            TAY => {
                self.regs.y = self.regs.a;
                self.regs.p.set_zn(self.regs.y);
            }
            TXA => self.set_a(self.regs.x),
            TYA => self.set_a(self.regs.y),
            TSX => {
                self.regs.x = self.regs.s;
                self.regs.p.set_zn(self.regs.x);
            }
            TXS => self.regs.s = self.regs.x,

            // Flags
            CLC => self.regs.p.set_c(false),
            CLD => self.regs.p.set_d(false),
            CLI => self.regs.p.set_i(false),
            CLV => self.regs.p.set_v(false),
            SEC => self.regs.p.set_c(true),
            SED => self.regs.p.set_d(true),
            SEI => self.regs.p.set_i(true),

            // NOP, and anything that never reaches here
            _ => {}
        }
        extra
    }

    /// Returns the taken and page-cross penalties.
    fn branch(&mut self, kind: InstrKind, bus: &mut SystemBus) -> u8 {
        use InstrKind::*;

        let offset = self.fetch(bus) as i8;
        let p = self.regs.p;
        let taken = match kind {
            BCC => !p.c(),
            BCS => p.c(),
            BEQ => p.z(),
            BNE => !p.z(),
            BMI => p.n(),
            BPL => !p.n(),
            BVC => !p.v(),
            BVS => p.v(),
            _ => true,
        };
        if !taken {
            return 0;
        }
        let from = self.regs.pc;
        self.regs.pc = from.wrapping_add_signed(offset as i16);
        1 + (from & 0xFF00 != self.regs.pc & 0xFF00) as u8
    }
}
