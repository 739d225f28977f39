//! Cycle-counting 65C02 core.
//!
//! [`Cpu::tick`] advances one clock. The tick that starts an instruction
//! or interrupt sequence does all of its work and loads the declared cycle
//! count; the following ticks only count it down. An instruction declaring
//! `n` cycles therefore occupies `n + 1` ticks.

pub mod addressing;
pub mod dispatch;
mod exec;
pub mod registers;

use arch::InstrKind;

use crate::bus::SystemBus;
use crate::debugger::Debugger;
use registers::Registers;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

const STACK_PAGE: u16 = 0x0100;

/// What the starting tick did.
enum Sequence {
    Reset,
    Nmi,
    Irq,
    Instruction(InstrKind),
}

#[derive(Debug, Default)]
pub struct Cpu {
    regs: Registers,
    cycles_left: u8,
    /// NMI line level seen at the last instruction boundary.
    prev_nmi: bool,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Whether an instruction is still counting down its cycles.
    pub fn busy(&self) -> bool {
        self.cycles_left != 0
    }

    pub fn powerup(&mut self, bus: &mut SystemBus) {
        self.regs.p.set_i(true);
        self.regs.p.set_d(false);
        self.regs.pc = bus.read_u16(RESET_VECTOR);
        self.regs.s = 0xFF;
        self.cycles_left = 0;
        self.prev_nmi = false;
    }

    /// One clock. Returns `true` when the debugger asks to halt.
    pub fn tick(&mut self, bus: &mut SystemBus, dbg: &mut dyn Debugger) -> bool {
        if self.cycles_left != 0 {
            self.cycles_left -= 1;
            return false;
        }

        if dbg.break_on_next_instruction_ready(self.regs.pc) {
            return true;
        }

        let nmi = bus.nmi();
        let nmi_edge = nmi && !self.prev_nmi;
        self.prev_nmi = nmi;

        let sequence = if bus.reset {
            self.regs.s = 0xFF;
            self.interrupt(bus, dbg, RESET_VECTOR);
            self.regs.p.set_d(false);
            self.cycles_left = 5;
            Sequence::Reset
        } else if nmi_edge {
            self.interrupt(bus, dbg, NMI_VECTOR);
            self.cycles_left = 6;
            Sequence::Nmi
        } else if bus.irq() && !self.regs.p.i() {
            self.interrupt(bus, dbg, IRQ_VECTOR);
            self.cycles_left = 6;
            Sequence::Irq
        } else {
            Sequence::Instruction(self.step(bus, dbg))
        };

        self.report_status(bus, dbg);

        match sequence {
            Sequence::Reset => dbg.break_on_reset(),
            Sequence::Nmi => dbg.break_on_nmi(),
            Sequence::Irq => dbg.break_on_interrupt(),
            Sequence::Instruction(InstrKind::BRK) => {
                dbg.break_on_break() || dbg.break_after_instruction()
            }
            Sequence::Instruction(_) => dbg.break_after_instruction(),
        }
    }

    /// Saves PC and status, masks IRQ and jumps through `vector`.
    fn interrupt(&mut self, bus: &mut SystemBus, dbg: &mut dyn Debugger, vector: u16) {
        self.push_u16(bus, dbg, self.regs.pc);
        self.push(bus, dbg, self.regs.p.0);
        self.regs.p.set_i(true);
        self.regs.pc = bus.read_u16(vector);
    }

    pub fn report_status(&self, bus: &SystemBus, dbg: &mut dyn Debugger) {
        dbg.report_register_u16("PC", self.regs.pc);
        dbg.report_register_u8("Y", self.regs.y);
        dbg.report_register_u8("X", self.regs.x);
        dbg.report_register_u8("S", self.regs.s);
        dbg.report_register_u8("A", self.regs.a);
        for (name, value) in self.regs.p.named() {
            dbg.report_register_flag(name, value);
        }
        dbg.report_nmi_line(bus.nmi());
        dbg.report_irq_line(bus.irq());
        dbg.report_reset_line(bus.reset);
    }

    fn fetch(&mut self, bus: &mut SystemBus) -> u8 {
        let v = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        v
    }

    fn push(&mut self, bus: &mut SystemBus, dbg: &mut dyn Debugger, value: u8) {
        bus.write(STACK_PAGE | self.regs.s as u16, value, dbg);
        self.regs.s = self.regs.s.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut SystemBus) -> u8 {
        self.regs.s = self.regs.s.wrapping_add(1);
        bus.read(STACK_PAGE | self.regs.s as u16)
    }

    /// High byte first, so the low byte sits at the lower address.
    fn push_u16(&mut self, bus: &mut SystemBus, dbg: &mut dyn Debugger, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push(bus, dbg, hi);
        self.push(bus, dbg, lo);
    }

    fn pull_u16(&mut self, bus: &mut SystemBus) -> u16 {
        let lo = self.pull(bus);
        let hi = self.pull(bus);
        u16::from_le_bytes([lo, hi])
    }
}
