//! Debugger capability.
//!
//! The CPU and bus consult a [`Debugger`] at fixed points to decide whether
//! to halt, and report every register, line and bus write to it. Nothing
//! else observes the machine.

use color_print::{cformat, cprintln};
use std::collections::{BTreeMap, BTreeSet};

use crate::cpu::registers::Registers;

pub trait Debugger {
    fn break_on_started(&mut self) -> bool;
    fn break_on_next_instruction_ready(&mut self, pc: u16) -> bool;
    fn break_after_instruction(&mut self) -> bool;
    fn break_on_reset(&mut self) -> bool;
    fn break_on_nmi(&mut self) -> bool;
    fn break_on_interrupt(&mut self) -> bool;
    fn break_on_break(&mut self) -> bool;
    fn break_on_bus_address_changed(&mut self, addr: u16) -> bool;

    fn report_register_u8(&mut self, name: &str, value: u8);
    fn report_register_u16(&mut self, name: &str, value: u16);
    fn report_register_flag(&mut self, name: &str, value: bool);
    fn report_address_write(&mut self, addr: u16, data: u8);
    fn report_nmi_line(&mut self, value: bool);
    fn report_irq_line(&mut self, value: bool);
    fn report_reset_line(&mut self, value: bool);

    /// Called by the machine once per tick, after the bus ticked.
    fn tick(&mut self);
}

// ----------------------------------------------------------------------------
// Null

/// Never breaks, ignores every report.
#[derive(Debug, Default)]
pub struct NullDebugger;

impl Debugger for NullDebugger {
    fn break_on_started(&mut self) -> bool {
        false
    }
    fn break_on_next_instruction_ready(&mut self, _pc: u16) -> bool {
        false
    }
    fn break_after_instruction(&mut self) -> bool {
        false
    }
    fn break_on_reset(&mut self) -> bool {
        false
    }
    fn break_on_nmi(&mut self) -> bool {
        false
    }
    fn break_on_interrupt(&mut self) -> bool {
        false
    }
    fn break_on_break(&mut self) -> bool {
        false
    }
    fn break_on_bus_address_changed(&mut self, _addr: u16) -> bool {
        false
    }
    fn report_register_u8(&mut self, _name: &str, _value: u8) {}
    fn report_register_u16(&mut self, _name: &str, _value: u16) {}
    fn report_register_flag(&mut self, _name: &str, _value: bool) {}
    fn report_address_write(&mut self, _addr: u16, _data: u8) {}
    fn report_nmi_line(&mut self, _value: bool) {}
    fn report_irq_line(&mut self, _value: bool) {}
    fn report_reset_line(&mut self, _value: bool) {}
    fn tick(&mut self) {}
}

// ----------------------------------------------------------------------------
// Console

/// Break conditions of the console debugger, loaded from the `debugger`
/// section of the machine config.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BreakFlags {
    pub started: bool,
    pub step: bool,
    pub reset: bool,
    pub nmi: bool,
    pub irq: bool,
    #[serde(rename = "brk")]
    pub break_instruction: bool,
}

/// Register values as last reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub flags: BTreeMap<String, bool>,
    pub nmi: bool,
    pub irq: bool,
    pub reset: bool,
}

#[derive(Debug, Default)]
pub struct ConsoleDebugger {
    pub flags: BreakFlags,
    breakpoints: BTreeSet<u16>,
    bus_breakpoints: BTreeSet<u16>,
    watches: BTreeSet<u16>,
    /// Breakpoint the PC is sitting on, so it fires once per visit.
    armed: Option<u16>,
    ticks: u64,
    latest: Snapshot,
}

impl ConsoleDebugger {
    pub fn new(flags: BreakFlags) -> Self {
        ConsoleDebugger {
            flags,
            ..Self::default()
        }
    }

    pub fn add_breakpoint(&mut self, pc: u16) {
        self.breakpoints.insert(pc);
    }

    pub fn add_bus_breakpoint(&mut self, addr: u16) {
        self.bus_breakpoints.insert(addr);
    }

    pub fn add_watch(&mut self, addr: u16) {
        self.watches.insert(addr);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn latest(&self) -> &Snapshot {
        &self.latest
    }

    fn alert(&self, what: &str) {
        cprintln!("<y>! [{:>8}] {}</>", self.ticks, what);
    }

    /// Register box in the style of the register dump.
    pub fn print_registers(&self) {
        let s = &self.latest;
        let flag = |name: &str| match s.flags.get(name) {
            Some(true) => cformat!("<g>{}</>", name),
            _ => name.to_lowercase(),
        };
        println!(" +----------+--------+--------+--------+--------+");
        println!(
            " | pc: {:04X} | a:  {:02X} | x:  {:02X} | y:  {:02X} | s:  {:02X} |",
            s.pc, s.a, s.x, s.y, s.s
        );
        println!(
            " | {} {} {} {} {} {} {}            | nmi:{} irq:{} rst:{}  |",
            flag("N"),
            flag("V"),
            flag("B"),
            flag("D"),
            flag("I"),
            flag("Z"),
            flag("C"),
            s.nmi as u8,
            s.irq as u8,
            s.reset as u8
        );
        println!(" +----------+--------+--------+--------+--------+");
    }
}

impl Debugger for ConsoleDebugger {
    fn break_on_started(&mut self) -> bool {
        self.flags.started
    }

    fn break_on_next_instruction_ready(&mut self, pc: u16) -> bool {
        if self.armed.is_some_and(|at| at != pc) {
            self.armed = None;
        }
        if self.armed.is_none() && self.breakpoints.contains(&pc) {
            self.armed = Some(pc);
            self.alert(&format!("breakpoint ${:04X}", pc));
            return true;
        }
        false
    }

    fn break_after_instruction(&mut self) -> bool {
        self.flags.step
    }

    fn break_on_reset(&mut self) -> bool {
        self.alert("reset");
        self.flags.reset
    }

    fn break_on_nmi(&mut self) -> bool {
        self.alert("nmi");
        self.flags.nmi
    }

    fn break_on_interrupt(&mut self) -> bool {
        self.alert("irq");
        self.flags.irq
    }

    fn break_on_break(&mut self) -> bool {
        self.alert("brk");
        self.flags.break_instruction
    }

    fn break_on_bus_address_changed(&mut self, addr: u16) -> bool {
        self.bus_breakpoints.contains(&addr)
    }

    fn report_register_u8(&mut self, name: &str, value: u8) {
        match name {
            "A" => self.latest.a = value,
            "X" => self.latest.x = value,
            "Y" => self.latest.y = value,
            "S" => self.latest.s = value,
            _ => {}
        }
    }

    fn report_register_u16(&mut self, name: &str, value: u16) {
        if name == "PC" {
            self.latest.pc = value;
        }
    }

    fn report_register_flag(&mut self, name: &str, value: bool) {
        self.latest.flags.insert(name.to_string(), value);
    }

    fn report_address_write(&mut self, addr: u16, data: u8) {
        if self.watches.contains(&addr) {
            cprintln!("<c>  [{:>8}] ${:04X} <<- ${:02X}</>", self.ticks, addr, data);
        }
    }

    fn report_nmi_line(&mut self, value: bool) {
        self.latest.nmi = value;
    }

    fn report_irq_line(&mut self, value: bool) {
        self.latest.irq = value;
    }

    fn report_reset_line(&mut self, value: bool) {
        self.latest.reset = value;
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }
}

// ----------------------------------------------------------------------------
// Trace

/// One recorded debugger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started,
    NextInstruction(u16),
    AfterInstruction,
    Reset,
    Nmi,
    Irq,
    Break,
    BusAddressChanged(u16),
    Write(u16, u8),
    Tick,
}

/// Records every query and write; answers queries from its flags. Register
/// reports are kept as the latest snapshot.
#[derive(Debug, Default)]
pub struct TraceDebugger {
    pub flags: BreakFlags,
    pub events: Vec<Event>,
    pub latest: Snapshot,
    pub bus_breakpoints: BTreeSet<u16>,
}

impl TraceDebugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    /// Registers as the snapshot reports them.
    pub fn registers(&self) -> Registers {
        let flag = |name: &str| self.latest.flags.get(name).copied().unwrap_or(false);
        let mut regs = Registers {
            pc: self.latest.pc,
            a: self.latest.a,
            x: self.latest.x,
            y: self.latest.y,
            s: self.latest.s,
            ..Registers::default()
        };
        regs.p.set_c(flag("C"));
        regs.p.set_z(flag("Z"));
        regs.p.set_i(flag("I"));
        regs.p.set_d(flag("D"));
        regs.p.set_b(flag("B"));
        regs.p.set_v(flag("V"));
        regs.p.set_n(flag("N"));
        regs
    }
}

impl Debugger for TraceDebugger {
    fn break_on_started(&mut self) -> bool {
        self.events.push(Event::Started);
        self.flags.started
    }
    fn break_on_next_instruction_ready(&mut self, pc: u16) -> bool {
        self.events.push(Event::NextInstruction(pc));
        false
    }
    fn break_after_instruction(&mut self) -> bool {
        self.events.push(Event::AfterInstruction);
        self.flags.step
    }
    fn break_on_reset(&mut self) -> bool {
        self.events.push(Event::Reset);
        self.flags.reset
    }
    fn break_on_nmi(&mut self) -> bool {
        self.events.push(Event::Nmi);
        self.flags.nmi
    }
    fn break_on_interrupt(&mut self) -> bool {
        self.events.push(Event::Irq);
        self.flags.irq
    }
    fn break_on_break(&mut self) -> bool {
        self.events.push(Event::Break);
        self.flags.break_instruction
    }
    fn break_on_bus_address_changed(&mut self, addr: u16) -> bool {
        self.events.push(Event::BusAddressChanged(addr));
        self.bus_breakpoints.contains(&addr)
    }
    fn report_register_u8(&mut self, name: &str, value: u8) {
        match name {
            "A" => self.latest.a = value,
            "X" => self.latest.x = value,
            "Y" => self.latest.y = value,
            "S" => self.latest.s = value,
            _ => {}
        }
    }
    fn report_register_u16(&mut self, name: &str, value: u16) {
        if name == "PC" {
            self.latest.pc = value;
        }
    }
    fn report_register_flag(&mut self, name: &str, value: bool) {
        self.latest.flags.insert(name.to_string(), value);
    }
    fn report_address_write(&mut self, addr: u16, data: u8) {
        self.events.push(Event::Write(addr, data));
    }
    fn report_nmi_line(&mut self, value: bool) {
        self.latest.nmi = value;
    }
    fn report_irq_line(&mut self, value: bool) {
        self.latest.irq = value;
    }
    fn report_reset_line(&mut self, value: bool) {
        self.latest.reset = value;
    }
    fn tick(&mut self) {
        self.events.push(Event::Tick);
    }
}
