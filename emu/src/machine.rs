use crate::bus::SystemBus;
use crate::cpu::Cpu;
use crate::debugger::Debugger;
use crate::schedule::Schedule;

/// CPU, bus and debugger, clocked together.
pub struct Machine<D: Debugger> {
    pub bus: SystemBus,
    pub cpu: Cpu,
    pub debugger: D,
}

impl<D: Debugger> Machine<D> {
    pub fn new(bus: SystemBus, debugger: D) -> Self {
        Machine {
            bus,
            cpu: Cpu::new(),
            debugger,
        }
    }

    /// Powers the devices, then the CPU. Returns `true` when the debugger
    /// wants to halt before the first tick.
    pub fn powerup(&mut self) -> bool {
        self.bus.powerup();
        self.cpu.powerup(&mut self.bus);
        self.report_cpu_status();
        self.debugger.break_on_started()
    }

    /// One clock: devices first, then the CPU.
    pub fn tick(&mut self) -> bool {
        self.bus.tick();
        let halt = self.cpu.tick(&mut self.bus, &mut self.debugger);
        halt || self.bus.break_requested()
    }

    /// Ticks until something halts or `limit` ticks have run, applying
    /// `schedule` before each tick. Returns the number of ticks run.
    pub fn run(&mut self, limit: Option<u64>, schedule: &Schedule) -> u64 {
        let mut time = 0;
        while limit.map_or(true, |limit| time < limit) {
            if let Some(action) = schedule.get(time) {
                action.apply(&mut self.bus);
            }
            let halt = self.tick();
            self.debugger.tick();
            time += 1;
            if halt {
                break;
            }
        }
        time
    }

    pub fn set_reset(&mut self, on: bool) {
        self.bus.reset = on;
    }

    pub fn set_nmi(&mut self, on: bool) {
        self.bus.nmi_line = on;
    }

    pub fn set_irq(&mut self, on: bool) {
        self.bus.irq_line = on;
    }

    pub fn toggle_reset(&mut self) {
        self.bus.reset = !self.bus.reset;
    }

    pub fn toggle_nmi(&mut self) {
        self.bus.nmi_line = !self.bus.nmi_line;
    }

    pub fn toggle_irq(&mut self) {
        self.bus.irq_line = !self.bus.irq_line;
    }

    pub fn report_cpu_status(&mut self) {
        self.cpu.report_status(&self.bus, &mut self.debugger);
    }
}
