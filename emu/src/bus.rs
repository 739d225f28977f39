use crate::debugger::Debugger;
use crate::device::Device;

/// Devices plus the three interrupt lines.
#[derive(Default)]
pub struct SystemBus {
    devices: Vec<Box<dyn Device>>,
    pub irq_line: bool,
    pub nmi_line: bool,
    pub reset: bool,
    break_addr_written: bool,
}

impl SystemBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, device: Box<dyn Device>) {
        self.devices.push(device);
    }

    pub fn devices(&self) -> impl Iterator<Item = &dyn Device> {
        self.devices.iter().map(|d| d.as_ref())
    }

    pub fn irq(&self) -> bool {
        self.irq_line || self.devices.iter().any(|d| d.irq())
    }

    pub fn nmi(&self) -> bool {
        self.nmi_line || self.devices.iter().any(|d| d.nmi())
    }

    /// Last device to answer wins, `0x00` when nobody does.
    pub fn read(&mut self, addr: u16) -> u8 {
        let mut value = None;
        for device in self.devices.iter_mut() {
            if let Some(v) = device.read(addr) {
                value = Some(v);
            }
        }
        value.unwrap_or(0x00)
    }

    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub fn write(&mut self, addr: u16, data: u8, dbg: &mut dyn Debugger) {
        dbg.report_address_write(addr, data);
        for device in self.devices.iter_mut() {
            device.write(addr, data);
        }
        self.break_addr_written |= dbg.break_on_bus_address_changed(addr);
    }

    /// Ticks every device and clears the bus breakpoint latch.
    pub fn tick(&mut self) {
        self.break_addr_written = false;
        for device in self.devices.iter_mut() {
            device.tick();
        }
    }

    /// Whether a write since the last tick hit a bus breakpoint.
    pub fn break_requested(&self) -> bool {
        self.break_addr_written
    }

    pub fn powerup(&mut self) {
        for device in self.devices.iter_mut() {
            device.powerup();
        }
    }
}
