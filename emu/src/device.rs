//! Bus devices.

use std::collections::VecDeque;

use crate::error::Error;

/// Something attached to the system bus.
///
/// Every access is broadcast, so a device checks the address itself and
/// answers `None` to reads outside its range.
pub trait Device {
    fn name(&self) -> String;
    fn read(&mut self, addr: u16) -> Option<u8>;
    fn write(&mut self, addr: u16, data: u8);
    fn tick(&mut self) {}
    fn powerup(&mut self) {}
    fn irq(&self) -> bool {
        false
    }
    fn nmi(&self) -> bool {
        false
    }
}

/// Inclusive address range of a memory device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub from: u16,
    pub to: u16,
}

impl Span {
    pub fn new(from: u16, to: u16) -> Result<Self, Error> {
        if from > to {
            return Err(Error::RangeInverted(from, to));
        }
        Ok(Span { from, to })
    }

    pub fn len(&self) -> usize {
        (self.to - self.from) as usize + 1
    }

    pub fn offset(&self, addr: u16) -> Option<usize> {
        (self.from..=self.to)
            .contains(&addr)
            .then(|| (addr - self.from) as usize)
    }
}

// ----------------------------------------------------------------------------
// RAM

pub struct Ram {
    span: Span,
    data: Vec<u8>,
}

impl Ram {
    pub fn new(from: u16, to: u16) -> Result<Self, Error> {
        let span = Span::new(from, to)?;
        Ok(Ram {
            span,
            data: vec![0; span.len()],
        })
    }
}

impl Device for Ram {
    fn name(&self) -> String {
        format!("RAM ${:04X}-${:04X}", self.span.from, self.span.to)
    }

    fn read(&mut self, addr: u16) -> Option<u8> {
        self.span.offset(addr).map(|i| self.data[i])
    }

    fn write(&mut self, addr: u16, data: u8) {
        if let Some(i) = self.span.offset(addr) {
            self.data[i] = data;
        }
    }
}

// ----------------------------------------------------------------------------
// ROM

pub struct Rom {
    span: Span,
    data: Vec<u8>,
}

impl Rom {
    pub fn new(from: u16, to: u16) -> Result<Self, Error> {
        let span = Span::new(from, to)?;
        Ok(Rom {
            span,
            data: vec![0; span.len()],
        })
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Out-of-range addresses are ignored.
    pub fn program(&mut self, addr: u16, data: u8) {
        if let Some(i) = self.span.offset(addr) {
            self.data[i] = data;
        }
    }

    /// Copies `image` in, starting `offset` bytes into the ROM.
    pub fn load(&mut self, image: &[u8], offset: usize) -> Result<(), Error> {
        if offset + image.len() > self.data.len() {
            return Err(Error::ImageTooLarge {
                size: image.len(),
                from: self.span.from,
                to: self.span.to,
            });
        }
        self.data[offset..offset + image.len()].copy_from_slice(image);
        Ok(())
    }
}

impl Device for Rom {
    fn name(&self) -> String {
        format!("ROM ${:04X}-${:04X}", self.span.from, self.span.to)
    }

    fn read(&mut self, addr: u16) -> Option<u8> {
        self.span.offset(addr).map(|i| self.data[i])
    }

    fn write(&mut self, _addr: u16, _data: u8) {}
}

// ----------------------------------------------------------------------------
// Serial

/// Character I/O on two addresses. Writing `tx` transmits a byte, reading
/// `rx` takes the next received byte or `0xFF` when there is none.
pub struct Serial {
    tx: u16,
    rx: u16,
    input: VecDeque<u8>,
    on_transmit: Option<Box<dyn FnMut(u8)>>,
}

impl Serial {
    pub const NONE: u8 = 0xFF;

    pub fn new(tx: u16, rx: u16) -> Self {
        Serial {
            tx,
            rx,
            input: VecDeque::new(),
            on_transmit: None,
        }
    }

    pub fn on_transmit(mut self, f: impl FnMut(u8) + 'static) -> Self {
        self.on_transmit = Some(Box::new(f));
        self
    }

    pub fn receive(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }
}

impl Device for Serial {
    fn name(&self) -> String {
        format!("Serial TX=${:04X} RX=${:04X}", self.tx, self.rx)
    }

    fn read(&mut self, addr: u16) -> Option<u8> {
        (addr == self.rx).then(|| self.input.pop_front().unwrap_or(Self::NONE))
    }

    fn write(&mut self, addr: u16, data: u8) {
        if addr == self.tx {
            if let Some(f) = self.on_transmit.as_mut() {
                f(data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn ram_claims_its_range() {
        let mut ram = Ram::new(0x0200, 0x02FF).unwrap_or_else(|e| panic!("{}", e));
        ram.write(0x0200, 0x12);
        ram.write(0x0300, 0x34);
        assert_eq!(ram.read(0x0200), Some(0x12));
        assert_eq!(ram.read(0x02FF), Some(0x00));
        assert_eq!(ram.read(0x0300), None);
        assert_eq!(ram.read(0x01FF), None);
    }

    #[test]
    fn rom_ignores_writes() {
        let mut rom = Rom::new(0xFF00, 0xFFFF).unwrap_or_else(|e| panic!("{}", e));
        rom.program(0xFFFC, 0x00);
        rom.program(0xFFFD, 0xC0);
        rom.write(0xFFFC, 0xAA);
        assert_eq!(rom.read(0xFFFC), Some(0x00));
        assert_eq!(rom.read(0xFFFD), Some(0xC0));
    }

    #[test]
    fn rom_load() {
        let mut rom = Rom::new(0xFF00, 0xFFFF).unwrap_or_else(|e| panic!("{}", e));
        assert!(rom.load(&[1, 2, 3], 0xFD).is_ok());
        assert_eq!(rom.read(0xFFFF), Some(3));
        assert!(matches!(
            rom.load(&[1, 2, 3], 0xFE),
            Err(Error::ImageTooLarge { size: 3, .. })
        ));
    }

    #[test]
    fn inverted_range() {
        assert!(matches!(Ram::new(0x10, 0x0F), Err(Error::RangeInverted(0x10, 0x0F))));
    }

    #[test]
    fn serial_round_trip() {
        let out = Rc::new(RefCell::new(vec![]));
        let sink = out.clone();
        let mut serial = Serial::new(0xE000, 0xE001).on_transmit(move |b| sink.borrow_mut().push(b));
        serial.receive(b"hi");

        serial.write(0xE000, b'A');
        serial.write(0xE001, b'B');
        assert_eq!(*out.borrow(), b"A".to_vec());

        assert_eq!(serial.read(0xE001), Some(b'h'));
        assert_eq!(serial.read(0xE001), Some(b'i'));
        assert_eq!(serial.read(0xE001), Some(Serial::NONE));
        assert_eq!(serial.read(0xE000), None);
    }
}
