//! Machine description.
//!
//! ```yaml
//! devices:
//!   - type: ram
//!     from: 0x0000
//!     to: 0x7FFF
//!   - type: rom
//!     from: 0x8000
//!     to: 0xFFFF
//!   - type: serial
//!     tx: 0xE000
//!     rx: 0xE001
//! debugger:
//!   brk: true
//!   breakpoints: [0x8010]
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};

use crate::bus::SystemBus;
use crate::debugger::{BreakFlags, ConsoleDebugger};
use crate::device::{Ram, Rom, Serial};
use crate::error::Error;

/// Size of the flat image written by the assembler.
pub const FULL_IMAGE: usize = 0x10000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeviceConfig {
    Ram {
        from: u16,
        to: u16,
    },
    /// Without an `image` of its own, the ROM holds the image given on the
    /// command line.
    Rom {
        from: u16,
        to: u16,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        offset: Option<usize>,
    },
    Serial {
        tx: u16,
        rx: u16,
        /// Text queued for the program to read.
        #[serde(default)]
        input: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggerConfig {
    #[serde(flatten)]
    pub flags: BreakFlags,
    pub breakpoints: Vec<u16>,
    pub bus_breakpoints: Vec<u16>,
    pub watches: Vec<u16>,
}

impl DebuggerConfig {
    pub fn console(&self) -> ConsoleDebugger {
        let mut dbg = ConsoleDebugger::new(self.flags.clone());
        self.breakpoints.iter().for_each(|&pc| dbg.add_breakpoint(pc));
        self.bus_breakpoints.iter().for_each(|&a| dbg.add_bus_breakpoint(a));
        self.watches.iter().for_each(|&a| dbg.add_watch(a));
        dbg
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceConfig>,
    #[serde(default)]
    pub debugger: DebuggerConfig,
}

/// 32 KiB of RAM under a 32 KiB ROM.
fn default_devices() -> Vec<DeviceConfig> {
    vec![
        DeviceConfig::Ram {
            from: 0x0000,
            to: 0x7FFF,
        },
        DeviceConfig::Rom {
            from: 0x8000,
            to: 0xFFFF,
            image: None,
            offset: None,
        },
    ]
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            devices: default_devices(),
            debugger: DebuggerConfig::default(),
        }
    }
}

impl MachineConfig {
    pub fn load(path: &str) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::ConfigOpen(path.to_string(), e))?;
        serde_yaml::from_reader(BufReader::new(file))
            .map_err(|e| Error::ConfigParse(path.to_string(), e))
    }

    /// Parses an inline description; errors name `<inline>` as the source.
    pub fn parse(text: &str) -> Result<Self, Error> {
        serde_yaml::from_str(text).map_err(|e| Error::ConfigParse("<inline>".to_string(), e))
    }

    /// Builds the bus, loading `image` into every ROM without an image of
    /// its own.
    pub fn build(&self, image: Option<&[u8]>) -> Result<SystemBus, Error> {
        let mut bus = SystemBus::new();
        for device in &self.devices {
            match device {
                DeviceConfig::Ram { from, to } => bus.attach(Box::new(Ram::new(*from, *to)?)),
                DeviceConfig::Rom {
                    from,
                    to,
                    image: path,
                    offset,
                } => {
                    let mut rom = Rom::new(*from, *to)?;
                    let own = path.as_deref().map(load_image).transpose()?;
                    if let Some(data) = own.as_deref().or(image) {
                        place(&mut rom, data, *offset)?;
                    }
                    bus.attach(Box::new(rom));
                }
                DeviceConfig::Serial { tx, rx, input } => {
                    let mut serial = Serial::new(*tx, *rx).on_transmit(|b| {
                        print!("{}", b as char);
                        let _ = std::io::stdout().flush();
                    });
                    if let Some(text) = input {
                        serial.receive(text.as_bytes());
                    }
                    bus.attach(Box::new(serial));
                }
            }
        }
        Ok(bus)
    }
}

/// Loads `data` into `rom`. A full 64 KiB image contributes the slice the
/// ROM covers; anything shorter ends at the top of the ROM unless an offset
/// is given.
pub fn place(rom: &mut Rom, data: &[u8], offset: Option<usize>) -> Result<(), Error> {
    let span = rom.span();
    if data.len() == FULL_IMAGE && offset.is_none() {
        return rom.load(&data[span.from as usize..=span.to as usize], 0);
    }
    let offset = offset.unwrap_or_else(|| span.len().saturating_sub(data.len()));
    rom.load(data, offset)
}

pub fn load_image(path: &str) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| Error::ImageOpen(path.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Device;

    #[test]
    fn default_machine() {
        let config = MachineConfig::parse("{}").unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(config.devices, default_devices());
        assert!(!config.debugger.flags.step);
    }

    #[test]
    fn devices_from_yaml() {
        let config = MachineConfig::parse(
            "\
devices:
  - type: ram
    from: 0x0000
    to: 0x00FF
  - type: serial
    tx: 0xE000
    rx: 0xE001
    input: hi
debugger:
  brk: true
  breakpoints: [0x8010]
",
        )
        .unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(config.devices.len(), 2);
        assert_eq!(
            config.devices[1],
            DeviceConfig::Serial {
                tx: 0xE000,
                rx: 0xE001,
                input: Some("hi".to_string())
            }
        );
        assert!(config.debugger.flags.break_instruction);
        assert_eq!(config.debugger.breakpoints, vec![0x8010]);

        let mut bus = config.build(None).unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(bus.read(0xE001), b'h');
        assert_eq!(bus.devices().count(), 2);
    }

    #[test]
    fn short_image_is_right_aligned() {
        let mut bus = MachineConfig::default()
            .build(Some(&[0x00, 0x80]))
            .unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(bus.read_u16(0xFFFE), 0x8000);
        assert_eq!(bus.read(0x8000), 0x00);
    }

    #[test]
    fn full_image_is_sliced() {
        let mut image = vec![0u8; FULL_IMAGE];
        image[0x0010] = 0x11;
        image[0x8000] = 0xEA;
        let mut rom = Rom::new(0x8000, 0xFFFF).unwrap_or_else(|e| panic!("{}", e));
        assert!(place(&mut rom, &image, None).is_ok());
        assert_eq!(rom.read(0x8000), Some(0xEA));
    }

    #[test]
    fn oversized_image() {
        let mut rom = Rom::new(0xFF00, 0xFFFF).unwrap_or_else(|e| panic!("{}", e));
        let result = place(&mut rom, &[0u8; 0x101], None);
        assert!(matches!(result, Err(Error::ImageTooLarge { size: 0x101, .. })));
    }

    #[test]
    fn malformed_config() {
        assert!(matches!(
            MachineConfig::parse("devices:\n  - type: tape\n"),
            Err(Error::ConfigParse(source, _)) if source == "<inline>"
        ));
    }

    #[test]
    fn missing_config() {
        assert!(matches!(
            MachineConfig::load("/nonexistent/machine.yaml"),
            Err(Error::ConfigOpen(..))
        ));
    }
}
