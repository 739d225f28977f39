//! Interrupt line schedule.
//!
//! ```yaml
//! 100: irq
//! 140: irq_off
//! 500: nmi
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use crate::bus::SystemBus;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Irq,
    IrqOff,
    Nmi,
    NmiOff,
    Reset,
    ResetOff,
}

impl Action {
    pub fn apply(&self, bus: &mut SystemBus) {
        match self {
            Action::Irq => bus.irq_line = true,
            Action::IrqOff => bus.irq_line = false,
            Action::Nmi => bus.nmi_line = true,
            Action::NmiOff => bus.nmi_line = false,
            Action::Reset => bus.reset = true,
            Action::ResetOff => bus.reset = false,
        }
    }
}

/// Line changes keyed by the tick they happen before.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Schedule(BTreeMap<u64, Action>);

impl Schedule {
    pub fn load(path: &str) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::ConfigOpen(path.to_string(), e))?;
        serde_yaml::from_reader(BufReader::new(file))
            .map_err(|e| Error::ConfigParse(path.to_string(), e))
    }

    /// Parses an inline description; errors name `<inline>` as the source.
    pub fn parse(text: &str) -> Result<Self, Error> {
        serde_yaml::from_str(text).map_err(|e| Error::ConfigParse("<inline>".to_string(), e))
    }

    pub fn get(&self, time: u64) -> Option<Action> {
        self.0.get(&time).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_schedule() {
        let schedule = Schedule::parse("10: irq\n20: irq_off\n30: reset_off\n")
            .unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.get(10), Some(Action::Irq));
        assert_eq!(schedule.get(20), Some(Action::IrqOff));
        assert_eq!(schedule.get(30), Some(Action::ResetOff));
        assert_eq!(schedule.get(11), None);
    }

    #[test]
    fn unknown_action() {
        assert!(matches!(
            Schedule::parse("10: fire\n"),
            Err(Error::ConfigParse(source, _)) if source == "<inline>"
        ));
    }

    #[test]
    fn actions_drive_lines() {
        let mut bus = SystemBus::new();
        Action::Nmi.apply(&mut bus);
        Action::Reset.apply(&mut bus);
        assert!(bus.nmi_line && bus.reset);
        Action::NmiOff.apply(&mut bus);
        assert!(!bus.nmi_line && bus.reset);
    }
}
