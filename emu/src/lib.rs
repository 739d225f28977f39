pub mod bus;
pub mod config;
pub mod cpu;
pub mod debugger;
pub mod device;
pub mod error;
pub mod machine;
pub mod schedule;

pub use bus::SystemBus;
pub use cpu::Cpu;
pub use error::Error;
pub use machine::Machine;
