//! Nintendo 64 machine: CPU bus, RCP register file, cartridge loading, and
//! the top-level runner.

mod addresses;
pub mod bus;
pub mod cartridge;
mod machine;
pub mod rcp;

pub use bus::N64Bus;
pub use cartridge::{Cartridge, Ipl};
pub use machine::{N64, CPU_CLOCK_HZ};
pub use rcp::{FramebufferFormat, Rcp};
