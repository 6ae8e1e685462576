//! Core traits and types for cycle-accurate emulation.
//!
//! Everything ticks at the master crystal frequency. All component timing
//! derives from this. No exceptions.

mod clock;
mod observable;
mod ticks;

pub use clock::MasterClock;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
