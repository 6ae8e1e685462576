//! Top-level Nintendo 64 system: CPU, bus, and the master clock.
//!
//! Grounded on `emu-amiga::Amiga`'s shape (owns its CPU and bus directly,
//! drives them with a plain `while clock < target { tick() }` loop rather
//! than a generic `Tickable` abstraction).

use cpu_vr4300::{CoreError, Cpu};
use emu_core::MasterClock;

use crate::bus::N64Bus;
use crate::cartridge::{Cartridge, Ipl};
use crate::rcp::FramebufferFormat;

/// VR4300 CPU clock, 93.75 MHz (N64's actual system clock).
pub const CPU_CLOCK_HZ: u64 = 93_750_000;

/// NTSC frame rate; used only to size [`N64::run_frame`]'s default tick
/// budget, not to pace real time.
const FRAMES_PER_SECOND: u64 = 60;

pub struct N64 {
    cpu: Cpu,
    bus: N64Bus,
    clock: MasterClock,
    master_clock: u64,
    frame_count: u64,
}

impl N64 {
    #[must_use]
    pub fn new() -> Self {
        let clock = MasterClock::new(CPU_CLOCK_HZ);
        let mut cpu = Cpu::new();
        cpu.schedule_vi_interrupt(clock.ticks_per_frame(FRAMES_PER_SECOND).get());
        N64 { cpu, bus: N64Bus::new(), clock, master_clock: 0, frame_count: 0 }
    }

    pub fn load_cartridge(&mut self, data: &[u8]) -> Result<(), CoreError> {
        let cart = Cartridge::from_bytes(data)?;
        self.bus.load_rom(cart.rom())
    }

    pub fn load_ipl(&mut self, data: &[u8]) -> Result<(), CoreError> {
        let ipl = Ipl::from_bytes(data)?;
        self.bus.load_ipl(ipl.bytes())
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        cpu_vr4300::CpuBus::reset(&mut self.bus);
        self.master_clock = 0;
    }

    pub fn tick(&mut self) -> Result<(), CoreError> {
        self.cpu.tick(&mut self.bus)?;
        self.master_clock += 1;
        Ok(())
    }

    /// Runs one frame's worth of CPU ticks, stopping early on the first
    /// host error (a malformed physical address, an oversized image, and
    /// so on — never an architectural exception, which `tick` absorbs).
    pub fn run_frame(&mut self) -> Result<u64, CoreError> {
        self.frame_count += 1;
        let start = self.master_clock;
        let target = start + self.clock.ticks_per_frame(FRAMES_PER_SECOND).get();
        while self.master_clock < target {
            self.tick()?;
        }
        Ok(self.master_clock - start)
    }

    #[must_use]
    pub fn framebuffer(&self) -> (&[u8], u32, u32, FramebufferFormat) {
        self.bus.framebuffer()
    }

    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &N64Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut N64Bus {
        &mut self.bus
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for N64 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_machine_starts_at_reset_pc() {
        let n64 = N64::new();
        assert_eq!(n64.cpu().instructions_retired(), 0);
    }

    #[test]
    fn oversized_cartridge_is_rejected_before_touching_the_bus() {
        let mut n64 = N64::new();
        let huge = vec![0u8; crate::cartridge::MAX_ROM_SIZE + 1];
        assert_eq!(n64.load_cartridge(&huge).unwrap_err(), CoreError::ImageTooLarge);
    }
}
