//! Inter-stage latches.
//!
//! Each latch is an owned value consumed by the next stage in the same
//! tick (stages run WB, DC, EX, RF, IC — see [`crate::cpu::Cpu::tick`]).
//! No stage keeps a pointer into the register file past its own tick.

use crate::bus::AccessType;
use crate::instruction::{Instruction, InstructionKind};
use crate::word::Word;

/// What a pending or finalized write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Register(usize),
    Memory(u32),
}

/// Mirrors the reference hardware's `WriteType`. `Register` reaching WB is
/// a logic error: EX must have already bypassed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteType {
    #[default]
    None,
    Register,
    LateRegister,
    Mmu,
}

/// `IC -> RF`: the raw fetched instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcRf {
    pub instruction: Instruction,
}

impl IcRf {
    #[must_use]
    pub fn nop() -> Self {
        IcRf { instruction: Instruction(0) }
    }
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction(0)
    }
}

/// `RF -> EX`: decoded kind plus source-register snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct RfEx {
    pub instruction: Instruction,
    pub kind: InstructionKind,
    pub fetched_rs: Word,
    pub fetched_rt: Word,
    pub fetched_rs_i: usize,
    pub fetched_rt_i: usize,
}

impl Default for InstructionKind {
    fn default() -> Self {
        InstructionKind::Nop
    }
}

/// `EX -> DC`: a planned write, or a pending load to perform at DC.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExDc {
    pub write_type: WriteType,
    pub access: Option<AccessType>,
    pub dest: Option<Destination>,
    pub vaddr: u32,
    pub payload: u64,
    /// Set by a not-taken `*L` branch: the fetched delay-slot instruction
    /// must be discarded rather than executed.
    pub suppress_delay_slot: bool,
}

impl ExDc {
    #[must_use]
    pub fn none() -> Self {
        ExDc::default()
    }
}

/// `DC -> WB`: the finalized write after any pending load has resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct DcWb {
    pub write_type: WriteType,
    pub dest: Option<Destination>,
    pub access: Option<AccessType>,
    pub payload: u64,
}
