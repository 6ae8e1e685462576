//! Crate-wide error taxonomy.
//!
//! No derive-macro error crate is used, matching the rest of the workspace:
//! the set of failure kinds is small and fixed, so a hand-written `Display`
//! reads better than generated boilerplate.

use std::fmt;

/// Everything that can interrupt a [`crate::cpu::Cpu::tick`] call.
///
/// Architectural exceptions (the first group) are normally handled inside
/// `tick` and never escape as an `Err`; they are part of this enum so the
/// pipeline's internal plumbing has one error type to thread through `?`.
/// Host errors (the second group) do escape and the caller should stop
/// ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Signed 32-bit add/sub overflowed; ALU instructions leave the
    /// destination register unchanged.
    IntegerOverflow,
    /// A load or store address was not aligned to its access width.
    AddressError,
    /// The decoder produced `ERROR` for this word.
    ReservedInstruction,
    /// A trap instruction's condition held.
    Trap,
    /// A coprocessor instruction was issued while that coprocessor is
    /// marked unusable in `Status`.
    CoprocessorUnusable,
    /// A TLB-mapped segment was addressed; TLB support is out of scope.
    TlbMiss,
    /// No page-table entry, MMIO match, or region fallback covers this
    /// physical address.
    BadAddress,
    /// The decoded kind has no EX-stage implementation yet.
    InstructionNotImplemented,
    /// A loaded ROM/IPL image exceeds its maximum size.
    ImageTooLarge,
}

impl CoreError {
    /// True for the first group above: conditions `Cpu::tick` catches and
    /// resolves internally rather than surfacing to its caller.
    #[must_use]
    pub fn is_architectural(self) -> bool {
        matches!(
            self,
            CoreError::IntegerOverflow
                | CoreError::AddressError
                | CoreError::ReservedInstruction
                | CoreError::Trap
                | CoreError::CoprocessorUnusable
                | CoreError::TlbMiss
        )
    }

    /// The Cause register `ExcCode` value an architectural exception sets
    /// (VR4300 manual Table 6-1); `None` for the host-error group.
    #[must_use]
    pub fn exc_code(self) -> Option<u32> {
        Some(match self {
            CoreError::AddressError => 4, // AdEL; loads and stores are not distinguished here
            CoreError::TlbMiss => 2,      // TLBL
            CoreError::CoprocessorUnusable => 11, // CpU
            CoreError::ReservedInstruction => 10, // RI
            CoreError::IntegerOverflow => 12, // Ov
            CoreError::Trap => 13,        // Tr
            _ => return None,
        })
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::IntegerOverflow => write!(f, "integer overflow"),
            CoreError::AddressError => write!(f, "address error: misaligned access"),
            CoreError::ReservedInstruction => write!(f, "reserved instruction"),
            CoreError::Trap => write!(f, "trap"),
            CoreError::CoprocessorUnusable => write!(f, "coprocessor unusable"),
            CoreError::TlbMiss => write!(f, "tlb miss (unimplemented)"),
            CoreError::BadAddress => write!(f, "bad physical address"),
            CoreError::InstructionNotImplemented => write!(f, "instruction not implemented"),
            CoreError::ImageTooLarge => write!(f, "image too large"),
        }
    }
}

impl std::error::Error for CoreError {}
