//! System Control Coprocessor bookkeeping beyond the MTC0/MFC0 move
//! instructions themselves: the free-running `Count` timer and the
//! `Cause`/`Status` interrupt bits the scheduler and MMIO side effects
//! touch.

use crate::registers::{Registers, CP0_CAUSE, CP0_COMPARE, CP0_COUNT};

/// Advances `Count` by one and reports whether it just matched `Compare`.
pub fn tick_count(regs: &mut Registers) -> bool {
    let count = regs.cp0[CP0_COUNT].uw0().wrapping_add(1);
    regs.cp0[CP0_COUNT].set_uw0(count);
    count == regs.cp0[CP0_COMPARE].uw0()
}

/// Sets Cause bit 0, the CPU-visible interrupt-pending bit.
pub fn raise_interrupt(regs: &mut Registers) {
    let cause = regs.cp0[CP0_CAUSE].uw0();
    regs.cp0[CP0_CAUSE].set_uw0(cause | 0x1);
}

/// Sets Cause bit 8, used by the VI event before it escalates to a
/// generic `Interrupt` scheduler event.
pub fn raise_vi_pending(regs: &mut Registers) {
    let cause = regs.cp0[CP0_CAUSE].uw0();
    regs.cp0[CP0_CAUSE].set_uw0(cause | (1 << 8));
}

/// Records an architectural exception's `ExcCode` in Cause bits 2..6.
/// Called in place of a real exception-vector transfer: this port absorbs
/// the exception and resumes rather than redirecting `pc` (see
/// `Cpu::ex_stage`).
pub fn raise_exception(regs: &mut Registers, exc_code: u32) {
    let cause = regs.cp0[CP0_CAUSE].uw0();
    let cleared = cause & !(0x1F << 2);
    regs.cp0[CP0_CAUSE].set_uw0(cleared | ((exc_code & 0x1F) << 2));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_match_is_reported_once() {
        let mut regs = Registers::new();
        regs.cp0[CP0_COMPARE].set_uw0(3);
        assert!(!tick_count(&mut regs));
        assert!(!tick_count(&mut regs));
        assert!(tick_count(&mut regs));
        assert!(!tick_count(&mut regs));
    }

    #[test]
    fn raise_exception_sets_exc_code_without_disturbing_other_cause_bits() {
        let mut regs = Registers::new();
        regs.cp0[CP0_CAUSE].set_uw0(1 << 8);
        raise_exception(&mut regs, 12);
        assert_eq!(regs.cp0[CP0_CAUSE].uw0(), (1 << 8) | (12 << 2));
        raise_exception(&mut regs, 10);
        assert_eq!(regs.cp0[CP0_CAUSE].uw0(), (1 << 8) | (10 << 2));
    }
}
