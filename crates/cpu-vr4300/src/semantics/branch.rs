//! Branches and jumps.
//!
//! Branch targets are computed from the *live* program counter rather than
//! a snapshot: by the time EX runs for a branch, IC has already advanced
//! `pc` twice (once for the branch itself, once for its delay slot), so
//! `pc - 4 + (simm << 2)` lands on the correct target. See SPEC_FULL §4.E.

use crate::errors::CoreError;
use crate::pipeline::{ExDc, RfEx};
use crate::registers::Registers;
use crate::word::Word;

fn branch_target(regs: &Registers, rfex: &RfEx) -> u64 {
    let offset = rfex.instruction.simmediate() << 2;
    (regs.pc as i64 - 4 + offset) as u64
}

fn take(regs: &mut Registers, rfex: &RfEx) -> ExDc {
    regs.pc = branch_target(regs, rfex);
    ExDc::none()
}

/// `likely` branches suppress their delay slot when not taken.
fn not_taken(likely: bool) -> ExDc {
    let mut result = ExDc::none();
    result.suppress_delay_slot = likely;
    result
}

pub fn beq(regs: &mut Registers, rfex: &RfEx, invert: bool, likely: bool) -> Result<ExDc, CoreError> {
    let equal = rfex.fetched_rs.ud() == rfex.fetched_rt.ud();
    let condition = if invert { !equal } else { equal };
    Ok(if condition { take(regs, rfex) } else { not_taken(likely) })
}

pub fn blez(regs: &mut Registers, rfex: &RfEx, likely: bool) -> Result<ExDc, CoreError> {
    let condition = rfex.fetched_rs.d() <= 0;
    Ok(if condition { take(regs, rfex) } else { not_taken(likely) })
}

pub fn bgtz(regs: &mut Registers, rfex: &RfEx, likely: bool) -> Result<ExDc, CoreError> {
    let condition = rfex.fetched_rs.d() > 0;
    Ok(if condition { take(regs, rfex) } else { not_taken(likely) })
}

pub fn j(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let upper = (regs.pc as u32) & 0xF000_0000;
    regs.pc = u64::from(upper | (rfex.instruction.target() << 2));
    Ok(ExDc::none())
}

pub fn jal(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let link = regs.pc;
    let upper = (regs.pc as u32) & 0xF000_0000;
    regs.pc = u64::from(upper | (rfex.instruction.target() << 2));
    regs.set_gpr(31, Word::from_u64(link));
    Ok(ExDc::none())
}

pub fn jr(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    regs.pc = rfex.fetched_rs.ud() & 0xFFFF_FFFF;
    Ok(ExDc::none())
}

pub fn jalr(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let link = regs.pc;
    let target = rfex.fetched_rs.ud() & 0xFFFF_FFFF;
    let dest = rfex.instruction.rd();
    let dest = if dest == 0 { 31 } else { dest };
    regs.pc = target;
    regs.set_gpr(dest, Word::from_u64(link));
    Ok(ExDc::none())
}
