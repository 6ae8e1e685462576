//! Immediate and register-register arithmetic/logical instructions.
//!
//! All of these are EX-bypassed: the destination is written directly to
//! the register file and the emitted latch is `ExDc::none()`, so WB has
//! nothing left to do (see `WriteType::Register` in the reference design).

use super::SKIP_EXCEPTIONS;
use crate::errors::CoreError;
use crate::pipeline::{ExDc, RfEx};
use crate::registers::Registers;
use crate::word::Word;

pub enum ShiftKind {
    Ll,
    Rl,
    Ra,
}

pub enum LogicalOp {
    And,
    Or,
    Xor,
    Nor,
}

pub fn addi(regs: &mut Registers, rfex: &RfEx, unsigned: bool) -> Result<ExDc, CoreError> {
    let rs = rfex.fetched_rs.w0();
    let imm = rfex.instruction.simmediate() as i32;
    let (sum, overflow) = rs.overflowing_add(imm);
    if overflow && !unsigned && !SKIP_EXCEPTIONS {
        return Err(CoreError::IntegerOverflow);
    }
    let dest = rfex.instruction.rt();
    let mut v = Word::ZERO;
    v.set_w0_sign_extended(sum);
    regs.set_gpr(dest, v);
    Ok(ExDc::none())
}

pub fn andi(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let rs = rfex.fetched_rs.ud();
    let imm = u64::from(rfex.instruction.immediate());
    let mut v = Word::ZERO;
    v.set_ud(rs & imm);
    regs.set_gpr(rfex.instruction.rt(), v);
    Ok(ExDc::none())
}

pub fn ori(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let rs = rfex.fetched_rs.ud();
    let imm = u64::from(rfex.instruction.immediate());
    let mut v = Word::ZERO;
    v.set_ud(rs | imm);
    regs.set_gpr(rfex.instruction.rt(), v);
    Ok(ExDc::none())
}

pub fn xori(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let rs = rfex.fetched_rs.ud();
    let imm = u64::from(rfex.instruction.immediate());
    let mut v = Word::ZERO;
    v.set_ud(rs ^ imm);
    regs.set_gpr(rfex.instruction.rt(), v);
    Ok(ExDc::none())
}

pub fn lui(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let imm = i32::from(rfex.instruction.immediate() as i16) << 16;
    let mut v = Word::ZERO;
    v.set_w0_sign_extended(imm);
    regs.set_gpr(rfex.instruction.rt(), v);
    Ok(ExDc::none())
}

pub fn slti(regs: &mut Registers, rfex: &RfEx, signed: bool) -> Result<ExDc, CoreError> {
    let imm = rfex.instruction.simmediate();
    let less = if signed {
        rfex.fetched_rs.d() < imm
    } else {
        rfex.fetched_rs.ud() < (imm as u64)
    };
    regs.set_gpr(rfex.instruction.rt(), Word::from_u64(u64::from(less)));
    Ok(ExDc::none())
}

pub fn shift_imm(
    regs: &mut Registers,
    rfex: &RfEx,
    kind: ShiftKind,
    is64: bool,
) -> Result<ExDc, CoreError> {
    let sa = rfex.instruction.sa();
    apply_shift(regs, rfex, kind, sa, is64)
}

pub fn shift_imm32(regs: &mut Registers, rfex: &RfEx, kind: ShiftKind) -> Result<ExDc, CoreError> {
    let sa = rfex.instruction.sa() + 32;
    apply_shift(regs, rfex, kind, sa, true)
}

pub fn shift_var(
    regs: &mut Registers,
    rfex: &RfEx,
    kind: ShiftKind,
    is64: bool,
) -> Result<ExDc, CoreError> {
    let sa = (rfex.fetched_rs.uw0() & if is64 { 0x3F } else { 0x1F }) as u32;
    apply_shift(regs, rfex, kind, sa, is64)
}

fn apply_shift(
    regs: &mut Registers,
    rfex: &RfEx,
    kind: ShiftKind,
    sa: u32,
    is64: bool,
) -> Result<ExDc, CoreError> {
    let mut v = Word::ZERO;
    if is64 {
        let value = rfex.fetched_rt.ud();
        let result = match kind {
            ShiftKind::Ll => value.wrapping_shl(sa),
            ShiftKind::Rl => value.wrapping_shr(sa),
            ShiftKind::Ra => ((value as i64).wrapping_shr(sa)) as u64,
        };
        v.set_ud(result);
    } else {
        let value = rfex.fetched_rt.uw0();
        let result = match kind {
            ShiftKind::Ll => value.wrapping_shl(sa),
            ShiftKind::Rl => value.wrapping_shr(sa),
            ShiftKind::Ra => ((value as i32).wrapping_shr(sa)) as u32,
        };
        v.set_w0_sign_extended(result as i32);
    }
    regs.set_gpr(rfex.instruction.rd(), v);
    Ok(ExDc::none())
}

pub fn add(regs: &mut Registers, rfex: &RfEx, unsigned: bool) -> Result<ExDc, CoreError> {
    let rs = rfex.fetched_rs.w0();
    let rt = rfex.fetched_rt.w0();
    let (sum, overflow) = rs.overflowing_add(rt);
    if overflow && !unsigned && !SKIP_EXCEPTIONS {
        return Err(CoreError::IntegerOverflow);
    }
    let mut v = Word::ZERO;
    v.set_w0_sign_extended(sum);
    regs.set_gpr(rfex.instruction.rd(), v);
    Ok(ExDc::none())
}

pub fn sub(regs: &mut Registers, rfex: &RfEx, unsigned: bool) -> Result<ExDc, CoreError> {
    let rs = rfex.fetched_rs.w0();
    let rt = rfex.fetched_rt.w0();
    let (diff, overflow) = rs.overflowing_sub(rt);
    if overflow && !unsigned && !SKIP_EXCEPTIONS {
        return Err(CoreError::IntegerOverflow);
    }
    let mut v = Word::ZERO;
    v.set_w0_sign_extended(diff);
    regs.set_gpr(rfex.instruction.rd(), v);
    Ok(ExDc::none())
}

pub fn logical(regs: &mut Registers, rfex: &RfEx, op: LogicalOp) -> Result<ExDc, CoreError> {
    let rs = rfex.fetched_rs.ud();
    let rt = rfex.fetched_rt.ud();
    let result = match op {
        LogicalOp::And => rs & rt,
        LogicalOp::Or => rs | rt,
        LogicalOp::Xor => rs ^ rt,
        LogicalOp::Nor => !(rs | rt),
    };
    regs.set_gpr(rfex.instruction.rd(), Word::from_u64(result));
    Ok(ExDc::none())
}

pub fn slt(regs: &mut Registers, rfex: &RfEx, signed: bool) -> Result<ExDc, CoreError> {
    let less = if signed {
        rfex.fetched_rs.d() < rfex.fetched_rt.d()
    } else {
        rfex.fetched_rs.ud() < rfex.fetched_rt.ud()
    };
    regs.set_gpr(rfex.instruction.rd(), Word::from_u64(u64::from(less)));
    Ok(ExDc::none())
}

pub fn tge(rfex: &RfEx) -> Result<ExDc, CoreError> {
    if rfex.fetched_rs.d() >= rfex.fetched_rt.d() {
        return Err(CoreError::Trap);
    }
    Ok(ExDc::none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, InstructionKind};

    fn rfex_with(rs: Word, rt: Word, instr: u32) -> RfEx {
        RfEx {
            instruction: Instruction(instr),
            kind: InstructionKind::Addi,
            fetched_rs: rs,
            fetched_rt: rt,
            fetched_rs_i: Instruction(instr).rs(),
            fetched_rt_i: Instruction(instr).rt(),
        }
    }

    #[test]
    fn addi_overflow_leaves_register_untouched() {
        let mut regs = Registers::new();
        let mut rs = Word::ZERO;
        rs.set_w0(0x7FFF_FFFF);
        // ADDI r3, r2, 1
        let instr = (0x08 << 26) | (2 << 21) | (3 << 16) | 1;
        let rfex = rfex_with(rs, Word::ZERO, instr);
        let err = addi(&mut regs, &rfex, false).unwrap_err();
        assert_eq!(err, CoreError::IntegerOverflow);
        assert_eq!(regs.gpr(3).ud(), 0);
    }

    #[test]
    fn addiu_overflow_wraps_without_error() {
        let mut regs = Registers::new();
        let mut rs = Word::ZERO;
        rs.set_w0(0x7FFF_FFFF);
        let instr = (0x09 << 26) | (2 << 21) | (3 << 16) | 1;
        let rfex = rfex_with(rs, Word::ZERO, instr);
        addi(&mut regs, &rfex, true).unwrap();
        assert_eq!(regs.gpr(3).d(), i64::from(i32::MIN));
    }

    #[test]
    fn lui_then_ori_produces_sign_extended_value() {
        let mut regs = Registers::new();
        let lui_instr = (0x0F << 26) | (1 << 16) | 0x1234;
        let rfex = rfex_with(Word::ZERO, Word::ZERO, lui_instr);
        lui(&mut regs, &rfex).unwrap();
        assert_eq!(regs.gpr(1).ud(), 0xFFFF_FFFF_1234_0000);

        let ori_instr = (0x0D << 26) | (1 << 21) | (1 << 16) | 0x5678;
        let rfex = rfex_with(regs.gpr(1), Word::ZERO, ori_instr);
        ori(&mut regs, &rfex).unwrap();
        assert_eq!(regs.gpr(1).ud(), 0xFFFF_FFFF_1234_5678);
    }
}
