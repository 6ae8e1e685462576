//! COP0 register moves (`MTC0`/`MFC0`).
//!
//! These share the primary opcode `COP0`; the sub-operation lives in the
//! bits that would be `rs` on an ordinary R-type instruction (the "fmt"
//! field of a coprocessor move). `0x00` is MFC0, `0x04` is MTC0.

use crate::errors::CoreError;
use crate::pipeline::ExDc;
use crate::pipeline::RfEx;
use crate::registers::Registers;
use crate::word::Word;

const MFC0: usize = 0x00;
const MTC0: usize = 0x04;

pub fn dispatch(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    match rfex.instruction.rs() {
        MTC0 => mtc0(regs, rfex),
        MFC0 => mfc0(regs, rfex),
        _ => Err(CoreError::InstructionNotImplemented),
    }
}

fn mtc0(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let rd = rfex.instruction.rd();
    let mut v = Word::ZERO;
    v.set_w0_sign_extended(rfex.fetched_rt.w0());
    regs.cp0[rd] = v;
    Ok(ExDc::none())
}

fn mfc0(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    let rd = rfex.instruction.rd();
    let mut v = Word::ZERO;
    v.set_w0_sign_extended(regs.cp0[rd].w0());
    regs.set_gpr(rfex.instruction.rt(), v);
    Ok(ExDc::none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, InstructionKind};

    #[test]
    fn mtc0_sign_extends_into_cp0() {
        let mut regs = Registers::new();
        let mut rt = Word::ZERO;
        rt.set_w0(-1);
        // MTC0 rt=r5 -> cp0 rd=12
        let instr = (0x10 << 26) | (MTC0 << 21) as u32 | (5 << 16) | (12 << 11);
        let rfex = RfEx {
            instruction: Instruction(instr),
            kind: InstructionKind::Cop0,
            fetched_rs: Word::ZERO,
            fetched_rt: rt,
            fetched_rs_i: 0,
            fetched_rt_i: 5,
        };
        dispatch(&mut regs, &rfex).unwrap();
        assert_eq!(regs.cp0[12].ud(), 0xFFFF_FFFF_FFFF_FFFF);
    }
}
