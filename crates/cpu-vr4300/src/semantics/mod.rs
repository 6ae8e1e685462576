//! EX-stage instruction semantics, one module per family.
//!
//! Every function here runs purely against register snapshots taken at RF
//! and the live register file (for writes); none of them touch the bus —
//! the only bus-facing concerns (loads, stores, instruction fetch) are
//! staged as [`ExDc`] records and resolved by the pipeline's DC/WB stages.

mod arith;
mod branch;
mod cp0_move;
mod memory;

use crate::errors::CoreError;
use crate::instruction::InstructionKind;
use crate::pipeline::{ExDc, RfEx};
use crate::registers::Registers;

pub const SKIP_EXCEPTIONS: bool = false;

/// Dispatches a decoded instruction to its EX-stage behavior.
pub fn execute(regs: &mut Registers, rfex: &RfEx) -> Result<ExDc, CoreError> {
    use InstructionKind::*;
    match rfex.kind {
        Nop => Ok(ExDc::none()),
        Error => Err(CoreError::ReservedInstruction),

        Addi => arith::addi(regs, rfex, false),
        Addiu => arith::addi(regs, rfex, true),
        Andi => arith::andi(regs, rfex),
        Ori => arith::ori(regs, rfex),
        Xori => arith::xori(regs, rfex),
        Lui => arith::lui(regs, rfex),
        Slti => arith::slti(regs, rfex, true),
        Sltiu => arith::slti(regs, rfex, false),

        Sll => arith::shift_imm(regs, rfex, arith::ShiftKind::Ll, false),
        Srl => arith::shift_imm(regs, rfex, arith::ShiftKind::Rl, false),
        Sra => arith::shift_imm(regs, rfex, arith::ShiftKind::Ra, false),
        Sllv => arith::shift_var(regs, rfex, arith::ShiftKind::Ll, false),
        Srlv => arith::shift_var(regs, rfex, arith::ShiftKind::Rl, false),
        Srav => arith::shift_var(regs, rfex, arith::ShiftKind::Ra, false),
        Dsllv => arith::shift_var(regs, rfex, arith::ShiftKind::Ll, true),
        Dsll32 => arith::shift_imm32(regs, rfex, arith::ShiftKind::Ll),
        Dsra32 => arith::shift_imm32(regs, rfex, arith::ShiftKind::Ra),

        Add => arith::add(regs, rfex, false),
        Addu => arith::add(regs, rfex, true),
        Sub => arith::sub(regs, rfex, false),
        Subu => arith::sub(regs, rfex, true),
        And => arith::logical(regs, rfex, arith::LogicalOp::And),
        Or => arith::logical(regs, rfex, arith::LogicalOp::Or),
        Xor => arith::logical(regs, rfex, arith::LogicalOp::Xor),
        Nor => arith::logical(regs, rfex, arith::LogicalOp::Nor),
        Slt => arith::slt(regs, rfex, true),
        Sltu => arith::slt(regs, rfex, false),
        Tge => arith::tge(rfex),

        Beq => branch::beq(regs, rfex, false, false),
        Bne => branch::beq(regs, rfex, true, false),
        Beql => branch::beq(regs, rfex, false, true),
        Bnel => branch::beq(regs, rfex, true, true),
        Blez => branch::blez(regs, rfex, false),
        Blezl => branch::blez(regs, rfex, true),
        Bgtz => branch::bgtz(regs, rfex, false),
        Bgtzl => branch::bgtz(regs, rfex, true),
        J => branch::j(regs, rfex),
        Jal => branch::jal(regs, rfex),
        Jr => branch::jr(regs, rfex),
        Jalr => branch::jalr(regs, rfex),

        Lb => memory::load(rfex, crate::bus::AccessType::Byte { signed: true }),
        Lbu => memory::load(rfex, crate::bus::AccessType::Byte { signed: false }),
        Lh => memory::load(rfex, crate::bus::AccessType::Half { signed: true }),
        Lhu => memory::load(rfex, crate::bus::AccessType::Half { signed: false }),
        Lw => memory::load(rfex, crate::bus::AccessType::Word { signed: true }),
        Lwu => memory::load(rfex, crate::bus::AccessType::Word { signed: false }),
        Ld => memory::load(rfex, crate::bus::AccessType::Double),
        Sb => memory::store(rfex, crate::bus::AccessType::Byte { signed: false }),
        Sh => memory::store(rfex, crate::bus::AccessType::Half { signed: false }),
        Sw => memory::store(rfex, crate::bus::AccessType::Word { signed: false }),
        Sd => memory::store(rfex, crate::bus::AccessType::Double),

        Cop0 => cp0_move::dispatch(regs, rfex),

        _ => Err(CoreError::InstructionNotImplemented),
    }
}
