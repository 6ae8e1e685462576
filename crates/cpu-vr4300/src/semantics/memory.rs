//! Loads and stores. EX only computes the virtual address and stages a
//! latch; the actual bus access happens at DC (loads) or WB (stores).

use crate::bus::AccessType;
use crate::errors::CoreError;
use crate::pipeline::{Destination, ExDc, RfEx, WriteType};

pub fn load(rfex: &RfEx, access: AccessType) -> Result<ExDc, CoreError> {
    let vaddr = (rfex.fetched_rs.d() + rfex.instruction.simmediate()) as u32;
    if !aligned(vaddr, access) {
        return Err(CoreError::AddressError);
    }
    Ok(ExDc {
        write_type: WriteType::LateRegister,
        access: Some(access),
        dest: Some(Destination::Register(rfex.instruction.rt())),
        vaddr,
        payload: 0,
        suppress_delay_slot: false,
    })
}

pub fn store(rfex: &RfEx, access: AccessType) -> Result<ExDc, CoreError> {
    let vaddr = (rfex.fetched_rs.d() + rfex.instruction.simmediate()) as u32;
    if !aligned(vaddr, access) {
        return Err(CoreError::AddressError);
    }
    let payload = rfex.fetched_rt.ud();
    Ok(ExDc {
        write_type: WriteType::Mmu,
        access: Some(access),
        dest: None,
        vaddr,
        payload,
        suppress_delay_slot: false,
    })
}

fn aligned(vaddr: u32, access: AccessType) -> bool {
    vaddr % access.size() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, InstructionKind};
    use crate::word::Word;

    fn rfex(rs: Word, rt: Word, instr: u32) -> RfEx {
        RfEx {
            instruction: Instruction(instr),
            kind: InstructionKind::Sw,
            fetched_rs: rs,
            fetched_rt: rt,
            fetched_rs_i: Instruction(instr).rs(),
            fetched_rt_i: Instruction(instr).rt(),
        }
    }

    #[test]
    fn store_stages_address_and_payload() {
        let mut rs = Word::ZERO;
        rs.set_uw0(0x8000_2000);
        let mut rt = Word::ZERO;
        rt.set_uw0(0xDEAD_BEEF);
        // SW r6, 0(r7)
        let instr = (0x2B << 26) | (7 << 21) | (6 << 16);
        let rf = rfex(rs, rt, instr);
        let staged = store(&rf, AccessType::Word { signed: false }).unwrap();
        assert_eq!(staged.vaddr, 0x8000_2000);
        assert_eq!(staged.payload, 0xDEAD_BEEF);
        assert_eq!(staged.write_type, WriteType::Mmu);
    }

    #[test]
    fn misaligned_load_raises_address_error() {
        let mut rs = Word::ZERO;
        rs.set_uw0(0x8000_2001);
        let instr = (0x23 << 26) | (7 << 21) | (8 << 16);
        let rf = rfex(rs, Word::ZERO, instr);
        let err = load(&rf, AccessType::Word { signed: true }).unwrap_err();
        assert_eq!(err, CoreError::AddressError);
    }
}
