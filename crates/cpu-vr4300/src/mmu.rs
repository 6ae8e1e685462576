//! Virtual-to-physical translation for the unmapped kernel segments.
//!
//! TLB-mapped segments (kuseg/ksseg/kseg3 in the general case) are out of
//! scope; kuseg raises [`CoreError::TlbMiss`] rather than pretending to
//! translate it.

use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub paddr: u32,
    pub cached: bool,
}

/// Translates a 32-bit virtual address using the unmapped-segment rules;
/// the top three bits of `vaddr` select kseg0/kseg1/reserved/kuseg.
pub fn translate_vaddr(vaddr: u32) -> Result<Translation, CoreError> {
    match vaddr >> 29 {
        0b100 => Ok(Translation { paddr: vaddr.wrapping_sub(0x8000_0000), cached: true }),
        0b101 => Ok(Translation { paddr: vaddr.wrapping_sub(0xA000_0000), cached: false }),
        0b110 | 0b111 => Ok(Translation { paddr: 0, cached: false }),
        _ => Err(CoreError::TlbMiss),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kseg0_subtracts_base() {
        let t = translate_vaddr(0x8000_1000).unwrap();
        assert_eq!(t.paddr, 0x1000);
        assert!(t.cached);
    }

    #[test]
    fn kseg1_subtracts_base_and_is_uncached() {
        let t = translate_vaddr(0xA000_1000).unwrap();
        assert_eq!(t.paddr, 0x1000);
        assert!(!t.cached);
    }

    #[test]
    fn reserved_segments_return_zero() {
        let t = translate_vaddr(0xC000_0000).unwrap();
        assert_eq!(t.paddr, 0);
        let t = translate_vaddr(0xE000_0000).unwrap();
        assert_eq!(t.paddr, 0);
    }

    #[test]
    fn kuseg_is_not_implemented() {
        assert_eq!(translate_vaddr(0x0000_1000), Err(CoreError::TlbMiss));
    }

    #[test]
    fn kseg0_range_property() {
        for vaddr in [0x8000_0000u32, 0x8000_0004, 0x9FFF_FFFC] {
            let t = translate_vaddr(vaddr).unwrap();
            assert_eq!(t.paddr, vaddr - 0x8000_0000);
        }
    }
}
