//! The CPU bus: physical-address routing to RDRAM, ROM, IPL, PIF RAM, RSP
//! memories, RDP command memory, and the RCP's MMIO register file.
//!
//! Grounded on `original_source/core/n64_cpubus.cxx`'s `redirect_paddress` /
//! `redirect_paddress_slow` / `map_direct_addresses`, adapted to own byte
//! buffers instead of raw pointers (see DESIGN.md for the page-table sizing
//! note).

use cpu_vr4300::{CoreError, CpuBus};

use crate::addresses as addr;
use crate::cartridge::{MAX_IPL_SIZE, MAX_ROM_SIZE};
use crate::rcp::Rcp;

const PAGE_SIZE: u32 = 0x0010_0000;
const PAGE_COUNT: usize = 4096;

const RDRAM_SIZE: usize = 0x0040_0000;
const RDP_CMEM_SIZE: usize = 0x0010_0000;
const RSP_MEM_SIZE: usize = 0x0000_1000;

/// `map_direct_addresses` walks 14 page-table slots (`0x000..0x00D`), one
/// more than fit in the 4 MiB RDRAM backing array; slots past the fourth
/// wrap back into it modulo its size rather than reading out of bounds the
/// way the reference source's raw pointer arithmetic would.
const RDRAM_PAGE_COUNT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageRegion {
    Rdram,
    Rom,
}

pub struct N64Bus {
    rdram: Vec<u8>,
    rom: Vec<u8>,
    ipl: Vec<u8>,
    pif_ram: [u8; 64],
    rsp_dmem: [u8; RSP_MEM_SIZE],
    rsp_imem: [u8; RSP_MEM_SIZE],
    rdp_cmem: Vec<u8>,
    page_table: Vec<Option<(PageRegion, u32)>>,
    pub rcp: Rcp,
}

impl N64Bus {
    #[must_use]
    pub fn new() -> Self {
        let mut bus = N64Bus {
            rdram: vec![0; RDRAM_SIZE],
            rom: Vec::new(),
            ipl: Vec::new(),
            pif_ram: [0; 64],
            rsp_dmem: [0; RSP_MEM_SIZE],
            rsp_imem: [0; RSP_MEM_SIZE],
            rdp_cmem: vec![0; RDP_CMEM_SIZE],
            page_table: vec![None; PAGE_COUNT],
            rcp: Rcp::new(),
        };
        bus.map_direct_addresses();
        bus
    }

    fn map_direct_addresses(&mut self) {
        for i in 0..0xE {
            let page = (i as u32) % RDRAM_PAGE_COUNT;
            self.page_table[i] = Some((PageRegion::Rdram, page * PAGE_SIZE));
        }
        for i in 0x100..=0x1FB {
            self.page_table[i] = Some((PageRegion::Rom, (i - 0x100) as u32 * PAGE_SIZE));
        }
    }

    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(CoreError::ImageTooLarge);
        }
        self.rom = bytes.to_vec();
        Ok(())
    }

    pub fn load_ipl(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        if bytes.len() > MAX_IPL_SIZE {
            return Err(CoreError::ImageTooLarge);
        }
        self.ipl = bytes.to_vec();
        Ok(())
    }

    fn region_slice(&self, region: PageRegion) -> &[u8] {
        match region {
            PageRegion::Rdram => &self.rdram,
            PageRegion::Rom => &self.rom,
        }
    }

    fn region_slice_mut(&mut self, region: PageRegion) -> &mut [u8] {
        match region {
            PageRegion::Rdram => &mut self.rdram,
            PageRegion::Rom => &mut self.rom,
        }
    }

    /// Resolves a physical address to a byte slice of at least `len`
    /// bytes, trying the page table, then the MMIO table, then the region
    /// fallback ranges, in that order (SPEC_FULL §4.C).
    fn resolve(&self, paddr: u32, len: usize) -> Result<&[u8], CoreError> {
        if let Some((region, base)) = self.page_table[(paddr >> 20) as usize] {
            let offset = (base + (paddr & 0xFFFFF)) as usize;
            let slice = self.region_slice(region);
            return slice.get(offset..offset + len).ok_or(CoreError::BadAddress);
        }
        self.resolve_fallback(paddr, len)
    }

    fn resolve_fallback(&self, paddr: u32, len: usize) -> Result<&[u8], CoreError> {
        if paddr.wrapping_sub(addr::IPL_START) < (addr::IPL_END - addr::IPL_START) {
            let offset = (paddr - addr::IPL_START) as usize;
            return self.ipl.get(offset..offset + len).ok_or(CoreError::BadAddress);
        }
        if paddr.wrapping_sub(addr::PIF_RAM_START) < (addr::PIF_RAM_END - addr::PIF_RAM_START) {
            let offset = (paddr - addr::PIF_RAM_START) as usize;
            return self.pif_ram.get(offset..offset + len).ok_or(CoreError::BadAddress);
        }
        if paddr.wrapping_sub(addr::RSP_DMEM_START) < (addr::RSP_DMEM_END - addr::RSP_DMEM_START) {
            let offset = (paddr - addr::RSP_DMEM_START) as usize;
            return self.rsp_dmem.get(offset..offset + len).ok_or(CoreError::BadAddress);
        }
        if paddr.wrapping_sub(addr::RSP_IMEM_START) < (addr::RSP_IMEM_END - addr::RSP_IMEM_START) {
            let offset = (paddr - addr::RSP_IMEM_START) as usize;
            return self.rsp_imem.get(offset..offset + len).ok_or(CoreError::BadAddress);
        }
        if paddr.wrapping_sub(addr::RDP_CMEM_START) < (addr::RDP_CMEM_END - addr::RDP_CMEM_START) {
            let offset = (paddr - addr::RDP_CMEM_START) as usize;
            return self.rdp_cmem.get(offset..offset + len).ok_or(CoreError::BadAddress);
        }
        Err(CoreError::BadAddress)
    }

    /// The PIF RAM read path forces the CIC status bytes the IPL polls at
    /// boot, the same way the real boot ROM would see them latched.
    fn pif_status_bytes(&self) -> [u8; 64] {
        let mut ram = self.pif_ram;
        ram[0x26] = 0x3F;
        ram[0x27] = 0x3F;
        ram
    }

    fn read_bytes(&self, paddr: u32, len: usize) -> Result<u64, CoreError> {
        if let Some(value) = self.read_mmio(paddr, len) {
            return Ok(value);
        }
        if paddr.wrapping_sub(addr::PIF_RAM_START) < (addr::PIF_RAM_END - addr::PIF_RAM_START) {
            let offset = (paddr - addr::PIF_RAM_START) as usize;
            let ram = self.pif_status_bytes();
            return Ok(bytes_to_u64(&ram[offset..offset + len]));
        }
        let slice = self.resolve(paddr, len)?;
        Ok(bytes_to_u64(slice))
    }

    fn write_bytes(&mut self, paddr: u32, len: usize, value: u64) -> Result<(), CoreError> {
        if self.write_mmio(paddr, len, value) {
            return Ok(());
        }
        if let Some((region, base)) = self.page_table[(paddr >> 20) as usize] {
            let offset = (base + (paddr & 0xFFFFF)) as usize;
            let slice = self.region_slice_mut(region);
            let dest = slice.get_mut(offset..offset + len).ok_or(CoreError::BadAddress)?;
            dest.copy_from_slice(&u64_to_bytes(value, len));
            return Ok(());
        }
        self.write_fallback(paddr, len, value)
    }

    fn write_fallback(&mut self, paddr: u32, len: usize, value: u64) -> Result<(), CoreError> {
        let bytes = u64_to_bytes(value, len);
        if paddr.wrapping_sub(addr::PIF_RAM_START) < (addr::PIF_RAM_END - addr::PIF_RAM_START) {
            let offset = (paddr - addr::PIF_RAM_START) as usize;
            self.pif_ram[offset..offset + len].copy_from_slice(&bytes);
            return Ok(());
        }
        if paddr.wrapping_sub(addr::RSP_DMEM_START) < (addr::RSP_DMEM_END - addr::RSP_DMEM_START) {
            let offset = (paddr - addr::RSP_DMEM_START) as usize;
            self.rsp_dmem[offset..offset + len].copy_from_slice(&bytes);
            return Ok(());
        }
        if paddr.wrapping_sub(addr::RSP_IMEM_START) < (addr::RSP_IMEM_END - addr::RSP_IMEM_START) {
            let offset = (paddr - addr::RSP_IMEM_START) as usize;
            self.rsp_imem[offset..offset + len].copy_from_slice(&bytes);
            return Ok(());
        }
        if paddr.wrapping_sub(addr::RDP_CMEM_START) < (addr::RDP_CMEM_END - addr::RDP_CMEM_START) {
            let offset = (paddr - addr::RDP_CMEM_START) as usize;
            self.rdp_cmem[offset..offset + len].copy_from_slice(&bytes);
            return Ok(());
        }
        Err(CoreError::BadAddress)
    }

    fn mmio_reg_mut(&mut self, paddr: u32) -> Option<&mut u32> {
        Some(match paddr {
            addr::RSP_STATUS => &mut self.rcp.rsp_status,
            addr::RSP_DMA_BUSY => &mut self.rcp.rsp_dma_busy,
            addr::RSP_PC => &mut self.rcp.rsp_pc,
            addr::MI_MODE => &mut self.rcp.mi_mode,
            addr::MI_INTERRUPT => &mut self.rcp.mi_interrupt,
            addr::MI_MASK => &mut self.rcp.mi_mask,
            addr::VI_CTRL => &mut self.rcp.vi_ctrl,
            addr::VI_ORIGIN => &mut self.rcp.vi_origin,
            addr::VI_WIDTH => &mut self.rcp.vi_width,
            addr::VI_V_INTR => &mut self.rcp.vi_v_intr,
            addr::VI_V_CURRENT => &mut self.rcp.vi_v_current,
            addr::VI_BURST => &mut self.rcp.vi_burst,
            addr::VI_V_SYNC => &mut self.rcp.vi_v_sync,
            addr::VI_H_SYNC => &mut self.rcp.vi_h_sync,
            addr::VI_H_SYNC_LEAP => &mut self.rcp.vi_h_sync_leap,
            addr::VI_H_VIDEO => &mut self.rcp.vi_h_video,
            addr::VI_V_VIDEO => &mut self.rcp.vi_v_video,
            addr::VI_V_BURST => &mut self.rcp.vi_v_burst,
            addr::VI_X_SCALE => &mut self.rcp.vi_x_scale,
            addr::VI_Y_SCALE => &mut self.rcp.vi_y_scale,
            addr::VI_TEST_ADDR => &mut self.rcp.vi_test_addr,
            addr::VI_STAGED_DATA => &mut self.rcp.vi_staged_data,
            addr::AI_DRAM_ADDR => &mut self.rcp.ai_dram_addr,
            addr::AI_LEN => &mut self.rcp.ai_length,
            addr::PI_DRAM_ADDR => &mut self.rcp.pi_dram_addr,
            addr::PI_CART_ADDR => &mut self.rcp.pi_cart_addr,
            addr::PI_RD_LEN => &mut self.rcp.pi_rd_len,
            addr::PI_WR_LEN => &mut self.rcp.pi_wr_len,
            addr::PI_STATUS => &mut self.rcp.pi_status,
            addr::PI_BSD_DOM1_LAT => &mut self.rcp.pi_bsd_dom1_lat,
            addr::PI_BSD_DOM1_PWD => &mut self.rcp.pi_bsd_dom1_pwd,
            addr::PI_BSD_DOM1_PGS => &mut self.rcp.pi_bsd_dom1_pgs,
            addr::PI_BSD_DOM1_RLS => &mut self.rcp.pi_bsd_dom1_rls,
            addr::PI_BSD_DOM2_LAT => &mut self.rcp.pi_bsd_dom2_lat,
            addr::PI_BSD_DOM2_PWD => &mut self.rcp.pi_bsd_dom2_pwd,
            addr::PI_BSD_DOM2_PGS => &mut self.rcp.pi_bsd_dom2_pgs,
            addr::PI_BSD_DOM2_RLS => &mut self.rcp.pi_bsd_dom2_rls,
            addr::RI_MODE => &mut self.rcp.ri_mode,
            addr::RI_CONFIG => &mut self.rcp.ri_config,
            addr::RI_CURRENT_LOAD => &mut self.rcp.ri_current_load,
            addr::RI_SELECT => &mut self.rcp.ri_select,
            addr::SI_STATUS => &mut self.rcp.si_status,
            _ => return None,
        })
    }

    fn read_mmio(&self, paddr: u32, len: usize) -> Option<u64> {
        let word_addr = paddr & !0x3;
        let offset = (paddr & 0x3) as usize;
        let value = self.mmio_value(word_addr)?;
        let bytes = value.to_be_bytes();
        Some(bytes_to_u64(&bytes[offset..offset + len]))
    }

    fn mmio_value(&self, paddr: u32) -> Option<u32> {
        Some(match paddr {
            addr::RSP_STATUS => self.rcp.rsp_status,
            addr::RSP_DMA_BUSY => self.rcp.rsp_dma_busy,
            addr::RSP_PC => self.rcp.rsp_pc,
            addr::MI_MODE => self.rcp.mi_mode,
            addr::MI_INTERRUPT => self.rcp.mi_interrupt,
            addr::MI_MASK => self.rcp.mi_mask,
            addr::VI_CTRL => self.rcp.vi_ctrl,
            addr::VI_ORIGIN => self.rcp.vi_origin,
            addr::VI_WIDTH => self.rcp.vi_width,
            addr::VI_V_INTR => self.rcp.vi_v_intr,
            addr::VI_V_CURRENT => self.rcp.vi_v_current,
            addr::VI_BURST => self.rcp.vi_burst,
            addr::VI_V_SYNC => self.rcp.vi_v_sync,
            addr::VI_H_SYNC => self.rcp.vi_h_sync,
            addr::VI_H_SYNC_LEAP => self.rcp.vi_h_sync_leap,
            addr::VI_H_VIDEO => self.rcp.vi_h_video,
            addr::VI_V_VIDEO => self.rcp.vi_v_video,
            addr::VI_V_BURST => self.rcp.vi_v_burst,
            addr::VI_X_SCALE => self.rcp.vi_x_scale,
            addr::VI_Y_SCALE => self.rcp.vi_y_scale,
            addr::VI_TEST_ADDR => self.rcp.vi_test_addr,
            addr::VI_STAGED_DATA => self.rcp.vi_staged_data,
            addr::AI_DRAM_ADDR => self.rcp.ai_dram_addr,
            addr::AI_LEN => self.rcp.ai_length,
            addr::PI_DRAM_ADDR => self.rcp.pi_dram_addr,
            addr::PI_CART_ADDR => self.rcp.pi_cart_addr,
            addr::PI_RD_LEN => self.rcp.pi_rd_len,
            addr::PI_WR_LEN => self.rcp.pi_wr_len,
            addr::PI_STATUS => self.rcp.pi_status,
            addr::PI_BSD_DOM1_LAT => self.rcp.pi_bsd_dom1_lat,
            addr::PI_BSD_DOM1_PWD => self.rcp.pi_bsd_dom1_pwd,
            addr::PI_BSD_DOM1_PGS => self.rcp.pi_bsd_dom1_pgs,
            addr::PI_BSD_DOM1_RLS => self.rcp.pi_bsd_dom1_rls,
            addr::PI_BSD_DOM2_LAT => self.rcp.pi_bsd_dom2_lat,
            addr::PI_BSD_DOM2_PWD => self.rcp.pi_bsd_dom2_pwd,
            addr::PI_BSD_DOM2_PGS => self.rcp.pi_bsd_dom2_pgs,
            addr::PI_BSD_DOM2_RLS => self.rcp.pi_bsd_dom2_rls,
            addr::RI_MODE => self.rcp.ri_mode,
            addr::RI_CONFIG => self.rcp.ri_config,
            addr::RI_CURRENT_LOAD => self.rcp.ri_current_load,
            addr::RI_SELECT => self.rcp.ri_select,
            addr::SI_STATUS => self.rcp.si_status,
            _ => return None,
        })
    }

    fn write_mmio(&mut self, paddr: u32, len: usize, value: u64) -> bool {
        let word_addr = paddr & !0x3;
        let Some(current) = self.mmio_value(word_addr) else { return false };
        let offset = (paddr & 0x3) as usize;
        let mut bytes = current.to_be_bytes();
        bytes[offset..offset + len].copy_from_slice(&u64_to_bytes(value, len));
        let new_value = u32::from_be_bytes(bytes);
        if let Some(reg) = self.mmio_reg_mut(word_addr) {
            *reg = new_value;
        }
        self.apply_mmio_side_effects(word_addr, new_value);
        true
    }

    /// Writes to a handful of MMIO registers have observable side effects
    /// beyond storing the value (SPEC_FULL §4.H).
    fn apply_mmio_side_effects(&mut self, paddr: u32, value: u32) {
        match paddr {
            addr::PI_WR_LEN => self.run_pi_dma(value),
            addr::VI_ORIGIN => {}
            _ => {}
        }
    }

    fn run_pi_dma(&mut self, wr_len: u32) {
        let len = (wr_len as usize) + 1;
        let dram_addr = self.rcp.pi_dram_addr as usize;
        let cart_addr = self.rcp.pi_cart_addr;
        let Some((region, base)) = self.page_table[(cart_addr >> 20) as usize] else { return };
        let src_offset = (base + (cart_addr & 0xFFFFF)) as usize;
        let src = self.region_slice(region);
        let Some(chunk) = src.get(src_offset..src_offset + len) else { return };
        let chunk = chunk.to_vec();
        if let Some(dest) = self.rdram.get_mut(dram_addr..dram_addr + len) {
            dest.copy_from_slice(&chunk);
        }
    }

    #[must_use]
    pub fn framebuffer(&self) -> (&[u8], u32, u32, crate::rcp::FramebufferFormat) {
        let origin = self.rcp.vi_origin as usize;
        let width = if self.rcp.vi_width == 0 { 320 } else { self.rcp.vi_width };
        let format = self.rcp.framebuffer_format();
        let bytes_per_pixel: usize = match format {
            crate::rcp::FramebufferFormat::Rgba8888 => 4,
            crate::rcp::FramebufferFormat::Rgb5 | crate::rcp::FramebufferFormat::Blank => 2,
        };
        let height = 240;
        let len = (width as usize) * height * bytes_per_pixel;
        let slice = self.rdram.get(origin..origin + len).unwrap_or(&[]);
        (slice, width, height as u32, format)
    }
}

impl Default for N64Bus {
    fn default() -> Self {
        Self::new()
    }
}

fn bytes_to_u64(bytes: &[u8]) -> u64 {
    let mut value = 0u64;
    for &b in bytes {
        value = (value << 8) | u64::from(b);
    }
    value
}

fn u64_to_bytes(value: u64, len: usize) -> Vec<u8> {
    let full = value.to_be_bytes();
    full[8 - len..].to_vec()
}

impl CpuBus for N64Bus {
    fn fetch_instruction_uncached(&mut self, paddr: u32) -> Result<u32, CoreError> {
        let bits = self.read_bytes(paddr, 4)?;
        Ok(bits as u32)
    }

    fn read_u8(&mut self, paddr: u32) -> Result<u8, CoreError> {
        Ok(self.read_bytes(paddr, 1)? as u8)
    }

    fn read_u16(&mut self, paddr: u32) -> Result<u16, CoreError> {
        Ok(self.read_bytes(paddr, 2)? as u16)
    }

    fn read_u32(&mut self, paddr: u32) -> Result<u32, CoreError> {
        Ok(self.read_bytes(paddr, 4)? as u32)
    }

    fn read_u64(&mut self, paddr: u32) -> Result<u64, CoreError> {
        self.read_bytes(paddr, 8)
    }

    fn write_u8(&mut self, paddr: u32, value: u8) -> Result<(), CoreError> {
        self.write_bytes(paddr, 1, u64::from(value))
    }

    fn write_u16(&mut self, paddr: u32, value: u16) -> Result<(), CoreError> {
        self.write_bytes(paddr, 2, u64::from(value))
    }

    fn write_u32(&mut self, paddr: u32, value: u32) -> Result<(), CoreError> {
        self.write_bytes(paddr, 4, u64::from(value))
    }

    fn write_u64(&mut self, paddr: u32, value: u64) -> Result<(), CoreError> {
        self.write_bytes(paddr, 8, value)
    }

    fn reset(&mut self) {
        self.rdram.fill(0);
        self.pif_ram.fill(0);
        self.rcp.reset();
    }

    /// Grounded on `n64_cpuscheduler.cxx`'s `Vi` handler: ORs MI interrupt
    /// bit 3 and invalidates the latched scanline-match register so the
    /// same vblank line doesn't re-trigger next tick.
    fn raise_vi_interrupt(&mut self) {
        self.rcp.mi_interrupt |= 1 << 3;
        self.rcp.vi_v_intr = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdram_is_zero_after_reset() {
        let mut bus = N64Bus::new();
        CpuBus::reset(&mut bus);
        assert_eq!(bus.read_u8(0x1000).unwrap(), 0);
        assert_eq!(bus.read_u8(0x00DF_FFFF).unwrap(), 0);
    }

    #[test]
    fn store_then_load_round_trips_through_rdram() {
        let mut bus = N64Bus::new();
        bus.write_u64(0x1000, 0x1122_3344_5566_7788).unwrap();
        assert_eq!(bus.read_u64(0x1000).unwrap(), 0x1122_3344_5566_7788);
    }

    #[test]
    fn high_direct_pages_wrap_into_primary_rdram() {
        let mut bus = N64Bus::new();
        // page index 4 wraps to RDRAM page 0: the same backing bytes as
        // page index 0, modulo the array's real 4 MiB size.
        bus.write_u32(0x1000, 0xCAFEBABE).unwrap();
        assert_eq!(bus.read_u32(0x0040_1000).unwrap(), 0xCAFEBABE);
        // page index 0xD is the last of the 14 direct-mapped pages.
        assert!(bus.read_u32(0x00D0_0000).is_ok());
    }

    #[test]
    fn pi_wr_len_dma_copies_from_rom_to_rdram() {
        let mut bus = N64Bus::new();
        let mut rom = vec![0u8; 0x10_0000];
        rom[0] = 0xDE;
        rom[1] = 0xAD;
        rom[2] = 0xBE;
        rom[3] = 0xEF;
        bus.load_rom(&rom).unwrap();
        bus.rcp.pi_dram_addr = 0;
        bus.rcp.pi_cart_addr = 0x1000_0000;
        bus.write_u32(addr::PI_WR_LEN, 0xFF).unwrap(); // length field is len-1
        assert_eq!(&bus.rdram[0..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn vi_ctrl_selects_pixel_format() {
        let mut bus = N64Bus::new();
        bus.write_u32(addr::VI_CTRL, 0b10).unwrap();
        assert_eq!(bus.rcp.framebuffer_format(), crate::rcp::FramebufferFormat::Rgb5);
        bus.write_u32(addr::VI_CTRL, 0b11).unwrap();
        assert_eq!(bus.rcp.framebuffer_format(), crate::rcp::FramebufferFormat::Rgba8888);
    }

    #[test]
    fn pif_ram_read_forces_cic_status_bytes() {
        let mut bus = N64Bus::new();
        let byte26 = bus.read_u8(addr::PIF_RAM_START + 0x26).unwrap();
        assert_eq!(byte26, 0x3F);
    }

    #[test]
    fn bad_address_is_rejected() {
        let mut bus = N64Bus::new();
        assert_eq!(bus.read_u32(0x0020_0000).unwrap_err(), CoreError::BadAddress);
    }
}
