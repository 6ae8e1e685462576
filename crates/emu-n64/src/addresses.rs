//! Physical MMIO addresses, exact per SPEC_FULL §6.

pub const RSP_DMA_SPADDR: u32 = 0x0404_0000;
pub const RSP_DMA_RAMADDR: u32 = 0x0404_0004;
pub const RSP_DMA_RDLEN: u32 = 0x0404_0008;
pub const RSP_DMA_WRLEN: u32 = 0x0404_000C;
pub const RSP_STATUS: u32 = 0x0404_0010;
pub const RSP_DMA_FULL: u32 = 0x0404_0014;
pub const RSP_DMA_BUSY: u32 = 0x0404_0018;
pub const RSP_SEMAPHORE: u32 = 0x0404_001C;
pub const RSP_PC: u32 = 0x0408_0000;

pub const MI_MODE: u32 = 0x0430_0000;
pub const MI_INTERRUPT: u32 = 0x0430_0008;
pub const MI_MASK: u32 = 0x0430_000C;

pub const VI_CTRL: u32 = 0x0440_0000;
pub const VI_ORIGIN: u32 = 0x0440_0004;
pub const VI_WIDTH: u32 = 0x0440_0008;
pub const VI_V_INTR: u32 = 0x0440_000C;
pub const VI_V_CURRENT: u32 = 0x0440_0010;
pub const VI_BURST: u32 = 0x0440_0014;
pub const VI_V_SYNC: u32 = 0x0440_0018;
pub const VI_H_SYNC: u32 = 0x0440_001C;
pub const VI_H_SYNC_LEAP: u32 = 0x0440_0020;
pub const VI_H_VIDEO: u32 = 0x0440_0024;
pub const VI_V_VIDEO: u32 = 0x0440_0028;
pub const VI_V_BURST: u32 = 0x0440_002C;
pub const VI_X_SCALE: u32 = 0x0440_0030;
pub const VI_Y_SCALE: u32 = 0x0440_0034;
pub const VI_TEST_ADDR: u32 = 0x0440_0038;
pub const VI_STAGED_DATA: u32 = 0x0440_003C;

pub const AI_DRAM_ADDR: u32 = 0x0450_0000;
pub const AI_LEN: u32 = 0x0450_0004;
pub const AI_CONTROL: u32 = 0x0450_0008;
pub const AI_STATUS: u32 = 0x0450_000C;
pub const AI_DACRATE: u32 = 0x0450_0010;
pub const AI_BITRATE: u32 = 0x0450_0014;

pub const PI_DRAM_ADDR: u32 = 0x0460_0000;
pub const PI_CART_ADDR: u32 = 0x0460_0004;
pub const PI_RD_LEN: u32 = 0x0460_0008;
pub const PI_WR_LEN: u32 = 0x0460_000C;
pub const PI_STATUS: u32 = 0x0460_0010;
pub const PI_BSD_DOM1_LAT: u32 = 0x0460_0014;
pub const PI_BSD_DOM1_PWD: u32 = 0x0460_0018;
pub const PI_BSD_DOM1_PGS: u32 = 0x0460_001C;
pub const PI_BSD_DOM1_RLS: u32 = 0x0460_0020;
pub const PI_BSD_DOM2_LAT: u32 = 0x0460_0024;
pub const PI_BSD_DOM2_PWD: u32 = 0x0460_0028;
pub const PI_BSD_DOM2_PGS: u32 = 0x0460_002C;
pub const PI_BSD_DOM2_RLS: u32 = 0x0460_0030;

pub const RI_MODE: u32 = 0x0470_0000;
pub const RI_CONFIG: u32 = 0x0470_0004;
pub const RI_CURRENT_LOAD: u32 = 0x0470_0008;
pub const RI_SELECT: u32 = 0x0470_000C;

pub const SI_DRAM_ADDR: u32 = 0x0480_0000;
pub const SI_PIF_AD_RD64B: u32 = 0x0480_0004;
pub const SI_PIF_AD_WR4B: u32 = 0x0480_0008;
pub const SI_PIF_AD_WR64B: u32 = 0x0480_0010;
pub const SI_PIF_AD_RD4B: u32 = 0x0480_0014;
pub const SI_STATUS: u32 = 0x0480_0018;

pub const PIF_COMMAND: u32 = 0x1FC0_07FC;

pub const IPL_START: u32 = 0x1FC0_0000;
pub const IPL_END: u32 = 0x1FC0_07C0;
pub const PIF_RAM_START: u32 = 0x1FC0_07C0;
pub const PIF_RAM_END: u32 = 0x1FC0_0800;
pub const RSP_DMEM_START: u32 = 0x0400_0000;
pub const RSP_DMEM_END: u32 = 0x0400_1000;
pub const RSP_IMEM_START: u32 = 0x0400_1000;
pub const RSP_IMEM_END: u32 = 0x0400_2000;
pub const RDP_CMEM_START: u32 = 0x0410_0000;
pub const RDP_CMEM_END: u32 = 0x0420_0000;
