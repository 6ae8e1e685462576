//! Visible register file of the Reality Co-Processor.
//!
//! Only the registers the CPU bus can address are modeled; RSP/RDP
//! internal execution is out of scope (SPEC_FULL §1).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferFormat {
    Blank,
    Rgb5,
    Rgba8888,
}

impl FramebufferFormat {
    #[must_use]
    pub fn from_vi_ctrl(vi_ctrl: u32) -> Self {
        match vi_ctrl & 0b11 {
            0b10 => FramebufferFormat::Rgb5,
            0b11 => FramebufferFormat::Rgba8888,
            _ => FramebufferFormat::Blank,
        }
    }
}

#[derive(Debug, Default)]
pub struct Rcp {
    pub rsp_status: u32,
    pub rsp_dma_busy: u32,
    pub rsp_pc: u32,

    pub mi_mode: u32,
    pub mi_interrupt: u32,
    pub mi_mask: u32,

    pub vi_ctrl: u32,
    pub vi_origin: u32,
    pub vi_width: u32,
    pub vi_v_intr: u32,
    pub vi_v_current: u32,
    pub vi_burst: u32,
    pub vi_v_sync: u32,
    pub vi_h_sync: u32,
    pub vi_h_sync_leap: u32,
    pub vi_h_video: u32,
    pub vi_v_video: u32,
    pub vi_v_burst: u32,
    pub vi_x_scale: u32,
    pub vi_y_scale: u32,
    pub vi_test_addr: u32,
    pub vi_staged_data: u32,

    pub ai_dram_addr: u32,
    pub ai_length: u32,

    pub pi_dram_addr: u32,
    pub pi_cart_addr: u32,
    pub pi_rd_len: u32,
    pub pi_wr_len: u32,
    pub pi_status: u32,
    pub pi_bsd_dom1_lat: u32,
    pub pi_bsd_dom1_pwd: u32,
    pub pi_bsd_dom1_pgs: u32,
    pub pi_bsd_dom1_rls: u32,
    pub pi_bsd_dom2_lat: u32,
    pub pi_bsd_dom2_pwd: u32,
    pub pi_bsd_dom2_pgs: u32,
    pub pi_bsd_dom2_rls: u32,

    pub ri_mode: u32,
    pub ri_config: u32,
    pub ri_current_load: u32,
    pub ri_select: u32,

    pub si_status: u32,
}

impl Rcp {
    #[must_use]
    pub fn new() -> Self {
        let mut rcp = Rcp::default();
        rcp.reset();
        rcp
    }

    /// Power-on values of the RDRAM-interface registers (SPEC_FULL §4.C).
    pub fn reset(&mut self) {
        self.ri_mode = 0x0E00_0000;
        self.ri_config = 0x4000_0000;
        self.ri_select = 0x1400_0000;
    }

    #[must_use]
    pub fn framebuffer_format(&self) -> FramebufferFormat {
        FramebufferFormat::from_vi_ctrl(self.vi_ctrl)
    }
}
