//! The pipeline engine: five stages, four latches, one tick at a time.
//!
//! `tick` runs the stages in reverse order (WB, DC, EX, RF, IC) so that a
//! later stage's writes are visible to an earlier stage within the same
//! call, without keeping separate "current"/"next" copies of any latch.
//! See SPEC_FULL §4.E for the full per-tick contract this implements.

use emu_core::{Observable, Value};

use crate::bus::CpuBus;
use crate::cp0;
use crate::errors::CoreError;
use crate::instruction::Instruction;
use crate::mmu::translate_vaddr;
use crate::pipeline::{Destination, DcWb, ExDc, IcRf, RfEx, WriteType};
use crate::registers::{Registers, CP0_COMPARE};
use crate::scheduler::{EventKind, Scheduler};
use crate::semantics;
use crate::word::Word;

pub struct Cpu {
    pub regs: Registers,
    pub scheduler: Scheduler,
    icrf_latch: IcRf,
    rfex_latch: RfEx,
    exdc_latch: ExDc,
    dcwb_latch: DcWb,
    instructions_retired: u64,
    vi_period_cycles: u64,
}

impl Cpu {
    #[must_use]
    pub fn new() -> Self {
        Cpu {
            regs: Registers::new(),
            scheduler: Scheduler::new(),
            icrf_latch: IcRf::nop(),
            rfex_latch: RfEx::default(),
            exdc_latch: ExDc::none(),
            dcwb_latch: DcWb::default(),
            instructions_retired: 0,
            vi_period_cycles: 0,
        }
    }

    pub fn reset(&mut self) {
        self.regs.reset();
        self.scheduler = Scheduler::new();
        self.icrf_latch = IcRf::nop();
        self.rfex_latch = RfEx::default();
        self.exdc_latch = ExDc::none();
        self.dcwb_latch = DcWb::default();
        self.instructions_retired = 0;
        if self.vi_period_cycles != 0 {
            self.scheduler.push(EventKind::Vi, self.vi_period_cycles);
        }
    }

    #[must_use]
    pub fn instructions_retired(&self) -> u64 {
        self.instructions_retired
    }

    /// Arms a recurring vertical-blank event, re-armed from inside its own
    /// handler every `period_cycles` scheduler cycles (one video frame's
    /// worth, at the caller's chosen clock). A `period_cycles` of `0`
    /// disables the event entirely; this also takes effect on the next
    /// [`Cpu::reset`] so a power-on CPU keeps the period across resets.
    pub fn schedule_vi_interrupt(&mut self, period_cycles: u64) {
        self.vi_period_cycles = period_cycles;
        if period_cycles != 0 {
            self.scheduler.push(EventKind::Vi, period_cycles);
        }
    }

    /// Runs all five stages once, in reverse pipeline order.
    ///
    /// Architectural exceptions raised by any stage (see
    /// [`CoreError::is_architectural`]) are absorbed here: the offending
    /// stage's `ExcCode` is latched into Cause and the tick still completes
    /// and returns `Ok(())`. Only host errors (a bad physical address, an
    /// unimplemented opcode, an oversized image) escape `tick` as `Err`,
    /// since those indicate the emulator itself cannot continue rather than
    /// something the guest program's own exception handling would resolve.
    pub fn tick<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), CoreError> {
        self.regs.clear_r0();

        let wb = self.wb_stage(bus);
        self.absorb_exception(wb)?;
        let dc = self.dc_stage(bus);
        self.absorb_exception(dc)?;
        let ex = self.ex_stage();
        self.absorb_exception(ex)?;
        self.rf_stage();
        let ic = self.ic_stage(bus);
        self.absorb_exception(ic)?;

        self.service_count_and_scheduler(bus);
        Ok(())
    }

    /// Resolves a stage's `Result`: an architectural exception records its
    /// `ExcCode` in Cause and is swallowed; a host error propagates.
    fn absorb_exception(&mut self, result: Result<(), CoreError>) -> Result<(), CoreError> {
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_architectural() => {
                if let Some(code) = err.exc_code() {
                    cp0::raise_exception(&mut self.regs, code);
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn wb_stage<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), CoreError> {
        match self.dcwb_latch.write_type {
            WriteType::None => {}
            WriteType::Register => {
                panic!("WriteType::Register reached WB: EX must bypass ALU writes");
            }
            WriteType::LateRegister => {
                let Some(Destination::Register(index)) = self.dcwb_latch.dest else {
                    panic!("LateRegister write with no register destination");
                };
                self.regs.set_gpr(index, Word::from_u64(self.dcwb_latch.payload));
                self.refresh_rfex_snapshot(index);
            }
            WriteType::Mmu => {
                let Some(Destination::Memory(paddr)) = self.dcwb_latch.dest else {
                    panic!("Mmu write with no physical destination");
                };
                let access = self.dcwb_latch.access.expect("Mmu write with no access width");
                write_bus(bus, paddr, access, self.dcwb_latch.payload)?;
            }
        }
        self.dcwb_latch = DcWb::default();
        Ok(())
    }

    /// After a late register write lands, any in-flight instruction that
    /// reads the same register gets its RF-time snapshot refreshed so a
    /// stale value doesn't reach EX next.
    fn refresh_rfex_snapshot(&mut self, written_index: usize) {
        if self.rfex_latch.fetched_rs_i == written_index {
            self.rfex_latch.fetched_rs = self.regs.gpr(written_index);
        }
        if self.rfex_latch.fetched_rt_i == written_index {
            self.rfex_latch.fetched_rt = self.regs.gpr(written_index);
        }
    }

    fn dc_stage<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), CoreError> {
        let exdc = self.exdc_latch;
        self.exdc_latch = ExDc::none();
        match exdc.write_type {
            WriteType::None | WriteType::Register => {
                self.dcwb_latch = DcWb::default();
            }
            WriteType::LateRegister => {
                let access = exdc.access.expect("LateRegister with no access width");
                let translation = translate_vaddr(exdc.vaddr)?;
                let payload = read_bus(bus, translation.paddr, access)?;
                // Load-interlock bypass: the instruction about to enter EX
                // this same tick may read the register this load targets.
                if let Some(Destination::Register(index)) = exdc.dest {
                    if self.rfex_latch.fetched_rs_i == index {
                        self.rfex_latch.fetched_rs = Word::from_u64(payload);
                    }
                    if self.rfex_latch.fetched_rt_i == index {
                        self.rfex_latch.fetched_rt = Word::from_u64(payload);
                    }
                }
                self.dcwb_latch = DcWb {
                    write_type: WriteType::LateRegister,
                    dest: exdc.dest,
                    access: exdc.access,
                    payload,
                };
            }
            WriteType::Mmu => {
                exdc.access.expect("Mmu write with no access width");
                let translation = translate_vaddr(exdc.vaddr)?;
                self.dcwb_latch = DcWb {
                    write_type: WriteType::Mmu,
                    dest: Some(Destination::Memory(translation.paddr)),
                    access: exdc.access,
                    payload: exdc.payload,
                };
            }
        }
        Ok(())
    }

    fn ex_stage(&mut self) -> Result<(), CoreError> {
        let rfex = self.rfex_latch;
        let result = semantics::execute(&mut self.regs, &rfex)?;
        if result.suppress_delay_slot {
            self.icrf_latch = IcRf::nop();
        }
        self.exdc_latch = result;
        self.instructions_retired += 1;
        Ok(())
    }

    fn rf_stage(&mut self) {
        let instruction = self.icrf_latch.instruction;
        self.rfex_latch = RfEx {
            instruction,
            kind: instruction.decode(),
            fetched_rs: self.regs.gpr(instruction.rs()),
            fetched_rt: self.regs.gpr(instruction.rt()),
            fetched_rs_i: instruction.rs(),
            fetched_rt_i: instruction.rt(),
        };
    }

    fn ic_stage<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), CoreError> {
        let translation = translate_vaddr(self.regs.pc as u32)?;
        let word = bus.fetch_instruction_uncached(translation.paddr)?;
        self.icrf_latch = IcRf { instruction: Instruction(word) };
        self.regs.pc = self.regs.pc.wrapping_add(4);
        Ok(())
    }

    fn service_count_and_scheduler<B: CpuBus>(&mut self, bus: &mut B) {
        if cp0::tick_count(&mut self.regs) {
            self.scheduler.push(EventKind::Count, 0);
        }
        self.scheduler.advance(1);
        for (kind, when) in self.scheduler.pop_due() {
            match kind {
                EventKind::Count => {
                    if (when >> 1) == self.regs.cp0[CP0_COMPARE].ud() {
                        cp0::raise_interrupt(&mut self.regs);
                    }
                }
                EventKind::Vi => {
                    cp0::raise_vi_pending(&mut self.regs);
                    bus.raise_vi_interrupt();
                    self.scheduler.push(EventKind::Interrupt, 1);
                    if self.vi_period_cycles != 0 {
                        self.scheduler.push(EventKind::Vi, self.vi_period_cycles);
                    }
                }
                EventKind::Interrupt => {
                    cp0::raise_interrupt(&mut self.regs);
                }
            }
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

fn read_bus<B: CpuBus>(
    bus: &mut B,
    paddr: u32,
    access: crate::bus::AccessType,
) -> Result<u64, CoreError> {
    use crate::bus::AccessType;
    Ok(match access {
        AccessType::Byte { signed: true } => i64::from(bus.read_u8(paddr)? as i8) as u64,
        AccessType::Byte { signed: false } => u64::from(bus.read_u8(paddr)?),
        AccessType::Half { signed: true } => i64::from(bus.read_u16(paddr)? as i16) as u64,
        AccessType::Half { signed: false } => u64::from(bus.read_u16(paddr)?),
        AccessType::Word { signed: true } => i64::from(bus.read_u32(paddr)? as i32) as u64,
        AccessType::Word { signed: false } => u64::from(bus.read_u32(paddr)?),
        AccessType::Double => bus.read_u64(paddr)?,
    })
}

fn write_bus<B: CpuBus>(
    bus: &mut B,
    paddr: u32,
    access: crate::bus::AccessType,
    value: u64,
) -> Result<(), CoreError> {
    use crate::bus::AccessType;
    match access {
        AccessType::Byte { .. } => bus.write_u8(paddr, value as u8),
        AccessType::Half { .. } => bus.write_u16(paddr, value as u16),
        AccessType::Word { .. } => bus.write_u32(paddr, value as u32),
        AccessType::Double => bus.write_u64(paddr, value),
    }
}

impl Observable for Cpu {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("gpr.") {
            let index: usize = rest.parse().ok()?;
            return (index < 32).then(|| Value::U64(self.regs.gpr(index).ud()));
        }
        match path {
            "pc" => Some(Value::U64(self.regs.pc)),
            "hi" => Some(Value::U64(self.regs.hi.ud())),
            "lo" => Some(Value::U64(self.regs.lo.ud())),
            "cp0.count" => Some(Value::U32(self.regs.cp0[9].uw0())),
            "cp0.compare" => Some(Value::U32(self.regs.cp0[11].uw0())),
            "cp0.status" => Some(Value::U32(self.regs.cp0[12].uw0())),
            "cp0.cause" => Some(Value::U32(self.regs.cp0[13].uw0())),
            "instructions_retired" => Some(Value::U64(self.instructions_retired)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["pc", "hi", "lo", "cp0.count", "cp0.compare", "cp0.status", "cp0.cause", "instructions_retired"]
    }
}
