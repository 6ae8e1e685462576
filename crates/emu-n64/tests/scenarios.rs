//! End-to-end scenarios driving the CPU against a real bus: boot at the
//! kseg0 reset vector, execute hand-assembled programs, and check register
//! and memory state after the pipeline has drained.

use cpu_vr4300::CpuBus;
use emu_n64::N64;

fn op_i(op: u32, rs: u32, rt: u32, imm: u16) -> u32 {
    (op << 26) | (rs << 21) | (rt << 16) | u32::from(imm)
}

fn op_r(rs: u32, rt: u32, rd: u32, sa: u32, func: u32) -> u32 {
    (rs << 21) | (rt << 16) | (rd << 11) | (sa << 6) | func
}

fn j_type(op: u32, target_vaddr: u32) -> u32 {
    (op << 26) | ((target_vaddr & 0x0FFF_FFFF) >> 2)
}

const RESET_PADDR: u32 = 0x1000;

fn load_program(n64: &mut N64, words: &[u32]) {
    for (i, &word) in words.iter().enumerate() {
        n64.bus_mut().write_u32(RESET_PADDR + (i as u32) * 4, word).unwrap();
    }
}

fn run_ticks(n64: &mut N64, count: u32) {
    for _ in 0..count {
        n64.tick().unwrap();
    }
}

#[test]
fn lui_then_ori_assembles_a_32_bit_immediate() {
    let mut n64 = N64::new();
    load_program(
        &mut n64,
        &[
            op_i(0x0F, 0, 1, 0x1234), // LUI r1, 0x1234
            op_i(0x0D, 1, 1, 0x5678), // ORI r1, r1, 0x5678
        ],
    );
    run_ticks(&mut n64, 10);
    assert_eq!(n64.cpu().regs.gpr(1).ud(), 0x1234_5678);
}

#[test]
fn addi_overflow_is_absorbed_and_the_tick_loop_keeps_running() {
    let mut n64 = N64::new();
    load_program(
        &mut n64,
        &[
            op_i(0x0F, 0, 2, 0x7FFF),  // LUI r2, 0x7FFF
            op_i(0x0D, 2, 2, 0xFFFF),  // ORI r2, r2, 0xFFFF -> r2 = 0x7FFFFFFF
            op_i(0x08, 2, 3, 1),       // ADDI r3, r2, 1 -> overflow
            op_i(0x08, 0, 4, 9),       // ADDI r4, r0, 9 -> runs normally after the fault
        ],
    );
    run_ticks(&mut n64, 10);

    // The faulted ADDI leaves its destination untouched...
    assert_eq!(n64.cpu().regs.gpr(3).ud(), 0);
    // ...records its ExcCode (Ov = 12) in Cause...
    assert_eq!((n64.cpu().regs.cp0[13].uw0() >> 2) & 0x1F, 12);
    // ...and the pipeline carries on to the next instruction instead of
    // stopping the tick loop.
    assert_eq!(n64.cpu().regs.gpr(4).ud(), 9);
}

#[test]
fn taken_beq_skips_the_instruction_after_its_delay_slot() {
    let mut n64 = N64::new();
    load_program(
        &mut n64,
        &[
            op_i(0x08, 0, 4, 5),       // 0x00: ADDI r4, r0, 5
            op_i(0x08, 0, 5, 5),       // 0x04: ADDI r5, r0, 5
            op_i(0x04, 4, 5, 2),       // 0x08: BEQ r4, r5, +2 -> target 0x14
            op_i(0x08, 0, 6, 1),       // 0x0C: ADDI r6, r0, 1  (delay slot, always runs)
            op_i(0x08, 0, 7, 0x2AAA), // 0x10: ADDI r7, r0, sentinel (skipped)
            op_i(0x08, 0, 7, 0x42),    // 0x14: ADDI r7, r0, 0x42 (landing point)
        ],
    );
    run_ticks(&mut n64, 15);
    assert_eq!(n64.cpu().regs.gpr(6).ud(), 1);
    assert_eq!(n64.cpu().regs.gpr(7).ud(), 0x42);
}

#[test]
fn store_then_load_round_trips_through_rdram() {
    let mut n64 = N64::new();
    load_program(
        &mut n64,
        &[
            op_i(0x0F, 0, 1, 0x8000),   // LUI r1, 0x8000
            op_i(0x0D, 1, 1, 0x2000),   // ORI r1, r1, 0x2000 -> r1 = kseg0 vaddr 0x80002000
            op_i(0x08, 0, 2, 0x1234),   // ADDI r2, r0, 0x1234
            op_i(0x2B, 1, 2, 0),        // SW r2, 0(r1)
            op_i(0x23, 1, 3, 0),        // LW r3, 0(r1)
        ],
    );
    run_ticks(&mut n64, 15);
    assert_eq!(n64.cpu().regs.gpr(3).ud(), 0x1234);
}

#[test]
fn jal_links_return_address_and_jr_returns() {
    let mut n64 = N64::new();
    let mut words = vec![0u32; 11];
    words[0] = j_type(0x03, 0x8000_1020); // 0x00: JAL 0x80001020
    words[1] = op_i(0x08, 0, 8, 1); // 0x04: ADDI r8, r0, 1 (JAL delay slot)
    words[2] = op_i(0x08, 0, 9, 0x4321); // 0x08: ADDI r9, r0, 0x4321 (return lands here)
    // 0x0C, 0x10, 0x14, 0x18, 0x1C: left zero (NOP padding up to the subroutine)
    words[8] = op_i(0x08, 0, 11, 0x42); // 0x20: ADDI r11, r0, 0x42
    words[9] = op_r(31, 0, 0, 0, 0x08); // 0x24: JR r31
    words[10] = op_i(0x08, 0, 12, 0x99); // 0x28: ADDI r12, r0, 0x99 (JR delay slot)
    load_program(&mut n64, &words);

    run_ticks(&mut n64, 25);

    assert_eq!(n64.cpu().regs.gpr(31).ud(), 0x8000_1008);
    assert_eq!(n64.cpu().regs.gpr(8).ud(), 1);
    assert_eq!(n64.cpu().regs.gpr(11).ud(), 0x42);
    assert_eq!(n64.cpu().regs.gpr(12).ud(), 0x99);
    assert_eq!(n64.cpu().regs.gpr(9).ud(), 0x4321);
}

#[test]
fn pi_wr_len_store_triggers_cartridge_to_rdram_dma() {
    let mut n64 = N64::new();
    let mut rom = vec![0u8; 0x10_0000];
    rom[0..4].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
    n64.load_cartridge(&rom).unwrap();
    n64.bus_mut().rcp.pi_dram_addr = 0;
    n64.bus_mut().rcp.pi_cart_addr = 0x1000_0000;

    load_program(
        &mut n64,
        &[
            op_i(0x0F, 0, 1, 0xA460), // LUI r1, 0xA460
            op_i(0x0D, 1, 1, 0x000C), // ORI r1, r1, 0x000C -> r1 = PI_WR_LEN (kseg1)
            op_i(0x08, 0, 2, 0x0003), // ADDI r2, r0, 3 -> DMA length = 4 bytes
            op_i(0x2B, 1, 2, 0),      // SW r2, 0(r1)
        ],
    );
    run_ticks(&mut n64, 15);

    assert_eq!(n64.bus_mut().read_u32(0).unwrap(), 0x0102_0304);
}
