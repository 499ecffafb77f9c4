//! MOVSB/CMPSB/STOSB/LODSB and their word forms, plus REP looping, through
//! the full fetch/decode/execute loop.

use micro16::cpu::{Cpu, CpuHarness};
use micro16::isa::registers::{AX, CX, DI, SI};
use micro16::memory::Memory;

#[test]
fn test_movsb_copies_one_byte_and_advances_both_pointers() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x04, 0x00, 0x10, // MOV SI, 0x1000
            0x11, 0x05, 0x00, 0x20, // MOV DI, 0x2000
            0x04, // CLD
            0xE0, // MOVSB
        ],
        0,
    );
    harness.mem.write_u8(Memory::physical_address(0, 0x1000), 0x41);
    harness.step_n(4);
    assert_eq!(harness.mem.read_u8(Memory::physical_address(0, 0x2000)), 0x41);
    assert_eq!(harness.cpu.reg(SI), 0x1001);
    assert_eq!(harness.cpu.reg(DI), 0x2001);
}

#[test]
fn test_rep_movsb_copies_a_whole_block_and_zeroes_cx() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x04, 0x00, 0x10, // MOV SI, 0x1000
            0x11, 0x05, 0x00, 0x20, // MOV DI, 0x2000
            0x11, 0x02, 0x04, 0x00, // MOV CX, 4
            0x04, // CLD
            0xE8, 0xE0, // REP MOVSB
        ],
        0,
    );
    let base = Memory::physical_address(0, 0x1000);
    harness.mem.write_u8(base, 0x41);
    harness.mem.write_u8(base + 1, 0x42);
    harness.mem.write_u8(base + 2, 0x43);
    harness.mem.write_u8(base + 3, 0x44);
    harness.step_n(5);
    let dst = Memory::physical_address(0, 0x2000);
    assert_eq!(harness.mem.read_u8(dst), 0x41);
    assert_eq!(harness.mem.read_u8(dst + 1), 0x42);
    assert_eq!(harness.mem.read_u8(dst + 2), 0x43);
    assert_eq!(harness.mem.read_u8(dst + 3), 0x44);
    assert_eq!(harness.cpu.reg(CX), 0);
    assert_eq!(harness.cpu.reg(SI), 0x1004);
    assert_eq!(harness.cpu.reg(DI), 0x2004);
}

#[test]
fn test_movsb_decrements_pointers_when_direction_flag_is_set() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x04, 0x00, 0x10, // MOV SI, 0x1000
            0x11, 0x05, 0x00, 0x20, // MOV DI, 0x2000
            0x05, // STD
            0xE0, // MOVSB
        ],
        0,
    );
    harness.step_n(4);
    assert_eq!(harness.cpu.reg(SI), 0x0FFF);
    assert_eq!(harness.cpu.reg(DI), 0x1FFF);
}

#[test]
fn test_stosb_then_lodsb_round_trip_through_al() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x00, 0x7A, 0x00, // MOV AX, 0x007A
            0x11, 0x05, 0x00, 0x30, // MOV DI, 0x3000
            0x11, 0x04, 0x00, 0x30, // MOV SI, 0x3000
            0x04, // CLD
            0xE4, // STOSB
            0x11, 0x00, 0x00, 0x00, // MOV AX, 0
            0xE6, // LODSB
        ],
        0,
    );
    harness.step_n(7);
    assert_eq!(harness.cpu.reg(AX) & 0x00FF, 0x7A);
}

#[test]
fn test_cmpsb_sets_zero_flag_on_equal_bytes() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x04, 0x00, 0x10, // MOV SI, 0x1000
            0x11, 0x05, 0x00, 0x10, // MOV DI, 0x1000
            0x04, // CLD
            0xE2, // CMPSB
        ],
        0,
    );
    harness.step_n(4);
    assert!(harness.cpu.get_flag(Cpu::ZF));
}
