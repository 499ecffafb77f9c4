//! AND/OR/XOR/NOT/TEST through the full fetch/decode/execute loop.

use micro16::cpu::{Cpu, CpuHarness};
use micro16::isa::registers::{AX, BX};

#[test]
fn test_and_clears_carry_and_overflow() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x00, 0x00, 0xFF, // MOV AX, 0xFF00
            0x11, 0x01, 0xF0, 0x0F, // MOV BX, 0x0FF0
            0x70, 0x01, // AND AX, BX
        ],
        0,
    );
    harness.cpu.set_flag(Cpu::CF, true);
    harness.cpu.set_flag(Cpu::OF, true);
    harness.step_n(3);
    assert_eq!(harness.cpu.reg(AX), 0x0F00);
    assert!(!harness.cpu.get_flag(Cpu::CF));
    assert!(!harness.cpu.get_flag(Cpu::OF));
}

#[test]
fn test_or_reg_imm16_sets_zero_flag_when_both_are_zero() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x00, 0x00, 0x00, // MOV AX, 0
            0x73, 0x00, 0x00, 0x00, // OR AX, 0
        ],
        0,
    );
    harness.step_n(2);
    assert_eq!(harness.cpu.reg(AX), 0);
    assert!(harness.cpu.get_flag(Cpu::ZF));
}

#[test]
fn test_xor_with_self_clears_register() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x00, 0x34, 0x12, // MOV AX, 0x1234
            0x74, 0x00, // XOR AX, AX  (pack_nibbles(AX, AX))
        ],
        0,
    );
    harness.step_n(2);
    assert_eq!(harness.cpu.reg(AX), 0);
    assert!(harness.cpu.get_flag(Cpu::ZF));
}

#[test]
fn test_not_flips_every_bit_and_leaves_flags_untouched() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x00, 0xFF, 0x00, // MOV AX, 0x00FF
            0x76, 0x00, // NOT AX
        ],
        0,
    );
    harness.cpu.set_flag(Cpu::ZF, true);
    harness.step_n(2);
    assert_eq!(harness.cpu.reg(AX), 0xFF00);
    assert!(harness.cpu.get_flag(Cpu::ZF));
}

#[test]
fn test_test_does_not_modify_either_operand() {
    let mut harness = CpuHarness::new();
    harness.load_program(
        &[
            0x11, 0x00, 0x0F, 0x00, // MOV AX, 0x000F
            0x11, 0x01, 0xF0, 0x00, // MOV BX, 0x00F0
            0x77, 0x01, // TEST AX, BX
        ],
        0,
    );
    harness.step_n(3);
    assert_eq!(harness.cpu.reg(AX), 0x000F);
    assert_eq!(harness.cpu.reg(BX), 0x00F0);
    assert!(harness.cpu.get_flag(Cpu::ZF));
}
