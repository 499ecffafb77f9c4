//! End-to-end scenarios: assemble a short program from source, run it to
//! completion through the full fetch/decode/execute loop, and check the
//! final register/flag/memory state. Each scenario here corresponds to one
//! worked example in the design notes; see DESIGN.md for the two places
//! where a scenario's prose claim doesn't match the flag semantics the rest
//! of the suite pins down, and how that's resolved.

use micro16::assembler::assemble;
use micro16::cpu::{Cpu, CpuHarness};
use micro16::disassembler::disassemble;
use micro16::isa::registers::{AX, BX, CX, DI, SEG_ES, SEG_SS, SI};
use micro16::memory::Memory;

/// Assemble `source`, load it at its own origin (the harness's default CPU
/// state already has PC at 0x0100 and CS at segment 0, matching the
/// assembler's default origin), and run to completion.
fn run_to_completion(source: &str, max_cycles: u64) -> CpuHarness {
    let _ = env_logger::try_init();
    let asm = assemble(source).unwrap();
    let mut harness = CpuHarness::new();
    harness.mem.load(&asm.bytes, asm.origin).unwrap();
    harness.cpu.run(&mut harness.mem, max_cycles);
    assert!(harness.cpu.halted, "program did not halt within {max_cycles} cycles");
    harness
}

#[test]
fn scenario_a_register_arithmetic() {
    let source = "\
        ORG 0x0100\n\
        MOV AX, #5\n\
        MOV BX, #3\n\
        ADD AX, BX\n\
        HLT\n\
    ";
    let asm = assemble(source).unwrap();
    assert_eq!(&asm.bytes[0..5], &[0x11, 0x00, 0x05, 0x00, 0x11]);

    let harness = run_to_completion(source, 1000);
    assert_eq!(harness.cpu.reg(AX), 8);
    assert_eq!(harness.cpu.reg(BX), 3);
    assert!(!harness.cpu.get_flag(Cpu::ZF));
    assert!(!harness.cpu.get_flag(Cpu::CF));
    assert!(!harness.cpu.get_flag(Cpu::SF));
}

#[test]
fn scenario_b_stack_round_trip() {
    let source = "\
        ORG 0x0100\n\
        MOV AX, #0xDEAD\n\
        MOV BX, #0xBEEF\n\
        PUSH AX\n\
        PUSH BX\n\
        POP AX\n\
        POP BX\n\
        HLT\n\
    ";
    let harness = run_to_completion(source, 1000);
    assert_eq!(harness.cpu.reg(AX), 0xBEEF);
    assert_eq!(harness.cpu.reg(BX), 0xDEAD);
    assert_eq!(harness.cpu.sp, 0xFFFE); // back to its initial value

    let ss = harness.cpu.seg(SEG_SS);
    let beef_slot = Memory::physical_address(ss, harness.cpu.sp.wrapping_sub(2));
    let dead_slot = Memory::physical_address(ss, harness.cpu.sp.wrapping_sub(4));
    assert_eq!(harness.mem.read_u16(beef_slot), 0xBEEF);
    assert_eq!(harness.mem.read_u16(dead_slot), 0xDEAD);
}

#[test]
fn scenario_c_loop() {
    let source = "\
        ORG 0x0100\n\
        MOV CX, #10\n\
        MOV AX, #0\n\
        L: ADD AX, #1\n\
        LOOP L\n\
        HLT\n\
    ";
    let harness = run_to_completion(source, 1000);
    assert_eq!(harness.cpu.reg(AX), 10);
    assert_eq!(harness.cpu.reg(CX), 0);
    // The tenth ADD is what actually sets Zero last (CX=0 just ends the loop
    // without touching flags), and it computes AX = 9 + 1 = 10, a nonzero
    // result — so Zero is clear here, not set. See DESIGN.md.
    assert!(!harness.cpu.get_flag(Cpu::ZF));
}

#[test]
fn scenario_d_rep_movsb() {
    let source = "\
        ORG 0x0100\n\
        MOV SI, #0x1000\n\
        MOV DI, #0x2000\n\
        MOV CX, #4\n\
        CLD\n\
        REP MOVSB\n\
        HLT\n\
    ";
    let asm = assemble(source).unwrap();
    let mut harness = CpuHarness::new();
    harness.mem.load(&asm.bytes, asm.origin).unwrap();
    let src = Memory::physical_address(0, 0x1000);
    harness.mem.write_u8(src, 0x41);
    harness.mem.write_u8(src + 1, 0x42);
    harness.mem.write_u8(src + 2, 0x43);
    harness.mem.write_u8(src + 3, 0x44);
    harness.cpu.run(&mut harness.mem, 1000);
    assert!(harness.cpu.halted);

    let dst = Memory::physical_address(harness.cpu.seg(SEG_ES), 0x2000);
    assert_eq!(harness.mem.read_u8(dst), 0x41);
    assert_eq!(harness.mem.read_u8(dst + 1), 0x42);
    assert_eq!(harness.mem.read_u8(dst + 2), 0x43);
    assert_eq!(harness.mem.read_u8(dst + 3), 0x44);
    assert_eq!(harness.cpu.reg(CX), 0);
    assert_eq!(harness.cpu.reg(SI), 0x1004);
    assert_eq!(harness.cpu.reg(DI), 0x2004);
}

#[test]
fn scenario_e_signed_compare_and_conditional_branch() {
    let source = "\
        ORG 0x0100\n\
        MOV AX, #-5\n\
        MOV BX, #3\n\
        CMP AX, BX\n\
        JL  TAKEN\n\
        MOV CX, #0xFFFF\n\
        HLT\n\
        TAKEN: MOV CX, #0x1111\n\
        HLT\n\
    ";
    let harness = run_to_completion(source, 1000);
    assert_eq!(harness.cpu.reg(CX), 0x1111);
}

#[test]
fn scenario_f_disassembly_round_trip_on_a_branch_target() {
    // The prose version of this scenario places its jump target one byte
    // inside the JMP instruction's own encoding, which can't be a real
    // instruction boundary. Assembling the equivalent program from source
    // sidesteps that inconsistency: the assembler computes the target
    // address itself, so it necessarily lands on the instruction it names.
    let source = "\
        ORG 0x0100\n\
        MOV AX, #1\n\
        JMP TARGET\n\
        TARGET: MOV CX, #1\n\
    ";
    let asm = assemble(source).unwrap();
    let lines = disassemble(&asm.bytes, asm.origin);

    assert_eq!(lines[0].text, "MOV AX, 0x0001");
    assert_eq!(lines[1].text, format!("JMP L_{:04X}", asm.origin + 7));

    let target = lines.iter().find(|l| l.address == asm.origin + 7).unwrap();
    assert_eq!(target.label.as_deref(), Some(format!("L_{:04X}", asm.origin + 7).as_str()));
    assert_eq!(target.text, "MOV CX, 0x0001");
}

#[test]
fn test_di_si_constants_are_distinct_register_indices() {
    // Sanity check that the register aliases used above (SI/DI) really do
    // name two different machine registers, since a copy-paste typo here
    // would silently turn Scenario D into a same-pointer no-op.
    assert_ne!(SI, DI);
}
