//! Implicit-form system instructions: NOP, HLT, flag-bit toggles, INT/IRET.

use crate::cpu::decode::Decoded;
use crate::cpu::Cpu;
use crate::error::CpuError;
use crate::memory::Memory;

pub fn nop(_cpu: &mut Cpu, _mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    Ok(())
}

pub fn hlt(cpu: &mut Cpu, _mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.halted = true;
    Ok(())
}

pub fn cli(cpu: &mut Cpu, _mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.set_flag(Cpu::IF, false);
    Ok(())
}

pub fn sti(cpu: &mut Cpu, _mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.set_flag(Cpu::IF, true);
    Ok(())
}

pub fn cld(cpu: &mut Cpu, _mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.set_flag(Cpu::DF, false);
    Ok(())
}

pub fn std_(cpu: &mut Cpu, _mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.set_flag(Cpu::DF, true);
    Ok(())
}

/// Software interrupt: `INT vector8`. Uses the same dispatch mechanism as a
/// hardware-latched interrupt, minus the latch itself.
pub fn int(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.enter_interrupt_pub(mem, d.byte1);
    Ok(())
}

pub fn iret(cpu: &mut Cpu, mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.iret(mem);
    Ok(())
}

/// Placeholder for dispatch-table slots whose opcode is unassigned. `step`
/// intercepts `Family::Invalid` before dispatch, so this is never actually
/// called; it only exists to give every array slot a value.
pub fn unreachable_invalid(_cpu: &mut Cpu, _mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    unreachable!("invalid opcodes are intercepted in Cpu::step before dispatch")
}
