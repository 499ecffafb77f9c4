//! PUSH, POP, PUSHA/POPA, PUSHF/POPF, ENTER/LEAVE.

use crate::cpu::decode::{reg_only, seg_only, Decoded};
use crate::cpu::Cpu;
use crate::error::CpuError;
use crate::isa::registers::{AX, BP, BX, CX, DI, DX, R7, SI};
use crate::memory::Memory;

pub fn push_reg(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let value = cpu.reg(reg_only(d.byte1));
    cpu.push_word_pub(mem, value);
    Ok(())
}

pub fn pop_reg(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let value = cpu.pop_word_pub(mem);
    cpu.set_reg(reg_only(d.byte1), value);
    Ok(())
}

pub fn push_seg(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let value = cpu.seg(seg_only(d.byte1));
    cpu.push_word_pub(mem, value);
    Ok(())
}

pub fn pop_seg(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let value = cpu.pop_word_pub(mem);
    cpu.set_seg(seg_only(d.byte1), value);
    Ok(())
}

const PUSHA_ORDER: [u8; 8] = [AX, BX, CX, DX, SI, DI, BP, R7];

pub fn pusha(cpu: &mut Cpu, mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    for &r in PUSHA_ORDER.iter() {
        let value = cpu.reg(r);
        cpu.push_word_pub(mem, value);
    }
    Ok(())
}

pub fn popa(cpu: &mut Cpu, mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    for &r in PUSHA_ORDER.iter().rev() {
        let value = cpu.pop_word_pub(mem);
        cpu.set_reg(r, value);
    }
    Ok(())
}

pub fn pushf(cpu: &mut Cpu, mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    let flags = cpu.flags;
    cpu.push_word_pub(mem, flags);
    Ok(())
}

pub fn popf(cpu: &mut Cpu, mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.flags = cpu.pop_word_pub(mem) & 0x00FF;
    Ok(())
}

/// `ENTER size, level`. `level` is reserved for nested-frame display lists
/// and is ignored (see DESIGN.md); `level = 0` behaviour — push BP, BP<-SP,
/// SP-=size — is exactly what this implements regardless of the byte's value.
pub fn enter(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let bp = cpu.reg(BP);
    cpu.push_word_pub(mem, bp);
    cpu.set_reg(BP, cpu.sp);
    cpu.sp = cpu.sp.wrapping_sub(d.word1);
    Ok(())
}

pub fn leave(cpu: &mut Cpu, mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.sp = cpu.reg(BP);
    let bp = cpu.pop_word_pub(mem);
    cpu.set_reg(BP, bp);
    Ok(())
}
