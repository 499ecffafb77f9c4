//! MOV, XCHG, and the LDS/LES far-pointer loads.
//!
//! Memory-addressed forms use DS for direct/indexed access per the
//! segmented-access rule, and SS for the SP-indexed form (there is no
//! separate "natural segment" defined for it, so it is pinned to SP's own
//! stack segment; see DESIGN.md).

use crate::cpu::decode::{nibbles, reg_only, Decoded};
use crate::cpu::Cpu;
use crate::error::CpuError;
use crate::isa::registers::{SEG_DS, SEG_ES, SEG_SS};
use crate::memory::Memory;

pub fn mov_reg_reg(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let (rd, rs) = nibbles(d.byte1);
    cpu.set_reg(rd, cpu.reg(rs));
    Ok(())
}

pub fn mov_reg_imm16(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.set_reg(reg_only(d.byte1), d.word1);
    Ok(())
}

pub fn xchg(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let (rd, rs) = nibbles(d.byte1);
    let a = cpu.reg(rd);
    let b = cpu.reg(rs);
    cpu.set_reg(rd, b);
    cpu.set_reg(rs, a);
    Ok(())
}

/// `MOV Rd, Seg` (0x13): byte1 packs `(Seg<<4)|R`.
pub fn mov_reg_from_seg(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let (seg, r) = nibbles(d.byte1);
    cpu.set_reg(r, cpu.seg(seg));
    Ok(())
}

/// `MOV Seg, Rs` (0x14): byte1 packs `(Seg<<4)|R`.
pub fn mov_seg_from_reg(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let (seg, r) = nibbles(d.byte1);
    cpu.set_seg(seg, cpu.reg(r));
    Ok(())
}

pub fn mov_reg_from_sp(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.set_reg(reg_only(d.byte1), cpu.sp);
    Ok(())
}

pub fn mov_sp_from_reg(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.sp = cpu.reg(reg_only(d.byte1));
    Ok(())
}

pub fn mov_load_direct(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let addr = Memory::physical_address(cpu.seg(SEG_DS), d.word1);
    cpu.set_reg(reg_only(d.byte1), mem.read_u16(addr));
    Ok(())
}

pub fn mov_store_direct(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let addr = Memory::physical_address(cpu.seg(SEG_DS), d.word1);
    mem.write_u16(addr, cpu.reg(reg_only(d.byte1)));
    Ok(())
}

pub fn mov_load_indexed(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let (rd, rb) = nibbles(d.byte1);
    let offset = cpu.reg(rb).wrapping_add(d.word1);
    let addr = Memory::physical_address(cpu.seg(SEG_DS), offset);
    cpu.set_reg(rd, mem.read_u16(addr));
    Ok(())
}

pub fn mov_store_indexed(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let (rd, rb) = nibbles(d.byte1);
    let offset = cpu.reg(rb).wrapping_add(d.word1);
    let addr = Memory::physical_address(cpu.seg(SEG_DS), offset);
    mem.write_u16(addr, cpu.reg(rd));
    Ok(())
}

pub fn mov_load_sp_indexed(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let offset = cpu.sp.wrapping_add(d.word1);
    let addr = Memory::physical_address(cpu.seg(SEG_SS), offset);
    cpu.set_reg(reg_only(d.byte1), mem.read_u16(addr));
    Ok(())
}

pub fn mov_store_sp_indexed(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let offset = cpu.sp.wrapping_add(d.word1);
    let addr = Memory::physical_address(cpu.seg(SEG_SS), offset);
    mem.write_u16(addr, cpu.reg(reg_only(d.byte1)));
    Ok(())
}

/// `LDS Rd, [addr16]`: loads `Rd` from `addr16` and DS from `addr16+2`.
pub fn lds(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let base = Memory::physical_address(cpu.seg(SEG_DS), d.word1);
    let value = mem.read_u16(base);
    let seg = mem.read_u16(base.wrapping_add(2));
    cpu.set_reg(reg_only(d.byte1), value);
    cpu.set_seg(SEG_DS, seg);
    Ok(())
}

/// `LES Rd, [addr16]`: loads `Rd` from `addr16` and ES from `addr16+2`.
pub fn les(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let base = Memory::physical_address(cpu.seg(SEG_DS), d.word1);
    let value = mem.read_u16(base);
    let seg = mem.read_u16(base.wrapping_add(2));
    cpu.set_reg(reg_only(d.byte1), value);
    cpu.set_seg(SEG_ES, seg);
    Ok(())
}
