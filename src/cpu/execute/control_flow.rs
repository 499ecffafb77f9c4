//! JMP, Jcc, CALL, RET, LOOP family.
//!
//! By the time a handler runs, `Cpu::step` has already advanced `pc` past
//! the instruction, so `cpu.pc` is exactly the "address of the byte
//! following this instruction" the relative/return-address arithmetic in
//! the instruction-set contract is defined against.

use crate::cpu::decode::{reg_only, Decoded};
use crate::cpu::Cpu;
use crate::error::CpuError;
use crate::isa::registers::{SEG_CS, CX};
use crate::memory::Memory;

pub fn jmp_abs(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.pc = d.word1;
    Ok(())
}

pub fn jmp_reg(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.pc = cpu.reg(reg_only(d.byte1));
    Ok(())
}

pub fn jmp_far(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.set_seg(SEG_CS, d.word2);
    cpu.pc = d.word1;
    Ok(())
}

pub fn jr(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.pc = cpu.pc.wrapping_add(d.disp8 as i16 as u16);
    Ok(())
}

macro_rules! conditional_jump {
    ($name:ident, $cond:expr) => {
        pub fn $name(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
            if $cond(cpu) {
                cpu.pc = d.word1;
            }
            Ok(())
        }
    };
}

conditional_jump!(jz, |c: &Cpu| c.get_flag(Cpu::ZF));
conditional_jump!(jnz, |c: &Cpu| !c.get_flag(Cpu::ZF));
conditional_jump!(jc, |c: &Cpu| c.get_flag(Cpu::CF));
conditional_jump!(jnc, |c: &Cpu| !c.get_flag(Cpu::CF));
conditional_jump!(js, |c: &Cpu| c.get_flag(Cpu::SF));
conditional_jump!(jns, |c: &Cpu| !c.get_flag(Cpu::SF));
conditional_jump!(jo, |c: &Cpu| c.get_flag(Cpu::OF));
conditional_jump!(jno, |c: &Cpu| !c.get_flag(Cpu::OF));
conditional_jump!(jl, |c: &Cpu| c.get_flag(Cpu::SF) != c.get_flag(Cpu::OF));
conditional_jump!(jge, |c: &Cpu| c.get_flag(Cpu::SF) == c.get_flag(Cpu::OF));
conditional_jump!(jle, |c: &Cpu| c.get_flag(Cpu::ZF) || c.get_flag(Cpu::SF) != c.get_flag(Cpu::OF));
conditional_jump!(jg, |c: &Cpu| !c.get_flag(Cpu::ZF) && c.get_flag(Cpu::SF) == c.get_flag(Cpu::OF));
conditional_jump!(ja, |c: &Cpu| !c.get_flag(Cpu::CF) && !c.get_flag(Cpu::ZF));
conditional_jump!(jbe, |c: &Cpu| c.get_flag(Cpu::CF) || c.get_flag(Cpu::ZF));

pub fn call_abs(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let pc = cpu.pc;
    cpu.push_word_pub(mem, pc);
    cpu.pc = d.word1;
    Ok(())
}

pub fn call_reg(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let pc = cpu.pc;
    cpu.push_word_pub(mem, pc);
    cpu.pc = cpu.reg(reg_only(d.byte1));
    Ok(())
}

pub fn call_far(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let cs = cpu.seg(SEG_CS);
    cpu.push_word_pub(mem, cs);
    let pc = cpu.pc;
    cpu.push_word_pub(mem, pc);
    cpu.set_seg(SEG_CS, d.word2);
    cpu.pc = d.word1;
    Ok(())
}

pub fn ret(cpu: &mut Cpu, mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.pc = cpu.pop_word_pub(mem);
    Ok(())
}

pub fn ret_imm16(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.pc = cpu.pop_word_pub(mem);
    cpu.sp = cpu.sp.wrapping_add(d.word1);
    Ok(())
}

pub fn retf(cpu: &mut Cpu, mem: &mut Memory, _d: &Decoded) -> Result<(), CpuError> {
    cpu.pc = cpu.pop_word_pub(mem);
    let cs = cpu.pop_word_pub(mem);
    cpu.set_seg(SEG_CS, cs);
    Ok(())
}

pub fn retf_imm16(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    cpu.pc = cpu.pop_word_pub(mem);
    let cs = cpu.pop_word_pub(mem);
    cpu.set_seg(SEG_CS, cs);
    cpu.sp = cpu.sp.wrapping_add(d.word1);
    Ok(())
}

fn loop_dec(cpu: &mut Cpu) -> u16 {
    let cx = cpu.reg(CX).wrapping_sub(1);
    cpu.set_reg(CX, cx);
    cx
}

pub fn loop_(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    if loop_dec(cpu) != 0 {
        cpu.pc = cpu.pc.wrapping_add(d.disp8 as i16 as u16);
    }
    Ok(())
}

pub fn loopz(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let cx_nonzero = loop_dec(cpu) != 0;
    if cx_nonzero && cpu.get_flag(Cpu::ZF) {
        cpu.pc = cpu.pc.wrapping_add(d.disp8 as i16 as u16);
    }
    Ok(())
}

pub fn loopnz(cpu: &mut Cpu, _mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let cx_nonzero = loop_dec(cpu) != 0;
    if cx_nonzero && !cpu.get_flag(Cpu::ZF) {
        cpu.pc = cpu.pc.wrapping_add(d.disp8 as i16 as u16);
    }
    Ok(())
}
