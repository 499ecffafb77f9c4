//! IN/OUT: port-addressed I/O, routed through the attached `MmioHandler`.

use crate::cpu::decode::{reg_only, Decoded};
use crate::cpu::Cpu;
use crate::error::CpuError;
use crate::memory::Memory;

pub fn in_port(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let value = mem.port_in(d.word1);
    cpu.set_reg(reg_only(d.byte1), value);
    Ok(())
}

pub fn out_port(cpu: &mut Cpu, mem: &mut Memory, d: &Decoded) -> Result<(), CpuError> {
    let value = cpu.reg(reg_only(d.byte1));
    mem.port_out(d.word1, value);
    Ok(())
}
