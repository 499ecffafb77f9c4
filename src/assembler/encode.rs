//! Operand-form dispatch and byte emission.
//!
//! `build_form` turns a parsed mnemonic + operand list into a `Form` purely
//! from operand *shape* — no symbol lookups — which is what lets pass 1
//! compute sizes before any symbol is resolved. `Form::encode` resolves
//! every `Expr` against the (by-then-complete) symbol table and emits the
//! concrete bytes.

use crate::assembler::parser::{Expr, Operand};
use crate::assembler::symbols::SymbolTable;
use crate::error::AssembleError;
use crate::isa::{self, pack_nibbles, Family};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftCount {
    Cl,
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Form {
    Implicit(u8),
    RegOnly(u8, u8),
    RegReg(u8, u8, u8),
    SegRegMove(u8, u8, u8),
    SegPushPop(u8, u8),
    RegImm16(u8, u8, Expr),
    SpImm16(u8, Expr),
    LoadStoreDirect(u8, u8, Expr),
    LoadStoreIndexed(u8, u8, u8, Expr),
    IndexedSp(u8, u8, Expr),
    Interrupt(u8, Expr),
    RelBranch8(u8, Expr),
    AbsBranch16(u8, Expr),
    AbsBranchReg(u8, u8),
    FarBranch(u8, Expr, Expr),
    RetImm16(u8, Expr),
    ShiftRotate(u8, u8, ShiftCount),
    IoIn(u8, u8, Expr),
    IoOut(u8, u8, Expr),
    Enter(u8, Expr, Expr),
    RepPrefix(u8, String),
}

impl Form {
    pub fn family(&self) -> Family {
        match self {
            Form::Implicit(_) => Family::Implicit,
            Form::RegOnly(..) | Form::AbsBranchReg(..) => Family::RegOnly,
            Form::RegReg(..) => Family::RegReg,
            Form::SegRegMove(..) => Family::SegRegMove,
            Form::SegPushPop(..) => Family::SegPushPop,
            Form::RegImm16(..) | Form::SpImm16(..) => Family::RegImm16,
            Form::LoadStoreDirect(..) => Family::LoadStoreDirect,
            Form::LoadStoreIndexed(..) => Family::LoadStoreIndexed,
            Form::IndexedSp(..) => Family::IndexedSp,
            Form::Interrupt(..) => Family::Interrupt,
            Form::RelBranch8(..) => Family::RelBranch8,
            Form::AbsBranch16(..) => Family::AbsBranch16,
            Form::FarBranch(..) => Family::FarBranch,
            Form::RetImm16(..) => Family::RetImm16,
            Form::ShiftRotate(..) => Family::ShiftRotate,
            Form::IoIn(..) | Form::IoOut(..) => Family::IoPort,
            Form::Enter(..) => Family::Enter,
            Form::RepPrefix(..) => Family::RepPrefix,
        }
    }

    pub fn size(&self) -> u16 {
        self.family().size() as u16
    }
}

fn resolve(expr: &Expr, symtab: &SymbolTable, line: usize) -> Result<i64, AssembleError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Symbol(name) => symtab
            .lookup(name)
            .map(|s| s.value())
            .ok_or_else(|| AssembleError::UndefinedSymbol { line, name: name.clone() }),
        Expr::SymbolOffset(name, off) => symtab
            .lookup(name)
            .map(|s| s.value() + off)
            .ok_or_else(|| AssembleError::UndefinedSymbol { line, name: name.clone() }),
    }
}

fn expect_mem_or_imm_expr(line: usize, op: &Operand) -> Result<&Expr, AssembleError> {
    match op {
        Operand::Imm(e) | Operand::Mem(e) => Ok(e),
        _ => Err(AssembleError::Syntax { line, message: "expected an address or immediate operand".into() }),
    }
}

/// Determine the operand form of one instruction from its mnemonic and
/// already-parsed operands. Pure function of shape: never inspects a
/// symbol's value.
pub fn build_form(line: usize, mnemonic: &str, operands: &[Operand]) -> Result<Form, AssembleError> {
    let mnemonic = isa::canonical_mnemonic(mnemonic);
    let syntax = |msg: &str| AssembleError::Syntax { line, message: format!("{mnemonic}: {msg}") };

    match (mnemonic, operands) {
        ("NOP" | "HLT" | "CLI" | "STI" | "CLD" | "STD" | "IRET" | "PUSHA" | "POPA" | "PUSHF" | "POPF" | "LEAVE"
        | "MOVSB" | "MOVSW" | "CMPSB" | "CMPSW" | "STOSB" | "STOSW" | "LODSB" | "LODSW", []) => {
            let opcode = isa::find_opcode(mnemonic, Family::Implicit).ok_or_else(|| syntax("unknown implicit-form opcode"))?;
            Ok(Form::Implicit(opcode))
        }

        ("RET" | "RETF", []) => {
            let opcode = isa::find_opcode(mnemonic, Family::Implicit).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::Implicit(opcode))
        }
        ("RET" | "RETF", [op]) => {
            let opcode = isa::find_opcode(mnemonic, Family::RetImm16).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::RetImm16(opcode, expect_mem_or_imm_expr(line, op)?.clone()))
        }

        ("PUSH" | "POP", [Operand::Reg(r)]) => {
            let opcode = isa::find_opcode(mnemonic, Family::RegOnly).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::RegOnly(opcode, *r))
        }
        ("PUSH" | "POP", [Operand::Seg(s)]) => {
            let opcode = isa::find_opcode(mnemonic, Family::SegPushPop).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::SegPushPop(opcode, *s))
        }

        ("INC" | "DEC" | "NEG" | "NOT" | "MUL" | "IMUL" | "DIV" | "IDIV", [Operand::Reg(r)]) => {
            let opcode = isa::find_opcode(mnemonic, Family::RegOnly).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::RegOnly(opcode, *r))
        }

        ("XCHG", [Operand::Reg(rd), Operand::Reg(rs)]) => {
            let opcode = isa::find_opcode("XCHG", Family::RegReg).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::RegReg(opcode, *rd, *rs))
        }

        ("ADD" | "SUB" | "ADC" | "SBC" | "CMP" | "AND" | "OR" | "XOR" | "TEST", [Operand::Reg(rd), Operand::Reg(rs)]) => {
            let opcode = isa::find_opcode(mnemonic, Family::RegReg).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::RegReg(opcode, *rd, *rs))
        }
        ("ADD" | "SUB" | "ADC" | "SBC" | "CMP" | "AND" | "OR" | "XOR" | "TEST", [Operand::Reg(rd), op]) => {
            let opcode = isa::find_opcode(mnemonic, Family::RegImm16).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::RegImm16(opcode, *rd, expect_mem_or_imm_expr(line, op)?.clone()))
        }
        ("ADD", [Operand::Sp, op]) => Ok(Form::SpImm16(isa::OP_ADD_SP_IMM16, expect_mem_or_imm_expr(line, op)?.clone())),
        ("SUB", [Operand::Sp, op]) => Ok(Form::SpImm16(isa::OP_SUB_SP_IMM16, expect_mem_or_imm_expr(line, op)?.clone())),

        ("SHL" | "SHR" | "SAR" | "ROL" | "ROR" | "RCL" | "RCR", [Operand::Reg(r), Operand::Cl]) => {
            let opcode = isa::find_opcode(mnemonic, Family::ShiftRotate).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::ShiftRotate(opcode, *r, ShiftCount::Cl))
        }
        ("SHL" | "SHR" | "SAR" | "ROL" | "ROR" | "RCL" | "RCR", [Operand::Reg(r), op]) => {
            let opcode = isa::find_opcode(mnemonic, Family::ShiftRotate).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::ShiftRotate(opcode, *r, ShiftCount::Expr(expect_mem_or_imm_expr(line, op)?.clone())))
        }

        ("MOV", [Operand::Reg(rd), Operand::Reg(rs)]) => {
            Ok(Form::RegReg(isa::find_opcode("MOV", Family::RegReg).unwrap(), *rd, *rs))
        }
        ("MOV", [Operand::Reg(rd), Operand::Seg(seg)]) => {
            let opcode = 0x13;
            Ok(Form::SegRegMove(opcode, *seg, *rd))
        }
        ("MOV", [Operand::Seg(seg), Operand::Reg(rs)]) => {
            let opcode = 0x14;
            Ok(Form::SegRegMove(opcode, *seg, *rs))
        }
        ("MOV", [Operand::Reg(rd), Operand::Sp]) => Ok(Form::RegOnly(isa::OP_MOV_RD_SP, *rd)),
        ("MOV", [Operand::Sp, Operand::Reg(rs)]) => Ok(Form::RegOnly(isa::OP_MOV_SP_RS, *rs)),
        ("MOV", [Operand::Reg(rd), Operand::Mem(addr)]) => {
            Ok(Form::LoadStoreDirect(0x20, *rd, addr.clone()))
        }
        ("MOV", [Operand::Mem(addr), Operand::Reg(rs)]) => {
            Ok(Form::LoadStoreDirect(0x21, *rs, addr.clone()))
        }
        ("MOV", [Operand::Reg(rd), Operand::MemIndexed(rb, disp)]) => {
            Ok(Form::LoadStoreIndexed(0x22, *rd, *rb, disp.clone()))
        }
        ("MOV", [Operand::MemIndexed(rb, disp), Operand::Reg(rs)]) => {
            Ok(Form::LoadStoreIndexed(0x23, *rs, *rb, disp.clone()))
        }
        ("MOV", [Operand::Reg(rd), Operand::MemSpIndexed(disp)]) => {
            Ok(Form::IndexedSp(0x29, *rd, disp.clone()))
        }
        ("MOV", [Operand::MemSpIndexed(disp), Operand::Reg(rs)]) => {
            Ok(Form::IndexedSp(0x2A, *rs, disp.clone()))
        }
        ("MOV", [Operand::Reg(rd), op]) => {
            Ok(Form::RegImm16(isa::find_opcode("MOV", Family::RegImm16).unwrap(), *rd, expect_mem_or_imm_expr(line, op)?.clone()))
        }

        ("LDS" | "LES", [Operand::Reg(rd), Operand::Mem(addr)]) => {
            let opcode = isa::find_opcode(mnemonic, Family::LoadStoreDirect).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::LoadStoreDirect(opcode, *rd, addr.clone()))
        }

        ("JMP" | "CALL", [Operand::Reg(r)]) => {
            let opcode = isa::find_opcode(mnemonic, Family::RegOnly).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::AbsBranchReg(opcode, *r))
        }
        ("JMP" | "CALL", [Operand::FarPtr(seg, off)]) => {
            let opcode = isa::find_opcode(mnemonic, Family::FarBranch).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::FarBranch(opcode, off.clone(), seg.clone()))
        }
        ("JMP" | "CALL" | "JZ" | "JNZ" | "JC" | "JNC" | "JS" | "JNS" | "JO" | "JNO" | "JL" | "JGE" | "JLE" | "JG"
        | "JA" | "JBE", [op]) => {
            let opcode = isa::find_opcode(mnemonic, Family::AbsBranch16).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::AbsBranch16(opcode, expect_mem_or_imm_expr(line, op)?.clone()))
        }

        ("JR" | "LOOP" | "LOOPZ" | "LOOPNZ", [op]) => {
            let opcode = isa::find_opcode(mnemonic, Family::RelBranch8).ok_or_else(|| syntax("unknown opcode"))?;
            Ok(Form::RelBranch8(opcode, expect_mem_or_imm_expr(line, op)?.clone()))
        }

        ("IN", [Operand::Reg(r), op]) => Ok(Form::IoIn(0xF0, *r, expect_mem_or_imm_expr(line, op)?.clone())),
        ("OUT", [op, Operand::Reg(r)]) => Ok(Form::IoOut(0xF1, *r, expect_mem_or_imm_expr(line, op)?.clone())),

        ("INT", [op]) => Ok(Form::Interrupt(0xF2, expect_mem_or_imm_expr(line, op)?.clone())),

        ("ENTER", [size, level]) => Ok(Form::Enter(
            0x48,
            expect_mem_or_imm_expr(line, size)?.clone(),
            expect_mem_or_imm_expr(line, level)?.clone(),
        )),

        ("REP" | "REPZ" | "REPNZ", [Operand::Mnemonic(inner)]) => {
            let opcode = isa::find_opcode(mnemonic, Family::RepPrefix).ok_or_else(|| syntax("unknown opcode"))?;
            isa::find_opcode(inner, Family::Implicit).ok_or_else(|| syntax("operand is not a string-primitive mnemonic"))?;
            Ok(Form::RepPrefix(opcode, inner.clone()))
        }

        _ => Err(syntax("no matching operand form for this mnemonic")),
    }
}

impl Form {
    pub fn encode(&self, addr: u32, symtab: &SymbolTable, line: usize) -> Result<Vec<u8>, AssembleError> {
        let next_addr = addr + self.size() as u32;
        let mut out = Vec::with_capacity(self.size() as usize);

        match self {
            Form::Implicit(op) => out.push(*op),
            Form::RegOnly(op, r) => {
                out.push(*op);
                out.push(*r);
            }
            Form::RegReg(op, rd, rs) => {
                out.push(*op);
                out.push(pack_nibbles(*rd, *rs));
            }
            Form::SegRegMove(op, seg, r) => {
                out.push(*op);
                out.push(pack_nibbles(*seg, *r));
            }
            Form::SegPushPop(op, seg) => {
                out.push(*op);
                out.push(*seg);
            }
            Form::RegImm16(op, r, expr) => {
                out.push(*op);
                out.push(*r);
                push_u16(&mut out, resolve(expr, symtab, line)? as u16);
            }
            Form::SpImm16(op, expr) => {
                out.push(*op);
                out.push(0);
                push_u16(&mut out, resolve(expr, symtab, line)? as u16);
            }
            Form::LoadStoreDirect(op, r, expr) => {
                out.push(*op);
                out.push(*r);
                push_u16(&mut out, resolve(expr, symtab, line)? as u16);
            }
            Form::LoadStoreIndexed(op, r, rb, expr) => {
                out.push(*op);
                out.push(pack_nibbles(*r, *rb));
                push_u16(&mut out, resolve(expr, symtab, line)? as u16);
            }
            Form::IndexedSp(op, r, expr) => {
                out.push(*op);
                out.push(*r);
                push_u16(&mut out, resolve(expr, symtab, line)? as u16);
            }
            Form::Interrupt(op, expr) => {
                out.push(*op);
                out.push(resolve(expr, symtab, line)? as u8);
            }
            Form::RelBranch8(op, expr) => {
                let target = resolve(expr, symtab, line)?;
                let disp = target - next_addr as i64;
                if !(-128..=127).contains(&disp) {
                    return Err(AssembleError::RelativeBranchOutOfRange { line, displacement: disp as i32 });
                }
                out.push(*op);
                out.push(disp as i8 as u8);
            }
            Form::AbsBranch16(op, expr) => {
                out.push(*op);
                push_u16(&mut out, resolve(expr, symtab, line)? as u16);
            }
            Form::AbsBranchReg(op, r) => {
                out.push(*op);
                out.push(*r);
            }
            Form::FarBranch(op, off, seg) => {
                out.push(*op);
                push_u16(&mut out, resolve(off, symtab, line)? as u16);
                push_u16(&mut out, resolve(seg, symtab, line)? as u16);
            }
            Form::RetImm16(op, expr) => {
                out.push(*op);
                push_u16(&mut out, resolve(expr, symtab, line)? as u16);
            }
            Form::ShiftRotate(op, r, count) => {
                let count4 = match count {
                    ShiftCount::Cl => 0u8,
                    ShiftCount::Expr(expr) => (resolve(expr, symtab, line)? as u8) & 0x0F,
                };
                out.push(*op);
                out.push(pack_nibbles(*r, count4));
            }
            Form::IoIn(op, r, expr) | Form::IoOut(op, r, expr) => {
                out.push(*op);
                out.push(*r);
                push_u16(&mut out, resolve(expr, symtab, line)? as u16);
            }
            Form::Enter(op, size, level) => {
                out.push(*op);
                push_u16(&mut out, resolve(size, symtab, line)? as u16);
                out.push(resolve(level, symtab, line)? as u8);
            }
            Form::RepPrefix(op, inner) => {
                out.push(*op);
                out.push(isa::find_opcode(inner, Family::Implicit).expect("validated in build_form"));
            }
        }

        debug_assert_eq!(out.len(), self.size() as usize);
        Ok(out)
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.push(value as u8);
    out.push((value >> 8) as u8);
}
