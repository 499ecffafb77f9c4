//! Two-pass linear-sweep disassembler.
//!
//! Pass 1 walks the image once to discover branch/call targets. Pass 2 walks
//! it again, emitting one [`Line`] per instruction and labelling any address
//! pass 1 flagged as a jump target. Never touches CPU state and never
//! consults a symbol table — an assembled image carries no symbol names by
//! the time it reaches here.

use std::collections::HashSet;

use crate::isa::registers::{reg_name, seg_name};
use crate::isa::{self, unpack_nibbles, Family};

/// Whether a [`Line`] is a real decoded instruction or a single raw byte
/// pass 2 couldn't decode (an unknown opcode, or a truncated trailing
/// instruction). Lets a caller distinguish the two without parsing `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeHint {
    Instruction,
    UnknownByte,
}

/// One disassembled line: the address it starts at, its raw bytes, an
/// optional `L_XXXX:` label if pass 1 found a branch into this address, the
/// rendered mnemonic/operand text, and whether that text is a real
/// instruction or a `DB 0xNN` fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub address: u32,
    pub bytes: Vec<u8>,
    pub label: Option<String>,
    pub text: String,
    pub hint: DecodeHint,
}

/// Disassemble `image`, whose first byte lives at physical address `base`.
pub fn disassemble(image: &[u8], base: u32) -> Vec<Line> {
    let targets = discover_targets(image, base);
    emit(image, base, &targets)
}

fn label_name(addr: u32) -> String {
    format!("L_{:04X}", addr & 0xFFFF)
}

/// Pass 1: record every statically-known branch/call target.
fn discover_targets(image: &[u8], base: u32) -> HashSet<u32> {
    let mut targets = HashSet::new();
    let mut offset = 0usize;
    while offset < image.len() {
        let opcode = image[offset];
        let def = isa::lookup(opcode);
        let size = instruction_len(def.family, image, offset);

        if offset + size <= image.len() {
            match def.family {
                Family::RelBranch8 => {
                    let disp = image[offset + 1] as i8 as i64;
                    let next = base as i64 + (offset + size) as i64;
                    targets.insert((next + disp) as u32);
                }
                Family::AbsBranch16 => {
                    let target = u16::from_le_bytes([image[offset + 1], image[offset + 2]]);
                    targets.insert(target as u32);
                }
                _ => {}
            }
        }

        offset += size;
    }
    targets
}

/// How many bytes the instruction at `image[offset..]` occupies, falling
/// back to a single raw byte when the table's declared size would run past
/// the end of the image (a truncated trailing instruction).
fn instruction_len(family: Family, image: &[u8], offset: usize) -> usize {
    let declared = family.size() as usize;
    if offset + declared <= image.len() {
        declared
    } else {
        1
    }
}

/// Pass 2: render every instruction, prefixing a label line where pass 1
/// found an incoming branch.
fn emit(image: &[u8], base: u32, targets: &HashSet<u32>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut offset = 0usize;
    while offset < image.len() {
        let address = base + offset as u32;
        let opcode = image[offset];
        let def = isa::lookup(opcode);

        if matches!(def.family, Family::Invalid) || offset + def.family.size() as usize > image.len() {
            lines.push(Line {
                address,
                bytes: vec![opcode],
                label: targets.contains(&address).then(|| label_name(address)),
                text: format!("DB 0x{opcode:02X}"),
                hint: DecodeHint::UnknownByte,
            });
            offset += 1;
            continue;
        }

        let size = def.family.size() as usize;
        let raw = &image[offset..offset + size];
        let text = render(def.opcode, def.mnemonic, def.family, raw, address, targets);
        lines.push(Line {
            address,
            bytes: raw.to_vec(),
            label: targets.contains(&address).then(|| label_name(address)),
            text,
            hint: DecodeHint::Instruction,
        });
        offset += size;
    }
    lines
}

fn word(raw: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([raw[at], raw[at + 1]])
}

fn signed_disp(raw: &[u8], at: usize) -> i16 {
    word(raw, at) as i16
}

fn fmt_disp(disp: i16) -> String {
    if disp < 0 {
        format!("-{:#X}", -(disp as i32))
    } else {
        format!("+{:#X}", disp)
    }
}

fn fmt_branch_target(target: u32, targets: &HashSet<u32>) -> String {
    if targets.contains(&target) {
        label_name(target)
    } else {
        format!("0x{:04X}", target & 0xFFFF)
    }
}

fn render(opcode: u8, mnemonic: &str, family: Family, raw: &[u8], address: u32, targets: &HashSet<u32>) -> String {
    match family {
        Family::Implicit => mnemonic.to_string(),

        Family::RegOnly => {
            let r = raw[1] & 0x07;
            match opcode {
                isa::OP_MOV_RD_SP => format!("MOV {}, SP", reg_name(r)),
                isa::OP_MOV_SP_RS => format!("MOV SP, {}", reg_name(r)),
                _ if matches!(mnemonic, "JMP" | "CALL") => format!("{mnemonic} {}", reg_name(r)),
                _ => format!("{mnemonic} {}", reg_name(r)),
            }
        }

        Family::RegReg => {
            let (a, b) = unpack_nibbles(raw[1]);
            format!("{mnemonic} {}, {}", reg_name(a), reg_name(b))
        }

        Family::SegRegMove => {
            let (seg, reg) = unpack_nibbles(raw[1]);
            if opcode == 0x13 {
                format!("MOV {}, {}", reg_name(reg), seg_name(seg))
            } else {
                format!("MOV {}, {}", seg_name(seg), reg_name(reg))
            }
        }

        Family::SegPushPop => format!("{mnemonic} {}", seg_name(raw[1] & 0x03)),

        Family::RegImm16 => {
            let imm = word(raw, 2);
            if opcode == isa::OP_ADD_SP_IMM16 || opcode == isa::OP_SUB_SP_IMM16 {
                format!("{mnemonic} SP, 0x{imm:04X}")
            } else {
                format!("{mnemonic} {}, 0x{imm:04X}", reg_name(raw[1] & 0x07))
            }
        }

        Family::LoadStoreDirect => {
            let r = raw[1] & 0x07;
            let addr = word(raw, 2);
            match mnemonic {
                "LDS" | "LES" => format!("{mnemonic} {}, [0x{addr:04X}]", reg_name(r)),
                _ if opcode == 0x21 => format!("MOV [0x{addr:04X}], {}", reg_name(r)),
                _ => format!("MOV {}, [0x{addr:04X}]", reg_name(r)),
            }
        }

        Family::LoadStoreIndexed => {
            let (r, rb) = unpack_nibbles(raw[1]);
            let disp = fmt_disp(signed_disp(raw, 2));
            if opcode == 0x23 {
                format!("MOV [{}{disp}], {}", reg_name(rb), reg_name(r))
            } else {
                format!("MOV {}, [{}{disp}]", reg_name(r), reg_name(rb))
            }
        }

        Family::IndexedSp => {
            let r = raw[1] & 0x07;
            let disp = fmt_disp(signed_disp(raw, 2));
            if opcode == 0x2A {
                format!("MOV [SP{disp}], {}", reg_name(r))
            } else {
                format!("MOV {}, [SP{disp}]", reg_name(r))
            }
        }

        Family::Interrupt => format!("INT 0x{:02X}", raw[1]),

        Family::RelBranch8 => {
            let disp = raw[1] as i8 as i64;
            let next = address as i64 + 2;
            let target = (next + disp) as u32;
            format!("{mnemonic} {}", fmt_branch_target(target, targets))
        }

        Family::AbsBranch16 => {
            let target = word(raw, 1) as u32;
            format!("{mnemonic} {}", fmt_branch_target(target, targets))
        }

        Family::RetImm16 => format!("{mnemonic} 0x{:04X}", word(raw, 1)),

        Family::ShiftRotate => {
            let (r, count) = unpack_nibbles(raw[1]);
            if count == 0 {
                format!("{mnemonic} {}, CL", reg_name(r))
            } else {
                format!("{mnemonic} {}, {count}", reg_name(r))
            }
        }

        Family::IoPort => {
            let r = raw[1] & 0x07;
            let port = word(raw, 2);
            if opcode == 0xF1 {
                format!("OUT 0x{port:04X}, {}", reg_name(r))
            } else {
                format!("IN {}, 0x{port:04X}", reg_name(r))
            }
        }

        Family::Enter => format!("ENTER 0x{:04X}, {}", word(raw, 1), raw[3]),

        Family::RepPrefix => {
            let inner_def = isa::lookup(raw[1]);
            format!("{mnemonic} {}", inner_def.mnemonic)
        }

        Family::FarBranch => {
            let off = word(raw, 1);
            let seg = word(raw, 3);
            format!("{mnemonic} {seg:04X}:{off:04X}")
        }

        Family::Invalid => unreachable!("handled before render is called"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_plain_register_immediate_move() {
        let lines = disassemble(&[0x11, 0x00, 0x05, 0x00], 0x100);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "MOV AX, 0x0005");
        assert_eq!(lines[0].address, 0x100);
    }

    #[test]
    fn labels_a_backward_relative_branch_target() {
        // NOP ; JR back to the NOP
        let image = [0x00, 0xB0, (-2i8) as u8];
        let lines = disassemble(&image, 0x100);
        assert_eq!(lines[0].label.as_deref(), Some("L_0100"));
        assert_eq!(lines[1].text, "JR L_0100");
    }

    #[test]
    fn labels_a_forward_absolute_jump_target() {
        // JZ 0x0105 ; NOP ; NOP (two filler bytes to land at 0x0105) ; HLT
        let image = [0xA2, 0x05, 0x01, 0x00, 0x00, 0x01];
        let lines = disassemble(&image, 0x100);
        assert_eq!(lines[0].text, "JZ L_0105");
        let hlt = lines.iter().find(|l| l.address == 0x105).unwrap();
        assert_eq!(hlt.label.as_deref(), Some("L_0105"));
        assert_eq!(hlt.text, "HLT");
    }

    #[test]
    fn unknown_opcode_renders_as_a_data_byte() {
        let lines = disassemble(&[0x09], 0x100);
        assert_eq!(lines[0].text, "DB 0x09");
        assert_eq!(lines[0].hint, DecodeHint::UnknownByte);
    }

    #[test]
    fn a_real_instruction_is_hinted_accordingly() {
        let lines = disassemble(&[0x00], 0x100); // NOP
        assert_eq!(lines[0].hint, DecodeHint::Instruction);
    }

    #[test]
    fn renders_indexed_and_far_forms() {
        let lines = disassemble(&[0x22, 0x01, 0x04, 0x00], 0x100);
        assert_eq!(lines[0].text, "MOV AX, [BX+0x4]");

        let lines = disassemble(&[0xC3, 0x00, 0x02, 0x10, 0x00], 0x100);
        assert_eq!(lines[0].text, "JMP 0010:0200");
    }

    #[test]
    fn renders_shift_with_cl_and_literal_count() {
        let lines = disassemble(&[0x80, 0x00], 0x100);
        assert_eq!(lines[0].text, "SHL AX, CL");
        let lines = disassemble(&[0x80, 0x03], 0x100);
        assert_eq!(lines[0].text, "SHL AX, 3");
    }

    #[test]
    fn renders_rep_prefix_with_inner_mnemonic() {
        let lines = disassemble(&[0xE8, 0xE0], 0x100);
        assert_eq!(lines[0].text, "REP MOVSB");
    }
}
