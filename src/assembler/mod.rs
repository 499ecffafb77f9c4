//! Two-pass Micro16 assembler.
//!
//! Pass 1 walks the source, building the symbol table and computing each
//! instruction's size from operand shape alone (never from a resolved
//! value, which is what makes forward references legal). Pass 2 re-walks
//! the same parsed lines, resolving every expression against the
//! now-complete table and emitting bytes.

pub mod encode;
pub mod lexer;
pub mod parser;
pub mod symbols;

use crate::error::AssembleError;
use crate::memory::Memory;
use encode::Form;
use parser::{ByteItem, Directive, Expr, ParsedLine, Stmt};
use symbols::{Symbol, SymbolTable};

/// The assembled output: a contiguous byte buffer and the physical address
/// its first byte belongs at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub bytes: Vec<u8>,
    pub origin: u32,
}

/// Assemble `source` into a byte image. The image spans from the lowest
/// address any line wrote to, to the highest; gaps left by `ORG` jumps are
/// zero-filled.
pub fn assemble(source: &str) -> Result<Assembled, AssembleError> {
    let parsed: Vec<ParsedLine> = source
        .lines()
        .enumerate()
        .map(|(i, line)| parser::parse_line(i + 1, line))
        .collect::<Result<_, _>>()?;

    let mut symtab = SymbolTable::new();
    let mut forms: Vec<Option<Form>> = Vec::with_capacity(parsed.len());

    // Pass 1: addresses and sizes.
    let mut segment: u16 = 0;
    let mut offset: u16 = 0x0100;
    for line in &parsed {
        let addr = Memory::physical_address(segment, offset);

        if let Some(name) = &line.label {
            symtab
                .define(name, Symbol::Label(addr))
                .map_err(|_| AssembleError::DuplicateSymbol { line: line.line_no, name: name.clone() })?;
        }
        if let Some((name, expr)) = &line.equate {
            let value = resolve_top(expr, &symtab, line.line_no)?;
            symtab
                .define(name, Symbol::Equate(value))
                .map_err(|_| AssembleError::DuplicateSymbol { line: line.line_no, name: name.clone() })?;
        }

        match &line.stmt {
            None => forms.push(None),
            Some(Stmt::Directive(Directive::Org(expr))) => {
                offset = resolve_top(expr, &symtab, line.line_no)? as u16;
                forms.push(None);
            }
            Some(Stmt::Directive(Directive::Segment(expr))) => {
                segment = resolve_top(expr, &symtab, line.line_no)? as u16;
                forms.push(None);
            }
            Some(Stmt::Directive(Directive::Bytes(items))) => {
                offset = offset.wrapping_add(byte_items_len(items) as u16);
                forms.push(None);
            }
            Some(Stmt::Directive(Directive::Words(items))) => {
                offset = offset.wrapping_add((items.len() * 2) as u16);
                forms.push(None);
            }
            Some(Stmt::Directive(Directive::Dwords(items))) => {
                offset = offset.wrapping_add((items.len() * 4) as u16);
                forms.push(None);
            }
            Some(Stmt::Directive(Directive::Space(expr))) => {
                let n = resolve_top(expr, &symtab, line.line_no)?;
                offset = offset.wrapping_add(n as u16);
                forms.push(None);
            }
            Some(Stmt::Instruction { mnemonic, operands }) => {
                let form = encode::build_form(line.line_no, mnemonic, operands)?;
                offset = offset.wrapping_add(form.size());
                forms.push(Some(form));
            }
        }
    }

    // Pass 2: emission.
    let mut chunks: Vec<(u32, Vec<u8>)> = Vec::new();
    let mut segment: u16 = 0;
    let mut offset: u16 = 0x0100;
    for (line, form) in parsed.iter().zip(forms.iter()) {
        let addr = Memory::physical_address(segment, offset);

        match &line.stmt {
            None => {}
            Some(Stmt::Directive(Directive::Org(expr))) => {
                offset = resolve_top(expr, &symtab, line.line_no)? as u16;
            }
            Some(Stmt::Directive(Directive::Segment(expr))) => {
                segment = resolve_top(expr, &symtab, line.line_no)? as u16;
            }
            Some(Stmt::Directive(Directive::Bytes(items))) => {
                let bytes = emit_bytes(items, &symtab, line.line_no)?;
                offset = offset.wrapping_add(bytes.len() as u16);
                chunks.push((addr, bytes));
            }
            Some(Stmt::Directive(Directive::Words(items))) => {
                let mut bytes = Vec::with_capacity(items.len() * 2);
                for expr in items {
                    let v = resolve_top(expr, &symtab, line.line_no)? as u16;
                    bytes.push(v as u8);
                    bytes.push((v >> 8) as u8);
                }
                offset = offset.wrapping_add(bytes.len() as u16);
                chunks.push((addr, bytes));
            }
            Some(Stmt::Directive(Directive::Dwords(items))) => {
                let mut bytes = Vec::with_capacity(items.len() * 4);
                for expr in items {
                    let v = resolve_top(expr, &symtab, line.line_no)? as u32;
                    bytes.extend_from_slice(&v.to_le_bytes());
                }
                offset = offset.wrapping_add(bytes.len() as u16);
                chunks.push((addr, bytes));
            }
            Some(Stmt::Directive(Directive::Space(expr))) => {
                let n = resolve_top(expr, &symtab, line.line_no)? as u16;
                offset = offset.wrapping_add(n);
                chunks.push((addr, vec![0u8; n as usize]));
            }
            Some(Stmt::Instruction { .. }) => {
                let form = form.as_ref().expect("instruction form computed in pass 1");
                let bytes = form.encode(addr, &symtab, line.line_no)?;
                offset = offset.wrapping_add(bytes.len() as u16);
                chunks.push((addr, bytes));
            }
        }
    }

    Ok(link(chunks, parsed.last().map(|l| l.line_no).unwrap_or(1))?)
}

/// Lay out the emitted chunks into one contiguous buffer spanning the
/// minimum address written to the maximum, zero-filling any gaps `ORG`
/// jumps left behind.
fn link(chunks: Vec<(u32, Vec<u8>)>, last_line: usize) -> Result<Assembled, AssembleError> {
    let non_empty: Vec<_> = chunks.into_iter().filter(|(_, b)| !b.is_empty()).collect();
    if non_empty.is_empty() {
        return Ok(Assembled { bytes: Vec::new(), origin: 0x0100 });
    }
    let origin = non_empty.iter().map(|(addr, _)| *addr).min().unwrap();
    let end = non_empty.iter().map(|(addr, bytes)| addr + bytes.len() as u32).max().unwrap();
    let size = (end - origin) as usize;
    if size > crate::memory::MEM_SIZE {
        return Err(AssembleError::CapacityExceeded { line: last_line, message: format!("assembled image is {size} bytes, exceeding the 1 MiB address space") });
    }
    let mut out = vec![0u8; size];
    for (addr, bytes) in non_empty {
        let start = (addr - origin) as usize;
        out[start..start + bytes.len()].copy_from_slice(&bytes);
    }
    Ok(Assembled { bytes: out, origin })
}

fn byte_items_len(items: &[ByteItem]) -> usize {
    items
        .iter()
        .map(|item| match item {
            ByteItem::Expr(_) => 1,
            ByteItem::Str(bytes) => bytes.len(),
        })
        .sum()
}

fn emit_bytes(items: &[ByteItem], symtab: &SymbolTable, line: usize) -> Result<Vec<u8>, AssembleError> {
    let mut out = Vec::new();
    for item in items {
        match item {
            ByteItem::Expr(expr) => out.push(resolve_top(expr, symtab, line)? as u8),
            ByteItem::Str(bytes) => out.extend_from_slice(bytes),
        }
    }
    Ok(out)
}

fn resolve_top(expr: &Expr, symtab: &SymbolTable, line: usize) -> Result<i64, AssembleError> {
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
