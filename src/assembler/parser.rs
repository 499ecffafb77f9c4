//! Line-level parsing: labels, equates, directives, and instructions into a
//! structural form that both assembler passes share. Parsing never consults
//! the symbol table — operand *shape* (and therefore instruction size) is
//! syntactic, which is what makes forward references possible at all.

use crate::assembler::lexer::{is_identifier, parse_number, parse_string_literal, split_operands};
use crate::error::AssembleError;
use crate::isa::registers::{parse_reg, parse_seg};

/// An operand expression: a literal, a symbol, or `symbol±number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(i64),
    Symbol(String),
    SymbolOffset(String, i64),
}

/// A parsed operand, still in source form (registers resolved, symbols not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Reg(u8),
    Seg(u8),
    Sp,
    /// The `CL` pseudo-operand on a shift: "take the count from CX at runtime".
    Cl,
    Imm(Expr),
    /// `[addr]`
    Mem(Expr),
    /// `[Rb+disp]` / `[Rb-disp]`
    MemIndexed(u8, Expr),
    /// `[SP+disp]` / `[SP-disp]`
    MemSpIndexed(Expr),
    /// `seg:off`
    FarPtr(Expr, Expr),
    /// The inner string-primitive mnemonic named by a `REP`/`REPZ`/`REPNZ`
    /// line's operand (e.g. the `MOVSB` in `REP MOVSB`) — not a symbol.
    Mnemonic(String),
}

/// One `DB`/`.BYTE` item: either a literal expression or a raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteItem {
    Expr(Expr),
    Str(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Org(Expr),
    Segment(Expr),
    Bytes(Vec<ByteItem>),
    Words(Vec<Expr>),
    Dwords(Vec<Expr>),
    Space(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Directive(Directive),
    Instruction { mnemonic: String, operands: Vec<Operand> },
}

/// Everything pulled out of one source line, before any symbol resolution.
#[derive(Debug, Clone, Default)]
pub struct ParsedLine {
    pub line_no: usize,
    pub label: Option<String>,
    pub equate: Option<(String, Expr)>,
    pub stmt: Option<Stmt>,
}

fn err(line: usize, message: impl Into<String>) -> AssembleError {
    AssembleError::Syntax { line, message: message.into() }
}

fn parse_expr(line: usize, token: &str) -> Result<Expr, AssembleError> {
    let t = token.trim();
    if t.is_empty() {
        return Err(err(line, "expected an expression"));
    }
    if let Some(n) = parse_number(t) {
        return Ok(Expr::Number(n));
    }
    for (i, c) in t.char_indices().skip(1) {
        if c == '+' || c == '-' {
            let (sym, rest) = t.split_at(i);
            if let Some(n) = parse_number(rest) {
                if is_identifier(sym.trim()) {
                    return Ok(Expr::SymbolOffset(sym.trim().to_ascii_uppercase(), n));
                }
            }
        }
    }
    if is_identifier(t) {
        return Ok(Expr::Symbol(t.to_ascii_uppercase()));
    }
    Err(err(line, format!("invalid operand '{t}'")))
}

/// Parse one bracketed memory operand's interior: `SP+4`, `BX-2`, `TABLE`, …
fn parse_mem_operand(line: usize, inner: &str) -> Result<Operand, AssembleError> {
    let inner = inner.trim();
    let split_at_sign = inner.char_indices().skip(1).find(|&(_, c)| c == '+' || c == '-');

    if let Some((i, _)) = split_at_sign {
        let (base, disp) = inner.split_at(i);
        let base = base.trim().to_ascii_uppercase();
        let disp_expr = parse_expr(line, disp)?;
        if base == "SP" {
            return Ok(Operand::MemSpIndexed(disp_expr));
        }
        if let Some(r) = parse_reg(&base) {
            return Ok(Operand::MemIndexed(r, disp_expr));
        }
        return Err(err(line, format!("unknown base register '{base}' in indexed operand")));
    }

    if inner.eq_ignore_ascii_case("SP") {
        return Ok(Operand::MemSpIndexed(Expr::Number(0)));
    }
    if let Some(r) = parse_reg(&inner.to_ascii_uppercase()) {
        return Ok(Operand::MemIndexed(r, Expr::Number(0)));
    }
    Ok(Operand::Mem(parse_expr(line, inner)?))
}

fn parse_operand(line: usize, token: &str) -> Result<Operand, AssembleError> {
    let t = token.trim();
    if t.is_empty() {
        return Err(err(line, "empty operand"));
    }
    if let Some(inner) = t.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return parse_mem_operand(line, inner);
    }
    let upper = t.to_ascii_uppercase();
    if upper == "SP" {
        return Ok(Operand::Sp);
    }
    if upper == "CL" {
        return Ok(Operand::Cl);
    }
    if let Some(s) = parse_seg(&upper) {
        return Ok(Operand::Seg(s));
    }
    if let Some(r) = parse_reg(&upper) {
        return Ok(Operand::Reg(r));
    }
    if let Some(colon) = t.find(':') {
        let (seg, off) = t.split_at(colon);
        let off = &off[1..];
        return Ok(Operand::FarPtr(parse_expr(line, seg)?, parse_expr(line, off)?));
    }
    let t = t.strip_prefix('#').unwrap_or(t);
    Ok(Operand::Imm(parse_expr(line, t)?))
}

fn parse_byte_items(line: usize, text: &str) -> Result<Vec<ByteItem>, AssembleError> {
    split_operands(text)
        .into_iter()
        .map(|tok| {
            if let Some(bytes) = parse_string_literal(&tok) {
                if parse_number(&tok).is_some() {
                    // a single-character '...' literal: treat as a number, not a string,
                    // matching the spec's char-literal grammar.
                    return Ok(ByteItem::Expr(parse_expr(line, &tok)?));
                }
                Ok(ByteItem::Str(bytes))
            } else {
                Ok(ByteItem::Expr(parse_expr(line, &tok)?))
            }
        })
        .collect()
}

fn parse_directive(line: usize, name: &str, rest: &str) -> Result<Option<Directive>, AssembleError> {
    let name = name.trim_start_matches('.').to_ascii_uppercase();
    let operands = || split_operands(rest);
    Ok(Some(match name.as_str() {
        "ORG" => Directive::Org(parse_expr(line, rest.trim())?),
        "SEGMENT" => Directive::Segment(parse_expr(line, rest.trim())?),
        "DB" | "BYTE" => Directive::Bytes(parse_byte_items(line, rest)?),
        "DW" | "WORD" => {
            let exprs = operands().iter().map(|t| parse_expr(line, t)).collect::<Result<_, _>>()?;
            Directive::Words(exprs)
        }
        "DD" | "DWORD" => {
            let exprs = operands().iter().map(|t| parse_expr(line, t)).collect::<Result<_, _>>()?;
            Directive::Dwords(exprs)
        }
        "DS" | "SPACE" => Directive::Space(parse_expr(line, rest.trim())?),
        _ => return Ok(None),
    }))
}

/// Parse one source line. Blank and comment-only lines return a mostly-empty
/// `ParsedLine` (still carrying the line number for diagnostics).
pub fn parse_line(line_no: usize, raw: &str) -> Result<ParsedLine, AssembleError> {
    let without_comment = match raw.find(';') {
        Some(i) => &raw[..i],
        None => raw,
    };
    let text = without_comment.trim();
    let mut result = ParsedLine { line_no, ..Default::default() };
    if text.is_empty() {
        return Ok(result);
    }

    let mut rest = text;

    // `NAME EQU value` / `NAME = value`
    if let Some(eq_pos) = rest.find('=') {
        let name = rest[..eq_pos].trim();
        if is_identifier(name) {
            let value = parse_expr(line_no, &rest[eq_pos + 1..])?;
            result.equate = Some((name.to_ascii_uppercase(), value));
            return Ok(result);
        }
    }
    {
        let upper = rest.to_ascii_uppercase();
        if let Some(pos) = upper.find(" EQU ") {
            let name = rest[..pos].trim();
            if is_identifier(name) {
                let value = parse_expr(line_no, &rest[pos + 5..])?;
                result.equate = Some((name.to_ascii_uppercase(), value));
                return Ok(result);
            }
        }
    }

    // optional label
    if let Some(colon) = rest.find(':') {
        let candidate = rest[..colon].trim();
        if is_identifier(candidate) {
            result.label = Some(candidate.to_ascii_uppercase());
            rest = rest[colon + 1..].trim();
        }
    }

    if rest.is_empty() {
        return Ok(result);
    }

    let (head, tail) = match rest.find(char::is_whitespace) {
        Some(i) => (&rest[..i], rest[i..].trim()),
        None => (rest, ""),
    };

    if let Some(directive) = parse_directive(line_no, head, tail)? {
        result.stmt = Some(Stmt::Directive(directive));
        return Ok(result);
    }

    let mnemonic = head.to_ascii_uppercase();
    let operands = if matches!(mnemonic.as_str(), "REP" | "REPZ" | "REPNZ") {
        vec![Operand::Mnemonic(tail.trim().to_ascii_uppercase())]
    } else {
        split_operands(tail)
            .iter()
            .map(|tok| parse_operand(line_no, tok))
            .collect::<Result<Vec<_>, _>>()?
    };
    result.stmt = Some(Stmt::Instruction { mnemonic, operands });
    Ok(result)
}
