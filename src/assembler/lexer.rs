//! Numeric-literal grammar and comma-aware operand splitting.

/// Parse a numeric literal: `0x…`/`$…` hex, `0b…` binary, decimal, or a
/// single-character literal `'A'` (with escapes `\n \r \t \0 \\ \'`).
pub fn parse_number(text: &str) -> Option<i64> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    if let Some(rest) = t.strip_prefix('-') {
        return parse_number(rest).map(|v| -v);
    }
    if let Some(rest) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return i64::from_str_radix(rest, 16).ok();
    }
    if let Some(rest) = t.strip_prefix('$') {
        return i64::from_str_radix(rest, 16).ok();
    }
    if let Some(rest) = t.strip_prefix("0b").or_else(|| t.strip_prefix("0B")) {
        return i64::from_str_radix(rest, 2).ok();
    }
    if t.starts_with('\'') && t.ends_with('\'') && t.len() >= 3 {
        return parse_char_literal(&t[1..t.len() - 1]);
    }
    t.parse::<i64>().ok()
}

fn parse_char_literal(inner: &str) -> Option<i64> {
    let mut chars = inner.chars();
    let c = chars.next()?;
    let value = if c == '\\' {
        match chars.next()? {
            'n' => b'\n' as i64,
            'r' => b'\r' as i64,
            't' => b'\t' as i64,
            '0' => 0,
            '\\' => b'\\' as i64,
            '\'' => b'\'' as i64,
            other => other as i64,
        }
    } else {
        c as i64
    };
    if chars.next().is_some() {
        return None;
    }
    Some(value)
}

/// Parse a `"…"`/`'…'` string literal's raw bytes, for `DB "text"` forms.
/// Returns `None` if `text` isn't a quoted string (a single-character `'A'`
/// literal is handled by `parse_number` instead, and is tried first by the
/// caller).
pub fn parse_string_literal(text: &str) -> Option<Vec<u8>> {
    let t = text.trim();
    let quote = t.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    if t.len() < 2 || !t.ends_with(quote) {
        return None;
    }
    Some(t[1..t.len() - 1].bytes().collect())
}

/// Is `s` a valid identifier: `[A-Za-z_][A-Za-z0-9_]*`, max 63 characters.
pub fn is_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > 63 {
        return false;
    }
    let mut chars = s.chars();
    let first = chars.next().unwrap();
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a comma-separated operand list, respecting `[...]` nesting and
/// quoted strings so that e.g. `MOV AX, [BX+4]` splits cleanly and a comma
/// inside a `DB "a,b"` string literal is not mistaken for a separator.
pub fn split_operands(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_quote: Option<char> = None;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '[' if in_quote.is_none() => {
                depth += 1;
                current.push(c);
            }
            ']' if in_quote.is_none() => {
                depth -= 1;
                current.push(c);
            }
            '"' | '\'' if in_quote.is_none() => {
                in_quote = Some(c);
                current.push(c);
            }
            q if in_quote == Some(q) => {
                in_quote = None;
                current.push(q);
            }
            ',' if depth == 0 && in_quote.is_none() => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            other => current.push(other),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}
