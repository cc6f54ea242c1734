use crate::ast::AddressingMode;

/// Infer the addressing mode from the operand text alone.
///
/// First match wins, and the patterns overlap, so the order is significant.
/// Note that the mode only depends on how the operand is spelled: a bare
/// symbol resolves to `Absolute` no matter where its address ends up, and
/// `$080` is `Absolute` even though the value fits a byte. Branch mnemonics
/// are forced to `Relative` by the assembler afterwards.
pub fn detect_addressing_mode(operand: Option<&str>) -> AddressingMode {
    let operand = match operand {
        Some(operand) => operand.trim(),
        None => return AddressingMode::Implied,
    };
    if operand.is_empty() {
        return AddressingMode::Implied;
    }
    if operand.starts_with('#') {
        return AddressingMode::Immediate;
    }
    if operand.contains(",X") {
        if operand.starts_with('(') && operand.as_bytes()[operand.len() - 3] == b')' {
            return AddressingMode::IndirectIndexedX;
        }
        return if operand.len() <= 5 {
            AddressingMode::ZeroPageX
        } else {
            AddressingMode::AbsoluteX
        };
    }
    if operand.contains(",Y") {
        if operand.starts_with('(') && operand.contains("),Y") {
            return AddressingMode::IndirectIndexedY;
        }
        return if operand.len() <= 5 {
            AddressingMode::ZeroPageY
        } else {
            AddressingMode::AbsoluteY
        };
    }
    if operand.starts_with('(') && operand.ends_with(')') {
        return AddressingMode::Indirect;
    }
    if is_zero_page_form(operand) {
        return AddressingMode::ZeroPage;
    }
    AddressingMode::Absolute
}

/// `$` followed by at most two hex digits, the one-byte spelling.
fn is_zero_page_form(operand: &str) -> bool {
    operand.len() <= 3
        && operand.starts_with('$')
        && operand[1..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parse a numeric literal: `$nn` hex, `#$nn` hex, `#nn` decimal, `%nn`
/// binary or bare decimal. Returns `None` for anything shaped like a symbol
/// name.
pub fn parse_literal(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("#$").or_else(|| text.strip_prefix('$')) {
        return u16::from_str_radix(hex, 16).ok();
    }
    if let Some(decimal) = text.strip_prefix('#') {
        return decimal.parse().ok();
    }
    if let Some(binary) = text.strip_prefix('%') {
        return u16::from_str_radix(binary, 2).ok();
    }
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        return text.parse().ok();
    }
    None
}

/// Strip the addressing decoration from an operand, leaving the literal or
/// symbol that names its value. `($80),X` and `($80,X)` both reduce to `$80`.
pub fn operand_value_text(operand: &str) -> &str {
    let mut core = operand.trim();
    core = core.strip_prefix('#').unwrap_or(core);
    for _ in 0..2 {
        if let Some(stripped) = core.strip_suffix(",X").or_else(|| core.strip_suffix(",Y")) {
            core = stripped;
        }
        if core.starts_with('(') && core.ends_with(')') && core.len() >= 2 {
            core = &core[1..core.len() - 1];
        }
    }
    core
}

/// The symbol the operand refers to, if its value comes from the symbol
/// table rather than a literal.
pub fn operand_symbol(operand: &str) -> Option<&str> {
    let core = operand_value_text(operand);
    if core.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        Some(core)
    } else {
        None
    }
}
