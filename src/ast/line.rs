use std::fmt;

use crate::ast::Mnemonic;

/// A CPU instruction with its operand still in textual form.
///
/// The operand keeps the exact spelling it was written (or emitted) with.
/// The addressing mode is inferred from that text, and the operand's value is
/// only resolved against the symbol table during assembly, so labels may be
/// used before they are defined.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub operand: Option<String>,
}

impl Instruction {
    pub fn new(mnemonic: Mnemonic, operand: Option<String>) -> Instruction {
        Instruction { mnemonic, operand }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Some(operand) => write!(f, "{} {}", self.mnemonic, operand),
            None => write!(f, "{}", self.mnemonic),
        }
    }
}

/// A command to the assembler that does not encode to an instruction.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Directive {
    /// `.org $nnnn`, places the following code at the given address.
    Origin(u16),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Origin(address) => write!(f, ".org ${:04X}", address),
        }
    }
}

/// A single line of a program, the unit the two-pass assembler walks.
///
/// The sequence order is the program order. A label names the address of the
/// next emitted byte.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Line {
    /// A label marking a location in the code, e.g. `loop:`
    Label(String),
    /// A CPU instruction
    Instruction(Instruction),
    /// A comment carried through to rendered text, dropped by the assembler
    Comment(String),
    /// An assembler directive, e.g. `.org $0800`
    Directive(Directive),
}

impl Line {
    pub fn instruction(mnemonic: Mnemonic, operand: impl Into<String>) -> Line {
        Line::Instruction(Instruction::new(mnemonic, Some(operand.into())))
    }

    pub fn implied(mnemonic: Mnemonic) -> Line {
        Line::Instruction(Instruction::new(mnemonic, None))
    }

    pub fn label(name: impl Into<String>) -> Line {
        Line::Label(name.into())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Label(name) => write!(f, "{}:", name),
            Line::Instruction(instruction) => write!(f, "  {}", instruction),
            Line::Comment(text) => write!(f, "; {}", text),
            Line::Directive(directive) => write!(f, "{}", directive),
        }
    }
}

/// Render a line sequence as assembler-ready text.
pub fn render(lines: &[Line]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(&line.to_string());
        text.push('\n');
    }
    text
}
