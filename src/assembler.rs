use thiserror::Error;

use crate::ast::{AddressingMode, Directive, Instruction, Line, Mnemonic};
use crate::layout::MemoryLayout;
use crate::symbols::{SymbolError, SymbolTable};

/// Addressing-mode detection and operand value parsing.
pub mod addressing;
/// The 6502 instruction catalog.
pub mod opcode;
/// Parses assembly text into structured lines.
pub mod parser;

use addressing::{operand_symbol, operand_value_text, parse_literal};
use opcode::INSTRUCTION_TABLE;

/// A single diagnostic tied to a line of the program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct LineError {
    pub line: usize,
    pub kind: ErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),
    #[error("malformed label: {0}")]
    MalformedLabel(String),
    #[error("unknown directive: {0}")]
    UnknownDirective(String),
    #[error("malformed directive: {0}")]
    MalformedDirective(String),
    #[error("{mnemonic} does not support {mode} addressing")]
    UnsupportedAddressingMode {
        mnemonic: Mnemonic,
        mode: AddressingMode,
    },
    #[error("undefined symbol: {0}")]
    UndefinedSymbol(String),
    #[error("malformed operand: {0}")]
    MalformedOperand(String),
    #[error("missing operand")]
    MissingOperand,
    #[error("branch to {target:#06x} out of range (offset {offset})")]
    BranchOutOfRange { target: u16, offset: i32 },
    #[error(".org {0:#06x} goes backwards")]
    OriginBackwards(u16),
    #[error("program does not fit in the 64 KiB address space")]
    ProgramTooLarge,
    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

/// Failure of an assembly run, carrying every diagnostic that was collected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render_errors(.0))]
pub struct AssemblerError(pub Vec<LineError>);

fn render_errors(errors: &[LineError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The assembled program.
#[derive(Debug, PartialEq, Eq)]
pub struct Assembly {
    /// Address of the first byte.
    pub origin: u16,
    /// The machine code.
    pub bytes: Vec<u8>,
    /// Every label, resolved. Kept for diagnostics.
    pub symbols: SymbolTable,
}

/// Two-pass assembler over structured [`Line`]s.
///
/// The first pass sizes every instruction and records label addresses, the
/// second encodes with the full symbol table at hand. That is what makes
/// forward references legal. An assembler is consumed by a run; a new
/// program needs a new assembler.
#[derive(Debug)]
pub struct Assembler {
    origin: u16,
    symbols: SymbolTable,
    errors: Vec<LineError>,
}

impl Assembler {
    pub fn new(layout: &MemoryLayout) -> Assembler {
        Assembler {
            origin: layout.program_origin,
            symbols: SymbolTable::new(),
            errors: Vec::new(),
        }
    }

    /// Assemble a textual program.
    #[tracing::instrument(skip(self, source))]
    pub fn assemble(self, source: &str) -> Result<Assembly, AssemblerError> {
        let (lines, errors) = parser::parse_source(source);
        if !errors.is_empty() {
            return Err(AssemblerError(errors));
        }
        self.run(&lines)
    }

    /// Assemble lines the compiler emitted, skipping the text round trip.
    #[tracing::instrument(skip(self, lines))]
    pub fn assemble_lines(self, lines: &[Line]) -> Result<Assembly, AssemblerError> {
        let numbered: Vec<(usize, Line)> = lines
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .collect();
        self.run(&numbered)
    }

    fn run(mut self, lines: &[(usize, Line)]) -> Result<Assembly, AssemblerError> {
        self.size_pass(lines);
        if !self.errors.is_empty() {
            return Err(AssemblerError(self.errors));
        }
        let bytes = self.encode_pass(lines);
        if !self.errors.is_empty() {
            return Err(AssemblerError(self.errors));
        }
        tracing::debug!(origin = self.origin, len = bytes.len(), "assembled");
        Ok(Assembly {
            origin: self.origin,
            bytes,
            symbols: self.symbols,
        })
    }

    /// Pass 1: walk the program, assign every label an address and check that
    /// each instruction form exists. The program counter advances by the
    /// length the addressing mode implies, so label addresses stay exact even
    /// past a line that will fail to encode.
    fn size_pass(&mut self, lines: &[(usize, Line)]) {
        let mut pc = self.origin as u32;
        let mut code_seen = false;
        for (line_no, line) in lines {
            match line {
                Line::Comment(_) => {}
                Line::Label(name) => {
                    code_seen = true;
                    if let Err(err) = self.symbols.define(name, pc as u16) {
                        self.error(*line_no, err.into());
                    }
                }
                Line::Directive(Directive::Origin(address)) => {
                    // An `.org` ahead of any code re-seats the whole program;
                    // later ones may only move forward and the gap is padded.
                    if !code_seen {
                        self.origin = *address;
                        pc = *address as u32;
                    } else if (*address as u32) < pc {
                        self.error(*line_no, ErrorKind::OriginBackwards(*address));
                    } else {
                        pc = *address as u32;
                    }
                }
                Line::Instruction(instruction) => {
                    code_seen = true;
                    let mode = effective_mode(instruction);
                    if INSTRUCTION_TABLE.find(instruction.mnemonic, mode).is_none() {
                        self.error(
                            *line_no,
                            ErrorKind::UnsupportedAddressingMode {
                                mnemonic: instruction.mnemonic,
                                mode,
                            },
                        );
                    }
                    if let Some(operand) = &instruction.operand {
                        if let Some(name) = operand_symbol(operand) {
                            self.symbols.reference(name);
                        }
                    }
                    pc += mode.instruction_len() as u32;
                    if pc > 0x1_0000 {
                        self.error(*line_no, ErrorKind::ProgramTooLarge);
                        return;
                    }
                }
            }
        }
    }

    /// Pass 2: encode every instruction. Errors are collected per line and
    /// the program counter keeps advancing, so one bad operand does not hide
    /// the diagnostics after it.
    fn encode_pass(&mut self, lines: &[(usize, Line)]) -> Vec<u8> {
        let origin = self.origin as u32;
        let mut pc = origin;
        let mut code_seen = false;
        let mut bytes = Vec::new();
        for (line_no, line) in lines {
            match line {
                Line::Comment(_) => {}
                Line::Label(_) => {
                    code_seen = true;
                }
                Line::Directive(Directive::Origin(address)) => {
                    if code_seen {
                        bytes.resize((*address as u32 - origin) as usize, 0x00);
                    }
                    pc = *address as u32;
                }
                Line::Instruction(instruction) => {
                    code_seen = true;
                    match self.encode_instruction(instruction, pc as u16) {
                        Ok(encoded) => {
                            pc += encoded.len() as u32;
                            bytes.extend(encoded);
                        }
                        Err(kind) => {
                            self.error(*line_no, kind);
                            pc += effective_mode(instruction).instruction_len() as u32;
                        }
                    }
                }
            }
        }
        bytes
    }

    fn encode_instruction(&self, instruction: &Instruction, pc: u16) -> Result<Vec<u8>, ErrorKind> {
        let mode = effective_mode(instruction);
        let entry = INSTRUCTION_TABLE
            .find(instruction.mnemonic, mode)
            .ok_or(ErrorKind::UnsupportedAddressingMode {
                mnemonic: instruction.mnemonic,
                mode,
            })?;
        let mut bytes = vec![entry.opcode];
        match mode {
            AddressingMode::Implied => {}
            AddressingMode::Relative => {
                let target = self.operand_value(instruction)?;
                let offset = target as i32 - (pc as i32 + entry.len as i32);
                if offset < i8::MIN as i32 || offset > i8::MAX as i32 {
                    return Err(ErrorKind::BranchOutOfRange { target, offset });
                }
                bytes.push(offset as i8 as u8);
            }
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::IndirectIndexedX
            | AddressingMode::IndirectIndexedY => {
                let value = self.operand_value(instruction)?;
                bytes.push(value as u8);
            }
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => {
                let value = self.operand_value(instruction)?;
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        Ok(bytes)
    }

    /// Value of an instruction operand: a literal of any spelling, else a
    /// symbol looked up in the table.
    fn operand_value(&self, instruction: &Instruction) -> Result<u16, ErrorKind> {
        let operand = instruction
            .operand
            .as_deref()
            .ok_or(ErrorKind::MissingOperand)?;
        let core = operand_value_text(operand);
        if let Some(value) = parse_literal(core) {
            return Ok(value);
        }
        if core.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            return self
                .symbols
                .lookup(core)
                .ok_or_else(|| ErrorKind::UndefinedSymbol(core.to_string()));
        }
        Err(ErrorKind::MalformedOperand(operand.to_string()))
    }

    fn error(&mut self, line: usize, kind: ErrorKind) {
        self.errors.push(LineError { line, kind });
    }
}

/// Branches always encode relative; every other mode comes from the shape of
/// the operand text.
fn effective_mode(instruction: &Instruction) -> AddressingMode {
    if instruction.mnemonic.is_branch() {
        AddressingMode::Relative
    } else {
        addressing::detect_addressing_mode(instruction.operand.as_deref())
    }
}
