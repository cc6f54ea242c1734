use std::str::FromStr;

use thiserror::Error;

use crate::ast::{Directive, Line, Mnemonic};
use crate::layout::MemoryLayout;
use crate::symbols::{SymbolError, SymbolTable};

use self::expr::{Expr, Form};
use self::zero_page::{ZeroPage, ZeroPageError};

/// Expression tree and the operator set.
pub mod expr;
/// Reads source text into expression trees.
pub mod reader;
/// Zero-page allocation for variables and temporaries.
pub mod zero_page;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    #[error("malformed `{form}`: expected {expected}")]
    MalformedForm {
        form: Form,
        expected: &'static str,
    },
    #[error("empty application")]
    EmptyApplication,
    #[error(transparent)]
    ZeroPage(#[from] ZeroPageError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

/// Translates expression trees into assembly lines.
///
/// Code generation keeps one rule throughout: after the lines emitted for an
/// expression run, that expression's value sits in the accumulator. Operands
/// spill into zero-page scratch cells, booleans are `$FF` for true and `$00`
/// for false, and `print` stores the accumulator to the output port.
///
/// A compiler carries the state of one program: variable cells, scratch
/// usage and the label counter. Compile each program with a fresh one.
#[derive(Debug)]
pub struct Compiler {
    layout: MemoryLayout,
    lines: Vec<Line>,
    vars: SymbolTable,
    zero_page: ZeroPage,
    next_label: u32,
}

impl Compiler {
    pub fn new(layout: &MemoryLayout) -> Compiler {
        Compiler {
            layout: layout.clone(),
            lines: Vec::new(),
            vars: SymbolTable::new(),
            zero_page: ZeroPage::new(layout),
            next_label: 0,
        }
    }

    /// Compile a whole program: the `.org`/`start` prologue, every top-level
    /// expression in order, then the `end` label and a `BRK`.
    #[tracing::instrument(skip(self, program))]
    pub fn compile_program(mut self, program: &[Expr]) -> Result<Vec<Line>, CompileError> {
        self.emit(Line::Comment(
            "Generated 6502 assembly from Lisp".to_string(),
        ));
        self.emit(Line::Directive(Directive::Origin(
            self.layout.program_origin,
        )));
        self.place("start".to_string());
        for expr in program {
            self.compile_expr(expr)?;
        }
        self.place("end".to_string());
        self.implied(Mnemonic::BRK);
        Ok(self.lines)
    }

    /// Append the code for one expression.
    #[tracing::instrument(skip(self))]
    pub fn compile_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Atom(text) => self.compile_atom(text),
            Expr::List(items) => match items.split_first() {
                None => Err(CompileError::EmptyApplication),
                Some((head, args)) => {
                    let name = head
                        .as_atom()
                        .ok_or_else(|| CompileError::UnknownOperator(head.to_string()))?;
                    let form = Form::from_str(name)
                        .map_err(|_| CompileError::UnknownOperator(name.to_string()))?;
                    match form {
                        Form::Add | Form::Sub | Form::Mul => self.compile_arith(form, args),
                        Form::Eq | Form::Lt | Form::Gt => self.compile_comparison(form, args),
                        Form::If => self.compile_if(args),
                        Form::Let => self.compile_let(args),
                        Form::Print => self.compile_print(args),
                    }
                }
            },
        }
    }

    /// Hand the emitted lines over without the program wrapper.
    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    /// A number loads immediate, a variable loads from its cell.
    fn compile_atom(&mut self, text: &str) -> Result<(), CompileError> {
        if text.starts_with(|c: char| c.is_ascii_digit()) {
            let value = decimal_prefix(text);
            self.imm(Mnemonic::LDA, value);
        } else {
            let address = self.var_addr(text)?;
            self.zp(Mnemonic::LDA, address);
        }
        Ok(())
    }

    /// Binary arithmetic. The left operand is computed first and spilled,
    /// the right ends in the accumulator and the operator combines the two.
    fn compile_arith(&mut self, form: Form, args: &[Expr]) -> Result<(), CompileError> {
        let (a, b) = binary_args(form, args)?;
        let mark = self.zero_page.mark();
        self.compile_expr(a)?;
        let lhs = self.zero_page.alloc_scratch()?;
        self.zp(Mnemonic::STA, lhs);
        self.compile_expr(b)?;
        match form {
            Form::Add => {
                self.implied(Mnemonic::CLC);
                self.zp(Mnemonic::ADC, lhs);
            }
            Form::Sub => {
                // SBC subtracts the operand from the accumulator, so reload
                // the left side and park the right in scratch.
                let rhs = self.zero_page.alloc_scratch()?;
                self.zp(Mnemonic::STA, rhs);
                self.zp(Mnemonic::LDA, lhs);
                self.implied(Mnemonic::SEC);
                self.zp(Mnemonic::SBC, rhs);
            }
            Form::Mul => {
                // Repeated addition: add the left side, right-side times.
                let counter = self.zero_page.alloc_scratch()?;
                let result = self.zero_page.alloc_scratch()?;
                let loop_label = self.gen_label();
                let end_label = self.gen_label();
                self.zp(Mnemonic::STA, counter);
                self.imm(Mnemonic::LDA, 0x00);
                self.zp(Mnemonic::STA, result);
                self.zp(Mnemonic::LDA, counter);
                self.branch(Mnemonic::BEQ, &end_label);
                self.place(loop_label.clone());
                self.zp(Mnemonic::LDA, result);
                self.implied(Mnemonic::CLC);
                self.zp(Mnemonic::ADC, lhs);
                self.zp(Mnemonic::STA, result);
                self.zp(Mnemonic::DEC, counter);
                self.branch(Mnemonic::BNE, &loop_label);
                self.place(end_label);
                self.zp(Mnemonic::LDA, result);
            }
            _ => unreachable!("not an arithmetic form: {}", form),
        }
        self.zero_page.release(mark);
        Ok(())
    }

    /// Comparisons produce `$FF` for true, `$00` for false.
    ///
    /// `CMP` sets carry when the accumulator is greater or equal to the
    /// operand and zero on equality. With `b` in the accumulator and `a` in
    /// scratch, `=` branches on the zero flag and `>` on carry clear
    /// (`b < a`). `<` reloads `a` and compares against `b` so that a single
    /// carry-clear branch is exact for it too.
    fn compile_comparison(&mut self, form: Form, args: &[Expr]) -> Result<(), CompileError> {
        let (a, b) = binary_args(form, args)?;
        let true_label = self.gen_label();
        let end_label = self.gen_label();
        let mark = self.zero_page.mark();
        self.compile_expr(a)?;
        let lhs = self.zero_page.alloc_scratch()?;
        self.zp(Mnemonic::STA, lhs);
        self.compile_expr(b)?;
        match form {
            Form::Eq => {
                self.zp(Mnemonic::CMP, lhs);
                self.branch(Mnemonic::BEQ, &true_label);
            }
            Form::Gt => {
                self.zp(Mnemonic::CMP, lhs);
                self.branch(Mnemonic::BCC, &true_label);
            }
            Form::Lt => {
                let rhs = self.zero_page.alloc_scratch()?;
                self.zp(Mnemonic::STA, rhs);
                self.zp(Mnemonic::LDA, lhs);
                self.zp(Mnemonic::CMP, rhs);
                self.branch(Mnemonic::BCC, &true_label);
            }
            _ => unreachable!("not a comparison form: {}", form),
        }
        self.imm(Mnemonic::LDA, 0x00);
        self.jmp(&end_label);
        self.place(true_label);
        self.imm(Mnemonic::LDA, 0xFF);
        self.place(end_label);
        self.zero_page.release(mark);
        Ok(())
    }

    /// `(if cond then)` or `(if cond then else)`. Any non-zero condition
    /// takes the then-branch; a missing else yields zero.
    fn compile_if(&mut self, args: &[Expr]) -> Result<(), CompileError> {
        let (cond, then_body, else_body) = match args {
            [cond, then_body] => (cond, then_body, None),
            [cond, then_body, else_body] => (cond, then_body, Some(else_body)),
            _ => {
                return Err(CompileError::MalformedForm {
                    form: Form::If,
                    expected: "a condition, a then-expression and an optional else",
                })
            }
        };
        let else_label = self.gen_label();
        let end_label = self.gen_label();
        self.compile_expr(cond)?;
        self.imm(Mnemonic::CMP, 0x00);
        self.branch(Mnemonic::BEQ, &else_label);
        self.compile_expr(then_body)?;
        self.jmp(&end_label);
        self.place(else_label);
        match else_body {
            Some(expr) => self.compile_expr(expr)?,
            None => self.imm(Mnemonic::LDA, 0x00),
        }
        self.place(end_label);
        Ok(())
    }

    /// `(let (name value) body)`, also accepted with the binding doubly
    /// wrapped as `(let ((name value)) body)`. The variable is bound for the
    /// rest of the program, not just the body.
    fn compile_let(&mut self, args: &[Expr]) -> Result<(), CompileError> {
        let (bindings, body) = match args {
            [bindings, body] => (bindings, body),
            _ => {
                return Err(CompileError::MalformedForm {
                    form: Form::Let,
                    expected: "a (name value) binding and a body",
                })
            }
        };
        let (name, value) = binding_pair(bindings)?;
        self.compile_expr(value)?;
        let address = self.var_addr(name)?;
        self.zp(Mnemonic::STA, address);
        self.compile_expr(body)
    }

    /// `(print expr)` stores the value to the output port.
    fn compile_print(&mut self, args: &[Expr]) -> Result<(), CompileError> {
        let value = match args {
            [value] => value,
            _ => {
                return Err(CompileError::MalformedForm {
                    form: Form::Print,
                    expected: "one argument",
                })
            }
        };
        self.compile_expr(value)?;
        self.abs(Mnemonic::STA, self.layout.output_addr);
        Ok(())
    }

    /// Cell of a variable, allocated on first use.
    fn var_addr(&mut self, name: &str) -> Result<u8, CompileError> {
        if let Some(address) = self.vars.lookup(name) {
            return Ok(address as u8);
        }
        let address = self.zero_page.alloc_var()?;
        self.vars.define(name, address as u16)?;
        tracing::debug!(name, address, "allocated variable");
        Ok(address)
    }

    fn gen_label(&mut self) -> String {
        let label = format!("L{}", self.next_label);
        self.next_label += 1;
        label
    }

    fn emit(&mut self, line: Line) {
        self.lines.push(line);
    }

    fn implied(&mut self, mnemonic: Mnemonic) {
        self.emit(Line::implied(mnemonic));
    }

    fn imm(&mut self, mnemonic: Mnemonic, value: u8) {
        self.emit(Line::instruction(mnemonic, format!("#${:02X}", value)));
    }

    fn zp(&mut self, mnemonic: Mnemonic, address: u8) {
        self.emit(Line::instruction(mnemonic, format!("${:02X}", address)));
    }

    fn abs(&mut self, mnemonic: Mnemonic, address: u16) {
        self.emit(Line::instruction(mnemonic, format!("${:04X}", address)));
    }

    fn branch(&mut self, mnemonic: Mnemonic, label: &str) {
        self.emit(Line::instruction(mnemonic, label));
    }

    fn jmp(&mut self, label: &str) {
        self.emit(Line::instruction(Mnemonic::JMP, label));
    }

    fn place(&mut self, label: String) {
        self.emit(Line::Label(label));
    }
}

fn binary_args(form: Form, args: &[Expr]) -> Result<(&Expr, &Expr), CompileError> {
    match args {
        [a, b] => Ok((a, b)),
        _ => Err(CompileError::MalformedForm {
            form,
            expected: "two arguments",
        }),
    }
}

fn binding_pair(bindings: &Expr) -> Result<(&str, &Expr), CompileError> {
    let malformed = || CompileError::MalformedForm {
        form: Form::Let,
        expected: "a (name value) binding and a body",
    };
    let pair = match bindings {
        Expr::List(items) if items.len() == 1 && matches!(items[0], Expr::List(_)) => &items[0],
        other => other,
    };
    match pair {
        Expr::List(items) => match items.as_slice() {
            [Expr::Atom(name), value] => Ok((name.as_str(), value)),
            _ => Err(malformed()),
        },
        Expr::Atom(_) => Err(malformed()),
    }
}

/// Decimal prefix of a token, truncated to 8 bits: `12abc` reads as 12 and
/// `300` wraps to 44.
fn decimal_prefix(text: &str) -> u8 {
    text.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u8, |value, digit| {
            value.wrapping_mul(10).wrapping_add(digit - b'0')
        })
}
