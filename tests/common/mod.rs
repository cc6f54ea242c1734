//! A small 6502 interpreter for running compiled programs in tests.
//!
//! It covers exactly the instruction subset the compiler emits and panics on
//! anything else, so a change in code generation that reaches for a new
//! instruction shows up as a loud test failure. Flags follow the hardware:
//! `ADC`/`SBC` honor carry as carry-in/borrow, `CMP` sets carry when the
//! accumulator is greater or equal.

use lisp6502::{compile_source, Assembly, MemoryLayout};

const STEP_LIMIT: usize = 100_000;

pub struct Machine {
    pub a: u8,
    pc: u16,
    carry: bool,
    zero: bool,
    memory: Vec<u8>,
}

impl Machine {
    /// Place the program at its origin and point the program counter at it.
    pub fn load(assembly: &Assembly) -> Machine {
        let mut memory = vec![0u8; 0x1_0000];
        let origin = assembly.origin as usize;
        memory[origin..origin + assembly.bytes.len()].copy_from_slice(&assembly.bytes);
        Machine {
            a: 0,
            pc: assembly.origin,
            carry: false,
            zero: false,
            memory,
        }
    }

    pub fn read(&self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    /// Execute until `BRK`.
    pub fn run(&mut self) {
        for _ in 0..STEP_LIMIT {
            if !self.step() {
                return;
            }
        }
        panic!("program did not reach BRK within {} steps", STEP_LIMIT);
    }

    fn step(&mut self) -> bool {
        let opcode = self.fetch();
        match opcode {
            // BRK
            0x00 => return false,
            // LDA
            0xA9 => {
                let value = self.fetch();
                self.lda(value);
            }
            0xA5 => {
                let address = self.fetch() as u16;
                self.lda(self.memory[address as usize]);
            }
            // STA
            0x85 => {
                let address = self.fetch() as u16;
                self.memory[address as usize] = self.a;
            }
            0x8D => {
                let address = self.fetch_word();
                self.memory[address as usize] = self.a;
            }
            // CLC / SEC
            0x18 => self.carry = false,
            0x38 => self.carry = true,
            // ADC / SBC, zero page
            0x65 => {
                let address = self.fetch() as u16;
                self.adc(self.memory[address as usize]);
            }
            0xE5 => {
                let address = self.fetch() as u16;
                self.sbc(self.memory[address as usize]);
            }
            // CMP
            0xC9 => {
                let value = self.fetch();
                self.cmp(value);
            }
            0xC5 => {
                let address = self.fetch() as u16;
                self.cmp(self.memory[address as usize]);
            }
            // DEC
            0xC6 => {
                let address = self.fetch() as usize;
                let value = self.memory[address].wrapping_sub(1);
                self.memory[address] = value;
                self.zero = value == 0;
            }
            // BEQ / BNE / BCC
            0xF0 => {
                let offset = self.fetch() as i8;
                if self.zero {
                    self.branch(offset);
                }
            }
            0xD0 => {
                let offset = self.fetch() as i8;
                if !self.zero {
                    self.branch(offset);
                }
            }
            0x90 => {
                let offset = self.fetch() as i8;
                if !self.carry {
                    self.branch(offset);
                }
            }
            // JMP absolute
            0x4C => {
                self.pc = self.fetch_word();
            }
            _ => panic!(
                "unimplemented opcode {:#04x} at {:#06x}",
                opcode,
                self.pc.wrapping_sub(1)
            ),
        }
        true
    }

    fn fetch(&mut self) -> u8 {
        let byte = self.memory[self.pc as usize];
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        u16::from_le_bytes([self.fetch(), self.fetch()])
    }

    fn branch(&mut self, offset: i8) {
        self.pc = self.pc.wrapping_add_signed(offset as i16);
    }

    fn lda(&mut self, value: u8) {
        self.a = value;
        self.zero = value == 0;
    }

    fn adc(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.carry as u16;
        self.carry = sum > 0xFF;
        self.a = sum as u8;
        self.zero = self.a == 0;
    }

    fn sbc(&mut self, value: u8) {
        let diff = self.a as i16 - value as i16 - (1 - self.carry as i16);
        self.carry = diff >= 0;
        self.a = diff as u8;
        self.zero = self.a == 0;
    }

    fn cmp(&mut self, value: u8) {
        self.carry = self.a >= value;
        self.zero = self.a == value;
    }
}

/// Compile a Lisp program with the default layout and run it to its `BRK`.
pub fn run_program(source: &str) -> Machine {
    let assembly = compile_source(source, &MemoryLayout::default())
        .unwrap_or_else(|err| panic!("{:?} failed to compile: {}", source, err));
    let mut machine = Machine::load(&assembly);
    machine.run();
    machine
}

/// Value the program leaves in the accumulator.
pub fn eval(source: &str) -> u8 {
    run_program(source).a
}
