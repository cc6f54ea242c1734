/// Addressing modes and the instruction sizes they imply.
pub mod addressing_mode;
/// A structured line of assembly, the unit both stages exchange.
pub mod line;
/// Instruction mnemonics.
pub mod mnemonic;

pub use addressing_mode::AddressingMode;
pub use line::{render, Directive, Instruction, Line};
pub use mnemonic::Mnemonic;
