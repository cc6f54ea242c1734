use thiserror::Error;

/// Transforms 6502 assembly into machine code.
///
/// The steps are:
/// 1. **Parsing** - converting text into structured lines
/// 2. **Sizing** - walking the lines once to place every label
/// 3. **Encoding** - generating machine code with all symbols known
pub mod assembler;

/// Structured assembly: mnemonics, addressing modes and lines.
pub mod ast;

/// Compiles Lisp expressions to assembly lines.
///
/// The steps are:
/// 1. **Reading** - converting text into expression trees
/// 2. **Compiling** - walking each tree and emitting lines
pub mod compiler;

/// Hexdump utility.
pub mod hexdump;

/// The memory map both stages agree on.
pub mod layout;

/// Symbol tables for variables and labels.
pub mod symbols;

pub use assembler::{Assembler, Assembly};
pub use compiler::Compiler;
pub use layout::MemoryLayout;

/// Any failure of the source-to-machine-code pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("read error: {0}")]
    Read(#[from] compiler::reader::ReadError),
    #[error("compile error: {0}")]
    Compile(#[from] compiler::CompileError),
    #[error("assembly error:\n{0}")]
    Assemble(#[from] assembler::AssemblerError),
}

/// Compile a Lisp program all the way to machine code.
#[tracing::instrument(skip(source))]
pub fn compile_source(source: &str, layout: &MemoryLayout) -> Result<Assembly, Error> {
    let program = compiler::reader::read_program(source)?;
    let lines = Compiler::new(layout).compile_program(&program)?;
    let assembly = Assembler::new(layout).assemble_lines(&lines)?;
    Ok(assembly)
}

/// Compile a Lisp program to assembly text.
///
/// The text round-trips: feeding it to [`Assembler::assemble`] produces the
/// same bytes as [`compile_source`].
#[tracing::instrument(skip(source))]
pub fn compile_to_assembly(source: &str, layout: &MemoryLayout) -> Result<String, Error> {
    let program = compiler::reader::read_program(source)?;
    let lines = Compiler::new(layout).compile_program(&program)?;
    Ok(ast::render(&lines))
}
