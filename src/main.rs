use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::prelude::*;

use lisp6502::assembler::addressing::parse_literal;
use lisp6502::ast::render;
use lisp6502::compiler::reader::read_program;
use lisp6502::hexdump::hexdump;
use lisp6502::{Assembler, Assembly, Compiler, MemoryLayout};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[clap(long)]
    #[clap(help = "Enable chrome tracing")]
    #[clap(long_help = "Enable chrome tracing which on program exit will generate
a json file to be opened with a chrome tracing compatible
viewer.")]
    trace: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[clap(about = "Compile a Lisp program to 6502 machine code")]
    #[clap(aliases = &["c"])]
    Compile(CompileArgs),
    #[clap(about = "Assemble a 6502 assembly program")]
    #[clap(aliases = &["a", "asm"])]
    Assemble(AssembleArgs),
}

#[derive(Args)]
struct CompileArgs {
    #[clap(help = "Lisp source file")]
    input: PathBuf,
    #[clap(short, long)]
    #[clap(help = "Output file (defaults to out.bin, or out.asm with --emit-asm)")]
    output: Option<PathBuf>,
    #[clap(long, help = "Emit assembly text instead of machine code")]
    emit_asm: bool,
    #[clap(long, value_parser = parse_origin)]
    #[clap(help = "Override the program origin, e.g. $0600")]
    origin: Option<u16>,
    #[clap(long, help = "Print a hexdump of the machine code to stderr")]
    hexdump: bool,
    #[clap(long, help = "Print the resolved symbols to stderr")]
    symbols: bool,
}

#[derive(Args)]
struct AssembleArgs {
    #[clap(help = "Assembly source file")]
    input: PathBuf,
    #[clap(short, long, help = "Output file (defaults to out.bin)")]
    output: Option<PathBuf>,
    #[clap(long, value_parser = parse_origin)]
    #[clap(help = "Override the program origin, e.g. $0600")]
    origin: Option<u16>,
    #[clap(long, help = "Print a hexdump of the machine code to stderr")]
    hexdump: bool,
    #[clap(long, help = "Print the resolved symbols to stderr")]
    symbols: bool,
}

fn parse_origin(text: &str) -> Result<u16, String> {
    parse_literal(text).ok_or_else(|| format!("invalid address: {}", text))
}

fn layout_with_origin(origin: Option<u16>) -> MemoryLayout {
    let mut layout = MemoryLayout::default();
    if let Some(origin) = origin {
        layout.program_origin = origin;
    }
    layout
}

#[tracing::instrument(skip(args))]
fn run_compile(args: &CompileArgs) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Unable to read {}", args.input.display()))?;
    let layout = layout_with_origin(args.origin);

    let program = read_program(&source)?;
    let lines = Compiler::new(&layout).compile_program(&program)?;

    if args.emit_asm {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from("out.asm"));
        fs::write(&output, render(&lines))
            .with_context(|| format!("Unable to write {}", output.display()))?;
        eprintln!("Wrote {}", output.display());
        return Ok(());
    }

    let assembly = Assembler::new(&layout).assemble_lines(&lines)?;
    write_binary(&assembly, args.output.as_deref(), args.hexdump, args.symbols)
}

#[tracing::instrument(skip(args))]
fn run_assemble(args: &AssembleArgs) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Unable to read {}", args.input.display()))?;
    let layout = layout_with_origin(args.origin);

    let assembly = Assembler::new(&layout).assemble(&source)?;
    write_binary(&assembly, args.output.as_deref(), args.hexdump, args.symbols)
}

fn write_binary(
    assembly: &Assembly,
    output: Option<&Path>,
    dump: bool,
    symbols: bool,
) -> Result<()> {
    let output = output.unwrap_or_else(|| Path::new("out.bin"));
    fs::write(output, &assembly.bytes)
        .with_context(|| format!("Unable to write {}", output.display()))?;
    eprintln!(
        "Wrote {} ({} bytes at ${:04X})",
        output.display(),
        assembly.bytes.len(),
        assembly.origin
    );
    if dump {
        eprint!("{}", hexdump(&assembly.bytes, assembly.origin));
    }
    if symbols {
        eprint!("{}", assembly.symbols);
    }
    Ok(())
}

pub fn trace() -> FlushGuard {
    let (chrome_layer, guard) = ChromeLayerBuilder::new().build();
    tracing_subscriber::registry().with(chrome_layer).init();

    guard
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _trace_guard = if cli.trace { Some(trace()) } else { None };

    match &cli.command {
        Command::Compile(args) => run_compile(args),
        Command::Assemble(args) => run_assemble(args),
    }
}
