/// Memory layout shared by the compiler and the assembler.
///
/// Every address the pipeline hard-codes lives here, so a program can be
/// retargeted (different origin, different output port, smaller zero-page
/// window) without touching code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLayout {
    /// Address the program is assembled at, emitted as the leading `.org`.
    pub program_origin: u16,
    /// First zero-page cell available to the compiler.
    pub zero_page_start: u8,
    /// Last zero-page cell available to the compiler (inclusive).
    pub zero_page_end: u8,
    /// Memory-mapped output port that `print` stores the accumulator to.
    pub output_addr: u16,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self {
            program_origin: 0x0800,
            zero_page_start: 0x80,
            zero_page_end: 0xFF,
            output_addr: 0x0200,
        }
    }
}
