use std::fmt;

/// How an instruction locates its operand.
///
/// The mode decides how the operand is encoded, and with it how many bytes
/// the instruction occupies.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub enum AddressingMode {
    /// No operand. Also covers the accumulator forms of `ASL`, `LSR`, `ROL`
    /// and `ROR`.
    Implied,
    /// `#$nn` or `#nn`
    Immediate,
    /// `$nn`
    ZeroPage,
    /// `$nn,X`
    ZeroPageX,
    /// `$nn,Y`
    ZeroPageY,
    /// `$nnnn`
    Absolute,
    /// `$nnnn,X`
    AbsoluteX,
    /// `$nnnn,Y`
    AbsoluteY,
    /// `($nnnn)`, only for `JMP`
    Indirect,
    /// `($nn),X`
    IndirectIndexedX,
    /// `($nn),Y`
    IndirectIndexedY,
    /// Branch target, encoded as a signed offset from the following
    /// instruction
    Relative,
}

impl AddressingMode {
    /// Size of opcode + operand in bytes.
    pub fn instruction_len(&self) -> u16 {
        match self {
            AddressingMode::Implied => 1,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::IndirectIndexedX
            | AddressingMode::IndirectIndexedY
            | AddressingMode::Relative => 2,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 3,
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AddressingMode::Implied => "implied",
            AddressingMode::Immediate => "immediate",
            AddressingMode::ZeroPage => "zeropage",
            AddressingMode::ZeroPageX => "zeropage,X",
            AddressingMode::ZeroPageY => "zeropage,Y",
            AddressingMode::Absolute => "absolute",
            AddressingMode::AbsoluteX => "absolute,X",
            AddressingMode::AbsoluteY => "absolute,Y",
            AddressingMode::Indirect => "indirect",
            AddressingMode::IndirectIndexedX => "(indirect),X",
            AddressingMode::IndirectIndexedY => "(indirect),Y",
            AddressingMode::Relative => "relative",
        };
        write!(f, "{}", text)
    }
}
