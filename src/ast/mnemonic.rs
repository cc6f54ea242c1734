use std::fmt;

/// Operation name of an instruction.
///
/// Parsing is strict: the assembler only accepts the uppercase spelling.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, strum_macros::EnumString)]
pub enum Mnemonic {
    ADC,
    AND,
    ASL,
    BCC,
    BCS,
    BEQ,
    BIT,
    BMI,
    BNE,
    BPL,
    BRK,
    BVC,
    BVS,
    CLC,
    CLD,
    CLI,
    CLV,
    CMP,
    CPX,
    CPY,
    DEC,
    DEX,
    DEY,
    EOR,
    INC,
    INX,
    INY,
    JMP,
    JSR,
    LDA,
    LDX,
    LDY,
    LSR,
    NOP,
    ORA,
    PHA,
    PHP,
    PLA,
    PLP,
    ROL,
    ROR,
    RTI,
    RTS,
    SBC,
    SEC,
    SED,
    SEI,
    STA,
    STX,
    STY,
    TAX,
    TAY,
    TSX,
    TXA,
    TXS,
    TYA,
}

impl Mnemonic {
    /// Branch instructions take a relative operand no matter how the operand
    /// text reads.
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Mnemonic::BCC
                | Mnemonic::BCS
                | Mnemonic::BEQ
                | Mnemonic::BMI
                | Mnemonic::BNE
                | Mnemonic::BPL
                | Mnemonic::BVC
                | Mnemonic::BVS
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_str() {
        assert_eq!(Mnemonic::from_str("LDA"), Ok(Mnemonic::LDA));
        assert_eq!(Mnemonic::from_str("BRK"), Ok(Mnemonic::BRK));
        assert!(Mnemonic::from_str("LOL").is_err());
    }

    #[test]
    fn branches() {
        for mnemonic in [Mnemonic::BCC, Mnemonic::BCS, Mnemonic::BEQ, Mnemonic::BNE] {
            assert!(mnemonic.is_branch());
        }
        assert!(!Mnemonic::JMP.is_branch());
        assert!(!Mnemonic::LDA.is_branch());
    }
}
