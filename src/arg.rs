// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operand model shared by the evaluator, the symbol table and the encoder.
//!
//! Every operand keeps the source text it was parsed from so diagnostics can
//! quote the original spelling.

/// The typed value of an operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Placeholder for an empty or unparsable operand field.
    None,
    /// Symbol-table miss sentinel.
    Undefined,
    /// 16-bit immediate, also the result of ordinary expression arithmetic.
    Immediate(u16),
    /// `%addr(B)`: immediate offset by register B (`MOVD` only).
    EffectiveIndexed(u16),
    /// `@addr`: absolute address.
    Direct(u16),
    /// `@addr(B)`: absolute address offset by register B.
    Indexed(u16),
    /// `*Rn`: register-indirect. Carries the full word so out-of-range
    /// register numbers survive until the encoder can reject them.
    Indirect(u16),
    /// General register `R0`..`R255`.
    Register(u8),
    /// Peripheral port `P0`..`P255`.
    Port(u8),
    /// Accumulator A.
    AccA,
    /// Accumulator B.
    AccB,
    /// Status register.
    Status,
    /// Quoted text literal.
    Text(String),
    /// Repeated-fill bytes produced by the `DUP` operator. Raw bytes, not
    /// text: fill values above 0x7F must emit as single bytes.
    Duplicated(Vec<u8>),
}

impl ArgValue {
    /// Short type tag used in diagnostics, matching the listing vocabulary.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgValue::None => "NONE",
            ArgValue::Undefined => "UNDEF",
            ArgValue::Immediate(_) => "IMM",
            ArgValue::EffectiveIndexed(_) => "EFFEC",
            ArgValue::Direct(_) => "DIR",
            ArgValue::Indexed(_) => "INDEX",
            ArgValue::Indirect(_) => "INDIR",
            ArgValue::Register(_) => "REG",
            ArgValue::Port(_) => "PORT",
            ArgValue::AccA => "A",
            ArgValue::AccB => "B",
            ArgValue::Status => "ST",
            ArgValue::Text(_) => "TEXT",
            ArgValue::Duplicated(_) => "DUP",
        }
    }

    /// The 16-bit word view of the value.
    ///
    /// Ports read back biased by 0x100 so that a port symbol can never be
    /// confused with a register number; the encoder strips the bias again
    /// before emission.
    pub fn word(&self) -> u16 {
        match self {
            ArgValue::None => 0,
            ArgValue::Undefined => 0xFFFF,
            ArgValue::Immediate(n)
            | ArgValue::EffectiveIndexed(n)
            | ArgValue::Direct(n)
            | ArgValue::Indexed(n)
            | ArgValue::Indirect(n) => *n,
            ArgValue::Register(n) => u16::from(*n),
            ArgValue::Port(n) => 0x100 + u16::from(*n),
            ArgValue::AccA | ArgValue::AccB | ArgValue::Status => 0,
            ArgValue::Text(s) => s.bytes().next().map(u16::from).unwrap_or(0),
            ArgValue::Duplicated(_) => 0,
        }
    }

    /// Rebuild a value from a kind tag and a word, used when a label defined
    /// by `EQU` inherits its operand's type.
    pub fn with_word(&self, word: u16) -> ArgValue {
        match self {
            ArgValue::Register(_) => ArgValue::Register((word & 0xFF) as u8),
            ArgValue::Port(_) => ArgValue::Port((word.wrapping_sub(0x100) & 0xFF) as u8),
            _ => ArgValue::Immediate(word),
        }
    }
}

/// One evaluated operand with the source text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub value: ArgValue,
    pub src: String,
}

impl Arg {
    pub fn new(value: ArgValue, src: impl Into<String>) -> Self {
        Self {
            value,
            src: src.into(),
        }
    }

    pub fn undefined() -> Self {
        Self {
            value: ArgValue::Undefined,
            src: String::new(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.value.kind_name()
    }

    pub fn word(&self) -> u16 {
        self.value.word()
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.value, ArgValue::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::{Arg, ArgValue};

    #[test]
    fn port_word_carries_the_bias() {
        let arg = Arg::new(ArgValue::Port(5), "P5");
        assert_eq!(arg.word(), 0x105);
        assert_eq!(arg.kind_name(), "PORT");
    }

    #[test]
    fn text_word_is_the_first_character_code() {
        let arg = Arg::new(ArgValue::Text("AB".to_string()), "\"AB\"");
        assert_eq!(arg.word(), u16::from(b'A'));
    }

    #[test]
    fn with_word_preserves_register_and_port_kinds() {
        assert_eq!(
            ArgValue::Register(0).with_word(7),
            ArgValue::Register(7)
        );
        assert_eq!(ArgValue::Port(0).with_word(0x105), ArgValue::Port(5));
        assert_eq!(
            ArgValue::Immediate(0).with_word(0x1234),
            ArgValue::Immediate(0x1234)
        );
    }
}
