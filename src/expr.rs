// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Expression evaluation and operand classification.
//!
//! Expressions fold binary operators strictly left to right with no
//! precedence. A malformed expression never aborts assembly: the parser logs
//! an error and yields the 0xFFFF sentinel so the statement still occupies
//! its natural size.
//!
//! [`classify`] decides the addressing mode of an operand string from its
//! leading sigil (`%`, `*`, `@`) before handing the remainder to the
//! evaluator.

use crate::arg::{Arg, ArgValue};
use crate::functions::Functions;
use crate::log::Log;
use crate::symbols::Symbols;

/// Evaluate a complete expression string. Empty input and trailing garbage
/// are logged as errors.
pub fn evaluate(
    expr: &str,
    symbols: &mut Symbols,
    functions: &Functions,
    log: &mut Log,
    pc: u16,
) -> Arg {
    if expr.is_empty() {
        log.error("Missing literal");
        return Arg::new(ArgValue::None, expr);
    }
    let mut parser = Parser::new(expr, symbols, functions, log, pc);
    let arg = parser.parse();
    if !parser.at_end() {
        parser.log.error(format!("Parse error: {expr}"));
    }
    arg
}

/// Classify one operand string into an addressing mode and evaluate the
/// embedded expression.
pub fn classify(
    operand: &str,
    symbols: &mut Symbols,
    functions: &Functions,
    log: &mut Log,
    pc: u16,
) -> Arg {
    fn eval(
        expr: &str,
        symbols: &mut Symbols,
        functions: &Functions,
        log: &mut Log,
        pc: u16,
    ) -> u16 {
        evaluate(expr, symbols, functions, log, pc).word()
    }

    let value = if operand == "A" {
        ArgValue::AccA
    } else if operand == "B" {
        ArgValue::AccB
    } else if operand == "ST" {
        ArgValue::Status
    } else if let Some(rest) = operand.strip_prefix('%') {
        match rest.strip_suffix("(B)") {
            Some(inner) if !inner.is_empty() => {
                ArgValue::EffectiveIndexed(eval(inner, symbols, functions, log, pc))
            }
            _ => ArgValue::Immediate(eval(rest, symbols, functions, log, pc)),
        }
    } else if operand.len() > 2 && operand.starts_with('*') {
        ArgValue::Indirect(eval(&operand[1..], symbols, functions, log, pc))
    } else if let Some(rest) = operand.strip_prefix('@') {
        match rest.strip_suffix("(B)") {
            Some(inner) => ArgValue::Indexed(eval(inner, symbols, functions, log, pc)),
            None => ArgValue::Direct(eval(rest, symbols, functions, log, pc)),
        }
    } else {
        return evaluate(operand, symbols, functions, log, pc);
    };
    Arg::new(value, operand)
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    src: String,
    symbols: &'a mut Symbols,
    functions: &'a Functions,
    log: &'a mut Log,
    pc: u16,
}

impl<'a> Parser<'a> {
    fn new(
        expr: &str,
        symbols: &'a mut Symbols,
        functions: &'a Functions,
        log: &'a mut Log,
        pc: u16,
    ) -> Self {
        Self {
            chars: expr.chars().collect(),
            pos: 0,
            src: expr.to_string(),
            symbols,
            functions,
            log,
            pc,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    fn lookahead(&self, text: &str) -> bool {
        self.chars[self.pos..]
            .iter()
            .zip(text.chars())
            .filter(|(a, b)| **a == *b)
            .count()
            == text.len()
    }

    fn parse_name(&mut self) -> String {
        let mut name = String::new();
        self.skip_blanks();
        while let Some(c) = self.peek() {
            if c == '_' || c == '$' || c.is_ascii_alphanumeric() {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        name
    }

    /// Scan a number, deciding the radix as it goes: a `>` prefix (handled by
    /// the caller) or trailing `H` selects hex, a trailing `B` selects
    /// binary, anything else is decimal.
    fn parse_num(&mut self, mut radix: u32) -> u16 {
        let mut bin: u16 = 0;
        let mut dec: u16 = 0;
        let mut hex: u16 = 0;

        self.skip_blanks();
        while let Some(c) = self.peek() {
            let dig = if let Some(d) = c.to_digit(10) {
                d as u16
            } else if ('A'..='F').contains(&c) {
                if c == 'B' && radix == 0 {
                    radix = 2;
                }
                c as u16 - 'A' as u16 + 10
            } else if c == 'H' {
                radix = 16;
                self.pos += 1;
                break;
            } else {
                break;
            };

            if c != 'B' {
                bin = (bin << 1).wrapping_add(dig);
            }
            dec = dec.wrapping_mul(10).wrapping_add(dig);
            hex = (hex << 4).wrapping_add(dig);
            self.pos += 1;
        }

        match radix {
            2 => bin,
            16 => hex,
            _ => dec,
        }
    }

    /// Parse one primary value: a number, a parenthesized expression, a
    /// quoted text literal, `$` (the location counter), or a symbol or
    /// function reference.
    fn parse_value(&mut self) -> Arg {
        let mut ret = Arg::new(ArgValue::Immediate(0xFFFF), self.src.clone());
        self.skip_blanks();
        let Some(c) = self.peek() else {
            return ret;
        };

        if c == '>' {
            self.pos += 1;
            ret.value = ArgValue::Immediate(self.parse_num(16));
        } else if c.is_ascii_digit() {
            ret.value = ArgValue::Immediate(self.parse_num(0));
        } else if c == '(' {
            self.pos += 1;
            ret = self.parse();
            self.skip_blanks();
            if self.peek() == Some(')') {
                self.pos += 1;
            }
        } else if c == '"' || c == '\'' {
            self.pos += 1;
            let mut text = String::new();
            let mut escape = false;
            while let Some(ch) = self.peek() {
                if !escape && ch == c {
                    break;
                }
                self.pos += 1;
                if !escape && ch == '\\' {
                    escape = true;
                    continue;
                }
                escape = false;
                text.push(ch);
            }
            if !self.at_end() {
                self.pos += 1;
            }
            self.log.debug(format!("Text: [{text}]"));
            ret.value = ArgValue::Text(text);
        } else if c == '_' || c == '$' || c.is_ascii_alphabetic() {
            let name = self.parse_name();
            if name == "$" {
                ret.value = ArgValue::Immediate(self.pc);
            } else if let Some(sym) = self.symbols.lookup(&name) {
                ret = sym.clone();
            } else if let Some(func) = self.functions.get(&name) {
                ret = self.call_function(&func.clone());
            } else {
                self.log.error(format!("Symbol not found: [{name}]"));
            }
        } else {
            self.log.error(format!("Unsupported token: [{c}]"));
        }
        ret
    }

    /// Bind arguments and evaluate a function body in a fresh scope.
    /// Arguments are primary values, bound left to right; binding stops
    /// quietly when the call supplies fewer arguments than the function has
    /// parameters.
    fn call_function(&mut self, func: &crate::functions::Function) -> Arg {
        self.symbols.enter_scope();
        self.skip_blanks();
        let paren = self.peek() == Some('(');
        if paren {
            self.pos += 1;
        }

        for (i, param) in func.params.iter().enumerate() {
            self.skip_blanks();
            if i > 0 {
                if self.peek() != Some(',') {
                    break;
                }
                self.pos += 1;
            }
            let arg = self.parse_value();
            self.log.debug(format!(
                "{param} = ({}){:04X}",
                arg.kind_name(),
                arg.word()
            ));
            if !self.symbols.define_local(param, arg) {
                self.log.error("Symbols stack empty");
            }
        }

        self.skip_blanks();
        if paren && self.peek() == Some(')') {
            self.pos += 1;
        }

        let mut parser = Parser::new(&func.body, self.symbols, self.functions, self.log, self.pc);
        let ret = parser.parse();
        let clean = parser.at_end();
        self.log.debug(format!(
            "{} = ({}){:04X}",
            func.body,
            ret.kind_name(),
            ret.word()
        ));
        if !clean {
            self.log.error(format!(
                "Error evaluating function {}: {}",
                func.name, func.body
            ));
        }
        self.symbols.exit_scope();
        ret
    }

    /// Fold binary operators left to right.
    fn parse(&mut self) -> Arg {
        let mut acc = self.parse_value();
        self.skip_blanks();
        while let Some(c) = self.peek() {
            if self.lookahead("<<") {
                self.pos += 2;
                self.combine(&mut acc, "<<");
            } else if self.lookahead(">>") {
                self.pos += 2;
                self.combine(&mut acc, ">>");
            } else if self.lookahead("DUP") {
                self.pos += 3;
                self.dup(&mut acc);
            } else if matches!(c, '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^') {
                self.pos += 1;
                let mut op = [0u8; 4];
                let op = &*c.encode_utf8(&mut op);
                self.combine(&mut acc, op);
            } else if c == ')' {
                break;
            } else {
                self.log
                    .error(format!("[{c}]: unsupported operator in [{}]", self.src));
                break;
            }
            self.skip_blanks();
        }
        acc
    }

    /// Apply one binary operator to the accumulator. Both operands must be
    /// immediates; a single-character text literal on the left coerces to its
    /// character code. On a type error the accumulator is left unchanged.
    fn combine(&mut self, acc: &mut Arg, op: &str) {
        let rhs = self.parse_value();
        let lhs_word = match &acc.value {
            ArgValue::Immediate(n) => Some(*n),
            ArgValue::Text(t) if t.len() == 1 => Some(acc.word()),
            _ => None,
        };
        let (Some(a), ArgValue::Immediate(b)) = (lhs_word, &rhs.value) else {
            self.log.error(format!(
                "{op}: incompatible types: {} and {}",
                acc.kind_name(),
                rhs.kind_name()
            ));
            return;
        };
        let b = *b;
        if b == 0 && (op == "/" || op == "%") {
            self.log.error(format!("Divide by zero: {}", self.src));
            return;
        }
        let result = match op {
            "+" => a.wrapping_add(b),
            "-" => a.wrapping_sub(b),
            "*" => a.wrapping_mul(b),
            "/" => a / b,
            "%" => a % b,
            "&" => a & b,
            "|" => a | b,
            "^" => a ^ b,
            "<<" => a.wrapping_shl(u32::from(b)),
            _ => a.wrapping_shr(u32::from(b)),
        };
        acc.value = ArgValue::Immediate(result);
    }

    /// `count DUP value` builds a fill block of `count` copies of the low
    /// byte of `value`.
    fn dup(&mut self, acc: &mut Arg) {
        let rhs = self.parse_value();
        match (&acc.value, &rhs.value) {
            (ArgValue::Immediate(count), ArgValue::Immediate(value)) => {
                let byte = (*value & 0xFF) as u8;
                acc.value = ArgValue::Duplicated(vec![byte; usize::from(*count)]);
            }
            _ => self.log.error(format!(
                "DUP: incompatible types: {} and {}",
                acc.kind_name(),
                rhs.kind_name()
            )),
        }
    }
}
