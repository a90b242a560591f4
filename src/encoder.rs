// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! TMS7000 instruction encoder.
//!
//! One opcode column per addressing-mode pair: the dual-operand group packs
//! the mode into the high nibble (0x10..0x70), the port group into
//! 0x80..0xA0, the single-operand group into 0xB0..0xD0 and the short jumps
//! into 0xE0 | condition. Encoding errors are logged and the statement still
//! occupies its natural size so pass addresses stay aligned.

use crate::arg::{Arg, ArgValue};
use crate::log::Log;

/// Result of encoding one statement.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// Space reserved without emission (`DS`).
    pub reserve: u16,
    /// Whether listing continuation lines show the bytes (off for `DUP`
    /// fill blocks).
    pub list_block: bool,
}

/// Encode `op` with its classified arguments. Returns `None` when the
/// mnemonic is not part of the instruction set, so the caller can try the
/// directive vocabulary first and report unknown op-codes itself.
pub fn encode(
    op: &str,
    args: &[Arg],
    argstr: &str,
    pc: u16,
    compat_warnings: bool,
    log: &mut Log,
) -> Option<Encoded> {
    let mut enc = Encoder {
        bytes: Vec::new(),
        reserve: 0,
        list_block: true,
        pc,
        compat_warnings,
        log,
    };

    match op {
        "MOV" => enc.mov(op, args),
        "MOVD" => enc.movd(op, args),
        "MOVP" => enc.movp(op, args),

        "LDA" => enc.xaddr(op, args, 0x0A),
        "STA" => enc.xaddr(op, args, 0x0B),
        "BR" => enc.xaddr(op, args, 0x0C),
        "CMPA" => enc.xaddr(op, args, 0x0D),
        "CALL" => enc.xaddr(op, args, 0x0E),

        "NOP" => enc.implicit(op, args, 0x00),
        "IDLE" => enc.implicit(op, args, 0x01),
        "EINT" => enc.implicit(op, args, 0x05),
        "DINT" => enc.implicit(op, args, 0x06),
        "SETC" => enc.implicit(op, args, 0x07),
        "STSP" => enc.implicit(op, args, 0x09),
        "RETS" => enc.implicit(op, args, 0x0A),
        "RETI" => enc.implicit(op, args, 0x0B),
        "LDSP" => enc.implicit(op, args, 0x0D),
        "TSTA" | "CLRC" => enc.implicit(op, args, 0xB0),
        "TSTB" => enc.implicit(op, args, 0xC1),

        "DEC" => {
            enc.unop(op, args, 1, 0x02);
        }
        "INC" => {
            enc.unop(op, args, 1, 0x03);
        }
        "INV" => {
            enc.unop(op, args, 1, 0x04);
        }
        "CLR" => {
            enc.unop(op, args, 1, 0x05);
        }
        "XCHB" => {
            enc.unop(op, args, 1, 0x06);
        }
        "SWAP" => {
            enc.unop(op, args, 1, 0x07);
        }
        "DECD" => {
            enc.unop(op, args, 1, 0x0B);
        }
        "RR" => {
            enc.unop(op, args, 1, 0x0C);
        }
        "RRC" => {
            enc.unop(op, args, 1, 0x0D);
        }
        "RL" => {
            enc.unop(op, args, 1, 0x0E);
        }
        "RLC" => {
            enc.unop(op, args, 1, 0x0F);
        }

        "AND" => {
            enc.binop(op, args, 2, 0x03);
        }
        "OR" => {
            enc.binop(op, args, 2, 0x04);
        }
        "XOR" => {
            enc.binop(op, args, 2, 0x05);
        }
        "ADD" => {
            enc.binop(op, args, 2, 0x08);
        }
        "ADC" => {
            enc.binop(op, args, 2, 0x09);
        }
        "SUB" => {
            enc.binop(op, args, 2, 0x0A);
        }
        "SBB" => {
            enc.binop(op, args, 2, 0x0B);
        }
        "MPY" => {
            enc.binop(op, args, 2, 0x0C);
        }
        "CMP" => {
            enc.binop(op, args, 2, 0x0D);
        }
        "DAC" => {
            enc.binop(op, args, 2, 0x0E);
        }
        "DSB" => {
            enc.binop(op, args, 2, 0x0F);
        }

        "ANDP" => {
            enc.binop_p(op, args, 2, 0x03);
        }
        "ORP" => {
            enc.binop_p(op, args, 2, 0x04);
        }
        "XORP" => {
            enc.binop_p(op, args, 2, 0x05);
        }

        "JMP" => enc.jump(op, args, 0x00),
        "JN" | "JLT" => enc.jump(op, args, 0x01),
        "JZ" | "JEQ" => enc.jump(op, args, 0x02),
        "JC" | "JHS" => enc.jump(op, args, 0x03),
        "JP" | "JGT" => enc.jump(op, args, 0x04),
        "JPZ" | "JGE" => enc.jump(op, args, 0x05),
        "JNZ" | "JNE" => enc.jump(op, args, 0x06),
        "JNC" | "JL" => enc.jump(op, args, 0x07),

        "DJNZ" => {
            if enc.unop(op, args, 2, 0x0A) {
                enc.branch_offset(&args[1]);
            }
        }
        "BTJO" => {
            if enc.binop(op, args, 3, 0x06) {
                enc.branch_offset(&args[2]);
            }
        }
        "BTJZ" => {
            if enc.binop(op, args, 3, 0x07) {
                enc.branch_offset(&args[2]);
            }
        }
        "BTJOP" => {
            if enc.binop_p(op, args, 3, 0x06) {
                enc.branch_offset(&args[2]);
            }
        }
        "BTJZP" => {
            if enc.binop_p(op, args, 3, 0x07) {
                enc.branch_offset(&args[2]);
            }
        }

        "PUSH" => enc.pushpop(op, args, 0x08),
        "POP" => enc.pushpop(op, args, 0x09),
        "TRAP" => enc.trap(op, args),

        "BYTE" => enc.byte_data(args),
        "DB" => enc.db_data(args, argstr),
        "DS" => enc.ds_data(op, args, argstr),
        "TEXT" => enc.text_data(op, args),
        "DATA" | "DW" => enc.word_data(op, args, argstr),

        _ => return None,
    }

    Some(Encoded {
        bytes: enc.bytes,
        reserve: enc.reserve,
        list_block: enc.list_block,
    })
}

struct Encoder<'a> {
    bytes: Vec<u8>,
    reserve: u16,
    list_block: bool,
    pc: u16,
    compat_warnings: bool,
    log: &'a mut Log,
}

impl Encoder<'_> {
    fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    fn check_args(&mut self, op: &str, args: &[Arg], num: usize) -> bool {
        if args.len() < num {
            self.log
                .error(format!("{op}: Too few args {}, expecting {num}", args.len()));
        } else if args.len() > num {
            self.log.error(format!(
                "{op}: Too many args {}, expecting {num}",
                args.len()
            ));
        }
        args.len() == num
    }

    /// Low byte of an immediate or register operand, range −128..255.
    fn get_byte(&mut self, arg: &Arg) -> u8 {
        let word = arg.word();
        if !matches!(arg.value, ArgValue::Immediate(_) | ArgValue::Register(_)) {
            self.log.error(format!(
                "Bad byte type: [{}]={word:04X} ({})",
                arg.src,
                arg.kind_name()
            ));
        } else if word > 0x00FF && word < 0xFF80 {
            self.log.error(format!(
                "Byte range error: [{}]={word:04X} ({})",
                arg.src,
                arg.kind_name()
            ));
        }
        (word & 0xFF) as u8
    }

    /// Register or port number. Ports shed their 0x100 bias here.
    fn get_num(&mut self, arg: &Arg) -> u8 {
        let word = match arg.value {
            ArgValue::Port(n) => u16::from(n),
            _ => arg.word(),
        };
        if word > 0xFF {
            self.log.error(format!(
                "Number range error: [{}]={} ({})",
                arg.src,
                arg.word(),
                arg.kind_name()
            ));
        }
        (word & 0xFF) as u8
    }

    /// Relative displacement from `addr` to the operand, range −128..127.
    /// The truncated byte is returned even when out of range so the
    /// statement keeps its size.
    fn get_offset(&mut self, addr: u16, arg: &Arg) -> u8 {
        let offset = arg.word().wrapping_sub(addr) as i16;
        if !(-128..=127).contains(&offset) {
            self.log.error(format!(
                "Offset range error: [{}] ({})",
                arg.src,
                arg.kind_name()
            ));
        }
        (offset & 0xFF) as u8
    }

    /// Offset byte of a two-byte-prefix branch; the displacement base is the
    /// address after the whole instruction.
    fn branch_offset(&mut self, target: &Arg) {
        let addr = self.pc.wrapping_add(self.bytes.len() as u16).wrapping_add(1);
        let byte = self.get_offset(addr, target);
        self.push(byte);
    }

    fn bad_arg(&mut self, op: &str, arg: &Arg) {
        self.log.error(format!(
            "Bad arg: {op} [{}] ({})",
            arg.src,
            arg.kind_name()
        ));
    }

    fn bad_args(&mut self, op: &str, a: &Arg, b: &Arg) {
        self.log.error(format!(
            "Bad arg(s): {op} {},{} ({},{})",
            a.src,
            b.src,
            a.kind_name(),
            b.kind_name()
        ));
    }

    fn mov(&mut self, op: &str, args: &[Arg]) {
        if !self.check_args(op, args, 2) {
            return;
        }
        match (&args[0].value, &args[1].value) {
            (ArgValue::Register(_), ArgValue::AccA) => {
                self.push(0x12);
                let n = self.get_num(&args[0]);
                self.push(n);
            }
            (ArgValue::Immediate(_), ArgValue::AccA) => {
                self.push(0x22);
                let n = self.get_byte(&args[0]);
                self.push(n);
            }
            (ArgValue::Register(_), ArgValue::AccB) => {
                self.push(0x32);
                let n = self.get_num(&args[0]);
                self.push(n);
            }
            (ArgValue::Register(_), ArgValue::Register(_)) => {
                self.push(0x42);
                let s = self.get_num(&args[0]);
                let d = self.get_num(&args[1]);
                self.push(s);
                self.push(d);
            }
            (ArgValue::Immediate(_), ArgValue::AccB) => {
                self.push(0x52);
                let n = self.get_byte(&args[0]);
                self.push(n);
            }
            (ArgValue::AccB, ArgValue::AccA) => self.push(0x62),
            (ArgValue::Immediate(_), ArgValue::Register(_)) => {
                self.push(0x72);
                let n = self.get_byte(&args[0]);
                let d = self.get_num(&args[1]);
                self.push(n);
                self.push(d);
            }
            (ArgValue::AccA, ArgValue::AccB) => self.push(0xC0),
            (ArgValue::AccA, ArgValue::Register(_)) => {
                self.push(0xD0);
                let d = self.get_num(&args[1]);
                self.push(d);
            }
            (ArgValue::AccB, ArgValue::Register(_)) => {
                self.push(0xD1);
                let d = self.get_num(&args[1]);
                self.push(d);
            }
            _ => self.bad_args(op, &args[0], &args[1]),
        }
    }

    fn movd(&mut self, op: &str, args: &[Arg]) {
        if !self.check_args(op, args, 2) {
            return;
        }
        match (&args[0].value, &args[1].value) {
            (ArgValue::Immediate(n), ArgValue::Register(_)) => {
                let n = *n;
                self.push(0x88);
                self.push((n >> 8) as u8);
                self.push((n & 0xFF) as u8);
                let d = self.get_num(&args[1]);
                self.push(d);
            }
            (ArgValue::Register(_), ArgValue::Register(_)) => {
                self.push(0x98);
                let s = self.get_num(&args[0]);
                let d = self.get_num(&args[1]);
                self.push(s);
                self.push(d);
            }
            (ArgValue::EffectiveIndexed(n), ArgValue::Register(_)) => {
                let n = *n;
                self.push(0xA8);
                self.push((n >> 8) as u8);
                self.push((n & 0xFF) as u8);
                let d = self.get_num(&args[1]);
                self.push(d);
            }
            _ => self.bad_args(op, &args[0], &args[1]),
        }
    }

    fn movp(&mut self, op: &str, args: &[Arg]) {
        if !self.check_args(op, args, 2) {
            return;
        }
        match (&args[0].value, &args[1].value) {
            (ArgValue::AccA, ArgValue::Port(_)) => {
                self.push(0x82);
                let p = self.get_num(&args[1]);
                self.push(p);
            }
            (ArgValue::AccB, ArgValue::Port(_)) => {
                self.push(0x92);
                let p = self.get_num(&args[1]);
                self.push(p);
            }
            (ArgValue::Immediate(_), ArgValue::Port(_)) => {
                self.push(0xA2);
                let n = self.get_byte(&args[0]);
                let p = self.get_num(&args[1]);
                self.push(n);
                self.push(p);
            }
            (ArgValue::Port(_), ArgValue::AccA) => {
                self.push(0x80);
                let p = self.get_num(&args[0]);
                self.push(p);
            }
            (ArgValue::Port(_), ArgValue::AccB) => {
                self.push(0x91);
                let p = self.get_num(&args[0]);
                self.push(p);
            }
            _ => self.bad_args(op, &args[0], &args[1]),
        }
    }

    /// Extended-address group (`LDA`, `STA`, `BR`, `CMPA`, `CALL`).
    fn xaddr(&mut self, op: &str, args: &[Arg], bits: u8) {
        if !self.check_args(op, args, 1) {
            return;
        }
        let arg = &args[0];
        match arg.value {
            ArgValue::Immediate(_) | ArgValue::Register(_) => {
                // accepted as DIR by extension
                if self.compat_warnings {
                    self.log.warn(format!(
                        "Got type {}, assuming DIR: {}={:04X}",
                        arg.kind_name(),
                        arg.src,
                        arg.word()
                    ));
                }
                self.direct(bits, arg.word());
            }
            ArgValue::Direct(addr) => self.direct(bits, addr),
            ArgValue::Indirect(_) => {
                self.push(0x90 | bits);
                let n = self.get_num(arg);
                self.push(n);
            }
            ArgValue::Indexed(addr) => {
                self.push(0xA0 | bits);
                self.push((addr >> 8) as u8);
                self.push((addr & 0xFF) as u8);
            }
            _ => {
                self.bad_arg(op, arg);
                self.direct(bits, arg.word());
            }
        }
    }

    fn direct(&mut self, bits: u8, addr: u16) {
        self.push(0x80 | bits);
        self.push((addr >> 8) as u8);
        self.push((addr & 0xFF) as u8);
    }

    fn unop(&mut self, op: &str, args: &[Arg], num: usize, bits: u8) -> bool {
        if !self.check_args(op, args, num) {
            return false;
        }
        match args[0].value {
            ArgValue::AccA => self.push(0xB0 | bits),
            ArgValue::AccB => self.push(0xC0 | bits),
            ArgValue::Register(_) => {
                self.push(0xD0 | bits);
                let n = self.get_num(&args[0]);
                self.push(n);
            }
            _ => self.bad_arg(op, &args[0]),
        }
        true
    }

    fn binop(&mut self, op: &str, args: &[Arg], num: usize, bits: u8) -> bool {
        if !self.check_args(op, args, num) {
            return false;
        }
        match (&args[0].value, &args[1].value) {
            (ArgValue::Register(_), ArgValue::AccA) => {
                self.push(0x10 | bits);
                let n = self.get_num(&args[0]);
                self.push(n);
            }
            (ArgValue::Immediate(_), ArgValue::AccA) => {
                self.push(0x20 | bits);
                let n = self.get_num(&args[0]);
                self.push(n);
            }
            (ArgValue::Register(_), ArgValue::AccB) => {
                self.push(0x30 | bits);
                let n = self.get_num(&args[0]);
                self.push(n);
            }
            (ArgValue::Register(_), ArgValue::Register(_)) => {
                self.push(0x40 | bits);
                let s = self.get_num(&args[0]);
                let d = self.get_num(&args[1]);
                self.push(s);
                self.push(d);
            }
            (ArgValue::Immediate(_), ArgValue::AccB) => {
                self.push(0x50 | bits);
                let n = self.get_num(&args[0]);
                self.push(n);
            }
            (ArgValue::AccB, ArgValue::AccA) => self.push(0x60 | bits),
            (ArgValue::Immediate(_), ArgValue::Register(_)) => {
                self.push(0x70 | bits);
                let n = self.get_num(&args[0]);
                let d = self.get_num(&args[1]);
                self.push(n);
                self.push(d);
            }
            _ => self.bad_args(op, &args[0], &args[1]),
        }
        true
    }

    fn binop_p(&mut self, op: &str, args: &[Arg], num: usize, bits: u8) -> bool {
        if !self.check_args(op, args, num) {
            return false;
        }
        match (&args[0].value, &args[1].value) {
            (ArgValue::AccA, ArgValue::Port(_)) => {
                self.push(0x80 | bits);
                let p = self.get_num(&args[1]);
                self.push(p);
            }
            (ArgValue::AccB, ArgValue::Port(_)) => {
                self.push(0x90 | bits);
                let p = self.get_num(&args[1]);
                self.push(p);
            }
            (ArgValue::Immediate(_), ArgValue::Port(_)) => {
                self.push(0xA0 | bits);
                let n = self.get_byte(&args[0]);
                let p = self.get_num(&args[1]);
                self.push(n);
                self.push(p);
            }
            _ => self.bad_args(op, &args[0], &args[1]),
        }
        true
    }

    fn jump(&mut self, op: &str, args: &[Arg], bits: u8) {
        if !self.check_args(op, args, 1) {
            return;
        }
        match args[0].value {
            ArgValue::Immediate(_) => {
                self.push(0xE0 | bits);
                let addr = self.pc.wrapping_add(2);
                let offset = self.get_offset(addr, &args[0]);
                self.push(offset);
            }
            _ => self.bad_arg(op, &args[0]),
        }
    }

    fn trap(&mut self, op: &str, args: &[Arg]) {
        if !self.check_args(op, args, 1) {
            return;
        }
        match args[0].value {
            ArgValue::Immediate(n) => self.push(0xFFu16.wrapping_sub(n) as u8),
            _ => self.bad_arg(op, &args[0]),
        }
    }

    fn pushpop(&mut self, op: &str, args: &[Arg], bits: u8) {
        if !self.check_args(op, args, 1) {
            return;
        }
        match args[0].value {
            ArgValue::AccA => self.push(0xB0 | bits),
            ArgValue::AccB => self.push(0xC0 | bits),
            ArgValue::Register(_) => {
                self.push(0xD0 | bits);
                let n = self.get_num(&args[0]);
                self.push(n);
            }
            // PUSH ST = 0x0E, POP ST = 0x08
            ArgValue::Status => self.push(if bits == 0x08 { 0x0E } else { 0x08 }),
            _ => self.bad_arg(op, &args[0]),
        }
    }

    fn implicit(&mut self, op: &str, args: &[Arg], opcode: u8) {
        if self.check_args(op, args, 0) {
            self.push(opcode);
        }
    }

    fn byte_data(&mut self, args: &[Arg]) {
        if args.is_empty() {
            self.log.error("Missing byte value(s)");
        }
        for arg in args {
            let byte = self.get_byte(arg);
            self.push(byte);
        }
    }

    fn db_data(&mut self, args: &[Arg], argstr: &str) {
        if self.compat_warnings {
            self.log.warn(format!("Non-standard DB statement: {argstr}"));
        }
        if args.is_empty() {
            self.log.error("Missing byte value(s)");
        }
        for arg in args {
            match &arg.value {
                ArgValue::Immediate(_) => {
                    let byte = self.get_byte(arg);
                    self.push(byte);
                }
                ArgValue::Duplicated(fill) => {
                    self.list_block = false;
                    self.bytes.extend_from_slice(fill);
                }
                ArgValue::Text(text) => self.bytes.extend(text.bytes()),
                _ => self
                    .log
                    .error(format!("Bad arg type: {}", arg.kind_name())),
            }
        }
    }

    fn ds_data(&mut self, op: &str, args: &[Arg], argstr: &str) {
        if self.compat_warnings {
            self.log.warn(format!("Non-standard DS statement: {argstr}"));
        }
        if self.check_args(op, args, 1) {
            self.reserve = args[0].word();
        }
    }

    fn text_data(&mut self, op: &str, args: &[Arg]) {
        if !self.check_args(op, args, 1) {
            return;
        }
        match &args[0].value {
            ArgValue::Text(text) => self.bytes.extend(text.bytes()),
            _ => self
                .log
                .error(format!("Bad arg type: {}", args[0].kind_name())),
        }
    }

    fn word_data(&mut self, op: &str, args: &[Arg], argstr: &str) {
        if self.compat_warnings && op == "DW" {
            self.log.warn(format!("Got DW, assuming DATA: {argstr}"));
        }
        if args.is_empty() {
            self.log.error("Missing word value(s)");
        }
        for arg in args {
            let word = arg.word();
            self.push((word >> 8) as u8);
            self.push((word & 0xFF) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::encode;
    use crate::arg::{Arg, ArgValue};
    use crate::log::Log;

    fn reg(n: u8) -> Arg {
        Arg::new(ArgValue::Register(n), format!("R{n}"))
    }

    fn imm(n: u16) -> Arg {
        Arg::new(ArgValue::Immediate(n), format!("%{n}"))
    }

    fn enc(op: &str, args: &[Arg], pc: u16, log: &mut Log) -> Vec<u8> {
        encode(op, args, "", pc, true, log)
            .expect("known op-code")
            .bytes
    }

    #[test]
    fn mov_columns() {
        let mut log = Log::new();
        assert_eq!(enc("MOV", &[reg(5), Arg::new(ArgValue::AccA, "A")], 0, &mut log), vec![0x12, 0x05]);
        assert_eq!(enc("MOV", &[imm(0x42), Arg::new(ArgValue::AccB, "B")], 0, &mut log), vec![0x52, 0x42]);
        assert_eq!(enc("MOV", &[reg(3), reg(4)], 0, &mut log), vec![0x42, 0x03, 0x04]);
        assert_eq!(enc("MOV", &[Arg::new(ArgValue::AccA, "A"), Arg::new(ArgValue::AccB, "B")], 0, &mut log), vec![0xC0]);
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn lda_direct() {
        let mut log = Log::new();
        let arg = Arg::new(ArgValue::Direct(0x1234), "@>1234");
        assert_eq!(enc("LDA", &[arg], 0, &mut log), vec![0x8A, 0x12, 0x34]);
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn xaddr_compat_extension_warns_and_encodes_direct() {
        let mut log = Log::new();
        let bytes = enc("BR", &[imm(0x8000)], 0, &mut log);
        assert_eq!(bytes, vec![0x8C, 0x80, 0x00]);
        assert_eq!(log.warning_count(), 1);
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn short_jump_offset_is_relative_to_next_instruction() {
        let mut log = Log::new();
        let target = Arg::new(ArgValue::Immediate(0x0100), "LOOP");
        assert_eq!(enc("JMP", &[target.clone()], 0x00FE, &mut log), vec![0xE0, 0x00]);
        assert_eq!(enc("JNZ", &[target], 0x00F0, &mut log), vec![0xE6, 0x0E]);
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn jump_out_of_range_logs_but_keeps_the_size() {
        let mut log = Log::new();
        let target = Arg::new(ArgValue::Immediate(0x1000), "FAR");
        let bytes = enc("JMP", &[target], 0x0000, &mut log);
        assert_eq!(bytes.len(), 2);
        assert_eq!(bytes[0], 0xE0);
        assert_eq!(log.error_count(), 1);
    }

    #[test]
    fn djnz_offset_follows_the_register_byte() {
        let mut log = Log::new();
        let target = Arg::new(ArgValue::Immediate(0x0200), "LOOP");
        // 0xDA R5 offset; base is pc + 3
        assert_eq!(
            enc("DJNZ", &[reg(5), target], 0x0200, &mut log),
            vec![0xDA, 0x05, 0xFD]
        );
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn btjo_offset_follows_the_operand_bytes() {
        let mut log = Log::new();
        let target = Arg::new(ArgValue::Immediate(0x0104), "SET");
        let args = [imm(0x01), reg(8), target];
        assert_eq!(
            enc("BTJO", &args, 0x0100, &mut log),
            vec![0x76, 0x01, 0x08, 0x00]
        );
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn push_pop_status() {
        let mut log = Log::new();
        let st = Arg::new(ArgValue::Status, "ST");
        assert_eq!(enc("PUSH", &[st.clone()], 0, &mut log), vec![0x0E]);
        assert_eq!(enc("POP", &[st], 0, &mut log), vec![0x08]);
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn trap_number_maps_down_from_ff() {
        let mut log = Log::new();
        assert_eq!(enc("TRAP", &[imm(0)], 0, &mut log), vec![0xFF]);
        assert_eq!(enc("TRAP", &[imm(23)], 0, &mut log), vec![0xE8]);
    }

    #[test]
    fn movp_uses_unbiased_port_numbers() {
        let mut log = Log::new();
        let port = Arg::new(ArgValue::Port(6), "P6");
        assert_eq!(
            enc("MOVP", &[Arg::new(ArgValue::AccA, "A"), port], 0, &mut log),
            vec![0x82, 0x06]
        );
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn byte_requires_at_least_one_value() {
        let mut log = Log::new();
        let bytes = enc("BYTE", &[], 0, &mut log);
        assert!(bytes.is_empty());
        assert_eq!(log.error_count(), 1);
    }

    #[test]
    fn data_emits_high_byte_first() {
        let mut log = Log::new();
        assert_eq!(
            enc("DATA", &[imm(0x1234), imm(0x0005)], 0, &mut log),
            vec![0x12, 0x34, 0x00, 0x05]
        );
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn ds_reserves_without_emitting() {
        let mut log = Log::new();
        let encoded = encode("DS", &[imm(4)], "4", 0, false, &mut log).expect("known");
        assert!(encoded.bytes.is_empty());
        assert_eq!(encoded.reserve, 4);
        assert_eq!(log.warning_count(), 0);
    }

    #[test]
    fn db_mixes_immediates_text_and_fill_blocks() {
        let mut log = Log::new();
        let args = [
            imm(1),
            Arg::new(ArgValue::Text("AB".to_string()), "\"AB\""),
            Arg::new(ArgValue::Duplicated(vec![b'Z'; 3]), "3 DUP 'Z'"),
        ];
        let encoded = encode("DB", &args, "...", 0, false, &mut log).expect("known");
        assert_eq!(encoded.bytes, vec![0x01, b'A', b'B', b'Z', b'Z', b'Z']);
        assert!(!encoded.list_block);
        assert_eq!(log.warning_count(), 0);
    }

    #[test]
    fn db_fill_block_emits_one_byte_per_fill_value() {
        let mut log = Log::new();
        let args = [Arg::new(ArgValue::Duplicated(vec![0xFF; 3]), "3 DUP >FF")];
        let encoded = encode("DB", &args, "3 DUP >FF", 0, false, &mut log).expect("known");
        assert_eq!(encoded.bytes, vec![0xFF, 0xFF, 0xFF]);
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn unknown_op_code_is_not_encoded() {
        let mut log = Log::new();
        assert!(encode("XYZZY", &[], "", 0, true, &mut log).is_none());
    }

    #[test]
    fn byte_range_is_checked() {
        let mut log = Log::new();
        enc("BYTE", &[imm(0x0100)], 0, &mut log);
        assert_eq!(log.error_count(), 1);
        // -1 as 0xFFFF stays in the signed byte range
        let mut log = Log::new();
        assert_eq!(enc("BYTE", &[imm(0xFFFF)], 0, &mut log), vec![0xFF]);
        assert_eq!(log.error_count(), 0);
    }
}
