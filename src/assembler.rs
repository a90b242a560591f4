// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Two-pass driver.
//!
//! Pass 1 walks the whole source to resolve label addresses with the log
//! disabled; pass 2 repeats the identical expansion sequence and produces
//! object bytes, diagnostics and the listing. Statement-level problems are
//! logged and assembly resynchronizes on the next statement; only I/O
//! failures abort the run.

use std::fmt;
use std::io::Write;

use crate::arg::{Arg, ArgValue};
use crate::conditional::Conditionals;
use crate::encoder::{self, Encoded};
use crate::expr;
use crate::functions::Functions;
use crate::listing::{ListingLine, ListingWriter};
use crate::log::{AsmError, AsmErrorKind, Diagnostic, Log, Severity};
use crate::options::{Options, OptionsStack};
use crate::source::{MacroBody, SourceFrame, SourceLoader, SourceStack};
use crate::symbols::Symbols;
use crate::tokenizer::{self, Statement};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-pass line and diagnostic totals.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassCounts {
    pub lines: u32,
    pub errors: u32,
    pub warnings: u32,
}

/// Result of a completed run. The run itself may still contain statement
/// errors; see [`AsmRunReport::error_count`].
#[derive(Debug)]
pub struct AsmRunReport {
    diagnostics: Vec<Diagnostic>,
    object: Vec<u8>,
    counts: PassCounts,
}

impl AsmRunReport {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn object(&self) -> &[u8] {
        &self.object
    }

    pub fn counts(&self) -> PassCounts {
        self.counts
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }
}

/// A failure that aborted the run.
#[derive(Debug)]
pub struct AsmRunError {
    error: AsmError,
    diagnostics: Vec<Diagnostic>,
}

impl AsmRunError {
    fn new(error: AsmError, diagnostics: Vec<Diagnostic>) -> Self {
        Self { error, diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for AsmRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for AsmRunError {}

pub struct Assembler<L: SourceLoader> {
    loader: L,
    options: Options,
    opt_stack: OptionsStack,
    symbols: Symbols,
    functions: Functions,
    log: Log,
    diagnostics: Vec<Diagnostic>,
    object: Vec<u8>,
    pc: u16,
    pass: u8,
}

impl<L: SourceLoader> Assembler<L> {
    pub fn new(loader: L, options: Options) -> Self {
        Self {
            loader,
            options,
            opt_stack: OptionsStack::new(),
            symbols: Symbols::new(),
            functions: Functions::new(),
            log: Log::new(),
            diagnostics: Vec::new(),
            object: Vec::new(),
            pc: 0,
            pass: 0,
        }
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Run both passes over `infile`. The listing writer, when given, only
    /// sees pass 2.
    pub fn assemble<W: Write>(
        &mut self,
        infile: &str,
        mut listing: Option<&mut ListingWriter<W>>,
    ) -> Result<AsmRunReport, AsmRunError> {
        self.run_pass::<std::io::Sink>(1, infile, None)
            .map_err(|err| AsmRunError::new(err, std::mem::take(&mut self.diagnostics)))?;

        let counts = self
            .run_pass(2, infile, listing.as_deref_mut())
            .map_err(|err| AsmRunError::new(err, std::mem::take(&mut self.diagnostics)))?;

        Ok(AsmRunReport {
            diagnostics: std::mem::take(&mut self.diagnostics),
            object: std::mem::take(&mut self.object),
            counts,
        })
    }

    fn run_pass<W: Write>(
        &mut self,
        pass: u8,
        infile: &str,
        mut listing: Option<&mut ListingWriter<W>>,
    ) -> Result<PassCounts, AsmError> {
        self.pass = pass;
        self.pc = 0;
        self.log.set_enabled(pass == 2);
        self.log.set_debug(self.options.debug);
        self.log.set_warnings(self.options.warnings);
        self.functions = Functions::new();
        self.diagnostics.clear();
        self.object.clear();

        let lines = self.loader.load(infile).map_err(|_| {
            AsmError::new(AsmErrorKind::Io, "Failed to open input file", Some(infile))
        })?;

        let mut stack = SourceStack::new();
        stack.push(SourceFrame::file(infile, lines));

        let mut conditionals = Conditionals::new();
        let mut capture: Option<Capture> = None;
        let mut counts = PassCounts::default();
        let mut end = false;

        loop {
            let Some(frame) = stack.current_mut() else {
                break;
            };
            let Some(line) = frame.next_line() else {
                if stack.len() > 1 {
                    stack.pop();
                    self.symbols.exit_scope();
                    if let Some(frame) = stack.current() {
                        self.log.info(format!("File: {} ***", frame.name()));
                    }
                } else {
                    if !end {
                        self.log.warn("No END statement");
                    }
                    end = true;
                }
                let (line_num, file) = location(&stack, infile);
                self.drain_log(line_num, &file, &mut counts, listing.as_deref_mut())?;
                if end && stack.len() <= 1 {
                    break;
                }
                continue;
            };

            counts.lines += 1;
            let (line_num, file) = location(&stack, infile);
            let stmt = tokenizer::tokenize(&line);

            let outcome = self.process(
                &stmt,
                &line,
                &mut stack,
                &mut conditionals,
                &mut capture,
                &mut end,
            )?;

            let listed = self.options.list_all
                || (self.options.list
                    && (self.options.list_cond || conditionals.active() || outcome.old_cond));

            if pass == 2 {
                if listed {
                    if let Some(listing) = listing.as_deref_mut() {
                        write_listing(
                            listing.write_line(
                                &ListingLine {
                                    line_num,
                                    addr: outcome.addr,
                                    bytes: &outcome.encoded.bytes,
                                    show_addr: outcome.show_addr,
                                    list_block: outcome.encoded.list_block,
                                    source: &line,
                                },
                                &self.options,
                            ),
                        )?;
                    }
                }
                self.object.extend_from_slice(&outcome.encoded.bytes);
            }

            self.drain_log(
                line_num,
                &file,
                &mut counts,
                if listed { listing.as_deref_mut() } else { None },
            )?;

            self.pc = self
                .pc
                .wrapping_add(outcome.encoded.bytes.len() as u16)
                .wrapping_add(outcome.encoded.reserve);

            if end && stack.len() <= 1 {
                break;
            }
        }

        if conditionals.depth() > 0 {
            self.log.error("Found IF without ENDIF");
        }
        if capture.is_some() {
            self.log.error("Found REPT without ENDM");
        }
        let (line_num, file) = location(&stack, infile);
        self.drain_log(line_num, &file, &mut counts, listing.as_deref_mut())?;

        Ok(counts)
    }

    /// Process one tokenized statement; the returned outcome carries what
    /// the listing and the byte sink need.
    fn process(
        &mut self,
        stmt: &Statement,
        line: &str,
        stack: &mut SourceStack,
        conditionals: &mut Conditionals,
        capture: &mut Option<Capture>,
        end: &mut bool,
    ) -> Result<Outcome, AsmError> {
        let mut outcome = Outcome {
            addr: self.pc,
            encoded: Encoded {
                bytes: Vec::new(),
                reserve: 0,
                list_block: true,
            },
            show_addr: false,
            old_cond: conditionals.active(),
        };
        let op = stmt.op.as_str();
        let nargs = stmt.args.len();

        // Macro capture swallows everything up to the matching ENDM.
        if let Some(active) = capture.as_mut() {
            if active.body.add(op, line) {
                return Ok(outcome);
            }
            let Capture { body, count_expr } = match capture.take() {
                Some(c) => c,
                None => return Ok(outcome),
            };
            let count = self.classify(&count_expr).word();
            self.log.info(format!("Macro: {} ***", body.name()));
            stack.push(SourceFrame::rept(body, count));
            self.symbols.enter_scope();
            return Ok(outcome);
        }

        if op == "REPT" {
            if conditionals.active() {
                *capture = Some(Capture {
                    body: MacroBody::new("REPT"),
                    count_expr: tokenizer::to_upper_unquoted(stmt.argstr.trim()),
                });
            }
            return Ok(outcome);
        }

        // Conditionals are tracked even inside disabled branches so the
        // nesting stays balanced.
        match op {
            "IF" | "$IF" | "COND" => {
                let test = match nargs {
                    1 => conditionals.active() && self.classify(&stmt.args[0]).word() != 0,
                    0 => {
                        self.log.error("IF: missing argument");
                        true
                    }
                    _ => {
                        self.log.error("IF: too many arguments");
                        true
                    }
                };
                conditionals.begin(test);
                return Ok(outcome);
            }
            "ELSE" | "$ELSE" => {
                if nargs != 0 {
                    self.log.error("ELSE: too many arguments");
                } else if !conditionals.else_branch() {
                    self.log.error("ELSE without IF");
                }
                return Ok(outcome);
            }
            "ENDIF" | "$ENDIF" | "$ENDC" => {
                if nargs != 0 {
                    self.log.error("ENDIF: too many arguments");
                } else if !conditionals.end() {
                    self.log.error("ENDIF without IF");
                }
                return Ok(outcome);
            }
            _ => {}
        }

        if !conditionals.active() {
            return Ok(outcome);
        }

        match op {
            "COPY" | "INCLUDE" | "GET" => {
                if stmt.raw_args.len() == 1 {
                    let name = &stmt.raw_args[0];
                    let lines = self.loader.load(name).map_err(|_| {
                        AsmError::new(AsmErrorKind::Io, "Can't open include file", Some(name))
                    })?;
                    self.log.info(format!("File: {name} ***"));
                    stack.push(SourceFrame::file(name.as_str(), lines));
                    self.symbols.enter_scope();
                } else {
                    self.log.error(format!("Expecting 1 arg {}", stmt.argstr));
                }
                return Ok(outcome);
            }
            "SAVE" => {
                self.opt_stack.save(&self.options);
                return Ok(outcome);
            }
            "RESTORE" => {
                match self.opt_stack.restore() {
                    Some(options) => self.options = options,
                    None => self.log.error("No saved options"),
                }
                return Ok(outcome);
            }
            "CPU" => {
                self.log.debug(format!("CPU {} ignored", stmt.argstr));
                return Ok(outcome);
            }
            "PAGE" => {
                match stmt.args.as_slice() {
                    [arg] => self.options.page = arg == "ON" || arg == "1",
                    _ => self.log.error(format!("Expecting 1 arg {}", stmt.argstr)),
                }
                return Ok(outcome);
            }
            "LISTING" => {
                match stmt.args.as_slice() {
                    [arg] => self.options.list = arg == "ON" || arg == "1",
                    _ => self.log.error(format!("Expecting 1 arg {}", stmt.argstr)),
                }
                return Ok(outcome);
            }
            "FUNCTION" | "FUNC" => {
                if stmt.label.is_empty() {
                    self.log.error("Missing function label");
                } else {
                    self.functions.define(&stmt.label, &stmt.args, &mut self.log);
                }
                return Ok(outcome);
            }
            "MACRO" => {
                self.log
                    .warn(format!("MACRO {} currently not handled", stmt.argstr));
                return Ok(outcome);
            }
            _ => {}
        }

        // Ordinary statement: classify operands, settle the label, encode.
        let args: Vec<Arg> = stmt.args.iter().map(|a| self.classify(a)).collect();

        let mut addr = self.pc;
        if !stmt.label.is_empty() {
            let mut template = ArgValue::Immediate(0);
            if op == "ORG" || op == "AORG" {
                if self.check_args(op, &args, 1) {
                    addr = self.get_immediate(&args[0]);
                    self.pc = addr;
                }
            } else if op == "EQU" {
                if self.check_args(op, &args, 1) {
                    match &args[0].value {
                        ArgValue::Immediate(_) | ArgValue::Register(_) | ArgValue::Port(_) => {
                            addr = args[0].word();
                            template = args[0].value.clone();
                        }
                        other => self.log.error(format!(
                            "Bad addressing mode: [{}] ({})",
                            args[0].src,
                            other.kind_name()
                        )),
                    }
                }
            }

            if self.pass == 2 {
                if let Some(sym) = self.symbols.lookup(&stmt.label) {
                    if !sym.is_undefined() && sym.word() != addr {
                        self.log.error(format!(
                            "Multiple definition: [{}] ({}={:04X})",
                            stmt.label,
                            sym.kind_name(),
                            sym.word()
                        ));
                    }
                }
            }
            let value = template.with_word(addr);
            if !self
                .symbols
                .define(&stmt.label, Arg::new(value, stmt.label.clone()))
            {
                self.log.error("Symbols stack empty");
            }
        }
        outcome.addr = addr;
        outcome.show_addr = true;

        match op {
            "ORG" | "AORG" => {
                if stmt.label.is_empty() && self.check_args(op, &args, 1) {
                    addr = self.get_immediate(&args[0]);
                    self.pc = addr;
                    outcome.addr = addr;
                }
            }
            "EQU" => {} // label side already handled
            "END" => *end = true,
            "ERROR" | "WARNING" | "MESSAGE" | "INFO" => {
                if self.check_args(op, &args, 1) {
                    match &args[0].value {
                        ArgValue::Text(text) => match op {
                            "ERROR" => self.log.error(text.clone()),
                            "WARNING" => self.log.warn(text.clone()),
                            _ => self.log.info(text.clone()),
                        },
                        other => self
                            .log
                            .error(format!("Bad arg type: {}", other.kind_name())),
                    }
                }
            }
            "ASSERT_EQUAL" => {
                if self.check_args(op, &args, 2) {
                    self.assert_equal(&args[0], &args[1]);
                }
            }
            "" => outcome.show_addr = false,
            _ => {
                match encoder::encode(
                    op,
                    &args,
                    &stmt.argstr,
                    self.pc,
                    self.options.compat_warnings,
                    &mut self.log,
                ) {
                    Some(encoded) => outcome.encoded = encoded,
                    None => self.log.error(format!("Unrecognized op-code: [{op}]")),
                }
            }
        }

        Ok(outcome)
    }

    fn assert_equal(&mut self, a: &Arg, b: &Arg) {
        match (&a.value, &b.value) {
            (ArgValue::Text(ta), ArgValue::Text(tb)) => {
                if ta != tb {
                    self.log
                        .error(format!("Assertion failed: {} != {}", a.src, b.src));
                    self.log.info(format!("with {} = '{ta}'", a.src));
                    self.log.info(format!(" and {} = '{tb}'", b.src));
                }
            }
            (ArgValue::Text(_), _) | (_, ArgValue::Text(_)) => {
                self.log.error(format!(
                    "Assertion failed: type of {} incompatible with type of {}",
                    a.src, b.src
                ));
                self.log.info(format!("with {} as {}", a.src, a.kind_name()));
                self.log.info(format!(" and {} as {}", b.src, b.kind_name()));
            }
            _ => {
                if a.word() != b.word() {
                    self.log
                        .error(format!("Assertion failed: {} != {}", a.src, b.src));
                    self.log.info(format!("with {} = {:04X}", a.src, a.word()));
                    self.log.info(format!(" and {} = {:04X}", b.src, b.word()));
                }
            }
        }
    }

    fn classify(&mut self, operand: &str) -> Arg {
        expr::classify(
            operand,
            &mut self.symbols,
            &self.functions,
            &mut self.log,
            self.pc,
        )
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

    fn get_immediate(&mut self, arg: &Arg) -> u16 {
        if !matches!(arg.value, ArgValue::Immediate(_)) {
            self.log.error(format!(
                "Expecting immediate: [{}] ({})",
                arg.src,
                arg.kind_name()
            ));
        }
        arg.word()
    }

    /// Move the statement's messages into diagnostics, updating totals and
    /// echoing them into the listing.
    fn drain_log<W: Write>(
        &mut self,
        line_num: usize,
        file: &str,
        counts: &mut PassCounts,
        mut listing: Option<&mut ListingWriter<W>>,
    ) -> Result<(), AsmError> {
        for msg in self.log.take() {
            match msg.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                _ => {}
            }
            if let Some(listing) = listing.as_deref_mut() {
                write_listing(listing.write_message(msg.severity, &msg.text))?;
            }
            self.diagnostics.push(
                Diagnostic::new(line_num as u32, msg.severity, msg.text)
                    .with_file(Some(file.to_string())),
            );
        }
        Ok(())
    }
}

struct Capture {
    body: MacroBody,
    count_expr: String,
}

struct Outcome {
    addr: u16,
    encoded: Encoded,
    show_addr: bool,
    old_cond: bool,
}

fn location(stack: &SourceStack, infile: &str) -> (usize, String) {
    match stack.current() {
        Some(frame) => (frame.line_num(), frame.name().to_string()),
        None => (0, infile.to_string()),
    }
}

fn write_listing(result: std::io::Result<()>) -> Result<(), AsmError> {
    result.map_err(|err| AsmError::new(AsmErrorKind::Io, "Write listing", Some(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;

    use super::{Assembler, AsmRunReport};
    use crate::arg::ArgValue;
    use crate::listing::ListingWriter;
    use crate::options::Options;
    use crate::source::SourceLoader;

    struct MapLoader {
        files: HashMap<String, Vec<String>>,
    }

    impl MapLoader {
        fn new(files: &[(&str, &str)]) -> Self {
            let files = files
                .iter()
                .map(|(name, text)| {
                    (
                        name.to_string(),
                        text.lines().map(str::to_string).collect(),
                    )
                })
                .collect();
            Self { files }
        }
    }

    impl SourceLoader for MapLoader {
        fn load(&self, name: &str) -> io::Result<Vec<String>> {
            self.files
                .get(name)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
        }
    }

    fn assemble(source: &str) -> (AsmRunReport, Assembler<MapLoader>) {
        assemble_files(&[("main.asm", source)])
    }

    fn assemble_files(files: &[(&str, &str)]) -> (AsmRunReport, Assembler<MapLoader>) {
        let loader = MapLoader::new(files);
        let mut asm = Assembler::new(loader, Options::default());
        let report = asm
            .assemble::<io::Sink>("main.asm", None)
            .expect("run completes");
        (report, asm)
    }

    #[test]
    fn assembles_a_small_program() {
        let src = "\
\tAORG\t>0100
START\tMOV\tR5,A
\tLDA\t@>1234
\tJMP\tSTART
\tEND
";
        let (report, asm) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(
            report.object(),
            &[0x12, 0x05, 0x8A, 0x12, 0x34, 0xE0, 0xF9]
        );
        assert_eq!(
            asm.symbols().lookup("START").map(|a| a.word()),
            Some(0x0100)
        );
    }

    #[test]
    fn forward_references_resolve_on_pass_two() {
        let src = "\
\tJMP\tDONE
\tNOP
DONE\tRETS
\tEND
";
        let (report, _) = assemble(src);
        assert_eq!(report.error_count(), 0);
        // JMP is 2 bytes, NOP 1; DONE = 3, offset = 3 - 2 = 1
        assert_eq!(report.object(), &[0xE0, 0x01, 0x00, 0x0A]);
    }

    #[test]
    fn missing_end_is_a_warning() {
        let (report, _) = assemble("\tNOP\n");
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
        assert!(report.diagnostics()[0].message().contains("No END"));
    }

    #[test]
    fn equ_defines_without_advancing_pc() {
        let src = "\
COUNT\tEQU\t5
\tMOV\t%COUNT,B
\tEND
";
        let (report, asm) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.object(), &[0x52, 0x05]);
        assert_eq!(asm.symbols().lookup("COUNT").map(|a| a.word()), Some(5));
    }

    #[test]
    fn equ_to_a_register_keeps_the_register_kind() {
        let src = "\
TMP\tEQU\tR7
\tMOV\tTMP,A
\tEND
";
        let (report, asm) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.object(), &[0x12, 0x07]);
        assert_eq!(
            asm.symbols().lookup("TMP").map(|a| a.value.clone()),
            Some(ArgValue::Register(7))
        );
    }

    #[test]
    fn ds_reserves_space_between_labels() {
        let src = "\
\tAORG\t>0200
BUF\tDS\t4
AFTER\tNOP
\tEND
";
        let (report, asm) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(asm.symbols().lookup("BUF").map(|a| a.word()), Some(0x0200));
        assert_eq!(
            asm.symbols().lookup("AFTER").map(|a| a.word()),
            Some(0x0204)
        );
        // DS emits nothing
        assert_eq!(report.object(), &[0x00]);
    }

    #[test]
    fn conditional_assembly_skips_the_dead_branch() {
        let src = "\
FLAG\tEQU\t1
\tIF\tFLAG
\tBYTE\t1
\tELSE
\tBYTE\t2
\tENDIF
\tIF\tFLAG-1
\tBYTE\t3
\tENDIF
\tEND
";
        let (report, _) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.object(), &[0x01]);
    }

    #[test]
    fn rept_replays_its_body() {
        let src = "\
\tREPT\t3
\tBYTE\t7
\tENDM
\tEND
";
        let (report, _) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.object(), &[7, 7, 7]);
    }

    #[test]
    fn db_fill_block_keeps_addresses_aligned() {
        let src = "\
\tDB\t3 DUP >FF
AFTER\tNOP
\tEND
";
        let (report, asm) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.object(), &[0xFF, 0xFF, 0xFF, 0x00]);
        assert_eq!(asm.symbols().lookup("AFTER").map(|a| a.word()), Some(3));
    }

    #[test]
    fn include_pulls_in_another_file_with_its_own_scope() {
        let main = "\
\tINCLUDE\tdefs.asm
\tBYTE\tVALUE
\tEND
";
        let defs = "VALUE\tEQU\t>42\n";
        let (report, _) = assemble_files(&[("main.asm", main), ("defs.asm", defs)]);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.object(), &[0x42]);
    }

    #[test]
    fn missing_include_aborts_the_run() {
        let loader = MapLoader::new(&[("main.asm", "\tINCLUDE\tnope.asm\n\tEND\n")]);
        let mut asm = Assembler::new(loader, Options::default());
        let err = asm
            .assemble::<io::Sink>("main.asm", None)
            .expect_err("include failure aborts");
        assert!(err.to_string().contains("nope.asm"));
    }

    #[test]
    fn function_substitution_in_operands() {
        let src = "\
SUM\tFUNCTION\tX,Y,X+Y
\tBYTE\tSUM(2,3)
\tEND
";
        let (report, _) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.object(), &[5]);
    }

    #[test]
    fn unknown_op_code_is_an_error_but_assembly_continues() {
        let src = "\
\tFROB\tR1
\tNOP
\tEND
";
        let (report, _) = assemble(src);
        assert_eq!(report.error_count(), 1);
        assert!(report.diagnostics()[0]
            .message()
            .contains("Unrecognized op-code"));
        assert_eq!(report.object(), &[0x00]);
    }

    #[test]
    fn multiple_definition_is_detected_on_pass_two() {
        let src = "\
X\tEQU\t1
X\tEQU\t2
\tEND
";
        let (report, _) = assemble(src);
        // pass 1 leaves X=2, so on pass 2 the first definition conflicts
        // with the stored value and the second with the redefined one
        assert_eq!(report.error_count(), 2);
        assert!(report
            .diagnostics()
            .iter()
            .all(|d| d.message().contains("Multiple definition")));
    }

    #[test]
    fn error_directive_reports_its_text() {
        let src = "\
\tERROR\t\"boom\"
\tEND
";
        let (report, _) = assemble(src);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.diagnostics()[0].message(), "boom");
    }

    #[test]
    fn assert_equal_checks_values() {
        let src = "\
\tASSERT_EQUAL\t2+2,4
\tASSERT_EQUAL\t1,2
\tEND
";
        let (report, _) = assemble(src);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn unterminated_if_is_reported() {
        let src = "\
\tIF\t1
\tNOP
\tEND
";
        let (report, _) = assemble(src);
        assert_eq!(report.error_count(), 1);
        assert!(report.diagnostics().iter().any(|d| d
            .message()
            .contains("IF without ENDIF")));
    }

    #[test]
    fn both_passes_agree_on_addresses() {
        // A forward branch over a REPT block only encodes correctly when
        // pass 1 expanded the block exactly like pass 2.
        let src = "\
\tJMP\tDONE
\tREPT\t2
\tNOP
\tENDM
DONE\tRETS
\tEND
";
        let (report, asm) = assemble(src);
        assert_eq!(report.error_count(), 0);
        assert_eq!(asm.symbols().lookup("DONE").map(|a| a.word()), Some(4));
        assert_eq!(report.object(), &[0xE0, 0x02, 0x00, 0x00, 0x0A]);
    }

    #[test]
    fn listing_interleaves_diagnostics() {
        let src = "\
\tBYTE
\tEND
";
        let loader = MapLoader::new(&[("main.asm", src)]);
        let mut asm = Assembler::new(loader, Options::default());
        let mut buf = Vec::new();
        let mut listing = ListingWriter::new(&mut buf);
        let report = asm
            .assemble("main.asm", Some(&mut listing))
            .expect("run completes");
        assert_eq!(report.error_count(), 1);
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("BYTE"));
        assert!(text.contains("*** Error: Missing byte value(s)"));
    }
}
