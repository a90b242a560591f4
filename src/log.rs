// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Diagnostics sink for the assembler core.
//!
//! Components log against the current statement; the driver drains the sink
//! after each statement into [`Diagnostic`]s carrying source context.  The
//! `enabled` gate keeps pass 1 silent (messages are only meaningful on the
//! final pass), and the `warnings` gate suppresses warnings independently.

use std::fmt;

/// Categories of assembler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmErrorKind {
    Assembler,
    Cli,
    Conditional,
    Directive,
    Expression,
    Instruction,
    Io,
    Symbol,
}

/// An assembler error with a kind and message.
#[derive(Debug, Clone)]
pub struct AsmError {
    kind: AsmErrorKind,
    message: String,
}

impl AsmError {
    pub fn new(kind: AsmErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.kind
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AsmError {}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg}: {p}"),
        None => msg.to_string(),
    }
}

/// Severity level for logged messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Debug,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
            Severity::Debug => "Debug",
        }
    }
}

/// One message recorded against the current statement.
#[derive(Debug, Clone)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

/// Per-statement message collector with pass and verbosity gates.
#[derive(Debug, Default)]
pub struct Log {
    messages: Vec<Message>,
    enabled: bool,
    warnings: bool,
    debug: bool,
}

impl Log {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            enabled: true,
            warnings: true,
            debug: false,
        }
    }

    pub fn set_enabled(&mut self, flag: bool) {
        self.enabled = flag;
    }

    pub fn set_warnings(&mut self, flag: bool) {
        self.warnings = flag;
    }

    pub fn set_debug(&mut self, flag: bool) {
        self.debug = flag;
    }

    pub fn error(&mut self, text: impl Into<String>) {
        if self.enabled {
            self.push(Severity::Error, text.into());
        }
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        if self.enabled && self.warnings {
            self.push(Severity::Warning, text.into());
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        if self.enabled {
            self.push(Severity::Info, text.into());
        }
    }

    pub fn debug(&mut self, text: impl Into<String>) {
        if self.enabled && self.debug {
            self.push(Severity::Debug, text.into());
        }
    }

    fn push(&mut self, severity: Severity, text: String) {
        self.messages.push(Message { severity, text });
    }

    pub fn error_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Warning)
            .count()
    }

    pub fn has_output(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn take(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// A diagnostic message with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    line: u32,
    severity: Severity,
    message: String,
    file: Option<String>,
}

impl Diagnostic {
    pub fn new(line: u32, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            line,
            severity,
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn format(&self) -> String {
        match &self.file {
            Some(file) => format!(
                "{file}:{}: {} - {}",
                self.line,
                self.severity.as_str(),
                self.message
            ),
            None => format!("{}: {} - {}", self.line, self.severity.as_str(), self.message),
        }
    }
}
