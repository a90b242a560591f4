// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Input sources: files, included files and replayed `REPT` bodies.
//!
//! The driver reads from a stack of frames; `INCLUDE` pushes a file frame,
//! a completed `REPT` capture pushes a macro frame that replays its body a
//! fixed number of times. Each frame owns one symbol scope.

use std::io;

/// Provides the lines of a named source file.
///
/// The production implementation reads from the filesystem; tests supply
/// sources from memory.
pub trait SourceLoader {
    fn load(&self, name: &str) -> io::Result<Vec<String>>;
}

/// A macro body under capture. Lines are collected verbatim until the
/// matching `ENDM`; nested block openers deepen the nesting level so an
/// inner `ENDM` does not end the capture early.
#[derive(Debug, Clone)]
pub struct MacroBody {
    name: String,
    lines: Vec<String>,
    level: usize,
}

impl MacroBody {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
            level: 0,
        }
    }

    /// Feed one statement into the capture. Returns false when this was the
    /// terminating `ENDM`, which is not part of the body.
    pub fn add(&mut self, op: &str, line: &str) -> bool {
        match op {
            "MACRO" | "REPT" | "IRP" | "IRPC" => self.level += 1,
            "ENDM" => {
                if self.level == 0 {
                    return false;
                }
                self.level -= 1;
            }
            _ => {}
        }
        self.lines.push(line.to_string());
        true
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One entry on the source stack.
#[derive(Debug, Clone)]
pub enum SourceFrame {
    File {
        name: String,
        lines: Vec<String>,
        pos: usize,
    },
    Macro {
        name: String,
        lines: Vec<String>,
        pos: usize,
        iterations_left: u16,
    },
}

impl SourceFrame {
    pub fn file(name: impl Into<String>, lines: Vec<String>) -> Self {
        SourceFrame::File {
            name: name.into(),
            lines,
            pos: 0,
        }
    }

    /// A frame replaying `body` `count` times. `REPT 0` yields no lines.
    pub fn rept(body: MacroBody, count: u16) -> Self {
        let pos = body.lines.len();
        SourceFrame::Macro {
            name: body.name,
            lines: body.lines,
            pos,
            iterations_left: count,
        }
    }

    pub fn next_line(&mut self) -> Option<String> {
        match self {
            SourceFrame::File { lines, pos, .. } => {
                let line = lines.get(*pos)?.clone();
                *pos += 1;
                Some(line)
            }
            SourceFrame::Macro {
                lines,
                pos,
                iterations_left,
                ..
            } => {
                if *pos >= lines.len() {
                    if *iterations_left == 0 || lines.is_empty() {
                        return None;
                    }
                    *iterations_left -= 1;
                    *pos = 0;
                }
                let line = lines.get(*pos)?.clone();
                *pos += 1;
                Some(line)
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SourceFrame::File { name, .. } | SourceFrame::Macro { name, .. } => name,
        }
    }

    /// 1-based number of the line most recently returned, within the frame.
    pub fn line_num(&self) -> usize {
        match self {
            SourceFrame::File { pos, .. } | SourceFrame::Macro { pos, .. } => *pos,
        }
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, SourceFrame::Macro { .. })
    }
}

/// The stack of active frames; the innermost frame supplies the next line.
#[derive(Debug, Default)]
pub struct SourceStack {
    frames: Vec<SourceFrame>,
}

impl SourceStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: SourceFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<SourceFrame> {
        self.frames.pop()
    }

    pub fn current(&self) -> Option<&SourceFrame> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut SourceFrame> {
        self.frames.last_mut()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{MacroBody, SourceFrame};

    fn drain(frame: &mut SourceFrame) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = frame.next_line() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn file_frame_yields_lines_in_order() {
        let mut frame = SourceFrame::file(
            "main.asm",
            vec![" nop".to_string(), " rets".to_string()],
        );
        assert_eq!(drain(&mut frame), vec![" nop", " rets"]);
        assert_eq!(frame.line_num(), 2);
    }

    #[test]
    fn rept_replays_the_body_count_times() {
        let mut body = MacroBody::new("REPT");
        assert!(body.add("NOP", " nop"));
        assert!(!body.add("ENDM", " endm"));
        let mut frame = SourceFrame::rept(body, 3);
        assert_eq!(drain(&mut frame), vec![" nop", " nop", " nop"]);
    }

    #[test]
    fn rept_zero_yields_nothing() {
        let mut body = MacroBody::new("REPT");
        body.add("NOP", " nop");
        let mut frame = SourceFrame::rept(body, 0);
        assert!(frame.next_line().is_none());
    }

    #[test]
    fn nested_block_openers_keep_capture_alive() {
        let mut body = MacroBody::new("REPT");
        assert!(body.add("REPT", " rept 2"));
        assert!(body.add("NOP", " nop"));
        assert!(body.add("ENDM", " endm"));
        assert!(!body.add("ENDM", " endm"));
        let frame = SourceFrame::rept(body, 1);
        match frame {
            SourceFrame::Macro { lines, .. } => {
                assert_eq!(lines, vec![" rept 2", " nop", " endm"]);
            }
            SourceFrame::File { .. } => panic!("expected macro frame"),
        }
    }
}
