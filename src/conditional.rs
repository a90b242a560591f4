// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Conditional-assembly state for `IF`/`ELSE`/`ENDIF` nesting.
//!
//! The current activation already folds in every enclosing branch, so a
//! nested `IF` inside a disabled branch can never re-enable assembly.

#[derive(Debug)]
pub struct Conditionals {
    stack: Vec<bool>,
    current: bool,
}

impl Default for Conditionals {
    fn default() -> Self {
        Self::new()
    }
}

impl Conditionals {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            current: true,
        }
    }

    /// Whether statements are currently assembled.
    pub fn active(&self) -> bool {
        self.current
    }

    /// Open a conditional branch. `test` is the truth of the `IF` operand.
    pub fn begin(&mut self, test: bool) {
        self.stack.push(self.current);
        self.current = self.current && test;
    }

    /// Flip to the `ELSE` branch. Returns false when no `IF` is open.
    pub fn else_branch(&mut self) -> bool {
        match self.stack.last() {
            Some(&enclosing) => {
                self.current = enclosing && !self.current;
                true
            }
            None => false,
        }
    }

    /// Close the innermost conditional. Returns false when no `IF` is open.
    pub fn end(&mut self) -> bool {
        match self.stack.pop() {
            Some(enclosing) => {
                self.current = enclosing;
                true
            }
            None => false,
        }
    }

    /// Number of unterminated conditionals, checked at end of pass.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
        self.current = true;
    }
}
