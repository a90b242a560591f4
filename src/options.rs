// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Listing and warning options, with the `SAVE`/`RESTORE` stack.

/// Formatting and verbosity options mutated by assembler directives.
#[derive(Debug, Clone)]
pub struct Options {
    /// Emit compatibility warnings for non-standard spellings (`DB`, `DW`, ...).
    pub compat_warnings: bool,
    /// Emit warnings at all.
    pub warnings: bool,
    /// Emit debug messages.
    pub debug: bool,
    /// Produce listing lines (`LISTING ON/OFF`).
    pub list: bool,
    /// List statements inside disabled conditional branches.
    pub list_cond: bool,
    /// List every line regardless of other gates.
    pub list_all: bool,
    /// Print the listing header block.
    pub header: bool,
    /// Print line numbers in the listing.
    pub line_numbers: bool,
    /// Page formatting (`PAGE ON/OFF`), kept for the listing collaborator.
    pub page: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            compat_warnings: true,
            warnings: true,
            debug: false,
            list: true,
            list_cond: false,
            list_all: false,
            header: true,
            line_numbers: true,
            page: true,
        }
    }
}

/// Stack used by the `SAVE` and `RESTORE` directives.
#[derive(Debug, Default)]
pub struct OptionsStack {
    stack: Vec<Options>,
}

impl OptionsStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn save(&mut self, options: &Options) {
        self.stack.push(options.clone());
    }

    pub fn restore(&mut self) -> Option<Options> {
        self.stack.pop()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Options, OptionsStack};

    #[test]
    fn save_and_restore_round_trip() {
        let mut stack = OptionsStack::new();
        let mut options = Options::default();
        stack.save(&options);
        options.list = false;
        let restored = stack.restore().expect("saved options");
        assert!(restored.list);
        assert!(stack.restore().is_none());
    }
}
