// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Scoped symbol table.
//!
//! The table is a stack of scopes. Lookup walks from the innermost scope
//! outwards. Ordinary definitions land in the global scope unless the name
//! already shadows it locally; function parameters bind with
//! [`Symbols::define_local`] so they vanish with their scope.

use std::collections::HashMap;

use crate::arg::{Arg, ArgValue};

#[derive(Debug, Default)]
pub struct Symbols {
    scopes: Vec<HashMap<String, Arg>>,
}

impl Symbols {
    /// An empty table with one global scope, preloaded with the register
    /// names `R0`..`R255`, the port names `P0`..`P255` and the `DATE` and
    /// `TIME` text symbols.
    pub fn new() -> Self {
        let mut globals = HashMap::new();
        for n in 0..=0xFFu8 {
            let reg = format!("R{n}");
            globals.insert(reg.clone(), Arg::new(ArgValue::Register(n), reg));
            let port = format!("P{n}");
            globals.insert(port.clone(), Arg::new(ArgValue::Port(n), port));
        }
        globals.insert(
            "DATE".to_string(),
            Arg::new(ArgValue::Text("DD-MM-YYYY".to_string()), "DATE"),
        );
        globals.insert(
            "TIME".to_string(),
            Arg::new(ArgValue::Text("HH:MM:SS".to_string()), "TIME"),
        );
        Self {
            scopes: vec![globals],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Innermost definition of `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&Arg> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Define `name` in the global scope, unless the innermost scope already
    /// holds it, in which case the local definition is updated instead.
    /// Returns false when the scope stack is empty; the caller reports it.
    #[must_use]
    pub fn define(&mut self, name: &str, arg: Arg) -> bool {
        let local = self
            .scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name));
        let scope = if local {
            self.scopes.last_mut()
        } else {
            self.scopes.first_mut()
        };
        match scope {
            Some(scope) => {
                scope.insert(name.to_string(), arg);
                true
            }
            None => false,
        }
    }

    /// Define `name` in the innermost scope only. Returns false when the
    /// scope stack is empty.
    #[must_use]
    pub fn define_local(&mut self, name: &str, arg: Arg) -> bool {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string(), arg);
                true
            }
            None => false,
        }
    }
}
