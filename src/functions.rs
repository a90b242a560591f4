// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Registry for `FUNCTION` definitions.
//!
//! A function is a named expression template with positional parameters.
//! The last operand of the defining statement is the body, everything before
//! it is a parameter name. Calls are expanded by the expression evaluator.

use std::collections::HashMap;

use crate::log::Log;

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct Functions {
    map: HashMap<String, Function>,
}

impl Functions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function from the operands of a `FUNCTION` statement.
    /// The label provides the name; `args` holds the parameter names followed
    /// by the body expression.
    pub fn define(&mut self, name: &str, args: &[String], log: &mut Log) {
        if name.is_empty() {
            log.error("Missing function name");
            return;
        }
        let Some((body, params)) = args.split_last() else {
            log.error(format!("Missing function definition: {name}"));
            return;
        };
        if self.map.contains_key(name) {
            log.error(format!("Duplicate function definition: {name}"));
            return;
        }
        let function = Function {
            name: name.to_string(),
            params: params.to_vec(),
            body: body.clone(),
        };
        log.debug(format!("Function {} = {}", function.name, function.body));
        self.map.insert(name.to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.map.get(name)
    }
}
