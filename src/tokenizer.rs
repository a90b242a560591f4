// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Line tokenizer: splits one raw source line into label, mnemonic, operand
//! field and trailing comment.
//!
//! Splitting respects quoting and backslash escaping; an unquoted semicolon
//! starts a comment.  The first field is the label (a statement with a label
//! starts in column one), the second the mnemonic, everything after that is
//! the operand field.  Case folding to upper-case happens outside quoted
//! regions only.

/// One tokenized source line.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    pub label: String,
    pub op: String,
    /// Raw operand field, kept for diagnostics.
    pub argstr: String,
    /// Operand strings, upper-cased outside quotes and trimmed.
    pub args: Vec<String>,
    /// Operand strings as written, trimmed only. Filenames keep their case.
    pub raw_args: Vec<String>,
    pub comment: String,
}

impl Statement {
    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }
}

/// Split a raw line into a [`Statement`].
pub fn tokenize(line: &str) -> Statement {
    let (fields, comment) = scan_fields(line);

    let mut stmt = Statement {
        comment,
        ..Statement::default()
    };
    for (i, field) in fields.iter().enumerate() {
        match i {
            0 => {
                stmt.label = to_upper_unquoted(field);
                if stmt.label.ends_with(':') {
                    stmt.label.pop();
                }
            }
            1 => stmt.op = to_upper_unquoted(field),
            2 => stmt.argstr = field.clone(),
            _ => {
                stmt.argstr.push(' ');
                stmt.argstr.push_str(field);
            }
        }
    }
    stmt.raw_args = split_args(&stmt.argstr);
    stmt.args = stmt.raw_args.iter().map(|s| to_upper_unquoted(s)).collect();
    stmt
}

/// Split a line into fields on tab, space and colon, returning the trailing
/// comment separately.  Quoted regions and escaped characters never split.
fn scan_fields(line: &str) -> (Vec<String>, String) {
    let mut fields = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        let mut field = String::new();
        let mut quote: Option<char> = None;
        let mut escape = false;

        while i < len {
            let c = chars[i];
            if escape {
                field.push(c);
                escape = false;
                i += 1;
                continue;
            }
            if c == '\\' {
                field.push(c);
                escape = true;
                i += 1;
                continue;
            }
            if let Some(q) = quote {
                field.push(c);
                if c == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            if c == ';' {
                if !field.is_empty() || fields.is_empty() {
                    fields.push(field);
                }
                let comment: String = chars[i..].iter().collect();
                return (fields, comment);
            }
            if c == '"' || c == '\'' {
                field.push(c);
                quote = Some(c);
                i += 1;
                continue;
            }
            if c == ' ' || c == '\t' || c == ':' {
                break;
            }
            field.push(c);
            i += 1;
        }

        fields.push(field);
        while i < len && matches!(chars[i], ' ' | '\t' | ':') {
            i += 1;
        }
    }

    (fields, String::new())
}

/// Split the operand field on top-level commas, trimming each piece.  The
/// scan is quote- and escape-aware and does not break inside parenthesized
/// sub-expressions, so commas belonging to function calls stay in one
/// operand string.
pub fn split_args(argstr: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut cur = String::new();
    let mut quote: Option<char> = None;
    let mut escape = false;
    let mut depth = 0usize;

    for c in argstr.chars() {
        if escape {
            cur.push(c);
            escape = false;
            continue;
        }
        match c {
            '\\' => {
                cur.push(c);
                escape = true;
            }
            c if quote == Some(c) => {
                cur.push(c);
                quote = None;
            }
            _ if quote.is_some() => cur.push(c),
            '\'' | '"' => {
                cur.push(c);
                quote = Some(c);
            }
            '(' => {
                cur.push(c);
                depth += 1;
            }
            ')' => {
                cur.push(c);
                depth = depth.saturating_sub(1);
            }
            ',' if depth == 0 => {
                push_arg(&mut args, &cur);
                cur.clear();
            }
            _ => cur.push(c),
        }
    }
    push_arg(&mut args, &cur);
    args
}

fn push_arg(args: &mut Vec<String>, raw: &str) {
    let arg = raw.trim();
    if !arg.is_empty() {
        args.push(arg.to_string());
    }
}

/// Upper-case a string outside quoted regions; backslash escapes protect the
/// following character from being treated as a quote.
pub fn to_upper_unquoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut quote: Option<char> = None;
    let mut escape = false;
    for c in s.chars() {
        if escape {
            out.push(c);
            escape = false;
            continue;
        }
        if c == '\\' {
            out.push(c);
            escape = true;
            continue;
        }
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                    out.push(c);
                } else {
                    out.push(c.to_ascii_uppercase());
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{split_args, to_upper_unquoted, tokenize};

    #[test]
    fn label_mnemonic_and_operands() {
        let stmt = tokenize("loop:\tmov\tr5,a\t; decrement loop");
        assert_eq!(stmt.label, "LOOP");
        assert_eq!(stmt.op, "MOV");
        assert_eq!(stmt.args, vec!["R5", "A"]);
        assert_eq!(stmt.comment, "; decrement loop");
    }

    #[test]
    fn unlabeled_statement_has_empty_label() {
        let stmt = tokenize("  rets");
        assert_eq!(stmt.label, "");
        assert_eq!(stmt.op, "RETS");
        assert!(stmt.args.is_empty());
    }

    #[test]
    fn semicolon_inside_quotes_is_not_a_comment() {
        let stmt = tokenize("\ttext\t\"a;b\"");
        assert_eq!(stmt.op, "TEXT");
        assert_eq!(stmt.args, vec!["\"a;b\""]);
        assert_eq!(stmt.comment, "");
    }

    #[test]
    fn comma_inside_quotes_does_not_split_operands() {
        let args = split_args("\"a,b\",5");
        assert_eq!(args, vec!["\"a,b\"", "5"]);
    }

    #[test]
    fn comma_inside_parens_does_not_split_operands() {
        let args = split_args("SUM(ONE,TWO),R3");
        assert_eq!(args, vec!["SUM(ONE,TWO)", "R3"]);
    }

    #[test]
    fn operand_text_is_upper_cased_outside_quotes_only() {
        assert_eq!(to_upper_unquoted("lda 'ab'+x"), "LDA 'ab'+X");
        // the escape keeps the quote from opening a quoted region; the x
        // itself is unquoted and folds
        assert_eq!(to_upper_unquoted("\\'x"), "\\'X");
    }

    #[test]
    fn extra_operand_fields_are_joined_with_spaces() {
        let stmt = tokenize(" func x, y, x+y");
        assert_eq!(stmt.op, "FUNC");
        assert_eq!(stmt.args, vec!["X", "Y", "X+Y"]);
        assert_eq!(stmt.argstr, "x, y, x+y");
    }

    #[test]
    fn comment_only_line() {
        let stmt = tokenize("; just a note");
        assert!(stmt.label.is_empty());
        assert!(stmt.op.is_empty());
        assert_eq!(stmt.comment, "; just a note");
    }
}
