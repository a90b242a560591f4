// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Assembly listing writer.
//!
//! Each statement prints as a 5-digit line number, the 4-digit hex address,
//! up to four object bytes and the source text; remaining bytes follow on
//! continuation lines unless the statement suppressed them (`DUP` fill
//! blocks). Diagnostics print right below the statement they belong to.

use std::io::{self, Write};

use crate::log::Severity;
use crate::options::Options;

pub struct ListingLine<'a> {
    pub line_num: usize,
    pub addr: u16,
    pub bytes: &'a [u8],
    /// Whether the address column is shown (off for blank statements).
    pub show_addr: bool,
    /// Whether bytes beyond the first four get continuation lines.
    pub list_block: bool,
    pub source: &'a str,
}

pub struct ListingWriter<W: Write> {
    out: W,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn header(
        &mut self,
        title: &str,
        infile: &str,
        outfile: Option<&str>,
        lstfile: Option<&str>,
    ) -> io::Result<()> {
        writeln!(self.out, "{title}")?;
        writeln!(self.out)?;
        writeln!(self.out, "\tAssembly of  : {infile}")?;
        if let Some(outfile) = outfile {
            writeln!(self.out, "\tOutput file  : {outfile}")?;
        }
        if let Some(lstfile) = lstfile {
            writeln!(self.out, "\tListing file : {lstfile}")?;
        }
        writeln!(self.out)
    }

    pub fn write_line(&mut self, line: &ListingLine<'_>, options: &Options) -> io::Result<()> {
        let mut text = String::new();

        if options.line_numbers {
            text.push_str(&format!("{:5}:  ", line.line_num));
        }
        if line.show_addr {
            text.push_str(&format!("{:04X}  ", line.addr));
        } else {
            text.push_str("      ");
        }

        let first = line.bytes.len().min(4);
        for byte in &line.bytes[..first] {
            text.push_str(&format!("{byte:02X}"));
        }
        for _ in first..5 {
            text.push_str("  ");
        }
        text.push_str(line.source);
        writeln!(self.out, "{text}")?;

        if line.list_block {
            let mut i = first;
            while i < line.bytes.len() {
                let mut cont = String::new();
                if options.line_numbers {
                    cont.push_str("        ");
                }
                cont.push_str("      ");
                for byte in line.bytes.iter().skip(i).take(4) {
                    cont.push_str(&format!("{byte:02X}"));
                }
                i += 4;
                writeln!(self.out, "{cont}")?;
            }
        }
        Ok(())
    }

    /// One logged message, printed below the statement it belongs to.
    pub fn write_message(&mut self, severity: Severity, text: &str) -> io::Result<()> {
        match severity {
            Severity::Error => writeln!(self.out, "*** Error: {text}"),
            Severity::Warning => writeln!(self.out, "*** Warning: {text}"),
            Severity::Info => writeln!(self.out, "*** {text}"),
            Severity::Debug => writeln!(self.out, "*** Debug: {text}"),
        }
    }

    pub fn footer(&mut self, errors: usize, warnings: usize) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{errors:5} TOTAL ERROR(S)")?;
        writeln!(self.out, "{warnings:5} TOTAL WARNING(S)")
    }
}

#[cfg(test)]
mod tests {
    use super::{ListingLine, ListingWriter};
    use crate::log::Severity;
    use crate::options::Options;

    fn render(line: &ListingLine<'_>, options: &Options) -> String {
        let mut buf = Vec::new();
        let mut writer = ListingWriter::new(&mut buf);
        writer.write_line(line, options).expect("write");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn line_with_address_and_bytes() {
        let line = ListingLine {
            line_num: 3,
            addr: 0x0100,
            bytes: &[0x8A, 0x12, 0x34],
            show_addr: true,
            list_block: true,
            source: "\tLDA\t@>1234",
        };
        let text = render(&line, &Options::default());
        assert_eq!(text, "    3:  0100  8A1234    \tLDA\t@>1234\n");
    }

    #[test]
    fn long_statement_gets_continuation_lines() {
        let line = ListingLine {
            line_num: 1,
            addr: 0x0000,
            bytes: &[1, 2, 3, 4, 5, 6],
            show_addr: true,
            list_block: true,
            source: "\tBYTE\t1,2,3,4,5,6",
        };
        let text = render(&line, &Options::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("01020304"));
        assert!(lines[1].ends_with("0506"));
    }

    #[test]
    fn fill_block_suppresses_continuation_lines() {
        let line = ListingLine {
            line_num: 1,
            addr: 0x0000,
            bytes: &[0x5A; 16],
            show_addr: true,
            list_block: false,
            source: "\tDB\t16 DUP 'Z'",
        };
        let text = render(&line, &Options::default());
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn line_numbers_can_be_turned_off() {
        let line = ListingLine {
            line_num: 9,
            addr: 0x0000,
            bytes: &[],
            show_addr: false,
            list_block: true,
            source: "; comment",
        };
        let options = Options {
            line_numbers: false,
            ..Options::default()
        };
        let text = render(&line, &options);
        assert_eq!(text, "                ; comment\n");
    }

    #[test]
    fn messages_carry_their_severity_prefix() {
        let mut buf = Vec::new();
        let mut writer = ListingWriter::new(&mut buf);
        writer
            .write_message(Severity::Error, "Missing byte value(s)")
            .expect("write");
        writer.write_message(Severity::Info, "File: sub.asm ***").expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "*** Error: Missing byte value(s)\n*** File: sub.asm ***\n");
    }

    #[test]
    fn footer_totals() {
        let mut buf = Vec::new();
        let mut writer = ListingWriter::new(&mut buf);
        writer.footer(2, 1).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("    2 TOTAL ERROR(S)"));
        assert!(text.contains("    1 TOTAL WARNING(S)"));
    }
}
