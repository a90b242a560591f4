// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for ASM7000.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use serde_json::json;

use asm7000::assembler::{Assembler, VERSION};
use asm7000::listing::ListingWriter;
use asm7000::log::{Diagnostic, Severity};
use asm7000::options::Options;
use asm7000::source::SourceLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DiagFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "asm7000",
    version = VERSION,
    about = "Two-pass cross-assembler for the TMS7000 8-bit microcontroller family"
)]
struct Cli {
    #[arg(
        short = 'i',
        long = "infile",
        value_name = "FILE",
        long_help = "Input source file. A missing extension defaults to .asm."
    )]
    infile: PathBuf,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "",
        long_help = "Write the object image. FILE is optional; when omitted, the input base is used and a .cim extension is added."
    )]
    outfile: Option<PathBuf>,
    #[arg(
        short = 'l',
        long = "list",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "",
        long_help = "Emit a listing file. FILE is optional; when omitted, the input base is used and a .lst extension is added."
    )]
    list: Option<PathBuf>,
    #[arg(
        long = "diag-format",
        value_enum,
        default_value_t = DiagFormat::Text,
        long_help = "Diagnostics output format on stderr. text is default; json emits one object per line."
    )]
    diag_format: DiagFormat,
    #[arg(
        long = "no-compat-warning",
        action = ArgAction::SetTrue,
        long_help = "Suppress compatibility warnings for non-standard spellings (DB, DW, DS)."
    )]
    no_compat_warning: bool,
    #[arg(
        short = 'w',
        long = "no-warning",
        action = ArgAction::SetTrue,
        long_help = "Suppress warning diagnostics."
    )]
    no_warning: bool,
    #[arg(
        long = "no-header",
        action = ArgAction::SetTrue,
        long_help = "Omit the header block from the listing."
    )]
    no_header: bool,
    #[arg(
        long = "no-line-numbers",
        action = ArgAction::SetTrue,
        long_help = "Omit line numbers from the listing."
    )]
    no_line_numbers: bool,
    #[arg(
        short = 'd',
        long = "debug",
        action = ArgAction::SetTrue,
        long_help = "Emit debug diagnostics from the expression evaluator and directive handlers."
    )]
    debug: bool,
}

struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, name: &str) -> io::Result<Vec<String>> {
        let text = fs::read_to_string(name)?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

fn with_extension(path: &Path, ext: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(ext)
    }
}

/// Resolve an optional output name: absent stays absent, an empty value
/// (flag given without a filename) derives from the input base.
fn derived_name(given: Option<&Path>, infile: &Path, ext: &str) -> Option<PathBuf> {
    match given {
        None => None,
        Some(path) if path.as_os_str().is_empty() => Some(infile.with_extension(ext)),
        Some(path) => Some(with_extension(path, ext)),
    }
}

fn severity_to_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
        Severity::Debug => "debug",
    }
}

fn emit_diagnostic(diag: &Diagnostic, format: DiagFormat) {
    match format {
        DiagFormat::Text => eprintln!("{}", diag.format()),
        DiagFormat::Json => eprintln!(
            "{}",
            json!({
                "severity": severity_to_str(diag.severity()),
                "message": diag.message(),
                "file": diag.file(),
                "line": diag.line(),
            })
        ),
    }
}

fn main() {
    let cli = Cli::parse();
    let infile = with_extension(&cli.infile, "asm");
    let outfile = derived_name(cli.outfile.as_deref(), &infile, "cim");
    let lstfile = derived_name(cli.list.as_deref(), &infile, "lst");

    let options = Options {
        compat_warnings: !cli.no_compat_warning,
        warnings: !cli.no_warning,
        debug: cli.debug,
        header: !cli.no_header,
        line_numbers: !cli.no_line_numbers,
        ..Options::default()
    };

    let mut listing_out: Box<dyn Write> = match &lstfile {
        Some(path) => match fs::File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(err) => {
                eprintln!("Failed to create listing file {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => Box::new(io::sink()),
    };
    let mut listing = ListingWriter::new(&mut listing_out);

    if lstfile.is_some() && options.header {
        let title = format!("ASM7000 - TMS7000 Assembler v{VERSION}");
        let out_name = outfile.as_ref().map(|p| p.display().to_string());
        let lst_name = lstfile.as_ref().map(|p| p.display().to_string());
        if let Err(err) = listing.header(
            &title,
            &infile.display().to_string(),
            out_name.as_deref(),
            lst_name.as_deref(),
        ) {
            eprintln!("Failed to write listing: {err}");
            std::process::exit(1);
        }
    }

    let mut asm = Assembler::new(FsLoader, options);
    let infile_name = infile.display().to_string();
    let report = match asm.assemble(&infile_name, Some(&mut listing)) {
        Ok(report) => report,
        Err(err) => {
            for diag in err.diagnostics() {
                emit_diagnostic(diag, cli.diag_format);
            }
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = listing.footer(report.error_count(), report.warning_count()) {
        eprintln!("Failed to write listing: {err}");
        std::process::exit(1);
    }
    drop(listing);
    if let Err(err) = listing_out.flush() {
        eprintln!("Failed to write listing: {err}");
        std::process::exit(1);
    }

    if let Some(path) = &outfile {
        if let Err(err) = fs::write(path, report.object()) {
            eprintln!("Failed to write object file {}: {err}", path.display());
            std::process::exit(1);
        }
    }

    for diag in report.diagnostics() {
        match diag.severity() {
            Severity::Error | Severity::Warning => emit_diagnostic(diag, cli.diag_format),
            Severity::Info | Severity::Debug => {
                if cli.debug {
                    emit_diagnostic(diag, cli.diag_format);
                }
            }
        }
    }

    if report.error_count() > 0 {
        std::process::exit(1);
    }
}
