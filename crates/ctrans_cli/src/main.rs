//! ctrans: The C89-subset translator CLI.
//!
//! Usage:
//!   ctrans [-t|--translate] [-c|-S|--compile] [-o FILE] [-p CONFIG] [-v...] INPUT
//!
//! `-t` writes Python (the default), `-c` writes a MIPS frame skeleton.

use clap::{ArgAction, Parser as ClapParser};
use ctrans_compiler::{CompileError, Program};
use ctrans_core::text::LineMap;
use ctrans_diagnostics::{Diagnostic, DiagnosticCollection};
use ctrans_options::{CompilerOptions, OutputTarget};
use std::path::Path;
use std::process;
use std::time::Instant;

#[derive(ClapParser, Debug)]
#[command(name = "ctrans", about = "ctrans - translate a C89 subset to Python or MIPS", version)]
struct Cli {
    /// C source file to translate.
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Compile to MIPS assembly.
    #[arg(short = 'c', short_alias = 'S', long = "compile", conflicts_with = "translate")]
    compile: bool,

    /// Translate to Python.
    #[arg(short = 't', long = "translate")]
    translate: bool,

    /// Place the output into <FILE>.
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<String>,

    /// Path to ctrans.json.
    #[arg(short = 'p', long = "project")]
    project: Option<String>,

    /// Do not append the block that runs `main` to Python output.
    #[arg(long = "no-trailer")]
    no_trailer: bool,

    /// Raise log verbosity; repeat for more.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Exit codes.
const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_COMPILE_ERRORS: i32 = 2;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_USAGE } else { EXIT_OK };
            let _ = err.print();
            process::exit(code);
        }
    };
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let start = Instant::now();

    let (files, mut options) = match resolve_inputs(cli) {
        Ok(resolved) => resolved,
        Err(msg) => {
            print_error(&msg);
            return EXIT_USAGE;
        }
    };

    // Command line overrides ctrans.json
    options.merge(cli_overrides(cli));
    init_logger(options.verbosity());
    log::debug!("options: {:?}", options);

    let mut program = Program::new(files, options);
    if let Err(e) = program.load_root_files() {
        print_error(&e.to_string());
        return EXIT_USAGE;
    }

    let use_color = stderr_is_terminal();
    match program.emit() {
        Ok(compiled) => {
            for file in &compiled {
                print_diagnostics(&file.diagnostics, &program, use_color);
            }
            log::info!("finished in {:.2}s", start.elapsed().as_secs_f64());
            EXIT_OK
        }
        Err(CompileError::Diagnostics(diagnostics)) => {
            print_diagnostics(&diagnostics, &program, use_color);
            let count = diagnostics.error_count();
            let summary = format!("Found {} error{}.", count, if count == 1 { "" } else { "s" });
            if use_color {
                eprintln!("\n{}{}{}", RED, summary, RESET);
            } else {
                eprintln!("\n{}", summary);
            }
            EXIT_COMPILE_ERRORS
        }
        Err(e) => {
            print_error(&e.to_string());
            EXIT_USAGE
        }
    }
}

/// Input files and base options, from the command line or ctrans.json.
fn resolve_inputs(cli: &Cli) -> Result<(Vec<String>, CompilerOptions), String> {
    let mut files = Vec::new();
    let mut options = CompilerOptions::default();

    if let Some(ref project) = cli.project {
        let config = ctrans_options::parse_config_file(project).map_err(|e| e.to_string())?;
        options = config.compiler_options.unwrap_or_default();
        let base = Path::new(project).parent().unwrap_or_else(|| Path::new("."));
        for file in config.files.unwrap_or_default() {
            files.push(base.join(file).display().to_string());
        }
    }
    if let Some(ref input) = cli.input {
        files = vec![input.clone()];
    }

    if files.is_empty() {
        return Err("No input file.".to_string());
    }
    Ok((files, options))
}

fn cli_overrides(cli: &Cli) -> CompilerOptions {
    let target = if cli.compile {
        Some(OutputTarget::Mips)
    } else if cli.translate {
        Some(OutputTarget::Python)
    } else {
        None
    };
    CompilerOptions {
        target,
        out_file: cli.output.clone(),
        emit_trailer: cli.no_trailer.then_some(false),
        verbosity: (cli.verbose > 0).then_some(cli.verbose),
        ..Default::default()
    }
}

/// warn, then info, debug and trace per verbosity step. `RUST_LOG` wins.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_diagnostics(diagnostics: &DiagnosticCollection, program: &Program, use_color: bool) {
    for diag in diagnostics.diagnostics() {
        print_diagnostic(diag, program, use_color);
    }
}

fn print_diagnostic(diag: &Diagnostic, program: &Program, use_color: bool) {
    let line_map = diag
        .file
        .as_deref()
        .and_then(|file| program.source_text(file))
        .map(LineMap::new);

    if !use_color {
        match line_map {
            Some(ref map) => eprintln!("{}", diag.render(map)),
            None => eprintln!("{}", diag),
        }
        return;
    }

    if let Some(ref file) = diag.file {
        eprint!("{}{}", CYAN, file);
        if let (Some(span), Some(map)) = (diag.span, &line_map) {
            let lc = map.line_and_column_of(span.start);
            eprint!(":{}:{}", lc.line + 1, lc.column + 1);
        }
        eprint!("{}: ", RESET);
    }
    let color = if diag.is_error() { RED } else { YELLOW };
    eprintln!(
        "{}{}{}{} {}C{:04}{}: {}",
        BOLD, color, diag.category, RESET, CYAN, diag.code, RESET, diag.message_text
    );
}

fn print_error(msg: &str) {
    if stderr_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn stderr_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ctrans").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_compile_flags() {
        for flag in ["-c", "-S", "--compile"] {
            let cli = parse(&[flag, "in.c"]);
            assert!(cli.compile, "{}", flag);
            assert_eq!(cli_overrides(&cli).target, Some(OutputTarget::Mips));
        }
    }

    #[test]
    fn test_translate_and_output() {
        let cli = parse(&["-t", "in.c", "-o", "out.py"]);
        let overrides = cli_overrides(&cli);
        assert_eq!(overrides.target, Some(OutputTarget::Python));
        assert_eq!(overrides.out_file.as_deref(), Some("out.py"));
        assert_eq!(overrides.emit_trailer, None);
    }

    #[test]
    fn test_compile_conflicts_with_translate() {
        assert!(Cli::try_parse_from(["ctrans", "-c", "-t", "in.c"]).is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = parse(&["-vvv", "in.c"]);
        assert_eq!(cli_overrides(&cli).verbosity, Some(3));
        let quiet = parse(&["in.c"]);
        assert_eq!(cli_overrides(&quiet).verbosity, None);
    }

    #[test]
    fn test_no_input_is_an_error() {
        let cli = parse(&[]);
        assert!(resolve_inputs(&cli).is_err());
    }

    #[test]
    fn test_input_overrides_project_files() {
        let cli = parse(&["main.c"]);
        let (files, options) = resolve_inputs(&cli).unwrap();
        assert_eq!(files, vec!["main.c".to_string()]);
        assert_eq!(options, CompilerOptions::default());
    }
}
