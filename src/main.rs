//! CLI tool to inspect, validate, and format MiniC source files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, debug};
use serde_json::json;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// MiniC tokenizer, parser, and formatter.
#[derive(Parser)]
#[command(name = "minic", version, about = "MiniC tokenizer, parser, and formatter")]
struct Cli {
    /// Log parser activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream of a file
    Tokens {
        file: PathBuf,
        #[arg(long, default_value = "text", value_enum)]
        format: OutputFormat,
    },

    /// Check that files parse, reporting the first syntax error of each
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "text", value_enum)]
        format: OutputFormat,
    },

    /// Print the syntax tree of a file
    Ast { file: PathBuf },

    /// Print a file in canonical formatting (comments are dropped)
    Fmt {
        file: PathBuf,
        /// Only report whether the file is already formatted
        #[arg(long)]
        check: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        source: minic_syntax::SyntaxError,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

const fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Warn
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG still overrides the level picked here
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .init();

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Run one command. `Ok(false)` means the command ran but found problems.
fn run(command: Command) -> Result<bool, CliError> {
    match command {
        Command::Tokens { file, format } => {
            let tokens = minic_syntax::tokenize(&read_source(&file)?);
            match format {
                OutputFormat::Text => {
                    for token in &tokens {
                        println!(
                            "{}:{}\t{:?}\t{:?}",
                            token.span.line, token.span.column, token.kind, token.text
                        );
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&tokens)?);
                }
            }
            Ok(true)
        }
        Command::Check { files, format } => check(&files, format),
        Command::Ast { file } => {
            let program = parse_source(&file, &read_source(&file)?)?;
            println!("{program:#?}");
            Ok(true)
        }
        Command::Fmt { file, check } => {
            let content = read_source(&file)?;
            let program = parse_source(&file, &content)?;
            let formatted = minic_syntax::format(&program);

            if !check {
                print!("{formatted}");
                return Ok(true);
            }

            if formatted == content {
                eprintln!("{}: formatted", file.display());
                Ok(true)
            } else {
                eprintln!("{}: not formatted", file.display());
                Ok(false)
            }
        }
    }
}

fn check(files: &[PathBuf], format: OutputFormat) -> Result<bool, CliError> {
    let mut all_valid = true;
    let mut reports = Vec::new();

    for path in files {
        let content = match read_source(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{e}");
                all_valid = false;
                continue;
            }
        };

        let analysis = minic_syntax::analyze(&content);
        all_valid &= analysis.is_ok();

        match format {
            OutputFormat::Text => match (&analysis.program, &analysis.error) {
                (_, Some(err)) => eprintln!("{}: {err}", path.display()),
                (Some(program), None) => eprintln!(
                    "{}: valid ({} statement(s))",
                    path.display(),
                    program.statements.len()
                ),
                (None, None) => {}
            },
            OutputFormat::Json => reports.push(json!({
                "file": path.display().to_string(),
                "valid": analysis.is_ok(),
                "statements": analysis.program.as_ref().map(|p| p.statements.len()),
                "error": analysis.error.as_ref().map(|err| json!({
                    "message": err.message(),
                    "span": err.span(),
                })),
            })),
        }
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(all_valid)
}

fn read_source(path: &Path) -> Result<String, CliError> {
    debug!("reading {}", path.display());
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_source(path: &Path, content: &str) -> Result<minic_syntax::Program, CliError> {
    minic_syntax::parse_str(content).map_err(|source| CliError::Syntax {
        path: path.to_path_buf(),
        source,
    })
}
