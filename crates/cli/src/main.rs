mod config;
mod fragments;
mod logging;
mod repl;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use jlcheck_core::{group, tokenize, validate, Verdict};

use crate::fragments::{Fragment, FragmentReader};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Syntax validator for a small Julia-flavoured scripting subset.
#[derive(Parser)]
#[command(
    name = "jlcheck",
    version,
    about = "Syntax validator for a small Julia-flavoured scripting subset"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output (verdicts of valid fragments)
    #[arg(long, global = true)]
    quiet: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Defaults to `repl`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read fragments interactively and print a verdict for each
    Repl,

    /// Validate every fragment of a file
    Check {
        /// Path to the source file
        file: PathBuf,
    },

    /// Print the token stream of a file
    Tokens {
        /// Path to the source file
        file: PathBuf,
    },

    /// Show how the precedence table groups an expression
    Group {
        /// A single expression, e.g. "1 + 2 * 3"
        expression: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match config::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            repl::run_repl(&config.repl, cli.output, cli.quiet);
        }
        Commands::Check { file } => {
            cmd_check(&file, cli.output, cli.quiet);
        }
        Commands::Tokens { file } => {
            cmd_tokens(&file, cli.output, cli.quiet);
        }
        Commands::Group { expression } => {
            cmd_group(&expression, cli.output, cli.quiet);
        }
    }
}

fn read_source(path: &Path, output: OutputFormat, quiet: bool) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    let source = read_source(file, output, quiet);
    let mut all_valid = true;
    let mut count = 0usize;

    for fragment in FragmentReader::quiet(Cursor::new(source.as_bytes())) {
        let fragment = match fragment {
            Ok(f) => f,
            Err(e) => {
                report_error(&format!("error reading input: {}", e), output, quiet);
                process::exit(1);
            }
        };
        count += 1;
        let verdict = validate(&fragment.text);
        all_valid &= verdict.valid;
        if !(quiet && verdict.valid) {
            print_verdict(&fragment, &verdict, output, Some(file));
        }
    }

    tracing::debug!(fragments = count, all_valid, "check finished");
    if !all_valid {
        process::exit(1);
    }
}

fn cmd_tokens(file: &Path, output: OutputFormat, quiet: bool) {
    let source = read_source(file, output, quiet);
    let tokenized = tokenize(&source);

    match output {
        OutputFormat::Json => {
            let tokens: Vec<serde_json::Value> = tokenized
                .tokens
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "line": t.line,
                        "kind": t.token.kind_name(),
                        "lexeme": t.lexeme,
                    })
                })
                .collect();
            let diagnostics: Vec<serde_json::Value> = tokenized
                .defects
                .iter()
                .map(|d| d.to_json_value())
                .collect();
            let doc = serde_json::json!({ "tokens": tokens, "diagnostics": diagnostics });
            let pretty = serde_json::to_string_pretty(&doc)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for t in &tokenized.tokens {
                println!("{}\t{}\t{}", t.line, t.token.kind_name(), t.lexeme);
            }
            for d in &tokenized.defects {
                println!("{}", d);
            }
        }
    }
}

fn cmd_group(expression: &str, output: OutputFormat, quiet: bool) {
    let report = group(expression);

    match output {
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "grouping": report.grouping,
                "diagnostics": report
                    .diagnostics
                    .iter()
                    .map(|d| d.to_json_value())
                    .collect::<Vec<_>>(),
            });
            println!("{}", doc);
        }
        OutputFormat::Text => {
            if !quiet || report.grouping.is_none() {
                for d in &report.diagnostics {
                    println!("{}", d);
                }
            }
            if let Some(grouping) = &report.grouping {
                println!("{}", grouping);
            }
        }
    }

    if report.grouping.is_none() {
        process::exit(1);
    }
}

/// Print one fragment's verdict. File mode prefixes text lines with
/// `path:line:`; JSON mode emits one object per fragment.
pub(crate) fn print_verdict(
    fragment: &Fragment,
    verdict: &Verdict,
    output: OutputFormat,
    source: Option<&Path>,
) {
    match output {
        OutputFormat::Text => {
            for line in verdict.report() {
                match source {
                    Some(path) => println!("{}:{}: {}", path.display(), fragment.line, line),
                    None => println!("{}", line),
                }
            }
        }
        OutputFormat::Json => {
            let mut value = verdict.to_json_value();
            if let serde_json::Value::Object(map) = &mut value {
                map.insert("line".to_owned(), fragment.line.into());
                if let Some(path) = source {
                    map.insert("file".to_owned(), path.display().to_string().into());
                }
            }
            println!("{}", value);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
