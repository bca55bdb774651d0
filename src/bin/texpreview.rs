//! texpreview CLI - LaTeX structural checks and HTML preview

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use texpreview::{
    convert_with_options, has_errors, restore_math, stats_source, utils::check_config,
    utils::format_issues, validate_with_options, Config, PreviewError, PreviewResult,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "texpreview")]
#[command(version)]
#[command(about = "texpreview - LaTeX structural validator and HTML previewer", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file with [validate] and [convert] sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Check LaTeX for structural issues
    Check {
        /// Input file to check (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Print issues as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Convert LaTeX to an HTML fragment
    Convert {
        /// Input file path (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print `{ html, mathMap }` as JSON
        #[arg(long)]
        json: bool,

        /// Put raw math back in place of its tokens
        #[arg(long)]
        restore_math: bool,

        /// Wrap the fragment in a complete HTML page (implies --restore-math)
        #[arg(long)]
        standalone: bool,
    },

    /// Print word count and document statistics as JSON
    Stats {
        /// Input file path (reads from stdin if not provided)
        input: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }
}

/// Run a subcommand and return the process exit code.
#[cfg(feature = "cli")]
fn run(cli: Cli) -> PreviewResult<i32> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    check_config(&config)?;

    match cli.command {
        Commands::Check {
            input,
            json,
            no_color,
        } => {
            let content = read_input(input)?;
            let issues = validate_with_options(&content, &config.validate);

            if json {
                println!("{}", serde_json::to_string_pretty(&issues)?);
            } else {
                println!("{}", format_issues(&issues, !no_color));
            }

            // Exit with error code if there are errors
            if has_errors(&issues) {
                return Ok(1);
            }
        }

        Commands::Convert {
            input,
            output,
            json,
            restore_math: restore,
            standalone,
        } => {
            let content = read_input(input)?;
            let result = convert_with_options(&content, &config.convert);

            let rendered = if json {
                serde_json::to_string_pretty(&result)?
            } else if standalone {
                standalone_page(&restore_math(&result.html, &result.math_map))
            } else if restore {
                restore_math(&result.html, &result.math_map)
            } else {
                result.html
            };

            match output {
                Some(path) => {
                    fs::write(&path, rendered)?;
                    eprintln!("✓ {}", path.display());
                }
                None => {
                    let mut stdout = io::stdout().lock();
                    writeln!(stdout, "{}", rendered)?;
                }
            }
        }

        Commands::Stats { input } => {
            let content = read_input(input)?;
            let stats = stats_source(&content);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(0)
}

#[cfg(feature = "cli")]
fn read_input(path: Option<PathBuf>) -> PreviewResult<String> {
    match path {
        Some(path) => fs::read_to_string(&path).map_err(|e| PreviewError::IoError {
            message: format!("{}: {}", path.display(), e),
        }),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn standalone_page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Preview</title>\n</head>\n<body>\n{}\n</body>\n</html>",
        body
    )
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install texpreview --features cli");
    eprintln!("  texpreview check [INPUT_FILE]");
}
