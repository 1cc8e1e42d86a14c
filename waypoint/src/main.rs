//! Waypoint CLI.
//!
//! Compiles content directories into sequence documents and serves their
//! pieces one at a time. Journey progress lives only in the log passed with
//! `--log`, so every invocation resumes where the last one stopped.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use waypoint::core::invariants::validate_document;
use waypoint::errors::WaypointError;
use waypoint::exit_codes;
use waypoint::io::compiler::{CompilerConfig, compile_directory};
use waypoint::io::config::{CONFIG_FILE, WaypointConfig, load_config, write_config};
use waypoint::io::document_store::{load_document, save_document};
use waypoint::io::log_sink::{LogSink, open_log_sink};
use waypoint::io::render::{render_outline, render_to_directory};
use waypoint::journey::{self, Journey, NextOutcome};
use waypoint::logging;

#[derive(Parser)]
#[command(
    name = "waypoint",
    version,
    about = "Compile numbered content into sequence documents and traverse them"
)]
struct Cli {
    /// Config file (defaults to `waypoint.toml` in the working directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `waypoint.toml` if missing.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
    /// Compile a content directory into a sequence document.
    Compile {
        source: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Document domain (defaults to the source directory name).
        #[arg(long)]
        domain: Option<String>,
        /// Document version (defaults to `compiler.version` from config).
        #[arg(long = "version")]
        doc_version: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replace an existing output without keeping a backup copy.
        #[arg(long)]
        no_backup: bool,
    },
    /// Check a document for duplicate identifiers and dangling dependencies.
    Validate { document: PathBuf },
    /// Print a Markdown outline of a document.
    Outline { document: PathBuf },
    /// Write a document back out as a directory tree under BASE.
    Render { document: PathBuf, base: PathBuf },
    /// Begin a journey through a document.
    Start {
        document: PathBuf,
        #[arg(long)]
        log: PathBuf,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Print the next piece (exit 2 once every piece has been served).
    Next {
        #[arg(long)]
        log: PathBuf,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Show journey progress.
    Progress {
        #[arg(long)]
        log: PathBuf,
    },
    /// Start the active journey over from its first piece.
    Reset {
        #[arg(long)]
        log: PathBuf,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config_arg = cli.config.as_deref();
    match cli.command {
        Command::Init { force } => {
            let path = config_arg.unwrap_or(Path::new(CONFIG_FILE));
            cmd_init(path, force)
        }
        Command::Compile {
            source,
            output,
            domain,
            doc_version,
            description,
            no_backup,
        } => {
            let config = load_cli_config(config_arg)?;
            let mut compiler = CompilerConfig::from(&config.compiler);
            compiler.domain = domain;
            if let Some(version) = doc_version {
                compiler.version = version;
            }
            compiler.description = description.unwrap_or_default();
            cmd_compile(&source, &output, &compiler, !no_backup)
        }
        Command::Validate { document } => cmd_validate(&document),
        Command::Outline { document } => {
            print!("{}", render_outline(&load_document(&document)?)?);
            Ok(exit_codes::OK)
        }
        Command::Render { document, base } => {
            let target = render_to_directory(&load_document(&document)?, &base)?;
            println!("{}", target.display());
            Ok(exit_codes::OK)
        }
        Command::Start {
            document,
            log,
            notes,
        } => {
            let sink = open_sink(config_arg, &log)?;
            println!("{}", journey::start(&document, sink.as_ref(), &notes)?);
            Ok(exit_codes::OK)
        }
        Command::Next { log, notes } => {
            let sink = open_sink(config_arg, &log)?;
            cmd_next(sink.as_ref(), &notes)
        }
        Command::Progress { log } => {
            let sink = open_sink(config_arg, &log)?;
            println!("{}", journey::progress(sink.as_ref())?);
            Ok(exit_codes::OK)
        }
        Command::Reset { log, notes } => {
            let sink = open_sink(config_arg, &log)?;
            println!("{}", journey::reset(sink.as_ref(), &notes)?);
            Ok(exit_codes::OK)
        }
    }
}

/// Explicit `--config` paths must exist; the default path may be absent.
fn load_cli_config(explicit: Option<&Path>) -> Result<WaypointConfig> {
    match explicit {
        Some(path) if !path.exists() => {
            Err(WaypointError::not_found("config file", path).into())
        }
        Some(path) => load_config(path),
        None => load_config(Path::new(CONFIG_FILE)),
    }
}

fn open_sink(explicit: Option<&Path>, log: &Path) -> Result<Box<dyn LogSink>> {
    let config = load_cli_config(explicit)?;
    Ok(open_log_sink(config.log.backend, log))
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !force && config_path.exists() {
        println!("{} already exists", config_path.display());
        return Ok(exit_codes::OK);
    }
    write_config(config_path, &WaypointConfig::default())?;
    println!("wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_compile(source: &Path, output: &Path, config: &CompilerConfig, backup: bool) -> Result<i32> {
    let doc = compile_directory(source, config)?;
    let saved = save_document(&doc, output, backup)?;
    println!(
        "compiled {} pieces into {} (entry point {})",
        doc.piece_count(),
        saved.display(),
        doc.entry_point
    );
    Ok(exit_codes::OK)
}

fn cmd_validate(path: &Path) -> Result<i32> {
    let doc = load_document(path)?;
    let issues = validate_document(&doc);
    if issues.is_empty() {
        println!("valid: {} ({} pieces)", doc.label(), doc.piece_count());
        return Ok(exit_codes::OK);
    }
    for issue in &issues {
        println!("- {}", issue);
    }
    Ok(exit_codes::ISSUES)
}

fn cmd_next(sink: &dyn LogSink, notes: &str) -> Result<i32> {
    match Journey::resume(sink)?.advance(sink, notes)? {
        NextOutcome::Served { content, .. } => {
            print!("{}", content);
            Ok(exit_codes::OK)
        }
        NextOutcome::Complete => Ok(exit_codes::COMPLETE),
    }
}
