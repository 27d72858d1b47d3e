//! wisp - command-line driver over `wisp-interp`.
//!
//! `wisp run <file>` executes a script once; `wisp repl` reads lines from
//! stdin and feeds them to the same persistent global scope, the way the
//! language's own `run` built-in re-enters the pipeline against the process-
//! wide global table.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use wisp_interp::{new_global_context, run};

#[derive(Parser, Debug)]
#[command(name = "wisp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run wisp scripts or start an interactive session")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a script file once.
    Run { file: PathBuf },
    /// Start an interactive read-eval-print loop.
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { file } => run_file(&file),
        Commands::Repl => run_repl(),
    }
}

fn run_file(path: &PathBuf) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path.to_string_lossy().into_owned();
    let globals = new_global_context();

    match run(&file_name, &source, &globals) {
        Ok(_) => Ok(()),
        Err(err) => {
            eprintln!("{}", err.as_string());
            std::process::exit(1);
        }
    }
}

fn run_repl() -> Result<()> {
    let globals = new_global_context();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("wisp > ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        match run("<stdin>", &line, &globals) {
            Ok(value) => println!("{}", value.to_repr_string()),
            Err(err) => eprintln!("{}", err.as_string()),
        }
    }
}
