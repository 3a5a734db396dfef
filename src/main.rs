//! Interactive SQL shell.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use heapdb::executor::SqlExec;
use heapdb::sql;
use heapdb::storage::{Environment, FileEnvironment, MemoryEnvironment};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// heapdb: slotted-page heap tables with a self-hosting catalog.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one file per table. Created if absent.
    #[arg(required_unless_present = "memory")]
    data_dir: Option<PathBuf>,

    /// Keep every table in memory instead of on disk.
    #[arg(long)]
    memory: bool,

    /// Execute a script of `;`-separated statements and exit.
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().compact();
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    match (args.memory, &args.data_dir) {
        (false, Some(dir)) => {
            info!("using file environment at {}", dir.display());
            run(Arc::new(FileEnvironment::open(dir)?), args.file.as_deref())
        }
        _ => {
            info!("using memory environment");
            run(Arc::new(MemoryEnvironment::new()), args.file.as_deref())
        }
    }
}

fn run<E: Environment>(env: Arc<E>, file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let mut exec = SqlExec::new(Arc::clone(&env));
    let outcome = match file {
        Some(path) => run_file(&mut exec, path),
        None => interactive(&mut exec),
    };
    exec.close()?;
    env.close();
    outcome
}

/// Reads statements from the prompt until `quit` or end of input.
fn interactive<E: Environment>(exec: &mut SqlExec<E>) -> Result<(), Box<dyn Error>> {
    let mut rl = Editor::<()>::new();
    loop {
        match rl.readline("SQL> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" {
                    break;
                }
                rl.add_history_entry(line);
                execute_sql(exec, line);
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_file<E: Environment>(exec: &mut SqlExec<E>, path: &Path) -> Result<(), Box<dyn Error>> {
    let script = std::fs::read_to_string(path)?;
    execute_sql(exec, &script);
    Ok(())
}

/// Echoes and runs each statement of `text`, printing results and errors.
fn execute_sql<E: Environment>(exec: &mut SqlExec<E>, text: &str) {
    let statements = match sql::Parser::new(text).parse_all() {
        Ok(statements) => statements,
        Err(err) => {
            println!("invalid SQL: {}", err);
            return;
        }
    };
    for statement in statements {
        println!("{}", statement);
        match exec.execute(&statement) {
            Ok(result) => println!("{}", result),
            Err(err) => println!("Error: {}", err),
        }
    }
}
