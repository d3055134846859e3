//! `clap`-derived CLI: `init` creates a database directory and its catalog,
//! `start` drops into an interactive SQL REPL, `status` reports table names
//! and row counts without mutating anything.

use crate::engine::{Database, QueryResult};
use crate::storage::cell::Value;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logly::prelude::Logger;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rootdb")]
#[command(about = "A single-node, file-backed relational store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new database directory and its catalog file.
    Init { path: PathBuf },
    /// Open an existing database and read semicolon-terminated SQL from stdin.
    Start { path: PathBuf },
    /// Print table names and row counts without starting a REPL.
    Status { path: PathBuf },
}

pub fn run(cli: Cli, logger: &Logger) -> Result<()> {
    match cli.command {
        Commands::Init { path } => run_init(&path, logger),
        Commands::Start { path } => run_start(&path, logger),
        Commands::Status { path } => run_status(&path, logger),
    }
}

fn run_init(path: &std::path::Path, logger: &Logger) -> Result<()> {
    Database::create(path).with_context(|| format!("failed to initialize database at {}", path.display()))?;
    let _ = logger.info(format!("initialized database at {}", path.display()));
    println!("Initialized database at {}", path.display());
    Ok(())
}

fn run_start(path: &std::path::Path, logger: &Logger) -> Result<()> {
    let db = Database::open(path).with_context(|| format!("failed to open database at {}", path.display()))?;
    let _ = logger.info(format!("opened database at {}", path.display()));

    println!("rootdb -- enter semicolon-terminated SQL, Ctrl-D to exit.");
    let stdin = io::stdin();
    loop {
        print!("rootdb> ");
        io::stdout().flush().ok();

        let mut statement = String::new();
        loop {
            let mut line = String::new();
            let bytes_read = stdin.lock().read_line(&mut line)?;
            if bytes_read == 0 {
                if statement.trim().is_empty() {
                    println!();
                    return Ok(());
                }
                break;
            }
            statement.push_str(&line);
            if line.trim_end().ends_with(';') {
                break;
            }
            print!("   ...> ");
            io::stdout().flush().ok();
        }

        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }

        match db.execute(statement) {
            Ok(QueryResult::Rows { columns, rows }) => print_rows(&columns, &rows),
            Ok(QueryResult::RowsAffected(n)) => println!("OK, {n} row(s) affected"),
            Err(e) => {
                let _ = logger.warning(format!("statement failed: {e}"));
                println!("Error: {e}");
            }
        }
    }
}

fn run_status(path: &std::path::Path, logger: &Logger) -> Result<()> {
    let db = Database::open(path).with_context(|| format!("failed to open database at {}", path.display()))?;
    let _ = logger.info(format!("status check on {}", path.display()));

    let mut names = db.table_names();
    names.sort();
    if names.is_empty() {
        println!("(no tables)");
        return Ok(());
    }
    for name in names {
        let count = db.row_count(&name)?;
        println!("{name}: {count} row(s)");
    }
    Ok(())
}

fn print_rows(columns: &[String], rows: &[Vec<Value>]) {
    println!("{}", columns.join(" | "));
    for row in rows {
        let cells: Vec<String> = row.iter().map(format_value).collect();
        println!("{}", cells.join(" | "));
    }
    println!("({} row(s))", rows.len());
}

fn format_value(v: &Value) -> String {
    match v {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Char(s) => s.clone(),
        Value::Null => "null".to_string(),
    }
}
