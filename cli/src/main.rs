//! Interactive shell: reads a line, recognizes the reserved words EXIT,
//! HELP, SCHEMA, SAVE, LOAD case-insensitively, and otherwise forwards the
//! line to the engine (§4.7, §6).

mod format;

use std::path::PathBuf;

use clap::Parser;
use pesadb_core::{Database, ExecResult};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const DEFAULT_DB_PATH: &str = "db.pesapal";

const HELP_TEXT: &str = "\
Commands: EXIT, HELP, SCHEMA, SAVE, LOAD
SQL surface:
  CREATE TABLE name (col type [PRIMARY KEY|UNIQUE|NOT NULL], ...)
  ALTER TABLE name ADD COLUMN col type
  ALTER TABLE name RENAME TO new_name
  DROP TABLE name
  INSERT INTO name (cols) VALUES (vals)
  SELECT cols|* FROM name [WHERE ...] [ORDER BY col [DESC]] [LIMIT n]
  SELECT MAX(col) FROM name [WHERE ...]
  UPDATE name SET c=v, ... [WHERE ...]
  DELETE FROM name [WHERE ...]
  CREATE INDEX name ON table(col)";

/// pesadb — an interactive shell for the pesadb relational engine.
#[derive(Parser, Debug)]
#[command(name = "pesadb")]
struct Cli {
    /// Path to the snapshot file to load at startup and use for SAVE/LOAD.
    #[arg(short = 'd', long = "db", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut db = if cli.db.exists() {
        match Database::load(&cli.db) {
            Ok(db) => db,
            Err(err) => {
                eprintln!("Error: failed to load {}: {err}", cli.db.display());
                std::process::exit(1);
            }
        }
    } else {
        Database::new("pesadb")
    };

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Error: failed to start line editor: {err}");
            std::process::exit(1);
        }
    };

    loop {
        match editor.readline("pesadb> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                if handle_line(&mut db, &cli.db, line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }
}

/// Returns `true` when the shell should terminate.
fn handle_line(db: &mut Database, db_path: &std::path::Path, line: &str) -> bool {
    let upper = line.to_ascii_uppercase();
    match upper.as_str() {
        "EXIT" => {
            if let Err(err) = db.save(db_path) {
                eprintln!("Error: {err}");
            }
            return true;
        }
        "HELP" => {
            println!("{HELP_TEXT}");
            return false;
        }
        "SCHEMA" => {
            print_schema(db);
            return false;
        }
        "SAVE" => {
            match db.save(db_path) {
                Ok(()) => println!("Saved to {}", db_path.display()),
                Err(err) => eprintln!("Error: {err}"),
            }
            return false;
        }
        "LOAD" => {
            match Database::load(db_path) {
                Ok(loaded) => {
                    *db = loaded;
                    println!("Loaded from {}", db_path.display());
                }
                Err(err) => eprintln!("Error: {err}"),
            }
            return false;
        }
        _ => {}
    }

    match db.execute(line) {
        Ok(ExecResult::Rows(rows)) => println!("{}", format::render_rows(&rows)),
        Ok(ExecResult::Affected(count)) => println!("{count} row(s) affected"),
        Ok(ExecResult::RowId(id)) => println!("Inserted row id {id}"),
        Ok(ExecResult::Ack) => println!("OK"),
        Err(err) => eprintln!("Error: {err}"),
    }
    false
}

fn print_schema(db: &Database) {
    let schema = db.schema();
    println!("Database: {}", schema.name);
    for (name, table) in &schema.tables {
        println!("  {} ({} rows)", name, table.row_count);
        for column in &table.columns {
            let mut markers = Vec::new();
            if column.primary {
                markers.push("PK");
            }
            if column.unique {
                markers.push("UNIQUE");
            }
            if !column.nullable {
                markers.push("NOT NULL");
            }
            let suffix = if markers.is_empty() {
                String::new()
            } else {
                format!(" ({})", markers.join(", "))
            };
            println!("    {} {}{}", column.name, column.data_type, suffix);
        }
    }
}
