//! Command line front-end over the record store and the flat-file codec.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fitbase::{flatfile, DbResult, FitBaseError, HalfUp, Record, RecordStore};

/// Keep track of daily fitness records
#[derive(Parser, Debug)]
#[command(name = "fitbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the record database
    #[arg(long, global = true, env = "FITBASE_DB", default_value = "fitness.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display every record, ordered by id
    List,

    /// Display a single record
    Show {
        #[arg(allow_negative_numbers = true)]
        id: i32,
    },

    /// Add a new record
    Add(RecordArgs),

    /// Replace every field of an existing record
    Update(RecordArgs),

    /// Remove a record
    Remove {
        #[arg(allow_negative_numbers = true)]
        id: i32,
    },

    /// Print the average number of steps across all records
    Average,

    /// Replace the whole database with the records of a text file
    Import {
        /// File to read records from
        file: PathBuf,
    },

    /// Write every record to a text file
    Export {
        /// File to write records to, overwritten if present
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub id: i32,

    /// Full name, must not be blank
    #[arg(long, value_parser = parse_name)]
    pub name: String,

    #[arg(long, allow_negative_numbers = true)]
    pub age: i32,

    /// Weight in pounds
    #[arg(long, allow_negative_numbers = true)]
    pub weight: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub steps: i32,

    #[arg(long, allow_negative_numbers = true)]
    pub calories: f64,
}

impl From<RecordArgs> for Record {
    fn from(args: RecordArgs) -> Self {
        Record::new(
            args.id,
            args.name,
            args.age,
            args.weight,
            args.steps,
            args.calories,
        )
    }
}

fn parse_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("name cannot be empty".to_owned());
    }

    Ok(name.to_owned())
}

/// Execute a parsed command against the database named in `cli`.
pub fn run(cli: Cli) -> DbResult<()> {
    execute(cli, &mut io::stdout().lock())
}

fn execute(cli: Cli, out: &mut impl Write) -> DbResult<()> {
    let store = RecordStore::open(&cli.db)?;

    match cli.command {
        Command::List => {
            let records = store.get_all()?;
            if records.is_empty() {
                writeln!(out, "No records to display.")?;
            }
            for record in records {
                writeln!(out, "{}", record)?;
            }
        }
        Command::Show { id } => match store.select(id)? {
            Some(record) => writeln!(out, "{}", record)?,
            None => return Err(FitBaseError::NotFound { id }),
        },
        Command::Add(args) => {
            let record = Record::from(args);
            store.insert(&record)?;
            writeln!(out, "Record added:\n{}", record)?;
        }
        Command::Update(args) => {
            let record = Record::from(args);
            store.update(&record)?;
            writeln!(out, "Record updated:\n{}", record)?;
        }
        Command::Remove { id } => {
            store.delete(id)?;
            writeln!(out, "Record removed.")?;
        }
        Command::Average => {
            if store.is_empty() {
                writeln!(out, "No records to calculate.")?;
            } else {
                writeln!(
                    out,
                    "Average Steps Today: {}",
                    HalfUp(store.average_steps()?, 2)
                )?;
            }
        }
        Command::Import { file } => {
            let records = flatfile::load(&file)?;
            store.save_all(&records)?;
            writeln!(
                out,
                "Imported {} records from {}.",
                records.len(),
                file.display()
            )?;
        }
        Command::Export { file } => {
            let records = store.get_all()?;
            flatfile::save(&file, &records)?;
            writeln!(
                out,
                "Exported {} records to {}.",
                records.len(),
                file.display()
            )?;
        }
    }

    Ok(())
}
