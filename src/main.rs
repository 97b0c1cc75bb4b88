use anyhow::{anyhow, Context, Result, Error};
use std::env;
use std::fs::File;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;
use simple_relational_store::{Database, ImportOptions, Table};

const USAGE: &str = "usage: simple-relational-store <database-id> <table.csv>...";

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let database_id = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let mut database = Database::new(&database_id)?;
    let options = ImportOptions::default();
    for file_path in args {
        let table = load_table(Path::new(&file_path), &options)
            .with_context(|| format!("Cannot load table from {}", file_path))?;
        info!(table = %table.id(), rows = table.row_count(), "table registered");
        database.add_table(table)?;
    }
    print!("{}", database);
    Ok(())
}

// The table is named after the file stem and keyed by its first column.
fn load_table(path: &Path, options: &ImportOptions) -> Result<Table, Error> {
    let table_id = path.file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("File name {:?} cannot be used as a table id", path))?;
    let mut reader = options.reader(File::open(path)?);
    let primary_key_col_id = reader.headers()?
        .get(0)
        .ok_or_else(|| anyhow!("File {:?} has no header row", path))?
        .to_string();
    Ok(Table::load_from(&mut reader, table_id, &primary_key_col_id)?)
}
