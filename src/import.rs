use std::io;
use tracing::debug;
use csv::{ReaderBuilder, Trim};
use crate::error::Result;
use crate::table::Table;
use crate::value::Value;

/// CSV dialect used when loading tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub delimiter: u8,
    pub trim: bool
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            delimiter: b',',
            trim: true
        }
    }
}

impl ImportOptions {
    pub fn reader<R: io::Read>(&self, input: R) -> csv::Reader<R> {
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .from_reader(input)
    }
}

impl Table {

    /// Loads a table whose columns are the CSV header and whose rows are the records.
    ///
    /// Records repeating an earlier primary key are skipped like any other duplicate append.
    pub fn load_from<R: io::Read>(reader: &mut csv::Reader<R>, id: &str, primary_key_col_id: &str) -> Result<Table> {
        let headers: Vec<String> = reader.headers()?.iter().map(|header| header.to_string()).collect();
        let mut table = Table::new(id, primary_key_col_id, &headers)?;
        for record in reader.records() {
            let fields: Vec<Value> = record?.iter().map(Value::parse).collect();
            table.append_row(fields)?;
        }
        debug!(table = %table.id(), rows = table.row_count(), "table loaded");
        Ok(table)
    }

    pub fn read_csv<R: io::Read>(input: R, id: &str, primary_key_col_id: &str, options: &ImportOptions) -> Result<Table> {
        Table::load_from(&mut options.reader(input), id, primary_key_col_id)
    }
}
