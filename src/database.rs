use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use tracing::{debug, instrument};
use crate::error::{ensure_arg, Error, Result};
use crate::identifier::{is_valid_identifier, is_valid_identifier_prefix};
use crate::table::Table;

/// Named registry of tables, always listed in ascending order of table id.
#[derive(Debug, Clone)]
pub struct Database {
    id: String,
    tables: BTreeMap<String, Table>
}

impl Database {
    pub fn new(id: &str) -> Result<Database> {
        ensure_arg!(is_valid_identifier(id), "database id {:?} is not a valid identifier", id);
        Ok(Database {
            id: id.to_string(),
            tables: BTreeMap::new()
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.get(table_id)
    }

    pub fn table_mut(&mut self, table_id: &str) -> Option<&mut Table> {
        self.tables.get_mut(table_id)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> + '_ {
        self.tables.values()
    }

    pub fn table_ids(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Ids in the half-open range `from..to`.
    pub fn table_ids_between(&self, from: &str, to: &str) -> Result<Vec<String>> {
        ensure_arg!(is_valid_identifier(from), "range start {:?} is not a valid identifier", from);
        ensure_arg!(is_valid_identifier(to), "range end {:?} is not a valid identifier", to);
        ensure_arg!(from < to, "range start {} is not before range end {}", from, to);
        Ok(self.tables
            .range::<str, _>((Bound::Included(from), Bound::Excluded(to)))
            .map(|(table_id, _)| table_id.clone())
            .collect())
    }

    pub fn first_table_with_prefix(&self, prefix: &str) -> Result<Option<&Table>> {
        ensure_arg!(is_valid_identifier_prefix(prefix), "{:?} is not a valid identifier prefix", prefix);
        // Every id starting with `prefix` sorts at or after it, so the first candidate decides.
        Ok(self.tables
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .filter(|(table_id, _)| table_id.starts_with(prefix))
            .map(|(_, table)| table))
    }

    pub fn has_table(&self, table_id: &str) -> bool {
        self.tables.contains_key(table_id)
    }

    #[instrument(name = "database::add_table", level = "debug", skip(self, table), fields(database = %self.id, table = %table.id()))]
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(table.id()) {
            debug!("table id already registered");
            return Err(Error::InvalidArgument(format!("database {} already has a table {}", self.id, table.id())));
        }
        self.tables.insert(table.id().to_string(), table);
        Ok(())
    }

    /// Removes the table if present and hands it back.
    pub fn remove_table(&mut self, table_id: &str) -> Option<Table> {
        self.tables.remove(table_id)
    }

    pub fn remove_all_tables(&mut self) {
        self.tables.clear();
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Datenbankbezeichner: {}", self.id)?;
        writeln!(f)?;
        for table in self.tables.values() {
            writeln!(f, "{}", table)?;
        }
        Ok(())
    }
}
