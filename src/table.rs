use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use indexmap::IndexMap;
use tracing::{debug, instrument};
use crate::error::{ensure_arg, Error, Result};
use crate::identifier::{are_unique_identifiers, are_valid_identifiers, is_valid_identifier};
use crate::predicate::{self, WhereParameter};
use crate::render::Grid;
use crate::value::Value;

/// A keyed collection of rows with a fixed column schema.
///
/// Rows are stored by primary key value and iterate in insertion order.
#[derive(Debug, Clone)]
pub struct Table {
    id: String,
    primary_key_col_id: String,
    column_ids: Vec<String>,
    column_positions: HashMap<String, usize>,
    primary_key_position: usize,
    rows: IndexMap<Value, Row>
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    fields: Vec<Value>
}

impl Table {
    pub fn new<S: AsRef<str>>(id: &str, primary_key_col_id: &str, col_ids: &[S]) -> Result<Table> {
        ensure_arg!(is_valid_identifier(id), "table id {:?} is not a valid identifier", id);
        ensure_arg!(are_valid_identifiers(col_ids), "column ids of table {} contain invalid identifiers", id);
        ensure_arg!(are_unique_identifiers(col_ids), "column ids of table {} contain duplicates", id);
        let column_ids: Vec<String> = col_ids.iter().map(|col_id| col_id.as_ref().to_string()).collect();
        let column_positions: HashMap<String, usize> = column_ids.iter()
            .enumerate()
            .map(|(position, col_id)| (col_id.clone(), position))
            .collect();
        let primary_key_position = *column_positions.get(primary_key_col_id).ok_or_else(|| Error::InvalidArgument(
            format!("primary key {} is not one of the columns of table {}", primary_key_col_id, id)
        ))?;
        Ok(Table {
            id: id.to_string(),
            primary_key_col_id: primary_key_col_id.to_string(),
            column_ids,
            column_positions,
            primary_key_position,
            rows: IndexMap::new()
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn primary_key_column_id(&self) -> &str {
        &self.primary_key_col_id
    }

    pub fn column_count(&self) -> usize {
        self.column_ids.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_ids(&self) -> Vec<String> {
        self.column_ids.clone()
    }

    /// Rows in storage order.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.values().map(|row| row.fields.as_slice())
    }

    pub fn row_by_key(&self, key: &Value) -> Option<&[Value]> {
        self.rows.get(key).map(|row| row.fields.as_slice())
    }

    pub fn value_by_key(&self, key: &Value, col_id: &str) -> Result<Option<&Value>> {
        let position = self.find_column_position(col_id)?;
        Ok(self.rows.get(key).map(|row| &row.fields[position]))
    }

    pub fn has_column(&self, col_id: &str) -> Result<bool> {
        ensure_arg!(is_valid_identifier(col_id), "column id {:?} is not a valid identifier", col_id);
        Ok(self.column_positions.contains_key(col_id))
    }

    pub fn has_any_column<S: AsRef<str>>(&self, col_ids: &[S]) -> bool {
        col_ids.iter().any(|col_id| self.column_positions.contains_key(col_id.as_ref()))
    }

    pub fn has_all_columns<S: AsRef<str>>(&self, col_ids: &[S]) -> bool {
        col_ids.iter().all(|col_id| self.column_positions.contains_key(col_id.as_ref()))
    }

    /// Appends a row unless one with the same primary key is already stored.
    pub fn append_row(&mut self, fields: Vec<Value>) -> Result<&mut Table> {
        ensure_arg!(
            fields.len() == self.column_count(),
            "row has {} values but table {} has {} columns", fields.len(), self.id, self.column_count()
        );
        let key = fields[self.primary_key_position].clone();
        if self.rows.contains_key(&key) {
            debug!(table = %self.id, %key, "row with existing primary key ignored");
            return Ok(self);
        }
        self.rows.insert(key, Row { fields });
        Ok(self)
    }

    #[instrument(name = "table::remove_rows", level = "debug", skip(self, where_param), fields(table = %self.id))]
    pub fn remove_rows(&mut self, where_param: &WhereParameter) -> Result<&mut Table> {
        let position = self.find_column_position(where_param.col_id())?;
        let mut doomed: Vec<bool> = Vec::with_capacity(self.rows.len());
        for row in self.rows.values() {
            doomed.push(where_param.test(&row.fields[position])?);
        }
        let mut doomed = doomed.into_iter();
        self.rows.retain(|_, _| doomed.next() != Some(true));
        Ok(self)
    }

    pub fn remove_all_rows(&mut self) {
        self.rows.clear();
    }

    /// Projects the rows matching at least one of `where_params` (all rows when empty) into a new table.
    ///
    /// Without `col_ids` the full schema is kept; a projection must include the primary key.
    #[instrument(name = "table::select", level = "debug", skip(self, col_ids, where_params), fields(table = %self.id))]
    pub fn select(&self, col_ids: Option<&[&str]>, where_params: &[WhereParameter], new_table_id: &str) -> Result<Table> {
        ensure_arg!(is_valid_identifier(new_table_id), "new table id {:?} is not a valid identifier", new_table_id);
        let selected: Vec<String> = match col_ids {
            None => self.column_ids.clone(),
            Some(col_ids) => {
                ensure_arg!(are_unique_identifiers(col_ids), "selected columns contain duplicates");
                for col_id in col_ids.iter() {
                    self.find_column_position(col_id)?;
                }
                ensure_arg!(
                    col_ids.contains(&self.primary_key_col_id.as_str()),
                    "selected columns miss the primary key {}", self.primary_key_col_id
                );
                col_ids.iter().map(|col_id| col_id.to_string()).collect()
            }
        };
        self.check_where_columns(where_params)?;
        let positions: Vec<usize> = selected.iter().map(|col_id| self.column_positions[col_id]).collect();

        let mut table = Table::new(new_table_id, &self.primary_key_col_id, &selected)?;
        for row in self.rows.values() {
            let is_row_selected = where_params.is_empty()
                || predicate::any(where_params, |col_id| self.field(row, col_id))?;
            if is_row_selected {
                let projection = positions.iter().map(|&position| row.fields[position].clone()).collect();
                table.append_row(projection)?;
            }
        }
        Ok(table)
    }

    /// Overwrites `col_id` in every row matching all of `where_params` (every row when empty).
    #[instrument(name = "table::update", level = "debug", skip(self, new_value, where_params), fields(table = %self.id))]
    pub fn update(&mut self, col_id: &str, new_value: Value, where_params: &[WhereParameter]) -> Result<&mut Table> {
        let target = self.find_column_position(col_id)?;
        ensure_arg!(col_id != self.primary_key_col_id, "primary key column {} cannot be updated", col_id);
        self.check_where_columns(where_params)?;
        let mut matches: Vec<bool> = Vec::with_capacity(self.rows.len());
        for row in self.rows.values() {
            matches.push(predicate::all(where_params, |col_id| self.field(row, col_id))?);
        }
        for (row, is_match) in self.rows.values_mut().zip(matches) {
            if is_match {
                row.fields[target] = new_value.clone();
            }
        }
        Ok(self)
    }

    /// Inner join of this table's `fk_col_id` against the primary key of `other`.
    ///
    /// Columns are renamed `<table id>_<column id>`; the foreign key and the other primary key are dropped.
    #[instrument(name = "table::equijoin", level = "debug", skip(self, other), fields(table = %self.id, other = %other.id))]
    pub fn equijoin(&self, other: &Table, fk_col_id: &str, new_table_id: &str) -> Result<Table> {
        ensure_arg!(fk_col_id != self.primary_key_col_id, "foreign key {} is the primary key of table {}", fk_col_id, self.id);
        let fk_position = self.find_column_position(fk_col_id)?;
        ensure_arg!(is_valid_identifier(new_table_id), "new table id {:?} is not a valid identifier", new_table_id);

        let mut col_ids: Vec<String> = Vec::with_capacity(self.column_count() + other.column_count() - 2);
        col_ids.extend(self.column_ids.iter()
            .filter(|col_id| col_id.as_str() != fk_col_id)
            .map(|col_id| format!("{}_{}", self.id, col_id)));
        col_ids.extend(other.column_ids.iter()
            .filter(|col_id| **col_id != other.primary_key_col_id)
            .map(|col_id| format!("{}_{}", other.id, col_id)));
        let primary_key = format!("{}_{}", self.id, self.primary_key_col_id);

        let mut table = Table::new(new_table_id, &primary_key, &col_ids)?;
        for row in self.rows.values() {
            let Some(other_row) = other.rows.get(&row.fields[fk_position]) else {
                continue;
            };
            let joined = row.fields.iter()
                .enumerate()
                .filter(|(position, _)| *position != fk_position)
                .chain(other_row.fields.iter()
                    .enumerate()
                    .filter(|(position, _)| *position != other.primary_key_position))
                .map(|(_, value)| value.clone())
                .collect();
            table.append_row(joined)?;
        }
        Ok(table)
    }

    pub(crate) fn find_column_position(&self, col_id: &str) -> Result<usize> {
        self.column_positions.get(col_id).copied().ok_or_else(|| Error::InvalidArgument(format!(
            "Cannot find column {}, it does not exist in the table {}, existing columns {}",
            col_id,
            self.id,
            self.column_ids.join(", ")
        )))
    }

    fn check_where_columns(&self, where_params: &[WhereParameter]) -> Result<()> {
        for where_param in where_params {
            self.find_column_position(where_param.col_id())?;
        }
        Ok(())
    }

    fn field<'a>(&self, row: &'a Row, col_id: &str) -> &'a Value {
        &row.fields[self.column_positions[col_id]]
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Tabellenbezeichner: {}", self.id)?;
        writeln!(f, "Primärschlüssel: {}", self.primary_key_col_id)?;
        writeln!(f)?;
        let mut grid = Grid::new(&self.column_ids);
        for row in self.rows.values() {
            grid.push_row(&row.fields);
        }
        write!(f, "{}", grid)
    }
}

// Tables are identified by their id alone.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Table {}

impl Hash for Table {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Ord for Table {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl PartialOrd for Table {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    macro_rules! row {
        ($($value:expr),* $(,)?) => {
            vec![$($crate::value::Value::from($value)),*]
        };
    }

    pub(crate) use row;

    pub(crate) fn tea_table(id: &str) -> Table {
        let mut table = Table::new(id, "ID", &["ID", "Name", "Herkunftsland", "KategorieID"]).unwrap();
        table.append_row(row![1, "Sencha", "Japan", 1]).unwrap();
        table.append_row(row![16, "Darjeeling", "Indien", 2]).unwrap();
        table.append_row(row![111, "Earl Grey", "Großbritannien", 2]).unwrap();
        table.append_row(row![2000, "Rooibos Vanille", "Südafrika", 3]).unwrap();
        table
    }

    pub(crate) fn category_table() -> Table {
        let mut table = Table::new("Kategorie", "ID", &["ID", "Beschreibung", "EnthaeltKoffein"]).unwrap();
        table.append_row(row![1, "Grüner Tee", true]).unwrap();
        table.append_row(row![2, "Schwarzer Tee", true]).unwrap();
        table.append_row(row![3, "Kräutertee", false]).unwrap();
        table
    }

    fn keys(table: &Table) -> Vec<Value> {
        table.rows().map(|row| row[table.primary_key_position].clone()).collect()
    }

    fn expect_invalid_argument<T: fmt::Debug>(result: Result<T>) -> String {
        match result {
            Err(e) => {
                assert!(e.is_invalid_argument(), "unexpected error {:?}", e);
                e.to_string()
            },
            Ok(value) => panic!("Error expected, got {:?}", value),
        }
    }

    #[test]
    fn should_create_table_with_schema() {
        let table = Table::new("Teesorten", "ID", &["ID", "Name"]).unwrap();
        assert_eq!(table.id(), "Teesorten");
        assert_eq!(table.primary_key_column_id(), "ID");
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_ids(), vec!["ID".to_string(), "Name".to_string()]);
    }

    #[test]
    fn should_produce_error_when_schema_is_malformed() {
        expect_invalid_argument(Table::new("1Tee", "ID", &["ID"]));
        expect_invalid_argument(Table::new("Tee", "ID", &["ID", "Na me"]));
        expect_invalid_argument(Table::new("Tee", "ID", &["ID", "Name", "ID"]));
        let message = expect_invalid_argument(Table::new("Tee", "Key", &["ID", "Name"]));
        assert_eq!(message, "Invalid argument: primary key Key is not one of the columns of table Tee");
    }

    #[test]
    fn should_keep_first_row_when_primary_key_is_appended_twice() {
        let mut table = tea_table("Tee");
        table.append_row(row![16, "Assam", "Indien", 2]).unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.value_by_key(&Value::from(16), "Name").unwrap(), Some(&Value::from("Darjeeling")));
        assert_eq!(keys(&table), row![1, 16, 111, 2000]);
    }

    #[test]
    fn should_produce_error_when_row_length_differs_from_column_count() {
        let mut table = tea_table("Tee");
        expect_invalid_argument(table.append_row(row![5, "Assam"]));
        assert_eq!(table.row_count(), 4);
    }

    #[test]
    fn should_look_up_rows_and_values_by_key() {
        let table = tea_table("Tee");
        assert_eq!(table.row_by_key(&Value::from(111)), Some(row![111, "Earl Grey", "Großbritannien", 2].as_slice()));
        assert_eq!(table.row_by_key(&Value::from(7)), None);
        assert_eq!(table.row_by_key(&Value::from("111")), None);
        assert_eq!(table.value_by_key(&Value::from(7), "Name").unwrap(), None);
        let message = expect_invalid_argument(table.value_by_key(&Value::from(1), "Preis"));
        assert_eq!(
            message,
            "Invalid argument: Cannot find column Preis, it does not exist in the table Tee, existing columns ID, Name, Herkunftsland, KategorieID"
        );
    }

    #[test]
    fn should_check_column_membership() {
        let table = tea_table("Tee");
        assert!(table.has_column("Name").unwrap());
        assert!(!table.has_column("Preis").unwrap());
        expect_invalid_argument(table.has_column("9Preis"));
        assert!(table.has_any_column(&["Preis", "Name"]));
        assert!(!table.has_any_column::<&str>(&[]));
        assert!(table.has_all_columns(&["ID", "Name"]));
        assert!(!table.has_all_columns(&["ID", "Preis"]));
        assert!(table.has_all_columns::<&str>(&[]));
    }

    #[test]
    fn should_remove_every_matching_row_in_single_pass() {
        let mut table = tea_table("Tee");
        table.remove_rows(&WhereParameter::equals("KategorieID", 2)).unwrap();
        assert_eq!(keys(&table), row![1, 2000]);
        table.remove_rows(&WhereParameter::greater_than("ID", 1000.0)).unwrap();
        assert_eq!(keys(&table), row![1]);
        table.remove_all_rows();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn should_leave_rows_untouched_when_remove_predicate_fails() {
        let mut table = tea_table("Tee");
        match table.remove_rows(&WhereParameter::less_than("Name", 3.0)) {
            Err(e) => assert!(e.is_type_mismatch()),
            Ok(_) => panic!("Error expected"),
        }
        assert_eq!(table.row_count(), 4);
        expect_invalid_argument(table.remove_rows(&WhereParameter::equals("Preis", 1)));
    }

    #[test]
    fn should_select_all_rows_without_where_params() {
        let table = tea_table("Tee");
        let selected = table.select(None, &[], "Tee_Alle").unwrap();
        assert_eq!(selected.id(), "Tee_Alle");
        assert_eq!(selected.column_ids(), table.column_ids());
        assert_eq!(selected.rows().collect::<Vec<_>>(), table.rows().collect::<Vec<_>>());
    }

    #[test]
    fn should_select_rows_matching_any_where_param() {
        let table = tea_table("Tee");
        let selected = table.select(
            Some(&["Name", "ID"]),
            &[WhereParameter::equals("KategorieID", 2), WhereParameter::equals("Herkunftsland", "Japan")],
            "Tee_Selected"
        ).unwrap();
        assert_eq!(selected.column_ids(), vec!["Name".to_string(), "ID".to_string()]);
        assert_eq!(selected.primary_key_column_id(), "ID");
        assert_eq!(selected.rows().collect::<Vec<_>>(), vec![
            row!["Sencha", 1].as_slice(),
            row!["Darjeeling", 16].as_slice(),
            row!["Earl Grey", 111].as_slice()
        ]);
    }

    #[test]
    fn should_produce_error_when_select_arguments_are_invalid() {
        let table = tea_table("Tee");
        expect_invalid_argument(table.select(Some(&["Name"]), &[], "Tee_Names"));
        expect_invalid_argument(table.select(Some(&["ID", "ID"]), &[], "Tee_Ids"));
        expect_invalid_argument(table.select(Some(&["ID", "Preis"]), &[], "Tee_Preis"));
        expect_invalid_argument(table.select(None, &[], "Tee Neu"));
        expect_invalid_argument(table.select(None, &[WhereParameter::equals("Preis", 1)], "Tee_Neu"));
    }

    #[test]
    fn should_update_rows_matching_all_where_params() {
        let mut table = tea_table("Tee");
        table.update(
            "Name",
            Value::from("Darjeeling Gartentee"),
            &[WhereParameter::equals("KategorieID", 2), WhereParameter::equals("Herkunftsland", "Indien")]
        ).unwrap();
        assert_eq!(table.value_by_key(&Value::from(16), "Name").unwrap(), Some(&Value::from("Darjeeling Gartentee")));
        assert_eq!(table.value_by_key(&Value::from(111), "Name").unwrap(), Some(&Value::from("Earl Grey")));
    }

    #[test]
    fn should_treat_where_params_asymmetrically_in_select_and_update() {
        let where_params = [WhereParameter::equals("KategorieID", 2), WhereParameter::equals("Herkunftsland", "Japan")];
        let mut table = tea_table("Tee");
        assert_eq!(table.select(None, &where_params, "Tee_Oder").unwrap().row_count(), 3);
        table.update("Name", Value::from("Unbekannt"), &where_params).unwrap();
        assert_eq!(table.rows().filter(|row| row[1] == Value::from("Unbekannt")).count(), 0);
    }

    #[test]
    fn should_update_every_row_without_where_params() {
        let mut table = tea_table("Tee");
        table.update("KategorieID", Value::from(9), &[]).unwrap();
        assert!(table.rows().all(|row| row[3] == Value::from(9)));
    }

    #[test]
    fn should_produce_error_when_update_targets_primary_key() {
        let mut table = tea_table("Tee");
        let message = expect_invalid_argument(table.update("ID", Value::from(5), &[]));
        assert_eq!(message, "Invalid argument: primary key column ID cannot be updated");
        expect_invalid_argument(table.update("Preis", Value::from(5), &[]));
        expect_invalid_argument(table.update("Name", Value::from("x"), &[WhereParameter::equals("Preis", 1)]));
    }

    #[test]
    fn should_leave_rows_untouched_when_update_predicate_fails() {
        let mut table = tea_table("Tee");
        let result = table.update("Name", Value::from("x"), &[WhereParameter::greater_than("Herkunftsland", 0.0)]);
        assert!(result.is_err());
        assert!(table.rows().all(|row| row[1] != Value::from("x")));
    }

    #[test]
    fn should_join_on_foreign_key_keeping_left_order() {
        let tea = tea_table("Tee");
        let joined = tea.equijoin(&category_table(), "KategorieID", "Tee_Kategorie").unwrap();
        assert_eq!(joined.primary_key_column_id(), "Tee_ID");
        assert_eq!(joined.column_ids(), vec![
            "Tee_ID", "Tee_Name", "Tee_Herkunftsland", "Kategorie_Beschreibung", "Kategorie_EnthaeltKoffein"
        ].into_iter().map(String::from).collect::<Vec<_>>());
        assert_eq!(keys(&joined), row![1, 16, 111, 2000]);
        assert_eq!(joined.row_by_key(&Value::from(2000)), Some(row![2000, "Rooibos Vanille", "Südafrika", "Kräutertee", false].as_slice()));
    }

    #[test]
    fn should_drop_rows_without_matching_primary_key() {
        let mut tea = tea_table("Tee");
        tea.append_row(row![3000, "Mate", "Brasilien", 7]).unwrap();
        tea.append_row(row![4000, "Genmaicha", "Japan", "1"]).unwrap();
        let joined = tea.equijoin(&category_table(), "KategorieID", "Tee_Kategorie").unwrap();
        assert_eq!(joined.row_count(), tea.row_count() - 2);
        assert_eq!(keys(&joined), row![1, 16, 111, 2000]);
    }

    #[test]
    fn should_produce_error_when_join_arguments_are_invalid() {
        let tea = tea_table("Tee");
        let categories = category_table();
        expect_invalid_argument(tea.equijoin(&categories, "ID", "Tee_Kategorie"));
        expect_invalid_argument(tea.equijoin(&categories, "Preis", "Tee_Kategorie"));
        expect_invalid_argument(tea.equijoin(&categories, "KategorieID", "Tee-Kategorie"));
    }

    #[test]
    fn should_render_empty_table() {
        let table = Table::new("Teesorten", "ID", &["ID", "Name", "Herkunftsland", "KategorieID"]).unwrap();
        assert_eq!(table.to_string(), "\
Tabellenbezeichner: Teesorten
Primärschlüssel: ID

| ID | Name | Herkunftsland | KategorieID |
|----|------|---------------|-------------|
");
    }

    #[test]
    fn should_render_rows_with_columns_sized_to_longest_cell() {
        let table = tea_table("Teesorten");
        assert_eq!(table.to_string(), "\
Tabellenbezeichner: Teesorten
Primärschlüssel: ID

| ID   | Name            | Herkunftsland  | KategorieID |
|------|-----------------|----------------|-------------|
| 1    | Sencha          | Japan          | 1           |
| 16   | Darjeeling      | Indien         | 2           |
| 111  | Earl Grey       | Großbritannien | 2           |
| 2000 | Rooibos Vanille | Südafrika      | 3           |
");
    }

    #[test]
    fn should_render_select_result_in_projected_order() {
        let selected = tea_table("Tee").select(
            Some(&["Name", "ID"]),
            &[WhereParameter::equals("KategorieID", 2), WhereParameter::equals("KategorieID", 4)],
            "Tee_Selected"
        ).unwrap();
        assert_eq!(selected.to_string(), "\
Tabellenbezeichner: Tee_Selected
Primärschlüssel: ID

| Name       | ID  |
|------------|-----|
| Darjeeling | 16  |
| Earl Grey  | 111 |
");
    }

    #[test]
    fn should_render_join_result() {
        let joined = tea_table("Tee").equijoin(&category_table(), "KategorieID", "Tee_Kategorie").unwrap();
        assert_eq!(joined.to_string(), "\
Tabellenbezeichner: Tee_Kategorie
Primärschlüssel: Tee_ID

| Tee_ID | Tee_Name        | Tee_Herkunftsland | Kategorie_Beschreibung | Kategorie_EnthaeltKoffein |
|--------|-----------------|-------------------|------------------------|---------------------------|
| 1      | Sencha          | Japan             | Grüner Tee             | true                      |
| 16     | Darjeeling      | Indien            | Schwarzer Tee          | true                      |
| 111    | Earl Grey       | Großbritannien    | Schwarzer Tee          | true                      |
| 2000   | Rooibos Vanille | Südafrika         | Kräutertee             | false                     |
");
    }

    #[test]
    fn should_compare_tables_by_id() {
        let left = tea_table("Tee");
        let right = Table::new("Tee", "Key", &["Key"]).unwrap();
        assert_eq!(left, right);
        assert!(category_table() < left);
    }
}
