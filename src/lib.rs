pub mod error;
pub use error::{Error, Result};

pub mod value;
pub use value::{Value, ValueKind};

pub mod identifier;

pub mod predicate;
pub use predicate::{Predicate, WhereParameter};

mod render;

pub mod table;
pub use table::Table;

pub mod database;
pub use database::Database;

pub mod import;
pub use import::ImportOptions;
