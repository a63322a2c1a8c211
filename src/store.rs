//! Shared aggregate table: one row of sales totals per salesperson.

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::numeric::CurrencyAmount;

/// Name of the aggregate table. Also the top-level key of JSON exports.
pub const TABLE_NAME: &str = "employees";

/// Summary row for one salesperson.
///
/// Field order and serialized names match the export formats.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct AggregateRecord {
    /// Surrogate key assigned by the store.
    pub id: i64,
    /// Full display name of the salesperson; unique.
    pub name: String,
    /// Beverages plus additions sold.
    #[serde(rename = "sales")]
    pub sale_count: u32,
    /// Sum of all sale prices, in whole cents.
    #[serde(rename = "amount")]
    pub total_amount: CurrencyAmount,
}

/// Error returned by [`AggregateStore`] operations.
#[derive(Debug)]
pub enum StoreError {
    /// The database rejected or failed an operation.
    Sqlite(rusqlite::Error),
    /// An insert was attempted for a name that already has a row. Callers
    /// must check [`AggregateStore::exists`] first.
    DuplicateName(String),
    /// An amount cannot be stored as a REAL and read back unchanged.
    InvalidAmount {
        /// Row the amount belongs to.
        name: String,
        /// The amount as given.
        amount: String,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            StoreError::Sqlite(err) => format!("Database error: {}", err),
            StoreError::DuplicateName(name) => {
                format!("{} already has a row in the {} table", name, TABLE_NAME)
            }
            StoreError::InvalidAmount { name, amount } => {
                format!("Amount {} for {} cannot be stored", amount, name)
            }
        })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

/// SQLite-backed table of [`AggregateRecord`]s, keyed by name.
///
/// The store does not upsert on its own: callers check [`Self::exists`] and
/// then call [`Self::insert`] or [`Self::update`].
pub struct AggregateStore {
    connection: Connection,
    diagnostics: Rc<dyn Diagnostics>,
}

impl AggregateStore {
    /// Opens (creating if needed) the database at `path` and ensures the
    /// table exists.
    pub fn open(path: &Path, diagnostics: Rc<dyn Diagnostics>) -> Result<Self, StoreError> {
        let store = Self {
            connection: Connection::open(path)?,
            diagnostics,
        };
        store
            .diagnostics
            .debug(&format!("Opened connection to {}", path.display()));
        store.ensure_schema()?;
        Ok(store)
    }

    /// A private, empty in-memory store.
    pub fn open_in_memory(diagnostics: Rc<dyn Diagnostics>) -> Result<Self, StoreError> {
        let store = Self {
            connection: Connection::open_in_memory()?,
            diagnostics,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Creates the table unless it already exists. Safe to call any number
    /// of times.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.connection.execute(
            "CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                sales INTEGER NOT NULL,
                amount REAL NOT NULL
            )",
            [],
        )?;
        self.diagnostics
            .debug(&format!("Created {} table if not exists already", TABLE_NAME));
        Ok(())
    }

    /// True if a row with exactly this name exists.
    pub fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let exists: bool = self.connection.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE name = ?1)",
            params![name],
            |row| row.get(0),
        )?;
        self.diagnostics.debug(&format!(
            "{} is {}found in {} table",
            name,
            if exists { "" } else { "not " },
            TABLE_NAME
        ));
        Ok(exists)
    }

    /// Adds a row for `name` and returns its id.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateName`] if the name already has a row, and
    /// [`StoreError::InvalidAmount`] if the amount would not read back.
    pub fn insert(
        &self,
        name: &str,
        sale_count: u32,
        total_amount: CurrencyAmount,
    ) -> Result<i64, StoreError> {
        if self.exists(name)? {
            self.diagnostics.error(&format!(
                "Refusing to insert {} twice into {} table",
                name, TABLE_NAME
            ));
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        self.connection.execute(
            "INSERT INTO employees (name, sales, amount) VALUES (?1, ?2, ?3)",
            params![name, sale_count, amount_to_sql(name, total_amount)?],
        )?;
        let id = self.connection.last_insert_rowid();
        self.diagnostics
            .info(&format!("{} was added to {} table as row {}", name, TABLE_NAME, id));
        Ok(id)
    }

    /// Replaces count and amount of the row for `name`. Does nothing if
    /// there is no such row.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidAmount`] if the amount would not read back; the
    /// row keeps its previous values.
    pub fn update(
        &self,
        name: &str,
        sale_count: u32,
        total_amount: CurrencyAmount,
    ) -> Result<(), StoreError> {
        let amount = amount_to_sql(name, total_amount)?;
        let changed = self.connection.execute(
            "UPDATE employees SET sales = ?1, amount = ?2 WHERE name = ?3",
            params![sale_count, amount, name],
        )?;
        if changed == 0 {
            self.diagnostics.debug(&format!(
                "No {} row for {}, nothing updated",
                TABLE_NAME, name
            ));
        } else {
            self.diagnostics.info(&format!(
                "{} record was updated in {} table with {} sales and {} amount",
                name, TABLE_NAME, sale_count, total_amount
            ));
        }
        Ok(())
    }

    /// Every row, in insertion order.
    ///
    /// A row whose amount cannot be read back is reported as an error and
    /// left out, so one bad row does not hide the others.
    pub fn all(&self) -> Result<Vec<AggregateRecord>, StoreError> {
        let mut statement = self
            .connection
            .prepare("SELECT id, name, sales, amount FROM employees ORDER BY id")?;
        let rows = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records: Vec<AggregateRecord> = rows
            .into_iter()
            .filter_map(|(id, name, sale_count, amount)| {
                match CurrencyAmount::from_f64(amount) {
                    Some(total_amount) => Some(AggregateRecord {
                        id,
                        name,
                        sale_count,
                        total_amount: total_amount.round_cents(),
                    }),
                    None => {
                        self.diagnostics.error(&format!(
                            "Skipping {} row {} ({}): stored amount {} is not a valid amount",
                            TABLE_NAME, id, name, amount
                        ));
                        None
                    }
                }
            })
            .collect();

        self.diagnostics.debug(&format!(
            "Selected {} salespeople records from {} table",
            records.len(),
            TABLE_NAME
        ));
        Ok(records)
    }

    /// True if the table has no rows.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        let empty: bool = self.connection.query_row(
            "SELECT NOT EXISTS(SELECT 1 FROM employees)",
            [],
            |row| row.get(0),
        )?;
        if empty {
            self.diagnostics
                .info(&format!("There are no sales records in {} table yet", TABLE_NAME));
        }
        Ok(empty)
    }
}

/// Cent-rounded amount as a REAL, provided [`AggregateStore::all`] can read
/// it back.
fn amount_to_sql(name: &str, amount: CurrencyAmount) -> Result<f64, StoreError> {
    let amount = amount.round_cents();
    amount
        .to_f64()
        .filter(|value| CurrencyAmount::from_f64(*value).is_some())
        .ok_or_else(|| StoreError::InvalidAmount {
            name: name.to_string(),
            amount: amount.to_string(),
        })
}

#[cfg(test)]
mod test {
    use std::rc::Rc;
    use std::str::FromStr;

    use log::Level;
    use rusqlite::params;

    use crate::diagnostics::RecordingDiagnostics;
    use crate::numeric::CurrencyAmount;
    use crate::store::{AggregateRecord, AggregateStore, StoreError};

    fn amount(value: &str) -> CurrencyAmount {
        CurrencyAmount::from_str(value).unwrap()
    }

    fn memory_store() -> AggregateStore {
        AggregateStore::open_in_memory(Rc::new(RecordingDiagnostics::new())).unwrap()
    }

    #[test]
    fn test_fresh_store_is_empty() {
        let store = memory_store();
        assert!(store.is_empty().unwrap());
        assert!(store.all().unwrap().is_empty());
        assert!(!store.exists("Jake Ekaj").unwrap());
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let store = memory_store();
        store.insert("Jake Ekaj", 2, amount("5.5")).unwrap();

        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();

        assert_eq!(
            vec![AggregateRecord {
                id: 1,
                name: "Jake Ekaj".to_string(),
                sale_count: 2,
                total_amount: amount("5.5"),
            }],
            store.all().unwrap()
        );
    }

    #[test]
    fn test_insert_update_all() {
        let store = memory_store();

        assert_eq!(1, store.insert("Amy Yma", 3, amount("6.8")).unwrap());
        assert_eq!(2, store.insert("Bob Bob", 6, amount("9.67")).unwrap());
        assert!(store.exists("Amy Yma").unwrap());
        assert!(!store.exists("amy yma").unwrap());
        assert!(!store.is_empty().unwrap());

        store.update("Amy Yma", 4, amount("8.3")).unwrap();

        let records = store.all().unwrap();
        assert_eq!(
            vec![
                AggregateRecord {
                    id: 1,
                    name: "Amy Yma".to_string(),
                    sale_count: 4,
                    total_amount: amount("8.3"),
                },
                AggregateRecord {
                    id: 2,
                    name: "Bob Bob".to_string(),
                    sale_count: 6,
                    total_amount: amount("9.67"),
                },
            ],
            records
        );
    }

    #[test]
    fn test_update_missing_row_is_noop() {
        let diagnostics = Rc::new(RecordingDiagnostics::new());
        let store = AggregateStore::open_in_memory(diagnostics.clone()).unwrap();

        store.update("Nobody Ydobon", 1, amount("1.0")).unwrap();

        assert!(store.is_empty().unwrap());
        assert!(diagnostics
            .messages(Level::Debug)
            .contains(&"No employees row for Nobody Ydobon, nothing updated".to_string()));
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let store = memory_store();
        store.insert("Jake Ekaj", 1, amount("4.0")).unwrap();

        assert!(matches!(
            store.insert("Jake Ekaj", 2, amount("5.5")),
            Err(StoreError::DuplicateName(name)) if name == "Jake Ekaj"
        ));
        assert_eq!(1, store.all().unwrap().len());
        assert_eq!(amount("4.0"), store.all().unwrap()[0].total_amount);
    }

    #[test]
    fn test_amounts_are_stored_in_cents() {
        let store = memory_store();
        store.insert("Jake Ekaj", 3, amount("16.4749")).unwrap();

        assert_eq!(amount("16.47"), store.all().unwrap()[0].total_amount);
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.db");
        {
            let store =
                AggregateStore::open(&path, Rc::new(RecordingDiagnostics::new())).unwrap();
            store.insert("Jake Ekaj", 2, amount("5.5")).unwrap();
        }

        let store = AggregateStore::open(&path, Rc::new(RecordingDiagnostics::new())).unwrap();
        assert!(store.exists("Jake Ekaj").unwrap());
        assert_eq!(amount("5.5"), store.all().unwrap()[0].total_amount);
    }

    #[test]
    fn test_unstorable_amount_is_rejected() {
        let store = memory_store();
        let huge = amount("79228162514264337593543950335");

        assert!(matches!(
            store.insert("Jake Ekaj", 1, huge),
            Err(StoreError::InvalidAmount { name, .. }) if name == "Jake Ekaj"
        ));
        assert!(store.is_empty().unwrap());

        store.insert("Jake Ekaj", 1, amount("4.0")).unwrap();
        assert!(matches!(
            store.update("Jake Ekaj", 2, huge),
            Err(StoreError::InvalidAmount { .. })
        ));
        assert_eq!(
            vec![AggregateRecord {
                id: 1,
                name: "Jake Ekaj".to_string(),
                sale_count: 1,
                total_amount: amount("4.0"),
            }],
            store.all().unwrap()
        );
    }

    #[test]
    fn test_unreadable_row_is_skipped() {
        let diagnostics = Rc::new(RecordingDiagnostics::new());
        let store = AggregateStore::open_in_memory(diagnostics.clone()).unwrap();
        store.insert("Amy Yma", 3, amount("6.8")).unwrap();
        store
            .connection
            .execute(
                "INSERT INTO employees (name, sales, amount) VALUES ('Jake Ekaj', 1, ?1)",
                params![7.922_816_251_426_434e28_f64],
            )
            .unwrap();
        store.insert("Bob Bob", 6, amount("9.67")).unwrap();

        let names: Vec<String> = store
            .all()
            .unwrap()
            .into_iter()
            .map(|record| record.name)
            .collect();

        assert_eq!(vec!["Amy Yma", "Bob Bob"], names);
        let errors = diagnostics.messages(Level::Error);
        assert_eq!(1, errors.len());
        assert!(errors[0].starts_with("Skipping employees row 2 (Jake Ekaj)"));
    }
}
