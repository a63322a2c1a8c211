//! Per-salesperson append-only sales log.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::numeric::CurrencyAmount;
use crate::paths::{employee_file, PathError, SALES_LOG_SUFFIX};

/// Label token written at the start of every beverage line.
pub const BEVERAGE_PREFIX: &str = "Beverage";
/// Label token written at the start of every addition line.
pub const ADDITION_PREFIX: &str = "Addition";

/// What was sold.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaleKind {
    /// A drink.
    Beverage,
    /// An ingredient added to a drink.
    Addition,
}

impl SaleKind {
    /// Label token the log line starts with.
    pub fn prefix(self) -> &'static str {
        match self {
            SaleKind::Beverage => BEVERAGE_PREFIX,
            SaleKind::Addition => ADDITION_PREFIX,
        }
    }
}

/// A single beverage or addition sold. Only its log line is ever stored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleEvent {
    kind: SaleKind,
    label: String,
    price: CurrencyAmount,
}

impl SaleEvent {
    /// Creates an event; the label is stored lowercased.
    pub fn new(kind: SaleKind, label: &str, price: CurrencyAmount) -> Self {
        Self {
            kind,
            label: label.to_lowercase(),
            price,
        }
    }

    /// Beverage or addition.
    pub fn kind(&self) -> SaleKind {
        self.kind
    }

    /// Lowercased item name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Price paid.
    pub fn price(&self) -> CurrencyAmount {
        self.price
    }
}

/// Renders the log line, e.g. `Beverage: tea. Price: 4.0$`.
impl Display for SaleEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}. Price: {}$",
            self.kind.prefix(),
            self.label,
            self.price
        )
    }
}

/// The sales log could not be opened, read or written.
#[derive(Debug)]
pub enum SalesLogError {
    /// The folder for the log could not be prepared.
    Path(PathError),
    /// An I/O operation on the log file failed.
    Io {
        /// The log file.
        path: PathBuf,
        /// Underlying failure.
        error: io::Error,
    },
}

impl Display for SalesLogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            SalesLogError::Path(err) => format!("Sales log path error: {}", err),
            SalesLogError::Io { path, error } => {
                format!("File {} not found or path is incorrect: {}", path.display(), error)
            }
        })
    }
}

impl From<PathError> for SalesLogError {
    fn from(err: PathError) -> Self {
        Self::Path(err)
    }
}

/// Handle on one salesperson's log file. Nothing is opened until a
/// method is called.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SalesLog {
    path: PathBuf,
}

impl SalesLog {
    /// Uses the log at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `<subfolder>/<fullname>_records.txt`, creating the subfolder.
    ///
    /// # Errors
    ///
    /// Fails if the subfolder cannot be created or a file occupies its path.
    pub fn for_employee(subfolder: &Path, fullname: &str) -> Result<Self, SalesLogError> {
        Ok(Self::new(employee_file(subfolder, fullname, SALES_LOG_SUFFIX)?))
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line and returns the full file content afterwards.
    pub fn append(&self, line: &str) -> Result<String, SalesLogError> {
        self.append_all(&[line])
    }

    /// Appends `lines` in order through a single open handle, flushes, and
    /// returns the full file content afterwards.
    ///
    /// # Errors
    ///
    /// Fails if the parent folder cannot be created, or the file cannot be
    /// opened, written or read back.
    pub fn append_all(&self, lines: &[&str]) -> Result<String, SalesLogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|error| self.io_error(error))?;

        let mut buffer = String::new();
        for line in lines {
            buffer.push_str(line);
            buffer.push('\n');
        }
        file.write_all(buffer.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|error| self.io_error(error))?;

        self.read_to_string()
    }

    /// All lines of the log, in file order.
    ///
    /// # Errors
    ///
    /// Fails if the log does not exist yet.
    pub fn read_all_lines(&self) -> Result<Vec<String>, SalesLogError> {
        Ok(self.read_to_string()?.lines().map(str::to_string).collect())
    }

    /// Counts every occurrence of each prefix token in the whole file. This
    /// is a substring count, so a line mentioning a token twice counts twice.
    pub fn count_by_prefix(
        &self,
        prefixes: &[&str],
    ) -> Result<BTreeMap<String, usize>, SalesLogError> {
        let content = self.read_to_string()?;
        Ok(prefixes
            .iter()
            .map(|prefix| (prefix.to_string(), content.matches(prefix).count()))
            .collect())
    }

    fn read_to_string(&self) -> Result<String, SalesLogError> {
        fs::read_to_string(&self.path).map_err(|error| self.io_error(error))
    }

    fn io_error(&self, error: io::Error) -> SalesLogError {
        SalesLogError::Io {
            path: self.path.clone(),
            error,
        }
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::str::FromStr;

    use crate::numeric::CurrencyAmount;
    use crate::sales_log::{
        SaleEvent, SaleKind, SalesLog, SalesLogError, ADDITION_PREFIX, BEVERAGE_PREFIX,
    };

    #[test]
    fn test_event_line() {
        let event = SaleEvent::new(
            SaleKind::Beverage,
            "Green Tea",
            CurrencyAmount::from_str("4").unwrap(),
        );
        assert_eq!("Beverage: green tea. Price: 4.0$", event.to_string());

        let event = SaleEvent::new(
            SaleKind::Addition,
            "MILK",
            CurrencyAmount::from_str("1.58").unwrap(),
        );
        assert_eq!("Addition: milk. Price: 1.58$", event.to_string());
    }

    #[test]
    fn test_append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let log = SalesLog::for_employee(&dir.path().join("records"), "Jake Ekaj").unwrap();

        let content = log.append("Beverage: tea. Price: 4.0$").unwrap();
        assert_eq!("Beverage: tea. Price: 4.0$\n", content);

        let content = log
            .append_all(&["Beverage: coffee. Price: 3.5$", "Addition: sugar. Price: 0.5$"])
            .unwrap();
        assert_eq!(
            "Beverage: tea. Price: 4.0$\nBeverage: coffee. Price: 3.5$\nAddition: sugar. Price: 0.5$\n",
            content
        );
        assert_eq!(content, fs::read_to_string(log.path()).unwrap());

        assert_eq!(
            vec![
                "Beverage: tea. Price: 4.0$",
                "Beverage: coffee. Price: 3.5$",
                "Addition: sugar. Price: 0.5$",
            ],
            log.read_all_lines().unwrap()
        );
    }

    #[test]
    fn test_read_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = SalesLog::new(dir.path().join("nobody_records.txt"));

        assert!(matches!(
            log.read_all_lines(),
            Err(SalesLogError::Io { .. })
        ));
        assert!(matches!(
            log.count_by_prefix(&[BEVERAGE_PREFIX]),
            Err(SalesLogError::Io { .. })
        ));
    }

    #[test]
    fn test_count_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let log = SalesLog::new(dir.path().join("log.txt"));
        log.append_all(&[
            "Beverage: tea. Price: 4.0$",
            "Addition: sugar. Price: 1.5$",
            "Beverage: coffee. Price: 3.0$",
            // Substring semantics: a label mentioning a token counts as well.
            "Beverage: Addition special. Price: 2.0$",
        ])
        .unwrap();

        let counts = log
            .count_by_prefix(&[BEVERAGE_PREFIX, ADDITION_PREFIX])
            .unwrap();

        assert_eq!(Some(&3), counts.get(BEVERAGE_PREFIX));
        assert_eq!(Some(&2), counts.get(ADDITION_PREFIX));
    }

    #[test]
    fn test_append_into_blocked_folder() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("records");
        fs::write(&blocker, "").unwrap();

        assert!(matches!(
            SalesLog::for_employee(&blocker, "Jake Ekaj"),
            Err(SalesLogError::Path(_))
        ));
        assert!(matches!(
            SalesLog::new(blocker.join("log.txt")).append("Beverage: tea. Price: 1.0$"),
            Err(SalesLogError::Io { .. })
        ));
    }
}
