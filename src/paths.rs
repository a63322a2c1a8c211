use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the shared aggregate database.
pub const DATABASE_FILE: &str = "employees.db";
/// Folder holding one sales log per salesperson.
pub const SALESPERSON_RECORDS: &str = "salesperson_records";
/// Folder holding manager exports.
pub const MANAGER_RECORDS: &str = "manager_records";

/// Suffix of a salesperson's sales log.
pub const SALES_LOG_SUFFIX: &str = "_records.txt";

/// The folder for an employee file could not be prepared.
#[derive(Debug)]
pub enum PathError {
    /// Part of the folder path exists but is not a directory.
    NotADirectory(PathBuf),
    /// The folder could not be created.
    CreateFailed {
        /// Folder that was being created.
        path: PathBuf,
        /// Underlying failure.
        error: io::Error,
    },
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            PathError::NotADirectory(path) => format!(
                "Target subfolder '{}' exists, but it is not a directory",
                path.display()
            ),
            PathError::CreateFailed { path, error } => {
                format!("Failed to create folder '{}': {}", path.display(), error)
            }
        })
    }
}

/// Builds `<subfolder>/<fullname><suffix>`, creating `subfolder` (and any
/// missing parents) first.
///
/// # Errors
///
/// [`PathError::NotADirectory`] if a regular file sits where one of the
/// folders should be.
pub fn employee_file(subfolder: &Path, fullname: &str, suffix: &str) -> Result<PathBuf, PathError> {
    if let Some(blocker) = subfolder
        .ancestors()
        .find(|ancestor| ancestor.exists() && !ancestor.is_dir())
    {
        return Err(PathError::NotADirectory(blocker.to_path_buf()));
    }

    fs::create_dir_all(subfolder).map_err(|error| PathError::CreateFailed {
        path: subfolder.to_path_buf(),
        error,
    })?;

    Ok(subfolder.join(format!("{}{}", fullname, suffix)))
}

/// Where everything lives, relative to one data directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Lays out storage under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The SQLite file holding the aggregate table.
    pub fn database(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    /// Folder of per-salesperson sales logs.
    pub fn salesperson_records(&self) -> PathBuf {
        self.root.join(SALESPERSON_RECORDS)
    }

    /// Folder of manager exports.
    pub fn manager_records(&self) -> PathBuf {
        self.root.join(MANAGER_RECORDS)
    }

    /// Path of the sales log for `fullname`, creating its folder.
    pub fn sales_log(&self, fullname: &str) -> Result<PathBuf, PathError> {
        employee_file(&self.salesperson_records(), fullname, SALES_LOG_SUFFIX)
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use crate::paths::{employee_file, PathError, StorageLayout};

    #[test]
    fn test_employee_file_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let subfolder = dir.path().join("nested").join("salesperson_records");

        let path = employee_file(&subfolder, "Jim Mij", "_records.txt").unwrap();

        assert_eq!(subfolder.join("Jim Mij_records.txt"), path);
        assert!(subfolder.is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn test_employee_file_rejects_file_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("salesperson_records");
        fs::write(&blocker, "not a folder").unwrap();

        assert!(matches!(
            employee_file(&blocker, "Jim Mij", "_records.txt"),
            Err(PathError::NotADirectory(path)) if path == blocker
        ));
        assert!(matches!(
            employee_file(&blocker.join("deeper"), "Jim Mij", "_records.txt"),
            Err(PathError::NotADirectory(path)) if path == blocker
        ));
    }

    #[test]
    fn test_layout() {
        let layout = StorageLayout::new("/srv/coffee");
        assert_eq!("/srv/coffee/employees.db", layout.database().to_str().unwrap());
        assert_eq!(
            "/srv/coffee/manager_records",
            layout.manager_records().to_str().unwrap()
        );

        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path());
        assert_eq!(
            dir.path().join("salesperson_records").join("Jake Ekaj_records.txt"),
            layout.sales_log("Jake Ekaj").unwrap()
        );
    }
}
