//! Persistence for equations and their verified roots.
//!
//! The console saves every syntactically valid equation and every
//! candidate value that actually checked out as a root. Everything lives
//! in one JSON document on disk, loaded when the store opens and
//! rewritten after each mutation.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    fs, io,
    path::PathBuf,
};

/// A stored equation and its assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationRecord {
    pub id: u64,
    pub expression: String,
}

/// A verified root of a stored equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootRecord {
    pub id: u64,
    pub equation_id: u64,
    pub value: f64,
}

/// Things that can go wrong while reading or writing the store.
#[derive(Debug)]
pub enum StoreError {
    /// The equation already has this exact root value saved.
    DuplicateRoot,
    /// A root referenced an equation id that isn't stored.
    UnknownEquation(u64),
    Io(io::Error),
    Format(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateRoot => {
                write!(f, "this root is already saved for the equation")
            },
            StoreError::UnknownEquation(id) => {
                write!(f, "no equation is stored under id {}", id)
            },
            StoreError::Io(inner) => write!(f, "store I/O failed: {}", inner),
            StoreError::Format(inner) => {
                write!(f, "the data file is not valid: {}", inner)
            },
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Io(inner) => Some(inner),
            StoreError::Format(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self { StoreError::Io(e) }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self { StoreError::Format(e) }
}

/// The repository operations the console is written against.
pub trait EquationRepository {
    /// Store a new equation, assigning it the next free id.
    fn save_new_equation(
        &mut self,
        expression: &str,
    ) -> Result<EquationRecord, StoreError>;

    fn find_equation_by_id(&self, id: u64) -> Option<EquationRecord>;

    /// All saved roots of one equation, ordered by id.
    fn find_roots_by_equation_id(&self, equation_id: u64) -> Vec<RootRecord>;

    /// Store a verified root. The same value may not be saved twice for
    /// one equation.
    fn save_new_root(
        &mut self,
        equation_id: u64,
        value: f64,
    ) -> Result<RootRecord, StoreError>;

    /// Equations that have `value` saved as a root, ordered by id.
    ///
    /// The comparison is exact; tolerance belongs to the checker, not
    /// the store.
    fn find_equations_by_root_value(&self, value: f64) -> Vec<EquationRecord>;

    /// Equations with exactly one saved root, ordered by id.
    fn find_equations_with_single_saved_root(&self) -> Vec<EquationRecord>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    equations: Vec<EquationRecord>,
    roots: Vec<RootRecord>,
}

/// An [`EquationRepository`] backed by a single JSON file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    document: Document,
}

impl JsonStore {
    /// Open a store, starting empty when the file doesn't exist yet.
    /// The file itself is created on the first save.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<JsonStore, StoreError> {
        let path = path.into();

        let document = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no data file at {:?}, starting empty", path);
                Document::default()
            },
            Err(e) => return Err(StoreError::Io(e)),
        };

        Ok(JsonStore { path, document })
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(&self.document)?;
        fs::write(&self.path, contents)?;

        Ok(())
    }

    fn next_equation_id(&self) -> u64 {
        self.document
            .equations
            .iter()
            .map(|equation| equation.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn next_root_id(&self) -> u64 {
        self.document
            .roots
            .iter()
            .map(|root| root.id)
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl EquationRepository for JsonStore {
    fn save_new_equation(
        &mut self,
        expression: &str,
    ) -> Result<EquationRecord, StoreError> {
        let record = EquationRecord {
            id: self.next_equation_id(),
            expression: String::from(expression),
        };
        debug!("saving equation {:?}", record);

        self.document.equations.push(record.clone());
        self.persist()?;

        Ok(record)
    }

    fn find_equation_by_id(&self, id: u64) -> Option<EquationRecord> {
        self.document
            .equations
            .iter()
            .find(|equation| equation.id == id)
            .cloned()
    }

    fn find_roots_by_equation_id(&self, equation_id: u64) -> Vec<RootRecord> {
        self.document
            .roots
            .iter()
            .filter(|root| root.equation_id == equation_id)
            .cloned()
            .collect()
    }

    fn save_new_root(
        &mut self,
        equation_id: u64,
        value: f64,
    ) -> Result<RootRecord, StoreError> {
        if self.find_equation_by_id(equation_id).is_none() {
            return Err(StoreError::UnknownEquation(equation_id));
        }

        let duplicate = self
            .document
            .roots
            .iter()
            .any(|root| root.equation_id == equation_id && root.value == value);
        if duplicate {
            return Err(StoreError::DuplicateRoot);
        }

        let record = RootRecord {
            id: self.next_root_id(),
            equation_id,
            value,
        };
        debug!("saving root {:?}", record);

        self.document.roots.push(record.clone());
        self.persist()?;

        Ok(record)
    }

    fn find_equations_by_root_value(&self, value: f64) -> Vec<EquationRecord> {
        self.document
            .equations
            .iter()
            .filter(|equation| {
                self.document.roots.iter().any(|root| {
                    root.equation_id == equation.id && root.value == value
                })
            })
            .cloned()
            .collect()
    }

    fn find_equations_with_single_saved_root(&self) -> Vec<EquationRecord> {
        self.document
            .equations
            .iter()
            .filter(|equation| {
                let count = self
                    .document
                    .roots
                    .iter()
                    .filter(|root| root.equation_id == equation.id)
                    .count();

                count == 1
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

    /// A data file path nothing else in this test run is using.
    fn scratch_file() -> PathBuf {
        let unique = NEXT_FILE.fetch_add(1, Ordering::SeqCst);

        std::env::temp_dir().join(format!(
            "eqcheck-store-{}-{}.json",
            std::process::id(),
            unique
        ))
    }

    fn populated_store(path: &PathBuf) -> JsonStore {
        let mut store = JsonStore::open(path.clone()).unwrap();
        store.save_new_equation("2*x+5=17").unwrap();
        store.save_new_equation("x = 1").unwrap();
        store.save_new_root(1, 6.0).unwrap();
        store.save_new_root(2, 1.0).unwrap();
        store.save_new_root(2, -1.0).unwrap();
        store
    }

    #[test]
    fn ids_are_assigned_in_increasing_order() {
        let path = scratch_file();
        let mut store = JsonStore::open(path.clone()).unwrap();

        let first = store.save_new_equation("x = 1").unwrap();
        let second = store.save_new_equation("x = 2").unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn a_saved_equation_can_be_found_by_id() {
        let path = scratch_file();
        let store = populated_store(&path);

        let got = store.find_equation_by_id(1).unwrap();
        assert_eq!(got.expression, "2*x+5=17");
        assert!(store.find_equation_by_id(99).is_none());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn roots_are_listed_per_equation_in_id_order() {
        let path = scratch_file();
        let store = populated_store(&path);

        let got = store.find_roots_by_equation_id(2);

        let values: Vec<f64> = got.iter().map(|root| root.value).collect();
        assert_eq!(values, vec![1.0, -1.0]);
        assert!(got[0].id < got[1].id);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn the_same_root_value_is_rejected_the_second_time() {
        let path = scratch_file();
        let mut store = populated_store(&path);

        let got = store.save_new_root(1, 6.0).unwrap_err();

        assert!(matches!(got, StoreError::DuplicateRoot));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn roots_of_missing_equations_are_rejected() {
        let path = scratch_file();
        let mut store = JsonStore::open(path.clone()).unwrap();

        let got = store.save_new_root(7, 1.0).unwrap_err();

        assert!(matches!(got, StoreError::UnknownEquation(7)));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn equations_are_found_by_exact_root_value() {
        let path = scratch_file();
        let store = populated_store(&path);

        let got = store.find_equations_by_root_value(6.0);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, 1);

        assert!(store.find_equations_by_root_value(6.00001).is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn single_root_query_counts_exactly_one() {
        let path = scratch_file();
        let store = populated_store(&path);

        let got = store.find_equations_with_single_saved_root();

        // equation 2 has two roots saved, equation 1 has one
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, 1);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn reopening_the_data_file_restores_every_record() {
        let path = scratch_file();
        let saved = populated_store(&path);

        let reopened = JsonStore::open(path.clone()).unwrap();

        assert_eq!(reopened.document.equations, saved.document.equations);
        assert_eq!(reopened.document.roots, saved.document.roots);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn opening_a_missing_file_starts_empty_without_creating_it() {
        let path = scratch_file();

        let store = JsonStore::open(path.clone()).unwrap();

        assert!(store.document.equations.is_empty());
        assert!(!path.exists());
    }
}
