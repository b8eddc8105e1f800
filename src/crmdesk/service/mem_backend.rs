use super::backend::{Dataset, StorageBackend};
use crate::error::{CrmError, Result};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the tables are
/// single-threaded. The failure switches let tests drive the error paths of
/// the controllers.
#[derive(Default)]
pub struct MemBackend {
    dataset: RefCell<Dataset>,
    simulate_read_error: Cell<bool>,
    simulate_write_error: Cell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: RefCell::new(dataset),
            ..Self::default()
        }
    }

    /// Makes every subsequent load fail.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.set(simulate);
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Copy of what is currently stored, bypassing the failure switches.
    pub fn snapshot(&self) -> Dataset {
        self.dataset.borrow().clone()
    }
}

impl StorageBackend for MemBackend {
    fn load(&self) -> Result<Dataset> {
        if self.simulate_read_error.get() {
            return Err(CrmError::Store("Simulated read error".to_string()));
        }
        Ok(self.dataset.borrow().clone())
    }

    fn save(&self, dataset: &Dataset) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(CrmError::Store("Simulated write error".to_string()));
        }
        *self.dataset.borrow_mut() = dataset.clone();
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory://data.json")
    }
}
