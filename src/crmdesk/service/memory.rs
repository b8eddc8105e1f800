use super::backend::Dataset;
use super::mem_backend::MemBackend;
use super::record_store::RecordStore;

pub type InMemoryService = RecordStore<MemBackend>;

impl Default for InMemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryService {
    pub fn new() -> Self {
        RecordStore::with_backend(MemBackend::new())
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        RecordStore::with_backend(MemBackend::with_dataset(dataset))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{fields, Record};

    /// Builds an [`InMemoryService`] with known ids, so tests can address
    /// records without reading them back first.
    pub struct StoreFixture {
        dataset: Dataset,
        pub store: InMemoryService,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                dataset: Dataset::default(),
                store: InMemoryService::new(),
            }
        }

        fn rebuild(mut self) -> Self {
            self.store = InMemoryService::with_dataset(self.dataset.clone());
            self
        }

        pub fn with_account(mut self, id: &str, name: &str) -> Self {
            self.dataset
                .accounts
                .push(Record::with_id(id).with(fields::NAME, name));
            self.rebuild()
        }

        pub fn with_contact(
            mut self,
            id: &str,
            account_id: &str,
            first: &str,
            last: &str,
            email: &str,
        ) -> Self {
            let mut record = Record::with_id(id)
                .with(fields::ACCOUNT_ID, account_id)
                .with(fields::FIRST_NAME, first)
                .with(fields::LAST_NAME, last);
            if !email.is_empty() {
                record.set(fields::EMAIL, email);
            }
            self.dataset.contacts.push(record);
            self.rebuild()
        }

        /// Adds `count` contacts to `account_id`, ids `<account_id>-C1`,
        /// `<account_id>-C2`, ...
        pub fn with_contacts(mut self, account_id: &str, count: usize) -> Self {
            for i in 1..=count {
                self.dataset.contacts.push(
                    Record::with_id(format!("{}-C{}", account_id, i))
                        .with(fields::ACCOUNT_ID, account_id)
                        .with(fields::LAST_NAME, format!("Contact {}", i)),
                );
            }
            self.rebuild()
        }

        pub fn with_user(mut self, name: &str) -> Self {
            self.dataset.current_user = Some(name.to_string());
            self.rebuild()
        }
    }
}
