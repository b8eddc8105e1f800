//! # Record Service
//!
//! Every read and write the tables perform goes through the [`RecordService`]
//! trait. The controllers in `commands/` never see how records are stored;
//! they await a call, then replace their list with whatever came back.
//!
//! ## Contract
//!
//! | Call                  | Result                                         |
//! |-----------------------|------------------------------------------------|
//! | `fetch_default_list`  | contacts of the scope account                  |
//! | `search_list`         | contacts of *other* accounts matching the key  |
//! | `upsert_records`      | `[status, message...]` (see [`crate::upsert`]) |
//! | `delete_record`       | nothing                                        |
//! | `fetch_accounts`      | every account                                  |
//! | `insert_account`      | the created account                            |
//! | `update_accounts`     | nothing                                        |
//! | `current_user_name`   | display name of the signed-in user             |
//!
//! An empty list is a successful answer. Failures come back as
//! [`CrmError::Service`](crate::error::CrmError::Service) carrying a message
//! fit for a notification body. Upserts are the exception: a rejected batch
//! is a *successful* call whose status tag is `"Error"`.
//!
//! ## Implementations
//!
//! - [`record_store::RecordStore`]: the bundled implementation, generic over a
//!   [`backend::StorageBackend`]
//!   - [`fs::FileService`]: JSON file (`data.json`) in the data directory
//!   - [`memory::InMemoryService`]: no persistence, used by tests
//!
//! The trait is `?Send`: the tables run on a single-threaded runtime and the
//! in-memory backend relies on `RefCell`.

use crate::error::Result;
use crate::model::{OperationKind, Record};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod record_store;

/// Form values for a new account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub active: String,
    pub phone: String,
}

#[async_trait(?Send)]
pub trait RecordService {
    /// Contacts belonging to the account `scope_id`.
    async fn fetch_default_list(&self, scope_id: &str) -> Result<Vec<Record>>;

    /// Contacts outside `scope_id` that match `key`.
    async fn search_list(&self, key: &str, scope_id: &str) -> Result<Vec<Record>>;

    /// Inserts or updates a batch. Returns the raw status/messages list.
    async fn upsert_records(&self, records: &[Record], op: OperationKind) -> Result<Vec<String>>;

    async fn delete_record(&self, id: &str) -> Result<()>;

    async fn fetch_accounts(&self) -> Result<Vec<Record>>;

    async fn insert_account(&self, account: &NewAccount) -> Result<Record>;

    async fn update_accounts(&self, records: &[Record]) -> Result<()>;

    async fn current_user_name(&self) -> Result<String>;
}

/// Lets several tables share one service.
#[async_trait(?Send)]
impl<S: RecordService + ?Sized> RecordService for Rc<S> {
    async fn fetch_default_list(&self, scope_id: &str) -> Result<Vec<Record>> {
        (**self).fetch_default_list(scope_id).await
    }

    async fn search_list(&self, key: &str, scope_id: &str) -> Result<Vec<Record>> {
        (**self).search_list(key, scope_id).await
    }

    async fn upsert_records(&self, records: &[Record], op: OperationKind) -> Result<Vec<String>> {
        (**self).upsert_records(records, op).await
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        (**self).delete_record(id).await
    }

    async fn fetch_accounts(&self) -> Result<Vec<Record>> {
        (**self).fetch_accounts().await
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<Record> {
        (**self).insert_account(account).await
    }

    async fn update_accounts(&self, records: &[Record]) -> Result<()> {
        (**self).update_accounts(records).await
    }

    async fn current_user_name(&self) -> Result<String> {
        (**self).current_user_name().await
    }
}
