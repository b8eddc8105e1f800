//! # Commands
//!
//! Stateful controllers for the two tables and the delete dialog. Each one
//! owns its list, its pagination and its pending edits, talks to a
//! [`RecordService`](crate::service::RecordService) for data and reports
//! every outcome through a [`Notifier`](crate::notify::Notifier).
//!
//! Controllers are driven through `&mut self`, one event at a time. A method
//! that awaits the service applies the answer before returning, so the next
//! event always sees the result of the previous one.

use crate::config::CrmConfig;
use crate::debounce::DEFAULT_SEARCH_DELAY;
use crate::error::Result;
use crate::model::{ColumnSet, Record};
use crate::pagination::{PaginationState, DEFAULT_PAGE_SIZE_OPTIONS};
use crate::search::Banner;
use std::time::Duration;

pub mod accounts;
pub mod config;
pub mod contacts;
pub mod delete;
pub mod drafts;
pub mod init;

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub config: Option<CrmConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_config(mut self, config: CrmConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Table settings taken from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub search_delay: Duration,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE_OPTIONS[0],
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            search_delay: DEFAULT_SEARCH_DELAY,
        }
    }
}

impl TableOptions {
    pub fn from_config(config: &CrmConfig) -> Self {
        Self {
            page_size: config.initial_page_size(),
            page_size_options: config.page_size_options.clone(),
            search_delay: config.search_delay(),
        }
    }

    pub(crate) fn pagination(&self) -> Result<PaginationState> {
        PaginationState::new(self.page_size)
    }
}

/// What a table shows right now: one page of rows plus its chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub card_title: String,
    pub banner: Banner,
    pub columns: ColumnSet,
    pub rows: Vec<Record>,
    pub pagination: PaginationState,
}

#[cfg(test)]
pub(crate) mod probe {
    //! A service double that counts calls and can be told to fail.

    use crate::error::{CrmError, Result};
    use crate::model::{OperationKind, Record};
    use crate::service::memory::InMemoryService;
    use crate::service::{NewAccount, RecordService};
    use async_trait::async_trait;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    pub struct ProbeService {
        pub inner: InMemoryService,
        pub search_calls: RefCell<Vec<String>>,
        pub default_calls: Cell<usize>,
        pub upsert_calls: RefCell<Vec<(Vec<Record>, OperationKind)>>,
        pub fail_with: RefCell<Option<String>>,
        pub upsert_reply: RefCell<Option<Vec<String>>>,
    }

    impl ProbeService {
        pub fn wrap(inner: InMemoryService) -> Self {
            Self {
                inner,
                ..Self::default()
            }
        }

        /// Every following call fails with `message` until [`Self::heal`].
        pub fn fail(&self, message: &str) {
            *self.fail_with.borrow_mut() = Some(message.to_string());
        }

        pub fn heal(&self) {
            *self.fail_with.borrow_mut() = None;
        }

        /// Upserts answer `reply` without touching the store, even while failing.
        pub fn reply_to_upserts(&self, reply: &[&str]) {
            *self.upsert_reply.borrow_mut() = Some(reply.iter().map(|s| s.to_string()).collect());
        }

        fn check(&self) -> Result<()> {
            match self.fail_with.borrow().as_ref() {
                Some(message) => Err(CrmError::Service(message.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait(?Send)]
    impl RecordService for ProbeService {
        async fn fetch_default_list(&self, scope_id: &str) -> Result<Vec<Record>> {
            self.default_calls.set(self.default_calls.get() + 1);
            self.check()?;
            self.inner.fetch_default_list(scope_id).await
        }

        async fn search_list(&self, key: &str, scope_id: &str) -> Result<Vec<Record>> {
            self.search_calls.borrow_mut().push(key.to_string());
            self.check()?;
            self.inner.search_list(key, scope_id).await
        }

        async fn upsert_records(&self, records: &[Record], op: OperationKind) -> Result<Vec<String>> {
            self.upsert_calls.borrow_mut().push((records.to_vec(), op));
            if let Some(reply) = self.upsert_reply.borrow().clone() {
                return Ok(reply);
            }
            self.check()?;
            self.inner.upsert_records(records, op).await
        }

        async fn delete_record(&self, id: &str) -> Result<()> {
            self.check()?;
            self.inner.delete_record(id).await
        }

        async fn fetch_accounts(&self) -> Result<Vec<Record>> {
            self.check()?;
            self.inner.fetch_accounts().await
        }

        async fn insert_account(&self, account: &NewAccount) -> Result<Record> {
            self.check()?;
            self.inner.insert_account(account).await
        }

        async fn update_accounts(&self, records: &[Record]) -> Result<()> {
            self.check()?;
            self.inner.update_accounts(records).await
        }

        async fn current_user_name(&self) -> Result<String> {
            self.check()?;
            self.inner.current_user_name().await
        }
    }
}
