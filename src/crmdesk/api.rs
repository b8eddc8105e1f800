//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for UI clients: it hands out table controllers wired to one
//! shared record service and runs the one-shot commands (config, init).
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Terminal I/O**: no stdout, stderr or formatting
//!
//! ## Generic Over RecordService
//!
//! `CrmApi<S: RecordService>` is generic over the service:
//! - Production: `CrmApi<FileService>`
//! - Testing: `CrmApi<InMemoryService>`
//!
//! The service is held in an `Rc` so an accounts table and a contacts table
//! can be open at the same time against the same data.

use crate::commands::accounts::AccountsTable;
use crate::commands::contacts::ContactsTable;
use crate::commands::{self, TableOptions};
use crate::config::CrmConfig;
use crate::error::Result;
use crate::notify::Notifier;
use crate::service::RecordService;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub struct CrmApi<S: RecordService> {
    service: Rc<S>,
    config: CrmConfig,
    data_dir: PathBuf,
}

impl<S: RecordService> CrmApi<S> {
    pub fn new(service: S, config: CrmConfig, data_dir: PathBuf) -> Self {
        Self {
            service: Rc::new(service),
            config,
            data_dir,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &CrmConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions::from_config(&self.config)
    }

    /// A contacts table scoped to the account `scope_id`. Nothing is fetched
    /// until `load` is called.
    pub fn contacts_table<N: Notifier>(
        &self,
        scope_id: &str,
        notifier: N,
    ) -> Result<ContactsTable<Rc<S>, N>> {
        ContactsTable::new(
            Rc::clone(&self.service),
            notifier,
            scope_id,
            &self.table_options(),
        )
    }

    pub fn accounts_table<N: Notifier>(&self, notifier: N) -> AccountsTable<Rc<S>, N> {
        AccountsTable::new(Rc::clone(&self.service), notifier)
    }

    pub fn update_config(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.data_dir, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn init(&mut self, user: Option<String>) -> Result<CmdResult> {
        let result = commands::init::run(&self.data_dir, user)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::{CmdMessage, CmdResult, MessageLevel, TableView};
