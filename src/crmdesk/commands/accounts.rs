//! Accounts table: every account, inline edits, a small "new account" form
//! and the delete dialog.

use super::delete::{DeleteConfirmation, DeleteOutcome};
use super::drafts::Drafts;
use crate::error::{CrmError, Result};
use crate::model::{ColumnSet, Record};
use crate::notify::Notifier;
use crate::service::{NewAccount, RecordService};
use tracing::{debug, warn};

pub const UPDATED_MESSAGE: &str = "Account updated";
pub const UPDATE_FAILED_TITLE: &str = "Error updating the Account";
pub const EMPTY_NAME_MESSAGE: &str = "Account name cannot be empty.";
pub const CREATED_MESSAGE: &str = "Account created";
pub const CREATE_FAILED_TITLE: &str = "Error creating account";

pub struct AccountsTable<S: RecordService, N: Notifier> {
    service: S,
    notifier: N,
    list: Vec<Record>,
    drafts: Drafts,
    current_user_name: Option<String>,
    show_input_field: bool,
    form: NewAccount,
}

impl<S: RecordService, N: Notifier> AccountsTable<S, N> {
    pub fn new(service: S, notifier: N) -> Self {
        Self {
            service,
            notifier,
            list: Vec::new(),
            drafts: Drafts::new(),
            current_user_name: None,
            show_input_field: false,
            form: NewAccount::default(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        match self.service.fetch_accounts().await {
            Ok(list) => {
                debug!(count = list.len(), "accounts loaded");
                self.list = list;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "loading accounts failed");
                self.notifier.error("Error", &e.message());
                Err(e)
            }
        }
    }

    /// Looks up the signed-in user's name. A failure is only logged; the
    /// header simply stays blank.
    pub async fn load_current_user(&mut self) -> Option<&str> {
        match self.service.current_user_name().await {
            Ok(name) => self.current_user_name = Some(name),
            Err(e) => warn!(error = %e, "could not resolve current user"),
        }
        self.current_user_name.as_deref()
    }

    pub fn set_current_user_name(&mut self, name: impl Into<String>) {
        self.current_user_name = Some(name.into());
    }

    pub fn current_user_name(&self) -> Option<&str> {
        self.current_user_name.as_deref()
    }

    pub fn list(&self) -> &[Record] {
        &self.list
    }

    pub fn columns(&self) -> ColumnSet {
        ColumnSet::Accounts
    }

    /// Accounts with pending drafts shown in place.
    pub fn rows(&self) -> Vec<Record> {
        self.list.iter().map(|r| self.drafts.overlay(r)).collect()
    }

    // --- Inline edits ---

    pub fn set_draft(&mut self, id: &str, field: &str, value: &str) -> Result<()> {
        if !self.list.iter().any(|r| r.id() == Some(id)) {
            return Err(CrmError::RecordNotFound(id.to_string()));
        }
        self.drafts.set(ColumnSet::Accounts, id, field, value)
    }

    pub fn drafts(&self) -> &Drafts {
        &self.drafts
    }

    /// Saves every draft in one call. Drafts are kept if the call fails.
    pub async fn save(&mut self) -> Result<()> {
        if self.drafts.is_empty() {
            return Err(CrmError::Validation(
                "There are no Account changes to save".to_string(),
            ));
        }

        let records = self.drafts.records();
        debug!(count = records.len(), "updating accounts");
        if let Err(e) = self.service.update_accounts(&records).await {
            warn!(error = %e, "account update failed");
            self.notifier.error(UPDATE_FAILED_TITLE, &e.message());
            return Err(e);
        }

        self.drafts.clear();
        self.notifier.success("Success", UPDATED_MESSAGE);
        self.reload().await;
        Ok(())
    }

    // --- New account form ---

    pub fn toggle_form(&mut self) {
        self.show_input_field = !self.show_input_field;
    }

    pub fn show_input_field(&self) -> bool {
        self.show_input_field
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.form.phone = phone.into();
    }

    pub fn set_active(&mut self, active: impl Into<String>) {
        self.form.active = active.into();
    }

    pub fn form(&self) -> &NewAccount {
        &self.form
    }

    /// Creates an account from the form. A blank name is refused before the
    /// service is called. On success the form is cleared and hidden; on
    /// failure it is left as typed.
    pub async fn add_account(&mut self) -> Result<Record> {
        if self.form.name.trim().is_empty() {
            self.notifier.error("Error", EMPTY_NAME_MESSAGE);
            return Err(CrmError::Validation(EMPTY_NAME_MESSAGE.to_string()));
        }

        match self.service.insert_account(&self.form).await {
            Ok(record) => {
                self.notifier.success("Success", CREATED_MESSAGE);
                self.form = NewAccount::default();
                self.show_input_field = false;
                self.reload().await;
                Ok(record)
            }
            Err(e) => {
                warn!(error = %e, "account insert failed");
                self.notifier.error(CREATE_FAILED_TITLE, &e.message());
                Err(e)
            }
        }
    }

    // --- Delete ---

    /// Opens the delete dialog for a listed account.
    pub fn delete_dialog(&self, id: &str) -> Result<DeleteConfirmation> {
        let account = self
            .list
            .iter()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| CrmError::RecordNotFound(id.to_string()))?;
        DeleteConfirmation::for_account(account)
    }

    /// Passes a dialog button press through and reloads if the account went.
    pub async fn handle_delete(&mut self, dialog: &DeleteConfirmation, button: &str) -> DeleteOutcome {
        let outcome = dialog.handle_click(&self.service, &self.notifier, button).await;
        if outcome.deleted {
            self.drafts = Drafts::new();
            self.reload().await;
        }
        outcome
    }

    async fn reload(&mut self) {
        // `load` has already notified on failure.
        let _ = self.load().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::delete::{CANCEL_BUTTON, DELETE_BUTTON};
    use crate::commands::probe::ProbeService;
    use crate::model::fields;
    use crate::notify::{NotificationKind, RecordingNotifier};
    use crate::service::memory::fixtures::StoreFixture;
    use std::rc::Rc;

    type Table = AccountsTable<Rc<ProbeService>, RecordingNotifier>;

    async fn loaded(fixture: StoreFixture) -> (Table, Rc<ProbeService>, RecordingNotifier) {
        let probe = Rc::new(ProbeService::wrap(fixture.store));
        let notifier = RecordingNotifier::new();
        let mut table = AccountsTable::new(probe.clone(), notifier.clone());
        table.load().await.unwrap();
        (table, probe, notifier)
    }

    fn two_accounts() -> StoreFixture {
        StoreFixture::new()
            .with_account("001A", "Acme")
            .with_account("001B", "Globex")
            .with_user("Dana Admin")
    }

    #[tokio::test]
    async fn loads_accounts_and_user() {
        let (mut table, _, _) = loaded(two_accounts()).await;
        assert_eq!(table.list().len(), 2);
        assert_eq!(table.load_current_user().await, Some("Dana Admin"));
    }

    #[tokio::test]
    async fn current_user_failure_is_silent() {
        let (mut table, probe, notifier) = loaded(two_accounts()).await;
        probe.fail("No access");
        assert_eq!(table.load_current_user().await, None);
        assert!(notifier.all().is_empty());

        table.set_current_user_name("Typed Name");
        assert_eq!(table.current_user_name(), Some("Typed Name"));
    }

    #[tokio::test]
    async fn save_updates_and_reloads() {
        let (mut table, _, notifier) = loaded(two_accounts()).await;
        table.set_draft("001B", fields::RATING, "Warm").unwrap();
        assert_eq!(table.rows()[1].get(fields::RATING), Some("Warm"));

        table.save().await.unwrap();

        assert!(table.drafts().is_empty());
        assert_eq!(table.list()[1].get(fields::RATING), Some("Warm"));
        let last = notifier.last().unwrap();
        assert_eq!(last.title, "Success");
        assert_eq!(last.message, UPDATED_MESSAGE);
    }

    #[tokio::test]
    async fn failed_save_keeps_drafts() {
        let (mut table, _, notifier) = loaded(two_accounts()).await;
        table.set_draft("001A", fields::NAME, " ").unwrap();

        assert!(table.save().await.is_err());

        assert_eq!(table.drafts().len(), 1);
        assert_eq!(table.list()[0].get(fields::NAME), Some("Acme"));
        let last = notifier.last().unwrap();
        assert_eq!(last.kind, NotificationKind::Error);
        assert_eq!(last.title, UPDATE_FAILED_TITLE);
        assert_eq!(last.message, "Required fields are missing: [Name]");
    }

    #[tokio::test]
    async fn id_column_is_read_only() {
        let (mut table, _, _) = loaded(two_accounts()).await;
        assert!(matches!(
            table.set_draft("001A", fields::ID, "001Z"),
            Err(CrmError::Validation(_))
        ));
        assert!(matches!(
            table.set_draft("001Z", fields::NAME, "Nope"),
            Err(CrmError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn blank_name_never_reaches_service() {
        let (mut table, probe, notifier) = loaded(StoreFixture::new()).await;
        table.toggle_form();
        table.set_name("   ");

        let err = table.add_account().await.unwrap_err();

        assert!(matches!(err, CrmError::Validation(_)));
        assert_eq!(notifier.last().unwrap().message, EMPTY_NAME_MESSAGE);
        assert!(table.show_input_field());
        assert!(probe.inner.fetch_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_account_resets_form() {
        let (mut table, _, notifier) = loaded(StoreFixture::new()).await;
        table.toggle_form();
        table.set_name("Initech");
        table.set_phone("555-0199");
        table.set_active("Yes");

        let created = table.add_account().await.unwrap();

        assert_eq!(created.get(fields::ACTIVE), Some("Yes"));
        assert_eq!(table.form(), &NewAccount::default());
        assert!(!table.show_input_field());
        assert_eq!(table.list().len(), 1);
        assert_eq!(notifier.last().unwrap().message, CREATED_MESSAGE);
    }

    #[tokio::test]
    async fn failed_insert_keeps_form() {
        let (mut table, probe, notifier) = loaded(StoreFixture::new()).await;
        table.toggle_form();
        table.set_name("Initech");
        probe.fail("Insert failed: storage full");

        assert!(table.add_account().await.is_err());

        assert_eq!(table.form().name, "Initech");
        assert!(table.show_input_field());
        let last = notifier.last().unwrap();
        assert_eq!(last.title, CREATE_FAILED_TITLE);
        assert_eq!(last.message, "Insert failed: storage full");
    }

    #[tokio::test]
    async fn delete_through_dialog_reloads() {
        let (mut table, _, _) = loaded(two_accounts()).await;
        let dialog = table.delete_dialog("001A").unwrap();

        let kept = table.handle_delete(&dialog, CANCEL_BUTTON).await;
        assert!(!kept.deleted);
        assert_eq!(table.list().len(), 2);

        let gone = table.handle_delete(&dialog, DELETE_BUTTON).await;
        assert!(gone.deleted);
        assert_eq!(gone.close_result, "ended");
        assert_eq!(table.list().len(), 1);
        assert!(table.delete_dialog("001A").is_err());
    }
}
