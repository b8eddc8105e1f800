//! Contacts table of an account.
//!
//! The table shows either the scope account's own contacts or the result of a
//! search over other accounts' contacts, one page at a time. Inline edits
//! collect as drafts until saved as an `Updated` upsert; rows typed into the
//! new-contact form are saved as an `Inserted` upsert.
//!
//! Search input is debounced. [`ContactsTable::on_search_input`] only arms the
//! timer; the owner's event loop waits on [`ContactsTable::debounced_key`] and
//! hands the key back to [`ContactsTable::perform_search`]. Tests and one-shot
//! callers can use [`ContactsTable::run_pending_search`] for both steps.

use super::drafts::{Drafts, NEW_CONTACT_FIELDS};
use super::{TableOptions, TableView};
use crate::debounce::Debouncer;
use crate::error::{CrmError, Result};
use crate::model::{fields, ColumnSet, OperationKind, Record};
use crate::notify::{NotificationKind, Notifier};
use crate::pagination::{recompute, PaginationState};
use crate::search::{Banner, SearchState};
use crate::service::RecordService;
use crate::upsert::UpsertResult;
use tracing::{debug, info, warn};

pub const ERROR_TITLE: &str = "Error";
pub const SUCCESS_TITLE: &str = "Success";
pub const REFRESH_MESSAGE: &str = "Search cleared and Contacts datatable re-initialized";
pub const RELOAD_FAILED_MESSAGE: &str =
    "An error occurred while trying to fetch the updated searched results";
pub const ASSIGN_OUTSIDE_SEARCH_MESSAGE: &str =
    "Only Contacts found by a search can be assigned to this Account";
pub const ASSIGNED_MESSAGE: &str = "Successfully assigned Contact to current Account Record";

pub struct ContactsTable<S: RecordService, N: Notifier> {
    service: S,
    notifier: N,
    scope_id: String,
    list: Vec<Record>,
    search: SearchState,
    /// What is typed in the search box, which may be ahead of `search.key`.
    search_key: String,
    pagination: PaginationState,
    page_size_options: Vec<usize>,
    drafts: Drafts,
    new_contacts: Vec<Record>,
    show_input_field: bool,
    debouncer: Debouncer<String>,
}

fn notification_kind(result: &UpsertResult) -> NotificationKind {
    if result.is_success() {
        NotificationKind::Success
    } else {
        NotificationKind::Error
    }
}

impl<S: RecordService, N: Notifier> ContactsTable<S, N> {
    pub fn new(
        service: S,
        notifier: N,
        scope_id: impl Into<String>,
        options: &TableOptions,
    ) -> Result<Self> {
        Ok(Self {
            service,
            notifier,
            scope_id: scope_id.into(),
            list: Vec::new(),
            search: SearchState::inactive(),
            search_key: String::new(),
            pagination: options.pagination()?,
            page_size_options: options.page_size_options.clone(),
            drafts: Drafts::new(),
            new_contacts: Vec::new(),
            show_input_field: false,
            debouncer: Debouncer::new(options.search_delay),
        })
    }

    // --- Loading & search ---

    /// Fetches the scope account's contacts.
    pub async fn load(&mut self) -> Result<()> {
        debug!(scope_id = %self.scope_id, "loading contacts");
        match self.service.fetch_default_list(&self.scope_id).await {
            Ok(list) => {
                self.replace_list(list, SearchState::inactive());
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Handles a keystroke in the search box. A non-empty key (re)arms the
    /// debounce timer; an empty key cancels it and goes back to the default
    /// list right away.
    pub async fn on_search_input(&mut self, key: &str) -> Result<()> {
        self.search_key = key.to_string();
        if key.is_empty() {
            self.debouncer.cancel();
            return self.refresh().await;
        }
        self.debouncer.schedule(key.to_string());
        Ok(())
    }

    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Resolves with the key once the search box has been quiet long enough.
    /// Cancel-safe, so it can sit in a `select!`.
    pub async fn debounced_key(&mut self) -> String {
        self.debouncer.fired().await
    }

    /// Waits out the debounce and runs the search it produced.
    pub async fn run_pending_search(&mut self) -> Result<()> {
        let key = self.debounced_key().await;
        self.perform_search(&key).await
    }

    /// Searches other accounts' contacts for `key` and shows the results.
    /// On failure the current list and search state are kept.
    pub async fn perform_search(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return self.refresh().await;
        }

        debug!(key, scope_id = %self.scope_id, "searching contacts");
        match self.service.search_list(key, &self.scope_id).await {
            Ok(list) => {
                let count = list.len();
                info!(key, count, "contact search finished");
                self.replace_list(list, SearchState::from_results(key, count));
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Clears the search and reloads the default list.
    pub async fn refresh(&mut self) -> Result<()> {
        self.debouncer.cancel();
        match self.service.fetch_default_list(&self.scope_id).await {
            Ok(list) => {
                self.search_key.clear();
                self.replace_list(list, SearchState::inactive());
                self.notifier.success(SUCCESS_TITLE, REFRESH_MESSAGE);
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    // --- Saving ---

    /// Records an inline edit on a row of the current list.
    pub fn set_draft(&mut self, id: &str, field: &str, value: &str) -> Result<()> {
        if !self.list.iter().any(|r| r.id() == Some(id)) {
            return Err(CrmError::RecordNotFound(id.to_string()));
        }
        let columns = self.columns();
        self.drafts.set(columns, id, field, value)
    }

    pub fn discard_drafts(&mut self) {
        self.drafts.clear();
    }

    /// Sends the pending rows as one upsert: inline drafts for `Updated`, the
    /// new-contact form for `Inserted`.
    ///
    /// The notification title is the status tag the service returned. A
    /// rejected batch comes back as `Ok` with a failure result, and leaves
    /// drafts, form and list as they were.
    pub async fn save(&mut self, op: OperationKind) -> Result<UpsertResult> {
        let records = match op {
            OperationKind::Updated => self.drafts.records(),
            OperationKind::Inserted => self.new_contacts.clone(),
        };
        if records.is_empty() {
            let err = CrmError::Validation("There are no Contact changes to save".to_string());
            return Err(self.report(err));
        }

        debug!(%op, count = records.len(), "saving contacts");
        let result = match self
            .service
            .upsert_records(&records, op)
            .await
            .and_then(UpsertResult::decode)
        {
            Ok(result) => result,
            Err(e) => return Err(self.report(e)),
        };

        self.notifier
            .notify(notification_kind(&result), &result.status, &result.message());
        if !result.is_success() {
            warn!(%op, status = %result.status, "upsert rejected");
            return Ok(result);
        }

        match op {
            OperationKind::Inserted => {
                self.new_contacts.clear();
                self.show_input_field = false;
                self.clear_search_input();
                self.reload_list(false).await;
            }
            OperationKind::Updated => {
                self.drafts.clear();
                self.reload_list(true).await;
            }
        }
        Ok(result)
    }

    /// Moves a contact from another account to the scope account. Only rows
    /// of a search result carry the assign button.
    pub async fn assign_to_account(&mut self, contact_id: &str) -> Result<UpsertResult> {
        if self.columns() != ColumnSet::ContactSearch {
            let err = CrmError::Validation(ASSIGN_OUTSIDE_SEARCH_MESSAGE.to_string());
            return Err(self.report(err));
        }
        if !self.list.iter().any(|r| r.id() == Some(contact_id)) {
            return Err(CrmError::RecordNotFound(contact_id.to_string()));
        }

        let record = Record::with_id(contact_id).with(fields::ACCOUNT_ID, self.scope_id.clone());
        debug!(contact_id, scope_id = %self.scope_id, "assigning contact");
        let result = match self
            .service
            .upsert_records(&[record], OperationKind::Updated)
            .await
            .and_then(UpsertResult::decode)
        {
            Ok(result) => result,
            Err(e) => return Err(self.report(e)),
        };

        if !result.is_success() {
            self.notifier.error(&result.status, &result.message());
            return Ok(result);
        }

        self.notifier.success(&result.status, ASSIGNED_MESSAGE);
        self.clear_search_input();
        self.reload_list(false).await;
        Ok(result)
    }

    // --- New-contact form ---

    /// Appends a blank row to the form and shows it. Returns the row index.
    pub fn add_contact(&mut self) -> usize {
        let mut row: Record = NEW_CONTACT_FIELDS.iter().map(|f| (*f, "")).collect();
        row.set(fields::ACCOUNT_ID, self.scope_id.clone());
        self.new_contacts.push(row);
        self.show_input_field = true;
        self.new_contacts.len() - 1
    }

    pub fn set_new_contact_field(&mut self, index: usize, field: &str, value: &str) -> Result<()> {
        if !NEW_CONTACT_FIELDS.contains(&field) {
            return Err(CrmError::Validation(format!(
                "Field is not editable: {}",
                field
            )));
        }
        let row = self
            .new_contacts
            .get_mut(index)
            .ok_or_else(|| CrmError::Validation(format!("No new Contact row {}", index)))?;
        row.set(field, value);
        Ok(())
    }

    /// Drops a row from the form; the form hides once it is empty.
    pub fn remove_contact(&mut self, index: usize) -> Result<Record> {
        if index >= self.new_contacts.len() {
            return Err(CrmError::Validation(format!("No new Contact row {}", index)));
        }
        let removed = self.new_contacts.remove(index);
        self.show_input_field = !self.new_contacts.is_empty();
        Ok(removed)
    }

    pub fn new_contacts(&self) -> &[Record] {
        &self.new_contacts
    }

    pub fn show_input_field(&self) -> bool {
        self.show_input_field
    }

    // --- Pagination ---

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        self.pagination = self.pagination.with_page_size(page_size)?;
        self.recompute();
        Ok(())
    }

    pub fn first_page(&mut self) {
        self.pagination = self.pagination.first();
        self.recompute();
    }

    pub fn previous_page(&mut self) {
        self.pagination = self.pagination.previous();
        self.recompute();
    }

    pub fn next_page(&mut self) {
        self.pagination = self.pagination.next();
        self.recompute();
    }

    pub fn last_page(&mut self) {
        self.pagination = self.pagination.last();
        self.recompute();
    }

    /// Jumps to `page`, clamped into range.
    pub fn go_to_page(&mut self, page: usize) {
        self.pagination.page_number = page;
        self.recompute();
    }

    // --- State ---

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    pub fn list(&self) -> &[Record] {
        &self.list
    }

    pub fn visible_records(&self) -> &[Record] {
        recompute(&self.list, self.pagination).0
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    pub fn drafts(&self) -> &Drafts {
        &self.drafts
    }

    pub fn columns(&self) -> ColumnSet {
        self.search.columns()
    }

    pub fn banner(&self) -> Banner {
        self.search.banner()
    }

    pub fn card_title(&self) -> &'static str {
        self.search.card_title()
    }

    /// The current page with pending drafts shown in place.
    pub fn view(&self) -> TableView {
        TableView {
            card_title: self.card_title().to_string(),
            banner: self.banner(),
            columns: self.columns(),
            rows: self
                .visible_records()
                .iter()
                .map(|r| self.drafts.overlay(r))
                .collect(),
            pagination: self.pagination,
        }
    }

    // --- Internals ---

    fn replace_list(&mut self, list: Vec<Record>, search: SearchState) {
        self.list = list;
        self.search = search;
        self.recompute();
    }

    fn recompute(&mut self) {
        let (_, state) = recompute(&self.list, self.pagination);
        self.pagination = state;
    }

    fn clear_search_input(&mut self) {
        self.debouncer.cancel();
        self.search_key.clear();
    }

    /// Reloads after a successful save. With `keep_search` an active search
    /// is re-run; otherwise the default list comes back and the search ends.
    /// A failed reload is notified and the current list kept.
    async fn reload_list(&mut self, keep_search: bool) {
        let reloaded = if keep_search && self.search.active {
            let key = self.search.key.clone();
            self.service
                .search_list(&key, &self.scope_id)
                .await
                .map(|list| {
                    let count = list.len();
                    (list, SearchState::from_results(key, count))
                })
        } else {
            self.service
                .fetch_default_list(&self.scope_id)
                .await
                .map(|list| (list, SearchState::inactive()))
        };

        match reloaded {
            Ok((list, search)) => self.replace_list(list, search),
            Err(e) => {
                warn!(error = %e, "reload after save failed");
                self.notifier.error(ERROR_TITLE, RELOAD_FAILED_MESSAGE);
            }
        }
    }

    /// Notifies `err` and hands it back for propagation.
    fn report(&self, err: CrmError) -> CrmError {
        warn!(error = %err, scope_id = %self.scope_id, "contacts action failed");
        self.notifier.error(ERROR_TITLE, &err.message());
        err
    }
}
