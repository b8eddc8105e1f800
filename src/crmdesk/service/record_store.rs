use super::backend::{Dataset, StorageBackend};
use super::{NewAccount, RecordService};
use crate::error::{CrmError, Result};
use crate::model::{fields, OperationKind, Record};
use crate::upsert::UpsertResult;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

const ACCOUNT_ID_PREFIX: &str = "001";
const CONTACT_ID_PREFIX: &str = "003";

/// Contact fields a search key is matched against.
const SEARCH_FIELDS: [&str; 4] = [
    fields::FIRST_NAME,
    fields::LAST_NAME,
    fields::EMAIL,
    fields::PHONE,
];

/// The bundled [`RecordService`]: record rules on top of a storage backend.
///
/// Each call loads the dataset, works on the copy and saves it back only when
/// the whole call succeeded, so a rejected batch leaves storage untouched.
pub struct RecordStore<B: StorageBackend> {
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    current_user: Option<String>,
}

impl<B: StorageBackend> RecordStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            current_user: None,
        }
    }

    /// Answers `current_user_name` with `name` instead of the stored user.
    pub fn with_current_user(mut self, name: Option<String>) -> Self {
        self.current_user = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn require_account(dataset: &Dataset, id: &str) -> Result<()> {
        if dataset.accounts.iter().any(|a| a.id() == Some(id)) {
            Ok(())
        } else {
            Err(CrmError::Service(format!("Account not found: {}", id)))
        }
    }

    /// Resolves an upsert batch into the rows to write, or the message of the
    /// first rule it breaks.
    fn stage_contacts(
        dataset: &Dataset,
        records: &[Record],
        op: OperationKind,
    ) -> std::result::Result<Vec<(Option<usize>, Record)>, String> {
        let mut staged = Vec::with_capacity(records.len());

        for record in records {
            match op {
                OperationKind::Inserted => {
                    if let Some(id) = record.id() {
                        return Err(format!(
                            "Cannot insert a Contact that already has an Id: {}",
                            id
                        ));
                    }
                    let mut row = record.clone();
                    row.remove(fields::ID);
                    staged.push((None, row));
                }
                OperationKind::Updated => {
                    let id = record
                        .id()
                        .ok_or_else(|| "Cannot update a Contact without an Id".to_string())?;
                    let idx = dataset
                        .contacts
                        .iter()
                        .position(|c| c.id() == Some(id))
                        .ok_or_else(|| format!("Contact not found: {}", id))?;
                    let mut row = dataset.contacts[idx].clone();
                    row.merge(record);
                    staged.push((Some(idx), row));
                }
            }
        }

        for (_, row) in &staged {
            if row.get(fields::LAST_NAME).map_or(true, |v| v.trim().is_empty()) {
                return Err("Required fields are missing: [LastName]".to_string());
            }
            if let Some(account_id) = row.get(fields::ACCOUNT_ID).filter(|v| !v.is_empty()) {
                if !dataset.accounts.iter().any(|a| a.id() == Some(account_id)) {
                    return Err(format!("Account not found: {}", account_id));
                }
            }
        }

        let touched: HashSet<usize> = staged.iter().filter_map(|(idx, _)| *idx).collect();
        let mut emails: HashSet<String> = dataset
            .contacts
            .iter()
            .enumerate()
            .filter(|(idx, _)| !touched.contains(idx))
            .filter_map(|(_, c)| normalized_email(c))
            .collect();
        for (_, row) in &staged {
            if let Some(email) = normalized_email(row) {
                if !emails.insert(email) {
                    return Err(format!(
                        "Duplicate email: {}",
                        row.get(fields::EMAIL).unwrap_or_default()
                    ));
                }
            }
        }

        Ok(staged)
    }
}

fn normalized_email(record: &Record) -> Option<String> {
    record
        .get(fields::EMAIL)
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &raw[..15])
}

fn stamp(record: &mut Record, created: bool) {
    let now = Utc::now().to_rfc3339();
    if created {
        record.set(fields::CREATED_DATE, now.clone());
    }
    record.set(fields::LAST_MODIFIED_DATE, now);
}

fn matches_key(record: &Record, key_lower: &str) -> bool {
    SEARCH_FIELDS.iter().any(|field| {
        record
            .get(field)
            .is_some_and(|v| v.to_lowercase().contains(key_lower))
    })
}

#[async_trait(?Send)]
impl<B: StorageBackend> RecordService for RecordStore<B> {
    async fn fetch_default_list(&self, scope_id: &str) -> Result<Vec<Record>> {
        let dataset = self.backend.load()?;
        Self::require_account(&dataset, scope_id)?;
        let list: Vec<Record> = dataset
            .contacts
            .into_iter()
            .filter(|c| c.get(fields::ACCOUNT_ID) == Some(scope_id))
            .collect();
        debug!(scope_id, count = list.len(), "fetched default contacts");
        Ok(list)
    }

    async fn search_list(&self, key: &str, scope_id: &str) -> Result<Vec<Record>> {
        let dataset = self.backend.load()?;
        let key_lower = key.trim().to_lowercase();
        if key_lower.is_empty() {
            debug!(scope_id, "blank search key, nothing to match");
            return Ok(Vec::new());
        }
        let list: Vec<Record> = dataset
            .contacts
            .into_iter()
            .filter(|c| c.get(fields::ACCOUNT_ID) != Some(scope_id))
            .filter(|c| matches_key(c, &key_lower))
            .collect();
        debug!(key, scope_id, count = list.len(), "searched contacts");
        Ok(list)
    }

    async fn upsert_records(&self, records: &[Record], op: OperationKind) -> Result<Vec<String>> {
        if records.is_empty() {
            return Ok(UpsertResult::failure(["No Contacts to save"]).encode());
        }

        let mut dataset = self.backend.load()?;
        let staged = match Self::stage_contacts(&dataset, records, op) {
            Ok(staged) => staged,
            Err(message) => {
                warn!(%op, %message, "upsert rejected");
                return Ok(UpsertResult::failure([message]).encode());
            }
        };

        let count = staged.len();
        for (idx, mut row) in staged {
            match idx {
                Some(idx) => {
                    stamp(&mut row, false);
                    dataset.contacts[idx] = row;
                }
                None => {
                    row.set(fields::ID, new_id(CONTACT_ID_PREFIX));
                    stamp(&mut row, true);
                    dataset.contacts.push(row);
                }
            }
        }
        self.backend.save(&dataset)?;

        debug!(%op, count, "upsert committed");
        Ok(UpsertResult::success([format!("{} {} Contact(s)", op, count)]).encode())
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        let mut dataset = self.backend.load()?;

        if let Some(idx) = dataset.accounts.iter().position(|a| a.id() == Some(id)) {
            dataset.accounts.remove(idx);
            // Contacts go with their account.
            dataset
                .contacts
                .retain(|c| c.get(fields::ACCOUNT_ID) != Some(id));
        } else if let Some(idx) = dataset.contacts.iter().position(|c| c.id() == Some(id)) {
            dataset.contacts.remove(idx);
        } else {
            return Err(CrmError::RecordNotFound(id.to_string()));
        }

        self.backend.save(&dataset)?;
        debug!(id, "record deleted");
        Ok(())
    }

    async fn fetch_accounts(&self) -> Result<Vec<Record>> {
        Ok(self.backend.load()?.accounts)
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<Record> {
        let name = account.name.trim();
        if name.is_empty() {
            return Err(CrmError::Service(
                "Required fields are missing: [Name]".to_string(),
            ));
        }

        let mut dataset = self.backend.load()?;
        let mut record = Record::with_id(new_id(ACCOUNT_ID_PREFIX)).with(fields::NAME, name);
        if !account.phone.is_empty() {
            record.set(fields::PHONE, account.phone.clone());
        }
        if !account.active.is_empty() {
            record.set(fields::ACTIVE, account.active.clone());
        }
        stamp(&mut record, true);

        dataset.accounts.push(record.clone());
        self.backend.save(&dataset)?;
        debug!(id = record.id(), "account inserted");
        Ok(record)
    }

    async fn update_accounts(&self, records: &[Record]) -> Result<()> {
        let mut dataset = self.backend.load()?;

        for record in records {
            let id = record.id().ok_or_else(|| {
                CrmError::Service("Cannot update an Account without an Id".to_string())
            })?;
            let account = dataset
                .accounts
                .iter_mut()
                .find(|a| a.id() == Some(id))
                .ok_or_else(|| CrmError::Service(format!("Account not found: {}", id)))?;
            account.merge(record);
            if account.get(fields::NAME).map_or(true, |n| n.trim().is_empty()) {
                return Err(CrmError::Service(
                    "Required fields are missing: [Name]".to_string(),
                ));
            }
            stamp(account, false);
        }

        self.backend.save(&dataset)?;
        debug!(count = records.len(), "accounts updated");
        Ok(())
    }

    async fn current_user_name(&self) -> Result<String> {
        if let Some(name) = &self.current_user {
            return Ok(name.clone());
        }
        self.backend
            .load()?
            .current_user
            .ok_or_else(|| CrmError::Service("No current user is configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::memory::fixtures::StoreFixture;
    use crate::upsert::UpsertKind;

    fn contact(last: &str, email: &str) -> Record {
        Record::new()
            .with(fields::ACCOUNT_ID, "001A")
            .with(fields::LAST_NAME, last)
            .with(fields::EMAIL, email)
    }

    fn decode(raw: Vec<String>) -> UpsertResult {
        UpsertResult::decode(raw).unwrap()
    }

    #[tokio::test]
    async fn default_list_is_scoped_to_account() {
        let store = StoreFixture::new()
            .with_account("001A", "Acme")
            .with_account("001B", "Globex")
            .with_contact("003A1", "001A", "Ann", "Smith", "ann@acme.test")
            .with_contact("003B1", "001B", "Bob", "Smith", "bob@globex.test")
            .store;

        let list = store.fetch_default_list("001A").await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id(), Some("003A1"));
    }

    #[tokio::test]
    async fn default_list_for_unknown_account_fails() {
        let store = StoreFixture::new().store;
        let err = store.fetch_default_list("001X").await.unwrap_err();
        assert!(matches!(err, CrmError::Service(_)));
    }

    #[tokio::test]
    async fn search_skips_scope_account_and_ignores_case() {
        let store = StoreFixture::new()
            .with_account("001A", "Acme")
            .with_account("001B", "Globex")
            .with_contact("003A1", "001A", "Ann", "Smith", "ann@acme.test")
            .with_contact("003B1", "001B", "Bob", "SMITHERS", "bob@globex.test")
            .with_contact("003B2", "001B", "Cy", "Jones", "cy@globex.test")
            .store;

        let found = store.search_list("smith", "001A").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), Some("003B1"));

        let none = store.search_list("nobody", "001A").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn blank_key_matches_nothing() {
        let store = StoreFixture::new()
            .with_account("001A", "Acme")
            .with_account("001B", "Globex")
            .with_contact("003B1", "001B", "Bob", "Smith", "bob@globex.test")
            .with_contact("003B2", "001B", "Cy", "Jones", "cy@globex.test")
            .store;

        assert!(store.search_list("   ", "001A").await.unwrap().is_empty());
        assert!(store.search_list("", "001A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_timestamps() {
        let store = StoreFixture::new().with_account("001A", "Acme").store;
        let raw = store
            .upsert_records(&[contact("Smith", "a@x.test")], OperationKind::Inserted)
            .await
            .unwrap();
        assert!(decode(raw).is_success());

        let list = store.fetch_default_list("001A").await.unwrap();
        assert_eq!(list.len(), 1);
        let id = list[0].id().unwrap();
        assert!(id.starts_with(CONTACT_ID_PREFIX));
        assert_eq!(id.len(), 18);
        assert!(list[0].last_modified().is_some());
    }

    #[tokio::test]
    async fn duplicate_email_rejects_whole_batch() {
        let store = StoreFixture::new()
            .with_account("001A", "Acme")
            .with_contact("003A1", "001A", "Ann", "Smith", "ann@acme.test")
            .store;

        let raw = store
            .upsert_records(
                &[contact("Fresh", "new@acme.test"), contact("Copy", "ANN@acme.test")],
                OperationKind::Inserted,
            )
            .await
            .unwrap();
        let result = decode(raw);
        assert_eq!(result.kind, UpsertKind::Failure);
        assert_eq!(result.message(), "Duplicate email: ANN@acme.test");
        assert_eq!(store.fetch_default_list("001A").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insert_requires_last_name() {
        let store = StoreFixture::new().with_account("001A", "Acme").store;
        let raw = store
            .upsert_records(&[contact("  ", "")], OperationKind::Inserted)
            .await
            .unwrap();
        assert_eq!(
            decode(raw).encode(),
            vec!["Error", "Required fields are missing: [LastName]"]
        );
    }

    #[tokio::test]
    async fn update_merges_fields_and_keeps_own_email() {
        let store = StoreFixture::new()
            .with_account("001A", "Acme")
            .with_contact("003A1", "001A", "Ann", "Smith", "ann@acme.test")
            .store;

        let draft = Record::with_id("003A1")
            .with(fields::PHONE, "555-0100")
            .with(fields::EMAIL, "ann@acme.test");
        let raw = store
            .upsert_records(&[draft], OperationKind::Updated)
            .await
            .unwrap();
        assert!(decode(raw).is_success());

        let list = store.fetch_default_list("001A").await.unwrap();
        assert_eq!(list[0].get(fields::PHONE), Some("555-0100"));
        assert_eq!(list[0].get(fields::FIRST_NAME), Some("Ann"));
    }

    #[tokio::test]
    async fn update_of_unknown_contact_is_an_error_result() {
        let store = StoreFixture::new().with_account("001A", "Acme").store;
        let raw = store
            .upsert_records(&[Record::with_id("003ZZ")], OperationKind::Updated)
            .await
            .unwrap();
        assert_eq!(decode(raw).message(), "Contact not found: 003ZZ");
    }

    #[tokio::test]
    async fn deleting_account_removes_its_contacts() {
        let store = StoreFixture::new()
            .with_account("001A", "Acme")
            .with_account("001B", "Globex")
            .with_contact("003A1", "001A", "Ann", "Smith", "")
            .with_contact("003B1", "001B", "Bob", "Jones", "")
            .store;

        store.delete_record("001A").await.unwrap();
        let snapshot = store.backend().snapshot();
        assert_eq!(snapshot.accounts.len(), 1);
        assert_eq!(snapshot.contacts.len(), 1);
        assert_eq!(snapshot.contacts[0].id(), Some("003B1"));

        assert!(matches!(
            store.delete_record("001A").await,
            Err(CrmError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn account_insert_and_update() {
        let store = StoreFixture::new().store;
        let created = store
            .insert_account(&NewAccount {
                name: "  Initech ".into(),
                active: "Yes".into(),
                phone: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(created.get(fields::NAME), Some("Initech"));
        assert_eq!(created.get(fields::PHONE), None);

        let id = created.id().unwrap().to_string();
        let draft = Record::with_id(id.clone()).with(fields::RATING, "Hot");
        store.update_accounts(&[draft]).await.unwrap();

        let accounts = store.fetch_accounts().await.unwrap();
        assert_eq!(accounts[0].get(fields::RATING), Some("Hot"));

        let blank = Record::with_id(id).with(fields::NAME, "");
        assert!(store.update_accounts(&[blank]).await.is_err());
        assert_eq!(
            store.fetch_accounts().await.unwrap()[0].get(fields::NAME),
            Some("Initech")
        );
    }

    #[tokio::test]
    async fn current_user_override_wins() {
        let store = StoreFixture::new().with_user("Stored User").store;
        assert_eq!(store.current_user_name().await.unwrap(), "Stored User");

        let store = store.with_current_user(Some("Dana Admin".into()));
        assert_eq!(store.current_user_name().await.unwrap(), "Dana Admin");

        let store = StoreFixture::new().store.with_current_user(Some(" ".into()));
        assert!(store.current_user_name().await.is_err());
    }

    #[tokio::test]
    async fn write_failure_surfaces_as_error() {
        let store = StoreFixture::new().with_account("001A", "Acme").store;
        store.backend().set_simulate_write_error(true);
        let result = store
            .upsert_records(&[contact("Smith", "")], OperationKind::Inserted)
            .await;
        assert!(matches!(result, Err(CrmError::Store(_))));
    }

    #[tokio::test]
    async fn read_failure_surfaces_as_error() {
        let store = StoreFixture::new().with_account("001A", "Acme").store;
        store.backend().set_simulate_read_error(true);
        assert!(matches!(
            store.fetch_default_list("001A").await,
            Err(CrmError::Store(_))
        ));
        assert_eq!(
            store.backend().location(),
            std::path::PathBuf::from("memory://data.json")
        );
    }
}
