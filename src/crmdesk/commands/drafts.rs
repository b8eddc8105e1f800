use crate::error::{CrmError, Result};
use crate::model::{fields, ColumnSet, Record};
use std::collections::BTreeMap;

/// Inline edits not yet saved, keyed by record id.
///
/// Each draft holds only the changed fields plus `Id`, which is exactly the
/// shape an `Updated` upsert wants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drafts {
    rows: BTreeMap<String, Record>,
}

impl Drafts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `field = value` for the row `id`. Only fields editable in
    /// `columns` are accepted.
    pub fn set(&mut self, columns: ColumnSet, id: &str, field: &str, value: &str) -> Result<()> {
        if id.is_empty() {
            return Err(CrmError::Validation(
                "Only saved records can be edited inline".to_string(),
            ));
        }
        if !columns.editable_fields().any(|f| f == field) {
            return Err(CrmError::Validation(format!(
                "Field is not editable: {}",
                field
            )));
        }
        self.rows
            .entry(id.to_string())
            .or_insert_with(|| Record::with_id(id))
            .set(field, value);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.rows.get(id)
    }

    /// Drafts in id order, ready to send.
    pub fn records(&self) -> Vec<Record> {
        self.rows.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// `record` with its pending edits laid over it, for display.
    pub fn overlay(&self, record: &Record) -> Record {
        let mut shown = record.clone();
        if let Some(draft) = record.id().and_then(|id| self.rows.get(id)) {
            shown.merge(draft);
        }
        shown
    }
}

/// Field order of a blank new-contact row.
pub const NEW_CONTACT_FIELDS: [&str; 4] = [
    fields::FIRST_NAME,
    fields::LAST_NAME,
    fields::PHONE,
    fields::EMAIL,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_to_one_row_accumulate() {
        let mut drafts = Drafts::new();
        drafts
            .set(ColumnSet::Contacts, "003A", fields::PHONE, "555")
            .unwrap();
        drafts
            .set(ColumnSet::Contacts, "003A", fields::EMAIL, "a@x.test")
            .unwrap();
        drafts
            .set(ColumnSet::Contacts, "003B", fields::PHONE, "777")
            .unwrap();

        assert_eq!(drafts.len(), 2);
        let records = drafts.records();
        assert_eq!(records[0].id(), Some("003A"));
        assert_eq!(records[0].get(fields::EMAIL), Some("a@x.test"));
        assert_eq!(records[0].get(fields::FIRST_NAME), None);
    }

    #[test]
    fn rejects_read_only_fields() {
        let mut drafts = Drafts::new();
        let err = drafts
            .set(ColumnSet::Accounts, "001A", fields::ID, "001B")
            .unwrap_err();
        assert!(matches!(err, CrmError::Validation(_)));
        assert!(drafts
            .set(ColumnSet::Contacts, "", fields::PHONE, "1")
            .is_err());
        assert!(drafts.is_empty());
    }

    #[test]
    fn overlay_shows_pending_values() {
        let mut drafts = Drafts::new();
        drafts
            .set(ColumnSet::Accounts, "001A", fields::RATING, "Hot")
            .unwrap();
        let stored = Record::with_id("001A")
            .with(fields::NAME, "Acme")
            .with(fields::RATING, "Cold");

        let shown = drafts.overlay(&stored);
        assert_eq!(shown.get(fields::RATING), Some("Hot"));
        assert_eq!(shown.get(fields::NAME), Some("Acme"));
    }
}
