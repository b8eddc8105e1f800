use crate::error::CrmError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod fields {
    pub const ID: &str = "Id";
    pub const ACCOUNT_ID: &str = "AccountId";
    pub const NAME: &str = "Name";
    pub const RATING: &str = "Rating";
    pub const PHONE: &str = "Phone";
    pub const ACTIVE: &str = "Active__c";
    pub const FIRST_NAME: &str = "FirstName";
    pub const LAST_NAME: &str = "LastName";
    pub const EMAIL: &str = "Email";
    pub const CREATED_DATE: &str = "CreatedDate";
    pub const LAST_MODIFIED_DATE: &str = "LastModifiedDate";
}

/// An Account or Contact as the record service hands it out.
///
/// Field values are opaque strings keyed by field API name. Nothing in the
/// table controllers interprets them except `Id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self::new().with(fields::ID, id)
    }

    /// Builder-style setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.get(fields::ID).filter(|id| !id.is_empty())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    /// Copies every field of `other` over this record (draft values on top of
    /// the stored row).
    pub fn merge(&mut self, other: &Record) {
        for (field, value) in &other.fields {
            self.fields.insert(field.clone(), value.clone());
        }
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.get(fields::LAST_MODIFIED_DATE)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The kind of write an upsert batch carries. The names are part of the
/// service contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Inserted,
    Updated,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Inserted => write!(f, "Inserted"),
            OperationKind::Updated => write!(f, "Updated"),
        }
    }
}

impl FromStr for OperationKind {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Inserted" => Ok(OperationKind::Inserted),
            "Updated" => Ok(OperationKind::Updated),
            other => Err(CrmError::Validation(format!(
                "Unknown operation: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Button { label: &'static str, name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: &'static str,
    pub field_name: &'static str,
    pub editable: bool,
    pub kind: ColumnKind,
}

impl Column {
    const fn text(label: &'static str, field_name: &'static str, editable: bool) -> Self {
        Self {
            label,
            field_name,
            editable,
            kind: ColumnKind::Text,
        }
    }
}

/// Name of the action carried by the assign button in search results.
pub const ASSIGN_ACTION: &str = "action_button";

static CONTACT_COLUMNS: Lazy<Vec<Column>> = Lazy::new(|| {
    vec![
        Column::text(fields::FIRST_NAME, fields::FIRST_NAME, true),
        Column::text(fields::LAST_NAME, fields::LAST_NAME, true),
        Column::text(fields::PHONE, fields::PHONE, true),
        Column::text(fields::EMAIL, fields::EMAIL, true),
    ]
});

static CONTACT_SEARCH_COLUMNS: Lazy<Vec<Column>> = Lazy::new(|| {
    let mut cols = CONTACT_COLUMNS.clone();
    cols.push(Column {
        label: "Assign",
        field_name: "",
        editable: false,
        kind: ColumnKind::Button {
            label: "Assign",
            name: ASSIGN_ACTION,
        },
    });
    cols
});

static ACCOUNT_COLUMNS: Lazy<Vec<Column>> = Lazy::new(|| {
    vec![
        Column::text("Id", fields::ID, false),
        Column::text("Name", fields::NAME, true),
        Column::text("Rating", fields::RATING, true),
        Column::text("Phone", fields::PHONE, true),
        Column::text("Active", fields::ACTIVE, true),
    ]
});

/// Which column layout a table is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSet {
    #[default]
    Contacts,
    ContactSearch,
    Accounts,
}

impl ColumnSet {
    pub fn columns(&self) -> &'static [Column] {
        match self {
            ColumnSet::Contacts => CONTACT_COLUMNS.as_slice(),
            ColumnSet::ContactSearch => CONTACT_SEARCH_COLUMNS.as_slice(),
            ColumnSet::Accounts => ACCOUNT_COLUMNS.as_slice(),
        }
    }

    pub fn editable_fields(&self) -> impl Iterator<Item = &'static str> {
        self.columns()
            .iter()
            .filter(|c| c.editable)
            .map(|c| c.field_name)
    }
}
