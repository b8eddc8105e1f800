//! Upsert results.
//!
//! The record service answers an upsert with a plain list of strings: the
//! first element is a status tag (`"Success"` or `"Error"`), the rest are
//! human-readable lines. That shape is kept as-is on the service boundary and
//! decoded into [`UpsertResult`] as soon as it crosses it.

use crate::error::{CrmError, Result};

pub const STATUS_SUCCESS: &str = "Success";
pub const STATUS_ERROR: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertResult {
    /// The status tag exactly as the service sent it. Notifications use it
    /// verbatim as their title.
    pub status: String,
    pub kind: UpsertKind,
    pub messages: Vec<String>,
}

impl UpsertResult {
    pub fn success<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: STATUS_SUCCESS.to_string(),
            kind: UpsertKind::Success,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn failure<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: STATUS_ERROR.to_string(),
            kind: UpsertKind::Failure,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Decodes the wire form. The status comparison is case-insensitive;
    /// anything other than "success" counts as a failure.
    pub fn decode(raw: Vec<String>) -> Result<Self> {
        let mut parts = raw.into_iter();
        let status = parts
            .next()
            .ok_or_else(|| CrmError::Service("Empty response from upsert".to_string()))?;
        let kind = if status.eq_ignore_ascii_case(STATUS_SUCCESS) {
            UpsertKind::Success
        } else {
            UpsertKind::Failure
        };
        Ok(Self {
            status,
            kind,
            messages: parts.collect(),
        })
    }

    pub fn encode(&self) -> Vec<String> {
        std::iter::once(self.status.clone())
            .chain(self.messages.iter().cloned())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.kind == UpsertKind::Success
    }

    /// The message lines joined for display.
    pub fn message(&self) -> String {
        self.messages.join("\n")
    }
}
