use crate::error::{CrmError, Result};
use crate::model::{fields, Record};
use crate::notify::Notifier;
use crate::service::RecordService;
use tracing::{debug, warn};

/// Name of the button that confirms the deletion.
pub const DELETE_BUTTON: &str = "Delete";
pub const CANCEL_BUTTON: &str = "Cancel";
/// Value the dialog closes with, whatever was clicked.
pub const CLOSE_RESULT: &str = "ended";

pub const DELETED_MESSAGE: &str = "Successfully deleted account";
pub const DELETE_FAILED_TITLE: &str = "Error deleting the account";

/// A pending "are you sure?" for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    record_id: String,
    confirm_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub close_result: &'static str,
    /// The record is gone; the owner should reload its list.
    pub deleted: bool,
}

impl DeleteConfirmation {
    pub fn new(record_id: impl Into<String>, confirm_message: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            confirm_message: confirm_message.into(),
        }
    }

    /// Dialog for an account row, naming the account in the question.
    pub fn for_account(account: &Record) -> Result<Self> {
        let id = account
            .id()
            .ok_or_else(|| CrmError::Validation("Cannot delete an unsaved record".to_string()))?;
        let name = account.get(fields::NAME).unwrap_or(id);
        Ok(Self::new(
            id,
            format!("Are you sure you want to delete {}?", name),
        ))
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn confirm_message(&self) -> &str {
        &self.confirm_message
    }

    /// Handles a button press. Only [`DELETE_BUTTON`] deletes; every button
    /// closes the dialog.
    pub async fn handle_click<S, N>(&self, service: &S, notifier: &N, button: &str) -> DeleteOutcome
    where
        S: RecordService + ?Sized,
        N: Notifier + ?Sized,
    {
        let deleted = button == DELETE_BUTTON && self.delete(service, notifier).await;
        DeleteOutcome {
            close_result: CLOSE_RESULT,
            deleted,
        }
    }

    async fn delete<S, N>(&self, service: &S, notifier: &N) -> bool
    where
        S: RecordService + ?Sized,
        N: Notifier + ?Sized,
    {
        debug!(id = %self.record_id, "deleting record");
        match service.delete_record(&self.record_id).await {
            Ok(()) => {
                notifier.success("Success", DELETED_MESSAGE);
                true
            }
            Err(e) => {
                warn!(id = %self.record_id, error = %e, "delete failed");
                notifier.error(DELETE_FAILED_TITLE, &e.message());
                false
            }
        }
    }
}
