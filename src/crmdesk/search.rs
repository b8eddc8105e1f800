//! Search mode of the contacts table.
//!
//! The table is either showing the default list (contacts of the scope
//! account) or the result of a free-text search over other accounts'
//! contacts. [`SearchState`] is rebuilt from scratch on every list
//! replacement; everything the table displays about the mode (banner, card
//! title, column set) is derived from it.

use crate::model::ColumnSet;

pub const DEFAULT_CARD_TITLE: &str = "Current Account's Contacts";
pub const RESULTS_CARD_TITLE: &str = "Search results on other Accounts' Contacts";
pub const NO_RESULTS_CARD_TITLE: &str = "No other Accounts' Contacts found";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub active: bool,
    pub key: String,
    pub result_count: usize,
}

/// Title/message pair shown above the table after a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    pub title: String,
    pub message: String,
}

impl Banner {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.message.is_empty()
    }
}

impl SearchState {
    /// Default-list mode.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// State after a search for `key` succeeded with `result_count` matches.
    /// Zero matches is still an active search.
    pub fn from_results(key: impl Into<String>, result_count: usize) -> Self {
        Self {
            active: true,
            key: key.into(),
            result_count,
        }
    }

    pub fn has_results(&self) -> bool {
        self.active && self.result_count > 0
    }

    pub fn banner(&self) -> Banner {
        match (self.active, self.result_count) {
            (false, _) => Banner::default(),
            (true, 0) => Banner {
                title: "Warning!".to_string(),
                message: format!("No Contacts with search key: {} found", self.key),
            },
            (true, n) => Banner {
                title: "Success!".to_string(),
                message: format!("Fetched {} Contacts", n),
            },
        }
    }

    pub fn card_title(&self) -> &'static str {
        match (self.active, self.result_count) {
            (false, _) => DEFAULT_CARD_TITLE,
            (true, 0) => NO_RESULTS_CARD_TITLE,
            (true, _) => RESULTS_CARD_TITLE,
        }
    }

    /// Search results carry the assign button; an empty result set keeps
    /// whatever layout came before, which is the default one.
    pub fn columns(&self) -> ColumnSet {
        if self.has_results() {
            ColumnSet::ContactSearch
        } else {
            ColumnSet::Contacts
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_state_has_no_banner() {
        let state = SearchState::inactive();
        assert!(state.banner().is_empty());
        assert_eq!(state.card_title(), DEFAULT_CARD_TITLE);
        assert_eq!(state.columns(), ColumnSet::Contacts);
    }

    #[test]
    fn zero_results_is_an_active_warning() {
        let state = SearchState::from_results("smith", 0);
        assert!(state.active);
        assert_eq!(state.result_count, 0);
        assert_eq!(
            state.banner(),
            Banner {
                title: "Warning!".into(),
                message: "No Contacts with search key: smith found".into(),
            }
        );
        assert_eq!(state.card_title(), NO_RESULTS_CARD_TITLE);
    }

    #[test]
    fn results_switch_to_search_columns() {
        let state = SearchState::from_results("jo", 4);
        assert_eq!(state.banner().message, "Fetched 4 Contacts");
        assert_eq!(state.banner().title, "Success!");
        assert_eq!(state.card_title(), RESULTS_CARD_TITLE);
        assert_eq!(state.columns(), ColumnSet::ContactSearch);
    }
}
