//! # Rendering
//!
//! Turns table state into terminal text. Every `render_*` function returns a
//! `String` so output can be tested without a terminal; colors come from
//! `colored` and honor `NO_COLOR`.
//!
//! Layout math (column widths, truncation, padding) is unicode-aware: widths
//! are measured with `unicode-width`, never with `len()`.

use chrono::{DateTime, Utc};
use colored::Colorize;
use crmdesk::api::{CmdMessage, MessageLevel, TableView};
use crmdesk::model::{Column, ColumnKind, ColumnSet, Record};
use crmdesk::pagination::PaginationState;
use crmdesk::search::Banner;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a single cell may get before it is truncated.
pub const MAX_CELL_WIDTH: usize = 28;
pub const TIME_WIDTH: usize = 14;
const COLUMN_GAP: &str = "  ";
const MODIFIED_HEADER: &str = "Modified";

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut output = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => message.content.dimmed(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
            MessageLevel::Error => message.content.red(),
        };
        output.push_str(&format!("{}\n", line));
    }
    output
}

pub fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages));
}

/// Contacts page: card title, banner, rows, then the pager line.
pub fn render_contacts(view: &TableView, page_size_options: &[usize]) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", view.card_title.bold()));
    if let Some(banner) = render_banner(&view.banner) {
        output.push_str(&banner);
    }
    output.push('\n');
    output.push_str(&render_rows(view.columns, &view.rows));
    output.push_str(&render_pager(&view.pagination, page_size_options));
    output
}

/// Accounts list, headed by the current user's name when known.
pub fn render_accounts(accounts: &[Record], current_user: Option<&str>) -> String {
    let mut output = String::new();
    if let Some(user) = current_user {
        output.push_str(&format!("{} {}\n\n", "Signed in as".dimmed(), user.bold()));
    }
    output.push_str(&render_rows(ColumnSet::Accounts, accounts));
    output
}

fn render_banner(banner: &Banner) -> Option<String> {
    if banner.is_empty() {
        return None;
    }
    let title = if banner.title.starts_with("Warning") {
        banner.title.yellow().bold()
    } else {
        banner.title.green().bold()
    };
    Some(format!("{} {}\n", title, banner.message))
}

fn cell_text(column: &Column, record: &Record) -> String {
    match &column.kind {
        ColumnKind::Text => record.get(column.field_name).unwrap_or_default().to_string(),
        ColumnKind::Button { label, .. } => format!("[{}]", label),
    }
}

/// Renders `records` under the headers of `columns`, plus a trailing
/// "Modified" column when any record carries a modification date.
pub fn render_rows(columns: ColumnSet, records: &[Record]) -> String {
    if records.is_empty() {
        return format!("{}\n", "No records found.".dimmed());
    }

    let columns = columns.columns();
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| truncate_to_width(&cell_text(c, record), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(c.label.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let show_modified = records.iter().any(|r| r.last_modified().is_some());

    let mut output = String::new();
    let mut header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad_to_width(c.label, *w))
        .collect();
    if show_modified {
        header.push(format!("{:>width$}", MODIFIED_HEADER, width = TIME_WIDTH));
    }
    output.push_str(&format!("{}\n", header.join(COLUMN_GAP).trim_end().bold()));

    for (record, row) in records.iter().zip(&cells) {
        let mut line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad_to_width(cell, *w))
            .collect();
        if show_modified {
            let time = record.last_modified().map(format_time_ago).unwrap_or_default();
            line.push(format!("{}", format!("{:>width$}", time, width = TIME_WIDTH).dimmed()));
        }
        output.push_str(&format!("{}\n", line.join(COLUMN_GAP).trim_end()));
    }
    output
}

fn render_pager(pagination: &PaginationState, page_size_options: &[usize]) -> String {
    let pages = pagination.total_pages().max(1);
    let options = page_size_options
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "\n{}\n",
        format!(
            "Page {} of {} · {} records · {} per page ({})",
            pagination.page_number, pages, pagination.total_records, pagination.page_size, options
        )
        .dimmed()
    )
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crmdesk::model::fields;
    use crmdesk::search::SearchState;

    fn plain() {
        colored::control::set_override(false);
    }

    fn contact(id: &str, first: &str, last: &str) -> Record {
        Record::with_id(id)
            .with(fields::FIRST_NAME, first)
            .with(fields::LAST_NAME, last)
    }

    #[test]
    fn truncates_by_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn columns_line_up() {
        plain();
        let out = render_rows(
            ColumnSet::Contacts,
            &[contact("1", "Ann", "Smith"), contact("2", "Maximilian", "Li")],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "FirstName   LastName  Phone  Email");
        assert_eq!(lines[1], "Ann         Smith");
        assert_eq!(lines[2], "Maximilian  Li");
    }

    #[test]
    fn search_rows_get_assign_button() {
        plain();
        let out = render_rows(ColumnSet::ContactSearch, &[contact("1", "Bob", "Smith")]);
        assert!(out.lines().next().unwrap().ends_with("Assign"));
        assert!(out.contains("[Assign]"));
    }

    #[test]
    fn contacts_view_shows_banner_and_pager() {
        plain();
        let search = SearchState::from_results("smith", 0);
        let view = TableView {
            card_title: search.card_title().to_string(),
            banner: search.banner(),
            columns: search.columns(),
            rows: Vec::new(),
            pagination: PaginationState::default(),
        };

        let out = render_contacts(&view, &[5, 10, 25]);

        assert!(out.starts_with("No other Accounts' Contacts found\n"));
        assert!(out.contains("Warning! No Contacts with search key: smith found"));
        assert!(out.contains("No records found."));
        assert!(out.contains("Page 1 of 1 · 0 records · 5 per page (5/10/25)"));
    }

    #[test]
    fn accounts_show_user_and_age() {
        plain();
        let account = Record::with_id("001A")
            .with(fields::NAME, "Acme")
            .with(
                fields::LAST_MODIFIED_DATE,
                (Utc::now() - chrono::Duration::hours(2)).to_rfc3339(),
            );

        let out = render_accounts(&[account], Some("Dana Admin"));

        assert!(out.starts_with("Signed in as Dana Admin"));
        assert!(out.contains("Modified"));
        assert!(out.contains("2 hours ago"));
    }

    #[test]
    fn messages_render_one_per_line() {
        plain();
        let out = render_messages(&[CmdMessage::success("saved"), CmdMessage::error("nope")]);
        assert_eq!(out, "saved\nnope\n");
    }
}
