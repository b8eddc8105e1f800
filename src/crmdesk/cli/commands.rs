//! # CLI Layer
//!
//! This module is **one possible UI client** for crmdesk; it is not the
//! application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Uses `std::process::exit`
//! - Handles argument parsing
//! - Owns the async runtime
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments become typed commands via clap
//! 2. **Context Setup**: logging, data directory, `CrmApi`
//! 3. **Dispatch**: drive the table controllers the API hands out
//! 4. **Output**: tables through `render`, notifications through
//!    `TerminalNotifier`
//! 5. **Exit codes**: non-zero when a command failed or reported an error
//!
//! Business rules (what a save does, when a search fires) live in the
//! command layer. Handlers here only feed input in and print state out.
//!
//! ## Interactive browsing
//!
//! `contacts browse` is the one long-running command. It waits on stdin and
//! on the table's debounce timer at the same time; every line typed is the
//! new content of the search box unless it starts with `:`.

use super::notifier::TerminalNotifier;
use super::render::{print_messages, render_accounts, render_contacts};
use super::setup::{AccountCommands, Cli, Commands, ContactCommands, PageArgs};
use clap::Parser;
use colored::Colorize;
use crmdesk::api::{ConfigAction, CrmApi};
use crmdesk::commands::contacts::ContactsTable;
use crmdesk::commands::delete::{CANCEL_BUTTON, DELETE_BUTTON};
use crmdesk::config::CrmConfig;
use crmdesk::error::{CrmError, Result};
use crmdesk::init::initialize;
use crmdesk::logging;
use crmdesk::model::OperationKind;
use crmdesk::service::fs::FileService;
use crmdesk::service::RecordService;
use std::io::{self, Write};
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

type Api = CrmApi<FileService>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let mut ctx = initialize()?;
    let notifier = TerminalNotifier::new();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(dispatch(&mut ctx.api, cli.command, &notifier));
    // A pending stdin read must not hold the process open.
    runtime.shutdown_background();

    // An error that was already shown as a notification is not printed again.
    if notifier.reported_error() {
        if let Err(e) = &outcome {
            debug!(error = %e, "command failed after reporting");
        }
        std::process::exit(1);
    }
    outcome
}

async fn dispatch(api: &mut Api, command: Commands, notifier: &TerminalNotifier) -> Result<()> {
    match command {
        Commands::Accounts(cmd) => match cmd {
            AccountCommands::List => handle_accounts_list(api, notifier).await,
            AccountCommands::Add {
                name,
                phone,
                active,
            } => handle_accounts_add(api, notifier, name.join(" "), phone, active).await,
            AccountCommands::Update { id, sets } => {
                handle_accounts_update(api, notifier, id, sets).await
            }
            AccountCommands::Delete { id, yes } => {
                handle_accounts_delete(api, notifier, id, yes).await
            }
        },
        Commands::Contacts(cmd) => match cmd {
            ContactCommands::List { account, paging } => {
                handle_contacts_list(api, notifier, account, None, paging).await
            }
            ContactCommands::Search {
                account,
                key,
                paging,
            } => handle_contacts_list(api, notifier, account, Some(key), paging).await,
            ContactCommands::Add {
                account,
                first_name,
                last_name,
                phone,
                email,
            } => {
                let fields = NewContactArgs {
                    first_name,
                    last_name,
                    phone,
                    email,
                };
                handle_contacts_add(api, notifier, account, fields).await
            }
            ContactCommands::Update { account, id, sets } => {
                handle_contacts_update(api, notifier, account, id, sets).await
            }
            ContactCommands::Assign {
                account,
                id,
                search,
            } => handle_contacts_assign(api, notifier, account, id, search).await,
            ContactCommands::Browse { account } => {
                handle_contacts_browse(api, notifier, account).await
            }
        },
        Commands::Config { key, value } => handle_config(api, key, value),
        Commands::Init { user } => handle_init(api, user),
    }
}

// --- Accounts ---

async fn handle_accounts_list(api: &Api, notifier: &TerminalNotifier) -> Result<()> {
    let mut table = api.accounts_table(notifier.clone());
    table.load_current_user().await;
    table.load().await?;
    print!(
        "{}",
        render_accounts(&table.rows(), table.current_user_name())
    );
    Ok(())
}

async fn handle_accounts_add(
    api: &Api,
    notifier: &TerminalNotifier,
    name: String,
    phone: Option<String>,
    active: Option<String>,
) -> Result<()> {
    let mut table = api.accounts_table(notifier.clone());
    table.toggle_form();
    table.set_name(name);
    if let Some(phone) = phone {
        table.set_phone(phone);
    }
    if let Some(active) = active {
        table.set_active(active);
    }

    let account = table.add_account().await?;
    println!("{} {}", "Id:".dimmed(), account.id().unwrap_or_default());
    Ok(())
}

async fn handle_accounts_update(
    api: &Api,
    notifier: &TerminalNotifier,
    id: String,
    sets: Vec<String>,
) -> Result<()> {
    let mut table = api.accounts_table(notifier.clone());
    table.load().await?;
    for set in &sets {
        let (field, value) = parse_assignment(set)?;
        table.set_draft(&id, field, value)?;
    }
    table.save().await?;
    print!(
        "{}",
        render_accounts(&table.rows(), table.current_user_name())
    );
    Ok(())
}

async fn handle_accounts_delete(
    api: &Api,
    notifier: &TerminalNotifier,
    id: String,
    yes: bool,
) -> Result<()> {
    let mut table = api.accounts_table(notifier.clone());
    table.load().await?;
    let dialog = table.delete_dialog(&id)?;

    let button = if yes {
        DELETE_BUTTON
    } else {
        println!("{}", dialog.confirm_message());
        print!("[{}/{}]: ", DELETE_BUTTON, CANCEL_BUTTON);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        confirm_button(&input)
    };

    let outcome = table.handle_delete(&dialog, button).await;
    debug!(close_result = %outcome.close_result, deleted = outcome.deleted, "dialog closed");
    if button == CANCEL_BUTTON {
        println!("{}", "Operation cancelled.".dimmed());
    }
    Ok(())
}

/// Maps the typed answer to a dialog button. Anything other than an explicit
/// yes cancels.
fn confirm_button(input: &str) -> &'static str {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "delete" => DELETE_BUTTON,
        _ => CANCEL_BUTTON,
    }
}

// --- Contacts ---

struct NewContactArgs {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

async fn open_contacts(
    api: &Api,
    notifier: &TerminalNotifier,
    account: &str,
) -> Result<ContactsTable<Rc<FileService>, TerminalNotifier>> {
    let mut table = api.contacts_table(account, notifier.clone())?;
    table.load().await?;
    Ok(table)
}

fn print_table<S: RecordService>(table: &ContactsTable<S, TerminalNotifier>) {
    print!(
        "{}",
        render_contacts(&table.view(), table.page_size_options())
    );
}

async fn handle_contacts_list(
    api: &Api,
    notifier: &TerminalNotifier,
    account: String,
    key: Option<String>,
    paging: PageArgs,
) -> Result<()> {
    let mut table = open_contacts(api, notifier, &account).await?;
    if let Some(key) = key {
        table.perform_search(&key).await?;
    }
    if let Some(size) = paging.page_size {
        table.set_page_size(size)?;
    }
    table.go_to_page(paging.page);
    print_table(&table);
    Ok(())
}

async fn handle_contacts_add(
    api: &Api,
    notifier: &TerminalNotifier,
    account: String,
    fields: NewContactArgs,
) -> Result<()> {
    use crmdesk::model::fields::{EMAIL, FIRST_NAME, LAST_NAME, PHONE};

    let mut table = open_contacts(api, notifier, &account).await?;
    let row = table.add_contact();
    let values = [
        (FIRST_NAME, fields.first_name),
        (LAST_NAME, fields.last_name),
        (PHONE, fields.phone),
        (EMAIL, fields.email),
    ];
    for (field, value) in values {
        if let Some(value) = value {
            table.set_new_contact_field(row, field, &value)?;
        }
    }

    let result = table.save(OperationKind::Inserted).await?;
    if result.is_success() {
        print_table(&table);
    }
    Ok(())
}

async fn handle_contacts_update(
    api: &Api,
    notifier: &TerminalNotifier,
    account: String,
    id: String,
    sets: Vec<String>,
) -> Result<()> {
    let mut table = open_contacts(api, notifier, &account).await?;
    for set in &sets {
        let (field, value) = parse_assignment(set)?;
        table.set_draft(&id, field, value)?;
    }

    let result = table.save(OperationKind::Updated).await?;
    if result.is_success() {
        print_table(&table);
    }
    Ok(())
}

async fn handle_contacts_assign(
    api: &Api,
    notifier: &TerminalNotifier,
    account: String,
    id: String,
    key: String,
) -> Result<()> {
    let mut table = open_contacts(api, notifier, &account).await?;
    table.perform_search(&key).await?;

    let result = table.assign_to_account(&id).await?;
    if result.is_success() {
        print_table(&table);
    }
    Ok(())
}

/// A line typed while browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseInput {
    /// New content of the search box; empty clears the search.
    Search(String),
    FirstPage,
    PreviousPage,
    NextPage,
    LastPage,
    Page(usize),
    PageSize(usize),
    Edit {
        id: String,
        field: String,
        value: String,
    },
    Save,
    Discard,
    Assign(String),
    Refresh,
    Help,
    Quit,
}

const BROWSE_HELP: &str = "\
Type to search other accounts' contacts (empty line clears the search).
Commands: :f :p :n :l  first/previous/next/last page   :page N   :size N
          :edit ID FIELD=VALUE   :save   :discard   :assign ID
          :refresh   :help   :q";

fn parse_browse_input(line: &str) -> Result<BrowseInput> {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Ok(BrowseInput::Search(line.trim().to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    let input = match (name, rest.as_slice()) {
        ("f" | "first", []) => BrowseInput::FirstPage,
        ("p" | "prev", []) => BrowseInput::PreviousPage,
        ("n" | "next", []) => BrowseInput::NextPage,
        ("l" | "last", []) => BrowseInput::LastPage,
        ("page", [n]) => BrowseInput::Page(parse_number(n)?),
        ("size", [n]) => BrowseInput::PageSize(parse_number(n)?),
        ("edit", [id, assignment]) => {
            let (field, value) = parse_assignment(assignment)?;
            BrowseInput::Edit {
                id: id.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        ("save", []) => BrowseInput::Save,
        ("discard", []) => BrowseInput::Discard,
        ("assign", [id]) => BrowseInput::Assign(id.to_string()),
        ("refresh", []) => BrowseInput::Refresh,
        ("help" | "h" | "?", []) => BrowseInput::Help,
        ("q" | "quit", []) => BrowseInput::Quit,
        _ => {
            return Err(CrmError::Validation(format!(
                "Unknown command: {}",
                line.trim()
            )))
        }
    };
    Ok(input)
}

fn parse_number(s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| CrmError::Validation(format!("Not a number: {}", s)))
}

async fn apply_browse_input<S: RecordService>(
    table: &mut ContactsTable<S, TerminalNotifier>,
    input: BrowseInput,
) -> Result<()> {
    match input {
        BrowseInput::Search(key) => table.on_search_input(&key).await?,
        BrowseInput::FirstPage => table.first_page(),
        BrowseInput::PreviousPage => table.previous_page(),
        BrowseInput::NextPage => table.next_page(),
        BrowseInput::LastPage => table.last_page(),
        BrowseInput::Page(n) => table.go_to_page(n),
        BrowseInput::PageSize(n) => table.set_page_size(n).unwrap_or_else(|e| print_error(&e)),
        BrowseInput::Edit { id, field, value } => table
            .set_draft(&id, &field, &value)
            .unwrap_or_else(|e| print_error(&e)),
        BrowseInput::Save => {
            table.save(OperationKind::Updated).await?;
        }
        BrowseInput::Discard => table.discard_drafts(),
        BrowseInput::Assign(id) => {
            table.assign_to_account(&id).await?;
        }
        BrowseInput::Refresh => table.refresh().await?,
        BrowseInput::Help | BrowseInput::Quit => {}
    }
    Ok(())
}

fn print_error(e: &CrmError) {
    println!("{}", e.to_string().red());
}

async fn handle_contacts_browse(
    api: &Api,
    notifier: &TerminalNotifier,
    account: String,
) -> Result<()> {
    let mut table = open_contacts(api, notifier, &account).await?;
    print_table(&table);
    println!("{}", BROWSE_HELP.dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = match parse_browse_input(&line) {
                    Ok(BrowseInput::Quit) => break,
                    Ok(BrowseInput::Help) => {
                        println!("{}", BROWSE_HELP.dimmed());
                        continue;
                    }
                    Ok(input) => input,
                    Err(e) => {
                        print_error(&e);
                        continue;
                    }
                };
                let searching = matches!(&input, BrowseInput::Search(key) if !key.is_empty());
                match apply_browse_input(&mut table, input).await {
                    // Already shown as a notification.
                    Err(e) => debug!(error = %e, "browse command failed"),
                    Ok(()) if searching => continue,
                    Ok(()) => print_table(&table),
                }
            }
            key = table.debounced_key() => {
                if table.perform_search(&key).await.is_ok() {
                    print_table(&table);
                }
            }
        }
    }
    Ok(())
}

// --- Config & init ---

fn handle_config(api: &mut Api, key: Option<String>, value: Option<String>) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = api.update_config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            for key in CrmConfig::keys() {
                println!("{} = {}", key, config.get(key).unwrap_or_default());
            }
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_init(api: &mut Api, user: Option<String>) -> Result<()> {
    let result = api.init(user)?;
    print_messages(&result.messages);
    Ok(())
}

/// Splits `FIELD=VALUE`. The value may be empty (clears the field); the
/// field may not.
fn parse_assignment(s: &str) -> Result<(&str, &str)> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value)),
        _ => Err(CrmError::Validation(format!(
            "Expected FIELD=VALUE, got: {}",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(parse_assignment("Phone=555").unwrap(), ("Phone", "555"));
        assert_eq!(parse_assignment("Email=").unwrap(), ("Email", ""));
        assert_eq!(parse_assignment("Note=a=b").unwrap(), ("Note", "a=b"));
        assert!(parse_assignment("Phone").is_err());
        assert!(parse_assignment("=555").is_err());
    }

    #[test]
    fn only_an_explicit_yes_deletes() {
        assert_eq!(confirm_button("y\n"), DELETE_BUTTON);
        assert_eq!(confirm_button(" Yes "), DELETE_BUTTON);
        assert_eq!(confirm_button("\n"), CANCEL_BUTTON);
        assert_eq!(confirm_button("nope"), CANCEL_BUTTON);
    }

    #[test]
    fn plain_lines_are_search_text() {
        assert_eq!(
            parse_browse_input("smith").unwrap(),
            BrowseInput::Search("smith".into())
        );
        assert_eq!(parse_browse_input("").unwrap(), BrowseInput::Search(String::new()));
    }

    #[test]
    fn colon_lines_are_commands() {
        assert_eq!(parse_browse_input(":n").unwrap(), BrowseInput::NextPage);
        assert_eq!(parse_browse_input(":size 10").unwrap(), BrowseInput::PageSize(10));
        assert_eq!(
            parse_browse_input(":edit 003A Phone=555").unwrap(),
            BrowseInput::Edit {
                id: "003A".into(),
                field: "Phone".into(),
                value: "555".into(),
            }
        );
        assert_eq!(
            parse_browse_input(":assign 003B1").unwrap(),
            BrowseInput::Assign("003B1".into())
        );
        assert_eq!(parse_browse_input(":q").unwrap(), BrowseInput::Quit);
    }

    #[test]
    fn bad_commands_are_rejected() {
        assert!(parse_browse_input(":size ten").is_err());
        assert!(parse_browse_input(":edit 003A").is_err());
        assert!(parse_browse_input(":bogus").is_err());
    }
}
