use clap::{Args, Parser, Subcommand};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.1.0" for releases, "0.1.0@abc1234 2026-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "crmdesk", bin_name = "crmdesk", version = get_version())]
#[command(about = "Account and Contact tables for the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List, create, edit and delete accounts
    #[command(subcommand, alias = "a")]
    Accounts(AccountCommands),

    /// Work with the contacts of one account
    #[command(subcommand, alias = "c")]
    Contacts(ContactCommands),

    /// Get or set configuration
    Config {
        /// Configuration key (page-sizes, page-size, search-debounce-ms, current-user)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Create the data directory and default configuration
    Init {
        /// Name shown as the current user
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// List all accounts
    #[command(alias = "ls")]
    List,

    /// Create an account
    #[command(alias = "n")]
    Add {
        /// Account name words (joined with spaces)
        #[arg(num_args = 0..)]
        name: Vec<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Value for the Active field (e.g. Yes / No)
        #[arg(long)]
        active: Option<String>,
    },

    /// Edit fields of one account
    Update {
        id: String,

        /// Field assignment, repeatable (e.g. --set Rating=Hot)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        sets: Vec<String>,
    },

    /// Delete an account and its contacts
    #[command(alias = "rm")]
    Delete {
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page to show
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Records per page (defaults to the configured size)
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    /// List the account's own contacts
    #[command(alias = "ls")]
    List {
        account: String,

        #[command(flatten)]
        paging: PageArgs,
    },

    /// Search other accounts' contacts
    Search {
        account: String,

        key: String,

        #[command(flatten)]
        paging: PageArgs,
    },

    /// Add a contact to the account
    #[command(alias = "n")]
    Add {
        account: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Edit fields of one of the account's contacts
    Update {
        account: String,

        id: String,

        /// Field assignment, repeatable (e.g. --set Phone=555-0100)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        sets: Vec<String>,
    },

    /// Move a contact found by a search into the account
    Assign {
        account: String,

        id: String,

        /// Search key that finds the contact
        #[arg(long)]
        search: String,
    },

    /// Interactive table with live search
    Browse { account: String },
}
