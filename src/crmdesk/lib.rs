//! # crmdesk Architecture
//!
//! crmdesk is a **UI-agnostic library** for working with Account and Contact
//! records: paged tables, inline edits, debounced search, batched upserts and
//! a delete confirmation. It happens to ship with a CLI client; the CLI is
//! not the application.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints tables and notifications        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Hands out table controllers over one shared service      │
//! │  - Runs config / init                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - ContactsTable, AccountsTable, DeleteConfirmation         │
//! │  - Own list + search + pagination + drafts state            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Service Layer (service/)                                   │
//! │  - Async RecordService trait                                │
//! │  - FileService (production), InMemoryService (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pure pieces sit beside the layers and are used by the commands:
//! [`pagination`] (visible slice and bounds), [`search`] (mode, banner, card
//! title), [`upsert`] (the `[status, message...]` wire result), [`debounce`]
//! (the search timer) and [`model`] (records and column sets).
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust values and returns `Result`s.
//! Outcomes meant for a person go through a [`notify::Notifier`]; the CLI
//! prints them, tests record them.
//!
//! ## Concurrency
//!
//! Everything runs on one thread. Service calls are `async` and the tables
//! are driven through `&mut self`, so a call's answer is applied before the
//! next event is handled. The only timer is the search debounce.
//!
//! ## Testing Strategy
//!
//! 1. **Pure modules**: unit tests beside the code.
//! 2. **Commands**: the bulk of the tests, against `InMemoryService` built
//!    with `StoreFixture`, paused tokio time for debounce timing.
//! 3. **CLI**: `tests/` drives the binary against a temporary data directory.
//!
//! ## Module Overview
//!
//! - [`api`]: facade
//! - [`commands`]: table controllers
//! - [`service`]: record service trait and implementations
//! - [`config`]: `config.json`
//! - [`init`]: data directory resolution and context setup
//! - [`logging`]: tracing subscriber setup
//! - [`error`]: error type

pub mod api;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod error;
pub mod init;
pub mod logging;
pub mod model;
pub mod notify;
pub mod pagination;
pub mod search;
pub mod service;
pub mod upsert;
