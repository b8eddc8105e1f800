mod commands;
mod notifier;
mod render;
mod setup;

pub use commands::run;
