//! `qikspare-invoice` command-line front end.

pub mod commands;
pub mod config;

pub use commands::{App, apply_edits, write_totals};
pub use config::{Cli, Command, Config, InvoicesCommand};
