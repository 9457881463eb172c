//! Command-line surface. Every setting can also come from a `QIKSPARE_*`
//! environment variable.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use qikspare_client::{ClientConfig, DEFAULT_API_URL};
use qikspare_export::{ExportOptions, FontChoice};
use qikspare_invoicing::{DocumentType, PartyRole};
use qikspare_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "qikspare-invoice", version, about = "Compute, render and export QikSpare invoices")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Backend base URL.
    #[arg(long, env = "QIKSPARE_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Bearer token for the backend.
    #[arg(long, env = "QIKSPARE_AUTH_TOKEN", hide_env_values = true, global = true)]
    pub auth_token: Option<String>,

    /// Directory exported PDFs are written to.
    #[arg(long, env = "QIKSPARE_OUTPUT_DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// `pretty` or `json`.
    #[arg(long, env = "QIKSPARE_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    /// TrueType font for PDF text; Helvetica when unset.
    #[arg(long, env = "QIKSPARE_FONT_PATH", global = true)]
    pub font_path: Option<PathBuf>,
}

impl Config {
    pub fn client(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.api_url);
        match &self.auth_token {
            Some(token) => config.with_token(token),
            None => config,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        match &self.font_path {
            Some(path) => ExportOptions::default().with_font(FontChoice::TrueType(path.clone())),
            None => ExportOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write a fresh draft invoice as JSON
    New {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Apply a JSON list of draft edits to an invoice file
    Edit {
        file: PathBuf,
        edits: PathBuf,
        /// Where to write the edited invoice; defaults to overwriting `file`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the totals of an invoice file
    Totals { file: PathBuf },
    /// Render an invoice file to HTML
    Render {
        file: PathBuf,
        #[arg(long = "type", default_value = "customer")]
        document_type: DocumentType,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export an invoice file to PDF
    Export {
        file: PathBuf,
        #[arg(long = "type", default_value = "customer")]
        document_type: DocumentType,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Work with invoices stored by the backend
    Invoices {
        #[command(subcommand)]
        command: InvoicesCommand,
    },
    /// List garages (buyers) or vendors (sellers)
    Parties {
        #[arg(long)]
        role: PartyRole,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum InvoicesCommand {
    /// List invoices, optionally filtered
    List {
        /// Matches buyer, seller or invoice number.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Print one invoice as JSON
    Show { id: String },
    /// Export a stored invoice to PDF
    Export {
        id: String,
        #[arg(long = "type", default_value = "customer")]
        document_type: DocumentType,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Create or update an invoice from a JSON file
    Save { file: PathBuf },
    /// Delete an invoice
    Delete { id: String },
}
