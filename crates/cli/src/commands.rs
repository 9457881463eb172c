use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use qikspare_client::InvoiceGateway;
use qikspare_core::{Aggregate, InvoiceId};
use qikspare_export::{ExportOptions, Exporter, export_filename};
use qikspare_invoicing::{
    DocumentType, DraftCommand, DraftEdit, InvoiceDraft, InvoiceFilter, InvoiceRecord, platform_fee_breakdown,
};
use qikspare_render::{Renderer, format};

use crate::config::{Command, InvoicesCommand};

/// Everything a command needs. Output goes to the writer passed to
/// [`App::run`], never straight to stdout.
pub struct App<G> {
    gateway: G,
    renderer: Renderer,
    exporter: Exporter,
    output_dir: PathBuf,
}

impl<G: InvoiceGateway> App<G> {
    pub fn new(gateway: G, options: ExportOptions, output_dir: PathBuf) -> Result<Self> {
        let exporter = Exporter::new(options).context("invalid export options")?;
        Ok(Self {
            gateway,
            renderer: Renderer::default(),
            exporter,
            output_dir,
        })
    }

    pub async fn run(&self, command: Command, out: &mut dyn Write) -> Result<()> {
        match command {
            Command::New { out: target } => {
                let draft = InvoiceDraft::start(Utc::now());
                let json = to_json(draft.record())?;
                match target {
                    Some(path) => write_file(&path, &json)?,
                    None => writeln!(out, "{json}")?,
                }
            }
            Command::Edit { file, edits, out: target } => {
                let record = read_invoice(&file)?;
                let edits = read_edits(&edits)?;
                let edited = apply_edits(record, edits, Utc::now())?;
                write_file(target.as_deref().unwrap_or(&file), &to_json(&edited)?)?;
                write_totals(&edited, out)?;
            }
            Command::Totals { file } => write_totals(&read_invoice(&file)?, out)?,
            Command::Render {
                file,
                document_type,
                out: target,
            } => {
                let invoice = read_invoice(&file)?;
                let html = self.renderer.render(&invoice, document_type).to_html();
                match target {
                    Some(path) => write_file(&path, &html)?,
                    None => writeln!(out, "{html}")?,
                }
            }
            Command::Export {
                file,
                document_type,
                out_dir,
            } => {
                let invoice = read_invoice(&file)?;
                let path = self.export(&invoice, document_type, out_dir.as_deref()).await?;
                writeln!(out, "{}", path.display())?;
            }
            Command::Invoices { command } => self.run_invoices(command, out).await?,
            Command::Parties { role } => {
                let parties = self
                    .gateway
                    .list_parties(role)
                    .await
                    .with_context(|| format!("failed to load {} parties", role.as_str()))?;
                for party in parties {
                    let id = party.id.as_ref().map(|id| id.as_str()).unwrap_or("-");
                    writeln!(out, "{id}\t{}\t{}", party.name, format::text_or_placeholder(&party.phone))?;
                }
            }
        }
        Ok(())
    }

    async fn run_invoices(&self, command: InvoicesCommand, out: &mut dyn Write) -> Result<()> {
        match command {
            InvoicesCommand::List { search, from, to } => {
                let filter = InvoiceFilter { search, from, to };
                let invoices = self.gateway.list_invoices().await.context("failed to list invoices")?;
                for invoice in filter.apply(invoices) {
                    writeln!(
                        out,
                        "{}\t{}\t{}\t{}\t{}",
                        format::optional(invoice.id.as_ref()),
                        format::optional(invoice.invoice_number.as_ref()),
                        format::date(invoice.invoice_date),
                        format::text_or_placeholder(&invoice.buyer.name),
                        invoice.computed_totals().grand_total,
                    )?;
                }
            }
            InvoicesCommand::Show { id } => {
                let invoice = self.fetch(&id).await?;
                writeln!(out, "{}", to_json(&invoice)?)?;
            }
            InvoicesCommand::Export {
                id,
                document_type,
                out_dir,
            } => {
                let invoice = self.fetch(&id).await?;
                let path = self.export(&invoice, document_type, out_dir.as_deref()).await?;
                writeln!(out, "{}", path.display())?;
            }
            InvoicesCommand::Save { file } => {
                let invoice = read_invoice(&file)?;
                let saved = self.gateway.save_invoice(&invoice).await.context("failed to save invoice")?;
                writeln!(
                    out,
                    "saved {} ({})",
                    format::optional(saved.id.as_ref()),
                    saved.computed_totals().grand_total
                )?;
            }
            InvoicesCommand::Delete { id } => {
                let id = parse_id(&id)?;
                self.gateway
                    .delete_invoice(&id)
                    .await
                    .with_context(|| format!("failed to delete invoice {id}"))?;
                writeln!(out, "deleted {id}")?;
            }
        }
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<InvoiceRecord> {
        let id = parse_id(id)?;
        self.gateway
            .fetch_invoice(&id)
            .await
            .with_context(|| format!("failed to load invoice {id}"))
    }

    /// Validate, render and export; returns the saved file path.
    async fn export(&self, invoice: &InvoiceRecord, document_type: DocumentType, dir: Option<&Path>) -> Result<PathBuf> {
        invoice.validate().context("invoice is not ready for export")?;

        let document = self.renderer.render(invoice, document_type);
        let filename = export_filename(document_type, Utc::now().timestamp_millis());
        let exported = self
            .exporter
            .export_in_background(document, filename)
            .await
            .context("failed to export invoice")?;

        let dir = dir.unwrap_or(&self.output_dir);
        let path = exported
            .save_to(dir)
            .with_context(|| format!("failed to write PDF into {}", dir.display()))?;
        tracing::info!(path = %path.display(), pages = exported.page_count, "export finished");
        Ok(path)
    }
}

/// Replay `edits` through an authoring session and return the result.
pub fn apply_edits(record: InvoiceRecord, edits: Vec<DraftEdit>, at: DateTime<Utc>) -> Result<InvoiceRecord> {
    let mut draft = InvoiceDraft::from_record(record, at);
    for (n, edit) in edits.into_iter().enumerate() {
        draft
            .execute(&DraftCommand::new(edit, at))
            .with_context(|| format!("edit #{} rejected", n + 1))?;
    }
    Ok(draft.record().clone())
}

pub fn write_totals(invoice: &InvoiceRecord, out: &mut dyn Write) -> Result<()> {
    let totals = invoice.computed_totals();
    writeln!(out, "Subtotal:        {}", totals.subtotal)?;
    writeln!(out, "Total GST:       {}", totals.total_gst)?;
    writeln!(out, "Delivery Charge: {}", invoice.delivery_charge)?;
    writeln!(out, "Grand Total:     {}", totals.grand_total)?;

    let fees = platform_fee_breakdown(invoice.platform_fee, invoice.delivery_charge);
    writeln!(out, "Platform fee invoice:")?;
    for row in &fees.rows {
        writeln!(
            out,
            "  {:<15}{} + GST {} {} = {}",
            row.kind.label(),
            row.amount,
            format::percent(row.gst_rate),
            row.gst_amount,
            row.total
        )?;
    }
    writeln!(out, "  {:<15}{}", "Grand Total", fees.grand_total)?;
    Ok(())
}

fn parse_id(raw: &str) -> Result<InvoiceId> {
    InvoiceId::new(raw).with_context(|| format!("invalid invoice id {raw:?}"))
}

fn read_invoice(path: &Path) -> Result<InvoiceRecord> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not an invoice", path.display()))
}

fn read_edits(path: &Path) -> Result<Vec<DraftEdit>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a list of edits", path.display()))
}

fn to_json(invoice: &InvoiceRecord) -> Result<String> {
    serde_json::to_string_pretty(invoice).context("failed to serialise invoice")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
