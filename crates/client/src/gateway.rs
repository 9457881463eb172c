use std::sync::Arc;

use async_trait::async_trait;
use qikspare_core::InvoiceId;
use qikspare_invoicing::{InvoiceRecord, PartyInfo, PartyRole};

use crate::error::GatewayError;

/// The external backend that owns durable invoices and the user directory.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, GatewayError>;

    async fn fetch_invoice(&self, id: &InvoiceId) -> Result<InvoiceRecord, GatewayError>;

    /// Persist a new invoice; returns the stored copy.
    async fn create_invoice(&self, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError>;

    async fn update_invoice(&self, id: &InvoiceId, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError>;

    async fn delete_invoice(&self, id: &InvoiceId) -> Result<(), GatewayError>;

    /// Directory users with `role`, as invoice parties.
    async fn list_parties(&self, role: PartyRole) -> Result<Vec<PartyInfo>, GatewayError>;

    /// Validate, then update when the invoice already has a backend id and
    /// create otherwise. Invalid invoices are never sent.
    async fn save_invoice(&self, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError> {
        invoice.validate()?;
        match &invoice.id {
            Some(id) => self.update_invoice(id, invoice).await,
            None => self.create_invoice(invoice).await,
        }
    }
}

#[async_trait]
impl<G> InvoiceGateway for Arc<G>
where
    G: InvoiceGateway + ?Sized,
{
    async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, GatewayError> {
        (**self).list_invoices().await
    }

    async fn fetch_invoice(&self, id: &InvoiceId) -> Result<InvoiceRecord, GatewayError> {
        (**self).fetch_invoice(id).await
    }

    async fn create_invoice(&self, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError> {
        (**self).create_invoice(invoice).await
    }

    async fn update_invoice(&self, id: &InvoiceId, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError> {
        (**self).update_invoice(id, invoice).await
    }

    async fn delete_invoice(&self, id: &InvoiceId) -> Result<(), GatewayError> {
        (**self).delete_invoice(id).await
    }

    async fn list_parties(&self, role: PartyRole) -> Result<Vec<PartyInfo>, GatewayError> {
        (**self).list_parties(role).await
    }
}
