use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use qikspare_core::InvoiceId;
use qikspare_invoicing::{InvoiceRecord, PartyInfo, PartyRole};

use crate::error::GatewayError;
use crate::gateway::InvoiceGateway;

/// In-memory backend for tests and offline use. Invoices keep insertion
/// order and get ids `mem-1`, `mem-2`, ...
#[derive(Debug, Default)]
pub struct InMemoryInvoiceGateway {
    invoices: RwLock<Vec<InvoiceRecord>>,
    parties: Vec<(PartyRole, PartyInfo)>,
    next_id: AtomicU64,
}

impl InMemoryInvoiceGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_party(mut self, role: PartyRole, party: PartyInfo) -> Self {
        self.parties.push((role, party));
        self
    }

    pub fn len(&self) -> usize {
        self.invoices.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> GatewayError {
        GatewayError::Network("in-memory store lock poisoned".to_string())
    }

    fn not_found(id: &InvoiceId) -> GatewayError {
        GatewayError::NotFound(format!("invoice {id}"))
    }
}

#[async_trait]
impl InvoiceGateway for InMemoryInvoiceGateway {
    async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, GatewayError> {
        let invoices = self.invoices.read().map_err(|_| Self::poisoned())?;
        Ok(invoices.clone())
    }

    async fn fetch_invoice(&self, id: &InvoiceId) -> Result<InvoiceRecord, GatewayError> {
        let invoices = self.invoices.read().map_err(|_| Self::poisoned())?;
        invoices
            .iter()
            .find(|inv| inv.id.as_ref() == Some(id))
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create_invoice(&self, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut stored = invoice.clone();
        stored.id = Some(InvoiceId::new(format!("mem-{n}"))?);
        stored.stored_totals = Some(stored.computed_totals());

        let mut invoices = self.invoices.write().map_err(|_| Self::poisoned())?;
        invoices.push(stored.clone());
        Ok(stored)
    }

    async fn update_invoice(&self, id: &InvoiceId, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError> {
        let mut invoices = self.invoices.write().map_err(|_| Self::poisoned())?;
        let slot = invoices
            .iter_mut()
            .find(|inv| inv.id.as_ref() == Some(id))
            .ok_or_else(|| Self::not_found(id))?;

        let mut stored = invoice.clone();
        stored.id = Some(id.clone());
        stored.stored_totals = Some(stored.computed_totals());
        *slot = stored.clone();
        Ok(stored)
    }

    async fn delete_invoice(&self, id: &InvoiceId) -> Result<(), GatewayError> {
        let mut invoices = self.invoices.write().map_err(|_| Self::poisoned())?;
        let before = invoices.len();
        invoices.retain(|inv| inv.id.as_ref() != Some(id));
        if invoices.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn list_parties(&self, role: PartyRole) -> Result<Vec<PartyInfo>, GatewayError> {
        Ok(self
            .parties
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, p)| p.clone())
            .collect())
    }
}
