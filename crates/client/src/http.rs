use async_trait::async_trait;
use qikspare_core::{InvoiceId, Money};
use qikspare_invoicing::{InvoiceRecord, InvoiceTotals, PartyInfo, PartyRole};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::GatewayError;
use crate::gateway::InvoiceGateway;
use crate::users::{UsersResponse, parties_with_role};

const USERS_PATH: &str = "/api/admin/users";
const INVOICES_PATH: &str = "/api/invoices/api/invoices";

/// Body of create/update requests: the invoice plus freshly computed totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload<'a> {
    #[serde(flatten)]
    pub invoice: &'a InvoiceRecord,
    pub computed_totals: InvoiceTotals,
    pub total: Money,
}

impl<'a> SavePayload<'a> {
    pub fn new(invoice: &'a InvoiceRecord) -> Self {
        let computed_totals = invoice.computed_totals();
        Self {
            invoice,
            computed_totals,
            total: computed_totals.grand_total,
        }
    }
}

/// REST client for the invoice backend.
#[derive(Debug, Clone)]
pub struct HttpInvoiceGateway {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpInvoiceGateway {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.config.url(path);
        tracing::debug!(%method, %url, "backend request");
        let mut req = self.client.request(method, url);
        if let Some(token) = &self.config.auth_token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send(&self, req: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response, GatewayError> {
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(error = %e, what, "backend unreachable");
            GatewayError::Network(e.to_string())
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), what, "backend rejected request");
            return Err(GatewayError::Api(status.as_u16(), body));
        }
        Ok(resp)
    }

    async fn json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GatewayError> {
        resp.json().await.map_err(|e| GatewayError::Parse(e.to_string()))
    }

    /// Saved invoice from a create/update response. The backend may answer
    /// with the invoice, an `{ "invoice": ... }` wrapper, or just a message;
    /// in the last case the submitted invoice stands.
    async fn saved(resp: reqwest::Response, submitted: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError> {
        let body = resp.text().await?;
        let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let candidate = match value.get("invoice") {
            Some(inner) => inner.clone(),
            None => value,
        };
        let looks_like_invoice = candidate
            .as_object()
            .is_some_and(|o| o.contains_key("items") || o.contains_key("invoiceNumber"));
        if !looks_like_invoice {
            return Ok(submitted.clone());
        }
        serde_json::from_value(candidate).map_err(|e| GatewayError::Parse(e.to_string()))
    }
}

#[async_trait]
impl InvoiceGateway for HttpInvoiceGateway {
    async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, GatewayError> {
        let req = self.request(reqwest::Method::GET, &format!("{INVOICES_PATH}/list"));
        let resp = self.send(req, "invoice list").await?;
        let value: Value = Self::json(resp).await?;
        // Null or a missing body means no invoices.
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| GatewayError::Parse(e.to_string()))
    }

    async fn fetch_invoice(&self, id: &InvoiceId) -> Result<InvoiceRecord, GatewayError> {
        let req = self.request(reqwest::Method::GET, &format!("{INVOICES_PATH}/{id}"));
        let resp = self.send(req, &format!("invoice {id}")).await?;
        Self::json(resp).await
    }

    async fn create_invoice(&self, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError> {
        let req = self
            .request(reqwest::Method::POST, &format!("{INVOICES_PATH}/create"))
            .json(&SavePayload::new(invoice));
        let resp = self.send(req, "invoice create").await?;
        let saved = Self::saved(resp, invoice).await?;
        tracing::info!(
            invoice_number = saved.invoice_number.as_ref().map(|n| n.as_str()).unwrap_or("-"),
            "invoice created"
        );
        Ok(saved)
    }

    async fn update_invoice(&self, id: &InvoiceId, invoice: &InvoiceRecord) -> Result<InvoiceRecord, GatewayError> {
        let req = self
            .request(reqwest::Method::PATCH, &format!("{INVOICES_PATH}/update/{id}"))
            .json(&SavePayload::new(invoice));
        let resp = self.send(req, &format!("invoice {id}")).await?;
        let saved = Self::saved(resp, invoice).await?;
        tracing::info!(%id, "invoice updated");
        Ok(saved)
    }

    async fn delete_invoice(&self, id: &InvoiceId) -> Result<(), GatewayError> {
        let req = self.request(reqwest::Method::DELETE, &format!("{INVOICES_PATH}/delete/{id}"));
        self.send(req, &format!("invoice {id}")).await?;
        tracing::info!(%id, "invoice deleted");
        Ok(())
    }

    async fn list_parties(&self, role: PartyRole) -> Result<Vec<PartyInfo>, GatewayError> {
        let req = self.request(reqwest::Method::GET, USERS_PATH);
        let resp = self.send(req, "user directory").await?;
        let users: UsersResponse = Self::json(resp).await?;
        Ok(parties_with_role(&users.users, role))
    }
}
