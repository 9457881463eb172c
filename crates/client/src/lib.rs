//! Backend access for invoices and the user directory.
//!
//! `InvoiceGateway` is the seam; `HttpInvoiceGateway` talks to the REST
//! backend and `InMemoryInvoiceGateway` backs tests and offline runs.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod users;

pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::GatewayError;
pub use gateway::InvoiceGateway;
pub use http::{HttpInvoiceGateway, SavePayload};
pub use memory::InMemoryInvoiceGateway;
pub use users::{Location, UserRecord, UsersResponse, parties_with_role};
