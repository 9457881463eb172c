//! `qikspare-core`: domain building blocks shared by the invoicing crates.
//!
//! This crate contains **pure domain** primitives (no IO, no rendering, no HTTP).

pub mod aggregate;
pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::{ExportId, InvoiceId, InvoiceNumber, OrderId, PartyId};
pub use money::Money;
pub use value_object::ValueObject;
