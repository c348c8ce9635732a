//! Invoice entry form: line items, running totals and JSON import/export.
//!
//! [`form::InvoiceForm`] is the state manager; the `invoice-form` binary is
//! an interactive terminal front end on top of it.
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod store;

pub use error::{ConfigError, FormError, StoreError};
pub use form::{FormOptions, InvoiceForm};
pub use model::{BillTo, Invoice, Item, ShipTo};
