//! Invoices

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::InvoicesServiceError;
pub use service::*;
