//! Back Office Domain Concerns

pub mod agreements;
pub mod bookings;
pub mod invoices;
pub mod settings;

mod validation;
