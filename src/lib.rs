//! Prestige
//!
//! Pure domain rules for the Prestige Rentals back office: rental pricing,
//! booking and payment state machines, the consolidated booking display
//! status, invoice totals and rental agreement expiry.

pub mod agreements;
pub mod bookings;
pub mod invoices;
pub mod money;
pub mod pricing;
