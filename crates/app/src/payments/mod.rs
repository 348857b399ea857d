//! Payments

mod gateway;
pub mod stripe;
pub mod webhook;

pub use gateway::*;
pub use stripe::{StripeConfig, StripeGateway};
