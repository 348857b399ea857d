//! Prestige back office: persistence, payments, notifications and the domain
//! services built on them.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod notifications;
pub mod payments;
pub mod store;

#[cfg(test)]
mod test;

mod uuids;
