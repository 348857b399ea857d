//! Booking Handlers

pub(crate) mod adjustments;
pub(crate) mod cancel;
pub(crate) mod charge_final;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod deposit;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod lifecycle;
pub(crate) mod reschedule;
pub(crate) mod update;
