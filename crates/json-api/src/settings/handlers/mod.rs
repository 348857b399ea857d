//! Settings Handlers

pub(crate) mod get;
pub(crate) mod test_notification;
pub(crate) mod update;
