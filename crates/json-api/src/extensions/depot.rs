//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::Depot;

use prestige_app::auth::AdminSession;

use crate::envelope::ApiError;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_admin_session(&mut self, session: AdminSession);

    /// The session the auth middleware attached, if any.
    fn admin_session(&self) -> Option<&AdminSession>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>().map_err(|_ignored| ApiError::internal())
    }

    fn insert_admin_session(&mut self, session: AdminSession) {
        self.inject(session);
    }

    fn admin_session(&self) -> Option<&AdminSession> {
        self.obtain::<AdminSession>().ok()
    }
}
