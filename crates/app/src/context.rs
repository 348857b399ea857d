//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, KvAuthService},
    database,
    domain::{
        agreements::{AgreementsService, KvAgreementsService},
        bookings::{BookingsService, KvBookingsService},
        invoices::{InvoicesService, KvInvoicesService},
        settings::{KvSettingsService, SettingsService},
    },
    notifications::Notifier,
    payments::PaymentGateway,
    store::{KvStore, MemoryKvStore, PgKvStore},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub bookings: Arc<dyn BookingsService>,
    pub agreements: Arc<dyn AgreementsService>,
    pub invoices: Arc<dyn InvoicesService>,
    pub settings: Arc<dyn SettingsService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Wire every service onto one store.
    #[must_use]
    pub fn new(
        store: Arc<dyn KvStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            bookings: Arc::new(KvBookingsService::new(
                Arc::clone(&store),
                gateway,
                Arc::clone(&notifier),
            )),
            agreements: Arc::new(KvAgreementsService::new(
                Arc::clone(&store),
                Arc::clone(&notifier),
            )),
            invoices: Arc::new(KvInvoicesService::new(Arc::clone(&store))),
            settings: Arc::new(KvSettingsService::new(Arc::clone(&store), notifier)),
            auth: Arc::new(KvAuthService::new(store)),
        }
    }

    /// Build application context on `PostgreSQL`, migrating the schema first.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn from_database_url(
        url: &str,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        Ok(Self::new(Arc::new(PgKvStore::new(pool)), gateway, notifier))
    }

    /// Build application context on a process-local store.
    #[must_use]
    pub fn in_memory(gateway: Arc<dyn PaymentGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(Arc::new(MemoryKvStore::new()), gateway, notifier)
    }
}
