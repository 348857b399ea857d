//! Prestige Back Office JSON API Server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject,
    catcher::Catcher,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info, warn};

use prestige_app::{
    context::AppContext,
    notifications::{HttpNotifier, LogNotifier, Notifier},
    payments::{PaymentGateway, StripeGateway},
};

use crate::{
    config::ServerConfig,
    observability::Observability,
    state::{State, WebhookSettings},
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod agreements;
mod auth;
mod bookings;
mod config;
mod envelope;
mod extensions;
mod healthcheck;
mod invoices;
mod observability;
mod router;
mod settings;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod webhooks;

/// Prestige JSON API Server entry point
///
/// # Panics
///
/// Panics if the server fails to bind or serve requests
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let gateway: Arc<dyn PaymentGateway> = match StripeGateway::new(config.payments.stripe()) {
        Ok(gateway) => Arc::new(gateway),
        Err(init_error) => {
            error!("failed to build stripe client: {init_error}");

            process::exit(1);
        }
    };

    let notifier: Arc<dyn Notifier> = match config.email.http_notifier() {
        Some(http) => match HttpNotifier::new(http) {
            Ok(notifier) => Arc::new(notifier),
            Err(init_error) => {
                error!("failed to build email client: {init_error}");

                process::exit(1);
            }
        },
        None => {
            warn!("EMAIL_API_KEY is not set; outgoing email will only be logged");

            Arc::new(LogNotifier)
        }
    };

    let app = match &config.store.database_url {
        Some(database_url) => {
            match AppContext::from_database_url(database_url, gateway, notifier).await {
                Ok(app) => app,
                Err(init_error) => {
                    error!("failed to initialize app context: {init_error}");

                    process::exit(1);
                }
            }
        }
        None => {
            warn!("DATABASE_URL is not set; using an in-memory store");

            AppContext::in_memory(gateway, notifier)
        }
    };

    let webhooks = WebhookSettings {
        secret: config.payments.stripe_webhook_secret.clone(),
        tolerance_seconds: config.payments.stripe_webhook_tolerance_seconds,
    };

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(observability::request_logging)
        .hoop(inject(State::shared(app, webhooks)))
        .push(router::app_router());

    let doc = OpenApi::new("Prestige Back Office API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = if config.server.api_docs {
        router
            .push(doc.into_router("/api-doc/openapi.json"))
            .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"))
    } else {
        router
    };

    let service = Service::new(router).catcher(Catcher::default().hoop(envelope::catch_errors));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(service).await;

    observability.shutdown();
}
