//! App Router

use salvo::Router;

use crate::{
    agreements, auth, bookings, healthcheck, invoices, observability::metrics_handler, settings,
    webhooks,
};

/// Every route the server exposes, minus the API docs.
pub fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(Router::with_path("webhooks/stripe").post(webhooks::stripe))
        .push(admin_router())
}

fn admin_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(bookings_router())
        .push(
            Router::with_path("agreements/{agreement}")
                .get(agreements::get::handler)
                .push(Router::with_path("sign").post(agreements::sign::handler)),
        )
        .push(invoices_router())
        .push(
            Router::with_path("settings/notifications")
                .get(settings::get::handler)
                .put(settings::update::handler)
                .push(Router::with_path("test").post(settings::test_notification::handler)),
        )
}

fn bookings_router() -> Router {
    Router::with_path("bookings")
        .get(bookings::index::handler)
        .post(bookings::create::handler)
        .push(
            Router::with_path("{booking}")
                .get(bookings::get::handler)
                .put(bookings::update::handler)
                .delete(bookings::delete::handler)
                .push(Router::with_path("confirm").post(bookings::lifecycle::confirm))
                .push(Router::with_path("start").post(bookings::lifecycle::start))
                .push(Router::with_path("complete").post(bookings::lifecycle::complete))
                .push(Router::with_path("cancel").post(bookings::cancel::handler))
                .push(Router::with_path("reschedule").post(bookings::reschedule::handler))
                .push(Router::with_path("capture-deposit").post(bookings::deposit::capture))
                .push(
                    Router::with_path("reauthorize-deposit").post(bookings::deposit::reauthorize),
                )
                .push(Router::with_path("sync-deposit").post(bookings::deposit::sync))
                .push(Router::with_path("charge-final").post(bookings::charge_final::handler))
                .push(Router::with_path("adjustments").post(bookings::adjustments::handler))
                .push(
                    Router::with_path("agreements")
                        .get(agreements::index::handler)
                        .post(agreements::create::handler)
                        .push(Router::with_path("active").get(agreements::active::handler)),
                ),
        )
}

fn invoices_router() -> Router {
    Router::with_path("invoices")
        .get(invoices::index::handler)
        .post(invoices::create::handler)
        .push(
            Router::with_path("{invoice}")
                .get(invoices::get::handler)
                .put(invoices::update::handler)
                .delete(invoices::delete::handler)
                .push(Router::with_path("send").post(invoices::status::send))
                .push(Router::with_path("pay").post(invoices::status::pay))
                .push(Router::with_path("overdue").post(invoices::status::overdue))
                .push(Router::with_path("cancel").post(invoices::status::cancel)),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::Value;
    use testresult::TestResult;

    use crate::test_helpers::Mocks;

    use super::*;

    fn make_service() -> Service {
        Service::new(
            Router::new()
                .hoop(inject(Mocks::default().into_state()))
                .push(app_router()),
        )
    }

    #[tokio::test]
    async fn test_healthcheck_is_public() -> TestResult {
        let res = TestClient::get("http://example.com/healthcheck")
            .send(&make_service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() -> TestResult {
        for (method, path) in [
            ("GET", "/bookings"),
            ("POST", "/invoices"),
            ("GET", "/settings/notifications"),
            ("POST", "/agreements/0192aaaa-0000-7000-8000-000000000001/sign"),
        ] {
            let url = format!("http://example.com{path}");
            let request = match method {
                "GET" => TestClient::get(url),
                _ => TestClient::post(url),
            };

            let mut res = request.send(&make_service()).await;
            let body: Value = res.take_json().await?;

            assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED), "{method} {path}");
            assert_eq!(body["success"], false);
        }

        Ok(())
    }
}
