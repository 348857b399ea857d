//! Request-level logging, request IDs, and parent trace extraction.

mod parent_context;
mod request_ids;
mod spans;

use std::time::Instant;

use salvo::{
    Request, handler,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, error, info, warn};

use crate::extensions::*;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Wrap each admin request in an `http.request` span, count it, and log how
/// it ended. The acting admin token label is recorded once authentication
/// has run.
#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let path = req.uri().path().to_owned();

    if settings::is_quiet_path(&path) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let names = spans::request_span_name(&method, &path);
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %names.otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %req.remote_addr(),
        admin = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    parent_context::adopt_parent(&span, req.headers());

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    if let Some(session) = depot.admin_session() {
        span.record("admin", session.label.as_str());
    }

    let duration = started.elapsed();
    let status = request_ids::response_status(res);

    metrics::observe_request(&method, &names.otel_path, status.as_u16(), duration.as_secs_f64());

    span.record("status", status.as_u16());
    span.record("duration_ms", duration.as_millis());

    span.in_scope(|| log_outcome(status, duration.as_millis()));
}

fn log_outcome(status: salvo::http::StatusCode, duration_ms: u128) {
    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    if status.is_server_error() {
        error!(status = status.as_u16(), duration_ms, "request failed");
    } else if status.is_client_error() {
        warn!(status = status.as_u16(), duration_ms, "request rejected");
    } else {
        info!(status = status.as_u16(), duration_ms, "request completed");
    }

    if duration_ms > threshold_ms {
        warn!(duration_ms, threshold_ms, "slow request");
    }
}
