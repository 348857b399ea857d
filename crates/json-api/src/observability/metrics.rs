//! Prometheus metrics for the back office API.
//!
//! Metrics are registered lazily on first use. If registration fails the
//! error is logged once and every recorder becomes a no-op; `/metrics` then
//! answers 500.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const NAMESPACE: &str = "prestige_json";

const DURATION_BUCKETS: [f64; 13] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    payment_operations_total: IntCounterVec,
    webhook_events_total: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

fn metrics() -> Option<&'static Metrics> {
    METRICS
        .get_or_init(|| {
            Metrics::build()
                .inspect_err(|source| error!("failed to build metrics registry: {source}"))
                .ok()
        })
        .as_ref()
}

fn register<C>(registry: &Registry, collector: C) -> prometheus::Result<C>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;

    Ok(collector)
}

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(NAMESPACE)
}

impl Metrics {
    fn build() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests_total = register(
            &registry,
            IntCounterVec::new(
                opts(
                    "http_requests_total",
                    "HTTP requests by method, route, status class and status code.",
                ),
                &["method", "route", "status_class", "status_code"],
            )?,
        )?;

        let request_duration_seconds = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::from(opts(
                    "http_request_duration_seconds",
                    "HTTP request duration in seconds by method and route.",
                ))
                .buckets(DURATION_BUCKETS.to_vec()),
                &["method", "route"],
            )?,
        )?;

        let requests_in_flight = register(
            &registry,
            IntGauge::with_opts(opts(
                "http_requests_in_flight",
                "HTTP requests currently being served.",
            ))?,
        )?;

        let payment_operations_total = register(
            &registry,
            IntCounterVec::new(
                opts(
                    "payment_operations_total",
                    "Gateway-backed booking operations by operation and outcome.",
                ),
                &["operation", "outcome"],
            )?,
        )?;

        let webhook_events_total = register(
            &registry,
            IntCounterVec::new(
                opts(
                    "webhook_events_total",
                    "Stripe webhook deliveries by outcome.",
                ),
                &["outcome"],
            )?,
        )?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            requests_in_flight,
            payment_operations_total,
            webhook_events_total,
        })
    }
}

/// Keeps the in-flight gauge raised while alive.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard(Option<&'static IntGauge>);

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.requests_in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self(gauge)
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.0 {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_code_label = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(status_code), status_code_label.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

fn record_payment_operation(operation: &str, outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .payment_operations_total
            .with_label_values(&[operation, outcome])
            .inc();
    }
}

/// Count a gateway-backed booking operation by whether it returned `Ok`.
pub(crate) fn record_payment_result<T, E>(operation: &str, result: &Result<T, E>) {
    record_payment_operation(operation, if result.is_ok() { "succeeded" } else { "failed" });
}

/// Count a Stripe webhook delivery, e.g. `"synced"`, `"ignored"` or `"rejected"`.
pub(crate) fn record_webhook_event(outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics.webhook_events_total.with_label_values(&[outcome]).inc();
    }
}

fn encode(metrics: &Metrics) -> Result<(HeaderValue, String), String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    encoder
        .encode(&metrics.registry.gather(), &mut buffer)
        .map_err(|source| format!("failed to encode metrics: {source}"))?;

    let content_type = HeaderValue::from_str(encoder.format_type())
        .map_err(|source| format!("invalid metrics content type: {source}"))?;

    let body =
        String::from_utf8(buffer).map_err(|source| format!("metrics are not utf-8: {source}"))?;

    Ok((content_type, body))
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    };

    match encode(metrics) {
        Ok((content_type, body)) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(body);
        }
        Err(message) => {
            error!("{message}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn exposes_http_payment_and_webhook_metrics() -> TestResult {
        observe_request("GET", "/bookings", 200, 0.042);
        observe_request("POST", "/bookings/{uuid}/capture-deposit", 402, 0.123);
        record_payment_result::<(), ()>("capture_deposit", &Err(()));
        record_webhook_event("synced");

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let body = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await?;

        for name in [
            "prestige_json_http_requests_total",
            "prestige_json_http_request_duration_seconds",
            "prestige_json_http_requests_in_flight",
            "prestige_json_payment_operations_total",
            "prestige_json_webhook_events_total",
        ] {
            assert!(body.contains(name), "missing {name}");
        }

        assert!(body.contains(r#"operation="capture_deposit",outcome="failed""#));

        Ok(())
    }

    #[test]
    fn status_codes_group_by_class() {
        assert_eq!(status_class(201), "2xx");
        assert_eq!(status_class(409), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(42), "other");
    }
}
