//! OpenTelemetry tracer provider setup.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};
use tracing::warn;

use crate::config::observability::ObservabilityConfig;

use super::ObservabilityError;

const SERVICE_NAMESPACE: &str = "prestige";

fn resource(observability: &ObservabilityConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(observability.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.namespace", SERVICE_NAMESPACE),
            KeyValue::new("service.version", observability.otel_service_version.clone()),
            KeyValue::new(
                "deployment.environment.name",
                observability.otel_deployment_environment.clone(),
            ),
        ])
        .build()
}

fn sampler(ratio: f64) -> Sampler {
    let clamped = ratio.clamp(0.0, 1.0);

    if (clamped - ratio).abs() > f64::EPSILON {
        warn!(ratio, clamped, "trace sample ratio outside 0.0..=1.0");
    }

    Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(clamped)))
}

/// Batch-export spans over OTLP gRPC. Caller traces decide sampling when they
/// carry a parent.
pub(super) fn build_tracer_provider(
    observability: &ObservabilityConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(observability.otel_exporter_otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(
            observability.otel_exporter_otlp_timeout_seconds,
        ))
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler(observability.otel_trace_sample_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource(observability))
        .with_batch_exporter(exporter)
        .build())
}
