//! Stripe REST gateway
//!
//! Speaks the form-encoded Stripe API directly with bearer auth. Calls are
//! never retried; a failure is returned to the caller as soon as it happens.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{info, instrument, warn};

use super::gateway::{CustomerCharge, GatewayError, PaymentGateway, PaymentIntent, Refund};

/// Default Stripe API origin.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

const CURRENCY: &str = "usd";

/// Stripe connection settings.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_...`).
    pub secret_key: String,

    /// API origin, overridable for test doubles.
    pub api_base: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"**redacted**")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureMethod {
    Automatic,
    Manual,
}

impl CaptureMethod {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    decline_code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentMethodList {
    data: Vec<PaymentMethodSummary>,
}

#[derive(Debug, Deserialize)]
struct PaymentMethodSummary {
    id: String,
}

/// [`PaymentGateway`] backed by Stripe.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    http: Client,
    config: StripeConfig,
}

impl StripeGateway {
    /// Build a gateway with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: StripeConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder, idempotency_key: Option<&str>) -> RequestBuilder {
        let request = request.bearer_auth(&self.config.secret_key);

        match idempotency_key {
            Some(key) => request.header("Idempotency-Key", key),
            None => request,
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, GatewayError> {
        let request = self.authorize(self.http.post(self.url(path)).form(form), idempotency_key);

        Self::send(request).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let request = self.authorize(self.http.get(self.url(path)).query(params), None);

        Self::send(request).await
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|error| transport_error(&error))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| transport_error(&error))?;

        if !status.is_success() {
            let error = map_error(status, &body);

            warn!(
                status = status.as_u16(),
                code = %error.code,
                "stripe request failed"
            );

            return Err(error);
        }

        serde_json::from_str(&body)
            .map_err(|source| GatewayError::new("invalid_response", source.to_string()))
    }

    async fn resolve_payment_method(
        &self,
        customer: &str,
        payment_method: Option<&str>,
    ) -> Result<String, GatewayError> {
        if let Some(payment_method) = payment_method {
            return Ok(payment_method.to_string());
        }

        let methods: PaymentMethodList = self
            .get_json(
                "/v1/payment_methods",
                &[("customer", customer), ("type", "card"), ("limit", "1")],
            )
            .await?;

        methods
            .data
            .into_iter()
            .next()
            .map(|method| method.id)
            .ok_or_else(|| {
                GatewayError::new(
                    "no_payment_method",
                    format!("Customer {customer} has no saved card"),
                )
            })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, charge), fields(customer = %charge.customer, amount = charge.amount), err)]
    async fn create_payment_intent(
        &self,
        charge: CustomerCharge,
    ) -> Result<PaymentIntent, GatewayError> {
        let mut form = intent_form(&charge, CaptureMethod::Manual);

        if let Some(payment_method) = charge.payment_method.as_deref() {
            form.push(("payment_method".to_string(), payment_method.to_string()));
            form.push(("confirm".to_string(), "true".to_string()));
        }

        let intent: PaymentIntent = self
            .post_form(
                "/v1/payment_intents",
                &form,
                charge.idempotency_key.as_deref(),
            )
            .await?;

        info!(intent_id = %intent.id, status = %intent.status, "created deposit intent");

        Ok(intent)
    }

    #[instrument(skip(self), err)]
    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        self.get_json(&format!("/v1/payment_intents/{intent_id}"), &[])
            .await
    }

    #[instrument(skip(self), err)]
    async fn capture(
        &self,
        intent_id: &str,
        amount: Option<u64>,
    ) -> Result<PaymentIntent, GatewayError> {
        let form: Vec<(String, String)> = amount
            .map(|amount| ("amount_to_capture".to_string(), amount.to_string()))
            .into_iter()
            .collect();

        self.post_form(
            &format!("/v1/payment_intents/{intent_id}/capture"),
            &form,
            None,
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn refund(&self, intent_id: &str, amount: u64) -> Result<Refund, GatewayError> {
        let form = vec![
            ("payment_intent".to_string(), intent_id.to_string()),
            ("amount".to_string(), amount.to_string()),
        ];

        self.post_form("/v1/refunds", &form, None).await
    }

    #[instrument(skip(self, charge), fields(customer = %charge.customer, amount = charge.amount), err)]
    async fn charge_off_session(
        &self,
        charge: CustomerCharge,
    ) -> Result<PaymentIntent, GatewayError> {
        let payment_method = self
            .resolve_payment_method(&charge.customer, charge.payment_method.as_deref())
            .await?;

        let form = off_session_form(&charge, &payment_method, CaptureMethod::Automatic);

        self.post_form(
            "/v1/payment_intents",
            &form,
            charge.idempotency_key.as_deref(),
        )
        .await
    }

    #[instrument(skip(self, charge), fields(customer = %charge.customer, amount = charge.amount), err)]
    async fn reauthorize(&self, charge: CustomerCharge) -> Result<PaymentIntent, GatewayError> {
        let payment_method = self
            .resolve_payment_method(&charge.customer, charge.payment_method.as_deref())
            .await?;

        let form = off_session_form(&charge, &payment_method, CaptureMethod::Manual);

        self.post_form(
            "/v1/payment_intents",
            &form,
            charge.idempotency_key.as_deref(),
        )
        .await
    }
}

fn intent_form(charge: &CustomerCharge, capture: CaptureMethod) -> Vec<(String, String)> {
    vec![
        ("amount".to_string(), charge.amount.to_string()),
        ("currency".to_string(), CURRENCY.to_string()),
        ("customer".to_string(), charge.customer.clone()),
        ("capture_method".to_string(), capture.as_str().to_string()),
        ("description".to_string(), charge.description.clone()),
        ("metadata[booking_id]".to_string(), charge.booking_id.clone()),
    ]
}

fn off_session_form(
    charge: &CustomerCharge,
    payment_method: &str,
    capture: CaptureMethod,
) -> Vec<(String, String)> {
    let mut form = intent_form(charge, capture);

    form.extend([
        ("payment_method".to_string(), payment_method.to_string()),
        ("off_session".to_string(), "true".to_string()),
        ("confirm".to_string(), "true".to_string()),
    ]);

    form
}

fn map_error(status: StatusCode, body: &str) -> GatewayError {
    let Ok(envelope) = serde_json::from_str::<StripeErrorEnvelope>(body) else {
        return GatewayError::new(
            "http_error",
            format!("Stripe responded with status {}", status.as_u16()),
        );
    };

    let details = envelope.error;
    let code = details
        .code
        .or(details.decline_code)
        .or(details.kind)
        .unwrap_or_else(|| "stripe_error".to_string());
    let message = details
        .message
        .unwrap_or_else(|| format!("Stripe responded with status {}", status.as_u16()));

    GatewayError { code, message }
}

fn transport_error(error: &reqwest::Error) -> GatewayError {
    GatewayError::new("api_connection_error", error.to_string())
}
