//! Stripe Webhook Handler
//!
//! Public route; authenticity comes from the `Stripe-Signature` header rather
//! than an admin token.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use prestige_app::{domain::bookings::BookingsServiceError, payments::webhook::verify_event};

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    observability::record_webhook_event,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookReceivedResponse {
    pub received: bool,
}

/// Stripe Webhook Handler
///
/// Verifies the event signature and mirrors `payment_intent.*` events onto
/// the matching booking. Events for unknown intents are acknowledged.
#[endpoint(tags("webhooks"), summary = "Receive Stripe Webhook")]
#[tracing::instrument(name = "webhooks.stripe", skip_all, err)]
pub(crate) async fn stripe(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Envelope<WebhookReceivedResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let Some(secret) = state.webhooks.secret.as_deref() else {
        warn!("stripe webhook received without a configured secret");

        return Err(ApiError::bad_request("Webhook secret is not configured"));
    };

    let signature = req
        .header::<String>("stripe-signature")
        .ok_or_else(|| ApiError::bad_request("Missing Stripe-Signature header"))?;

    let payload = req
        .payload()
        .await
        .or_400("Unreadable request body")?;

    let event = verify_event(
        payload,
        &signature,
        secret,
        state.webhooks.tolerance_seconds,
        Timestamp::now(),
    )
    .map_err(|rejection| {
        warn!("rejected stripe webhook: {rejection}");
        record_webhook_event("rejected");

        ApiError::bad_request("Invalid webhook signature")
    })?;

    let Some(intent) = event.payment_intent() else {
        info!(event_id = %event.id, kind = %event.kind, "ignored stripe event");
        record_webhook_event("ignored");

        return Ok(envelope::ok(WebhookReceivedResponse { received: true }));
    };

    match state.app.bookings.sync_payment_intent(intent).await {
        Ok(Some(booking)) => {
            info!(event_id = %event.id, booking_uuid = %booking.uuid, "synced payment intent");
            record_webhook_event("synced");
        }
        Ok(None) => {
            info!(event_id = %event.id, "payment intent matches no booking");
            record_webhook_event("unmatched");
        }
        Err(BookingsServiceError::Store(source)) => {
            error!(event_id = %event.id, "failed to sync payment intent: {source}");
            record_webhook_event("failed");

            return Err(ApiError::internal());
        }
        Err(sync_error) => {
            warn!(event_id = %event.id, "payment intent not applied: {sync_error}");
            record_webhook_event("not_applied");
        }
    }

    Ok(envelope::ok(WebhookReceivedResponse { received: true }))
}
