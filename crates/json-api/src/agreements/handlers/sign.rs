//! Sign Agreement Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prestige_app::domain::agreements::data::SignAgreement;

use crate::{
    agreements::{
        errors::into_api_error,
        models::{AgreementResponse, Emergency, License, Personal, Terms},
    },
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Sign Agreement Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SignAgreementRequest {
    pub personal: Personal,
    pub license: License,
    pub emergency_contact: Emergency,
    pub acknowledgments: Terms,

    /// `data:image/png;base64,...`
    pub signature_image: String,
}

impl SignAgreementRequest {
    fn into_submission(self, ip_address: Option<String>) -> Result<SignAgreement, ApiError> {
        Ok(SignAgreement {
            personal: self.personal.try_into()?,
            license: self.license.try_into()?,
            emergency_contact: self.emergency_contact.into(),
            acknowledgments: self.acknowledgments.into(),
            signature_image: self.signature_image,
            ip_address,
        })
    }
}

/// First `X-Forwarded-For` hop, else the peer address.
fn client_ip(req: &Request) -> Option<String> {
    let forwarded = req
        .header::<String>("x-forwarded-for")
        .and_then(|value| value.split(',').next().map(|hop| hop.trim().to_string()))
        .filter(|hop| !hop.is_empty());

    forwarded.or_else(|| {
        req.remote_addr()
            .clone()
            .into_std()
            .map(|addr| addr.ip().to_string())
    })
}

/// Sign Agreement Handler
///
/// Records the renter's details and signature. Only pending agreements that
/// have not expired can be signed.
#[endpoint(
    tags("agreements"),
    summary = "Sign Agreement",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "agreements.sign", skip_all, fields(agreement_uuid = %*agreement), err)]
pub(crate) async fn handler(
    agreement: PathParam<Uuid>,
    json: JsonBody<SignAgreementRequest>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Envelope<AgreementResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let submission = json.into_inner().into_submission(client_ip(req))?;

    let agreement = state
        .app
        .agreements
        .sign_agreement(agreement.into_inner().into(), submission)
        .await
        .map_err(into_api_error)?;

    tracing::info!(booking_uuid = %agreement.booking_uuid, "agreement signed");

    Ok(envelope::ok(agreement.into()))
}
