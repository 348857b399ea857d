//! Auth middleware.

use std::sync::Arc;

use prestige_app::auth::{AdminSession, AuthServiceError};
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::{debug, error};

use crate::{envelope::ApiError, extensions::*, state::State};

/// Resolve the admin session for a request from its bearer token.
async fn authenticate(token: Option<&str>, depot: &Depot) -> Result<AdminSession, ApiError> {
    let token =
        token.ok_or_else(|| ApiError::unauthorized("Missing or invalid Authorization header"))?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .auth
        .authenticate_bearer(token)
        .await
        .map_err(|auth_error| match auth_error {
            AuthServiceError::Unauthorized | AuthServiceError::NotFound => {
                ApiError::unauthorized("Invalid admin token")
            }
            AuthServiceError::Store(source) => {
                error!("failed to validate admin token: {source}");

                ApiError::internal()
            }
        })
}

/// Admin routes require a valid bearer token; the session is left in the
/// depot for handlers and request logging.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match authenticate(extract_bearer_token(req), depot).await {
        Ok(session) => {
            debug!(token_uuid = %session.token_uuid, "admin authenticated");

            depot.insert_admin_session(session);

            ctrl.call_next(req, depot, res).await;
        }
        Err(api_error) => {
            res.render(api_error);
            ctrl.skip_rest();
        }
    }
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
