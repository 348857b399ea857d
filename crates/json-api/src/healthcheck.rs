//! Liveness probe for the back office API. Public; no admin token needed.

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::envelope::{self, Envelope};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` while the process is serving
    pub status: String,

    /// Running build version
    pub version: String,
}

#[endpoint(tags("health"), summary = "Liveness Probe")]
pub(crate) async fn handler() -> Json<Envelope<HealthResponse>> {
    envelope::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use salvo::{
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn reports_ok_and_version() -> TestResult {
        let router = Router::new().push(Router::with_path("healthcheck").get(handler));

        let response: Envelope<HealthResponse> = TestClient::get("http://example.com/healthcheck")
            .send(&Service::new(router))
            .await
            .take_json()
            .await?;

        assert!(response.success);
        assert_eq!(response.data.status, "ok");
        assert_eq!(response.data.version, env!("CARGO_PKG_VERSION"));

        Ok(())
    }
}
