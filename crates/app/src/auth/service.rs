//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    auth::{
        AdminSession, AdminTokenRecord, AdminTokenUuid, AdminTokenVersion, AuthServiceError,
        IssuedAdminToken, format_admin_token, generate_admin_token_secret, parse_admin_token,
        repository::AuthRepository, token_verifier, verifier_matches,
    },
    store::KvStore,
};

#[derive(Clone)]
pub struct KvAuthService {
    repository: AuthRepository,
}

impl KvAuthService {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            repository: AuthRepository::new(store),
        }
    }

    /// Issue a new admin token. The raw token is only returned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub async fn issue_admin_token(&self, label: &str) -> Result<IssuedAdminToken, AuthServiceError> {
        let uuid = AdminTokenUuid::new();
        let version = AdminTokenVersion::V1;
        let secret = generate_admin_token_secret();
        let token = format_admin_token(uuid.into_uuid(), version, &secret);

        let record = AdminTokenRecord {
            uuid,
            version,
            verifier: token_verifier(&uuid.into_uuid(), version, &secret),
            label: label.trim().to_string(),
            created_at: Timestamp::now(),
            revoked_at: None,
        };

        self.repository.create_token(&record).await?;

        info!(token_uuid = %uuid, label = %record.label, "issued admin token");

        Ok(IssuedAdminToken { token, record })
    }

    /// List every issued token, revoked ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub async fn list_admin_tokens(&self) -> Result<Vec<AdminTokenRecord>, AuthServiceError> {
        Ok(self.repository.list_tokens().await?)
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::NotFound`] for an unknown token.
    pub async fn revoke_admin_token(&self, token: AdminTokenUuid) -> Result<bool, AuthServiceError> {
        let Some(mut record) = self.repository.get_token(token).await? else {
            return Err(AuthServiceError::NotFound);
        };

        if !record.is_active() {
            return Ok(false);
        }

        record.revoked_at = Some(Timestamp::now());

        self.repository.save_token(&record).await?;

        info!(token_uuid = %token, "revoked admin token");

        Ok(true)
    }
}

#[async_trait]
impl AuthService for KvAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<AdminSession, AuthServiceError> {
        let parsed = parse_admin_token(bearer_token)?;
        let uuid = AdminTokenUuid::from_uuid(parsed.token_uuid);

        let Some(record) = self.repository.get_token(uuid).await? else {
            return Err(AuthServiceError::Unauthorized);
        };

        if !record.is_active() || record.version != parsed.version {
            return Err(AuthServiceError::Unauthorized);
        }

        if !verifier_matches(
            &parsed.token_uuid,
            parsed.version,
            &parsed.secret,
            &record.verifier,
        ) {
            return Err(AuthServiceError::Unauthorized);
        }

        Ok(AdminSession {
            token_uuid: record.uuid,
            label: record.label,
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to an admin session.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<AdminSession, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::store::MemoryKvStore;

    use super::*;

    fn service() -> KvAuthService {
        KvAuthService::new(Arc::new(MemoryKvStore::new()))
    }

    #[tokio::test]
    async fn issued_token_authenticates() -> TestResult {
        let service = service();
        let issued = service.issue_admin_token(" front desk ").await?;

        let session = service.authenticate_bearer(&issued.token).await?;

        assert_eq!(session.token_uuid, issued.record.uuid);
        assert_eq!(session.label, "front desk");
        assert!(
            !issued.record.verifier.contains(issued.token.rsplit('.').next().unwrap_or_default()),
            "secret must not be stored"
        );

        Ok(())
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() -> TestResult {
        let service = service();
        let issued = service.issue_admin_token("ops").await?;

        assert!(service.revoke_admin_token(issued.record.uuid).await?);
        assert!(!service.revoke_admin_token(issued.record.uuid).await?);

        let result = service.authenticate_bearer(&issued.token).await;

        assert!(matches!(result, Err(AuthServiceError::Unauthorized)));

        Ok(())
    }

    #[tokio::test]
    async fn tampered_secret_is_rejected() -> TestResult {
        let service = service();
        let issued = service.issue_admin_token("ops").await?;

        let (id, _secret) = issued.token.split_once('.').unwrap_or_default();
        let forged = format!("{id}.{}", "00".repeat(32));

        assert!(matches!(
            service.authenticate_bearer(&forged).await,
            Err(AuthServiceError::Unauthorized)
        ));
        assert!(matches!(
            service.authenticate_bearer("not-a-token").await,
            Err(AuthServiceError::Unauthorized)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn revoking_unknown_token_is_not_found() {
        let result = service().revoke_admin_token(AdminTokenUuid::new()).await;

        assert!(matches!(result, Err(AuthServiceError::NotFound)));
    }
}
