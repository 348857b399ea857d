//! Auth data models.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    auth::AdminTokenVersion,
    uuids::{KeyPrefix, TypedUuid},
};

/// Admin token UUID
pub type AdminTokenUuid = TypedUuid<AdminTokenRecord>;

/// Admin token as persisted. The secret itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTokenRecord {
    pub uuid: AdminTokenUuid,
    pub version: AdminTokenVersion,

    /// SHA-256 verifier of the token secret.
    pub verifier: String,

    pub label: String,
    pub created_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

impl KeyPrefix for AdminTokenRecord {
    const KEY_PREFIX: &'static str = "admin_token";
}

impl AdminTokenRecord {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// Authenticated admin attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token_uuid: AdminTokenUuid,
    pub label: String,
}

/// Issuance result with the one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedAdminToken {
    pub token: String,
    pub record: AdminTokenRecord,
}
