//! Admin token formatting, parsing, and verifier construction.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

/// Admin token identifier prefix.
pub const ADMIN_TOKEN_PREFIX: &str = "pa";

/// Number of secret bytes encoded in a token.
pub const ADMIN_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTokenVersion {
    V1,
}

impl AdminTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl FromStr for AdminTokenVersion {
    type Err = AdminTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(AdminTokenError::UnsupportedVersion),
        }
    }
}

#[derive(Clone)]
pub struct AdminTokenSecret {
    bytes: [u8; ADMIN_TOKEN_SECRET_BYTES],
}

impl AdminTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADMIN_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADMIN_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for AdminTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminTokenSecret(**redacted**)")
    }
}

impl Drop for AdminTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ParsedAdminToken {
    pub token_uuid: Uuid,
    pub version: AdminTokenVersion,
    pub secret: AdminTokenSecret,
}

#[derive(Debug, Error)]
pub enum AdminTokenError {
    #[error("admin token format is invalid")]
    InvalidFormat,

    #[error("admin token uses an unsupported version")]
    UnsupportedVersion,

    #[error("admin token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn generate_admin_token_secret() -> AdminTokenSecret {
    let mut secret = [0_u8; ADMIN_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    AdminTokenSecret::from_bytes(secret)
}

/// Render a token as `pa_v1_<uuid>.<hex secret>`.
#[must_use]
pub fn format_admin_token(
    token_uuid: Uuid,
    version: AdminTokenVersion,
    secret: &AdminTokenSecret,
) -> String {
    format!(
        "{ADMIN_TOKEN_PREFIX}_{}_{}.{}",
        version.segment(),
        token_uuid.simple(),
        hex::encode(secret.as_bytes())
    )
}

pub fn parse_admin_token(token: &str) -> Result<ParsedAdminToken, AdminTokenError> {
    let (prefix_and_id, secret_hex) =
        token.split_once('.').ok_or(AdminTokenError::InvalidFormat)?;

    let mut id_parts = prefix_and_id.splitn(3, '_');

    let prefix = id_parts.next().ok_or(AdminTokenError::InvalidFormat)?;
    let version_segment = id_parts.next().ok_or(AdminTokenError::InvalidFormat)?;
    let token_uuid_segment = id_parts.next().ok_or(AdminTokenError::InvalidFormat)?;

    if prefix != ADMIN_TOKEN_PREFIX {
        return Err(AdminTokenError::InvalidFormat);
    }

    let version = AdminTokenVersion::from_str(version_segment)?;

    let token_uuid =
        Uuid::try_parse(token_uuid_segment).map_err(|_parse| AdminTokenError::InvalidFormat)?;

    let mut secret = [0_u8; ADMIN_TOKEN_SECRET_BYTES];

    hex::decode_to_slice(secret_hex, &mut secret)
        .map_err(|_decode| AdminTokenError::InvalidSecretEncoding)?;

    Ok(ParsedAdminToken {
        token_uuid,
        version,
        secret: AdminTokenSecret::from_bytes(secret),
    })
}

/// SHA-256 verifier stored in place of the secret.
///
/// Input: `{token_uuid_hex}:{version_i16_decimal}:{secret_hex}`
#[must_use]
pub fn token_verifier(
    token_uuid: &Uuid,
    version: AdminTokenVersion,
    secret: &AdminTokenSecret,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(
        format!(
            "{}:{}:{}",
            token_uuid.simple(),
            version.as_i16(),
            hex::encode(secret.as_bytes()),
        )
        .as_bytes(),
    );

    hex::encode(hasher.finalize())
}

/// Whether `secret` reproduces the `stored` verifier. Compares in constant time.
#[must_use]
pub fn verifier_matches(
    token_uuid: &Uuid,
    version: AdminTokenVersion,
    secret: &AdminTokenSecret,
    stored: &str,
) -> bool {
    let computed = token_verifier(token_uuid, version, secret);

    computed.as_bytes().ct_eq(stored.as_bytes()).into()
}
