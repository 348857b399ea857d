//! Auth repository.
//!
//! Keys:
//! - `admin_token:{uuid}`: the token record
//! - `admin_tokens:all`: every token uuid

use std::sync::Arc;

use crate::{
    auth::models::{AdminTokenRecord, AdminTokenUuid},
    store::{KvStore, StoreError, get_json, set_json},
};

const ALL_TOKENS_KEY: &str = "admin_tokens:all";

fn token_key(token: AdminTokenUuid) -> String {
    token.store_key()
}

#[derive(Clone)]
pub(crate) struct AuthRepository {
    store: Arc<dyn KvStore>,
}

impl AuthRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn get_token(
        &self,
        token: AdminTokenUuid,
    ) -> Result<Option<AdminTokenRecord>, StoreError> {
        get_json(self.store.as_ref(), &token_key(token)).await
    }

    pub(crate) async fn create_token(&self, token: &AdminTokenRecord) -> Result<(), StoreError> {
        self.save_token(token).await?;

        self.store
            .set_add(ALL_TOKENS_KEY, &token.uuid.to_string())
            .await
    }

    pub(crate) async fn save_token(&self, token: &AdminTokenRecord) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), &token_key(token.uuid), token).await
    }

    /// Every token, oldest first.
    pub(crate) async fn list_tokens(&self) -> Result<Vec<AdminTokenRecord>, StoreError> {
        let mut tokens = Vec::new();

        for member in self.store.set_members(ALL_TOKENS_KEY).await? {
            let Ok(uuid) = member.parse::<AdminTokenUuid>() else {
                continue;
            };

            if let Some(token) = self.get_token(uuid).await? {
                tokens.push(token);
            }
        }

        tokens.sort_by_key(|token| (token.created_at, token.uuid));

        Ok(tokens)
    }
}
