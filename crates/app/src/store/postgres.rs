//! `PostgreSQL` store

use async_trait::async_trait;
use sqlx::{PgPool, query, query_scalar};

use super::{KvStore, StoreError};

const GET_ENTRY_SQL: &str = include_str!("sql/get_entry.sql");
const SET_ENTRY_SQL: &str = include_str!("sql/set_entry.sql");
const DELETE_ENTRY_SQL: &str = include_str!("sql/delete_entry.sql");
const ADD_SET_MEMBER_SQL: &str = include_str!("sql/add_set_member.sql");
const REMOVE_SET_MEMBER_SQL: &str = include_str!("sql/remove_set_member.sql");
const LIST_SET_MEMBERS_SQL: &str = include_str!("sql/list_set_members.sql");
const NEXT_SEQUENCE_SQL: &str = include_str!("sql/next_sequence.sql");

/// [`KvStore`] backed by the `kv_*` tables.
#[derive(Debug, Clone)]
pub struct PgKvStore {
    pool: PgPool,
}

impl PgKvStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvStore for PgKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(query_scalar::<_, String>(GET_ENTRY_SQL)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        query(SET_ENTRY_SQL)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let result = query(DELETE_ENTRY_SQL)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        query(ADD_SET_MEMBER_SQL)
            .bind(key)
            .bind(member)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        query(REMOVE_SET_MEMBER_SQL)
            .bind(key)
            .bind(member)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(query_scalar::<_, String>(LIST_SET_MEMBERS_SQL)
            .bind(key)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn next_sequence(&self, name: &str) -> Result<u64, StoreError> {
        let value = query_scalar::<_, i64>(NEXT_SEQUENCE_SQL)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(value).map_err(|_negative| StoreError::SequenceOverflow(name.to_string()))
    }
}
