//! Channel repository for database queries.

use super::models::{ChannelAccess, ChannelRecord, NewChannel};
use crate::db::DbError;
use sqlx::SqlitePool;
use std::collections::HashMap;

type ChannelRow = (i64, String, i64, i64, String, String, i64);

/// Repository for channel operations.
pub struct ChannelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChannelRepository<'a> {
    /// Create a new channel repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new channel together with its founder entry and metadata.
    ///
    /// Everything is written in one transaction: either the whole
    /// registration exists afterwards or none of it does. A name collision
    /// (including one from a concurrent registration) yields
    /// [`DbError::ChannelExists`].
    pub async fn register(&self, new: &NewChannel<'_>) -> Result<ChannelRecord, DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO channels (name, registered_at, last_used_at, mlock_on, mlock_off, flags)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.name)
        .bind(new.registered_at)
        .bind(new.registered_at)
        .bind(&new.mlock_on)
        .bind(&new.mlock_off)
        .bind(i64::from(new.flags))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::ChannelExists(new.name.to_string());
            }
            DbError::from(e)
        })?;

        let channel_id = result.last_insert_rowid();

        sqlx::query(
            r#"
            INSERT INTO channel_access (channel_id, entity, flags, setter, added_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(channel_id)
        .bind(new.founder)
        .bind(&new.founder_flags)
        .bind(new.founder_setter)
        .bind(new.registered_at)
        .execute(&mut *tx)
        .await?;

        for (key, value) in &new.metadata {
            sqlx::query(
                r#"
                INSERT INTO channel_metadata (channel_id, key, value)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(channel_id)
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(ChannelRecord {
            id: channel_id,
            name: new.name.to_string(),
            registered_at: new.registered_at,
            last_used_at: new.registered_at,
            mlock_on: new.mlock_on.clone(),
            mlock_off: new.mlock_off.clone(),
            flags: new.flags,
            metadata: new.metadata.clone(),
        })
    }

    /// Find channel by name (case-insensitive), including its metadata.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ChannelRecord>, DbError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, name, registered_at, last_used_at, mlock_on, mlock_off, flags
            FROM channels
            WHERE name = ? COLLATE NOCASE
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let metadata = self.fetch_metadata(row.0).await?;
        Ok(Some(Self::record_from_row(row, metadata)))
    }

    /// Names of all registered channels.
    pub async fn load_all_names(&self) -> Result<Vec<String>, DbError> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM channels ORDER BY name")
            .fetch_all(self.pool)
            .await?;
        Ok(names)
    }

    /// Get all access entries for a channel.
    pub async fn list_access(&self, channel_id: i64) -> Result<Vec<ChannelAccess>, DbError> {
        let rows = sqlx::query_as::<_, (String, String, String, i64)>(
            r#"
            SELECT entity, flags, setter, added_at
            FROM channel_access
            WHERE channel_id = ?
            ORDER BY added_at ASC, entity ASC
            "#,
        )
        .bind(channel_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(entity, flags, setter, added_at)| ChannelAccess {
                entity,
                flags,
                setter,
                added_at,
            })
            .collect())
    }

    /// Set access flags for an entity on a channel.
    pub async fn set_access(
        &self,
        channel_id: i64,
        entity: &str,
        flags: &str,
        setter: &str,
    ) -> Result<(), DbError> {
        let now = chrono::Utc::now().timestamp();

        // Use REPLACE to upsert
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO channel_access (channel_id, entity, flags, setter, added_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(channel_id)
        .bind(entity)
        .bind(flags)
        .bind(setter)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Names of every entity holding founder access, joined for display.
    pub async fn founder_names(&self, channel_id: i64) -> Result<String, DbError> {
        let names: Vec<String> = self
            .list_access(channel_id)
            .await?
            .into_iter()
            .filter(|entry| Self::is_founder(&entry.flags))
            .map(|entry| entry.entity)
            .collect();

        Ok(names.join(", "))
    }

    /// Set or remove a metadata key. `None` removes the key.
    pub async fn set_metadata(
        &self,
        channel_id: i64,
        key: &str,
        value: Option<&str>,
    ) -> Result<(), DbError> {
        if let Some(val) = value {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO channel_metadata (channel_id, key, value)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(channel_id)
            .bind(key)
            .bind(val)
            .execute(self.pool)
            .await?;
        } else {
            sqlx::query("DELETE FROM channel_metadata WHERE channel_id = ? AND key = ?")
                .bind(channel_id)
                .bind(key)
                .execute(self.pool)
                .await?;
        }
        Ok(())
    }

    /// Check if flags include founder (+F).
    pub fn is_founder(flags: &str) -> bool {
        flags.contains('F')
    }

    /// Helper to fetch metadata for a channel.
    async fn fetch_metadata(&self, channel_id: i64) -> Result<HashMap<String, String>, DbError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT key, value FROM channel_metadata WHERE channel_id = ?",
        )
        .bind(channel_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    fn record_from_row(row: ChannelRow, metadata: HashMap<String, String>) -> ChannelRecord {
        let (id, name, registered_at, last_used_at, mlock_on, mlock_off, flags) = row;
        ChannelRecord {
            id,
            name,
            registered_at,
            last_used_at,
            mlock_on,
            mlock_off,
            flags: u32::try_from(flags).unwrap_or_default(),
            metadata,
        }
    }
}
