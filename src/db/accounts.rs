//! Account repository.
//!
//! Services only need to know whether an account exists and whether it has
//! completed e-mail verification; authentication itself happens upstream.

use super::DbError;
use sqlx::SqlitePool;

/// A registered services account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: i64,
    pub name: String,
    /// False while the account is still awaiting e-mail verification.
    pub verified: bool,
    pub registered_at: i64,
}

/// Repository for account operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new account.
    pub async fn create(&self, name: &str, verified: bool) -> Result<AccountRecord, DbError> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (name, verified, registered_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(verified)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::AccountExists(name.to_string());
            }
            DbError::from(e)
        })?;

        Ok(AccountRecord {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            verified,
            registered_at: now,
        })
    }

    /// Find account by name (case-insensitive).
    pub async fn find_by_name(&self, name: &str) -> Result<Option<AccountRecord>, DbError> {
        let row = sqlx::query_as::<_, (i64, String, bool, i64)>(
            r#"
            SELECT id, name, verified, registered_at
            FROM accounts
            WHERE name = ? COLLATE NOCASE
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, name, verified, registered_at)| AccountRecord {
            id,
            name,
            verified,
            registered_at,
        }))
    }

    /// Mark an account as verified or awaiting verification.
    pub async fn set_verified(&self, name: &str, verified: bool) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE accounts SET verified = ? WHERE name = ? COLLATE NOCASE")
            .bind(verified)
            .bind(name)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::AccountNotFound(name.to_string()));
        }
        Ok(())
    }
}
