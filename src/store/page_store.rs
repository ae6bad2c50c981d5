//! Page Store Module
//!
//! Durable keyed storage of pages on SQLite, with expiry-aware reads and
//! the bulk purge used by the sweeper.

use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::FromRow;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::store::page::{generate_id, truncate_to_millis, Page, Retention};
use crate::store::MAX_ID_ATTEMPTS;

// == Row Mapping ==
#[derive(Debug, FromRow)]
struct PageRow {
    id: String,
    content: String,
    content_size: i64,
    created_at: i64,
    expires_at: Option<i64>,
}

impl PageRow {
    fn into_page(self) -> Result<Page> {
        let created_at = millis_to_utc(self.created_at)?;
        let expires_at = self.expires_at.map(millis_to_utc).transpose()?;

        Ok(Page {
            id: self.id,
            content: self.content,
            content_size: u64::try_from(self.content_size).unwrap_or_default(),
            created_at,
            expires_at,
        })
    }
}

/// `now` rounded up to whole milliseconds. For millisecond-precision
/// `expires_at`, `expires_at < ceil_millis(now)` holds exactly when
/// `expires_at < now`.
fn ceil_millis(now: DateTime<Utc>) -> i64 {
    let millis = now.timestamp_millis();
    if now.timestamp_subsec_nanos() % 1_000_000 == 0 {
        millis
    } else {
        millis + 1
    }
}

fn millis_to_utc(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Internal(format!("stored timestamp out of range: {}", millis)))
}

// == Page Store ==
/// Handle to the page table. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PageStore {
    pool: SqlitePool,
}

impl PageStore {
    // == Constructors ==
    /// Opens (creating if missing) the database at `database_url` and applies
    /// the schema migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .acquire_timeout(StdDuration::from_secs(10))
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// Each SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(Self { pool })
    }

    // == Create ==
    /// Stores validated content and returns the new page.
    pub async fn create(&self, content: String, retention: Retention) -> Result<Page> {
        self.create_at(content, retention, Utc::now()).await
    }

    /// Stores validated content as if created at `now`.
    ///
    /// The insert is a single statement, so a failed write leaves nothing
    /// behind. An id collision is rejected by the primary key and retried
    /// with a fresh id.
    pub async fn create_at(
        &self,
        content: String,
        retention: Retention,
        now: DateTime<Utc>,
    ) -> Result<Page> {
        let created_at = truncate_to_millis(now);
        let expires_at = retention.expires_at(created_at)?;
        let size_bytes = i64::try_from(content.len())
            .map_err(|_| AppError::Internal("content size out of range".to_string()))?;
        let content_size = u64::try_from(size_bytes).unwrap_or_default();

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = generate_id();

            let result = sqlx::query(
                "INSERT INTO pages (id, content, content_size, created_at, expires_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&content)
            .bind(size_bytes)
            .bind(created_at.timestamp_millis())
            .bind(expires_at.map(|at| at.timestamp_millis()))
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => {
                    debug!(page_id = %id, size_bytes = content_size, "page created");
                    return Ok(Page {
                        id,
                        content,
                        content_size,
                        created_at,
                        expires_at,
                    });
                }
                Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                    warn!(attempt, "page id collision, retrying with a fresh id");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::Internal(format!(
            "no unique page id after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }

    // == Fetch ==
    /// Looks up a live page by id.
    pub async fn fetch(&self, id: &str) -> Result<Page> {
        self.fetch_at(id, Utc::now()).await
    }

    /// Looks up a page by id as seen at `now`.
    ///
    /// An expired page is deleted on the spot and reported as `NotFound`.
    /// A failed delete is logged and left for the sweeper.
    pub async fn fetch_at(&self, id: &str, now: DateTime<Utc>) -> Result<Page> {
        let row = sqlx::query_as::<_, PageRow>(
            "SELECT id, content, content_size, created_at, expires_at FROM pages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let page = row.ok_or(AppError::NotFound)?.into_page()?;

        if page.is_expired(now) {
            match self.delete(&page.id).await {
                Ok(_) => debug!(page_id = %page.id, "expired page removed on read"),
                Err(err) => {
                    warn!(page_id = %page.id, error = %err, "failed to remove expired page on read")
                }
            }
            return Err(AppError::NotFound);
        }

        Ok(page)
    }

    // == Delete ==
    /// Removes a page by id. Deleting an absent id is a no-op.
    ///
    /// Returns whether a row was actually removed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // == Sweep ==
    /// Removes every page expired as of now.
    pub async fn sweep(&self) -> Result<u64> {
        self.sweep_at(Utc::now()).await
    }

    /// Removes every page expired as of `now` in one statement.
    ///
    /// The condition is the SQL form of [`Page::is_expired`]: an expiry is
    /// present and strictly before `now`.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM pages WHERE expires_at IS NOT NULL AND expires_at < ?")
                .bind(ceil_millis(now))
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // == Count ==
    /// Returns the number of stored pages, expired or not.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
