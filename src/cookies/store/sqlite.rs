//! SQLite-backed cookie store.
//!
//! One row per cookie in a `cookies` table, ordered by insertion. Access goes
//! through an `r2d2` pool so the store can be shared across threads behind a
//! [`CookieStoreHandle`](crate::cookies::CookieStoreHandle).
//!
//! Query failures after opening are logged at `warn`: a read that fails
//! enumerates nothing, a write that fails is dropped.

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::rusqlite::params;
use r2d2_sqlite::SqliteConnectionManager;

use crate::cookies::store::{CookieEntry, CookiePayload, CookieStore};
use crate::errors::CookieError;

pub struct SqliteCookieStore {
    pool: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for SqliteCookieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCookieStore").finish_non_exhaustive()
    }
}

fn store_error(e: impl std::fmt::Display) -> CookieError {
    CookieError::Store(e.to_string())
}

impl SqliteCookieStore {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, CookieError> {
        Self::with_manager(SqliteConnectionManager::file(path))
    }

    /// A private in-memory database, mostly useful for tests.
    pub fn in_memory() -> Result<Arc<Self>, CookieError> {
        // A single connection, so every checkout sees the same database.
        let pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .map_err(store_error)?;
        Self::init(pool)
    }

    fn with_manager(manager: SqliteConnectionManager) -> Result<Arc<Self>, CookieError> {
        let pool = Pool::new(manager).map_err(store_error)?;
        Self::init(pool)
    }

    fn init(pool: Pool<SqliteConnectionManager>) -> Result<Arc<Self>, CookieError> {
        pool.get()
            .map_err(store_error)?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS cookies (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    value TEXT NOT NULL
                );",
            )
            .map_err(store_error)?;
        Ok(Arc::new(Self { pool }))
    }

    fn conn(&self) -> Option<PooledConnection<SqliteConnectionManager>> {
        match self.pool.get() {
            Ok(conn) => Some(conn),
            Err(e) => {
                log::warn!("cookie store connection unavailable: {e}");
                None
            }
        }
    }

    fn load(&self) -> Result<Vec<CookieEntry>, r2d2_sqlite::rusqlite::Error> {
        let Some(conn) = self.conn() else {
            return Ok(Vec::new());
        };
        let mut stmt = conn.prepare("SELECT name, value FROM cookies ORDER BY seq")?;
        let rows = stmt.query_map([], |row| Ok(CookieEntry::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        rows.collect()
    }

    fn store(&self, payload: &CookiePayload) -> Result<(), r2d2_sqlite::rusqlite::Error> {
        let Some(conn) = self.conn() else {
            return Ok(());
        };
        if payload.is_removal() {
            conn.execute("DELETE FROM cookies WHERE name = ?1", params![payload.name])?;
        } else {
            conn.execute(
                "INSERT INTO cookies (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value",
                params![payload.name, payload.value],
            )?;
        }
        Ok(())
    }
}

impl CookieStore for SqliteCookieStore {
    fn get_all(&self) -> Vec<CookieEntry> {
        self.load().unwrap_or_else(|e| {
            log::warn!("failed to read cookie store: {e}");
            Vec::new()
        })
    }

    fn set(&self, payload: CookiePayload) {
        if let Err(e) = self.store(&payload) {
            log::warn!("failed to write cookie {:?}: {e}", payload.name);
        }
    }
}
