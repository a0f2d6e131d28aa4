//! Global database connection pool.
//!
//! Initialized once at startup; handlers and services borrow the static
//! connection through `get_db_pool()`.

use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect to the database and store the pool globally.
/// Panics if called twice or if the connection fails.
pub async fn init_db(database_url: String) {
    let mut opts = ConnectOptions::new(database_url);
    opts.connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let pool = Database::connect(opts)
        .await
        .expect("Failed to connect to the database.");

    DB_POOL
        .set(pool)
        .expect("init_db() called more than once.");

    log::info!("Database pool initialized.");
}

/// Returns the global database pool.
/// Panics if `init_db()` has not run.
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("Database pool is not initialized.")
}

/// Whether a database error is a unique-constraint rejection.
///
/// Slug assignment, favorite toggling and inquiry upserts all lean on unique
/// indexes as the final arbiter of check-then-act races, so callers need to
/// tell "row already exists" apart from real failures. The message fallback
/// covers connections that cannot produce a typed SqlErr.
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    if matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    ) {
        return true;
    }

    let msg = err.to_string();
    msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    #[test]
    fn test_is_unique_violation() {
        let err = DbErr::Exec(RuntimeErr::Internal(
            "error returned from database: duplicate key value violates unique constraint \
             \"listings_slug_key\""
                .to_owned(),
        ));
        assert!(is_unique_violation(&err));

        let err = DbErr::Exec(RuntimeErr::Internal(
            "error returned from database: relation does not exist".to_owned(),
        ));
        assert!(!is_unique_violation(&err));
    }
}
