use positioning_core::{DatabaseConfig, PositioningError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::repositories::Repositories;

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Owns the connection pool for one batch run.
///
/// Acquire it at the start of a run and call [`DatabaseClient::close`] at the
/// end; the pool is also released when the client is dropped.
pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Connects to `PostgreSQL` and applies pending migrations.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established or a migration fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(db_error)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| PositioningError::Database(format!("migration failed: {e}")))?;

        tracing::info!("Connected to database");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Builds the Postgres-backed store over this pool.
    #[must_use]
    pub fn repositories(&self) -> Repositories {
        Repositories::new(self.pool.clone())
    }

    /// Closes every pooled connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Classifies a sqlx error into the workspace taxonomy.
pub(crate) fn db_error(err: sqlx::Error) -> PositioningError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return PositioningError::Conflict(
                    db.constraint().unwrap_or("unique constraint").to_string(),
                );
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return PositioningError::not_found(format!(
                    "referenced market ({})",
                    db.constraint().unwrap_or("foreign key")
                ));
            }
            _ => {}
        }
    }
    PositioningError::Database(err.to_string())
}

/// Converts a row limit to the `BIGINT` Postgres expects.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_map_to_database_variant() {
        let err = db_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, PositioningError::Database(_)));
    }

    #[test]
    fn test_sql_limit_saturates() {
        assert_eq!(sql_limit(200), 200);
        assert_eq!(sql_limit(usize::MAX), i64::MAX);
    }
}
