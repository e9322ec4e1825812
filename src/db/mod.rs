use std::time::Duration;

use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;

/// Collection holding registered users; carries the unique email index.
pub const USERS_COLLECTION: &str = "users";

/// Errors from the persistence gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("duplicate value for unique field '{0}'")]
    DuplicateKey(&'static str),

    #[error("document must be a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

// Documents are opaque JSONB values in a single table keyed by
// (collection, id). insert order gives the "natural storage order"
// that unfiltered listings promise.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    collection  text NOT NULL,
    id          uuid NOT NULL,
    doc         jsonb NOT NULL,
    inserted_at timestamptz NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, id)
)";

// Storage-layer uniqueness for user emails. Registration relies on this
// index instead of a check-then-insert sequence, so concurrent duplicate
// registrations cannot both succeed.
const USERS_EMAIL_INDEX: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS documents_users_email_key
    ON documents ((doc->>'email'))
    WHERE collection = 'users'";

/// Persistence gateway: one long-lived connection pool to the document
/// store, opened at startup. Exposes named collections as handles.
#[derive(Clone)]
pub struct Gateway {
    pool: PgPool,
}

impl Gateway {
    /// Open the pool, verify connectivity, and run first-start schema setup.
    /// Any failure here is fatal: the caller must exit rather than serve
    /// with a broken gateway.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        sqlx::query(USERS_EMAIL_INDEX).execute(&pool).await?;

        info!("connected to document store");
        Ok(Self { pool })
    }

    /// Build a gateway without establishing connections; the first query
    /// will connect. Used by router-level tests that never reach the
    /// database.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_lazy(&config.url)?;
        Ok(Self { pool })
    }

    /// Get a handle for a named collection. Cheap; shares the pool.
    pub fn collection(&self, name: &'static str) -> Collection {
        Collection {
            name,
            pool: self.pool.clone(),
        }
    }

    /// Ping the store; used by the health endpoint.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Outcome of a merge-update: how many documents matched the identifier.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOutcome {
    pub matched: u64,
}

/// Outcome of a delete, reported whether or not anything matched.
#[derive(Debug, Clone, Copy)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// Handle for one named collection of opaque documents.
#[derive(Clone)]
pub struct Collection {
    name: &'static str,
    pool: PgPool,
}

impl Collection {
    /// Fetch the entire collection, unfiltered, in insertion order.
    pub async fn find_all(&self) -> Result<Vec<Value>, GatewayError> {
        let docs: Vec<Value> = sqlx::query_scalar(
            "SELECT doc FROM documents WHERE collection = $1 ORDER BY inserted_at",
        )
        .bind(self.name)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }

    /// Find the first document whose top-level `field` equals `value`.
    pub async fn find_one_by(&self, field: &str, value: &str) -> Result<Option<Value>, GatewayError> {
        let doc: Option<Value> = sqlx::query_scalar(
            "SELECT doc FROM documents WHERE collection = $1 AND doc ->> $2::text = $3 LIMIT 1",
        )
        .bind(self.name)
        .bind(field)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doc)
    }

    /// Insert a document verbatim, generating its identifier. The id is
    /// also injected into the stored document so listings carry it.
    pub async fn insert_one(&self, doc: Value) -> Result<Uuid, GatewayError> {
        self.insert(None, doc).await
    }

    /// Insert relying on a storage-layer unique index over `field`; a
    /// duplicate surfaces atomically as `DuplicateKey` instead of a
    /// check-then-insert race.
    pub async fn insert_unique(&self, field: &'static str, doc: Value) -> Result<Uuid, GatewayError> {
        self.insert(Some(field), doc).await
    }

    async fn insert(&self, unique_field: Option<&'static str>, mut doc: Value) -> Result<Uuid, GatewayError> {
        let obj = doc.as_object_mut().ok_or(GatewayError::NotAnObject)?;
        let id = Uuid::new_v4();
        obj.insert("id".to_string(), Value::String(id.to_string()));

        let result = sqlx::query("INSERT INTO documents (collection, id, doc) VALUES ($1, $2, $3)")
            .bind(self.name)
            .bind(id)
            .bind(&doc)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(GatewayError::DuplicateKey(unique_field.unwrap_or("id")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Merge-update: overwrite only the top-level fields present in
    /// `partial`, leaving all others untouched. The identifier comes from
    /// the caller; any `id` field in the partial is dropped so it cannot
    /// reassign the document.
    pub async fn update_one(&self, id: Uuid, mut partial: Value) -> Result<UpdateOutcome, GatewayError> {
        let obj = partial.as_object_mut().ok_or(GatewayError::NotAnObject)?;
        obj.remove("id");

        let result = sqlx::query("UPDATE documents SET doc = doc || $3 WHERE collection = $1 AND id = $2")
            .bind(self.name)
            .bind(id)
            .bind(&partial)
            .execute(&self.pool)
            .await?;

        Ok(UpdateOutcome {
            matched: result.rows_affected(),
        })
    }

    /// Remove the matching document if any; reports the count and never
    /// errors on no-match.
    pub async fn delete_one(&self, id: Uuid) -> Result<DeleteOutcome, GatewayError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(self.name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(DeleteOutcome {
            deleted: result.rows_affected(),
        })
    }
}
