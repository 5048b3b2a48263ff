//! Audit storage backends.

use async_trait::async_trait;

use super::{AuditRecord, NewAuditRecord, TransactionKind};

/// Trait for audit storage backends.
///
/// The contract is deliberately thin: append a row, list rows for an address.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Append one audit row.
    async fn append(&self, kind: TransactionKind, record: &NewAuditRecord) -> Result<(), Self::Error>;

    /// Rows where the address appears as owner or beneficiary, newest first.
    async fn history(&self, address: &str) -> Result<Vec<AuditRecord>, Self::Error>;
}

/// In-memory audit store for testing and development.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    rows: parking_lot::Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    type Error = std::convert::Infallible;

    async fn append(&self, kind: TransactionKind, record: &NewAuditRecord) -> Result<(), Self::Error> {
        let mut rows = self.rows.lock();
        let id = rows.len() as i64 + 1;
        rows.push(AuditRecord {
            id,
            owner_address: record.owner.clone(),
            beneficiary_address: record.beneficiary.clone(),
            amount: record.amount,
            release_time: record.release_time,
            transaction_type: kind,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    async fn history(&self, address: &str) -> Result<Vec<AuditRecord>, Self::Error> {
        let rows = self.rows.lock();
        Ok(rows
            .iter()
            .rev()
            .filter(|row| row.owner_address == address || row.beneficiary_address == address)
            .cloned()
            .collect())
    }
}

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteAuditStore;

#[cfg(feature = "sqlite")]
mod sqlite {
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDateTime, Utc};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Row, SqlitePool};

    use crate::escrow::{AuditRecord, NewAuditRecord, TransactionKind};

    use super::AuditStore;

    const SCHEMA: &str = r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_address TEXT NOT NULL,
            beneficiary_address TEXT NOT NULL,
            amount REAL NOT NULL,
            release_time INTEGER NOT NULL,
            transaction_type TEXT NOT NULL,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        )
    "#;

    /// SQLite-backed audit store.
    #[derive(Debug, Clone)]
    pub struct SqliteAuditStore {
        pool: SqlitePool,
    }

    impl SqliteAuditStore {
        /// Connect to the given SQLite URL and ensure the schema exists.
        pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
            let pool = SqlitePoolOptions::new().max_connections(5).connect(url).await?;
            sqlx::query(SCHEMA).execute(&pool).await?;
            Ok(Self { pool })
        }

        /// Connect using `DATABASE_URL`, defaulting to a local `escrow.db`.
        pub async fn from_env() -> Result<Self, sqlx::Error> {
            let url = std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:escrow.db?mode=rwc".to_string());
            Self::connect(&url).await
        }

        /// Whether the database answers a trivial query.
        pub async fn is_healthy(&self) -> bool {
            sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
        }
    }

    #[async_trait]
    impl AuditStore for SqliteAuditStore {
        type Error = sqlx::Error;

        async fn append(&self, kind: TransactionKind, record: &NewAuditRecord) -> Result<(), Self::Error> {
            sqlx::query(
                "INSERT INTO transactions \
                 (owner_address, beneficiary_address, amount, release_time, transaction_type) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&record.owner)
            .bind(&record.beneficiary)
            .bind(record.amount)
            .bind(record.release_time)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn history(&self, address: &str) -> Result<Vec<AuditRecord>, Self::Error> {
            let rows = sqlx::query(
                "SELECT id, owner_address, beneficiary_address, amount, release_time, \
                        transaction_type, timestamp \
                 FROM transactions \
                 WHERE owner_address = ?1 OR beneficiary_address = ?1 \
                 ORDER BY timestamp DESC, id DESC",
            )
            .bind(address)
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter()
                .map(|row| {
                    let kind_str: String = row.try_get("transaction_type")?;
                    let transaction_type = TransactionKind::parse(&kind_str).ok_or_else(|| {
                        sqlx::Error::Decode(
                            format!("unknown transaction_type: {kind_str}").into(),
                        )
                    })?;
                    let naive: NaiveDateTime = row.try_get("timestamp")?;
                    Ok(AuditRecord {
                        id: row.try_get("id")?,
                        owner_address: row.try_get("owner_address")?,
                        beneficiary_address: row.try_get("beneficiary_address")?,
                        amount: row.try_get("amount")?,
                        release_time: row.try_get("release_time")?,
                        transaction_type,
                        timestamp: DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc),
                    })
                })
                .collect()
        }
    }
}
