// src/repositories/sqlite/progress.rs

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite, SqliteConnection};
use tracing::debug;

use smspay_common::models::progress::keys;
use smspay_common::models::ProgressRecord;
use smspay_common::traits::repository_traits::ProgressRepository;

use crate::utils::time::current_epoch;
use crate::Error;

/// Progress store over the flat `progress_kv` table plus the `redeemed_products` set.
#[derive(Clone)]
pub struct SqliteProgressRepository {
    pool: Pool<Sqlite>,
}

impl SqliteProgressRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn get_value(conn: &mut SqliteConnection, key: &str) -> Result<Option<String>, Error> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM progress_kv
            WHERE key = ?
            "#,
        )
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set_value(conn: &mut SqliteConnection, key: &str, value: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO progress_kv (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (key)
            DO UPDATE SET
               value      = excluded.value,
               updated_at = excluded.updated_at
            "#,
        )
            .bind(key)
            .bind(value)
            .bind(current_epoch())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    fn parse_u32(key: &str, raw: Option<String>) -> Result<Option<u32>, Error> {
        raw.map(|v| {
            v.parse::<u32>()
                .map_err(|e| Error::Parse(format!("{key}: '{v}' is not a count ({e})")))
        })
            .transpose()
    }
}

#[async_trait]
impl ProgressRepository for SqliteProgressRepository {
    async fn get_progress(&self, product_id: &str) -> Result<ProgressRecord, Error> {
        let mut conn = self.pool.acquire().await?;

        let sent_key = keys::sent_count(product_id);
        let total_key = keys::total(product_id);
        let sent_count = Self::parse_u32(&sent_key, Self::get_value(&mut conn, &sent_key).await?)?;
        let total_count = Self::parse_u32(&total_key, Self::get_value(&mut conn, &total_key).await?)?;
        let cancelled = Self::get_value(&mut conn, &keys::cancelled(product_id))
            .await?
            .is_some_and(|v| v == "true");

        let redeemed = sqlx::query("SELECT 1 FROM redeemed_products WHERE product_id = ?")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?
            .is_some();

        Ok(ProgressRecord {
            product_id: product_id.to_string(),
            sent_count: sent_count.unwrap_or(0),
            total_count,
            cancelled,
            redeemed,
        })
    }

    async fn set_sent_count(&self, product_id: &str, sent_count: u32) -> Result<(), Error> {
        let key = keys::sent_count(product_id);
        let mut tx = self.pool.begin().await?;

        let current = Self::parse_u32(&key, Self::get_value(&mut tx, &key).await?)?.unwrap_or(0);
        if sent_count < current {
            return Err(Error::Storage(format!(
                "refusing to lower {key} from {current} to {sent_count}"
            )));
        }
        Self::set_value(&mut tx, &key, &sent_count.to_string()).await?;
        tx.commit().await?;

        debug!("Stored {}={}", key, sent_count);
        Ok(())
    }

    async fn set_total_count(&self, product_id: &str, total: u32) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        Self::set_value(&mut conn, &keys::total(product_id), &total.to_string()).await
    }

    async fn mark_cancelled(&self, product_id: &str, cancelled: bool) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        Self::set_value(&mut conn, &keys::cancelled(product_id), if cancelled { "true" } else { "false" }).await
    }

    async fn mark_redeemed(&self, product_id: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO redeemed_products (product_id, redeemed_at)
            VALUES (?, ?)
            ON CONFLICT (product_id) DO NOTHING
            "#,
        )
            .bind(product_id)
            .bind(current_epoch())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_redeemed(&self) -> Result<Vec<String>, Error> {
        let rows = sqlx::query("SELECT product_id FROM redeemed_products ORDER BY product_id")
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(row.try_get("product_id")?);
        }
        Ok(out)
    }
}
