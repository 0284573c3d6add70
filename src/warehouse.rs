//! Append-only warehouse sinks.
//!
//! [`EventSink`] is the seam between the pipeline router and any tabular
//! destination; [`PgWarehouse`] is the Postgres implementation holding both
//! the raw and the annotated purchase tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::config::WarehouseSettings;
use crate::error::{Error, ErrorKind, Result};
use crate::event::{AnnotatedEvent, PurchaseEvent};

/// An append-only destination for pipeline output rows.
///
/// Update or merge semantics are deliberately absent: a row written here is
/// never touched again.
#[async_trait]
pub trait EventSink<R>: Send + Sync {
    async fn append(&self, row: &R) -> Result<()>;
}

/// Postgres-backed warehouse. Tables are created on first connect if absent,
/// mirroring an append-only, create-if-needed write disposition.
#[derive(Clone)]
pub struct PgWarehouse {
    pool: PgPool,
    raw_table: String,
    annotated_table: String,
}

impl PgWarehouse {
    pub async fn connect(settings: &WarehouseSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.url)
            .await
            .map_err(|e| Error::WarehouseError(ErrorKind::ConnectionError(e.to_string())))?;

        let warehouse = Self {
            pool,
            raw_table: settings.raw_table.clone(),
            annotated_table: settings.annotated_table.clone(),
        };
        warehouse.ensure_tables().await?;

        Ok(warehouse)
    }

    // Table names come from trusted configuration, not from record data.
    async fn ensure_tables(&self) -> Result<()> {
        let raw = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                event_id text NOT NULL,
                customer_id bigint NOT NULL,
                product_id bigint NOT NULL,
                quantity bigint NOT NULL,
                unit_price double precision NOT NULL,
                total_price double precision NOT NULL,
                created_at timestamptz NOT NULL
            )",
            self.raw_table
        );
        let annotated = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                event_id text NOT NULL,
                customer_id bigint NOT NULL,
                product_id bigint NOT NULL,
                quantity bigint NOT NULL,
                unit_price double precision NOT NULL,
                total_price double precision NOT NULL,
                created_at timestamptz NOT NULL,
                status text NOT NULL
            )",
            self.annotated_table
        );

        for statement in [&raw, &annotated] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::WarehouseError(ErrorKind::QueryError(e.to_string())))?;
        }

        info!(
            raw = %self.raw_table,
            annotated = %self.annotated_table,
            "warehouse tables ready"
        );
        Ok(())
    }
}

/// The warehouse schema is authoritative: a `created_at` that does not parse
/// as a real timestamp is rejected here, at write time.
fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            Error::WarehouseError(ErrorKind::SerializationError(format!(
                "created_at `{raw}`: {e}"
            )))
        })
}

#[async_trait]
impl EventSink<PurchaseEvent> for PgWarehouse {
    async fn append(&self, row: &PurchaseEvent) -> Result<()> {
        let created_at = parse_created_at(&row.created_at)?;
        let statement = format!(
            "INSERT INTO {} (event_id, customer_id, product_id, quantity, unit_price, total_price, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            self.raw_table
        );

        sqlx::query(&statement)
            .bind(&row.event_id)
            .bind(row.customer_id)
            .bind(row.product_id)
            .bind(row.quantity)
            .bind(row.unit_price)
            .bind(row.total_price)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::WarehouseError(ErrorKind::QueryError(e.to_string())))?;

        Ok(())
    }
}

#[async_trait]
impl EventSink<AnnotatedEvent> for PgWarehouse {
    async fn append(&self, row: &AnnotatedEvent) -> Result<()> {
        let created_at = parse_created_at(&row.event.created_at)?;
        let statement = format!(
            "INSERT INTO {} (event_id, customer_id, product_id, quantity, unit_price, total_price, created_at, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            self.annotated_table
        );

        sqlx::query(&statement)
            .bind(&row.event.event_id)
            .bind(row.event.customer_id)
            .bind(row.event.product_id)
            .bind(row.event.quantity)
            .bind(row.event.unit_price)
            .bind(row.event.total_price)
            .bind(created_at)
            .bind(row.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::WarehouseError(ErrorKind::QueryError(e.to_string())))?;

        Ok(())
    }
}
