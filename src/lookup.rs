//! Random-row lookups against the retail store, used by the publisher to
//! seed generated purchase events.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// A customer row from the lookup store.
#[derive(Debug, Clone)]
pub struct CustomerRef {
    pub customer_id: i64,
}

/// A product row from the lookup store.
#[derive(Debug, Clone)]
pub struct ProductRef {
    pub product_id: i64,
    pub price: f64,
}

#[derive(Clone)]
pub struct LookupStore {
    pool: PgPool,
}

impl LookupStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(url)
            .await
            .map_err(|e| Error::LookupError(ErrorKind::ConnectionError(e.to_string())))?;

        Ok(Self { pool })
    }

    pub async fn random_customer(&self) -> Result<CustomerRef> {
        let row =
            sqlx::query("SELECT customer_id::bigint AS customer_id FROM customer ORDER BY RANDOM() LIMIT 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Error::LookupError(ErrorKind::QueryError(e.to_string())))?
                .ok_or_else(|| {
                    Error::LookupError(ErrorKind::QueryError("customer table is empty".into()))
                })?;

        let customer_id = row
            .try_get("customer_id")
            .map_err(|e| Error::LookupError(ErrorKind::QueryError(e.to_string())))?;

        Ok(CustomerRef { customer_id })
    }

    pub async fn random_product(&self) -> Result<ProductRef> {
        let row = sqlx::query(
            "SELECT product_id::bigint AS product_id, price::float8 AS price FROM products ORDER BY RANDOM() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::LookupError(ErrorKind::QueryError(e.to_string())))?
        .ok_or_else(|| {
            Error::LookupError(ErrorKind::QueryError("products table is empty".into()))
        })?;

        let product_id = row
            .try_get("product_id")
            .map_err(|e| Error::LookupError(ErrorKind::QueryError(e.to_string())))?;
        let price = row
            .try_get("price")
            .map_err(|e| Error::LookupError(ErrorKind::QueryError(e.to_string())))?;

        Ok(ProductRef { product_id, price })
    }
}
