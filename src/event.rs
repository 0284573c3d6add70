//! Purchase event records and the producer-side event generator.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lookup::{CustomerRef, ProductRef};

/// Outcome flag derived from `total_price` by the annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failed => "failed",
        }
    }
}

/// A validated purchase event, the row shape of the raw warehouse table.
///
/// `created_at` is kept as its canonical string form (ISO-8601, trailing `Z`)
/// so the record round-trips byte-identically through serialization; the
/// warehouse parses it into a real timestamp at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub event_id: String,
    pub customer_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub created_at: String,
}

/// A purchase event with the derived `status` column, the row shape of the
/// annotated warehouse table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedEvent {
    #[serde(flatten)]
    pub event: PurchaseEvent,
    pub status: Status,
}

/// Synthesizes one purchase from a customer and a product row.
///
/// Quantity is uniform in `[1, 5]`, the total is rounded to two decimal
/// places, and `created_at` is the current UTC instant with a trailing `Z`.
pub fn generate_purchase_event(customer: &CustomerRef, product: &ProductRef) -> PurchaseEvent {
    let quantity = rand::thread_rng().gen_range(1..=5);
    let unit_price = product.price;
    let total_price = (quantity as f64 * unit_price * 100.0).round() / 100.0;

    PurchaseEvent {
        event_id: Uuid::new_v4().to_string(),
        customer_id: customer.customer_id,
        product_id: product.product_id,
        quantity,
        unit_price,
        total_price,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    }
}
