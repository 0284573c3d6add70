//! A toy streaming ETL for purchase events.
//!
//! The `publisher` binary samples a random customer and product from a
//! relational store, synthesizes a purchase event and publishes it to a Kafka
//! topic. The `pipeline` binary consumes those payloads, normalizes each into
//! a typed record (or drops it with a reason), appends the record to a raw
//! warehouse table, derives a `status` flag and appends the result to a
//! second table.
//!
//! Durability, redelivery and scaling are the broker's and the stores'
//! problem; the logic that is actually this crate's lives in [`normalize`]
//! and [`annotate`].

/// layered settings, loaded once and passed into constructors
pub mod config;

/// purchase event records and the producer-side generator
pub mod event;

/// random customer/product lookups against the retail store
pub mod lookup;

/// payload bytes -> validated record, or a typed drop reason
pub mod normalize;

/// derives the `status` column from `total_price`
pub mod annotate;

/// Kafka publisher and subscriber wrappers
pub mod transport;

/// append-only sink seam and the Postgres warehouse
pub mod warehouse;

/// per-payload routing and the consume loop
pub mod pipeline;

/// the publisher loop
pub mod producer;

/// error module
pub mod error;
