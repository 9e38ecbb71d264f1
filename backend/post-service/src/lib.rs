/// Post Service Library
///
/// REST backend for the link-aggregation product: post CRUD, comments, and
/// the vote/metrics subsystem that keeps per-post scores coherent under
/// concurrent mutation.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: the post aggregate, vote ledger included
/// - `services`: business logic (vote coordination, scoring, post lifecycle)
/// - `db`: the post store contract and its PostgreSQL implementation
/// - `middleware`: request identity and timing
/// - `error`: error taxonomy and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
