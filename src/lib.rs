//! Vigilar - remote monitoring for long-running training processes.
//!
//! A training process reports progress metrics (loss, accuracy, ...) over
//! HTTP at batch, epoch, and run boundaries. Vigilar stores them in an
//! in-process, append-only log partitioned by granularity and run, and
//! serves them back to observers as an event stream.
//!
//! # Architecture
//!
//! - **[`store`]**: keyed, append-only metric storage ([`store::MetricStore`])
//! - **[`feed`]**: wire framing for live delivery (event-stream blocks)
//! - **[`server`]**: axum HTTP surface (ingest, subscribe, health, static UI)
//! - **[`monitor`]**: producer-side reporter for training loops
//!
//! # Example
//!
//! ```
//! use vigilar::store::{Category, MetricStore};
//!
//! let store = MetricStore::new();
//! store.save(Category::Epoch, "boston", serde_json::json!({
//!     "timestamp": 1000,
//!     "logs": { "loss": 0.5 }
//! }))?;
//!
//! let history = store.load(Category::Epoch, "boston");
//! assert_eq!(history.len(), 1);
//! # Ok::<(), vigilar::store::StoreError>(())
//! ```

pub mod feed;
pub mod monitor;
pub mod server;
pub mod store;
