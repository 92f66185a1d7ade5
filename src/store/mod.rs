//! In-memory metric storage.
//!
//! An append-only log of metric records, partitioned by [`Category`]
//! (batch/epoch/train granularity) and run id. One [`MetricStore`] instance
//! is constructed at process start and shared by handle; there are no
//! ambient singletons, so tests get isolation from fresh instances.
//!
//! Records are opaque JSON payloads. The store never mutates or removes
//! them, and insertion order is the only order.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// A single reported observation. Opaque to the store beyond being
/// structurally present; by convention producers send a timestamp plus a
/// mapping of metric name to numeric value.
pub type MetricRecord = serde_json::Value;

/// Metric granularity. Closed set: adding or removing a category is a
/// compile-time-checked change at every match site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Reported at the end of each training batch
    Batch,
    /// Reported at the end of each epoch
    Epoch,
    /// Reported once, at the end of the whole run
    Train,
}

impl Category {
    /// All categories, in wire order.
    pub const ALL: [Category; 3] = [Category::Batch, Category::Epoch, Category::Train];

    /// The lowercase wire name, as it appears in URL paths.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Batch => "batch",
            Category::Epoch => "epoch",
            Category::Train => "train",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a category name outside the closed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "batch" => Ok(Category::Batch),
            "epoch" => Ok(Category::Epoch),
            "train" => Ok(Category::Train),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Errors from store writes.
///
/// Reads cannot fail: loading an unknown run id yields an empty history.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("run limit reached for {category}: {limit} runs")]
    RunLimit { category: Category, limit: usize },

    #[error("record limit reached for {category}/{run_id}: {limit} records")]
    RecordLimit {
        category: Category,
        run_id: String,
        limit: usize,
    },
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Optional capacity caps. Both default to unlimited, preserving the
/// original unbounded-growth behavior; setting them turns runaway
/// producers into refused writes instead of memory exhaustion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StoreLimits {
    /// Maximum records kept per (category, run) log
    pub max_records_per_run: Option<usize>,
    /// Maximum distinct runs per category
    pub max_runs_per_category: Option<usize>,
}

impl StoreLimits {
    /// No caps: every write is accepted.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Cap the number of records per run log.
    #[must_use]
    pub fn with_max_records_per_run(mut self, limit: usize) -> Self {
        self.max_records_per_run = Some(limit);
        self
    }

    /// Cap the number of distinct runs per category.
    #[must_use]
    pub fn with_max_runs_per_category(mut self, limit: usize) -> Self {
        self.max_runs_per_category = Some(limit);
        self
    }
}

/// Ordered metric histories for one category, keyed by run id.
type RunLogs = HashMap<String, Vec<MetricRecord>>;

/// Keyed, append-only metric storage.
///
/// Each category holds its own map behind its own lock, so writes to
/// unrelated categories never contend. Within a category, a writer and a
/// reader of the same map are mutually exclusive; a reader can never
/// observe a partially-appended record.
#[derive(Debug, Default)]
pub struct MetricStore {
    batch: RwLock<RunLogs>,
    epoch: RwLock<RunLogs>,
    train: RwLock<RunLogs>,
    limits: StoreLimits,
}

impl MetricStore {
    /// Create an empty store with no capacity limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given capacity limits.
    #[must_use]
    pub fn with_limits(limits: StoreLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    fn partition(&self, category: Category) -> &RwLock<RunLogs> {
        match category {
            Category::Batch => &self.batch,
            Category::Epoch => &self.epoch,
            Category::Train => &self.train,
        }
    }

    /// Append a record to the log for `(category, run_id)`, creating the
    /// log lazily on first write.
    ///
    /// On success the record is immediately visible to subsequent
    /// [`load`](Self::load) calls, after all prior records for that key.
    /// The only failure mode is a configured capacity limit.
    pub fn save(&self, category: Category, run_id: &str, record: MetricRecord) -> Result<()> {
        let mut runs = self
            .partition(category)
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let existing = runs.get(run_id).map_or(0, Vec::len);
        if let Some(limit) = self.limits.max_records_per_run {
            if existing >= limit {
                return Err(StoreError::RecordLimit {
                    category,
                    run_id: run_id.to_string(),
                    limit,
                });
            }
        }
        if !runs.contains_key(run_id) {
            if let Some(limit) = self.limits.max_runs_per_category {
                if runs.len() >= limit {
                    return Err(StoreError::RunLimit { category, limit });
                }
            }
        }

        runs.entry(run_id.to_string()).or_default().push(record);
        Ok(())
    }

    /// The full ordered history for `(category, run_id)`.
    ///
    /// Returns a copy; stored history cannot be mutated through the
    /// returned value. An unknown run id yields an empty vec, never an
    /// error.
    #[must_use]
    pub fn load(&self, category: Category, run_id: &str) -> Vec<MetricRecord> {
        self.partition(category)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(run_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of distinct (category, run) logs.
    #[must_use]
    pub fn run_count(&self) -> usize {
        Category::ALL
            .iter()
            .map(|&c| {
                self.partition(c)
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len()
            })
            .sum()
    }

    /// Total number of records across all logs.
    #[must_use]
    pub fn record_count(&self) -> usize {
        Category::ALL
            .iter()
            .map(|&c| {
                self.partition(c)
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .values()
                    .map(Vec::len)
                    .sum::<usize>()
            })
            .sum()
    }
}
