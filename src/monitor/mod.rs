//! Producer-side metric reporter.
//!
//! A training loop holds one [`RemoteMonitor`] and calls the matching
//! hook at batch, epoch, and run boundaries; each enabled hook POSTs one
//! metric record to the collection server. Epoch reporting is on by
//! default, batch and train off - batch volume is high and end-of-train
//! metrics rarely feed live charts.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use vigilar::monitor::RemoteMonitor;
//!
//! # fn main() -> Result<(), vigilar::monitor::MonitorError> {
//! let monitor = RemoteMonitor::new("http://127.0.0.1:3000")?.with_run_id("boston");
//!
//! for epoch in 0..200 {
//!     // ... one epoch of training ...
//!     let mut logs = HashMap::new();
//!     logs.insert("loss".to_string(), 0.5 / (epoch + 1) as f64);
//!     monitor.on_epoch_end(&logs)?;
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::Client;
use serde_json::json;
use uuid::Uuid;

use crate::feed::Envelope;
use crate::store::Category;

/// Errors from the reporter.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server refused {category} metrics for run {run_id}")]
    Refused { category: Category, run_id: String },
}

/// Result alias for reporter operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Blocking HTTP reporter for training-loop hooks.
#[derive(Debug)]
pub struct RemoteMonitor {
    client: Client,
    root: String,
    run_id: String,
    use_batch: bool,
    use_epoch: bool,
    use_train: bool,
}

impl RemoteMonitor {
    /// Create a reporter targeting a collection server.
    ///
    /// The run id defaults to a random UUID; override it with
    /// [`with_run_id`](Self::with_run_id) when charts should find the run
    /// under a stable name.
    pub fn new(root: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            root: root.trim_end_matches('/').to_string(),
            run_id: Uuid::new_v4().to_string(),
            use_batch: false,
            use_epoch: true,
            use_train: false,
        })
    }

    /// Use a stable run id instead of the random default.
    #[must_use]
    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = run_id.to_string();
        self
    }

    /// Enable or disable per-batch reporting.
    #[must_use]
    pub fn with_batch(mut self, enabled: bool) -> Self {
        self.use_batch = enabled;
        self
    }

    /// Enable or disable per-epoch reporting.
    #[must_use]
    pub fn with_epoch(mut self, enabled: bool) -> Self {
        self.use_epoch = enabled;
        self
    }

    /// Enable or disable end-of-train reporting.
    #[must_use]
    pub fn with_train(mut self, enabled: bool) -> Self {
        self.use_train = enabled;
        self
    }

    /// The run id this reporter writes under.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn payload(&self, logs: &HashMap<String, f64>) -> serde_json::Value {
        json!({
            "id": self.run_id,
            "metrics": {
                "timestamp": Utc::now().to_rfc3339(),
                "logs": logs,
            },
        })
    }

    fn report(&self, category: Category, logs: &HashMap<String, f64>) -> Result<()> {
        let url = format!("{}/{category}", self.root);
        let ack: Envelope = self
            .client
            .post(&url)
            .json(&self.payload(logs))
            .send()?
            .json()?;

        if ack.success {
            Ok(())
        } else {
            Err(MonitorError::Refused {
                category,
                run_id: self.run_id.clone(),
            })
        }
    }

    /// Report end-of-batch metrics, if batch reporting is enabled.
    pub fn on_batch_end(&self, logs: &HashMap<String, f64>) -> Result<()> {
        if self.use_batch {
            self.report(Category::Batch, logs)
        } else {
            Ok(())
        }
    }

    /// Report end-of-epoch metrics, if epoch reporting is enabled.
    pub fn on_epoch_end(&self, logs: &HashMap<String, f64>) -> Result<()> {
        if self.use_epoch {
            self.report(Category::Epoch, logs)
        } else {
            Ok(())
        }
    }

    /// Report end-of-train metrics, if train reporting is enabled.
    pub fn on_train_end(&self, logs: &HashMap<String, f64>) -> Result<()> {
        if self.use_train {
            self.report(Category::Train, logs)
        } else {
            Ok(())
        }
    }
}
