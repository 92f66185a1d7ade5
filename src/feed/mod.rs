//! Live metric feed wire format.
//!
//! Observers subscribe with a long-lived GET request and receive the
//! current history of a run log as one server-sent event, after which the
//! connection is held open. The server never pushes a second event;
//! observers that want fresher data close and re-open the subscription.
//! This snapshot-then-idle contract is deliberate and matches the
//! producers and chart UIs already speaking this protocol.
//!
//! The framing here must stay byte-exact: each event is a block
//! `data: <json>\n\n` where `<json>` is an [`Envelope`].

use serde::{Deserialize, Serialize};

use crate::store::MetricRecord;

/// JSON envelope shared by feed events and write acknowledgements.
///
/// Feed events carry `{"success":true,"payload":[...]}`; write
/// acknowledgements carry `{"success":<bool>}` with the payload omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the operation succeeded
    pub success: bool,
    /// Metric history, present on feed events only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<MetricRecord>>,
}

impl Envelope {
    /// Envelope for a feed event carrying a full history snapshot.
    #[must_use]
    pub fn snapshot(records: Vec<MetricRecord>) -> Self {
        Self {
            success: true,
            payload: Some(records),
        }
    }

    /// Envelope acknowledging a write, with no payload.
    #[must_use]
    pub fn ack(success: bool) -> Self {
        Self {
            success,
            payload: None,
        }
    }
}

/// Encode one server-sent event block: `data: <json>\n\n`.
pub fn event_stream_block(envelope: &Envelope) -> Result<String, serde_json::Error> {
    Ok(format!("data: {}\n\n", serde_json::to_string(envelope)?))
}
