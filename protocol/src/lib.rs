//! Message contract between the CCView panel (UI surface) and its
//! controlling host process.
//!
//! Messages are transient: each one exists only until delivered, and nothing
//! here is persisted. The same envelope type is used in both directions; the
//! direction conventions are documented on [`MessagePayload`].

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Which presentation sink an output record is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputChannel {
    /// Regular command output.
    Primary,
    /// Informational side notes (e.g. "script forwarded to viewer").
    Diagnostic,
    /// Failures, rendered inline in the transcript with an error marker.
    Failure,
}

/// One unit of human-facing output produced for a command.
///
/// Records are immutable after creation: the dispatcher or bridge creates
/// them, the output router formats them, and the session relays them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub channel: OutputChannel,
    pub content: String,
    pub produced_at: DateTime<Utc>,
}

impl OutputRecord {
    pub fn new(channel: OutputChannel, content: impl Into<String>) -> Self {
        Self {
            channel,
            content: content.into(),
            produced_at: Utc::now(),
        }
    }

    pub fn primary(content: impl Into<String>) -> Self {
        Self::new(OutputChannel::Primary, content)
    }

    pub fn diagnostic(content: impl Into<String>) -> Self {
        Self::new(OutputChannel::Diagnostic, content)
    }

    /// Failure records carry the transcript error marker so every failure
    /// class reads the same way in the panel.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(OutputChannel::Failure, format!("Error: {}", message.into()))
    }
}

/// Direction of a history recall request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryDirection {
    Up,
    Down,
}

/// Classifies a [`MessagePayload::StatusNotice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKind {
    /// Plain informational notice.
    Info,
    /// The notice text is a viewer script the UI surface should execute in
    /// its local rendering context.
    SceneScript,
    /// All presentation channels should reset.
    Cleared,
}

/// Body of a session message.
///
/// Direction conventions: `CommandSubmit` and `HistoryRequest` travel from
/// the UI surface to the host; `ResultDelivery`, `HistoryReply`, and
/// `Cleared`/`SceneScript` status notices travel from the host to the UI
/// surface. `Info` status notices and `FailureNotice` may travel either way
/// (the UI surface uses them to report scene-script outcomes back to the
/// host).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MessagePayload {
    CommandSubmit {
        raw_text: String,
    },
    ResultDelivery {
        record: OutputRecord,
    },
    HistoryRequest {
        direction: HistoryDirection,
    },
    HistoryReply {
        recalled_text: Option<String>,
    },
    StatusNotice {
        status: StatusKind,
        text: String,
    },
    FailureNotice {
        message: String,
    },
}

/// The envelope exchanged across the UI ↔ host boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMessage {
    pub sent_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: MessagePayload,
}

impl SessionMessage {
    pub fn new(payload: MessagePayload) -> Self {
        Self {
            sent_at: Utc::now(),
            payload,
        }
    }

    pub fn submit(raw_text: impl Into<String>) -> Self {
        Self::new(MessagePayload::CommandSubmit {
            raw_text: raw_text.into(),
        })
    }

    pub fn history_request(direction: HistoryDirection) -> Self {
        Self::new(MessagePayload::HistoryRequest { direction })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn command_submit_wire_shape() {
        let msg = SessionMessage::submit("ccget natom");
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value["kind"], "commandSubmit");
        assert_eq!(value["rawText"], "ccget natom");
        assert!(value["sentAt"].is_string());
    }

    #[test]
    fn result_delivery_round_trips() {
        let msg = SessionMessage::new(MessagePayload::ResultDelivery {
            record: OutputRecord::failure("no data file is open"),
        });
        let json = serde_json::to_string(&msg).expect("serialize");
        let back: SessionMessage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, msg);
    }

    #[test]
    fn failure_records_carry_error_marker() {
        let record = OutputRecord::failure("interpreter timed out after 20s");
        assert_eq!(record.channel, OutputChannel::Failure);
        assert!(record.content.starts_with("Error: "));
    }
}
