use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::types::QueryItem;

/// Progress notifications emitted as a run moves through its stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Planning { iteration: u32 },
    Searching { queries: Vec<QueryItem> },
    Reviewing { iteration: u32, summaries: usize },
    Writing { drafts: usize },
    Evaluating { candidates: usize },
    Done { report: String },
}

/// Optional event channel. A missing or closed receiver is ignored.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn new(tx: Option<UnboundedSender<ProgressEvent>>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::debug!("Progress receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_receiver_is_noop() {
        ProgressSink::default().emit(ProgressEvent::Writing { drafts: 5 });
    }

    #[test]
    fn test_closed_receiver_does_not_fail() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        ProgressSink::new(Some(tx)).emit(ProgressEvent::Planning { iteration: 1 });
    }

    #[tokio::test]
    async fn test_events_delivered_in_order() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ProgressSink::new(Some(tx));
        sink.emit(ProgressEvent::Planning { iteration: 1 });
        sink.emit(ProgressEvent::Evaluating { candidates: 5 });

        assert_eq!(rx.recv().await, Some(ProgressEvent::Planning { iteration: 1 }));
        assert_eq!(rx.recv().await, Some(ProgressEvent::Evaluating { candidates: 5 }));
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_string(&ProgressEvent::Writing { drafts: 5 }).unwrap();
        assert_eq!(json, r#"{"event":"writing","drafts":5}"#);
    }
}
