//! Transactional outbox records.
//!
//! An [`OutboxRecord`] is the persisted form of one domain event. It is written
//! in the same atomic commit as the aggregate change that raised the event, and
//! is later drained by a relay outside this workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use catalog_core::AggregateId;

use crate::event::Event;

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("event payload serialization failed for {event_type}: {source}")]
    Serialization {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Delivery state of an outbox record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Processed,
}

impl OutboxStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Processed => "processed",
        }
    }
}

impl core::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: AggregateId,
    pub payload: JsonValue,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl OutboxRecord {
    /// Wrap a typed domain event as a pending outbox record.
    ///
    /// The payload is the serde_json form of the event. Serialization failures
    /// are returned rather than dropped so the caller can abort the commit.
    pub fn from_event<E>(event: &E, created_at: DateTime<Utc>) -> Result<Self, OutboxError>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(event).map_err(|source| OutboxError::Serialization {
            event_type: event.event_type(),
            source,
        })?;

        Ok(Self {
            event_id: Uuid::now_v7(),
            event_type: event.event_type().to_string(),
            aggregate_id: event.aggregate_id(),
            payload,
            status: OutboxStatus::Pending,
            created_at,
            processed_at: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == OutboxStatus::Pending
    }

    /// Record delivery. Used by the relay that drains the outbox.
    pub fn mark_processed(&mut self, at: DateTime<Utc>) {
        self.status = OutboxStatus::Processed;
        self.processed_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Serializer;

    #[derive(Debug, Clone, Serialize)]
    struct Pinged {
        id: AggregateId,
        occurred_at: DateTime<Utc>,
    }

    impl Event for Pinged {
        fn event_type(&self) -> &'static str {
            "pinged"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.occurred_at
        }

        fn aggregate_id(&self) -> AggregateId {
            self.id
        }
    }

    #[derive(Debug, Clone)]
    struct Unserializable {
        id: AggregateId,
    }

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("boom"))
        }
    }

    impl Event for Unserializable {
        fn event_type(&self) -> &'static str {
            "unserializable"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        }

        fn aggregate_id(&self) -> AggregateId {
            self.id
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn from_event_builds_pending_record() {
        let id = AggregateId::new();
        let record = OutboxRecord::from_event(&Pinged { id, occurred_at: at() }, at()).unwrap();

        assert_eq!(record.event_type, "pinged");
        assert_eq!(record.aggregate_id, id);
        assert_eq!(record.status, OutboxStatus::Pending);
        assert_eq!(record.created_at, at());
        assert!(record.processed_at.is_none());
        assert_eq!(record.payload["id"], serde_json::json!(id.to_string()));
    }

    #[test]
    fn each_record_gets_a_fresh_event_id() {
        let event = Pinged {
            id: AggregateId::new(),
            occurred_at: at(),
        };
        let a = OutboxRecord::from_event(&event, at()).unwrap();
        let b = OutboxRecord::from_event(&event, at()).unwrap();
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn serialization_failure_is_reported() {
        let err = OutboxRecord::from_event(&Unserializable { id: AggregateId::new() }, at())
            .unwrap_err();
        assert!(matches!(
            err,
            OutboxError::Serialization {
                event_type: "unserializable",
                ..
            }
        ));
    }

    #[test]
    fn mark_processed_sets_timestamp() {
        let mut record = OutboxRecord::from_event(
            &Pinged {
                id: AggregateId::new(),
                occurred_at: at(),
            },
            at(),
        )
        .unwrap();
        let later = at() + chrono::Duration::minutes(5);
        record.mark_processed(later);

        assert!(!record.is_pending());
        assert_eq!(record.processed_at, Some(later));
    }

    #[test]
    fn status_renders_persisted_strings() {
        assert_eq!(OutboxStatus::Pending.as_str(), "pending");
        assert_eq!(OutboxStatus::Processed.to_string(), "processed");
    }
}
