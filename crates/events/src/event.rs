use chrono::{DateTime, Utc};

use catalog_core::AggregateId;

/// A domain event raised by an aggregate.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **versioned** (schema evolution)
/// - serialized only when they leave the process through the outbox
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "product_created").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;

    /// The aggregate that raised the event.
    fn aggregate_id(&self) -> AggregateId;
}
