//! Aggregate root trait for state-stored domain models that record events.

/// Aggregate root marker + minimal interface.
///
/// Aggregates mutate their own state through domain methods and record the
/// resulting domain events in an in-memory pending list. The application layer
/// drains that list exactly once per use case and persists the events in the
/// same atomic write as the state change (transactional outbox).
///
/// Aggregates must not perform IO. Instances are owned per request and never
/// shared, so no synchronisation is needed inside them.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Domain event type recorded by this aggregate.
    type Event: Clone + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Events recorded since construction/reconstruction that have not been drained.
    fn pending_events(&self) -> &[Self::Event];

    /// Drain the pending events, leaving the list empty.
    fn take_events(&mut self) -> Vec<Self::Event>;
}
