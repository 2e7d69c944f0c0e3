//! Domain events and the transactional outbox record they are written as.

pub mod event;
pub mod outbox;

pub use event::Event;
pub use outbox::{OutboxError, OutboxRecord, OutboxStatus};
