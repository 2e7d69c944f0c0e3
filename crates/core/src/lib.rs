//! `catalog-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::AggregateRoot;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::AggregateId;
pub use money::{MinorUnits, Money};
pub use value_object::ValueObject;
