//! Dirty-field tracking for partial writes.

use serde::{Deserialize, Serialize};

/// Persisted attributes of a product that can change after creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Field {
    Name = 0,
    Description = 1,
    Category = 2,
    BasePrice = 3,
    Discount = 4,
    Status = 5,
    ArchivedAt = 6,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Description,
        Field::Category,
        Field::BasePrice,
        Field::Discount,
        Field::Status,
        Field::ArchivedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Category => "category",
            Field::BasePrice => "base_price",
            Field::Discount => "discount",
            Field::Status => "status",
            Field::ArchivedAt => "archived_at",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of fields modified since the aggregate was created or loaded.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChangeTracker {
    dirty: u8,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, field: Field) {
        self.dirty |= field.bit();
    }

    pub fn is_dirty(&self, field: Field) -> bool {
        self.dirty & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.dirty == 0
    }

    pub fn len(&self) -> usize {
        self.dirty.count_ones() as usize
    }

    /// Dirty fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| self.is_dirty(*f))
    }

    pub fn clear(&mut self) {
        self.dirty = 0;
    }
}

impl FromIterator<Field> for ChangeTracker {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut tracker = ChangeTracker::new();
        for field in iter {
            tracker.mark_dirty(field);
        }
        tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracker_reports_nothing_dirty() {
        let tracker = ChangeTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.len(), 0);
        for field in Field::ALL {
            assert!(!tracker.is_dirty(field));
        }
    }

    #[test]
    fn marking_is_idempotent() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_dirty(Field::Status);
        tracker.mark_dirty(Field::Status);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.is_dirty(Field::Status));
        assert!(!tracker.is_dirty(Field::Discount));
    }

    #[test]
    fn iter_follows_declaration_order() {
        let tracker: ChangeTracker = [Field::ArchivedAt, Field::Name, Field::Discount]
            .into_iter()
            .collect();
        let fields: Vec<_> = tracker.iter().collect();
        assert_eq!(fields, vec![Field::Name, Field::Discount, Field::ArchivedAt]);
    }

    #[test]
    fn clear_resets() {
        let mut tracker: ChangeTracker = Field::ALL.into_iter().collect();
        assert_eq!(tracker.len(), Field::ALL.len());
        tracker.clear();
        assert!(tracker.is_empty());
    }
}
