//! Soft-delete lifecycle shared by forms and fields.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Soft-delete state of a record. Stored as the `is_deleted` / `deleted_at` column pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted { at: DateTime<Utc> },
}

impl Lifecycle {
    /// Rebuild from the stored columns. A row flagged deleted without a timestamp uses `fallback`.
    pub fn from_columns(is_deleted: bool, deleted_at: Option<DateTime<Utc>>, fallback: DateTime<Utc>) -> Self {
        if is_deleted {
            Lifecycle::Deleted {
                at: deleted_at.unwrap_or(fallback),
            }
        } else {
            Lifecycle::Active
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Lifecycle::Deleted { .. })
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active => None,
            Lifecycle::Deleted { at } => Some(*at),
        }
    }
}

impl Serialize for Lifecycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Lifecycle", 2)?;
        s.serialize_field("is_deleted", &self.is_deleted())?;
        s.serialize_field("deleted_at", &self.deleted_at())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_ignores_stray_timestamp() {
        let now = Utc::now();
        assert_eq!(Lifecycle::from_columns(false, Some(now), now), Lifecycle::Active);
    }

    #[test]
    fn deleted_without_timestamp_uses_fallback() {
        let now = Utc::now();
        let l = Lifecycle::from_columns(true, None, now);
        assert_eq!(l.deleted_at(), Some(now));
        assert!(l.is_deleted());
    }

    #[test]
    fn serializes_as_column_pair() {
        let v = serde_json::to_value(Lifecycle::Active).unwrap();
        assert_eq!(v, serde_json::json!({ "is_deleted": false, "deleted_at": null }));
    }
}
