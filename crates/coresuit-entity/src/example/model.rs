//! Example entity model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::column::{Column, ColumnKind, ColumnValue};
use crate::table::{TableInfo, tables};
use crate::traits::{Audited, Entity, SoftDelete};

static COLUMNS: [Column; 6] = [
    Column::new("Id", "id", ColumnKind::Integer),
    Column::new("Name", "name", ColumnKind::Text),
    Column::new("Description", "description", ColumnKind::Text),
    Column::new("CreatedAt", "created_at", ColumnKind::Timestamp),
    Column::new("UpdatedAt", "updated_at", ColumnKind::Timestamp),
    Column::new("DeletedAt", "deleted_at", ColumnKind::Timestamp),
];

/// A named, described record. The reference resource for the generic
/// CRUD stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Example {
    /// Identity assigned by the store.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// When the record was created.
    pub created_at: NaiveDateTime,
    /// When the record was last modified.
    pub updated_at: NaiveDateTime,
    /// When the record was soft-deleted.
    pub deleted_at: Option<NaiveDateTime>,
}

impl Example {
    /// Create an unsaved record stamped at `now`.
    pub fn new(name: impl Into<String>, description: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Entity for Example {
    const NAME: &'static str = "Example";
    const TABLE: TableInfo = tables::EXAMPLE;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn columns() -> &'static [Column] {
        &COLUMNS
    }

    fn value(&self, column: &str) -> Option<ColumnValue> {
        let value = match column {
            "id" => ColumnValue::Int(Some(self.id)),
            "name" => ColumnValue::Text(Some(self.name.clone())),
            "description" => ColumnValue::Text(Some(self.description.clone())),
            "created_at" => ColumnValue::Timestamp(Some(self.created_at)),
            "updated_at" => ColumnValue::Timestamp(Some(self.updated_at)),
            "deleted_at" => ColumnValue::Timestamp(self.deleted_at),
            _ => return None,
        };
        Some(value)
    }
}

impl Audited for Example {
    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: NaiveDateTime) {
        self.updated_at = at;
    }
}

impl SoftDelete for Example {
    fn deleted_at(&self) -> Option<NaiveDateTime> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, at: Option<NaiveDateTime>) {
        self.deleted_at = at;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_new_is_active_with_equal_stamps() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let example = Example::new("A", "B", now);
        assert_eq!(example.created_at, example.updated_at);
        assert!(!example.is_deleted());
    }

    #[test]
    fn test_every_column_has_a_value() {
        let example = Example::new("A", "B", NaiveDateTime::default());
        for column in Example::columns() {
            assert!(example.value(column.column).is_some(), "{}", column.column);
        }
        assert_eq!(Example::writable_columns().count(), 5);
    }
}
