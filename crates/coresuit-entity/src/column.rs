//! Column metadata and typed, nullable column values.
//!
//! Every entity publishes a whitelist of [`Column`]s. Sort and filter
//! fields supplied by clients are resolved against that whitelist, and
//! filter operands are coerced to the column's [`ColumnKind`] before they
//! reach a backend.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use coresuit_core::error::AppError;
use coresuit_core::result::AppResult;
use coresuit_core::types::filter::FilterValue;
use serde::{Deserialize, Serialize};

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// 64-bit integer.
    Integer,
    /// Text.
    Text,
    /// Boolean.
    Boolean,
    /// Double precision float.
    Float,
    /// Timestamp without time zone.
    Timestamp,
}

/// A queryable field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Public field name, as used in `SortBy` and DTOs (e.g. `"CreatedAt"`).
    pub field: &'static str,
    /// Column name in the store (e.g. `"created_at"`).
    pub column: &'static str,
    /// Storage type.
    pub kind: ColumnKind,
}

impl Column {
    /// Create a column definition.
    pub const fn new(field: &'static str, column: &'static str, kind: ColumnKind) -> Self {
        Self {
            field,
            column,
            kind,
        }
    }

    /// Whether `name` refers to this column, by field or column name,
    /// ignoring ASCII case.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.field.eq_ignore_ascii_case(name) || self.column.eq_ignore_ascii_case(name)
    }
}

/// Look up `name` in a column whitelist.
pub fn resolve_column(
    columns: &'static [Column],
    entity: &str,
    name: &str,
) -> AppResult<&'static Column> {
    columns.iter().find(|c| c.matches(name)).ok_or_else(|| {
        AppError::invalid_operation(format!("{entity} has no queryable field '{name}'"))
    })
}

/// A nullable value of a known column kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// Integer value.
    Int(Option<i64>),
    /// Text value.
    Text(Option<String>),
    /// Boolean value.
    Bool(Option<bool>),
    /// Float value.
    Float(Option<f64>),
    /// Timestamp value.
    Timestamp(Option<NaiveDateTime>),
}

impl ColumnValue {
    /// A typed NULL of the given kind.
    pub fn null(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Integer => Self::Int(None),
            ColumnKind::Text => Self::Text(None),
            ColumnKind::Boolean => Self::Bool(None),
            ColumnKind::Float => Self::Float(None),
            ColumnKind::Timestamp => Self::Timestamp(None),
        }
    }

    /// Whether this value is NULL.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Int(v) => v.is_none(),
            Self::Text(v) => v.is_none(),
            Self::Bool(v) => v.is_none(),
            Self::Float(v) => v.is_none(),
            Self::Timestamp(v) => v.is_none(),
        }
    }

    /// The text content, if this is a non-null text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(Some(s)) => Some(s),
            _ => None,
        }
    }

    /// Convert a client-supplied filter operand into a value of `kind`.
    pub fn coerce(kind: ColumnKind, value: &FilterValue) -> AppResult<Self> {
        let mismatch = || {
            AppError::invalid_argument(format!("Value {value:?} is not a valid {kind:?}"))
        };

        if matches!(value, FilterValue::Null) {
            return Ok(Self::null(kind));
        }

        let coerced = match (kind, value) {
            (ColumnKind::Integer, FilterValue::Integer(i)) => Self::Int(Some(*i)),
            (ColumnKind::Integer, FilterValue::String(s)) => {
                Self::Int(Some(s.trim().parse().map_err(|_| mismatch())?))
            }
            (ColumnKind::Text, FilterValue::String(s)) => Self::Text(Some(s.clone())),
            (ColumnKind::Text, FilterValue::Integer(i)) => Self::Text(Some(i.to_string())),
            (ColumnKind::Text, FilterValue::Float(f)) => Self::Text(Some(f.to_string())),
            (ColumnKind::Text, FilterValue::Boolean(b)) => Self::Text(Some(b.to_string())),
            (ColumnKind::Boolean, FilterValue::Boolean(b)) => Self::Bool(Some(*b)),
            (ColumnKind::Boolean, FilterValue::String(s)) => {
                Self::Bool(Some(s.trim().parse().map_err(|_| mismatch())?))
            }
            (ColumnKind::Float, FilterValue::Float(f)) => Self::Float(Some(*f)),
            (ColumnKind::Float, FilterValue::Integer(i)) => Self::Float(Some(*i as f64)),
            (ColumnKind::Float, FilterValue::String(s)) => {
                Self::Float(Some(s.trim().parse().map_err(|_| mismatch())?))
            }
            (ColumnKind::Timestamp, FilterValue::Timestamp(t)) => Self::Timestamp(Some(*t)),
            (ColumnKind::Timestamp, FilterValue::String(s)) => {
                Self::Timestamp(Some(parse_timestamp(s).ok_or_else(mismatch)?))
            }
            _ => return Err(mismatch()),
        };
        Ok(coerced)
    }

    /// SQL comparison semantics: `None` when either side is NULL or the
    /// kinds differ.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(Some(a)), Self::Int(Some(b))) => Some(a.cmp(b)),
            (Self::Text(Some(a)), Self::Text(Some(b))) => Some(a.cmp(b)),
            (Self::Bool(Some(a)), Self::Bool(Some(b))) => Some(a.cmp(b)),
            (Self::Float(Some(a)), Self::Float(Some(b))) => a.partial_cmp(b),
            (Self::Timestamp(Some(a)), Self::Timestamp(Some(b))) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order for sorting, with NULL greater than every value
    /// (PostgreSQL's default null placement).
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    static COLUMNS: &[Column] = &[
        Column::new("Id", "id", ColumnKind::Integer),
        Column::new("CreatedAt", "created_at", ColumnKind::Timestamp),
        Column::new("Category.Name", "category_name", ColumnKind::Text),
    ];

    #[test]
    fn test_resolve_by_field_or_column() {
        assert_eq!(resolve_column(COLUMNS, "Thing", "id").unwrap().field, "Id");
        assert_eq!(
            resolve_column(COLUMNS, "Thing", "createdAt").unwrap().column,
            "created_at"
        );
        assert_eq!(
            resolve_column(COLUMNS, "Thing", "created_at").unwrap().field,
            "CreatedAt"
        );
        assert_eq!(
            resolve_column(COLUMNS, "Thing", "category.name").unwrap().column,
            "category_name"
        );
    }

    #[test]
    fn test_resolve_unknown_is_invalid_operation() {
        let err = resolve_column(COLUMNS, "Thing", "Password").unwrap_err();
        assert_eq!(err.kind, coresuit_core::ErrorKind::InvalidOperation);
        assert!(err.message.contains("Password"));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(
            ColumnValue::coerce(ColumnKind::Integer, &FilterValue::String("42".into())).unwrap(),
            ColumnValue::Int(Some(42))
        );
        assert_eq!(
            ColumnValue::coerce(ColumnKind::Timestamp, &FilterValue::Null).unwrap(),
            ColumnValue::Timestamp(None)
        );
        let parsed = ColumnValue::coerce(
            ColumnKind::Timestamp,
            &FilterValue::String("2024-03-01T12:00:00".into()),
        )
        .unwrap();
        assert!(!parsed.is_null());
        assert!(ColumnValue::coerce(ColumnKind::Integer, &FilterValue::Boolean(true)).is_err());
    }

    #[test]
    fn test_nulls_sort_last() {
        let one = ColumnValue::Int(Some(1));
        let null = ColumnValue::Int(None);
        assert_eq!(one.sort_cmp(&null), Ordering::Less);
        assert_eq!(null.sort_cmp(&one), Ordering::Greater);
        assert_eq!(one.compare(&null), None);
    }
}
