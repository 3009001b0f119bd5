//! Declarative query descriptors.
//!
//! A [`Query`] is a backend-neutral description of a filtered, ordered and
//! optionally paged read. Field names are resolved against the entity's
//! column whitelist when the query is built, so backends only ever see
//! known columns and typed operands.

use std::cmp::Ordering;
use std::marker::PhantomData;

use coresuit_core::error::AppError;
use coresuit_core::result::AppResult;
use coresuit_core::types::filter::{FilterField, FilterOp, FilterValue, like_matches};
use coresuit_core::types::pagination::DEFAULT_SORT_BY;
use coresuit_core::types::sorting::SortDirection;

use crate::column::{Column, ColumnKind, ColumnValue};
use crate::traits::{Entity, HasActiveFlag, SoftDelete};

/// Right-hand side of a resolved condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Unary operators (`IS NULL`, `IS NOT NULL`).
    None,
    /// A single typed value.
    Value(ColumnValue),
    /// A list of typed values (`IN`).
    List(Vec<ColumnValue>),
}

/// A filter whose field has been resolved to a whitelisted column.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The column being tested.
    pub column: &'static Column,
    /// The comparison operator.
    pub op: FilterOp,
    /// The coerced operand.
    pub operand: Operand,
}

impl Condition {
    /// Resolve a client filter for entity `E`.
    pub fn resolve<E: Entity>(filter: &FilterField) -> AppResult<Self> {
        let column = E::resolve(&filter.field)?;
        let kind = column.kind;

        let operand = match filter.op {
            op if op.is_unary() => Operand::None,
            FilterOp::In => match &filter.value {
                FilterValue::StringList(items) => Operand::List(
                    items
                        .iter()
                        .map(|item| ColumnValue::coerce(kind, &FilterValue::String(item.clone())))
                        .collect::<AppResult<Vec<_>>>()?,
                ),
                other => Operand::List(vec![ColumnValue::coerce(kind, other)?]),
            },
            FilterOp::Like | FilterOp::ILike if kind != ColumnKind::Text => {
                return Err(AppError::invalid_operation(format!(
                    "Pattern match on non-text field '{}'",
                    column.field
                )));
            }
            _ => Operand::Value(ColumnValue::coerce(kind, &filter.value)?),
        };

        Ok(Self {
            column,
            op: filter.op,
            operand,
        })
    }

    /// Evaluate the condition against an in-memory entity with SQL
    /// semantics: comparisons involving NULL are false.
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        let value = entity
            .value(self.column.column)
            .unwrap_or_else(|| ColumnValue::null(self.column.kind));

        match (&self.op, &self.operand) {
            (FilterOp::IsNull, _) => value.is_null(),
            (FilterOp::IsNotNull, _) => !value.is_null(),
            (FilterOp::In, Operand::List(items)) => items
                .iter()
                .any(|item| value.compare(item) == Some(Ordering::Equal)),
            (FilterOp::Like | FilterOp::ILike, Operand::Value(pattern)) => {
                match (value.as_text(), pattern.as_text()) {
                    (Some(text), Some(pattern)) => {
                        like_matches(text, pattern, self.op == FilterOp::ILike)
                    }
                    _ => false,
                }
            }
            (op, Operand::Value(operand)) => match value.compare(operand) {
                Some(ordering) => match op {
                    FilterOp::Eq => ordering == Ordering::Equal,
                    FilterOp::Ne => ordering != Ordering::Equal,
                    FilterOp::Gt => ordering == Ordering::Greater,
                    FilterOp::Gte => ordering != Ordering::Less,
                    FilterOp::Lt => ordering == Ordering::Less,
                    FilterOp::Lte => ordering != Ordering::Greater,
                    _ => false,
                },
                None => false,
            },
            _ => false,
        }
    }
}

/// One ordering key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderBy {
    /// The column to order by.
    pub column: &'static Column,
    /// Sort direction.
    pub direction: SortDirection,
}

/// A resolved, backend-neutral read.
pub struct Query<E> {
    conditions: Vec<Condition>,
    order: Vec<OrderBy>,
    offset: Option<u64>,
    limit: Option<u64>,
    read_only: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Query<E> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            order: self.order.clone(),
            offset: self.offset,
            limit: self.limit,
            read_only: self.read_only,
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("conditions", &self.conditions)
            .field("order", &self.order)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl<E: Entity> Default for Query<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Query<E> {
    /// An unfiltered, unordered query over every row.
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            order: Vec::new(),
            offset: None,
            limit: None,
            read_only: false,
            _entity: PhantomData,
        }
    }

    /// Add a condition (conjunction).
    pub fn filter(mut self, filter: &FilterField) -> AppResult<Self> {
        self.conditions.push(Condition::resolve::<E>(filter)?);
        Ok(self)
    }

    /// Replace the ordering with a single key.
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> AppResult<Self> {
        let column = E::resolve(field)?;
        self.order = vec![OrderBy { column, direction }];
        Ok(self)
    }

    /// Restrict to a window of rows.
    pub fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    /// Mark the result as not intended for mutation.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// The conditions, all of which must hold.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The ordering keys, most significant first.
    pub fn order(&self) -> &[OrderBy] {
        &self.order
    }

    /// Rows to skip.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Maximum rows to return.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Whether the caller asked for an untracked result.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether `entity` satisfies every condition.
    pub fn matches(&self, entity: &E) -> bool {
        self.conditions.iter().all(|c| c.matches(entity))
    }

    /// Compare two entities by the ordering keys.
    pub fn compare(&self, a: &E, b: &E) -> Ordering {
        for key in &self.order {
            let column = key.column;
            let left = a
                .value(column.column)
                .unwrap_or_else(|| ColumnValue::null(column.kind));
            let right = b
                .value(column.column)
                .unwrap_or_else(|| ColumnValue::null(column.kind));
            let ordering = match key.direction {
                SortDirection::Asc => left.sort_cmp(&right),
                SortDirection::Desc => right.sort_cmp(&left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Options for [`CrudRepository::all`](crate::repository::CrudRepository::all).
///
/// Defaults: read-only, soft-deleted rows excluded, ordered by `Id`
/// descending.
pub struct QueryOptions<E> {
    read_only: bool,
    include_deleted: bool,
    active_column: Option<&'static str>,
    filters: Vec<FilterField>,
    sort_by: String,
    direction: SortDirection,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for QueryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            read_only: self.read_only,
            include_deleted: self.include_deleted,
            active_column: self.active_column,
            filters: self.filters.clone(),
            sort_by: self.sort_by.clone(),
            direction: self.direction,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Default for QueryOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> QueryOptions<E> {
    /// Default options.
    pub fn new() -> Self {
        Self {
            read_only: true,
            include_deleted: false,
            active_column: None,
            filters: Vec::new(),
            sort_by: DEFAULT_SORT_BY.to_string(),
            direction: SortDirection::Desc,
            _entity: PhantomData,
        }
    }

    /// Set whether the result is read-only.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Include logically deleted rows.
    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    /// Add a condition; every condition must hold.
    pub fn and_where(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the ordering.
    pub fn sort(mut self, sort_by: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = sort_by.into();
        self.direction = direction;
        self
    }

    /// Resolve the options into a query.
    ///
    /// Conditions are applied in order: caller filters, then the
    /// soft-delete filter, then the active flag. Only entities with a
    /// deletion stamp can be queried this way:
    ///
    /// ```compile_fail
    /// use coresuit_entity::column::{Column, ColumnKind, ColumnValue};
    /// use coresuit_entity::query::QueryOptions;
    /// use coresuit_entity::table::TableInfo;
    /// use coresuit_entity::traits::Entity;
    ///
    /// #[derive(Clone)]
    /// struct AuditLine {
    ///     id: i64,
    /// }
    ///
    /// impl Entity for AuditLine {
    ///     const NAME: &'static str = "AuditLine";
    ///     const TABLE: TableInfo = TableInfo::new("audit_line", "sc_001", "");
    ///     fn id(&self) -> i64 { self.id }
    ///     fn set_id(&mut self, id: i64) { self.id = id; }
    ///     fn columns() -> &'static [Column] {
    ///         static COLUMNS: [Column; 1] = [Column::new("Id", "id", ColumnKind::Integer)];
    ///         &COLUMNS
    ///     }
    ///     fn value(&self, _column: &str) -> Option<ColumnValue> { None }
    /// }
    ///
    /// // AuditLine has no deletion stamp, so this does not compile.
    /// let _ = QueryOptions::<AuditLine>::new().build();
    /// ```
    pub fn build(self) -> AppResult<Query<E>>
    where
        E: SoftDelete,
    {
        let mut query = Query::new().read_only(self.read_only);
        for filter in &self.filters {
            query = query.filter(filter)?;
        }
        if !self.include_deleted {
            query = query.filter(&FilterField::is_null(E::DELETED_AT))?;
        }
        if let Some(active) = self.active_column {
            query = query.filter(&FilterField::eq(active, FilterValue::Boolean(true)))?;
        }
        query.order_by(&self.sort_by, self.direction)
    }
}

impl<E: HasActiveFlag> QueryOptions<E> {
    /// Also require the active flag to be set.
    pub fn only_actives(mut self) -> Self {
        self.active_column = Some(E::ACTIVE);
        self
    }
}
