//! Entity contracts.
//!
//! Capabilities that the query layer needs by name (the soft-delete marker,
//! an active flag, a branch identifier) are expressed as traits, so a
//! query that needs one of them only compiles for entities that have it.

use chrono::NaiveDateTime;
use coresuit_core::result::AppResult;

use crate::column::{Column, ColumnValue, resolve_column};
use crate::table::TableInfo;

/// A persistent record with an integer identity.
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    /// Human-readable entity name, used in error messages.
    const NAME: &'static str;
    /// Where the entity is stored.
    const TABLE: TableInfo;
    /// Column holding the identity.
    const ID_COLUMN: &'static str = "id";

    /// Identity; 0 until the store assigns one.
    fn id(&self) -> i64;

    /// Overwrite the identity.
    fn set_id(&mut self, id: i64);

    /// Whitelist of queryable columns, identity included.
    fn columns() -> &'static [Column];

    /// Current value of a column, by column name.
    fn value(&self, column: &str) -> Option<ColumnValue>;

    /// Resolve a client-supplied field name against [`columns`](Self::columns).
    fn resolve(name: &str) -> AppResult<&'static Column> {
        resolve_column(Self::columns(), Self::NAME, name)
    }

    /// Columns written on insert and update (everything but the identity).
    fn writable_columns() -> impl Iterator<Item = &'static Column> {
        Self::columns()
            .iter()
            .filter(|c| c.column != Self::ID_COLUMN)
    }
}

/// Creation and modification stamps.
pub trait Audited: Entity {
    /// When the entity was created.
    fn created_at(&self) -> NaiveDateTime;

    /// When the entity was last modified.
    fn updated_at(&self) -> NaiveDateTime;

    /// Refresh the modification stamp.
    fn set_updated_at(&mut self, at: NaiveDateTime);
}

/// Logical deletion through a nullable timestamp.
///
/// `deleted_at() == None` means the entity is active.
pub trait SoftDelete: Entity {
    /// Column holding the deletion stamp.
    const DELETED_AT: &'static str = "deleted_at";

    /// When the entity was deleted, if it was.
    fn deleted_at(&self) -> Option<NaiveDateTime>;

    /// Set or clear the deletion stamp.
    fn set_deleted_at(&mut self, at: Option<NaiveDateTime>);

    /// Whether the entity is logically deleted.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// A boolean `Active` column, in addition to soft delete.
pub trait HasActiveFlag: Entity {
    /// Column holding the flag.
    const ACTIVE: &'static str = "active";

    /// Whether the flag is set.
    fn is_active(&self) -> bool;
}

/// Ownership by a branch (tenant).
pub trait HasBranch: Entity {
    /// Column holding the branch identifier.
    const BRANCH_ID: &'static str = "branch_id";

    /// The owning branch.
    fn branch_id(&self) -> i64;
}
