//! Generic repository port.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use coresuit_core::error::AppError;
use coresuit_core::result::AppResult;
use coresuit_core::retry::RetryPolicy;
use coresuit_core::types::filter::FilterField;
use coresuit_core::types::pagination::{PageRequest, PageResponse};
use coresuit_core::types::sorting::SortDirection;

use crate::column::ColumnKind;
use crate::query::{Query, QueryOptions};
use crate::traits::{Entity, HasBranch, SoftDelete};

/// Generic CRUD repository.
///
/// Backends implement the storage primitives (insert, overwrite, point
/// lookup, query execution, transactions). Soft delete, filtered listing,
/// pagination and the other read helpers are provided on top of them.
///
/// Every write is flushed when the call returns. A handle obtained from
/// [`begin_transaction`](Self::begin_transaction) instead stages its
/// writes until [`commit`](Self::commit).
#[async_trait]
pub trait CrudRepository<E: Entity>: Send + Sync + Sized + 'static {
    /// Insert a new entity; the store assigns its identity.
    async fn add(&self, entity: E) -> AppResult<E>;

    /// Insert several entities. An empty batch is an
    /// [`InvalidArgument`](coresuit_core::ErrorKind::InvalidArgument) error.
    async fn add_range(&self, entities: Vec<E>) -> AppResult<Vec<E>>;

    /// Overwrite every column of an existing entity.
    async fn update(&self, entity: E) -> AppResult<E>;

    /// Primary-key lookup with no visibility rules.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<E>>;

    /// Execute a query.
    async fn fetch(&self, query: &Query<E>) -> AppResult<Vec<E>>;

    /// Count the rows a query matches, ignoring its ordering and window.
    async fn count(&self, query: &Query<E>) -> AppResult<u64>;

    /// Open a transaction and return a handle scoped to it.
    async fn begin_transaction(&self) -> AppResult<Self>;

    /// Commit the open transaction. Without one this only confirms that
    /// pending writes are flushed, which they already are.
    async fn commit(&self) -> AppResult<()>;

    /// Discard the open transaction.
    async fn rollback(&self) -> AppResult<()>;

    /// The policy applied to transient store failures.
    fn retry_strategy(&self) -> RetryPolicy;

    /// Current civil time, used for deletion stamps.
    fn now(&self) -> NaiveDateTime;

    /// Soft delete: stamp `deleted_at` and overwrite the row.
    async fn delete(&self, mut entity: E) -> AppResult<E>
    where
        E: SoftDelete,
    {
        entity.set_deleted_at(Some(self.now()));
        self.update(entity).await
    }

    /// Point lookup. With `check_deleted_at`, a logically deleted row is
    /// reported as absent.
    async fn get(&self, id: i64, check_deleted_at: bool) -> AppResult<Option<E>>
    where
        E: SoftDelete,
    {
        let found = self.find_by_id(id).await?;
        Ok(found.filter(|entity| !check_deleted_at || !entity.is_deleted()))
    }

    /// Point lookup restricted to one branch.
    async fn get_with_branch(&self, id: i64, branch_id: i64) -> AppResult<Option<E>>
    where
        E: SoftDelete + HasBranch,
    {
        let found = self.get(id, true).await?;
        Ok(found.filter(|entity| entity.branch_id() == branch_id))
    }

    /// Point lookup used when a single entity is returned to a client.
    /// Repositories that load related data override this.
    async fn get_with_relations(&self, id: i64) -> AppResult<Option<E>> {
        self.find_by_id(id).await
    }

    /// Build a listing query from options.
    fn all(&self, options: QueryOptions<E>) -> AppResult<Query<E>>
    where
        E: SoftDelete,
    {
        options.build()
    }

    /// Build an ad hoc query with no visibility rules.
    fn find(&self, filters: Vec<FilterField>, read_only: bool) -> AppResult<Query<E>> {
        filters
            .iter()
            .try_fold(Query::new().read_only(read_only), |query, filter| {
                query.filter(filter)
            })
    }

    /// Order by the requested field, count, then fetch one page.
    ///
    /// The requested ordering replaces any ordering already on the query.
    /// Ties are not broken by a secondary key.
    async fn apply_pagination_and_ordering(
        &self,
        query: Query<E>,
        request: &PageRequest,
    ) -> AppResult<PageResponse<E>> {
        let query = query.order_by(request.sort_by(), request.direction())?;
        let total = self.count(&query).await?;
        let data = self
            .fetch(&query.page(request.offset(), request.limit()))
            .await?;
        Ok(PageResponse::new(
            data,
            request.page_number(),
            request.page_size(),
            total,
        ))
    }

    /// The row with the latest value of a timestamp field, deleted rows
    /// included. Rows where the field is NULL are skipped.
    async fn get_last(&self, field: &str) -> AppResult<Option<E>> {
        let column = E::resolve(field)?;
        if column.kind != ColumnKind::Timestamp {
            return Err(AppError::invalid_operation(format!(
                "Field '{}' is not a timestamp",
                column.field
            )));
        }
        let query = Query::new()
            .filter(&FilterField::is_not_null(column.column))?
            .order_by(column.column, SortDirection::Desc)?
            .page(0, 1);
        Ok(self.fetch(&query).await?.into_iter().next())
    }
}
