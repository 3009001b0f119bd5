//! In-memory repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use coresuit_core::clock::Clock;
use coresuit_core::error::AppError;
use coresuit_core::result::AppResult;
use coresuit_core::retry::RetryPolicy;
use coresuit_entity::query::Query;
use coresuit_entity::repository::CrudRepository;
use coresuit_entity::traits::Entity;

type Rows<E> = BTreeMap<i64, E>;

/// Rows keyed by identity, plus the identity sequence.
#[derive(Debug)]
struct Table<E> {
    rows: Rows<E>,
    next_id: i64,
}

impl<E: Entity> Table<E> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert(&mut self, mut entity: E) -> E {
        entity.set_id(self.allocate_id());
        self.rows.insert(entity.id(), entity.clone());
        entity
    }
}

/// Work of an open transaction: the rows it sees and the rows it wrote.
#[derive(Debug)]
struct Staged<E> {
    view: Rows<E>,
    changes: Rows<E>,
}

impl<E: Entity> Staged<E> {
    fn stage(&mut self, entity: E) {
        self.view.insert(entity.id(), entity.clone());
        self.changes.insert(entity.id(), entity);
    }
}

fn select<E: Entity>(rows: &Rows<E>, query: &Query<E>) -> Vec<E> {
    let mut rows: Vec<E> = rows
        .values()
        .filter(|row| query.matches(row))
        .cloned()
        .collect();
    // Stable sort keeps identity order among ties.
    rows.sort_by(|a, b| query.compare(a, b));

    let offset = query.offset().unwrap_or(0) as usize;
    let limit = query.limit().map(|l| l as usize).unwrap_or(usize::MAX);
    rows.into_iter().skip(offset).take(limit).collect()
}

/// [`CrudRepository`] backed by a process-local map.
///
/// Identities are assigned from one shared sequence starting at 1, also
/// inside transactions, so an identity is never handed out twice. A
/// transaction reads a snapshot taken at begin plus its own writes, and its
/// inserted and overwritten rows are applied to the shared table on commit.
/// Rows written by others meanwhile are kept.
///
/// Text is ordered by byte value, so sorting on text columns can differ from
/// PostgreSQL, which orders by the database collation.
pub struct MemoryRepository<E> {
    table: Arc<RwLock<Table<E>>>,
    staged: Option<Arc<Mutex<Option<Staged<E>>>>>,
    clock: Arc<dyn Clock>,
}

impl<E> Clone for MemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            staged: self.staged.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<E: Entity> MemoryRepository<E> {
    /// Create an empty repository.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::new())),
            staged: None,
            clock,
        }
    }

    /// Number of stored rows, deleted ones included.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Whether no rows are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn read<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Rows<E>) -> T + Send,
        T: Send,
    {
        match &self.staged {
            Some(staged) => {
                let guard = staged.lock().await;
                let staged = guard.as_ref().ok_or_else(transaction_finished)?;
                Ok(f(&staged.view))
            }
            None => Ok(f(&self.table.read().await.rows)),
        }
    }

    async fn insert_rows(&self, entities: Vec<E>) -> AppResult<Vec<E>> {
        match &self.staged {
            Some(staged) => {
                let mut guard = staged.lock().await;
                let staged = guard.as_mut().ok_or_else(transaction_finished)?;
                let mut table = self.table.write().await;
                Ok(entities
                    .into_iter()
                    .map(|mut entity| {
                        entity.set_id(table.allocate_id());
                        staged.stage(entity.clone());
                        entity
                    })
                    .collect())
            }
            None => {
                let mut table = self.table.write().await;
                Ok(entities.into_iter().map(|e| table.insert(e)).collect())
            }
        }
    }
}

#[async_trait]
impl<E: Entity> CrudRepository<E> for MemoryRepository<E> {
    async fn add(&self, entity: E) -> AppResult<E> {
        let created = self
            .insert_rows(vec![entity])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal(format!("Insert into {} returned no row", E::NAME)))?;
        info!(entity = E::NAME, id = created.id(), "Entity created");
        Ok(created)
    }

    async fn add_range(&self, entities: Vec<E>) -> AppResult<Vec<E>> {
        if entities.is_empty() {
            return Err(AppError::invalid_argument(
                "The entity collection cannot be empty",
            ));
        }
        let created = self.insert_rows(entities).await?;
        info!(entity = E::NAME, count = created.len(), "Entities created");
        Ok(created)
    }

    async fn update(&self, entity: E) -> AppResult<E> {
        let id = entity.id();
        let not_found = || AppError::not_found(format!("{} not found", E::NAME));
        match &self.staged {
            Some(staged) => {
                let mut guard = staged.lock().await;
                let staged = guard.as_mut().ok_or_else(transaction_finished)?;
                if !staged.view.contains_key(&id) {
                    return Err(not_found());
                }
                staged.stage(entity.clone());
            }
            None => {
                let mut table = self.table.write().await;
                let row = table.rows.get_mut(&id).ok_or_else(not_found)?;
                *row = entity.clone();
            }
        }
        info!(entity = E::NAME, id, "Entity updated");
        Ok(entity)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<E>> {
        self.read(|rows| rows.get(&id).cloned()).await
    }

    async fn fetch(&self, query: &Query<E>) -> AppResult<Vec<E>> {
        debug!(entity = E::NAME, ?query, "Fetching");
        self.read(|rows| select(rows, query)).await
    }

    async fn count(&self, query: &Query<E>) -> AppResult<u64> {
        self.read(|rows| rows.values().filter(|row| query.matches(row)).count() as u64)
            .await
    }

    async fn begin_transaction(&self) -> AppResult<Self> {
        if self.staged.is_some() {
            return Err(AppError::invalid_operation("A transaction is already open"));
        }
        let view = self.table.read().await.rows.clone();
        debug!(entity = E::NAME, "Transaction started");
        Ok(Self {
            staged: Some(Arc::new(Mutex::new(Some(Staged {
                view,
                changes: BTreeMap::new(),
            })))),
            ..self.clone()
        })
    }

    async fn commit(&self) -> AppResult<()> {
        let Some(staged) = &self.staged else {
            return Ok(());
        };
        let staged = staged.lock().await.take().ok_or_else(transaction_finished)?;
        let mut table = self.table.write().await;
        let count = staged.changes.len();
        table.rows.extend(staged.changes);
        debug!(entity = E::NAME, count, "Transaction committed");
        Ok(())
    }

    async fn rollback(&self) -> AppResult<()> {
        let Some(staged) = &self.staged else {
            return Ok(());
        };
        if staged.lock().await.take().is_some() {
            debug!(entity = E::NAME, "Transaction rolled back");
        }
        Ok(())
    }

    fn retry_strategy(&self) -> RetryPolicy {
        RetryPolicy::none()
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}

fn transaction_finished() -> AppError {
    AppError::invalid_operation("The transaction has already been committed or rolled back")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use coresuit_core::clock::FixedClock;
    use coresuit_core::error::ErrorKind;
    use coresuit_core::types::filter::FilterField;
    use coresuit_core::types::pagination::PageRequest;
    use coresuit_core::types::sorting::SortDirection;
    use coresuit_entity::column::{Column, ColumnKind, ColumnValue};
    use coresuit_entity::example::Example;
    use coresuit_entity::query::QueryOptions;
    use coresuit_entity::table::TableInfo;
    use coresuit_entity::traits::{HasActiveFlag, HasBranch, SoftDelete};

    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn repository() -> (MemoryRepository<Example>, FixedClock) {
        let clock = FixedClock::new(start());
        (MemoryRepository::new(Arc::new(clock.clone())), clock)
    }

    async fn seed(repo: &MemoryRepository<Example>, count: usize) {
        let rows = (1..=count)
            .map(|i| Example::new(format!("Example {i}"), "seeded", start()))
            .collect();
        repo.add_range(rows).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let (repo, _) = repository();
        let a = repo.add(Example::new("A", "B", start())).await.unwrap();
        let b = repo.add(Example::new("C", "D", start())).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn test_add_range_rejects_empty_batch() {
        let (repo, _) = repository();
        let err = repo.add_range(Vec::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_soft_delete_visibility() {
        let (repo, clock) = repository();
        let created = repo.add(Example::new("A", "B", start())).await.unwrap();

        clock.advance(Duration::hours(1));
        let deleted = repo.delete(created.clone()).await.unwrap();
        assert_eq!(deleted.deleted_at, Some(start() + Duration::hours(1)));

        assert!(repo.get(created.id, true).await.unwrap().is_none());
        let raw = repo.get(created.id, false).await.unwrap().unwrap();
        assert!(raw.is_deleted());
        assert!(repo.get_with_relations(created.id).await.unwrap().is_some());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let (repo, _) = repository();
        let mut ghost = Example::new("A", "B", start());
        ghost.id = 42;
        let err = repo.update(ghost).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_pagination() {
        let (repo, _) = repository();
        seed(&repo, 25).await;

        let query = repo.all(QueryOptions::new()).unwrap();
        let first = repo
            .apply_pagination_and_ordering(query.clone(), &PageRequest::new(0, 10))
            .await
            .unwrap();
        assert_eq!(first.data.len(), 10);
        assert_eq!(first.total_count, 25);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.data[0].id, 25);

        let last = repo
            .apply_pagination_and_ordering(query.clone(), &PageRequest::new(2, 10))
            .await
            .unwrap();
        assert_eq!(last.data.len(), 5);
        assert_eq!(last.current_page, 2);

        let beyond = repo
            .apply_pagination_and_ordering(query, &PageRequest::new(7, 10))
            .await
            .unwrap();
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.total_count, 25);
    }

    #[tokio::test]
    async fn test_sort_direction() {
        let (repo, _) = repository();
        seed(&repo, 3).await;

        let ids = |page: coresuit_core::types::PageResponse<Example>| {
            page.data.into_iter().map(|e| e.id).collect::<Vec<_>>()
        };

        let desc = PageRequest::with_defaults("Id", SortDirection::Desc);
        let query = repo.all(QueryOptions::new()).unwrap();
        let page = repo.apply_pagination_and_ordering(query, &desc).await.unwrap();
        assert_eq!(ids(page), vec![3, 2, 1]);

        let mut asc = PageRequest::default();
        asc.set_direction(Some("asc"));
        let query = repo.all(QueryOptions::new()).unwrap();
        let page = repo.apply_pagination_and_ordering(query, &asc).await.unwrap();
        assert_eq!(ids(page), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unknown_sort_field() {
        let (repo, _) = repository();
        let mut request = PageRequest::default();
        request.set_sort_by(Some("Salary".to_string()));
        let query = repo.all(QueryOptions::new()).unwrap();
        let err = repo
            .apply_pagination_and_ordering(query, &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_all_excludes_deleted_unless_asked() {
        let (repo, _) = repository();
        seed(&repo, 3).await;
        let second = repo.find_by_id(2).await.unwrap().unwrap();
        repo.delete(second).await.unwrap();

        let visible = repo.all(QueryOptions::new()).unwrap();
        assert_eq!(repo.count(&visible).await.unwrap(), 2);

        let everything = repo
            .all(QueryOptions::new().include_deleted(true))
            .unwrap();
        assert_eq!(repo.count(&everything).await.unwrap(), 3);

        // find() applies no visibility rules.
        let by_name = repo
            .find(vec![FilterField::contains("name", "example 2")], true)
            .unwrap();
        assert_eq!(repo.fetch(&by_name).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_last() {
        let (repo, clock) = repository();
        repo.add(Example::new("old", "x", clock.now())).await.unwrap();
        clock.advance(Duration::days(1));
        repo.add(Example::new("new", "x", clock.now())).await.unwrap();
        clock.advance(Duration::days(1));
        repo.add(Example::new("middle", "x", start() + Duration::hours(1)))
            .await
            .unwrap();

        let last = repo.get_last("CreatedAt").await.unwrap().unwrap();
        assert_eq!(last.name, "new");

        let err = repo.get_last("Name").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_transaction_commit_and_rollback() {
        let (repo, _) = repository();
        seed(&repo, 1).await;

        let tx = repo.begin_transaction().await.unwrap();
        tx.add(Example::new("staged", "x", start())).await.unwrap();
        assert_eq!(repo.len().await, 1);
        tx.rollback().await.unwrap();
        assert_eq!(repo.len().await, 1);
        assert_eq!(
            tx.add(Example::new("late", "x", start())).await.unwrap_err().kind,
            ErrorKind::InvalidOperation
        );

        let tx = repo.begin_transaction().await.unwrap();
        tx.add(Example::new("kept", "x", start())).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(repo.len().await, 2);

        // Outside a transaction there is nothing to commit or discard.
        repo.commit().await.unwrap();
        repo.rollback().await.unwrap();
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_commit_keeps_rows_written_outside_the_transaction() {
        let (repo, _) = repository();
        seed(&repo, 1).await;

        let tx = repo.begin_transaction().await.unwrap();
        let inside = tx.add(Example::new("inside", "x", start())).await.unwrap();
        let outside = repo.add(Example::new("outside", "x", start())).await.unwrap();
        assert_ne!(inside.id, outside.id);

        let mut seeded = tx.find_by_id(1).await.unwrap().unwrap();
        seeded.name = "renamed".to_string();
        tx.update(seeded).await.unwrap();
        assert!(tx.find_by_id(outside.id).await.unwrap().is_none());
        tx.commit().await.unwrap();

        assert_eq!(repo.len().await, 3);
        let name = |row: Option<Example>| row.map(|e| e.name);
        assert_eq!(name(repo.find_by_id(outside.id).await.unwrap()).as_deref(), Some("outside"));
        assert_eq!(name(repo.find_by_id(inside.id).await.unwrap()).as_deref(), Some("inside"));
        assert_eq!(name(repo.find_by_id(1).await.unwrap()).as_deref(), Some("renamed"));

        let next = repo.add(Example::new("next", "x", start())).await.unwrap();
        assert_eq!(next.id, 4);
    }

    #[tokio::test]
    async fn test_rolled_back_ids_are_not_reused() {
        let (repo, _) = repository();
        let tx = repo.begin_transaction().await.unwrap();
        let discarded = tx.add(Example::new("discarded", "x", start())).await.unwrap();
        tx.rollback().await.unwrap();
        tx.rollback().await.unwrap();

        let kept = repo.add(Example::new("kept", "x", start())).await.unwrap();
        assert!(kept.id > discarded.id);
        assert!(repo.find_by_id(discarded.id).await.unwrap().is_none());
    }

    #[derive(Debug, Clone)]
    struct Account {
        id: i64,
        branch_id: i64,
        active: bool,
        deleted_at: Option<NaiveDateTime>,
    }

    static ACCOUNT_COLUMNS: [Column; 4] = [
        Column::new("Id", "id", ColumnKind::Integer),
        Column::new("BranchId", "branch_id", ColumnKind::Integer),
        Column::new("Active", "active", ColumnKind::Boolean),
        Column::new("DeletedAt", "deleted_at", ColumnKind::Timestamp),
    ];

    impl Entity for Account {
        const NAME: &'static str = "Account";
        const TABLE: TableInfo = TableInfo::new("account", "sc_001", "Accounts.");

        fn id(&self) -> i64 {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = id;
        }

        fn columns() -> &'static [Column] {
            &ACCOUNT_COLUMNS
        }

        fn value(&self, column: &str) -> Option<ColumnValue> {
            match column {
                "id" => Some(ColumnValue::Int(Some(self.id))),
                "branch_id" => Some(ColumnValue::Int(Some(self.branch_id))),
                "active" => Some(ColumnValue::Bool(Some(self.active))),
                "deleted_at" => Some(ColumnValue::Timestamp(self.deleted_at)),
                _ => None,
            }
        }
    }

    impl SoftDelete for Account {
        fn deleted_at(&self) -> Option<NaiveDateTime> {
            self.deleted_at
        }

        fn set_deleted_at(&mut self, at: Option<NaiveDateTime>) {
            self.deleted_at = at;
        }
    }

    impl HasActiveFlag for Account {
        fn is_active(&self) -> bool {
            self.active
        }
    }

    impl HasBranch for Account {
        fn branch_id(&self) -> i64 {
            self.branch_id
        }
    }

    fn account(branch_id: i64, active: bool) -> Account {
        Account {
            id: 0,
            branch_id,
            active,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_with_branch() {
        let repo = MemoryRepository::<Account>::new(Arc::new(FixedClock::new(start())));
        let created = repo.add(account(7, true)).await.unwrap();

        assert!(repo.get_with_branch(created.id, 7).await.unwrap().is_some());
        assert!(repo.get_with_branch(created.id, 8).await.unwrap().is_none());

        repo.delete(created.clone()).await.unwrap();
        assert!(repo.get_with_branch(created.id, 7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_only_actives() {
        let repo = MemoryRepository::<Account>::new(Arc::new(FixedClock::new(start())));
        repo.add_range(vec![account(1, true), account(1, false), account(2, true)])
            .await
            .unwrap();

        let active = repo
            .all(QueryOptions::<Account>::new().only_actives())
            .unwrap();
        let rows = repo.fetch(&active).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|a| a.is_active()));
    }
}
