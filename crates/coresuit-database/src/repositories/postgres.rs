//! Generic PostgreSQL repository.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, info};

use coresuit_core::clock::Clock;
use coresuit_core::error::AppError;
use coresuit_core::result::AppResult;
use coresuit_core::retry::RetryPolicy;
use coresuit_entity::query::Query;
use coresuit_entity::repository::CrudRepository;
use coresuit_entity::traits::Entity;

use crate::error::map_sqlx_error;
use crate::sql::{self, SqlBuilder};

type SharedTransaction = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// [`CrudRepository`] over a PostgreSQL table.
///
/// Outside a transaction every statement runs on the pool and transient
/// failures are retried with the configured [`RetryPolicy`]. A handle from
/// [`begin_transaction`](CrudRepository::begin_transaction) runs its
/// statements on one connection, without retries.
pub struct PgRepository<E> {
    pool: PgPool,
    transaction: Option<SharedTransaction>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            transaction: self.transaction.clone(),
            clock: self.clock.clone(),
            retry: self.retry,
            _entity: PhantomData,
        }
    }
}

impl<E> PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    /// Create a repository on the pool.
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>, retry: RetryPolicy) -> Self {
        Self {
            pool,
            transaction: None,
            clock,
            retry,
            _entity: PhantomData,
        }
    }

    /// Whether this handle is scoped to a transaction.
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    async fn fetch_rows<F>(&self, context: &str, build: F) -> AppResult<Vec<E>>
    where
        F: Fn() -> SqlBuilder + Send + Sync,
    {
        match &self.transaction {
            Some(transaction) => {
                let mut guard = transaction.lock().await;
                let tx = guard.as_mut().ok_or_else(transaction_finished)?;
                let mut builder = build();
                builder
                    .build_query_as::<E>()
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(|e| map_sqlx_error(context, e))
            }
            None => {
                let (build, pool) = (&build, &self.pool);
                self.retry
                    .run(context, move || async move {
                        let mut builder = build();
                        builder
                            .build_query_as::<E>()
                            .fetch_all(pool)
                            .await
                            .map_err(|e| map_sqlx_error(context, e))
                    })
                    .await
            }
        }
    }

    async fn fetch_row<F>(&self, context: &str, build: F) -> AppResult<Option<E>>
    where
        F: Fn() -> SqlBuilder + Send + Sync,
    {
        match &self.transaction {
            Some(transaction) => {
                let mut guard = transaction.lock().await;
                let tx = guard.as_mut().ok_or_else(transaction_finished)?;
                let mut builder = build();
                builder
                    .build_query_as::<E>()
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(|e| map_sqlx_error(context, e))
            }
            None => {
                let (build, pool) = (&build, &self.pool);
                self.retry
                    .run(context, move || async move {
                        let mut builder = build();
                        builder
                            .build_query_as::<E>()
                            .fetch_optional(pool)
                            .await
                            .map_err(|e| map_sqlx_error(context, e))
                    })
                    .await
            }
        }
    }

    async fn fetch_count<F>(&self, context: &str, build: F) -> AppResult<i64>
    where
        F: Fn() -> SqlBuilder + Send + Sync,
    {
        match &self.transaction {
            Some(transaction) => {
                let mut guard = transaction.lock().await;
                let tx = guard.as_mut().ok_or_else(transaction_finished)?;
                let mut builder = build();
                builder
                    .build_query_scalar::<i64>()
                    .fetch_one(&mut **tx)
                    .await
                    .map_err(|e| map_sqlx_error(context, e))
            }
            None => {
                let (build, pool) = (&build, &self.pool);
                self.retry
                    .run(context, move || async move {
                        let mut builder = build();
                        builder
                            .build_query_scalar::<i64>()
                            .fetch_one(pool)
                            .await
                            .map_err(|e| map_sqlx_error(context, e))
                    })
                    .await
            }
        }
    }
}

#[async_trait]
impl<E> CrudRepository<E> for PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    async fn add(&self, entity: E) -> AppResult<E> {
        let context = format!("Failed to insert {}", E::NAME);
        let rows = std::slice::from_ref(&entity);
        let created = self
            .fetch_row(&context, || sql::insert(rows))
            .await?
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
        let context = format!("Failed to insert {} batch", E::NAME);
        let created = self
            .fetch_rows(&context, || sql::insert(&entities))
            .await?;

        info!(entity = E::NAME, count = created.len(), "Entities created");
        Ok(created)
    }

    async fn update(&self, entity: E) -> AppResult<E> {
        let context = format!("Failed to update {}", E::NAME);
        let id = entity.id();
        let updated = self
            .fetch_row(&context, || sql::update(&entity))
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} not found", E::NAME)))?;

        info!(entity = E::NAME, id, "Entity updated");
        Ok(updated)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<E>> {
        let context = format!("Failed to find {} by id", E::NAME);
        self.fetch_row(&context, || sql::select_by_id::<E>(id)).await
    }

    async fn fetch(&self, query: &Query<E>) -> AppResult<Vec<E>> {
        debug!(entity = E::NAME, ?query, "Fetching");
        let context = format!("Failed to list {}", E::NAME);
        self.fetch_rows(&context, || sql::select(query)).await
    }

    async fn count(&self, query: &Query<E>) -> AppResult<u64> {
        let context = format!("Failed to count {}", E::NAME);
        let total = self.fetch_count(&context, || sql::count(query)).await?;
        Ok(total.max(0) as u64)
    }

    async fn begin_transaction(&self) -> AppResult<Self> {
        if self.in_transaction() {
            return Err(AppError::invalid_operation("A transaction is already open"));
        }
        let pool = &self.pool;
        let transaction = self
            .retry
            .run("begin transaction", move || async move {
                pool.begin()
                    .await
                    .map_err(|e| map_sqlx_error("Failed to begin transaction", e))
            })
            .await?;

        debug!(entity = E::NAME, "Transaction started");
        Ok(Self {
            transaction: Some(Arc::new(Mutex::new(Some(transaction)))),
            ..self.clone()
        })
    }

    async fn commit(&self) -> AppResult<()> {
        let Some(transaction) = &self.transaction else {
            return Ok(());
        };
        let tx = transaction
            .lock()
            .await
            .take()
            .ok_or_else(transaction_finished)?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction", e))?;

        debug!(entity = E::NAME, "Transaction committed");
        Ok(())
    }

    async fn rollback(&self) -> AppResult<()> {
        let Some(transaction) = &self.transaction else {
            return Ok(());
        };
        let Some(tx) = transaction.lock().await.take() else {
            return Ok(());
        };
        tx.rollback()
            .await
            .map_err(|e| map_sqlx_error("Failed to roll back transaction", e))?;

        debug!(entity = E::NAME, "Transaction rolled back");
        Ok(())
    }

    fn retry_strategy(&self) -> RetryPolicy {
        self.retry
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}

fn transaction_finished() -> AppError {
    AppError::invalid_operation("The transaction has already been committed or rolled back")
}
