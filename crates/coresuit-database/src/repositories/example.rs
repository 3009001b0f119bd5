//! Example repository.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::debug;

use coresuit_core::result::AppResult;
use coresuit_core::retry::RetryPolicy;
use coresuit_core::types::pagination::{PageRequest, PageResponse};
use coresuit_entity::example::{Example, ExampleSearch};
use coresuit_entity::query::{Query, QueryOptions};
use coresuit_entity::repository::CrudRepository;

/// [`Example`] data access on top of any store.
///
/// Every generic operation is forwarded to the wrapped repository.
#[derive(Clone)]
pub struct ExampleRepository<R> {
    inner: R,
}

impl<R: CrudRepository<Example>> ExampleRepository<R> {
    /// Wrap a generic repository.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Page through non-deleted examples whose name and description contain
    /// the given fragments, ignoring case.
    pub async fn search(
        &self,
        search: &ExampleSearch,
        request: &PageRequest,
    ) -> AppResult<PageResponse<Example>> {
        debug!(?search, "Searching examples");
        let options = search
            .filters()
            .into_iter()
            .fold(QueryOptions::new(), QueryOptions::and_where);
        let query = self.all(options)?;
        self.apply_pagination_and_ordering(query, request).await
    }
}

#[async_trait]
impl<R: CrudRepository<Example>> CrudRepository<Example> for ExampleRepository<R> {
    async fn add(&self, entity: Example) -> AppResult<Example> {
        self.inner.add(entity).await
    }

    async fn add_range(&self, entities: Vec<Example>) -> AppResult<Vec<Example>> {
        self.inner.add_range(entities).await
    }

    async fn update(&self, entity: Example) -> AppResult<Example> {
        self.inner.update(entity).await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Example>> {
        self.inner.find_by_id(id).await
    }

    async fn fetch(&self, query: &Query<Example>) -> AppResult<Vec<Example>> {
        self.inner.fetch(query).await
    }

    async fn count(&self, query: &Query<Example>) -> AppResult<u64> {
        self.inner.count(query).await
    }

    async fn begin_transaction(&self) -> AppResult<Self> {
        Ok(Self::new(self.inner.begin_transaction().await?))
    }

    async fn commit(&self) -> AppResult<()> {
        self.inner.commit().await
    }

    async fn rollback(&self) -> AppResult<()> {
        self.inner.rollback().await
    }

    fn retry_strategy(&self) -> RetryPolicy {
        self.inner.retry_strategy()
    }

    fn now(&self) -> NaiveDateTime {
        self.inner.now()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use coresuit_core::clock::FixedClock;

    use crate::repositories::memory::MemoryRepository;

    use super::*;

    async fn seeded() -> ExampleRepository<MemoryRepository<Example>> {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let repo = ExampleRepository::new(MemoryRepository::new(Arc::new(FixedClock::new(now))));
        repo.add_range(vec![
            Example::new("North Pump", "Primary intake", now),
            Example::new("South pump", "Backup intake", now),
            Example::new("Valve", "Primary outlet", now),
        ])
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_search_by_name_ignores_case() {
        let repo = seeded().await;
        let search = ExampleSearch {
            name: Some("PUMP".into()),
            description: None,
        };
        let page = repo.search(&search, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_count, 2);
        let ids: Vec<i64> = page.data.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_search_combines_terms() {
        let repo = seeded().await;
        let search = ExampleSearch {
            name: Some("pump".into()),
            description: Some("primary".into()),
        };
        let page = repo.search(&search, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].name, "North Pump");
    }

    #[tokio::test]
    async fn test_search_skips_deleted_rows() {
        let repo = seeded().await;
        let valve = repo.get(3, true).await.unwrap().unwrap();
        repo.delete(valve).await.unwrap();

        let mut request = PageRequest::default();
        request.set_sort_by(Some("Name".into()));
        request.set_direction(Some("asc"));
        let page = repo
            .search(&ExampleSearch::default(), &request)
            .await
            .unwrap();
        let names: Vec<&str> = page.data.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["North Pump", "South pump"]);
    }
}
