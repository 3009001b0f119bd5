//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

use super::sorting::SortDirection;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Maximum page size. Larger requests are silently reduced.
pub const MAX_PAGE_SIZE: u32 = 50;
/// Default sort field.
pub const DEFAULT_SORT_BY: &str = "Id";

/// Client-controlled pagination and ordering parameters.
///
/// Page numbers are 0-based. Out-of-range values are clamped rather than
/// rejected: a negative page number becomes 0 and a page size above
/// [`MAX_PAGE_SIZE`] becomes [`MAX_PAGE_SIZE`]. Assigning an absent sort
/// field or direction keeps the previous value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PageRequestParams", rename_all = "PascalCase")]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
    sort_by: String,
    direction: SortDirection,
}

impl PageRequest {
    /// Create a page request with the default ordering (`Id`, descending).
    pub fn new(page_number: i64, page_size: i64) -> Self {
        let mut request = Self::default();
        request.set_page_number(page_number);
        request.set_page_size(page_size);
        request
    }

    /// Create a page request with a different default ordering.
    pub fn with_defaults(sort_by: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            sort_by: sort_by.into(),
            direction,
            ..Self::default()
        }
    }

    /// The 0-based page number.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Number of items per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Field name (or whitelisted dot-path) to order by.
    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    /// Sort direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Set the page number; negative values clamp to 0.
    pub fn set_page_number(&mut self, page_number: i64) {
        self.page_number = page_number.clamp(0, i64::from(u32::MAX)) as u32;
    }

    /// Set the page size; values above the maximum clamp to the maximum,
    /// values below 1 clamp to 1.
    pub fn set_page_size(&mut self, page_size: i64) {
        self.page_size = page_size.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32;
    }

    /// Set the sort field; `None` keeps the current one.
    pub fn set_sort_by(&mut self, sort_by: Option<String>) {
        if let Some(sort_by) = sort_by {
            self.sort_by = sort_by;
        }
    }

    /// Set the direction from its textual form; `None` keeps the current one.
    pub fn set_direction(&mut self, direction: Option<&str>) {
        if let Some(direction) = direction {
            self.direction = SortDirection::parse_lenient(direction);
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number) * u64::from(self.page_size)
    }

    /// Number of rows to take.
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: DEFAULT_SORT_BY.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Raw query-string shape of a [`PageRequest`], before clamping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageRequestParams {
    /// Requested page number.
    #[serde(alias = "page_number", alias = "pageNumber")]
    pub page_number: Option<i64>,
    /// Requested page size.
    #[serde(alias = "page_size", alias = "pageSize")]
    pub page_size: Option<i64>,
    /// Requested sort field.
    #[serde(alias = "sort_by", alias = "sortBy")]
    pub sort_by: Option<String>,
    /// Requested direction.
    #[serde(alias = "direction")]
    pub direction: Option<String>,
}

impl From<PageRequestParams> for PageRequest {
    fn from(params: PageRequestParams) -> Self {
        let mut request = PageRequest::default();
        if let Some(page_number) = params.page_number {
            request.set_page_number(page_number);
        }
        if let Some(page_size) = params.page_size {
            request.set_page_size(page_size);
        }
        request.set_sort_by(params.sort_by);
        request.set_direction(params.direction.as_deref());
        request
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    /// The items on this page, in order.
    pub data: Vec<T>,
    /// Current page number (0-based).
    pub current_page: u32,
    /// Total number of pages: `ceil(total_count / page_size)`.
    pub total_pages: u64,
    /// Number of items per page.
    pub page_size: u32,
    /// Total number of items across all pages.
    pub total_count: u64,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, current_page: u32, page_size: u32, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(page_size.max(1)));
        Self {
            data,
            current_page,
            total_pages,
            page_size,
            total_count,
        }
    }

    /// Convert every item, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page_number(), 0);
        assert_eq!(request.page_size(), 10);
        assert_eq!(request.sort_by(), "Id");
        assert_eq!(request.direction(), SortDirection::Desc);
    }

    #[test]
    fn test_clamping() {
        let request = PageRequest::new(-5, 1000);
        assert_eq!(request.page_number(), 0);
        assert_eq!(request.page_size(), 50);
        assert_eq!(PageRequest::new(0, 0).page_size(), 1);
    }

    #[test]
    fn test_absent_sort_keeps_previous() {
        let mut request = PageRequest::with_defaults("Name", SortDirection::Asc);
        request.set_sort_by(None);
        request.set_direction(None);
        assert_eq!(request.sort_by(), "Name");
        assert_eq!(request.direction(), SortDirection::Asc);

        request.set_direction(Some("desc"));
        assert_eq!(request.direction(), SortDirection::Desc);
    }

    #[test]
    fn test_deserialize_from_params() {
        let request: PageRequest = serde_json::from_value(serde_json::json!({
            "PageNumber": -1,
            "PageSize": 75,
            "SortBy": "Name",
            "Direction": "asc"
        }))
        .expect("deserialize");
        assert_eq!(request.page_number(), 0);
        assert_eq!(request.page_size(), 50);
        assert_eq!(request.sort_by(), "Name");
        assert_eq!(request.direction(), SortDirection::Asc);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        let page = PageResponse::new(vec![1, 2, 3, 4, 5], 2, 10, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(PageResponse::<i32>::new(vec![], 0, 10, 0).total_pages, 0);
        assert_eq!(PageResponse::<i32>::new(vec![], 0, 10, 30).total_pages, 3);
    }

    #[test]
    fn test_response_uses_camel_case() {
        let page = PageResponse::new(vec!["a"], 0, 10, 1);
        let json = serde_json::to_value(&page).expect("serialize");
        assert_eq!(json["currentPage"], 0);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["data"][0], "a");
    }
}
