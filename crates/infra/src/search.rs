//! Search over active warehouses: filter, sort, paginate.
//!
//! Filters are conjunctive and each applies only when present. Archived
//! warehouses are always excluded. Sorting is total: ties on the sort key are
//! broken by business unit code ascending, whatever the sort order, so repeated
//! searches over unchanged data return identical pages.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use fulfilment_warehouses::{VersionedWarehouse, Warehouse};

use crate::store::{StoreError, WarehouseStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchParseError {
    #[error("unknown sort field '{0}' (expected capacity or createdAt)")]
    SortBy(String),

    #[error("unknown sort order '{0}' (expected asc or desc)")]
    SortOrder(String),

    #[error("page size {requested} exceeds the maximum of {max}")]
    PageSize { requested: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Query(#[from] SearchParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SearchError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Query(_) => 400,
            Self::Store(_) => 500,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Capacity,
    #[default]
    CreatedAt,
}

impl FromStr for SortBy {
    type Err = SearchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "capacity" => Ok(Self::Capacity),
            "createdat" => Ok(Self::CreatedAt),
            _ => Err(SearchParseError::SortBy(s.to_string())),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = SearchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(SearchParseError::SortOrder(s.to_string())),
        }
    }
}

/// Page size default and the largest size a query may ask for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PageLimits {
    /// Missing or zero → default. Any other size is used as given, or
    /// rejected when above `max_page_size`; it is never rewritten.
    pub fn effective(&self, requested: Option<usize>) -> Result<usize, SearchParseError> {
        match requested {
            None | Some(0) => Ok(self.default_page_size.max(1)),
            Some(n) if n > self.max_page_size => Err(SearchParseError::PageSize {
                requested: n,
                max: self.max_page_size,
            }),
            Some(n) => Ok(n),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuery {
    pub location: Option<String>,
    pub min_capacity: Option<i64>,
    pub max_capacity: Option<i64>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub page: usize,
    pub page_size: Option<usize>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn min_capacity(mut self, min: i64) -> Self {
        self.min_capacity = Some(min);
        self
    }

    pub fn max_capacity(mut self, max: i64) -> Self {
        self.max_capacity = Some(max);
        self
    }

    pub fn sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = Some(page_size);
        self
    }

    fn matches(&self, warehouse: &Warehouse) -> bool {
        warehouse.is_active()
            && self.location.as_ref().is_none_or(|l| &warehouse.location == l)
            && self.min_capacity.is_none_or(|min| warehouse.capacity >= min)
            && self.max_capacity.is_none_or(|max| warehouse.capacity <= max)
    }

    fn compare(&self, a: &Warehouse, b: &Warehouse) -> Ordering {
        let primary = match self.sort_by {
            SortBy::Capacity => a.capacity.cmp(&b.capacity),
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = match self.sort_order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.business_unit_code.cmp(&b.business_unit_code))
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub items: Vec<VersionedWarehouse>,
    /// Matches across all pages.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

/// Filter, sort and slice `records`. Pure.
///
/// Page `p` of size `s` holds the matches at offsets `p*s .. p*s + s`.
pub fn apply_query(
    records: impl IntoIterator<Item = VersionedWarehouse>,
    query: &SearchQuery,
    limits: &PageLimits,
) -> Result<SearchPage, SearchParseError> {
    let page_size = limits.effective(query.page_size)?;
    let mut matched: Vec<VersionedWarehouse> = records
        .into_iter()
        .filter(|r| query.matches(&r.warehouse))
        .collect();
    matched.sort_by(|a, b| query.compare(&a.warehouse, &b.warehouse));

    let total = matched.len();
    let offset = query.page.saturating_mul(page_size);

    let items: Vec<_> = matched.into_iter().skip(offset).take(page_size).collect();
    let has_more = offset.saturating_add(items.len()) < total;

    Ok(SearchPage {
        items,
        total,
        page: query.page,
        page_size,
        has_more,
    })
}

/// Search engine reading committed active warehouses from a store.
#[derive(Debug, Clone)]
pub struct WarehouseSearch<S> {
    store: S,
    limits: PageLimits,
}

impl<S> WarehouseSearch<S>
where
    S: WarehouseStore,
{
    pub fn new(store: S, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> &PageLimits {
        &self.limits
    }

    pub fn search(&self, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        let page = apply_query(self.store.get_all()?, query, &self.limits)?;
        debug!(
            total = page.total,
            returned = page.items.len(),
            page = page.page,
            page_size = page.page_size,
            "warehouse search"
        );
        Ok(page)
    }
}
