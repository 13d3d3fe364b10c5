//! List querying: search, filter, sort and paginate
//!
//! Products and customers arrive as full lists and are paged here. Orders and
//! staff are paged by the backend; [`OrderQuery`] and [`StaffQuery`] build the
//! query strings for those. Both paths produce a [`Page`].

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};
use validator::Validate;

use crate::types::{Customer, OrderStatus, PageInfo, Product};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// The other direction
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(crate::Error::validation(
                "direction",
                format!("Unknown sort direction '{other}' (expected asc or desc)"),
            )),
        }
    }
}

/// A record that can be searched and sorted client-side
pub trait Listable {
    /// Fields the record can be sorted by
    type SortKey: Copy + fmt::Debug;

    /// Case-insensitive substring match; `needle` is already lowercased and non-empty
    fn matches(&self, needle: &str) -> bool;

    /// Ascending comparison on `key`
    fn compare(&self, other: &Self, key: Self::SortKey) -> Ordering;

    /// Category used by the exact-match filter, if the record has one
    fn category(&self) -> Option<&str> {
        None
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Records on this page
    pub items: Vec<T>,
    /// 1-based page number actually shown
    pub page: usize,
    /// Number of pages, at least 1
    pub total_pages: usize,
    /// Records across all pages, when known
    pub total_items: Option<usize>,
}

impl<T> Page<T> {
    /// Page built from a backend response
    #[must_use]
    pub fn from_server(items: Vec<T>, info: &PageInfo) -> Self {
        Self {
            items,
            page: info.current_page.max(1) as usize,
            total_pages: info.total_pages.max(1) as usize,
            total_items: info
                .total_records
                .and_then(|n| usize::try_from(n).ok()),
        }
    }

    /// Whether a later page exists
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 1,
            total_items: Some(0),
        }
    }
}

/// Client-side list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<K> {
    /// Free-text search; blank matches everything
    pub search: String,
    /// Exact category filter
    pub category: Option<String>,
    /// Sort key and direction; `None` keeps backend order
    pub sort: Option<(K, SortDirection)>,
    /// 1-based page requested
    pub page: usize,
    /// Rows per page
    pub page_size: usize,
}

impl<K> ListQuery<K> {
    /// First page, no filters
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            category: None,
            sort: None,
            page: 1,
            page_size,
        }
    }

    /// Set the search text and go back to page 1
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Set the category filter and go back to page 1
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category.filter(|c| !c.trim().is_empty());
        self.page = 1;
    }

    /// Sort by `key`; choosing the current key again flips the direction
    pub fn toggle_sort(&mut self, key: K)
    where
        K: PartialEq + Copy,
    {
        self.sort = match self.sort {
            Some((current, direction)) if current == key => Some((key, direction.flipped())),
            _ => Some((key, SortDirection::Asc)),
        };
    }
}

/// Number of pages for `total` records, at least 1
#[must_use]
pub const fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 || total == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

/// Apply search, filter and sort; returns every matching record
#[must_use]
pub fn filter_sorted<'a, T: Listable>(items: &'a [T], query: &ListQuery<T::SortKey>) -> Vec<&'a T> {
    let needle = query.search.trim().to_lowercase();
    let mut rows: Vec<&T> = items
        .iter()
        .filter(|item| needle.is_empty() || item.matches(&needle))
        .filter(|item| {
            query
                .category
                .as_deref()
                .is_none_or(|wanted| item.category() == Some(wanted))
        })
        .collect();

    if let Some((key, direction)) = query.sort {
        rows.sort_by(|a, b| direction.apply(a.compare(b, key)));
    }
    rows
}

/// Run a query over an in-memory list; an out-of-range page is clamped
#[must_use]
pub fn query<T: Listable + Clone>(items: &[T], query: &ListQuery<T::SortKey>) -> Page<T> {
    let rows = filter_sorted(items, query);
    let page_size = query.page_size.max(1);
    let total_pages = total_pages(rows.len(), page_size);
    let page = query.page.clamp(1, total_pages);

    Page {
        items: rows
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(|row| (*row).clone())
            .collect(),
        page,
        total_pages,
        total_items: Some(rows.len()),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn cmp_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Product sort fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSortKey {
    /// Name, case-insensitive
    Name,
    /// Category, case-insensitive
    Category,
    /// Brand, case-insensitive
    Brand,
    /// Price, numeric
    Price,
    /// Stock, numeric
    Stock,
}

impl FromStr for ProductSortKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "category" => Ok(Self::Category),
            "brand" => Ok(Self::Brand),
            "price" => Ok(Self::Price),
            "stock" => Ok(Self::Stock),
            other => Err(crate::Error::validation(
                "sort",
                format!("Cannot sort products by '{other}'"),
            )),
        }
    }
}

impl Listable for Product {
    type SortKey = ProductSortKey;

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || contains_ci(&self.category, needle)
            || contains_ci(&self.brand, needle)
    }

    fn compare(&self, other: &Self, key: ProductSortKey) -> Ordering {
        match key {
            ProductSortKey::Name => cmp_ci(&self.name, &other.name),
            ProductSortKey::Category => cmp_ci(&self.category, &other.category),
            ProductSortKey::Brand => cmp_ci(&self.brand, &other.brand),
            ProductSortKey::Price => self.price.total_cmp(&other.price),
            ProductSortKey::Stock => self.stock.cmp(&other.stock),
        }
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}

/// Customer sort fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerSortKey {
    /// Name, case-insensitive
    Name,
    /// Email, case-insensitive
    Email,
}

impl FromStr for CustomerSortKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            other => Err(crate::Error::validation(
                "sort",
                format!("Cannot sort customers by '{other}'"),
            )),
        }
    }
}

impl Listable for Customer {
    type SortKey = CustomerSortKey;

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle) || contains_ci(&self.email, needle)
    }

    fn compare(&self, other: &Self, key: CustomerSortKey) -> Ordering {
        match key {
            CustomerSortKey::Name => cmp_ci(&self.name, &other.name),
            CustomerSortKey::Email => cmp_ci(&self.email, &other.email),
        }
    }
}

/// Order status filter; `All` sends no status parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every status
    #[default]
    All,
    /// One status
    Only(OrderStatus),
}

impl FromStr for StatusFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Server-side order list query
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct OrderQuery {
    /// 1-based page
    #[validate(range(min = 1))]
    pub page: u32,
    /// Rows per page
    #[validate(range(min = 1, max = 1000))]
    pub limit: u32,
    /// Matches order id, customer name or email on the backend
    pub search: String,
    /// Status filter
    pub status: StatusFilter,
}

impl OrderQuery {
    /// First page with the given limit
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: String::new(),
            status: StatusFilter::All,
        }
    }

    /// Query-string pairs; blank search and the `All` filter are omitted
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if !self.search.trim().is_empty() {
            pairs.push(("search", self.search.trim().to_string()));
        }
        if let StatusFilter::Only(status) = &self.status {
            pairs.push(("status", status.to_string()));
        }
        pairs
    }
}

/// Server-side staff list query
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct StaffQuery {
    /// 1-based page
    #[validate(range(min = 1))]
    pub page: u32,
    /// Rows per page
    #[validate(range(min = 1, max = 1000))]
    pub limit: u32,
    /// Free-text search
    pub search: String,
}

impl StaffQuery {
    /// First page with the given limit
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: String::new(),
        }
    }

    /// Query-string pairs; blank search is omitted
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if !self.search.trim().is_empty() {
            pairs.push(("search", self.search.trim().to_string()));
        }
        pairs
    }
}

/// Map validator failures onto the core error type
///
/// # Errors
///
/// Returns [`crate::Error::Validation`] naming the first failing field.
pub fn check_query(query: &impl Validate) -> crate::Result<()> {
    query.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map_or_else(|| "query".to_string(), ToString::to_string);
        crate::Error::validation(field, format!("Invalid query parameters: {errors}"))
    })
}
