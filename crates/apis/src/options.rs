//! Query options accepted by list and read capabilities.

use serde::{Deserialize, Serialize};

use crate::{ListMeta, ResourceList};

/// Page used when a caller does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when a caller does not ask for one.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_ITEMS_PER_PAGE: u32 = 500;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Paging, search and sorting options of a list call.
///
/// Encoded in the query string as `page`, `itemsPerPage`, `keyword`, `sortBy`
/// and `sortOrder`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    /// 1-based page number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<u32>,
    /// Free-text search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Field to sort by; interpretation is up to the plugin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Sort direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl ListOptions {
    /// Options selecting one page.
    pub fn page(page: u32, items_per_page: u32) -> Self {
        Self {
            page: Some(page),
            items_per_page: Some(items_per_page),
            ..Self::default()
        }
    }

    /// Sets the search keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Effective page number. Page 0 is treated as page 1.
    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    /// Effective page size, capped at [`MAX_ITEMS_PER_PAGE`].
    pub fn effective_items_per_page(&self) -> u32 {
        match self.items_per_page {
            None | Some(0) => DEFAULT_ITEMS_PER_PAGE,
            Some(n) => n.min(MAX_ITEMS_PER_PAGE),
        }
    }

    /// Index of the first item on the effective page.
    pub fn offset(&self) -> usize {
        (self.effective_page() as usize - 1) * self.effective_items_per_page() as usize
    }
}

/// Slices an in-memory list according to `options`.
///
/// The returned list records the total number of items, so callers can
/// compute the page count. Pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, options: &ListOptions) -> ResourceList<T> {
    let total = items.len();
    let items = items
        .into_iter()
        .skip(options.offset())
        .take(options.effective_items_per_page() as usize)
        .collect();
    ResourceList {
        metadata: ListMeta {
            total_items: total as u64,
        },
        items,
    }
}

/// Options of a file-content read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOptions {
    /// Path relative to the repository root.
    pub path: String,
    /// Branch, tag or SHA; the default branch when absent.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// Options of a code-quality read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeQualityOptions {
    /// Branch to report on; the default branch when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}
