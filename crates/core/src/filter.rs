use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{EntityKind, FacilityLevel, FacilitySelection, RecordId};

pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// One screen's complete filter tuple.
///
/// Fixed shape on purpose: every component that affects server-side results
/// is an explicit field, so key construction and normalization stay
/// exhaustive. `Some(RecordId(0))` and `None` are distinct states.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListFilter {
    pub facility: FacilitySelection,
    pub status: Option<String>,
    pub customer: Option<RecordId>,
    pub article: Option<RecordId>,
    pub search: Option<String>,
    pub page_no: u32,
    pub page_size: u32,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            facility: FacilitySelection::default(),
            status: None,
            customer: None,
            article: None,
            search: None,
            page_no: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListFilter {
    /// Canonical form used for cache identity: free-text fields are trimmed
    /// and empty text collapses to absence, so `search=""` and "no search"
    /// share one cache entry.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.search = normalize_text(self.search.as_deref());
        normalized.status = normalize_text(self.status.as_deref());
        normalized
    }
}

fn normalize_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The request shape half of a query key.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum QueryShape {
    List(ListFilter),
    ById(RecordId),
    ByParent {
        level: FacilityLevel,
        parent: RecordId,
    },
}

/// Canonical identity of one cached read: entity namespace plus the
/// normalized request shape. Identical arguments always build an identical
/// key; the fixed field order of [`ListFilter`] makes the key order-stable.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct QueryKey {
    pub entity: EntityKind,
    pub shape: QueryShape,
}

impl QueryKey {
    pub fn list(entity: EntityKind, filter: &ListFilter) -> Self {
        Self {
            entity,
            shape: QueryShape::List(filter.normalized()),
        }
    }

    pub fn by_id(entity: EntityKind, id: RecordId) -> Self {
        Self {
            entity,
            shape: QueryShape::ById(id),
        }
    }

    pub fn by_parent(entity: EntityKind, level: FacilityLevel, parent: RecordId) -> Self {
        Self {
            entity,
            shape: QueryShape::ByParent { level, parent },
        }
    }

    /// The canonical GET request line for this key. The query engine sends
    /// exactly this, so key identity and request identity cannot drift.
    pub fn request_line(&self) -> String {
        match &self.shape {
            QueryShape::ById(id) => format!("{}/{id}", self.entity.collection()),
            QueryShape::ByParent { level, parent } => {
                format!(
                    "{}?{}={parent}",
                    self.entity.collection(),
                    level.query_param()
                )
            }
            QueryShape::List(filter) => {
                let mut line = self.entity.collection().to_string();
                let mut sep = '?';
                let mut push = |line: &mut String, name: &str, value: &str| {
                    let _ = write!(line, "{sep}{name}={value}");
                    sep = '&';
                };
                for level in self.entity.parent_levels() {
                    if let Some(id) = filter.facility.get(*level) {
                        push(&mut line, level.query_param(), &id.to_string());
                    }
                }
                if let Some(status) = &filter.status {
                    push(&mut line, "status", status);
                }
                if let Some(customer) = filter.customer {
                    push(&mut line, "customerId", &customer.to_string());
                }
                if let Some(article) = filter.article {
                    push(&mut line, "articleId", &article.to_string());
                }
                if let Some(search) = &filter.search {
                    push(&mut line, "search", search);
                }
                push(&mut line, "pageNo", &filter.page_no.to_string());
                push(&mut line, "pageSize", &filter.page_size.to_string());
                line
            }
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.request_line())
    }
}
