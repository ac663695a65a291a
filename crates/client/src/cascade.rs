use fabrica_core::{
    clamp_page, EntityKind, FacilityLevel, FacilityPath, FacilityResult, FacilitySelection,
    ListFilter, RecordId,
};
use log::debug;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::query::ResourceClient;
use crate::ClientResult;

/// Owns the live filter tuple of one screen.
///
/// Every transition is one `send_modify`, so no observer (render or query)
/// ever sees a descendant selection under a stale ancestor. The cascade
/// ordering is the fixed facility tree; every entity form shares this one
/// reset algorithm.
#[derive(Debug)]
pub struct FilterForm {
    entity: EntityKind,
    tx: watch::Sender<ListFilter>,
}

impl FilterForm {
    pub fn new(entity: EntityKind) -> Self {
        Self::with_filter(entity, ListFilter::default())
    }

    pub fn with_filter(entity: EntityKind, filter: ListFilter) -> Self {
        let (tx, _rx) = watch::channel(filter);
        Self { entity, tx }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn snapshot(&self) -> ListFilter {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListFilter> {
        self.tx.subscribe()
    }

    /// Select (or clear) one facility level. Every level strictly below it
    /// is cleared in the same state transition, and paging restarts.
    pub fn set_level(&self, level: FacilityLevel, value: Option<RecordId>) -> ListFilter {
        self.tx.send_modify(|filter| {
            filter.facility.assign(level, value);
            filter.page_no = 0;
        });
        debug!(
            "cascade: {} {}={}",
            self.entity,
            level,
            value.map_or_else(|| "-".to_string(), |id| id.to_string())
        );
        self.snapshot()
    }

    pub fn set_search(&self, search: Option<String>) -> ListFilter {
        self.tx.send_modify(|filter| {
            filter.search = search;
            filter.page_no = 0;
        });
        self.snapshot()
    }

    pub fn set_status(&self, status: Option<String>) -> ListFilter {
        self.tx.send_modify(|filter| {
            filter.status = status;
            filter.page_no = 0;
        });
        self.snapshot()
    }

    pub fn set_customer(&self, customer: Option<RecordId>) -> ListFilter {
        self.tx.send_modify(|filter| {
            filter.customer = customer;
            filter.page_no = 0;
        });
        self.snapshot()
    }

    pub fn set_article(&self, article: Option<RecordId>) -> ListFilter {
        self.tx.send_modify(|filter| {
            filter.article = article;
            filter.page_no = 0;
        });
        self.snapshot()
    }

    pub fn set_page_size(&self, page_size: u32) -> ListFilter {
        self.tx.send_modify(|filter| {
            filter.page_size = page_size.max(1);
            filter.page_no = 0;
        });
        self.snapshot()
    }

    /// Navigate, clamped to `[0, total_pages - 1]`.
    pub fn goto_page(&self, requested: u32, total_pages: u32) -> ListFilter {
        let page_no = clamp_page(requested, total_pages);
        self.tx.send_modify(|filter| filter.page_no = page_no);
        self.snapshot()
    }

    /// Edit-mode seeding: restore the entire ancestor chain of an existing
    /// resource in one atomic update, so no intermediate state can trigger
    /// a cascade reset that wipes the restored values.
    pub fn seed(
        &self,
        company: Option<RecordId>,
        path: &FacilityPath,
    ) -> FacilityResult<ListFilter> {
        let selection = FacilitySelection::from_path(company, path)?;
        self.tx.send_modify(|filter| {
            filter.facility = selection;
            filter.page_no = 0;
        });
        debug!("cascade: {} seeded from stored path", self.entity);
        Ok(self.snapshot())
    }

    /// The ancestor scope an options query for `level` must carry, if that
    /// ancestor is currently chosen.
    pub fn scope_for(&self, level: FacilityLevel) -> Option<(FacilityLevel, RecordId)> {
        let parent = level.parent()?;
        let id = self.tx.borrow().facility.get(parent)?;
        Some((parent, id))
    }

    /// Selectable options for one facility level's picker.
    ///
    /// While the required ancestor is unset the query is suppressed: no
    /// request is issued and no cache entry is created under an ill-formed
    /// key — the picker is simply empty.
    pub async fn options<T: DeserializeOwned>(
        &self,
        client: &ResourceClient,
        level: FacilityLevel,
    ) -> ClientResult<Vec<T>> {
        let Some(entity) = level_entity(level) else {
            return Ok(Vec::new());
        };
        let Some((parent, id)) = self.scope_for(level) else {
            debug!("cascade: {level} options suppressed, ancestor unset");
            return Ok(Vec::new());
        };
        client.by_parent(entity, parent, id).await
    }
}

fn level_entity(level: FacilityLevel) -> Option<EntityKind> {
    match level {
        FacilityLevel::Company => None,
        FacilityLevel::Branch => Some(EntityKind::Branch),
        FacilityLevel::Building => Some(EntityKind::Building),
        FacilityLevel::Floor => Some(EntityKind::Floor),
        FacilityLevel::Hall => Some(EntityKind::Hall),
        FacilityLevel::Row => Some(EntityKind::Row),
    }
}
