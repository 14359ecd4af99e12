//! Change watchers: routing content-store mutations to the indices.
//!
//! Every change is handled inline, one remote call at a time, before the hook
//! returns. Swapping in a queue only requires another [`ChangeHook`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::errors::IndexError;
use crate::index::{Index, SyncIndex};
use crate::registry::{IndexRegistry, IndicesFilter};
use index_sync_shared::{ContentCategory, Item};

/// What happened to an item in the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Trashed,
    Restored,
    /// The item's taxonomy terms were reassigned.
    TermsChanged,
    /// The item was permanently deleted.
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Trashed => "trashed",
            Self::Restored => "restored",
            Self::TermsChanged => "terms_changed",
            Self::Deleted => "deleted",
        };
        f.write_str(kind)
    }
}

/// Receives content-store mutations.
#[async_trait]
pub trait ChangeHook: Send + Sync {
    async fn on_item_changed(
        &self,
        category: ContentCategory,
        item: &Item,
        kind: ChangeKind,
    ) -> Result<(), IndexError>;
}

/// Binds the mutations of one category to one index.
pub struct ChangeWatcher {
    category: ContentCategory,
    index: Arc<SyncIndex>,
}

impl ChangeWatcher {
    /// Watch the category `index` holds.
    pub fn new(index: Arc<SyncIndex>) -> Self {
        Self {
            category: index.category(),
            index,
        }
    }

    pub fn index(&self) -> &Arc<SyncIndex> {
        &self.index
    }

    /// Whether a change is routed to this watcher's index.
    pub fn accepts(&self, category: ContentCategory, item: &Item) -> bool {
        category == self.category && self.index.contains_only(category) && self.index.supports(item)
    }
}

#[async_trait]
impl ChangeHook for ChangeWatcher {
    async fn on_item_changed(
        &self,
        category: ContentCategory,
        item: &Item,
        kind: ChangeKind,
    ) -> Result<(), IndexError> {
        if !self.accepts(category, item) {
            return Ok(());
        }

        debug!(
            index_id = %self.index.id(),
            item = %item.object_key(),
            kind = %kind,
            "Syncing changed item"
        );
        match kind {
            ChangeKind::Deleted => self.index.delete_item(item).await,
            _ => self.index.update_item(item).await,
        }
    }
}

/// Fans one change out to every watcher, in registry order.
///
/// The first failure aborts the dispatch and is returned to the caller.
#[derive(Default)]
pub struct ChangeDispatcher {
    watchers: Vec<ChangeWatcher>,
}

impl ChangeDispatcher {
    pub fn new(watchers: Vec<ChangeWatcher>) -> Self {
        Self { watchers }
    }

    /// One watcher per enabled index of `registry`.
    pub fn from_registry(registry: &IndexRegistry) -> Self {
        let watchers = registry
            .indices(IndicesFilter::enabled())
            .into_iter()
            .map(ChangeWatcher::new)
            .collect();
        Self { watchers }
    }

    pub fn watchers(&self) -> &[ChangeWatcher] {
        &self.watchers
    }
}

#[async_trait]
impl ChangeHook for ChangeDispatcher {
    #[instrument(skip(self, item), fields(item = %item.object_key()))]
    async fn on_item_changed(
        &self,
        category: ContentCategory,
        item: &Item,
        kind: ChangeKind,
    ) -> Result<(), IndexError> {
        for watcher in &self.watchers {
            watcher.on_item_changed(category, item, kind).await?;
        }
        Ok(())
    }
}
