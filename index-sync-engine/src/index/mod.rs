//! Indices: one remote search index per content category.
//!
//! The [`Index`] trait carries the synchronization protocol as default
//! methods (single-item update and delete, settings push, paginated
//! re-index). Variants only describe what they hold: which items they
//! support, which of those qualify, and how an item maps to records.

mod fragments;
mod posts;
mod searchable_posts;
mod terms;
mod users;

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::IndexError;
use index_sync_repository::{ItemFilter, ItemSource, RemoteIndexClient};
use index_sync_shared::{ContentCategory, IndexSettings, Item, Record, Synonym};

pub use fragments::PostFragments;
pub use posts::PostsIndex;
pub use searchable_posts::{SearchablePostsIndex, SEARCHABLE_POSTS_INDEX_ID};
pub use terms::TermsIndex;
pub use users::{gravatar_url, UsersIndex, USERS_INDEX_ID};

/// Default number of items fetched per re-index page.
pub const DEFAULT_BATCH_SIZE: u64 = 50;

/// Result of one re-index step, handed back to the caller driving the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReIndexProgress {
    /// The page that was processed.
    pub page: u64,
    /// Total number of pages, computed from the item count at the time of the call.
    pub total_pages: u64,
    /// Whether the caller should stop polling.
    pub finished: bool,
}

/// State shared by every index variant.
///
/// The prefix, client and enabled flag are injected after construction, once
/// the registry knows the configuration.
pub struct IndexCore {
    id: String,
    name_prefix: String,
    enabled: bool,
    batch_size: u64,
    client: Option<Arc<dyn RemoteIndexClient>>,
    source: Arc<dyn ItemSource>,
    synonyms: Vec<Synonym>,
}

impl IndexCore {
    /// Create a disabled, unprefixed core with no client.
    pub fn new(id: impl Into<String>, source: Arc<dyn ItemSource>) -> Self {
        Self {
            id: id.into(),
            name_prefix: String::new(),
            enabled: false,
            batch_size: DEFAULT_BATCH_SIZE,
            client: None,
            source,
            synonyms: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    /// The physical name of the remote index.
    pub fn index_name(&self) -> String {
        format!("{}{}", self.name_prefix, self.id)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn source(&self) -> &Arc<dyn ItemSource> {
        &self.source
    }

    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }

    /// The injected remote client.
    pub fn client(&self) -> Result<&Arc<dyn RemoteIndexClient>, IndexError> {
        self.client
            .as_ref()
            .ok_or_else(|| IndexError::ClientNotSet(self.id.clone()))
    }

    pub fn set_name_prefix(&mut self, name_prefix: impl Into<String>) {
        self.name_prefix = name_prefix.into();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_client(&mut self, client: Arc<dyn RemoteIndexClient>) {
        self.client = Some(client);
    }

    pub fn set_batch_size(&mut self, batch_size: u64) {
        self.batch_size = batch_size;
    }

    pub fn set_synonyms(&mut self, synonyms: Vec<Synonym>) {
        self.synonyms = synonyms;
    }
}

/// A remote search index kept in sync with one content category.
///
/// Implementors provide the category-specific parts; everything else has a
/// default. Fan-out indices override [`Index::update_records`] and
/// [`Index::delete_item`].
#[async_trait]
pub trait Index: Send + Sync {
    fn core(&self) -> &IndexCore;

    fn core_mut(&mut self) -> &mut IndexCore;

    /// The category of items this index holds.
    fn category(&self) -> ContentCategory;

    /// Name shown to operators.
    fn admin_name(&self) -> String;

    /// Cheap type check, no I/O.
    fn supports(&self, item: &Item) -> bool;

    /// Which items of the content store a re-index walks through.
    fn filter(&self) -> ItemFilter;

    /// Ranking, faceting and snippet configuration of the remote index.
    fn settings(&self) -> IndexSettings;

    /// Whether a supported item currently belongs in the index.
    async fn should_index(&self, item: &Item) -> Result<bool, IndexError>;

    /// Map a supported item to its records.
    async fn records(&self, item: &Item) -> Result<Vec<Record>, IndexError>;

    fn id(&self) -> &str {
        self.core().id()
    }

    /// The physical name of the remote index (`name_prefix + id`).
    fn index_name(&self) -> String {
        self.core().index_name()
    }

    fn is_enabled(&self) -> bool {
        self.core().is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.core_mut().set_enabled(enabled);
    }

    fn set_name_prefix(&mut self, name_prefix: &str) {
        self.core_mut().set_name_prefix(name_prefix);
    }

    fn set_client(&mut self, client: Arc<dyn RemoteIndexClient>) {
        self.core_mut().set_client(client);
    }

    fn contains_only(&self, category: ContentCategory) -> bool {
        self.category() == category
    }

    fn synonyms(&self) -> Vec<Synonym> {
        self.core().synonyms().to_vec()
    }

    /// Fail with `UnsupportedItem` unless the index supports `item`.
    fn assert_supported(&self, item: &Item) -> Result<(), IndexError> {
        if self.supports(item) {
            Ok(())
        } else {
            Err(IndexError::unsupported(self.id(), item.object_key()))
        }
    }

    /// Bring the remote records of `item` in line with its current state.
    ///
    /// Items that no longer qualify are deleted.
    async fn update_item(&self, item: &Item) -> Result<(), IndexError> {
        self.assert_supported(item)?;

        if !self.should_index(item).await? {
            debug!(index_id = %self.id(), item = %item.object_key(), "Item does not qualify, deleting");
            return self.delete_item(item).await;
        }

        let records = self.records(item).await?;
        self.update_records(item, records).await
    }

    /// Write the records of `item`. No records means the item is deleted.
    async fn update_records(&self, item: &Item, records: Vec<Record>) -> Result<(), IndexError> {
        if records.is_empty() {
            return self.delete_item(item).await;
        }
        if records.iter().any(|record| record.object_id().is_none()) {
            return Err(IndexError::mapping(format!(
                "record of {} has no objectID",
                item.object_key()
            )));
        }

        let client = self.core().client()?;
        let index_name = self.index_name();
        match records.as_slice() {
            [record] => client.upsert(&index_name, record).await?,
            _ => client.upsert_many(&index_name, &records).await?,
        }

        debug!(
            index_id = %self.id(),
            item = %item.object_key(),
            count = records.len(),
            "Records upserted"
        );
        Ok(())
    }

    /// Remove every record of `item` from the remote index.
    async fn delete_item(&self, item: &Item) -> Result<(), IndexError> {
        self.assert_supported(item)?;

        let client = self.core().client()?;
        client
            .delete(&self.index_name(), &item.id().to_string())
            .await?;

        debug!(index_id = %self.id(), item = %item.object_key(), "Record deleted");
        Ok(())
    }

    /// Push the current settings and synonyms to the remote index.
    async fn push_settings(&self) -> Result<(), IndexError> {
        let client = self.core().client()?;
        let index_name = self.index_name();

        client.set_settings(&index_name, &self.settings()).await?;
        client.set_synonyms(&index_name, &self.synonyms()).await?;

        debug!(index_id = %self.id(), index = %index_name, "Settings pushed");
        Ok(())
    }

    /// `ceil(item count / batch_size)`, counted fresh on every call.
    async fn re_index_max_num_pages(&self, batch_size: u64) -> Result<u64, IndexError> {
        if batch_size == 0 {
            return Err(IndexError::configuration("re-index batch size must be positive"));
        }

        let count = self.core().source().count(&self.filter()).await?;
        Ok(count.div_ceil(batch_size))
    }

    /// Process one re-index page. Pages start at 1.
    ///
    /// Page 1 pushes the settings first, even when the index is empty. Pages
    /// past the end fetch nothing. Any failure aborts the page; replaying it is
    /// safe.
    async fn re_index(&self, page: u64) -> Result<ReIndexProgress, IndexError> {
        if page == 0 {
            return Err(IndexError::InvalidPage(page));
        }

        let batch_size = self.core().batch_size();
        if page == 1 {
            self.push_settings().await?;
        }

        let total_pages = self.re_index_max_num_pages(batch_size).await?;
        if page <= total_pages {
            let items = self
                .core()
                .source()
                .fetch(&self.filter(), page, batch_size)
                .await?;
            for item in &items {
                self.update_item(item).await?;
            }
            debug!(
                index_id = %self.id(),
                page = page,
                total_pages = total_pages,
                count = items.len(),
                "Re-index page processed"
            );
        }

        let finished = page >= total_pages;
        if finished {
            info!(index_id = %self.id(), total_pages = total_pages, "Re-index finished");
        }

        Ok(ReIndexProgress {
            page,
            total_pages,
            finished,
        })
    }

    /// Whether the remote index holds at least one record.
    async fn exists(&self) -> Result<bool, IndexError> {
        let client = self.core().client()?;
        Ok(client.exists(&self.index_name()).await?)
    }
}

/// The closed set of index variants the registry builds.
pub enum SyncIndex {
    Posts(PostsIndex),
    SearchablePosts(SearchablePostsIndex),
    Terms(TermsIndex),
    Users(UsersIndex),
}

impl SyncIndex {
    pub fn as_index(&self) -> &(dyn Index + 'static) {
        match self {
            Self::Posts(index) => index,
            Self::SearchablePosts(index) => index,
            Self::Terms(index) => index,
            Self::Users(index) => index,
        }
    }

    pub fn as_index_mut(&mut self) -> &mut (dyn Index + 'static) {
        match self {
            Self::Posts(index) => index,
            Self::SearchablePosts(index) => index,
            Self::Terms(index) => index,
            Self::Users(index) => index,
        }
    }
}

impl Deref for SyncIndex {
    type Target = dyn Index;

    fn deref(&self) -> &Self::Target {
        self.as_index()
    }
}

impl DerefMut for SyncIndex {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_index_mut()
    }
}

impl From<PostsIndex> for SyncIndex {
    fn from(index: PostsIndex) -> Self {
        Self::Posts(index)
    }
}

impl From<SearchablePostsIndex> for SyncIndex {
    fn from(index: SearchablePostsIndex) -> Self {
        Self::SearchablePosts(index)
    }
}

impl From<TermsIndex> for SyncIndex {
    fn from(index: TermsIndex) -> Self {
        Self::Terms(index)
    }
}

impl From<UsersIndex> for SyncIndex {
    fn from(index: UsersIndex) -> Self {
        Self::Users(index)
    }
}
