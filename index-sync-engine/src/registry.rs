//! The set of indices configured for a site.
//!
//! Built once at start-up and passed explicitly to whoever needs it: the change
//! dispatcher, the re-index trigger, the operator CLI.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::IndexError;
use crate::index::{
    Index, PostsIndex, ReIndexProgress, SearchablePostsIndex, SyncIndex, TermsIndex, UsersIndex,
    DEFAULT_BATCH_SIZE, SEARCHABLE_POSTS_INDEX_ID,
};
use crate::mapper::{PostRecordOptions, DEFAULT_CONTENT_MAX_SIZE};
use crate::watcher::ChangeDispatcher;
use index_sync_repository::{ItemSource, RecordsCountLedger, RemoteIndexClient};
use index_sync_shared::{ContentCategory, Synonym};

/// Default prefix of every physical index name.
pub const DEFAULT_NAME_PREFIX: &str = "wp_";

/// Post types never indexed on their own.
pub const BUILTIN_POST_TYPES_BLACKLIST: [&str; 1] = ["revision"];

/// Post types skipped unless configured otherwise.
pub const DEFAULT_POST_TYPES_BLACKLIST: [&str; 1] = ["nav_menu_item"];

/// Taxonomies skipped unless configured otherwise.
pub const DEFAULT_TAXONOMIES_BLACKLIST: [&str; 3] = ["nav_menu", "link_category", "post_format"];

/// A post type registered in the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostType {
    pub name: String,
    /// Plural display name, e.g. "Pages".
    pub label: Option<String>,
    /// Excluded from the site-wide searchable index.
    pub exclude_from_search: bool,
}

impl PostType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            exclude_from_search: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn excluded_from_search(mut self) -> Self {
        self.exclude_from_search = true;
        self
    }
}

/// Everything the registry needs to know to build the indices.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub name_prefix: String,
    pub post_types: Vec<PostType>,
    /// Types of the searchable index. `None` means every post type not
    /// excluded from search.
    pub searchable_post_types: Option<Vec<String>>,
    pub taxonomies: Vec<String>,
    /// Post types without their own index. `revision` is always excluded.
    pub post_types_blacklist: Vec<String>,
    pub taxonomies_blacklist: Vec<String>,
    /// Ids of the indices kept in sync.
    pub synced_indices_ids: Vec<String>,
    pub batch_size: u64,
    pub split_posts: bool,
    pub content_max_size: usize,
    /// Synonyms per index id.
    pub synonyms: HashMap<String, Vec<Synonym>>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            post_types: Vec::new(),
            searchable_post_types: None,
            taxonomies: Vec::new(),
            post_types_blacklist: DEFAULT_POST_TYPES_BLACKLIST
                .iter()
                .map(|t| t.to_string())
                .collect(),
            taxonomies_blacklist: DEFAULT_TAXONOMIES_BLACKLIST
                .iter()
                .map(|t| t.to_string())
                .collect(),
            synced_indices_ids: vec![SEARCHABLE_POSTS_INDEX_ID.to_string()],
            batch_size: DEFAULT_BATCH_SIZE,
            split_posts: true,
            content_max_size: DEFAULT_CONTENT_MAX_SIZE,
            synonyms: HashMap::new(),
        }
    }
}

impl RegistryConfig {
    fn validate(&self) -> Result<(), IndexError> {
        if self.name_prefix.trim().is_empty() {
            return Err(IndexError::configuration("index name prefix must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(IndexError::configuration("batch size must be positive"));
        }
        if self.content_max_size == 0 {
            return Err(IndexError::configuration("content max size must be positive"));
        }
        Ok(())
    }

    fn is_post_type_blacklisted(&self, post_type: &str) -> bool {
        BUILTIN_POST_TYPES_BLACKLIST.contains(&post_type)
            || self.post_types_blacklist.iter().any(|t| t == post_type)
    }

    fn searchable_post_types(&self) -> Vec<String> {
        match &self.searchable_post_types {
            Some(types) => types.clone(),
            None => self
                .post_types
                .iter()
                .filter(|t| !t.exclude_from_search)
                .map(|t| t.name.clone())
                .collect(),
        }
    }

    fn record_options(&self) -> PostRecordOptions {
        PostRecordOptions {
            split_posts: self.split_posts,
            content_max_size: self.content_max_size,
        }
    }
}

/// The external collaborators shared by every index.
#[derive(Clone)]
pub struct RegistryDependencies {
    pub client: Arc<dyn RemoteIndexClient>,
    pub source: Arc<dyn ItemSource>,
    pub ledger: Arc<dyn RecordsCountLedger>,
}

/// Selects indices from the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicesFilter {
    pub enabled_only: bool,
    pub contains: Option<ContentCategory>,
}

impl IndicesFilter {
    pub fn enabled() -> Self {
        Self {
            enabled_only: true,
            contains: None,
        }
    }

    pub fn containing(mut self, category: ContentCategory) -> Self {
        self.contains = Some(category);
        self
    }

    fn matches(&self, index: &SyncIndex) -> bool {
        (!self.enabled_only || index.is_enabled())
            && self.contains.map_or(true, |category| index.contains_only(category))
    }
}

/// The configured indices, in construction order.
pub struct IndexRegistry {
    indices: Vec<Arc<SyncIndex>>,
}

impl IndexRegistry {
    /// Build every index from `config` and inject the shared collaborators.
    ///
    /// Order: the searchable index, one index per post type, one per taxonomy,
    /// then the users index.
    pub fn new(config: &RegistryConfig, deps: RegistryDependencies) -> Result<Self, IndexError> {
        config.validate()?;

        let options = config.record_options();
        let labels: HashMap<String, String> = config
            .post_types
            .iter()
            .filter_map(|t| t.label.clone().map(|label| (t.name.clone(), label)))
            .collect();

        let mut built: Vec<SyncIndex> = Vec::new();

        built.push(
            SearchablePostsIndex::new(
                config.searchable_post_types(),
                deps.source.clone(),
                deps.ledger.clone(),
            )
            .with_labels(labels)
            .with_options(options.clone())
            .into(),
        );

        for post_type in &config.post_types {
            if config.is_post_type_blacklisted(&post_type.name) {
                continue;
            }
            let mut index =
                PostsIndex::new(post_type.name.clone(), deps.source.clone(), deps.ledger.clone())
                    .with_options(options.clone());
            if let Some(label) = &post_type.label {
                index = index.with_label(label.clone());
            }
            built.push(index.into());
        }

        for taxonomy in &config.taxonomies {
            if config.taxonomies_blacklist.contains(taxonomy) {
                continue;
            }
            built.push(TermsIndex::new(taxonomy.clone(), deps.source.clone()).into());
        }

        built.push(UsersIndex::new(deps.source.clone()).into());

        let mut seen = HashSet::new();
        for index in &built {
            if !seen.insert(index.id().to_string()) {
                return Err(IndexError::configuration(format!(
                    "duplicate index id: {}",
                    index.id()
                )));
            }
        }
        for id in &config.synced_indices_ids {
            if !seen.contains(id) {
                warn!(index_id = %id, "Synced index id does not match any index");
            }
        }

        let indices = built
            .into_iter()
            .map(|mut index| {
                let enabled = config.synced_indices_ids.iter().any(|id| id == index.id());
                index.set_name_prefix(&config.name_prefix);
                index.set_client(deps.client.clone());
                index.set_enabled(enabled);
                let core = index.core_mut();
                core.set_batch_size(config.batch_size);
                if let Some(synonyms) = config.synonyms.get(core.id()) {
                    core.set_synonyms(synonyms.clone());
                }
                Arc::new(index)
            })
            .collect::<Vec<_>>();

        info!(
            count = indices.len(),
            enabled = indices.iter().filter(|i| i.is_enabled()).count(),
            name_prefix = %config.name_prefix,
            "Index registry built"
        );

        Ok(Self { indices })
    }

    /// Look up an index by id.
    pub fn get(&self, index_id: &str) -> Option<Arc<SyncIndex>> {
        self.indices.iter().find(|i| i.id() == index_id).cloned()
    }

    /// The indices matching `filter`, in construction order.
    pub fn indices(&self, filter: IndicesFilter) -> Vec<Arc<SyncIndex>> {
        self.indices
            .iter()
            .filter(|index| filter.matches(index))
            .cloned()
            .collect()
    }

    /// Every index, enabled or not.
    pub fn all(&self) -> &[Arc<SyncIndex>] {
        &self.indices
    }

    /// Enabled indices whose remote index holds no record yet.
    pub async fn indices_needing_indexing(&self) -> Result<Vec<Arc<SyncIndex>>, IndexError> {
        let mut missing = Vec::new();
        for index in self.indices(IndicesFilter::enabled()) {
            if !index.exists().await? {
                missing.push(index);
            }
        }
        Ok(missing)
    }

    /// Process page `page` of the re-index of `index_id`.
    ///
    /// Pages past the end are not processed; an empty index is still processed
    /// once so its settings reach the remote store.
    #[instrument(skip(self))]
    pub async fn trigger_re_index(
        &self,
        index_id: &str,
        page: u64,
    ) -> Result<ReIndexProgress, IndexError> {
        let index = self
            .get(index_id)
            .ok_or_else(|| IndexError::UnknownIndex(index_id.to_string()))?;
        if page == 0 {
            return Err(IndexError::InvalidPage(page));
        }

        let total_pages = index.re_index_max_num_pages(index.core().batch_size()).await?;
        if page <= total_pages || total_pages == 0 {
            return index.re_index(page).await;
        }

        Ok(ReIndexProgress {
            page,
            total_pages,
            finished: page >= total_pages,
        })
    }

    /// Watchers for every enabled index.
    pub fn dispatcher(&self) -> ChangeDispatcher {
        ChangeDispatcher::from_registry(self)
    }
}
