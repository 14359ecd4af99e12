//! Index of the posts of one post type.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Index, IndexCore, PostFragments};
use crate::errors::IndexError;
use crate::mapper::{post_records, PostRecordOptions};
use index_sync_repository::{ItemFilter, ItemSource, RecordsCountLedger};
use index_sync_shared::{ContentCategory, IndexSettings, Item, Post, PostStatus, Record};

/// Settings shared by both post indices. `extra_facets` are appended to the
/// default facets.
pub(crate) fn post_settings(extra_facets: &[&str]) -> IndexSettings {
    let mut settings = IndexSettings::new(
        [
            "unordered(post_title)",
            "unordered(taxonomies)",
            "unordered(content)",
        ],
        ["desc(is_sticky)", "desc(post_date)", "asc(record_index)"],
    );
    settings.attribute_for_distinct = Some("post_id".to_string());
    settings.distinct = true;
    settings.attributes_for_faceting = ["taxonomies", "taxonomies_hierarchical", "post_author.display_name"]
        .iter()
        .chain(extra_facets)
        .map(|facet| facet.to_string())
        .collect();
    settings.attributes_to_snippet = vec!["post_title:30".to_string(), "content:30".to_string()];
    settings.snippet_ellipsis_text = Some("…".to_string());
    settings
}

/// Status used to decide membership: attachments and revisions follow their parent.
fn effective_status(post: &Post) -> PostStatus {
    match post.status {
        PostStatus::Inherit => post.parent_status.unwrap_or(PostStatus::Publish),
        status => status,
    }
}

/// Holds every published post of a single type, one record per content fragment.
pub struct PostsIndex {
    core: IndexCore,
    post_type: String,
    label: Option<String>,
    options: PostRecordOptions,
    fragments: PostFragments,
}

impl PostsIndex {
    /// Create the `posts_{post_type}` index.
    pub fn new(
        post_type: impl Into<String>,
        source: Arc<dyn ItemSource>,
        ledger: Arc<dyn RecordsCountLedger>,
    ) -> Self {
        let post_type = post_type.into();
        Self {
            core: IndexCore::new(format!("posts_{}", post_type), source),
            post_type,
            label: None,
            options: PostRecordOptions::default(),
            fragments: PostFragments::new(ledger),
        }
    }

    /// Set the human readable name of the post type.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_options(mut self, options: PostRecordOptions) -> Self {
        self.options = options;
        self
    }

    pub fn post_type(&self) -> &str {
        &self.post_type
    }

    fn post<'a>(&self, item: &'a Item) -> Result<&'a Post, IndexError> {
        match item.as_post() {
            Some(post) if post.post_type == self.post_type => Ok(post),
            _ => Err(IndexError::unsupported(self.core.id(), item.object_key())),
        }
    }
}

#[async_trait]
impl Index for PostsIndex {
    fn core(&self) -> &IndexCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut IndexCore {
        &mut self.core
    }

    fn category(&self) -> ContentCategory {
        ContentCategory::Posts
    }

    fn admin_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.post_type.clone())
    }

    fn supports(&self, item: &Item) -> bool {
        item.as_post()
            .is_some_and(|post| post.post_type == self.post_type)
    }

    fn filter(&self) -> ItemFilter {
        ItemFilter::post_type(self.post_type.clone())
    }

    fn settings(&self) -> IndexSettings {
        post_settings(&[])
    }

    async fn should_index(&self, item: &Item) -> Result<bool, IndexError> {
        let post = self.post(item)?;
        Ok(effective_status(post) == PostStatus::Publish && !post.has_password())
    }

    async fn records(&self, item: &Item) -> Result<Vec<Record>, IndexError> {
        let post = self.post(item)?;
        Ok(post_records(post, &self.admin_name(), &self.options))
    }

    async fn update_records(&self, item: &Item, records: Vec<Record>) -> Result<(), IndexError> {
        let post = self.post(item)?;
        self.fragments.replace(&self.core, post.id, &records).await
    }

    async fn delete_item(&self, item: &Item) -> Result<(), IndexError> {
        let post = self.post(item)?;
        self.fragments.delete(&self.core, post.id).await
    }
}
