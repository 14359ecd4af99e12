//! Index holding the published posts of every searchable post type.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::posts::post_settings;
use super::{Index, IndexCore, PostFragments};
use crate::errors::IndexError;
use crate::mapper::{post_records, PostRecordOptions};
use index_sync_repository::{ItemFilter, ItemSource, RecordsCountLedger};
use index_sync_shared::{ContentCategory, IndexSettings, Item, Post, PostStatus, Record};

pub const SEARCHABLE_POSTS_INDEX_ID: &str = "searchable_posts";

/// One index across several post types, used for site-wide search.
pub struct SearchablePostsIndex {
    core: IndexCore,
    post_types: Vec<String>,
    labels: HashMap<String, String>,
    options: PostRecordOptions,
    fragments: PostFragments,
}

impl SearchablePostsIndex {
    pub fn new(
        post_types: Vec<String>,
        source: Arc<dyn ItemSource>,
        ledger: Arc<dyn RecordsCountLedger>,
    ) -> Self {
        Self {
            core: IndexCore::new(SEARCHABLE_POSTS_INDEX_ID, source),
            post_types,
            labels: HashMap::new(),
            options: PostRecordOptions::default(),
            fragments: PostFragments::new(ledger),
        }
    }

    /// Set the human readable names of the post types, keyed by type.
    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_options(mut self, options: PostRecordOptions) -> Self {
        self.options = options;
        self
    }

    pub fn post_types(&self) -> &[String] {
        &self.post_types
    }

    /// Label of the post's type: the configured one, then the one the post
    /// carries, then the type itself.
    fn post_type_label(&self, post: &Post) -> String {
        if let Some(label) = self.labels.get(&post.post_type) {
            return label.clone();
        }
        if !post.post_type_label.is_empty() {
            return post.post_type_label.clone();
        }
        post.post_type.clone()
    }

    fn post<'a>(&self, item: &'a Item) -> Result<&'a Post, IndexError> {
        match item.as_post() {
            Some(post) if self.post_types.contains(&post.post_type) => Ok(post),
            _ => Err(IndexError::unsupported(self.core.id(), item.object_key())),
        }
    }
}

#[async_trait]
impl Index for SearchablePostsIndex {
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
        "All posts".to_string()
    }

    fn supports(&self, item: &Item) -> bool {
        item.as_post()
            .is_some_and(|post| self.post_types.contains(&post.post_type))
    }

    fn filter(&self) -> ItemFilter {
        ItemFilter::Posts {
            post_types: self.post_types.clone(),
        }
    }

    fn settings(&self) -> IndexSettings {
        post_settings(&["post_type_label"])
    }

    async fn should_index(&self, item: &Item) -> Result<bool, IndexError> {
        let post = self.post(item)?;
        Ok(post.status == PostStatus::Publish && !post.has_password())
    }

    async fn records(&self, item: &Item) -> Result<Vec<Record>, IndexError> {
        let post = self.post(item)?;
        Ok(post_records(post, &self.post_type_label(post), &self.options))
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
