//! Index of the terms of one taxonomy.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Index, IndexCore};
use crate::errors::IndexError;
use index_sync_repository::{ItemFilter, ItemSource};
use index_sync_shared::{ContentCategory, IndexSettings, Item, Record, Term};

/// Holds the non-empty terms of a taxonomy, one record per term.
pub struct TermsIndex {
    core: IndexCore,
    taxonomy: String,
    label: Option<String>,
}

impl TermsIndex {
    /// Create the `terms_{taxonomy}` index.
    pub fn new(taxonomy: impl Into<String>, source: Arc<dyn ItemSource>) -> Self {
        let taxonomy = taxonomy.into();
        Self {
            core: IndexCore::new(format!("terms_{}", taxonomy), source),
            taxonomy,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn taxonomy(&self) -> &str {
        &self.taxonomy
    }

    fn term<'a>(&self, item: &'a Item) -> Result<&'a Term, IndexError> {
        match item.as_term() {
            Some(term) if term.taxonomy == self.taxonomy => Ok(term),
            _ => Err(IndexError::unsupported(self.core.id(), item.object_key())),
        }
    }
}

#[async_trait]
impl Index for TermsIndex {
    fn core(&self) -> &IndexCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut IndexCore {
        &mut self.core
    }

    fn category(&self) -> ContentCategory {
        ContentCategory::Terms
    }

    fn admin_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.taxonomy.clone())
    }

    fn supports(&self, item: &Item) -> bool {
        item.as_term()
            .is_some_and(|term| term.taxonomy == self.taxonomy)
    }

    fn filter(&self) -> ItemFilter {
        ItemFilter::taxonomy(self.taxonomy.clone())
    }

    fn settings(&self) -> IndexSettings {
        IndexSettings::new(
            ["unordered(name)", "unordered(description)"],
            ["desc(posts_count)"],
        )
    }

    async fn should_index(&self, item: &Item) -> Result<bool, IndexError> {
        Ok(self.term(item)?.count > 0)
    }

    async fn records(&self, item: &Item) -> Result<Vec<Record>, IndexError> {
        let term = self.term(item)?;
        let record = Record::new(term.id.to_string())
            .with("term_id", term.id)
            .with("taxonomy", term.taxonomy.clone())
            .with("name", term.name.clone())
            .with("description", term.description.clone())
            .with("slug", term.slug.clone())
            .with("posts_count", term.count)
            .with("permalink", term.permalink.clone());
        Ok(vec![record])
    }
}
