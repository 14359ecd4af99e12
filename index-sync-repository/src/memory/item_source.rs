//! In-memory item source.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::interfaces::ItemSource;
use crate::types::ItemFilter;
use index_sync_shared::{ContentCategory, Item};

/// An `ItemSource` over a list of items held in memory.
///
/// Items can be added or removed while a re-index is in progress, which is how
/// the content store behaves when editors keep working during a rebuild.
#[derive(Debug, Default)]
pub struct InMemoryItemSource {
    items: RwLock<Vec<Item>>,
}

impl InMemoryItemSource {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Insert an item, replacing any item of the same category and id.
    pub async fn upsert(&self, item: Item) {
        let mut items = self.items.write().await;
        match items
            .iter_mut()
            .find(|existing| existing.category() == item.category() && existing.id() == item.id())
        {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    /// Remove an item, returning it if it was present.
    pub async fn remove(&self, category: ContentCategory, id: u64) -> Option<Item> {
        let mut items = self.items.write().await;
        let position = items
            .iter()
            .position(|item| item.category() == category && item.id() == id)?;
        Some(items.remove(position))
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ItemSource for InMemoryItemSource {
    async fn count(&self, filter: &ItemFilter) -> Result<u64, StoreError> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|item| filter.matches(item)).count() as u64)
    }

    async fn fetch(
        &self,
        filter: &ItemFilter,
        page: u64,
        batch_size: u64,
    ) -> Result<Vec<Item>, StoreError> {
        if page == 0 {
            return Err(StoreError::query("page numbers start at 1"));
        }

        let items = self.items.read().await;
        let mut matching: Vec<&Item> = items.iter().filter(|item| filter.matches(item)).collect();
        matching.sort_by_key(|item| item.id());

        let offset = (page - 1).saturating_mul(batch_size);
        Ok(matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(batch_size).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index_sync_shared::{Post, User};

    fn posts(ids: &[u64]) -> Vec<Item> {
        ids.iter()
            .map(|id| Post::new(*id, "post", format!("Post {}", id), "").into())
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_is_ordered_by_id() {
        let source = InMemoryItemSource::new(posts(&[5, 1, 3, 2, 4]));
        let filter = ItemFilter::post_type("post");

        let page_1: Vec<u64> = source
            .fetch(&filter, 1, 2)
            .await
            .unwrap()
            .iter()
            .map(Item::id)
            .collect();
        let page_3: Vec<u64> = source
            .fetch(&filter, 3, 2)
            .await
            .unwrap()
            .iter()
            .map(Item::id)
            .collect();

        assert_eq!(page_1, vec![1, 2]);
        assert_eq!(page_3, vec![5]);
        assert!(source.fetch(&filter, 4, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_applies_filter() {
        let mut items = posts(&[1, 2]);
        items.push(User::new(1, "Ada", 2).into());
        let source = InMemoryItemSource::new(items);

        assert_eq!(source.count(&ItemFilter::post_type("post")).await.unwrap(), 2);
        assert_eq!(source.count(&ItemFilter::post_type("page")).await.unwrap(), 0);
        assert_eq!(source.count(&ItemFilter::Users).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_page_zero_is_rejected() {
        let source = InMemoryItemSource::new(posts(&[1]));
        assert!(source
            .fetch(&ItemFilter::post_type("post"), 0, 10)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_remove() {
        let source = InMemoryItemSource::new(posts(&[1]));
        source
            .upsert(Post::new(1, "post", "Renamed", "").into())
            .await;
        assert_eq!(source.len().await, 1);

        let removed = source.remove(ContentCategory::Posts, 1).await.unwrap();
        assert_eq!(removed.as_post().unwrap().title, "Renamed");
        assert!(source.is_empty().await);
    }
}
