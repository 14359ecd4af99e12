#![allow(dead_code)]

use std::sync::Arc;

use index_sync_engine::index::{PostsIndex, UsersIndex};
use index_sync_engine::mapper::PostRecordOptions;
use index_sync_engine::{Index, IndexRegistry, RegistryConfig, RegistryDependencies};
use index_sync_repository::{InMemoryIndexClient, InMemoryItemSource, InMemoryLedger, RemoteOperation};
use index_sync_shared::{Item, Post, User};

pub const PREFIX: &str = "test_";

/// In-memory collaborators shared by the indices under test.
pub struct Harness {
    pub client: Arc<InMemoryIndexClient>,
    pub source: Arc<InMemoryItemSource>,
    pub ledger: Arc<InMemoryLedger>,
}

impl Harness {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            client: Arc::new(InMemoryIndexClient::new()),
            source: Arc::new(InMemoryItemSource::new(items)),
            ledger: Arc::new(InMemoryLedger::new()),
        }
    }

    pub fn deps(&self) -> RegistryDependencies {
        RegistryDependencies {
            client: self.client.clone(),
            source: self.source.clone(),
            ledger: self.ledger.clone(),
        }
    }

    pub fn registry(&self, config: &RegistryConfig) -> IndexRegistry {
        IndexRegistry::new(config, self.deps()).expect("registry config is valid")
    }

    /// A `posts_{post_type}` index whose fragments hold two four-letter words each.
    pub fn posts_index(&self, post_type: &str) -> PostsIndex {
        let mut index = PostsIndex::new(post_type, self.source.clone(), self.ledger.clone())
            .with_options(PostRecordOptions {
                split_posts: true,
                content_max_size: 10,
            });
        index.set_name_prefix(PREFIX);
        index.set_client(self.client.clone());
        index.set_enabled(true);
        index
    }

    pub fn users_index(&self, batch_size: u64) -> UsersIndex {
        let mut index = UsersIndex::new(self.source.clone());
        index.set_name_prefix(PREFIX);
        index.set_client(self.client.clone());
        index.set_enabled(true);
        index.core_mut().set_batch_size(batch_size);
        index
    }

    /// Every `objectID` upserted so far, in call order, duplicates included.
    pub async fn upserted_ids(&self) -> Vec<String> {
        self.client
            .operations()
            .await
            .into_iter()
            .flat_map(|operation| match operation {
                RemoteOperation::Upsert { object_ids, .. } => object_ids,
                _ => Vec::new(),
            })
            .collect()
    }

    pub async fn object_writes(&self) -> usize {
        self.client
            .operations()
            .await
            .iter()
            .filter(|operation| operation.is_object_write())
            .count()
    }
}

/// A published post of `words` four-letter words; with a 10 byte fragment size
/// it maps to `ceil(words / 2)` records.
pub fn post_with_words(id: u64, post_type: &str, words: usize) -> Post {
    let content = vec!["word"; words].join(" ");
    Post::new(id, post_type, format!("Post {}", id), format!("<p>{}</p>", content))
}

/// `count` users with ids `1..=count`, each the author of one post.
pub fn authors(count: u64) -> Vec<Item> {
    (1..=count)
        .map(|id| User::new(id, format!("Author {}", id), 1).into())
        .collect()
}
