//! Index of the site's authors.

use std::sync::Arc;

use async_trait::async_trait;
use md5::{Digest, Md5};

use super::{Index, IndexCore};
use crate::errors::IndexError;
use index_sync_repository::{ItemFilter, ItemSource};
use index_sync_shared::{ContentCategory, IndexSettings, Item, Record, User};

pub const USERS_INDEX_ID: &str = "users";

const AVATAR_SIZE: u32 = 32;

/// Gravatar URL of `email`, used when the store has no avatar for a user.
pub fn gravatar_url(email: &str) -> String {
    let hash = Md5::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?s={}", hash, AVATAR_SIZE)
}

/// Holds every user who authored at least one post.
pub struct UsersIndex {
    core: IndexCore,
}

impl UsersIndex {
    pub fn new(source: Arc<dyn ItemSource>) -> Self {
        Self {
            core: IndexCore::new(USERS_INDEX_ID, source),
        }
    }

    fn user<'a>(&self, item: &'a Item) -> Result<&'a User, IndexError> {
        item.as_user()
            .ok_or_else(|| IndexError::unsupported(self.core.id(), item.object_key()))
    }
}

#[async_trait]
impl Index for UsersIndex {
    fn core(&self) -> &IndexCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut IndexCore {
        &mut self.core
    }

    fn category(&self) -> ContentCategory {
        ContentCategory::Users
    }

    fn admin_name(&self) -> String {
        "Users".to_string()
    }

    fn supports(&self, item: &Item) -> bool {
        item.as_user().is_some()
    }

    fn filter(&self) -> ItemFilter {
        ItemFilter::Users
    }

    fn settings(&self) -> IndexSettings {
        IndexSettings::new(["unordered(display_name)"], ["desc(posts_count)"])
    }

    async fn should_index(&self, item: &Item) -> Result<bool, IndexError> {
        Ok(self.user(item)?.posts_count > 0)
    }

    async fn records(&self, item: &Item) -> Result<Vec<Record>, IndexError> {
        let user = self.user(item)?;
        let avatar_url = user
            .avatar_url
            .clone()
            .unwrap_or_else(|| gravatar_url(&user.email));

        let record = Record::new(user.id.to_string())
            .with("user_id", user.id)
            .with("display_name", user.display_name.clone())
            .with("posts_url", user.posts_url.clone())
            .with("description", user.description.clone())
            .with("posts_count", user.posts_count)
            .with("avatar_url", avatar_url);
        Ok(vec![record])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index_sync_repository::InMemoryItemSource;
    use index_sync_shared::Post;
    use serde_json::json;

    fn index() -> UsersIndex {
        UsersIndex::new(Arc::new(InMemoryItemSource::default()))
    }

    #[test]
    fn test_gravatar_normalizes_email() {
        assert_eq!(
            gravatar_url("  MyEmailAddress@example.com "),
            "https://www.gravatar.com/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346?s=32"
        );
    }

    #[tokio::test]
    async fn test_only_authors_qualify() {
        let index = index();
        assert!(index.should_index(&User::new(1, "Ada", 2).into()).await.unwrap());
        assert!(!index.should_index(&User::new(2, "Lurker", 0).into()).await.unwrap());
        assert!(!index.supports(&Post::new(3, "post", "", "").into()));
    }

    #[tokio::test]
    async fn test_record_prefers_stored_avatar() {
        let mut user = User::new(5, "Ada", 2);
        user.avatar_url = Some("https://cdn.example.com/ada.png".to_string());

        let records = index().records(&user.into()).await.unwrap();

        assert_eq!(records[0].object_id(), Some("5"));
        assert_eq!(records[0].get("user_id"), Some(&json!(5)));
        assert_eq!(
            records[0].get("avatar_url"),
            Some(&json!("https://cdn.example.com/ada.png"))
        );
    }
}
