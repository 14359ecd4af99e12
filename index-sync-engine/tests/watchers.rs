mod common;

use common::{post_with_words, Harness};
use index_sync_engine::{
    ChangeHook, ChangeKind, ChangeWatcher, IndexError, IndexRegistry, PostType, RegistryConfig,
};
use index_sync_shared::{ContentCategory, Item, PostStatus, Term, User};

fn synced_config() -> RegistryConfig {
    RegistryConfig {
        post_types: vec![PostType::new("post"), PostType::new("page")],
        taxonomies: vec!["category".to_string()],
        synced_indices_ids: vec![
            "searchable_posts".to_string(),
            "posts_post".to_string(),
            "terms_category".to_string(),
        ],
        content_max_size: 10,
        ..RegistryConfig::default()
    }
}

fn registry(harness: &Harness) -> IndexRegistry {
    harness.registry(&synced_config())
}

#[tokio::test]
async fn test_dispatcher_watches_enabled_indices_only() {
    let harness = Harness::new(vec![]);
    let dispatcher = registry(&harness).dispatcher();

    let watched: Vec<&str> = dispatcher
        .watchers()
        .iter()
        .map(|watcher| watcher.index().id())
        .collect();

    assert_eq!(watched, vec!["searchable_posts", "posts_post", "terms_category"]);
}

#[tokio::test]
async fn test_post_change_reaches_every_matching_index() {
    let harness = Harness::new(vec![]);
    let dispatcher = registry(&harness).dispatcher();
    let post: Item = post_with_words(4, "post", 2).into();

    dispatcher
        .on_item_changed(ContentCategory::Posts, &post, ChangeKind::Created)
        .await
        .unwrap();

    assert_eq!(harness.client.object_ids("wp_searchable_posts").await, vec!["4-0"]);
    assert_eq!(harness.client.object_ids("wp_posts_post").await, vec!["4-0"]);
    assert!(harness.client.object_ids("wp_terms_category").await.is_empty());
}

#[tokio::test]
async fn test_page_change_skips_indices_of_other_types() {
    let harness = Harness::new(vec![]);
    let dispatcher = registry(&harness).dispatcher();
    let page: Item = post_with_words(5, "page", 2).into();

    dispatcher
        .on_item_changed(ContentCategory::Posts, &page, ChangeKind::Updated)
        .await
        .unwrap();

    assert_eq!(harness.client.object_ids("wp_searchable_posts").await, vec!["5-0"]);
    assert!(harness.client.object_ids("wp_posts_post").await.is_empty());
    assert!(harness.client.object_ids("wp_posts_page").await.is_empty());
}

#[tokio::test]
async fn test_trash_and_delete_remove_records() {
    let harness = Harness::new(vec![]);
    let dispatcher = registry(&harness).dispatcher();
    let post = post_with_words(6, "post", 6);

    dispatcher
        .on_item_changed(ContentCategory::Posts, &post.clone().into(), ChangeKind::Created)
        .await
        .unwrap();
    assert_eq!(harness.client.object_ids("wp_posts_post").await.len(), 3);

    let trashed: Item = post.clone().with_status(PostStatus::Trash).into();
    dispatcher
        .on_item_changed(ContentCategory::Posts, &trashed, ChangeKind::Trashed)
        .await
        .unwrap();
    assert!(harness.client.object_ids("wp_posts_post").await.is_empty());

    dispatcher
        .on_item_changed(ContentCategory::Posts, &post.clone().into(), ChangeKind::Restored)
        .await
        .unwrap();
    assert_eq!(harness.client.object_ids("wp_searchable_posts").await.len(), 3);

    dispatcher
        .on_item_changed(ContentCategory::Posts, &post.into(), ChangeKind::Deleted)
        .await
        .unwrap();
    assert!(harness.client.object_ids("wp_searchable_posts").await.is_empty());
    assert!(harness.client.object_ids("wp_posts_post").await.is_empty());
}

#[tokio::test]
async fn test_term_changes_follow_term_count() {
    let harness = Harness::new(vec![]);
    let dispatcher = registry(&harness).dispatcher();

    let used: Item = Term::new(3, "category", "News", 2).into();
    dispatcher
        .on_item_changed(ContentCategory::Terms, &used, ChangeKind::Updated)
        .await
        .unwrap();
    assert_eq!(harness.client.object_ids("wp_terms_category").await, vec!["3"]);

    let emptied: Item = Term::new(3, "category", "News", 0).into();
    dispatcher
        .on_item_changed(ContentCategory::Terms, &emptied, ChangeKind::TermsChanged)
        .await
        .unwrap();
    assert!(harness.client.object_ids("wp_terms_category").await.is_empty());
}

#[tokio::test]
async fn test_changes_without_enabled_index_are_ignored() {
    let harness = Harness::new(vec![]);
    let dispatcher = registry(&harness).dispatcher();
    let user: Item = User::new(1, "Ada", 3).into();

    dispatcher
        .on_item_changed(ContentCategory::Users, &user, ChangeKind::Updated)
        .await
        .unwrap();

    assert!(harness.client.operations().await.is_empty());
}

#[tokio::test]
async fn test_watcher_ignores_other_categories() {
    let harness = Harness::new(vec![]);
    let registry = registry(&harness);
    let watcher = ChangeWatcher::new(registry.get("posts_post").unwrap());
    let post: Item = post_with_words(1, "post", 2).into();

    watcher
        .on_item_changed(ContentCategory::Terms, &post, ChangeKind::Updated)
        .await
        .unwrap();

    assert!(!watcher.accepts(ContentCategory::Terms, &post));
    assert!(watcher.accepts(ContentCategory::Posts, &post));
    assert!(harness.client.operations().await.is_empty());
}

#[tokio::test]
async fn test_remote_failure_aborts_dispatch() {
    let harness = Harness::new(vec![]);
    let dispatcher = registry(&harness).dispatcher();
    let post: Item = post_with_words(2, "post", 2).into();

    // The searchable index write succeeds, the per-type one fails.
    harness.client.fail_writes_after(1).await;
    let err = dispatcher
        .on_item_changed(ContentCategory::Posts, &post, ChangeKind::Updated)
        .await
        .unwrap_err();

    assert!(matches!(err, IndexError::Remote(_)));
    assert_eq!(harness.client.object_ids("wp_searchable_posts").await, vec!["2-0"]);
    assert!(harness.client.object_ids("wp_posts_post").await.is_empty());
}
