mod common;

use common::{authors, post_with_words, Harness, PREFIX};
use index_sync_engine::{Index, IndexError};
use index_sync_repository::{RecordsCountLedger, RemoteIndexClient};
use index_sync_shared::{Item, PostStatus, Record, Term, User};

fn posts_index_name() -> String {
    format!("{}posts_post", PREFIX)
}

fn users_index_name() -> String {
    format!("{}users", PREFIX)
}

#[tokio::test]
async fn test_update_item_is_idempotent() {
    let harness = Harness::new(vec![]);
    let index = harness.posts_index("post");
    let item: Item = post_with_words(7, "post", 6).into();

    index.update_item(&item).await.unwrap();
    let first_ids = harness.client.object_ids(&posts_index_name()).await;
    let first_record = harness.client.record(&posts_index_name(), "7-1").await;

    index.update_item(&item).await.unwrap();

    assert_eq!(first_ids, vec!["7-0", "7-1", "7-2"]);
    assert_eq!(harness.client.object_ids(&posts_index_name()).await, first_ids);
    assert_eq!(harness.client.record(&posts_index_name(), "7-1").await, first_record);
}

#[tokio::test]
async fn test_shrinking_post_removes_trailing_fragments() {
    let harness = Harness::new(vec![]);
    let index = harness.posts_index("post");

    index
        .update_item(&post_with_words(7, "post", 10).into())
        .await
        .unwrap();
    assert_eq!(
        harness.client.object_ids(&posts_index_name()).await,
        vec!["7-0", "7-1", "7-2", "7-3", "7-4"]
    );

    index
        .update_item(&post_with_words(7, "post", 4).into())
        .await
        .unwrap();

    assert_eq!(
        harness.client.object_ids(&posts_index_name()).await,
        vec!["7-0", "7-1"]
    );
    assert_eq!(harness.ledger.records_count("posts_post", 7).await.unwrap(), 2);
}

#[tokio::test]
async fn test_disqualified_post_is_removed() {
    let harness = Harness::new(vec![]);
    let index = harness.posts_index("post");
    let published = post_with_words(3, "post", 6);
    let draft = published.clone().with_status(PostStatus::Draft);

    index.update_item(&published.into()).await.unwrap();
    assert_eq!(harness.client.object_ids(&posts_index_name()).await.len(), 3);

    index.update_item(&draft.into()).await.unwrap();

    assert!(harness.client.object_ids(&posts_index_name()).await.is_empty());
}

#[tokio::test]
async fn test_delete_item_removes_every_fragment() {
    let harness = Harness::new(vec![]);
    let index = harness.posts_index("post");
    let item: Item = post_with_words(9, "post", 8).into();
    let other: Item = post_with_words(10, "post", 2).into();

    index.update_item(&item).await.unwrap();
    index.update_item(&other).await.unwrap();
    index.delete_item(&item).await.unwrap();

    assert_eq!(harness.client.object_ids(&posts_index_name()).await, vec!["10-0"]);
}

#[tokio::test]
async fn test_failed_write_keeps_ledger_and_retry_converges() {
    let harness = Harness::new(vec![]);
    let index = harness.posts_index("post");

    index
        .update_item(&post_with_words(7, "post", 10).into())
        .await
        .unwrap();

    // The delete of the old fragments goes through, the upsert fails.
    harness.client.fail_writes_after(1).await;
    let shrunk: Item = post_with_words(7, "post", 4).into();
    let err = index.update_item(&shrunk).await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(harness.ledger.records_count("posts_post", 7).await.unwrap(), 5);

    harness.client.restore_writes().await;
    index.update_item(&shrunk).await.unwrap();

    assert_eq!(
        harness.client.object_ids(&posts_index_name()).await,
        vec!["7-0", "7-1"]
    );
    assert_eq!(harness.ledger.records_count("posts_post", 7).await.unwrap(), 2);
}

#[tokio::test]
async fn test_ledger_failure_surfaces() {
    let harness = Harness::new(vec![]);
    let index = harness.posts_index("post");
    harness.ledger.set_failing(true);

    let err = index
        .update_item(&post_with_words(1, "post", 2).into())
        .await
        .unwrap_err();

    assert!(matches!(err, IndexError::Store(_)));
}

#[tokio::test]
async fn test_unsupported_items_are_rejected_without_remote_calls() {
    let harness = Harness::new(vec![]);
    let index = harness.posts_index("post");
    let page: Item = post_with_words(1, "page", 2).into();
    let term: Item = Term::new(2, "category", "News", 1).into();

    for item in [&page, &term] {
        let err = index.update_item(item).await.unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedItem { .. }));
        let err = index.delete_item(item).await.unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedItem { .. }));
    }

    assert!(harness.client.operations().await.is_empty());
}

#[tokio::test]
async fn test_missing_client_is_reported() {
    let harness = Harness::new(vec![]);
    let index = index_sync_engine::index::UsersIndex::new(harness.source.clone());

    let err = index
        .update_item(&User::new(1, "Ada", 1).into())
        .await
        .unwrap_err();

    assert!(matches!(err, IndexError::ClientNotSet(id) if id == "users"));
}

#[tokio::test]
async fn test_records_without_object_id_are_rejected() {
    let harness = Harness::new(vec![]);
    let index = harness.users_index(10);
    let item: Item = User::new(1, "Ada", 1).into();

    let records = vec![Record::default().with("display_name", "Ada")];
    let err = index.update_records(&item, records).await.unwrap_err();

    assert!(matches!(err, IndexError::Mapping(_)));
    assert!(harness.client.operations().await.is_empty());
}

#[tokio::test]
async fn test_re_index_visits_every_item_once() {
    let harness = Harness::new(authors(25));
    let index = harness.users_index(10);

    assert_eq!(index.re_index_max_num_pages(10).await.unwrap(), 3);

    let mut flags = Vec::new();
    for page in 1..=3 {
        let progress = index.re_index(page).await.unwrap();
        assert_eq!(progress.page, page);
        assert_eq!(progress.total_pages, 3);
        flags.push(progress.finished);
    }

    assert_eq!(flags, vec![false, false, true]);
    let mut upserted = harness.upserted_ids().await;
    assert_eq!(upserted.len(), 25);
    upserted.sort();
    upserted.dedup();
    assert_eq!(upserted.len(), 25);
    assert_eq!(harness.client.object_ids(&users_index_name()).await.len(), 25);
}

#[tokio::test]
async fn test_re_index_pushes_settings_on_first_page_only() {
    let harness = Harness::new(authors(12));
    let index = harness.users_index(10);

    index.re_index(1).await.unwrap();
    let settings = harness.client.settings(&users_index_name()).await;
    assert_eq!(settings, Some(index.settings()));

    harness.client.clear_operations().await;
    index.re_index(2).await.unwrap();

    let operations = harness.client.operations().await;
    assert!(operations.iter().all(|operation| operation.is_object_write()));
    assert_eq!(operations.len(), 2);
}

#[tokio::test]
async fn test_empty_index_re_index_only_pushes_settings() {
    let harness = Harness::new(vec![]);
    let index = harness.users_index(10);

    assert_eq!(index.re_index_max_num_pages(10).await.unwrap(), 0);
    let progress = index.re_index(1).await.unwrap();

    assert_eq!(progress.total_pages, 0);
    assert!(progress.finished);
    assert_eq!(harness.object_writes().await, 0);
    assert!(harness.client.settings(&users_index_name()).await.is_some());
    assert!(!index.exists().await.unwrap());
}

#[tokio::test]
async fn test_re_index_page_zero_is_invalid() {
    let harness = Harness::new(authors(3));
    let index = harness.users_index(10);

    let err = index.re_index(0).await.unwrap_err();

    assert!(matches!(err, IndexError::InvalidPage(0)));
    assert!(harness.client.operations().await.is_empty());
}

#[tokio::test]
async fn test_re_index_past_the_end_fetches_nothing() {
    let harness = Harness::new(authors(5));
    let index = harness.users_index(10);

    let progress = index.re_index(4).await.unwrap();

    assert_eq!(progress.total_pages, 1);
    assert!(progress.finished);
    assert!(harness.client.operations().await.is_empty());
}

#[tokio::test]
async fn test_re_index_removes_items_that_no_longer_qualify() {
    let mut items = authors(3);
    items.push(User::new(4, "Former author", 0).into());
    let harness = Harness::new(items);
    let index = harness.users_index(10);
    harness
        .client
        .upsert(&users_index_name(), &Record::new("4").with("display_name", "Former author"))
        .await
        .unwrap();

    index.re_index(1).await.unwrap();

    assert_eq!(
        harness.client.object_ids(&users_index_name()).await,
        vec!["1", "2", "3"]
    );
}

#[tokio::test]
async fn test_items_added_mid_run_are_picked_up() {
    let harness = Harness::new(authors(20));
    let index = harness.users_index(10);

    let first = index.re_index(1).await.unwrap();
    assert_eq!(first.total_pages, 2);

    for id in 21..=25 {
        harness
            .source
            .upsert(User::new(id, format!("Author {}", id), 1).into())
            .await;
    }

    let mut page = 2;
    loop {
        let progress = index.re_index(page).await.unwrap();
        if progress.finished {
            break;
        }
        page += 1;
    }

    assert_eq!(page, 3);
    assert_eq!(harness.client.object_ids(&users_index_name()).await.len(), 25);
}

#[tokio::test]
async fn test_re_index_failure_aborts_page_and_replay_is_safe() {
    let harness = Harness::new(authors(10));
    let index = harness.users_index(10);

    // Settings and synonyms go through, then the fourth user fails.
    harness.client.fail_writes_after(5).await;
    let err = index.re_index(1).await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(harness.client.object_ids(&users_index_name()).await.len(), 3);

    harness.client.restore_writes().await;
    let progress = index.re_index(1).await.unwrap();

    assert!(progress.finished);
    assert_eq!(harness.client.object_ids(&users_index_name()).await.len(), 10);
}
