use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use index_sync::{
    list_indices, re_index, re_index_enabled, Dependencies, IndexingError, SyncConfig,
};
use index_sync_engine::IndexError;
use index_sync_repository::{InMemoryIndexClient, JsonFileLedger, RecordsCountLedger};

fn write_export(dir: &Path) {
    let post = |id: u64, status: &str| {
        json!({
            "kind": "post",
            "id": id,
            "post_type": "post",
            "post_type_label": "Posts",
            "title": format!("Post {}", id),
            "content": "<p>Hello world</p>",
            "status": status,
        })
    };
    let export = json!({
        "items": [
            post(1, "publish"),
            post(2, "publish"),
            post(3, "publish"),
            post(4, "draft"),
            {"kind": "term", "id": 10, "taxonomy": "category", "name": "News", "count": 3},
            {"kind": "term", "id": 11, "taxonomy": "category", "name": "Empty", "count": 0},
            {"kind": "user", "id": 20, "display_name": "Ada", "posts_count": 3},
        ]
    });
    std::fs::write(dir.join("export.json"), export.to_string()).unwrap();
}

fn config(dir: &Path, extra: &[(&str, String)]) -> SyncConfig {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert(
        "CONTENT_EXPORT_PATH".to_string(),
        dir.join("export.json").display().to_string(),
    );
    vars.insert(
        "RECORDS_LEDGER_PATH".to_string(),
        dir.join("ledger.json").display().to_string(),
    );
    vars.insert(
        "SYNCED_INDICES_IDS".to_string(),
        "searchable_posts,posts_post,terms_category".to_string(),
    );
    vars.insert("REINDEX_BATCH_SIZE".to_string(), "2".to_string());
    for (key, value) in extra {
        vars.insert(key.to_string(), value.clone());
    }

    SyncConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

async fn setup(extra: &[(&str, String)]) -> (TempDir, Arc<InMemoryIndexClient>, Dependencies) {
    let dir = tempfile::tempdir().unwrap();
    write_export(dir.path());
    let client = Arc::new(InMemoryIndexClient::new());
    let deps = Dependencies::with_client(&config(dir.path(), extra), client.clone())
        .await
        .unwrap();
    (dir, client, deps)
}

#[tokio::test]
async fn test_list_reports_every_index() {
    let (_dir, _client, deps) = setup(&[]).await;

    let statuses = list_indices(&deps.registry).await.unwrap();

    let summary: Vec<(&str, bool, bool)> = statuses
        .iter()
        .map(|s| (s.id.as_str(), s.enabled, s.exists))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("searchable_posts", true, false),
            ("posts_post", true, false),
            ("terms_category", true, false),
            ("users", false, false),
        ]
    );
    assert_eq!(statuses[1].index_name, "wp_posts_post");
    assert_eq!(statuses[1].admin_name, "Posts");
}

#[tokio::test]
async fn test_re_index_writes_records_and_ledger() {
    let (dir, client, deps) = setup(&[]).await;

    let progress = re_index(&deps.registry, "posts_post", 1).await.unwrap();

    assert_eq!(progress.total_pages, 2);
    assert!(progress.finished);
    assert_eq!(client.object_ids("wp_posts_post").await, vec!["1-0", "2-0", "3-0"]);

    let ledger = JsonFileLedger::open(dir.path().join("ledger.json")).await.unwrap();
    assert_eq!(ledger.records_count("posts_post", 2).await.unwrap(), 1);
    assert_eq!(ledger.records_count("posts_post", 4).await.unwrap(), 0);
}

#[tokio::test]
async fn test_re_index_resumes_from_page() {
    let (_dir, client, deps) = setup(&[]).await;

    let progress = re_index(&deps.registry, "posts_post", 2).await.unwrap();

    assert_eq!(progress.page, 2);
    assert!(progress.finished);
    assert_eq!(client.object_ids("wp_posts_post").await, vec!["3-0"]);
    assert!(client.settings("wp_posts_post").await.is_none());
}

#[tokio::test]
async fn test_re_index_enabled_covers_synced_indices() {
    let (_dir, client, deps) = setup(&[]).await;

    let done = re_index_enabled(&deps.registry).await.unwrap();

    let ids: Vec<&str> = done.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["searchable_posts", "posts_post", "terms_category"]);
    assert_eq!(client.object_ids("wp_searchable_posts").await.len(), 3);
    assert_eq!(client.object_ids("wp_terms_category").await, vec!["10"]);
    assert!(client.object_ids("wp_users").await.is_empty());

    let exists: Vec<bool> = list_indices(&deps.registry)
        .await
        .unwrap()
        .iter()
        .map(|s| s.exists)
        .collect();
    assert_eq!(exists, vec![true, true, true, false]);
}

#[tokio::test]
async fn test_synonyms_file_is_pushed_with_settings() {
    let dir = tempfile::tempdir().unwrap();
    let synonyms_path = dir.path().join("synonyms.json");
    std::fs::write(
        &synonyms_path,
        json!({
            "terms_category": [
                {"type": "synonym", "objectID": "news", "synonyms": ["news", "updates"]}
            ]
        })
        .to_string(),
    )
    .unwrap();
    write_export(dir.path());
    let client = Arc::new(InMemoryIndexClient::new());
    let config = config(
        dir.path(),
        &[("SYNONYMS_PATH", synonyms_path.display().to_string())],
    );
    let deps = Dependencies::with_client(&config, client.clone()).await.unwrap();

    re_index(&deps.registry, "terms_category", 1).await.unwrap();

    assert_eq!(client.synonyms("wp_terms_category").await.len(), 1);
}

#[tokio::test]
async fn test_unknown_index_is_reported() {
    let (_dir, _client, deps) = setup(&[]).await;

    let err = re_index(&deps.registry, "comments", 1).await.unwrap_err();

    assert!(matches!(
        err,
        IndexingError::Index(IndexError::UnknownIndex(id)) if id == "comments"
    ));
}

#[tokio::test]
async fn test_missing_export_fails_start_up() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(InMemoryIndexClient::new());

    let result = Dependencies::with_client(&config(dir.path(), &[]), client).await;

    assert!(matches!(result, Err(IndexingError::Store(_))));
}
