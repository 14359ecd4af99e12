//! Post fan-out: one post becomes one record per content fragment.

use serde_json::{json, Map, Value};

use super::content::{explode_content, prepare_content, DEFAULT_CONTENT_MAX_SIZE};
use super::taxonomy::taxonomy_attributes;
use index_sync_shared::{Post, Record};

/// How post content is split into records.
#[derive(Debug, Clone)]
pub struct PostRecordOptions {
    /// When false, only the first fragment of a post is kept.
    pub split_posts: bool,
    /// Maximum size in bytes of one fragment's `content`.
    pub content_max_size: usize,
}

impl Default for PostRecordOptions {
    fn default() -> Self {
        Self {
            split_posts: true,
            content_max_size: DEFAULT_CONTENT_MAX_SIZE,
        }
    }
}

/// The `objectID` of fragment `record_index` of post `post_id`.
///
/// Deleting a post rebuilds its previous ids from this format and the recorded
/// fragment count, so it must never change.
pub fn post_object_id(post_id: u64, record_index: u64) -> String {
    format!("{}-{}", post_id, record_index)
}

/// Attributes copied onto every fragment of `post`.
pub fn shared_attributes(post: &Post, post_type_label: &str) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert("post_id".into(), json!(post.id));
    attributes.insert("post_type".into(), json!(post.post_type));
    attributes.insert("post_type_label".into(), json!(post_type_label));
    attributes.insert("post_title".into(), json!(post.title));
    attributes.insert("post_excerpt".into(), json!(prepare_content(&post.excerpt)));
    attributes.insert("post_date".into(), json!(post.date.timestamp()));
    attributes.insert(
        "post_date_formatted".into(),
        json!(post.date.format("%B %-d, %Y").to_string()),
    );
    attributes.insert("post_modified".into(), json!(post.modified.timestamp()));
    attributes.insert("comment_count".into(), json!(post.comment_count));
    attributes.insert("menu_order".into(), json!(post.menu_order));

    if let Some(author) = &post.author {
        attributes.insert(
            "post_author".into(),
            json!({
                "user_id": author.user_id,
                "display_name": author.display_name,
                "user_url": author.user_url,
                "user_login": author.user_login,
            }),
        );
    }

    let images: Map<String, Value> = post
        .images
        .iter()
        .map(|(size, image)| {
            let value = json!({
                "url": image.url,
                "width": image.width,
                "height": image.height,
            });
            (size.clone(), value)
        })
        .collect();
    attributes.insert("images".into(), Value::Object(images));

    attributes.insert("permalink".into(), json!(post.permalink));
    attributes.insert("post_mime_type".into(), json!(post.mime_type));

    let (taxonomies, hierarchical) = taxonomy_attributes(&post.taxonomies);
    attributes.insert("taxonomies".into(), Value::Object(taxonomies));
    attributes.insert("taxonomies_hierarchical".into(), Value::Object(hierarchical));

    attributes.insert("is_sticky".into(), json!(u8::from(post.is_sticky)));

    if post.post_type == "attachment" {
        if let Some(attachment) = &post.attachment {
            attributes.insert("alt".into(), json!(attachment.alt));
            attributes.insert("metadata".into(), attachment.metadata.clone());
        }
    }

    attributes
}

/// Map `post` to its fragment records, in fragment order.
///
/// Always yields at least one record; an empty body gives one record with empty
/// `content`.
pub fn post_records(post: &Post, post_type_label: &str, options: &PostRecordOptions) -> Vec<Record> {
    let shared = shared_attributes(post, post_type_label);
    let content = prepare_content(&post.content);

    let mut parts = explode_content(&content, options.content_max_size);
    if !options.split_posts {
        parts.truncate(1);
    }

    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            let record_index = i as u64;
            let mut record = Record::from_map(shared.clone());
            record.set_object_id(post_object_id(post.id, record_index));
            record.insert("content", part);
            record.insert("record_index", record_index);
            record
        })
        .collect()
}
