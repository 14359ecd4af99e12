//! Record mapping: turning domain items into flat search records.

pub mod content;
pub mod post_records;
pub mod taxonomy;

pub use content::{explode_content, prepare_content, CONTINUATION_PREFIX, DEFAULT_CONTENT_MAX_SIZE};
pub use post_records::{post_object_id, post_records, shared_attributes, PostRecordOptions};
pub use taxonomy::{taxonomy_attributes, taxonomy_tree, LEVEL_SEPARATOR};
