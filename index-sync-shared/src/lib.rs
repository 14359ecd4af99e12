//! # Index Sync Shared
//!
//! Domain types shared by every crate of the content index synchronizer:
//! the items read from the content store, the flat records pushed to the
//! search service, and the per-index configuration documents.

pub mod item;
pub mod record;
pub mod settings;

pub use item::{
    AttachmentMeta, ContentCategory, Image, Item, Post, PostAuthor, PostStatus, PostTerm,
    PostTaxonomy, Term, User,
};
pub use record::{Record, OBJECT_ID_KEY};
pub use settings::{IndexSettings, Synonym};
