//! Query types shared by item sources.

use index_sync_shared::{ContentCategory, Item};

/// Which items an index reads from the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilter {
    /// Posts of any of the listed types, whatever their status.
    Posts { post_types: Vec<String> },
    /// Terms of one taxonomy, including empty ones.
    Terms { taxonomy: String },
    /// Every user.
    Users,
}

impl ItemFilter {
    /// Filter posts of a single type.
    pub fn post_type(post_type: impl Into<String>) -> Self {
        Self::Posts {
            post_types: vec![post_type.into()],
        }
    }

    /// Filter terms of a taxonomy.
    pub fn taxonomy(taxonomy: impl Into<String>) -> Self {
        Self::Terms {
            taxonomy: taxonomy.into(),
        }
    }

    /// The content category the filter selects from.
    pub fn category(&self) -> ContentCategory {
        match self {
            Self::Posts { .. } => ContentCategory::Posts,
            Self::Terms { .. } => ContentCategory::Terms,
            Self::Users => ContentCategory::Users,
        }
    }

    /// Whether `item` is selected by the filter.
    pub fn matches(&self, item: &Item) -> bool {
        match (self, item) {
            (Self::Posts { post_types }, Item::Post(post)) => {
                post_types.iter().any(|t| *t == post.post_type)
            }
            (Self::Terms { taxonomy }, Item::Term(term)) => *taxonomy == term.taxonomy,
            (Self::Users, Item::User(_)) => true,
            _ => false,
        }
    }
}
