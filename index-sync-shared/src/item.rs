//! Domain items read from the content store.
//!
//! Items are owned by the store; indices only borrow them to decide
//! membership and to build records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The category of content an index holds.
///
/// Watchers use this tag to decide which store events are routed to which index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    /// Posts of any type (pages, attachments, custom types).
    Posts,
    /// Taxonomy terms.
    Terms,
    /// Users.
    Users,
}

impl ContentCategory {
    /// The lowercase tag used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Terms => "terms",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posts" => Ok(Self::Posts),
            "terms" => Ok(Self::Terms),
            "users" => Ok(Self::Users),
            other => Err(format!("Unknown content category: {}", other)),
        }
    }
}

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
    /// Attachments and revisions inherit the status of their parent post.
    Inherit,
    AutoDraft,
}

/// Author attributes denormalized onto every post record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub user_id: u64,
    pub display_name: String,
    #[serde(default)]
    pub user_url: String,
    #[serde(default)]
    pub user_login: String,
}

/// A term attached to a post, with its ancestors resolved root-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTerm {
    pub id: u64,
    pub name: String,
    /// Names of the parent terms, from the root down to the direct parent.
    #[serde(default)]
    pub ancestors: Vec<String>,
}

impl PostTerm {
    /// Create a top-level term.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ancestors: Vec::new(),
        }
    }

    /// Set the root-first ancestor names.
    pub fn with_ancestors<I, S>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ancestors = ancestors.into_iter().map(Into::into).collect();
        self
    }
}

/// The terms a post carries in one taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTaxonomy {
    pub taxonomy: String,
    #[serde(default)]
    pub hierarchical: bool,
    #[serde(default)]
    pub terms: Vec<PostTerm>,
}

/// One rendition of a post image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Extra attributes only attachments carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A post of any type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub post_type: String,
    /// Human readable name of the post type (e.g. "Pages").
    #[serde(default)]
    pub post_type_label: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    /// Raw HTML body.
    #[serde(default)]
    pub content: String,
    pub status: PostStatus,
    /// Status of the parent post, if this post has one.
    #[serde(default)]
    pub parent_status: Option<PostStatus>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub author: Option<PostAuthor>,
    #[serde(default)]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub menu_order: i64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub is_sticky: bool,
    #[serde(default)]
    pub taxonomies: Vec<PostTaxonomy>,
    #[serde(default)]
    pub images: BTreeMap<String, Image>,
    #[serde(default)]
    pub attachment: Option<AttachmentMeta>,
}

impl Post {
    /// Create a published post with the given body and every other field defaulted.
    pub fn new(
        id: u64,
        post_type: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            post_type: post_type.into(),
            post_type_label: String::new(),
            title: title.into(),
            excerpt: String::new(),
            content: content.into(),
            status: PostStatus::Publish,
            parent_status: None,
            password: None,
            author: None,
            date: DateTime::<Utc>::default(),
            modified: DateTime::<Utc>::default(),
            comment_count: 0,
            menu_order: 0,
            permalink: String::new(),
            mime_type: String::new(),
            is_sticky: false,
            taxonomies: Vec::new(),
            images: BTreeMap::new(),
            attachment: None,
        }
    }

    /// Set the publication status.
    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the post is protected by a non-empty password.
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// A taxonomy term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: u64,
    pub taxonomy: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Number of posts attached to the term.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub permalink: String,
}

impl Term {
    /// Create a term with the given post count.
    pub fn new(id: u64, taxonomy: impl Into<String>, name: impl Into<String>, count: u64) -> Self {
        let name = name.into();
        Self {
            id,
            taxonomy: taxonomy.into(),
            slug: name.to_lowercase().replace(' ', "-"),
            name,
            description: String::new(),
            count,
            permalink: String::new(),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub display_name: String,
    #[serde(default)]
    pub nicename: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posts_url: String,
    /// Number of published posts authored by the user.
    #[serde(default)]
    pub posts_count: u64,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    /// Create a user with the given number of authored posts.
    pub fn new(id: u64, display_name: impl Into<String>, posts_count: u64) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            nicename: String::new(),
            email: String::new(),
            description: String::new(),
            posts_url: String::new(),
            posts_count,
            avatar_url: None,
        }
    }
}

/// Any item the content store can hand to an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Post(Post),
    Term(Term),
    User(User),
}

impl Item {
    /// The content category this item belongs to.
    pub fn category(&self) -> ContentCategory {
        match self {
            Self::Post(_) => ContentCategory::Posts,
            Self::Term(_) => ContentCategory::Terms,
            Self::User(_) => ContentCategory::Users,
        }
    }

    /// The store identifier of the item.
    pub fn id(&self) -> u64 {
        match self {
            Self::Post(post) => post.id,
            Self::Term(term) => term.id,
            Self::User(user) => user.id,
        }
    }

    /// A short `kind:id` key used in logs and error messages.
    pub fn object_key(&self) -> String {
        match self {
            Self::Post(post) => format!("post:{}", post.id),
            Self::Term(term) => format!("term:{}", term.id),
            Self::User(user) => format!("user:{}", user.id),
        }
    }

    pub fn as_post(&self) -> Option<&Post> {
        match self {
            Self::Post(post) => Some(post),
            _ => None,
        }
    }

    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Self::Term(term) => Some(term),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }
}

impl From<Post> for Item {
    fn from(post: Post) -> Self {
        Self::Post(post)
    }
}

impl From<Term> for Item {
    fn from(term: Term) -> Self {
        Self::Term(term)
    }
}

impl From<User> for Item {
    fn from(user: User) -> Self {
        Self::User(user)
    }
}
