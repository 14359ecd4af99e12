//! Start-up configuration.
//!
//! Settings come from environment variables (optionally seeded from a `.env`
//! file) and are read once into a [`SyncConfig`]. The post types and
//! taxonomies the registry builds indices for are derived from the content
//! export through [`SiteCatalog`].

mod dependencies;

pub use dependencies::Dependencies;

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use index_sync_engine::index::DEFAULT_BATCH_SIZE;
use index_sync_engine::mapper::DEFAULT_CONTENT_MAX_SIZE;
use index_sync_engine::registry::{
    DEFAULT_NAME_PREFIX, DEFAULT_POST_TYPES_BLACKLIST, DEFAULT_TAXONOMIES_BLACKLIST,
};
use index_sync_engine::{PostType, RegistryConfig};
use index_sync_shared::{Item, Synonym};
use url::Url;

use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default number of records per bulk request.
const DEFAULT_MAX_BULK_SIZE: usize = 1000;

/// Default content export location.
const DEFAULT_CONTENT_EXPORT_PATH: &str = "content-export.json";

/// Default records-count ledger location.
const DEFAULT_RECORDS_LEDGER_PATH: &str = "records-ledger.json";

/// Post types kept out of the searchable index unless configured otherwise.
const DEFAULT_SEARCH_EXCLUDED_POST_TYPES: [&str; 2] = ["revision", "nav_menu_item"];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = IndexingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(IndexingError::config(format!("Unknown LOG_FORMAT: {}", other))),
        }
    }
}

impl LogFormat {
    /// Read `LOG_FORMAT`, falling back to text on unknown values.
    pub fn from_env() -> Self {
        env::var("LOG_FORMAT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

/// Everything the synchronizer reads at start-up.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub opensearch_url: String,
    pub opensearch_credentials: Option<(String, String)>,
    pub max_bulk_size: usize,
    pub name_prefix: String,
    pub synced_indices_ids: Vec<String>,
    pub post_types_blacklist: Vec<String>,
    pub taxonomies_blacklist: Vec<String>,
    /// Explicit searchable post types; `None` keeps every type not excluded from search.
    pub searchable_post_types: Option<Vec<String>>,
    pub search_excluded_post_types: Vec<String>,
    pub batch_size: u64,
    pub split_posts: bool,
    pub content_max_size: usize,
    pub content_export_path: PathBuf,
    pub records_ledger_path: PathBuf,
    pub synonyms_path: Option<PathBuf>,
}

impl SyncConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USER` / `OPENSEARCH_PASSWORD`: optional basic auth
    /// - `OPENSEARCH_MAX_BULK_SIZE`: records per bulk request (default: 1000)
    /// - `INDEX_NAME_PREFIX`: prefix of every remote index name (default: wp_)
    /// - `SYNCED_INDICES_IDS`: comma separated enabled index ids (default: searchable_posts)
    /// - `POST_TYPES_BLACKLIST`: comma separated excluded post types (default: nav_menu_item; revision is always excluded)
    /// - `TAXONOMIES_BLACKLIST`: comma separated excluded taxonomies (default: nav_menu,link_category,post_format)
    /// - `SEARCHABLE_POST_TYPES`: comma separated post types for `searchable_posts`
    /// - `SEARCH_EXCLUDED_POST_TYPES`: post types excluded from search (default: revision,nav_menu_item)
    /// - `REINDEX_BATCH_SIZE`: items per re-index page (default: 50)
    /// - `SPLIT_POSTS`: split long posts into several records (default: true)
    /// - `CONTENT_MAX_SIZE`: bytes of content per record (default: 2000)
    /// - `CONTENT_EXPORT_PATH`: JSON content export (default: content-export.json)
    /// - `RECORDS_LEDGER_PATH`: JSON records-count ledger (default: records-ledger.json)
    /// - `SYNONYMS_PATH`: optional JSON map of index id to synonym rules
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let opensearch_url =
            var("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let opensearch_credentials = match (var("OPENSEARCH_USER"), lookup("OPENSEARCH_PASSWORD")) {
            (Some(user), Some(password)) => Some((user, password)),
            (Some(_), None) => {
                return Err(IndexingError::config(
                    "OPENSEARCH_USER is set but OPENSEARCH_PASSWORD is not",
                ))
            }
            _ => None,
        };

        let name_prefix = match lookup("INDEX_NAME_PREFIX") {
            Some(prefix) => prefix.trim().to_string(),
            None => DEFAULT_NAME_PREFIX.to_string(),
        };

        let config = Self {
            opensearch_url,
            opensearch_credentials,
            max_bulk_size: parse_var(&var, "OPENSEARCH_MAX_BULK_SIZE", DEFAULT_MAX_BULK_SIZE)?,
            name_prefix,
            synced_indices_ids: var("SYNCED_INDICES_IDS")
                .map(|value| split_list(&value))
                .unwrap_or_else(|| RegistryConfig::default().synced_indices_ids),
            post_types_blacklist: var("POST_TYPES_BLACKLIST")
                .map(|value| split_list(&value))
                .unwrap_or_else(|| to_strings(&DEFAULT_POST_TYPES_BLACKLIST)),
            taxonomies_blacklist: var("TAXONOMIES_BLACKLIST")
                .map(|value| split_list(&value))
                .unwrap_or_else(|| to_strings(&DEFAULT_TAXONOMIES_BLACKLIST)),
            searchable_post_types: var("SEARCHABLE_POST_TYPES").map(|value| split_list(&value)),
            search_excluded_post_types: var("SEARCH_EXCLUDED_POST_TYPES")
                .map(|value| split_list(&value))
                .unwrap_or_else(|| to_strings(&DEFAULT_SEARCH_EXCLUDED_POST_TYPES)),
            batch_size: parse_var(&var, "REINDEX_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            split_posts: parse_bool(&var, "SPLIT_POSTS", true)?,
            content_max_size: parse_var(&var, "CONTENT_MAX_SIZE", DEFAULT_CONTENT_MAX_SIZE)?,
            content_export_path: var("CONTENT_EXPORT_PATH")
                .unwrap_or_else(|| DEFAULT_CONTENT_EXPORT_PATH.to_string())
                .into(),
            records_ledger_path: var("RECORDS_LEDGER_PATH")
                .unwrap_or_else(|| DEFAULT_RECORDS_LEDGER_PATH.to_string())
                .into(),
            synonyms_path: var("SYNONYMS_PATH").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the registry or the remote client cannot work with.
    pub fn validate(&self) -> Result<(), IndexingError> {
        Url::parse(&self.opensearch_url).map_err(|e| {
            IndexingError::config(format!("Invalid OPENSEARCH_URL {}: {}", self.opensearch_url, e))
        })?;
        if self.name_prefix.is_empty() {
            return Err(IndexingError::config("INDEX_NAME_PREFIX must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(IndexingError::config("REINDEX_BATCH_SIZE must be greater than 0"));
        }
        if self.content_max_size == 0 {
            return Err(IndexingError::config("CONTENT_MAX_SIZE must be greater than 0"));
        }
        if self.max_bulk_size == 0 {
            return Err(IndexingError::config(
                "OPENSEARCH_MAX_BULK_SIZE must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Build the registry configuration for a site.
    pub fn registry_config(
        &self,
        catalog: SiteCatalog,
        synonyms: HashMap<String, Vec<Synonym>>,
    ) -> RegistryConfig {
        let post_types = catalog
            .post_types
            .into_iter()
            .map(|(name, label)| {
                let mut post_type = PostType::new(name.as_str());
                if let Some(label) = label {
                    post_type = post_type.with_label(label);
                }
                if self.search_excluded_post_types.contains(&name) {
                    post_type = post_type.excluded_from_search();
                }
                post_type
            })
            .collect();

        RegistryConfig {
            name_prefix: self.name_prefix.clone(),
            post_types,
            searchable_post_types: self.searchable_post_types.clone(),
            taxonomies: catalog.taxonomies,
            post_types_blacklist: self.post_types_blacklist.clone(),
            taxonomies_blacklist: self.taxonomies_blacklist.clone(),
            synced_indices_ids: self.synced_indices_ids.clone(),
            batch_size: self.batch_size,
            split_posts: self.split_posts,
            content_max_size: self.content_max_size,
            synonyms,
        }
    }
}

/// The post types and taxonomies present on a site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteCatalog {
    /// Post type name to its label, ordered by name.
    pub post_types: BTreeMap<String, Option<String>>,
    /// Taxonomy names, ordered and deduplicated.
    pub taxonomies: Vec<String>,
}

impl SiteCatalog {
    /// Collect the post types and taxonomies used by `items`.
    ///
    /// Taxonomies are taken from terms and from the terms attached to posts.
    pub fn from_items(items: &[Item]) -> Self {
        let mut post_types: BTreeMap<String, Option<String>> = BTreeMap::new();
        let mut taxonomies: Vec<String> = Vec::new();

        for item in items {
            match item {
                Item::Post(post) => {
                    let label = post_types.entry(post.post_type.clone()).or_default();
                    if label.is_none() && !post.post_type_label.is_empty() {
                        *label = Some(post.post_type_label.clone());
                    }
                    taxonomies.extend(post.taxonomies.iter().map(|t| t.taxonomy.clone()));
                }
                Item::Term(term) => taxonomies.push(term.taxonomy.clone()),
                Item::User(_) => {}
            }
        }

        taxonomies.sort();
        taxonomies.dedup();

        Self {
            post_types,
            taxonomies,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn parse_var<F, T>(var: &F, key: &str, default: T) -> Result<T, IndexingError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| IndexingError::config(format!("Invalid {} {}: {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_bool<F>(var: &F, key: &str, default: bool) -> Result<bool, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|raw| raw.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(IndexingError::config(format!("Invalid {}: {}", key, raw))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index_sync_shared::{Post, PostTaxonomy, Term, User};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.opensearch_url, "http://localhost:9200");
        assert_eq!(config.opensearch_credentials, None);
        assert_eq!(config.name_prefix, "wp_");
        assert_eq!(config.synced_indices_ids, vec!["searchable_posts"]);
        assert_eq!(config.post_types_blacklist, vec!["nav_menu_item"]);
        assert_eq!(config.taxonomies_blacklist, vec!["nav_menu", "link_category", "post_format"]);
        assert_eq!(config.batch_size, 50);
        assert!(config.split_posts);
        assert_eq!(config.content_max_size, 2000);
        assert_eq!(config.synonyms_path, None);
    }

    #[test]
    fn test_reads_lists_and_numbers() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("INDEX_NAME_PREFIX", "blog_"),
            ("SYNCED_INDICES_IDS", "posts_post, users,,terms_category"),
            ("POST_TYPES_BLACKLIST", "attachment"),
            ("REINDEX_BATCH_SIZE", "10"),
            ("SPLIT_POSTS", "no"),
            ("OPENSEARCH_USER", "admin"),
            ("OPENSEARCH_PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.name_prefix, "blog_");
        assert_eq!(config.synced_indices_ids, vec!["posts_post", "users", "terms_category"]);
        assert_eq!(config.post_types_blacklist, vec!["attachment"]);
        assert_eq!(config.batch_size, 10);
        assert!(!config.split_posts);
        assert_eq!(
            config.opensearch_credentials,
            Some(("admin".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        for vars in [
            vec![("INDEX_NAME_PREFIX", " ")],
            vec![("REINDEX_BATCH_SIZE", "0")],
            vec![("REINDEX_BATCH_SIZE", "ten")],
            vec![("CONTENT_MAX_SIZE", "0")],
            vec![("SPLIT_POSTS", "maybe")],
            vec![("OPENSEARCH_URL", "not a url")],
            vec![("OPENSEARCH_USER", "admin")],
        ] {
            let result = SyncConfig::from_lookup(lookup(&vars));
            assert!(
                matches!(result, Err(IndexingError::ConfigError(_))),
                "{:?} should be rejected",
                vars
            );
        }
    }

    #[test]
    fn test_log_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_catalog_from_items() {
        let mut post = Post::new(1, "post", "Hello", "");
        post.post_type_label = "Posts".to_string();
        post.taxonomies = vec![PostTaxonomy {
            taxonomy: "post_tag".to_string(),
            hierarchical: false,
            terms: vec![],
        }];
        let items: Vec<Item> = vec![
            Post::new(2, "page", "About", "").into(),
            post.into(),
            Term::new(3, "category", "News", 1).into(),
            Term::new(4, "category", "Sport", 1).into(),
            User::new(5, "Ada", 1).into(),
        ];

        let catalog = SiteCatalog::from_items(&items);

        assert_eq!(
            catalog.post_types.into_iter().collect::<Vec<_>>(),
            vec![
                ("page".to_string(), None),
                ("post".to_string(), Some("Posts".to_string())),
            ]
        );
        assert_eq!(catalog.taxonomies, vec!["category", "post_tag"]);
    }

    #[test]
    fn test_registry_config_marks_excluded_post_types() {
        let config = SyncConfig::from_lookup(lookup(&[("REINDEX_BATCH_SIZE", "5")])).unwrap();
        let items: Vec<Item> = vec![
            Post::new(1, "post", "Hello", "").into(),
            Post::new(2, "revision", "Hello", "").into(),
        ];

        let registry_config =
            config.registry_config(SiteCatalog::from_items(&items), HashMap::new());

        assert_eq!(registry_config.batch_size, 5);
        assert_eq!(registry_config.name_prefix, "wp_");
        let excluded: Vec<(&str, bool)> = registry_config
            .post_types
            .iter()
            .map(|t| (t.name.as_str(), t.exclude_from_search))
            .collect();
        assert_eq!(excluded, vec![("post", false), ("revision", true)]);
    }
}
