//! Index configuration pushed to the search service before re-indexing.

use serde::{Deserialize, Serialize};

/// Ranking, faceting and snippet configuration of one remote index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    /// Attributes matched against the query, in priority order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub searchable_attributes: Vec<String>,
    /// Tie-breaking ranking rules, e.g. `desc(post_date)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_ranking: Vec<String>,
    /// Attribute used to collapse several records of the same item into one hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_for_distinct: Option<String>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes_for_faceting: Vec<String>,
    /// Snippeted attributes with their word budget, e.g. `content:30`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_snippet: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_ellipsis_text: Option<String>,
}

impl IndexSettings {
    /// Create settings with the given searchable attributes and custom ranking.
    pub fn new<A, R>(searchable_attributes: A, custom_ranking: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            searchable_attributes: searchable_attributes.into_iter().map(Into::into).collect(),
            custom_ranking: custom_ranking.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// A synonym rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Synonym {
    /// All words are interchangeable.
    #[serde(rename_all = "camelCase")]
    Synonym {
        #[serde(rename = "objectID")]
        object_id: String,
        synonyms: Vec<String>,
    },
    /// `input` also matches `synonyms`, but not the other way around.
    #[serde(rename_all = "camelCase")]
    OneWaySynonym {
        #[serde(rename = "objectID")]
        object_id: String,
        input: String,
        synonyms: Vec<String>,
    },
}

impl Synonym {
    pub fn object_id(&self) -> &str {
        match self {
            Self::Synonym { object_id, .. } | Self::OneWaySynonym { object_id, .. } => object_id,
        }
    }
}
