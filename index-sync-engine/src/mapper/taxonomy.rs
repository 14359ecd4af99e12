//! Taxonomy attributes of post records.

use serde_json::{Map, Value};

use index_sync_shared::{PostTaxonomy, PostTerm};

/// Separator between the levels of a hierarchical facet value.
pub const LEVEL_SEPARATOR: &str = " > ";

/// Build the hierarchical facet values of a set of terms.
///
/// Every term contributes its full path, one entry per depth:
/// `lvl0: ["Food"]`, `lvl1: ["Food > Fruit"]`, ... Values are deduplicated
/// while keeping first-seen order.
pub fn taxonomy_tree(terms: &[PostTerm]) -> Map<String, Value> {
    let mut levels: Vec<Vec<String>> = Vec::new();

    for term in terms {
        let mut path = String::new();
        let names = term.ancestors.iter().chain(std::iter::once(&term.name));
        for (depth, name) in names.enumerate() {
            path.push_str(name);
            if levels.len() <= depth {
                levels.push(Vec::new());
            }
            if !levels[depth].contains(&path) {
                levels[depth].push(path.clone());
            }
            path.push_str(LEVEL_SEPARATOR);
        }
    }

    levels
        .into_iter()
        .enumerate()
        .map(|(depth, values)| {
            let values = values.into_iter().map(Value::String).collect();
            (format!("lvl{}", depth), Value::Array(values))
        })
        .collect()
}

/// Build the flat (`taxonomies`) and hierarchical (`taxonomies_hierarchical`) attributes.
///
/// Taxonomies without terms are left out of both maps.
pub fn taxonomy_attributes(taxonomies: &[PostTaxonomy]) -> (Map<String, Value>, Map<String, Value>) {
    let mut flat = Map::new();
    let mut hierarchical = Map::new();

    for taxonomy in taxonomies {
        if taxonomy.terms.is_empty() {
            continue;
        }

        if taxonomy.hierarchical {
            let tree = taxonomy_tree(&taxonomy.terms);
            if !tree.is_empty() {
                hierarchical.insert(taxonomy.taxonomy.clone(), Value::Object(tree));
            }
        }

        let names = taxonomy
            .terms
            .iter()
            .map(|term| Value::String(term.name.clone()))
            .collect();
        flat.insert(taxonomy.taxonomy.clone(), Value::Array(names));
    }

    (flat, hierarchical)
}
