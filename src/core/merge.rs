//! Builders for the payloads sent to the destination instance.
//!
//! Overwrites are full replacements: the source payload is sent as-is with
//! only the destination identity fields transplanted onto it.

use crate::domain::model::{DataProduct, Dataset, Domain};
use std::collections::HashSet;

/// Identity fields a data product keeps when it is overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdentity {
    pub id: Option<String>,
    pub catalog_name: Option<String>,
    pub data_domain_id: Option<String>,
}

impl ProductIdentity {
    pub fn of(product: &DataProduct) -> Self {
        Self {
            id: product.id.clone(),
            catalog_name: product.catalog_name.clone(),
            data_domain_id: product.data_domain_id.clone(),
        }
    }
}

pub fn overwrite_domain(source: Domain, dest_id: Option<String>) -> Domain {
    Domain {
        id: dest_id,
        ..source
    }
}

/// Source domain ready to be created; ids are instance specific.
pub fn prepare_new_domain(source: Domain) -> Domain {
    Domain { id: None, ..source }
}

pub fn overwrite_product(source: DataProduct, identity: ProductIdentity) -> DataProduct {
    DataProduct {
        id: identity.id,
        catalog_name: identity.catalog_name,
        data_domain_id: identity.data_domain_id,
        ..source
    }
}

pub fn prepare_new_product(
    source: DataProduct,
    production_catalog: &str,
    dest_domain_id: Option<String>,
) -> DataProduct {
    DataProduct {
        id: None,
        catalog_name: Some(production_catalog.to_string()),
        data_domain_id: dest_domain_id,
        ..source
    }
}

/// Destination entries whose name is also in `src` are dropped, then `src` is appended.
pub fn merge_datasets(dest: Vec<Dataset>, src: &[Dataset]) -> Vec<Dataset> {
    let src_names: HashSet<&str> = src.iter().map(|dataset| dataset.name.as_str()).collect();

    dest.into_iter()
        .filter(|dataset| !src_names.contains(dataset.name.as_str()))
        .chain(src.iter().cloned())
        .collect()
}

/// Replaces the entry named like `dataset` in place, or appends it.
pub fn upsert_dataset(mut dest: Vec<Dataset>, dataset: Dataset) -> Vec<Dataset> {
    match dest.iter().position(|existing| existing.name == dataset.name) {
        Some(index) => {
            // index is the first match, later duplicates are dropped
            let mut position = 0;
            dest.retain(|existing| {
                let keep = position == index || existing.name != dataset.name;
                position += 1;
                keep
            });
            dest[index] = dataset;
        }
        None => dest.push(dataset),
    }
    dest
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(datasets: &[Dataset]) -> Vec<&str> {
        datasets.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_overwrite_domain_keeps_destination_id() {
        let mut source = Domain::new("finance");
        source.id = Some("src-1".to_string());
        source.description = Some("from source".to_string());

        let merged = overwrite_domain(source, Some("dest-9".to_string()));
        assert_eq!(merged.id.as_deref(), Some("dest-9"));
        assert_eq!(merged.description.as_deref(), Some("from source"));
    }

    #[test]
    fn test_overwrite_product_is_full_replace() {
        let mut source = DataProduct::new("sales");
        source.id = Some("src-id".to_string());
        source.catalog_name = Some("dev".to_string());
        source.views = vec![Dataset::new("v1", "SELECT 1")];

        let mut dest = DataProduct::new("sales");
        dest.id = Some("dest-id".to_string());
        dest.catalog_name = Some("prod".to_string());
        dest.data_domain_id = Some("dom-2".to_string());
        dest.summary = Some("destination only".to_string());
        dest.views = vec![Dataset::new("w1", "SELECT 2")];
        dest.extra.insert("owners".to_string(), json!([{"name": "bob"}]));

        let merged = overwrite_product(source, ProductIdentity::of(&dest));

        assert_eq!(merged.id.as_deref(), Some("dest-id"));
        assert_eq!(merged.catalog_name.as_deref(), Some("prod"));
        assert_eq!(merged.data_domain_id.as_deref(), Some("dom-2"));
        // destination-only fields are not carried over
        assert!(merged.summary.is_none());
        assert!(merged.extra.is_empty());
        assert_eq!(names(&merged.views), vec!["v1"]);
    }

    #[test]
    fn test_prepare_new_product() {
        let mut source = DataProduct::new("sales");
        source.id = Some("src-id".to_string());
        source.catalog_name = Some("dev".to_string());

        let created = prepare_new_product(source, "datamesh_prod", Some("dom-2".to_string()));
        assert!(created.id.is_none());
        assert_eq!(created.catalog_name.as_deref(), Some("datamesh_prod"));
        assert_eq!(created.data_domain_id.as_deref(), Some("dom-2"));
    }

    #[test]
    fn test_merge_datasets_source_wins_on_collision() {
        let dest = vec![Dataset::new("V", "SELECT 'dest'"), Dataset::new("W", "SELECT 'w'")];
        let src = vec![Dataset::new("V", "SELECT 'src'"), Dataset::new("X", "SELECT 'x'")];

        let merged = merge_datasets(dest, &src);

        assert_eq!(names(&merged), vec!["W", "V", "X"]);
        let v: Vec<&Dataset> = merged.iter().filter(|d| d.name == "V").collect();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].definition_query.as_deref(), Some("SELECT 'src'"));
        assert_eq!(merged[0].definition_query.as_deref(), Some("SELECT 'w'"));
    }

    #[test]
    fn test_merge_datasets_with_empty_source_keeps_destination() {
        let dest = vec![Dataset::new("W", "SELECT 1")];
        assert_eq!(merge_datasets(dest.clone(), &[]), dest);
    }

    #[test]
    fn test_upsert_dataset_replaces_by_name() {
        let dest = vec![
            Dataset::new("a", "SELECT 'a'"),
            Dataset::new("b", "SELECT 'old'"),
            Dataset::new("c", "SELECT 'c'"),
        ];

        let updated = upsert_dataset(dest, Dataset::new("b", "SELECT 'new'"));

        assert_eq!(names(&updated), vec!["a", "b", "c"]);
        assert_eq!(updated[1].definition_query.as_deref(), Some("SELECT 'new'"));
        assert_eq!(updated[0].definition_query.as_deref(), Some("SELECT 'a'"));
        assert_eq!(updated[2].definition_query.as_deref(), Some("SELECT 'c'"));
    }

    #[test]
    fn test_upsert_dataset_appends_when_absent() {
        let dest = vec![Dataset::new("a", "SELECT 'a'")];
        let updated = upsert_dataset(dest, Dataset::new("z", "SELECT 'z'"));
        assert_eq!(names(&updated), vec!["a", "z"]);
    }

    #[test]
    fn test_upsert_dataset_collapses_duplicate_names() {
        let dest = vec![
            Dataset::new("b", "SELECT 1"),
            Dataset::new("a", "SELECT 2"),
            Dataset::new("b", "SELECT 3"),
        ];
        let updated = upsert_dataset(dest, Dataset::new("b", "SELECT 'new'"));
        assert_eq!(names(&updated), vec!["b", "a"]);
        assert_eq!(updated[0].definition_query.as_deref(), Some("SELECT 'new'"));
    }
}
