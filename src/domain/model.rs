use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Reference to a data product as listed on its domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedDataProduct {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,
    #[serde(default)]
    pub assigned_data_products: Vec<AssignedDataProduct>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            schema_location: None,
            assigned_data_products: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// A view or materialized view exposed by a data product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_query: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, definition_query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            definition_query: Some(definition_query.into()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_domain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub views: Vec<Dataset>,
    #[serde(default)]
    pub materialized_views: Vec<Dataset>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataProduct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            catalog_name: None,
            data_domain_id: None,
            schema_name: None,
            summary: None,
            description: None,
            views: Vec::new(),
            materialized_views: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn datasets(&self, kind: DatasetKind) -> &[Dataset] {
        (kind.accessors().get)(self)
    }

    pub fn datasets_mut(&mut self, kind: DatasetKind) -> &mut Vec<Dataset> {
        (kind.accessors().get_mut)(self)
    }

    pub fn find_dataset(&self, kind: DatasetKind, name: &str) -> Option<&Dataset> {
        self.datasets(kind).iter().find(|dataset| dataset.name == name)
    }
}

/// Kind of dataset a data product can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    View,
    MaterializedView,
}

struct DatasetAccessors {
    get: fn(&DataProduct) -> &[Dataset],
    get_mut: fn(&mut DataProduct) -> &mut Vec<Dataset>,
}

fn views(product: &DataProduct) -> &[Dataset] {
    &product.views
}

fn views_mut(product: &mut DataProduct) -> &mut Vec<Dataset> {
    &mut product.views
}

fn materialized_views(product: &DataProduct) -> &[Dataset] {
    &product.materialized_views
}

fn materialized_views_mut(product: &mut DataProduct) -> &mut Vec<Dataset> {
    &mut product.materialized_views
}

static DATASET_ACCESSORS: [(DatasetKind, DatasetAccessors); 2] = [
    (
        DatasetKind::View,
        DatasetAccessors {
            get: views,
            get_mut: views_mut,
        },
    ),
    (
        DatasetKind::MaterializedView,
        DatasetAccessors {
            get: materialized_views,
            get_mut: materialized_views_mut,
        },
    ),
];

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::View, DatasetKind::MaterializedView];

    /// Name used for the `type` field of migration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::View => "view",
            DatasetKind::MaterializedView => "materializedView",
        }
    }

    /// Name of the collection holding this kind on a data product payload.
    pub fn collection_name(&self) -> &'static str {
        match self {
            DatasetKind::View => "views",
            DatasetKind::MaterializedView => "materializedViews",
        }
    }

    fn accessors(&self) -> &'static DatasetAccessors {
        &DATASET_ACCESSORS[*self as usize].1
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDatasetKind(pub String);

impl fmt::Display for UnknownDatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = DatasetKind::ALL.iter().map(DatasetKind::as_str).collect();
        write!(
            f,
            "unknown dataset type '{}' (expected one of: {})",
            self.0,
            known.join(", ")
        )
    }
}

impl std::error::Error for UnknownDatasetKind {}

impl FromStr for DatasetKind {
    type Err = UnknownDatasetKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        DatasetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == trimmed)
            .ok_or_else(|| UnknownDatasetKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_kind_from_str() {
        assert_eq!("view".parse::<DatasetKind>(), Ok(DatasetKind::View));
        assert_eq!(
            "materializedView".parse::<DatasetKind>(),
            Ok(DatasetKind::MaterializedView)
        );
        assert!("table".parse::<DatasetKind>().is_err());
        assert!("views".parse::<DatasetKind>().is_err());
    }

    #[test]
    fn test_accessor_table_is_indexed_by_kind() {
        for kind in DatasetKind::ALL {
            assert_eq!(DATASET_ACCESSORS[kind as usize].0, kind);
        }
    }

    #[test]
    fn test_datasets_accessor_selects_collection() {
        let mut product = DataProduct::new("sales");
        product.views.push(Dataset::new("v1", "SELECT 1"));
        product
            .datasets_mut(DatasetKind::MaterializedView)
            .push(Dataset::new("mv1", "SELECT 2"));

        assert_eq!(product.datasets(DatasetKind::View).len(), 1);
        assert_eq!(product.materialized_views[0].name, "mv1");
        assert!(product.find_dataset(DatasetKind::View, "mv1").is_none());
        assert!(product.find_dataset(DatasetKind::MaterializedView, "mv1").is_some());
    }

    #[test]
    fn test_data_product_preserves_unknown_fields() {
        let payload = json!({
            "id": "p-1",
            "name": "sales",
            "catalogName": "hive",
            "dataDomainId": "d-1",
            "views": [{"name": "v1", "definitionQuery": "SELECT 1", "columns": [{"name": "a"}]}],
            "owners": [{"name": "alice"}]
        });

        let product: DataProduct = serde_json::from_value(payload).unwrap();
        assert_eq!(product.catalog_name.as_deref(), Some("hive"));
        assert!(product.materialized_views.is_empty());
        assert!(product.extra.contains_key("owners"));
        assert!(product.views[0].extra.contains_key("columns"));

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["owners"][0]["name"], "alice");
        assert_eq!(back["views"][0]["columns"][0]["name"], "a");
    }
}
