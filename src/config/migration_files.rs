use crate::utils::error::{DatameshError, Result};
use crate::utils::validation::{is_non_blank, unknown_keys};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub const STARBURST_FILE_SUFFIX: &str = ".starburst";

const DOCUMENT_KEYS: [&str; 3] = ["domainNameSrc", "domainNameDest", "dataProducts"];
const PRODUCT_KEYS: [&str; 3] = ["productSrcName", "productDestName", "datasets"];
const DATASET_KEYS: [&str; 3] = ["name", "type", "productDestName"];

/// One validated `.starburst` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MigrationDocument {
    pub domain_name_src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name_dest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_products: Option<Vec<ProductSpec>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductSpec {
    pub product_src_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_dest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasets: Option<Vec<DatasetSpec>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatasetSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_dest_name: Option<String>,
}

fn invalid_keys_message(prefix: &str, map: &Map<String, Value>, allowed: &[&str]) -> Option<String> {
    let unknown = unknown_keys(map, allowed);
    if unknown.is_empty() {
        None
    } else {
        let keys: Vec<&str> = unknown.into_iter().collect();
        Some(format!("{}: {}", prefix, keys.join(", ")))
    }
}

/// 驗證整份遷移設定，遇到第一個錯誤就停止
pub fn validate_document(data: &Value) -> Result<()> {
    let data = data
        .as_object()
        .ok_or_else(|| DatameshError::schema("<root>", "The file content must be a mapping"))?;

    if let Some(message) = invalid_keys_message("Invalid fields", data, &DOCUMENT_KEYS) {
        return Err(DatameshError::schema("<root>", message));
    }

    validate_domain_names(data)?;
    validate_data_products(data)
}

fn validate_domain_names(data: &Map<String, Value>) -> Result<()> {
    if !is_non_blank(data, "domainNameSrc") {
        return Err(DatameshError::schema(
            "domainNameSrc",
            "Please specify a non-empty domainNameSrc",
        ));
    }
    if data.contains_key("domainNameDest") && !is_non_blank(data, "domainNameDest") {
        return Err(DatameshError::schema(
            "domainNameDest",
            "Please fill 'domainNameDest'",
        ));
    }
    Ok(())
}

fn validate_data_products(data: &Map<String, Value>) -> Result<()> {
    let Some(products) = data.get("dataProducts") else {
        return Ok(());
    };

    if !is_non_blank(data, "domainNameDest") {
        return Err(DatameshError::schema(
            "domainNameDest",
            "Please fill 'domainNameDest'",
        ));
    }

    match products.as_array() {
        Some(products) if !products.is_empty() => products.iter().try_for_each(validate_product),
        _ => Err(DatameshError::schema(
            "dataProducts",
            "Cannot use dataProducts field without specifying at least one data product",
        )),
    }
}

fn validate_product(product: &Value) -> Result<()> {
    let product = product.as_object().ok_or_else(|| {
        DatameshError::schema("dataProducts", "Every data product must be a mapping")
    })?;

    if let Some(message) = invalid_keys_message("Invalid fields in product", product, &PRODUCT_KEYS)
    {
        return Err(DatameshError::schema("dataProducts", message));
    }
    if !is_non_blank(product, "productSrcName") || product.len() > PRODUCT_KEYS.len() {
        return Err(DatameshError::schema(
            "productSrcName",
            "Please fill 'productSrcName' field of your data products",
        ));
    }
    if product.contains_key("productDestName") && !is_non_blank(product, "productDestName") {
        return Err(DatameshError::schema(
            "productDestName",
            "Please fill 'productDestName' field of your data products",
        ));
    }
    if product.contains_key("datasets") {
        return validate_datasets(product);
    }
    Ok(())
}

fn validate_datasets(product: &Map<String, Value>) -> Result<()> {
    let datasets = match product.get("datasets").and_then(Value::as_array) {
        Some(datasets) if !datasets.is_empty() => datasets,
        _ => {
            return Err(DatameshError::schema(
                "datasets",
                "Cannot use field datasets without at least one dataset",
            ))
        }
    };

    let product_name = product
        .get("productSrcName")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if !is_non_blank(product, "productDestName") {
        return Err(DatameshError::schema(
            "productDestName",
            format!("Missing field 'productDestName' for product {}", product_name),
        ));
    }

    datasets
        .iter()
        .try_for_each(|dataset| validate_dataset(dataset, product_name))
}

fn validate_dataset(dataset: &Value, product_name: &str) -> Result<()> {
    let dataset = dataset
        .as_object()
        .ok_or_else(|| DatameshError::schema("datasets", "Every dataset must be a mapping"))?;

    if let Some(message) = invalid_keys_message("Invalid keys in dataset", dataset, &DATASET_KEYS) {
        return Err(DatameshError::schema("datasets", message));
    }
    if !is_non_blank(dataset, "name") {
        return Err(DatameshError::schema(
            "name",
            "Fields 'name' of datasets cannot be blank",
        ));
    }
    if !is_non_blank(dataset, "type") {
        return Err(DatameshError::schema(
            "type",
            "Fields 'type' of datasets cannot be blank",
        ));
    }
    if dataset.contains_key("productDestName") && !is_non_blank(dataset, "productDestName") {
        let dataset_name = dataset
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(DatameshError::schema(
            "productDestName",
            format!(
                "Field 'productDestName' of dataset '{}' from product '{}' cannot be blank",
                dataset_name, product_name
            ),
        ));
    }
    Ok(())
}

/// Parses file content as YAML, then as JSON when YAML fails.
pub fn parse_content(file_name: &str, content: &str) -> Result<Value> {
    match serde_yaml::from_str::<Value>(content) {
        Ok(value) => Ok(value),
        Err(yaml_err) => {
            tracing::info!("{} is not yaml format: {}", file_name, yaml_err);
            tracing::info!("Checking json formatting");
            serde_json::from_str(content).map_err(|json_err| {
                tracing::debug!("{} is not json either: {}", file_name, json_err);
                DatameshError::from(yaml_err)
            })
        }
    }
}

/// Parses and validates one file, returning the typed document.
pub fn load_document(file_name: &str, content: &str) -> Result<MigrationDocument> {
    let value = parse_content(file_name, content)?;
    tracing::info!("Checking validity of {}", file_name);
    validate_document(&value)?;
    Ok(serde_json::from_value(value)?)
}

/// 讀取目錄中所有 `.starburst` 檔案並回傳通過驗證的內容
///
/// Files are visited in directory listing order. A file that cannot be read,
/// parsed or validated is skipped; only an unreadable directory is an error.
pub fn read_starburst_files<P: AsRef<Path>>(directory: P) -> Result<Vec<MigrationDocument>> {
    let mut documents = Vec::new();

    for entry in std::fs::read_dir(directory.as_ref())? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(STARBURST_FILE_SUFFIX) {
            continue;
        }
        if !entry.path().is_file() {
            tracing::debug!("Skipping {} (not a regular file)", file_name);
            continue;
        }

        tracing::info!("Scanning {}", file_name);
        let content = match std::fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", file_name, e);
                continue;
            }
        };

        match load_document(&file_name, &content) {
            Ok(document) => {
                tracing::info!("✅ {} is valid", file_name);
                documents.push(document);
            }
            Err(e @ DatameshError::SchemaError { .. }) => {
                tracing::warn!("{}", e);
                tracing::warn!("❌ {} is invalid", file_name);
            }
            Err(e) => {
                tracing::warn!("{} is not json format: {}", file_name, e);
            }
        }
    }

    Ok(documents)
}
