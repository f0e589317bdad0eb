use crate::config::migration_files::{DatasetSpec, MigrationDocument, ProductSpec};

/// Source and destination domain names of one migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPair {
    pub src: String,
    pub dest: String,
}

impl DomainPair {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }

    /// Destination defaults to the source name when the document omits it.
    pub fn resolve(document: &MigrationDocument) -> Self {
        let dest = document
            .domain_name_dest
            .clone()
            .unwrap_or_else(|| document.domain_name_src.clone());
        Self::new(document.domain_name_src.clone(), dest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPair {
    pub src: String,
    pub dest: String,
}

impl ProductPair {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }

    /// Destination defaults to the source name when the product entry omits it.
    pub fn resolve(product: &ProductSpec) -> Self {
        let dest = product
            .product_dest_name
            .clone()
            .unwrap_or_else(|| product.product_src_name.clone());
        Self::new(product.product_src_name.clone(), dest)
    }
}

/// Everything needed to copy one dataset between two data products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetMigrant {
    pub name: String,
    pub kind: String,
    pub product_src: String,
    pub product_dest: String,
    pub domain_src: String,
    pub domain_dest: String,
}

impl DatasetMigrant {
    pub fn new(dataset: &DatasetSpec, products: &ProductPair, domains: &DomainPair) -> Self {
        Self {
            name: dataset.name.clone(),
            kind: dataset.kind.clone(),
            product_src: products.src.clone(),
            product_dest: dataset
                .product_dest_name
                .clone()
                .unwrap_or_else(|| products.dest.clone()),
            domain_src: domains.src.clone(),
            domain_dest: domains.dest.clone(),
        }
    }

    pub fn domains(&self) -> DomainPair {
        DomainPair::new(self.domain_src.clone(), self.domain_dest.clone())
    }

    pub fn products(&self) -> ProductPair {
        ProductPair::new(self.product_src.clone(), self.product_dest.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_pair_defaults_to_source() {
        let document = MigrationDocument {
            domain_name_src: "finance".to_string(),
            domain_name_dest: None,
            data_products: None,
        };
        assert_eq!(DomainPair::resolve(&document), DomainPair::new("finance", "finance"));
        // the parsed document is left untouched
        assert!(document.domain_name_dest.is_none());
    }

    #[test]
    fn test_dataset_migrant_uses_dataset_override() {
        let products = ProductPair::new("p1", "p1b");
        let domains = DomainPair::new("finance", "finance_prod");

        let inherited = DatasetSpec {
            name: "v1".to_string(),
            kind: "view".to_string(),
            product_dest_name: None,
        };
        let migrant = DatasetMigrant::new(&inherited, &products, &domains);
        assert_eq!(migrant.product_dest, "p1b");
        assert_eq!(migrant.domain_dest, "finance_prod");

        let overridden = DatasetSpec {
            product_dest_name: Some("p9".to_string()),
            ..inherited
        };
        let migrant = DatasetMigrant::new(&overridden, &products, &domains);
        assert_eq!(migrant.product_src, "p1");
        assert_eq!(migrant.product_dest, "p9");
    }
}
