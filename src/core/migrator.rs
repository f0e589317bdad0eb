use crate::config::migration_files::{read_starburst_files, MigrationDocument, ProductSpec};
use crate::core::merge::{
    merge_datasets, overwrite_domain, overwrite_product, prepare_new_domain, prepare_new_product,
    upsert_dataset, ProductIdentity,
};
use crate::core::migrant::{DatasetMigrant, DomainPair, ProductPair};
use crate::core::outcome::{MigrationOutcome, MigrationReport};
use crate::domain::model::{DataProduct, DatasetKind, Domain};
use crate::domain::ports::CatalogClient;
use crate::utils::error::{DatameshError, Result};
use std::collections::HashMap;
use std::path::Path;

const MIGRATE_DOMAIN: &str = "migrate_domain";
const MIGRATE_PRODUCT: &str = "migrate_product";
const MIGRATE_ALL_PRODUCT_DATASETS: &str = "migrate_all_product_datasets";
const MIGRATE_DATASET: &str = "migrate_dataset";
const MIGRATE_ALL_DOMAIN_PRODUCTS: &str = "migrate_all_domain_products";

/// Copies data mesh entities from a source catalog instance to a destination one.
///
/// Every operation checks that the entities it needs exist before writing and
/// reports a missing one as a `NotFound` outcome. Errors are only returned
/// when a client call fails.
pub struct DatameshMigrator<S: CatalogClient, D: CatalogClient> {
    source: S,
    destination: D,
    production_catalog: String,
}

async fn lookup_domain<C: CatalogClient>(
    client: &C,
    side: &str,
    domain_name: &str,
) -> Result<Option<Domain>> {
    tracing::info!(
        "Checking if domain {} exists at {} instance ({})",
        domain_name,
        side,
        client.host()
    );
    let domain = client.get_domain_by_name(domain_name).await?;
    if domain.is_some() {
        tracing::info!("Domain {} exists at {} instance", domain_name, side);
    }
    Ok(domain)
}

async fn lookup_product<C: CatalogClient>(
    client: &C,
    side: &str,
    domain_name: &str,
    product_name: &str,
) -> Result<Option<DataProduct>> {
    tracing::info!(
        "Checking if domain {} has product {} at {} instance ({})",
        domain_name,
        product_name,
        side,
        client.host()
    );
    let product = client.get_data_product(domain_name, product_name).await?;
    if product.is_some() {
        tracing::info!("Domain {} has product {}", domain_name, product_name);
    }
    Ok(product)
}

fn missing_domain(operation: &'static str, side: &str, domain_name: &str) -> MigrationOutcome {
    let outcome = MigrationOutcome::not_found(
        operation,
        format!("Domain {} does not exist at the {} instance", domain_name, side),
    );
    tracing::warn!("{}", outcome.detail);
    outcome
}

fn missing_product(
    operation: &'static str,
    side: &str,
    domain_name: &str,
    product_name: &str,
) -> MigrationOutcome {
    let outcome = MigrationOutcome::not_found(
        operation,
        format!(
            "Domain {} has no product {} at the {} instance",
            domain_name, product_name, side
        ),
    );
    tracing::warn!("{}", outcome.detail);
    outcome
}

fn record(report: &mut MigrationReport, operation: &'static str, result: Result<MigrationOutcome>) {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("❌ {} failed: {}", operation, e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            MigrationOutcome::failed(operation, e.to_string())
        }
    };
    report.push(outcome);
}

fn log_product_failure(product_name: &str, error: &DatameshError) {
    tracing::error!("❌ Product {} could not be migrated: {}", product_name, error);
    tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());
}

/// Entities found by a lookup chain, or the outcome describing the first missing one.
enum Resolved<T> {
    Found(T),
    Missing(MigrationOutcome),
}

impl<S: CatalogClient, D: CatalogClient> DatameshMigrator<S, D> {
    pub fn new(source: S, destination: D, production_catalog: impl Into<String>) -> Self {
        Self {
            source,
            destination,
            production_catalog: production_catalog.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    pub fn production_catalog(&self) -> &str {
        &self.production_catalog
    }

    async fn resolve_domains(
        &self,
        operation: &'static str,
        domains: &DomainPair,
    ) -> Result<Resolved<(Domain, Domain)>> {
        let Some(domain_src) = lookup_domain(&self.source, "source", &domains.src).await? else {
            return Ok(Resolved::Missing(missing_domain(
                operation,
                "source",
                &domains.src,
            )));
        };
        let Some(domain_dest) =
            lookup_domain(&self.destination, "destination", &domains.dest).await?
        else {
            return Ok(Resolved::Missing(missing_domain(
                operation,
                "destination",
                &domains.dest,
            )));
        };
        Ok(Resolved::Found((domain_src, domain_dest)))
    }

    async fn resolve_products(
        &self,
        operation: &'static str,
        domains: &DomainPair,
        products: &ProductPair,
    ) -> Result<Resolved<(DataProduct, DataProduct)>> {
        if let Resolved::Missing(outcome) = self.resolve_domains(operation, domains).await? {
            return Ok(Resolved::Missing(outcome));
        }

        let Some(product_src) =
            lookup_product(&self.source, "source", &domains.src, &products.src).await?
        else {
            return Ok(Resolved::Missing(missing_product(
                operation,
                "source",
                &domains.src,
                &products.src,
            )));
        };
        let Some(product_dest) =
            lookup_product(&self.destination, "destination", &domains.dest, &products.dest)
                .await?
        else {
            return Ok(Resolved::Missing(missing_product(
                operation,
                "destination",
                &domains.dest,
                &products.dest,
            )));
        };
        Ok(Resolved::Found((product_src, product_dest)))
    }

    /// Creates the domain on the destination, or overwrites it keeping the destination id.
    pub async fn migrate_domain(&self, domain_name: &str) -> Result<MigrationOutcome> {
        let Some(domain_src) = lookup_domain(&self.source, "source", domain_name).await? else {
            return Ok(missing_domain(MIGRATE_DOMAIN, "source", domain_name));
        };

        match lookup_domain(&self.destination, "destination", domain_name).await? {
            None => {
                tracing::info!(
                    "Domain {} does not exist at the destination instance. Creating domain.",
                    domain_name
                );
                self.destination
                    .create_domain(&prepare_new_domain(domain_src))
                    .await?;
                Ok(MigrationOutcome::success(
                    MIGRATE_DOMAIN,
                    format!("Domain {} created at destination", domain_name),
                ))
            }
            Some(domain_dest) => {
                tracing::info!(
                    "Domain {} exists at the destination instance. Updating domain.",
                    domain_name
                );
                self.destination
                    .update_domain(&overwrite_domain(domain_src, domain_dest.id))
                    .await?;
                Ok(MigrationOutcome::success(
                    MIGRATE_DOMAIN,
                    format!("Domain {} updated at destination", domain_name),
                ))
            }
        }
    }

    /// Creates or fully overwrites one data product in the destination domain.
    pub async fn migrate_product(
        &self,
        domains: &DomainPair,
        product_name: &str,
    ) -> Result<MigrationOutcome> {
        // only the destination domain id is kept once both domains exist
        let dest_domain_id = match self.resolve_domains(MIGRATE_PRODUCT, domains).await? {
            Resolved::Found((_, domain_dest)) => domain_dest.id,
            Resolved::Missing(outcome) => return Ok(outcome),
        };

        let Some(product_src) =
            lookup_product(&self.source, "source", &domains.src, product_name).await?
        else {
            return Ok(missing_product(
                MIGRATE_PRODUCT,
                "source",
                &domains.src,
                product_name,
            ));
        };

        match lookup_product(&self.destination, "destination", &domains.dest, product_name)
            .await?
        {
            Some(product_dest) => {
                tracing::info!(
                    "Domain {} has product {}, existing datasets will be overwritten",
                    domains.dest,
                    product_name
                );
                let payload = overwrite_product(product_src, ProductIdentity::of(&product_dest));
                self.destination.update_data_product(&payload).await?;
                Ok(MigrationOutcome::success(
                    MIGRATE_PRODUCT,
                    format!("Product {} updated in domain {}", product_name, domains.dest),
                ))
            }
            None => {
                tracing::info!(
                    "Domain {} has not product {}, it will be created",
                    domains.dest,
                    product_name
                );
                let payload =
                    prepare_new_product(product_src, &self.production_catalog, dest_domain_id);
                self.destination.create_data_product(&payload).await?;
                Ok(MigrationOutcome::success(
                    MIGRATE_PRODUCT,
                    format!("Product {} created in domain {}", product_name, domains.dest),
                ))
            }
        }
    }

    /// Copies every view and materialized view of a source product into an
    /// existing destination product. Source datasets win on name collisions.
    pub async fn migrate_all_product_datasets(
        &self,
        domains: &DomainPair,
        products: &ProductPair,
    ) -> Result<MigrationOutcome> {
        let (product_src, mut product_dest) = match self
            .resolve_products(MIGRATE_ALL_PRODUCT_DATASETS, domains, products)
            .await?
        {
            Resolved::Found(pair) => pair,
            Resolved::Missing(outcome) => return Ok(outcome),
        };

        let mut migrated = Vec::new();
        for kind in DatasetKind::ALL {
            let src = product_src.datasets(kind);
            tracing::debug!(
                "Merging {} {} into {}",
                src.len(),
                kind.collection_name(),
                products.dest
            );
            migrated.extend(src.iter().map(|dataset| dataset.name.clone()));

            let dest = std::mem::take(product_dest.datasets_mut(kind));
            *product_dest.datasets_mut(kind) = merge_datasets(dest, src);
        }

        let status = self.destination.update_data_product(&product_dest).await?;
        tracing::debug!("update_data_product returned {}", status);
        tracing::info!(
            "✅ Migrated datasets from {} to {}: {}",
            products.src,
            products.dest,
            migrated.join(", ")
        );

        Ok(MigrationOutcome::success(
            MIGRATE_ALL_PRODUCT_DATASETS,
            format!(
                "Migrated {} datasets from {}/{} to {}/{}: {}",
                migrated.len(),
                domains.src,
                products.src,
                domains.dest,
                products.dest,
                migrated.join(", ")
            ),
        ))
    }

    /// Copies one named dataset into the destination product, replacing a
    /// same-named entry or appending it.
    pub async fn migrate_dataset(&self, migrant: &DatasetMigrant) -> Result<MigrationOutcome> {
        let kind = match migrant.kind.parse::<DatasetKind>() {
            Ok(kind) => kind,
            Err(e) => {
                tracing::warn!("Dataset {}: {}", migrant.name, e);
                return Ok(MigrationOutcome::validation_error(
                    MIGRATE_DATASET,
                    format!("Dataset {}: {}", migrant.name, e),
                ));
            }
        };

        let (product_src, mut product_dest) = match self
            .resolve_products(MIGRATE_DATASET, &migrant.domains(), &migrant.products())
            .await?
        {
            Resolved::Found(pair) => pair,
            Resolved::Missing(outcome) => return Ok(outcome),
        };

        tracing::info!("Checking if dataset {} exists", migrant.name);
        let Some(dataset) = product_src.find_dataset(kind, &migrant.name).cloned() else {
            tracing::warn!("Dataset {} not found", migrant.name);
            return Ok(MigrationOutcome::not_found(
                MIGRATE_DATASET,
                format!(
                    "Dataset {} ({}) not found in product {} of domain {}",
                    migrant.name, kind, migrant.product_src, migrant.domain_src
                ),
            ));
        };

        tracing::info!(
            "Dataset {} exists, it will be written to {} of {}",
            migrant.name,
            kind.collection_name(),
            migrant.product_dest
        );
        let dest = std::mem::take(product_dest.datasets_mut(kind));
        *product_dest.datasets_mut(kind) = upsert_dataset(dest, dataset);
        self.destination.update_data_product(&product_dest).await?;

        Ok(MigrationOutcome::success(
            MIGRATE_DATASET,
            format!(
                "Dataset {} ({}) migrated to product {} of domain {}",
                migrant.name, kind, migrant.product_dest, migrant.domain_dest
            ),
        ))
    }

    /// Creates or overwrites at the destination every product assigned to the source domain.
    pub async fn migrate_all_domain_products(
        &self,
        domains: &DomainPair,
    ) -> Result<MigrationOutcome> {
        let (product_names, dest_domain_id, dest_products) =
            match self.resolve_domains(MIGRATE_ALL_DOMAIN_PRODUCTS, domains).await? {
                Resolved::Found((domain_src, domain_dest)) => {
                    let names: Vec<String> = domain_src
                        .assigned_data_products
                        .into_iter()
                        .map(|product| product.name)
                        .collect();
                    let index: HashMap<String, String> = domain_dest
                        .assigned_data_products
                        .into_iter()
                        .map(|product| (product.name, product.id))
                        .collect();
                    (names, domain_dest.id, index)
                }
                Resolved::Missing(outcome) => return Ok(outcome),
            };

        let mut created = Vec::new();
        let mut updated = Vec::new();
        let mut missing = Vec::new();
        let mut failed = Vec::new();

        for product_name in product_names {
            let product =
                match lookup_product(&self.source, "source", &domains.src, &product_name).await {
                    Ok(Some(product)) => product,
                    Ok(None) => {
                        tracing::warn!(
                            "Product {} is listed on domain {} but could not be fetched",
                            product_name,
                            domains.src
                        );
                        missing.push(product_name);
                        continue;
                    }
                    Err(e) => {
                        log_product_failure(&product_name, &e);
                        failed.push(product_name);
                        continue;
                    }
                };

            let mut payload =
                prepare_new_product(product, &self.production_catalog, dest_domain_id.clone());

            // 目的端已有同名產品時沿用其 id 覆寫
            let existing_id = dest_products.get(&product_name).cloned();
            let is_update = existing_id.is_some();
            let write = match existing_id {
                Some(dest_id) => {
                    payload.id = Some(dest_id);
                    self.destination
                        .update_data_product(&payload)
                        .await
                        .map(|_| ())
                }
                None => self.destination.create_data_product(&payload).await,
            };

            match write {
                Ok(()) if is_update => {
                    tracing::info!("Product {} updated in domain {}", product_name, domains.dest);
                    updated.push(product_name);
                }
                Ok(()) => {
                    tracing::info!("Product {} created in domain {}", product_name, domains.dest);
                    created.push(product_name);
                }
                Err(e) => {
                    log_product_failure(&product_name, &e);
                    failed.push(product_name);
                }
            }
        }

        let mut detail = format!(
            "Domain {} to {}: {} created, {} updated",
            domains.src,
            domains.dest,
            created.len(),
            updated.len()
        );
        for (label, names) in [
            ("created", &created),
            ("updated", &updated),
            ("not found at source", &missing),
            ("failed", &failed),
        ] {
            if !names.is_empty() {
                detail.push_str(&format!("; {}: {}", label, names.join(", ")));
            }
        }

        let outcome = if !failed.is_empty() {
            MigrationOutcome::failed(MIGRATE_ALL_DOMAIN_PRODUCTS, detail)
        } else if !missing.is_empty() {
            MigrationOutcome::not_found(MIGRATE_ALL_DOMAIN_PRODUCTS, detail)
        } else {
            MigrationOutcome::success(MIGRATE_ALL_DOMAIN_PRODUCTS, detail)
        };
        Ok(outcome)
    }

    /// Runs every migration declared by the valid `.starburst` files of `directory`.
    pub async fn migrate_from_starburst_files<P: AsRef<Path>>(
        &self,
        directory: P,
    ) -> Result<MigrationReport> {
        let documents = read_starburst_files(directory)?;
        let mut report = MigrationReport::default();

        if documents.is_empty() {
            tracing::warn!("No valid Starburst files found in the directory.");
            return Ok(report);
        }

        report.documents = documents.len();
        for document in &documents {
            self.process_document(document, &mut report).await;
        }

        tracing::info!("📊 {}", report.summary());
        Ok(report)
    }

    async fn process_document(&self, document: &MigrationDocument, report: &mut MigrationReport) {
        let domains = DomainPair::resolve(document);

        if document.domain_name_dest.is_none() {
            record(report, MIGRATE_DOMAIN, self.migrate_domain(&domains.src).await);
        }

        match &document.data_products {
            None => record(
                report,
                MIGRATE_ALL_DOMAIN_PRODUCTS,
                self.migrate_all_domain_products(&domains).await,
            ),
            Some(products) => {
                for product in products {
                    self.process_product(&domains, product, report).await;
                }
            }
        }
    }

    async fn process_product(
        &self,
        domains: &DomainPair,
        product: &ProductSpec,
        report: &mut MigrationReport,
    ) {
        let products = ProductPair::resolve(product);

        match (&product.datasets, &product.product_dest_name) {
            (None, Some(_)) => record(
                report,
                MIGRATE_ALL_PRODUCT_DATASETS,
                self.migrate_all_product_datasets(domains, &products).await,
            ),
            (None, None) => record(
                report,
                MIGRATE_PRODUCT,
                self.migrate_product(domains, &product.product_src_name)
                    .await,
            ),
            (Some(datasets), _) => {
                for dataset in datasets {
                    let migrant = DatasetMigrant::new(dataset, &products, domains);
                    record(report, MIGRATE_DATASET, self.migrate_dataset(&migrant).await);
                }
            }
        }
    }
}
