use crate::domain::model::{DataProduct, Domain};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Operations the migrator needs from one data-catalog instance.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Host used in progress messages.
    fn host(&self) -> &str;

    async fn get_domain_by_name(&self, domain_name: &str) -> Result<Option<Domain>>;

    async fn get_data_product(
        &self,
        domain_name: &str,
        data_product_name: &str,
    ) -> Result<Option<DataProduct>>;

    async fn create_domain(&self, domain: &Domain) -> Result<()>;

    async fn update_domain(&self, domain: &Domain) -> Result<()>;

    async fn create_data_product(&self, product: &DataProduct) -> Result<()>;

    /// Returns the HTTP status of a successful update.
    async fn update_data_product(&self, product: &DataProduct) -> Result<u16>;
}
