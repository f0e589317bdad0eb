use crate::config::toml_config::ConnectionConfig;
use crate::domain::model::{DataProduct, Domain};
use crate::domain::ports::CatalogClient;
use crate::utils::error::{DatameshError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;

const DOMAINS_PATH: &str = "/api/v1/dataProduct/domains";
const PRODUCTS_PATH: &str = "/api/v1/dataProduct/products";

/// `CatalogClient` backed by the Starburst data product REST API.
pub struct StarburstClient {
    client: Client,
    base_url: String,
    host: String,
    user: String,
    password: Option<String>,
}

impl StarburstClient {
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            host: config.host.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("📡 {} {}", method, url);
        self.client
            .request(method, url)
            .basic_auth(&self.user, self.password.as_deref())
            .header("Accept", "application/json")
    }

    /// Non-2xx responses become `ApiStatusError` carrying the response body.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body
        };
        Err(DatameshError::ApiStatusError {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn list_domains(&self) -> Result<Vec<Domain>> {
        let response = self.request(Method::GET, DOMAINS_PATH).send().await?;
        let domains = Self::check_status(response).await?.json().await?;
        Ok(domains)
    }

    /// `None` when the instance answers 404 for the id.
    pub async fn get_data_product_by_id(&self, id: &str) -> Result<Option<DataProduct>> {
        let path = format!("{}/{}", PRODUCTS_PATH, id);
        let response = self.request(Method::GET, &path).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let product = Self::check_status(response).await?.json().await?;
        Ok(Some(product))
    }
}

fn require_id<'a>(id: &'a Option<String>, entity: &str, name: &str) -> Result<&'a str> {
    id.as_deref()
        .ok_or_else(|| DatameshError::MissingIdentityError {
            entity: entity.to_string(),
            name: name.to_string(),
        })
}

#[async_trait]
impl CatalogClient for StarburstClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn get_domain_by_name(&self, domain_name: &str) -> Result<Option<Domain>> {
        let domains = self.list_domains().await?;
        Ok(domains.into_iter().find(|domain| domain.name == domain_name))
    }

    async fn get_data_product(
        &self,
        domain_name: &str,
        data_product_name: &str,
    ) -> Result<Option<DataProduct>> {
        let Some(domain) = self.get_domain_by_name(domain_name).await? else {
            return Ok(None);
        };
        let Some(assigned) = domain
            .assigned_data_products
            .into_iter()
            .find(|product| product.name == data_product_name)
        else {
            return Ok(None);
        };
        self.get_data_product_by_id(&assigned.id).await
    }

    async fn create_domain(&self, domain: &Domain) -> Result<()> {
        let response = self
            .request(Method::POST, DOMAINS_PATH)
            .json(domain)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn update_domain(&self, domain: &Domain) -> Result<()> {
        let id = require_id(&domain.id, "Domain", &domain.name)?;
        let path = format!("{}/{}", DOMAINS_PATH, id);
        let response = self.request(Method::PUT, &path).json(domain).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn create_data_product(&self, data_product: &DataProduct) -> Result<()> {
        let response = self
            .request(Method::POST, PRODUCTS_PATH)
            .json(data_product)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn update_data_product(&self, data_product: &DataProduct) -> Result<u16> {
        let id = require_id(&data_product.id, "Data product", &data_product.name)?;
        let path = format!("{}/{}", PRODUCTS_PATH, id);
        let response = self
            .request(Method::PUT, &path)
            .json(data_product)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.status().as_u16())
    }
}
