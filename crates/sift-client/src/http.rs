//! HTTP implementations of [`FieldCatalog`] and [`SearchEndpoint`].

use async_trait::async_trait;
use sift_query::{FieldMetadata, SearchRequest};

use crate::catalog::{parse_catalog, FieldCatalog};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::search::{SearchEndpoint, SearchResponse};

/// JSON-over-HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(HttpBackend { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl FieldCatalog for HttpBackend {
    async fn fetch_fields(&self, category: Option<&str>) -> Result<Vec<FieldMetadata>> {
        let mut request = self.client.get(self.config.catalog_url());
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        let body = Self::body(request.send().await?).await?;
        parse_catalog(&body)
    }
}

#[async_trait]
impl SearchEndpoint for HttpBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let response = self
            .client
            .post(self.config.search_url())
            .json(request)
            .send()
            .await?;
        let body = Self::body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
