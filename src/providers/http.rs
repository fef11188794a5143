use super::util::{RetryPolicy, join_url, with_retry};
use crate::core::config::FeeServiceConfig;
use crate::core::schedule::CategoryId;
use crate::core::source::{
    AssociationFeeRecord, BuyerSellerFeeRecord, CarTypeRecord, FeeSource, StorageFeeRecord,
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Fee source backed by the remote fee service's JSON endpoints.
pub struct HttpFeeSource {
    client: reqwest::Client,
    config: FeeServiceConfig,
    retry: RetryPolicy,
}

impl HttpFeeSource {
    pub fn new(config: &FeeServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("autofee/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
            retry: RetryPolicy::new(config.retries, config.retry_delay_ms),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        join_url(&self.config.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Requesting fee data from {}", url);
        let response = with_retry(
            || async {
                self.client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
            },
            self.retry,
        )
        .await
        .with_context(|| format!("Request to {url} failed"))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text from {url}"))?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response from {}", url));
        }

        match serde_json::from_str(&response_text) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse fee service response"
                );
                Err(e).with_context(|| format!("Failed to parse response from {url}"))
            }
        }
    }
}

#[async_trait]
impl FeeSource for HttpFeeSource {
    #[instrument(name = "StorageFeeFetch", skip(self))]
    async fn storage_fee(&self) -> Result<StorageFeeRecord> {
        self.get_json(&self.url(&self.config.endpoints.storage_fees))
            .await
    }

    #[instrument(name = "AssociationFeeFetch", skip(self))]
    async fn association_fees(&self) -> Result<Vec<AssociationFeeRecord>> {
        self.get_json(&self.url(&self.config.endpoints.association_fees))
            .await
    }

    #[instrument(name = "BuyerSellerFeeFetch", skip(self))]
    async fn buyer_seller_fees(&self, category: CategoryId) -> Result<Vec<BuyerSellerFeeRecord>> {
        let endpoint = self
            .config
            .endpoints
            .buyer_seller_fees
            .replace("{id}", &category.to_string());
        self.get_json(&self.url(&endpoint)).await
    }

    #[instrument(name = "CarTypeFetch", skip(self))]
    async fn car_types(&self) -> Result<Vec<CarTypeRecord>> {
        self.get_json(&self.url(&self.config.endpoints.car_types))
            .await
    }
}
