//! HTTP client for the storefront's listing pages and fulfillment endpoint.

use std::time::Duration;

use pickupboard_core::{Part, UpstreamConfig};
use reqwest::Client;

use crate::error::ScraperError;
use crate::types::FulfillmentResponse;

/// Client for the retailer's public storefront.
///
/// Non-2xx responses surface as typed errors; nothing is retried.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    region_path: String,
}

impl UpstreamClient {
    /// Creates an `UpstreamClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            region_path: config.region_path.clone(),
        })
    }

    /// Listing page for a product family, e.g. `https://www.apple.com/tw/shop/buy-iphone/iphone-17-pro`.
    #[must_use]
    pub fn listing_url(&self, family: &str) -> String {
        format!(
            "{}{}/shop/buy-iphone/{}",
            self.base_url,
            self.region_path,
            family.trim_matches('/')
        )
    }

    /// Builds the nearby-store pickup query for every part at once.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if the configured base URL does
    /// not parse.
    pub fn fulfillment_url(&self, parts: &[Part], seed: &str) -> Result<String, ScraperError> {
        let base = format!(
            "{}{}/shop/fulfillment-messages",
            self.base_url, self.region_path
        );
        let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("pl", "true")
                .append_pair("mts.0", "regular")
                .append_pair("searchNearby", "true")
                .append_pair("location", seed);
            for (idx, part) in parts.iter().enumerate() {
                query.append_pair(&format!("parts.{idx}"), &part.part_number);
            }
        }

        Ok(url.to_string())
    }

    /// Fetches the HTML of a family listing page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] — HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ScraperError::Http`] — network or TLS failure.
    pub async fn fetch_listing(&self, family: &str) -> Result<String, ScraperError> {
        let url = self.listing_url(family);
        self.get_text(&url, "text/html,application/xhtml+xml")
            .await
    }

    /// Fetches and decodes the fulfillment response for one seed.
    ///
    /// # Errors
    ///
    /// Returns the same status/transport errors as [`Self::fetch_listing`],
    /// plus [`ScraperError::Deserialize`] when the body is not valid JSON.
    pub async fn fetch_fulfillment(
        &self,
        parts: &[Part],
        seed: &str,
    ) -> Result<FulfillmentResponse, ScraperError> {
        let url = self.fulfillment_url(parts, seed)?;
        let body = self.get_text(&url, "application/json").await?;
        serde_json::from_str::<FulfillmentResponse>(&body).map_err(|e| {
            ScraperError::Deserialize {
                context: format!("fulfillment response for seed \"{seed}\""),
                source: e,
            }
        })
    }

    async fn get_text(&self, url: &str, accept: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .header(reqwest::header::ACCEPT_LANGUAGE, "zh-TW,zh;q=0.9,en;q=0.8")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
