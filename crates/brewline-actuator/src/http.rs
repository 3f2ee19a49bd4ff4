// SPDX-License-Identifier: BUSL-1.1
//! # Hopster HTTP Client
//!
//! [`HttpActuator`] wraps a `reqwest::Client` configured with the `apikey`
//! header and request timeout. Transport failures are retried with
//! backoff; non-2xx statuses and undecodable bodies are mapped to
//! [`ActuatorError`] immediately.

use std::time::Duration;

use async_trait::async_trait;
use brewline_core::{BeerType, Bottle, BottleId, Case, EquipmentState};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::{ActuatorConfig, ConfigError};
use crate::error::ActuatorError;
use crate::retry::RetryPolicy;
use crate::Actuator;

/// Body of `GET /status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatusResponse {
    state: EquipmentState,
}

/// Typed client for the Hopster equipment service.
#[derive(Debug, Clone)]
pub struct HttpActuator {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl HttpActuator {
    /// Create a client from configuration.
    pub fn new(config: ActuatorConfig) -> Result<Self, ActuatorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    "apikey",
                    reqwest::header::HeaderValue::from_str(&config.api_key)
                        .map_err(|_| ConfigError::InvalidApiKey)?,
                );
                headers
            })
            .build()
            .map_err(|e| ActuatorError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
            retry: RetryPolicy::default(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ActuatorError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConfigError::InvalidUrl(
                    self.base_url.to_string(),
                    "URL cannot be used as a base".into(),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send with retry and reject non-2xx statuses.
    async fn execute<F>(&self, endpoint: &str, build: F) -> Result<reqwest::Response, ActuatorError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let resp = self
            .retry
            .send(endpoint, || build().send())
            .await
            .map_err(|e| ActuatorError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ActuatorError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, ActuatorError> {
        resp.json().await.map_err(|e| ActuatorError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }

    async fn post_empty(&self, endpoint: &str, segments: &[&str]) -> Result<(), ActuatorError> {
        let url = self.url(segments)?;
        self.execute(endpoint, || self.http.post(url.clone())).await?;
        Ok(())
    }
}

#[async_trait]
impl Actuator for HttpActuator {
    async fn fill_level(&self, beer_type: &BeerType) -> Result<f64, ActuatorError> {
        let endpoint = format!("GET /level/{beer_type}");
        let url = self.url(&["level", beer_type.as_str()])?;
        let resp = self.execute(&endpoint, || self.http.get(url.clone())).await?;
        Self::decode(&endpoint, resp).await
    }

    async fn refill_container(&self, beer_type: &BeerType) -> Result<(), ActuatorError> {
        let endpoint = format!("POST /fillcontainer/{beer_type}");
        self.post_empty(&endpoint, &["fillcontainer", beer_type.as_str()])
            .await
    }

    async fn fill_bottle(&self, id: BottleId) -> Result<Bottle, ActuatorError> {
        let endpoint = format!("POST /fillbottle/{id}");
        let id = id.to_string();
        let url = self.url(&["fillbottle", &id])?;
        let resp = self.execute(&endpoint, || self.http.post(url.clone())).await?;
        Self::decode(&endpoint, resp).await
    }

    async fn recycle(&self, id: BottleId) -> Result<(), ActuatorError> {
        let endpoint = format!("POST /recycle/{id}");
        let id = id.to_string();
        self.post_empty(&endpoint, &["recycle", &id]).await
    }

    async fn ship_one(&self, id: BottleId) -> Result<(), ActuatorError> {
        let endpoint = format!("POST /ship/{id}");
        let id = id.to_string();
        self.post_empty(&endpoint, &["ship", &id]).await
    }

    async fn ship_case(&self, case: &Case) -> Result<(), ActuatorError> {
        let endpoint = "POST /case";
        let url = self.url(&["case"])?;
        self.execute(endpoint, || self.http.post(url.clone()).json(case))
            .await?;
        Ok(())
    }

    async fn equipment_state(&self) -> Result<EquipmentState, ActuatorError> {
        let endpoint = "GET /status";
        let url = self.url(&["status"])?;
        let resp = self.execute(endpoint, || self.http.get(url.clone())).await?;
        let status: StatusResponse = Self::decode(endpoint, resp).await?;
        Ok(status.state)
    }

    async fn repair(&self) -> Result<(), ActuatorError> {
        self.post_empty("POST /repair", &["repair"]).await
    }
}
