use crate::domain::model::{Person, Project, Snapshot, WorkPackage};
use crate::domain::ports::{ReferenceSource, SnapshotStore};
use crate::utils::error::{BudgetError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Client for the planner REST backend (`users/`, `workpackages/`,
/// `project/`, `budget/`).
#[derive(Debug, Clone)]
pub struct ApiBackend {
    client: Client,
    base_url: Url,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl ApiBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        // Without the trailing slash `Url::join` would drop the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| BudgetError::InvalidConfigValueError {
                field: "source.endpoint".to_string(),
                value: base_url.to_string(),
                reason: format!("Invalid URL format: {}", e),
            })?;

        Ok(Self {
            client: Client::new(),
            base_url,
            headers: HashMap::new(),
            timeout: None,
        })
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BudgetError::ConfigError {
                message: format!("cannot build URL for '{}': {}", path, e),
            })
    }

    fn prepare(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self.endpoint(path)?;
        tracing::debug!("GET {}", url);
        let response = self.prepare(self.client.get(url.clone())).send().await?;
        tracing::debug!("API response status: {}", response.status());

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(BudgetError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    async fn get_required<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json(path)
            .await?
            .ok_or_else(|| BudgetError::HttpStatus {
                status: StatusCode::NOT_FOUND.as_u16(),
                url: self
                    .endpoint(path)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| path.to_string()),
            })
    }
}

#[async_trait]
impl ReferenceSource for ApiBackend {
    async fn persons(&self) -> Result<Vec<Person>> {
        self.get_required("users/").await
    }

    async fn work_packages(&self) -> Result<Vec<WorkPackage>> {
        self.get_required("workpackages/").await
    }

    async fn project(&self) -> Result<Option<Project>> {
        self.get_json("project/").await
    }
}

#[async_trait]
impl SnapshotStore for ApiBackend {
    async fn load_snapshot(&self) -> Result<Snapshot> {
        self.get_required("budget/").await
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let url = self.endpoint("budget/")?;
        tracing::debug!("PUT {} ({} entries)", url, snapshot.len());
        let response = self
            .prepare(self.client.put(url.clone()).json(snapshot))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BudgetError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(())
    }
}
