//! Backend client for the performance-tracker REST API.
//!
//! [`PerformanceApi`] is the seam the chat engine talks through; [`HttpApi`]
//! is the `reqwest` implementation used by the CLI and server. Tests swap in
//! an in-memory implementation.
//!
//! # Endpoints
//!
//! | Method | Path | Used for |
//! |--------|------|----------|
//! | `GET` | `/employees` | corpus load (default page, or `?limit=n`) |
//! | `GET` | `/departments` | corpus load |
//! | `GET` | `/employees/{id}/performance` | enrichment, newest review first |
//! | `GET` | `/health` | `perfbot health` |
//!
//! Failures are not retried; a non-2xx status becomes [`ChatError::Api`].

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::ChatError;
use crate::models::{DepartmentRecord, EmployeePage, EmployeeRecord, PerformanceReviewSummary};

#[async_trait]
pub trait PerformanceApi: Send + Sync {
    /// Employees on the requested page of `GET /employees`.
    async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, ChatError>;

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, ChatError>;

    /// Review history for one employee, most recent first.
    async fn employee_performance(
        &self,
        employee_id: &str,
    ) -> Result<Vec<PerformanceReviewSummary>, ChatError>;
}

/// [`PerformanceApi`] over the tracker's REST API.
///
/// Every request carries the configured timeout and, when a token resolves,
/// a bearer `Authorization` header.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
    employee_page_limit: Option<u32>,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("api.base_url cannot be used as a base: {}", config.base_url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = config.resolved_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("api token contains characters not allowed in a header")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            employee_page_limit: config.employee_page_limit,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /health`; any 2xx counts as healthy.
    pub async fn health(&self) -> Result<(), ChatError> {
        let resp = self.client.get(self.endpoint(&["health"])).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always has path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ChatError> {
        tracing::debug!(%url, "GET");
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl PerformanceApi for HttpApi {
    async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, ChatError> {
        let query: Vec<(&str, String)> = self
            .employee_page_limit
            .map(|limit| vec![("limit", limit.to_string())])
            .unwrap_or_default();
        let page: EmployeePage = self
            .get_json(self.endpoint(&["employees"]), &query)
            .await?;
        let unfetched = page.unfetched();
        if unfetched > 0 {
            tracing::warn!(
                loaded = page.employees.len(),
                unfetched,
                total_pages = ?page.total_pages,
                "employee roster spans several pages; raise api.employee_page_limit to see all of it"
            );
        }
        Ok(page.employees)
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, ChatError> {
        self.get_json(self.endpoint(&["departments"]), &[]).await
    }

    async fn employee_performance(
        &self,
        employee_id: &str,
    ) -> Result<Vec<PerformanceReviewSummary>, ChatError> {
        self.get_json(
            self.endpoint(&["employees", employee_id, "performance"]),
            &[],
        )
        .await
    }
}
