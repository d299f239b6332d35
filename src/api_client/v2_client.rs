use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::v2_jobs::V2Jobs;
use crate::api::v2_models::{
    BigQueryApiError, GetQueryResultsResponse, Job, QueryRequest, QueryResponse,
    QueryResultsParams,
};

pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com";

/// Low-level BigQuery client that directly calls the v2 REST endpoints.
#[derive(Debug, Clone)]
pub struct V2Client {
    base_url: String,
    token: String,
    http_client: Client,
}

impl V2Client {
    /// Creates a new client with the given API root and OAuth2 access token.
    ///
    /// Example base_url: https://bigquery.googleapis.com
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::with_http_client(base_url, token, Client::new())
    }

    /// Same as [`V2Client::new`], reusing an already configured reqwest client.
    pub fn with_http_client(base_url: &str, token: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn project_url(&self, project_id: &str) -> String {
        format!("{}/bigquery/v2/projects/{}", self.base_url, project_id)
    }

    fn queries_url(&self, project_id: &str) -> String {
        format!("{}/queries", self.project_url(project_id))
    }

    fn job_url(&self, project_id: &str, job_id: &str) -> String {
        format!("{}/jobs/{}", self.project_url(project_id), job_id)
    }

    fn query_results_url(&self, project_id: &str, job_id: &str) -> String {
        format!("{}/queries/{}", self.project_url(project_id), job_id)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, BigQueryApiError> {
        let status = resp.status();
        let text_body = resp.text().await?;

        tracing::trace!(%status, body = %text_body, "BigQuery response");

        decode(status, &text_body)
    }
}

/// Maps non-success statuses to errors and decodes the JSON body.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, BigQueryApiError> {
    if status == StatusCode::NOT_FOUND {
        return Err(BigQueryApiError::NotFound);
    }
    if !status.is_success() {
        tracing::debug!(%status, "BigQuery request failed");
        return Err(BigQueryApiError::ApiError(format!("HTTP {}: {}", status, body)));
    }

    serde_json::from_str(body)
        .map_err(|e| BigQueryApiError::ApiError(format!("JSON parse error: {}", e)))
}

impl V2Jobs for V2Client {
    async fn query(
        &self,
        project_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, BigQueryApiError> {
        let url = self.queries_url(project_id);
        tracing::debug!(%url, "submitting query");

        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn get_job(
        &self,
        project_id: &str,
        job_id: &str,
        location: Option<&str>,
    ) -> Result<Job, BigQueryApiError> {
        let url = self.job_url(project_id, job_id);

        let resp = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&location_query_string(location))
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn get_query_results(
        &self,
        project_id: &str,
        job_id: &str,
        location: Option<&str>,
        params: &QueryResultsParams,
    ) -> Result<GetQueryResultsResponse, BigQueryApiError> {
        let url = self.query_results_url(project_id, job_id);
        tracing::trace!(%url, start_index = params.start_index, "fetching results page");

        let resp = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&results_query_string(params, location))
            .send()
            .await?;

        self.handle_response(resp).await
    }
}

fn location_query_string(location: Option<&str>) -> Vec<(&'static str, String)> {
    location
        .map(|location| ("location", location.to_string()))
        .into_iter()
        .collect()
}

fn results_query_string(
    params: &QueryResultsParams,
    location: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("startIndex", params.start_index.to_string())];
    if let Some(max_results) = params.max_results {
        pairs.push(("maxResults", max_results.to_string()));
    }
    pairs.extend(location_query_string(location));
    pairs
}
