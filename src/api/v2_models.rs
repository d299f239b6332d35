use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request body for `POST /bigquery/v2/projects/{project}/queries`
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_dataset: Option<DatasetReference>,

    /// Row limit for the first page. Left unset so the backend picks its default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u64>,

    /// The REST API treats an absent value as `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_legacy_sql: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReference {
    pub project_id: String,
    pub dataset_id: String,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Response of `jobs.query`. When `job_complete` is set, the first page of rows is inline.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub job_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<TableRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    /// int64 encoded as a JSON string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<String>,
}

impl QueryResponse {
    /// The inline page, present only once the job has completed.
    pub fn first_page(&self) -> Option<RowPage> {
        if !self.job_complete {
            return None;
        }
        Some(RowPage::new(
            self.rows.as_deref().unwrap_or_default(),
            self.page_token.clone(),
            self.total_rows.as_deref(),
        ))
    }
}

/// Response of `jobs.get`
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// "PENDING", "RUNNING" or "DONE"
    pub state: String,
    /// Set when a DONE job failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_result: Option<ErrorProto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorProto>>,
}

impl JobStatus {
    pub const DONE: &'static str = "DONE";

    pub fn is_done(&self) -> bool {
        self.state == Self::DONE
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProto {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Query string parameters of `jobs.getQueryResults`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryResultsParams {
    pub start_index: u64,
    pub max_results: Option<u64>,
}

/// Response of `jobs.getQueryResults`
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GetQueryResultsResponse {
    #[serde(default)]
    pub job_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<TableRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<String>,
}

impl GetQueryResultsResponse {
    pub fn into_page(self) -> RowPage {
        RowPage::new(
            self.rows.as_deref().unwrap_or_default(),
            self.page_token,
            self.total_rows.as_deref(),
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// One row on the wire: `{"f": [{"v": ...}, ...]}`
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct TableCell {
    #[serde(default)]
    pub v: serde_json::Value,
}

impl TableRow {
    pub fn from_values(values: impl IntoIterator<Item = serde_json::Value>) -> Self {
        Self {
            f: values.into_iter().map(|v| TableCell { v }).collect(),
        }
    }
}

/// A raw result row: one JSON value per column, in schema order.
pub type Row = Vec<serde_json::Value>;

/// One page of rows plus what is needed to ask for the next one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RowPage {
    pub rows: Vec<Row>,
    /// Present while more pages remain.
    pub page_token: Option<String>,
    pub total_rows: Option<u64>,
}

impl RowPage {
    fn new(rows: &[TableRow], page_token: Option<String>, total_rows: Option<&str>) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.f.iter().map(|cell| cell.v.clone()).collect())
                .collect(),
            page_token,
            total_rows: total_rows.and_then(|n| n.parse().ok()),
        }
    }

    pub fn has_more(&self) -> bool {
        self.page_token.is_some()
    }
}

/// Errors talking to the BigQuery REST API
#[derive(Error, Debug)]
pub enum BigQueryApiError {
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Not Found (404)")]
    NotFound,

    #[error("Unknown error: {0}")]
    Other(String),
}
