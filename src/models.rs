use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::v2_models::BigQueryApiError;

/// Project and dataset every query of a service runs against.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub project_id: String,
    pub dataset_id: String,
}

impl Config {
    pub fn new(project_id: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), BigQueryError> {
        if self.project_id.is_empty() || self.dataset_id.is_empty() {
            return Err(BigQueryError::Config(
                "dataset and project can not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where a result cursor starts and how many rows it asks for per page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Index of the first row to return.
    pub offset: u64,
    /// Rows per page; 0 lets the backend choose.
    pub page_size: u64,
    /// Sent as `useLegacySql` when set. BigQuery falls back to legacy SQL otherwise.
    pub use_legacy_sql: Option<bool>,
}

impl QueryOptions {
    pub fn new(offset: u64, page_size: u64) -> Self {
        Self {
            offset,
            page_size,
            use_legacy_sql: None,
        }
    }

    pub fn with_legacy_sql(mut self, use_legacy_sql: bool) -> Self {
        self.use_legacy_sql = Some(use_legacy_sql);
        self
    }

    /// Reads positional `[offset[, page_size]]` arguments.
    pub fn from_args(args: &[u64]) -> Result<Self, BigQueryError> {
        match *args {
            [] => Ok(Self::default()),
            [offset] => Ok(Self::new(offset, 0)),
            [offset, page_size] => Ok(Self::new(offset, page_size)),
            _ => Err(BigQueryError::Argument(format!(
                "too many arguments given to query: {}",
                args.len()
            ))),
        }
    }

    /// Result-limit hint sent to the backend, if any.
    pub fn max_results(&self) -> Option<u64> {
        (self.page_size > 0).then_some(self.page_size)
    }
}

/// Errors surfaced by the service and its result cursors
#[derive(Error, Debug)]
pub enum BigQueryError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not build BigQuery client: {0}")]
    ClientInit(String),

    #[error("invalid arguments: {0}")]
    Argument(String),

    #[error(transparent)]
    Backend(#[from] BigQueryApiError),

    #[error("query job failed: {0}")]
    JobExecution(String),
}
