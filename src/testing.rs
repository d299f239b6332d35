//! Scripted in-memory stand-in for the BigQuery jobs API.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;
use tokio::time::Instant;

use crate::api::v2_jobs::V2Jobs;
use crate::api::v2_models::{
    BigQueryApiError, ErrorProto, GetQueryResultsResponse, Job, JobReference, JobStatus,
    QueryRequest, QueryResponse, QueryResultsParams, TableRow,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Query {
        project_id: String,
        request: QueryRequest,
    },
    GetJob {
        project_id: String,
        job_id: String,
        location: Option<String>,
        at: Instant,
    },
    GetQueryResults {
        project_id: String,
        job_id: String,
        location: Option<String>,
        params: QueryResultsParams,
    },
}

#[derive(Debug, Default)]
struct Script {
    queries: VecDeque<Result<QueryResponse, BigQueryApiError>>,
    jobs: VecDeque<Result<Job, BigQueryApiError>>,
    pages: VecDeque<Result<GetQueryResultsResponse, BigQueryApiError>>,
    calls: Vec<Call>,
}

/// Answers each endpoint from its own queue and records every call.
#[derive(Debug, Default)]
pub(crate) struct FakeJobs {
    script: Mutex<Script>,
}

impl FakeJobs {
    pub fn push_query(&self, resp: Result<QueryResponse, BigQueryApiError>) -> &Self {
        self.script.lock().unwrap().queries.push_back(resp);
        self
    }

    pub fn push_job(&self, job: Result<Job, BigQueryApiError>) -> &Self {
        self.script.lock().unwrap().jobs.push_back(job);
        self
    }

    pub fn push_page(&self, page: Result<GetQueryResultsResponse, BigQueryApiError>) -> &Self {
        self.script.lock().unwrap().pages.push_back(page);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::GetJob { at, .. } => Some(at),
                _ => None,
            })
            .collect()
    }

    pub fn results_params(&self) -> Vec<QueryResultsParams> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::GetQueryResults { params, .. } => Some(params),
                _ => None,
            })
            .collect()
    }
}

fn unscripted(endpoint: &str) -> BigQueryApiError {
    BigQueryApiError::Other(format!("no scripted response for {}", endpoint))
}

impl V2Jobs for FakeJobs {
    async fn query(
        &self,
        project_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, BigQueryApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Query {
            project_id: project_id.to_string(),
            request: request.clone(),
        });
        script.queries.pop_front().unwrap_or_else(|| Err(unscripted("query")))
    }

    async fn get_job(
        &self,
        project_id: &str,
        job_id: &str,
        location: Option<&str>,
    ) -> Result<Job, BigQueryApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::GetJob {
            project_id: project_id.to_string(),
            job_id: job_id.to_string(),
            location: location.map(str::to_string),
            at: Instant::now(),
        });
        script.jobs.pop_front().unwrap_or_else(|| Err(unscripted("get_job")))
    }

    async fn get_query_results(
        &self,
        project_id: &str,
        job_id: &str,
        location: Option<&str>,
        params: &QueryResultsParams,
    ) -> Result<GetQueryResultsResponse, BigQueryApiError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::GetQueryResults {
            project_id: project_id.to_string(),
            job_id: job_id.to_string(),
            location: location.map(str::to_string),
            params: *params,
        });
        script
            .pages
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("get_query_results")))
    }
}

fn job_reference(job_id: &str) -> Option<JobReference> {
    Some(JobReference {
        project_id: "proj".to_string(),
        job_id: job_id.to_string(),
        location: None,
    })
}

fn table_rows(rows: Vec<Vec<Value>>) -> Option<Vec<TableRow>> {
    Some(rows.into_iter().map(TableRow::from_values).collect())
}

pub(crate) fn completed(
    job_id: &str,
    rows: Vec<Vec<Value>>,
    page_token: Option<&str>,
) -> QueryResponse {
    QueryResponse {
        job_complete: true,
        job_reference: job_reference(job_id),
        rows: table_rows(rows),
        page_token: page_token.map(str::to_string),
        ..Default::default()
    }
}

pub(crate) fn pending(job_id: &str) -> QueryResponse {
    QueryResponse {
        job_complete: false,
        job_reference: job_reference(job_id),
        ..Default::default()
    }
}

pub(crate) fn job(state: &str, error: Option<&str>) -> Job {
    Job {
        status: Some(JobStatus {
            state: state.to_string(),
            error_result: error.map(|message| ErrorProto {
                message: message.to_string(),
                ..Default::default()
            }),
            errors: None,
        }),
        ..Default::default()
    }
}

pub(crate) fn page(rows: Vec<Vec<Value>>, page_token: Option<&str>) -> GetQueryResultsResponse {
    GetQueryResultsResponse {
        job_complete: true,
        rows: table_rows(rows),
        page_token: page_token.map(str::to_string),
        ..Default::default()
    }
}
