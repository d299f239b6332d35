use crate::api::v2_models::{
    BigQueryApiError, GetQueryResultsResponse, Job, QueryRequest, QueryResponse,
    QueryResultsParams,
};

/// The slice of the BigQuery v2 jobs API needed to run a query and read its results.
pub trait V2Jobs {
    /// POST /bigquery/v2/projects/{project_id}/queries
    /// Submit a query. If it finishes quickly the first page of rows comes back inline.
    async fn query(
        &self,
        project_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, BigQueryApiError>;

    /// GET /bigquery/v2/projects/{project_id}/jobs/{job_id}
    /// Poll for the job's status. `location` is required for jobs outside the US and EU.
    async fn get_job(
        &self,
        project_id: &str,
        job_id: &str,
        location: Option<&str>,
    ) -> Result<Job, BigQueryApiError>;

    /// GET /bigquery/v2/projects/{project_id}/queries/{job_id}
    /// Fetch one page of results of a completed query job.
    async fn get_query_results(
        &self,
        project_id: &str,
        job_id: &str,
        location: Option<&str>,
        params: &QueryResultsParams,
    ) -> Result<GetQueryResultsResponse, BigQueryApiError>;
}
