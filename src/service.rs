use std::sync::Arc;
use std::time::Duration;

use crate::api::v2_jobs::V2Jobs;
use crate::api::v2_models::{BigQueryApiError, DatasetReference, QueryRequest, QueryResponse};
use crate::client::ClientFactory;
use crate::models::{BigQueryError, Config, QueryOptions};
use crate::query::Query;

/// Pause between two `jobs.get` calls while a query job is running.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Higher-level service built on top of a [`V2Jobs`] client.
///
/// Runs queries against one project and default dataset, waits for their jobs and
/// hands back a [`Query`] cursor over the results. Cloning is cheap and clones
/// share the client.
#[derive(Debug)]
pub struct BigQueryService<C> {
    config: Config,
    client: Arc<C>,
    poll_interval: Duration,
}

impl<C> Clone for BigQueryService<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            client: Arc::clone(&self.client),
            poll_interval: self.poll_interval,
        }
    }
}

impl<C: V2Jobs> BigQueryService<C> {
    /// Validates `config`, then builds the backend client through `factory`.
    pub fn new<F>(factory: &F, config: Config) -> Result<Self, BigQueryError>
    where
        F: ClientFactory<Client = C>,
    {
        config.validate()?;
        let client = factory.build()?;
        Ok(Self::from_parts(Arc::new(client), config))
    }

    /// Wraps a client that may also be used elsewhere.
    pub fn with_client(client: Arc<C>, config: Config) -> Result<Self, BigQueryError> {
        config.validate()?;
        Ok(Self::from_parts(client, config))
    }

    fn from_parts(client: Arc<C>, config: Config) -> Self {
        Self {
            config,
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a reference to the low-level client (if you need direct calls).
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Runs `sql` and returns a cursor over its rows.
    ///
    /// `args` are positional: the first is the offset in the result set, the
    /// second the maximum number of rows per page. Passing more than two is an
    /// error.
    pub async fn query(&self, sql: &str, args: &[u64]) -> Result<Query<C>, BigQueryError> {
        let options = QueryOptions::from_args(args)?;
        self.query_with_options(sql, options).await
    }

    pub async fn query_with_options(
        &self,
        sql: &str,
        options: QueryOptions,
    ) -> Result<Query<C>, BigQueryError> {
        let resp = self.request_query(sql, &options).await?;

        let job = resp.job_reference.clone().ok_or_else(|| {
            BigQueryApiError::Other("No job reference in query response.".to_string())
        })?;

        if !resp.job_complete {
            self.wait_for_job(&job.job_id, job.location.as_deref()).await?;
        }

        Ok(Query::new(
            Arc::clone(&self.client),
            self.config.project_id.clone(),
            job,
            resp.first_page(),
            resp.schema,
            options,
        ))
    }

    async fn request_query(
        &self,
        sql: &str,
        options: &QueryOptions,
    ) -> Result<QueryResponse, BigQueryError> {
        let request = QueryRequest {
            query: sql.to_string(),
            default_dataset: Some(DatasetReference {
                project_id: self.config.project_id.clone(),
                dataset_id: self.config.dataset_id.clone(),
            }),
            max_results: options.max_results(),
            use_legacy_sql: options.use_legacy_sql,
        };

        Ok(self.client.query(&self.config.project_id, &request).await?)
    }

    /// Polls a job until it is DONE.
    ///
    /// There is no upper bound on the number of polls; a single failed poll ends
    /// the wait with that error.
    async fn wait_for_job(
        &self,
        job_id: &str,
        location: Option<&str>,
    ) -> Result<(), BigQueryError> {
        let mut polls = 0usize;
        loop {
            let job = self
                .client
                .get_job(&self.config.project_id, job_id, location)
                .await?;
            polls += 1;

            let status = job.status.ok_or_else(|| {
                BigQueryApiError::Other("No status in job response.".to_string())
            })?;

            if status.is_done() {
                if let Some(err) = status.error_result {
                    tracing::debug!(job_id, polls, error = %err.message, "query job failed");
                    return Err(BigQueryError::JobExecution(err.message));
                }
                tracing::debug!(job_id, polls, "query job done");
                return Ok(());
            }

            tracing::debug!(job_id, polls, state = %status.state, "query job still running");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
