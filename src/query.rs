use std::sync::Arc;

use crate::api::v2_jobs::V2Jobs;
use crate::api::v2_models::{JobReference, QueryResultsParams, Row, RowPage, TableSchema};
use crate::models::{BigQueryError, QueryOptions};

/// Forward-only cursor over the rows of a finished query job.
///
/// Pages are fetched lazily from `jobs.getQueryResults` as the current one runs
/// out. A cursor is single-use: rows are never yielded twice, and once
/// [`Query::next`] returns `Ok(None)` it keeps doing so.
#[derive(Debug)]
pub struct Query<C> {
    client: Arc<C>,
    project_id: String,
    job_id: String,
    location: Option<String>,
    /// Start index of the current page.
    offset: u64,
    page_size: u64,
    rows: std::vec::IntoIter<Row>,
    /// Start index of the page to fetch once `rows` is drained; `None` at the end.
    next_start: Option<u64>,
    total_rows: Option<u64>,
    schema: Option<TableSchema>,
}

impl<C: V2Jobs> Query<C> {
    /// `first_page` is the inline page of `jobs.query`, which always starts at
    /// row 0; it is only used when the cursor starts there too.
    pub(crate) fn new(
        client: Arc<C>,
        project_id: String,
        job: JobReference,
        first_page: Option<RowPage>,
        schema: Option<TableSchema>,
        options: QueryOptions,
    ) -> Self {
        let mut query = Self {
            client,
            project_id,
            job_id: job.job_id,
            location: job.location,
            offset: options.offset,
            page_size: options.page_size,
            rows: Vec::new().into_iter(),
            next_start: Some(options.offset),
            total_rows: None,
            schema,
        };

        match first_page {
            Some(page) if options.offset == 0 => query.install_page(0, page),
            Some(page) => query.total_rows = page.total_rows,
            None => {}
        }
        query
    }

    /// Returns the next row, fetching the following page when the current one is
    /// drained. `Ok(None)` marks the end of the result set.
    pub async fn next(&mut self) -> Result<Option<Row>, BigQueryError> {
        loop {
            if let Some(row) = self.rows.next() {
                return Ok(Some(row));
            }
            let Some(start) = self.next_start else {
                return Ok(None);
            };
            self.fetch_page(start).await?;
        }
    }

    async fn fetch_page(&mut self, start: u64) -> Result<(), BigQueryError> {
        let params = QueryResultsParams {
            start_index: start,
            max_results: (self.page_size > 0).then_some(self.page_size),
        };
        let resp = self
            .client
            .get_query_results(
                &self.project_id,
                &self.job_id,
                self.location.as_deref(),
                &params,
            )
            .await?;

        if self.schema.is_none() {
            self.schema = resp.schema.clone();
        }
        let page = resp.into_page();
        tracing::trace!(
            job_id = %self.job_id,
            start,
            rows = page.rows.len(),
            more = page.has_more(),
            "fetched results page"
        );
        self.install_page(start, page);
        Ok(())
    }

    fn install_page(&mut self, start: u64, page: RowPage) {
        let len = page.rows.len() as u64;
        let step = if self.page_size > 0 { self.page_size } else { len };

        self.offset = start;
        // past u64::MAX there is nothing left to address
        self.next_start = match page.page_token {
            Some(_) if step > 0 => start.checked_add(step),
            _ => None,
        };
        if page.total_rows.is_some() {
            self.total_rows = page.total_rows;
        }
        self.rows = page.rows.into_iter();
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Start index of the page currently being read.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Total rows in the result set, once the backend has reported it.
    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    /// Column names from the schema, if known.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema
            .iter()
            .flat_map(|schema| schema.fields.iter().map(|field| field.name.as_str()))
            .collect()
    }
}
