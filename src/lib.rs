//! A small BigQuery client: submit a SQL query, wait for its job to finish and
//! page through the result rows.
//!
//! ```no_run
//! # async fn run() -> Result<(), bigquery_sql_client::BigQueryError> {
//! use bigquery_sql_client::{BigQueryService, ClientOptions, Config};
//!
//! let options = ClientOptions::new("ya29.access-token");
//! let service = BigQueryService::new(&options, Config::new("my-project", "my_dataset"))?;
//!
//! // start at row 0, 100 rows per page
//! let mut query = service.query("SELECT name FROM users", &[0, 100]).await?;
//! while let Some(row) = query.next().await? {
//!     println!("{:?}", row);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod api_client;
pub mod client;
pub mod models;
pub mod query;
pub mod service;

#[cfg(test)]
mod testing;

pub use api::v2_jobs::V2Jobs;
pub use api::v2_models::{BigQueryApiError, Row, RowPage, TableSchema};
pub use api_client::v2_client::V2Client;
pub use client::{ClientFactory, ClientOptions};
pub use models::{BigQueryError, Config, QueryOptions};
pub use query::Query;
pub use service::{BigQueryService, DEFAULT_POLL_INTERVAL};
