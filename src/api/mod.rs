pub mod v2_jobs;
pub mod v2_models;
