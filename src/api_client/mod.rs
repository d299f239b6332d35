pub mod v2_client;
