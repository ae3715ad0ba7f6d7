//! HTTP surface and process plumbing for the `docqa` binary.

pub mod logging;
pub mod server;

pub use server::{router, serve, spawn_ingestion, PROCESSING_DETAIL};
