//! Common utilities for integration tests.
//!
//! Shared LocalStack client setup and log object fixtures.

pub mod localstack;

pub use localstack::{LocalStackTestContext, access_log_lines};
