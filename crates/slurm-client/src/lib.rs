//! Slurm REST API Client
//!
//! A thin list client for the Slurm REST daemon (`slurmrestd`).
//! It is the snapshot source consumed by the resource watchers: one
//! `list_*` call per resource kind, returning the full current set.
//!
//! # Example
//!
//! ```no_run
//! use slurm_client::{ListJobsOptions, SlurmClient, SlurmClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SlurmClient::new(
//!     "http://slurmrestd:6820".to_string(),
//!     "v0.0.44",
//!     Some("jwt-token".to_string()),
//!     None,
//! )?;
//!
//! let options = ListJobsOptions {
//!     partition: Some("gpu".to_string()),
//!     ..Default::default()
//! };
//! let jobs = client.list_jobs(&options).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Jobs, nodes, partitions**: list endpoints with client-side filtering
//! - **Token auth**: `X-SLURM-USER-TOKEN` / `X-SLURM-USER-NAME` headers
//! - **Mocking**: `MockSlurmClient` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod slurm_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::SlurmClient;
pub use common::HttpClient;
pub use error::SlurmError;
pub use models::*;
pub use slurm_trait::SlurmClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockSlurmClient;
