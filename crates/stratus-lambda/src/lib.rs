//! Lambda function API client.
//!
//! This crate provides everything the deployer needs to talk to the
//! platform:
//!
//! - **Wire types**: PascalCase request/response shapes for the three
//!   function operations, plus the two readiness-state enums
//! - **`FunctionApi`**: the trait seam the orchestrator is written against,
//!   with a SigV4-signing [`LambdaClient`] for production and a scripted
//!   [`MockFunctionApi`] for tests
//! - **Error taxonomy**: a single classification function mapping raw
//!   service error codes to an [`ErrorKind`] category for operator logs
//! - **Credential resolution**: explicit key pair > named profile >
//!   ambient environment

#![forbid(unsafe_code)]

pub mod client;
pub mod credentials;
pub mod error;
pub mod mock;
pub mod sign;
pub mod types;

pub use client::{FunctionApi, LambdaClient};
pub use credentials::{CredentialConfig, Credentials};
pub use error::{classify, ErrorKind, LambdaError, LambdaResult};
pub use mock::MockFunctionApi;
pub use types::{
    Environment, FunctionConfiguration, FunctionState, LastUpdateStatus, TracingConfig,
    UpdateFunctionCodeRequest, UpdateFunctionConfigurationRequest, VpcConfig,
};
