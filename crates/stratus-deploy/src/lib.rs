//! Stratus deployment core
//!
//! This crate orchestrates one update of an existing serverless function
//! from a CI pipeline run.
//!
//! # Architecture
//!
//! The run is a straight-line sequence over small, separately testable
//! parts:
//!
//! - **Configuration record** ([`DeployConfig`]): validated deployment
//!   parameters, immutable once constructed
//! - **Artifact resolver** ([`artifact`]): glob patterns, a pre-built
//!   archive, an S3 reference, or an image URI become one resolved code
//!   descriptor
//! - **Update planner** ([`planner`]): a pure function deriving the code
//!   and (optional) configuration update requests
//! - **Readiness waiter** ([`ReadinessWaiter`]): gates every mutation on
//!   the function's two status axes with a bounded attempt budget
//! - **Update executor** ([`UpdateExecutor`]): issues the updates,
//!   configuration strictly before code
//! - **Deployer** ([`Deployer`]): the orchestrator glue
//!
//! # Ordering invariant
//!
//! A configuration update, when one is needed, fully resolves (success or
//! fatal failure) before the code update is attempted. The platform may
//! reject a code update while a configuration update is still in flight,
//! so this ordering is load-bearing, not cosmetic.

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod artifact;
pub mod config;
pub mod deployer;
pub mod dump;
pub mod error;
pub mod executor;
pub mod planner;
pub mod waiter;

pub use artifact::{ResolvedCode, S3Object};
pub use config::{DeployConfig, DEFAULT_MAX_ATTEMPTS};
pub use deployer::Deployer;
pub use dump::DebugSink;
pub use error::{DeployError, DeployResult};
pub use executor::UpdateExecutor;
pub use planner::{plan, UpdatePlan};
pub use waiter::ReadinessWaiter;
