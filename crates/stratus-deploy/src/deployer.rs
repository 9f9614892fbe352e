//! Top-level orchestration of one deployment run.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use stratus_lambda::{FunctionApi, FunctionConfiguration};

use crate::artifact;
use crate::config::DeployConfig;
use crate::dump::DebugSink;
use crate::error::DeployResult;
use crate::executor::UpdateExecutor;
use crate::planner;
use crate::waiter::ReadinessWaiter;

/// Runs one deployment end to end.
///
/// The sequence is a straight line with an early return on the first
/// error: validate, resolve the artifact, plan the updates, then apply the
/// configuration update (when one is needed) strictly before the code
/// update, each behind its own readiness gate.
pub struct Deployer {
    api: Arc<dyn FunctionApi>,
    config: DeployConfig,
    cancel: CancellationToken,
}

impl Deployer {
    /// Create a deployer for one configuration record.
    #[must_use]
    pub fn new(api: Arc<dyn FunctionApi>, config: DeployConfig) -> Self {
        Self {
            api,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a cancellation token; cancelling it aborts outstanding polls.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute the run and return the updated function descriptor.
    pub async fn run(&self) -> DeployResult<FunctionConfiguration> {
        let debug = DebugSink::new(self.config.debug);
        debug.dump("deployment configuration", &self.config);

        if let Some(sha) = &self.config.commit_sha {
            info!(
                commit = %sha,
                author = self.config.commit_author.as_deref().unwrap_or_default(),
                "deploying pipeline commit"
            );
        }

        self.config.validate()?;

        let resolved = artifact::resolve(&self.config)?;
        let plan = planner::plan(&self.config, &resolved);

        let waiter = ReadinessWaiter::new(
            self.api.clone(),
            self.config.max_attempts,
            self.cancel.clone(),
        );
        let executor = UpdateExecutor::new(self.api.clone(), waiter, debug);

        if let Some(configuration) = &plan.configuration {
            executor
                .apply_configuration(&self.config.function_name, configuration)
                .await?;
        }

        let descriptor = executor
            .apply_code(&self.config.function_name, &plan.code)
            .await?;

        info!(
            function = %self.config.function_name,
            version = descriptor.version.as_deref().unwrap_or_default(),
            code_sha256 = descriptor.code_sha256.as_deref().unwrap_or_default(),
            "function update complete"
        );

        Ok(descriptor)
    }
}

impl std::fmt::Debug for Deployer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployer")
            .field("function_name", &self.config.function_name)
            .finish_non_exhaustive()
    }
}
