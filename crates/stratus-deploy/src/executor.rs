//! Update execution against the remote platform.

use std::sync::Arc;

use tracing::{error, info};

use stratus_lambda::{
    FunctionApi, FunctionConfiguration, LambdaError, UpdateFunctionCodeRequest,
    UpdateFunctionConfigurationRequest,
};

use crate::dump::DebugSink;
use crate::error::DeployResult;
use crate::waiter::ReadinessWaiter;

/// Issues the planned updates, each behind a readiness gate.
///
/// Request construction is idempotent but the remote effects are not: a
/// configuration failure must stop the run before the code update, so a
/// half-applied deployment is never published.
pub struct UpdateExecutor {
    api: Arc<dyn FunctionApi>,
    waiter: ReadinessWaiter,
    debug: DebugSink,
}

impl UpdateExecutor {
    /// Create an executor.
    #[must_use]
    pub fn new(api: Arc<dyn FunctionApi>, waiter: ReadinessWaiter, debug: DebugSink) -> Self {
        Self { api, waiter, debug }
    }

    /// Apply the configuration update.
    ///
    /// Gated on readiness. On failure the error is logged with its category
    /// and returned; the caller must not proceed to the code update.
    pub async fn apply_configuration(
        &self,
        function_name: &str,
        request: &UpdateFunctionConfigurationRequest,
    ) -> DeployResult<FunctionConfiguration> {
        info!(function = function_name, "updating function configuration");
        self.debug.dump("configuration update request", request);
        self.waiter.ensure_ready(function_name).await?;

        match self
            .api
            .update_function_configuration(function_name, request)
            .await
        {
            Ok(snapshot) => {
                self.debug.dump("configuration update response", &snapshot);
                Ok(snapshot)
            }
            Err(e) => {
                log_api_error("configuration update rejected", &e);
                Err(e.into())
            }
        }
    }

    /// Apply the code update.
    ///
    /// Gated on a second readiness pass: the configuration update, if one
    /// ran, leaves the function cycling through InProgress again.
    pub async fn apply_code(
        &self,
        function_name: &str,
        request: &UpdateFunctionCodeRequest,
    ) -> DeployResult<FunctionConfiguration> {
        info!(function = function_name, "updating function code");
        self.debug.dump("code update request", request);
        self.waiter.ensure_ready(function_name).await?;

        match self.api.update_function_code(function_name, request).await {
            Ok(descriptor) => {
                self.debug.dump("code update response", &descriptor);
                Ok(descriptor)
            }
            Err(e) => {
                log_api_error("code update rejected", &e);
                Err(e.into())
            }
        }
    }
}

/// Log a remote failure with its classified category before propagating.
fn log_api_error(context: &'static str, error: &LambdaError) {
    match error {
        LambdaError::Api {
            kind,
            code,
            message,
        } => {
            error!(category = %kind, code = %code, message = %message, "{context}");
        }
        other => error!(error = %other, "{context}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    use stratus_lambda::MockFunctionApi;

    fn executor(api: Arc<MockFunctionApi>) -> UpdateExecutor {
        let waiter = ReadinessWaiter::new(api.clone(), 5, CancellationToken::new())
            .with_poll_interval(Duration::ZERO);
        UpdateExecutor::new(api, waiter, DebugSink::default())
    }

    #[tokio::test]
    async fn configuration_update_flows_through_the_gate() {
        let api = Arc::new(MockFunctionApi::ready());
        let executor = executor(api.clone());

        let snapshot = executor
            .apply_configuration("fn", &UpdateFunctionConfigurationRequest::default())
            .await
            .unwrap();

        assert_eq!(snapshot.function_name, "fn");
        assert_eq!(api.get_count(), 1);
        assert_eq!(api.configuration_update_count(), 1);
    }

    #[tokio::test]
    async fn rejected_code_update_is_classified_and_returned() {
        let api = Arc::new(MockFunctionApi::ready());
        api.fail_code_with("CodeStorageExceededException", "quota exhausted");
        let executor = executor(api.clone());

        let error = executor
            .apply_code("fn", &UpdateFunctionCodeRequest::default())
            .await
            .unwrap_err();

        assert!(error.to_string().contains("code-storage-exceeded"));
        assert_eq!(api.code_update_count(), 1);
    }
}
