//! Readiness gating for the function's asynchronous update lifecycle.
//!
//! The platform exposes two independent status axes: the *function state*
//! (did the last full (re)configuration succeed) and the *last update
//! status* (did the most recent mutation settle). Both must reach their
//! terminal-success values before a new mutation is safe to issue; the
//! platform rejects concurrent mutations on a function with pending work.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use stratus_lambda::{FunctionApi, FunctionConfiguration};

use crate::error::{DeployError, DeployResult};

/// Default delay between poll attempts.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Last observed value on one status axis, kept for the timeout error.
#[derive(Debug, Clone)]
struct Observed {
    value: String,
    reason: String,
    reason_code: String,
}

impl Observed {
    fn unknown() -> Self {
        Self {
            value: "unknown".to_owned(),
            reason: "unknown".to_owned(),
            reason_code: "unknown".to_owned(),
        }
    }
}

/// Polls a function until both readiness axes settle.
///
/// Each wait phase has an independent attempt budget; exhausting it is a
/// fatal error carrying the last observed value and reason. Cancellation
/// aborts an in-flight poll or sleep immediately with a distinct error.
pub struct ReadinessWaiter {
    api: Arc<dyn FunctionApi>,
    max_attempts: u32,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl ReadinessWaiter {
    /// Create a waiter with the default poll interval.
    #[must_use]
    pub fn new(api: Arc<dyn FunctionApi>, max_attempts: u32, cancel: CancellationToken) -> Self {
        Self {
            api,
            max_attempts,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel,
        }
    }

    /// Override the delay between poll attempts.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Gate a mutation: observe both axes once, then wait on whichever has
    /// not yet reached its terminal-success value.
    ///
    /// The gate is advisory. The platform may still reject the mutation
    /// with a conflict if something else races past it; that conflict is
    /// surfaced as a fatal error, never retried here.
    pub async fn ensure_ready(&self, function_name: &str) -> DeployResult<()> {
        let snapshot = self.fetch(function_name).await?;

        if let Some(state) = snapshot.state {
            info!(state = %state, "current function state");
            if !state.is_active() {
                info!(
                    reason = snapshot.state_reason.as_deref().unwrap_or_default(),
                    reason_code = snapshot.state_reason_code.as_deref().unwrap_or_default(),
                    "waiting for function state to become Active"
                );
                self.wait_until_active(function_name).await?;
            }
        }

        if let Some(status) = snapshot.last_update_status {
            info!(last_update_status = %status, "last update status");
            if !status.is_successful() {
                info!(
                    reason = snapshot
                        .last_update_status_reason
                        .as_deref()
                        .unwrap_or_default(),
                    reason_code = snapshot
                        .last_update_status_reason_code
                        .as_deref()
                        .unwrap_or_default(),
                    "waiting for last update status to become Successful"
                );
                self.wait_until_updated(function_name).await?;
            }
        }

        Ok(())
    }

    /// Poll until the function state reaches Active.
    pub async fn wait_until_active(&self, function_name: &str) -> DeployResult<()> {
        self.poll_until(function_name, "Active", |snapshot| {
            match snapshot.state {
                Some(state) if state.is_active() => None,
                _ => Some(Observed {
                    value: snapshot
                        .state
                        .map_or_else(|| "unknown".to_owned(), |s| s.to_string()),
                    reason: field_or_unknown(&snapshot.state_reason),
                    reason_code: field_or_unknown(&snapshot.state_reason_code),
                }),
            }
        })
        .await
    }

    /// Poll until the last update status reaches Successful.
    pub async fn wait_until_updated(&self, function_name: &str) -> DeployResult<()> {
        self.poll_until(function_name, "Successful", |snapshot| {
            match snapshot.last_update_status {
                Some(status) if status.is_successful() => None,
                _ => Some(Observed {
                    value: snapshot
                        .last_update_status
                        .map_or_else(|| "unknown".to_owned(), |s| s.to_string()),
                    reason: field_or_unknown(&snapshot.last_update_status_reason),
                    reason_code: field_or_unknown(&snapshot.last_update_status_reason_code),
                }),
            }
        })
        .await
    }

    /// Poll one axis until `pending` reports it settled or the attempt
    /// budget runs out.
    async fn poll_until<F>(
        &self,
        function_name: &str,
        target: &'static str,
        pending: F,
    ) -> DeployResult<()>
    where
        F: Fn(&FunctionConfiguration) -> Option<Observed>,
    {
        let mut last = Observed::unknown();

        for attempt in 1..=self.max_attempts {
            let snapshot = self.fetch(function_name).await?;

            match pending(&snapshot) {
                None => {
                    debug!(attempt, target, "function settled");
                    return Ok(());
                }
                Some(observed) => {
                    debug!(attempt, target, observed = %observed.value, "still waiting");
                    last = observed;
                }
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    () = self.cancel.cancelled() => return Err(DeployError::Cancelled),
                    () = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        }

        Err(DeployError::ReadinessTimeout {
            target,
            observed: last.value,
            reason: last.reason,
            reason_code: last.reason_code,
        })
    }

    async fn fetch(&self, function_name: &str) -> DeployResult<FunctionConfiguration> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(DeployError::Cancelled),
            result = self.api.get_function_configuration(function_name) => {
                result.map_err(DeployError::Api)
            }
        }
    }
}

fn field_or_unknown(field: &Option<String>) -> String {
    field
        .as_deref()
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown")
        .to_owned()
}
