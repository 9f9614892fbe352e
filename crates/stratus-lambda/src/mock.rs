//! Scripted mock of the function API for orchestrator tests.

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::client::FunctionApi;
use crate::error::{LambdaError, LambdaResult};
use crate::types::{
    FunctionConfiguration, FunctionState, LastUpdateStatus, UpdateFunctionCodeRequest,
    UpdateFunctionConfigurationRequest,
};

/// Mock function API with a scripted observation sequence and per-operation
/// call counters.
///
/// Each `get_function_configuration` call pops the next scripted snapshot;
/// once the script is drained the last snapshot repeats. With no script at
/// all the mock reports a ready function.
#[derive(Debug, Default)]
pub struct MockFunctionApi {
    inner: RwLock<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    observations: VecDeque<FunctionConfiguration>,
    last_observation: Option<FunctionConfiguration>,
    code_failure: Option<(String, String)>,
    configuration_failure: Option<(String, String)>,
    get_calls: usize,
    code_calls: usize,
    configuration_calls: usize,
}

impl MockFunctionApi {
    /// Create a mock that always reports a ready function.
    #[must_use]
    pub fn ready() -> Self {
        let mock = Self::default();
        mock.push_snapshot(snapshot(
            FunctionState::Active,
            LastUpdateStatus::Successful,
        ));
        mock
    }

    /// Append a full snapshot to the observation script.
    pub fn push_snapshot(&self, configuration: FunctionConfiguration) {
        let mut inner = self.inner.write().expect("mock lock poisoned");
        inner.observations.push_back(configuration);
    }

    /// Append a snapshot with just the two readiness axes set.
    pub fn push_state(&self, state: FunctionState, status: LastUpdateStatus) {
        self.push_snapshot(snapshot(state, status));
    }

    /// Make the next configuration update fail with the given error code.
    pub fn fail_configuration_with(&self, code: impl Into<String>, message: impl Into<String>) {
        let mut inner = self.inner.write().expect("mock lock poisoned");
        inner.configuration_failure = Some((code.into(), message.into()));
    }

    /// Make the next code update fail with the given error code.
    pub fn fail_code_with(&self, code: impl Into<String>, message: impl Into<String>) {
        let mut inner = self.inner.write().expect("mock lock poisoned");
        inner.code_failure = Some((code.into(), message.into()));
    }

    /// Number of `get_function_configuration` calls made so far.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.inner.read().expect("mock lock poisoned").get_calls
    }

    /// Number of `update_function_code` calls made so far.
    #[must_use]
    pub fn code_update_count(&self) -> usize {
        self.inner.read().expect("mock lock poisoned").code_calls
    }

    /// Number of `update_function_configuration` calls made so far.
    #[must_use]
    pub fn configuration_update_count(&self) -> usize {
        self.inner
            .read()
            .expect("mock lock poisoned")
            .configuration_calls
    }
}

fn snapshot(state: FunctionState, status: LastUpdateStatus) -> FunctionConfiguration {
    FunctionConfiguration {
        function_name: "mock".to_owned(),
        state: Some(state),
        last_update_status: Some(status),
        ..Default::default()
    }
}

#[async_trait]
impl FunctionApi for MockFunctionApi {
    async fn get_function_configuration(
        &self,
        function_name: &str,
    ) -> LambdaResult<FunctionConfiguration> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| LambdaError::internal("lock poisoned"))?;
        inner.get_calls += 1;

        let observation = match inner.observations.pop_front() {
            Some(observation) => {
                inner.last_observation = Some(observation.clone());
                observation
            }
            None => inner.last_observation.clone().unwrap_or_else(|| {
                snapshot(FunctionState::Active, LastUpdateStatus::Successful)
            }),
        };

        Ok(FunctionConfiguration {
            function_name: function_name.to_owned(),
            ..observation
        })
    }

    async fn update_function_code(
        &self,
        function_name: &str,
        request: &UpdateFunctionCodeRequest,
    ) -> LambdaResult<FunctionConfiguration> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| LambdaError::internal("lock poisoned"))?;
        inner.code_calls += 1;

        if let Some((code, message)) = inner.code_failure.take() {
            return Err(LambdaError::api(code, message));
        }

        Ok(FunctionConfiguration {
            function_name: function_name.to_owned(),
            version: Some(if request.publish { "2" } else { "$LATEST" }.to_owned()),
            code_sha256: Some("mock-sha256".to_owned()),
            last_modified: Some("2025-03-01T12:00:00.000+0000".to_owned()),
            state: Some(FunctionState::Active),
            last_update_status: Some(LastUpdateStatus::InProgress),
            ..Default::default()
        })
    }

    async fn update_function_configuration(
        &self,
        function_name: &str,
        _request: &UpdateFunctionConfigurationRequest,
    ) -> LambdaResult<FunctionConfiguration> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| LambdaError::internal("lock poisoned"))?;
        inner.configuration_calls += 1;

        if let Some((code, message)) = inner.configuration_failure.take() {
            return Err(LambdaError::api(code, message));
        }

        Ok(FunctionConfiguration {
            function_name: function_name.to_owned(),
            state: Some(FunctionState::Active),
            last_update_status: Some(LastUpdateStatus::InProgress),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_drains_then_repeats() {
        let mock = MockFunctionApi::default();
        mock.push_state(FunctionState::Pending, LastUpdateStatus::InProgress);
        mock.push_state(FunctionState::Active, LastUpdateStatus::Successful);

        let first = mock.get_function_configuration("fn").await.unwrap();
        assert_eq!(first.state, Some(FunctionState::Pending));

        let second = mock.get_function_configuration("fn").await.unwrap();
        assert_eq!(second.state, Some(FunctionState::Active));

        // Drained: the last observation repeats.
        let third = mock.get_function_configuration("fn").await.unwrap();
        assert_eq!(third.state, Some(FunctionState::Active));
        assert_eq!(mock.get_count(), 3);
    }

    #[tokio::test]
    async fn scripted_failure_fires_once() {
        let mock = MockFunctionApi::ready();
        mock.fail_code_with("TooManyRequestsException", "slow down");

        let error = mock
            .update_function_code("fn", &UpdateFunctionCodeRequest::default())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), Some(crate::error::ErrorKind::RateLimited));

        assert!(mock
            .update_function_code("fn", &UpdateFunctionCodeRequest::default())
            .await
            .is_ok());
        assert_eq!(mock.code_update_count(), 2);
    }
}
