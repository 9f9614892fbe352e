//! HTTP client for the Lambda function API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::{LambdaError, LambdaResult};
use crate::sign::{self, SigningParams};
use crate::types::{
    FunctionConfiguration, UpdateFunctionCodeRequest, UpdateFunctionConfigurationRequest,
};

const SERVICE: &str = "lambda";
const API_VERSION: &str = "2015-03-31";

/// Remote operations the deployer needs from the platform.
///
/// The orchestrator only ever talks to this trait, so tests substitute a
/// scripted implementation and never open a socket.
#[async_trait]
pub trait FunctionApi: Send + Sync {
    /// Fetch the function's configuration snapshot, including both
    /// readiness axes.
    async fn get_function_configuration(
        &self,
        function_name: &str,
    ) -> LambdaResult<FunctionConfiguration>;

    /// Replace the function's code package.
    async fn update_function_code(
        &self,
        function_name: &str,
        request: &UpdateFunctionCodeRequest,
    ) -> LambdaResult<FunctionConfiguration>;

    /// Apply a configuration mutation.
    async fn update_function_configuration(
        &self,
        function_name: &str,
        request: &UpdateFunctionConfigurationRequest,
    ) -> LambdaResult<FunctionConfiguration>;
}

/// SigV4-signing HTTP client for the function API.
#[derive(Debug, Clone)]
pub struct LambdaClient {
    client: Client,
    base_url: String,
    host: String,
    region: String,
    credentials: Credentials,
}

impl LambdaClient {
    /// Create a client for the service's regional endpoint.
    pub fn new(region: impl Into<String>, credentials: Credentials) -> LambdaResult<Self> {
        let region = region.into();
        let base_url = format!("https://lambda.{region}.amazonaws.com");
        Self::with_base_url(region, credentials, base_url)
    }

    /// Create a client against a custom endpoint (local emulators, tests).
    pub fn with_base_url(
        region: impl Into<String>,
        credentials: Credentials,
        base_url: impl Into<String>,
    ) -> LambdaResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let host = base_url
            .split_once("://")
            .map_or(base_url.as_str(), |(_, rest)| rest)
            .split('/')
            .next()
            .unwrap_or_default()
            .to_owned();

        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(LambdaError::Http)?;

        Ok(Self {
            client,
            base_url,
            host,
            region: region.into(),
            credentials,
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> LambdaResult<FunctionConfiguration> {
        let payload = body.unwrap_or_default();
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let signed = sign::sign_request(
            method.as_str(),
            &self.host,
            path,
            &payload,
            &SigningParams {
                credentials: &self.credentials,
                region: &self.region,
                service: SERVICE,
                amz_date: &amz_date,
            },
        );

        debug!(method = %method, path, "sending function API request");

        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .header(AUTHORIZATION, signed.authorization.as_str())
            .header("x-amz-date", signed.amz_date.as_str());

        if let Some(token) = &signed.security_token {
            request = request.header("x-amz-security-token", token.as_str());
        }

        if !payload.is_empty() {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = request.send().await.map_err(LambdaError::Http)?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: Response) -> LambdaResult<FunctionConfiguration> {
        if response.status().is_success() {
            return response.json().await.map_err(LambdaError::Http);
        }

        let code = response
            .headers()
            .get("x-amzn-ErrorType")
            .and_then(|value| value.to_str().ok())
            .map_or("Unknown", |value| {
                // The header may carry a suffix: "Type:http://..." or "Type#ns".
                value.split([':', '#']).next().unwrap_or(value)
            })
            .to_owned();

        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => format!("request failed with status {status}"),
        };

        Err(LambdaError::api(code, message))
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(alias = "Message")]
    message: String,
}

#[async_trait]
impl FunctionApi for LambdaClient {
    async fn get_function_configuration(
        &self,
        function_name: &str,
    ) -> LambdaResult<FunctionConfiguration> {
        let path = format!("/{API_VERSION}/functions/{function_name}/configuration");
        self.send(Method::GET, &path, None).await
    }

    async fn update_function_code(
        &self,
        function_name: &str,
        request: &UpdateFunctionCodeRequest,
    ) -> LambdaResult<FunctionConfiguration> {
        let path = format!("/{API_VERSION}/functions/{function_name}/code");
        let body = serde_json::to_vec(request)?;
        self.send(Method::PUT, &path, Some(body)).await
    }

    async fn update_function_configuration(
        &self,
        function_name: &str,
        request: &UpdateFunctionConfigurationRequest,
    ) -> LambdaResult<FunctionConfiguration> {
        let path = format!("/{API_VERSION}/functions/{function_name}/configuration");
        let body = serde_json::to_vec(request)?;
        self.send(Method::PUT, &path, Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> Credentials {
        Credentials {
            access_key: "AKID".to_owned(),
            secret_key: "secret".to_owned(),
            session_token: None,
        }
    }

    #[test]
    fn regional_endpoint_construction() {
        let client = LambdaClient::new("eu-central-1", test_credentials()).unwrap();
        assert_eq!(client.base_url, "https://lambda.eu-central-1.amazonaws.com");
        assert_eq!(client.host, "lambda.eu-central-1.amazonaws.com");
    }

    #[test]
    fn custom_endpoint_keeps_the_port_in_the_host() {
        let client = LambdaClient::with_base_url(
            "us-east-1",
            test_credentials(),
            "http://localhost:9001/",
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:9001");
        assert_eq!(client.host, "localhost:9001");
    }
}
