//! Wire types for the Lambda function API.
//!
//! Field names follow the PascalCase convention of the service. Optional
//! request fields are omitted from the body entirely rather than sent as
//! null, so an absent field never clobbers remote state.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a function's most recent full (re)configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionState {
    /// The function is being created or reconfigured.
    Pending,
    /// The function is ready to accept mutations and invocations.
    Active,
    /// The last (re)configuration failed.
    Failed,
    /// The function is idle and will be re-initialised on demand.
    Inactive,
}

impl FunctionState {
    /// Get the state name as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Failed => "Failed",
            Self::Inactive => "Inactive",
        }
    }

    /// Returns true if the function can safely accept a new mutation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for FunctionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the most recent code or configuration mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastUpdateStatus {
    /// A mutation is still being applied.
    InProgress,
    /// The most recent mutation completed.
    Successful,
    /// The most recent mutation failed.
    Failed,
}

impl LastUpdateStatus {
    /// Get the status name as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "InProgress",
            Self::Successful => "Successful",
            Self::Failed => "Failed",
        }
    }

    /// Returns true if the most recent mutation has fully settled.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        matches!(self, Self::Successful)
    }
}

impl fmt::Display for LastUpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Function configuration snapshot returned by every read and mutation.
///
/// Every field is optional on the wire except the function name; old
/// function versions predate the state machine fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionConfiguration {
    #[serde(default)]
    pub function_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FunctionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_status: Option<LastUpdateStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_status_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_status_reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
}

/// Request body for the update-function-code operation.
///
/// The inline zip payload, the S3 reference and the image URI may all be
/// present at once; the service enforces their mutual exclusivity.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateFunctionCodeRequest {
    /// Base64-encoded zip package. Use [`encode_zip_file`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_object_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    pub dry_run: bool,
    pub publish: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architectures: Option<Vec<String>>,
}

/// Request body for the update-function-configuration operation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateFunctionConfigurationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_config: Option<VpcConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing_config: Option<TracingConfig>,
}

impl UpdateFunctionConfigurationRequest {
    /// Returns true if no configuration field is set.
    ///
    /// An empty request must not be submitted: the service would treat it as
    /// a no-op mutation and still cycle the function through InProgress.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memory_size.is_none()
            && self.timeout.is_none()
            && self.handler.is_none()
            && self.role.is_none()
            && self.runtime.is_none()
            && self.description.is_none()
            && self.environment.is_none()
            && self.layers.is_none()
            && self.vpc_config.is_none()
            && self.tracing_config.is_none()
    }
}

/// Function environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    pub variables: HashMap<String, String>,
}

/// VPC attachment for the function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcConfig {
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
    pub ipv6_allowed_for_dual_stack: bool,
}

/// X-Ray tracing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TracingConfig {
    pub mode: String,
}

/// Encode a zip package for the inline `ZipFile` request field.
#[must_use]
pub fn encode_zip_file(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_request_omits_absent_fields() {
        let request = UpdateFunctionCodeRequest {
            s3_bucket: Some("deploys".to_owned()),
            s3_key: Some("fn.zip".to_owned()),
            publish: true,
            ..Default::default()
        };

        let value = serde_json::to_value(&request).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["S3Bucket"], "deploys");
        assert_eq!(object["S3Key"], "fn.zip");
        assert_eq!(object["Publish"], true);
        assert_eq!(object["DryRun"], false);
        assert!(!object.contains_key("ZipFile"));
        assert!(!object.contains_key("ImageUri"));
        assert!(!object.contains_key("RevisionId"));
        assert!(!object.contains_key("Architectures"));
    }

    #[test]
    fn configuration_request_emptiness() {
        let mut request = UpdateFunctionConfigurationRequest::default();
        assert!(request.is_empty());

        request.memory_size = Some(256);
        assert!(!request.is_empty());
    }

    #[test]
    fn configuration_snapshot_round_trips_state_axes() {
        let body = r#"{
            "FunctionName": "billing",
            "Version": "7",
            "State": "Pending",
            "StateReasonCode": "Creating",
            "LastUpdateStatus": "InProgress"
        }"#;

        let snapshot: FunctionConfiguration = serde_json::from_str(body).unwrap();
        assert_eq!(snapshot.function_name, "billing");
        assert_eq!(snapshot.state, Some(FunctionState::Pending));
        assert_eq!(snapshot.state_reason_code.as_deref(), Some("Creating"));
        assert_eq!(
            snapshot.last_update_status,
            Some(LastUpdateStatus::InProgress)
        );
        assert!(snapshot.last_modified.is_none());
    }

    #[test]
    fn zip_encoding_is_plain_base64() {
        assert_eq!(encode_zip_file(b"PK\x03\x04"), "UEsDBA==");
    }
}
