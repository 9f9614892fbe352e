//! The deployment configuration record.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{DeployError, DeployResult};
use crate::planner;

/// Default attempt budget for both readiness wait phases.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Validated deployment parameters for one run.
///
/// Constructed once by the ingestion layer (CLI flags and environment) and
/// never mutated afterwards; the planner derives the update requests from
/// it by value.
#[derive(Debug, Clone, Serialize)]
pub struct DeployConfig {
    /// Target function name or ARN.
    pub function_name: String,
    /// Optimistic-concurrency precondition for the code update.
    pub revision_id: Option<String>,

    /// Deployment region.
    pub region: String,
    #[serde(skip_serializing)]
    pub access_key: Option<String>,
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub profile: Option<String>,

    /// S3 bucket holding a pre-uploaded package.
    pub s3_bucket: Option<String>,
    /// S3 key of the package.
    pub s3_key: Option<String>,
    /// Specific S3 object version.
    pub s3_object_version: Option<String>,
    /// Pre-built local archive.
    pub zip_file: Option<PathBuf>,
    /// Glob patterns to assemble into an archive.
    pub source: Vec<String>,
    /// Container image URI.
    pub image_uri: Option<String>,

    /// Validate only; never publish a new version.
    pub dry_run: bool,
    /// Publish an immutable version snapshot after the update.
    ///
    /// Structurally present for forward compatibility; dry-run always wins
    /// (see the planner).
    pub publish: bool,
    /// Dump request/response bodies to process output.
    pub debug: bool,

    pub memory_size: Option<i64>,
    pub timeout: Option<i64>,
    pub handler: Option<String>,
    pub role: Option<String>,
    pub runtime: Option<String>,
    pub description: Option<String>,
    /// `KEY=VALUE` environment entries.
    pub environment: Vec<String>,
    pub layers: Vec<String>,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub ipv6_dual_stack: bool,
    pub tracing_mode: Option<String>,
    pub architectures: Vec<String>,

    /// Attempt budget for each readiness wait phase.
    pub max_attempts: u32,

    /// Commit that triggered the pipeline run.
    pub commit_sha: Option<String>,
    /// Author of that commit.
    pub commit_author: Option<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            function_name: String::new(),
            revision_id: None,
            region: String::new(),
            access_key: None,
            secret_key: None,
            session_token: None,
            profile: None,
            s3_bucket: None,
            s3_key: None,
            s3_object_version: None,
            zip_file: None,
            source: Vec::new(),
            image_uri: None,
            dry_run: false,
            publish: false,
            debug: false,
            memory_size: None,
            timeout: None,
            handler: None,
            role: None,
            runtime: None,
            description: None,
            environment: Vec::new(),
            layers: Vec::new(),
            subnets: Vec::new(),
            security_groups: Vec::new(),
            ipv6_dual_stack: false,
            tracing_mode: None,
            architectures: Vec::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            commit_sha: None,
            commit_author: None,
        }
    }
}

impl DeployConfig {
    /// Create a configuration targeting one function.
    #[must_use]
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            ..Self::default()
        }
    }

    /// Check the record before any remote call is made.
    ///
    /// The function name must be non-empty and at least one code source must
    /// be configured. Whether a glob source actually matches files is only
    /// known after expansion; the artifact resolver re-checks then.
    pub fn validate(&self) -> DeployResult<()> {
        if self.function_name.trim().is_empty() {
            return Err(DeployError::validation("missing function name"));
        }

        if !self.has_code_source() {
            return Err(DeployError::validation(
                "missing code source: provide a zip file, source patterns, \
                 an S3 bucket/key, or an image URI",
            ));
        }

        Ok(())
    }

    /// Returns true if any code source field is configured.
    #[must_use]
    pub fn has_code_source(&self) -> bool {
        let non_empty = |value: &Option<String>| {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        };

        (non_empty(&self.s3_bucket) && non_empty(&self.s3_key))
            || self
                .zip_file
                .as_deref()
                .is_some_and(|p| !p.as_os_str().is_empty())
            || !planner::trim_values(&self.source).is_empty()
            || non_empty(&self.image_uri)
    }
}
