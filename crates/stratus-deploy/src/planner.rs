//! Update planning: derive the remote update requests from the
//! configuration record.
//!
//! Planning is pure: no I/O, no clock, no remote calls. The artifact
//! resolver has already turned the code-source fields into a
//! [`ResolvedCode`] value by the time `plan` runs.

use std::collections::HashMap;

use stratus_lambda::types::{self, Environment, TracingConfig, VpcConfig};
use stratus_lambda::{UpdateFunctionCodeRequest, UpdateFunctionConfigurationRequest};

use crate::artifact::ResolvedCode;
use crate::config::DeployConfig;

/// The update requests derived from one configuration record.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    /// Always present: every run updates the function's code.
    pub code: UpdateFunctionCodeRequest,
    /// Present only when at least one configuration field survives trimming.
    pub configuration: Option<UpdateFunctionConfigurationRequest>,
}

/// Derive the code and configuration update requests.
#[must_use]
pub fn plan(config: &DeployConfig, resolved: &ResolvedCode) -> UpdatePlan {
    UpdatePlan {
        code: plan_code(config, resolved),
        configuration: plan_configuration(config),
    }
}

fn plan_code(config: &DeployConfig, resolved: &ResolvedCode) -> UpdateFunctionCodeRequest {
    // Dry-run wins over the explicit publish flag: a validation-only run
    // must never create a version snapshot.
    let publish = !config.dry_run;

    let architectures = trim_values(&config.architectures);

    UpdateFunctionCodeRequest {
        zip_file: resolved.zip.as_deref().map(types::encode_zip_file),
        s3_bucket: resolved.s3.as_ref().map(|s3| s3.bucket.clone()),
        s3_key: resolved.s3.as_ref().map(|s3| s3.key.clone()),
        s3_object_version: resolved.s3.as_ref().and_then(|s3| s3.object_version.clone()),
        image_uri: resolved.image_uri.clone(),
        dry_run: config.dry_run,
        publish,
        revision_id: config.revision_id.clone().filter(|id| !id.is_empty()),
        architectures: (!architectures.is_empty()).then_some(architectures),
    }
}

fn plan_configuration(config: &DeployConfig) -> Option<UpdateFunctionConfigurationRequest> {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };

    let environment = trim_values(&config.environment);
    let layers = trim_values(&config.layers);
    let subnets = trim_values(&config.subnets);
    let security_groups = trim_values(&config.security_groups);

    let vpc_config = (!subnets.is_empty() || !security_groups.is_empty()).then(|| VpcConfig {
        subnet_ids: subnets,
        security_group_ids: security_groups,
        ipv6_allowed_for_dual_stack: config.ipv6_dual_stack,
    });

    let request = UpdateFunctionConfigurationRequest {
        memory_size: config.memory_size.filter(|v| *v > 0),
        timeout: config.timeout.filter(|v| *v > 0),
        handler: non_empty(&config.handler),
        role: non_empty(&config.role),
        runtime: non_empty(&config.runtime),
        description: non_empty(&config.description),
        environment: (!environment.is_empty()).then(|| Environment {
            variables: parse_environment(&environment),
        }),
        layers: (!layers.is_empty()).then_some(layers),
        vpc_config,
        tracing_config: non_empty(&config.tracing_mode).map(|mode| TracingConfig { mode }),
    };

    (!request.is_empty()).then_some(request)
}

/// Strip surrounding whitespace from each element and drop the empties.
///
/// Idempotent: trimming an already-trimmed list returns it unchanged.
#[must_use]
pub fn trim_values(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse `KEY=VALUE` entries into a variable map.
///
/// Entries without a `=` are dropped; the value may itself contain `=`
/// (split happens on the first one). Later duplicate keys overwrite
/// earlier ones.
#[must_use]
pub fn parse_environment(entries: &[String]) -> HashMap<String, String> {
    entries
        .iter()
        .filter_map(|entry| entry.split_once('='))
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}
