//! Stratus CLI - update an existing Lambda function from a CI pipeline.
//!
//! Every flag can also be supplied through a `PLUGIN_*` environment
//! variable, the convention CI runners use to pass plugin settings.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use stratus_deploy::{DeployConfig, Deployer, DEFAULT_MAX_ATTEMPTS};
use stratus_lambda::{credentials, CredentialConfig, FunctionApi, LambdaClient};

#[derive(Parser, Debug)]
#[command(name = "stratus")]
#[command(about = "Deploy code and configuration updates to an existing Lambda function")]
#[command(version)]
struct Args {
    /// AWS region of the target function.
    #[arg(long, env = "PLUGIN_REGION")]
    region: Option<String>,

    /// AWS access key.
    #[arg(long, env = "PLUGIN_ACCESS_KEY")]
    access_key: Option<String>,

    /// AWS secret key.
    #[arg(long, env = "PLUGIN_SECRET_KEY")]
    secret_key: Option<String>,

    /// AWS session token.
    #[arg(long, env = "PLUGIN_SESSION_TOKEN")]
    session_token: Option<String>,

    /// Named profile in the shared credentials file.
    #[arg(long, env = "PLUGIN_PROFILE")]
    profile: Option<String>,

    /// Custom service endpoint (local emulators).
    #[arg(long, env = "PLUGIN_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Name (or ARN) of the function to update.
    #[arg(long, env = "PLUGIN_FUNCTION_NAME")]
    function_name: String,

    /// Only update if the function's revision ID matches.
    #[arg(long, env = "PLUGIN_REVISION_ID")]
    revision_id: Option<String>,

    /// S3 bucket holding the deployment package.
    #[arg(long, env = "PLUGIN_S3_BUCKET")]
    s3_bucket: Option<String>,

    /// S3 key of the deployment package.
    #[arg(long, env = "PLUGIN_S3_KEY")]
    s3_key: Option<String>,

    /// Specific version of the S3 object.
    #[arg(long, env = "PLUGIN_S3_OBJECT_VERSION")]
    s3_object_version: Option<String>,

    /// Pre-built zip package to upload.
    #[arg(long, env = "PLUGIN_ZIP_FILE")]
    zip_file: Option<PathBuf>,

    /// Glob patterns to assemble into a zip package.
    #[arg(long, env = "PLUGIN_SOURCE", value_delimiter = ',')]
    source: Vec<String>,

    /// URI of a container image in the registry.
    #[arg(long, env = "PLUGIN_IMAGE_URI")]
    image_uri: Option<String>,

    /// Validate the request without modifying the function.
    #[arg(long, env = "PLUGIN_DRY_RUN")]
    dry_run: bool,

    /// Dump request and response bodies to standard output.
    #[arg(long, env = "PLUGIN_DEBUG")]
    debug: bool,

    /// Publish a new version after updating the code.
    #[arg(long, env = "PLUGIN_PUBLISH")]
    publish: bool,

    /// Memory available to the function, in MB.
    #[arg(long, env = "PLUGIN_MEMORY_SIZE")]
    memory_size: Option<i64>,

    /// Maximum run time before the function is stopped, in seconds.
    #[arg(long, env = "PLUGIN_TIMEOUT")]
    timeout: Option<i64>,

    /// Method the runtime calls to execute the function.
    #[arg(long, env = "PLUGIN_HANDLER")]
    handler: Option<String>,

    /// ARN of the function's execution role.
    #[arg(long, env = "PLUGIN_ROLE")]
    role: Option<String>,

    /// Identifier of the function's runtime.
    #[arg(long, env = "PLUGIN_RUNTIME")]
    runtime: Option<String>,

    /// Description of the function.
    #[arg(long, env = "PLUGIN_DESCRIPTION")]
    description: Option<String>,

    /// Environment variables, KEY=VALUE.
    #[arg(long, env = "PLUGIN_ENVIRONMENT", value_delimiter = ',')]
    environment: Vec<String>,

    /// Function layer ARNs.
    #[arg(long, env = "PLUGIN_LAYERS", value_delimiter = ',')]
    layers: Vec<String>,

    /// VPC subnets for the function's network configuration.
    #[arg(long, env = "PLUGIN_SUBNETS", value_delimiter = ',')]
    subnets: Vec<String>,

    /// VPC security groups for the function's network configuration.
    #[arg(long = "securitygroups", env = "PLUGIN_SECURITY_GROUPS", value_delimiter = ',')]
    security_groups: Vec<String>,

    /// Allow dual-stack IPv6 in the VPC configuration.
    #[arg(long, env = "PLUGIN_IPV6_DUAL_STACK")]
    ipv6_dual_stack: bool,

    /// X-Ray tracing mode.
    #[arg(long, env = "PLUGIN_TRACING_MODE")]
    tracing_mode: Option<String>,

    /// Processor architectures the function runs on.
    #[arg(long, env = "PLUGIN_ARCHITECTURES", value_delimiter = ',')]
    architectures: Vec<String>,

    /// Attempt budget for each readiness wait.
    #[arg(long, env = "PLUGIN_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Commit that triggered this pipeline run.
    #[arg(long = "commit-sha", env = "DRONE_COMMIT_SHA")]
    commit_sha: Option<String>,

    /// Author of the triggering commit.
    #[arg(long = "commit-author", env = "DRONE_COMMIT_AUTHOR")]
    commit_author: Option<String>,
}

impl Args {
    fn into_config(self) -> (DeployConfig, Option<String>) {
        let endpoint_url = self.endpoint_url.clone();
        let config = DeployConfig {
            function_name: self.function_name,
            revision_id: self.revision_id,
            region: self.region.unwrap_or_default(),
            access_key: self.access_key,
            secret_key: self.secret_key,
            session_token: self.session_token,
            profile: self.profile,
            s3_bucket: self.s3_bucket,
            s3_key: self.s3_key,
            s3_object_version: self.s3_object_version,
            zip_file: self.zip_file,
            source: self.source,
            image_uri: self.image_uri,
            dry_run: self.dry_run,
            publish: self.publish,
            debug: self.debug,
            memory_size: self.memory_size,
            timeout: self.timeout,
            handler: self.handler,
            role: self.role,
            runtime: self.runtime,
            description: self.description,
            environment: self.environment,
            layers: self.layers,
            subnets: self.subnets,
            security_groups: self.security_groups,
            ipv6_dual_stack: self.ipv6_dual_stack,
            tracing_mode: self.tracing_mode,
            architectures: self.architectures,
            max_attempts: self.max_attempts,
            commit_sha: self.commit_sha,
            commit_author: self.commit_author,
        };
        (config, endpoint_url)
    }
}

/// Resolve the deployment region: flag first, then the ambient environment.
fn resolve_region(configured: &str) -> anyhow::Result<String> {
    if !configured.is_empty() {
        return Ok(configured.to_owned());
    }
    for name in ["AWS_REGION", "AWS_DEFAULT_REGION"] {
        if let Ok(region) = std::env::var(name) {
            if !region.is_empty() {
                return Ok(region);
            }
        }
    }
    anyhow::bail!("missing region: set --region or AWS_REGION")
}

async fn run(args: Args) -> anyhow::Result<()> {
    let (mut config, endpoint_url) = args.into_config();
    config.region = resolve_region(&config.region)?;

    let credentials = credentials::resolve(&CredentialConfig {
        access_key: config.access_key.clone(),
        secret_key: config.secret_key.clone(),
        session_token: config.session_token.clone(),
        profile: config.profile.clone(),
    })?;

    let client = match &endpoint_url {
        Some(endpoint) => {
            LambdaClient::with_base_url(config.region.as_str(), credentials, endpoint.as_str())?
        }
        None => LambdaClient::new(config.region.as_str(), credentials)?,
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let api: Arc<dyn FunctionApi> = Arc::new(client);
    let function_name = config.function_name.clone();
    let dry_run = config.dry_run;

    let descriptor = Deployer::new(api, config)
        .with_cancellation(cancel)
        .run()
        .await?;

    if dry_run {
        println!("Dry run for {function_name} validated");
    } else {
        println!(
            "Function {function_name} updated (version {})",
            descriptor.version.as_deref().unwrap_or("$LATEST")
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
