//! End-to-end deployment flow against the scripted platform mock.

use std::sync::Arc;

use stratus_deploy::{DeployConfig, Deployer};
use stratus_lambda::{FunctionState, LastUpdateStatus, MockFunctionApi};

fn zip_config(dir: &tempfile::TempDir) -> DeployConfig {
    let archive = dir.path().join("fn.zip");
    std::fs::write(&archive, b"PK\x03\x04stub").expect("write archive");
    DeployConfig {
        zip_file: Some(archive),
        ..DeployConfig::new("billing")
    }
}

#[tokio::test]
async fn code_only_run_makes_one_gate_pass_and_one_update() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockFunctionApi::ready());

    let descriptor = Deployer::new(api.clone(), zip_config(&dir))
        .run()
        .await
        .unwrap();

    assert_eq!(descriptor.function_name, "billing");
    assert_eq!(descriptor.version.as_deref(), Some("2"));
    assert_eq!(api.get_count(), 1);
    assert_eq!(api.code_update_count(), 1);
    assert_eq!(api.configuration_update_count(), 0);
}

#[tokio::test]
async fn configuration_runs_strictly_before_code() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockFunctionApi::default());
    // Gate before the configuration update: ready.
    api.push_state(FunctionState::Active, LastUpdateStatus::Successful);
    // Gate before the code update: the configuration mutation is still
    // settling, then completes.
    api.push_state(FunctionState::Active, LastUpdateStatus::InProgress);
    api.push_state(FunctionState::Active, LastUpdateStatus::Successful);

    let config = DeployConfig {
        memory_size: Some(512),
        ..zip_config(&dir)
    };

    Deployer::new(api.clone(), config).run().await.unwrap();

    assert_eq!(api.configuration_update_count(), 1);
    assert_eq!(api.code_update_count(), 1);
    // Observation, then the second gate's observation plus one poll.
    assert_eq!(api.get_count(), 3);
}

#[tokio::test]
async fn failed_configuration_update_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockFunctionApi::ready());
    api.fail_configuration_with("ResourceConflictException", "update in progress");

    let config = DeployConfig {
        timeout: Some(30),
        ..zip_config(&dir)
    };

    let error = Deployer::new(api.clone(), config).run().await.unwrap_err();

    assert!(error.to_string().contains("resource-conflict"));
    assert_eq!(api.configuration_update_count(), 1);
    // The ordering invariant: the code update is never attempted.
    assert_eq!(api.code_update_count(), 0);
}

#[tokio::test]
async fn validation_failure_makes_zero_remote_calls() {
    let api = Arc::new(MockFunctionApi::ready());
    let config = DeployConfig::new("billing"); // no code source at all

    let error = Deployer::new(api.clone(), config).run().await.unwrap_err();

    assert!(error.is_validation());
    assert_eq!(api.get_count(), 0);
    assert_eq!(api.code_update_count(), 0);
    assert_eq!(api.configuration_update_count(), 0);
}

#[tokio::test]
async fn empty_glob_expansion_without_other_sources_is_validation() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockFunctionApi::ready());
    let config = DeployConfig {
        source: vec![dir.path().join("*.py").to_string_lossy().into_owned()],
        ..DeployConfig::new("billing")
    };

    let error = Deployer::new(api.clone(), config).run().await.unwrap_err();

    assert!(error.is_validation());
    assert_eq!(api.get_count(), 0);
}

#[tokio::test]
async fn dry_run_suppresses_publishing() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockFunctionApi::ready());
    let config = DeployConfig {
        dry_run: true,
        publish: true,
        ..zip_config(&dir)
    };

    let descriptor = Deployer::new(api.clone(), config).run().await.unwrap();

    // The mock reports $LATEST when the request did not ask to publish.
    assert_eq!(descriptor.version.as_deref(), Some("$LATEST"));
}
