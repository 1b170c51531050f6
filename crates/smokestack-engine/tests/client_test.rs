use mockall::mock;
use smokestack_engine::client::{EngineClient, RunError};
use smokestack_engine::engine::EngineError;
use smokestack_engine::executor::{CommandOutput, ContainerExecutor};
use smokestack_engine::status::StopOutcome;

mock! {
    Executor {}

    impl ContainerExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<CommandOutput, EngineError>;
    }
}

fn is(args: &[String], expected: &[&str]) -> bool {
    args.iter().map(String::as_str).eq(expected.iter().copied())
}

// ── run ──

#[tokio::test]
async fn run_detached_passes_name_ports_and_image() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| {
            is(
                args,
                &[
                    "run",
                    "--detach",
                    "--name",
                    "smk",
                    "--publish",
                    "8080:8080",
                    "site:abc1234",
                ],
            )
        })
        .times(1)
        .returning(|_| Ok(CommandOutput::ok("3f9c2a7e\n")));

    let client = EngineClient::with_executor(mock);
    let id = client
        .run_detached("smk", "site:abc1234", "8080:8080")
        .await
        .unwrap();

    assert_eq!(id, "3f9c2a7e");
}

#[tokio::test]
async fn run_detached_failure_carries_code_and_stderr() {
    let mut mock = MockExecutor::new();

    mock.expect_exec().returning(|_| {
        Ok(CommandOutput::failed(
            125,
            "Bind for 0.0.0.0:8080 failed: port is already allocated\n",
        ))
    });

    let client = EngineClient::with_executor(mock);
    let err = client
        .run_detached("smk", "site:abc1234", "8080:8080")
        .await
        .unwrap_err();

    match err {
        RunError::Failed {
            image,
            code,
            stderr,
        } => {
            assert_eq!(image, "site:abc1234");
            assert_eq!(code, Some(125));
            assert!(stderr.contains("port is already allocated"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn run_detached_engine_missing() {
    let mut mock = MockExecutor::new();

    mock.expect_exec().returning(|_| {
        Err(EngineError::NotFound {
            program: "docker".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    });

    let client = EngineClient::with_executor(mock);
    let result = client.run_detached("smk", "site:v1", "8080:8080").await;

    assert!(matches!(result, Err(RunError::Engine { .. })));
}

// ── stop / kill / rm ──

#[tokio::test]
async fn stop_translates_exit_codes() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["stop", "running"]))
        .returning(|_| Ok(CommandOutput::ok("running\n")));
    mock.expect_exec()
        .withf(|args| is(args, &["stop", "ghost"]))
        .returning(|_| Ok(CommandOutput::failed(125, "No such container: ghost")));
    mock.expect_exec()
        .withf(|args| is(args, &["stop", "wedged"]))
        .returning(|_| Ok(CommandOutput::failed(1, "daemon error")));

    let client = EngineClient::with_executor(mock);

    assert_eq!(client.stop("running").await.unwrap(), StopOutcome::Stopped);
    assert_eq!(client.stop("ghost").await.unwrap(), StopOutcome::AlreadyAbsent);
    assert_eq!(
        client.stop("wedged").await.unwrap(),
        StopOutcome::Failed { code: Some(1) }
    );
}

#[tokio::test]
async fn kill_uses_kill_verb() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["kill", "smk"]))
        .times(1)
        .returning(|_| Ok(CommandOutput::ok("smk\n")));

    let client = EngineClient::with_executor(mock);
    assert_eq!(client.kill("smk").await.unwrap(), StopOutcome::Stopped);
}

#[tokio::test]
async fn force_remove_uses_force_flag() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["rm", "--force", "smk"]))
        .times(1)
        .returning(|_| Ok(CommandOutput::failed(1, "No such container: smk")));

    let client = EngineClient::with_executor(mock);
    let output = client.force_remove("smk").await.unwrap();

    assert!(!output.success());
}

// ── version ──

#[tokio::test]
async fn version_trims_output() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("version"))
        .returning(|_| Ok(CommandOutput::ok("27.3.1\n")));

    let client = EngineClient::with_executor(mock);
    assert_eq!(client.version().await.unwrap(), "27.3.1");
}

#[tokio::test]
async fn version_daemon_unreachable() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .returning(|_| Ok(CommandOutput::failed(1, "Cannot connect to the Docker daemon")));

    let client = EngineClient::with_executor(mock);
    let err = client.version().await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::CommandFailed { code: Some(1), .. }
    ));
    assert!(err.to_string().contains("Cannot connect"));
}
