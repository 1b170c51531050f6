use mockall::{Sequence, mock};
use smokestack_engine::client::EngineClient;
use smokestack_engine::engine::EngineError;
use smokestack_engine::executor::{CommandOutput, ContainerExecutor};
use smokestack_engine::reaper::{ReapError, ReapMode, ReapOutcome, Reaper};

mock! {
    Executor {}

    impl ContainerExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<CommandOutput, EngineError>;
    }
}

fn is(args: &[String], expected: &[&str]) -> bool {
    args.iter().map(String::as_str).eq(expected.iter().copied())
}

fn reaper(mock: MockExecutor) -> Reaper<MockExecutor> {
    Reaper::new(EngineClient::with_executor(mock))
}

// ── Stop status table ──

#[tokio::test]
async fn stopped_container_is_removed() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["stop", "web"]))
        .times(1)
        .returning(|_| Ok(CommandOutput::ok("web\n")));
    mock.expect_exec()
        .withf(|args| is(args, &["rm", "web"]))
        .times(1)
        .returning(|_| Ok(CommandOutput::ok("web\n")));

    let outcome = reaper(mock).reap("web").await.unwrap();
    assert_eq!(outcome, ReapOutcome::Removed);
}

#[tokio::test]
async fn missing_container_succeeds_without_remove() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["stop", "ghost"]))
        .times(1)
        .returning(|_| Ok(CommandOutput::failed(125, "Error: No such container: ghost")));
    mock.expect_exec()
        .withf(|args| args.first().map(String::as_str) == Some("rm"))
        .never();

    let outcome = reaper(mock).reap("ghost").await.unwrap();
    assert_eq!(outcome, ReapOutcome::AlreadyAbsent);
}

#[tokio::test]
async fn other_stop_status_fails_with_exact_code() {
    for code in [1, 2, 126, 137] {
        let mut mock = MockExecutor::new();

        mock.expect_exec()
            .withf(|args| args[0] == "stop")
            .times(1)
            .returning(move |_| Ok(CommandOutput::failed(code, "boom")));
        mock.expect_exec().withf(|args| args[0] == "rm").never();

        let err = reaper(mock).reap("web").await.unwrap_err();

        assert!(
            matches!(err, ReapError::Stop { ref id, code: Some(c) } if id == "web" && c == code),
            "code {code}: {err:?}"
        );
        assert_eq!(err.exit_code(), Some(code));
    }
}

#[tokio::test]
async fn stop_killed_by_signal_fails_without_code() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .returning(|_| Ok(CommandOutput::new(None, "", "")));

    let err = reaper(mock).reap("web").await.unwrap_err();
    assert!(matches!(err, ReapError::Stop { code: None, .. }));
    assert_eq!(err.exit_code(), None);
}

#[tokio::test]
async fn engine_missing_is_engine_error() {
    let mut mock = MockExecutor::new();

    mock.expect_exec().returning(|_| {
        Err(EngineError::NotFound {
            program: "docker".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    });

    let err = reaper(mock).reap("web").await.unwrap_err();
    assert!(matches!(err, ReapError::Engine { .. }));
}

// ── Remove noise ──

#[tokio::test]
async fn remove_failure_is_ignored_by_default() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args[0] == "stop")
        .returning(|_| Ok(CommandOutput::ok("web\n")));
    mock.expect_exec()
        .withf(|args| args[0] == "rm")
        .times(1)
        .returning(|_| Ok(CommandOutput::failed(1, "removal already in progress")));

    let outcome = reaper(mock).reap("web").await.unwrap();
    assert_eq!(outcome, ReapOutcome::Removed);
}

#[tokio::test]
async fn remove_failure_is_error_when_strict() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args[0] == "stop")
        .returning(|_| Ok(CommandOutput::ok("web\n")));
    mock.expect_exec()
        .withf(|args| args[0] == "rm")
        .returning(|_| Ok(CommandOutput::failed(1, "removal already in progress")));

    let err = reaper(mock)
        .with_strict_remove(true)
        .reap("web")
        .await
        .unwrap_err();

    match err {
        ReapError::Remove { id, code, stderr } => {
            assert_eq!(id, "web");
            assert_eq!(code, Some(1));
            assert_eq!(stderr, "removal already in progress");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ── Idempotency ──

#[tokio::test]
async fn reaping_twice_succeeds_both_times() {
    let mut mock = MockExecutor::new();
    let mut seq = Sequence::new();

    mock.expect_exec()
        .withf(|args| is(args, &["stop", "web"]))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(CommandOutput::ok("web\n")));
    mock.expect_exec()
        .withf(|args| is(args, &["rm", "web"]))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(CommandOutput::ok("web\n")));
    mock.expect_exec()
        .withf(|args| is(args, &["stop", "web"]))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(CommandOutput::failed(125, "No such container: web")));

    let reaper = reaper(mock);

    assert_eq!(reaper.reap("web").await.unwrap(), ReapOutcome::Removed);
    assert_eq!(reaper.reap("web").await.unwrap(), ReapOutcome::AlreadyAbsent);
}

// ── Modes / batches ──

#[tokio::test]
async fn kill_mode_kills_then_removes() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["kill", "web"]))
        .times(1)
        .returning(|_| Ok(CommandOutput::ok("web\n")));
    mock.expect_exec()
        .withf(|args| is(args, &["rm", "web"]))
        .times(1)
        .returning(|_| Ok(CommandOutput::ok("web\n")));
    mock.expect_exec().withf(|args| args[0] == "stop").never();

    let outcome = reaper(mock)
        .with_mode(ReapMode::Kill)
        .reap("web")
        .await
        .unwrap();
    assert_eq!(outcome, ReapOutcome::Removed);
}

#[tokio::test]
async fn reap_all_reports_each_identifier() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["stop", "a"]))
        .returning(|_| Ok(CommandOutput::ok("a\n")));
    mock.expect_exec()
        .withf(|args| is(args, &["rm", "a"]))
        .returning(|_| Ok(CommandOutput::ok("a\n")));
    mock.expect_exec()
        .withf(|args| is(args, &["stop", "b"]))
        .returning(|_| Ok(CommandOutput::failed(125, "No such container: b")));

    let outcomes = reaper(mock).reap_all(&["a", "b"]).await.unwrap();

    assert_eq!(
        outcomes,
        vec![
            ("a".to_owned(), ReapOutcome::Removed),
            ("b".to_owned(), ReapOutcome::AlreadyAbsent),
        ]
    );
}

#[tokio::test]
async fn reap_all_stops_at_first_failure() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| is(args, &["stop", "a"]))
        .times(1)
        .returning(|_| Ok(CommandOutput::failed(3, "permission denied")));
    mock.expect_exec()
        .withf(|args| args.contains(&"b".to_owned()))
        .never();

    let err = reaper(mock).reap_all(&["a", "b"]).await.unwrap_err();
    assert!(matches!(err, ReapError::Stop { code: Some(3), .. }));
}
