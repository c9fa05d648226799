use proclife::{
    Command, Executor, ExecutorConfig, MockExecutor, PlatformExecutorFactory, ProcessError,
    ProcessSignal,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_target(false)
        .with_line_number(true)
        .try_init();
}

fn binary_executor() -> Arc<dyn Executor> {
    PlatformExecutorFactory::create_executor(ExecutorConfig::default()).unwrap()
}

fn create(executor: &dyn Executor, name: &str, args: &[&str]) -> Arc<dyn Command> {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    Arc::from(executor.new_command(name, &args).unwrap())
}

async fn wait_started(command: &dyn Command) {
    timeout(Duration::from_secs(5), async {
        while !command.started().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("command never started");
}

/// Caller logic that only knows about the trait: start, then stop on demand
async fn start_then_stop(command: Arc<dyn Command>) -> Result<(), ProcessError> {
    assert!(!command.started().await);

    let runner = command.clone();
    let run = tokio::spawn(async move { runner.run().await });
    wait_started(command.as_ref()).await;

    command.stop().await;
    timeout(Duration::from_secs(5), run)
        .await
        .expect("run did not return after stop")
        .expect("run task panicked")
}

#[tokio::test]
async fn test_binary_short_lived_success() {
    init_tracing();
    let command = create(binary_executor().as_ref(), "true", &[]);
    command.run().await.unwrap();
    assert!(command.started().await);
}

#[tokio::test]
async fn test_mock_returns_when_stopped() {
    init_tracing();
    let command = create(&MockExecutor::new(), "longhorn", &["replica"]);

    let runner = command.clone();
    let run = tokio::spawn(async move {
        let result = runner.run().await;
        (result, Instant::now())
    });
    wait_started(command.as_ref()).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!run.is_finished());

    let stop_at = Instant::now();
    command.stop().await;

    let (result, returned_at) = timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert!(result.is_ok());
    assert!(returned_at >= stop_at);
}

#[tokio::test]
async fn test_same_caller_logic_for_both_variants() {
    init_tracing();

    let mock = create(&MockExecutor::new(), "sleep", &["30"]);
    assert!(start_then_stop(mock).await.is_ok());

    let real = create(binary_executor().as_ref(), "sleep", &["30"]);
    let err = start_then_stop(real).await.unwrap_err();
    assert!(matches!(
        err,
        ProcessError::Signaled {
            signal: ProcessSignal::Interrupt,
            ..
        }
    ));
}

#[tokio::test]
async fn test_deadline_enforced_with_kill() {
    init_tracing();
    let command = create(binary_executor().as_ref(), "sleep", &["30"]);

    let runner = command.clone();
    let mut run = tokio::spawn(async move { runner.run().await });

    let outcome = tokio::select! {
        joined = &mut run => joined.unwrap(),
        _ = tokio::time::sleep(Duration::from_millis(200)) => {
            command.kill().await;
            // Killing twice is harmless
            command.kill().await;
            timeout(Duration::from_secs(5), &mut run).await.unwrap().unwrap()
        }
    };

    let err = outcome.unwrap_err();
    assert!(err.is_forced_termination());

    command.kill().await;
    command.stop().await;
}

#[tokio::test]
async fn test_signals_on_unstarted_commands() {
    for command in [
        create(&MockExecutor::new(), "engine", &[]),
        create(binary_executor().as_ref(), "sleep", &["30"]),
    ] {
        timeout(Duration::from_secs(1), async {
            command.stop().await;
            command.stop_with_signal(ProcessSignal::Hangup).await;
            command.kill().await;
        })
        .await
        .expect("signalling an unstarted command blocked");
        assert!(!command.started().await);
    }
}

#[tokio::test]
async fn test_resolution_failure() {
    let result = binary_executor().new_command("proclife-missing-engine", &[]);
    match result {
        Err(e) => assert!(e.is_not_found()),
        Ok(_) => panic!("expected resolution failure"),
    }
}

#[tokio::test]
async fn test_output_redirected_to_file() {
    init_tracing();
    let file = tempfile::NamedTempFile::new().unwrap();
    let command = create(
        binary_executor().as_ref(),
        "sh",
        &["-c", "echo replica ready; echo warning >&2"],
    );

    let handle = tokio::fs::File::from_std(file.reopen().unwrap());
    command
        .set_output(Some(proclife::OutputSink::new(Box::new(handle))))
        .await;
    command.run().await.unwrap();

    let written = std::fs::read_to_string(file.path()).unwrap();
    assert!(written.contains("replica ready\n"));
    assert!(written.contains("warning\n"));
}

#[tokio::test]
async fn test_interface_lookup_not_found() {
    let err = proclife::interface_ipv4("proclife-nope0").unwrap_err();
    assert!(matches!(err, ProcessError::InterfaceNotFound { .. }));
}
