//! In-memory command variant for tests
//!
//! A [`MockCommand`] never touches the operating system. `run()` marks the
//! command as started and parks until another task stops it, which gives
//! tests a deterministic stand-in for a long-running process.

use crate::command::{Command, Executor, ProcessSignal, ProcessState};
use crate::error::ProcessError;
use crate::output::OutputSink;
use crate::rendezvous::Rendezvous;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Executor producing [`MockCommand`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct MockExecutor;

impl MockExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for MockExecutor {
    fn new_command(&self, name: &str, args: &[String]) -> Result<Box<dyn Command>, ProcessError> {
        Ok(Box::new(MockCommand::new(name, args)?))
    }
}

pub struct MockCommand {
    binary: String,
    args: Vec<String>,
    state: RwLock<ProcessState>,
    stop: Rendezvous<Result<(), ProcessError>>,
}

impl MockCommand {
    pub fn new(name: &str, args: &[String]) -> Result<Self, ProcessError> {
        if name.is_empty() {
            return Err(ProcessError::NotFound {
                name: name.to_string(),
            });
        }

        Ok(Self {
            binary: name.to_string(),
            args: args.to_vec(),
            state: RwLock::new(ProcessState::NotStarted),
            stop: Rendezvous::new(),
        })
    }

    /// Stop the simulated process, making `run()` return `result`
    ///
    /// Waits until `run()` has taken the result. Returns immediately when the
    /// command is not running, including when a concurrent stop got there first.
    pub async fn stop_with_result(&self, result: Result<(), ProcessError>) {
        let sender = self.stop.sender().await;

        if !matches!(*self.state.read().await, ProcessState::Running { .. }) {
            debug!(binary = %self.binary, "mock command not running, ignoring stop");
            return;
        }

        sender.send(result).await;
    }
}

#[async_trait]
impl Command for MockCommand {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn args(&self) -> &[String] {
        &self.args
    }

    async fn run(&self) -> Result<(), ProcessError> {
        {
            let mut state = self.state.write().await;
            if state.is_started() {
                return Err(ProcessError::AlreadyStarted {
                    binary: self.binary.clone(),
                });
            }
            *state = ProcessState::Running { pid: None };
        }
        debug!(binary = %self.binary, "mock command started");

        let handoff = self.stop.take().await;
        *self.state.write().await = ProcessState::Exited;
        debug!(binary = %self.binary, "mock command stopped");

        match handoff {
            Some((result, ack)) => {
                ack.complete();
                result
            }
            None => Ok(()),
        }
    }

    async fn set_output(&self, _output: Option<OutputSink>) {}

    async fn output(&self) -> Option<OutputSink> {
        None
    }

    async fn started(&self) -> bool {
        self.state.read().await.is_started()
    }

    async fn pid(&self) -> Option<u32> {
        None
    }

    async fn stop(&self) {
        self.stop_with_result(Ok(())).await;
    }

    async fn stop_with_signal(&self, _signal: ProcessSignal) {
        self.stop().await;
    }

    async fn kill(&self) {}

    async fn update_process(&self) {}
}
