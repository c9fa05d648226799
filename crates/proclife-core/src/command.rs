use crate::error::ProcessError;
use crate::output::OutputSink;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Signals that can be delivered to a managed process
///
/// The names follow POSIX; platform crates translate them into native
/// signal numbers. `Other` carries a raw platform signal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessSignal {
    Hangup,
    Interrupt,
    Quit,
    Kill,
    User1,
    User2,
    Terminate,
    Other(i32),
}

impl fmt::Display for ProcessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessSignal::Hangup => f.write_str("SIGHUP"),
            ProcessSignal::Interrupt => f.write_str("SIGINT"),
            ProcessSignal::Quit => f.write_str("SIGQUIT"),
            ProcessSignal::Kill => f.write_str("SIGKILL"),
            ProcessSignal::User1 => f.write_str("SIGUSR1"),
            ProcessSignal::User2 => f.write_str("SIGUSR2"),
            ProcessSignal::Terminate => f.write_str("SIGTERM"),
            ProcessSignal::Other(raw) => write!(f, "signal {raw}"),
        }
    }
}

/// Lifecycle state of the process owned by a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessState {
    /// `run()` has not spawned anything yet
    #[default]
    NotStarted,
    /// The process is live; simulated processes carry no pid
    Running { pid: Option<u32> },
    /// The process has been reaped (or the simulation stopped)
    Exited,
}

impl ProcessState {
    pub fn is_started(&self) -> bool {
        !matches!(self, ProcessState::NotStarted)
    }

    /// Pid of the live process, if there is one to signal
    pub fn live_pid(&self) -> Option<u32> {
        match self {
            ProcessState::Running { pid } => *pid,
            _ => None,
        }
    }
}

/// Lifecycle handle for one external process, real or simulated
///
/// A `Command` is created unstarted by an [`Executor`]. `run()` spawns the
/// process and waits for it, while any number of other tasks may observe or
/// signal it through the remaining methods. Every implementation keeps its
/// state behind a private read-write lock; signal delivery only needs the
/// read side.
///
/// Signal operations (`stop`, `stop_with_signal`, `kill`) are no-ops when
/// nothing is running, so they can be called speculatively.
///
/// # Example Usage
///
/// ```rust,no_run
/// use proclife_core::{Command, ProcessError};
/// use std::sync::Arc;
///
/// async fn run_with_deadline(command: Arc<dyn Command>) -> Result<(), ProcessError> {
///     let runner = command.clone();
///     let task = tokio::spawn(async move { runner.run().await });
///     tokio::time::sleep(std::time::Duration::from_secs(30)).await;
///     command.kill().await;
///     task.await.expect("run task panicked")
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync {
    /// Executable identity: an absolute path, or a logical name for simulations
    fn binary(&self) -> &str;

    /// Arguments passed to the executable
    fn args(&self) -> &[String];

    /// Start the process and wait until it terminates
    ///
    /// Returns `Ok(())` on a clean exit and the terminal error otherwise.
    /// A second call fails with [`ProcessError::AlreadyStarted`].
    async fn run(&self) -> Result<(), ProcessError>;

    /// Redirect both stdout and stderr to `output` (or discard them with `None`)
    async fn set_output(&self, output: Option<OutputSink>);

    /// Current output configuration
    async fn output(&self) -> Option<OutputSink>;

    /// Whether `run()` has started the process
    async fn started(&self) -> bool;

    /// Pid of the live process, if any
    async fn pid(&self) -> Option<u32>;

    /// Request a graceful shutdown (SIGINT)
    async fn stop(&self);

    /// Deliver an arbitrary signal
    async fn stop_with_signal(&self, signal: ProcessSignal);

    /// Unconditionally terminate the process (SIGKILL)
    async fn kill(&self);

    /// Best-effort scheduling priority boost; failures are only logged
    async fn update_process(&self);
}

/// Factory for [`Command`] instances
///
/// Real and simulated executors satisfy the same contract, so callers that
/// hold an `Arc<dyn Executor>` never learn which one they were given.
pub trait Executor: Send + Sync {
    /// Create an unstarted command for `name` with the given arguments
    fn new_command(&self, name: &str, args: &[String]) -> Result<Box<dyn Command>, ProcessError>;
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn new_command(&self, name: &str, args: &[String]) -> Result<Box<dyn Command>, ProcessError> {
        (**self).new_command(name, args)
    }
}
