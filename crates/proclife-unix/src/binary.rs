use crate::oneshot::execute;
use crate::resolve::look_path;
use crate::signal::{deliver, from_raw};
use async_trait::async_trait;
use proclife_core::{
    Command, Executor, ExecutorConfig, OutputSink, OutputTarget, ProcessError, ProcessSignal,
    ProcessState, forward,
};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// How long output is still forwarded once the child itself has exited
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

/// Executor that spawns real OS processes
#[derive(Debug, Clone, Default)]
pub struct BinaryExecutor {
    config: ExecutorConfig,
}

impl BinaryExecutor {
    pub fn new(config: ExecutorConfig) -> Result<Self, ProcessError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl Executor for BinaryExecutor {
    fn new_command(&self, name: &str, args: &[String]) -> Result<Box<dyn Command>, ProcessError> {
        Ok(Box::new(BinaryCommand::with_config(
            name,
            args,
            self.config.clone(),
        )?))
    }
}

#[derive(Default)]
struct BinaryState {
    process: ProcessState,
    output: Option<OutputSink>,
}

/// A real child process
///
/// The executable is resolved to an absolute path at construction. `run()`
/// spawns it with both pipes captured and forwards them to the configured
/// [`OutputSink`], so the sink can be swapped while the process runs.
pub struct BinaryCommand {
    binary: String,
    path: PathBuf,
    args: Vec<String>,
    config: ExecutorConfig,
    state: RwLock<BinaryState>,
}

impl BinaryCommand {
    pub fn new(name: &str, args: &[String]) -> Result<Self, ProcessError> {
        Self::with_config(name, args, ExecutorConfig::default())
    }

    pub fn with_config(
        name: &str,
        args: &[String],
        config: ExecutorConfig,
    ) -> Result<Self, ProcessError> {
        let path = look_path(name)?;
        debug!(name, path = %path.display(), "resolved executable");

        Ok(Self {
            binary: path.to_string_lossy().into_owned(),
            path,
            args: args.to_vec(),
            config,
            state: RwLock::new(BinaryState::default()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn build(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.path);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if self.config.kill_on_parent_death {
            kill_on_parent_death(&mut cmd);
        }

        cmd
    }

    fn exit_result(&self, status: ExitStatus) -> Result<(), ProcessError> {
        if status.success() {
            return Ok(());
        }
        if let Some(code) = status.code() {
            return Err(ProcessError::Exited {
                binary: self.binary.clone(),
                code,
            });
        }
        match status.signal() {
            Some(raw) => Err(ProcessError::Signaled {
                binary: self.binary.clone(),
                signal: from_raw(raw),
            }),
            None => Err(ProcessError::Io(std::io::Error::other(format!(
                "unrecognized exit status: {status}"
            )))),
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn kill_on_parent_death(cmd: &mut tokio::process::Command) {
    use nix::sys::prctl;
    use nix::sys::signal::Signal;

    // SAFETY: the closure runs between fork and exec and only issues the
    // async-signal-safe prctl(2) call.
    unsafe {
        cmd.pre_exec(|| {
            prctl::set_pdeathsig(Signal::SIGKILL)?;
            Ok(())
        });
    }
}

// Parent-death signals are a Linux feature; elsewhere the child may outlive us.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn kill_on_parent_death(_cmd: &mut tokio::process::Command) {
    debug!("parent-death signal not supported on this platform");
}

#[async_trait]
impl OutputTarget for BinaryCommand {
    async fn current_output(&self) -> Option<OutputSink> {
        self.state.read().await.output.clone()
    }
}

#[async_trait]
impl Command for BinaryCommand {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn args(&self) -> &[String] {
        &self.args
    }

    async fn run(&self) -> Result<(), ProcessError> {
        let mut child = {
            let mut state = self.state.write().await;
            if state.process.is_started() {
                return Err(ProcessError::AlreadyStarted {
                    binary: self.binary.clone(),
                });
            }

            let child = self.build().spawn().map_err(|source| ProcessError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;
            state.process = ProcessState::Running { pid: child.id() };
            child
        };

        info!(
            binary = %self.binary,
            pid = child.id(),
            args = ?self.args,
            "spawned process"
        );

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let pump_stdout = async {
            if let Some(io) = stdout {
                if let Err(e) = forward(io, self).await {
                    debug!(binary = %self.binary, error = %e, "stdout forwarding stopped");
                }
            }
        };
        let pump_stderr = async {
            if let Some(io) = stderr {
                if let Err(e) = forward(io, self).await {
                    debug!(binary = %self.binary, error = %e, "stderr forwarding stopped");
                }
            }
        };

        let mut pumps = std::pin::pin!(async {
            tokio::join!(pump_stdout, pump_stderr);
        });

        let (status, drained) = tokio::select! {
            status = child.wait() => (status, false),
            () = &mut pumps => (child.wait().await, true),
        };

        // The pid is free for reuse from here on
        self.state.write().await.process = ProcessState::Exited;

        // Descendants may inherit the pipes and keep them open past our child
        if !drained && timeout(OUTPUT_DRAIN_TIMEOUT, &mut pumps).await.is_err() {
            debug!(
                binary = %self.binary,
                "output still open after exit, detaching from descendants"
            );
        }

        let status = status?;
        info!(binary = %self.binary, %status, "process exited");
        self.exit_result(status)
    }

    async fn set_output(&self, output: Option<OutputSink>) {
        self.state.write().await.output = output;
    }

    async fn output(&self) -> Option<OutputSink> {
        self.state.read().await.output.clone()
    }

    async fn started(&self) -> bool {
        self.state.read().await.process.is_started()
    }

    async fn pid(&self) -> Option<u32> {
        self.state.read().await.process.live_pid()
    }

    async fn stop(&self) {
        self.stop_with_signal(ProcessSignal::Interrupt).await;
    }

    async fn stop_with_signal(&self, signal: ProcessSignal) {
        let state = self.state.read().await;
        if let Some(pid) = state.process.live_pid() {
            deliver(pid, signal);
        }
    }

    async fn kill(&self) {
        self.stop_with_signal(ProcessSignal::Kill).await;
    }

    async fn update_process(&self) {
        // Held for the whole renice so run() cannot record the exit meanwhile
        let state = self.state.read().await;
        let Some(pid) = state.process.live_pid() else {
            return;
        };

        let adjustment = self.config.priority_adjustment.to_string();
        let pid_arg = pid.to_string();
        let args = ["-n", adjustment.as_str(), "-p", pid_arg.as_str()];

        match execute(&self.config.renice_binary, &args).await {
            Ok(_) => debug!(pid, adjustment = %adjustment, "renice succeeded"),
            Err(e) => debug!(pid, error = %e, "renice failed"),
        }
    }
}

impl Drop for BinaryCommand {
    fn drop(&mut self) {
        if let Some(pid) = self.state.get_mut().process.live_pid() {
            warn!(pid, binary = %self.binary, "command dropped while running, killing process");
            deliver(pid, ProcessSignal::Kill);
        }
    }
}
