//! proclife - process lifecycle management for instance managers
//!
//! Re-exports the platform-independent contract from `proclife-core` and
//! selects the platform executor at compile time. The `proclife` binary
//! built from this crate is a thin front end over the same API.

pub mod cli;
pub mod logging;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::{CliArgs, CliCommand};

pub use proclife_core::*;

#[cfg(unix)]
pub use proclife_unix::{
    BinaryCommand, BinaryExecutor, InterfaceEntry, execute, interface_ipv4, look_path,
    select_ipv4, signal_number,
};

#[cfg(not(unix))]
compile_error!("Unsupported platform: only Unix is currently supported");

/// Platform-independent factory that selects the executor at compile time
pub struct PlatformExecutorFactory;

impl PlatformExecutorFactory {
    pub fn create_executor(config: ExecutorConfig) -> Result<Arc<dyn Executor>, ProcessError> {
        let executor = proclife_unix::UnixExecutorFactory::create_executor(config)?;
        info!(
            platform = Self::platform_name(),
            "created process executor"
        );
        Ok(Arc::new(executor))
    }

    pub fn platform_name() -> &'static str {
        proclife_unix::UnixExecutorFactory::platform_name()
    }
}

/// Entry point used by `main.rs`; returns the process exit code
pub async fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        CliCommand::InterfaceIp { interface } => {
            let ip = interface_ipv4(&interface)
                .with_context(|| format!("looking up address of interface '{interface}'"))?;
            match ip {
                Some(ip) => {
                    println!("{ip}");
                    Ok(0)
                }
                None => {
                    eprintln!("interface '{interface}' has no usable IPv4 address");
                    Ok(1)
                }
            }
        }
        CliCommand::Run {
            renice,
            priority,
            output,
            no_parent_death_signal,
            binary,
            args,
        } => {
            let config = ExecutorConfig::builder()
                .kill_on_parent_death(!no_parent_death_signal)
                .priority_adjustment(priority)
                .build()
                .context("building executor configuration")?;
            let executor = PlatformExecutorFactory::create_executor(config)?;
            let command: Arc<dyn Command> = Arc::from(
                executor
                    .new_command(&binary, &args)
                    .with_context(|| format!("preparing '{binary}'"))?,
            );

            let sink = match output {
                Some(path) => {
                    let file = tokio::fs::OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(&path)
                        .await
                        .with_context(|| format!("opening output file {}", path.display()))?;
                    OutputSink::new(Box::new(file))
                }
                None => OutputSink::stdout(),
            };
            command.set_output(Some(sink)).await;

            let result = supervise(command, renice).await?;
            if let Err(e) = &result {
                warn!(error = %e, "command finished with an error");
            }
            Ok(exit_code(&result))
        }
    }
}

/// Run `command` to completion, relaying Ctrl-C as stop and then kill
async fn supervise(command: Arc<dyn Command>, renice: bool) -> Result<Result<(), ProcessError>> {
    let runner = command.clone();
    let mut run = tokio::spawn(async move { runner.run().await });

    if renice {
        let tuner = command.clone();
        tokio::spawn(async move {
            let started = tokio::time::timeout(Duration::from_secs(5), async {
                while !tuner.started().await {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await;
            if started.is_ok() {
                tuner.update_process().await;
            }
        });
    }

    let mut interrupts = 0;
    loop {
        tokio::select! {
            joined = &mut run => {
                return joined.context("command task failed");
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for Ctrl-C")?;
                interrupts += 1;
                if interrupts == 1 {
                    info!(binary = command.binary(), "interrupt received, stopping process");
                    command.stop().await;
                } else {
                    warn!(binary = command.binary(), "second interrupt received, killing process");
                    command.kill().await;
                }
            }
        }
    }
}

/// Shell-style exit code for a command outcome: the child's own code, or
/// `128 + n` when it died from signal `n`
pub fn exit_code(result: &Result<(), ProcessError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(ProcessError::Exited { code, .. }) => *code,
        Err(ProcessError::Signaled { signal, .. }) => 128 + signal_number(*signal).unwrap_or(0),
        Err(_) => 1,
    }
}
