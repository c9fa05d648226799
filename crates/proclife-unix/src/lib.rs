//! Unix process lifecycle implementation
//!
//! Real processes are spawned through tokio and signalled with `kill(2)`;
//! on Linux every child also gets a parent-death SIGKILL so it cannot
//! outlive a crashed manager.

#[cfg(unix)]
mod binary;
#[cfg(unix)]
mod netif;
#[cfg(unix)]
mod oneshot;
#[cfg(unix)]
mod resolve;
#[cfg(unix)]
mod signal;

#[cfg(unix)]
pub use binary::{BinaryCommand, BinaryExecutor};
#[cfg(unix)]
pub use netif::{InterfaceEntry, interface_ipv4, select_ipv4};
#[cfg(unix)]
pub use oneshot::execute;
#[cfg(unix)]
pub use resolve::look_path;
#[cfg(unix)]
pub use signal::signal_number;

pub struct UnixExecutorFactory;

#[cfg(unix)]
impl UnixExecutorFactory {
    pub fn create_executor(
        config: proclife_core::ExecutorConfig,
    ) -> Result<BinaryExecutor, proclife_core::ProcessError> {
        BinaryExecutor::new(config)
    }

    pub fn platform_name() -> &'static str {
        "Unix"
    }
}
