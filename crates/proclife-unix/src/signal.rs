use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid as NixPid;
use proclife_core::ProcessSignal;
use tracing::{debug, warn};

pub(crate) fn to_native(signal: ProcessSignal) -> Option<Signal> {
    match signal {
        ProcessSignal::Hangup => Some(Signal::SIGHUP),
        ProcessSignal::Interrupt => Some(Signal::SIGINT),
        ProcessSignal::Quit => Some(Signal::SIGQUIT),
        ProcessSignal::Kill => Some(Signal::SIGKILL),
        ProcessSignal::User1 => Some(Signal::SIGUSR1),
        ProcessSignal::User2 => Some(Signal::SIGUSR2),
        ProcessSignal::Terminate => Some(Signal::SIGTERM),
        ProcessSignal::Other(raw) => Signal::try_from(raw).ok(),
    }
}

/// Native signal number, as used for `128 + n` shell exit codes
pub fn signal_number(signal: ProcessSignal) -> Option<i32> {
    to_native(signal).map(|native| native as i32)
}

pub(crate) fn from_raw(raw: i32) -> ProcessSignal {
    match Signal::try_from(raw) {
        Ok(Signal::SIGHUP) => ProcessSignal::Hangup,
        Ok(Signal::SIGINT) => ProcessSignal::Interrupt,
        Ok(Signal::SIGQUIT) => ProcessSignal::Quit,
        Ok(Signal::SIGKILL) => ProcessSignal::Kill,
        Ok(Signal::SIGUSR1) => ProcessSignal::User1,
        Ok(Signal::SIGUSR2) => ProcessSignal::User2,
        Ok(Signal::SIGTERM) => ProcessSignal::Terminate,
        _ => ProcessSignal::Other(raw),
    }
}

/// Deliver `signal` to `pid`; a process that is already gone is not an error
pub(crate) fn deliver(pid: u32, signal: ProcessSignal) {
    let Some(native) = to_native(signal) else {
        warn!(pid, %signal, "unsupported signal, not delivered");
        return;
    };

    let Ok(raw_pid) = i32::try_from(pid) else {
        warn!(pid, "pid out of range, signal not delivered");
        return;
    };

    match signal::kill(NixPid::from_raw(raw_pid), native) {
        Ok(()) => {
            debug!(pid, %signal, "sent signal to process");
        }
        Err(Errno::ESRCH) => {
            debug!(pid, %signal, "process not found (already terminated)");
        }
        Err(Errno::EPERM) => {
            warn!(pid, %signal, "permission denied to signal process");
        }
        Err(e) => {
            warn!(pid, %signal, error = %e, "failed to send signal");
        }
    }
}
