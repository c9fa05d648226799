//! proclife core - platform-independent process lifecycle contract
//!
//! This crate provides the `Command`/`Executor` traits, the error and
//! configuration types shared by platform implementations, output plumbing,
//! and an in-memory mock variant for tests.

mod command;
mod config;
mod error;
pub mod mock;
mod output;
mod rendezvous;

pub use command::*;
pub use config::*;
pub use error::*;
pub use mock::{MockCommand, MockExecutor};
pub use output::*;
