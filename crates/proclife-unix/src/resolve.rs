use nix::unistd::{AccessFlags, access};
use proclife_core::ProcessError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Resolve `name` to an absolute path of an executable file
///
/// Names containing a `/` are taken as paths; anything else is searched for
/// in `PATH`. Resolving once up front means later changes to `PATH` or the
/// working directory cannot redirect what gets launched.
pub fn look_path(name: &str) -> Result<PathBuf, ProcessError> {
    look_path_in(name, std::env::var_os("PATH").as_deref())
}

pub(crate) fn look_path_in(name: &str, path_var: Option<&OsStr>) -> Result<PathBuf, ProcessError> {
    let not_found = || ProcessError::NotFound {
        name: name.to_string(),
    };

    if name.is_empty() {
        return Err(not_found());
    }

    if name.contains('/') {
        let candidate = Path::new(name);
        return if is_executable(candidate) {
            Ok(std::path::absolute(candidate)?)
        } else {
            Err(not_found())
        };
    }

    let Some(path_var) = path_var else {
        return Err(not_found());
    };

    for dir in std::env::split_paths(path_var) {
        // An empty PATH entry means the current directory
        let dir = if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir
        };
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Ok(std::path::absolute(candidate)?);
        }
    }

    Err(not_found())
}

fn is_executable(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false) && access(path, AccessFlags::X_OK).is_ok()
}
