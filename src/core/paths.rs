//! Path resolution relative to the launcher's install location

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::Error;

/// Directory containing the launcher binary.
///
/// Computed once at startup and passed into everything that resolves
/// sibling files. There is no fallback location: if the OS cannot report
/// where the launcher lives, the run aborts.
#[derive(Debug, Clone)]
pub struct InstallLocation {
    dir: PathBuf,
}

impl InstallLocation {
    /// Resolve from the running executable's own path.
    pub fn from_current_exe() -> Result<Self, Error> {
        let exe = env::current_exe().map_err(|err| Error::Resolution {
            what: "install location",
            reason: format!("cannot determine launcher executable path: {err}"),
        })?;
        let dir = exe.parent().ok_or_else(|| Error::Resolution {
            what: "install location",
            reason: format!(
                "launcher executable {} has no parent directory",
                exe.display()
            ),
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Use a known directory instead of the running executable's.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a file beside the launcher binary. Performs no existence
    /// check.
    pub fn sibling(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

/// Directory containing the JVM's own executables.
///
/// Prefers `$JAVA_HOME/bin` so the application runs under the same Java
/// installation the launcher was pointed at, falling back to the `java`
/// found on the search path. The result becomes the child's working
/// directory; the JVM binary itself is invoked by bare name.
pub fn runtime_bin_dir() -> Result<PathBuf, Error> {
    runtime_bin_dir_from(env::var_os("JAVA_HOME"))
}

fn runtime_bin_dir_from(java_home: Option<OsString>) -> Result<PathBuf, Error> {
    if let Some(home) = java_home {
        if !home.is_empty() {
            return Ok(PathBuf::from(home).join("bin"));
        }
    }

    let java = which::which("java").map_err(|err| Error::Resolution {
        what: "runtime binary directory",
        reason: format!("JAVA_HOME is not set and no java on the search path: {err}"),
    })?;
    match java.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Err(Error::Resolution {
            what: "runtime binary directory",
            reason: format!("java binary {} has no parent directory", java.display()),
        }),
    }
}
