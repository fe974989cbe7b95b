//! Launch supervision - building the JVM command line and starting the child

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tracing::info;

use crate::core::config::{ConfigFile, LoadOutcome};
use crate::core::monitor::{self, MonitorOutcome};
use crate::core::paths::{self, InstallLocation};
use crate::core::Error;
use crate::platform;
use crate::ui;
use crate::APP_NAME;

/// Config file naming the installable jar (key `jarfile`). Required: there
/// is nothing sensible to default the target identity to.
pub const PROGRAM_CONFIG: &str = "program.properties";

/// Config file holding launch tunables. Rebuilt from defaults when absent.
pub const TUNABLES_CONFIG: &str = "jmemory.properties";

/// Marker argument appended before the forwarded arguments so the
/// application can detect a supervised launch.
pub const SUPERVISED_ARG: &str = "jmemory";

/// Substring of child output that marks a successful startup.
pub const READY_SENTINEL: &str = "jmemory ok";

/// Maximum heap handed to the JVM when the tunables file supplies none.
pub const DEFAULT_XMX: &str = "1g";

/// Jar launched when the program config omits the `jarfile` key.
pub const DEFAULT_JARFILE: &str = "jeveassets.jar";

const KEY_JARFILE: &str = "jarfile";
const KEY_XMX: &str = "xmx";
const KEY_MONITOR: &str = "monitor";
const KEY_TIMEOUT: &str = "timeout";
const KEY_CONSOLE: &str = "console";

/// Defaults written to a freshly seeded tunables file. `timeout` is in
/// seconds; `0` means no timeout.
pub const TUNABLE_DEFAULTS: &[(&str, &str)] = &[
    (KEY_XMX, DEFAULT_XMX),
    (KEY_MONITOR, "true"),
    (KEY_TIMEOUT, "0"),
    (KEY_CONSOLE, "false"),
];

/// How the supervisor treats the child after spawning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPolicy {
    /// Start the child and exit immediately, no monitoring
    FireAndForget,
    /// Scan merged child output for the ready sentinel before exiting
    Monitored { timeout: Option<Duration> },
}

impl LaunchPolicy {
    fn from_tunables(tunables: &ConfigFile) -> Self {
        if !parse_flag(tunables.get(KEY_MONITOR, "true"), true) {
            return Self::FireAndForget;
        }
        let timeout = tunables
            .get(KEY_TIMEOUT, "0")
            .parse::<u64>()
            .ok()
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);
        Self::Monitored { timeout }
    }
}

/// Fully assembled child invocation. Built fresh per run, never mutated.
#[derive(Debug, Clone)]
pub struct LaunchCommand {
    /// JVM binary, invoked by bare name
    pub binary: String,
    /// Arguments in their fixed order: heap flag, jar flag, target path,
    /// supervised-launch marker, then all forwarded arguments
    pub args: Vec<String>,
    /// Working directory: the JVM's own bin directory
    pub working_dir: PathBuf,
}

impl LaunchCommand {
    pub fn build(
        binary: &str,
        xmx: &str,
        target: &Path,
        working_dir: PathBuf,
        forwarded: Vec<String>,
    ) -> Self {
        // The heap value is passed through verbatim; a malformed value is
        // the JVM's to reject, and that rejection surfaces via monitoring.
        let mut args = vec![
            format!("-Xmx{xmx}"),
            "-jar".to_string(),
            target.display().to_string(),
            SUPERVISED_ARG.to_string(),
        ];
        args.extend(forwarded);
        Self {
            binary: binary.to_string(),
            args,
            working_dir,
        }
    }
}

/// Terminal outcome of a supervised launch. Every variant exits 0; fatal
/// conditions travel as [`Error`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// Child started, no monitoring requested
    Detached,
    /// Child emitted the ready sentinel and runs on independently
    Ready,
    /// Child output ended without the sentinel; the captured output was
    /// reported to the user
    StartupFailureReported,
    /// User declined the 32-bit confirmation; no child was started
    Declined,
}

/// Resolves the launch inputs, assembles the command line, starts the
/// child and applies the configured supervision policy.
pub struct Supervisor {
    install: InstallLocation,
    forwarded: Vec<String>,
}

impl Supervisor {
    pub fn new(install: InstallLocation, forwarded: Vec<String>) -> Self {
        Self { install, forwarded }
    }

    /// One launch attempt: `Resolving -> Building -> Running`.
    pub fn run(self) -> Result<HandoffOutcome, Error> {
        // Resolving
        let program = ConfigFile::load(self.install.sibling(PROGRAM_CONFIG))?;
        let jarfile = program.get(KEY_JARFILE, DEFAULT_JARFILE).to_string();
        let target = self.install.sibling(&jarfile);
        let runtime_dir = paths::runtime_bin_dir()?;
        info!("Target: {}", target.display());
        info!("Runtime directory: {}", runtime_dir.display());

        // Building
        let (tunables, outcome) =
            ConfigFile::load_or_seed(self.install.sibling(TUNABLES_CONFIG), TUNABLE_DEFAULTS)?;
        if outcome == LoadOutcome::Seeded {
            info!("Created {} with defaults", tunables.path().display());
        }
        let xmx = tunables.get(KEY_XMX, DEFAULT_XMX);
        let console = parse_flag(tunables.get(KEY_CONSOLE, "false"), false);
        let policy = LaunchPolicy::from_tunables(&tunables);
        let command = LaunchCommand::build(
            platform::runtime_binary_name(console),
            xmx,
            &target,
            runtime_dir,
            self.forwarded,
        );
        info!("Launch command: {} {}", command.binary, command.args.join(" "));

        if platform::is_32bit_host() && !confirm_32bit_launch() {
            return Ok(HandoffOutcome::Declined);
        }

        // Running
        match policy {
            LaunchPolicy::FireAndForget => {
                spawn_child(&command, false)?;
                Ok(HandoffOutcome::Detached)
            }
            LaunchPolicy::Monitored { timeout } => {
                let mut child = spawn_child(&command, true)?;
                let lines = monitor::merged_lines(&mut child);
                match monitor::watch(&lines, READY_SENTINEL, timeout) {
                    MonitorOutcome::Ready => Ok(HandoffOutcome::Ready),
                    MonitorOutcome::StartupFailure(output) => {
                        ui::error_dialog(
                            APP_NAME,
                            &format!("{jarfile} failed to start:\n\n{output}"),
                        );
                        Ok(HandoffOutcome::StartupFailureReported)
                    }
                }
                // child handle drops here without killing the process
            }
        }
    }
}

/// Start the child. With `capture` its output pipes are kept for
/// monitoring, otherwise all streams are detached.
fn spawn_child(launch: &LaunchCommand, capture: bool) -> Result<Child, Error> {
    let mut cmd = Command::new(&launch.binary);
    cmd.args(&launch.args)
        .current_dir(&launch.working_dir)
        .stdin(Stdio::null());

    if capture {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    // Detach from our session so the child outlives the launcher
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(0x00000008); // DETACHED_PROCESS
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }
    }

    let child = cmd.spawn().map_err(|source| Error::ChildStart {
        binary: launch.binary.clone(),
        source,
    })?;
    info!("Spawned {} with PID {}", launch.binary, child.id());
    Ok(child)
}

fn confirm_32bit_launch() -> bool {
    let confirmed = ui::confirm_dialog(
        APP_NAME,
        "The launcher is running as a 32-bit process.\n\
         Heap settings above ~1.5g will fail on 32-bit Java.\n\n\
         Start anyway?",
    );
    if !confirmed {
        info!("Launch declined on 32-bit host");
    }
    confirmed
}

fn parse_flag(value: &str, fallback: bool) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => true,
        "false" | "no" | "0" => false,
        _ => fallback,
    }
}
