//! pip `requirements.txt` parser.
//!
//! Requirements files hold constraints, not versions, so concrete versions
//! come from pip itself: `pip3 install -r <file> --dry-run --ignore-installed
//! --report - --quiet` prints a JSON installation report without touching
//! the environment. The `--report` option needs pip 22.2 or later.
//!
//! This is the one blocking operation in the crate. Every run carries a
//! timeout and can be cancelled from another thread through a
//! [`CancelHandle`]; the child process is killed in both cases.

use super::{Fragments, ManifestKind, ManifestParser};
use crate::error::{InventoryError, ResolverErrorKind, Result};
use crate::model::RawFragment;
use crate::utils::compare_versions;
use serde::Deserialize;
use std::cmp::Ordering;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};
use wait_timeout::ChildExt;

/// Default pip executable
pub const DEFAULT_PIP_COMMAND: &str = "pip3";
/// First pip release with `install --report`
pub const DEFAULT_MIN_PIP_VERSION: &str = "22.2";
/// Default limit for one resolver run
pub const DEFAULT_PIP_TIMEOUT: Duration = Duration::from_secs(300);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Settings for the pip resolver subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipOptions {
    /// Executable to run
    pub command: String,
    /// Minimum pip version named in diagnostics
    pub min_version: String,
    /// Wall-clock limit per run
    pub timeout: Duration,
}

impl Default for PipOptions {
    fn default() -> Self {
        Self {
            command: DEFAULT_PIP_COMMAND.to_string(),
            min_version: DEFAULT_MIN_PIP_VERSION.to_string(),
            timeout: DEFAULT_PIP_TIMEOUT,
        }
    }
}

/// Cancels in-flight resolver runs when triggered.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of current and future runs.
    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

/// Parser for pip requirements files
#[derive(Debug, Clone, Default)]
pub struct PipRequirementsParser {
    options: PipOptions,
    cancel: CancelHandle,
}

#[derive(Debug, Deserialize)]
struct InstallReport {
    #[serde(default)]
    install: Vec<InstallItem>,
}

#[derive(Debug, Deserialize)]
struct InstallItem {
    metadata: Option<InstallMetadata>,
}

#[derive(Debug, Deserialize)]
struct InstallMetadata {
    name: Option<String>,
    version: Option<String>,
}

/// Captured result of a finished child process.
struct RunOutput {
    success: bool,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl PipRequirementsParser {
    #[must_use]
    pub fn new(options: PipOptions) -> Self {
        Self {
            options,
            cancel: CancelHandle::new(),
        }
    }

    /// Share an existing cancellation handle.
    #[must_use]
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that cancels this parser's runs.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn options(&self) -> &PipOptions {
        &self.options
    }

    /// Resolve the requirements file into concrete `(name, version)` pairs.
    fn resolve(&self, path: &Path) -> Result<Vec<RawFragment>> {
        let path_arg = path.to_string_lossy().into_owned();
        let output = self.run(&[
            "install",
            "-r",
            &path_arg,
            "--dry-run",
            "--ignore-installed",
            "--report",
            "-",
            "--quiet",
        ])?;

        if !output.success {
            let combined = format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            error!("{}", combined.trim());
            return Err(self.diagnose_failure(path, combined));
        }

        let report: InstallReport = serde_json::from_slice(&output.stdout).map_err(|e| {
            InventoryError::unresolved(
                format!("reading pip report for {}", path.display()),
                ResolverErrorKind::UnusableReport {
                    tool: self.options.command.clone(),
                    reason: e.to_string(),
                },
            )
        })?;

        Ok(report
            .install
            .into_iter()
            .filter_map(|item| item.metadata)
            .filter_map(|meta| match (meta.name, meta.version) {
                (Some(name), Some(version)) => Some(RawFragment::new(name, version)),
                _ => None,
            })
            .collect())
    }

    /// Turn a failed install run into a diagnostic, naming the minimum pip
    /// version when the installed one is older.
    fn diagnose_failure(&self, path: &Path, output: String) -> InventoryError {
        let context = format!("{} not scanned", path.display());
        if let Some(found) = self.installed_version() {
            if compare_versions(&found, &self.options.min_version) == Ordering::Less {
                error!(
                    "{} not scanned: pip --dry-run was unable to get package versions.",
                    path.display()
                );
                error!(
                    "pip version >= {} is required to scan Python requirements files.",
                    self.options.min_version
                );
                return InventoryError::unresolved(
                    context,
                    ResolverErrorKind::ToolTooOld {
                        tool: self.options.command.clone(),
                        found,
                        required: self.options.min_version.clone(),
                    },
                );
            }
        }
        InventoryError::unresolved(
            context,
            ResolverErrorKind::Failed {
                tool: self.options.command.clone(),
                output: output.trim().to_string(),
            },
        )
    }

    /// Version reported by `<pip> --version`.
    ///
    /// The output looks like `pip 20.0.2 from /usr/lib/python3/dist-packages/pip (python 3.8)`.
    fn installed_version(&self) -> Option<String> {
        let output = self.run(&["--version"]).ok()?;
        let text = String::from_utf8_lossy(&output.stdout);
        text.split_whitespace().nth(1).map(str::to_string)
    }

    /// Run the pip command with a timeout, honouring cancellation.
    fn run(&self, args: &[&str]) -> Result<RunOutput> {
        let tool = self.options.command.clone();
        if self.cancel.is_cancelled() {
            return Err(InventoryError::unresolved(
                "pip run",
                ResolverErrorKind::Cancelled { tool },
            ));
        }

        debug!("running {} {}", tool, args.join(" "));
        let mut child = Command::new(&tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                InventoryError::unresolved(
                    "starting pip",
                    ResolverErrorKind::Failed {
                        tool: tool.clone(),
                        output: e.to_string(),
                    },
                )
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.options.timeout;
        let status = loop {
            // Wake every poll interval to honour cancellation
            match child.wait_timeout(POLL_INTERVAL) {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    kill(&mut child);
                    return Err(InventoryError::unresolved(
                        "waiting for pip",
                        ResolverErrorKind::Failed {
                            tool,
                            output: e.to_string(),
                        },
                    ));
                }
            }
            if self.cancel.is_cancelled() {
                kill(&mut child);
                return Err(InventoryError::unresolved(
                    "pip run",
                    ResolverErrorKind::Cancelled { tool },
                ));
            }
            if Instant::now() >= deadline {
                kill(&mut child);
                return Err(InventoryError::unresolved(
                    "pip run",
                    ResolverErrorKind::TimedOut {
                        tool,
                        seconds: self.options.timeout.as_secs(),
                    },
                ));
            }
        };

        Ok(RunOutput {
            success: status.success(),
            stdout: join(stdout),
            stderr: join(stderr),
        })
    }
}

/// Read a child pipe to the end on its own thread so the child never
/// blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            // A read error leaves whatever was captured so far
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl ManifestParser for PipRequirementsParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::PipRequirements
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        let fragments = self.resolve(path)?;
        debug!("Done scanning file: {}", path.display());
        Ok(Box::new(fragments.into_iter()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Write an executable shell script standing in for pip.
    fn fake_pip(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("pip3");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn parser(command: String, timeout: Duration) -> PipRequirementsParser {
        PipRequirementsParser::new(PipOptions {
            command,
            timeout,
            ..PipOptions::default()
        })
    }

    fn requirements(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, "requests>=2.0\n").unwrap();
        path
    }

    #[test]
    fn test_reads_install_report() {
        let dir = TempDir::new().unwrap();
        let pip = fake_pip(
            &dir,
            r#"echo '{"install": [{"metadata": {"name": "requests", "version": "2.31.0"}}, {"metadata": {"name": "urllib3", "version": "2.0.4"}}, {"metadata": {"name": "broken"}}]}'"#,
        );
        let fragments: Vec<_> = parser(pip, Duration::from_secs(10))
            .fragments(&requirements(&dir))
            .unwrap()
            .collect();
        assert_eq!(
            fragments,
            vec![
                RawFragment::new("requests", "2.31.0"),
                RawFragment::new("urllib3", "2.0.4"),
            ]
        );
    }

    #[test]
    fn test_old_pip_names_minimum_version() {
        let dir = TempDir::new().unwrap();
        let pip = fake_pip(
            &dir,
            r#"if [ "$1" = "--version" ]; then echo "pip 20.0.2 from /usr/lib/python3/dist-packages/pip (python 3.8)"; exit 0; fi
echo "no such option: --dry-run" >&2
exit 2"#,
        );
        let err = parser(pip, Duration::from_secs(10))
            .fragments(&requirements(&dir))
            .err()
            .unwrap();
        match err {
            InventoryError::UnresolvedDependency {
                source: ResolverErrorKind::ToolTooOld { found, required, .. },
                ..
            } => {
                assert_eq!(found, "20.0.2");
                assert_eq!(required, "22.2");
            }
            other => panic!("Expected ToolTooOld, got {other:?}"),
        }
    }

    #[test]
    fn test_recent_pip_failure_is_reported_as_failed() {
        let dir = TempDir::new().unwrap();
        let pip = fake_pip(
            &dir,
            r#"if [ "$1" = "--version" ]; then echo "pip 23.1 from /x (python 3.11)"; exit 0; fi
echo "ERROR: No matching distribution" >&2
exit 1"#,
        );
        let err = parser(pip, Duration::from_secs(10))
            .fragments(&requirements(&dir))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            InventoryError::UnresolvedDependency {
                source: ResolverErrorKind::Failed { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_timeout_kills_child() {
        let dir = TempDir::new().unwrap();
        let pip = fake_pip(&dir, "sleep 30");
        let started = Instant::now();
        let err = parser(pip, Duration::from_millis(200))
            .fragments(&requirements(&dir))
            .err()
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(matches!(
            err,
            InventoryError::UnresolvedDependency {
                source: ResolverErrorKind::TimedOut { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = TempDir::new().unwrap();
        let pip = fake_pip(&dir, "echo '{}'");
        let parser = parser(pip, Duration::from_secs(10));
        parser.cancel_handle().cancel();
        let err = parser.fragments(&requirements(&dir)).err().unwrap();
        assert!(matches!(
            err,
            InventoryError::UnresolvedDependency {
                source: ResolverErrorKind::Cancelled { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let dir = TempDir::new().unwrap();
        let pip = fake_pip(&dir, "sleep 30");
        let parser = parser(pip, Duration::from_secs(60));
        let handle = parser.cancel_handle();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            handle.cancel();
        });
        let started = Instant::now();
        let result = parser.fragments(&requirements(&dir));
        canceller.join().unwrap();
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_missing_executable() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-pip").to_string_lossy().into_owned();
        let parser = parser(missing, Duration::from_secs(1));
        assert_eq!(parser.parse_file(&requirements(&dir)).count(), 0);
    }
}
