//! Default values for cve-inventory configuration.

use crate::parsers;

/// Default pip executable
pub const DEFAULT_PIP_COMMAND: &str = parsers::DEFAULT_PIP_COMMAND;

/// First pip release with `install --report`
pub const DEFAULT_MIN_PIP_VERSION: &str = parsers::DEFAULT_MIN_PIP_VERSION;

/// Default pip timeout in seconds
pub const DEFAULT_PIP_TIMEOUT_SECS: u64 = parsers::DEFAULT_PIP_TIMEOUT.as_secs();

/// Directory names skipped unless configured otherwise.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[".git", ".hg", ".svn"];

pub(crate) fn default_skip_dirs() -> Vec<String> {
    DEFAULT_SKIP_DIRS.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pip_defaults() {
        assert_eq!(DEFAULT_PIP_COMMAND, "pip3");
        assert_eq!(DEFAULT_MIN_PIP_VERSION, "22.2");
        assert_eq!(DEFAULT_PIP_TIMEOUT_SECS, 300);
    }
}
