// Runner configuration (environment-driven, with defaults)

use tracing::warn;

use crate::application::constants::{CAPTURE_MODE_ENV, DEFAULT_CAPTURE_MODE};

/// Runner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Permission bits for capture files created by `run_cmd` (before umask)
    pub capture_mode: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            capture_mode: DEFAULT_CAPTURE_MODE,
        }
    }
}

impl RunnerConfig {
    /// Load from process environment
    ///
    /// # Environment Variables
    ///
    /// - `CMDHARNESS_CAPTURE_MODE`: octal permission bits (e.g. `0640`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (testable without touching env)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(CAPTURE_MODE_ENV) {
            match parse_mode(&raw) {
                Some(mode) => config.capture_mode = mode,
                None => warn!(
                    value = %raw,
                    default = %format!("{:o}", DEFAULT_CAPTURE_MODE),
                    "Invalid {}, using default", CAPTURE_MODE_ENV
                ),
            }
        }

        config
    }
}

fn parse_mode(raw: &str) -> Option<u32> {
    let digits = raw.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
}
