use std::env;
use std::time::Duration;

/// What to do with a repository whose sync status could not be determined
/// (detached HEAD, no upstream, unresolvable refs, unrelated histories).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndeterminatePolicy {
    /// Report it as up to date, which makes it eligible for deletion.
    #[default]
    TreatAsSynced,
    /// Report it as having unpushed commits and leave it alone.
    TreatAsUnpushed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on a single `git fetch`. A hung remote must not stall the run.
    pub fetch_timeout: Duration,
    pub on_indeterminate: IndeterminatePolicy,
}

impl Config {
    pub const FETCH_TIMEOUT_VAR: &'static str = "GITSWEEP_FETCH_TIMEOUT";
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new() -> Self {
        Self {
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
            on_indeterminate: IndeterminatePolicy::default(),
        }
    }

    /// Load Config from the environment.
    ///
    /// `GITSWEEP_FETCH_TIMEOUT` is a whole number of seconds. Anything that does
    /// not parse to a positive number is ignored with a warning.
    pub fn load() -> Self {
        let mut config = Self::new();
        if let Ok(raw) = env::var(Self::FETCH_TIMEOUT_VAR) {
            if !raw.is_empty() {
                match parse_timeout(&raw) {
                    Some(timeout) => config.fetch_timeout = timeout,
                    None => tracing::warn!(
                        value = %raw,
                        "ignoring invalid {}, using {:?}",
                        Self::FETCH_TIMEOUT_VAR,
                        Self::DEFAULT_FETCH_TIMEOUT
                    ),
                }
            }
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}
