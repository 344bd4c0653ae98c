//! Environment-driven configuration for the point service.

use std::time::Duration;

/// Environment variable selecting the gate mode (`global` or `per-user`).
pub const GATE_MODE_ENV: &str = "POINT_GATE_MODE";

/// Environment variable bounding the wait for the mutation gate, in milliseconds.
pub const ACQUIRE_TIMEOUT_MS_ENV: &str = "POINT_ACQUIRE_TIMEOUT_MS";

/// Environment abstraction for configuration lookups.
///
/// Lets tests supply values without touching the process environment.
pub trait ConfigEnv {
    /// Fetch a string value by name.
    fn string(&self, name: &str) -> Option<String>;
}

/// Environment access backed by the real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl ConfigEnv for ProcessEnv {
    fn string(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Scope of mutual exclusion between mutations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateMode {
    /// One gate for the whole process: a single mutation at a time
    #[default]
    Global,
    /// One gate per user id: mutations on different users run in parallel
    PerUser,
}

impl GateMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" => Some(Self::Global),
            "per-user" | "per_user" => Some(Self::PerUser),
            _ => None,
        }
    }
}

/// Configuration of a [`crate::commands::PointService`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointServiceConfig {
    pub gate: GateMode,
    /// Longest time a mutation waits for the gate before failing as busy
    ///
    /// `None` waits for as long as it takes.
    pub acquire_timeout: Option<Duration>,
}

impl PointServiceConfig {
    pub fn with_gate(mut self, gate: GateMode) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Load configuration from the real process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(&ProcessEnv)
    }

    /// Load configuration from the given environment.
    ///
    /// Invalid values are logged and replaced by their default.
    pub fn from_env_with(env: &impl ConfigEnv) -> Self {
        let mut config = Self::default();

        if let Some(raw) = env.string(GATE_MODE_ENV) {
            match GateMode::parse(&raw) {
                Some(gate) => config.gate = gate,
                None => tracing::warn!(value = %raw, "invalid {GATE_MODE_ENV}, using global gate"),
            }
        }

        if let Some(raw) = env.string(ACQUIRE_TIMEOUT_MS_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.acquire_timeout = Some(Duration::from_millis(ms)),
                _ => tracing::warn!(
                    value = %raw,
                    "invalid {ACQUIRE_TIMEOUT_MS_ENV}, waiting without bound"
                ),
            }
        }

        config
    }
}
