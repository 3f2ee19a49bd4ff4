// SPDX-License-Identifier: BUSL-1.1
//! # Pipeline Configuration
//!
//! Loop intervals, the expiry horizon, the fill retry bound, the queue
//! topology and the loop failure policy. Defaults match the production
//! line: one-second polling, a five-second expiry horizon and five fill
//! attempts.

use std::str::FromStr;
use std::time::Duration;

/// How bottles are partitioned into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueMode {
    /// One line per beer type. A slow or broken beer type cannot hold up
    /// the others.
    #[default]
    SplitQueues,
    /// One line for every beer type. Simpler, but a stalled fill blocks
    /// all beer types behind it.
    GlobalQueue,
}

impl FromStr for QueueMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "split" | "split-queues" => Ok(Self::SplitQueues),
            "global" | "global-queue" => Ok(Self::GlobalQueue),
            other => Err(ConfigError::Invalid {
                var: "queue mode",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for QueueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SplitQueues => f.write_str("split"),
            Self::GlobalQueue => f.write_str("global"),
        }
    }
}

/// What happens to a line loop after an error escapes its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopFailurePolicy {
    /// Log, wait `restart_backoff`, and resume the same loop. Queue contents
    /// and the intake channel are kept.
    #[default]
    Restart,
    /// Log and end the loop for good. The line keeps its other loop, so it
    /// may keep accepting bottles it will never ship.
    Terminate,
}

impl FromStr for LoopFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restart" => Ok(Self::Restart),
            "terminate" => Ok(Self::Terminate),
            other => Err(ConfigError::Invalid {
                var: "loop failure policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Runtime configuration for every pipeline loop.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub queue_mode: QueueMode,
    pub loop_failure: LoopFailurePolicy,
    /// Sleep between fermentation polls when nothing is ready.
    pub poll_interval: Duration,
    /// Period of the expiry sweeper.
    pub sweep_interval: Duration,
    /// Period of the equipment monitor.
    pub monitor_interval: Duration,
    /// Bottles whose deadline falls within this window are force-shipped.
    pub expiry_horizon: chrono::Duration,
    /// Fill attempts per bottle before it is dropped.
    pub fill_attempts: u32,
    /// Delay before a failed loop is resumed under [`LoopFailurePolicy::Restart`].
    pub restart_backoff: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_mode: QueueMode::SplitQueues,
            loop_failure: LoopFailurePolicy::Restart,
            poll_interval: Duration::from_secs(1),
            sweep_interval: Duration::from_secs(1),
            monitor_interval: Duration::from_secs(1),
            expiry_horizon: chrono::Duration::seconds(5),
            fill_attempts: 5,
            restart_backoff: Duration::from_secs(1),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Variables:
    /// - `BREWLINE_QUEUE_MODE` (`split` | `global`, default `split`)
    /// - `BREWLINE_LOOP_FAILURE` (`restart` | `terminate`, default `restart`)
    /// - `BREWLINE_POLL_INTERVAL_MS` (default 1000)
    /// - `BREWLINE_SWEEP_INTERVAL_MS` (default 1000)
    /// - `BREWLINE_MONITOR_INTERVAL_MS` (default 1000)
    /// - `BREWLINE_EXPIRY_HORIZON_SECS` (default 5, must not be negative)
    /// - `BREWLINE_FILL_ATTEMPTS` (default 5, must be at least 1)
    /// - `BREWLINE_RESTART_BACKOFF_MS` (default 1000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("BREWLINE_QUEUE_MODE") {
            config.queue_mode = v.parse()?;
        }
        if let Some(v) = lookup("BREWLINE_LOOP_FAILURE") {
            config.loop_failure = v.parse()?;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BREWLINE_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BREWLINE_SWEEP_INTERVAL_MS")? {
            config.sweep_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BREWLINE_MONITOR_INTERVAL_MS")? {
            config.monitor_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<i64>(&lookup, "BREWLINE_EXPIRY_HORIZON_SECS")? {
            config.expiry_horizon = (secs >= 0)
                .then(|| chrono::Duration::try_seconds(secs))
                .flatten()
                .ok_or_else(|| ConfigError::Invalid {
                    var: "BREWLINE_EXPIRY_HORIZON_SECS",
                    value: secs.to_string(),
                })?;
        }
        if let Some(n) = parse_var::<u32>(&lookup, "BREWLINE_FILL_ATTEMPTS")? {
            if n == 0 {
                return Err(ConfigError::Invalid {
                    var: "BREWLINE_FILL_ATTEMPTS",
                    value: n.to_string(),
                });
            }
            config.fill_attempts = n;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BREWLINE_RESTART_BACKOFF_MS")? {
            config.restart_backoff = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.queue_mode, QueueMode::SplitQueues);
        assert_eq!(config.loop_failure, LoopFailurePolicy::Restart);
        assert_eq!(config.fill_attempts, 5);
        assert_eq!(config.expiry_horizon, chrono::Duration::seconds(5));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn reads_overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("BREWLINE_QUEUE_MODE", "global"),
            ("BREWLINE_LOOP_FAILURE", "Terminate"),
            ("BREWLINE_POLL_INTERVAL_MS", "20"),
            ("BREWLINE_EXPIRY_HORIZON_SECS", "10"),
            ("BREWLINE_FILL_ATTEMPTS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.queue_mode, QueueMode::GlobalQueue);
        assert_eq!(config.loop_failure, LoopFailurePolicy::Terminate);
        assert_eq!(config.poll_interval, Duration::from_millis(20));
        assert_eq!(config.expiry_horizon, chrono::Duration::seconds(10));
        assert_eq!(config.fill_attempts, 3);
    }

    #[test]
    fn rejects_garbage() {
        assert!(PipelineConfig::from_lookup(lookup(&[("BREWLINE_QUEUE_MODE", "sideways")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[("BREWLINE_SWEEP_INTERVAL_MS", "soon")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[("BREWLINE_FILL_ATTEMPTS", "0")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[("BREWLINE_EXPIRY_HORIZON_SECS", "-5")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[(
            "BREWLINE_EXPIRY_HORIZON_SECS",
            "9999999999999999"
        )]))
        .is_err());
    }

    #[test]
    fn zero_expiry_horizon_is_allowed() {
        let config =
            PipelineConfig::from_lookup(lookup(&[("BREWLINE_EXPIRY_HORIZON_SECS", "0")])).unwrap();
        assert_eq!(config.expiry_horizon, chrono::Duration::zero());
    }

    #[test]
    fn queue_mode_display_roundtrips() {
        for mode in [QueueMode::SplitQueues, QueueMode::GlobalQueue] {
            assert_eq!(mode.to_string().parse::<QueueMode>().unwrap(), mode);
        }
    }
}
